pub mod alarms;
pub mod catalog;
pub mod patients;
pub mod persons;
pub mod resources;
pub mod terminals;
pub mod users;

use uuid::Uuid;

use crate::api::error::ApiError;

pub(crate) fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|e| ApiError::BadRequest(format!("Invalid ID: {e}")))
}
