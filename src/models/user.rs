use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Operator account. Authentication itself lives in an external
/// subsystem; this table is the identity row the domain references.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usuario {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_active: bool,
    pub last_login: Option<NaiveDateTime>,
    pub date_joined: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grupo {
    pub id: Uuid,
    pub nombre: String,
}
