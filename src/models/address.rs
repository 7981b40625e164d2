use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Postal address, shared by reference from personas and community
/// resources. The wire name for the street line is `direccion_completa`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Direccion {
    pub id: Uuid,
    pub localidad: String,
    pub provincia: String,
    #[serde(rename = "direccion_completa")]
    pub direccion: String,
    pub codigo_postal: String,
}
