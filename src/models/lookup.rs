use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Flat lookup tables. Each normalizes a repeated category value and
/// carries nothing beyond a name.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TipoVivienda {
    pub id: Uuid,
    pub nombre: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TipoSituacion {
    pub id: Uuid,
    pub nombre: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TipoModalidadPaciente {
    pub id: Uuid,
    pub nombre: String,
}
