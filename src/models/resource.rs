use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Top level of the community-resource lookup chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClasificacionRecurso {
    pub id: Uuid,
    pub nombre: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TipoRecurso {
    pub id: Uuid,
    pub nombre: String,
    pub clasificacion_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecursoComunitario {
    pub id: Uuid,
    pub nombre: String,
    pub telefono: String,
    pub tipo_id: Uuid,
    pub direccion_id: Uuid,
}
