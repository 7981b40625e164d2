use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::Sexo;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Persona {
    pub id: Uuid,
    pub nombre: String,
    pub apellidos: String,
    pub dni: String,
    pub fecha_nacimiento: NaiveDate,
    pub sexo: Sexo,
    pub telefono_fijo: Option<String>,
    pub telefono_movil: Option<String>,
    pub direccion_id: Uuid,
}
