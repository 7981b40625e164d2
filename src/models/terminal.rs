use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Telecare device installed in a patient's home.
///
/// `titular_id` points at the patient assigned as the device owner.
/// The reverse link (`Paciente::terminal_id`) is a separate,
/// independently-mutable reference; the two never form one object graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Terminal {
    pub id: Uuid,
    pub numero_terminal: String,
    pub modo_acceso_vivienda: String,
    pub barreras_arquitectonicas: bool,
    pub modelo_terminal: String,
    pub fecha_tipo_situacion: Option<NaiveDate>,
    pub titular_id: Option<Uuid>,
    pub tipo_vivienda_id: Uuid,
    pub tipo_situacion_id: Uuid,
}
