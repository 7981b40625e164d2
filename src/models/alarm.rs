use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::EstadoAlarma;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClasificacionAlarma {
    pub id: Uuid,
    pub nombre: String,
    pub codigo: String,
}

/// Alarm category; `es_dispositivo` marks device-originated types
/// (fall sensor, smoke detector) as opposed to patient-initiated calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TipoAlarma {
    pub id: Uuid,
    pub nombre: String,
    pub codigo: String,
    pub es_dispositivo: bool,
    pub clasificacion_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alarma {
    pub id: Uuid,
    pub estado_alarma: EstadoAlarma,
    pub fecha_registro: NaiveDateTime,
    pub observaciones: Option<String>,
    pub resumen: Option<String>,
    pub tipo_alarma_id: Uuid,
    pub teleoperador_id: Uuid,
}
