use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paciente {
    pub id: Uuid,
    pub tiene_ucr: bool,
    pub numero_expediente: String,
    pub numero_seguridad_social: String,
    pub prestacion_otros_servicios_sociales: bool,
    pub observaciones_medicas: Option<String>,
    pub intereses_y_actividades: Option<String>,
    pub terminal_id: Uuid,
    pub persona_id: Uuid,
    pub modalidad_id: Uuid,
}

/// Contact and relationship record for a patient's relative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelacionPaciente {
    pub id: Uuid,
    pub nombre: String,
    pub apellidos: String,
    pub telefono: String,
    pub tipo_relacion: String,
    pub tiene_llaves_vivienda: bool,
    pub disponibilidad: Option<String>,
    pub observaciones: Option<String>,
    pub prioridad: i32,
    pub es_conviviente: bool,
    pub tiempo_domicilio: Option<String>,
    pub paciente_id: Uuid,
}
