use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::repository;
use crate::db::DatabaseError;
use crate::models::{Paciente, RelacionPaciente, TipoModalidadPaciente};

use super::lookup::{resolve_tipo_modalidad, TipoModalidadInput};
use super::person::{resolve_persona, PersonaInput, PersonaView};
use super::require;
use super::terminal::{resolve_terminal, TerminalInput, TerminalView};

// ── Paciente ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct PacienteView {
    pub id: Uuid,
    pub tiene_ucr: bool,
    pub numero_expediente: String,
    pub numero_seguridad_social: String,
    pub prestacion_otros_servicios_sociales: bool,
    pub observaciones_medicas: Option<String>,
    pub intereses_y_actividades: Option<String>,
    pub terminal: TerminalView,
    pub persona: PersonaView,
    pub modalidad: TipoModalidadPaciente,
}

impl PacienteView {
    pub fn load(conn: &Connection, paciente: &Paciente) -> Result<Self, DatabaseError> {
        let terminal = require(
            repository::get_terminal(conn, &paciente.terminal_id)?,
            "terminal",
            &paciente.terminal_id,
        )?;
        let persona = require(
            repository::get_persona(conn, &paciente.persona_id)?,
            "persona",
            &paciente.persona_id,
        )?;
        let modalidad = require(
            repository::get_tipo_modalidad(conn, &paciente.modalidad_id)?,
            "tipo_modalidad_paciente",
            &paciente.modalidad_id,
        )?;
        Ok(Self {
            id: paciente.id,
            tiene_ucr: paciente.tiene_ucr,
            numero_expediente: paciente.numero_expediente.clone(),
            numero_seguridad_social: paciente.numero_seguridad_social.clone(),
            prestacion_otros_servicios_sociales: paciente.prestacion_otros_servicios_sociales,
            observaciones_medicas: paciente.observaciones_medicas.clone(),
            intereses_y_actividades: paciente.intereses_y_actividades.clone(),
            terminal: TerminalView::load(conn, &terminal)?,
            persona: PersonaView::load(conn, &persona)?,
            modalidad,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PacienteInput {
    pub tiene_ucr: bool,
    pub numero_expediente: String,
    pub numero_seguridad_social: String,
    pub prestacion_otros_servicios_sociales: bool,
    #[serde(default)]
    pub observaciones_medicas: Option<String>,
    #[serde(default)]
    pub intereses_y_actividades: Option<String>,
    pub terminal: TerminalInput,
    pub persona: PersonaInput,
    pub modalidad: TipoModalidadInput,
}

/// Resolves the whole nested chain bottom-up (persona with its
/// direccion, the lookup tables, the terminal with its lookups), then
/// inserts the patient row linking the resolved ids.
pub fn create_paciente(conn: &Connection, input: &PacienteInput) -> Result<Paciente, DatabaseError> {
    let persona = resolve_persona(conn, &input.persona)?;
    let modalidad = resolve_tipo_modalidad(conn, &input.modalidad)?;
    let terminal = resolve_terminal(conn, &input.terminal)?;

    let paciente = Paciente {
        id: Uuid::new_v4(),
        tiene_ucr: input.tiene_ucr,
        numero_expediente: input.numero_expediente.clone(),
        numero_seguridad_social: input.numero_seguridad_social.clone(),
        prestacion_otros_servicios_sociales: input.prestacion_otros_servicios_sociales,
        observaciones_medicas: input.observaciones_medicas.clone(),
        intereses_y_actividades: input.intereses_y_actividades.clone(),
        terminal_id: terminal.id,
        persona_id: persona.id,
        modalidad_id: modalidad.id,
    };
    repository::insert_paciente(conn, &paciente)?;
    Ok(paciente)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PacienteUpdate {
    pub tiene_ucr: Option<bool>,
    pub numero_expediente: Option<String>,
    pub numero_seguridad_social: Option<String>,
    pub prestacion_otros_servicios_sociales: Option<bool>,
    // Nullable columns: an explicit `null` clears, an absent key keeps
    #[serde(default, deserialize_with = "super::key_present")]
    pub observaciones_medicas: Option<Option<String>>,
    #[serde(default, deserialize_with = "super::key_present")]
    pub intereses_y_actividades: Option<Option<String>>,
    pub terminal: Option<TerminalInput>,
    pub persona: Option<PersonaInput>,
    pub modalidad: Option<TipoModalidadInput>,
}

pub fn update_paciente_fields(
    conn: &Connection,
    id: &Uuid,
    update: &PacienteUpdate,
) -> Result<Paciente, DatabaseError> {
    let mut paciente = require(repository::get_paciente(conn, id)?, "paciente", id)?;

    if let Some(tiene_ucr) = update.tiene_ucr {
        paciente.tiene_ucr = tiene_ucr;
    }
    if let Some(expediente) = &update.numero_expediente {
        paciente.numero_expediente = expediente.clone();
    }
    if let Some(nss) = &update.numero_seguridad_social {
        paciente.numero_seguridad_social = nss.clone();
    }
    if let Some(prestacion) = update.prestacion_otros_servicios_sociales {
        paciente.prestacion_otros_servicios_sociales = prestacion;
    }
    if let Some(observaciones) = &update.observaciones_medicas {
        paciente.observaciones_medicas = observaciones.clone();
    }
    if let Some(intereses) = &update.intereses_y_actividades {
        paciente.intereses_y_actividades = intereses.clone();
    }
    if let Some(terminal) = &update.terminal {
        paciente.terminal_id = resolve_terminal(conn, terminal)?.id;
    }
    if let Some(persona) = &update.persona {
        paciente.persona_id = resolve_persona(conn, persona)?.id;
    }
    if let Some(modalidad) = &update.modalidad {
        paciente.modalidad_id = resolve_tipo_modalidad(conn, modalidad)?.id;
    }

    repository::update_paciente(conn, &paciente)?;
    Ok(paciente)
}

// ── Relacion paciente ───────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct RelacionPacienteView {
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
    pub paciente: PacienteView,
}

impl RelacionPacienteView {
    pub fn load(conn: &Connection, relacion: &RelacionPaciente) -> Result<Self, DatabaseError> {
        let paciente = require(
            repository::get_paciente(conn, &relacion.paciente_id)?,
            "paciente",
            &relacion.paciente_id,
        )?;
        Ok(Self {
            id: relacion.id,
            nombre: relacion.nombre.clone(),
            apellidos: relacion.apellidos.clone(),
            telefono: relacion.telefono.clone(),
            tipo_relacion: relacion.tipo_relacion.clone(),
            tiene_llaves_vivienda: relacion.tiene_llaves_vivienda,
            disponibilidad: relacion.disponibilidad.clone(),
            observaciones: relacion.observaciones.clone(),
            prioridad: relacion.prioridad,
            es_conviviente: relacion.es_conviviente,
            tiempo_domicilio: relacion.tiempo_domicilio.clone(),
            paciente: PacienteView::load(conn, &paciente)?,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelacionPacienteInput {
    pub nombre: String,
    pub apellidos: String,
    pub telefono: String,
    pub tipo_relacion: String,
    pub tiene_llaves_vivienda: bool,
    #[serde(default)]
    pub disponibilidad: Option<String>,
    #[serde(default)]
    pub observaciones: Option<String>,
    pub prioridad: i32,
    pub es_conviviente: bool,
    #[serde(default)]
    pub tiempo_domicilio: Option<String>,
    /// The patient must already exist; contacts never create patients.
    pub paciente_id: Uuid,
}

pub fn create_relacion_paciente(
    conn: &Connection,
    input: &RelacionPacienteInput,
) -> Result<RelacionPaciente, DatabaseError> {
    if repository::get_paciente(conn, &input.paciente_id)?.is_none() {
        return Err(DatabaseError::ConstraintViolation(format!(
            "paciente {} does not exist",
            input.paciente_id
        )));
    }
    let relacion = RelacionPaciente {
        id: Uuid::new_v4(),
        nombre: input.nombre.clone(),
        apellidos: input.apellidos.clone(),
        telefono: input.telefono.clone(),
        tipo_relacion: input.tipo_relacion.clone(),
        tiene_llaves_vivienda: input.tiene_llaves_vivienda,
        disponibilidad: input.disponibilidad.clone(),
        observaciones: input.observaciones.clone(),
        prioridad: input.prioridad,
        es_conviviente: input.es_conviviente,
        tiempo_domicilio: input.tiempo_domicilio.clone(),
        paciente_id: input.paciente_id,
    };
    repository::insert_relacion_paciente(conn, &relacion)?;
    Ok(relacion)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RelacionPacienteUpdate {
    pub nombre: Option<String>,
    pub apellidos: Option<String>,
    pub telefono: Option<String>,
    pub tipo_relacion: Option<String>,
    pub tiene_llaves_vivienda: Option<bool>,
    // Nullable columns: an explicit `null` clears, an absent key keeps
    #[serde(default, deserialize_with = "super::key_present")]
    pub disponibilidad: Option<Option<String>>,
    #[serde(default, deserialize_with = "super::key_present")]
    pub observaciones: Option<Option<String>>,
    pub prioridad: Option<i32>,
    pub es_conviviente: Option<bool>,
    #[serde(default, deserialize_with = "super::key_present")]
    pub tiempo_domicilio: Option<Option<String>>,
    pub paciente_id: Option<Uuid>,
}

pub fn update_relacion_paciente_fields(
    conn: &Connection,
    id: &Uuid,
    update: &RelacionPacienteUpdate,
) -> Result<RelacionPaciente, DatabaseError> {
    let mut relacion = require(
        repository::get_relacion_paciente(conn, id)?,
        "relacion_paciente",
        id,
    )?;

    if let Some(nombre) = &update.nombre {
        relacion.nombre = nombre.clone();
    }
    if let Some(apellidos) = &update.apellidos {
        relacion.apellidos = apellidos.clone();
    }
    if let Some(telefono) = &update.telefono {
        relacion.telefono = telefono.clone();
    }
    if let Some(tipo) = &update.tipo_relacion {
        relacion.tipo_relacion = tipo.clone();
    }
    if let Some(llaves) = update.tiene_llaves_vivienda {
        relacion.tiene_llaves_vivienda = llaves;
    }
    if let Some(disponibilidad) = &update.disponibilidad {
        relacion.disponibilidad = disponibilidad.clone();
    }
    if let Some(observaciones) = &update.observaciones {
        relacion.observaciones = observaciones.clone();
    }
    if let Some(prioridad) = update.prioridad {
        relacion.prioridad = prioridad;
    }
    if let Some(conviviente) = update.es_conviviente {
        relacion.es_conviviente = conviviente;
    }
    if let Some(tiempo) = &update.tiempo_domicilio {
        relacion.tiempo_domicilio = tiempo.clone();
    }
    if let Some(paciente_id) = update.paciente_id {
        if repository::get_paciente(conn, &paciente_id)?.is_none() {
            return Err(DatabaseError::ConstraintViolation(format!(
                "paciente {paciente_id} does not exist"
            )));
        }
        relacion.paciente_id = paciente_id;
    }

    repository::update_relacion_paciente(conn, &relacion)?;
    Ok(relacion)
}
