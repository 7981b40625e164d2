use chrono::NaiveDate;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::repository;
use crate::db::DatabaseError;
use crate::models::{Terminal, TipoSituacion, TipoVivienda};

use super::lookup::{
    resolve_tipo_situacion, resolve_tipo_vivienda, TipoSituacionInput, TipoViviendaInput,
};
use super::require;

/// Shallow patient summary embedded in a terminal view. The full
/// patient view embeds the terminal, so the owner side stops here.
#[derive(Debug, Clone, Serialize)]
pub struct TitularResumen {
    pub id: Uuid,
    pub numero_expediente: String,
    pub numero_seguridad_social: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TerminalView {
    pub id: Uuid,
    pub numero_terminal: String,
    pub modo_acceso_vivienda: String,
    pub barreras_arquitectonicas: bool,
    pub modelo_terminal: String,
    pub fecha_tipo_situacion: Option<NaiveDate>,
    pub titular: Option<TitularResumen>,
    pub tipo_vivienda: TipoVivienda,
    pub tipo_situacion: TipoSituacion,
}

impl TerminalView {
    pub fn load(conn: &Connection, terminal: &Terminal) -> Result<Self, DatabaseError> {
        let titular = match terminal.titular_id {
            Some(id) => {
                let paciente = require(repository::get_paciente(conn, &id)?, "paciente", &id)?;
                Some(TitularResumen {
                    id: paciente.id,
                    numero_expediente: paciente.numero_expediente,
                    numero_seguridad_social: paciente.numero_seguridad_social,
                })
            }
            None => None,
        };
        let tipo_vivienda = require(
            repository::get_tipo_vivienda(conn, &terminal.tipo_vivienda_id)?,
            "tipo_vivienda",
            &terminal.tipo_vivienda_id,
        )?;
        let tipo_situacion = require(
            repository::get_tipo_situacion(conn, &terminal.tipo_situacion_id)?,
            "tipo_situacion",
            &terminal.tipo_situacion_id,
        )?;
        Ok(Self {
            id: terminal.id,
            numero_terminal: terminal.numero_terminal.clone(),
            modo_acceso_vivienda: terminal.modo_acceso_vivienda.clone(),
            barreras_arquitectonicas: terminal.barreras_arquitectonicas,
            modelo_terminal: terminal.modelo_terminal.clone(),
            fecha_tipo_situacion: terminal.fecha_tipo_situacion,
            titular,
            tipo_vivienda,
            tipo_situacion,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TerminalInput {
    pub numero_terminal: String,
    pub modo_acceso_vivienda: String,
    pub barreras_arquitectonicas: bool,
    pub modelo_terminal: String,
    #[serde(default)]
    pub fecha_tipo_situacion: Option<NaiveDate>,
    /// Reference to an already-existing patient; linking happens by id,
    /// never by nested patient data.
    #[serde(default)]
    pub titular_id: Option<Uuid>,
    pub tipo_vivienda: TipoViviendaInput,
    pub tipo_situacion: TipoSituacionInput,
}

fn validate_titular(conn: &Connection, titular_id: &Uuid) -> Result<(), DatabaseError> {
    if repository::get_paciente(conn, titular_id)?.is_none() {
        return Err(DatabaseError::ConstraintViolation(format!(
            "titular paciente {titular_id} does not exist"
        )));
    }
    Ok(())
}

fn terminal_from_input(conn: &Connection, input: &TerminalInput) -> Result<Terminal, DatabaseError> {
    if let Some(titular_id) = &input.titular_id {
        validate_titular(conn, titular_id)?;
    }
    let tipo_vivienda = resolve_tipo_vivienda(conn, &input.tipo_vivienda)?;
    let tipo_situacion = resolve_tipo_situacion(conn, &input.tipo_situacion)?;
    Ok(Terminal {
        id: Uuid::new_v4(),
        numero_terminal: input.numero_terminal.clone(),
        modo_acceso_vivienda: input.modo_acceso_vivienda.clone(),
        barreras_arquitectonicas: input.barreras_arquitectonicas,
        modelo_terminal: input.modelo_terminal.clone(),
        fecha_tipo_situacion: input.fecha_tipo_situacion,
        titular_id: input.titular_id,
        tipo_vivienda_id: tipo_vivienda.id,
        tipo_situacion_id: tipo_situacion.id,
    })
}

pub fn create_terminal(conn: &Connection, input: &TerminalInput) -> Result<Terminal, DatabaseError> {
    let terminal = terminal_from_input(conn, input)?;
    repository::insert_terminal(conn, &terminal)?;
    Ok(terminal)
}

/// Find-or-create over the full field set, for the nested terminal
/// inside a paciente write. Repeated identical payloads converge on one
/// terminal row.
pub fn resolve_terminal(
    conn: &Connection,
    input: &TerminalInput,
) -> Result<Terminal, DatabaseError> {
    let candidate = terminal_from_input(conn, input)?;
    if let Some(existing) = repository::find_terminal(conn, &candidate)? {
        return Ok(existing);
    }
    repository::insert_terminal(conn, &candidate)?;
    Ok(candidate)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TerminalUpdate {
    pub numero_terminal: Option<String>,
    pub modo_acceso_vivienda: Option<String>,
    pub barreras_arquitectonicas: Option<bool>,
    pub modelo_terminal: Option<String>,
    // Nullable columns: an explicit `null` clears, an absent key keeps
    #[serde(default, deserialize_with = "super::key_present")]
    pub fecha_tipo_situacion: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "super::key_present")]
    pub titular_id: Option<Option<Uuid>>,
    pub tipo_vivienda: Option<TipoViviendaInput>,
    pub tipo_situacion: Option<TipoSituacionInput>,
}

pub fn update_terminal_fields(
    conn: &Connection,
    id: &Uuid,
    update: &TerminalUpdate,
) -> Result<Terminal, DatabaseError> {
    let mut terminal = require(repository::get_terminal(conn, id)?, "terminal", id)?;

    if let Some(numero) = &update.numero_terminal {
        terminal.numero_terminal = numero.clone();
    }
    if let Some(modo) = &update.modo_acceso_vivienda {
        terminal.modo_acceso_vivienda = modo.clone();
    }
    if let Some(barreras) = update.barreras_arquitectonicas {
        terminal.barreras_arquitectonicas = barreras;
    }
    if let Some(modelo) = &update.modelo_terminal {
        terminal.modelo_terminal = modelo.clone();
    }
    if let Some(fecha) = update.fecha_tipo_situacion {
        terminal.fecha_tipo_situacion = fecha;
    }
    if let Some(titular_id) = update.titular_id {
        if let Some(id) = &titular_id {
            validate_titular(conn, id)?;
        }
        terminal.titular_id = titular_id;
    }
    if let Some(vivienda) = &update.tipo_vivienda {
        terminal.tipo_vivienda_id = resolve_tipo_vivienda(conn, vivienda)?.id;
    }
    if let Some(situacion) = &update.tipo_situacion {
        terminal.tipo_situacion_id = resolve_tipo_situacion(conn, situacion)?.id;
    }

    repository::update_terminal(conn, &terminal)?;
    Ok(terminal)
}
