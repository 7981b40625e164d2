use chrono::{NaiveDateTime, Utc};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::repository;
use crate::db::DatabaseError;
use crate::models::{Alarma, ClasificacionAlarma, EstadoAlarma, TipoAlarma};

use super::require;
use super::user::UsuarioView;

// ── Clasificacion de alarma ─────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct ClasificacionAlarmaInput {
    pub nombre: String,
    pub codigo: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClasificacionAlarmaUpdate {
    pub nombre: Option<String>,
    pub codigo: Option<String>,
}

pub fn resolve_clasificacion_alarma(
    conn: &Connection,
    input: &ClasificacionAlarmaInput,
) -> Result<ClasificacionAlarma, DatabaseError> {
    if let Some(existing) =
        repository::find_clasificacion_alarma(conn, &input.nombre, &input.codigo)?
    {
        return Ok(existing);
    }
    let clasificacion = ClasificacionAlarma {
        id: Uuid::new_v4(),
        nombre: input.nombre.clone(),
        codigo: input.codigo.clone(),
    };
    repository::insert_clasificacion_alarma(conn, &clasificacion)?;
    Ok(clasificacion)
}

pub fn update_clasificacion_alarma_fields(
    conn: &Connection,
    id: &Uuid,
    update: &ClasificacionAlarmaUpdate,
) -> Result<ClasificacionAlarma, DatabaseError> {
    let mut clasificacion = require(
        repository::get_clasificacion_alarma(conn, id)?,
        "clasificacion_alarma",
        id,
    )?;
    if let Some(nombre) = &update.nombre {
        clasificacion.nombre = nombre.clone();
    }
    if let Some(codigo) = &update.codigo {
        clasificacion.codigo = codigo.clone();
    }
    repository::update_clasificacion_alarma(conn, &clasificacion)?;
    Ok(clasificacion)
}

// ── Tipo de alarma ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct TipoAlarmaView {
    pub id: Uuid,
    pub nombre: String,
    pub codigo: String,
    pub es_dispositivo: bool,
    pub clasificacion: ClasificacionAlarma,
}

impl TipoAlarmaView {
    pub fn load(conn: &Connection, tipo: &TipoAlarma) -> Result<Self, DatabaseError> {
        let clasificacion = require(
            repository::get_clasificacion_alarma(conn, &tipo.clasificacion_id)?,
            "clasificacion_alarma",
            &tipo.clasificacion_id,
        )?;
        Ok(Self {
            id: tipo.id,
            nombre: tipo.nombre.clone(),
            codigo: tipo.codigo.clone(),
            es_dispositivo: tipo.es_dispositivo,
            clasificacion,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TipoAlarmaInput {
    pub nombre: String,
    pub codigo: String,
    pub es_dispositivo: bool,
    pub clasificacion: ClasificacionAlarmaInput,
}

pub fn resolve_tipo_alarma(
    conn: &Connection,
    input: &TipoAlarmaInput,
) -> Result<TipoAlarma, DatabaseError> {
    let clasificacion = resolve_clasificacion_alarma(conn, &input.clasificacion)?;
    if let Some(existing) = repository::find_tipo_alarma(
        conn,
        &input.nombre,
        &input.codigo,
        input.es_dispositivo,
        &clasificacion.id,
    )? {
        return Ok(existing);
    }
    let tipo = TipoAlarma {
        id: Uuid::new_v4(),
        nombre: input.nombre.clone(),
        codigo: input.codigo.clone(),
        es_dispositivo: input.es_dispositivo,
        clasificacion_id: clasificacion.id,
    };
    repository::insert_tipo_alarma(conn, &tipo)?;
    Ok(tipo)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TipoAlarmaUpdate {
    pub nombre: Option<String>,
    pub codigo: Option<String>,
    pub es_dispositivo: Option<bool>,
    pub clasificacion: Option<ClasificacionAlarmaInput>,
}

pub fn update_tipo_alarma_fields(
    conn: &Connection,
    id: &Uuid,
    update: &TipoAlarmaUpdate,
) -> Result<TipoAlarma, DatabaseError> {
    let mut tipo = require(repository::get_tipo_alarma(conn, id)?, "tipo_alarma", id)?;
    if let Some(nombre) = &update.nombre {
        tipo.nombre = nombre.clone();
    }
    if let Some(codigo) = &update.codigo {
        tipo.codigo = codigo.clone();
    }
    if let Some(es_dispositivo) = update.es_dispositivo {
        tipo.es_dispositivo = es_dispositivo;
    }
    if let Some(clasificacion) = &update.clasificacion {
        tipo.clasificacion_id = resolve_clasificacion_alarma(conn, clasificacion)?.id;
    }
    repository::update_tipo_alarma(conn, &tipo)?;
    Ok(tipo)
}

// ── Alarma ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct AlarmaView {
    pub id: Uuid,
    pub estado_alarma: EstadoAlarma,
    pub fecha_registro: NaiveDateTime,
    pub observaciones: Option<String>,
    pub resumen: Option<String>,
    pub tipo_alarma: TipoAlarmaView,
    pub teleoperador: UsuarioView,
}

impl AlarmaView {
    pub fn load(conn: &Connection, alarma: &Alarma) -> Result<Self, DatabaseError> {
        let tipo = require(
            repository::get_tipo_alarma(conn, &alarma.tipo_alarma_id)?,
            "tipo_alarma",
            &alarma.tipo_alarma_id,
        )?;
        let teleoperador = require(
            repository::get_usuario(conn, &alarma.teleoperador_id)?,
            "usuario",
            &alarma.teleoperador_id,
        )?;
        Ok(Self {
            id: alarma.id,
            estado_alarma: alarma.estado_alarma,
            fecha_registro: alarma.fecha_registro,
            observaciones: alarma.observaciones.clone(),
            resumen: alarma.resumen.clone(),
            tipo_alarma: TipoAlarmaView::load(conn, &tipo)?,
            teleoperador: UsuarioView::load(conn, &teleoperador)?,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AlarmaInput {
    pub estado_alarma: EstadoAlarma,
    /// Server time when omitted.
    #[serde(default)]
    pub fecha_registro: Option<NaiveDateTime>,
    #[serde(default)]
    pub observaciones: Option<String>,
    #[serde(default)]
    pub resumen: Option<String>,
    pub tipo_alarma: TipoAlarmaInput,
    /// Reference to an existing operator account.
    pub teleoperador_id: Uuid,
}

fn validate_teleoperador(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    if repository::get_usuario(conn, id)?.is_none() {
        return Err(DatabaseError::ConstraintViolation(format!(
            "teleoperador usuario {id} does not exist"
        )));
    }
    Ok(())
}

pub fn create_alarma(conn: &Connection, input: &AlarmaInput) -> Result<Alarma, DatabaseError> {
    validate_teleoperador(conn, &input.teleoperador_id)?;
    let tipo = resolve_tipo_alarma(conn, &input.tipo_alarma)?;

    let alarma = Alarma {
        id: Uuid::new_v4(),
        estado_alarma: input.estado_alarma,
        fecha_registro: input
            .fecha_registro
            .unwrap_or_else(|| Utc::now().naive_utc()),
        observaciones: input.observaciones.clone(),
        resumen: input.resumen.clone(),
        tipo_alarma_id: tipo.id,
        teleoperador_id: input.teleoperador_id,
    };
    repository::insert_alarma(conn, &alarma)?;
    Ok(alarma)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlarmaUpdate {
    pub estado_alarma: Option<EstadoAlarma>,
    pub fecha_registro: Option<NaiveDateTime>,
    // Nullable columns: an explicit `null` clears, an absent key keeps
    #[serde(default, deserialize_with = "super::key_present")]
    pub observaciones: Option<Option<String>>,
    #[serde(default, deserialize_with = "super::key_present")]
    pub resumen: Option<Option<String>>,
    pub tipo_alarma: Option<TipoAlarmaInput>,
    pub teleoperador_id: Option<Uuid>,
}

pub fn update_alarma_fields(
    conn: &Connection,
    id: &Uuid,
    update: &AlarmaUpdate,
) -> Result<Alarma, DatabaseError> {
    let mut alarma = require(repository::get_alarma(conn, id)?, "alarma", id)?;

    if let Some(estado) = update.estado_alarma {
        alarma.estado_alarma = estado;
    }
    if let Some(fecha) = update.fecha_registro {
        alarma.fecha_registro = fecha;
    }
    if let Some(observaciones) = &update.observaciones {
        alarma.observaciones = observaciones.clone();
    }
    if let Some(resumen) = &update.resumen {
        alarma.resumen = resumen.clone();
    }
    if let Some(tipo) = &update.tipo_alarma {
        alarma.tipo_alarma_id = resolve_tipo_alarma(conn, tipo)?.id;
    }
    if let Some(teleoperador_id) = update.teleoperador_id {
        validate_teleoperador(conn, &teleoperador_id)?;
        alarma.teleoperador_id = teleoperador_id;
    }

    repository::update_alarma(conn, &alarma)?;
    Ok(alarma)
}
