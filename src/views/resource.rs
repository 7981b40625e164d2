use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::repository;
use crate::db::DatabaseError;
use crate::models::{ClasificacionRecurso, Direccion, RecursoComunitario, TipoRecurso};

use super::person::{resolve_direccion, DireccionInput};
use super::require;

// ── Clasificacion de recurso ────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct ClasificacionRecursoInput {
    pub nombre: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClasificacionRecursoUpdate {
    pub nombre: Option<String>,
}

pub fn resolve_clasificacion_recurso(
    conn: &Connection,
    input: &ClasificacionRecursoInput,
) -> Result<ClasificacionRecurso, DatabaseError> {
    if let Some(existing) = repository::find_clasificacion_recurso(conn, &input.nombre)? {
        return Ok(existing);
    }
    let clasificacion = ClasificacionRecurso {
        id: Uuid::new_v4(),
        nombre: input.nombre.clone(),
    };
    repository::insert_clasificacion_recurso(conn, &clasificacion)?;
    Ok(clasificacion)
}

pub fn update_clasificacion_recurso_fields(
    conn: &Connection,
    id: &Uuid,
    update: &ClasificacionRecursoUpdate,
) -> Result<ClasificacionRecurso, DatabaseError> {
    let mut clasificacion = require(
        repository::get_clasificacion_recurso(conn, id)?,
        "clasificacion_recurso",
        id,
    )?;
    if let Some(nombre) = &update.nombre {
        clasificacion.nombre = nombre.clone();
    }
    repository::update_clasificacion_recurso(conn, &clasificacion)?;
    Ok(clasificacion)
}

// ── Tipo de recurso ─────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct TipoRecursoView {
    pub id: Uuid,
    pub nombre: String,
    pub clasificacion: ClasificacionRecurso,
}

impl TipoRecursoView {
    pub fn load(conn: &Connection, tipo: &TipoRecurso) -> Result<Self, DatabaseError> {
        let clasificacion = require(
            repository::get_clasificacion_recurso(conn, &tipo.clasificacion_id)?,
            "clasificacion_recurso",
            &tipo.clasificacion_id,
        )?;
        Ok(Self {
            id: tipo.id,
            nombre: tipo.nombre.clone(),
            clasificacion,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TipoRecursoInput {
    pub nombre: String,
    pub clasificacion: ClasificacionRecursoInput,
}

pub fn resolve_tipo_recurso(
    conn: &Connection,
    input: &TipoRecursoInput,
) -> Result<TipoRecurso, DatabaseError> {
    let clasificacion = resolve_clasificacion_recurso(conn, &input.clasificacion)?;
    if let Some(existing) = repository::find_tipo_recurso(conn, &input.nombre, &clasificacion.id)? {
        return Ok(existing);
    }
    let tipo = TipoRecurso {
        id: Uuid::new_v4(),
        nombre: input.nombre.clone(),
        clasificacion_id: clasificacion.id,
    };
    repository::insert_tipo_recurso(conn, &tipo)?;
    Ok(tipo)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TipoRecursoUpdate {
    pub nombre: Option<String>,
    pub clasificacion: Option<ClasificacionRecursoInput>,
}

pub fn update_tipo_recurso_fields(
    conn: &Connection,
    id: &Uuid,
    update: &TipoRecursoUpdate,
) -> Result<TipoRecurso, DatabaseError> {
    let mut tipo = require(repository::get_tipo_recurso(conn, id)?, "tipo_recurso", id)?;
    if let Some(nombre) = &update.nombre {
        tipo.nombre = nombre.clone();
    }
    if let Some(clasificacion) = &update.clasificacion {
        tipo.clasificacion_id = resolve_clasificacion_recurso(conn, clasificacion)?.id;
    }
    repository::update_tipo_recurso(conn, &tipo)?;
    Ok(tipo)
}

// ── Recurso comunitario ─────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct RecursoComunitarioView {
    pub id: Uuid,
    pub nombre: String,
    pub telefono: String,
    pub tipo: TipoRecursoView,
    pub direccion: Direccion,
}

impl RecursoComunitarioView {
    pub fn load(conn: &Connection, recurso: &RecursoComunitario) -> Result<Self, DatabaseError> {
        let tipo = require(
            repository::get_tipo_recurso(conn, &recurso.tipo_id)?,
            "tipo_recurso",
            &recurso.tipo_id,
        )?;
        let direccion = require(
            repository::get_direccion(conn, &recurso.direccion_id)?,
            "direccion",
            &recurso.direccion_id,
        )?;
        Ok(Self {
            id: recurso.id,
            nombre: recurso.nombre.clone(),
            telefono: recurso.telefono.clone(),
            tipo: TipoRecursoView::load(conn, &tipo)?,
            direccion,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecursoComunitarioInput {
    pub nombre: String,
    pub telefono: String,
    pub tipo: TipoRecursoInput,
    pub direccion: DireccionInput,
}

pub fn create_recurso_comunitario(
    conn: &Connection,
    input: &RecursoComunitarioInput,
) -> Result<RecursoComunitario, DatabaseError> {
    let tipo = resolve_tipo_recurso(conn, &input.tipo)?;
    let direccion = resolve_direccion(conn, &input.direccion)?;
    let recurso = RecursoComunitario {
        id: Uuid::new_v4(),
        nombre: input.nombre.clone(),
        telefono: input.telefono.clone(),
        tipo_id: tipo.id,
        direccion_id: direccion.id,
    };
    repository::insert_recurso_comunitario(conn, &recurso)?;
    Ok(recurso)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecursoComunitarioUpdate {
    pub nombre: Option<String>,
    pub telefono: Option<String>,
    pub tipo: Option<TipoRecursoInput>,
    pub direccion: Option<DireccionInput>,
}

pub fn update_recurso_comunitario_fields(
    conn: &Connection,
    id: &Uuid,
    update: &RecursoComunitarioUpdate,
) -> Result<RecursoComunitario, DatabaseError> {
    let mut recurso = require(
        repository::get_recurso_comunitario(conn, id)?,
        "recurso_comunitario",
        id,
    )?;
    if let Some(nombre) = &update.nombre {
        recurso.nombre = nombre.clone();
    }
    if let Some(telefono) = &update.telefono {
        recurso.telefono = telefono.clone();
    }
    if let Some(tipo) = &update.tipo {
        recurso.tipo_id = resolve_tipo_recurso(conn, tipo)?.id;
    }
    if let Some(direccion) = &update.direccion {
        recurso.direccion_id = resolve_direccion(conn, direccion)?.id;
    }
    repository::update_recurso_comunitario(conn, &recurso)?;
    Ok(recurso)
}
