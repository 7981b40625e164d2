use chrono::{NaiveDateTime, Utc};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::repository;
use crate::db::DatabaseError;
use crate::models::{Grupo, Usuario};

use super::require;

#[derive(Debug, Clone, Serialize)]
pub struct UsuarioView {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_active: bool,
    pub last_login: Option<NaiveDateTime>,
    pub date_joined: NaiveDateTime,
    pub groups: Vec<Grupo>,
    /// From the optional one-to-one ownership extension; null when the
    /// extension row does not exist.
    pub database_id: Option<Uuid>,
    /// Profile image URL maintained by the external attachment system.
    pub imagen: Option<String>,
}

impl UsuarioView {
    pub fn load(conn: &Connection, usuario: &Usuario) -> Result<Self, DatabaseError> {
        Ok(Self {
            id: usuario.id,
            username: usuario.username.clone(),
            first_name: usuario.first_name.clone(),
            last_name: usuario.last_name.clone(),
            email: usuario.email.clone(),
            is_active: usuario.is_active,
            last_login: usuario.last_login,
            date_joined: usuario.date_joined,
            groups: repository::list_grupos_de_usuario(conn, &usuario.id)?,
            database_id: repository::get_usuario_database_id(conn, &usuario.id)?,
            imagen: repository::get_usuario_imagen(conn, &usuario.id)?,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UsuarioInput {
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

pub fn create_usuario(conn: &Connection, input: &UsuarioInput) -> Result<Usuario, DatabaseError> {
    let usuario = Usuario {
        id: Uuid::new_v4(),
        username: input.username.clone(),
        first_name: input.first_name.clone(),
        last_name: input.last_name.clone(),
        email: input.email.clone(),
        is_active: input.is_active,
        last_login: None,
        date_joined: Utc::now().naive_utc(),
    };
    repository::insert_usuario(conn, &usuario)?;
    Ok(usuario)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UsuarioUpdate {
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub is_active: Option<bool>,
}

pub fn update_usuario_fields(
    conn: &Connection,
    id: &Uuid,
    update: &UsuarioUpdate,
) -> Result<Usuario, DatabaseError> {
    let mut usuario = require(repository::get_usuario(conn, id)?, "usuario", id)?;

    if let Some(username) = &update.username {
        usuario.username = username.clone();
    }
    if let Some(first_name) = &update.first_name {
        usuario.first_name = first_name.clone();
    }
    if let Some(last_name) = &update.last_name {
        usuario.last_name = last_name.clone();
    }
    if let Some(email) = &update.email {
        usuario.email = email.clone();
    }
    if let Some(is_active) = update.is_active {
        usuario.is_active = is_active;
    }

    repository::update_usuario(conn, &usuario)?;
    Ok(usuario)
}

// ── Grupo ───────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct GrupoInput {
    pub nombre: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GrupoUpdate {
    pub nombre: Option<String>,
}

pub fn create_grupo(conn: &Connection, input: &GrupoInput) -> Result<Grupo, DatabaseError> {
    let grupo = Grupo {
        id: Uuid::new_v4(),
        nombre: input.nombre.clone(),
    };
    repository::insert_grupo(conn, &grupo)?;
    Ok(grupo)
}

pub fn update_grupo_fields(
    conn: &Connection,
    id: &Uuid,
    update: &GrupoUpdate,
) -> Result<Grupo, DatabaseError> {
    let mut grupo = require(repository::get_grupo(conn, id)?, "grupo", id)?;
    if let Some(nombre) = &update.nombre {
        grupo.nombre = nombre.clone();
    }
    repository::update_grupo(conn, &grupo)?;
    Ok(grupo)
}
