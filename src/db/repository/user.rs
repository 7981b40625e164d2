use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{Grupo, Usuario};

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const USUARIO_COLUMNS: &str =
    "id, username, first_name, last_name, email, is_active, last_login, date_joined";

fn map_usuario(row: &rusqlite::Row<'_>) -> Result<Usuario, rusqlite::Error> {
    Ok(Usuario {
        id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
        username: row.get(1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        email: row.get(4)?,
        is_active: row.get::<_, i32>(5)? != 0,
        last_login: row
            .get::<_, Option<String>>(6)?
            .and_then(|d| NaiveDateTime::parse_from_str(&d, DATETIME_FORMAT).ok()),
        date_joined: NaiveDateTime::parse_from_str(&row.get::<_, String>(7)?, DATETIME_FORMAT)
            .unwrap_or_default(),
    })
}

pub fn insert_usuario(conn: &Connection, usuario: &Usuario) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO usuarios (id, username, first_name, last_name, email, is_active,
         last_login, date_joined)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            usuario.id.to_string(),
            usuario.username,
            usuario.first_name,
            usuario.last_name,
            usuario.email,
            usuario.is_active as i32,
            usuario
                .last_login
                .map(|d| d.format(DATETIME_FORMAT).to_string()),
            usuario.date_joined.format(DATETIME_FORMAT).to_string(),
        ],
    )?;
    Ok(())
}

pub fn get_usuario(conn: &Connection, id: &Uuid) -> Result<Option<Usuario>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {USUARIO_COLUMNS} FROM usuarios WHERE id = ?1"
    ))?;

    match stmt.query_row(params![id.to_string()], map_usuario) {
        Ok(row) => Ok(Some(row)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_usuarios(conn: &Connection) -> Result<Vec<Usuario>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {USUARIO_COLUMNS} FROM usuarios ORDER BY username"
    ))?;
    let rows = stmt.query_map([], map_usuario)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn update_usuario(conn: &Connection, usuario: &Usuario) -> Result<(), DatabaseError> {
    let affected = conn.execute(
        "UPDATE usuarios
         SET username = ?2, first_name = ?3, last_name = ?4, email = ?5,
             is_active = ?6, last_login = ?7, date_joined = ?8
         WHERE id = ?1",
        params![
            usuario.id.to_string(),
            usuario.username,
            usuario.first_name,
            usuario.last_name,
            usuario.email,
            usuario.is_active as i32,
            usuario
                .last_login
                .map(|d| d.format(DATETIME_FORMAT).to_string()),
            usuario.date_joined.format(DATETIME_FORMAT).to_string(),
        ],
    )?;
    if affected == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "usuario".into(),
            id: usuario.id.to_string(),
        });
    }
    Ok(())
}

pub fn delete_usuario(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let affected = conn.execute(
        "DELETE FROM usuarios WHERE id = ?1",
        params![id.to_string()],
    )?;
    if affected == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "usuario".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

// ── Grupos ──────────────────────────────────────────────────

fn map_grupo(row: &rusqlite::Row<'_>) -> Result<Grupo, rusqlite::Error> {
    Ok(Grupo {
        id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
        nombre: row.get(1)?,
    })
}

pub fn insert_grupo(conn: &Connection, grupo: &Grupo) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO grupos (id, nombre) VALUES (?1, ?2)",
        params![grupo.id.to_string(), grupo.nombre],
    )?;
    Ok(())
}

pub fn get_grupo(conn: &Connection, id: &Uuid) -> Result<Option<Grupo>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT id, nombre FROM grupos WHERE id = ?1")?;

    match stmt.query_row(params![id.to_string()], map_grupo) {
        Ok(row) => Ok(Some(row)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_grupos(conn: &Connection) -> Result<Vec<Grupo>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT id, nombre FROM grupos ORDER BY nombre")?;
    let rows = stmt.query_map([], map_grupo)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn update_grupo(conn: &Connection, grupo: &Grupo) -> Result<(), DatabaseError> {
    let affected = conn.execute(
        "UPDATE grupos SET nombre = ?2 WHERE id = ?1",
        params![grupo.id.to_string(), grupo.nombre],
    )?;
    if affected == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "grupo".into(),
            id: grupo.id.to_string(),
        });
    }
    Ok(())
}

pub fn delete_grupo(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let affected = conn.execute("DELETE FROM grupos WHERE id = ?1", params![id.to_string()])?;
    if affected == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "grupo".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

// ── Membership + extension records ──────────────────────────
//
// These tables belong to the external identity subsystem; the HTTP
// surface only reads them (through `UsuarioView`). The mutators below
// exist to seed them — from migration scripts and test fixtures — and
// are not wired to any route.

pub fn add_usuario_to_grupo(
    conn: &Connection,
    usuario_id: &Uuid,
    grupo_id: &Uuid,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT OR IGNORE INTO usuario_grupos (usuario_id, grupo_id) VALUES (?1, ?2)",
        params![usuario_id.to_string(), grupo_id.to_string()],
    )?;
    Ok(())
}

pub fn remove_usuario_from_grupo(
    conn: &Connection,
    usuario_id: &Uuid,
    grupo_id: &Uuid,
) -> Result<(), DatabaseError> {
    conn.execute(
        "DELETE FROM usuario_grupos WHERE usuario_id = ?1 AND grupo_id = ?2",
        params![usuario_id.to_string(), grupo_id.to_string()],
    )?;
    Ok(())
}

pub fn list_grupos_de_usuario(
    conn: &Connection,
    usuario_id: &Uuid,
) -> Result<Vec<Grupo>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT g.id, g.nombre FROM grupos g
         JOIN usuario_grupos ug ON ug.grupo_id = g.id
         WHERE ug.usuario_id = ?1 ORDER BY g.nombre",
    )?;
    let rows = stmt.query_map(params![usuario_id.to_string()], map_grupo)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

/// Optional one-to-one ownership extension; None is a valid state, not
/// an error.
pub fn get_usuario_database_id(
    conn: &Connection,
    usuario_id: &Uuid,
) -> Result<Option<Uuid>, DatabaseError> {
    let result = conn.query_row(
        "SELECT database_id FROM usuario_databases WHERE usuario_id = ?1",
        params![usuario_id.to_string()],
        |row| row.get::<_, String>(0),
    );

    match result {
        Ok(s) => Ok(Uuid::parse_str(&s).ok()),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn set_usuario_database_id(
    conn: &Connection,
    usuario_id: &Uuid,
    database_id: &Uuid,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO usuario_databases (usuario_id, database_id) VALUES (?1, ?2)
         ON CONFLICT(usuario_id) DO UPDATE SET database_id = excluded.database_id",
        params![usuario_id.to_string(), database_id.to_string()],
    )?;
    Ok(())
}

/// Profile image URL maintained by the external attachment subsystem;
/// read-only here.
pub fn get_usuario_imagen(
    conn: &Connection,
    usuario_id: &Uuid,
) -> Result<Option<String>, DatabaseError> {
    let result = conn.query_row(
        "SELECT url FROM usuario_imagenes WHERE usuario_id = ?1",
        params![usuario_id.to_string()],
        |row| row.get::<_, String>(0),
    );

    match result {
        Ok(url) => Ok(Some(url)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
