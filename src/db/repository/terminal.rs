use chrono::NaiveDate;
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::Terminal;

const TERMINAL_COLUMNS: &str = "id, numero_terminal, modo_acceso_vivienda, \
     barreras_arquitectonicas, modelo_terminal, fecha_tipo_situacion, \
     titular_id, tipo_vivienda_id, tipo_situacion_id";

fn map_terminal(row: &rusqlite::Row<'_>) -> Result<Terminal, rusqlite::Error> {
    Ok(Terminal {
        id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
        numero_terminal: row.get(1)?,
        modo_acceso_vivienda: row.get(2)?,
        barreras_arquitectonicas: row.get::<_, i32>(3)? != 0,
        modelo_terminal: row.get(4)?,
        fecha_tipo_situacion: row
            .get::<_, Option<String>>(5)?
            .and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
        titular_id: row
            .get::<_, Option<String>>(6)?
            .and_then(|s| Uuid::parse_str(&s).ok()),
        tipo_vivienda_id: Uuid::parse_str(&row.get::<_, String>(7)?).unwrap_or_default(),
        tipo_situacion_id: Uuid::parse_str(&row.get::<_, String>(8)?).unwrap_or_default(),
    })
}

pub fn insert_terminal(conn: &Connection, terminal: &Terminal) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO terminales (id, numero_terminal, modo_acceso_vivienda,
         barreras_arquitectonicas, modelo_terminal, fecha_tipo_situacion,
         titular_id, tipo_vivienda_id, tipo_situacion_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            terminal.id.to_string(),
            terminal.numero_terminal,
            terminal.modo_acceso_vivienda,
            terminal.barreras_arquitectonicas as i32,
            terminal.modelo_terminal,
            terminal.fecha_tipo_situacion.map(|d| d.to_string()),
            terminal.titular_id.map(|id| id.to_string()),
            terminal.tipo_vivienda_id.to_string(),
            terminal.tipo_situacion_id.to_string(),
        ],
    )?;
    Ok(())
}

/// Exact-match lookup over the full field set including the resolved
/// lookup references. Used when a terminal is nested in a paciente write.
pub fn find_terminal(
    conn: &Connection,
    terminal: &Terminal,
) -> Result<Option<Terminal>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TERMINAL_COLUMNS} FROM terminales
         WHERE numero_terminal = ?1 AND modo_acceso_vivienda = ?2
           AND barreras_arquitectonicas = ?3 AND modelo_terminal = ?4
           AND fecha_tipo_situacion IS ?5 AND titular_id IS ?6
           AND tipo_vivienda_id = ?7 AND tipo_situacion_id = ?8
         LIMIT 1",
    ))?;

    match stmt.query_row(
        params![
            terminal.numero_terminal,
            terminal.modo_acceso_vivienda,
            terminal.barreras_arquitectonicas as i32,
            terminal.modelo_terminal,
            terminal.fecha_tipo_situacion.map(|d| d.to_string()),
            terminal.titular_id.map(|id| id.to_string()),
            terminal.tipo_vivienda_id.to_string(),
            terminal.tipo_situacion_id.to_string(),
        ],
        map_terminal,
    ) {
        Ok(row) => Ok(Some(row)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_terminal(conn: &Connection, id: &Uuid) -> Result<Option<Terminal>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TERMINAL_COLUMNS} FROM terminales WHERE id = ?1"
    ))?;

    match stmt.query_row(params![id.to_string()], map_terminal) {
        Ok(row) => Ok(Some(row)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_terminales(conn: &Connection) -> Result<Vec<Terminal>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TERMINAL_COLUMNS} FROM terminales ORDER BY numero_terminal"
    ))?;
    let rows = stmt.query_map([], map_terminal)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn update_terminal(conn: &Connection, terminal: &Terminal) -> Result<(), DatabaseError> {
    let affected = conn.execute(
        "UPDATE terminales
         SET numero_terminal = ?2, modo_acceso_vivienda = ?3,
             barreras_arquitectonicas = ?4, modelo_terminal = ?5,
             fecha_tipo_situacion = ?6, titular_id = ?7,
             tipo_vivienda_id = ?8, tipo_situacion_id = ?9
         WHERE id = ?1",
        params![
            terminal.id.to_string(),
            terminal.numero_terminal,
            terminal.modo_acceso_vivienda,
            terminal.barreras_arquitectonicas as i32,
            terminal.modelo_terminal,
            terminal.fecha_tipo_situacion.map(|d| d.to_string()),
            terminal.titular_id.map(|id| id.to_string()),
            terminal.tipo_vivienda_id.to_string(),
            terminal.tipo_situacion_id.to_string(),
        ],
    )?;
    if affected == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "terminal".into(),
            id: terminal.id.to_string(),
        });
    }
    Ok(())
}

pub fn delete_terminal(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let affected = conn.execute(
        "DELETE FROM terminales WHERE id = ?1",
        params![id.to_string()],
    )?;
    if affected == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "terminal".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}
