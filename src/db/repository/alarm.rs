use std::str::FromStr;

use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::EstadoAlarma;
use crate::models::{Alarma, ClasificacionAlarma, TipoAlarma};

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ── Clasificacion ───────────────────────────────────────────

fn map_clasificacion_alarma(
    row: &rusqlite::Row<'_>,
) -> Result<ClasificacionAlarma, rusqlite::Error> {
    Ok(ClasificacionAlarma {
        id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
        nombre: row.get(1)?,
        codigo: row.get(2)?,
    })
}

pub fn insert_clasificacion_alarma(
    conn: &Connection,
    clasificacion: &ClasificacionAlarma,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO clasificaciones_alarma (id, nombre, codigo) VALUES (?1, ?2, ?3)",
        params![
            clasificacion.id.to_string(),
            clasificacion.nombre,
            clasificacion.codigo,
        ],
    )?;
    Ok(())
}

pub fn find_clasificacion_alarma(
    conn: &Connection,
    nombre: &str,
    codigo: &str,
) -> Result<Option<ClasificacionAlarma>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, nombre, codigo FROM clasificaciones_alarma
         WHERE nombre = ?1 AND codigo = ?2 LIMIT 1",
    )?;

    match stmt.query_row(params![nombre, codigo], map_clasificacion_alarma) {
        Ok(row) => Ok(Some(row)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_clasificacion_alarma(
    conn: &Connection,
    id: &Uuid,
) -> Result<Option<ClasificacionAlarma>, DatabaseError> {
    let mut stmt =
        conn.prepare("SELECT id, nombre, codigo FROM clasificaciones_alarma WHERE id = ?1")?;

    match stmt.query_row(params![id.to_string()], map_clasificacion_alarma) {
        Ok(row) => Ok(Some(row)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_clasificaciones_alarma(
    conn: &Connection,
) -> Result<Vec<ClasificacionAlarma>, DatabaseError> {
    let mut stmt =
        conn.prepare("SELECT id, nombre, codigo FROM clasificaciones_alarma ORDER BY codigo")?;
    let rows = stmt.query_map([], map_clasificacion_alarma)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn update_clasificacion_alarma(
    conn: &Connection,
    clasificacion: &ClasificacionAlarma,
) -> Result<(), DatabaseError> {
    let affected = conn.execute(
        "UPDATE clasificaciones_alarma SET nombre = ?2, codigo = ?3 WHERE id = ?1",
        params![
            clasificacion.id.to_string(),
            clasificacion.nombre,
            clasificacion.codigo,
        ],
    )?;
    if affected == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "clasificacion_alarma".into(),
            id: clasificacion.id.to_string(),
        });
    }
    Ok(())
}

pub fn delete_clasificacion_alarma(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let affected = conn.execute(
        "DELETE FROM clasificaciones_alarma WHERE id = ?1",
        params![id.to_string()],
    )?;
    if affected == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "clasificacion_alarma".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

// ── Tipo ────────────────────────────────────────────────────

fn map_tipo_alarma(row: &rusqlite::Row<'_>) -> Result<TipoAlarma, rusqlite::Error> {
    Ok(TipoAlarma {
        id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
        nombre: row.get(1)?,
        codigo: row.get(2)?,
        es_dispositivo: row.get::<_, i32>(3)? != 0,
        clasificacion_id: Uuid::parse_str(&row.get::<_, String>(4)?).unwrap_or_default(),
    })
}

pub fn insert_tipo_alarma(conn: &Connection, tipo: &TipoAlarma) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO tipos_alarma (id, nombre, codigo, es_dispositivo, clasificacion_id)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            tipo.id.to_string(),
            tipo.nombre,
            tipo.codigo,
            tipo.es_dispositivo as i32,
            tipo.clasificacion_id.to_string(),
        ],
    )?;
    Ok(())
}

pub fn find_tipo_alarma(
    conn: &Connection,
    nombre: &str,
    codigo: &str,
    es_dispositivo: bool,
    clasificacion_id: &Uuid,
) -> Result<Option<TipoAlarma>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, nombre, codigo, es_dispositivo, clasificacion_id FROM tipos_alarma
         WHERE nombre = ?1 AND codigo = ?2 AND es_dispositivo = ?3 AND clasificacion_id = ?4
         LIMIT 1",
    )?;

    match stmt.query_row(
        params![
            nombre,
            codigo,
            es_dispositivo as i32,
            clasificacion_id.to_string()
        ],
        map_tipo_alarma,
    ) {
        Ok(row) => Ok(Some(row)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_tipo_alarma(conn: &Connection, id: &Uuid) -> Result<Option<TipoAlarma>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, nombre, codigo, es_dispositivo, clasificacion_id
         FROM tipos_alarma WHERE id = ?1",
    )?;

    match stmt.query_row(params![id.to_string()], map_tipo_alarma) {
        Ok(row) => Ok(Some(row)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_tipos_alarma(conn: &Connection) -> Result<Vec<TipoAlarma>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, nombre, codigo, es_dispositivo, clasificacion_id
         FROM tipos_alarma ORDER BY codigo",
    )?;
    let rows = stmt.query_map([], map_tipo_alarma)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn update_tipo_alarma(conn: &Connection, tipo: &TipoAlarma) -> Result<(), DatabaseError> {
    let affected = conn.execute(
        "UPDATE tipos_alarma
         SET nombre = ?2, codigo = ?3, es_dispositivo = ?4, clasificacion_id = ?5
         WHERE id = ?1",
        params![
            tipo.id.to_string(),
            tipo.nombre,
            tipo.codigo,
            tipo.es_dispositivo as i32,
            tipo.clasificacion_id.to_string(),
        ],
    )?;
    if affected == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "tipo_alarma".into(),
            id: tipo.id.to_string(),
        });
    }
    Ok(())
}

pub fn delete_tipo_alarma(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let affected = conn.execute(
        "DELETE FROM tipos_alarma WHERE id = ?1",
        params![id.to_string()],
    )?;
    if affected == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "tipo_alarma".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

// ── Alarma ──────────────────────────────────────────────────

struct AlarmaRow {
    id: String,
    estado_alarma: String,
    fecha_registro: String,
    observaciones: Option<String>,
    resumen: Option<String>,
    tipo_alarma_id: String,
    teleoperador_id: String,
}

fn alarma_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<AlarmaRow, rusqlite::Error> {
    Ok(AlarmaRow {
        id: row.get(0)?,
        estado_alarma: row.get(1)?,
        fecha_registro: row.get(2)?,
        observaciones: row.get(3)?,
        resumen: row.get(4)?,
        tipo_alarma_id: row.get(5)?,
        teleoperador_id: row.get(6)?,
    })
}

fn alarma_from_row(row: AlarmaRow) -> Result<Alarma, DatabaseError> {
    Ok(Alarma {
        id: Uuid::parse_str(&row.id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        estado_alarma: EstadoAlarma::from_str(&row.estado_alarma)?,
        fecha_registro: NaiveDateTime::parse_from_str(&row.fecha_registro, DATETIME_FORMAT)
            .unwrap_or_default(),
        observaciones: row.observaciones,
        resumen: row.resumen,
        tipo_alarma_id: Uuid::parse_str(&row.tipo_alarma_id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        teleoperador_id: Uuid::parse_str(&row.teleoperador_id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
    })
}

const ALARMA_COLUMNS: &str = "id, estado_alarma, fecha_registro, observaciones, resumen, \
     tipo_alarma_id, teleoperador_id";

pub fn insert_alarma(conn: &Connection, alarma: &Alarma) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO alarmas (id, estado_alarma, fecha_registro, observaciones, resumen,
         tipo_alarma_id, teleoperador_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            alarma.id.to_string(),
            alarma.estado_alarma.as_str(),
            alarma.fecha_registro.format(DATETIME_FORMAT).to_string(),
            alarma.observaciones,
            alarma.resumen,
            alarma.tipo_alarma_id.to_string(),
            alarma.teleoperador_id.to_string(),
        ],
    )?;
    Ok(())
}

pub fn get_alarma(conn: &Connection, id: &Uuid) -> Result<Option<Alarma>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ALARMA_COLUMNS} FROM alarmas WHERE id = ?1"
    ))?;

    let result = stmt.query_row(params![id.to_string()], |row| {
        Ok(alarma_row_from_rusqlite(row))
    });

    match result {
        Ok(row) => Ok(Some(alarma_from_row(row?)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Newest first; operators work the most recent events.
pub fn list_alarmas(conn: &Connection) -> Result<Vec<Alarma>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ALARMA_COLUMNS} FROM alarmas ORDER BY fecha_registro DESC"
    ))?;

    let rows = stmt.query_map([], |row| Ok(alarma_row_from_rusqlite(row)))?;

    let mut alarmas = Vec::new();
    for row in rows {
        alarmas.push(alarma_from_row(row??)?);
    }
    Ok(alarmas)
}

pub fn update_alarma(conn: &Connection, alarma: &Alarma) -> Result<(), DatabaseError> {
    let affected = conn.execute(
        "UPDATE alarmas
         SET estado_alarma = ?2, fecha_registro = ?3, observaciones = ?4, resumen = ?5,
             tipo_alarma_id = ?6, teleoperador_id = ?7
         WHERE id = ?1",
        params![
            alarma.id.to_string(),
            alarma.estado_alarma.as_str(),
            alarma.fecha_registro.format(DATETIME_FORMAT).to_string(),
            alarma.observaciones,
            alarma.resumen,
            alarma.tipo_alarma_id.to_string(),
            alarma.teleoperador_id.to_string(),
        ],
    )?;
    if affected == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "alarma".into(),
            id: alarma.id.to_string(),
        });
    }
    Ok(())
}

pub fn delete_alarma(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let affected = conn.execute("DELETE FROM alarmas WHERE id = ?1", params![id.to_string()])?;
    if affected == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "alarma".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}
