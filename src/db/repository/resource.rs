use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{ClasificacionRecurso, RecursoComunitario, TipoRecurso};

// ── Clasificacion ───────────────────────────────────────────

fn map_clasificacion(row: &rusqlite::Row<'_>) -> Result<ClasificacionRecurso, rusqlite::Error> {
    Ok(ClasificacionRecurso {
        id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
        nombre: row.get(1)?,
    })
}

pub fn insert_clasificacion_recurso(
    conn: &Connection,
    clasificacion: &ClasificacionRecurso,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO clasificaciones_recurso (id, nombre) VALUES (?1, ?2)",
        params![clasificacion.id.to_string(), clasificacion.nombre],
    )?;
    Ok(())
}

pub fn find_clasificacion_recurso(
    conn: &Connection,
    nombre: &str,
) -> Result<Option<ClasificacionRecurso>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, nombre FROM clasificaciones_recurso WHERE nombre = ?1 LIMIT 1",
    )?;

    match stmt.query_row(params![nombre], map_clasificacion) {
        Ok(row) => Ok(Some(row)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_clasificacion_recurso(
    conn: &Connection,
    id: &Uuid,
) -> Result<Option<ClasificacionRecurso>, DatabaseError> {
    let mut stmt =
        conn.prepare("SELECT id, nombre FROM clasificaciones_recurso WHERE id = ?1")?;

    match stmt.query_row(params![id.to_string()], map_clasificacion) {
        Ok(row) => Ok(Some(row)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_clasificaciones_recurso(
    conn: &Connection,
) -> Result<Vec<ClasificacionRecurso>, DatabaseError> {
    let mut stmt =
        conn.prepare("SELECT id, nombre FROM clasificaciones_recurso ORDER BY nombre")?;
    let rows = stmt.query_map([], map_clasificacion)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn update_clasificacion_recurso(
    conn: &Connection,
    clasificacion: &ClasificacionRecurso,
) -> Result<(), DatabaseError> {
    let affected = conn.execute(
        "UPDATE clasificaciones_recurso SET nombre = ?2 WHERE id = ?1",
        params![clasificacion.id.to_string(), clasificacion.nombre],
    )?;
    if affected == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "clasificacion_recurso".into(),
            id: clasificacion.id.to_string(),
        });
    }
    Ok(())
}

pub fn delete_clasificacion_recurso(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let affected = conn.execute(
        "DELETE FROM clasificaciones_recurso WHERE id = ?1",
        params![id.to_string()],
    )?;
    if affected == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "clasificacion_recurso".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

// ── Tipo ────────────────────────────────────────────────────

fn map_tipo_recurso(row: &rusqlite::Row<'_>) -> Result<TipoRecurso, rusqlite::Error> {
    Ok(TipoRecurso {
        id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
        nombre: row.get(1)?,
        clasificacion_id: Uuid::parse_str(&row.get::<_, String>(2)?).unwrap_or_default(),
    })
}

pub fn insert_tipo_recurso(conn: &Connection, tipo: &TipoRecurso) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO tipos_recurso (id, nombre, clasificacion_id) VALUES (?1, ?2, ?3)",
        params![
            tipo.id.to_string(),
            tipo.nombre,
            tipo.clasificacion_id.to_string(),
        ],
    )?;
    Ok(())
}

/// Match key includes the resolved classification reference, so two types
/// with the same name under different classifications stay distinct.
pub fn find_tipo_recurso(
    conn: &Connection,
    nombre: &str,
    clasificacion_id: &Uuid,
) -> Result<Option<TipoRecurso>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, nombre, clasificacion_id FROM tipos_recurso
         WHERE nombre = ?1 AND clasificacion_id = ?2 LIMIT 1",
    )?;

    match stmt.query_row(
        params![nombre, clasificacion_id.to_string()],
        map_tipo_recurso,
    ) {
        Ok(row) => Ok(Some(row)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_tipo_recurso(conn: &Connection, id: &Uuid) -> Result<Option<TipoRecurso>, DatabaseError> {
    let mut stmt =
        conn.prepare("SELECT id, nombre, clasificacion_id FROM tipos_recurso WHERE id = ?1")?;

    match stmt.query_row(params![id.to_string()], map_tipo_recurso) {
        Ok(row) => Ok(Some(row)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_tipos_recurso(conn: &Connection) -> Result<Vec<TipoRecurso>, DatabaseError> {
    let mut stmt =
        conn.prepare("SELECT id, nombre, clasificacion_id FROM tipos_recurso ORDER BY nombre")?;
    let rows = stmt.query_map([], map_tipo_recurso)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn update_tipo_recurso(conn: &Connection, tipo: &TipoRecurso) -> Result<(), DatabaseError> {
    let affected = conn.execute(
        "UPDATE tipos_recurso SET nombre = ?2, clasificacion_id = ?3 WHERE id = ?1",
        params![
            tipo.id.to_string(),
            tipo.nombre,
            tipo.clasificacion_id.to_string(),
        ],
    )?;
    if affected == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "tipo_recurso".into(),
            id: tipo.id.to_string(),
        });
    }
    Ok(())
}

pub fn delete_tipo_recurso(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let affected = conn.execute(
        "DELETE FROM tipos_recurso WHERE id = ?1",
        params![id.to_string()],
    )?;
    if affected == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "tipo_recurso".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

// ── Recurso comunitario ─────────────────────────────────────

fn map_recurso(row: &rusqlite::Row<'_>) -> Result<RecursoComunitario, rusqlite::Error> {
    Ok(RecursoComunitario {
        id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
        nombre: row.get(1)?,
        telefono: row.get(2)?,
        tipo_id: Uuid::parse_str(&row.get::<_, String>(3)?).unwrap_or_default(),
        direccion_id: Uuid::parse_str(&row.get::<_, String>(4)?).unwrap_or_default(),
    })
}

pub fn insert_recurso_comunitario(
    conn: &Connection,
    recurso: &RecursoComunitario,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO recursos_comunitarios (id, nombre, telefono, tipo_id, direccion_id)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            recurso.id.to_string(),
            recurso.nombre,
            recurso.telefono,
            recurso.tipo_id.to_string(),
            recurso.direccion_id.to_string(),
        ],
    )?;
    Ok(())
}

pub fn get_recurso_comunitario(
    conn: &Connection,
    id: &Uuid,
) -> Result<Option<RecursoComunitario>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, nombre, telefono, tipo_id, direccion_id
         FROM recursos_comunitarios WHERE id = ?1",
    )?;

    match stmt.query_row(params![id.to_string()], map_recurso) {
        Ok(row) => Ok(Some(row)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_recursos_comunitarios(
    conn: &Connection,
) -> Result<Vec<RecursoComunitario>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, nombre, telefono, tipo_id, direccion_id
         FROM recursos_comunitarios ORDER BY nombre",
    )?;
    let rows = stmt.query_map([], map_recurso)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn update_recurso_comunitario(
    conn: &Connection,
    recurso: &RecursoComunitario,
) -> Result<(), DatabaseError> {
    let affected = conn.execute(
        "UPDATE recursos_comunitarios
         SET nombre = ?2, telefono = ?3, tipo_id = ?4, direccion_id = ?5
         WHERE id = ?1",
        params![
            recurso.id.to_string(),
            recurso.nombre,
            recurso.telefono,
            recurso.tipo_id.to_string(),
            recurso.direccion_id.to_string(),
        ],
    )?;
    if affected == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "recurso_comunitario".into(),
            id: recurso.id.to_string(),
        });
    }
    Ok(())
}

pub fn delete_recurso_comunitario(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let affected = conn.execute(
        "DELETE FROM recursos_comunitarios WHERE id = ?1",
        params![id.to_string()],
    )?;
    if affected == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "recurso_comunitario".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}
