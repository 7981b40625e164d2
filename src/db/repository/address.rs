use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::Direccion;

fn map_direccion(row: &rusqlite::Row<'_>) -> Result<Direccion, rusqlite::Error> {
    Ok(Direccion {
        id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
        localidad: row.get(1)?,
        provincia: row.get(2)?,
        direccion: row.get(3)?,
        codigo_postal: row.get(4)?,
    })
}

pub fn insert_direccion(conn: &Connection, dir: &Direccion) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO direcciones (id, localidad, provincia, direccion, codigo_postal)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            dir.id.to_string(),
            dir.localidad,
            dir.provincia,
            dir.direccion,
            dir.codigo_postal,
        ],
    )?;
    Ok(())
}

/// Pure exact-match lookup over the full field set. Returns the first
/// match; callers compose this with `insert_direccion` for get-or-create.
pub fn find_direccion(
    conn: &Connection,
    localidad: &str,
    provincia: &str,
    direccion: &str,
    codigo_postal: &str,
) -> Result<Option<Direccion>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, localidad, provincia, direccion, codigo_postal
         FROM direcciones
         WHERE localidad = ?1 AND provincia = ?2 AND direccion = ?3 AND codigo_postal = ?4
         LIMIT 1",
    )?;

    match stmt.query_row(
        params![localidad, provincia, direccion, codigo_postal],
        map_direccion,
    ) {
        Ok(dir) => Ok(Some(dir)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_direccion(conn: &Connection, id: &Uuid) -> Result<Option<Direccion>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, localidad, provincia, direccion, codigo_postal
         FROM direcciones WHERE id = ?1",
    )?;

    match stmt.query_row(params![id.to_string()], map_direccion) {
        Ok(dir) => Ok(Some(dir)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_direcciones(conn: &Connection) -> Result<Vec<Direccion>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, localidad, provincia, direccion, codigo_postal
         FROM direcciones ORDER BY provincia, localidad",
    )?;

    let rows = stmt.query_map([], map_direccion)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn update_direccion(conn: &Connection, dir: &Direccion) -> Result<(), DatabaseError> {
    let affected = conn.execute(
        "UPDATE direcciones
         SET localidad = ?2, provincia = ?3, direccion = ?4, codigo_postal = ?5
         WHERE id = ?1",
        params![
            dir.id.to_string(),
            dir.localidad,
            dir.provincia,
            dir.direccion,
            dir.codigo_postal,
        ],
    )?;
    if affected == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "direccion".into(),
            id: dir.id.to_string(),
        });
    }
    Ok(())
}

pub fn delete_direccion(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let affected = conn.execute(
        "DELETE FROM direcciones WHERE id = ?1",
        params![id.to_string()],
    )?;
    if affected == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "direccion".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}
