use std::str::FromStr;

use chrono::NaiveDate;
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::Sexo;
use crate::models::Persona;

// Internal row type, parsed into Persona after the statement is done
struct PersonaRow {
    id: String,
    nombre: String,
    apellidos: String,
    dni: String,
    fecha_nacimiento: String,
    sexo: String,
    telefono_fijo: Option<String>,
    telefono_movil: Option<String>,
    direccion_id: String,
}

fn persona_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<PersonaRow, rusqlite::Error> {
    Ok(PersonaRow {
        id: row.get(0)?,
        nombre: row.get(1)?,
        apellidos: row.get(2)?,
        dni: row.get(3)?,
        fecha_nacimiento: row.get(4)?,
        sexo: row.get(5)?,
        telefono_fijo: row.get(6)?,
        telefono_movil: row.get(7)?,
        direccion_id: row.get(8)?,
    })
}

fn persona_from_row(row: PersonaRow) -> Result<Persona, DatabaseError> {
    Ok(Persona {
        id: Uuid::parse_str(&row.id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        nombre: row.nombre,
        apellidos: row.apellidos,
        dni: row.dni,
        fecha_nacimiento: NaiveDate::parse_from_str(&row.fecha_nacimiento, "%Y-%m-%d")
            .unwrap_or_default(),
        sexo: Sexo::from_str(&row.sexo)?,
        telefono_fijo: row.telefono_fijo,
        telefono_movil: row.telefono_movil,
        direccion_id: Uuid::parse_str(&row.direccion_id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
    })
}

const PERSONA_COLUMNS: &str = "id, nombre, apellidos, dni, fecha_nacimiento, sexo, \
     telefono_fijo, telefono_movil, direccion_id";

pub fn insert_persona(conn: &Connection, persona: &Persona) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO personas (id, nombre, apellidos, dni, fecha_nacimiento, sexo,
         telefono_fijo, telefono_movil, direccion_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            persona.id.to_string(),
            persona.nombre,
            persona.apellidos,
            persona.dni,
            persona.fecha_nacimiento.to_string(),
            persona.sexo.as_str(),
            persona.telefono_fijo,
            persona.telefono_movil,
            persona.direccion_id.to_string(),
        ],
    )?;
    Ok(())
}

/// Exact-match lookup over the full field set (nullable phones compare
/// NULL-safely). Used by the write-resolution cascade when a persona is
/// nested inside a paciente payload.
pub fn find_persona(
    conn: &Connection,
    persona: &Persona,
) -> Result<Option<Persona>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PERSONA_COLUMNS} FROM personas
         WHERE nombre = ?1 AND apellidos = ?2 AND dni = ?3 AND fecha_nacimiento = ?4
           AND sexo = ?5 AND telefono_fijo IS ?6 AND telefono_movil IS ?7
           AND direccion_id = ?8
         LIMIT 1",
    ))?;

    let result = stmt.query_row(
        params![
            persona.nombre,
            persona.apellidos,
            persona.dni,
            persona.fecha_nacimiento.to_string(),
            persona.sexo.as_str(),
            persona.telefono_fijo,
            persona.telefono_movil,
            persona.direccion_id.to_string(),
        ],
        |row| Ok(persona_row_from_rusqlite(row)),
    );

    match result {
        Ok(row) => Ok(Some(persona_from_row(row?)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_persona(conn: &Connection, id: &Uuid) -> Result<Option<Persona>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PERSONA_COLUMNS} FROM personas WHERE id = ?1"
    ))?;

    let result = stmt.query_row(params![id.to_string()], |row| {
        Ok(persona_row_from_rusqlite(row))
    });

    match result {
        Ok(row) => Ok(Some(persona_from_row(row?)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_personas(conn: &Connection) -> Result<Vec<Persona>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PERSONA_COLUMNS} FROM personas ORDER BY apellidos, nombre"
    ))?;

    let rows = stmt.query_map([], |row| Ok(persona_row_from_rusqlite(row)))?;

    let mut personas = Vec::new();
    for row in rows {
        personas.push(persona_from_row(row??)?);
    }
    Ok(personas)
}

pub fn update_persona(conn: &Connection, persona: &Persona) -> Result<(), DatabaseError> {
    let affected = conn.execute(
        "UPDATE personas
         SET nombre = ?2, apellidos = ?3, dni = ?4, fecha_nacimiento = ?5, sexo = ?6,
             telefono_fijo = ?7, telefono_movil = ?8, direccion_id = ?9
         WHERE id = ?1",
        params![
            persona.id.to_string(),
            persona.nombre,
            persona.apellidos,
            persona.dni,
            persona.fecha_nacimiento.to_string(),
            persona.sexo.as_str(),
            persona.telefono_fijo,
            persona.telefono_movil,
            persona.direccion_id.to_string(),
        ],
    )?;
    if affected == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "persona".into(),
            id: persona.id.to_string(),
        });
    }
    Ok(())
}

pub fn delete_persona(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let affected = conn.execute(
        "DELETE FROM personas WHERE id = ?1",
        params![id.to_string()],
    )?;
    if affected == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "persona".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}
