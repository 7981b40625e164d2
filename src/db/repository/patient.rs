use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{Paciente, RelacionPaciente};

// ── Paciente ────────────────────────────────────────────────

const PACIENTE_COLUMNS: &str = "id, tiene_ucr, numero_expediente, numero_seguridad_social, \
     prestacion_otros_servicios_sociales, observaciones_medicas, \
     intereses_y_actividades, terminal_id, persona_id, modalidad_id";

fn map_paciente(row: &rusqlite::Row<'_>) -> Result<Paciente, rusqlite::Error> {
    Ok(Paciente {
        id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
        tiene_ucr: row.get::<_, i32>(1)? != 0,
        numero_expediente: row.get(2)?,
        numero_seguridad_social: row.get(3)?,
        prestacion_otros_servicios_sociales: row.get::<_, i32>(4)? != 0,
        observaciones_medicas: row.get(5)?,
        intereses_y_actividades: row.get(6)?,
        terminal_id: Uuid::parse_str(&row.get::<_, String>(7)?).unwrap_or_default(),
        persona_id: Uuid::parse_str(&row.get::<_, String>(8)?).unwrap_or_default(),
        modalidad_id: Uuid::parse_str(&row.get::<_, String>(9)?).unwrap_or_default(),
    })
}

pub fn insert_paciente(conn: &Connection, paciente: &Paciente) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO pacientes (id, tiene_ucr, numero_expediente, numero_seguridad_social,
         prestacion_otros_servicios_sociales, observaciones_medicas,
         intereses_y_actividades, terminal_id, persona_id, modalidad_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            paciente.id.to_string(),
            paciente.tiene_ucr as i32,
            paciente.numero_expediente,
            paciente.numero_seguridad_social,
            paciente.prestacion_otros_servicios_sociales as i32,
            paciente.observaciones_medicas,
            paciente.intereses_y_actividades,
            paciente.terminal_id.to_string(),
            paciente.persona_id.to_string(),
            paciente.modalidad_id.to_string(),
        ],
    )?;
    Ok(())
}

pub fn get_paciente(conn: &Connection, id: &Uuid) -> Result<Option<Paciente>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PACIENTE_COLUMNS} FROM pacientes WHERE id = ?1"
    ))?;

    match stmt.query_row(params![id.to_string()], map_paciente) {
        Ok(row) => Ok(Some(row)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_pacientes(conn: &Connection) -> Result<Vec<Paciente>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PACIENTE_COLUMNS} FROM pacientes ORDER BY numero_expediente"
    ))?;
    let rows = stmt.query_map([], map_paciente)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn update_paciente(conn: &Connection, paciente: &Paciente) -> Result<(), DatabaseError> {
    let affected = conn.execute(
        "UPDATE pacientes
         SET tiene_ucr = ?2, numero_expediente = ?3, numero_seguridad_social = ?4,
             prestacion_otros_servicios_sociales = ?5, observaciones_medicas = ?6,
             intereses_y_actividades = ?7, terminal_id = ?8, persona_id = ?9,
             modalidad_id = ?10
         WHERE id = ?1",
        params![
            paciente.id.to_string(),
            paciente.tiene_ucr as i32,
            paciente.numero_expediente,
            paciente.numero_seguridad_social,
            paciente.prestacion_otros_servicios_sociales as i32,
            paciente.observaciones_medicas,
            paciente.intereses_y_actividades,
            paciente.terminal_id.to_string(),
            paciente.persona_id.to_string(),
            paciente.modalidad_id.to_string(),
        ],
    )?;
    if affected == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "paciente".into(),
            id: paciente.id.to_string(),
        });
    }
    Ok(())
}

pub fn delete_paciente(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let affected = conn.execute(
        "DELETE FROM pacientes WHERE id = ?1",
        params![id.to_string()],
    )?;
    if affected == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "paciente".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

// ── Relacion paciente ───────────────────────────────────────

const RELACION_COLUMNS: &str = "id, nombre, apellidos, telefono, tipo_relacion, \
     tiene_llaves_vivienda, disponibilidad, observaciones, prioridad, \
     es_conviviente, tiempo_domicilio, paciente_id";

fn map_relacion(row: &rusqlite::Row<'_>) -> Result<RelacionPaciente, rusqlite::Error> {
    Ok(RelacionPaciente {
        id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
        nombre: row.get(1)?,
        apellidos: row.get(2)?,
        telefono: row.get(3)?,
        tipo_relacion: row.get(4)?,
        tiene_llaves_vivienda: row.get::<_, i32>(5)? != 0,
        disponibilidad: row.get(6)?,
        observaciones: row.get(7)?,
        prioridad: row.get(8)?,
        es_conviviente: row.get::<_, i32>(9)? != 0,
        tiempo_domicilio: row.get(10)?,
        paciente_id: Uuid::parse_str(&row.get::<_, String>(11)?).unwrap_or_default(),
    })
}

pub fn insert_relacion_paciente(
    conn: &Connection,
    relacion: &RelacionPaciente,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO relaciones_paciente (id, nombre, apellidos, telefono, tipo_relacion,
         tiene_llaves_vivienda, disponibilidad, observaciones, prioridad,
         es_conviviente, tiempo_domicilio, paciente_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            relacion.id.to_string(),
            relacion.nombre,
            relacion.apellidos,
            relacion.telefono,
            relacion.tipo_relacion,
            relacion.tiene_llaves_vivienda as i32,
            relacion.disponibilidad,
            relacion.observaciones,
            relacion.prioridad,
            relacion.es_conviviente as i32,
            relacion.tiempo_domicilio,
            relacion.paciente_id.to_string(),
        ],
    )?;
    Ok(())
}

pub fn get_relacion_paciente(
    conn: &Connection,
    id: &Uuid,
) -> Result<Option<RelacionPaciente>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {RELACION_COLUMNS} FROM relaciones_paciente WHERE id = ?1"
    ))?;

    match stmt.query_row(params![id.to_string()], map_relacion) {
        Ok(row) => Ok(Some(row)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_relaciones_paciente(
    conn: &Connection,
) -> Result<Vec<RelacionPaciente>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {RELACION_COLUMNS} FROM relaciones_paciente ORDER BY prioridad, apellidos"
    ))?;
    let rows = stmt.query_map([], map_relacion)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

/// Contacts for one patient, highest priority first.
pub fn list_relaciones_por_paciente(
    conn: &Connection,
    paciente_id: &Uuid,
) -> Result<Vec<RelacionPaciente>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {RELACION_COLUMNS} FROM relaciones_paciente
         WHERE paciente_id = ?1 ORDER BY prioridad"
    ))?;
    let rows = stmt.query_map(params![paciente_id.to_string()], map_relacion)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn update_relacion_paciente(
    conn: &Connection,
    relacion: &RelacionPaciente,
) -> Result<(), DatabaseError> {
    let affected = conn.execute(
        "UPDATE relaciones_paciente
         SET nombre = ?2, apellidos = ?3, telefono = ?4, tipo_relacion = ?5,
             tiene_llaves_vivienda = ?6, disponibilidad = ?7, observaciones = ?8,
             prioridad = ?9, es_conviviente = ?10, tiempo_domicilio = ?11,
             paciente_id = ?12
         WHERE id = ?1",
        params![
            relacion.id.to_string(),
            relacion.nombre,
            relacion.apellidos,
            relacion.telefono,
            relacion.tipo_relacion,
            relacion.tiene_llaves_vivienda as i32,
            relacion.disponibilidad,
            relacion.observaciones,
            relacion.prioridad,
            relacion.es_conviviente as i32,
            relacion.tiempo_domicilio,
            relacion.paciente_id.to_string(),
        ],
    )?;
    if affected == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "relacion_paciente".into(),
            id: relacion.id.to_string(),
        });
    }
    Ok(())
}

pub fn delete_relacion_paciente(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let affected = conn.execute(
        "DELETE FROM relaciones_paciente WHERE id = ?1",
        params![id.to_string()],
    )?;
    if affected == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "relacion_paciente".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}
