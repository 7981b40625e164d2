use chrono::NaiveDate;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::repository;
use crate::db::DatabaseError;
use crate::models::{Direccion, Persona, Sexo};

use super::require;

// ── Direccion ───────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DireccionInput {
    pub localidad: String,
    pub provincia: String,
    #[serde(rename = "direccion_completa")]
    pub direccion: String,
    pub codigo_postal: String,
}

/// Reuse an exactly-matching address row or insert a new one.
pub fn resolve_direccion(
    conn: &Connection,
    input: &DireccionInput,
) -> Result<Direccion, DatabaseError> {
    if let Some(existing) = repository::find_direccion(
        conn,
        &input.localidad,
        &input.provincia,
        &input.direccion,
        &input.codigo_postal,
    )? {
        return Ok(existing);
    }

    let direccion = Direccion {
        id: Uuid::new_v4(),
        localidad: input.localidad.clone(),
        provincia: input.provincia.clone(),
        direccion: input.direccion.clone(),
        codigo_postal: input.codigo_postal.clone(),
    };
    repository::insert_direccion(conn, &direccion)?;
    Ok(direccion)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DireccionUpdate {
    pub localidad: Option<String>,
    pub provincia: Option<String>,
    #[serde(rename = "direccion_completa")]
    pub direccion: Option<String>,
    pub codigo_postal: Option<String>,
}

pub fn update_direccion_fields(
    conn: &Connection,
    id: &Uuid,
    update: &DireccionUpdate,
) -> Result<Direccion, DatabaseError> {
    let mut direccion = require(repository::get_direccion(conn, id)?, "direccion", id)?;
    if let Some(localidad) = &update.localidad {
        direccion.localidad = localidad.clone();
    }
    if let Some(provincia) = &update.provincia {
        direccion.provincia = provincia.clone();
    }
    if let Some(dir) = &update.direccion {
        direccion.direccion = dir.clone();
    }
    if let Some(cp) = &update.codigo_postal {
        direccion.codigo_postal = cp.clone();
    }
    repository::update_direccion(conn, &direccion)?;
    Ok(direccion)
}

// ── Persona ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct PersonaView {
    pub id: Uuid,
    pub nombre: String,
    pub apellidos: String,
    pub dni: String,
    pub fecha_nacimiento: NaiveDate,
    pub sexo: Sexo,
    pub telefono_fijo: Option<String>,
    pub telefono_movil: Option<String>,
    pub direccion: Direccion,
}

impl PersonaView {
    pub fn load(conn: &Connection, persona: &Persona) -> Result<Self, DatabaseError> {
        let direccion = require(
            repository::get_direccion(conn, &persona.direccion_id)?,
            "direccion",
            &persona.direccion_id,
        )?;
        Ok(Self {
            id: persona.id,
            nombre: persona.nombre.clone(),
            apellidos: persona.apellidos.clone(),
            dni: persona.dni.clone(),
            fecha_nacimiento: persona.fecha_nacimiento,
            sexo: persona.sexo,
            telefono_fijo: persona.telefono_fijo.clone(),
            telefono_movil: persona.telefono_movil.clone(),
            direccion,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PersonaInput {
    pub nombre: String,
    pub apellidos: String,
    pub dni: String,
    pub fecha_nacimiento: NaiveDate,
    pub sexo: Sexo,
    #[serde(default)]
    pub telefono_fijo: Option<String>,
    #[serde(default)]
    pub telefono_movil: Option<String>,
    pub direccion: DireccionInput,
}

fn persona_from_input(
    conn: &Connection,
    input: &PersonaInput,
) -> Result<Persona, DatabaseError> {
    let direccion = resolve_direccion(conn, &input.direccion)?;
    Ok(Persona {
        id: Uuid::new_v4(),
        nombre: input.nombre.clone(),
        apellidos: input.apellidos.clone(),
        dni: input.dni.clone(),
        fecha_nacimiento: input.fecha_nacimiento,
        sexo: input.sexo,
        telefono_fijo: input.telefono_fijo.clone(),
        telefono_movil: input.telefono_movil.clone(),
        direccion_id: direccion.id,
    })
}

/// Always creates a new persona row; the nested address still resolves
/// through find-or-create.
pub fn create_persona(conn: &Connection, input: &PersonaInput) -> Result<Persona, DatabaseError> {
    let persona = persona_from_input(conn, input)?;
    repository::insert_persona(conn, &persona)?;
    Ok(persona)
}

/// Find-or-create over the full field set, for nested use inside a
/// paciente write.
pub fn resolve_persona(conn: &Connection, input: &PersonaInput) -> Result<Persona, DatabaseError> {
    let candidate = persona_from_input(conn, input)?;
    if let Some(existing) = repository::find_persona(conn, &candidate)? {
        return Ok(existing);
    }
    repository::insert_persona(conn, &candidate)?;
    Ok(candidate)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PersonaUpdate {
    pub nombre: Option<String>,
    pub apellidos: Option<String>,
    pub dni: Option<String>,
    pub fecha_nacimiento: Option<NaiveDate>,
    pub sexo: Option<Sexo>,
    // Nullable columns: an explicit `null` clears, an absent key keeps
    #[serde(default, deserialize_with = "super::key_present")]
    pub telefono_fijo: Option<Option<String>>,
    #[serde(default, deserialize_with = "super::key_present")]
    pub telefono_movil: Option<Option<String>>,
    pub direccion: Option<DireccionInput>,
}

pub fn update_persona_fields(
    conn: &Connection,
    id: &Uuid,
    update: &PersonaUpdate,
) -> Result<Persona, DatabaseError> {
    let mut persona = require(repository::get_persona(conn, id)?, "persona", id)?;

    if let Some(nombre) = &update.nombre {
        persona.nombre = nombre.clone();
    }
    if let Some(apellidos) = &update.apellidos {
        persona.apellidos = apellidos.clone();
    }
    if let Some(dni) = &update.dni {
        persona.dni = dni.clone();
    }
    if let Some(fecha) = update.fecha_nacimiento {
        persona.fecha_nacimiento = fecha;
    }
    if let Some(sexo) = update.sexo {
        persona.sexo = sexo;
    }
    if let Some(fijo) = &update.telefono_fijo {
        persona.telefono_fijo = fijo.clone();
    }
    if let Some(movil) = &update.telefono_movil {
        persona.telefono_movil = movil.clone();
    }
    // A present nested block re-resolves the reference; absent leaves it
    if let Some(direccion) = &update.direccion {
        persona.direccion_id = resolve_direccion(conn, direccion)?.id;
    }

    repository::update_persona(conn, &persona)?;
    Ok(persona)
}
