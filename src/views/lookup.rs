use rusqlite::Connection;
use serde::Deserialize;
use uuid::Uuid;

use crate::db::repository;
use crate::db::DatabaseError;
use crate::models::{TipoModalidadPaciente, TipoSituacion, TipoVivienda};

use super::require;

/// Name-keyed lookup tables share one input/update shape and one
/// find-or-create pattern; only the repository functions differ.
macro_rules! lookup_views {
    ($entity:ident, $label:literal, $input:ident, $update:ident,
     $resolve:ident, $apply:ident, $find:path, $insert:path, $get:path, $repo_update:path) => {
        #[derive(Debug, Clone, Deserialize)]
        pub struct $input {
            pub nombre: String,
        }

        #[derive(Debug, Clone, Default, Deserialize)]
        pub struct $update {
            pub nombre: Option<String>,
        }

        pub fn $resolve(conn: &Connection, input: &$input) -> Result<$entity, DatabaseError> {
            if let Some(existing) = $find(conn, &input.nombre)? {
                return Ok(existing);
            }
            let row = $entity {
                id: Uuid::new_v4(),
                nombre: input.nombre.clone(),
            };
            $insert(conn, &row)?;
            Ok(row)
        }

        pub fn $apply(
            conn: &Connection,
            id: &Uuid,
            update: &$update,
        ) -> Result<$entity, DatabaseError> {
            let mut row = require($get(conn, id)?, $label, id)?;
            if let Some(nombre) = &update.nombre {
                row.nombre = nombre.clone();
            }
            $repo_update(conn, &row)?;
            Ok(row)
        }
    };
}

lookup_views!(
    TipoVivienda,
    "tipo_vivienda",
    TipoViviendaInput,
    TipoViviendaUpdate,
    resolve_tipo_vivienda,
    update_tipo_vivienda_fields,
    repository::find_tipo_vivienda,
    repository::insert_tipo_vivienda,
    repository::get_tipo_vivienda,
    repository::update_tipo_vivienda
);

lookup_views!(
    TipoSituacion,
    "tipo_situacion",
    TipoSituacionInput,
    TipoSituacionUpdate,
    resolve_tipo_situacion,
    update_tipo_situacion_fields,
    repository::find_tipo_situacion,
    repository::insert_tipo_situacion,
    repository::get_tipo_situacion,
    repository::update_tipo_situacion
);

lookup_views!(
    TipoModalidadPaciente,
    "tipo_modalidad_paciente",
    TipoModalidadInput,
    TipoModalidadUpdate,
    resolve_tipo_modalidad,
    update_tipo_modalidad_fields,
    repository::find_tipo_modalidad,
    repository::insert_tipo_modalidad,
    repository::get_tipo_modalidad,
    repository::update_tipo_modalidad
);
