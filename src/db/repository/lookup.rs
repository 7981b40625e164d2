use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{TipoModalidadPaciente, TipoSituacion, TipoVivienda};

/// The three name-only lookup tables share one shape, so the CRUD set is
/// generated per table.
macro_rules! lookup_repo {
    ($table:literal, $model:ident, $entity:literal,
     $insert:ident, $find:ident, $get:ident, $list:ident, $update:ident, $delete:ident) => {
        pub fn $insert(conn: &Connection, row: &$model) -> Result<(), DatabaseError> {
            conn.execute(
                concat!("INSERT INTO ", $table, " (id, nombre) VALUES (?1, ?2)"),
                params![row.id.to_string(), row.nombre],
            )?;
            Ok(())
        }

        /// Exact-match lookup by name, the table's full field set.
        pub fn $find(conn: &Connection, nombre: &str) -> Result<Option<$model>, DatabaseError> {
            let mut stmt = conn.prepare(concat!(
                "SELECT id, nombre FROM ",
                $table,
                " WHERE nombre = ?1 LIMIT 1"
            ))?;

            match stmt.query_row(params![nombre], |row| {
                Ok($model {
                    id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
                    nombre: row.get(1)?,
                })
            }) {
                Ok(row) => Ok(Some(row)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        }

        pub fn $get(conn: &Connection, id: &Uuid) -> Result<Option<$model>, DatabaseError> {
            let mut stmt = conn.prepare(concat!(
                "SELECT id, nombre FROM ",
                $table,
                " WHERE id = ?1"
            ))?;

            match stmt.query_row(params![id.to_string()], |row| {
                Ok($model {
                    id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
                    nombre: row.get(1)?,
                })
            }) {
                Ok(row) => Ok(Some(row)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        }

        pub fn $list(conn: &Connection) -> Result<Vec<$model>, DatabaseError> {
            let mut stmt = conn.prepare(concat!(
                "SELECT id, nombre FROM ",
                $table,
                " ORDER BY nombre"
            ))?;

            let rows = stmt.query_map([], |row| {
                Ok($model {
                    id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
                    nombre: row.get(1)?,
                })
            })?;
            rows.map(|r| r.map_err(DatabaseError::from)).collect()
        }

        pub fn $update(conn: &Connection, row: &$model) -> Result<(), DatabaseError> {
            let affected = conn.execute(
                concat!("UPDATE ", $table, " SET nombre = ?2 WHERE id = ?1"),
                params![row.id.to_string(), row.nombre],
            )?;
            if affected == 0 {
                return Err(DatabaseError::NotFound {
                    entity_type: $entity.into(),
                    id: row.id.to_string(),
                });
            }
            Ok(())
        }

        pub fn $delete(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
            let affected = conn.execute(
                concat!("DELETE FROM ", $table, " WHERE id = ?1"),
                params![id.to_string()],
            )?;
            if affected == 0 {
                return Err(DatabaseError::NotFound {
                    entity_type: $entity.into(),
                    id: id.to_string(),
                });
            }
            Ok(())
        }
    };
}

lookup_repo!(
    "tipos_vivienda",
    TipoVivienda,
    "tipo_vivienda",
    insert_tipo_vivienda,
    find_tipo_vivienda,
    get_tipo_vivienda,
    list_tipos_vivienda,
    update_tipo_vivienda,
    delete_tipo_vivienda
);

lookup_repo!(
    "tipos_situacion",
    TipoSituacion,
    "tipo_situacion",
    insert_tipo_situacion,
    find_tipo_situacion,
    get_tipo_situacion,
    list_tipos_situacion,
    update_tipo_situacion,
    delete_tipo_situacion
);

lookup_repo!(
    "tipos_modalidad_paciente",
    TipoModalidadPaciente,
    "tipo_modalidad_paciente",
    insert_tipo_modalidad,
    find_tipo_modalidad,
    get_tipo_modalidad,
    list_tipos_modalidad,
    update_tipo_modalidad,
    delete_tipo_modalidad
);
