//! Endpoints for the flat catalog entities (addresses, lookup tables,
//! classifications, groups). These project as themselves, so the five
//! handlers per resource differ only in which repository and resolve
//! functions they call.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::endpoints::parse_id;
use crate::api::error::ApiError;
use crate::state::AppState;
use crate::views;
use crate::{db::repository, models};

macro_rules! catalog_endpoints {
    ($mod_name:ident, $model:ty, $input:ty, $update:ty, $label:literal,
     $list:path, $get:path, $create:path, $apply:path, $delete:path) => {
        pub mod $mod_name {
            use super::*;

            pub async fn list(
                State(state): State<AppState>,
            ) -> Result<Json<Vec<$model>>, ApiError> {
                let conn = state.open_db()?;
                Ok(Json($list(&conn)?))
            }

            pub async fn retrieve(
                State(state): State<AppState>,
                Path(id): Path<String>,
            ) -> Result<Json<$model>, ApiError> {
                let conn = state.open_db()?;
                let id = parse_id(&id)?;
                let row = $get(&conn, &id)?
                    .ok_or_else(|| ApiError::NotFound(format!("{} {id} not found", $label)))?;
                Ok(Json(row))
            }

            pub async fn create(
                State(state): State<AppState>,
                Json(input): Json<$input>,
            ) -> Result<(StatusCode, Json<$model>), ApiError> {
                let conn = state.open_db()?;
                let row = $create(&conn, &input)?;
                Ok((StatusCode::CREATED, Json(row)))
            }

            pub async fn update(
                State(state): State<AppState>,
                Path(id): Path<String>,
                Json(update): Json<$update>,
            ) -> Result<Json<$model>, ApiError> {
                let conn = state.open_db()?;
                let id = parse_id(&id)?;
                Ok(Json($apply(&conn, &id, &update)?))
            }

            pub async fn destroy(
                State(state): State<AppState>,
                Path(id): Path<String>,
            ) -> Result<StatusCode, ApiError> {
                let conn = state.open_db()?;
                let id = parse_id(&id)?;
                $delete(&conn, &id)?;
                Ok(StatusCode::NO_CONTENT)
            }
        }
    };
}

catalog_endpoints!(
    direcciones,
    models::Direccion,
    views::DireccionInput,
    views::DireccionUpdate,
    "direccion",
    repository::list_direcciones,
    repository::get_direccion,
    views::resolve_direccion,
    views::update_direccion_fields,
    repository::delete_direccion
);

catalog_endpoints!(
    tipos_vivienda,
    models::TipoVivienda,
    views::TipoViviendaInput,
    views::TipoViviendaUpdate,
    "tipo_vivienda",
    repository::list_tipos_vivienda,
    repository::get_tipo_vivienda,
    views::resolve_tipo_vivienda,
    views::update_tipo_vivienda_fields,
    repository::delete_tipo_vivienda
);

catalog_endpoints!(
    tipos_situacion,
    models::TipoSituacion,
    views::TipoSituacionInput,
    views::TipoSituacionUpdate,
    "tipo_situacion",
    repository::list_tipos_situacion,
    repository::get_tipo_situacion,
    views::resolve_tipo_situacion,
    views::update_tipo_situacion_fields,
    repository::delete_tipo_situacion
);

catalog_endpoints!(
    tipos_modalidad,
    models::TipoModalidadPaciente,
    views::TipoModalidadInput,
    views::TipoModalidadUpdate,
    "tipo_modalidad_paciente",
    repository::list_tipos_modalidad,
    repository::get_tipo_modalidad,
    views::resolve_tipo_modalidad,
    views::update_tipo_modalidad_fields,
    repository::delete_tipo_modalidad
);

catalog_endpoints!(
    clasificaciones_recurso,
    models::ClasificacionRecurso,
    views::ClasificacionRecursoInput,
    views::ClasificacionRecursoUpdate,
    "clasificacion_recurso",
    repository::list_clasificaciones_recurso,
    repository::get_clasificacion_recurso,
    views::resolve_clasificacion_recurso,
    views::update_clasificacion_recurso_fields,
    repository::delete_clasificacion_recurso
);

catalog_endpoints!(
    clasificaciones_alarma,
    models::ClasificacionAlarma,
    views::ClasificacionAlarmaInput,
    views::ClasificacionAlarmaUpdate,
    "clasificacion_alarma",
    repository::list_clasificaciones_alarma,
    repository::get_clasificacion_alarma,
    views::resolve_clasificacion_alarma,
    views::update_clasificacion_alarma_fields,
    repository::delete_clasificacion_alarma
);

catalog_endpoints!(
    grupos,
    models::Grupo,
    views::GrupoInput,
    views::GrupoUpdate,
    "grupo",
    repository::list_grupos,
    repository::get_grupo,
    views::create_grupo,
    views::update_grupo_fields,
    repository::delete_grupo
);
