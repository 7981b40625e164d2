//! Community resource endpoints: resource types (with their
//! classification embedded) and the resources themselves.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::endpoints::parse_id;
use crate::api::error::ApiError;
use crate::db::repository;
use crate::state::AppState;
use crate::views::{
    create_recurso_comunitario, resolve_tipo_recurso, update_recurso_comunitario_fields,
    update_tipo_recurso_fields, RecursoComunitarioInput, RecursoComunitarioUpdate,
    RecursoComunitarioView, TipoRecursoInput, TipoRecursoUpdate, TipoRecursoView,
};

pub mod tipos_recurso {
    use super::*;

    pub async fn list(
        State(state): State<AppState>,
    ) -> Result<Json<Vec<TipoRecursoView>>, ApiError> {
        let conn = state.open_db()?;
        let tipos = repository::list_tipos_recurso(&conn)?;
        let views = tipos
            .iter()
            .map(|t| TipoRecursoView::load(&conn, t))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Json(views))
    }

    pub async fn retrieve(
        State(state): State<AppState>,
        Path(id): Path<String>,
    ) -> Result<Json<TipoRecursoView>, ApiError> {
        let conn = state.open_db()?;
        let id = parse_id(&id)?;
        let tipo = repository::get_tipo_recurso(&conn, &id)?
            .ok_or_else(|| ApiError::NotFound(format!("tipo_recurso {id} not found")))?;
        Ok(Json(TipoRecursoView::load(&conn, &tipo)?))
    }

    pub async fn create(
        State(state): State<AppState>,
        Json(input): Json<TipoRecursoInput>,
    ) -> Result<(StatusCode, Json<TipoRecursoView>), ApiError> {
        let conn = state.open_db()?;
        let tipo = resolve_tipo_recurso(&conn, &input)?;
        Ok((StatusCode::CREATED, Json(TipoRecursoView::load(&conn, &tipo)?)))
    }

    pub async fn update(
        State(state): State<AppState>,
        Path(id): Path<String>,
        Json(update): Json<TipoRecursoUpdate>,
    ) -> Result<Json<TipoRecursoView>, ApiError> {
        let conn = state.open_db()?;
        let id = parse_id(&id)?;
        let tipo = update_tipo_recurso_fields(&conn, &id, &update)?;
        Ok(Json(TipoRecursoView::load(&conn, &tipo)?))
    }

    pub async fn destroy(
        State(state): State<AppState>,
        Path(id): Path<String>,
    ) -> Result<StatusCode, ApiError> {
        let conn = state.open_db()?;
        let id = parse_id(&id)?;
        repository::delete_tipo_recurso(&conn, &id)?;
        Ok(StatusCode::NO_CONTENT)
    }
}

pub mod recursos_comunitarios {
    use super::*;

    pub async fn list(
        State(state): State<AppState>,
    ) -> Result<Json<Vec<RecursoComunitarioView>>, ApiError> {
        let conn = state.open_db()?;
        let recursos = repository::list_recursos_comunitarios(&conn)?;
        let views = recursos
            .iter()
            .map(|r| RecursoComunitarioView::load(&conn, r))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Json(views))
    }

    pub async fn retrieve(
        State(state): State<AppState>,
        Path(id): Path<String>,
    ) -> Result<Json<RecursoComunitarioView>, ApiError> {
        let conn = state.open_db()?;
        let id = parse_id(&id)?;
        let recurso = repository::get_recurso_comunitario(&conn, &id)?
            .ok_or_else(|| ApiError::NotFound(format!("recurso_comunitario {id} not found")))?;
        Ok(Json(RecursoComunitarioView::load(&conn, &recurso)?))
    }

    pub async fn create(
        State(state): State<AppState>,
        Json(input): Json<RecursoComunitarioInput>,
    ) -> Result<(StatusCode, Json<RecursoComunitarioView>), ApiError> {
        let conn = state.open_db()?;
        let recurso = create_recurso_comunitario(&conn, &input)?;
        Ok((
            StatusCode::CREATED,
            Json(RecursoComunitarioView::load(&conn, &recurso)?),
        ))
    }

    pub async fn update(
        State(state): State<AppState>,
        Path(id): Path<String>,
        Json(update): Json<RecursoComunitarioUpdate>,
    ) -> Result<Json<RecursoComunitarioView>, ApiError> {
        let conn = state.open_db()?;
        let id = parse_id(&id)?;
        let recurso = update_recurso_comunitario_fields(&conn, &id, &update)?;
        Ok(Json(RecursoComunitarioView::load(&conn, &recurso)?))
    }

    pub async fn destroy(
        State(state): State<AppState>,
        Path(id): Path<String>,
    ) -> Result<StatusCode, ApiError> {
        let conn = state.open_db()?;
        let id = parse_id(&id)?;
        repository::delete_recurso_comunitario(&conn, &id)?;
        Ok(StatusCode::NO_CONTENT)
    }
}
