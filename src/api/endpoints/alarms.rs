//! Alarm endpoints: alarm types (classification embedded) and alarm
//! events (type and operator embedded; operator linked by id on write).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::endpoints::parse_id;
use crate::api::error::ApiError;
use crate::db::repository;
use crate::state::AppState;
use crate::views::{
    create_alarma, resolve_tipo_alarma, update_alarma_fields, update_tipo_alarma_fields,
    AlarmaInput, AlarmaUpdate, AlarmaView, TipoAlarmaInput, TipoAlarmaUpdate, TipoAlarmaView,
};

pub mod tipos_alarma {
    use super::*;

    pub async fn list(
        State(state): State<AppState>,
    ) -> Result<Json<Vec<TipoAlarmaView>>, ApiError> {
        let conn = state.open_db()?;
        let tipos = repository::list_tipos_alarma(&conn)?;
        let views = tipos
            .iter()
            .map(|t| TipoAlarmaView::load(&conn, t))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Json(views))
    }

    pub async fn retrieve(
        State(state): State<AppState>,
        Path(id): Path<String>,
    ) -> Result<Json<TipoAlarmaView>, ApiError> {
        let conn = state.open_db()?;
        let id = parse_id(&id)?;
        let tipo = repository::get_tipo_alarma(&conn, &id)?
            .ok_or_else(|| ApiError::NotFound(format!("tipo_alarma {id} not found")))?;
        Ok(Json(TipoAlarmaView::load(&conn, &tipo)?))
    }

    pub async fn create(
        State(state): State<AppState>,
        Json(input): Json<TipoAlarmaInput>,
    ) -> Result<(StatusCode, Json<TipoAlarmaView>), ApiError> {
        let conn = state.open_db()?;
        let tipo = resolve_tipo_alarma(&conn, &input)?;
        Ok((StatusCode::CREATED, Json(TipoAlarmaView::load(&conn, &tipo)?)))
    }

    pub async fn update(
        State(state): State<AppState>,
        Path(id): Path<String>,
        Json(update): Json<TipoAlarmaUpdate>,
    ) -> Result<Json<TipoAlarmaView>, ApiError> {
        let conn = state.open_db()?;
        let id = parse_id(&id)?;
        let tipo = update_tipo_alarma_fields(&conn, &id, &update)?;
        Ok(Json(TipoAlarmaView::load(&conn, &tipo)?))
    }

    pub async fn destroy(
        State(state): State<AppState>,
        Path(id): Path<String>,
    ) -> Result<StatusCode, ApiError> {
        let conn = state.open_db()?;
        let id = parse_id(&id)?;
        repository::delete_tipo_alarma(&conn, &id)?;
        Ok(StatusCode::NO_CONTENT)
    }
}

pub mod alarmas {
    use super::*;

    pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<AlarmaView>>, ApiError> {
        let conn = state.open_db()?;
        let alarmas = repository::list_alarmas(&conn)?;
        let views = alarmas
            .iter()
            .map(|a| AlarmaView::load(&conn, a))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Json(views))
    }

    pub async fn retrieve(
        State(state): State<AppState>,
        Path(id): Path<String>,
    ) -> Result<Json<AlarmaView>, ApiError> {
        let conn = state.open_db()?;
        let id = parse_id(&id)?;
        let alarma = repository::get_alarma(&conn, &id)?
            .ok_or_else(|| ApiError::NotFound(format!("alarma {id} not found")))?;
        Ok(Json(AlarmaView::load(&conn, &alarma)?))
    }

    pub async fn create(
        State(state): State<AppState>,
        Json(input): Json<AlarmaInput>,
    ) -> Result<(StatusCode, Json<AlarmaView>), ApiError> {
        let conn = state.open_db()?;
        let alarma = create_alarma(&conn, &input)?;
        Ok((StatusCode::CREATED, Json(AlarmaView::load(&conn, &alarma)?)))
    }

    pub async fn update(
        State(state): State<AppState>,
        Path(id): Path<String>,
        Json(update): Json<AlarmaUpdate>,
    ) -> Result<Json<AlarmaView>, ApiError> {
        let conn = state.open_db()?;
        let id = parse_id(&id)?;
        let alarma = update_alarma_fields(&conn, &id, &update)?;
        Ok(Json(AlarmaView::load(&conn, &alarma)?))
    }

    pub async fn destroy(
        State(state): State<AppState>,
        Path(id): Path<String>,
    ) -> Result<StatusCode, ApiError> {
        let conn = state.open_db()?;
        let id = parse_id(&id)?;
        repository::delete_alarma(&conn, &id)?;
        Ok(StatusCode::NO_CONTENT)
    }
}
