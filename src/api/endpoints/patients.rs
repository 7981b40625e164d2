//! Patient endpoints: the paciente aggregate (nested terminal, persona
//! and modalidad) and the per-patient contact list.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::endpoints::parse_id;
use crate::api::error::ApiError;
use crate::db::repository;
use crate::state::AppState;
use crate::views::{
    create_paciente, create_relacion_paciente, update_paciente_fields,
    update_relacion_paciente_fields, PacienteInput, PacienteUpdate, PacienteView,
    RelacionPacienteInput, RelacionPacienteUpdate, RelacionPacienteView,
};

pub mod pacientes {
    use super::*;

    pub async fn list(
        State(state): State<AppState>,
    ) -> Result<Json<Vec<PacienteView>>, ApiError> {
        let conn = state.open_db()?;
        let pacientes = repository::list_pacientes(&conn)?;
        let views = pacientes
            .iter()
            .map(|p| PacienteView::load(&conn, p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Json(views))
    }

    pub async fn retrieve(
        State(state): State<AppState>,
        Path(id): Path<String>,
    ) -> Result<Json<PacienteView>, ApiError> {
        let conn = state.open_db()?;
        let id = parse_id(&id)?;
        let paciente = repository::get_paciente(&conn, &id)?
            .ok_or_else(|| ApiError::NotFound(format!("paciente {id} not found")))?;
        Ok(Json(PacienteView::load(&conn, &paciente)?))
    }

    pub async fn create(
        State(state): State<AppState>,
        Json(input): Json<PacienteInput>,
    ) -> Result<(StatusCode, Json<PacienteView>), ApiError> {
        let conn = state.open_db()?;
        let paciente = create_paciente(&conn, &input)?;
        Ok((
            StatusCode::CREATED,
            Json(PacienteView::load(&conn, &paciente)?),
        ))
    }

    pub async fn update(
        State(state): State<AppState>,
        Path(id): Path<String>,
        Json(update): Json<PacienteUpdate>,
    ) -> Result<Json<PacienteView>, ApiError> {
        let conn = state.open_db()?;
        let id = parse_id(&id)?;
        let paciente = update_paciente_fields(&conn, &id, &update)?;
        Ok(Json(PacienteView::load(&conn, &paciente)?))
    }

    pub async fn destroy(
        State(state): State<AppState>,
        Path(id): Path<String>,
    ) -> Result<StatusCode, ApiError> {
        let conn = state.open_db()?;
        let id = parse_id(&id)?;
        repository::delete_paciente(&conn, &id)?;
        Ok(StatusCode::NO_CONTENT)
    }
}

pub mod relaciones_paciente {
    use super::*;

    pub async fn list(
        State(state): State<AppState>,
    ) -> Result<Json<Vec<RelacionPacienteView>>, ApiError> {
        let conn = state.open_db()?;
        let relaciones = repository::list_relaciones_paciente(&conn)?;
        let views = relaciones
            .iter()
            .map(|r| RelacionPacienteView::load(&conn, r))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Json(views))
    }

    pub async fn retrieve(
        State(state): State<AppState>,
        Path(id): Path<String>,
    ) -> Result<Json<RelacionPacienteView>, ApiError> {
        let conn = state.open_db()?;
        let id = parse_id(&id)?;
        let relacion = repository::get_relacion_paciente(&conn, &id)?
            .ok_or_else(|| ApiError::NotFound(format!("relacion_paciente {id} not found")))?;
        Ok(Json(RelacionPacienteView::load(&conn, &relacion)?))
    }

    pub async fn create(
        State(state): State<AppState>,
        Json(input): Json<RelacionPacienteInput>,
    ) -> Result<(StatusCode, Json<RelacionPacienteView>), ApiError> {
        let conn = state.open_db()?;
        let relacion = create_relacion_paciente(&conn, &input)?;
        Ok((
            StatusCode::CREATED,
            Json(RelacionPacienteView::load(&conn, &relacion)?),
        ))
    }

    pub async fn update(
        State(state): State<AppState>,
        Path(id): Path<String>,
        Json(update): Json<RelacionPacienteUpdate>,
    ) -> Result<Json<RelacionPacienteView>, ApiError> {
        let conn = state.open_db()?;
        let id = parse_id(&id)?;
        let relacion = update_relacion_paciente_fields(&conn, &id, &update)?;
        Ok(Json(RelacionPacienteView::load(&conn, &relacion)?))
    }

    pub async fn destroy(
        State(state): State<AppState>,
        Path(id): Path<String>,
    ) -> Result<StatusCode, ApiError> {
        let conn = state.open_db()?;
        let id = parse_id(&id)?;
        repository::delete_relacion_paciente(&conn, &id)?;
        Ok(StatusCode::NO_CONTENT)
    }
}
