//! Terminal endpoints. The read projection embeds a shallow titular
//! summary; the write input links the titular by id.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::endpoints::parse_id;
use crate::api::error::ApiError;
use crate::db::repository;
use crate::state::AppState;
use crate::views::{
    create_terminal, update_terminal_fields, TerminalInput, TerminalUpdate, TerminalView,
};

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<TerminalView>>, ApiError> {
    let conn = state.open_db()?;
    let terminales = repository::list_terminales(&conn)?;
    let views = terminales
        .iter()
        .map(|t| TerminalView::load(&conn, t))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(views))
}

pub async fn retrieve(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TerminalView>, ApiError> {
    let conn = state.open_db()?;
    let id = parse_id(&id)?;
    let terminal = repository::get_terminal(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound(format!("terminal {id} not found")))?;
    Ok(Json(TerminalView::load(&conn, &terminal)?))
}

pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<TerminalInput>,
) -> Result<(StatusCode, Json<TerminalView>), ApiError> {
    let conn = state.open_db()?;
    let terminal = create_terminal(&conn, &input)?;
    Ok((
        StatusCode::CREATED,
        Json(TerminalView::load(&conn, &terminal)?),
    ))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<TerminalUpdate>,
) -> Result<Json<TerminalView>, ApiError> {
    let conn = state.open_db()?;
    let id = parse_id(&id)?;
    let terminal = update_terminal_fields(&conn, &id, &update)?;
    Ok(Json(TerminalView::load(&conn, &terminal)?))
}

pub async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let conn = state.open_db()?;
    let id = parse_id(&id)?;
    repository::delete_terminal(&conn, &id)?;
    Ok(StatusCode::NO_CONTENT)
}
