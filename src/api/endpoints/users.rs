//! Operator account endpoints. The read projection carries the group
//! list and the optional extension records (database id, profile image).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::endpoints::parse_id;
use crate::api::error::ApiError;
use crate::db::repository;
use crate::state::AppState;
use crate::views::{
    create_usuario, update_usuario_fields, UsuarioInput, UsuarioUpdate, UsuarioView,
};

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<UsuarioView>>, ApiError> {
    let conn = state.open_db()?;
    let usuarios = repository::list_usuarios(&conn)?;
    let views = usuarios
        .iter()
        .map(|u| UsuarioView::load(&conn, u))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(views))
}

pub async fn retrieve(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UsuarioView>, ApiError> {
    let conn = state.open_db()?;
    let id = parse_id(&id)?;
    let usuario = repository::get_usuario(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound(format!("usuario {id} not found")))?;
    Ok(Json(UsuarioView::load(&conn, &usuario)?))
}

pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<UsuarioInput>,
) -> Result<(StatusCode, Json<UsuarioView>), ApiError> {
    let conn = state.open_db()?;
    let usuario = create_usuario(&conn, &input)?;
    Ok((
        StatusCode::CREATED,
        Json(UsuarioView::load(&conn, &usuario)?),
    ))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<UsuarioUpdate>,
) -> Result<Json<UsuarioView>, ApiError> {
    let conn = state.open_db()?;
    let id = parse_id(&id)?;
    let usuario = update_usuario_fields(&conn, &id, &update)?;
    Ok(Json(UsuarioView::load(&conn, &usuario)?))
}

pub async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let conn = state.open_db()?;
    let id = parse_id(&id)?;
    repository::delete_usuario(&conn, &id)?;
    Ok(StatusCode::NO_CONTENT)
}
