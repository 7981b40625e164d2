//! Persona endpoints. Reads return the nested projection (address
//! embedded), writes take flat input with the nested address block.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::endpoints::parse_id;
use crate::api::error::ApiError;
use crate::db::repository;
use crate::state::AppState;
use crate::views::{
    create_persona, update_persona_fields, PersonaInput, PersonaUpdate, PersonaView,
};

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<PersonaView>>, ApiError> {
    let conn = state.open_db()?;
    let personas = repository::list_personas(&conn)?;
    let views = personas
        .iter()
        .map(|p| PersonaView::load(&conn, p))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(views))
}

pub async fn retrieve(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PersonaView>, ApiError> {
    let conn = state.open_db()?;
    let id = parse_id(&id)?;
    let persona = repository::get_persona(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound(format!("persona {id} not found")))?;
    Ok(Json(PersonaView::load(&conn, &persona)?))
}

pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<PersonaInput>,
) -> Result<(StatusCode, Json<PersonaView>), ApiError> {
    let conn = state.open_db()?;
    let persona = create_persona(&conn, &input)?;
    Ok((StatusCode::CREATED, Json(PersonaView::load(&conn, &persona)?)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<PersonaUpdate>,
) -> Result<Json<PersonaView>, ApiError> {
    let conn = state.open_db()?;
    let id = parse_id(&id)?;
    let persona = update_persona_fields(&conn, &id, &update)?;
    Ok(Json(PersonaView::load(&conn, &persona)?))
}

pub async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let conn = state.open_db()?;
    let id = parse_id(&id)?;
    repository::delete_persona(&conn, &id)?;
    Ok(StatusCode::NO_CONTENT)
}
