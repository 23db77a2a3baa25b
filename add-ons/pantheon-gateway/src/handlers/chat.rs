//! Chat turn and persona catalog.

use std::sync::Arc;

use axum::{extract::State, Json};
use pantheon_core::{catalog, ChatTurnRequest, ChatTurnResponse, Persona};

use super::{api_error, ApiError};
use crate::AppState;

/// POST /api/ai/chat
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ChatTurnRequest>,
) -> Result<Json<ChatTurnResponse>, ApiError> {
    state.companion.respond(body).await.map(Json).map_err(api_error)
}

/// GET /api/personas
pub async fn personas() -> Json<Vec<Persona>> {
    Json(catalog())
}
