//! Routes for the raffle session.

use std::convert::Infallible;

use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use futures_util::Stream;
use futures_util::stream;
use raffle_core::feedback::SoundSettings;
use raffle_session::application::views::SessionView;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, instrument, warn};

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for adding or editing a participant.
#[derive(Debug, Deserialize)]
pub struct ParticipantRequest {
    /// Raw name as typed; trimmed before storage.
    pub name: String,
}

/// Request body for PUT /settings/sound.
#[derive(Debug, Deserialize)]
pub struct SoundRequest {
    /// Whether cues should be audible.
    pub enabled: bool,
    /// Volume, clamped to `[0.0, 1.0]`.
    pub volume: f32,
}

/// Response body for POST /participants/{index}/editing.
#[derive(Debug, Serialize)]
pub struct EditingResponse {
    /// Index now marked as being edited.
    pub index: usize,
    /// Current text of the entry.
    pub name: String,
}

/// Response body for POST /draw.
#[derive(Debug, Serialize)]
pub struct DrawResponse {
    /// `false` when the request was a no-op (already rolling or nobody left).
    pub started: bool,
    /// Session snapshot right after the request.
    pub session: SessionView,
}

/// GET /
#[instrument(skip(state))]
async fn get_session(State(state): State<AppState>) -> Result<Json<SessionView>, ApiError> {
    Ok(Json(state.session.view().await?))
}

/// POST /participants
#[instrument(skip(state, request))]
async fn add_participant(
    State(state): State<AppState>,
    Json(request): Json<ParticipantRequest>,
) -> Result<Json<SessionView>, ApiError> {
    info!("handling add_participant");
    let view = state.session.add_participant(request.name).await?;
    Ok(Json(view))
}

/// PUT /participants/{index}
#[instrument(skip(state, request))]
async fn edit_participant(
    State(state): State<AppState>,
    Path(index): Path<usize>,
    Json(request): Json<ParticipantRequest>,
) -> Result<Json<SessionView>, ApiError> {
    info!("handling edit_participant");
    let view = state.session.edit_participant(index, request.name).await?;
    Ok(Json(view))
}

/// DELETE /participants/{index}
#[instrument(skip(state))]
async fn remove_participant(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Json<SessionView>, ApiError> {
    info!("handling remove_participant");
    let view = state.session.remove_participant(index).await?;
    Ok(Json(view))
}

/// POST /participants/{index}/editing
#[instrument(skip(state))]
async fn begin_edit(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Json<EditingResponse>, ApiError> {
    let name = state.session.begin_edit(index).await?;
    Ok(Json(EditingResponse { index, name }))
}

/// DELETE /participants/editing
#[instrument(skip(state))]
async fn cancel_edit(State(state): State<AppState>) -> Result<Json<SessionView>, ApiError> {
    Ok(Json(state.session.cancel_edit().await?))
}

/// POST /draw
#[instrument(skip(state))]
async fn draw(State(state): State<AppState>) -> Result<Json<DrawResponse>, ApiError> {
    let ticket = state.session.draw().await?;
    match &ticket {
        Some(ticket) => info!(draw_id = %ticket.draw_id, "draw started"),
        None => info!("draw request ignored"),
    }
    let session = state.session.view().await?;
    Ok(Json(DrawResponse {
        started: ticket.is_some(),
        session,
    }))
}

/// POST /restart
#[instrument(skip(state))]
async fn restart(State(state): State<AppState>) -> Result<Json<SessionView>, ApiError> {
    info!("handling restart_keeping_participants");
    Ok(Json(state.session.restart_keeping_participants().await?))
}

/// POST /new-session
#[instrument(skip(state))]
async fn new_session(State(state): State<AppState>) -> Result<Json<SessionView>, ApiError> {
    info!("handling new_session");
    Ok(Json(state.session.new_session().await?))
}

/// PUT /settings/sound
#[instrument(skip(state))]
async fn update_sound(
    State(state): State<AppState>,
    Json(request): Json<SoundRequest>,
) -> Result<Json<SessionView>, ApiError> {
    let settings = SoundSettings::new(request.enabled, request.volume);
    Ok(Json(state.session.update_sound(settings).await?))
}

/// GET /feedback
///
/// Streams every tick and reveal cue as a server-sent event named after the
/// cue, with the cue as JSON data.
#[instrument(skip(state))]
async fn feedback_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = state.feedback.subscribe();
    info!("feedback subscriber connected");

    let events = stream::unfold(receiver, |mut receiver| async move {
        loop {
            match receiver.recv().await {
                Ok(cue) => {
                    let event = Event::default().event(cue.event.as_str());
                    let event = match event.json_data(cue) {
                        Ok(event) => event,
                        Err(err) => {
                            warn!(error = %err, "failed to encode feedback cue");
                            continue;
                        }
                    };
                    return Some((Ok(event), receiver));
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "feedback subscriber lagged; cues dropped");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}

/// Returns the router for the raffle session.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_session))
        .route("/participants", post(add_participant))
        .route("/participants/editing", delete(cancel_edit))
        .route(
            "/participants/{index}",
            put(edit_participant).delete(remove_participant),
        )
        .route("/participants/{index}/editing", post(begin_edit))
        .route("/draw", post(draw))
        .route("/restart", post(restart))
        .route("/new-session", post(new_session))
        .route("/settings/sound", put(update_sound))
        .route("/feedback", get(feedback_stream))
}
