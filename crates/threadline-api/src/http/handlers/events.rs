//! Events API webhook.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use threadline_types::error::BotError;
use threadline_types::event::{EventEnvelope, InnerEvent, MessageEvent};

use crate::http::error::AppError;
use crate::http::extractors::slack::SlackVerified;
use crate::state::AppState;

/// POST {event_subscription_path} - Slack Events API deliveries.
///
/// Answers `url_verification` with the challenge and hands `message` events
/// to the bot. Responds as soon as the message is stored; the reply is
/// generated in the background.
pub async fn event_subscription(
    State(state): State<AppState>,
    SlackVerified(Json(envelope)): SlackVerified<Json<EventEnvelope>>,
) -> Result<Response, AppError> {
    match envelope {
        EventEnvelope::UrlVerification { challenge } => {
            tracing::info!("answered url verification");
            Ok(challenge.into_response())
        }
        EventEnvelope::EventCallback {
            event, event_id, ..
        } => {
            match event {
                InnerEvent::Message(message) => {
                    handle_message(&state, &message, event_id.as_deref()).await?
                }
                // Mentions are also delivered as `message` events.
                InnerEvent::AppMention(_) => {}
                InnerEvent::Other => tracing::debug!("ignoring unsupported inner event"),
            }
            Ok(StatusCode::OK.into_response())
        }
        EventEnvelope::Other => Err(AppError::Validation("unsupported event type".to_string())),
    }
}

async fn handle_message(
    state: &AppState,
    message: &MessageEvent,
    event_id: Option<&str>,
) -> Result<(), AppError> {
    match state.bot.on_message(message).await {
        Ok(disposition) => {
            tracing::debug!(?disposition, event_id, "message handled");
            Ok(())
        }
        // Storage failures surface as 5xx so Slack redelivers; redelivery is idempotent.
        Err(e @ BotError::Store(_)) => Err(e.into()),
        Err(e) => {
            tracing::warn!(error = %e, event_id, "message stored but not answered");
            Ok(())
        }
    }
}
