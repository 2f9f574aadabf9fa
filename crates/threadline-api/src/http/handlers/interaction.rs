//! Interactivity webhook (message button presses).

use axum::Form;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

use threadline_types::event::InteractionCallback;

use crate::http::error::AppError;
use crate::http::extractors::slack::SlackVerified;
use crate::state::AppState;

/// Slack posts interactions as a form with a single JSON `payload` field.
#[derive(Debug, Deserialize)]
pub struct InteractionForm {
    pub payload: String,
}

/// POST {interaction_path} - button presses on actionable replies.
pub async fn interaction(
    State(state): State<AppState>,
    SlackVerified(Form(form)): SlackVerified<Form<InteractionForm>>,
) -> Result<StatusCode, AppError> {
    let callback: InteractionCallback = serde_json::from_str(&form.payload)
        .map_err(|e| AppError::Validation(format!("invalid interaction payload: {e}")))?;

    if callback.kind != "block_actions" {
        tracing::debug!(kind = %callback.kind, "ignoring interaction");
        return Ok(StatusCode::OK);
    }

    state.bot.on_interaction(&callback).await?;
    Ok(StatusCode::OK)
}
