//! Signed-request extractor.
//!
//! `SlackVerified<T>` buffers the raw body, checks `X-Slack-Signature`
//! against it, then hands the body to the inner extractor `T` (`Json`,
//! `Form`). Verification is skipped when no signing secret is configured.

use axum::body::Body;
use axum::extract::{FromRequest, Request};
use axum::http::HeaderMap;
use secrecy::{ExposeSecret, SecretString};

use threadline_infra::slack::signature::{SIGNATURE_HEADER, TIMESTAMP_HEADER};
use threadline_infra::slack::{SignatureError, verify_slack_signature};

use crate::http::error::AppError;
use crate::state::AppState;

const MAX_BODY_BYTES: usize = 1024 * 1024;

pub struct SlackVerified<T>(pub T);

impl<T> FromRequest<AppState> for SlackVerified<T>
where
    T: FromRequest<AppState>,
    T::Rejection: std::fmt::Display,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let (parts, body) = req.into_parts();
        let bytes = axum::body::to_bytes(body, MAX_BODY_BYTES)
            .await
            .map_err(|e| AppError::Validation(format!("unreadable body: {e}")))?;

        if let Some(secret) = state.signing_secret.as_deref() {
            verify(&parts.headers, &bytes, secret)?;
        }

        let req = Request::from_parts(parts, Body::from(bytes));
        T::from_request(req, state)
            .await
            .map(SlackVerified)
            .map_err(|e| AppError::Validation(e.to_string()))
    }
}

fn verify(headers: &HeaderMap, body: &[u8], secret: &SecretString) -> Result<(), SignatureError> {
    let header = |name: &'static str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .ok_or(SignatureError::MissingHeader(name))
    };
    let timestamp = header(TIMESTAMP_HEADER)?;
    let signature = header(SIGNATURE_HEADER)?;

    verify_slack_signature(
        secret.expose_secret().as_bytes(),
        timestamp,
        body,
        signature,
        chrono::Utc::now().timestamp(),
    )
}
