//! Axum router configuration.
//!
//! Webhook paths come from `server.event_subscription_path` and
//! `server.interaction_path`; `/health` is fixed.

use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let events_path = route_path(&state.config.server.event_subscription_path);
    let interaction_path = route_path(&state.config.server.interaction_path);

    Router::new()
        .route(&events_path, post(handlers::events::event_subscription))
        .route(&interaction_path, post(handlers::interaction::interaction))
        .route("/health", get(handlers::health::health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Axum requires a leading slash.
fn route_path(configured: &str) -> String {
    let trimmed = configured.trim();
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use secrecy::SecretString;
    use tower::ServiceExt;

    use threadline_core::bot::{BotSettings, ChatBot, ResponsePool};
    use threadline_core::chat::{BoxChatPoster, ChatPoster};
    use threadline_core::llm::BoxLlmClient;
    use threadline_core::responder::{BoxCommandResponder, CommandOutput, CommandResponder};
    use threadline_core::store::BoxConversationStore;
    use threadline_infra::llm::EchoClient;
    use threadline_infra::memory::MemoryConversationStore;
    use threadline_infra::slack::signature::sign;
    use threadline_types::config::AppConfig;
    use threadline_types::error::{PostError, ResponderError};
    use threadline_types::message::Message;

    use super::*;

    const SECRET: &str = "test-signing-secret";

    #[derive(Clone, Default)]
    struct RecordingPoster {
        posted: Arc<Mutex<Vec<String>>>,
    }

    impl ChatPoster for RecordingPoster {
        fn name(&self) -> &str {
            "recording"
        }

        async fn post_message(&self, reply: &Message) -> Result<(), PostError> {
            self.posted.lock().unwrap().push(reply.raw_text().to_string());
            Ok(())
        }

        async fn post_actionable_message(&self, reply: &Message) -> Result<(), PostError> {
            self.post_message(reply).await
        }
    }

    struct FixedResponder;

    impl CommandResponder for FixedResponder {
        async fn handle(&self, _script: &str) -> Result<CommandOutput, ResponderError> {
            Ok(CommandOutput {
                output: "hi\n".into(),
                exit_code: Some(0),
            })
        }
    }

    fn test_state(signing_secret: Option<&str>) -> (AppState, RecordingPoster) {
        let poster = RecordingPoster::default();
        let settings = BotSettings {
            bot_id: "UBOT".into(),
            ..Default::default()
        };
        let bot = ChatBot::new(
            BoxConversationStore::new(MemoryConversationStore::new("UBOT")),
            BoxLlmClient::new(EchoClient::new()),
            BoxChatPoster::new(poster.clone()),
            BoxCommandResponder::new(FixedResponder),
            settings,
            ResponsePool::new(4),
        );
        let state = AppState::new(
            Arc::new(bot),
            Arc::new(AppConfig::default()),
            signing_secret.map(|s| SecretString::from(s.to_string())),
        );
        (state, poster)
    }

    fn signed_post(path: &str, content_type: &str, body: &str) -> Request<Body> {
        let ts = chrono::Utc::now().timestamp().to_string();
        let sig = sign(SECRET.as_bytes(), &ts, body.as_bytes()).unwrap();
        Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, content_type)
            .header("x-slack-request-timestamp", ts)
            .header("x-slack-signature", sig)
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn json_post(path: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_string(resp: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn wait_for_posts(poster: &RecordingPoster, n: usize) -> Vec<String> {
        for _ in 0..100 {
            let posted = poster.posted.lock().unwrap().clone();
            if posted.len() >= n {
                return posted;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        poster.posted.lock().unwrap().clone()
    }

    fn form_encode(value: &str) -> String {
        value
            .bytes()
            .map(|b| match b {
                b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' => {
                    (b as char).to_string()
                }
                _ => format!("%{b:02X}"),
            })
            .collect()
    }

    #[tokio::test]
    async fn health_reports_store() {
        let (state, _) = test_state(None);
        let resp = build_router(state)
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = serde_json::from_str(&body_string(resp).await).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["store"], "memory");
    }

    #[tokio::test]
    async fn url_verification_echoes_challenge() {
        let (state, _) = test_state(None);
        let resp = build_router(state)
            .oneshot(json_post(
                "/subscription",
                r#"{"type":"url_verification","challenge":"3eZbrw1aBm2rZgRNFdxV2595E9CY3gmdALWMmHkvFXO7tYXAYM8P"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            body_string(resp).await,
            "3eZbrw1aBm2rZgRNFdxV2595E9CY3gmdALWMmHkvFXO7tYXAYM8P"
        );
    }

    #[tokio::test]
    async fn signed_mention_is_answered() {
        let (state, poster) = test_state(Some(SECRET));
        let body = r#"{"type":"event_callback","event_id":"Ev1","event":{"type":"message","user":"U1","text":"<@UBOT> hello there","ts":"1700000000.000100","channel":"C1"}}"#;
        let resp = build_router(state.clone())
            .oneshot(signed_post("/subscription", "application/json", body))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let posted = wait_for_posts(&poster, 1).await;
        assert_eq!(posted, vec!["hello there".to_string()]);
        let cv = state.bot.get_conversation("1700000000.000100").await.unwrap();
        assert_eq!(cv.len(), 1);
    }

    #[tokio::test]
    async fn bad_signature_is_rejected() {
        let (state, poster) = test_state(Some(SECRET));
        let mut req = signed_post(
            "/subscription",
            "application/json",
            r#"{"type":"url_verification","challenge":"x"}"#,
        );
        req.headers_mut()
            .insert("x-slack-signature", "v0=deadbeef".parse().unwrap());
        let resp = build_router(state).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert!(poster.posted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_signature_is_rejected() {
        let (state, _) = test_state(Some(SECRET));
        let resp = build_router(state)
            .oneshot(json_post(
                "/subscription",
                r#"{"type":"url_verification","challenge":"x"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn malformed_event_is_bad_request() {
        let (state, _) = test_state(None);
        let resp = build_router(state)
            .oneshot(json_post("/subscription", "not json"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unrelated_message_is_acknowledged_without_reply() {
        let (state, poster) = test_state(None);
        let body = r#"{"type":"event_callback","event":{"type":"message","user":"U1","text":"lunch?","ts":"1700000000.000100","channel":"C1"}}"#;
        let resp = build_router(state).oneshot(json_post("/subscription", body)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(poster.posted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn button_press_posts_script_output() {
        let (state, poster) = test_state(Some(SECRET));
        let payload = r#"{"type":"block_actions","channel":{"id":"C1"},"message":{"ts":"1700000001.000100","thread_ts":"1700000000.000100"},"actions":[{"action_id":"run-0","value":"echo hi"}]}"#;
        let body = format!("payload={}", form_encode(payload));
        let resp = build_router(state)
            .oneshot(signed_post(
                "/interaction",
                "application/x-www-form-urlencoded",
                &body,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let posted = wait_for_posts(&poster, 1).await;
        assert_eq!(posted, vec!["```echo hi```\n```hi\n```".to_string()]);
    }

    #[test]
    fn route_path_adds_leading_slash() {
        assert_eq!(route_path("events"), "/events");
        assert_eq!(route_path("/events"), "/events");
    }
}
