//! Pantheon Gateway: HTTP front for the companion engine.
//!
//! Routes a chat turn through `CompanionService` and exposes the persona catalog and cycle
//! utilities. Stateless: sessions and cycle history arrive with each request.

mod config;
mod handlers;

use std::sync::Arc;

use axum::{
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use pantheon_core::{CompanionConfig, CompanionService};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::GatewayConfig;

pub struct AppState {
    pub config: GatewayConfig,
    pub companion: Arc<CompanionService>,
}

fn is_local_origin(origin: &str) -> bool {
    ["http://localhost", "http://127.0.0.1"].iter().any(|base| {
        origin == *base
            || origin
                .strip_prefix(base)
                .and_then(|rest| rest.strip_prefix(':'))
                .is_some_and(|port| port.parse::<u16>().is_ok())
    })
}

fn cors_layer(allowed: Vec<String>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(move |origin: &HeaderValue, _| {
            let s = origin.to_str().unwrap_or("");
            is_local_origin(s) || allowed.iter().any(|a| a == s)
        }))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(tower_http::cors::Any)
}

pub fn build_app(state: Arc<AppState>) -> Router {
    let cors = cors_layer(state.config.allowed_origins.clone());
    Router::new()
        .route("/health", get(health))
        .route("/api/ai/chat", post(handlers::chat::chat))
        .route("/api/personas", get(handlers::chat::personas))
        .route("/api/cycle/phase", post(handlers::cycle::phase))
        .route("/api/cycle/irregularity", post(handlers::cycle::irregularity))
        .route("/api/cycle/predictions", post(handlers::cycle::predictions))
        .with_state(state)
        .layer(CatchPanicLayer::custom(handlers::panic_response))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

async fn health() -> &'static str {
    "OK"
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = GatewayConfig::load()?;
    let companion = Arc::new(CompanionService::from_config(CompanionConfig::from_env()));
    let addr = config.bind_addr();
    tracing::info!(target: "pantheon::gateway", app = %config.app_name, %addr, "Gateway starting");

    let app = build_app(Arc::new(AppState { config, companion }));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use pantheon_core::OfflineGenerator;
    use tower::ServiceExt;

    fn test_app() -> Router {
        let config = GatewayConfig {
            app_name: "Test Pantheon".to_string(),
            host: "127.0.0.1".to_string(),
            port: 0,
            allowed_origins: vec![],
        };
        let companion = Arc::new(CompanionService::new(
            CompanionConfig::default(),
            Arc::new(OfflineGenerator),
        ));
        build_app(Arc::new(AppState { config, companion }))
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(res: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn local_origins_are_recognised() {
        assert!(is_local_origin("http://localhost:3000"));
        assert!(is_local_origin("http://127.0.0.1"));
        assert!(!is_local_origin("http://localhost.evil.example"));
        assert!(!is_local_origin("https://example.com"));
    }

    #[tokio::test]
    async fn health_is_ok() {
        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let res = test_app().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn blank_message_is_bad_request() {
        let res = test_app()
            .oneshot(post_json("/api/ai/chat", serde_json::json!({ "message": "  " })))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let json = json_body(res).await;
        assert_eq!(json["error"], "Message is required");

        let res = test_app()
            .oneshot(post_json("/api/ai/chat", serde_json::json!({ "currentPersonaId": "peace" })))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn offline_chat_returns_fallback_with_care_tips() {
        let body = serde_json::json!({
            "message": "I have bad cramps today",
            "currentPersonaId": "strategic",
            "conversationHistory": [
                { "role": "user", "content": "hi" },
                { "role": "assistant", "content": "hello", "personaId": "strategic" }
            ],
            "cycleData": {
                "phase": "menstrual",
                "cycleDay": 2,
                "daysUntilNext": 26,
                "symptoms": ["cramps"],
                "averageCycleLength": 28
            }
        });
        let res = test_app().oneshot(post_json("/api/ai/chat", body)).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let json = json_body(res).await;
        assert_eq!(json["personaId"], "nurturing");
        assert_eq!(json["personaName"], "Demeter");
        assert_eq!(json["switchedPersona"], true);
        assert_eq!(json["empathyLevel"], 10);
        assert_eq!(json["detectedEmotion"], "neutral");
        assert_eq!(json["cycleContext"]["phase"], "menstrual");
        assert_eq!(json["cycleContext"]["daysUntilNext"], 26);
        let message = json["message"].as_str().unwrap();
        assert!(message.starts_with("I'm here to nurture your body and soul."));
        assert!(message.contains("🌸 Gentle care tips:\n• Use a heating pad for cramps"));
    }

    #[tokio::test]
    async fn personas_lists_catalog() {
        let req = Request::builder().uri("/api/personas").body(Body::empty()).unwrap();
        let res = test_app().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let json = json_body(res).await;
        let list = json.as_array().unwrap();
        assert_eq!(list.len(), 8);
        assert_eq!(list[0]["id"], "strategic");
        assert_eq!(list[0]["name"], "Athena");
        assert_eq!(list[4]["communicationStyle"], "Gentle and nurturing");
    }

    #[tokio::test]
    async fn phase_endpoint_computes_snapshot() {
        let body = serde_json::json!({
            "history": [{ "startDate": "2026-10-01", "symptoms": ["Bloating"] }],
            "now": "2026-10-14T09:00:00Z"
        });
        let res = test_app().oneshot(post_json("/api/cycle/phase", body)).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let json = json_body(res).await;
        assert_eq!(json["snapshot"]["phase"], "ovulatory");
        assert_eq!(json["snapshot"]["cycleDay"], 14);
        assert_eq!(json["snapshot"]["fertileWindow"]["start"], "2026-10-10");
        assert_eq!(json["caption"], "Peak energy and confidence");
        assert_eq!(json["quickTips"].as_array().unwrap().len(), 4);

        let res = test_app()
            .oneshot(post_json("/api/cycle/phase", serde_json::json!({ "history": [] })))
            .await
            .unwrap();
        let json = json_body(res).await;
        assert!(json["snapshot"].is_null());
    }

    #[tokio::test]
    async fn irregularity_endpoint_reports_variation() {
        let res = test_app()
            .oneshot(post_json(
                "/api/cycle/irregularity",
                serde_json::json!({ "cycleLengths": [20, 60, 25] }),
            ))
            .await
            .unwrap();
        let json = json_body(res).await;
        assert_eq!(json["isIrregular"], true);
        assert_eq!(
            json["recommendation"],
            "Consider consulting a healthcare provider about cycle irregularity"
        );
    }

    #[tokio::test]
    async fn predictions_default_to_six_and_cap_count() {
        let res = test_app()
            .oneshot(post_json(
                "/api/cycle/predictions",
                serde_json::json!({ "lastPeriodStart": "2026-10-01" }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let json = json_body(res).await;
        let dates = json["dates"].as_array().unwrap();
        assert_eq!(dates.len(), 6);
        assert_eq!(dates[0], "2026-10-29");

        let res = test_app()
            .oneshot(post_json(
                "/api/cycle/predictions",
                serde_json::json!({ "lastPeriodStart": "2026-10-01", "count": 100 }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let res = test_app()
            .oneshot(post_json(
                "/api/cycle/predictions",
                serde_json::json!({ "lastPeriodStart": "2026-01-01", "cycleLength": 4_000_000_000u32 }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let json = json_body(res).await;
        assert_eq!(json["error"], "cycleLength must be between 1 and 120");
    }

    #[tokio::test]
    async fn oversized_cycle_numbers_get_bad_request() {
        let res = test_app()
            .oneshot(post_json(
                "/api/ai/chat",
                serde_json::json!({
                    "message": "hello",
                    "cycleData": { "phase": "luteal", "cycleDay": 4_000_000_000u32 }
                }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let res = test_app()
            .oneshot(post_json(
                "/api/cycle/phase",
                serde_json::json!({
                    "history": [{ "startDate": "2026-01-01" }],
                    "profile": { "averageCycleLength": 4_000_000_000u32 }
                }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_phase_with_cramps_routes_to_nurturing() {
        let body = serde_json::json!({
            "message": "my career",
            "currentPersonaId": "strategic",
            "cycleData": { "phase": "unknown", "symptoms": ["cramps"] }
        });
        let res = test_app().oneshot(post_json("/api/ai/chat", body)).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let json = json_body(res).await;
        assert_eq!(json["personaId"], "nurturing");
        assert_eq!(json["switchedPersona"], true);
    }

    #[tokio::test]
    async fn panicking_handler_returns_generic_500() {
        async fn boom() -> &'static str {
            panic!("boom")
        }
        let app = Router::new()
            .route("/boom", get(boom))
            .layer(CatchPanicLayer::custom(handlers::panic_response));
        let req = Request::builder().uri("/boom").body(Body::empty()).unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = json_body(res).await;
        assert_eq!(json["error"], "Failed to generate response");
    }
}
