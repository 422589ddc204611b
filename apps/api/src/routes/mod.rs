pub mod health;

use axum::{
    http::Uri,
    routing::{get, post},
    Router,
};

use crate::errors::AppError;
use crate::generation::handlers;
use crate::state::AppState;

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {}", uri.path()))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/generate", post(handlers::handle_generate))
        .fallback(not_found)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::budget::TokenCounter;
    use crate::config::Config;
    use crate::generation::generator::{ContentGenerator, GenerationSettings};
    use crate::generation::platform::PlatformRuleTable;
    use crate::generation::policy::DenylistPolicy;
    use crate::generation::prompt_builder::PromptBuilder;
    use crate::llm_client::testing::ScriptedLlm;
    use crate::persona::InMemoryPersonaStore;

    fn app(llm: ScriptedLlm) -> Router {
        let config = Config::from_lookup(|_| None).unwrap();
        let generator = ContentGenerator::new(
            Arc::new(llm),
            Arc::new(InMemoryPersonaStore::new()),
            Arc::new(DenylistPolicy),
            PromptBuilder::new(PlatformRuleTable::default()),
            TokenCounter::new().unwrap(),
            GenerationSettings {
                model: config.llm_model.clone(),
                temperature: config.llm_temperature,
                max_attempts: config.generation_max_attempts,
                auto_hashtags: false,
            },
        );
        build_router(AppState {
            generator: Arc::new(generator),
            config,
        })
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_generate(body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/generate")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app(ScriptedLlm::default())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "composer-api");
    }

    #[tokio::test]
    async fn test_generate_returns_camel_case_result() {
        let response = app(ScriptedLlm::new(["Great tips! #growth #ai"]))
            .oneshot(post_generate(json!({
                "sourceText": "growth tips",
                "platform": "twitter",
                "includeHashtags": false
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["variants"][0]["content"], "Great tips!");
        assert_eq!(body["variants"][0]["metadata"]["wasTruncated"], false);
        assert_eq!(body["metadata"]["personaUsed"], "default");
        assert!(body["metadata"]["processingTime"].is_u64());
        assert!(body.get("error").is_none());
    }

    #[tokio::test]
    async fn test_generate_validation_error_is_400() {
        let response = app(ScriptedLlm::default())
            .oneshot(post_generate(json!({"sourceText": "x", "variantCount": 9})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_llm_failure_is_reported_in_body() {
        let response = app(ScriptedLlm::default())
            .oneshot(post_generate(json!({"sourceText": "x"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["variants"], json!([]));
        assert!(body["error"].as_str().unwrap().contains("503"));
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let response = app(ScriptedLlm::default())
            .oneshot(Request::get("/api/v1/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
