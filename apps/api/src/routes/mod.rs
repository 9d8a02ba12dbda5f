pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::pipeline::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/sessions", post(handlers::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(handlers::handle_get_session).delete(handlers::handle_delete_session),
        )
        .route(
            "/api/v1/sessions/:id/reset",
            post(handlers::handle_reset_session),
        )
        .route(
            "/api/v1/sessions/:id/resume",
            post(handlers::handle_upload_resume),
        )
        .route("/api/v1/sessions/:id/scan", post(handlers::handle_scan))
        .route("/api/v1/sessions/:id/feed", get(handlers::handle_get_feed))
        .route("/api/v1/sessions/:id/tailor", post(handlers::handle_tailor))
        .route("/api/v1/sessions/:id/queue", get(handlers::handle_get_queue))
        .route("/api/v1/sessions/:id/export", get(handlers::handle_export))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::models::application::ExportRecord;
    use crate::models::job::JobPosting;
    use crate::pipeline::orchestrator::Pipeline;
    use crate::pipeline::store::SessionStore;
    use crate::pipeline::testing::{FakeTailor, ScriptedSource};

    fn posting(n: u32) -> JobPosting {
        JobPosting {
            title: format!("Engineer {n}"),
            company: "Acme".into(),
            location: "Remote".into(),
            employment_type: "Full-time".into(),
            link: format!("https://acme.example/jobs/{n}"),
            posted_at: None,
            posted_label: String::new(),
            summary: "Build things".into(),
            source: "Company site".into(),
        }
    }

    fn app(replies: Vec<Result<Vec<JobPosting>, crate::errors::AppError>>) -> Router {
        let state = AppState {
            sessions: Arc::new(SessionStore::default()),
            pipeline: Pipeline::new(ScriptedSource::new(replies), Arc::new(FakeTailor::default())),
            config: Config::for_tests("http://127.0.0.1:9"),
        };
        build_router(state)
    }

    async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> Response {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        router.clone().oneshot(request).await.unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn create_session(router: &Router, body: Value) -> String {
        let response = send(router, "POST", "/api/v1/sessions", Some(body)).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        json_body(response).await["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let router = app(vec![]);
        let response = send(&router, "GET", "/health", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_create_session_hides_keys() {
        let router = app(vec![]);
        let response = send(
            &router,
            "POST",
            "/api/v1/sessions",
            Some(json!({ "target_titles": ["Backend Engineer"], "search_api_key": "pplx-secret" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = json_body(response).await;
        assert_eq!(body["state"], "idle");
        assert_eq!(body["search_key_configured"], true);
        assert!(!body.to_string().contains("pplx-secret"));
    }

    #[tokio::test]
    async fn test_unknown_session_is_404() {
        let router = app(vec![]);
        let response = send(
            &router,
            "GET",
            "/api/v1/sessions/6f1c1b9e-2f7a-4d7e-9d55-3c7a2b0c9e11/feed",
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_scan_tailor_export_flow() {
        let router = app(vec![Ok(vec![posting(1), posting(2)])]);
        let id = create_session(
            &router,
            json!({
                "target_titles": ["Engineer"],
                "auto_prepare": true,
                "resume_text": "Jane Doe, Rust"
            }),
        )
        .await;

        let response = send(&router, "POST", &format!("/api/v1/sessions/{id}/scan"), Some(json!({}))).await;
        assert_eq!(response.status(), StatusCode::OK);
        let report = json_body(response).await;
        assert_eq!(report["new_postings"].as_array().unwrap().len(), 2);
        assert_eq!(report["auto_tailor"]["prepared"].as_array().unwrap().len(), 2);

        let response = send(
            &router,
            "POST",
            &format!("/api/v1/sessions/{id}/tailor"),
            Some(json!({ "link": "https://acme.example/jobs/1" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(&router, "GET", &format!("/api/v1/sessions/{id}/export"), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .contains("applications_payload.json"));
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let records: Vec<ExportRecord> = serde_json::from_slice(&bytes).unwrap();
        let links: Vec<_> = records.iter().map(|r| r.job_link.as_str()).collect();
        assert_eq!(
            links,
            vec![
                "https://acme.example/jobs/1",
                "https://acme.example/jobs/2",
                "https://acme.example/jobs/1"
            ]
        );

        let response = send(&router, "GET", &format!("/api/v1/sessions/{id}/queue"), None).await;
        assert_eq!(json_body(response).await.as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_scan_provider_error_is_bad_gateway() {
        let router = app(vec![]);
        let id = create_session(&router, json!({ "target_titles": ["Engineer"] })).await;

        let response = send(&router, "POST", &format!("/api/v1/sessions/{id}/scan"), Some(json!({}))).await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(json_body(response).await["error"]["code"], "PROVIDER_ERROR");
    }

    fn multipart_upload(id: &str, filename: &str, content: &[u8]) -> Request<Body> {
        let boundary = "XBOUNDARYX";
        let mut body = format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri(format!("/api/v1/sessions/{id}/resume"))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_scan_without_body() {
        let router = app(vec![Ok(vec![posting(1)])]);
        let id = create_session(&router, json!({ "target_titles": ["Engineer"] })).await;

        let response = send(&router, "POST", &format!("/api/v1/sessions/{id}/scan"), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let report = json_body(response).await;
        assert_eq!(report["returned"], 1);
        assert!(report["auto_tailor"].is_null());
    }

    #[tokio::test]
    async fn test_unreadable_pdf_upload_is_bad_request() {
        let router = app(vec![]);
        let id = create_session(&router, json!({ "target_titles": ["Engineer"] })).await;

        let request = multipart_upload(&id, "cv.pdf", b"%PDF-1.7\nnot really a pdf\n%%EOF");
        let response = router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["code"], "VALIDATION_ERROR");

        let response = send(&router, "GET", &format!("/api/v1/sessions/{id}"), None).await;
        assert_eq!(json_body(response).await["has_resume"], false);
    }

    #[tokio::test]
    async fn test_resume_upload_and_reset() {
        let router = app(vec![Ok(vec![posting(1)])]);
        let id = create_session(&router, json!({ "target_titles": ["Engineer"] })).await;

        let request = multipart_upload(&id, "cv.txt", b"Jane Doe\nRust engineer");
        let response = router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let upload = json_body(response).await;
        assert_eq!(upload["filename"], "cv.txt");

        send(&router, "POST", &format!("/api/v1/sessions/{id}/scan"), Some(json!({}))).await;
        let response = send(&router, "POST", &format!("/api/v1/sessions/{id}/reset"), None).await;
        let summary = json_body(response).await;
        assert_eq!(summary["feed_len"], 0);
        assert_eq!(summary["has_resume"], true);
        assert_eq!(summary["resume_filename"], "cv.txt");

        let response = send(&router, "DELETE", &format!("/api/v1/sessions/{id}"), None).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let response = send(&router, "GET", &format!("/api/v1/sessions/{id}"), None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
