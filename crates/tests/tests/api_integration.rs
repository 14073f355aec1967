use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use triage_core::{template_for, unproductive_reply, Intent, IntentScore, Sentiment};
use triage_tests::{app_with_intents, rules_app, stub_app, unconfigured_app, BrokenIntents};

const SUPPORT_EMAIL: &str =
    "Prezados, não consigo acessar o sistema desde ontem e preciso da segunda via do boleto.";

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn health_reports_backend_and_metrics() {
    let response = rules_app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get("x-request-id").is_some());

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let parsed: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(parsed["status"], "ok");
    assert_eq!(parsed["capabilities"]["backend"], "rules");
    assert_eq!(parsed["metrics"]["requests_total"], 0);
}

#[tokio::test]
async fn index_page_is_served() {
    let response = rules_app()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(String::from_utf8_lossy(&body).contains("/processar_email"));
}

#[tokio::test]
async fn productive_email_returns_category_and_reply() {
    let app = stub_app(
        Sentiment::Neutral,
        vec![
            IntentScore::new(Intent::TechnicalIssue, 0.88),
            IntentScore::new(Intent::Request, 0.72),
            IntentScore::new(Intent::Greeting, 0.40),
        ],
    );

    let (status, body) = post_json(app, "/processar_email", json!({ "email_text": SUPPORT_EMAIL })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["categoria"], "Produtivo");
    assert_eq!(
        body["resposta"],
        format!(
            "{} Além disso, {}",
            template_for(Intent::TechnicalIssue),
            template_for(Intent::Request).to_lowercase()
        )
    );
    assert_eq!(body.as_object().unwrap().len(), 2);
}

#[tokio::test]
async fn short_email_is_unproductive() {
    let app = stub_app(Sentiment::Positive, vec![IntentScore::new(Intent::Request, 0.9)]);

    let (status, body) = post_json(app, "/v1/classify", json!({ "email_text": "Feliz Natal a todos!" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["categoria"], "Improdutivo");
    assert_eq!(body["resposta"], unproductive_reply());
}

#[tokio::test]
async fn spam_is_unproductive_even_with_positive_sentiment() {
    let app = stub_app(Sentiment::Positive, vec![IntentScore::new(Intent::Request, 0.9)]);

    let (status, body) = post_json(
        app,
        "/processar_email",
        json!({ "email_text": "Oferta exclusiva para você! Clique aqui e ganhe dinheiro agora" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["categoria"], "Improdutivo");
}

#[tokio::test]
async fn negative_email_is_unproductive() {
    let app = stub_app(Sentiment::Negative, vec![IntentScore::new(Intent::Complaint, 0.9)]);

    let (status, body) = post_json(app, "/processar_email", json!({ "email_text": SUPPORT_EMAIL })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["categoria"], "Improdutivo");
    assert_eq!(body["resposta"], unproductive_reply());
}

#[tokio::test]
async fn missing_or_blank_text_is_a_client_error() {
    for payload in [json!({}), json!({ "email_text": "" }), json!({ "email_text": "   \n" })] {
        let (status, body) = post_json(rules_app(), "/processar_email", payload).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Nenhum texto de e-mail fornecido.");
    }
}

#[tokio::test]
async fn malformed_body_is_a_client_error() {
    let request = Request::builder()
        .method("POST")
        .uri("/processar_email")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = rules_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unavailable_models_return_service_unavailable() {
    let (status, body) =
        post_json(unconfigured_app(), "/processar_email", json!({ "email_text": SUPPORT_EMAIL })).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "Serviço de IA não disponível.");
}

#[tokio::test]
async fn inference_failure_returns_server_error() {
    let app = app_with_intents(Arc::new(BrokenIntents));

    let (status, body) = post_json(app, "/processar_email", json!({ "email_text": SUPPORT_EMAIL })).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Ocorreu um erro no processamento:"));
}

#[tokio::test]
async fn rules_backend_handles_real_text_end_to_end() {
    let (status, body) =
        post_json(rules_app(), "/processar_email", json!({ "email_text": SUPPORT_EMAIL })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["categoria"], "Produtivo");
    assert!(body["resposta"]
        .as_str()
        .unwrap()
        .starts_with(template_for(Intent::TechnicalIssue)));
}
