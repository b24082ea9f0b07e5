// Integration tests for the AI dispatch relay

use actix_web::{test, web, App};
use fleet_dispatch::config::GeminiSettings;
use fleet_dispatch::routes::{self, AppState};
use fleet_dispatch::services::{Dispatcher, NO_RESPONSE_PLACEHOLDER};
use mockito::{Matcher, Mock, ServerGuard};
use serde_json::{json, Value};
use std::sync::Arc;

const GENERATE_PATH: &str = "/v1/models/gemini-1.5-flash:generateContent";

fn create_state(endpoint: &str, api_key: Option<&str>) -> AppState {
    let settings = GeminiSettings {
        endpoint: endpoint.to_string(),
        api_key: api_key.map(str::to_string),
        ..GeminiSettings::default()
    };
    AppState {
        dispatcher: Arc::new(Dispatcher::new(&settings).unwrap()),
        max_body_bytes: 8 * 1024 * 1024,
    }
}

fn fleet_request(query: &str) -> Value {
    json!({
        "userQuery": query,
        "context": {
            "drivers": [{
                "id": "drv-1",
                "name": "Giulia",
                "surname": "Bianchi",
                "isAvailable": true,
                "dailyHoursUsed": 2,
                "weeklyHoursUsed": 30.5,
                "adrCertificate": true,
                "licenseDeadline": "2027-04-30T00:00:00.000Z",
                "cqcDeadline": "2026-11-02T00:00:00.000Z",
                "notes": "Preferisce tratte nord"
            }],
            "vehicles": [{
                "id": "veh-1",
                "plate": "AB123CD",
                "brand": "Iveco",
                "model": "S-Way",
                "type": "TRACTOR",
                "maxCapacityKg": 24000,
                "maxCapacityM3": 90,
                "isAvailable": true,
                "revisionDeadline": "2026-09-01T00:00:00.000Z",
                "insuranceDeadline": "2027-01-15T00:00:00.000Z",
                "notes": null
            }],
            "trips": [{
                "id": "trip-1",
                "status": "PLANNED",
                "cargoType": "Vernici",
                "cargoWeight": 8000,
                "isInternational": true,
                "isAdr": true,
                "startDate": "2026-03-10T05:00:00.000Z",
                "totalKm": 980,
                "estimatedCost": 1850,
                "stops": [
                    { "city": "Torino", "type": "PICKUP" },
                    { "city": "Monaco di Baviera", "type": "DELIVERY" }
                ],
                "driverId": null,
                "vehicleId": null
            }]
        }
    })
}

fn candidates_body(text: &str) -> String {
    json!({ "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }] })
        .to_string()
}

async fn mock_generate(server: &mut ServerGuard, status: usize, body: &str, hits: usize) -> Mock {
    server
        .mock("POST", GENERATE_PATH)
        .match_query(Matcher::UrlEncoded("key".into(), "test-key".into()))
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(body)
        .expect(hits)
        .create_async()
        .await
}

#[actix_web::test]
async fn test_dispatch_relays_first_candidate() {
    let mut server = mockito::Server::new_async().await;
    let answer = "## Analisi\n1. **Assegna** Giulia al viaggio trip-1";
    let mock = mock_generate(&mut server, 200, &candidates_body(answer), 1).await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(create_state(&server.url(), Some("test-key"))))
            .configure(routes::configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/ai-dispatch")
        .set_json(fleet_request("Assegna autisti ai viaggi"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["result"], answer);
    mock.assert_async().await;
}

#[actix_web::test]
async fn test_prompt_carries_rendered_context() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", GENERATE_PATH)
        .match_query(Matcher::Any)
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex("Certificato ADR: ✅ Sì".to_string()),
            Matcher::Regex("Internazionale: 🌍 Sì".to_string()),
            Matcher::Regex("Capac.: 24.000 kg / 90 m³".to_string()),
            Matcher::Regex("Torino \\(PICKUP\\) → Monaco di Baviera \\(DELIVERY\\)".to_string()),
            Matcher::Regex("Verifica compliance ADR".to_string()),
        ]))
        .with_status(200)
        .with_body(candidates_body("ok"))
        .expect(1)
        .create_async()
        .await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(create_state(&server.url(), Some("test-key"))))
            .configure(routes::configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/ai-dispatch")
        .set_json(fleet_request("Verifica compliance ADR"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);
    mock.assert_async().await;
}

#[actix_web::test]
async fn test_missing_credential_makes_no_upstream_call() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", Matcher::Any)
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(create_state(&server.url(), None)))
            .configure(routes::configure_routes),
    )
    .await;

    for payload in ["{}", "not even json", r#"{"userQuery":"Ottimizza rotte"}"#] {
        let req = test::TestRequest::post()
            .uri("/api/ai-dispatch")
            .insert_header(("content-type", "application/json"))
            .set_payload(payload)
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), 503);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().contains("GEMINI_API_KEY"));
        assert!(body["details"].as_str().unwrap().contains("aistudio.google.com"));
    }

    mock.assert_async().await;
}

#[actix_web::test]
async fn test_missing_credential_wins_over_oversized_body() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(create_state("http://127.0.0.1:9", None)))
            .configure(routes::configure_routes),
    )
    .await;

    // Larger than actix's default 256 KiB extractor limit
    let padding = "x".repeat(300 * 1024);
    let req = test::TestRequest::post()
        .uri("/api/ai-dispatch")
        .set_json(json!({ "userQuery": padding }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 503);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "GEMINI_API_KEY non configurata");
}

#[actix_web::test]
async fn test_body_over_limit_is_rejected_as_json() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", Matcher::Any)
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let state = AppState {
        max_body_bytes: 1024,
        ..create_state(&server.url(), Some("test-key"))
    };
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(routes::configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/ai-dispatch")
        .set_json(fleet_request("Ottimizza rotte"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 413);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Richiesta troppo grande");
    assert!(body["details"].as_str().unwrap().contains("1024"));
    mock.assert_async().await;
}

#[actix_web::test]
async fn test_identical_requests_are_each_relayed() {
    let mut server = mockito::Server::new_async().await;
    let mock = mock_generate(&mut server, 200, &candidates_body("Assegna Giulia a trip-1."), 2).await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(create_state(&server.url(), Some("test-key"))))
            .configure(routes::configure_routes),
    )
    .await;

    for _ in 0..2 {
        let req = test::TestRequest::post()
            .uri("/api/ai-dispatch")
            .set_json(fleet_request("Assegna autisti"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), 200);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["result"], "Assegna Giulia a trip-1.");
    }

    mock.assert_async().await;
}

#[actix_web::test]
async fn test_unreachable_upstream_is_internal_error() {
    // Nothing listens on the discard port
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(create_state("http://127.0.0.1:9", Some("test-key"))))
            .configure(routes::configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/ai-dispatch")
        .set_json(fleet_request("Ottimizza rotte"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 500);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Errore interno del server");
    assert!(body["details"].as_str().unwrap().contains("HTTP request failed"));
}

#[actix_web::test]
async fn test_upstream_failure_returns_raw_body() {
    let mut server = mockito::Server::new_async().await;
    let upstream_body = r#"{"error":{"code":400,"message":"API key not valid","status":"INVALID_ARGUMENT"}}"#;
    let mock = mock_generate(&mut server, 400, upstream_body, 1).await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(create_state(&server.url(), Some("test-key"))))
            .configure(routes::configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/ai-dispatch")
        .set_json(fleet_request("Ottimizza rotte"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 502);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Errore nella risposta dell'AI");
    assert_eq!(body["details"], upstream_body);
    // Exactly one call: no retry
    mock.assert_async().await;
}

#[actix_web::test]
async fn test_no_candidates_yields_placeholder() {
    let mut server = mockito::Server::new_async().await;
    let mock = mock_generate(&mut server, 200, r#"{"candidates":[]}"#, 1).await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(create_state(&server.url(), Some("test-key"))))
            .configure(routes::configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/ai-dispatch")
        .set_json(fleet_request("Riduci costi operativi"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["result"], NO_RESPONSE_PLACEHOLDER);
    mock.assert_async().await;
}

#[actix_web::test]
async fn test_empty_context_still_dispatches() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", GENERATE_PATH)
        .match_query(Matcher::Any)
        .match_body(Matcher::Regex(r"### AUTISTI \(0 totali\)\\n\\n\\n### VEICOLI \(0 totali\)".to_string()))
        .with_status(200)
        .with_body(candidates_body("Nessun viaggio da ottimizzare."))
        .expect(1)
        .create_async()
        .await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(create_state(&server.url(), Some("test-key"))))
            .configure(routes::configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/ai-dispatch")
        .set_json(json!({
            "userQuery": "Ottimizza rotte",
            "context": { "drivers": [], "vehicles": [], "trips": [] }
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["result"], "Nessun viaggio da ottimizzare.");
    mock.assert_async().await;
}

#[actix_web::test]
async fn test_blank_query_is_rejected_before_upstream() {
    let mut server = mockito::Server::new_async().await;
    let mock = mock_generate(&mut server, 200, &candidates_body("never"), 0).await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(create_state(&server.url(), Some("test-key"))))
            .configure(routes::configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/ai-dispatch")
        .set_json(fleet_request("   "))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Richiesta non valida");
    mock.assert_async().await;
}

#[actix_web::test]
async fn test_undecodable_upstream_body_is_internal_error() {
    let mut server = mockito::Server::new_async().await;
    let mock = mock_generate(&mut server, 200, "<html>proxy error</html>", 1).await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(create_state(&server.url(), Some("test-key"))))
            .configure(routes::configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/ai-dispatch")
        .set_json(fleet_request("Pianifica la settimana"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 500);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Errore interno del server");
    assert!(body["details"].as_str().unwrap().contains("Failed to parse response"));
    mock.assert_async().await;
}

#[actix_web::test]
async fn test_health_reports_configuration() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(create_state("http://127.0.0.1:9", None)))
            .configure(routes::configure_routes),
    )
    .await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "degraded");
    assert_eq!(body["aiConfigured"], false);
}

#[actix_web::test]
async fn test_presets_endpoints() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(create_state("http://127.0.0.1:9", None)))
            .configure(routes::configure_routes),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/ai-dispatch/presets").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["presets"].as_array().unwrap().len(), 5);

    let req = test::TestRequest::get().uri("/api/ai-dispatch/presets/plan-week").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["label"], "Pianifica la settimana");

    let req = test::TestRequest::get().uri("/api/ai-dispatch/presets/nope").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}

#[actix_web::test]
async fn test_format_endpoint_escapes_html() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(create_state("http://127.0.0.1:9", None)))
            .configure(routes::configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/ai-dispatch/format")
        .set_json(json!({ "text": "## Piano\n- **<img src=x onerror=alert(1)>**" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["blocks"][0]["type"], "heading");
    assert_eq!(body["blocks"][1]["type"], "bullet");
    assert_eq!(body["blocks"][1]["content"][0]["kind"], "bold");
    let html = body["html"].as_str().unwrap();
    assert!(!html.contains("<img"));
    assert!(html.contains("&lt;img src=x onerror=alert(1)&gt;"));
}

#[actix_web::test]
async fn test_format_endpoint_rejects_bad_json() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(create_state("http://127.0.0.1:9", None)))
            .configure(routes::configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/ai-dispatch/format")
        .insert_header(("content-type", "application/json"))
        .set_payload("{\"text\": 42}")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Richiesta non valida");
}
