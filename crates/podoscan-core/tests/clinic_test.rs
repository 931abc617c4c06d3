#![allow(clippy::unwrap_used)]
// End-to-end tests for `Clinic` against a wiremock API.

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use podoscan_core::model::{EntityId, UpsertDevice};
use podoscan_core::{Clinic, ClinicConfig, CoreError, Credentials, NoticeLevel};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, Clinic) {
    let server = MockServer::start().await;
    let config = ClinicConfig::new(Url::parse(&server.uri()).unwrap());
    let clinic = Clinic::new(config).unwrap();
    (server, clinic)
}

fn appointment(id: &str, at: &str) -> serde_json::Value {
    json!({
        "id": id,
        "appointmentAt": at,
        "createdAt": "2024-06-01T08:00:00.000Z",
        "patient": { "id": "p1", "user": { "fullname": "Ana Ruiz", "email": "ana@clinic.test", "type": "patient" } },
        "doctor": { "id": "d1", "user": { "fullname": "Dr. Vega", "email": "vega@clinic.test", "type": "doctor" } }
    })
}

async fn mount_get(server: &MockServer, route: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

// ── Tests ───────────────────────────────────────────────────────────

#[tokio::test]
async fn connect_logs_in_with_configured_credentials() {
    let server = MockServer::start().await;
    let mut config = ClinicConfig::new(Url::parse(&server.uri()).unwrap());
    config.credentials = Some(Credentials {
        email: "vega@clinic.test".into(),
        password: SecretString::from("hunter2".to_owned()),
    });
    let clinic = Clinic::new(config).unwrap();

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "accessToken": "tok",
            "user": { "fullname": "Dr. Vega", "email": "vega@clinic.test", "type": "doctor" }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/patients"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let session = clinic.connect().await.unwrap().unwrap();
    assert_eq!(session.user.fullname, "Dr. Vega");

    clinic.patients().fetch_all().await;
    assert_eq!(clinic.patients().snapshot().total(), 0);
}

#[tokio::test]
async fn dashboard_fetches_three_collections() {
    let (server, clinic) = setup().await;

    mount_get(
        &server,
        "/patients",
        json!([{ "id": "p1", "user": { "fullname": "Ana Ruiz", "email": "ana@clinic.test" } }]),
    )
    .await;
    mount_get(
        &server,
        "/devices",
        json!([{ "id": "dev1", "serialNumber": "PS-1" }, { "id": "dev2", "serialNumber": "PS-2" }]),
    )
    .await;
    mount_get(
        &server,
        "/appoinments",
        json!([
            appointment("a1", "2024-06-15T09:00:00.000Z"),
            appointment("a2", "2024-06-14T09:00:00.000Z")
        ]),
    )
    .await;

    let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
    let summary = clinic.dashboard(today).await;

    assert_eq!(summary.patients, 1);
    assert_eq!(summary.devices, 2);
    assert_eq!(summary.appointments_total, 2);
    assert_eq!(summary.appointments_today, 1);
    assert_eq!(summary.recent[0].id.as_str(), "a1");
}

#[tokio::test]
async fn failed_refresh_becomes_a_notice() {
    let (server, clinic) = setup().await;
    let mut notices = clinic.notices();

    Mock::given(method("GET"))
        .and(path("/doctors"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "db down" })))
        .mount(&server)
        .await;

    clinic.doctors().fetch_all().await;

    let notice = notices.try_recv().unwrap();
    assert_eq!(notice.level, NoticeLevel::Error);
    assert!(notice.message.contains("db down"), "{}", notice.message);
    assert!(!clinic.doctors().snapshot().is_loading);
}

#[tokio::test]
async fn rejected_create_is_returned_and_announced() {
    let (server, clinic) = setup().await;
    let mut notices = clinic.notices();

    Mock::given(method("POST"))
        .and(path("/devices"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "statusCode": 409,
            "message": "serial number already registered"
        })))
        .mount(&server)
        .await;

    let body = UpsertDevice {
        serial_number: "PS-1".into(),
        model: None,
    };
    let err = clinic.devices().create(&body).await.unwrap_err();

    assert!(matches!(err, CoreError::Rejected { .. }), "got {err:?}");
    assert_eq!(notices.try_recv().unwrap().level, NoticeLevel::Error);
    assert_eq!(clinic.devices().snapshot().total(), 0);
}

#[tokio::test]
async fn sessions_poller_fetches_patient_sessions_on_mount() {
    let (server, clinic) = setup().await;

    Mock::given(method("GET"))
        .and(path("/sessions/by-patient/p1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "s1", "startedAt": "2024-06-15T10:30:00Z", "records": [] }
        ])))
        .mount(&server)
        .await;

    let poller = clinic.session_poller(None);
    poller.mount(Some(EntityId::from("p1")));
    poller.refresh_now().await;
    poller.unmount();

    assert_eq!(clinic.sessions().snapshot().total(), 1);
}
