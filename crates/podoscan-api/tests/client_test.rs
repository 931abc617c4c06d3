#![allow(clippy::unwrap_used)]
// Integration tests for `PodoscanClient` using wiremock.

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use podoscan_api::{
    Appointment, Doctor, EditAppointmentPatientData, EntityId, Error, Patient, PodoscanClient,
    Session, UpsertAppointment, UpsertPatient,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, PodoscanClient) {
    let server = MockServer::start().await;
    let client = PodoscanClient::with_client(&server.uri(), reqwest::Client::new()).unwrap();
    (server, client)
}

fn patient(id: &str, name: &str) -> serde_json::Value {
    json!({
        "id": id,
        "user": { "id": format!("u-{id}"), "fullname": name, "email": format!("{id}@clinic.test"), "type": "patient" },
        "device": { "id": "dev-1", "serialNumber": "PS-0001", "model": "Insole v2" }
    })
}

fn appointment(id: &str, note: &str) -> serde_json::Value {
    json!({
        "id": id,
        "appointmentAt": "2024-06-15T10:30:00.000Z",
        "createdAt": "2024-06-01T08:00:00.000Z",
        "note": note,
        "patient": patient("p1", "Ana Ruiz"),
        "doctor": { "id": "d1", "user": { "fullname": "Dr. Vega", "email": "vega@clinic.test", "type": "doctor" }, "specialty": "Podiatry" },
        "status": "pending",
        "contactTotalPct": 61.2,
        "forefootPct": 30,
        "midfootPct": 10,
        "rearfootPct": 60
    })
}

// ── Authentication ──────────────────────────────────────────────────

#[tokio::test]
async fn test_login_installs_bearer_token() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({ "email": "vega@clinic.test", "password": "hunter2" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "accessToken": "tok-123",
            "user": { "id": "u1", "fullname": "Dr. Vega", "email": "vega@clinic.test", "type": "doctor" }
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/doctors"))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let secret = SecretString::from("hunter2".to_owned());
    let session = client.login("vega@clinic.test", &secret).await.unwrap();
    assert_eq!(session.user.fullname, "Dr. Vega");
    assert!(client.is_authenticated());

    let doctors: Vec<Doctor> = client.list().await.unwrap();
    assert!(doctors.is_empty());
}

#[tokio::test]
async fn test_login_rejected() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({ "statusCode": 401, "message": "Invalid credentials" })),
        )
        .mount(&server)
        .await;

    let secret = SecretString::from("wrong".to_owned());
    let result = client.login("vega@clinic.test", &secret).await;

    match result {
        Err(Error::Authentication { message }) => assert_eq!(message, "Invalid credentials"),
        other => panic!("expected Authentication error, got: {other:?}"),
    }
    assert!(!client.is_authenticated());
}

// ── Collections ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_patients() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/patients"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([patient("p1", "Ana Ruiz"), patient("p2", "Luis Soto")])),
        )
        .mount(&server)
        .await;

    let patients: Vec<Patient> = client.list().await.unwrap();

    assert_eq!(patients.len(), 2);
    assert_eq!(patients[0].user.fullname, "Ana Ruiz");
    assert_eq!(
        patients[1].device.as_ref().unwrap().serial_number,
        "PS-0001"
    );
}

#[tokio::test]
async fn test_fetch_appointment_uses_server_path() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/appoinments/a1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(appointment("a1", "flat arch")))
        .mount(&server)
        .await;

    let appt: Appointment = client.fetch(&EntityId::from("a1")).await.unwrap();
    assert_eq!(appt.note.as_deref(), Some("flat arch"));
    assert_eq!(appt.forefoot_pct, 30.0);
    assert_eq!(appt.doctor.specialty.as_deref(), Some("Podiatry"));
}

#[tokio::test]
async fn test_create_patient() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/patients"))
        .and(body_json(json!({ "fullname": "Eva Lima", "email": "eva@clinic.test" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(patient("p9", "Eva Lima")))
        .mount(&server)
        .await;

    let body = UpsertPatient {
        fullname: "Eva Lima".into(),
        email: "eva@clinic.test".into(),
        password: None,
        device_id: None,
    };
    let created: Patient = client.create(&body).await.unwrap();
    assert_eq!(created.id.as_str(), "p9");
}

#[tokio::test]
async fn test_update_appointment() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/appoinments/a1"))
        .and(body_json(json!({
            "patientId": "p1",
            "doctorId": "d1",
            "appointmentAt": "2024-06-20T09:00:00Z"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(appointment("a1", "moved")))
        .mount(&server)
        .await;

    let body = UpsertAppointment {
        patient_id: "p1".into(),
        doctor_id: "d1".into(),
        appointment_at: "2024-06-20T09:00:00Z".parse().unwrap(),
    };
    let updated: Appointment = client.update(&EntityId::from("a1"), &body).await.unwrap();
    assert_eq!(updated.note.as_deref(), Some("moved"));
}

#[tokio::test]
async fn test_sessions_by_patient() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/sessions/by-patient/p1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": "s1",
            "startedAt": "2024-06-15T10:30:00Z",
            "device": { "id": "dev-1", "serialNumber": "PS-0001" },
            "records": [
                { "id": "r1", "p1": 10, "p2": 20, "p3": "30.5", "recordedAt": "2024-06-15T10:30:01Z" }
            ]
        }])))
        .mount(&server)
        .await;

    let sessions: Vec<Session> = client
        .list_by_patient(&EntityId::from("p1"))
        .await
        .unwrap();

    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].records[0].p3, 30.5);
    assert_eq!(sessions[0].records[0].gz, 0.0);
}

// ── Appointment extras ──────────────────────────────────────────────

#[tokio::test]
async fn test_edit_patient_data_sends_only_present_fields() {
    let (server, client) = setup().await;

    Mock::given(method("PATCH"))
        .and(path("/appoinments/a1/patient-data"))
        .and(body_json(json!({ "rearfootPct": 55.5, "note": "heel load" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(appointment("a1", "heel load")))
        .mount(&server)
        .await;

    let body = EditAppointmentPatientData {
        rearfoot_pct: Some(55.5),
        note: Some("heel load".into()),
        ..Default::default()
    };
    let appt = client
        .edit_appointment_patient_data(&EntityId::from("a1"), &body)
        .await
        .unwrap();
    assert_eq!(appt.note.as_deref(), Some("heel load"));
}

#[tokio::test]
async fn test_photo_upload_is_multipart_file_field() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/appoinments/a1/photo"))
        .and(body_string_contains("name=\"file\""))
        .and(body_string_contains("filename=\"foot.png\""))
        .respond_with(ResponseTemplate::new(201).set_body_json(appointment("a1", "photo")))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("foot.png");
    std::fs::write(&file, b"PNG fake image").unwrap();

    let appt = client
        .upload_appointment_photo(&EntityId::from("a1"), &file)
        .await
        .unwrap();
    assert_eq!(appt.id.as_str(), "a1");
}

#[tokio::test]
async fn test_photo_upload_missing_file_is_io_error() {
    let (_server, client) = setup().await;

    let result = client
        .upload_appointment_photo(&EntityId::from("a1"), std::path::Path::new("/nonexistent/x.png"))
        .await;
    assert!(matches!(result, Err(Error::Io(_))), "got: {result:?}");
}

// ── Error mapping ───────────────────────────────────────────────────

#[tokio::test]
async fn test_not_found() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/doctors/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "Doctor not found" })))
        .mount(&server)
        .await;

    let result: Result<Doctor, _> = client.fetch(&EntityId::from("missing")).await;
    let err = result.unwrap_err();
    assert!(err.is_not_found(), "got: {err:?}");
}

#[tokio::test]
async fn test_validation_error_joins_messages() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/patients"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "statusCode": 400,
            "message": ["email must be an email", "fullname should not be empty"],
            "error": "Bad Request"
        })))
        .mount(&server)
        .await;

    let body = UpsertPatient {
        fullname: String::new(),
        email: "nope".into(),
        password: None,
        device_id: None,
    };
    let result: Result<Patient, _> = client.create(&body).await;

    match result {
        Err(Error::Api { status, message }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "email must be an email; fullname should not be empty");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_body_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let result: Result<Vec<podoscan_api::Device>, _> = client.list().await;
    match result {
        Err(Error::Deserialization { body, .. }) => assert!(body.contains("gateway")),
        other => panic!("expected Deserialization error, got: {other:?}"),
    }
}
