#![allow(clippy::unwrap_used)]

use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use pretty_assertions::assert_eq;

use super::*;
use crate::model::{Doctor, Patient, UserAccount, UserKind};
use crate::notify::NoticeLevel;

// ── Fixtures ─────────────────────────────────────────────────────────

fn user(name: &str, kind: UserKind) -> UserAccount {
    UserAccount {
        id: None,
        fullname: name.into(),
        email: format!("{}@clinic.test", name.to_lowercase().replace(' ', ".")),
        kind,
    }
}

fn appt(id: &str, note: &str) -> Appointment {
    appt_for(id, note, "p1")
}

fn appt_for(id: &str, note: &str, patient_id: &str) -> Appointment {
    Appointment {
        id: id.into(),
        appointment_at: "2024-06-15T10:30:00Z".parse().unwrap(),
        original_url: None,
        processed_url: None,
        note: Some(note.into()),
        created_at: "2024-06-01T08:00:00Z".parse().unwrap(),
        patient: Patient {
            id: patient_id.into(),
            user: user("Ana Ruiz", UserKind::Patient),
            device: None,
        },
        doctor: Doctor {
            id: "d1".into(),
            user: user("Dr. Vega", UserKind::Doctor),
            specialty: None,
        },
        status: None,
        contact_total_pct: 0.0,
        forefoot_pct: 0.0,
        midfoot_pct: 0.0,
        rearfoot_pct: 0.0,
    }
}

/// In-memory backend. Upsert payloads are just the new note text.
#[derive(Default)]
struct FakeRemote {
    items: Mutex<Vec<Appointment>>,
    fail: AtomicBool,
    created: AtomicUsize,
}

impl FakeRemote {
    fn with(items: Vec<Appointment>) -> Self {
        Self {
            items: Mutex::new(items),
            ..Self::default()
        }
    }

    fn check(&self) -> Result<(), podoscan_api::Error> {
        if self.fail.load(Ordering::SeqCst) {
            Err(podoscan_api::Error::Api {
                status: 500,
                message: "boom".into(),
            })
        } else {
            Ok(())
        }
    }
}

impl RemoteCollection<Appointment> for FakeRemote {
    async fn list(&self) -> Result<Vec<Appointment>, podoscan_api::Error> {
        self.check()?;
        Ok(self.items.lock().unwrap().clone())
    }

    async fn fetch(&self, id: &EntityId) -> Result<Appointment, podoscan_api::Error> {
        self.check()?;
        self.items
            .lock()
            .unwrap()
            .iter()
            .find(|a| &a.id == id)
            .cloned()
            .ok_or_else(|| podoscan_api::Error::NotFound {
                path: format!("/appoinments/{id}"),
            })
    }
}

impl RemoteWritable<Appointment> for FakeRemote {
    type Upsert = String;

    async fn create(&self, note: &String) -> Result<Appointment, podoscan_api::Error> {
        self.check()?;
        let n = self.created.fetch_add(1, Ordering::SeqCst);
        let record = appt(&format!("new-{n}"), note);
        self.items.lock().unwrap().insert(0, record.clone());
        Ok(record)
    }

    async fn update(&self, id: &EntityId, note: &String) -> Result<Appointment, podoscan_api::Error> {
        self.check()?;
        Ok(appt(id.as_str(), note))
    }
}

impl RemotePatientScoped<Appointment> for FakeRemote {
    async fn list_by_patient(
        &self,
        patient_id: &EntityId,
    ) -> Result<Vec<Appointment>, podoscan_api::Error> {
        self.check()?;
        Ok(self
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|a| &a.patient.id == patient_id)
            .cloned()
            .collect())
    }
}

impl RemoteAppointments for FakeRemote {
    async fn edit_patient_data(
        &self,
        id: &EntityId,
        body: &EditAppointmentPatientData,
    ) -> Result<Appointment, podoscan_api::Error> {
        self.check()?;
        let mut record = appt(id.as_str(), body.note.as_deref().unwrap_or_default());
        record.forefoot_pct = body.forefoot_pct.unwrap_or_default();
        Ok(record)
    }

    async fn upload_photo(
        &self,
        id: &EntityId,
        file: &Path,
    ) -> Result<Appointment, podoscan_api::Error> {
        self.check()?;
        let mut record = appt(id.as_str(), "photo");
        record.original_url = Some(file.display().to_string());
        Ok(record)
    }
}

fn store(items: Vec<Appointment>) -> EntityStore<Appointment, FakeRemote> {
    EntityStore::new(FakeRemote::with(items), Notifier::new())
}

fn ids(items: &[Arc<Appointment>]) -> Vec<&str> {
    items.iter().map(|a| a.id.as_str()).collect()
}

// ── Fetch & search ───────────────────────────────────────────────────

#[tokio::test]
async fn fetch_all_with_empty_term_shows_everything_in_order() {
    let store = store(vec![appt("1", "a"), appt("2", "b"), appt("3", "c")]);
    store.fetch_all().await;

    let view = store.snapshot();
    assert_eq!(ids(&view.data), vec!["1", "2", "3"]);
    assert_eq!(ids(&view.filtered), ids(&view.data));
    assert_eq!(view.total(), 3);
    assert!(!view.is_loading);
}

#[tokio::test]
async fn search_narrows_and_empty_term_restores() {
    let store = store(vec![appt("1", "a"), appt("2", "b")]);
    store.fetch_all().await;

    store.apply_search("b");
    assert_eq!(ids(&store.snapshot().filtered), vec!["2"]);
    assert_eq!(store.snapshot().search, "b");

    store.apply_search("");
    assert_eq!(ids(&store.snapshot().filtered), vec!["1", "2"]);
}

#[tokio::test]
async fn search_is_case_insensitive_over_names_and_dates() {
    let store = store(vec![appt("1", "arch")]);
    store.fetch_all().await;

    store.apply_search("VEGA");
    assert_eq!(store.snapshot().filtered.len(), 1);
    store.apply_search("2024-06-15");
    assert_eq!(store.snapshot().filtered.len(), 1);
    store.apply_search("luis");
    assert!(store.snapshot().filtered.is_empty());
}

#[tokio::test]
async fn refetch_keeps_search_term() {
    let store = store(vec![appt("1", "a"), appt("2", "b")]);
    store.apply_search("b");
    store.fetch_all().await;

    let view = store.snapshot();
    assert_eq!(view.total(), 2);
    assert_eq!(ids(&view.filtered), vec!["2"]);
}

#[tokio::test]
async fn failed_fetch_keeps_cache_and_notifies() {
    let store = store(vec![appt("1", "a")]);
    store.fetch_all().await;
    let mut notices = store.notifier.subscribe();

    store.remote().fail.store(true, Ordering::SeqCst);
    store.fetch_all().await;

    let view = store.snapshot();
    assert_eq!(ids(&view.data), vec!["1"]);
    assert!(!view.is_loading);
    assert_eq!(notices.try_recv().unwrap().level, NoticeLevel::Error);
}

#[tokio::test]
async fn fetch_by_patient_scopes_collection() {
    let store = store(vec![
        appt_for("1", "a", "p1"),
        appt_for("2", "b", "p2"),
        appt_for("3", "c", "p1"),
    ]);
    store.fetch_by_patient(&EntityId::from("p1")).await;

    assert_eq!(ids(&store.snapshot().data), vec!["1", "3"]);
}

// ── Mutations ────────────────────────────────────────────────────────

#[tokio::test]
async fn create_prepends_and_notifies() {
    let store = store(vec![appt("1", "a"), appt("2", "b")]);
    store.fetch_all().await;
    let mut notices = store.notifier.subscribe();

    let created = store.create(&"fresh".to_owned()).await.unwrap();

    let view = store.snapshot();
    assert_eq!(view.total(), 3);
    assert!(Arc::ptr_eq(&view.data[0], &created));
    assert_eq!(notices.try_recv().unwrap().level, NoticeLevel::Success);
}

#[tokio::test]
async fn update_replaces_exactly_one_entry() {
    let store = store(vec![appt("1", "a"), appt("2", "b"), appt("3", "c")]);
    store.fetch_all().await;
    let before = store.snapshot();

    let updated = store
        .update(&EntityId::from("2"), &"edited".to_owned())
        .await
        .unwrap();

    let after = store.snapshot();
    assert_eq!(ids(&after.data), vec!["1", "2", "3"]);
    assert!(Arc::ptr_eq(&after.data[0], &before.data[0]));
    assert!(Arc::ptr_eq(&after.data[2], &before.data[2]));
    assert!(Arc::ptr_eq(&after.data[1], &updated));
    assert_eq!(after.data[1].note.as_deref(), Some("edited"));
}

#[tokio::test]
async fn failed_update_leaves_cache_unchanged() {
    let store = store(vec![appt("1", "a"), appt("2", "b")]);
    store.fetch_all().await;
    let before = store.snapshot();
    let mut notices = store.notifier.subscribe();

    store.remote().fail.store(true, Ordering::SeqCst);
    let result = store.update(&EntityId::from("2"), &"edited".to_owned()).await;

    assert!(result.is_err());
    let after = store.snapshot();
    assert!(!after.is_loading);
    assert!(Arc::ptr_eq(&after.data[1], &before.data[1]));
    assert_eq!(after.data[1].note.as_deref(), Some("b"));
    assert_eq!(notices.try_recv().unwrap().level, NoticeLevel::Error);
}

#[tokio::test]
async fn find_one_upserts() {
    let store = store(vec![appt("1", "a"), appt("2", "b")]);
    store.apply_search("");

    // Not cached yet: prepended.
    store.find_one(&EntityId::from("2")).await.unwrap();
    assert_eq!(ids(&store.snapshot().data), vec!["2"]);

    store.fetch_all().await;
    let found = store.find_one(&EntityId::from("1")).await.unwrap();
    let view = store.snapshot();
    assert_eq!(ids(&view.data), vec!["1", "2"]);
    assert!(Arc::ptr_eq(&view.data[0], &found));
}

#[tokio::test]
async fn find_one_missing_propagates_not_found() {
    let store = store(vec![]);
    let err = store.find_one(&EntityId::from("zz")).await.unwrap_err();
    assert!(matches!(err, CoreError::NotFound { .. }), "got {err:?}");
    assert!(!store.snapshot().is_loading);
}

#[tokio::test]
async fn clinical_edits_replace_in_place() {
    let store = store(vec![appt("1", "a"), appt("2", "b")]);
    store.fetch_all().await;

    let body = EditAppointmentPatientData {
        forefoot_pct: Some(41.0),
        note: Some("pronation".into()),
        ..Default::default()
    };
    store
        .edit_patient_data(&EntityId::from("1"), &body)
        .await
        .unwrap();
    store
        .upload_photo(&EntityId::from("2"), Path::new("/tmp/foot.png"))
        .await
        .unwrap();

    let view = store.snapshot();
    assert_eq!(ids(&view.data), vec!["1", "2"]);
    assert_eq!(view.data[0].forefoot_pct, 41.0);
    assert_eq!(view.data[1].original_url.as_deref(), Some("/tmp/foot.png"));
}

// ── Local helpers ────────────────────────────────────────────────────

#[test]
fn local_upsert_and_remove() {
    let store = store(vec![]);

    store.upsert_local(appt("1", "a"));
    store.upsert_local(appt("2", "b"));
    store.upsert_local(appt("1", "a2"));
    let view = store.snapshot();
    assert_eq!(ids(&view.data), vec!["2", "1"]);
    assert_eq!(view.data[1].note.as_deref(), Some("a2"));

    store.apply_search("a2");
    assert_eq!(store.remove_local(&EntityId::from("1")).unwrap().id.as_str(), "1");
    let view = store.snapshot();
    assert_eq!(ids(&view.data), vec!["2"]);
    assert!(view.filtered.is_empty());
    assert!(store.remove_local(&EntityId::from("nope")).is_none());
}

#[tokio::test]
async fn subscribers_see_each_mutation() {
    let store = store(vec![appt("1", "a")]);
    let mut stream = store.subscribe();
    assert_eq!(stream.current().total(), 0);

    store.fetch_all().await;
    let latest = stream.changed().await.unwrap();
    assert_eq!(latest.total(), 1);
}
