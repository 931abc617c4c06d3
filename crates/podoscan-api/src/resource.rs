// Generic REST endpoints for the clinic's entity collections.
//
// Every entity lives under `/{PATH}` with the same verb layout:
//   GET    /{PATH}                   list
//   GET    /{PATH}/{id}              fetch one
//   POST   /{PATH}                   create
//   PUT    /{PATH}/{id}              update
//   GET    /{PATH}/by-patient/{id}   patient-scoped list (where supported)

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::client::PodoscanClient;
use crate::error::Error;
use crate::types::{
    Appointment, Device, Doctor, EntityId, Family, Patient, Session, UpsertAppointment,
    UpsertDevice, UpsertDoctor, UpsertFamily, UpsertPatient,
};

/// A record type served by a REST collection.
pub trait Resource: DeserializeOwned + Send + 'static {
    /// Collection path relative to the API base URL.
    const PATH: &'static str;
    /// Human-readable singular name, used in logs and notifications.
    const KIND: &'static str;
}

/// A collection that accepts `POST` and `PUT`.
pub trait Writable: Resource {
    type Upsert: Serialize + Send + Sync;
}

/// A collection that also exposes `GET /{PATH}/by-patient/{id}`.
pub trait PatientScoped: Resource {}

impl Resource for Patient {
    const PATH: &'static str = "patients";
    const KIND: &'static str = "patient";
}

impl Writable for Patient {
    type Upsert = UpsertPatient;
}

impl Resource for Doctor {
    const PATH: &'static str = "doctors";
    const KIND: &'static str = "doctor";
}

impl Writable for Doctor {
    type Upsert = UpsertDoctor;
}

impl Resource for Device {
    const PATH: &'static str = "devices";
    const KIND: &'static str = "device";
}

impl Writable for Device {
    type Upsert = UpsertDevice;
}

impl Resource for Family {
    const PATH: &'static str = "families";
    const KIND: &'static str = "family";
}

impl Writable for Family {
    type Upsert = UpsertFamily;
}

// The server mounts appointments under this spelling.
impl Resource for Appointment {
    const PATH: &'static str = "appoinments";
    const KIND: &'static str = "appointment";
}

impl Writable for Appointment {
    type Upsert = UpsertAppointment;
}

impl PatientScoped for Appointment {}

impl Resource for Session {
    const PATH: &'static str = "sessions";
    const KIND: &'static str = "session";
}

impl PatientScoped for Session {}

impl PodoscanClient {
    /// `GET /{PATH}`
    pub async fn list<R: Resource>(&self) -> Result<Vec<R>, Error> {
        let items: Vec<R> = self.get(R::PATH).await?;
        debug!(kind = R::KIND, count = items.len(), "listed");
        Ok(items)
    }

    /// `GET /{PATH}/{id}`
    pub async fn fetch<R: Resource>(&self, id: &EntityId) -> Result<R, Error> {
        self.get(&format!("{}/{id}", R::PATH)).await
    }

    /// `POST /{PATH}`
    pub async fn create<R: Writable>(&self, body: &R::Upsert) -> Result<R, Error> {
        self.post(R::PATH, body).await
    }

    /// `PUT /{PATH}/{id}`
    pub async fn update<R: Writable>(&self, id: &EntityId, body: &R::Upsert) -> Result<R, Error> {
        self.put(&format!("{}/{id}", R::PATH), body).await
    }

    /// `GET /{PATH}/by-patient/{patient_id}`
    pub async fn list_by_patient<R: PatientScoped>(
        &self,
        patient_id: &EntityId,
    ) -> Result<Vec<R>, Error> {
        let items: Vec<R> = self
            .get(&format!("{}/by-patient/{patient_id}", R::PATH))
            .await?;
        debug!(kind = R::KIND, %patient_id, count = items.len(), "listed by patient");
        Ok(items)
    }
}
