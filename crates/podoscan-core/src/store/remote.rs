// ── Store backends ──
//
// The remote side of an `EntityStore`. The production backend is a shared
// `PodoscanClient`; tests plug in in-memory fakes.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use podoscan_api::{Error, PatientScoped, PodoscanClient, Resource, Writable};

use crate::model::{Appointment, EditAppointmentPatientData, EntityId};

/// Read access to one entity collection.
pub trait RemoteCollection<T>: Send + Sync + 'static {
    fn list(&self) -> impl Future<Output = Result<Vec<T>, Error>> + Send;

    fn fetch(&self, id: &EntityId) -> impl Future<Output = Result<T, Error>> + Send;
}

/// Create and update on top of [`RemoteCollection`].
pub trait RemoteWritable<T>: RemoteCollection<T> {
    type Upsert: Send + Sync;

    fn create(&self, body: &Self::Upsert) -> impl Future<Output = Result<T, Error>> + Send;

    fn update(
        &self,
        id: &EntityId,
        body: &Self::Upsert,
    ) -> impl Future<Output = Result<T, Error>> + Send;
}

/// Collections that can be listed per patient.
pub trait RemotePatientScoped<T>: RemoteCollection<T> {
    fn list_by_patient(
        &self,
        patient_id: &EntityId,
    ) -> impl Future<Output = Result<Vec<T>, Error>> + Send;
}

/// Appointment-only clinical endpoints.
pub trait RemoteAppointments: RemoteCollection<Appointment> {
    fn edit_patient_data(
        &self,
        id: &EntityId,
        body: &EditAppointmentPatientData,
    ) -> impl Future<Output = Result<Appointment, Error>> + Send;

    fn upload_photo(
        &self,
        id: &EntityId,
        file: &Path,
    ) -> impl Future<Output = Result<Appointment, Error>> + Send;
}

// ── PodoscanClient backend ───────────────────────────────────────────

impl<T: Resource + Sync> RemoteCollection<T> for Arc<PodoscanClient> {
    async fn list(&self) -> Result<Vec<T>, Error> {
        PodoscanClient::list::<T>(self).await
    }

    async fn fetch(&self, id: &EntityId) -> Result<T, Error> {
        PodoscanClient::fetch::<T>(self, id).await
    }
}

impl<T: Writable + Sync> RemoteWritable<T> for Arc<PodoscanClient> {
    type Upsert = T::Upsert;

    async fn create(&self, body: &Self::Upsert) -> Result<T, Error> {
        PodoscanClient::create::<T>(self, body).await
    }

    async fn update(&self, id: &EntityId, body: &Self::Upsert) -> Result<T, Error> {
        PodoscanClient::update::<T>(self, id, body).await
    }
}

impl<T: PatientScoped + Sync> RemotePatientScoped<T> for Arc<PodoscanClient> {
    async fn list_by_patient(&self, patient_id: &EntityId) -> Result<Vec<T>, Error> {
        PodoscanClient::list_by_patient::<T>(self, patient_id).await
    }
}

impl RemoteAppointments for Arc<PodoscanClient> {
    async fn edit_patient_data(
        &self,
        id: &EntityId,
        body: &EditAppointmentPatientData,
    ) -> Result<Appointment, Error> {
        self.edit_appointment_patient_data(id, body).await
    }

    async fn upload_photo(&self, id: &EntityId, file: &Path) -> Result<Appointment, Error> {
        self.upload_appointment_photo(id, file).await
    }
}
