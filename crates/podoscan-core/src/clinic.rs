// ── Clinic facade ──
//
// Owns one REST client, one store per entity, the notice channel and the
// device control handle. Front ends talk only to this type.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use podoscan_api::PodoscanClient;
use secrecy::SecretString;
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::analytics::DashboardSummary;
use crate::config::ClinicConfig;
use crate::device::{self, DeviceController};
use crate::error::CoreError;
use crate::model::{
    Appointment, AuthSession, Device, Doctor, Entity, Family, Patient, Session,
};
use crate::notify::{Notice, Notifier};
use crate::poll::PollingController;
use crate::store::EntityStore;

type Remote = Arc<PodoscanClient>;

pub type PatientStore = EntityStore<Patient, Remote>;
pub type DoctorStore = EntityStore<Doctor, Remote>;
pub type DeviceStore = EntityStore<Device, Remote>;
pub type FamilyStore = EntityStore<Family, Remote>;
pub type AppointmentStore = EntityStore<Appointment, Remote>;
pub type SessionStore = EntityStore<Session, Remote>;

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<ClinicInner>`.
#[derive(Clone)]
pub struct Clinic {
    inner: Arc<ClinicInner>,
}

struct ClinicInner {
    config: ClinicConfig,
    client: Remote,
    notifier: Notifier,
    patients: Arc<PatientStore>,
    doctors: Arc<DoctorStore>,
    devices: Arc<DeviceStore>,
    families: Arc<FamilyStore>,
    appointments: Arc<AppointmentStore>,
    sessions: Arc<SessionStore>,
}

impl Clinic {
    /// Build the client and empty stores. Does not touch the network.
    pub fn new(config: ClinicConfig) -> Result<Self, CoreError> {
        let client = Arc::new(PodoscanClient::new(
            config.api_url.as_str(),
            &config.transport(),
        )?);
        Ok(Self::with_client(config, client))
    }

    /// Build around an existing client (tests, custom transports).
    pub fn with_client(config: ClinicConfig, client: Arc<PodoscanClient>) -> Self {
        let notifier = Notifier::new();
        Self {
            inner: Arc::new(ClinicInner {
                patients: new_store(&client, &notifier),
                doctors: new_store(&client, &notifier),
                devices: new_store(&client, &notifier),
                families: new_store(&client, &notifier),
                appointments: new_store(&client, &notifier),
                sessions: new_store(&client, &notifier),
                config,
                client,
                notifier,
            }),
        }
    }

    pub fn config(&self) -> &ClinicConfig {
        &self.inner.config
    }

    pub fn client(&self) -> &Arc<PodoscanClient> {
        &self.inner.client
    }

    // ── Authentication ───────────────────────────────────────────────

    /// Authenticate and install the bearer token on the shared client.
    pub async fn login(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<AuthSession, CoreError> {
        match self.inner.client.login(email, password).await {
            Ok(session) => Ok(session),
            Err(e) => {
                self.inner.notifier.error(format!("Login failed: {e}"));
                Err(e.into())
            }
        }
    }

    /// Log in with the configured credentials, if any.
    pub async fn connect(&self) -> Result<Option<AuthSession>, CoreError> {
        let Some(creds) = self.inner.config.credentials.clone() else {
            debug!("no credentials configured; continuing unauthenticated");
            return Ok(None);
        };
        let session = self.login(&creds.email, &creds.password).await?;
        info!(user = %session.user.email, "connected to clinic API");
        Ok(Some(session))
    }

    pub fn logout(&self) {
        self.inner.client.logout();
    }

    // ── Stores ───────────────────────────────────────────────────────

    pub fn patients(&self) -> &Arc<PatientStore> {
        &self.inner.patients
    }

    pub fn doctors(&self) -> &Arc<DoctorStore> {
        &self.inner.doctors
    }

    pub fn devices(&self) -> &Arc<DeviceStore> {
        &self.inner.devices
    }

    pub fn families(&self) -> &Arc<FamilyStore> {
        &self.inner.families
    }

    pub fn appointments(&self) -> &Arc<AppointmentStore> {
        &self.inner.appointments
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.inner.sessions
    }

    // ── Observation ──────────────────────────────────────────────────

    /// Subscribe to success / error notices from every store.
    pub fn notices(&self) -> broadcast::Receiver<Notice> {
        self.inner.notifier.subscribe()
    }

    // ── Devices & polling ────────────────────────────────────────────

    /// Process-wide device controller on the configured broker.
    pub fn device_control(&self) -> DeviceController {
        device::shared(&self.inner.config.mqtt())
    }

    /// Session poller for the charts view. `None` uses the configured period.
    pub fn session_poller(&self, period: Option<Duration>) -> PollingController<SessionStore> {
        PollingController::new(
            Arc::clone(&self.inner.sessions),
            period.unwrap_or(self.inner.config.poll_interval),
        )
    }

    // ── Dashboard ────────────────────────────────────────────────────

    /// Refresh patients, devices and appointments concurrently and derive
    /// the dashboard figures. Fetch failures surface as notices; the summary
    /// is computed from whatever is cached.
    pub async fn dashboard(&self, today: NaiveDate) -> DashboardSummary {
        tokio::join!(
            self.inner.patients.fetch_all(),
            self.inner.devices.fetch_all(),
            self.inner.appointments.fetch_all(),
        );

        DashboardSummary::compute(
            &self.inner.patients.snapshot().data,
            &self.inner.devices.snapshot().data,
            &self.inner.appointments.snapshot().data,
            today,
        )
    }
}

fn new_store<T: Entity>(client: &Remote, notifier: &Notifier) -> Arc<EntityStore<T, Remote>> {
    Arc::new(EntityStore::new(Arc::clone(client), notifier.clone()))
}
