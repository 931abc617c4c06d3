//! Client-side data layer between `podoscan-api` and front ends.
//!
//! - **[`Clinic`]**: facade owning the REST client, one store per entity,
//!   the notice channel and the device controller.
//! - **[`EntityStore`]**: per-entity cache with a derived, search-filtered
//!   view published as immutable [`StoreView`] snapshots over `watch`.
//!   Read paths report failures as notices; write paths also return them.
//! - **[`PollingController`]**: refreshes one patient's sessions on a fixed
//!   period while the charts view is visible.
//! - **[`DeviceController`]**: fire-and-forget LED / servo commands over a
//!   lazily opened, process-wide MQTT link.
//! - **[`analytics`]**: dashboard KPIs, session channel averages and the
//!   family roster.

pub mod analytics;
pub mod clinic;
pub mod config;
pub mod device;
pub mod error;
pub mod model;
pub mod notify;
pub mod poll;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use analytics::{
    DashboardSummary, DayCount, FamilyRoster, RosterSort, SessionAverages, SessionPoint,
    session_series,
};
pub use clinic::{
    AppointmentStore, Clinic, DeviceStore, DoctorStore, FamilyStore, PatientStore, SessionStore,
};
pub use config::{ClinicConfig, Credentials, DEFAULT_POLL_INTERVAL, TlsVerification};
pub use device::{ActuatorDirection, DeviceControl, DeviceController, Publisher};
pub use error::CoreError;
pub use model::Entity;
pub use notify::{Notice, NoticeLevel, Notifier};
pub use poll::{PollTarget, PollingController, SessionView};
pub use store::{EntityStore, StoreStream, StoreView};
