// ── Domain model ──
//
// Records are the wire types from `podoscan-api`, used verbatim. This module
// adds the client-side behaviour stores need: identity and the fixed set of
// text fields a search term is matched against.

mod search;

pub use podoscan_api::types::{
    Appointment, AuthSession, Device, Doctor, EditAppointmentPatientData, EntityId, Family,
    Patient, Session, SessionRecord, UpsertAppointment, UpsertDevice, UpsertDoctor, UpsertFamily,
    UpsertPatient, UserAccount, UserKind,
};
pub use search::{Entity, timestamp_text};
