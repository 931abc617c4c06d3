use std::borrow::Cow;

use chrono::{DateTime, SecondsFormat, Utc};

use super::{Appointment, Device, Doctor, EntityId, Family, Patient, Session};

/// A record held by an [`EntityStore`](crate::store::EntityStore).
pub trait Entity: Clone + Send + Sync + 'static {
    /// Singular noun used in notifications ("appointment", "patient").
    const LABEL: &'static str;

    fn id(&self) -> &EntityId;

    /// Text fields a search term is matched against. Missing values are
    /// simply left out.
    fn search_fields(&self) -> Vec<Cow<'_, str>>;

    /// Case-insensitive substring match over [`search_fields`](Self::search_fields).
    /// `needle` must already be lowercase; an empty needle matches everything.
    fn matches(&self, needle: &str) -> bool {
        needle.is_empty()
            || self
                .search_fields()
                .iter()
                .any(|field| field.to_lowercase().contains(needle))
    }
}

/// Searchable text of a timestamp, rendered as `Date::toISOString` does
/// (`2024-06-15T10:30:00.000Z`). This equals the server's raw text only
/// while it emits UTC with milliseconds; timestamps sent with an offset or
/// without milliseconds are searched in this normalized UTC form.
pub fn timestamp_text(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl Entity for Appointment {
    const LABEL: &'static str = "appointment";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        let mut fields = vec![
            Cow::Borrowed(self.patient.user.fullname.as_str()),
            Cow::Borrowed(self.doctor.user.fullname.as_str()),
            Cow::Owned(timestamp_text(&self.appointment_at)),
        ];
        fields.extend(self.note.as_deref().map(Cow::Borrowed));
        fields
    }
}

impl Entity for Patient {
    const LABEL: &'static str = "patient";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        let mut fields = vec![
            Cow::Borrowed(self.user.fullname.as_str()),
            Cow::Borrowed(self.user.email.as_str()),
        ];
        fields.extend(
            self.device
                .as_deref()
                .map(|d| Cow::Borrowed(d.serial_number.as_str())),
        );
        fields
    }
}

impl Entity for Doctor {
    const LABEL: &'static str = "doctor";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        let mut fields = vec![
            Cow::Borrowed(self.user.fullname.as_str()),
            Cow::Borrowed(self.user.email.as_str()),
        ];
        fields.extend(self.specialty.as_deref().map(Cow::Borrowed));
        fields
    }
}

impl Entity for Device {
    const LABEL: &'static str = "device";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        let mut fields = vec![Cow::Borrowed(self.serial_number.as_str())];
        fields.extend(self.model.as_deref().map(Cow::Borrowed));
        fields.extend(
            self.patient
                .as_deref()
                .map(|p| Cow::Borrowed(p.user.fullname.as_str())),
        );
        fields
    }
}

impl Entity for Family {
    const LABEL: &'static str = "family";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Borrowed(self.user.fullname.as_str()),
            Cow::Borrowed(self.user.email.as_str()),
        ]
    }
}

impl Entity for Session {
    const LABEL: &'static str = "session";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        let mut fields = vec![Cow::Borrowed(self.id.as_str())];
        fields.extend(
            self.device
                .as_ref()
                .map(|d| Cow::Borrowed(d.serial_number.as_str())),
        );
        fields.push(Cow::Owned(timestamp_text(&self.started_at)));
        fields
    }
}
