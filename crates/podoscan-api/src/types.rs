// Wire types for the Podoscan clinic API.
//
// Records are deserialized verbatim from the server's camelCase JSON.
// The only transformation is defaulting: absent numeric channels and
// percentages become 0, absent collections become empty.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumString};

// ── EntityId ────────────────────────────────────────────────────────

/// Opaque server-assigned identifier. Stable for the lifetime of a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for EntityId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ── Lenient numbers ─────────────────────────────────────────────────

/// Accept a JSON number, a numeric string (decimal columns), or null.
/// Anything unparseable collapses to `0.0`.
fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(f64),
        Text(String),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Num(n)) => n,
        Some(Raw::Text(s)) => s.trim().parse().unwrap_or(0.0),
        None => 0.0,
    })
}

// ── Lenient timestamps ──────────────────────────────────────────────

/// Read a server timestamp: RFC 3339 with any offset, a zone-less
/// `YYYY-MM-DD[T ]HH:MM:SS[.fff]` taken as UTC, or a bare date at midnight
/// UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|day| day.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}

/// Required timestamp. Null, missing or unreadable values become the Unix
/// epoch so one bad row does not sink a whole collection.
fn lenient_datetime<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_datetime_opt(deserializer)?.unwrap_or_default())
}

fn lenient_datetime_opt<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let parsed = parse_timestamp(&raw);
    if parsed.is_none() {
        tracing::warn!(value = %raw, "unreadable timestamp");
    }
    Ok(parsed)
}

// ── Users ───────────────────────────────────────────────────────────

/// Role of the account behind a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum UserKind {
    Admin,
    Doctor,
    Patient,
    Family,
    #[default]
    #[serde(other)]
    Unknown,
}

/// User account embedded in patients, doctors and families.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    #[serde(default)]
    pub id: Option<EntityId>,
    #[serde(default)]
    pub fullname: String,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "type", default)]
    pub kind: UserKind,
}

// ── Clinic entities ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: EntityId,
    pub user: UserAccount,
    #[serde(default)]
    pub device: Option<Box<Device>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    pub id: EntityId,
    pub user: UserAccount,
    #[serde(default)]
    pub specialty: Option<String>,
}

/// A pressure-sensing insole / acquisition unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: EntityId,
    #[serde(default)]
    pub serial_number: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub patient: Option<Box<Patient>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Family {
    pub id: EntityId,
    pub user: UserAccount,
    #[serde(default)]
    pub patients: Vec<Patient>,
}

/// A clinical appointment with the doctor's foot-pressure readings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: EntityId,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub appointment_at: DateTime<Utc>,
    #[serde(default)]
    pub original_url: Option<String>,
    #[serde(default)]
    pub processed_url: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub created_at: DateTime<Utc>,
    pub patient: Patient,
    pub doctor: Doctor,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub contact_total_pct: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub forefoot_pct: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub midfoot_pct: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub rearfoot_pct: f64,
}

/// A recording session: one device strapped to one patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: EntityId,
    #[serde(default)]
    pub patient: Option<Patient>,
    #[serde(default)]
    pub device: Option<Device>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub started_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "lenient_datetime_opt")]
    pub ended_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub records: Vec<SessionRecord>,
}

/// One timestamped sensor sample.
///
/// `p1`..`p5` run heel → midfoot → forefoot; `a*` is acceleration,
/// `g*` angular rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: EntityId,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub p1: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub p2: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub p3: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub p4: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub p5: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub ax: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub ay: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub az: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub gx: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub gy: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub gz: f64,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub recorded_at: DateTime<Utc>,
}

// ── Request payloads ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertAppointment {
    pub patient_id: EntityId,
    pub doctor_id: EntityId,
    pub appointment_at: DateTime<Utc>,
}

/// Clinical data edit: doctor's note plus the four pressure percentages.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditAppointmentPatientData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_total_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forefoot_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub midfoot_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rearfoot_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertPatient {
    pub fullname: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<EntityId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertDoctor {
    pub fullname: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialty: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertDevice {
    pub serial_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertFamily {
    pub fullname: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default)]
    pub patient_ids: Vec<EntityId>,
}

// ── Auth ────────────────────────────────────────────────────────────

/// Successful login response.
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "RawAuthSession")]
pub struct AuthSession {
    pub access_token: SecretString,
    pub user: UserAccount,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAuthSession {
    #[serde(alias = "token", alias = "access_token")]
    access_token: String,
    user: UserAccount,
}

impl From<RawAuthSession> for AuthSession {
    fn from(raw: RawAuthSession) -> Self {
        Self {
            access_token: SecretString::from(raw.access_token),
            user: raw.user,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn patient_json(id: &str, name: &str) -> serde_json::Value {
        json!({
            "id": id,
            "user": { "fullname": name, "email": format!("{id}@clinic.test"), "type": "patient" }
        })
    }

    #[test]
    fn appointment_percentages_default_to_zero() {
        let raw = json!({
            "id": "a1",
            "appointmentAt": "2024-06-15T10:30:00.000Z",
            "createdAt": "2024-06-01T08:00:00.000Z",
            "patient": patient_json("p1", "Ana Ruiz"),
            "doctor": { "id": "d1", "user": { "fullname": "Dr. Vega", "email": "vega@clinic.test", "type": "doctor" } },
            "forefootPct": "42.50",
            "midfootPct": null
        });

        let appt: Appointment = serde_json::from_value(raw).unwrap();
        assert_eq!(appt.contact_total_pct, 0.0);
        assert_eq!(appt.forefoot_pct, 42.5);
        assert_eq!(appt.midfoot_pct, 0.0);
        assert_eq!(appt.rearfoot_pct, 0.0);
        assert_eq!(appt.note, None);
        assert_eq!(appt.patient.user.kind, UserKind::Patient);
    }

    #[test]
    fn session_records_default_missing_channels() {
        let raw = json!({
            "id": "s1",
            "startedAt": "2024-06-15T10:30:00Z",
            "records": [{ "id": "r1", "p1": 12.5, "ax": "0.25", "recordedAt": "2024-06-15T10:30:01Z" }]
        });

        let session: Session = serde_json::from_value(raw).unwrap();
        let rec = &session.records[0];
        assert_eq!(rec.p1, 12.5);
        assert_eq!(rec.p2, 0.0);
        assert_eq!(rec.ax, 0.25);
        assert!(session.ended_at.is_none());
        assert!(session.patient.is_none());
    }

    #[test]
    fn timestamps_accept_offsets_and_zoneless_forms() {
        let utc = parse_timestamp("2024-06-15T10:30:00.000Z").unwrap();
        assert_eq!(parse_timestamp("2024-06-15T12:30:00+02:00"), Some(utc));
        assert_eq!(parse_timestamp("2024-06-15T10:30:00"), Some(utc));
        assert_eq!(parse_timestamp("2024-06-15 10:30:00.000"), Some(utc));
        assert_eq!(
            parse_timestamp("2024-06-15").unwrap().to_rfc3339(),
            "2024-06-15T00:00:00+00:00"
        );
        assert_eq!(parse_timestamp("next tuesday"), None);
    }

    #[test]
    fn bad_timestamp_does_not_reject_the_collection() {
        let raw = json!([
            { "id": "s1", "startedAt": "2024-06-15T10:30:00Z", "endedAt": "garbage" },
            { "id": "s2", "startedAt": "15/06/2024", "endedAt": null }
        ]);

        let sessions: Vec<Session> = serde_json::from_value(raw).unwrap();
        assert_eq!(sessions.len(), 2);
        assert!(sessions[0].ended_at.is_none());
        assert_eq!(sessions[1].started_at, DateTime::<Utc>::default());
    }

    #[test]
    fn unknown_user_kind_is_preserved_as_unknown() {
        let user: UserAccount =
            serde_json::from_value(json!({ "fullname": "X", "email": "x@y", "type": "auditor" }))
                .unwrap();
        assert_eq!(user.kind, UserKind::Unknown);
    }

    #[test]
    fn edit_patient_data_skips_absent_fields() {
        let body = EditAppointmentPatientData {
            forefoot_pct: Some(30.0),
            note: Some("arch collapse".into()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({ "forefootPct": 30.0, "note": "arch collapse" })
        );
    }

    #[test]
    fn entity_id_is_transparent() {
        let id: EntityId = serde_json::from_value(json!("abc-123")).unwrap();
        assert_eq!(id.as_str(), "abc-123");
        assert_eq!(serde_json::to_value(&id).unwrap(), json!("abc-123"));
    }
}
