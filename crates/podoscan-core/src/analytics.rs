// ── Derived clinic figures ──
//
// Pure computations over store snapshots: dashboard KPIs, per-session
// channel averages and the family patient roster.

use std::cmp::Ordering;
use std::sync::Arc;

use chrono::{Days, NaiveDate};
use serde::Serialize;
use strum::{Display, EnumString};

use crate::model::{Appointment, Device, Patient, Session, SessionRecord};

const RECENT_APPOINTMENTS: usize = 10;
const SERIES_DAYS: u64 = 7;

// ── Dashboard ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayCount {
    pub day: NaiveDate,
    pub count: usize,
}

/// Headline numbers for the clinic dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub patients: usize,
    pub devices: usize,
    pub appointments_total: usize,
    pub appointments_today: usize,
    /// One entry per day, oldest first, ending with `today`.
    pub last_7_days: Vec<DayCount>,
    /// Most recent first.
    pub recent: Vec<Arc<Appointment>>,
}

impl DashboardSummary {
    /// Days are compared in UTC, the zone appointment timestamps are stored in.
    pub fn compute(
        patients: &[Arc<Patient>],
        devices: &[Arc<Device>],
        appointments: &[Arc<Appointment>],
        today: NaiveDate,
    ) -> Self {
        let on_day = |day: NaiveDate| {
            appointments
                .iter()
                .filter(|a| a.appointment_at.date_naive() == day)
                .count()
        };

        let last_7_days = (0..SERIES_DAYS)
            .rev()
            .filter_map(|back| today.checked_sub_days(Days::new(back)))
            .map(|day| DayCount {
                day,
                count: on_day(day),
            })
            .collect();

        let mut recent = appointments.to_vec();
        recent.sort_by(|a, b| b.appointment_at.cmp(&a.appointment_at));
        recent.truncate(RECENT_APPOINTMENTS);

        Self {
            patients: patients.len(),
            devices: devices.len(),
            appointments_total: appointments.len(),
            appointments_today: on_day(today),
            last_7_days,
            recent,
        }
    }
}

// ── Session averages ─────────────────────────────────────────────────

/// Mean of each chart channel over one session's records, rounded to two
/// decimals. Only the first three pressure channels are charted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionAverages {
    pub p1: f64,
    pub p2: f64,
    pub p3: f64,
    pub ax: f64,
    pub ay: f64,
    pub az: f64,
    pub gx: f64,
    pub gy: f64,
    pub gz: f64,
}

impl SessionAverages {
    /// An empty session yields all zeros.
    #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
    pub fn of(session: &Session) -> Self {
        let records = &session.records;
        let count = records.len().max(1);
        let avg = |channel: fn(&SessionRecord) -> f64| {
            let sum: f64 = records.iter().map(channel).sum();
            round2(sum / count as f64)
        };

        Self {
            p1: avg(|r| r.p1),
            p2: avg(|r| r.p2),
            p3: avg(|r| r.p3),
            ax: avg(|r| r.ax),
            ay: avg(|r| r.ay),
            az: avg(|r| r.az),
            gx: avg(|r| r.gx),
            gy: avg(|r| r.gy),
            gz: avg(|r| r.gz),
        }
    }
}

/// One point of the sessions chart.
#[derive(Debug, Clone, Serialize)]
pub struct SessionPoint {
    /// `S1`, `S2`, ... in list order.
    pub label: String,
    /// First eight characters of the session id.
    pub short_id: String,
    pub started_on: NaiveDate,
    pub averages: SessionAverages,
}

pub fn session_series(sessions: &[Arc<Session>]) -> Vec<SessionPoint> {
    sessions
        .iter()
        .enumerate()
        .map(|(index, session)| SessionPoint {
            label: format!("S{}", index + 1),
            short_id: session.id.as_str().chars().take(8).collect(),
            started_on: session.started_at.date_naive(),
            averages: SessionAverages::of(session),
        })
        .collect()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ── Family roster ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum RosterSort {
    /// Name ascending.
    #[default]
    Az,
    /// Name descending.
    Za,
    /// Patients with a device first, then by name.
    Device,
}

/// The patients linked to one family account.
#[derive(Debug, Clone)]
pub struct FamilyRoster<'a> {
    patients: &'a [Patient],
}

impl<'a> FamilyRoster<'a> {
    pub fn new(patients: &'a [Patient]) -> Self {
        Self { patients }
    }

    pub fn total(&self) -> usize {
        self.patients.len()
    }

    pub fn with_device(&self) -> usize {
        self.patients.iter().filter(|p| has_device(p)).count()
    }

    pub fn without_device(&self) -> usize {
        self.total() - self.with_device()
    }

    /// Case-insensitive name/email filter, then `sort`.
    pub fn view(&self, query: &str, sort: RosterSort) -> Vec<&'a Patient> {
        let needle = query.trim().to_lowercase();
        let mut rows: Vec<&'a Patient> = self
            .patients
            .iter()
            .filter(|p| {
                needle.is_empty()
                    || p.user.fullname.to_lowercase().contains(&needle)
                    || p.user.email.to_lowercase().contains(&needle)
            })
            .collect();

        rows.sort_by(|a, b| match sort {
            RosterSort::Az => by_name(a, b),
            RosterSort::Za => by_name(b, a),
            RosterSort::Device => has_device(b)
                .cmp(&has_device(a))
                .then_with(|| by_name(a, b)),
        });
        rows
    }
}

fn has_device(patient: &Patient) -> bool {
    patient
        .device
        .as_deref()
        .is_some_and(|d| !d.serial_number.is_empty())
}

fn by_name(a: &Patient, b: &Patient) -> Ordering {
    a.user
        .fullname
        .to_lowercase()
        .cmp(&b.user.fullname.to_lowercase())
}
