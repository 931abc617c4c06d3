//! Dashboard: headline counts, last-7-days series and recent appointments.

use chrono::Utc;
use tabled::Tabled;

use podoscan_core::{Clinic, DashboardSummary};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::appointments::AppointmentRow;

#[derive(Tabled)]
struct DayRow {
    #[tabled(rename = "Day")]
    day: String,
    #[tabled(rename = "Appointments")]
    count: usize,
    #[tabled(rename = "")]
    bar: String,
}

fn detail(summary: &DashboardSummary) -> String {
    let headline = format!(
        "Patients: {}   Devices: {}   Appointments: {} ({} today)",
        summary.patients, summary.devices, summary.appointments_total, summary.appointments_today
    );

    let days: Vec<DayRow> = summary
        .last_7_days
        .iter()
        .map(|d| DayRow {
            day: d.day.format("%a %d %b").to_string(),
            count: d.count,
            bar: "█".repeat(d.count),
        })
        .collect();
    let recent: Vec<AppointmentRow> = summary
        .recent
        .iter()
        .map(|a| AppointmentRow::from(a.as_ref()))
        .collect();

    let mut sections = vec![headline, String::new(), "Last 7 days".into()];
    sections.push(tabled::Table::new(days).with(tabled::settings::Style::rounded()).to_string());
    sections.push(String::new());
    sections.push("Recent appointments".into());
    if recent.is_empty() {
        sections.push("(none)".into());
    } else {
        sections
            .push(tabled::Table::new(recent).with(tabled::settings::Style::rounded()).to_string());
    }
    sections.join("\n")
}

pub async fn handle(clinic: &Clinic, global: &GlobalOpts) -> Result<(), CliError> {
    let summary = clinic.dashboard(Utc::now().date_naive()).await;
    let out = output::render_single(&global.output, &summary, detail, |s| {
        format!("{} {} {}", s.patients, s.devices, s.appointments_today)
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}
