//! Appointment command handlers.

use std::sync::Arc;

use tabled::Tabled;

use podoscan_core::Clinic;
use podoscan_core::model::{
    Appointment, EditAppointmentPatientData, EntityId, UpsertAppointment,
};

use crate::cli::{AppointmentSlot, AppointmentsArgs, AppointmentsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
pub(super) struct AppointmentRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "When (UTC)")]
    at: String,
    #[tabled(rename = "Patient")]
    patient: String,
    #[tabled(rename = "Doctor")]
    doctor: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl From<&Appointment> for AppointmentRow {
    fn from(a: &Appointment) -> Self {
        Self {
            id: a.id.to_string(),
            at: util::short_time(&a.appointment_at),
            patient: a.patient.user.fullname.clone(),
            doctor: a.doctor.user.fullname.clone(),
            status: util::or_dash(a.status.as_deref()),
        }
    }
}

fn detail(a: &Arc<Appointment>) -> String {
    let mut lines = vec![
        format!("ID:        {}", a.id),
        format!("When:      {}", a.appointment_at.to_rfc3339()),
        format!("Patient:   {} ({})", a.patient.user.fullname, a.patient.id),
        format!("Doctor:    {} ({})", a.doctor.user.fullname, a.doctor.id),
        format!("Status:    {}", util::or_dash(a.status.as_deref())),
        format!("Contact:   {:.1}%", a.contact_total_pct),
        format!("Forefoot:  {:.1}%", a.forefoot_pct),
        format!("Midfoot:   {:.1}%", a.midfoot_pct),
        format!("Rearfoot:  {:.1}%", a.rearfoot_pct),
    ];
    if let Some(ref note) = a.note {
        lines.push(format!("Note:      {note}"));
    }
    if let Some(ref url) = a.original_url {
        lines.push(format!("Photo:     {url}"));
    }
    if let Some(ref url) = a.processed_url {
        lines.push(format!("Processed: {url}"));
    }
    lines.join("\n")
}

fn to_upsert(slot: &AppointmentSlot) -> Result<UpsertAppointment, CliError> {
    Ok(UpsertAppointment {
        patient_id: EntityId::from(slot.patient.as_str()),
        doctor_id: EntityId::from(slot.doctor.as_str()),
        appointment_at: util::parse_datetime("at", &slot.at)?,
    })
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    clinic: &Clinic,
    args: AppointmentsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let store = clinic.appointments();
    let appointment = match args.command {
        AppointmentsCommand::List { list, patient } => {
            let view = match patient {
                Some(patient) => {
                    store.fetch_by_patient(&EntityId::from(patient)).await;
                    if let Some(ref term) = list.search {
                        store.apply_search(term);
                    }
                    store.snapshot()
                }
                None => util::fetch_filtered(store, &list).await,
            };
            let out = output::render_list(
                &global.output,
                &view.filtered,
                |a| AppointmentRow::from(a.as_ref()),
                |a| a.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            return Ok(());
        }

        AppointmentsCommand::Get { appointment } => {
            store.find_one(&EntityId::from(appointment)).await?
        }

        AppointmentsCommand::Create { slot: s } => store.create(&to_upsert(&s)?).await?,

        AppointmentsCommand::Update {
            appointment,
            slot: s,
        } => {
            store
                .update(&EntityId::from(appointment), &to_upsert(&s)?)
                .await?
        }

        AppointmentsCommand::EditData {
            appointment,
            contact,
            forefoot,
            midfoot,
            rearfoot,
            note,
        } => {
            let body = EditAppointmentPatientData {
                contact_total_pct: contact,
                forefoot_pct: forefoot,
                midfoot_pct: midfoot,
                rearfoot_pct: rearfoot,
                note,
            };
            store
                .edit_patient_data(&EntityId::from(appointment), &body)
                .await?
        }

        AppointmentsCommand::Photo { appointment, file } => {
            store
                .upload_photo(&EntityId::from(appointment), &file)
                .await?
        }
    };

    let out = output::render_single(&global.output, &appointment, detail, |a| a.id.to_string())?;
    output::print_output(&out, global.quiet);
    Ok(())
}
