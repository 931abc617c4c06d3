//! Patient command handlers.

use std::sync::Arc;

use tabled::Tabled;

use podoscan_core::Clinic;
use podoscan_core::model::{EntityId, Patient, UpsertPatient};

use crate::cli::{AccountArgs, GlobalOpts, PatientsArgs, PatientsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
pub(super) struct PatientRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Device")]
    device: String,
}

impl From<&Patient> for PatientRow {
    fn from(p: &Patient) -> Self {
        Self {
            id: p.id.to_string(),
            name: p.user.fullname.clone(),
            email: p.user.email.clone(),
            device: util::or_dash(p.device.as_deref().map(|d| d.serial_number.as_str())),
        }
    }
}

fn detail(p: &Arc<Patient>) -> String {
    let mut lines = vec![
        format!("ID:     {}", p.id),
        format!("Name:   {}", p.user.fullname),
        format!("Email:  {}", p.user.email),
    ];
    match p.device.as_deref() {
        Some(d) => {
            lines.push(format!("Device: {} ({})", d.serial_number, d.id));
            if let Some(ref model) = d.model {
                lines.push(format!("Model:  {model}"));
            }
        }
        None => lines.push("Device: -".into()),
    }
    lines.join("\n")
}

fn upsert(account: AccountArgs, device: Option<String>) -> UpsertPatient {
    UpsertPatient {
        fullname: account.name,
        email: account.email,
        password: account.password,
        device_id: device.map(EntityId::from),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    clinic: &Clinic,
    args: PatientsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let store = clinic.patients();
    match args.command {
        PatientsCommand::List(list) => {
            let view = util::fetch_filtered(store, &list).await;
            let out = output::render_list(
                &global.output,
                &view.filtered,
                |p| PatientRow::from(p.as_ref()),
                |p| p.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        PatientsCommand::Get { patient } => {
            let p = store.find_one(&EntityId::from(patient)).await?;
            let out = output::render_single(&global.output, &p, detail, |p| p.id.to_string())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        PatientsCommand::Create { account, device } => {
            let p = store.create(&upsert(account, device)).await?;
            let out = output::render_single(&global.output, &p, detail, |p| p.id.to_string())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        PatientsCommand::Update {
            patient,
            account,
            device,
        } => {
            let p = store
                .update(&EntityId::from(patient), &upsert(account, device))
                .await?;
            let out = output::render_single(&global.output, &p, detail, |p| p.id.to_string())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
