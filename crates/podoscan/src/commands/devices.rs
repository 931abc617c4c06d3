//! Registered device command handlers.

use std::sync::Arc;

use tabled::Tabled;

use podoscan_core::Clinic;
use podoscan_core::model::{Device, EntityId, UpsertDevice};

use crate::cli::{DevicesArgs, DevicesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Serial")]
    serial: String,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "Patient")]
    patient: String,
}

impl From<&Device> for DeviceRow {
    fn from(d: &Device) -> Self {
        Self {
            id: d.id.to_string(),
            serial: d.serial_number.clone(),
            model: util::or_dash(d.model.as_deref()),
            patient: util::or_dash(d.patient.as_deref().map(|p| p.user.fullname.as_str())),
        }
    }
}

fn detail(d: &Arc<Device>) -> String {
    let mut lines = vec![
        format!("ID:      {}", d.id),
        format!("Serial:  {}", d.serial_number),
        format!("Model:   {}", util::or_dash(d.model.as_deref())),
    ];
    if let Some(p) = d.patient.as_deref() {
        lines.push(format!("Patient: {} ({})", p.user.fullname, p.id));
    }
    lines.join("\n")
}

pub async fn handle(clinic: &Clinic, args: DevicesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let store = clinic.devices();
    let device = match args.command {
        DevicesCommand::List(list) => {
            let view = util::fetch_filtered(store, &list).await;
            let out = output::render_list(
                &global.output,
                &view.filtered,
                |d| DeviceRow::from(d.as_ref()),
                |d| d.serial_number.clone(),
            )?;
            output::print_output(&out, global.quiet);
            return Ok(());
        }
        DevicesCommand::Get { device } => store.find_one(&EntityId::from(device)).await?,
        DevicesCommand::Create { serial, model } => {
            store
                .create(&UpsertDevice {
                    serial_number: serial,
                    model,
                })
                .await?
        }
        DevicesCommand::Update {
            device,
            serial,
            model,
        } => {
            store
                .update(
                    &EntityId::from(device),
                    &UpsertDevice {
                        serial_number: serial,
                        model,
                    },
                )
                .await?
        }
    };

    let out = output::render_single(&global.output, &device, detail, |d| d.id.to_string())?;
    output::print_output(&out, global.quiet);
    Ok(())
}
