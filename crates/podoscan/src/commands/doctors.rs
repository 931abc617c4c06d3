//! Doctor command handlers.

use std::sync::Arc;

use tabled::Tabled;

use podoscan_core::Clinic;
use podoscan_core::model::{Doctor, EntityId, UpsertDoctor};

use crate::cli::{AccountArgs, DoctorsArgs, DoctorsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct DoctorRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Specialty")]
    specialty: String,
}

impl From<&Doctor> for DoctorRow {
    fn from(d: &Doctor) -> Self {
        Self {
            id: d.id.to_string(),
            name: d.user.fullname.clone(),
            email: d.user.email.clone(),
            specialty: util::or_dash(d.specialty.as_deref()),
        }
    }
}

fn detail(d: &Arc<Doctor>) -> String {
    [
        format!("ID:        {}", d.id),
        format!("Name:      {}", d.user.fullname),
        format!("Email:     {}", d.user.email),
        format!("Specialty: {}", util::or_dash(d.specialty.as_deref())),
    ]
    .join("\n")
}

fn upsert(account: AccountArgs, specialty: Option<String>) -> UpsertDoctor {
    UpsertDoctor {
        fullname: account.name,
        email: account.email,
        password: account.password,
        specialty,
    }
}

pub async fn handle(clinic: &Clinic, args: DoctorsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let store = clinic.doctors();
    let doctor = match args.command {
        DoctorsCommand::List(list) => {
            let view = util::fetch_filtered(store, &list).await;
            let out = output::render_list(
                &global.output,
                &view.filtered,
                |d| DoctorRow::from(d.as_ref()),
                |d| d.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            return Ok(());
        }
        DoctorsCommand::Get { doctor } => store.find_one(&EntityId::from(doctor)).await?,
        DoctorsCommand::Create { account, specialty } => {
            store.create(&upsert(account, specialty)).await?
        }
        DoctorsCommand::Update {
            doctor,
            account,
            specialty,
        } => {
            store
                .update(&EntityId::from(doctor), &upsert(account, specialty))
                .await?
        }
    };

    let out = output::render_single(&global.output, &doctor, detail, |d| d.id.to_string())?;
    output::print_output(&out, global.quiet);
    Ok(())
}
