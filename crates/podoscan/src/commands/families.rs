//! Family account command handlers.

use std::sync::Arc;

use tabled::Tabled;

use podoscan_core::model::{EntityId, Family, UpsertFamily};
use podoscan_core::{Clinic, FamilyRoster, RosterSort};

use crate::cli::{AccountArgs, FamiliesArgs, FamiliesCommand, GlobalOpts, RosterOrder};
use crate::error::CliError;
use crate::output;

use super::patients::PatientRow;
use super::util;

#[derive(Tabled)]
struct FamilyRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Patients")]
    patients: usize,
}

impl From<&Family> for FamilyRow {
    fn from(f: &Family) -> Self {
        Self {
            id: f.id.to_string(),
            name: f.user.fullname.clone(),
            email: f.user.email.clone(),
            patients: f.patients.len(),
        }
    }
}

fn detail(f: &Arc<Family>) -> String {
    let roster = FamilyRoster::new(&f.patients);
    let mut lines = vec![
        format!("ID:       {}", f.id),
        format!("Name:     {}", f.user.fullname),
        format!("Email:    {}", f.user.email),
        format!(
            "Patients: {} ({} with device, {} without)",
            roster.total(),
            roster.with_device(),
            roster.without_device()
        ),
    ];
    for p in roster.view("", RosterSort::Az) {
        lines.push(format!("  - {} <{}>", p.user.fullname, p.user.email));
    }
    lines.join("\n")
}

fn upsert(account: AccountArgs, patients: Vec<String>) -> UpsertFamily {
    UpsertFamily {
        fullname: account.name,
        email: account.email,
        password: account.password,
        patient_ids: patients.into_iter().map(EntityId::from).collect(),
    }
}

impl From<RosterOrder> for RosterSort {
    fn from(order: RosterOrder) -> Self {
        match order {
            RosterOrder::Az => Self::Az,
            RosterOrder::Za => Self::Za,
            RosterOrder::Device => Self::Device,
        }
    }
}

pub async fn handle(clinic: &Clinic, args: FamiliesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let store = clinic.families();
    let family = match args.command {
        FamiliesCommand::List(list) => {
            let view = util::fetch_filtered(store, &list).await;
            let out = output::render_list(
                &global.output,
                &view.filtered,
                |f| FamilyRow::from(f.as_ref()),
                |f| f.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            return Ok(());
        }
        FamiliesCommand::Roster {
            family,
            search,
            sort,
        } => {
            let family = store.find_one(&EntityId::from(family)).await?;
            let roster = FamilyRoster::new(&family.patients);
            let rows = roster.view(search.as_deref().unwrap_or_default(), sort.into());
            let out = output::render_list(
                &global.output,
                &rows,
                |p| PatientRow::from(*p),
                |p| p.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            util::status(
                global,
                &format!(
                    "{} patients, {} with device, {} without",
                    roster.total(),
                    roster.with_device(),
                    roster.without_device()
                ),
            );
            return Ok(());
        }
        FamiliesCommand::Get { family } => store.find_one(&EntityId::from(family)).await?,
        FamiliesCommand::Create { account, patients } => {
            store.create(&upsert(account, patients)).await?
        }
        FamiliesCommand::Update {
            family,
            account,
            patients,
        } => {
            store
                .update(&EntityId::from(family), &upsert(account, patients))
                .await?
        }
    };

    let out = output::render_single(&global.output, &family, detail, |f| f.id.to_string())?;
    output::print_output(&out, global.quiet);
    Ok(())
}
