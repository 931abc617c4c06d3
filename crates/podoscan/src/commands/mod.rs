//! Command dispatch.

pub mod appointments;
pub mod config_cmd;
pub mod dashboard;
pub mod device;
pub mod devices;
pub mod doctors;
pub mod families;
pub mod patients;
pub mod sessions;
pub mod util;

use podoscan_core::Clinic;

use crate::cli::{Command, GlobalOpts};
use crate::config;
use crate::error::CliError;

use self::util::NoticeSink;

/// Dispatch a clinic command to its handler.
///
/// `Config` and `Completions` never reach this point; `main` runs them
/// before a [`Clinic`] exists.
pub async fn dispatch(cmd: Command, clinic: &Clinic, global: &GlobalOpts) -> Result<(), CliError> {
    let mut notices = NoticeSink::new(clinic, global);

    // The device link talks to the broker, not the REST API.
    if !matches!(cmd, Command::Device(_) | Command::Login) {
        clinic.connect().await?;
    }

    match cmd {
        Command::Patients(args) => patients::handle(clinic, args, global).await?,
        Command::Doctors(args) => doctors::handle(clinic, args, global).await?,
        Command::Devices(args) => devices::handle(clinic, args, global).await?,
        Command::Families(args) => families::handle(clinic, args, global).await?,
        Command::Appointments(args) => appointments::handle(clinic, args, global).await?,
        Command::Sessions(args) => sessions::handle(clinic, args, global, &mut notices).await?,
        Command::Device(args) => device::handle(clinic, args, global).await?,
        Command::Dashboard => dashboard::handle(clinic, global).await?,
        Command::Login => login(clinic, global).await?,
        Command::Config(_) | Command::Completions(_) => {}
    }

    notices.flush()
}

async fn login(clinic: &Clinic, global: &GlobalOpts) -> Result<(), CliError> {
    let Some(session) = clinic.connect().await? else {
        let cfg = config::load_config_or_default();
        return Err(CliError::NoCredentials {
            profile: config::active_profile_name(global, &cfg),
        });
    };
    let user = &session.user;
    util::status(
        global,
        &format!("✓ Logged in as {} <{}> ({})", user.fullname, user.email, user.kind),
    );
    Ok(())
}
