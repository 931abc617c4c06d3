//! Clap derive structures for the `podoscan` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// podoscan -- clinic records, foot-pressure sessions and device control
#[derive(Debug, Parser)]
#[command(
    name = "podoscan",
    version,
    about = "Manage a Podoscan clinic from the command line",
    long_about = "Browse and edit patients, doctors, devices, families and appointments,\n\
        follow a patient's pressure sessions live, and drive the acquisition\n\
        unit's indicator LED and actuator over MQTT.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Clinic profile to use
    #[arg(long, short = 'p', env = "PODOSCAN_PROFILE", global = true)]
    pub profile: Option<String>,

    /// API base URL (overrides profile)
    #[arg(long, short = 'u', env = "PODOSCAN_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Device broker URL (overrides profile)
    #[arg(long, env = "PODOSCAN_MQTT_URL", global = true)]
    pub mqtt_url: Option<String>,

    /// Login email (overrides profile)
    #[arg(long, env = "PODOSCAN_EMAIL", global = true)]
    pub login_email: Option<String>,

    /// Login password
    #[arg(long, env = "PODOSCAN_PASSWORD", global = true, hide_env_values = true)]
    pub login_password: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "PODOSCAN_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "PODOSCAN_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "PODOSCAN_TIMEOUT", default_value = "30", global = true)]
    pub timeout: u64,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage patients
    #[command(alias = "pt")]
    Patients(PatientsArgs),

    /// Manage doctors
    #[command(alias = "dr")]
    Doctors(DoctorsArgs),

    /// Manage registered acquisition devices
    #[command(alias = "dev")]
    Devices(DevicesArgs),

    /// Manage family accounts and their linked patients
    #[command(alias = "fam")]
    Families(FamiliesArgs),

    /// Manage appointments, clinical data and foot photos
    #[command(alias = "appt")]
    Appointments(AppointmentsArgs),

    /// View pressure sessions and follow them live
    Sessions(SessionsArgs),

    /// Send commands to the acquisition unit
    Device(DeviceArgs),

    /// Clinic overview: totals, last 7 days and recent appointments
    Dashboard,

    /// Verify credentials against the API
    Login,

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared List Arguments ────────────────────────────────────────────

/// Shared filtering for all list commands.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Case-insensitive search over the entity's text fields
    #[arg(long, short = 's')]
    pub search: Option<String>,
}

/// Account fields shared by patients, doctors and families.
#[derive(Debug, Args)]
pub struct AccountArgs {
    /// Full name
    #[arg(long, short = 'n')]
    pub name: String,

    /// Email address
    #[arg(long, short = 'e')]
    pub email: String,

    /// Password for the new account
    #[arg(long = "account-password")]
    pub password: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  PATIENTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct PatientsArgs {
    #[command(subcommand)]
    pub command: PatientsCommand,
}

#[derive(Debug, Subcommand)]
pub enum PatientsCommand {
    /// List patients
    #[command(alias = "ls")]
    List(ListArgs),

    /// Get patient details
    Get {
        /// Patient ID
        patient: String,
    },

    /// Register a patient
    Create {
        #[command(flatten)]
        account: AccountArgs,

        /// Device ID to assign
        #[arg(long)]
        device: Option<String>,
    },

    /// Update a patient
    Update {
        /// Patient ID
        patient: String,

        #[command(flatten)]
        account: AccountArgs,

        /// Device ID to assign
        #[arg(long)]
        device: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DOCTORS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DoctorsArgs {
    #[command(subcommand)]
    pub command: DoctorsCommand,
}

#[derive(Debug, Subcommand)]
pub enum DoctorsCommand {
    /// List doctors
    #[command(alias = "ls")]
    List(ListArgs),

    /// Get doctor details
    Get {
        /// Doctor ID
        doctor: String,
    },

    /// Register a doctor
    Create {
        #[command(flatten)]
        account: AccountArgs,

        /// Medical specialty
        #[arg(long)]
        specialty: Option<String>,
    },

    /// Update a doctor
    Update {
        /// Doctor ID
        doctor: String,

        #[command(flatten)]
        account: AccountArgs,

        /// Medical specialty
        #[arg(long)]
        specialty: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DEVICES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// List registered devices
    #[command(alias = "ls")]
    List(ListArgs),

    /// Get device details
    Get {
        /// Device ID
        device: String,
    },

    /// Register a device
    Create {
        /// Serial number printed on the unit
        #[arg(long)]
        serial: String,

        /// Hardware model
        #[arg(long)]
        model: Option<String>,
    },

    /// Update a device
    Update {
        /// Device ID
        device: String,

        /// Serial number printed on the unit
        #[arg(long)]
        serial: String,

        /// Hardware model
        #[arg(long)]
        model: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  FAMILIES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct FamiliesArgs {
    #[command(subcommand)]
    pub command: FamiliesCommand,
}

#[derive(Debug, Subcommand)]
pub enum FamiliesCommand {
    /// List family accounts
    #[command(alias = "ls")]
    List(ListArgs),

    /// Get family details
    Get {
        /// Family ID
        family: String,
    },

    /// Register a family account
    Create {
        #[command(flatten)]
        account: AccountArgs,

        /// Patient IDs to link (repeatable)
        #[arg(long = "patient")]
        patients: Vec<String>,
    },

    /// Update a family account
    Update {
        /// Family ID
        family: String,

        #[command(flatten)]
        account: AccountArgs,

        /// Patient IDs to link (repeatable)
        #[arg(long = "patient")]
        patients: Vec<String>,
    },

    /// Show the patients linked to a family
    Roster {
        /// Family ID
        family: String,

        /// Filter by patient name or email
        #[arg(long, short = 's')]
        search: Option<String>,

        /// Sort order
        #[arg(long, default_value = "az")]
        sort: RosterOrder,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RosterOrder {
    /// Name ascending
    Az,
    /// Name descending
    Za,
    /// Patients with a device first
    Device,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  APPOINTMENTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct AppointmentsArgs {
    #[command(subcommand)]
    pub command: AppointmentsCommand,
}

#[derive(Debug, Subcommand)]
pub enum AppointmentsCommand {
    /// List appointments
    #[command(alias = "ls")]
    List {
        #[command(flatten)]
        list: ListArgs,

        /// Only appointments of this patient
        #[arg(long)]
        patient: Option<String>,
    },

    /// Get appointment details
    Get {
        /// Appointment ID
        appointment: String,
    },

    /// Book an appointment
    Create {
        #[command(flatten)]
        slot: AppointmentSlot,
    },

    /// Reschedule or reassign an appointment
    Update {
        /// Appointment ID
        appointment: String,

        #[command(flatten)]
        slot: AppointmentSlot,
    },

    /// Record clinical data (pressure distribution and note)
    EditData {
        /// Appointment ID
        appointment: String,

        /// Total contact surface, percent
        #[arg(long)]
        contact: Option<f64>,

        /// Forefoot load, percent
        #[arg(long)]
        forefoot: Option<f64>,

        /// Midfoot load, percent
        #[arg(long)]
        midfoot: Option<f64>,

        /// Rearfoot load, percent
        #[arg(long)]
        rearfoot: Option<f64>,

        /// Doctor's note
        #[arg(long)]
        note: Option<String>,
    },

    /// Upload a foot photo for processing
    Photo {
        /// Appointment ID
        appointment: String,

        /// Image file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

#[derive(Debug, Args)]
pub struct AppointmentSlot {
    /// Patient ID
    #[arg(long)]
    pub patient: String,

    /// Doctor ID
    #[arg(long)]
    pub doctor: String,

    /// Date and time, RFC 3339 (e.g. 2024-06-15T09:30:00Z)
    #[arg(long)]
    pub at: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SESSIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct SessionsArgs {
    #[command(subcommand)]
    pub command: SessionsCommand,
}

#[derive(Debug, Subcommand)]
pub enum SessionsCommand {
    /// List sessions
    #[command(alias = "ls")]
    List {
        #[command(flatten)]
        list: ListArgs,

        /// Only sessions of this patient
        #[arg(long)]
        patient: Option<String>,
    },

    /// Get session details
    Get {
        /// Session ID
        session: String,
    },

    /// Per-session channel averages for one patient
    Averages {
        /// Patient ID
        #[arg(long)]
        patient: String,
    },

    /// Follow a patient's sessions, refreshing on a fixed period
    Watch {
        /// Patient ID
        #[arg(long)]
        patient: String,

        /// Refresh period in milliseconds (defaults to the profile setting)
        #[arg(long)]
        interval_ms: Option<u64>,

        /// View to show; only the charts view refreshes automatically
        #[arg(long, default_value = "charts")]
        view: WatchView,

        /// Stop after this many updates
        #[arg(long)]
        count: Option<usize>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum WatchView {
    /// Channel averages per session, refreshed periodically
    Charts,
    /// Session list, fetched once
    Table,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DEVICE CONTROL
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DeviceArgs {
    #[command(subcommand)]
    pub command: DeviceCommand,
}

#[derive(Debug, Subcommand)]
pub enum DeviceCommand {
    /// Switch the indicator LED
    Led {
        #[arg(value_enum)]
        state: LedState,
    },

    /// Move the actuator
    Servo {
        #[arg(value_enum)]
        direction: ServoDirection,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LedState {
    On,
    Off,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ServoDirection {
    #[value(alias = "adelante")]
    Forward,
    #[value(alias = "atras", alias = "back")]
    Backward,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Set a profile value
    Set {
        /// Profile key (api_url, mqtt_url, email, password_env, ca_cert,
        /// insecure, timeout, poll_interval_ms)
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store a password in the system keyring
    SetPassword {
        /// Profile name
        #[arg(long)]
        profile: Option<String>,
    },

    /// Print the config file location
    Path,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
