use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use upkeep::model::{ObjectStatus, ReminderStatus, ReportType, ServiceStatus};

/// Returns the version string, including git hash and commit date for non-release builds.
/// Format: "0.3.2" for releases, "0.3.2@abc1234 2024-01-15 14:30" for dev builds
fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const GIT_COMMIT_DATE: &str = env!("GIT_COMMIT_DATE");
    const IS_RELEASE: &str = env!("IS_RELEASE");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" || GIT_HASH.is_empty() {
            VERSION.to_string()
        } else {
            format!("{}@{} {}", VERSION, GIT_HASH, GIT_COMMIT_DATE)
        }
    })
}

#[derive(Parser, Debug)]
#[command(name = "upkeep", bin_name = "upkeep", version = get_version())]
#[command(about = "Track assets, maintenance services, reminders and reports", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Data directory (defaults to $UPKEEP_DATA_DIR, then the platform data dir)
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Verbose output (debug logging on stderr)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print records as JSON
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage tracked objects (vehicles, facilities, equipment)
    #[command(subcommand, alias = "obj")]
    Objects(ObjectCmd),

    /// Manage recurring maintenance services
    #[command(subcommand, alias = "svc")]
    Services(ServiceCmd),

    /// Manage service reminders
    #[command(subcommand, alias = "rem")]
    Reminders(ReminderCmd),

    /// Manage maintenance reports
    #[command(subcommand, alias = "rep")]
    Reports(ReportCmd),

    /// Manage fault reports
    #[command(subcommand)]
    Faults(FaultCmd),

    /// Manage the meter-unit registry
    #[command(subcommand)]
    Units(UnitCmd),

    /// Summary of overdue and upcoming work
    Dashboard {
        /// Evaluate as of this date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        today: Option<NaiveDate>,
    },

    /// Rewrite legacy object_type spellings in place (keeps .bak copies)
    Migrate,

    /// Export all tables to a tar.gz archive
    Export {
        /// Destination directory (defaults to the current directory)
        #[arg(long, value_name = "DIR")]
        dest: Option<PathBuf>,
    },

    /// Get or set configuration
    Config {
        /// Configuration key (e.g., id_policy)
        key: Option<String>,

        /// Value to set (if omitted, prints current value)
        value: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ObjectCmd {
    /// List objects
    #[command(alias = "ls")]
    List {
        #[arg(long = "type")]
        object_type: Option<String>,
        #[arg(long)]
        status: Option<ObjectStatus>,
    },
    /// Add an object
    Add {
        object_type: String,
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value_t)]
        status: ObjectStatus,
    },
    /// Update fields of an object
    Update {
        id: String,
        #[arg(long = "type")]
        object_type: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        status: Option<ObjectStatus>,
    },
    /// Delete an object (services and reports that reference it are kept)
    #[command(alias = "rm")]
    Delete { id: String },
}

/// Meter reading flags shared by services, reports and faults.
#[derive(Args, Debug, Default)]
pub struct MeterArgs {
    /// Meter reading
    #[arg(long)]
    pub meter: Option<i64>,
    /// Meter unit (see `upkeep units list`)
    #[arg(long)]
    pub unit: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum ServiceCmd {
    /// List services
    #[command(alias = "ls")]
    List {
        #[arg(long = "type")]
        object_type: Option<String>,
        #[arg(long)]
        object: Option<String>,
        #[arg(long)]
        status: Option<ServiceStatus>,
    },
    /// Add a service to an object
    Add {
        object_id: String,
        name: String,
        /// Days between services
        #[arg(long)]
        interval: u32,
        /// Object type (looked up from the object when omitted)
        #[arg(long = "type")]
        object_type: Option<String>,
        #[arg(long, default_value = "")]
        description: String,
        /// First due date (defaults to today)
        #[arg(long)]
        due: Option<NaiveDate>,
        #[arg(long, default_value = "")]
        notes: String,
        #[command(flatten)]
        meter: MeterArgs,
    },
    /// Update fields of a service
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        interval: Option<u32>,
        #[arg(long)]
        status: Option<ServiceStatus>,
        #[arg(long)]
        last: Option<NaiveDate>,
        #[arg(long)]
        due: Option<NaiveDate>,
        #[arg(long)]
        notes: Option<String>,
        #[command(flatten)]
        meter: MeterArgs,
    },
    /// Delete a service
    #[command(alias = "rm")]
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
pub enum ReminderCmd {
    /// List reminders
    #[command(alias = "ls")]
    List {
        #[arg(long = "type")]
        object_type: Option<String>,
        #[arg(long)]
        object: Option<String>,
        #[arg(long)]
        service: Option<String>,
        #[arg(long)]
        status: Option<ReminderStatus>,
    },
    /// Add a reminder for a service
    Add {
        service_id: String,
        date: NaiveDate,
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// Update fields of a reminder
    Update {
        id: String,
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        status: Option<ReminderStatus>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Delete a reminder
    #[command(alias = "rm")]
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
pub enum ReportCmd {
    /// List reports
    #[command(alias = "ls")]
    List {
        #[arg(long = "type")]
        object_type: Option<String>,
        #[arg(long)]
        object: Option<String>,
        #[arg(long)]
        kind: Option<ReportType>,
    },
    /// Add a report for an object
    Add {
        object_id: String,
        title: String,
        #[arg(long, default_value_t)]
        kind: ReportType,
        #[arg(long = "type")]
        object_type: Option<String>,
        #[arg(long, default_value = "")]
        description: String,
        /// Completion date (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long, default_value = "")]
        notes: String,
        #[command(flatten)]
        meter: MeterArgs,
    },
    /// Update fields of a report
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        kind: Option<ReportType>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        notes: Option<String>,
        #[command(flatten)]
        meter: MeterArgs,
    },
    /// Delete a report
    #[command(alias = "rm")]
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
pub enum FaultCmd {
    /// List fault reports
    #[command(alias = "ls")]
    List {
        #[arg(long = "type")]
        object_type: Option<String>,
        #[arg(long)]
        object: Option<String>,
    },
    /// Record a fault, optionally attaching photos
    Add {
        object_id: String,
        #[arg(long = "type")]
        object_type: Option<String>,
        #[arg(long, default_value = "")]
        description: String,
        /// Observation date (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Photo file to attach (repeatable)
        #[arg(long = "photo", value_name = "FILE")]
        photos: Vec<PathBuf>,
        #[command(flatten)]
        meter: MeterArgs,
    },
    /// Update fields of a fault report
    Update {
        id: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        date: Option<NaiveDate>,
        #[command(flatten)]
        meter: MeterArgs,
    },
    /// Delete a fault report (photo files are kept)
    #[command(alias = "rm")]
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
pub enum UnitCmd {
    /// List meter units
    #[command(alias = "ls")]
    List,
    /// Register a meter unit
    Add { unit: String },
    /// Remove a meter unit
    #[command(alias = "rm")]
    Delete { unit: String },
}
