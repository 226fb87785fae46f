use clap::{Parser, Subcommand};

/// Command-line interface definition for booktimer
/// CLI application to track time spent on book-production stages with SQLite
#[derive(Parser)]
#[command(
    name = "booktimer",
    version = env!("CARGO_PKG_VERSION"),
    about = "Track time spent on book-production stages: start, pause, resume and stop task timers backed by SQLite",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Manage the configuration file
    Config {
        #[arg(long = "print", help = "Print the current configuration file")]
        print_config: bool,
    },

    /// Start a timer for a task (restarts it if already running)
    Start {
        /// Task name (book or card title)
        task: Option<String>,

        /// Production stage the time is attributed to (e.g. "1st Edit")
        #[arg(long = "stage")]
        stage: Option<String>,

        /// User the time is attributed to (default from config)
        #[arg(long = "user")]
        user: Option<String>,

        /// Delimited timer key `task_stage_user` instead of the separate parts
        #[arg(long = "key", conflicts_with_all = ["task", "stage", "user"])]
        key: Option<String>,
    },

    /// Pause a running timer, freezing its accumulated time
    Pause {
        task: Option<String>,

        #[arg(long = "stage")]
        stage: Option<String>,

        #[arg(long = "user")]
        user: Option<String>,

        #[arg(long = "key", conflicts_with_all = ["task", "stage", "user"])]
        key: Option<String>,
    },

    /// Resume a paused timer
    Resume {
        task: Option<String>,

        #[arg(long = "stage")]
        stage: Option<String>,

        #[arg(long = "user")]
        user: Option<String>,

        #[arg(long = "key", conflicts_with_all = ["task", "stage", "user"])]
        key: Option<String>,
    },

    /// Stop a timer and write its time entry to the ledger
    Stop {
        task: Option<String>,

        #[arg(long = "stage")]
        stage: Option<String>,

        #[arg(long = "user")]
        user: Option<String>,

        #[arg(long = "key", conflicts_with_all = ["task", "stage", "user"])]
        key: Option<String>,
    },

    /// Show active timers with their live elapsed time
    Status,

    /// List completed time entries from the ledger
    Entries {
        /// Filter by year/month/day or a custom range (e.g. 2026-08 or 2026-01:2026-06)
        #[arg(long, short)]
        period: Option<String>,

        #[arg(long, help = "Filter by task name")]
        task: Option<String>,

        #[arg(long, help = "Filter by stage name")]
        stage: Option<String>,

        #[arg(long, help = "Filter by user name")]
        user: Option<String>,
    },

    /// Add a manual time entry to the ledger
    Entry {
        /// Task name
        task: String,

        #[arg(long = "stage", help = "Production stage the time is attributed to")]
        stage: String,

        #[arg(long = "user", help = "User the time is attributed to (default from config)")]
        user: Option<String>,

        /// Duration spent, e.g. 45m, 1h30m, 130s or 1:30
        #[arg(long = "duration")]
        duration: String,

        /// Date of the work (YYYY-MM-DD, default today)
        #[arg(long = "date")]
        date: Option<String>,
    },

    /// Retry ledger writes buffered while the store was unreachable
    Recover,

    /// Print or manage the internal log table
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },
}
