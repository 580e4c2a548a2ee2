pub mod browse;
pub mod demo;
pub mod fines;
pub mod init;
pub mod remarks;
pub mod status;
pub mod table;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::error::Result;
use crate::fines::FineStatus;
use crate::settings::get_data_dir;
use crate::store::{JsonFileBackend, Workspace};

/// Open the workspace stored in the configured data directory.
pub(crate) fn open_workspace() -> Result<Workspace<JsonFileBackend>> {
    Workspace::open(JsonFileBackend::in_dir(&get_data_dir()))
}

fn parse_fine_status(s: &str) -> std::result::Result<FineStatus, String> {
    FineStatus::parse(s)
        .ok_or_else(|| format!("unknown status '{s}' (pending, approved, rejected, deducted)"))
}

#[derive(Parser)]
#[command(name = "hrdesk", version, about = "HR admin desk: employee tables, fines and remarks.")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up hrdesk: choose a data directory and create the data file.
    Init {
        /// Path for hrdesk data (default: ~/Documents/hrdesk)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Show settings, data file and event counts.
    Status,
    /// Load sample employees, attendance, fines and remarks.
    Demo,
    /// Print one page of a JSON or CSV record file.
    Table(TableArgs),
    /// Interactively browse a JSON or CSV record file.
    Browse {
        /// Path to a .json or .csv file
        file: PathBuf,
        #[command(flatten)]
        view: ViewArgs,
    },
    /// Manage employee fines.
    Fines {
        #[command(subcommand)]
        command: FinesCommands,
    },
    /// Manage employee remarks.
    Remarks {
        #[command(subcommand)]
        command: RemarksCommands,
    },
}

/// Column and page-size options shared by `table` and `browse`.
#[derive(Args, Debug, Clone, Default)]
pub struct ViewArgs {
    /// Comma-separated fields to show (default: every field)
    #[arg(long, value_delimiter = ',')]
    pub columns: Vec<String>,
    /// Rows per page (default: page_size from settings)
    #[arg(long = "page-size")]
    pub page_size: Option<usize>,
}

#[derive(Args, Debug, Clone)]
pub struct TableArgs {
    /// Path to a .json or .csv file
    pub file: PathBuf,
    /// Case-insensitive text to find in any field
    #[arg(long)]
    pub search: Option<String>,
    /// Equality filter field=value (repeatable)
    #[arg(long = "filter")]
    pub filters: Vec<String>,
    /// Field to sort by
    #[arg(long)]
    pub sort: Option<String>,
    /// Sort descending
    #[arg(long, requires = "sort")]
    pub desc: bool,
    /// Compare sort values as text, numbers or dates
    #[arg(long = "sort-as", value_enum, requires = "sort")]
    pub sort_as: Option<SortAs>,
    /// Page to show (1-based)
    #[arg(long, default_value_t = 1)]
    pub page: usize,
    #[command(flatten)]
    pub view: ViewArgs,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortAs {
    Text,
    Number,
    Date,
}

#[derive(Subcommand)]
pub enum FinesCommands {
    /// Record a new pending fine.
    Add {
        /// Employee ID (e.g. E001)
        #[arg(long = "employee-id")]
        employee_id: String,
        /// Employee display name
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        department: String,
        #[arg(long)]
        amount: f64,
        /// Fine category (e.g. "Late arrival")
        #[arg(long)]
        reason: String,
        /// Date of the fine: YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Approve a pending fine.
    Approve {
        id: u64,
        #[arg(long)]
        comment: Option<String>,
    },
    /// Reject a pending fine.
    Reject {
        id: u64,
        #[arg(long)]
        comment: Option<String>,
    },
    /// Mark an approved fine as deducted from payroll.
    Deduct { id: u64 },
    /// Remove a fine.
    Cancel { id: u64 },
    /// List fines.
    List {
        /// Only fines with this status
        #[arg(long, value_parser = parse_fine_status)]
        status: Option<FineStatus>,
    },
    /// Per-employee fine totals.
    Summary,
    /// One employee's fines, most recent first.
    History {
        /// Employee ID
        employee_id: String,
    },
}

#[derive(Subcommand)]
pub enum RemarksCommands {
    /// Record a new remark.
    Add {
        /// Employee ID (e.g. E001)
        #[arg(long = "employee-id")]
        employee_id: String,
        /// Employee display name
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        department: String,
        /// Remark type (e.g. positive, warning)
        #[arg(long = "type")]
        remark_type: String,
        #[arg(long)]
        content: String,
        /// Date of the remark: YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Acknowledge a remark, optionally with the employee's comment.
    Ack {
        id: u64,
        #[arg(long)]
        comment: Option<String>,
    },
    /// Remove a remark.
    Cancel { id: u64 },
    /// List remarks.
    List {
        /// Only remarks not yet acknowledged
        #[arg(long)]
        unacknowledged: bool,
    },
    /// Per-employee remark counts.
    Summary,
    /// One employee's remarks, most recent first.
    History {
        /// Employee ID
        employee_id: String,
    },
}
