mod browser;
mod cli;
mod error;
mod fines;
mod fmt;
mod loader;
mod record;
mod remarks;
mod settings;
mod store;
mod summary;
mod table;
mod tui;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, FinesCommands, RemarksCommands};
use fines::FineAction;

/// Log to stderr. `HRDESK_LOG` wins over the `-v` count.
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env("HRDESK_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Init { data_dir } => cli::init::run(data_dir).context("init failed")?,
        Commands::Status => cli::status::run().context("could not read status")?,
        Commands::Demo => cli::demo::run().context("could not load demo data")?,
        Commands::Table(args) => cli::table::run(&args)
            .with_context(|| format!("could not show {}", args.file.display()))?,
        Commands::Browse { file, view } => cli::browse::run(&file, &view)
            .with_context(|| format!("could not browse {}", file.display()))?,
        Commands::Fines { command } => match command {
            FinesCommands::Add {
                employee_id,
                name,
                department,
                amount,
                reason,
                date,
            } => cli::fines::add(&employee_id, &name, &department, amount, &reason, date)
                .context("could not add fine")?,
            FinesCommands::Approve { id, comment } => {
                cli::fines::apply(FineAction::Approve { id, comment })?
            }
            FinesCommands::Reject { id, comment } => {
                cli::fines::apply(FineAction::Reject { id, comment })?
            }
            FinesCommands::Deduct { id } => cli::fines::apply(FineAction::Deduct { id })?,
            FinesCommands::Cancel { id } => cli::fines::apply(FineAction::Cancel { id })?,
            FinesCommands::List { status } => cli::fines::list(status)?,
            FinesCommands::Summary => cli::fines::summary()?,
            FinesCommands::History { employee_id } => cli::fines::history(&employee_id)?,
        },
        Commands::Remarks { command } => match command {
            RemarksCommands::Add {
                employee_id,
                name,
                department,
                remark_type,
                content,
                date,
            } => cli::remarks::add(&employee_id, &name, &department, &remark_type, &content, date)
                .context("could not add remark")?,
            RemarksCommands::Ack { id, comment } => cli::remarks::acknowledge(id, comment)?,
            RemarksCommands::Cancel { id } => cli::remarks::cancel(id)?,
            RemarksCommands::List { unacknowledged } => cli::remarks::list(unacknowledged)?,
            RemarksCommands::Summary => cli::remarks::summary()?,
            RemarksCommands::History { employee_id } => cli::remarks::history(&employee_id)?,
        },
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
