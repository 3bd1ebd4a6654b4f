use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use splitledger_cli::cli::{
    handle_balances, handle_clear, handle_expense_command, handle_export_command,
    handle_group_command, handle_import_command, handle_member_command, handle_settle,
    handle_summary, ExpenseCommands, ExportArgs, GroupCommands, MemberCommands,
};
use splitledger_cli::config::{paths::SplitPaths, settings::Settings};
use splitledger_cli::storage::Storage;

#[derive(Parser)]
#[command(
    name = "splitledger",
    version,
    about = "Terminal-based shared expense tracker",
    long_about = "SplitLedger keeps track of shared expenses within a group, works out \
                  who owes whom, and suggests the fewest payments needed to settle up."
)]
struct Cli {
    /// Verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Member management commands
    #[command(subcommand)]
    Member(MemberCommands),

    /// Group management commands
    #[command(subcommand)]
    Group(GroupCommands),

    /// Expense management commands
    #[command(subcommand, alias = "exp")]
    Expense(ExpenseCommands),

    /// Show every member's net balance
    Balances {
        /// Only consider expenses in this group
        #[arg(short, long)]
        group: Option<String>,
    },

    /// Suggest payments that settle all balances
    Settle {
        /// Only consider expenses in this group
        #[arg(short, long)]
        group: Option<String>,
    },

    /// Show quick statistics
    Summary {
        /// Only consider expenses in this group
        #[arg(short, long)]
        group: Option<String>,
    },

    /// Export the ledger to a file
    Export(ExportArgs),

    /// Replace the ledger with the contents of an export file
    Import {
        /// JSON or YAML snapshot (older float-based exports are accepted)
        file: PathBuf,
    },

    /// Delete all expenses (or everything with --all)
    Clear {
        /// Also delete members and groups
        #[arg(long)]
        all: bool,
        /// Confirm the deletion
        #[arg(short, long)]
        force: bool,
    },

    /// Show current configuration and paths
    Config,
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let paths = SplitPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;
    debug!(base_dir = %paths.base_dir().display(), "Resolved paths");

    let storage = Storage::open(paths.clone())?;

    match cli.command {
        Some(Commands::Member(cmd)) => handle_member_command(&storage, cmd)?,
        Some(Commands::Group(cmd)) => handle_group_command(&storage, cmd)?,
        Some(Commands::Expense(cmd)) => handle_expense_command(&storage, &settings, cmd)?,
        Some(Commands::Balances { group }) => {
            handle_balances(&storage, &settings, group.as_deref())?
        }
        Some(Commands::Settle { group }) => handle_settle(&storage, &settings, group.as_deref())?,
        Some(Commands::Summary { group }) => {
            handle_summary(&storage, &settings, group.as_deref())?
        }
        Some(Commands::Export(args)) => handle_export_command(&storage, args)?,
        Some(Commands::Import { file }) => handle_import_command(&storage, &file)?,
        Some(Commands::Clear { all, force }) => handle_clear(&storage, all, force)?,
        Some(Commands::Config) => {
            if !paths.settings_file().exists() {
                settings.save(&paths)?;
            }
            println!("SplitLedger Configuration");
            println!("=========================");
            println!("Config file:    {}", paths.settings_file().display());
            println!("Data directory: {}", paths.data_dir().display());
            println!("Ledger file:    {}", paths.ledger_file().display());
            println!();
            println!("Settings:");
            println!("  Currency symbol: {}", settings.currency_symbol);
            println!("  Default group:   {}", settings.default_group);
            println!("  Date format:     {}", settings.date_format);
        }
        None => {
            println!("SplitLedger - shared expense tracker");
            println!();
            println!("Run 'splitledger --help' for usage information.");
        }
    }

    Ok(())
}
