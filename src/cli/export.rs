//! CLI commands for data export and import

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};

use crate::error::{SplitError, SplitResult};
use crate::export::{csv, json, yaml};
use crate::storage::Storage;

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    /// JSON snapshot (full ledger, re-importable)
    Json,
    /// YAML snapshot (full ledger, human-readable, re-importable)
    Yaml,
    /// CSV of expense shares, or balances with --balances
    Csv,
}

/// Arguments of the `export` command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Output file path
    pub output: PathBuf,

    /// Export format
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: ExportFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// CSV only: export balances instead of expense shares
    #[arg(long)]
    pub balances: bool,

    /// CSV only: restrict to one group
    #[arg(short, long)]
    pub group: Option<String>,
}

fn create_output(output: &Path) -> SplitResult<BufWriter<File>> {
    let file = File::create(output).map_err(|e| {
        SplitError::Export(format!(
            "Failed to create file {}: {}",
            output.display(),
            e
        ))
    })?;
    Ok(BufWriter::new(file))
}

/// Handle the export command
pub fn handle_export_command(storage: &Storage, args: ExportArgs) -> SplitResult<()> {
    let mut writer = create_output(&args.output)?;
    let group = args.group.as_deref();

    storage.read(|ledger| match args.format {
        ExportFormat::Json => json::export_json(ledger, &mut writer, args.pretty),
        ExportFormat::Yaml => yaml::export_yaml(ledger, &mut writer),
        ExportFormat::Csv if args.balances => csv::export_balances_csv(ledger, &mut writer, group),
        ExportFormat::Csv => csv::export_expenses_csv(ledger, &mut writer, group),
    })??;

    writer.flush()?;

    match args.format {
        ExportFormat::Csv if args.balances => {
            println!("Balances exported to: {}", args.output.display())
        }
        ExportFormat::Csv => println!("Expenses exported to: {}", args.output.display()),
        _ => println!("Full ledger exported to: {}", args.output.display()),
    }

    Ok(())
}

/// Handle the import command, replacing the whole ledger
pub fn handle_import_command(storage: &Storage, file: &Path) -> SplitResult<()> {
    let contents = std::fs::read_to_string(file).map_err(|e| {
        SplitError::Io(format!("Failed to read {}: {}", file.display(), e))
    })?;

    let is_yaml = file
        .extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| {
            ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml")
        });

    let snapshot = if is_yaml {
        yaml::parse_yaml_snapshot(&contents)?
    } else {
        json::parse_snapshot(&contents)?
    };

    let (members, expenses) = storage.update(|ledger| {
        ledger.import_state(snapshot)?;
        Ok::<_, SplitError>((ledger.members().len(), ledger.expenses().len()))
    })??;

    println!(
        "Imported {} members and {} expenses from {}",
        members,
        expenses,
        file.display()
    );

    Ok(())
}
