//! Expense CLI commands
//!
//! Implements CLI commands for adding, listing, showing and deleting
//! expenses. Payers, shares and weights are given as `NAME=VALUE` pairs.

use std::collections::BTreeMap;

use clap::{Subcommand, ValueEnum};

use crate::config::Settings;
use crate::display::{format_expense_details, format_expense_list};
use crate::error::{SplitError, SplitResult};
use crate::ledger::Ledger;
use crate::models::{Money, NewExpense, SplitRule};
use crate::storage::Storage;

/// Split policy as chosen on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum SplitArg {
    /// Everyone in --among owes the same share
    #[default]
    Equal,
    /// Each --share NAME=AMOUNT is owed as given
    Custom,
    /// Shares follow --weight NAME=WEIGHT
    Ratio,
}

/// Expense subcommands
#[derive(Subcommand, Debug)]
pub enum ExpenseCommands {
    /// Add a new expense
    Add {
        /// What the expense was for
        description: String,
        /// Total amount (e.g. 42.50)
        amount: String,
        /// Who paid: NAME for a single payer, NAME=AMOUNT for each of several
        #[arg(short, long = "paid-by", value_delimiter = ',', required = true)]
        paid_by: Vec<String>,
        /// How to split the cost
        #[arg(short, long, value_enum, default_value_t = SplitArg::Equal)]
        split: SplitArg,
        /// Who shares the cost (default: every member)
        #[arg(short, long, value_delimiter = ',')]
        among: Vec<String>,
        /// Custom share as NAME=AMOUNT (repeatable)
        #[arg(long = "share", value_delimiter = ',')]
        shares: Vec<String>,
        /// Ratio weight as NAME=WEIGHT (repeatable)
        #[arg(short, long = "weight", value_delimiter = ',')]
        weights: Vec<String>,
        /// Group label (default: the configured default group)
        #[arg(short, long)]
        group: Option<String>,
    },
    /// List expenses
    #[command(alias = "ls")]
    List {
        /// Only expenses in this group
        #[arg(short, long)]
        group: Option<String>,
        /// Only expenses this member paid for or shares in
        #[arg(short, long)]
        member: Option<String>,
    },
    /// Show expense details
    Show {
        /// Expense ID (full, exp-xxxxxxxx, or a unique prefix)
        id: String,
    },
    /// Delete an expense
    #[command(alias = "rm")]
    Delete {
        /// Expense ID (full, exp-xxxxxxxx, or a unique prefix)
        id: String,
    },
}

/// Handle an expense command
pub fn handle_expense_command(
    storage: &Storage,
    settings: &Settings,
    cmd: ExpenseCommands,
) -> SplitResult<()> {
    let symbol = settings.currency_symbol.as_str();
    let date_format = settings.date_format.as_str();

    match cmd {
        ExpenseCommands::Add {
            description,
            amount,
            paid_by,
            split,
            among,
            shares,
            weights,
            group,
        } => {
            let amount = parse_amount(&amount)?;
            let payers = parse_payers(&paid_by)?;
            let group = group.unwrap_or_else(|| settings.default_group.clone());

            let expense = storage.update(|ledger| {
                let rule = build_rule(ledger, split, among, &shares, &weights)?;
                let mut new = NewExpense::new(description, amount, rule).in_group(group);
                new.paid_amounts = payers.resolve(amount);

                let id = ledger.add_expense(new)?;
                ledger
                    .get_expense(id)
                    .map(|e| format_expense_details(e, symbol, date_format))
                    .ok_or_else(|| SplitError::expense_not_found(id.to_string()))
            })??;

            println!("Added expense\n");
            print!("{}", expense);
        }

        ExpenseCommands::List { group, member } => {
            let output = storage.read(|ledger| {
                let expenses: Vec<_> = ledger
                    .expenses_in(group.as_deref())
                    .filter(|e| member.as_deref().map_or(true, |m| e.involves(m)))
                    .collect();
                let mut output = format_expense_list(&expenses, symbol, date_format);
                if !expenses.is_empty() {
                    let total: Money = expenses.iter().map(|e| e.amount()).sum();
                    output.push_str(&format!(
                        "\nTotal: {} expenses, {}\n",
                        expenses.len(),
                        total.format_with_symbol(symbol)
                    ));
                }
                output
            })?;
            print!("{}", output);
        }

        ExpenseCommands::Show { id } => {
            let output = storage.read(|ledger| {
                ledger
                    .find_expense(&id)
                    .map(|e| format_expense_details(e, symbol, date_format))
            })??;
            print!("{}", output);
        }

        ExpenseCommands::Delete { id } => {
            let description = storage.update(|ledger| {
                let expense = ledger.find_expense(&id)?;
                let (expense_id, description) = (expense.id(), expense.description().to_string());
                ledger.delete_expense(expense_id);
                Ok::<_, SplitError>(format!("{} ({})", description, expense_id))
            })??;
            println!("Deleted expense: {}", description);
        }
    }

    Ok(())
}

/// Payers given on the command line
#[derive(Debug, Clone, PartialEq)]
enum Payers {
    /// One payer, who paid the whole amount
    Single(String),
    /// Several payers with the amount each paid
    Split(BTreeMap<String, Money>),
}

impl Payers {
    fn resolve(&self, amount: Money) -> BTreeMap<String, Money> {
        match self {
            Self::Single(name) => BTreeMap::from([(name.clone(), amount)]),
            Self::Split(paid) => paid.clone(),
        }
    }
}

fn parse_amount(s: &str) -> SplitResult<Money> {
    Money::parse(s).map_err(|e| SplitError::Validation(format!("Invalid amount '{}': {}", s, e)))
}

/// Split a `NAME=VALUE` argument into its trimmed parts
fn parse_assignment(arg: &str) -> SplitResult<(String, &str)> {
    let (name, value) = arg.split_once('=').ok_or_else(|| {
        SplitError::Validation(format!("Expected NAME=VALUE, got '{}'", arg))
    })?;

    let name = name.trim();
    if name.is_empty() {
        return Err(SplitError::Validation(format!(
            "Missing member name in '{}'",
            arg
        )));
    }

    Ok((name.to_string(), value.trim()))
}

fn parse_payers(args: &[String]) -> SplitResult<Payers> {
    match args {
        [] => Err(SplitError::Validation("At least one payer is required".into())),
        [single] if !single.contains('=') => Ok(Payers::Single(single.trim().to_string())),
        _ => {
            let mut paid = BTreeMap::new();
            for arg in args {
                if !arg.contains('=') {
                    return Err(SplitError::Validation(format!(
                        "With several payers each needs an amount (NAME=AMOUNT), got '{}'",
                        arg
                    )));
                }
                let (name, value) = parse_assignment(arg)?;
                paid.insert(name, parse_amount(value)?);
            }
            Ok(Payers::Split(paid))
        }
    }
}

fn parse_shares(args: &[String]) -> SplitResult<BTreeMap<String, Money>> {
    args.iter()
        .map(|arg| {
            let (name, value) = parse_assignment(arg)?;
            Ok((name, parse_amount(value)?))
        })
        .collect()
}

/// Parse weights, keeping the order they were given in
fn parse_weights(args: &[String]) -> SplitResult<Vec<(String, f64)>> {
    args.iter()
        .map(|arg| {
            let (name, value) = parse_assignment(arg)?;
            let weight = value.parse::<f64>().map_err(|_| {
                SplitError::Validation(format!("Invalid weight '{}' for {}", value, name))
            })?;
            Ok((name, weight))
        })
        .collect()
}

fn clean_names(names: Vec<String>) -> Vec<String> {
    names
        .into_iter()
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .collect()
}

/// Build the split rule from command-line options
fn build_rule(
    ledger: &Ledger,
    split: SplitArg,
    among: Vec<String>,
    shares: &[String],
    weights: &[String],
) -> SplitResult<SplitRule> {
    let among = clean_names(among);

    match split {
        SplitArg::Equal => {
            let among = if among.is_empty() {
                ledger.members().to_vec()
            } else {
                among
            };
            Ok(SplitRule::Equal { among })
        }
        SplitArg::Custom => {
            if shares.is_empty() {
                return Err(SplitError::Validation(
                    "Custom split needs --share NAME=AMOUNT for each participant".into(),
                ));
            }
            Ok(SplitRule::Custom {
                shares: parse_shares(shares)?,
            })
        }
        SplitArg::Ratio => {
            if weights.is_empty() {
                return Err(SplitError::Validation(
                    "Ratio split needs --weight NAME=WEIGHT for each participant".into(),
                ));
            }
            let weights = parse_weights(weights)?;
            let among = if among.is_empty() {
                weights.iter().map(|(name, _)| name.clone()).collect()
            } else {
                among
            };
            Ok(SplitRule::Ratio {
                among,
                weights: weights.into_iter().collect(),
            })
        }
    }
}
