//! Member CLI commands
//!
//! Implements CLI commands for managing the member registry.

use clap::Subcommand;

use crate::display::format_member_list;
use crate::error::{SplitError, SplitResult};
use crate::storage::Storage;

/// Member subcommands
#[derive(Subcommand, Debug)]
pub enum MemberCommands {
    /// Add one or more members
    Add {
        /// Member names
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Remove a member (their expense history is kept)
    #[command(alias = "rm")]
    Remove {
        /// Member name
        name: String,
    },
    /// List all members
    #[command(alias = "ls")]
    List,
}

/// Handle a member command
pub fn handle_member_command(storage: &Storage, cmd: MemberCommands) -> SplitResult<()> {
    match cmd {
        MemberCommands::Add { names } => {
            for name in names {
                storage.update(|ledger| ledger.try_add_member(&name))??;
                println!("Added member: {}", name.trim());
            }
        }

        MemberCommands::Remove { name } => {
            let (removed, involved) = storage.update(|ledger| {
                let removed = ledger.remove_member(&name);
                let involved = ledger
                    .expenses()
                    .iter()
                    .filter(|e| e.involves(name.trim()))
                    .count();
                (removed, involved)
            })?;

            if !removed {
                return Err(SplitError::member_not_found(name));
            }

            println!("Removed member: {}", name.trim());
            if involved > 0 {
                println!(
                    "Note: {} expense(s) still name {}; they no longer count towards balances.",
                    involved,
                    name.trim()
                );
            }
        }

        MemberCommands::List => {
            let output = storage
                .read(|ledger| format_member_list(ledger.members(), &ledger.orphaned_members()))?;
            print!("{}", output);
        }
    }

    Ok(())
}
