//! Group CLI commands

use clap::Subcommand;

use crate::display::format_group_list;
use crate::error::SplitResult;
use crate::storage::Storage;

/// Group subcommands
#[derive(Subcommand, Debug)]
pub enum GroupCommands {
    /// Define a new group
    Add {
        /// Group name
        name: String,
        /// Members the group is for (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        members: Vec<String>,
    },
    /// List groups
    #[command(alias = "ls")]
    List,
}

/// Handle a group command
pub fn handle_group_command(storage: &Storage, cmd: GroupCommands) -> SplitResult<()> {
    match cmd {
        GroupCommands::Add { name, members } => {
            let members: Vec<String> = members
                .into_iter()
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty())
                .collect();
            storage.update(|ledger| ledger.try_add_group(&name, members))??;
            println!("Added group: {}", name.trim());
        }

        GroupCommands::List => {
            let output =
                storage.read(|ledger| format_group_list(ledger.groups(), &ledger.group_labels()))?;
            print!("{}", output);
        }
    }

    Ok(())
}
