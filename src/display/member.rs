//! Member and group display formatting

use crate::models::{Group, DEFAULT_GROUP};

/// Format the member registry, flagging names that only survive in history
pub fn format_member_list(members: &[String], orphans: &[String]) -> String {
    let mut output = String::new();

    if members.is_empty() {
        output.push_str("No members yet.\n");
    } else {
        output.push_str(&format!("Members ({}):\n", members.len()));
        for member in members {
            output.push_str(&format!("  {}\n", member));
        }
    }

    if !orphans.is_empty() {
        output.push_str(&format!(
            "\nRemoved members still named in expenses: {}\n",
            orphans.join(", ")
        ));
    }

    output
}

/// Format defined groups plus labels that are only used by expenses
pub fn format_group_list(groups: &[Group], labels: &[String]) -> String {
    let mut output = String::new();
    output.push_str(&format!("  {} (default)\n", DEFAULT_GROUP));

    for group in groups {
        if group.members.is_empty() {
            output.push_str(&format!("  {}\n", group.name));
        } else {
            output.push_str(&format!(
                "  {}: {}\n",
                group.name,
                group.members.join(", ")
            ));
        }
    }

    for label in labels {
        let defined = label == DEFAULT_GROUP || groups.iter().any(|g| &g.name == label);
        if !defined {
            output.push_str(&format!("  {} (used by expenses only)\n", label));
        }
    }

    output
}
