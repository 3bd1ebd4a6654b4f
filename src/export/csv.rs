//! CSV Export functionality
//!
//! Exports expense shares and balances in a spreadsheet-friendly layout.
//! Amounts are written as plain decimals without a currency symbol.

use crate::error::{SplitError, SplitResult};
use crate::ledger::Ledger;
use crate::models::Money;
use std::collections::BTreeSet;
use std::io::Write;

fn decimal(amount: Money) -> String {
    format!(
        "{}{}.{:02}",
        if amount.is_negative() { "-" } else { "" },
        amount.dollars().abs(),
        amount.cents_part()
    )
}

fn csv_err(e: csv::Error) -> SplitError {
    SplitError::Export(e.to_string())
}

/// Export one row per member and expense: what they paid and what they owe
pub fn export_expenses_csv<W: Write>(
    ledger: &Ledger,
    writer: W,
    group_filter: Option<&str>,
) -> SplitResult<()> {
    let mut csv = csv::Writer::from_writer(writer);

    csv.write_record([
        "Expense ID",
        "Date",
        "Group",
        "Description",
        "Amount",
        "Split",
        "Member",
        "Paid",
        "Owed",
    ])
    .map_err(csv_err)?;

    for expense in ledger.expenses_in(group_filter) {
        let id = expense.id().as_uuid().to_string();
        let date = expense.created_at().format("%Y-%m-%d %H:%M:%S").to_string();
        let amount = decimal(expense.amount());
        let policy = expense.split_policy().to_string();

        let involved: BTreeSet<&String> = expense
            .paid_amounts()
            .keys()
            .chain(expense.splits().keys())
            .collect();

        for member in involved {
            let paid = expense
                .paid_amounts()
                .get(member)
                .copied()
                .unwrap_or(Money::zero());
            let owed = expense
                .splits()
                .get(member)
                .copied()
                .unwrap_or(Money::zero());

            csv.write_record([
                id.as_str(),
                date.as_str(),
                expense.group(),
                expense.description(),
                amount.as_str(),
                policy.as_str(),
                member.as_str(),
                decimal(paid).as_str(),
                decimal(owed).as_str(),
            ])
            .map_err(csv_err)?;
        }
    }

    csv.flush()?;
    Ok(())
}

/// Export the balance sheet in scope
pub fn export_balances_csv<W: Write>(
    ledger: &Ledger,
    writer: W,
    group_filter: Option<&str>,
) -> SplitResult<()> {
    let mut csv = csv::Writer::from_writer(writer);

    csv.write_record(["Member", "Balance", "Status"])
        .map_err(csv_err)?;

    for entry in &ledger.compute_balances(group_filter) {
        csv.write_record([
            entry.member.as_str(),
            decimal(entry.balance).as_str(),
            entry.status().to_string().as_str(),
        ])
        .map_err(csv_err)?;
    }

    csv.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewExpense, SplitRule};

    fn ledger() -> Ledger {
        let mut ledger = Ledger::new();
        for name in ["Alice", "Bob", "Carol"] {
            ledger.add_member(name);
        }
        ledger
            .add_expense(
                NewExpense::new(
                    "Pizza, drinks",
                    Money::from_cents(3000),
                    SplitRule::Equal {
                        among: vec!["Bob".into(), "Carol".into()],
                    },
                )
                .paid_in_full_by("Alice"),
            )
            .unwrap();
        ledger
    }

    #[test]
    fn test_decimal() {
        assert_eq!(decimal(Money::from_cents(1050)), "10.50");
        assert_eq!(decimal(Money::from_cents(-5)), "-0.05");
        assert_eq!(decimal(Money::zero()), "0.00");
    }

    #[test]
    fn test_expenses_csv() {
        let mut output = Vec::new();
        export_expenses_csv(&ledger(), &mut output, None).unwrap();

        let csv = String::from_utf8(output).unwrap();
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Expense ID,Date,Group"));
        assert!(lines[1].ends_with("General,\"Pizza, drinks\",30.00,Equal,Alice,30.00,0.00"));
        assert!(lines[2].ends_with(",Bob,0.00,15.00"));
        assert!(lines[3].ends_with(",Carol,0.00,15.00"));
    }

    #[test]
    fn test_expenses_csv_group_filter() {
        let mut output = Vec::new();
        export_expenses_csv(&ledger(), &mut output, Some("Trip")).unwrap();
        assert_eq!(String::from_utf8(output).unwrap().lines().count(), 1);
    }

    #[test]
    fn test_balances_csv() {
        let mut output = Vec::new();
        export_balances_csv(&ledger(), &mut output, None).unwrap();

        let csv = String::from_utf8(output).unwrap();
        assert_eq!(
            csv,
            "Member,Balance,Status\n\
             Alice,30.00,should receive\n\
             Bob,-15.00,owes money\n\
             Carol,-15.00,owes money\n"
        );
    }
}
