//! The ledger aggregate
//!
//! A [`Ledger`] owns the member registry, the expense store and the group
//! definitions. Every core operation is a method on it; nothing is kept in
//! global state. Operations validate first and only then change state, so
//! a failed call leaves the ledger exactly as it was.
//!
//! Members are kept in insertion order. That order is the iteration order
//! for balance sheets and for settlement planning.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{SplitError, SplitResult};
use crate::export::json::LedgerSnapshot;
use crate::models::{
    BalanceSheet, Expense, ExpenseId, Group, Money, NewExpense, Settlement, DEFAULT_GROUP,
};
use crate::services::{calculate_splits, compute_balances, plan_settlements, validate_payments};

/// Members, expenses and groups of one shared-expense ledger
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    members: Vec<String>,
    expenses: Vec<Expense>,
    /// Sorted by name; never contains the default group
    groups: Vec<Group>,
}

/// Quick statistics over the expenses in scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LedgerSummary {
    pub total_amount: Money,
    pub expense_count: usize,
    pub member_count: usize,
    pub group_count: usize,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    // ----- members -----

    /// Registered member names, in the order they were added
    pub fn members(&self) -> &[String] {
        &self.members
    }

    pub fn has_member(&self, name: &str) -> bool {
        self.members.iter().any(|m| m == name)
    }

    /// Register a new member
    ///
    /// The name is trimmed. Empty names are a validation error and names
    /// already present are a [`SplitError::DuplicateMember`].
    pub fn try_add_member(&mut self, name: &str) -> SplitResult<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SplitError::Validation("Member name cannot be empty".into()));
        }
        if self.has_member(name) {
            return Err(SplitError::DuplicateMember(name.to_string()));
        }

        self.members.push(name.to_string());
        info!(member = name, "Added member");
        Ok(())
    }

    /// Register a new member, returning `false` if the name is empty or taken
    pub fn add_member(&mut self, name: &str) -> bool {
        self.try_add_member(name).is_ok()
    }

    /// Remove a member from the registry
    ///
    /// Expenses that mention the member are left untouched. The name stays
    /// in their payers and shares but no longer shows up in balances.
    pub fn remove_member(&mut self, name: &str) -> bool {
        let name = name.trim();
        let before = self.members.len();
        self.members.retain(|m| m != name);

        let removed = self.members.len() != before;
        if removed {
            info!(member = name, "Removed member");
        }
        removed
    }

    /// Names referenced by expenses that are no longer registered, in order
    /// of first appearance
    pub fn orphaned_members(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut orphans = Vec::new();

        for expense in &self.expenses {
            let names = expense
                .paid_amounts()
                .keys()
                .chain(expense.splits().keys());
            for name in names {
                if !self.has_member(name) && seen.insert(name.as_str()) {
                    orphans.push(name.clone());
                }
            }
        }

        orphans
    }

    // ----- groups -----

    /// Defined groups, sorted by name. The default group is implicit.
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// Define a new group
    ///
    /// Listed members must be registered. The default group always exists
    /// and cannot be defined again.
    pub fn try_add_group(&mut self, name: &str, members: Vec<String>) -> SplitResult<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SplitError::Validation("Group name cannot be empty".into()));
        }
        if name == DEFAULT_GROUP || self.group(name).is_some() {
            return Err(SplitError::Validation(format!(
                "Group already exists: {}",
                name
            )));
        }
        if let Some(unknown) = members.iter().find(|m| !self.has_member(m)) {
            return Err(SplitError::member_not_found(unknown.as_str()));
        }

        let position = self
            .groups
            .binary_search_by(|g| g.name.as_str().cmp(name))
            .unwrap_or_else(|p| p);
        self.groups.insert(position, Group::new(name, members));

        info!(group = name, "Added group");
        Ok(())
    }

    /// Define a new group, returning `false` if it already exists or is invalid
    pub fn add_group(&mut self, name: &str, members: Vec<String>) -> bool {
        self.try_add_group(name, members).is_ok()
    }

    /// Distinct group labels used by expenses, in order of first use
    pub fn group_labels(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.expenses
            .iter()
            .filter(|e| seen.insert(e.group()))
            .map(|e| e.group().to_string())
            .collect()
    }

    // ----- expenses -----

    /// Validate a new expense, compute its shares and append it
    pub fn add_expense(&mut self, new: NewExpense) -> SplitResult<ExpenseId> {
        if new.description.trim().is_empty() {
            return Err(SplitError::Validation(
                "Expense description cannot be empty".into(),
            ));
        }
        if !new.amount.is_positive() {
            return Err(SplitError::Validation(format!(
                "Expense amount must be positive, got {}",
                new.amount
            )));
        }

        let splits = calculate_splits(new.amount, &new.split, &self.members)?;
        let paid = validate_payments(new.amount, &new.paid_amounts, &self.members)?;

        let mut new = new;
        new.group = match new.group.trim() {
            "" => DEFAULT_GROUP.to_string(),
            group => group.to_string(),
        };

        let expense = Expense::record(new, paid, splits);
        let id = expense.id();
        info!(
            expense = %id,
            amount = %expense.amount(),
            policy = %expense.split_policy(),
            group = expense.group(),
            "Added expense"
        );

        self.expenses.push(expense);
        Ok(id)
    }

    /// Delete an expense; unknown ids are a no-op returning `false`
    pub fn delete_expense(&mut self, id: ExpenseId) -> bool {
        let before = self.expenses.len();
        self.expenses.retain(|e| e.id() != id);

        let removed = self.expenses.len() != before;
        if removed {
            info!(expense = %id, "Deleted expense");
        } else {
            debug!(expense = %id, "Delete ignored, no such expense");
        }
        removed
    }

    /// All expenses, oldest first
    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    /// Expenses under a group filter (`None` = all groups), oldest first
    pub fn expenses_in<'a>(
        &'a self,
        group_filter: Option<&'a str>,
    ) -> impl Iterator<Item = &'a Expense> + 'a {
        self.expenses.iter().filter(move |e| e.in_scope(group_filter))
    }

    pub fn get_expense(&self, id: ExpenseId) -> Option<&Expense> {
        self.expenses.iter().find(|e| e.id() == id)
    }

    /// Look up an expense by full id, `exp-` short form, or unique id prefix
    pub fn find_expense(&self, identifier: &str) -> SplitResult<&Expense> {
        let mut matches = self
            .expenses
            .iter()
            .filter(|e| e.id().matches_prefix(identifier));

        match (matches.next(), matches.next()) {
            (Some(expense), None) => Ok(expense),
            (None, _) => Err(SplitError::expense_not_found(identifier)),
            (Some(_), Some(_)) => Err(SplitError::Validation(format!(
                "Expense id '{}' is ambiguous, use more characters",
                identifier
            ))),
        }
    }

    /// Delete every expense, keeping members and groups
    pub fn clear_expenses(&mut self) -> usize {
        let count = self.expenses.len();
        self.expenses.clear();
        info!(count, "Cleared expenses");
        count
    }

    /// Delete every expense, member and group
    pub fn clear_all(&mut self) {
        *self = Self::default();
        info!("Cleared all ledger data");
    }

    // ----- computations -----

    /// Net balance of every registered member over the expenses in scope
    pub fn compute_balances(&self, group_filter: Option<&str>) -> BalanceSheet {
        compute_balances(&self.members, &self.expenses, group_filter)
    }

    /// Payments that would settle every balance in scope
    pub fn compute_settlements(&self, group_filter: Option<&str>) -> Vec<Settlement> {
        plan_settlements(&self.compute_balances(group_filter))
    }

    pub fn summary(&self, group_filter: Option<&str>) -> LedgerSummary {
        let mut total_amount = Money::zero();
        let mut expense_count = 0;
        for expense in self.expenses_in(group_filter) {
            total_amount += expense.amount();
            expense_count += 1;
        }

        LedgerSummary {
            total_amount,
            expense_count,
            member_count: self.members.len(),
            group_count: self.groups.len(),
        }
    }

    // ----- import / export -----

    /// Serializable copy of the whole ledger
    pub fn export_state(&self) -> LedgerSnapshot {
        LedgerSnapshot::from_ledger(self)
    }

    /// Replace the ledger's contents with a snapshot
    ///
    /// The snapshot is fully validated first; on error the ledger is left
    /// unchanged.
    pub fn import_state(&mut self, snapshot: LedgerSnapshot) -> SplitResult<()> {
        let imported = Self::from_snapshot(snapshot)?;
        info!(
            members = imported.members.len(),
            expenses = imported.expenses.len(),
            groups = imported.groups.len(),
            "Imported ledger state"
        );
        *self = imported;
        Ok(())
    }

    /// Build a ledger from a snapshot, checking every stored invariant
    pub fn from_snapshot(snapshot: LedgerSnapshot) -> SplitResult<Self> {
        let mut members: Vec<String> = Vec::with_capacity(snapshot.members.len());
        for name in snapshot.members {
            if name.trim().is_empty() {
                return Err(SplitError::Format("Member names cannot be empty".into()));
            }
            if members.contains(&name) {
                return Err(SplitError::Format(format!(
                    "Member '{}' is listed more than once",
                    name
                )));
            }
            members.push(name);
        }

        let mut groups = Vec::with_capacity(snapshot.groups.len());
        for (name, group_members) in snapshot.groups {
            if name.trim().is_empty() {
                return Err(SplitError::Format("Group names cannot be empty".into()));
            }
            if name == DEFAULT_GROUP {
                debug!("Skipping explicit definition of the default group");
                continue;
            }
            groups.push(Group::new(name, group_members));
        }

        let mut ids = HashSet::new();
        for expense in &snapshot.expenses {
            if !ids.insert(expense.id()) {
                return Err(SplitError::Format(format!(
                    "Expense {} appears more than once",
                    expense.id()
                )));
            }
            expense
                .validate()
                .map_err(|e| SplitError::Format(format!("Expense {}: {}", expense.id(), e)))?;
        }

        Ok(Self {
            members,
            expenses: snapshot.expenses,
            groups,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SplitRule;
    use std::collections::BTreeMap;

    fn abc() -> Ledger {
        let mut ledger = Ledger::new();
        for name in ["A", "B", "C"] {
            assert!(ledger.add_member(name));
        }
        ledger
    }

    fn equal(among: &[&str]) -> SplitRule {
        SplitRule::Equal {
            among: among.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn dinner() -> NewExpense {
        NewExpense::new("Dinner", Money::from_cents(9000), equal(&["A", "B", "C"]))
            .paid_in_full_by("A")
    }

    #[test]
    fn test_member_registry() {
        let mut ledger = abc();
        assert_eq!(ledger.members(), ["A", "B", "C"]);

        assert!(!ledger.add_member("A"));
        assert!(!ledger.add_member("   "));
        assert!(matches!(
            ledger.try_add_member("B"),
            Err(SplitError::DuplicateMember(_))
        ));
        assert!(matches!(
            ledger.try_add_member(""),
            Err(SplitError::Validation(_))
        ));

        assert!(ledger.add_member(" D "));
        assert!(ledger.has_member("D"));

        assert!(ledger.remove_member("B"));
        assert!(!ledger.remove_member("B"));
        assert_eq!(ledger.members(), ["A", "C", "D"]);
    }

    #[test]
    fn test_dinner_scenario() {
        let mut ledger = abc();
        let id = ledger.add_expense(dinner()).unwrap();

        let expense = ledger.get_expense(id).unwrap();
        assert_eq!(expense.splits().len(), 3);
        assert!(expense
            .splits()
            .values()
            .all(|s| *s == Money::from_cents(3000)));

        let balances = ledger.compute_balances(None);
        assert_eq!(balances.get("A"), Some(Money::from_cents(6000)));
        assert_eq!(balances.get("B"), Some(Money::from_cents(-3000)));
        assert_eq!(balances.get("C"), Some(Money::from_cents(-3000)));

        let settlements = ledger.compute_settlements(None);
        assert_eq!(
            settlements,
            vec![
                Settlement::new("B", "A", Money::from_cents(3000)),
                Settlement::new("C", "A", Money::from_cents(3000)),
            ]
        );
    }

    #[test]
    fn test_ratio_scenario() {
        let mut ledger = abc();
        let rule = SplitRule::Ratio {
            among: vec!["A".into(), "B".into()],
            weights: BTreeMap::from([("A".to_string(), 2.0), ("B".to_string(), 3.0)]),
        };
        let id = ledger
            .add_expense(NewExpense::new("Groceries", Money::from_cents(10000), rule).paid_in_full_by("C"))
            .unwrap();

        let expense = ledger.get_expense(id).unwrap();
        assert_eq!(expense.splits()["A"], Money::from_cents(4000));
        assert_eq!(expense.splits()["B"], Money::from_cents(6000));
        assert_eq!(expense.ratio_weights().unwrap()["B"], 3.0);
    }

    #[test]
    fn test_leftover_cents_are_settled() {
        let mut ledger = abc();
        ledger.add_member("D");

        ledger
            .add_expense(
                NewExpense::new("Tickets", Money::from_cents(302), equal(&["B", "C", "D"]))
                    .paid_in_full_by("A"),
            )
            .unwrap();
        for payer in ["B", "C", "D"] {
            ledger
                .add_expense(
                    NewExpense::new("Coffee", Money::from_cents(100), equal(&["A"]))
                        .paid_in_full_by(payer),
                )
                .unwrap();
        }

        let balances = ledger.compute_balances(None);
        assert_eq!(balances.get("A"), Some(Money::from_cents(2)));
        assert_eq!(balances.get("B"), Some(Money::from_cents(-1)));
        assert_eq!(balances.get("C"), Some(Money::from_cents(-1)));
        assert_eq!(balances.get("D"), Some(Money::zero()));

        let settlements = ledger.compute_settlements(None);
        assert_eq!(
            settlements,
            vec![
                Settlement::new("B", "A", Money::from_cents(1)),
                Settlement::new("C", "A", Money::from_cents(1)),
            ]
        );
        assert!(crate::services::apply_settlements(&balances, &settlements)
            .iter()
            .all(|e| e.balance.is_zero()));
    }

    #[test]
    fn test_invalid_expense_leaves_state_untouched() {
        let mut ledger = abc();
        ledger.add_expense(dinner()).unwrap();
        let before = ledger.clone();

        let bad_split = NewExpense::new(
            "Taxi",
            Money::from_cents(3000),
            SplitRule::Custom {
                shares: BTreeMap::from([("A".to_string(), Money::from_cents(1000))]),
            },
        )
        .paid_in_full_by("B");
        assert!(matches!(
            ledger.add_expense(bad_split),
            Err(SplitError::InvalidSplit(_))
        ));

        let bad_payment = NewExpense::new("Taxi", Money::from_cents(3000), equal(&["A", "B"]))
            .paid_by("A", Money::from_cents(1000))
            .paid_by("B", Money::from_cents(1000));
        assert!(matches!(
            ledger.add_expense(bad_payment),
            Err(SplitError::InvalidPayment(_))
        ));

        let no_description = NewExpense::new("  ", Money::from_cents(3000), equal(&["A"]))
            .paid_in_full_by("A");
        assert!(matches!(
            ledger.add_expense(no_description),
            Err(SplitError::Validation(_))
        ));

        let zero = NewExpense::new("Free", Money::zero(), equal(&["A"])).paid_in_full_by("A");
        assert!(ledger.add_expense(zero).is_err());

        assert_eq!(ledger, before);
    }

    #[test]
    fn test_delete_unknown_expense_is_noop() {
        let mut ledger = abc();
        ledger.add_expense(dinner()).unwrap();

        assert!(!ledger.delete_expense(ExpenseId::new()));
        assert_eq!(ledger.expenses().len(), 1);
    }

    #[test]
    fn test_delete_expense() {
        let mut ledger = abc();
        let id = ledger.add_expense(dinner()).unwrap();

        assert!(ledger.delete_expense(id));
        assert!(ledger.expenses().is_empty());
        assert!(ledger.compute_balances(None).is_settled());
    }

    #[test]
    fn test_find_expense() {
        let mut ledger = abc();
        let id = ledger.add_expense(dinner()).unwrap();

        assert_eq!(ledger.find_expense(&id.to_string()).unwrap().id(), id);
        assert_eq!(
            ledger
                .find_expense(&id.as_uuid().to_string())
                .unwrap()
                .id(),
            id
        );
        assert!(ledger
            .find_expense("exp-zzzzzzzz")
            .unwrap_err()
            .to_string()
            .contains("not found"));
    }

    #[test]
    fn test_removed_member_leaves_orphans_in_history() {
        let mut ledger = abc();
        let id = ledger.add_expense(dinner()).unwrap();

        assert!(ledger.remove_member("C"));

        // The expense is unchanged and still names C
        let expense = ledger.get_expense(id).unwrap();
        assert_eq!(expense.splits()["C"], Money::from_cents(3000));
        assert_eq!(ledger.orphaned_members(), vec!["C".to_string()]);

        // C's share no longer shows up in balances
        let balances = ledger.compute_balances(None);
        assert_eq!(balances.len(), 2);
        assert_eq!(balances.get("C"), None);
        assert_eq!(balances.get("A"), Some(Money::from_cents(6000)));
        assert_eq!(balances.get("B"), Some(Money::from_cents(-3000)));
        assert_eq!(balances.total(), Money::from_cents(3000));

        // Re-adding the name picks the history back up
        assert!(ledger.add_member("C"));
        assert!(ledger.orphaned_members().is_empty());
        assert!(ledger.compute_balances(None).total().is_zero());
    }

    #[test]
    fn test_groups_and_filters() {
        let mut ledger = abc();
        assert!(ledger.add_group("Trip", vec!["A".into(), "B".into()]));
        assert!(!ledger.add_group("Trip", vec![]));
        assert!(!ledger.add_group(DEFAULT_GROUP, vec![]));
        assert!(ledger
            .try_add_group("Flat", vec!["Z".into()])
            .unwrap_err()
            .to_string()
            .contains("not found"));
        assert!(ledger.add_group("Bills", vec![]));

        let names: Vec<_> = ledger.groups().iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Bills", "Trip"]);

        ledger.add_expense(dinner()).unwrap();
        ledger
            .add_expense(
                NewExpense::new("Fuel", Money::from_cents(4000), equal(&["A", "B"]))
                    .paid_in_full_by("B")
                    .in_group("Trip"),
            )
            .unwrap();

        assert_eq!(ledger.group_labels(), vec!["General", "Trip"]);
        assert_eq!(ledger.expenses_in(Some("Trip")).count(), 1);
        assert_eq!(ledger.expenses_in(None).count(), 2);

        let trip = ledger.compute_balances(Some("Trip"));
        assert_eq!(trip.get("A"), Some(Money::from_cents(-2000)));
        assert_eq!(trip.get("B"), Some(Money::from_cents(2000)));
        assert_eq!(trip.get("C"), Some(Money::zero()));

        let summary = ledger.summary(Some("Trip"));
        assert_eq!(summary.total_amount, Money::from_cents(4000));
        assert_eq!(summary.expense_count, 1);
        assert_eq!(summary.member_count, 3);
        assert_eq!(summary.group_count, 2);
    }

    #[test]
    fn test_blank_group_falls_back_to_default() {
        let mut ledger = abc();
        let id = ledger.add_expense(dinner().in_group("  ")).unwrap();
        assert_eq!(ledger.get_expense(id).unwrap().group(), DEFAULT_GROUP);
    }

    #[test]
    fn test_clear() {
        let mut ledger = abc();
        ledger.add_group("Trip", vec![]);
        ledger.add_expense(dinner()).unwrap();

        assert_eq!(ledger.clear_expenses(), 1);
        assert_eq!(ledger.members().len(), 3);
        assert_eq!(ledger.groups().len(), 1);

        ledger.clear_all();
        assert_eq!(ledger, Ledger::new());
    }

    #[test]
    fn test_export_import_round_trip() {
        let mut ledger = abc();
        ledger.add_group("Trip", vec!["A".into()]);
        ledger.add_expense(dinner()).unwrap();

        let mut restored = Ledger::new();
        restored.import_state(ledger.export_state()).unwrap();
        assert_eq!(restored, ledger);
    }

    #[test]
    fn test_import_rejects_invalid_snapshot_without_changes() {
        let mut ledger = abc();
        ledger.add_expense(dinner()).unwrap();
        let before = ledger.clone();

        let mut snapshot = ledger.export_state();
        snapshot.members.push("A".into());
        assert!(matches!(
            ledger.import_state(snapshot),
            Err(SplitError::Format(_))
        ));

        let mut snapshot = before.export_state();
        let duplicate = snapshot.expenses[0].clone();
        snapshot.expenses.push(duplicate);
        assert!(ledger.import_state(snapshot).is_err());

        let mut snapshot = before.export_state();
        snapshot.expenses[0].splits.insert("B".into(), Money::zero());
        assert!(ledger.import_state(snapshot).is_err());

        assert_eq!(ledger, before);
    }
}
