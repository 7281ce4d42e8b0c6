//! Monthly completion of recurring bills
//!
//! A bill is complete for a month when at least one expense that month
//! belongs to it. An expense belongs to a bill when it is linked to the
//! bill's category, or when it carries the bill's category name as text.

use crate::models::{BillStatus, ExpenseGroup, RecurringBill};

/// Number of expenses in `groups` that belong to `bill`
///
/// Each group is a distinct (category_id, category_name) pair, so an expense
/// matching on both id and name is still counted once.
pub fn matching_expense_count(bill: &RecurringBill, groups: &[ExpenseGroup]) -> i64 {
    groups
        .iter()
        .filter(|group| {
            let id_match = bill.category_id.is_some() && group.category_id == bill.category_id;
            let name_match = group.category_name.as_deref() == Some(bill.category_name.as_str());
            id_match || name_match
        })
        .map(|group| group.count)
        .sum()
}

/// Attach completion state to each bill, preserving order
pub fn mark_completion(bills: Vec<RecurringBill>, groups: &[ExpenseGroup]) -> Vec<BillStatus> {
    bills
        .into_iter()
        .map(|bill| {
            let expense_count = matching_expense_count(&bill, groups);
            BillStatus {
                bill,
                is_complete: expense_count > 0,
                expense_count,
            }
        })
        .collect()
}
