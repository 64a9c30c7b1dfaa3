use std::collections::BTreeMap;

use crate::models::Expense;

/// Sum of all amounts. Empty input totals `0.0`.
pub(crate) fn calculate_total<'a, I>(expenses: I) -> f64
where
    I: IntoIterator<Item = &'a Expense>,
{
    expenses.into_iter().map(|e| e.amount).sum()
}

/// Totals keyed by lowercased category, so "Food" and "food" share a bucket.
pub(crate) fn totals_by_category<'a, I>(expenses: I) -> BTreeMap<String, f64>
where
    I: IntoIterator<Item = &'a Expense>,
{
    let mut totals = BTreeMap::new();
    for expense in expenses {
        *totals.entry(expense.category.to_lowercase()).or_insert(0.0) += expense.amount;
    }
    totals
}

/// Mean amount per lowercased category.
pub(crate) fn average_by_category<'a, I>(expenses: I) -> BTreeMap<String, f64>
where
    I: IntoIterator<Item = &'a Expense>,
{
    let mut buckets: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    for expense in expenses {
        let (sum, count) = buckets
            .entry(expense.category.to_lowercase())
            .or_insert((0.0, 0));
        *sum += expense.amount;
        *count += 1;
    }
    buckets
        .into_iter()
        .map(|(category, (sum, count))| (category, sum / count as f64))
        .collect()
}
