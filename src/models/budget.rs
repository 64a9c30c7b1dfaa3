use serde_json::{Map, Value};

use super::error::{json_kind, RecordError};
use super::expense::{Expense, DEFAULT_CATEGORY};

#[derive(Debug, Clone, PartialEq)]
pub struct Budget {
    pub category: String,
    pub limit: f64,
    pub expenses: Vec<Expense>,
}

impl Budget {
    pub fn new(category: String, limit: f64) -> Self {
        Self {
            category,
            limit,
            expenses: Vec::new(),
        }
    }

    /// Record an expense. Expenses from other categories are kept too.
    pub fn add_expense(&mut self, expense: Expense) {
        if !expense.matches_category(&self.category) {
            tracing::debug!(
                "expense category \"{}\" differs from budget \"{}\"",
                expense.category,
                self.category
            );
        }
        self.expenses.push(expense);
    }

    pub fn extend<I>(&mut self, expenses: I)
    where
        I: IntoIterator<Item = Expense>,
    {
        for expense in expenses {
            self.add_expense(expense);
        }
    }

    /// Record an expense given as an untyped value. On error the budget is
    /// left as it was.
    pub fn add_record(&mut self, value: &Value) -> Result<(), RecordError> {
        let expense = Expense::from_value(value)?;
        self.add_expense(expense);
        Ok(())
    }

    /// Stops at the first bad value; values before it stay recorded.
    pub fn extend_records<'a, I>(&mut self, values: I) -> Result<(), RecordError>
    where
        I: IntoIterator<Item = &'a Value>,
    {
        for value in values {
            self.add_record(value)?;
        }
        Ok(())
    }

    /// Sum of all recorded amounts.
    pub fn spent(&self) -> f64 {
        self.expenses.iter().map(|e| e.amount).sum()
    }

    /// The limit less the *average* recorded amount, rounded to cents.
    ///
    /// With no expenses this is the limit itself, unrounded.
    pub fn remaining(&self) -> f64 {
        if self.expenses.is_empty() {
            return self.limit;
        }
        let average = self.spent() / self.expenses.len() as f64;
        round_cents(self.limit - average)
    }

    pub fn is_overspent(&self) -> bool {
        self.remaining() < 0.0
    }

    pub fn to_record(&self) -> Map<String, Value> {
        let mut record = Map::new();
        record.insert("category".into(), Value::from(self.category.as_str()));
        record.insert("limit".into(), Value::from(self.limit));
        record.insert(
            "expenses".into(),
            Value::Array(
                self.expenses
                    .iter()
                    .map(|e| Value::Object(e.to_record()))
                    .collect(),
            ),
        );
        record
    }

    pub fn from_record(record: &Map<String, Value>) -> Result<Self, RecordError> {
        let category = match record.get("category") {
            None | Some(Value::Null) => DEFAULT_CATEGORY.to_string(),
            Some(Value::String(s)) => s.clone(),
            Some(_) => {
                return Err(RecordError::InvalidField {
                    field: "category",
                    expected: "a string",
                })
            }
        };
        let limit = match record.get("limit") {
            None | Some(Value::Null) => 0.0,
            Some(Value::Number(n)) => n.as_f64().ok_or(RecordError::InvalidField {
                field: "limit",
                expected: "a number",
            })?,
            Some(_) => {
                return Err(RecordError::InvalidField {
                    field: "limit",
                    expected: "a number",
                })
            }
        };

        let mut budget = Self::new(category, limit);
        match record.get("expenses") {
            None | Some(Value::Null) => {}
            Some(Value::Array(values)) => budget.extend_records(values)?,
            Some(other) => {
                tracing::warn!("budget expenses stored as {}", json_kind(other));
                return Err(RecordError::InvalidField {
                    field: "expenses",
                    expected: "an array",
                });
            }
        }
        Ok(budget)
    }
}

/// Values at or past this magnitude have no fractional part to round.
const EXACT_INTEGER_LIMIT: f64 = 4_503_599_627_370_496.0; // 2^52

/// Round to two decimals, exact halves to even.
fn round_cents(value: f64) -> f64 {
    let scaled = value * 100.0;
    if !scaled.is_finite() || value.abs() >= EXACT_INTEGER_LIMIT {
        return value;
    }
    scaled.round_ties_even() / 100.0
}
