//! Expense records handed to the expense-creation collaborator.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::receipt::rules::FormattedAmount;

/// Spending category, as offered by the expense form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ExpenseCategory {
    Grocery,
    #[serde(rename = "Eating Out")]
    EatingOut,
    Entertainment,
    Transportation,
    #[serde(rename = "Electric & Hydro")]
    ElectricAndHydro,
    Gas,
    Communications,
    Shopping,
    Medical,
    #[default]
    Other,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 10] = [
        Self::Grocery,
        Self::EatingOut,
        Self::Entertainment,
        Self::Transportation,
        Self::ElectricAndHydro,
        Self::Gas,
        Self::Communications,
        Self::Shopping,
        Self::Medical,
        Self::Other,
    ];

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Grocery => "Grocery",
            Self::EatingOut => "Eating Out",
            Self::Entertainment => "Entertainment",
            Self::Transportation => "Transportation",
            Self::ElectricAndHydro => "Electric & Hydro",
            Self::Gas => "Gas",
            Self::Communications => "Communications",
            Self::Shopping => "Shopping",
            Self::Medical => "Medical",
            Self::Other => "Other",
        }
    }

    /// Parse a category label, ignoring case and surrounding whitespace.
    pub fn from_label(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A confirmed receipt total plus the details the user adds before saving.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseDraft {
    /// Amount, always two decimal places.
    pub amount: FormattedAmount,

    /// Spending category.
    pub category: ExpenseCategory,

    /// Date of the expense.
    pub date: NaiveDate,

    /// Free-form memo.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ExpenseDraft {
    pub fn new(amount: FormattedAmount, date: NaiveDate) -> Self {
        Self {
            amount,
            category: ExpenseCategory::default(),
            date,
            description: None,
        }
    }

    pub fn with_category(mut self, category: ExpenseCategory) -> Self {
        self.category = category;
        self
    }

    /// Set the memo. Blank input clears it.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        let description = description.into();
        self.description = if description.trim().is_empty() {
            None
        } else {
            Some(description)
        };
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_labels() {
        assert_eq!(ExpenseCategory::from_label("eating out"), Some(ExpenseCategory::EatingOut));
        assert_eq!(
            ExpenseCategory::from_label(" Electric & Hydro "),
            Some(ExpenseCategory::ElectricAndHydro)
        );
        assert_eq!(ExpenseCategory::from_label("Travel"), None);
        for category in ExpenseCategory::ALL {
            assert_eq!(ExpenseCategory::from_label(category.label()), Some(category));
        }
    }

    #[test]
    fn test_draft_json() {
        let draft = ExpenseDraft::new(
            "42".parse().unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
        )
        .with_category(ExpenseCategory::EatingOut)
        .with_description("  ");

        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "amount": "42.00",
                "category": "Eating Out",
                "date": "2024-03-09"
            })
        );
    }
}
