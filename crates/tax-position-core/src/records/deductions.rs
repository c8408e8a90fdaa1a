use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Contribution;
use crate::types::{checked_add, lenient_amount, Money};
use crate::TaxEngineResult;

/// Closed set of work-related expense categories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseCategory {
    WorkClothing,
    ToolsEquipment,
    SelfEducation,
    HomeOffice,
    CarExpenses,
    Travel,
    ProfessionalSubscriptions,
    UnionFees,
    PhoneInternet,
    #[default]
    Other,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 10] = [
        ExpenseCategory::WorkClothing,
        ExpenseCategory::ToolsEquipment,
        ExpenseCategory::SelfEducation,
        ExpenseCategory::HomeOffice,
        ExpenseCategory::CarExpenses,
        ExpenseCategory::Travel,
        ExpenseCategory::ProfessionalSubscriptions,
        ExpenseCategory::UnionFees,
        ExpenseCategory::PhoneInternet,
        ExpenseCategory::Other,
    ];

    /// Categories that statistically attract scrutiny and need extra
    /// documentation.
    pub fn is_grey_area(self) -> bool {
        matches!(
            self,
            ExpenseCategory::WorkClothing
                | ExpenseCategory::SelfEducation
                | ExpenseCategory::HomeOffice
                | ExpenseCategory::CarExpenses
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            ExpenseCategory::WorkClothing => "Work clothing",
            ExpenseCategory::ToolsEquipment => "Tools & equipment",
            ExpenseCategory::SelfEducation => "Self-education",
            ExpenseCategory::HomeOffice => "Home office",
            ExpenseCategory::CarExpenses => "Car expenses",
            ExpenseCategory::Travel => "Travel",
            ExpenseCategory::ProfessionalSubscriptions => "Professional subscriptions",
            ExpenseCategory::UnionFees => "Union fees",
            ExpenseCategory::PhoneInternet => "Phone & internet",
            ExpenseCategory::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeductionItem {
    /// Rental property outgoing. Capital improvements are depreciated, not
    /// deducted, so they never contribute.
    PropertyExpense {
        #[serde(default)]
        property: String,
        #[serde(default)]
        description: String,
        #[serde(default, deserialize_with = "lenient_amount")]
        amount: Money,
        #[serde(default)]
        is_capital_improvement: bool,
        #[serde(default)]
        date: Option<NaiveDate>,
    },
    /// Work-related expense receipt.
    WorkExpense {
        #[serde(default)]
        category: ExpenseCategory,
        #[serde(default)]
        description: String,
        #[serde(default, deserialize_with = "lenient_amount")]
        amount: Money,
        #[serde(default)]
        date: Option<NaiveDate>,
    },
}

impl DeductionItem {
    pub fn category(&self) -> ExpenseCategory {
        match self {
            DeductionItem::PropertyExpense { .. } => ExpenseCategory::Other,
            DeductionItem::WorkExpense { category, .. } => *category,
        }
    }

    pub fn is_grey_area(&self) -> bool {
        self.category().is_grey_area()
    }

    /// Whether the record takes part in the deduction aggregate at all.
    pub fn is_deductible(&self) -> bool {
        !matches!(
            self,
            DeductionItem::PropertyExpense {
                is_capital_improvement: true,
                ..
            }
        )
    }

    pub fn is_work_related(&self) -> bool {
        matches!(self, DeductionItem::WorkExpense { .. })
    }

    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            DeductionItem::PropertyExpense { date, .. } | DeductionItem::WorkExpense { date, .. } => {
                *date
            }
        }
    }
}

impl Contribution for DeductionItem {
    fn amount(&self) -> Money {
        match self {
            DeductionItem::PropertyExpense {
                is_capital_improvement: true,
                ..
            } => Decimal::ZERO,
            DeductionItem::PropertyExpense { amount, .. } | DeductionItem::WorkExpense { amount, .. } => {
                *amount
            }
        }
    }
}

/// Sum work-related expense amounts per category.
///
/// Property expenses are not work claims and are left out; every work
/// expense category that appears gets an entry, even when its total is zero.
pub fn deductions_by_category(items: &[DeductionItem]) -> TaxEngineResult<BTreeMap<ExpenseCategory, Money>> {
    let mut totals = BTreeMap::new();
    for item in items.iter().filter(|i| i.is_work_related()) {
        let total = totals.entry(item.category()).or_insert(Decimal::ZERO);
        *total = checked_add(*total, item.amount(), "deductions")?;
    }
    Ok(totals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_grey_area_categories() {
        let grey: Vec<ExpenseCategory> = ExpenseCategory::ALL
            .iter()
            .copied()
            .filter(|c| c.is_grey_area())
            .collect();
        assert_eq!(
            grey,
            vec![
                ExpenseCategory::WorkClothing,
                ExpenseCategory::SelfEducation,
                ExpenseCategory::HomeOffice,
                ExpenseCategory::CarExpenses,
            ]
        );
    }

    #[test]
    fn test_work_expense_from_json() {
        let item: DeductionItem = serde_json::from_str(
            r#"{"kind": "work_expense", "category": "self_education",
                "description": "Course fees", "amount": "1,250.00"}"#,
        )
        .unwrap();
        assert_eq!(item.category(), ExpenseCategory::SelfEducation);
        assert!(item.is_grey_area());
        assert!(item.is_work_related());
        assert_eq!(item.amount(), dec!(1250.00));
    }

    #[test]
    fn test_capital_improvement_is_excluded() {
        let item: DeductionItem = serde_json::from_str(
            r#"{"kind": "property_expense", "description": "New kitchen",
                "amount": "15000", "is_capital_improvement": true}"#,
        )
        .unwrap();
        assert!(!item.is_deductible());
        assert_eq!(item.amount(), Decimal::ZERO);
        assert_eq!(item.category(), ExpenseCategory::Other);
        assert!(!item.is_grey_area());
    }

    #[test]
    fn test_deductions_by_category_sums_work_expenses_only() {
        let items: Vec<DeductionItem> = serde_json::from_str(
            r#"[
                {"kind": "work_expense", "category": "travel", "amount": "100"},
                {"kind": "work_expense", "category": "travel", "amount": "50.50"},
                {"kind": "work_expense", "category": "union_fees", "amount": ""},
                {"kind": "property_expense", "amount": "900"}
            ]"#,
        )
        .unwrap();
        let totals = deductions_by_category(&items).unwrap();
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[&ExpenseCategory::Travel], dec!(150.50));
        assert_eq!(totals[&ExpenseCategory::UnionFees], Decimal::ZERO);
        assert!(!totals.contains_key(&ExpenseCategory::Other));
    }

    #[test]
    fn test_missing_category_defaults_to_other() {
        let item: DeductionItem =
            serde_json::from_str(r#"{"kind": "work_expense", "amount": 10}"#).unwrap();
        assert_eq!(item.category(), ExpenseCategory::Other);
    }
}
