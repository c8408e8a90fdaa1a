use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Contribution;
use crate::types::{lenient_amount, Money};

/// Income source tag, used as the key when income is broken down by source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncomeSource {
    Salary,
    Dividend,
    Interest,
    Rental,
    InsurancePayout,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IncomeItem {
    Salary {
        #[serde(default)]
        employer: String,
        #[serde(default, deserialize_with = "lenient_amount")]
        gross: Money,
        /// PAYG amount withheld by the employer.
        #[serde(default, deserialize_with = "lenient_amount")]
        tax_withheld: Money,
        #[serde(default)]
        date: Option<NaiveDate>,
    },
    Dividend {
        #[serde(default)]
        company: String,
        #[serde(default, deserialize_with = "lenient_amount")]
        amount: Money,
        #[serde(default)]
        date: Option<NaiveDate>,
    },
    Interest {
        #[serde(default)]
        institution: String,
        #[serde(default, deserialize_with = "lenient_amount")]
        amount: Money,
        #[serde(default)]
        date: Option<NaiveDate>,
    },
    Rental {
        #[serde(default)]
        property: String,
        #[serde(default, deserialize_with = "lenient_amount")]
        gross_rent: Money,
        #[serde(default)]
        date: Option<NaiveDate>,
    },
    InsurancePayout {
        #[serde(default)]
        insurer: String,
        #[serde(default, deserialize_with = "lenient_amount")]
        amount: Money,
        #[serde(default)]
        date: Option<NaiveDate>,
    },
    Other {
        #[serde(default)]
        description: String,
        #[serde(default, deserialize_with = "lenient_amount")]
        amount: Money,
        #[serde(default)]
        date: Option<NaiveDate>,
    },
}

impl IncomeItem {
    pub fn source(&self) -> IncomeSource {
        match self {
            IncomeItem::Salary { .. } => IncomeSource::Salary,
            IncomeItem::Dividend { .. } => IncomeSource::Dividend,
            IncomeItem::Interest { .. } => IncomeSource::Interest,
            IncomeItem::Rental { .. } => IncomeSource::Rental,
            IncomeItem::InsurancePayout { .. } => IncomeSource::InsurancePayout,
            IncomeItem::Other { .. } => IncomeSource::Other,
        }
    }

    /// Tax already withheld at source. Only salary carries withholding.
    pub fn tax_withheld(&self) -> Money {
        match self {
            IncomeItem::Salary { tax_withheld, .. } => *tax_withheld,
            _ => Decimal::ZERO,
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            IncomeItem::Salary { date, .. }
            | IncomeItem::Dividend { date, .. }
            | IncomeItem::Interest { date, .. }
            | IncomeItem::Rental { date, .. }
            | IncomeItem::InsurancePayout { date, .. }
            | IncomeItem::Other { date, .. } => *date,
        }
    }
}

impl Contribution for IncomeItem {
    fn amount(&self) -> Money {
        match self {
            IncomeItem::Salary { gross, .. } => *gross,
            IncomeItem::Rental { gross_rent, .. } => *gross_rent,
            IncomeItem::Dividend { amount, .. }
            | IncomeItem::Interest { amount, .. }
            | IncomeItem::InsurancePayout { amount, .. }
            | IncomeItem::Other { amount, .. } => *amount,
        }
    }
}
