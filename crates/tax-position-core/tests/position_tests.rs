use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tax_position_core::brackets::{BracketFormula, TaxBracket, TaxBracketSchedule};
use tax_position_core::position::tax_position::{self, PositionInput};
use tax_position_core::records::{DeductionItem, ExpenseCategory, IncomeItem, IncomeSource};
use tax_position_core::settings::{TaxPeriod, TaxSettings};
use tax_position_core::TaxEngineError;

// ===========================================================================
// Fixtures
// ===========================================================================

fn sample_input_json() -> &'static str {
    r#"{
        "period": "2024-2025",
        "profile_id": "alex",
        "settings": {
            "period": "2024-2025",
            "tax_brackets": [
                {"min_income": 0, "max_income": 18200, "rate": "0", "base_tax": "0"},
                {"min_income": 18201, "max_income": 45000, "rate": "16", "base_tax": "0"},
                {"min_income": 45001, "max_income": 135000, "rate": "30", "base_tax": "4288"},
                {"min_income": 135001, "max_income": 190000, "rate": "37", "base_tax": "31288"},
                {"min_income": 190001, "max_income": null, "rate": "45", "base_tax": "51638"}
            ],
            "wfh_fixed_rate": "0.70"
        },
        "income": [
            {"kind": "salary", "employer": "Acme", "gross": "82000", "tax_withheld": "16000"},
            {"kind": "dividend", "company": "BHP", "amount": "1500.50"},
            {"kind": "interest", "institution": "Bank", "amount": "240.25"},
            {"kind": "rental", "property": "Unit 4", "gross_rent": "18000"},
            {"kind": "insurance_payout", "insurer": "Income Protect", "amount": "not entered"},
            {"kind": "other", "description": "Side gig", "amount": 759.25}
        ],
        "deductions": [
            {"kind": "property_expense", "property": "Unit 4", "description": "Council rates", "amount": "2100"},
            {"kind": "property_expense", "property": "Unit 4", "description": "New deck", "amount": "9000", "is_capital_improvement": true},
            {"kind": "work_expense", "category": "work_clothing", "amount": "400"},
            {"kind": "work_expense", "category": "union_fees", "amount": "500"},
            {"kind": "work_expense", "category": "travel"}
        ]
    }"#
}

fn simple_settings() -> TaxSettings {
    let schedule = TaxBracketSchedule::new(vec![
        TaxBracket {
            min_income: 0,
            max_income: Some(18_200),
            rate: dec!(0),
            base_tax: dec!(0),
        },
        TaxBracket {
            min_income: 18_201,
            max_income: None,
            rate: dec!(19),
            base_tax: dec!(0),
        },
    ])
    .unwrap();
    TaxSettings::new(TaxPeriod::new(2024), schedule)
}

fn other_income(amount: Decimal) -> IncomeItem {
    IncomeItem::Other {
        description: "income".into(),
        amount,
        date: None,
    }
}

fn other_deduction(amount: Decimal) -> DeductionItem {
    DeductionItem::WorkExpense {
        category: ExpenseCategory::Other,
        description: "deduction".into(),
        amount,
        date: None,
    }
}

// ===========================================================================
// Scenarios
// ===========================================================================

#[test]
fn test_full_position_from_json_records() {
    let input: PositionInput = serde_json::from_str(sample_input_json()).unwrap();
    let out = tax_position::compute_position(&input).unwrap();
    let pos = &out.result;

    // 82000 + 1500.50 + 240.25 + 18000 + 0 + 759.25
    assert_eq!(pos.total_income, dec!(102_500));
    assert_eq!(pos.income_by_source[&IncomeSource::InsurancePayout], Decimal::ZERO);
    // 2100 + 400 + 500 + 0; the capital improvement is excluded
    assert_eq!(pos.total_deductions, dec!(3_000));
    assert_eq!(pos.deduction_count, 4);
    assert_eq!(pos.taxable_income, dec!(99_500));
    // 4288 + (99500 - 45001 + 1) * 30% = 4288 + 16350 = 20638
    assert_eq!(pos.tax_payable, dec!(20_638));
    assert_eq!(pos.tax_withheld, dec!(16_000));
    assert_eq!(pos.estimated_refund, dec!(-4_638));
    assert_eq!(pos.marginal_rate_pct, dec!(30));
    assert_eq!(pos.profile_id.as_deref(), Some("alex"));
    assert_eq!(pos.grey_area_count, 1);
    assert_eq!(pos.grey_area_total, dec!(400));
}

#[test]
fn test_boundary_scenario_matches_formula() {
    let settings = simple_settings();
    for (income, expected) in [(dec!(18_200), dec!(0)), (dec!(18_201), dec!(0.19))] {
        let input = PositionInput {
            period: TaxPeriod::new(2024),
            profile_id: None,
            settings: Some(settings.clone()),
            income: vec![other_income(income)],
            deductions: vec![],
        };
        let out = tax_position::compute_position(&input).unwrap();
        assert_eq!(out.result.tax_payable, expected, "income {income}");
    }
}

#[test]
fn test_not_ready_is_distinct_from_zero_tax() {
    let mut input: PositionInput = serde_json::from_str(sample_input_json()).unwrap();
    input.settings = None;
    input.income.clear();
    input.deductions.clear();
    let err = tax_position::compute_position(&input).unwrap_err();
    assert!(matches!(err, TaxEngineError::SettingsNotLoaded { .. }));
}

#[test]
fn test_malformed_schedule_in_settings_is_rejected_at_load() {
    let json = r#"{
        "period": "2024-2025",
        "settings": {
            "period": "2024-2025",
            "tax_brackets": [{"min_income": 0, "max_income": 18200, "rate": "0", "base_tax": "0"}]
        }
    }"#;
    let parsed: Result<PositionInput, _> = serde_json::from_str(json);
    assert!(parsed.is_err());
}

#[test]
fn test_corrected_formula_through_settings() {
    let mut settings = simple_settings();
    settings.bracket_formula = BracketFormula::Marginal;
    let input = PositionInput {
        period: TaxPeriod::new(2024),
        profile_id: None,
        settings: Some(settings),
        income: vec![other_income(dec!(18_300))],
        deductions: vec![],
    };
    let out = tax_position::compute_position(&input).unwrap();
    assert_eq!(out.result.tax_payable, dec!(18.81));
}

#[test]
fn test_amounts_beyond_decimal_range_are_rejected_not_fatal() {
    let json = r#"{
        "period": "2024-2025",
        "settings": {
            "period": "2024-2025",
            "tax_brackets": [{"min_income": 0, "max_income": null, "rate": "10", "base_tax": "0"}]
        },
        "income": [
            {"kind": "other", "amount": "79228162514264337593543950335"},
            {"kind": "other", "amount": "79228162514264337593543950335"}
        ],
        "deductions": [
            {"kind": "work_expense", "category": "travel", "amount": "79228162514264337593543950335"},
            {"kind": "work_expense", "category": "travel", "amount": "79228162514264337593543950335"}
        ]
    }"#;
    let input: PositionInput = serde_json::from_str(json).unwrap();
    let err = tax_position::compute_position(&input).unwrap_err();
    match err {
        TaxEngineError::InvalidInput { field, .. } => assert_eq!(field, "income"),
        other => panic!("unexpected error: {other}"),
    }
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #[test]
    fn prop_taxable_income_is_floored_difference(
        income_cents in 0i64..50_000_000,
        deduction_cents in 0i64..50_000_000,
    ) {
        let income = Decimal::new(income_cents, 2);
        let deductions = Decimal::new(deduction_cents, 2);
        let input = PositionInput {
            period: TaxPeriod::new(2024),
            profile_id: None,
            settings: Some(simple_settings()),
            income: vec![other_income(income)],
            deductions: vec![other_deduction(deductions)],
        };
        let pos = tax_position::compute_position(&input).unwrap().result;
        prop_assert_eq!(pos.taxable_income, (income - deductions).max(Decimal::ZERO));
        prop_assert!(pos.taxable_income >= Decimal::ZERO);
        prop_assert!(pos.tax_payable >= Decimal::ZERO);
    }

    #[test]
    fn prop_deduction_count_counts_every_record(amounts in proptest::collection::vec(0i64..10_000, 0..20)) {
        let deductions: Vec<DeductionItem> = amounts
            .iter()
            .map(|a| other_deduction(Decimal::from(*a)))
            .collect();
        let totals = tax_position::aggregate_deductions(&deductions).unwrap();
        prop_assert_eq!(totals.count as usize, amounts.len());
        prop_assert_eq!(totals.total, Decimal::from(amounts.iter().sum::<i64>()));
    }
}
