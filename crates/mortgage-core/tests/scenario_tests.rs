use chrono::NaiveDate;
use mortgage_core::scenarios::{analyze_scenarios, compare_scenarios, ScenarioConfig, ScenarioInput};
use mortgage_core::{amortize, LoanInput, PaymentFrequency};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn sample_loan() -> LoanInput {
    LoanInput {
        loan_amount: dec!(300_000),
        home_value: dec!(360_000),
        down_payment: dec!(60_000),
        interest_rate: dec!(0.035),
        loan_term_years: 30,
        payment_frequency: PaymentFrequency::Monthly,
        extra_payment: Decimal::ZERO,
        extra_payment_starts_now: false,
        one_time_payment: None,
        purchase_date: NaiveDate::from_ymd_opt(2021, 9, 1).unwrap(),
        current_age: Some(40),
        pmi_rate: dec!(0.005),
        as_of_date: None,
    }
}

#[test]
fn test_scenarios_agree_with_single_runs() {
    let amounts = [dec!(100), dec!(250)];
    let comparisons =
        compare_scenarios(&sample_loan(), &amounts, &ScenarioConfig::default()).unwrap();
    let baseline = amortize(&sample_loan()).unwrap();

    for (comparison, amount) in comparisons.iter().zip(amounts) {
        let single = amortize(&sample_loan().with_extra_payment(amount)).unwrap();
        assert_eq!(comparison.payoff_months, single.payoff_months);
        assert_eq!(comparison.total_interest, single.total_interest);
        assert_eq!(comparison.payoff_date, single.payoff_date);
        assert_eq!(
            comparison.months_saved,
            baseline.payoff_months - single.payoff_months
        );
        assert_eq!(
            comparison.interest_saved,
            baseline.total_interest - single.total_interest
        );
        assert!(comparison.converged);
    }
}

#[test]
fn test_biweekly_sweep() {
    let mut loan = sample_loan();
    loan.payment_frequency = PaymentFrequency::Biweekly;
    let out = compare_scenarios(&loan, &[Decimal::ZERO, dec!(100)], &ScenarioConfig::default())
        .unwrap();
    assert_eq!(out[0].months_saved, 0);
    assert!(out[1].months_saved > 0);
    assert!(out[1].interest_saved > Decimal::ZERO);
}

#[test]
fn test_custom_defaults_from_config() {
    let config: ScenarioConfig =
        serde_json::from_str(r#"{"default_amounts": ["25", "75"], "max_scenarios": 5}"#).unwrap();
    let out = compare_scenarios(&sample_loan(), &[], &config).unwrap();
    assert_eq!(out.len(), 2);
    assert_eq!(out[0].extra_payment, dec!(25));
    assert_eq!(out[1].extra_payment, dec!(75));
}

#[test]
fn test_invalid_loan_rejected_before_sweep() {
    let mut loan = sample_loan();
    loan.loan_amount = dec!(400_000);
    assert!(compare_scenarios(&loan, &[dec!(100)], &ScenarioConfig::default()).is_err());
}

#[test]
fn test_scenario_input_from_json() {
    let json = r#"{
        "loan": {
            "loan_amount": "200000",
            "home_value": "250000",
            "down_payment": "50000",
            "interest_rate": "0.04",
            "loan_term_years": 20,
            "purchase_date": "2024-02-01"
        },
        "extra_payment_amounts": ["100", "0"]
    }"#;
    let input: ScenarioInput = serde_json::from_str(json).unwrap();
    let out = analyze_scenarios(&input, &ScenarioConfig::default()).unwrap();
    assert_eq!(out.result.len(), 2);
    assert!(out.result[0].months_saved > 0);
    assert_eq!(out.result[1].months_saved, 0);
}
