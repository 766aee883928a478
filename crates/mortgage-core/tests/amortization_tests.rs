use chrono::NaiveDate;
use mortgage_core::balance;
use mortgage_core::{amortize, calculate_mortgage, generate_schedule, MortgageError};
use mortgage_core::{LoanInput, OneTimePayment, PaymentFrequency};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Fixtures
// ===========================================================================

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn sample_loan() -> LoanInput {
    // 300k over 30 years at 3.5% with 25% down
    LoanInput {
        loan_amount: dec!(300_000),
        home_value: dec!(400_000),
        down_payment: dec!(100_000),
        interest_rate: dec!(0.035),
        loan_term_years: 30,
        payment_frequency: PaymentFrequency::Monthly,
        extra_payment: Decimal::ZERO,
        extra_payment_starts_now: false,
        one_time_payment: None,
        purchase_date: date(2022, 3, 1),
        current_age: Some(32),
        pmi_rate: Decimal::ZERO,
        as_of_date: None,
    }
}

fn high_ltv_loan() -> LoanInput {
    // LTV 300k / 360k ≈ 83%
    LoanInput {
        home_value: dec!(360_000),
        down_payment: dec!(60_000),
        pmi_rate: dec!(0.006),
        ..sample_loan()
    }
}

// ===========================================================================
// Schedule shape
// ===========================================================================

#[test]
fn test_period_count_matches_term_for_each_supported_term() {
    for term in [10u32, 15, 20, 25, 30, 40] {
        let mut input = sample_loan();
        input.loan_term_years = term;
        let out = amortize(&input).unwrap();
        assert_eq!(out.schedule.len() as u32, term * 12, "term {term}");
        assert_eq!(out.schedule.last().unwrap().balance, Decimal::ZERO);
    }
}

#[test]
fn test_periods_are_sequential() {
    let out = amortize(&sample_loan()).unwrap();
    for (i, entry) in out.schedule.iter().enumerate() {
        assert_eq!(entry.period, i as u32 + 1);
        assert_eq!(entry.month, entry.period);
    }
}

#[test]
fn test_identities_hold_with_every_prepayment_kind() {
    let mut input = high_ltv_loan();
    input.extra_payment = dec!(150);
    input.one_time_payment = Some(OneTimePayment {
        amount: dec!(15_000),
        date: date(2025, 6, 1),
    });
    let out = amortize(&input).unwrap();

    assert_eq!(out.total_payment, out.total_principal + out.total_interest);
    let principal_sum: Decimal = out.schedule.iter().map(|e| e.principal).sum();
    assert!((principal_sum - input.loan_amount).abs() < dec!(0.000001));
    assert_eq!(out.schedule.last().unwrap().balance, Decimal::ZERO);
    for pair in out.schedule.windows(2) {
        assert!(pair[1].balance <= pair[0].balance);
    }
}

// ===========================================================================
// Known values
// ===========================================================================

#[test]
fn test_thirty_year_reference_loan() {
    let out = amortize(&sample_loan()).unwrap();
    assert!((out.monthly_payment - dec!(1347.13)).abs() < dec!(0.01));
    // 360 * 1347.1337 - 300,000
    assert!((out.total_interest - dec!(184_968)).abs() < dec!(5));
    assert_eq!(out.months_saved, 0);
    assert!(out.interest_saved.is_zero());
}

#[test]
fn test_extra_200_beats_baseline() {
    let baseline = amortize(&sample_loan()).unwrap();
    let mut input = sample_loan();
    input.extra_payment = dec!(200);
    let out = amortize(&input).unwrap();

    assert!(out.payoff_months < baseline.payoff_months);
    assert!(out.total_interest < baseline.total_interest);
    assert_eq!(out.standard_total_interest, baseline.total_interest);
    assert_eq!(out.months_saved, baseline.payoff_months - out.payoff_months);
}

#[test]
fn test_more_extra_never_slower() {
    let mut previous: Option<(u32, Decimal)> = None;
    for extra in [dec!(0), dec!(25), dec!(100), dec!(400), dec!(1_000)] {
        let mut input = sample_loan();
        input.extra_payment = extra;
        let out = amortize(&input).unwrap();
        if let Some((months, interest)) = previous {
            assert!(out.payoff_months <= months, "extra {extra}");
            assert!(out.total_interest < interest, "extra {extra}");
        }
        previous = Some((out.payoff_months, out.total_interest));
    }
}

// ===========================================================================
// PMI
// ===========================================================================

#[test]
fn test_pmi_stops_once_ltv_reaches_threshold() {
    let out = amortize(&high_ltv_loan()).unwrap();
    let home_value = dec!(360_000);

    assert!(out.schedule[0].pmi > Decimal::ZERO);
    let first_free = out
        .schedule
        .iter()
        .position(|e| e.pmi.is_zero())
        .expect("PMI should stop before payoff");
    assert!(out.schedule[first_free..].iter().all(|e| e.pmi.is_zero()));

    // Start-of-period balance for the first PMI-free period is at or below 80%.
    let opening = out.schedule[first_free - 1].balance;
    assert!(opening / home_value <= dec!(0.8));
    let prior_opening = if first_free >= 2 {
        out.schedule[first_free - 2].balance
    } else {
        dec!(300_000)
    };
    assert!(prior_opening / home_value > dec!(0.8));
    assert_eq!(out.pmi_months as usize, first_free);
}

#[test]
fn test_no_pmi_without_rate() {
    let mut input = high_ltv_loan();
    input.pmi_rate = Decimal::ZERO;
    let out = amortize(&input).unwrap();
    assert!(out.total_pmi.is_zero());
    assert!(out.schedule.iter().all(|e| e.pmi.is_zero()));
}

// ===========================================================================
// Biweekly
// ===========================================================================

#[test]
fn test_biweekly_display_months_never_decrease() {
    let mut input = sample_loan();
    input.payment_frequency = PaymentFrequency::Biweekly;
    let out = amortize(&input).unwrap();

    assert!(out.payoff_months < 360);
    assert!(out.interest_saved.is_zero());
    for pair in out.schedule.windows(2) {
        assert!(pair[1].month >= pair[0].month);
    }
    assert!((out.periodic_payment * dec!(2) - out.monthly_payment).abs() < dec!(0.000001));
}

// ===========================================================================
// Loans already in progress
// ===========================================================================

#[test]
fn test_current_balance_for_seasoned_loan() {
    let mut input = sample_loan();
    input.as_of_date = Some(date(2024, 3, 1));
    input.extra_payment = dec!(300);
    input.extra_payment_starts_now = true;

    let out = amortize(&input).unwrap();
    assert_eq!(out.elapsed_periods, 24);

    let current = out.current_balance.expect("purchase date is in the past");
    // Extra payments are prospective, so the first 24 periods match the plain
    // loan and today's balance is exactly the 24th scheduled balance.
    assert_eq!(current, out.schedule[23].balance);
    assert_eq!(
        balance::estimate_current_balance(&input).unwrap(),
        Some(current)
    );
}

#[test]
fn test_age_at_payoff_counts_from_today() {
    let mut input = sample_loan();
    input.as_of_date = Some(date(2027, 3, 1));
    let out = amortize(&input).unwrap();
    // 360 months total, 60 already gone: 25 years to go.
    assert_eq!(out.age_at_payoff, Some(dec!(57)));
}

#[test]
fn test_age_at_payoff_before_today_when_prepaid_from_purchase() {
    let mut input = sample_loan();
    input.current_age = Some(40);
    input.extra_payment = dec!(50_000);
    input.as_of_date = Some(date(2025, 3, 1));

    let out = amortize(&input).unwrap();
    assert!(out.payoff_months < 36);
    // Paid off in the simulation before today, yet today's balance follows
    // the base payments alone.
    assert!(out.age_at_payoff.unwrap() < dec!(40));
    assert!(out.current_balance.unwrap() > dec!(200_000));
}

// ===========================================================================
// Purity and serialisation
// ===========================================================================

#[test]
fn test_repeated_evaluation_is_identical() {
    let mut input = high_ltv_loan();
    input.extra_payment = dec!(75);
    let first = amortize(&input).unwrap();
    let second = amortize(&input).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        generate_schedule(&input).unwrap().entries,
        first.schedule
    );
}

#[test]
fn test_output_serialises_to_json() {
    let result = calculate_mortgage(&sample_loan()).unwrap();
    let json = serde_json::to_value(&result).unwrap();
    assert!(json["result"]["schedule"].is_array());
    assert_eq!(json["result"]["payoff_months"], 360);
    assert_eq!(json["result"]["payoff_date"], "2052-03-01");
    assert!(json["result"].get("current_balance").is_none());
}

#[test]
fn test_input_parses_from_json() {
    let json = r#"{
        "loan_amount": "250000",
        "home_value": "320000",
        "down_payment": "64000",
        "interest_rate": "0.05",
        "loan_term_years": 15,
        "payment_frequency": "biweekly",
        "purchase_date": "2023-05-20",
        "one_time_payment": { "amount": "5000", "date": "2024-05-20" }
    }"#;
    let input: LoanInput = serde_json::from_str(json).unwrap();
    assert_eq!(input.payment_frequency, PaymentFrequency::Biweekly);
    assert!(input.extra_payment.is_zero());
    assert!(!input.extra_payment_starts_now);
    assert!(amortize(&input).unwrap().converged);
}

// ===========================================================================
// Validation
// ===========================================================================

#[test]
fn test_huge_loan_is_rejected_not_overflowed() {
    let mut input = sample_loan();
    input.loan_amount = dec!(100_000_000_000_000_000_000_000_000);
    input.home_value = dec!(200_000_000_000_000_000_000_000_000);
    input.down_payment = Decimal::ZERO;
    input.interest_rate = dec!(0.30);
    input.loan_term_years = 40;

    let err = amortize(&input).unwrap_err();
    assert!(matches!(err, MortgageError::InvalidInput { .. }));
    assert!(calculate_mortgage(&input).is_err());
    assert!(generate_schedule(&input).is_err());
}

#[test]
fn test_validation_errors_name_the_field() {
    let cases: Vec<(&str, Box<dyn Fn(&mut LoanInput)>)> = vec![
        ("home_value", Box::new(|i: &mut LoanInput| i.home_value = Decimal::ZERO)),
        ("down_payment", Box::new(|i: &mut LoanInput| i.down_payment = dec!(500_000))),
        ("loan_amount", Box::new(|i: &mut LoanInput| i.loan_amount = dec!(350_000))),
        ("interest_rate", Box::new(|i: &mut LoanInput| i.interest_rate = dec!(-0.01))),
        ("loan_term_years", Box::new(|i: &mut LoanInput| i.loan_term_years = 0)),
        ("pmi_rate", Box::new(|i: &mut LoanInput| i.pmi_rate = dec!(0.5))),
        ("current_age", Box::new(|i: &mut LoanInput| i.current_age = Some(0))),
        (
            "one_time_payment.amount",
            Box::new(|i: &mut LoanInput| {
                i.one_time_payment = Some(OneTimePayment {
                    amount: Decimal::ZERO,
                    date: date(2023, 1, 1),
                })
            }),
        ),
        (
            // matures 2052-03-01
            "one_time_payment.date",
            Box::new(|i: &mut LoanInput| {
                i.one_time_payment = Some(OneTimePayment {
                    amount: dec!(10_000),
                    date: date(2052, 3, 2),
                })
            }),
        ),
    ];

    for (field, mutate) in cases {
        let mut input = sample_loan();
        mutate(&mut input);
        match amortize(&input) {
            Err(MortgageError::InvalidInput { field: f, .. }) => assert_eq!(f, field),
            other => panic!("expected InvalidInput for {field}, got {other:?}"),
        }
    }
}
