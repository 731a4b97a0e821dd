use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use tracing::debug;

use super::error::EntitlementError;
use super::rates::{AgeBand, RateSchedule};
use super::types::{Arrangement, Circumstances, Dependent, EntitlementBreakdown};

pub const MIN_CLAIMANT_AGE: u32 = 16;
pub const MAX_DEPENDENT_AGE: u32 = 20;

/// Upper bound on any single monthly money input or schedule amount.
/// Keeps every sum and product the engine forms inside `Decimal` range.
pub const MAX_MONEY_AMOUNT: Decimal = dec!(1000000000000);

/// Unrounded stage outputs. Rounding happens once, in [`compute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ElementTotals {
    pub(crate) standard_allowance: Decimal,
    pub(crate) housing: Decimal,
    pub(crate) child: Decimal,
    pub(crate) childcare: Decimal,
    pub(crate) disability: Decimal,
    pub(crate) carer: Decimal,
    pub(crate) work_allowance: Decimal,
    pub(crate) total_earnings: Decimal,
    pub(crate) earnings_deduction: Decimal,
}

impl ElementTotals {
    fn gross(&self) -> Decimal {
        self.standard_allowance
            + self.housing
            + self.child
            + self.childcare
            + self.disability
            + self.carer
    }

    fn total(&self) -> Decimal {
        (self.gross() - self.earnings_deduction).max(Decimal::ZERO)
    }
}

/// Computes the monthly entitlement for one set of circumstances.
///
/// Input is validated up front; once validation passes every stage is total
/// and the call always yields a complete breakdown. Monetary fields are rounded
/// to pennies with round-half-up at emission only.
pub fn compute(
    circumstances: &Circumstances,
    rates: &RateSchedule,
) -> Result<EntitlementBreakdown, EntitlementError> {
    validate(circumstances)?;
    rates
        .validate()
        .map_err(|e| EntitlementError::InvalidRateSchedule(e.to_string()))?;
    let totals = compute_elements(circumstances, rates);

    let breakdown = EntitlementBreakdown {
        standard_allowance: round_money(totals.standard_allowance),
        housing_element: round_money(totals.housing),
        child_element: round_money(totals.child),
        childcare_element: round_money(totals.childcare),
        disability_element: round_money(totals.disability),
        carer_element: round_money(totals.carer),
        gross_entitlement: round_money(totals.gross()),
        work_allowance: round_money(totals.work_allowance),
        total_earnings: round_money(totals.total_earnings),
        earnings_deduction: round_money(totals.earnings_deduction),
        total_entitlement: round_money(totals.total()),
    };

    debug!(
        policy_year = %rates.policy_year,
        arrangement = %circumstances.arrangement,
        dependents = circumstances.dependents.len(),
        gross = %breakdown.gross_entitlement,
        deduction = %breakdown.earnings_deduction,
        total = %breakdown.total_entitlement,
        "computed entitlement"
    );

    Ok(breakdown)
}

fn validate(circumstances: &Circumstances) -> Result<(), EntitlementError> {
    if circumstances.claimant_age < MIN_CLAIMANT_AGE {
        return Err(EntitlementError::AgeTooLow {
            field: "claimant age",
            min: MIN_CLAIMANT_AGE,
            found: circumstances.claimant_age,
        });
    }

    if circumstances.arrangement == Arrangement::Joint {
        let Some(partner_age) = circumstances.partner_age else {
            return Err(EntitlementError::MissingPartnerAge);
        };
        if partner_age < MIN_CLAIMANT_AGE {
            return Err(EntitlementError::AgeTooLow {
                field: "partner age",
                min: MIN_CLAIMANT_AGE,
                found: partner_age,
            });
        }
    }

    for (index, dependent) in circumstances.dependents.iter().enumerate() {
        if dependent.age > MAX_DEPENDENT_AGE {
            return Err(EntitlementError::DependentAge {
                index,
                max: MAX_DEPENDENT_AGE,
                found: dependent.age,
            });
        }
    }

    for (name, amount) in [
        ("claimant earnings", Some(circumstances.claimant_earnings)),
        ("partner earnings", Some(circumstances.partner_earnings)),
        ("monthly rent", Some(circumstances.monthly_rent)),
        ("rent cap", circumstances.rent_cap),
        ("childcare costs", Some(circumstances.childcare_costs)),
    ] {
        let Some(amount) = amount else { continue };
        if amount < Decimal::ZERO {
            return Err(EntitlementError::NegativeAmount(name));
        }
        if amount > MAX_MONEY_AMOUNT {
            return Err(EntitlementError::AmountTooLarge {
                field: name,
                max: MAX_MONEY_AMOUNT,
            });
        }
    }

    Ok(())
}

pub(crate) fn compute_elements(circumstances: &Circumstances, rates: &RateSchedule) -> ElementTotals {
    let dependents = &circumstances.dependents;
    let total_earnings = circumstances.combined_earnings();
    let work_allowance = work_allowance(circumstances, rates);

    ElementTotals {
        standard_allowance: standard_allowance(
            circumstances.arrangement,
            circumstances.claimant_age,
            circumstances.partner_age,
            rates,
        ),
        housing: housing_element(circumstances.monthly_rent, circumstances.rent_cap),
        child: child_element(dependents, rates),
        childcare: childcare_element(circumstances.childcare_costs, dependents.len(), rates),
        disability: flat_addition(circumstances.has_disability, rates.disability_element),
        carer: flat_addition(circumstances.is_carer, rates.carer_element),
        work_allowance,
        total_earnings,
        earnings_deduction: earnings_deduction(total_earnings, work_allowance, rates.earnings_taper),
    }
}

fn standard_allowance(
    arrangement: Arrangement,
    claimant_age: u32,
    partner_age: Option<u32>,
    rates: &RateSchedule,
) -> Decimal {
    let governing_age = match arrangement {
        Arrangement::Single => claimant_age,
        // Younger partner decides the band.
        Arrangement::Joint => partner_age.map_or(claimant_age, |p| p.min(claimant_age)),
    };
    rates.standard_allowance_for(arrangement, AgeBand::from_age(governing_age))
}

fn housing_element(monthly_rent: Decimal, rent_cap: Option<Decimal>) -> Decimal {
    match rent_cap {
        Some(cap) => monthly_rent.min(cap),
        None => monthly_rent,
    }
}

fn child_element(dependents: &[Dependent], rates: &RateSchedule) -> Decimal {
    dependents
        .iter()
        .enumerate()
        .map(|(idx, dependent)| {
            let base = if idx == 0 {
                rates.first_child_element
            } else {
                rates.additional_child_element
            };
            if dependent.is_disabled {
                base + rates.disabled_child_addition
            } else {
                base
            }
        })
        .sum()
}

fn childcare_element(costs: Decimal, dependents: usize, rates: &RateSchedule) -> Decimal {
    if costs <= Decimal::ZERO || dependents == 0 {
        return Decimal::ZERO;
    }
    costs.min(rates.childcare_cap(dependents)) * rates.childcare_percentage
}

fn flat_addition(applies: bool, amount: Decimal) -> Decimal {
    if applies { amount } else { Decimal::ZERO }
}

fn work_allowance(circumstances: &Circumstances, rates: &RateSchedule) -> Decimal {
    let qualifies = !circumstances.dependents.is_empty()
        || circumstances.has_disability
        || circumstances.is_carer;
    flat_addition(qualifies, rates.work_allowance)
}

fn earnings_deduction(total_earnings: Decimal, work_allowance: Decimal, taper: Decimal) -> Decimal {
    if total_earnings <= work_allowance {
        return Decimal::ZERO;
    }
    (total_earnings - work_allowance) * taper
}

fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
