//! Policy-year rate schedules.
//!
//! A [`RateSchedule`] holds every monetary constant and percentage the engine
//! needs for one regulatory year. Schedules are plain values: load one per
//! process (or several, for recalculating historical scenarios) and share it by
//! reference.

use std::path::Path;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use thiserror::Error;

use super::engine::MAX_MONEY_AMOUNT;
use super::types::Arrangement;

/// Age at which the higher standard allowance band starts.
pub const UPPER_BAND_AGE: u32 = 25;

#[derive(Debug, Error)]
pub enum RateScheduleError {
    #[error("failed to read rate schedule: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to parse rate schedule TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("rate schedule field {0} must be >= 0")]
    NegativeAmount(&'static str),

    #[error("rate schedule field {0} must be at most {max}", max = MAX_MONEY_AMOUNT)]
    AmountTooLarge(&'static str),

    #[error("rate schedule field {0} must be between 0 and 1")]
    PercentageOutOfRange(&'static str),

    #[error("childcare_cap_one_child cannot exceed childcare_cap_two_plus")]
    ChildcareCapOrder,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum AgeBand {
    Under25,
    TwentyFiveAndOver,
}

impl AgeBand {
    pub fn from_age(age: u32) -> Self {
        if age < UPPER_BAND_AGE {
            AgeBand::Under25
        } else {
            AgeBand::TwentyFiveAndOver
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StandardAllowance {
    pub single_under_25: Decimal,
    pub single_25_plus: Decimal,
    pub joint_under_25: Decimal,
    pub joint_25_plus: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RateSchedule {
    pub policy_year: String,
    pub standard_allowance: StandardAllowance,
    pub first_child_element: Decimal,
    pub additional_child_element: Decimal,
    pub disabled_child_addition: Decimal,
    pub childcare_percentage: Decimal,
    pub childcare_cap_one_child: Decimal,
    pub childcare_cap_two_plus: Decimal,
    pub earnings_taper: Decimal,
    pub work_allowance: Decimal,
    pub disability_element: Decimal,
    pub carer_element: Decimal,
}

impl RateSchedule {
    /// Monthly rates in force from April 2026.
    pub fn uc_2026_27() -> Self {
        Self {
            policy_year: "2026-27".to_string(),
            standard_allowance: StandardAllowance {
                single_under_25: dec!(338.58),
                single_25_plus: dec!(424.90),
                joint_under_25: dec!(528.34),
                joint_25_plus: dec!(666.97),
            },
            first_child_element: dec!(284.89),
            additional_child_element: dec!(237.05),
            // Not yet published for 2026-27; carried as an estimate.
            disabled_child_addition: dec!(137.45),
            childcare_percentage: dec!(0.85),
            childcare_cap_one_child: dec!(175.00),
            childcare_cap_two_plus: dec!(300.00),
            earnings_taper: dec!(0.55),
            work_allowance: dec!(290.00),
            disability_element: dec!(134.88),
            carer_element: dec!(163.44),
        }
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, RateScheduleError> {
        let schedule: RateSchedule = toml::from_str(raw)?;
        schedule.validate()?;
        Ok(schedule)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RateScheduleError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<(), RateScheduleError> {
        let sa = &self.standard_allowance;
        for (name, amount) in [
            ("standard_allowance.single_under_25", sa.single_under_25),
            ("standard_allowance.single_25_plus", sa.single_25_plus),
            ("standard_allowance.joint_under_25", sa.joint_under_25),
            ("standard_allowance.joint_25_plus", sa.joint_25_plus),
            ("first_child_element", self.first_child_element),
            ("additional_child_element", self.additional_child_element),
            ("disabled_child_addition", self.disabled_child_addition),
            ("childcare_cap_one_child", self.childcare_cap_one_child),
            ("childcare_cap_two_plus", self.childcare_cap_two_plus),
            ("work_allowance", self.work_allowance),
            ("disability_element", self.disability_element),
            ("carer_element", self.carer_element),
        ] {
            if amount < Decimal::ZERO {
                return Err(RateScheduleError::NegativeAmount(name));
            }
            if amount > MAX_MONEY_AMOUNT {
                return Err(RateScheduleError::AmountTooLarge(name));
            }
        }

        for (name, pct) in [
            ("childcare_percentage", self.childcare_percentage),
            ("earnings_taper", self.earnings_taper),
        ] {
            if pct < Decimal::ZERO || pct > Decimal::ONE {
                return Err(RateScheduleError::PercentageOutOfRange(name));
            }
        }

        if self.childcare_cap_one_child > self.childcare_cap_two_plus {
            return Err(RateScheduleError::ChildcareCapOrder);
        }

        Ok(())
    }

    pub fn standard_allowance_for(&self, arrangement: Arrangement, band: AgeBand) -> Decimal {
        let sa = &self.standard_allowance;
        match (arrangement, band) {
            (Arrangement::Single, AgeBand::Under25) => sa.single_under_25,
            (Arrangement::Single, AgeBand::TwentyFiveAndOver) => sa.single_25_plus,
            (Arrangement::Joint, AgeBand::Under25) => sa.joint_under_25,
            (Arrangement::Joint, AgeBand::TwentyFiveAndOver) => sa.joint_25_plus,
        }
    }

    /// Childcare eligible-cost cap for a household with `dependents` children.
    pub fn childcare_cap(&self, dependents: usize) -> Decimal {
        if dependents >= 2 {
            self.childcare_cap_two_plus
        } else {
            self.childcare_cap_one_child
        }
    }
}

impl Default for RateSchedule {
    fn default() -> Self {
        Self::uc_2026_27()
    }
}
