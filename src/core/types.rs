use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::EntitlementError;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arrangement {
    Single,
    Joint,
}

impl Arrangement {
    pub fn as_str(self) -> &'static str {
        match self {
            Arrangement::Single => "single",
            Arrangement::Joint => "joint",
        }
    }
}

impl fmt::Display for Arrangement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Arrangement {
    type Err = EntitlementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(Arrangement::Single),
            "joint" => Ok(Arrangement::Joint),
            _ => Err(EntitlementError::UnknownArrangement(s.to_string())),
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependent {
    pub age: u32,
    #[serde(default, alias = "is_disabled")]
    pub is_disabled: bool,
}

impl Dependent {
    pub fn new(age: u32) -> Self {
        Self {
            age,
            is_disabled: false,
        }
    }

    pub fn disabled(age: u32) -> Self {
        Self {
            age,
            is_disabled: true,
        }
    }
}

/// Declared circumstances for one assessment.
///
/// `dependents` is an ordered sequence: the first entry attracts the higher
/// first-child rate regardless of age.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Circumstances {
    pub arrangement: Arrangement,
    pub claimant_age: u32,
    pub partner_age: Option<u32>,
    pub dependents: Vec<Dependent>,
    pub claimant_earnings: Decimal,
    pub partner_earnings: Decimal,
    pub monthly_rent: Decimal,
    pub rent_cap: Option<Decimal>,
    pub has_disability: bool,
    pub is_carer: bool,
    pub has_childcare_costs: bool,
    pub childcare_costs: Decimal,
}

impl Circumstances {
    pub fn single(claimant_age: u32) -> Self {
        Self {
            arrangement: Arrangement::Single,
            claimant_age,
            partner_age: None,
            dependents: Vec::new(),
            claimant_earnings: Decimal::ZERO,
            partner_earnings: Decimal::ZERO,
            monthly_rent: Decimal::ZERO,
            rent_cap: None,
            has_disability: false,
            is_carer: false,
            has_childcare_costs: false,
            childcare_costs: Decimal::ZERO,
        }
    }

    pub fn joint(claimant_age: u32, partner_age: u32) -> Self {
        Self {
            arrangement: Arrangement::Joint,
            partner_age: Some(partner_age),
            ..Self::single(claimant_age)
        }
    }

    pub fn combined_earnings(&self) -> Decimal {
        self.claimant_earnings + self.partner_earnings
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitlementBreakdown {
    #[serde(with = "rust_decimal::serde::float")]
    pub standard_allowance: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub housing_element: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub child_element: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub childcare_element: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub disability_element: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub carer_element: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub gross_entitlement: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub work_allowance: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_earnings: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub earnings_deduction: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_entitlement: Decimal,
}
