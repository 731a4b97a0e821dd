//! Local Housing Allowance rent caps keyed by Broad Rental Market Area.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BedroomBand {
    Studio,
    OneBed,
    TwoBed,
    ThreeBed,
    FourOrMore,
}

impl BedroomBand {
    pub fn from_bedrooms(bedrooms: u32) -> Self {
        match bedrooms {
            0 => BedroomBand::Studio,
            1 => BedroomBand::OneBed,
            2 => BedroomBand::TwoBed,
            3 => BedroomBand::ThreeBed,
            _ => BedroomBand::FourOrMore,
        }
    }
}

/// Monthly caps for every bedroom band in one area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateSet {
    pub brma_name: String,
    pub local_authority: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub studio_rate: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub one_bed_rate: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub two_bed_rate: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub three_bed_rate: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub four_bed_rate: Decimal,
}

impl RateSet {
    pub fn rate_for(&self, band: BedroomBand) -> Decimal {
        match band {
            BedroomBand::Studio => self.studio_rate,
            BedroomBand::OneBed => self.one_bed_rate,
            BedroomBand::TwoBed => self.two_bed_rate,
            BedroomBand::ThreeBed => self.three_bed_rate,
            BedroomBand::FourOrMore => self.four_bed_rate,
        }
    }
}

/// In-memory rent cap table. Unknown areas are reported as `None`, never as
/// an error.
#[derive(Debug, Clone, Default)]
pub struct AreaRateTable {
    areas: BTreeMap<String, RateSet>,
}

impl AreaRateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sample 2026-27 rates for the areas the service currently covers.
    pub fn lha_2026_27() -> Self {
        let mut table = Self::new();
        table.insert(
            "E92000001",
            rate_set(
                "North Yorkshire",
                "North Yorkshire Council",
                [
                    dec!(600.00),
                    dec!(700.00),
                    dec!(850.00),
                    dec!(1000.00),
                    dec!(1200.00),
                ],
            ),
        );
        table.insert(
            "E08000032",
            rate_set(
                "Bradford",
                "Bradford Council",
                [
                    dec!(550.00),
                    dec!(650.00),
                    dec!(800.00),
                    dec!(950.00),
                    dec!(1150.00),
                ],
            ),
        );
        table.insert(
            "E08000016",
            rate_set(
                "Birmingham",
                "Birmingham City Council",
                [
                    dec!(550.00),
                    dec!(700.00),
                    dec!(850.00),
                    dec!(1000.00),
                    dec!(1200.00),
                ],
            ),
        );
        table.insert(
            "E09000002",
            rate_set(
                "London",
                "Barnet Council",
                [
                    dec!(950.00),
                    dec!(1100.00),
                    dec!(1350.00),
                    dec!(1600.00),
                    dec!(1900.00),
                ],
            ),
        );
        table
    }

    pub fn insert(&mut self, area_id: impl Into<String>, rates: RateSet) {
        self.areas.insert(area_id.into(), rates);
    }

    pub fn lookup_rate(&self, area_id: &str, bedrooms: u32) -> Option<Decimal> {
        self.lookup_all_rates(area_id)
            .map(|rates| rates.rate_for(BedroomBand::from_bedrooms(bedrooms)))
    }

    pub fn lookup_all_rates(&self, area_id: &str) -> Option<&RateSet> {
        self.areas.get(area_id.trim())
    }

    pub fn area_ids(&self) -> impl Iterator<Item = &str> {
        self.areas.keys().map(String::as_str)
    }
}

fn rate_set(brma_name: &str, local_authority: &str, rates: [Decimal; 5]) -> RateSet {
    let [studio_rate, one_bed_rate, two_bed_rate, three_bed_rate, four_bed_rate] = rates;
    RateSet {
        brma_name: brma_name.to_string(),
        local_authority: local_authority.to_string(),
        studio_rate,
        one_bed_rate,
        two_bed_rate,
        three_bed_rate,
        four_bed_rate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bedroom_counts_collapse_into_five_bands() {
        assert_eq!(BedroomBand::from_bedrooms(0), BedroomBand::Studio);
        assert_eq!(BedroomBand::from_bedrooms(1), BedroomBand::OneBed);
        assert_eq!(BedroomBand::from_bedrooms(2), BedroomBand::TwoBed);
        assert_eq!(BedroomBand::from_bedrooms(3), BedroomBand::ThreeBed);
        assert_eq!(BedroomBand::from_bedrooms(4), BedroomBand::FourOrMore);
        assert_eq!(BedroomBand::from_bedrooms(9), BedroomBand::FourOrMore);
    }

    #[test]
    fn lookup_rate_returns_band_amount_for_known_area() {
        let table = AreaRateTable::lha_2026_27();
        assert_eq!(table.lookup_rate("E09000002", 0), Some(dec!(950.00)));
        assert_eq!(table.lookup_rate("E09000002", 1), Some(dec!(1100.00)));
        assert_eq!(table.lookup_rate("E08000032", 3), Some(dec!(950.00)));
    }

    #[test]
    fn lookup_rate_uses_four_bed_rate_for_larger_households() {
        let table = AreaRateTable::lha_2026_27();
        assert_eq!(table.lookup_rate("E92000001", 4), Some(dec!(1200.00)));
        assert_eq!(table.lookup_rate("E92000001", 7), Some(dec!(1200.00)));
    }

    #[test]
    fn unknown_area_is_not_found_rather_than_error() {
        let table = AreaRateTable::lha_2026_27();
        assert_eq!(table.lookup_rate("INVALID", 1), None);
        assert!(table.lookup_all_rates("INVALID").is_none());
        assert!(AreaRateTable::new().lookup_rate("E09000002", 1).is_none());
    }

    #[test]
    fn lookup_all_rates_exposes_area_metadata() {
        let table = AreaRateTable::lha_2026_27();
        let rates = table.lookup_all_rates("E08000016").expect("known area");
        assert_eq!(rates.brma_name, "Birmingham");
        assert_eq!(rates.local_authority, "Birmingham City Council");
        assert_eq!(rates.two_bed_rate, dec!(850.00));
    }

    #[test]
    fn area_ids_are_sorted() {
        let table = AreaRateTable::lha_2026_27();
        let ids = table.area_ids().collect::<Vec<_>>();
        assert_eq!(ids, vec!["E08000016", "E08000032", "E09000002", "E92000001"]);
    }
}
