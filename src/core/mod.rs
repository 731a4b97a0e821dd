mod area_rates;
mod engine;
mod error;
mod rates;
mod resolver;
mod types;

pub use area_rates::{AreaRateTable, BedroomBand, RateSet};
pub use engine::{MAX_DEPENDENT_AGE, MAX_MONEY_AMOUNT, MIN_CLAIMANT_AGE, compute};
pub use error::EntitlementError;
pub use rates::{AgeBand, RateSchedule, RateScheduleError, StandardAllowance, UPPER_BAND_AGE};
pub use resolver::{LocationResolver, PostcodePrefixResolver};
pub use types::{Arrangement, Circumstances, Dependent, EntitlementBreakdown};
