use serde::{Deserialize, Serialize};

use crate::decimal::MONEY_DECIMAL_PLACES;
use crate::errors::{AccrualError, Result};
use crate::types::CycleLength;

/// days assumed in a month when pro-rating leftover days
pub const DEFAULT_DAYS_PER_MONTH: u32 = 30;

/// accrual engine configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccrualConfig {
    /// interval after which accrued interest is capitalized
    pub cycle_length: CycleLength,
    /// divisor for the leftover-day fraction of a month
    pub days_per_month: u32,
    /// precision of every reported monetary amount
    pub money_decimal_places: u32,
}

impl Default for AccrualConfig {
    fn default() -> Self {
        Self::three_year_cycle()
    }
}

impl AccrualConfig {
    /// 3-year compounding, 30-day month fraction, 2dp amounts
    pub fn three_year_cycle() -> Self {
        Self {
            cycle_length: CycleLength::THREE_YEARS,
            days_per_month: DEFAULT_DAYS_PER_MONTH,
            money_decimal_places: MONEY_DECIMAL_PLACES,
        }
    }

    pub fn with_cycle_length(mut self, cycle_length: CycleLength) -> Self {
        self.cycle_length = cycle_length;
        self
    }

    pub fn with_days_per_month(mut self, days: u32) -> Self {
        self.days_per_month = days;
        self
    }

    /// parse and validate a json document; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: AccrualConfig = serde_json::from_str(json)
            .map_err(|e| AccrualError::invalid_configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.cycle_length.as_months() == 0 {
            return Err(AccrualError::invalid_configuration(
                "cycle length must be at least one month",
            ));
        }
        if self.days_per_month == 0 {
            return Err(AccrualError::invalid_configuration(
                "days per month must be positive",
            ));
        }
        if self.money_decimal_places > 10 {
            return Err(AccrualError::invalid_configuration(format!(
                "money precision of {} places is not supported",
                self.money_decimal_places
            )));
        }
        Ok(())
    }
}
