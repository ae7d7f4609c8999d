//! Validated ledger settings derived from configuration.

use neraca_shared::LedgerConfig;
use rust_decimal::Decimal;

use crate::ledger::LedgerError;
use crate::period::FiscalCalendar;

/// Ledger settings shared by the repositories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerSettings {
    /// Fiscal calendar used for YTD accumulation and year generation.
    pub calendar: FiscalCalendar,
    /// Tolerance for reporting-side balance checks.
    pub balance_tolerance: Decimal,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            calendar: FiscalCalendar::default(),
            balance_tolerance: Decimal::new(1, 2),
        }
    }
}

impl TryFrom<&LedgerConfig> for LedgerSettings {
    type Error = LedgerError;

    fn try_from(config: &LedgerConfig) -> Result<Self, Self::Error> {
        Ok(Self {
            calendar: FiscalCalendar::new(config.fiscal_year_start_month)?,
            balance_tolerance: config.balance_tolerance.abs(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_matches_config_default() {
        let settings = LedgerSettings::try_from(&LedgerConfig::default()).unwrap();
        assert_eq!(settings, LedgerSettings::default());
        assert_eq!(settings.balance_tolerance, dec!(0.01));
    }

    #[test]
    fn test_invalid_month_rejected() {
        let config = LedgerConfig {
            fiscal_year_start_month: 13,
            balance_tolerance: dec!(0.01),
        };
        assert!(matches!(
            LedgerSettings::try_from(&config),
            Err(LedgerError::InvalidFiscalMonth(13))
        ));
    }
}
