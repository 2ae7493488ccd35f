use thiserror::Error;

/// Scenario construction failures. Checks run in a fixed order and the
/// first violated rule is reported; values carried are the offending inputs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Current year {current_year} cannot be greater than retirement year {retirement_year}")]
    RetirementBeforeCurrentYear {
        current_year: i32,
        retirement_year: i32,
    },

    #[error("{label} year {year} must be between 1900 and 2150")]
    CalendarYearOutOfRange { label: &'static str, year: i32 },

    #[error("Current age {age} must be between 18 and 100 years")]
    CurrentAgeOutOfRange { age: u32 },

    #[error("Expected life span {life_span} must be between 30 and 120 years and greater than current age {current_age}")]
    LifeSpanOutOfRange { life_span: u32, current_age: u32 },

    #[error("Retirement age {retirement_age} must be between 40 and 85 years")]
    RetirementAgeOutOfRange { retirement_age: u32 },

    #[error("Retirement age {retirement_age} must be less than expected life span {life_span}")]
    RetirementOutlivesLifeSpan { retirement_age: u32, life_span: u32 },

    #[error("Retirement corpus {corpus} is too small (minimum 100000)")]
    CorpusTooSmall { corpus: f64 },

    #[error("Yearly withdrawal {withdrawal} must be positive")]
    WithdrawalNotPositive { withdrawal: f64 },

    #[error("Inflation rate {rate}% must be between -10% and 50%")]
    InflationOutOfRange { rate: f64 },

    #[error("Post-retirement return rate {rate}% must be between -10% and 30%")]
    ReturnRateOutOfRange { rate: f64 },

    #[error("Years in retirement ({years}) must be at least 5 years")]
    RetirementTooShort { years: u32 },

    #[error("Initial withdrawal rate {rate:.1}% is too high (recommended maximum: 10% of corpus)")]
    WithdrawalRateTooHigh { rate: f64 },

    #[error("Withdrawal amount is too high - corpus may not last even 10 years")]
    UnsustainableWithdrawal {
        first_year_withdrawal: f64,
        corpus: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    #[error("Cannot project year {year}: projection begins in {earliest}")]
    InvalidYear { year: i32, earliest: i32 },

    /// Terminal outcome of a drawdown, not a caller mistake. The balance is
    /// the raw negative value, never clamped.
    #[error("Corpus depleted in year {year}. Remaining corpus became negative: {balance:.2}")]
    Depleted { year: i32, balance: f64 },

    #[error("Invalid investment model: {0}")]
    UnknownModelType(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum JourneyError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Domain(#[from] DomainError),
}
