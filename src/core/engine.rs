use super::error::{DomainError, ValidationError};
use super::types::{CompoundingFrequency, ContributionFrequency};

const MIN_VIABLE_CORPUS: f64 = 100_000.0;
const MAX_INITIAL_WITHDRAWAL_RATE_PCT: f64 = 10.0;

/// A recurring contribution plan simulated at month granularity.
/// Contributions land at a period's start, growth applies at its end, and
/// the contribution steps up once every twelve months.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecurringPlan {
    pub base_amount: f64,
    pub recurring_amount: f64,
    pub step_up_rate: f64,
    pub avg_growth_rate: f64,
    pub start_year: i32,
    pub compounding: CompoundingFrequency,
    pub contribution: ContributionFrequency,
}

impl RecurringPlan {
    /// Amount accumulated through the END of `year`, starting from the
    /// plan's base amount at the start of `start_year`.
    pub fn amount_at(&self, year: i32) -> Result<f64, DomainError> {
        if year < self.start_year {
            return Err(DomainError::InvalidYear {
                year,
                earliest: self.start_year,
            });
        }

        let mut total = self.base_amount;
        // Yearly contributors invest the annualized monthly figure once per year.
        let mut contribution = match self.contribution {
            ContributionFrequency::Monthly => self.recurring_amount,
            ContributionFrequency::Yearly => self.recurring_amount * 12.0,
        };
        let period_rate = match self.compounding {
            CompoundingFrequency::Monthly => monthly_equivalent_rate(self.avg_growth_rate),
            CompoundingFrequency::Yearly => self.avg_growth_rate / 100.0,
        };

        let months = (year - self.start_year + 1) * 12;
        for month in 0..months {
            if self.contribution == ContributionFrequency::Monthly || month % 12 == 0 {
                total += contribution;
            }
            if self.compounding == CompoundingFrequency::Monthly || month % 12 == 11 {
                total *= 1.0 + period_rate;
            }
            if (month + 1) % 12 == 0 {
                contribution *= 1.0 + self.step_up_rate / 100.0;
            }
        }

        Ok(total)
    }
}

/// Monthly rate equivalent to an annual growth rate in percent, so twelve
/// monthly applications compound to exactly one annual application.
pub(crate) fn monthly_equivalent_rate(annual_rate_pct: f64) -> f64 {
    (1.0 + annual_rate_pct / 100.0).powf(1.0 / 12.0) - 1.0
}

/// A one-shot investment compounding annually from the year it was made.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LumpSum {
    pub amount: f64,
    pub avg_growth_rate: f64,
    pub invested_year: i32,
}

impl LumpSum {
    pub fn amount_at(&self, year: i32) -> Result<f64, DomainError> {
        if year < self.invested_year {
            return Err(DomainError::InvalidYear {
                year,
                earliest: self.invested_year,
            });
        }
        let growth = 1.0 + self.avg_growth_rate / 100.0;
        Ok(self.amount * growth.powi(year - self.invested_year + 1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScenarioParams {
    pub corpus: f64,
    pub current_age: u32,
    pub current_year: i32,
    pub retirement_year: i32,
    pub expected_life_span: u32,
    pub inflation_rate: f64,
    pub post_retirement_return_rate: f64,
    pub yearly_withdrawal: f64,
}

/// A drawdown scenario that has passed validation. Construction is the only
/// way to obtain one, so every instance is financially coherent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WithdrawalScenario {
    params: ScenarioParams,
    retirement_age: u32,
}

impl WithdrawalScenario {
    pub fn new(params: ScenarioParams) -> Result<Self, ValidationError> {
        let retirement_age = validate_scenario(&params)?;
        Ok(Self {
            params,
            retirement_age,
        })
    }

    pub fn retirement_age(&self) -> u32 {
        self.retirement_age
    }

    pub fn retirement_year(&self) -> i32 {
        self.params.retirement_year
    }

    pub fn years_in_retirement(&self) -> u32 {
        self.params.expected_life_span - self.retirement_age
    }

    /// Balance remaining at the END of `year`. `Depleted` carries the raw
    /// negative balance of the first year withdrawals outrun the corpus.
    pub fn remaining_corpus(&self, year: i32) -> Result<f64, DomainError> {
        drawdown_balance(&self.params, year)
    }
}

fn drawdown_balance(params: &ScenarioParams, target_year: i32) -> Result<f64, DomainError> {
    if target_year < params.retirement_year {
        return Err(DomainError::InvalidYear {
            year: target_year,
            earliest: params.retirement_year,
        });
    }

    let inflation = 1.0 + params.inflation_rate / 100.0;
    let growth = 1.0 + params.post_retirement_return_rate / 100.0;

    let mut balance = params.corpus;
    // The withdrawal is quoted in today's money; inflate it forward to the
    // first retirement year before the simulation starts.
    let mut withdrawal =
        params.yearly_withdrawal * inflation.powi(params.retirement_year - params.current_year);

    for year in params.retirement_year..=target_year {
        balance -= withdrawal;
        if balance < 0.0 {
            return Err(DomainError::Depleted { year, balance });
        }
        balance *= growth;
        withdrawal *= inflation;
    }

    Ok(balance)
}

/// Ordered rule set; the first violated rule wins. Returns the derived
/// retirement age on success.
fn validate_scenario(p: &ScenarioParams) -> Result<u32, ValidationError> {
    if p.current_year > p.retirement_year {
        return Err(ValidationError::RetirementBeforeCurrentYear {
            current_year: p.current_year,
            retirement_year: p.retirement_year,
        });
    }

    if !(1900..=2150).contains(&p.current_year) {
        return Err(ValidationError::CalendarYearOutOfRange {
            label: "Current",
            year: p.current_year,
        });
    }
    if !(1900..=2150).contains(&p.retirement_year) {
        return Err(ValidationError::CalendarYearOutOfRange {
            label: "Retirement",
            year: p.retirement_year,
        });
    }

    if !(18..=100).contains(&p.current_age) {
        return Err(ValidationError::CurrentAgeOutOfRange { age: p.current_age });
    }

    if !(30..=120).contains(&p.expected_life_span) || p.expected_life_span <= p.current_age {
        return Err(ValidationError::LifeSpanOutOfRange {
            life_span: p.expected_life_span,
            current_age: p.current_age,
        });
    }

    let retirement_age = p.current_age + (p.retirement_year - p.current_year) as u32;
    if !(40..=85).contains(&retirement_age) {
        return Err(ValidationError::RetirementAgeOutOfRange { retirement_age });
    }

    if retirement_age >= p.expected_life_span {
        return Err(ValidationError::RetirementOutlivesLifeSpan {
            retirement_age,
            life_span: p.expected_life_span,
        });
    }

    if p.corpus < MIN_VIABLE_CORPUS {
        return Err(ValidationError::CorpusTooSmall { corpus: p.corpus });
    }

    if p.yearly_withdrawal <= 0.0 {
        return Err(ValidationError::WithdrawalNotPositive {
            withdrawal: p.yearly_withdrawal,
        });
    }

    if !(-10.0..=50.0).contains(&p.inflation_rate) {
        return Err(ValidationError::InflationOutOfRange {
            rate: p.inflation_rate,
        });
    }

    if !(-10.0..=30.0).contains(&p.post_retirement_return_rate) {
        return Err(ValidationError::ReturnRateOutOfRange {
            rate: p.post_retirement_return_rate,
        });
    }

    let years_in_retirement = p.expected_life_span - retirement_age;
    if years_in_retirement < 5 {
        return Err(ValidationError::RetirementTooShort {
            years: years_in_retirement,
        });
    }

    // The rate cap compares today's withdrawal against the corpus; the
    // simulated first retirement year uses the inflation-adjusted amount.
    let withdrawal_rate = p.yearly_withdrawal / p.corpus * 100.0;
    if withdrawal_rate > MAX_INITIAL_WITHDRAWAL_RATE_PCT {
        return Err(ValidationError::WithdrawalRateTooHigh {
            rate: withdrawal_rate,
        });
    }

    let first_year_withdrawal = p.yearly_withdrawal
        * (1.0 + p.inflation_rate / 100.0).powi(p.retirement_year - p.current_year);
    if first_year_withdrawal * 10.0 > p.corpus {
        return Err(ValidationError::UnsustainableWithdrawal {
            first_year_withdrawal,
            corpus: p.corpus,
        });
    }

    Ok(retirement_age)
}
