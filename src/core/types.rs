use serde::Serialize;

use super::error::DomainError;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CompoundingFrequency {
    Monthly,
    Yearly,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ContributionFrequency {
    Monthly,
    Yearly,
}

/// Tags naming the compounding/contribution frequency pairs the journey
/// supports: monthly/monthly, yearly/yearly, and monthly compounding with
/// yearly contributions.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    Mom,
    Yoy,
    Yom,
}

impl ModelKind {
    pub fn from_tag(tag: &str) -> Result<Self, DomainError> {
        match tag {
            "mom" => Ok(ModelKind::Mom),
            "yoy" => Ok(ModelKind::Yoy),
            "yom" => Ok(ModelKind::Yom),
            other => Err(DomainError::UnknownModelType(other.to_string())),
        }
    }

    pub fn frequencies(self) -> (CompoundingFrequency, ContributionFrequency) {
        match self {
            ModelKind::Mom => (CompoundingFrequency::Monthly, ContributionFrequency::Monthly),
            ModelKind::Yoy => (CompoundingFrequency::Yearly, ContributionFrequency::Yearly),
            ModelKind::Yom => (CompoundingFrequency::Monthly, ContributionFrequency::Yearly),
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            ModelKind::Mom => "mom",
            ModelKind::Yoy => "yoy",
            ModelKind::Yom => "yom",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Investment,
    Retirement,
    Depleted,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CorpusSource {
    Manual,
    Calculated,
}

impl CorpusSource {
    pub fn label(self) -> &'static str {
        match self {
            CorpusSource::Manual => "manual",
            CorpusSource::Calculated => "calculated",
        }
    }
}

/// One requested investment model. The tag is kept as the caller's string
/// and resolved to a `ModelKind` by the orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSpec {
    pub id: String,
    pub name: String,
    pub model_type: String,
    pub base_amount: f64,
    pub recurring_amount: f64,
    pub step_up_rate: f64,
    pub avg_growth_rate: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JourneyRequest {
    pub start_year: i32,
    pub current_age: u32,
    pub retirement_age: u32,
    pub expected_life_span: u32,
    pub inflation_rate: f64,
    pub post_retirement_return_rate: f64,
    pub yearly_withdrawal: f64,
    pub retirement_corpus_manual: Option<f64>,
    pub years_to_display: u32,
    pub investment_models: Vec<ModelSpec>,
}

/// One charted year. A year belongs to exactly one phase: investment-phase
/// points carry model amounts and no balance, retirement-phase points the
/// reverse, and a depleted point pins the balance to zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionPoint {
    pub year: i32,
    pub phase: Phase,
    pub model_amounts: Vec<Option<f64>>,
    pub combined_investment: Option<f64>,
    pub retirement_balance: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelSummary {
    pub id: String,
    pub name: String,
    pub model_type: ModelKind,
    pub corpus_at_retirement: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JourneyResult {
    pub points: Vec<ProjectionPoint>,
    pub model_summaries: Vec<ModelSummary>,
    pub retirement_corpus: f64,
    pub calculated_total_corpus: f64,
    pub corpus_source: CorpusSource,
    pub retirement_year: i32,
    pub retirement_age: u32,
}

/// Amounts are rounded only at the point of emission; simulations keep
/// full precision internally.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
