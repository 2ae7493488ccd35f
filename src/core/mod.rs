mod engine;
mod error;
mod journey;
mod types;

pub use engine::{LumpSum, RecurringPlan, ScenarioParams, WithdrawalScenario};
pub use error::{DomainError, JourneyError, ValidationError};
pub use journey::project;
pub use types::{
    CompoundingFrequency, ContributionFrequency, CorpusSource, JourneyRequest, JourneyResult,
    ModelKind, ModelSpec, ModelSummary, Phase, ProjectionPoint,
};
