use super::engine::{RecurringPlan, ScenarioParams, WithdrawalScenario};
use super::error::{DomainError, JourneyError};
use super::types::{
    CorpusSource, JourneyRequest, JourneyResult, ModelKind, ModelSummary, Phase, ProjectionPoint,
    round2,
};

struct PlannedModel {
    id: String,
    name: String,
    kind: ModelKind,
    plan: RecurringPlan,
}

/// Project the full savings journey: accumulation points from the start
/// year through retirement, then drawdown points until the corpus depletes
/// or the display horizon ends. Depletion is a normal terminal outcome;
/// every other failure aborts the whole request.
pub fn project(request: &JourneyRequest) -> Result<JourneyResult, JourneyError> {
    let retirement_year =
        request.start_year + request.retirement_age as i32 - request.current_age as i32;

    let mut models = Vec::with_capacity(request.investment_models.len());
    for spec in &request.investment_models {
        let kind = ModelKind::from_tag(&spec.model_type)?;
        let (compounding, contribution) = kind.frequencies();
        models.push(PlannedModel {
            id: spec.id.clone(),
            name: spec.name.clone(),
            kind,
            plan: RecurringPlan {
                base_amount: spec.base_amount,
                recurring_amount: spec.recurring_amount,
                step_up_rate: spec.step_up_rate,
                avg_growth_rate: spec.avg_growth_rate,
                start_year: request.start_year,
                compounding,
                contribution,
            },
        });
    }

    let manual_corpus = request.retirement_corpus_manual.filter(|corpus| *corpus > 0.0);
    let (corpus, corpus_source, summed_corpus) = match manual_corpus {
        Some(corpus) => (corpus, CorpusSource::Manual, None),
        None => {
            let total = combined_amount(&models, retirement_year)?;
            (total, CorpusSource::Calculated, Some(total))
        }
    };

    let scenario = WithdrawalScenario::new(ScenarioParams {
        corpus,
        current_age: request.current_age,
        current_year: request.start_year,
        retirement_year,
        expected_life_span: request.expected_life_span,
        inflation_rate: request.inflation_rate,
        post_retirement_return_rate: request.post_retirement_return_rate,
        yearly_withdrawal: request.yearly_withdrawal,
    })?;

    // The summed projection is reported for reference even when a manual
    // corpus drives the drawdown.
    let calculated_total = match summed_corpus {
        Some(total) => total,
        None => combined_amount(&models, retirement_year)?,
    };

    let mut points = Vec::new();
    for year in request.start_year..=retirement_year {
        let mut combined = 0.0;
        let mut amounts = Vec::with_capacity(models.len());
        for model in &models {
            let amount = model.plan.amount_at(year)?;
            combined += amount;
            amounts.push(Some(round2(amount)));
        }
        points.push(ProjectionPoint {
            year,
            phase: Phase::Investment,
            model_amounts: amounts,
            combined_investment: Some(round2(combined)),
            retirement_balance: None,
        });
    }

    let display_end = request.start_year + request.years_to_display as i32;
    let horizon = retirement_year + scenario.years_in_retirement() as i32;
    for year in (retirement_year + 1)..=display_end.min(horizon) {
        match scenario.remaining_corpus(year) {
            Ok(balance) => points.push(ProjectionPoint {
                year,
                phase: Phase::Retirement,
                model_amounts: vec![None; models.len()],
                combined_investment: None,
                retirement_balance: Some(round2(balance)),
            }),
            Err(DomainError::Depleted { .. }) => {
                points.push(ProjectionPoint {
                    year,
                    phase: Phase::Depleted,
                    model_amounts: vec![None; models.len()],
                    combined_investment: None,
                    retirement_balance: Some(0.0),
                });
                break;
            }
            Err(err) => return Err(err.into()),
        }
    }

    let mut model_summaries = Vec::with_capacity(models.len());
    for model in &models {
        model_summaries.push(ModelSummary {
            id: model.id.clone(),
            name: model.name.clone(),
            model_type: model.kind,
            corpus_at_retirement: round2(model.plan.amount_at(retirement_year)?),
        });
    }

    Ok(JourneyResult {
        points,
        model_summaries,
        retirement_corpus: round2(corpus),
        calculated_total_corpus: round2(calculated_total),
        corpus_source,
        retirement_year,
        retirement_age: request.retirement_age,
    })
}

fn combined_amount(models: &[PlannedModel], year: i32) -> Result<f64, DomainError> {
    let mut total = 0.0;
    for model in models {
        total += model.plan.amount_at(year)?;
    }
    Ok(total)
}
