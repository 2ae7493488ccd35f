use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{debug, info};

use crate::core::{
    self, CorpusSource, JourneyRequest, JourneyResult, ModelSpec, ModelSummary, ProjectionPoint,
};

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliModelType {
    Mom,
    Yoy,
    Yom,
}

impl CliModelType {
    fn tag(self) -> &'static str {
        match self {
            CliModelType::Mom => "mom",
            CliModelType::Yoy => "yoy",
            CliModelType::Yom => "yom",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ModelPayload {
    id: Option<String>,
    name: Option<String>,
    model_type: Option<String>,
    base_amount: Option<f64>,
    recurring_amount: Option<f64>,
    step_up_rate: Option<f64>,
    avg_growth_rate: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct JourneyPayload {
    start_year: Option<i32>,
    current_age: Option<u32>,
    retirement_age: Option<u32>,
    expected_life_span: Option<u32>,
    inflation_rate: Option<f64>,
    post_retirement_return_rate: Option<f64>,
    yearly_withdrawal: Option<f64>,
    retirement_corpus_manual: Option<f64>,
    years_to_display: Option<u32>,
    investment_models: Option<Vec<ModelPayload>>,
}

#[derive(Parser, Debug)]
#[command(
    name = "nestegg",
    about = "Deterministic savings journey projector: compounding contributions, then an inflation-adjusted drawdown"
)]
struct Cli {
    #[arg(long, default_value_t = 2025, help = "First investment year")]
    start_year: i32,
    #[arg(long, default_value_t = 30)]
    current_age: u32,
    #[arg(long, default_value_t = 60)]
    retirement_age: u32,
    #[arg(long, default_value_t = 85, help = "Expected life span as an age")]
    expected_life_span: u32,
    #[arg(long, default_value_t = 6.0, help = "Average annual inflation in percent")]
    inflation_rate: f64,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Average annual return on the corpus after retirement in percent"
    )]
    post_retirement_return_rate: f64,
    #[arg(
        long,
        default_value_t = 1_200_000.0,
        help = "Yearly retirement withdrawal in today's money"
    )]
    yearly_withdrawal: f64,
    #[arg(
        long,
        help = "Use this corpus at retirement instead of summing the investment models"
    )]
    retirement_corpus_manual: Option<f64>,
    #[arg(
        long,
        default_value_t = 60,
        help = "Number of years from the start year to chart"
    )]
    years_to_display: u32,
    #[arg(
        long,
        default_value_t = 500_000.0,
        help = "Default model: starting lump amount"
    )]
    base_amount: f64,
    #[arg(
        long,
        default_value_t = 60_000.0,
        help = "Default model: monthly contribution figure (annualized for yearly contributors)"
    )]
    recurring_amount: f64,
    #[arg(
        long,
        default_value_t = 5.0,
        help = "Default model: annual contribution step-up in percent"
    )]
    step_up_rate: f64,
    #[arg(
        long,
        default_value_t = 10.0,
        help = "Default model: average annual growth in percent"
    )]
    avg_growth_rate: f64,
    #[arg(
        long,
        value_enum,
        default_value_t = CliModelType::Mom,
        help = "Default model: compounding/contribution frequency pair"
    )]
    model_type: CliModelType,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JourneyResponse {
    success: bool,
    message: String,
    retirement_year: i32,
    retirement_age: u32,
    corpus_source: CorpusSource,
    retirement_corpus: f64,
    calculated_total_corpus: f64,
    model_summaries: Vec<ModelSummary>,
    points: Vec<ProjectionPoint>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn default_cli_for_api() -> Cli {
    Cli {
        start_year: 2025,
        current_age: 30,
        retirement_age: 60,
        expected_life_span: 85,
        inflation_rate: 6.0,
        post_retirement_return_rate: 0.0,
        yearly_withdrawal: 1_200_000.0,
        retirement_corpus_manual: None,
        years_to_display: 60,
        base_amount: 500_000.0,
        recurring_amount: 60_000.0,
        step_up_rate: 5.0,
        avg_growth_rate: 10.0,
        model_type: CliModelType::Mom,
    }
}

fn model_spec_from_payload(payload: &ModelPayload, index: usize, cli: &Cli) -> ModelSpec {
    ModelSpec {
        id: payload
            .id
            .clone()
            .unwrap_or_else(|| format!("model-{}", index + 1)),
        name: payload
            .name
            .clone()
            .unwrap_or_else(|| format!("Investment {}", index + 1)),
        model_type: payload
            .model_type
            .clone()
            .unwrap_or_else(|| cli.model_type.tag().to_string()),
        base_amount: payload.base_amount.unwrap_or(cli.base_amount),
        recurring_amount: payload.recurring_amount.unwrap_or(cli.recurring_amount),
        step_up_rate: payload.step_up_rate.unwrap_or(cli.step_up_rate),
        avg_growth_rate: payload.avg_growth_rate.unwrap_or(cli.avg_growth_rate),
    }
}

fn journey_request_from_payload(payload: JourneyPayload) -> JourneyRequest {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.start_year {
        cli.start_year = v;
    }
    if let Some(v) = payload.current_age {
        cli.current_age = v;
    }
    if let Some(v) = payload.retirement_age {
        cli.retirement_age = v;
    }
    if let Some(v) = payload.expected_life_span {
        cli.expected_life_span = v;
    }
    if let Some(v) = payload.inflation_rate {
        cli.inflation_rate = v;
    }
    if let Some(v) = payload.post_retirement_return_rate {
        cli.post_retirement_return_rate = v;
    }
    if let Some(v) = payload.yearly_withdrawal {
        cli.yearly_withdrawal = v;
    }
    if let Some(v) = payload.retirement_corpus_manual {
        cli.retirement_corpus_manual = Some(v);
    }
    if let Some(v) = payload.years_to_display {
        cli.years_to_display = v;
    }

    // Absent model list means one default model; an explicit list (even an
    // empty one) is taken as-is.
    let investment_models = match payload.investment_models {
        Some(models) => models
            .iter()
            .enumerate()
            .map(|(index, model)| model_spec_from_payload(model, index, &cli))
            .collect(),
        None => vec![model_spec_from_payload(&ModelPayload::default(), 0, &cli)],
    };

    JourneyRequest {
        start_year: cli.start_year,
        current_age: cli.current_age,
        retirement_age: cli.retirement_age,
        expected_life_span: cli.expected_life_span,
        inflation_rate: cli.inflation_rate,
        post_retirement_return_rate: cli.post_retirement_return_rate,
        yearly_withdrawal: cli.yearly_withdrawal,
        retirement_corpus_manual: cli.retirement_corpus_manual,
        years_to_display: cli.years_to_display,
        investment_models,
    }
}

fn build_journey_response(result: JourneyResult) -> JourneyResponse {
    let message = format!(
        "Projected retirement corpus {:.2} ({}) across {} charted years",
        result.retirement_corpus,
        result.corpus_source.label(),
        result.points.len()
    );
    JourneyResponse {
        success: true,
        message,
        retirement_year: result.retirement_year,
        retirement_age: result.retirement_age,
        corpus_source: result.corpus_source,
        retirement_corpus: result.retirement_corpus,
        calculated_total_corpus: result.calculated_total_corpus,
        model_summaries: result.model_summaries,
        points: result.points,
    }
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route(
            "/api/journey",
            get(journey_get_handler).post(journey_post_handler),
        )
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    info!("nestegg HTTP API listening on http://{addr}");
    info!("Local access: http://127.0.0.1:{port}/");

    axum::serve(listener, app).await
}

async fn index_handler() -> impl IntoResponse {
    with_cache_control(Html(INDEX_HTML))
}

async fn styles_handler() -> impl IntoResponse {
    with_cache_control((
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLES_CSS,
    ))
}

async fn app_js_handler() -> impl IntoResponse {
    with_cache_control((
        [(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        APP_JS,
    ))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn journey_get_handler(Query(payload): Query<JourneyPayload>) -> Response {
    journey_handler_impl(payload).await
}

async fn journey_post_handler(Json(payload): Json<JourneyPayload>) -> Response {
    journey_handler_impl(payload).await
}

async fn journey_handler_impl(payload: JourneyPayload) -> Response {
    let request = journey_request_from_payload(payload);
    match core::project(&request) {
        Ok(result) => {
            debug!(
                points = result.points.len(),
                corpus = result.retirement_corpus,
                "journey projected"
            );
            json_response(StatusCode::OK, build_journey_response(result))
        }
        Err(err) => {
            debug!(error = %err, "journey rejected");
            error_response(StatusCode::BAD_REQUEST, &err.to_string())
        }
    }
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn journey_request_from_json(json: &str) -> Result<JourneyRequest, String> {
    let payload = serde_json::from_str::<JourneyPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    Ok(journey_request_from_payload(payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{JourneyError, ValidationError};

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn empty_payload_uses_cli_defaults_with_one_model() {
        let request = journey_request_from_json("{}").expect("json should parse");

        assert_eq!(request.start_year, 2025);
        assert_eq!(request.current_age, 30);
        assert_eq!(request.retirement_age, 60);
        assert_eq!(request.expected_life_span, 85);
        assert_approx(request.inflation_rate, 6.0);
        assert_approx(request.yearly_withdrawal, 1_200_000.0);
        assert_eq!(request.retirement_corpus_manual, None);
        assert_eq!(request.years_to_display, 60);

        assert_eq!(request.investment_models.len(), 1);
        let model = &request.investment_models[0];
        assert_eq!(model.model_type, "mom");
        assert_approx(model.base_amount, 500_000.0);
        assert_approx(model.recurring_amount, 60_000.0);
    }

    #[test]
    fn journey_payload_parses_web_keys() {
        let json = r#"{
          "startYear": 2024,
          "currentAge": 35,
          "retirementAge": 62,
          "expectedLifeSpan": 90,
          "inflationRate": 5.5,
          "postRetirementReturnRate": 4.0,
          "yearlyWithdrawal": 900000,
          "retirementCorpusManual": 50000000,
          "yearsToDisplay": 45,
          "investmentModels": [
            {
              "id": "sip",
              "name": "Equity SIP",
              "modelType": "yom",
              "baseAmount": 250000,
              "recurringAmount": 40000,
              "stepUpRate": 7.5,
              "avgGrowthRate": 11.0
            },
            { "modelType": "yoy" }
          ]
        }"#;
        let request = journey_request_from_json(json).expect("json should parse");

        assert_eq!(request.start_year, 2024);
        assert_eq!(request.current_age, 35);
        assert_eq!(request.retirement_age, 62);
        assert_eq!(request.expected_life_span, 90);
        assert_approx(request.inflation_rate, 5.5);
        assert_approx(request.post_retirement_return_rate, 4.0);
        assert_approx(request.yearly_withdrawal, 900_000.0);
        assert_eq!(request.retirement_corpus_manual, Some(50_000_000.0));
        assert_eq!(request.years_to_display, 45);

        assert_eq!(request.investment_models.len(), 2);
        let first = &request.investment_models[0];
        assert_eq!(first.id, "sip");
        assert_eq!(first.name, "Equity SIP");
        assert_eq!(first.model_type, "yom");
        assert_approx(first.base_amount, 250_000.0);
        assert_approx(first.step_up_rate, 7.5);

        // The sparse second entry backfills from the CLI defaults.
        let second = &request.investment_models[1];
        assert_eq!(second.id, "model-2");
        assert_eq!(second.name, "Investment 2");
        assert_eq!(second.model_type, "yoy");
        assert_approx(second.base_amount, 500_000.0);
    }

    #[test]
    fn explicit_empty_model_list_is_preserved() {
        let request =
            journey_request_from_json(r#"{"investmentModels": []}"#).expect("json should parse");
        assert!(request.investment_models.is_empty());

        // Without models or a manual corpus there is nothing to retire on.
        assert!(matches!(
            core::project(&request).expect_err("must reject"),
            JourneyError::Validation(ValidationError::CorpusTooSmall { .. })
        ));
    }

    #[test]
    fn default_request_projects_successfully() {
        let request = journey_request_from_json("{}").expect("json should parse");
        let result = core::project(&request).expect("default journey must be valid");
        assert_eq!(result.retirement_year, 2055);
        assert_eq!(result.corpus_source, CorpusSource::Calculated);

        let response = build_journey_response(result);
        assert!(response.success);
        assert!(response.message.contains("calculated"));
    }

    #[test]
    fn unknown_model_type_surfaces_its_message() {
        let json = r#"{"investmentModels": [{"modelType": "weekly"}]}"#;
        let request = journey_request_from_json(json).expect("json should parse");
        let err = core::project(&request).expect_err("must reject");
        assert_eq!(err.to_string(), "Invalid investment model: weekly");
    }

    #[test]
    fn journey_response_serialization_uses_camel_case() {
        let request = journey_request_from_json("{}").expect("json should parse");
        let result = core::project(&request).expect("default journey must be valid");
        let json =
            serde_json::to_string(&build_journey_response(result)).expect("response serializes");

        assert!(json.contains("\"corpusSource\":\"calculated\""));
        assert!(json.contains("\"modelSummaries\""));
        assert!(json.contains("\"corpusAtRetirement\""));
        assert!(json.contains("\"retirementYear\""));
        assert!(json.contains("\"combinedInvestment\""));
        assert!(json.contains("\"retirementBalance\""));
        assert!(json.contains("\"phase\":\"investment\""));
        assert!(json.contains("\"modelType\":\"mom\""));
    }
}
