use axum::{
    Router,
    extract::{Json, Path, Query, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::core::{
    AreaRateTable, Arrangement, Circumstances, Dependent, EntitlementBreakdown, LocationResolver,
    MAX_DEPENDENT_AGE, MAX_MONEY_AMOUNT, MIN_CLAIMANT_AGE, PostcodePrefixResolver, RateSchedule,
    RateSet, compute,
};

const MAX_CLAIMANT_AGE: u32 = 120;
const MIN_BEDROOMS_NEEDED: u32 = 1;
const MAX_BEDROOMS_NEEDED: u32 = 5;

/// Shared, read-only collaborators for every request.
#[derive(Clone)]
pub struct AppState {
    rates: Arc<RateSchedule>,
    area_rates: Arc<AreaRateTable>,
    resolver: Arc<dyn LocationResolver>,
}

impl AppState {
    pub fn new(
        rates: RateSchedule,
        area_rates: AreaRateTable,
        resolver: impl LocationResolver + 'static,
    ) -> Self {
        Self {
            rates: Arc::new(rates),
            area_rates: Arc::new(area_rates),
            resolver: Arc::new(resolver),
        }
    }

    pub fn with_defaults(rates: RateSchedule) -> Self {
        Self::new(
            rates,
            AreaRateTable::lha_2026_27(),
            PostcodePrefixResolver::london_default(),
        )
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct ChildPayload {
    pub(crate) age: Option<u32>,
    #[serde(alias = "is_disabled")]
    pub(crate) is_disabled: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct CalculatePayload {
    #[serde(alias = "assessment_month")]
    assessment_month: Option<NaiveDate>,
    #[serde(alias = "claimant_type")]
    claimant_type: Option<String>,
    #[serde(alias = "claimant_age")]
    claimant_age: Option<u32>,
    #[serde(alias = "partner_age")]
    partner_age: Option<u32>,
    pub(crate) children: Vec<ChildPayload>,

    #[serde(alias = "monthly_rent")]
    monthly_rent: Option<Decimal>,
    #[serde(alias = "brma_code")]
    brma_code: Option<String>,
    #[serde(alias = "bedrooms_needed")]
    bedrooms_needed: Option<u32>,

    #[serde(alias = "monthly_earnings")]
    monthly_earnings: Option<Decimal>,
    #[serde(alias = "partner_monthly_earnings")]
    partner_monthly_earnings: Option<Decimal>,

    #[serde(alias = "has_childcare_costs")]
    has_childcare_costs: bool,
    #[serde(alias = "monthly_childcare_costs")]
    monthly_childcare_costs: Option<Decimal>,
    #[serde(alias = "has_disability")]
    has_disability: bool,
    #[serde(alias = "is_carer")]
    is_carer: bool,
}

#[derive(Debug)]
struct CalculateRequest {
    assessment_month: Option<NaiveDate>,
    circumstances: Circumstances,
    brma_code: Option<String>,
    notices: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CalculateResponse {
    policy_year: String,
    assessment_month: Option<NaiveDate>,
    calculated_at: NaiveDate,
    claimant_type: Arrangement,
    claimant_age: u32,
    brma_code: Option<String>,
    #[serde(with = "rust_decimal::serde::float_option")]
    lha_rate_applied: Option<Decimal>,
    #[serde(flatten)]
    breakdown: EntitlementBreakdown,
    notices: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct BedroomsQuery {
    #[serde(default = "default_bedrooms")]
    bedrooms: u32,
}

fn default_bedrooms() -> u32 {
    1
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LhaRateResponse {
    brma_code: String,
    bedrooms: u32,
    #[serde(with = "rust_decimal::serde::float")]
    monthly_rate: Decimal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LhaRatesResponse<'a> {
    brma_code: String,
    rates: &'a RateSet,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PostcodeLookupResponse {
    postcode: String,
    brma_code: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse<'a> {
    status: &'static str,
    policy_year: &'a str,
    areas: Vec<&'a str>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn require_amount(name: &str, value: Option<Decimal>) -> Result<Decimal, String> {
    let value = value.unwrap_or(Decimal::ZERO);
    if value < Decimal::ZERO {
        return Err(format!("{name} must be >= 0"));
    }
    if value > MAX_MONEY_AMOUNT {
        return Err(format!("{name} must be at most {MAX_MONEY_AMOUNT}"));
    }
    Ok(value)
}

fn build_request(
    payload: CalculatePayload,
    area_rates: &AreaRateTable,
) -> Result<CalculateRequest, String> {
    let Some(claimant_type) = payload.claimant_type else {
        return Err("claimantType is required".to_string());
    };
    let arrangement = claimant_type
        .parse::<Arrangement>()
        .map_err(|e| e.to_string())?;

    let Some(claimant_age) = payload.claimant_age else {
        return Err("claimantAge is required".to_string());
    };
    if !(MIN_CLAIMANT_AGE..=MAX_CLAIMANT_AGE).contains(&claimant_age) {
        return Err(format!(
            "claimantAge must be between {MIN_CLAIMANT_AGE} and {MAX_CLAIMANT_AGE}"
        ));
    }

    if let Some(partner_age) = payload.partner_age {
        if !(MIN_CLAIMANT_AGE..=MAX_CLAIMANT_AGE).contains(&partner_age) {
            return Err(format!(
                "partnerAge must be between {MIN_CLAIMANT_AGE} and {MAX_CLAIMANT_AGE}"
            ));
        }
    }
    if arrangement == Arrangement::Joint && payload.partner_age.is_none() {
        return Err("partnerAge is required for a joint claim".to_string());
    }

    let mut dependents = Vec::with_capacity(payload.children.len());
    for (idx, child) in payload.children.iter().enumerate() {
        let Some(age) = child.age else {
            return Err(format!("children[{idx}].age is required"));
        };
        if age > MAX_DEPENDENT_AGE {
            return Err(format!(
                "children[{idx}].age must be between 0 and {MAX_DEPENDENT_AGE}"
            ));
        }
        dependents.push(Dependent {
            age,
            is_disabled: child.is_disabled,
        });
    }

    let bedrooms = payload.bedrooms_needed.unwrap_or(MIN_BEDROOMS_NEEDED);
    if !(MIN_BEDROOMS_NEEDED..=MAX_BEDROOMS_NEEDED).contains(&bedrooms) {
        return Err(format!(
            "bedroomsNeeded must be between {MIN_BEDROOMS_NEEDED} and {MAX_BEDROOMS_NEEDED}"
        ));
    }

    let monthly_rent = require_amount("monthlyRent", payload.monthly_rent)?;
    let claimant_earnings = require_amount("monthlyEarnings", payload.monthly_earnings)?;
    let partner_earnings =
        require_amount("partnerMonthlyEarnings", payload.partner_monthly_earnings)?;
    let childcare_costs = require_amount("monthlyChildcareCosts", payload.monthly_childcare_costs)?;

    let brma_code = payload
        .brma_code
        .map(|code| code.trim().to_string())
        .filter(|code| !code.is_empty());
    let mut notices = Vec::new();
    let rent_cap = match brma_code.as_deref() {
        Some(code) => {
            let rate = area_rates.lookup_rate(code, bedrooms);
            if rate.is_none() {
                warn!(brma_code = code, bedrooms, "LHA rate unavailable; using actual rent");
                notices.push(format!(
                    "LHA rate unavailable for BRMA {code}; housing element uses actual rent"
                ));
            }
            rate
        }
        None => None,
    };

    Ok(CalculateRequest {
        assessment_month: payload.assessment_month,
        circumstances: Circumstances {
            arrangement,
            claimant_age,
            partner_age: payload.partner_age,
            dependents,
            claimant_earnings,
            partner_earnings,
            monthly_rent,
            rent_cap,
            has_disability: payload.has_disability,
            is_carer: payload.is_carer,
            has_childcare_costs: payload.has_childcare_costs,
            childcare_costs,
        },
        brma_code,
        notices,
    })
}

pub(crate) fn calculate(
    payload: CalculatePayload,
    rates: &RateSchedule,
    area_rates: &AreaRateTable,
) -> Result<CalculateResponse, String> {
    let request = build_request(payload, area_rates)?;
    let breakdown = compute(&request.circumstances, rates).map_err(|e| e.to_string())?;

    Ok(CalculateResponse {
        policy_year: rates.policy_year.clone(),
        assessment_month: request.assessment_month,
        calculated_at: Utc::now().date_naive(),
        claimant_type: request.circumstances.arrangement,
        claimant_age: request.circumstances.claimant_age,
        brma_code: request.brma_code,
        lha_rate_applied: request.circumstances.rent_cap,
        breakdown,
        notices: request.notices,
    })
}

/// Runs one calculation from a JSON circumstances document and returns the
/// pretty-printed breakdown.
pub fn calculate_json(
    raw: &str,
    rates: &RateSchedule,
    area_rates: &AreaRateTable,
) -> Result<String, String> {
    let payload = serde_json::from_str::<CalculatePayload>(raw)
        .map_err(|e| format!("Invalid calculation JSON payload: {e}"))?;
    let response = calculate(payload, rates, area_rates)?;
    serde_json::to_string_pretty(&response).map_err(|e| format!("Failed to encode result: {e}"))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/uc/calculate", post(calculate_handler))
        .route("/api/uc/lha-rate/:brma_code", get(lha_rate_handler))
        .route("/api/uc/lha-rates/:brma_code", get(lha_rates_handler))
        .route("/api/uc/lookup-postcode/:postcode", post(lookup_postcode_handler))
        .fallback(not_found_handler)
        .with_state(state)
}

pub async fn run_http_server(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let policy_year = state.rates.policy_year.clone();
    let app = router(state);

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, %policy_year, "entitlement HTTP API listening");

    axum::serve(listener, app).await
}

async fn health_handler(State(state): State<AppState>) -> Response {
    json_response(
        StatusCode::OK,
        HealthResponse {
            status: "ok",
            policy_year: &state.rates.policy_year,
            areas: state.area_rates.area_ids().collect(),
        },
    )
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn calculate_handler(
    State(state): State<AppState>,
    payload: Result<Json<CalculatePayload>, JsonRejection>,
) -> Response {
    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(rejection) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                &format!("Invalid calculation JSON payload: {}", rejection.body_text()),
            );
        }
    };

    match calculate(payload, &state.rates, &state.area_rates) {
        Ok(response) => {
            info!(
                claimant_type = %response.claimant_type,
                total = %response.breakdown.total_entitlement,
                "calculation completed"
            );
            json_response(StatusCode::OK, response)
        }
        Err(msg) => {
            warn!(error = %msg, "calculation rejected");
            error_response(StatusCode::BAD_REQUEST, &msg)
        }
    }
}

async fn lha_rate_handler(
    State(state): State<AppState>,
    Path(brma_code): Path<String>,
    Query(query): Query<BedroomsQuery>,
) -> Response {
    match state.area_rates.lookup_rate(&brma_code, query.bedrooms) {
        Some(monthly_rate) => json_response(
            StatusCode::OK,
            LhaRateResponse {
                brma_code,
                bedrooms: query.bedrooms,
                monthly_rate,
            },
        ),
        None => error_response(
            StatusCode::NOT_FOUND,
            &format!("LHA rate not found for BRMA {brma_code}"),
        ),
    }
}

async fn lha_rates_handler(
    State(state): State<AppState>,
    Path(brma_code): Path<String>,
) -> Response {
    match state.area_rates.lookup_all_rates(&brma_code) {
        Some(rates) => json_response(StatusCode::OK, LhaRatesResponse { brma_code, rates }),
        None => error_response(
            StatusCode::NOT_FOUND,
            &format!("BRMA {brma_code} not found"),
        ),
    }
}

async fn lookup_postcode_handler(
    State(state): State<AppState>,
    Path(postcode): Path<String>,
) -> Response {
    match state.resolver.resolve(&postcode) {
        Some(brma_code) => json_response(
            StatusCode::OK,
            PostcodeLookupResponse {
                postcode,
                brma_code,
            },
        ),
        None => error_response(
            StatusCode::NOT_FOUND,
            &format!("Could not find BRMA for postcode {postcode}"),
        ),
    }
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
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use rust_decimal_macros::dec;
    use serde_json::Value;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        AppState::with_defaults(RateSchedule::uc_2026_27())
    }

    fn payload_from_json(json: &str) -> CalculatePayload {
        serde_json::from_str(json).expect("json should parse")
    }

    async fn send(request: Request<Body>) -> (StatusCode, Value) {
        let response = router(test_state())
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).map(|v| v.as_bytes()),
            Some(&b"no-store"[..])
        );
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        let body = serde_json::from_slice(&bytes).expect("body should be JSON");
        (status, body)
    }

    fn post_json(uri: &str, json: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .expect("valid request")
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("valid request")
    }

    #[test]
    fn build_request_parses_web_and_snake_case_keys() {
        let table = AreaRateTable::lha_2026_27();
        let payload = payload_from_json(
            r#"{
              "claimantType": "joint",
              "claimantAge": 31,
              "partner_age": 29,
              "children": [{"age": 8}, {"age": 5, "isDisabled": true}],
              "monthlyRent": 900.50,
              "monthly_earnings": 1200,
              "partnerMonthlyEarnings": 100.25,
              "has_childcare_costs": true,
              "monthlyChildcareCosts": 250,
              "isCarer": true
            }"#,
        );
        let request = build_request(payload, &table).expect("valid payload");
        let c = request.circumstances;

        assert_eq!(c.arrangement, Arrangement::Joint);
        assert_eq!(c.claimant_age, 31);
        assert_eq!(c.partner_age, Some(29));
        assert_eq!(c.dependents, vec![Dependent::new(8), Dependent::disabled(5)]);
        assert_eq!(c.monthly_rent, dec!(900.50));
        assert_eq!(c.claimant_earnings, dec!(1200));
        assert_eq!(c.partner_earnings, dec!(100.25));
        assert_eq!(c.childcare_costs, dec!(250));
        assert!(c.has_childcare_costs);
        assert!(c.is_carer);
        assert!(!c.has_disability);
        assert_eq!(c.rent_cap, None);
        assert!(request.notices.is_empty());
    }

    #[test]
    fn build_request_rejects_unknown_claimant_type() {
        let table = AreaRateTable::lha_2026_27();
        let payload = payload_from_json(r#"{"claimantType": "household", "claimantAge": 30}"#);
        let err = build_request(payload, &table).expect_err("must reject claimant type");
        assert!(err.contains("invalid claimant type"));
    }

    #[test]
    fn build_request_requires_partner_age_for_joint_claims() {
        let table = AreaRateTable::lha_2026_27();
        let payload = payload_from_json(r#"{"claimantType": "joint", "claimantAge": 30}"#);
        let err = build_request(payload, &table).expect_err("must require partner age");
        assert!(err.contains("partnerAge"));
    }

    #[test]
    fn build_request_rejects_out_of_range_values() {
        let table = AreaRateTable::lha_2026_27();
        for (json, field) in [
            (r#"{"claimantType": "single", "claimantAge": 15}"#, "claimantAge"),
            (r#"{"claimantType": "single", "claimantAge": 121}"#, "claimantAge"),
            (
                r#"{"claimantType": "joint", "claimantAge": 30, "partnerAge": 12}"#,
                "partnerAge",
            ),
            (
                r#"{"claimantType": "single", "claimantAge": 30, "children": [{"age": 21}]}"#,
                "children[0].age",
            ),
            (
                r#"{"claimantType": "single", "claimantAge": 30, "children": [{"isDisabled": true}]}"#,
                "children[0].age",
            ),
            (
                r#"{"claimantType": "single", "claimantAge": 30, "bedroomsNeeded": 6}"#,
                "bedroomsNeeded",
            ),
            (
                r#"{"claimantType": "single", "claimantAge": 30, "monthlyRent": -5}"#,
                "monthlyRent",
            ),
            (
                r#"{"claimantType": "single", "claimantAge": 30, "monthlyEarnings": -0.01}"#,
                "monthlyEarnings",
            ),
            (
                r#"{"claimantType": "single", "claimantAge": 30, "partnerMonthlyEarnings": "1000000000000.01"}"#,
                "partnerMonthlyEarnings",
            ),
        ] {
            let err = build_request(payload_from_json(json), &table)
                .expect_err("must reject out-of-range payload");
            assert!(err.contains(field), "expected {field} in {err}");
        }
    }

    #[test]
    fn build_request_resolves_rent_cap_from_brma_and_bedrooms() {
        let table = AreaRateTable::lha_2026_27();
        let payload = payload_from_json(
            r#"{"claimantType": "single", "claimantAge": 30, "monthlyRent": 1500,
                "brmaCode": "E09000002", "bedroomsNeeded": 2}"#,
        );
        let request = build_request(payload, &table).expect("valid payload");
        assert_eq!(request.circumstances.rent_cap, Some(dec!(1350.00)));
        assert_eq!(request.brma_code.as_deref(), Some("E09000002"));
    }

    #[test]
    fn build_request_falls_back_to_actual_rent_for_unknown_brma() {
        let table = AreaRateTable::lha_2026_27();
        let payload = payload_from_json(
            r#"{"claimantType": "single", "claimantAge": 30, "monthlyRent": 900,
                "brmaCode": "INVALID"}"#,
        );
        let request = build_request(payload, &table).expect("valid payload");
        assert_eq!(request.circumstances.rent_cap, None);
        assert_eq!(request.notices.len(), 1);
        assert!(request.notices[0].contains("INVALID"));
    }

    #[test]
    fn calculate_json_emits_breakdown_fields_as_numbers() {
        let json = calculate_json(
            r#"{"claimant_type": "single", "claimant_age": 22, "monthly_rent": 500}"#,
            &RateSchedule::uc_2026_27(),
            &AreaRateTable::lha_2026_27(),
        )
        .expect("calculation succeeds");
        let value: Value = serde_json::from_str(&json).expect("output is JSON");

        assert_eq!(value["claimantType"], "single");
        assert_eq!(value["policyYear"], "2026-27");
        assert_eq!(value["standardAllowance"], 338.58);
        assert_eq!(value["housingElement"], 500.0);
        assert_eq!(value["totalEntitlement"], 838.58);
        assert_eq!(value["lhaRateApplied"], Value::Null);
        for key in [
            "childElement",
            "childcareElement",
            "disabilityElement",
            "carerElement",
            "grossEntitlement",
            "workAllowance",
            "totalEarnings",
            "earningsDeduction",
        ] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
    }

    #[test]
    fn calculate_json_reports_malformed_input() {
        let err = calculate_json(
            "{not json",
            &RateSchedule::uc_2026_27(),
            &AreaRateTable::lha_2026_27(),
        )
        .expect_err("must reject malformed JSON");
        assert!(err.contains("Invalid calculation JSON payload"));
    }

    #[test]
    fn calculate_json_rejects_amounts_beyond_the_money_bound() {
        let rates = RateSchedule::uc_2026_27();
        let table = AreaRateTable::lha_2026_27();

        let err = calculate_json(
            r#"{"claimantType": "single", "claimantAge": 30,
                "monthlyRent": "79228162514264337593543950335"}"#,
            &rates,
            &table,
        )
        .expect_err("must reject rent beyond the bound");
        assert!(err.contains("monthlyRent"), "unexpected error {err}");

        let err = calculate_json(
            r#"{"claimantType": "joint", "claimantAge": 30, "partnerAge": 30,
                "monthlyEarnings": "79228162514264337593543950335",
                "partnerMonthlyEarnings": 1}"#,
            &rates,
            &table,
        )
        .expect_err("must reject earnings beyond the bound");
        assert!(err.contains("monthlyEarnings"), "unexpected error {err}");

        assert!(
            calculate_json(
                r#"{"claimantType": "single", "claimantAge": 30, "monthlyRent": 1e40}"#,
                &rates,
                &table,
            )
            .is_err()
        );
    }

    #[test]
    fn calculate_json_accepts_amounts_at_the_money_bound() {
        let json = calculate_json(
            r#"{"claimantType": "joint", "claimantAge": 30, "partnerAge": 30,
                "monthlyRent": "1000000000000",
                "monthlyEarnings": "1000000000000",
                "partnerMonthlyEarnings": "1000000000000",
                "children": [{"age": 3}], "monthlyChildcareCosts": "1000000000000"}"#,
            &RateSchedule::uc_2026_27(),
            &AreaRateTable::lha_2026_27(),
        )
        .expect("bounded amounts compute");
        let value: Value = serde_json::from_str(&json).expect("output is JSON");
        assert_eq!(value["housingElement"], 1_000_000_000_000.0);
        assert_eq!(value["totalEntitlement"], 0.0);
    }

    #[test]
    fn calculate_json_echoes_assessment_month() {
        let rates = RateSchedule::uc_2026_27();
        let table = AreaRateTable::lha_2026_27();
        let json = calculate_json(
            r#"{"claimantType": "single", "claimantAge": 30, "monthlyRent": 500,
                "assessment_month": "2026-02-01"}"#,
            &rates,
            &table,
        )
        .expect("calculation succeeds");
        let value: Value = serde_json::from_str(&json).expect("output is JSON");
        assert_eq!(value["assessmentMonth"], "2026-02-01");
        let calculated_at = value["calculatedAt"].as_str().expect("calculatedAt string");
        assert!(NaiveDate::parse_from_str(calculated_at, "%Y-%m-%d").is_ok());

        let json = calculate_json(
            r#"{"claimantType": "single", "claimantAge": 30}"#,
            &rates,
            &table,
        )
        .expect("calculation succeeds");
        let value: Value = serde_json::from_str(&json).expect("output is JSON");
        assert_eq!(value["assessmentMonth"], Value::Null);

        let err = calculate_json(
            r#"{"claimantType": "single", "claimantAge": 30, "assessmentMonth": "February"}"#,
            &rates,
            &table,
        )
        .expect_err("must reject a malformed month");
        assert!(err.contains("Invalid calculation JSON payload"));
    }

    #[tokio::test]
    async fn calculate_endpoint_applies_lha_cap() {
        let (status, body) = send(post_json(
            "/api/uc/calculate",
            r#"{"claimantType": "single", "claimantAge": 30, "monthlyRent": 1500,
                "brmaCode": "E09000002", "bedroomsNeeded": 1}"#,
        ))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["housingElement"], 1100.0);
        assert_eq!(body["lhaRateApplied"], 1100.0);
        assert_eq!(body["brmaCode"], "E09000002");
        assert_eq!(body["totalEntitlement"], 1524.9);
    }

    #[tokio::test]
    async fn calculate_endpoint_with_children_and_earnings() {
        let (status, body) = send(post_json(
            "/api/uc/calculate",
            r#"{"claimant_type": "single", "claimant_age": 30, "monthly_rent": 600,
                "monthly_earnings": 500,
                "children": [{"age": 8, "is_disabled": false}, {"age": 5, "is_disabled": false}]}"#,
        ))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["childElement"], 521.94);
        assert_eq!(body["workAllowance"], 290.0);
        assert_eq!(body["earningsDeduction"], 115.5);
    }

    #[tokio::test]
    async fn calculate_endpoint_rejects_invalid_input_with_json_error() {
        let (status, body) = send(post_json(
            "/api/uc/calculate",
            r#"{"claimantType": "joint", "claimantAge": 30}"#,
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().expect("error string").contains("partnerAge"));

        let (status, body) = send(post_json("/api/uc/calculate", "[1, 2")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(
            body["error"]
                .as_str()
                .expect("error string")
                .starts_with("Invalid calculation JSON payload")
        );
    }

    #[tokio::test]
    async fn calculate_endpoint_rejects_oversized_amounts_with_bad_request() {
        let (status, body) = send(post_json(
            "/api/uc/calculate",
            r#"{"claimantType": "single", "claimantAge": 30,
                "monthlyRent": "79228162514264337593543950335"}"#,
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().expect("error string").contains("monthlyRent"));

        let (status, body) = send(post_json(
            "/api/uc/calculate",
            r#"{"claimantType": "single", "claimantAge": 30, "monthlyRent": 500,
                "children": [{"age": 4}],
                "monthlyChildcareCosts": "1000000000000.01"}"#,
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(
            body["error"]
                .as_str()
                .expect("error string")
                .contains("monthlyChildcareCosts")
        );
    }

    #[tokio::test]
    async fn calculate_endpoint_echoes_assessment_month() {
        let (status, body) = send(post_json(
            "/api/uc/calculate",
            r#"{"claimantType": "single", "claimantAge": 30, "monthlyRent": 500,
                "assessmentMonth": "2026-03-01"}"#,
        ))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["assessmentMonth"], "2026-03-01");
        assert!(body["calculatedAt"].is_string());
    }

    #[tokio::test]
    async fn lha_rate_endpoint_defaults_to_one_bedroom() {
        let (status, body) = send(get("/api/uc/lha-rate/E09000002")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["bedrooms"], 1);
        assert_eq!(body["monthlyRate"], 1100.0);

        let (status, body) = send(get("/api/uc/lha-rate/E08000032?bedrooms=6")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["monthlyRate"], 1150.0);
    }

    #[tokio::test]
    async fn lha_endpoints_return_not_found_for_unknown_brma() {
        let (status, body) = send(get("/api/uc/lha-rate/INVALID?bedrooms=2")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "LHA rate not found for BRMA INVALID");

        let (status, _) = send(get("/api/uc/lha-rates/INVALID")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn lha_rates_endpoint_lists_all_bands() {
        let (status, body) = send(get("/api/uc/lha-rates/E92000001")).await;
        assert_eq!(status, StatusCode::OK);
        let rates = &body["rates"];
        assert_eq!(rates["brmaName"], "North Yorkshire");
        assert_eq!(rates["studioRate"], 600.0);
        assert_eq!(rates["fourBedRate"], 1200.0);
    }

    #[tokio::test]
    async fn postcode_lookup_endpoint_uses_resolver() {
        let (status, body) = send(post_json("/api/uc/lookup-postcode/SW1A1AA", "")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["brmaCode"], "E09000002");

        let (status, _) = send(post_json("/api/uc/lookup-postcode/LS14DY", "")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn health_and_fallback_routes() {
        let (status, body) = send(get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["policyYear"], "2026-27");
        assert_eq!(body["areas"].as_array().map(Vec::len), Some(4));

        let (status, body) = send(get("/nope")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Not found");
    }
}
