//! Tool definitions and handlers.
//!
//! Handlers return `Err` with a user-facing message for tool-level failures;
//! the server wraps either outcome into a `tools/call` result.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::protocol::ToolDefinition;
use crate::api::{CalculatePayload, ChildPayload, calculate};
use crate::core::{AreaRateTable, RateSchedule, RateSet};

pub const CALCULATE_UC: &str = "calculate_uc";
pub const GET_LHA_RATE: &str = "get_lha_rate";
pub const LIST_LHA_RATES: &str = "list_lha_rates";

pub fn definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: CALCULATE_UC,
            description: "Calculate a monthly Universal Credit entitlement with an element-by-element breakdown",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "claimant_type": {"type": "string", "enum": ["single", "joint"], "description": "Single claimant or joint claim"},
                    "claimant_age": {"type": "integer", "minimum": 16, "maximum": 120, "description": "Age of the main claimant"},
                    "partner_age": {"type": "integer", "minimum": 16, "maximum": 120, "description": "Age of the partner (joint claims)"},
                    "num_children": {"type": "integer", "minimum": 0, "description": "Number of dependent children"},
                    "children_ages": {"type": "array", "items": {"type": "integer", "minimum": 0, "maximum": 20}, "description": "Age of each child, in order"},
                    "monthly_earnings": {"type": "number", "minimum": 0, "description": "Claimant monthly earnings"},
                    "partner_monthly_earnings": {"type": "number", "minimum": 0, "description": "Partner monthly earnings"},
                    "monthly_rent": {"type": "number", "minimum": 0, "description": "Monthly rent"},
                    "brma_code": {"type": "string", "description": "Broad Rental Market Area code used to cap housing costs"},
                    "bedrooms_needed": {"type": "integer", "minimum": 1, "maximum": 5, "default": 1, "description": "Bedrooms the household is entitled to"},
                    "has_childcare_costs": {"type": "boolean", "description": "Whether the household pays for childcare"},
                    "monthly_childcare_costs": {"type": "number", "minimum": 0, "description": "Monthly childcare costs"},
                    "has_disability": {"type": "boolean", "description": "Limited capability for work"},
                    "is_carer": {"type": "boolean", "description": "Caring for a disabled person"},
                    "assessment_month": {"type": "string", "format": "date", "description": "First day of the assessment month (YYYY-MM-DD)"}
                },
                "required": ["claimant_type", "claimant_age", "monthly_rent"]
            }),
        },
        ToolDefinition {
            name: GET_LHA_RATE,
            description: "Get the monthly Local Housing Allowance rate for an area and bedroom count",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "brma_code": {"type": "string", "description": "Broad Rental Market Area code"},
                    "bedrooms": {"type": "integer", "minimum": 0, "default": 1, "description": "Number of bedrooms"}
                },
                "required": ["brma_code"]
            }),
        },
        ToolDefinition {
            name: LIST_LHA_RATES,
            description: "List every Local Housing Allowance rate for an area",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "brma_code": {"type": "string", "description": "Broad Rental Market Area code"}
                },
                "required": ["brma_code"]
            }),
        },
    ]
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ChildrenArgs {
    num_children: Option<usize>,
    children_ages: Vec<u32>,
}

#[derive(Debug, Deserialize)]
struct LhaRateArgs {
    brma_code: String,
    #[serde(default = "default_bedrooms")]
    bedrooms: u32,
}

fn default_bedrooms() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
struct AreaArgs {
    brma_code: String,
}

#[derive(Debug, Serialize)]
struct LhaRateResult<'a> {
    brma_code: &'a str,
    bedrooms: u32,
    #[serde(with = "rust_decimal::serde::float")]
    monthly_rate: Decimal,
}

#[derive(Debug, Serialize)]
struct AreaRatesResult<'a> {
    brma_code: &'a str,
    rates: &'a RateSet,
}

fn invalid_arguments(tool: &str, err: serde_json::Error) -> String {
    format!("Invalid arguments for {tool}: {err}")
}

fn encode<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("Failed to encode result: {e}"))
}

pub fn calculate_uc(
    arguments: Value,
    rates: &RateSchedule,
    area_rates: &AreaRateTable,
) -> Result<String, String> {
    for field in ["claimant_type", "claimant_age", "monthly_rent"] {
        if arguments.get(field).is_none_or(Value::is_null) {
            return Err(format!("{field} is required"));
        }
    }

    let children: ChildrenArgs = serde_json::from_value(arguments.clone())
        .map_err(|e| invalid_arguments(CALCULATE_UC, e))?;
    let mut payload: CalculatePayload =
        serde_json::from_value(arguments).map_err(|e| invalid_arguments(CALCULATE_UC, e))?;

    let count = children.num_children.unwrap_or(children.children_ages.len());
    if children.children_ages.len() < count {
        return Err(format!(
            "children_ages lists {} ages but num_children is {count}",
            children.children_ages.len()
        ));
    }
    payload.children = children
        .children_ages
        .into_iter()
        .take(count)
        .map(|age| ChildPayload {
            age: Some(age),
            is_disabled: false,
        })
        .collect();

    let response = calculate(payload, rates, area_rates)?;
    encode(&response)
}

pub fn get_lha_rate(arguments: Value, area_rates: &AreaRateTable) -> Result<String, String> {
    let args: LhaRateArgs =
        serde_json::from_value(arguments).map_err(|e| invalid_arguments(GET_LHA_RATE, e))?;
    let brma_code = args.brma_code.trim();

    match area_rates.lookup_rate(brma_code, args.bedrooms) {
        Some(monthly_rate) => encode(&LhaRateResult {
            brma_code,
            bedrooms: args.bedrooms,
            monthly_rate,
        }),
        None => Err(format!(
            "LHA rate not found for BRMA {brma_code} with {} bedroom(s)",
            args.bedrooms
        )),
    }
}

pub fn list_lha_rates(arguments: Value, area_rates: &AreaRateTable) -> Result<String, String> {
    let args: AreaArgs =
        serde_json::from_value(arguments).map_err(|e| invalid_arguments(LIST_LHA_RATES, e))?;
    let brma_code = args.brma_code.trim();

    match area_rates.lookup_all_rates(brma_code) {
        Some(rates) => encode(&AreaRatesResult { brma_code, rates }),
        None => Err(format!("BRMA {brma_code} not found")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Value {
        serde_json::from_str(text).expect("tool output is JSON")
    }

    #[test]
    fn definitions_require_the_documented_fields() {
        let defs = definitions();
        let names: Vec<_> = defs.iter().map(|d| d.name).collect();
        assert_eq!(names, [CALCULATE_UC, GET_LHA_RATE, LIST_LHA_RATES]);
        assert_eq!(
            defs[0].input_schema["required"],
            json!(["claimant_type", "claimant_age", "monthly_rent"])
        );
        assert_eq!(defs[1].input_schema["required"], json!(["brma_code"]));
    }

    #[test]
    fn calculate_uc_builds_children_from_ages() {
        let text = calculate_uc(
            json!({
                "claimant_type": "single",
                "claimant_age": 30,
                "monthly_rent": 600,
                "num_children": 2,
                "children_ages": [8, 5, 3],
                "monthly_earnings": 500
            }),
            &RateSchedule::uc_2026_27(),
            &AreaRateTable::lha_2026_27(),
        )
        .expect("valid arguments");
        let value = parse(&text);

        assert_eq!(value["childElement"], 521.94);
        assert_eq!(value["earningsDeduction"], 115.5);
        assert_eq!(value["claimantType"], "single");
    }

    #[test]
    fn calculate_uc_without_num_children_uses_every_age() {
        let text = calculate_uc(
            json!({
                "claimant_type": "single",
                "claimant_age": 30,
                "monthly_rent": 0,
                "children_ages": [4]
            }),
            &RateSchedule::uc_2026_27(),
            &AreaRateTable::lha_2026_27(),
        )
        .expect("valid arguments");
        assert_eq!(parse(&text)["childElement"], 284.89);
    }

    #[test]
    fn calculate_uc_rejects_missing_and_inconsistent_arguments() {
        let rates = RateSchedule::uc_2026_27();
        let table = AreaRateTable::lha_2026_27();

        let err = calculate_uc(
            json!({"claimant_type": "single", "claimant_age": 30}),
            &rates,
            &table,
        )
        .expect_err("monthly_rent is required");
        assert_eq!(err, "monthly_rent is required");

        let err = calculate_uc(
            json!({
                "claimant_type": "single",
                "claimant_age": 30,
                "monthly_rent": 500,
                "num_children": 3,
                "children_ages": [1]
            }),
            &rates,
            &table,
        )
        .expect_err("ages must cover every child");
        assert!(err.contains("num_children"));

        let err = calculate_uc(
            json!({
                "claimant_type": "single",
                "claimant_age": 30,
                "monthly_rent": "79228162514264337593543950335"
            }),
            &rates,
            &table,
        )
        .expect_err("rent beyond the money bound");
        assert!(err.contains("monthlyRent"));

        let err = calculate_uc(
            json!({"claimant_type": "single", "claimant_age": "thirty", "monthly_rent": 500}),
            &rates,
            &table,
        )
        .expect_err("age must be numeric");
        assert!(err.starts_with("Invalid arguments for calculate_uc"));
    }

    #[test]
    fn get_lha_rate_defaults_to_one_bedroom() {
        let table = AreaRateTable::lha_2026_27();
        let value = parse(&get_lha_rate(json!({"brma_code": "E09000002"}), &table).expect("found"));
        assert_eq!(value["brma_code"], "E09000002");
        assert_eq!(value["bedrooms"], 1);
        assert_eq!(value["monthly_rate"], 1100.0);

        let err = get_lha_rate(json!({"brma_code": "INVALID", "bedrooms": 2}), &table)
            .expect_err("unknown area");
        assert_eq!(err, "LHA rate not found for BRMA INVALID with 2 bedroom(s)");
    }

    #[test]
    fn list_lha_rates_reports_every_band() {
        let table = AreaRateTable::lha_2026_27();
        let value = parse(&list_lha_rates(json!({"brma_code": "E92000001"}), &table).expect("found"));
        assert_eq!(value["rates"]["studioRate"], 600.0);
        assert_eq!(value["rates"]["fourBedRate"], 1200.0);

        let err = list_lha_rates(json!({"brma_code": "NOPE"}), &table).expect_err("unknown area");
        assert_eq!(err, "BRMA NOPE not found");

        let err = list_lha_rates(json!({}), &table).expect_err("brma_code is required");
        assert!(err.contains("brma_code"));
    }
}
