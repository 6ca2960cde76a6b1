//! AWS Lambda handler for status-quo comparisons
//!
//! Accepts borrower and policy inputs as query-string parameters (or a
//! form-encoded body) and returns the comparison report as JSON.
//!
//! Supports Lambda Function URLs for direct HTTP access.

use std::time::Instant;

use aws_lambda_events::encodings::Base64Data;
use aws_lambda_events::event::lambda_function_urls::LambdaFunctionUrlRequest;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use log::{debug, info};
use serde::Serialize;
use serde_json::{json, Value};
use student_loan_model::comparison::ComparisonReport;
use student_loan_model::inputs::{inputs_to_query, parse_query_string, ParamMap};
use student_loan_model::{BorrowerPreset, BorrowerProfile, PolicyParameters, ScenarioRunner};

/// Response body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResponse {
    /// Shareable query string of the non-default inputs
    pub query: String,
    pub eligible: bool,
    pub profile: BorrowerProfile,
    pub policy: PolicyParameters,
    pub report: ComparisonReport,
    pub execution_time_ms: u64,
}

fn cors_headers() -> Value {
    json!({
        "Content-Type": "application/json",
        "Access-Control-Allow-Origin": "*",
        "Access-Control-Allow-Methods": "GET, POST, OPTIONS",
        "Access-Control-Allow-Headers": "Content-Type",
    })
}

fn http_response(status: u16, body: String) -> Value {
    json!({
        "statusCode": status,
        "headers": cors_headers(),
        "body": body,
    })
}

fn error_response(status: u16, message: &str) -> Value {
    http_response(status, json!({ "error": message }).to_string())
}

/// Form body as text; Function URLs may deliver it base64-encoded
fn decode_body(body: Option<&str>, is_base64_encoded: bool) -> Result<Option<String>, String> {
    let Some(body) = body else {
        return Ok(None);
    };
    if !is_base64_encoded {
        return Ok(Some(body.to_string()));
    }

    let Base64Data(bytes) = serde_json::from_value(Value::String(body.to_string()))
        .map_err(|e| format!("Invalid base64 body: {e}"))?;
    String::from_utf8(bytes)
        .map(Some)
        .map_err(|e| format!("Body is not UTF-8: {e}"))
}

/// Query parameters win over body parameters with the same key
fn request_params(request: &LambdaFunctionUrlRequest) -> Result<ParamMap, String> {
    let mut params = decode_body(request.body.as_deref(), request.is_base64_encoded)?
        .as_deref()
        .map(parse_query_string)
        .unwrap_or_default();
    params.extend(request.query_string_parameters.clone());
    Ok(params)
}

/// Build the comparison for one set of parameters
fn compare(runner: &ScenarioRunner, params: &ParamMap) -> Result<ComparisonResponse, String> {
    let start = Instant::now();

    let mut profile = BorrowerProfile::from_params(params);
    if let Some(name) = params.get("preset").filter(|s| !s.is_empty()) {
        let preset: BorrowerPreset = name.parse().map_err(|e| format!("{e}"))?;
        profile = preset.apply(&profile);
    }
    let policy = PolicyParameters::from_params(params);
    let end_year = params.get("endYear").and_then(|s| s.parse::<i32>().ok());

    let comparison = runner.compare_until(&profile, &policy, end_year);
    debug!("Compared {} modified years", comparison.modified.rows.len());

    Ok(ComparisonResponse {
        query: inputs_to_query(&profile, &policy),
        eligible: runner.assumptions().is_eligible_cohort(profile.graduation_year),
        report: comparison.report(),
        profile,
        policy,
        execution_time_ms: start.elapsed().as_millis() as u64,
    })
}

/// Lambda handler function
async fn handler(event: LambdaEvent<LambdaFunctionUrlRequest>) -> Result<Value, Error> {
    let request = event.payload;

    // Handle CORS preflight
    if request.request_context.http.method.as_deref() == Some("OPTIONS") {
        return Ok(http_response(200, String::new()));
    }

    let runner = ScenarioRunner::new();
    let params = match request_params(&request) {
        Ok(params) => params,
        Err(message) => return Ok(error_response(400, &message)),
    };

    match compare(&runner, &params) {
        Ok(response) => {
            info!("Comparison complete in {} ms", response.execution_time_ms);
            Ok(http_response(200, serde_json::to_string(&response)?))
        }
        Err(message) => Ok(error_response(400, &message)),
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    run(service_fn(handler)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(query: &str) -> ParamMap {
        parse_query_string(query)
    }

    #[test]
    fn test_compare_defaults() {
        let runner = ScenarioRunner::new();
        let response = compare(&runner, &params("")).unwrap();
        assert!(response.eligible);
        assert!(response.query.is_empty());
        assert!(response.report.changed_columns.is_empty());
    }

    #[test]
    fn test_compare_with_preset_and_policy() {
        let runner = ScenarioRunner::new();
        let response = compare(&runner, &params("preset=low&repaymentRate=0.06")).unwrap();
        assert_eq!(response.profile.starting_salary, 16_000.0);
        assert_eq!(response.policy.repayment_rate, 0.06);
        assert_eq!(response.query, "startingSalary=16000&repaymentRate=0.06");
    }

    #[test]
    fn test_unknown_preset_is_rejected() {
        let runner = ScenarioRunner::new();
        let err = compare(&runner, &params("preset=platinum")).unwrap_err();
        assert!(err.contains("platinum"));
    }

    #[test]
    fn test_ineligible_cohort() {
        let runner = ScenarioRunner::new();
        let response = compare(&runner, &params("graduationYear=2025")).unwrap();
        assert!(!response.eligible);
        assert!(response.report.yearly.is_empty());
        assert_eq!(response.report.modified.total_repaid, 0.0);
    }

    #[test]
    fn test_end_year_is_capped() {
        let runner = ScenarioRunner::new();
        let response = compare(&runner, &params("endYear=2000000000&writeoffYears=1000000000")).unwrap();
        assert_eq!(response.policy.writeoff_years, 100);
        assert_eq!(response.report.yearly.last().map(|r| r.year), Some(2200));
    }

    #[test]
    fn test_decode_plain_and_base64_bodies() {
        assert_eq!(decode_body(None, true).unwrap(), None);
        assert_eq!(
            decode_body(Some("startingSalary=42000"), false).unwrap().as_deref(),
            Some("startingSalary=42000")
        );

        let body = decode_body(Some("c3RhcnRpbmdTYWxhcnk9NDIwMDAmcmVwYXltZW50UmF0ZT0wLjA2"), true)
            .unwrap()
            .unwrap();
        let parsed = params(&body);
        assert_eq!(parsed.get("startingSalary").map(String::as_str), Some("42000"));
        assert_eq!(parsed.get("repaymentRate").map(String::as_str), Some("0.06"));

        assert!(decode_body(Some("not base64!"), true).is_err());
    }

    #[test]
    fn test_error_response_shape() {
        let value = error_response(400, "bad input");
        assert_eq!(value["statusCode"], 400);
        let body: Value = serde_json::from_str(value["body"].as_str().unwrap()).unwrap();
        assert_eq!(body["error"], "bad input");
    }
}
