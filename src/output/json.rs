//! JSON output formatting

use serde_json::{json, Value};

use crate::output::Report;

pub fn format_json(report: &Report<'_>) -> String {
    let data: Value = match report {
        Report::Profiles(registry) => {
            let rows: serde_json::Map<String, Value> = registry
                .iter()
                .map(|(os, profile)| {
                    (
                        os.to_string(),
                        serde_json::to_value(profile).unwrap_or(json!(null)),
                    )
                })
                .collect();
            json!({ "profiles": rows })
        }
        Report::Plan(plan) => serde_json::to_value(plan).unwrap_or(json!(null)),
    };

    serde_json::to_string_pretty(&data).unwrap_or_else(|_| "{}".to_string())
}
