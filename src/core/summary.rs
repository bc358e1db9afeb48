use crate::models::{Requester, StructuredResponse};
use crate::services::text_generation::TextGenerator;
use std::sync::Arc;

const SYSTEM_PROMPT: &str = "You are a professional assistant for employee accommodation management.";

const NOT_AVAILABLE: &str = "N/A";

fn field(value: &Option<String>) -> &str {
    value.as_deref().filter(|v| !v.trim().is_empty()).unwrap_or(NOT_AVAILABLE)
}

fn ranked(results: &[StructuredResponse]) -> Vec<&StructuredResponse> {
    let mut top: Vec<_> = results.iter().filter(|r| r.rank.is_some()).collect();
    top.sort_by_key(|r| r.rank);
    top
}

/// Deterministic summary of the top ranked options
pub fn fallback_summary(results: &[StructuredResponse], requester: &Requester) -> String {
    let top = ranked(results);

    let mut summary = format!("Accommodation search for {}\n", requester.name);
    summary.push_str(&format!("Location: {}\n", requester.location));
    summary.push_str(&format!("Start: {}\n\n", requester.start_date.format("%d.%m.%Y")));

    if top.is_empty() {
        summary.push_str("No available accommodation found.\n");
        return summary;
    }

    summary.push_str(&format!("{} available option(s) found:\n\n", top.len()));

    for result in top {
        summary.push_str(&format!("Option {}:\n", result.rank.unwrap_or_default()));
        summary.push_str(&format!("  Address: {}\n", field(&result.address)));
        summary.push_str(&format!("  Price: {}\n", field(&result.price_per_month)));
        summary.push_str(&format!("  Distance: {}\n", field(&result.distance_km)));
        if !result.warnings.is_empty() {
            summary.push_str(&format!("  Warnings: {}\n", result.warnings));
        }
        summary.push('\n');
    }

    summary
}

/// Prompt handed to the text generator for the enhanced summary
pub fn build_prompt(results: &[StructuredResponse], requester: &Requester) -> String {
    let mut options = String::new();
    for result in ranked(results) {
        options.push_str(&format!(
            "\nOption {}:\n- Address: {}\n- Price: {}\n- Distance: {}\n- Internet: {}\n- Parking: {}\n- Warnings: {}\n- Remark: {}\n",
            result.rank.unwrap_or_default(),
            field(&result.address),
            field(&result.price_per_month),
            field(&result.distance_km),
            field(&result.internet),
            field(&result.parking),
            if result.warnings.is_empty() { "None" } else { result.warnings.as_str() },
            field(&result.remark),
        ));
    }

    format!(
        "Write a professional management summary of the best accommodation options.\n\n\
         Employee: {}\n\
         Location: {}\n\
         Start: {}\n\
         Urgent: {}\n\n\
         Top options:\n{}\n\
         Write a short, clear summary with:\n\
         1. The recommended option\n\
         2. Main advantages\n\
         3. Possible concerns\n\
         4. Next steps",
        requester.name,
        requester.location,
        requester.start_date.format("%d.%m.%Y"),
        if requester.urgent { "Yes" } else { "No" },
        options,
    )
}

/// Writes the narrative summary for a ranking
///
/// With a text generator configured the summary is generated; any failure
/// falls back to the deterministic template.
#[derive(Clone, Default)]
pub struct Summarizer {
    generator: Option<Arc<dyn TextGenerator>>,
}

impl Summarizer {
    pub fn new(generator: Option<Arc<dyn TextGenerator>>) -> Self {
        Self { generator }
    }

    pub fn is_enhanced(&self) -> bool {
        self.generator.is_some()
    }

    pub async fn summarize(&self, results: &[StructuredResponse], requester: &Requester) -> String {
        let Some(generator) = &self.generator else {
            return fallback_summary(results, requester);
        };

        let prompt = build_prompt(results, requester);

        match generator.generate(SYSTEM_PROMPT, &prompt).await {
            Ok(summary) => {
                tracing::info!(requester = %requester.name, "Generated summary");
                summary
            }
            Err(e) => {
                tracing::warn!(requester = %requester.name, error = %e, "Summary generation failed, using template");
                fallback_summary(results, requester)
            }
        }
    }
}
