//! The `predict` command: gather input, run the workflow, render the outcome

use anyhow::{bail, Context, Result};
use colored::Colorize;
use predict_lib::{
    ApiClient, PredictionResponse, PredictionWorkflow, SubmitOutcome, ValidationReport,
    FEATURE_COUNT,
};
use serde_json::json;
use std::path::PathBuf;

use crate::output::{color_confidence, color_label, print_heading, print_json, OutputFormat};

/// How many validation messages are listed before summarising the rest
const SHOWN_VALIDATION_ERRORS: usize = 5;

/// Where the initial 30 values come from
#[derive(Debug, Clone, PartialEq)]
pub enum InputSource {
    Empty,
    Example,
    Values(String),
    File(PathBuf),
}

/// One `--set N=VALUE` edit, 1-based
#[derive(Debug, Clone, PartialEq)]
pub struct FieldEdit {
    pub number: usize,
    pub value: String,
}

/// Parse `N=VALUE` where N is 1..=30
pub fn parse_field_edit(raw: &str) -> Result<FieldEdit, String> {
    let (number, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected N=VALUE, got {:?}", raw))?;
    let number: usize = number
        .trim()
        .parse()
        .map_err(|_| format!("invalid feature number {:?}", number))?;
    if !(1..=FEATURE_COUNT).contains(&number) {
        return Err(format!(
            "feature number must be between 1 and {}, got {}",
            FEATURE_COUNT, number
        ));
    }
    Ok(FieldEdit {
        number,
        value: value.to_string(),
    })
}

/// Run one prediction and print the result
pub async fn run_prediction(
    client: ApiClient,
    source: InputSource,
    edits: Vec<FieldEdit>,
    format: OutputFormat,
) -> Result<()> {
    let workflow = PredictionWorkflow::new(client);

    match source {
        InputSource::Empty => {}
        InputSource::Example => workflow.load_example().await,
        InputSource::Values(text) => workflow.apply_bulk(&text).await?,
        InputSource::File(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            workflow.apply_bulk(&text).await?;
        }
    }

    for edit in edits {
        workflow.set_field(edit.number - 1, edit.value).await?;
    }

    match workflow.submit().await {
        SubmitOutcome::Succeeded(response) => {
            match format {
                OutputFormat::Json => print_json(&response)?,
                OutputFormat::Table => print_result_card(&response),
            }
            Ok(())
        }
        SubmitOutcome::Invalid(report) => {
            match format {
                OutputFormat::Json => print_json(&json!({ "validation_errors": report }))?,
                OutputFormat::Table => print_validation_report(&report),
            }
            bail!("{} of {} features failed validation", report.len(), FEATURE_COUNT)
        }
        SubmitOutcome::Failed { category, error } => {
            if format == OutputFormat::Json {
                print_json(&json!({
                    "error": category.message(),
                    "status": error.status(),
                }))?;
            }
            bail!("{}", category)
        }
        SubmitOutcome::Superseded => bail!("Input changed while the prediction was running"),
        SubmitOutcome::Ignored => bail!("A prediction is already in progress"),
    }
}

fn print_result_card(response: &PredictionResponse) {
    print_heading("Prediction Result");
    println!(
        "Diagnosis:    {}",
        color_label(&response.prediction_label, response.is_malignant())
    );
    println!("Probability:  {}", response.probability_percent().bold());
    println!("Confidence:   {}", color_confidence(&response.confidence));
    println!();
    println!(
        "{}",
        format!(
            "Model {} · API {}",
            response.model_version, response.api_version
        )
        .dimmed()
    );
}

fn print_validation_report(report: &ValidationReport) {
    println!("{}", "Please fix the following errors:".yellow().bold());
    for line in report.summary(SHOWN_VALIDATION_ERRORS) {
        println!("  • {}", line);
    }
}
