//! Service metadata commands: info, health, model

use anyhow::{Context, Result};
use colored::Colorize;
use predict_lib::ApiClient;

use crate::output::{
    color_status, format_timestamp, print_heading, print_json, print_warning, yes_no, OutputFormat,
};

/// Show `GET /` metadata
pub async fn show_info(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let info = client
        .get_api_info()
        .await
        .context("Failed to fetch service info")?;

    match format {
        OutputFormat::Json => print_json(&info)?,
        OutputFormat::Table => {
            print_heading("Service Info");
            println!("Endpoint:     {}", client.base_url().cyan());
            println!("Message:      {}", info.message.as_deref().unwrap_or("-"));
            println!("Version:      {}", info.version.as_deref().unwrap_or("-"));
            for (key, value) in &info.extra {
                let rendered = match value {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                println!("{:<13} {}", format!("{}:", key), rendered);
            }
        }
    }

    Ok(())
}

/// Show service health
pub async fn show_health(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let health = client
        .get_health()
        .await
        .context("Failed to fetch service health")?;

    match format {
        OutputFormat::Json => print_json(&health)?,
        OutputFormat::Table => {
            print_heading("Service Health");
            println!("Status:       {}", color_status(&health.status));
            println!("Model loaded: {}", yes_no(health.model_loaded));
            println!(
                "Model:        {}",
                health.model_version.as_deref().unwrap_or("-")
            );
            if let Some(raw) = &health.promoted_at {
                let shown = health
                    .promoted_at_utc()
                    .map(format_timestamp)
                    .unwrap_or_else(|| raw.clone());
                println!("Promoted at:  {}", shown.dimmed());
            }
            if !health.model_loaded {
                println!();
                print_warning("Predictions will fail until a model is loaded");
            }
        }
    }

    Ok(())
}

/// Show active model metadata
pub async fn show_model(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let model = client
        .get_model_info()
        .await
        .context("Failed to fetch model info")?;

    match format {
        OutputFormat::Json => print_json(&model)?,
        OutputFormat::Table => {
            print_heading("Model Info");
            println!("Type:         {}", model.model_type.cyan());
            println!("Version:      {}", model.model_version);

            match model.promotion_metadata.as_ref().filter(|m| !m.is_empty()) {
                Some(meta) => {
                    println!();
                    println!("{}", "Promotion".bold());
                    println!("{}", "-".repeat(50));
                    if let Some(raw) = &meta.promoted_at {
                        let shown = meta
                            .promoted_at_utc()
                            .map(format_timestamp)
                            .unwrap_or_else(|| raw.clone());
                        println!("Promoted at:  {}", shown);
                    }
                    if let Some(by) = &meta.promoted_by {
                        println!("Promoted by:  {}", by);
                    }
                    if let Some(env) = &meta.environment {
                        println!("Environment:  {}", env);
                    }
                    if let Some(notes) = &meta.notes {
                        println!("Notes:        {}", notes);
                    }
                }
                None => println!("Promotion:    {}", "none recorded".dimmed()),
            }
        }
    }

    Ok(())
}
