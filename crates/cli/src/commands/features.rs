//! Feature reference listing

use anyhow::Result;
use predict_lib::{EXAMPLE_FEATURES, FEATURE_NAMES};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{print_table, OutputFormat};

/// Row for the feature table
#[derive(Tabled, Serialize)]
struct FeatureRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Feature")]
    name: &'static str,
    #[tabled(rename = "Example")]
    example: f64,
}

/// List the 30 features in wire order with the reference sample
pub fn list_features(format: OutputFormat) -> Result<()> {
    let rows: Vec<FeatureRow> = FEATURE_NAMES
        .iter()
        .zip(EXAMPLE_FEATURES.iter())
        .enumerate()
        .map(|(i, (name, example))| FeatureRow {
            index: i + 1,
            name: *name,
            example: *example,
        })
        .collect();

    print_table(&rows, format)
}
