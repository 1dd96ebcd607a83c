//! Read-only CSV view of the record collection.
//!
//! One row per record in a fixed column order, metric columns to four
//! decimal places. This is a presentation export; it is not meant to be
//! imported back into the store.

use crate::domain::types::EvaluationRecord;
use anyhow::{Context, Result};
use std::io::Write;

const HEADERS: [&str; 13] = [
    "ID",
    "Timestamp",
    "Model",
    "Confidence",
    "Scenario",
    "GT",
    "TP",
    "FP",
    "FN",
    "Precision",
    "Recall",
    "F1",
    "FAR",
];

pub fn write_csv<W: Write>(records: &[EvaluationRecord], out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);

    writer
        .write_record(HEADERS)
        .context("Failed to write CSV header")?;

    for r in records {
        writer
            .write_record(&[
                r.id.to_string(),
                r.timestamp.to_rfc3339(),
                r.model_name.clone(),
                r.confidence.to_string(),
                r.scenario.clone(),
                r.gt_total.to_string(),
                r.tp.to_string(),
                r.false_positives.to_string(),
                r.false_negatives.to_string(),
                format!("{:.4}", r.precision),
                format!("{:.4}", r.recall),
                format!("{:.4}", r.f1_score),
                format!("{:.4}", r.far),
            ])
            .context("Failed to write CSV row")?;
    }

    writer.flush().context("Failed to flush CSV output")?;
    Ok(())
}
