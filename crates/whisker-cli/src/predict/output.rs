use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionRow {
    pub file: String,
    pub prediction: u8,
    pub probability: f64,
}

/// Write rows as CSV, or TSV when `output_path` ends in `.tsv`.
pub fn write_predictions<P: AsRef<Path>>(rows: &[PredictionRow], output_path: P) -> Result<()> {
    let path = output_path.as_ref();
    let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("csv");
    let delimiter = match extension {
        "tsv" => b'\t',
        _ => b',',
    };

    let file = File::create(path).with_context(|| format!("Failed to create output file: {:?}", path))?;
    write_rows(rows, BufWriter::new(file), delimiter)?;
    log::info!("Wrote {} predictions to {}", rows.len(), path.display());
    Ok(())
}

pub fn print_predictions(rows: &[PredictionRow]) -> Result<()> {
    write_rows(rows, io::stdout().lock(), b',')
}

fn write_rows<W: Write>(rows: &[PredictionRow], sink: W, delimiter: u8) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(sink);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
