use anyhow::{Context, Result};
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

/// Read a JSON config file into a loosely typed value so each field can fall
/// back to its default independently.
pub fn read_partial_config(config_path: &Path) -> Result<serde_json::Value> {
    let config_json = fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config file: {:?}", config_path))?;
    serde_json::from_str(&config_json)
        .with_context(|| format!("Failed to parse config file: {:?}", config_path))
}

/// Copy `partial.<field>` into `config.<field>` when it is present and
/// parses, otherwise keep the default and say so.
#[macro_export]
macro_rules! load_or_default {
    ($partial:expr, $config:ident . $field:ident) => {
        match $partial.get(stringify!($field)) {
            Some(val) => match serde_json::from_value(val.clone()) {
                Ok(parsed) => $config.$field = parsed,
                Err(_) => log::warn!(
                    "Config Invalid value for '{}', using default: {:?}",
                    stringify!($field),
                    $config.$field
                ),
            },
            None => log::warn!(
                "Config Missing field '{}', using default: {:?}",
                stringify!($field),
                $config.$field
            ),
        }
    };
}

pub fn validate_dataset_dir(path: &str) -> Result<()> {
    let pb = PathBuf::from(path);
    if path.is_empty() {
        anyhow::bail!("No dataset directory given; set `data_dir` or pass --data_dir");
    }
    if !pb.is_dir() {
        anyhow::bail!("Dataset directory does not exist: {}", path);
    }
    Ok(())
}

pub fn validate_model_file(path: &str) -> Result<()> {
    let pb = PathBuf::from(path);
    if path.is_empty() {
        anyhow::bail!("No model file given; set `model_path` or pass --model");
    }
    if !pb.is_file() {
        anyhow::bail!("Model file does not exist: {}", path);
    }
    Ok(())
}

pub fn validate_tsv_or_csv_file(path: &Path) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase());
    match ext.as_deref() {
        Some("tsv") | Some("csv") => Ok(()),
        _ => anyhow::bail!("File must have a .tsv or .csv extension: {}", path.display()),
    }
}

/// `model.bin` + `_report.html` -> `model_report.html`, next to the model.
pub fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("whisker");
    path.with_file_name(format!("{}{}", stem, suffix))
}

pub fn write_bytes_to_file<P: AsRef<Path>>(path: P, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path.as_ref())?;
    file.write_all(bytes)?;
    Ok(())
}
