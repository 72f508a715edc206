use std::fs;

use anyhow::{Result, bail};
use shared::config::ClientConfig;

/// Writes the default configuration to `taskflow.yaml` or `taskflow.json`
/// in the current directory.
///
/// # Errors
/// Returns an error if the format is unsupported or if writing the file fails.
pub fn generate_config(format: &str) -> Result<()> {
    let config = ClientConfig::with_defaults();
    let (file_name, serialized) = match format {
        "yaml" => ("taskflow.yaml", serde_yml::to_string(&config)?),
        "json" => ("taskflow.json", serde_json::to_string_pretty(&config)?),
        _ => bail!("Unsupported format. Use 'yaml' or 'json'."),
    };

    fs::write(file_name, serialized)?;
    println!("Configuration file '{file_name}' generated successfully.");
    Ok(())
}
