//! Run command handler: executes the node over a batch file.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde_json::{Map, Value};
use tracing::info;

use waba_node::config::Config;
use waba_node::node::description::required_parameters;
use waba_node::node::NodeParameters;
use waba_node::{InputRecord, OutputRecord, WabaError, WabaNode};

/// Read a batch file: a JSON array of input records.
fn read_batch(path: &Path) -> Result<Vec<InputRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Input file {} is not a JSON array of records", path.display()))
}

/// Read the shared parameter defaults: a JSON object.
fn read_params(path: &Path) -> Result<Map<String, Value>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read params file {}", path.display()))?;
    match serde_json::from_str(&content)
        .with_context(|| format!("Params file {} is not valid JSON", path.display()))?
    {
        Value::Object(map) => Ok(map),
        _ => bail!("Params file {} must contain a JSON object", path.display()),
    }
}

/// Hint naming the required parameters of the item a parameter error came from.
fn parameter_hint(err: &WabaError, items: &[InputRecord]) -> Option<String> {
    let WabaError::Item { index, source } = err else {
        return None;
    };
    if !matches!(source.as_ref(), WabaError::Parameter(_)) {
        return None;
    }
    let (_, operation) = NodeParameters::selection(&items.get(*index)?.parameters).ok()?;
    let required = required_parameters(operation);
    if required.is_empty() {
        return None;
    }
    Some(format!("{} requires: {}", operation, required.join(", ")))
}

fn render(records: &[OutputRecord]) -> Result<String> {
    serde_json::to_string_pretty(records).context("Failed to serialize output records")
}

/// Execute a batch and print or write the output records.
pub(crate) async fn cmd_run(
    input: PathBuf,
    params: Option<PathBuf>,
    output: Option<PathBuf>,
    continue_on_fail: bool,
) -> Result<()> {
    let config = Config::load().context("Failed to load config")?;
    config
        .credentials
        .validate()
        .context("WABA credentials are incomplete")?;

    let mut items = read_batch(&input)?;
    if let Some(path) = params {
        let defaults = read_params(&path)?;
        for item in &mut items {
            item.merge_defaults(&defaults);
        }
    }

    let node = WabaNode::new(config.credentials)
        .continue_on_fail(continue_on_fail || config.node.continue_on_fail);
    let records = match node.execute(&items).await {
        Ok(records) => records,
        Err(e) => {
            let hint = parameter_hint(&e, &items);
            return Err(match hint {
                Some(hint) => anyhow::Error::new(e).context(hint),
                None => e.into(),
            });
        }
    };
    let rendered = render(&records)?;

    match output {
        Some(path) => {
            std::fs::write(&path, rendered)
                .with_context(|| format!("Failed to write output file {}", path.display()))?;
            info!(records = records.len(), path = %path.display(), "Output written");
        }
        None => println!("{}", rendered),
    }

    Ok(())
}
