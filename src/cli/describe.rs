//! Describe command handler.

use anyhow::{Context, Result};

/// Print the node description, or the credential descriptor with `--credentials`.
pub(crate) fn cmd_describe(credentials: bool) -> Result<()> {
    let description = if credentials {
        serde_json::to_value(waba_node::credentials::describe())
            .context("Failed to serialize credential descriptor")?
    } else {
        waba_node::node::describe()
    };

    let rendered =
        serde_json::to_string_pretty(&description).context("Failed to render description")?;
    println!("{}", rendered);
    Ok(())
}
