//! `heritage attributes`: print the attribute model of a record kind.

use std::path::Path;

use anyhow::{anyhow, Context};
use heritage_engine::ScanConfig;
use termcolor::ColorChoice;

use crate::output::{format_value, StyledOutput};

pub fn execute(
    model: &Path,
    kind: &str,
    config: &ScanConfig,
    choice: ColorChoice,
) -> anyhow::Result<()> {
    let scanner = super::open_scanner(model, config)?;
    let registry = scanner.introspector();
    let ty = registry
        .lookup(kind)
        .ok_or_else(|| anyhow!("unknown type '{}'", kind))?;
    let attributes = scanner
        .attribute_model(ty)
        .with_context(|| format!("failed to compute attributes of {}", kind))?;

    let mut out = StyledOutput::new(choice);
    out.bold(kind);
    out.newline();
    if attributes.is_empty() {
        out.warning("  no attributes");
        out.newline();
        out.flush();
        return Ok(());
    }

    for (index, accessor) in attributes.iter().enumerate() {
        out.info(&format!("  {:>2} ", index));
        out.bold(accessor.name());
        out.plain(&format!(": {}", accessor.value_type()));
        if let Some(default) = accessor.default_value() {
            out.dim(&format!(" = {}", format_value(registry, default)));
        }
        if attributes.can_fail_on_read(index) {
            out.warning(" (deferred)");
        }
        out.newline();
    }

    let mut flags = Vec::new();
    if attributes.has_only_value_attribute() {
        flags.push("value-only");
    }
    if attributes.has_default_value_method() {
        flags.push("defaults");
    }
    if attributes.has_nested_record() {
        flags.push("nested");
    }
    if !flags.is_empty() {
        out.dim(&format!("  [{}]", flags.join(", ")));
        out.newline();
    }
    out.flush();
    Ok(())
}
