//! `heritage scan`: print the records found at each level of a scan.

use std::path::Path;

use heritage_engine::{LevelCollector, ScanConfig, SearchStrategy};
use termcolor::ColorChoice;

use crate::element::parse_element;
use crate::output::{element_name, format_record, StyledOutput};

pub fn execute(
    model: &Path,
    element: &str,
    strategy: SearchStrategy,
    config: &ScanConfig,
    choice: ColorChoice,
) -> anyhow::Result<()> {
    let scanner = super::open_scanner(model, config)?;
    let source = parse_element(scanner.introspector(), element)?;
    let levels = scanner
        .scan(&(), source, strategy, &mut LevelCollector::new())
        .unwrap_or_default();

    let mut out = StyledOutput::new(choice);
    out.bold(&element_name(scanner.introspector(), source));
    out.dim(&format!(" ({})", strategy));
    out.newline();

    if levels.is_empty() {
        out.warning("  no records found");
        out.newline();
    }
    for level in &levels {
        out.info(&format!("  [{}] ", level.aggregate_index));
        out.plain(&element_name(scanner.introspector(), level.source));
        out.newline();
        for record in &level.records {
            out.plain("      ");
            out.success(&format_record(scanner.introspector(), record));
            out.newline();
        }
    }
    out.flush();
    Ok(())
}
