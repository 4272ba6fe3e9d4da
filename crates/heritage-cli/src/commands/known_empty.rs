//! `heritage known-empty`: report whether a scan is certain to find nothing.

use std::path::Path;

use heritage_engine::{ScanConfig, SearchStrategy};
use termcolor::ColorChoice;

use crate::element::parse_element;
use crate::output::{element_name, StyledOutput};

pub fn execute(
    model: &Path,
    element: &str,
    strategy: SearchStrategy,
    config: &ScanConfig,
    choice: ColorChoice,
) -> anyhow::Result<()> {
    let scanner = super::open_scanner(model, config)?;
    let source = parse_element(scanner.introspector(), element)?;
    let empty = scanner.is_known_empty(source, strategy);

    let mut out = StyledOutput::new(choice);
    out.plain(&element_name(scanner.introspector(), source));
    out.dim(&format!(" ({}): ", strategy));
    if empty {
        out.success("known empty");
    } else {
        out.warning("may have records");
    }
    out.newline();
    out.flush();
    Ok(())
}
