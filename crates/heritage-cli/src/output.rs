//! Colored terminal output
//!
//! Uses `termcolor`; respects the `NO_COLOR` environment variable and the
//! `--color` flag.

use std::io::Write;

use heritage_types::{AttributeValue, Element, Introspector, MetadataRecord};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Resolve `ColorChoice` from the CLI flag and environment.
///
/// Priority: `NO_COLOR` env > `--color` flag > auto-detect TTY.
pub fn resolve_color_choice(flag: Option<&str>) -> ColorChoice {
    if std::env::var_os("NO_COLOR").is_some() {
        return ColorChoice::Never;
    }
    match flag {
        Some("always") => ColorChoice::Always,
        Some("never") => ColorChoice::Never,
        _ => ColorChoice::Auto,
    }
}

/// Styled writer for stdout.
pub struct StyledOutput {
    stdout: StandardStream,
}

impl StyledOutput {
    /// Create a styled output with the given color choice.
    pub fn new(choice: ColorChoice) -> Self {
        Self {
            stdout: StandardStream::stdout(choice),
        }
    }

    /// Write text with a color and weight.
    pub fn write_styled(&mut self, text: &str, color: Option<Color>, bold: bool) {
        let mut spec = ColorSpec::new();
        spec.set_fg(color).set_bold(bold);
        let _ = self.stdout.set_color(&spec);
        let _ = write!(self.stdout, "{}", text);
        let _ = self.stdout.reset();
    }

    /// Green bold text.
    pub fn success(&mut self, text: &str) {
        self.write_styled(text, Some(Color::Green), true);
    }

    /// Yellow bold text.
    pub fn warning(&mut self, text: &str) {
        self.write_styled(text, Some(Color::Yellow), true);
    }

    /// Cyan text.
    pub fn info(&mut self, text: &str) {
        self.write_styled(text, Some(Color::Cyan), false);
    }

    /// Dim text.
    pub fn dim(&mut self, text: &str) {
        self.write_styled(text, Some(Color::White), false);
    }

    /// Bold text.
    pub fn bold(&mut self, text: &str) {
        self.write_styled(text, None, true);
    }

    /// Plain text.
    pub fn plain(&mut self, text: &str) {
        let _ = write!(self.stdout, "{}", text);
    }

    /// Newline.
    pub fn newline(&mut self) {
        let _ = writeln!(self.stdout);
    }

    /// Flush stdout.
    pub fn flush(&mut self) {
        let _ = self.stdout.flush();
    }
}

/// Element name as written on the command line
pub fn element_name<I: Introspector>(introspector: &I, element: Element) -> String {
    match element {
        Element::Type(ty) => type_name(introspector, ty),
        Element::Member(member) => member_name(introspector, member),
        Element::Parameter { member, index } => {
            format!("{} param {}", member_name(introspector, member), index)
        }
    }
}

fn type_name<I: Introspector>(introspector: &I, ty: heritage_types::TypeId) -> String {
    introspector
        .type_name(ty)
        .map(str::to_string)
        .unwrap_or_else(|_| ty.to_string())
}

fn member_name<I: Introspector>(introspector: &I, member: heritage_types::MemberId) -> String {
    let Ok(descriptor) = introspector.member_descriptor(member) else {
        return member.to_string();
    };
    let params = introspector
        .parameter_types(member)
        .map(|types| {
            types
                .into_iter()
                .map(|ty| type_name(introspector, ty))
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_default();
    format!(
        "{}#{}({})",
        type_name(introspector, descriptor.declaring_type),
        descriptor.name,
        params
    )
}

/// A record with kind and type names resolved
pub fn format_record<I: Introspector>(introspector: &I, record: &MetadataRecord) -> String {
    let values: Vec<_> = record
        .values()
        .iter()
        .map(|(name, value)| format!("{}={}", name, format_value(introspector, value)))
        .collect();
    let kind = type_name(introspector, record.kind());
    if values.is_empty() {
        format!("@{}", kind)
    } else {
        format!("@{}({})", kind, values.join(", "))
    }
}

/// An attribute value with type names resolved
pub fn format_value<I: Introspector>(introspector: &I, value: &AttributeValue) -> String {
    match value {
        AttributeValue::Type(ty) => type_name(introspector, *ty),
        AttributeValue::Enum { ty, constant } => {
            format!("{}.{}", type_name(introspector, *ty), constant)
        }
        AttributeValue::Record(record) => format_record(introspector, record),
        AttributeValue::Array(items) => {
            let items: Vec<_> = items.iter().map(|v| format_value(introspector, v)).collect();
            format!("[{}]", items.join(", "))
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heritage_types::{MemberDefinition, TypeDefinition, TypeRegistry};

    #[test]
    fn test_color_flag() {
        if std::env::var_os("NO_COLOR").is_none() {
            assert!(matches!(resolve_color_choice(Some("never")), ColorChoice::Never));
            assert!(matches!(resolve_color_choice(Some("always")), ColorChoice::Always));
            assert!(matches!(resolve_color_choice(None), ColorChoice::Auto));
        }
    }

    #[test]
    fn test_format_record_uses_names() {
        let mut registry = TypeRegistry::new();
        let retry = registry.define(TypeDefinition::annotation("acme.Retry"));
        let io = registry.define(TypeDefinition::class("acme.IoError"));
        let record = MetadataRecord::new(retry)
            .with("on", AttributeValue::Array(vec![AttributeValue::Type(io)]))
            .with("note", AttributeValue::str("flaky"));

        assert_eq!(
            format_record(&registry, &record),
            "@acme.Retry(on=[acme.IoError], note=\"flaky\")"
        );
        assert_eq!(format_record(&registry, &MetadataRecord::new(retry)), "@acme.Retry");
    }

    #[test]
    fn test_element_names() {
        let mut registry = TypeRegistry::new();
        let item = registry.define(TypeDefinition::class("acme.Item"));
        let service = registry.define(TypeDefinition::class("acme.Service"));
        let save = registry.add_member(service, MemberDefinition::new("save").with_param(item));

        assert_eq!(element_name(&registry, Element::Type(service)), "acme.Service");
        assert_eq!(
            element_name(&registry, Element::Member(save)),
            "acme.Service#save(acme.Item)"
        );
        assert_eq!(
            element_name(&registry, Element::Parameter { member: save, index: 0 }),
            "acme.Service#save(acme.Item) param 0"
        );
    }
}
