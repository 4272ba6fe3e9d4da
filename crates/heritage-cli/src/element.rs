//! Element syntax: `acme.B`, `acme.B#save`, `acme.B#save(acme.Item, acme.Id)`

use anyhow::{anyhow, bail, Context};
use heritage_types::{Element, Introspector, TypeRegistry};

/// Resolve an element written on the command line
///
/// A member without a parameter list picks the first member with that name.
pub fn parse_element(registry: &TypeRegistry, text: &str) -> anyhow::Result<Element> {
    let text = text.trim();
    let Some((type_name, member)) = text.split_once('#') else {
        return lookup_type(registry, text).map(Element::Type);
    };
    let ty = lookup_type(registry, type_name)?;

    let (name, params) = match member.split_once('(') {
        Some((name, rest)) => {
            let list = rest
                .strip_suffix(')')
                .ok_or_else(|| anyhow!("unterminated parameter list in '{}'", text))?;
            let params: Vec<&str> = list
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .collect();
            (name.trim(), Some(params))
        }
        None => (member.trim(), None),
    };
    if name.is_empty() {
        bail!("missing member name in '{}'", text);
    }

    let candidates = registry.members_named(ty, name);
    let Some(params) = params else {
        return candidates
            .first()
            .map(|&member| Element::Member(member))
            .ok_or_else(|| anyhow!("type '{}' has no member '{}'", type_name, name));
    };
    for member in candidates {
        let types = registry
            .parameter_types(member)
            .with_context(|| format!("failed to read parameters of '{}'", text))?;
        let names: Vec<&str> = types
            .iter()
            .map(|&ty| registry.type_name(ty))
            .collect::<Result<_, _>>()?;
        if names == params {
            return Ok(Element::Member(member));
        }
    }
    bail!(
        "type '{}' has no member '{}' taking ({})",
        type_name,
        name,
        params.join(", ")
    )
}

fn lookup_type(registry: &TypeRegistry, name: &str) -> anyhow::Result<heritage_types::TypeId> {
    let name = name.trim();
    registry
        .lookup(name)
        .ok_or_else(|| anyhow!("unknown type '{}'", name))
}
