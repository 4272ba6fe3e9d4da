//! Override matching for member hierarchy walks

use heritage_types::{IntrospectionResult, Introspector, MemberDescriptor, MemberId};

/// Whether `candidate` overrides `root`: not private, same name, and the
/// same parameter types, directly or after resolving generics
pub(crate) fn is_override<I: Introspector + ?Sized>(
    introspector: &I,
    root: MemberId,
    candidate: MemberId,
) -> IntrospectionResult<bool> {
    let root = introspector.member_descriptor(root)?;
    let candidate = introspector.member_descriptor(candidate)?;
    Ok(!candidate.is_private()
        && candidate.name == root.name
        && has_same_parameter_types(introspector, root, candidate)?)
}

fn has_same_parameter_types<I: Introspector + ?Sized>(
    introspector: &I,
    root: &MemberDescriptor,
    candidate: &MemberDescriptor,
) -> IntrospectionResult<bool> {
    if candidate.param_count() != root.param_count() {
        return Ok(false);
    }
    let root_types = introspector.parameter_types(root.id)?;
    if introspector.parameter_types(candidate.id)? == root_types {
        return Ok(true);
    }
    has_same_generic_parameters(introspector, root, candidate, &root_types)
}

fn has_same_generic_parameters<I: Introspector + ?Sized>(
    introspector: &I,
    root: &MemberDescriptor,
    candidate: &MemberDescriptor,
    root_types: &[heritage_types::TypeId],
) -> IntrospectionResult<bool> {
    let source = root.declaring_type;
    if !introspector.is_assignable_from(candidate.declaring_type, source)? {
        return Ok(false);
    }
    for (index, root_type) in root_types.iter().enumerate() {
        let resolved = introspector.resolve_parameter_type(candidate.id, index, source)?;
        if resolved != Some(*root_type) {
            return Ok(false);
        }
    }
    Ok(true)
}
