//! Generic type-variable resolution along supertype paths
//!
//! Resolves a member's declared parameter type as seen from a subtype:
//! given `interface Repo<T> { save(T) }` and `class Items implements Repo<Item>`,
//! parameter 0 of `Repo.save` resolves to `Item` against `Items`.

use rustc_hash::FxHashSet;

use crate::error::IntrospectionError;
use crate::introspect::IntrospectionResult;
use crate::registry::TypeRegistry;
use crate::ty::{MemberId, TypeArg, TypeId};

/// Type variable bindings of one type, expressed in terms of the starting type
type Bindings = Vec<(String, TypeArg)>;

/// Resolve parameter `index` of `member` against the specialization seen from `against`
pub(crate) fn resolve_parameter(
    registry: &TypeRegistry,
    member: MemberId,
    index: usize,
    against: TypeId,
) -> IntrospectionResult<Option<TypeId>> {
    let descriptor = registry
        .member(member)
        .ok_or(IntrospectionError::UnknownMember(member))?;
    let Some(param) = descriptor.params.get(index) else {
        return Ok(None);
    };
    let var = match param {
        TypeArg::Concrete(ty) => return Ok(Some(*ty)),
        TypeArg::Var(name) => name,
    };

    let declaring = descriptor.declaring_type;
    let start = registry
        .descriptor(against)
        .ok_or(IntrospectionError::UnknownType(against))?;
    let identity: Bindings = start
        .type_params
        .iter()
        .map(|param| (param.name.clone(), TypeArg::Var(param.name.clone())))
        .collect();

    let mut visited = FxHashSet::default();
    let resolved = match walk(registry, against, identity, declaring, var, &mut visited) {
        Some(TypeArg::Concrete(ty)) => ty,
        Some(TypeArg::Var(name)) => erasure(registry, against, &name),
        None => erasure(registry, declaring, var),
    };
    Ok(Some(resolved))
}

/// Erasure of a type variable declared on `owner`: its bound, or the root type
pub(crate) fn erasure(registry: &TypeRegistry, owner: TypeId, var: &str) -> TypeId {
    registry
        .descriptor(owner)
        .and_then(|descriptor| descriptor.type_param(var))
        .and_then(|(_, param)| param.bound)
        .unwrap_or_else(|| registry.root())
}

fn walk(
    registry: &TypeRegistry,
    current: TypeId,
    bindings: Bindings,
    target: TypeId,
    var: &str,
    visited: &mut FxHashSet<TypeId>,
) -> Option<TypeArg> {
    if current == target {
        return Some(match lookup(&bindings, var) {
            Some(arg) => arg,
            // raw reference: the variable erases to its bound
            None => TypeArg::Concrete(erasure(registry, target, var)),
        });
    }
    if !visited.insert(current) {
        return None;
    }

    let descriptor = registry.descriptor(current)?;
    let supertypes = descriptor
        .superclass
        .iter()
        .chain(descriptor.interfaces.iter());
    for reference in supertypes {
        let Some(super_descriptor) = registry.descriptor(reference.target) else {
            continue;
        };
        let next: Bindings = super_descriptor
            .type_params
            .iter()
            .zip(reference.args.iter())
            .filter_map(|(param, arg)| {
                let bound = match arg {
                    TypeArg::Concrete(ty) => TypeArg::Concrete(*ty),
                    TypeArg::Var(name) => lookup(&bindings, name)?,
                };
                Some((param.name.clone(), bound))
            })
            .collect();
        if let Some(found) = walk(registry, reference.target, next, target, var, visited) {
            return Some(found);
        }
    }
    None
}

fn lookup(bindings: &Bindings, var: &str) -> Option<TypeArg> {
    bindings
        .iter()
        .find(|(name, _)| name == var)
        .map(|(_, arg)| arg.clone())
}
