//! A single scan over a type or member hierarchy

use std::sync::Arc;

use heritage_types::{Element, IntrospectionResult, Introspector, MemberId, TypeId};

use super::overrides::is_override;
use super::processor::{ClassFilter, MetadataProcessor};
use super::strategy::SearchStrategy;
use super::HierarchyScanner;
use crate::cache::{no_annotations, MetadataLookup, Slot};

/// Per-scan state: the processor, the optional class filter, and the level
/// counter shared by every branch of a hierarchy walk
pub(crate) struct Walk<'a, C: ?Sized, P, I> {
    scanner: &'a HierarchyScanner<I>,
    introspector: &'a I,
    lookup: MetadataLookup<'a, I>,
    context: &'a C,
    processor: &'a mut P,
    class_filter: Option<&'a ClassFilter<'a, C>>,
    aggregate_index: usize,
}

impl<'a, C, P, I> Walk<'a, C, P, I>
where
    C: ?Sized,
    P: MetadataProcessor<C>,
    I: Introspector,
{
    pub(crate) fn new(
        scanner: &'a HierarchyScanner<I>,
        context: &'a C,
        processor: &'a mut P,
        class_filter: Option<&'a ClassFilter<'a, C>>,
    ) -> Self {
        Self {
            scanner,
            introspector: scanner.introspector(),
            lookup: scanner.lookup(),
            context,
            processor,
            class_filter,
            aggregate_index: 0,
        }
    }

    pub(crate) fn run(&mut self, source: Element, strategy: SearchStrategy) -> Option<P::Output> {
        match source {
            Element::Type(ty) => self.process_type(ty, strategy),
            Element::Member(member) => self.process_member(member, strategy),
            Element::Parameter { .. } => self.process_element(source),
        }
    }

    fn process_type(&mut self, ty: TypeId, strategy: SearchStrategy) -> Option<P::Output> {
        match strategy {
            SearchStrategy::Direct => self.process_element(Element::Type(ty)),
            SearchStrategy::InheritedAnnotations => self.process_inherited(ty),
            SearchStrategy::Superclass => self.process_hierarchy(ty, false, false),
            SearchStrategy::TypeHierarchy => self.process_hierarchy(ty, true, false),
            SearchStrategy::TypeHierarchyAndEnclosingClasses => {
                self.process_hierarchy(ty, true, true)
            }
        }
    }

    fn process_element(&mut self, source: Element) -> Option<P::Output> {
        let result = self.try_element(source);
        self.contain(source, result)
    }

    fn try_element(&mut self, source: Element) -> IntrospectionResult<Option<P::Output>> {
        if let Some(result) = self.processor.do_with_aggregate(self.context, 0) {
            return Ok(Some(result));
        }
        let annotations = self.declared(source)?;
        Ok(self
            .processor
            .do_with_annotations(self.context, 0, source, &annotations))
    }

    fn process_inherited(&mut self, source: TypeId) -> Option<P::Output> {
        let mut current = source;
        match self.try_inherited(source, &mut current) {
            Ok(result) => result,
            Err(error) => {
                self.scanner.report(Element::Type(current), &error);
                None
            }
        }
    }

    fn try_inherited(
        &mut self,
        source: TypeId,
        current: &mut TypeId,
    ) -> IntrospectionResult<Option<P::Output>> {
        if self
            .scanner
            .is_without_hierarchy(Element::Type(source), SearchStrategy::InheritedAnnotations)?
        {
            return Ok(self.process_element(Element::Type(source)));
        }
        let root = self.introspector.root_type();
        let mut relevant: Option<Vec<Slot>> = None;
        let mut remaining = usize::MAX;
        let mut aggregate_index = 0;
        let mut next = Some(source);
        while let Some(ty) = next {
            *current = ty;
            if ty == root || remaining == 0 || self.lookup.is_plain_type(ty)? {
                break;
            }
            if let Some(result) = self.processor.do_with_aggregate(self.context, aggregate_index) {
                return Ok(Some(result));
            }
            if self.is_filtered(ty) {
                next = self.introspector.superclass(ty)?;
                aggregate_index += 1;
                continue;
            }
            let mut declared = self
                .scanner
                .declared
                .get_defensive(&self.lookup, Element::Type(ty))?;
            if relevant.is_none() && !declared.is_empty() {
                let visible: Vec<Slot> = self
                    .introspector
                    .annotations(source)?
                    .into_iter()
                    .map(Some)
                    .collect();
                remaining = visible.len();
                relevant = Some(visible);
            }
            if let Some(relevant) = relevant.as_mut() {
                for slot in declared.iter_mut() {
                    let kind = match slot {
                        Some(record) => record.kind(),
                        None => continue,
                    };
                    let claimed = relevant
                        .iter_mut()
                        .find(|candidate| candidate.as_ref().is_some_and(|r| r.kind() == kind));
                    match claimed {
                        Some(candidate) => {
                            *candidate = None;
                            remaining -= 1;
                        }
                        None => *slot = None,
                    }
                }
            }
            if let Some(result) = self.processor.do_with_annotations(
                self.context,
                aggregate_index,
                Element::Type(ty),
                &declared,
            ) {
                return Ok(Some(result));
            }
            next = self.introspector.superclass(ty)?;
            aggregate_index += 1;
        }
        Ok(None)
    }

    fn process_hierarchy(
        &mut self,
        ty: TypeId,
        include_interfaces: bool,
        include_enclosing: bool,
    ) -> Option<P::Output> {
        let result = self.try_hierarchy(ty, include_interfaces, include_enclosing);
        self.contain(Element::Type(ty), result)
    }

    fn try_hierarchy(
        &mut self,
        ty: TypeId,
        include_interfaces: bool,
        include_enclosing: bool,
    ) -> IntrospectionResult<Option<P::Output>> {
        if let Some(result) = self
            .processor
            .do_with_aggregate(self.context, self.aggregate_index)
        {
            return Ok(Some(result));
        }
        if self.lookup.is_plain_type(ty)? {
            return Ok(None);
        }
        let annotations = self.declared(Element::Type(ty))?;
        if let Some(result) = self.processor.do_with_annotations(
            self.context,
            self.aggregate_index,
            Element::Type(ty),
            &annotations,
        ) {
            return Ok(Some(result));
        }
        self.aggregate_index += 1;

        if include_interfaces {
            for interface in self.introspector.interfaces(ty)? {
                if let Some(result) =
                    self.process_hierarchy(interface, true, include_enclosing)
                {
                    return Ok(Some(result));
                }
            }
        }
        if let Some(superclass) = self.introspector.superclass(ty)? {
            if superclass != self.introspector.root_type() {
                if let Some(result) =
                    self.process_hierarchy(superclass, include_interfaces, include_enclosing)
                {
                    return Ok(Some(result));
                }
            }
        }
        if include_enclosing {
            // an unloadable enclosing type only ends this branch
            match self.introspector.enclosing_type(ty) {
                Ok(Some(enclosing)) => {
                    if let Some(result) =
                        self.process_hierarchy(enclosing, include_interfaces, true)
                    {
                        return Ok(Some(result));
                    }
                }
                Ok(None) => {}
                Err(error) => self.scanner.report(Element::Type(ty), &error),
            }
        }
        Ok(None)
    }

    fn process_member(&mut self, member: MemberId, strategy: SearchStrategy) -> Option<P::Output> {
        match strategy {
            SearchStrategy::Direct | SearchStrategy::InheritedAnnotations => {
                let result = self.try_member_direct(member);
                self.contain(Element::Member(member), result)
            }
            SearchStrategy::Superclass => self.process_member_from_declaring(member, false),
            SearchStrategy::TypeHierarchy | SearchStrategy::TypeHierarchyAndEnclosingClasses => {
                self.process_member_from_declaring(member, true)
            }
        }
    }

    fn try_member_direct(&mut self, member: MemberId) -> IntrospectionResult<Option<P::Output>> {
        if let Some(result) = self.processor.do_with_aggregate(self.context, 0) {
            return Ok(Some(result));
        }
        self.member_annotations(0, member)
    }

    fn process_member_from_declaring(
        &mut self,
        member: MemberId,
        include_interfaces: bool,
    ) -> Option<P::Output> {
        match self.introspector.member_descriptor(member) {
            Ok(descriptor) => {
                self.process_member_hierarchy(descriptor.declaring_type, member, include_interfaces)
            }
            Err(error) => {
                self.scanner.report(Element::Member(member), &error);
                None
            }
        }
    }

    fn process_member_hierarchy(
        &mut self,
        ty: TypeId,
        root: MemberId,
        include_interfaces: bool,
    ) -> Option<P::Output> {
        let result = self.try_member_hierarchy(ty, root, include_interfaces);
        self.contain(Element::Member(root), result)
    }

    fn try_member_hierarchy(
        &mut self,
        ty: TypeId,
        root: MemberId,
        include_interfaces: bool,
    ) -> IntrospectionResult<Option<P::Output>> {
        if let Some(result) = self
            .processor
            .do_with_aggregate(self.context, self.aggregate_index)
        {
            return Ok(Some(result));
        }
        if self.lookup.is_plain_type(ty)? {
            return Ok(None);
        }
        let introspector = self.introspector;
        let descriptor = introspector.member_descriptor(root)?;
        let mut called = false;
        if ty == descriptor.declaring_type {
            called = true;
            if let Some(result) = self.member_annotations(self.aggregate_index, root)? {
                return Ok(Some(result));
            }
        } else {
            for &candidate in self.base_type_members(ty)?.iter() {
                if is_override(introspector, root, candidate)? {
                    called = true;
                    if let Some(result) = self.member_annotations(self.aggregate_index, candidate)? {
                        return Ok(Some(result));
                    }
                }
            }
        }
        if descriptor.is_private() {
            return Ok(None);
        }
        if called {
            self.aggregate_index += 1;
        }
        if include_interfaces {
            for interface in introspector.interfaces(ty)? {
                if let Some(result) = self.process_member_hierarchy(interface, root, true) {
                    return Ok(Some(result));
                }
            }
        }
        if let Some(superclass) = introspector.superclass(ty)? {
            if superclass != introspector.root_type() {
                if let Some(result) =
                    self.process_member_hierarchy(superclass, root, include_interfaces)
                {
                    return Ok(Some(result));
                }
            }
        }
        Ok(None)
    }

    /// Deliver a member's records, then any records only its bridged
    /// original declares, both at the same level
    fn member_annotations(
        &mut self,
        aggregate_index: usize,
        member: MemberId,
    ) -> IntrospectionResult<Option<P::Output>> {
        let source = Element::Member(member);
        let annotations = self.declared(source)?;
        if let Some(result) =
            self.processor
                .do_with_annotations(self.context, aggregate_index, source, &annotations)
        {
            return Ok(Some(result));
        }
        let bridged = self.introspector.bridged_member(member)?;
        if bridged == member {
            return Ok(None);
        }
        let mut bridged_annotations = self.declared(Element::Member(bridged))?.to_vec();
        for slot in bridged_annotations.iter_mut() {
            if annotations.contains(slot) {
                *slot = None;
            }
        }
        Ok(self.processor.do_with_annotations(
            self.context,
            aggregate_index,
            source,
            &bridged_annotations,
        ))
    }

    fn base_type_members(&self, ty: TypeId) -> IntrospectionResult<Arc<[MemberId]>> {
        if self.is_filtered(ty) {
            return Ok(Arc::from(Vec::new()));
        }
        self.scanner.base_type_members(ty)
    }

    /// Declared records, empty for elements on a filtered type
    fn declared(&self, element: Element) -> IntrospectionResult<Arc<[Slot]>> {
        let owner = match element {
            Element::Type(ty) => Some(ty),
            Element::Member(member) => {
                Some(self.introspector.member_descriptor(member)?.declaring_type)
            }
            Element::Parameter { .. } => None,
        };
        if owner.is_some_and(|ty| self.is_filtered(ty)) {
            return Ok(no_annotations());
        }
        self.scanner.declared.get(&self.lookup, element)
    }

    fn is_filtered(&self, ty: TypeId) -> bool {
        self.class_filter.is_some_and(|filter| filter(self.context, ty))
    }

    fn contain(
        &self,
        element: Element,
        result: IntrospectionResult<Option<P::Output>>,
    ) -> Option<P::Output> {
        match result {
            Ok(result) => result,
            Err(error) => {
                self.scanner.report(element, &error);
                None
            }
        }
    }
}
