//! Read-only traversal over decoded flight data.
//!
//! Matching elements are yielded in ascending top-level index order, then
//! depth-first within the recursed variants. Only [`DataContainer`] children
//! and the single [`DataParent`] child are descended into; the kind filter
//! and predicate apply at every depth.
//!
//! [`DataContainer`]: crate::element::DataContainer
//! [`DataParent`]: crate::element::DataParent

use crate::decode::FlightData;
use crate::element::{Element, ElementKind};

/// Element predicate used by the find operations.
pub type Predicate<'a> = &'a dyn Fn(&Element) -> bool;

/// Iterator over matching elements; see [`FlightData::find_iter`].
pub struct FindIter<'a> {
    stack: Vec<&'a Element>,
    kinds: Option<&'a [ElementKind]>,
    predicate: Option<Predicate<'a>>,
    recursive: bool,
}

impl<'a> FindIter<'a> {
    fn matches(&self, element: &Element) -> bool {
        self.kinds
            .map_or(true, |kinds| kinds.contains(&element.kind()))
            && self.predicate.map_or(true, |predicate| predicate(element))
    }
}

impl<'a> Iterator for FindIter<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<&'a Element> {
        while let Some(element) = self.stack.pop() {
            if self.recursive {
                match element {
                    Element::DataContainer(container) => {
                        for child in container.children().iter().rev() {
                            self.stack.push(child);
                        }
                    }
                    Element::DataParent(parent) => self.stack.push(parent.child()),
                    _ => {}
                }
            }
            if self.matches(element) {
                return Some(element);
            }
        }
        None
    }
}

impl FlightData {
    /// Lazily finds elements matching the kind filter and predicate.
    ///
    /// `kinds: None` matches every kind; `predicate: None` accepts every
    /// element. With `recursive` (the usual mode) container and parent
    /// variants are descended into.
    pub fn find_iter<'a>(
        &'a self,
        kinds: Option<&'a [ElementKind]>,
        predicate: Option<Predicate<'a>>,
        recursive: bool,
    ) -> FindIter<'a> {
        let mut ordered: Vec<(&u64, &Element)> = self.elements.iter().collect();
        ordered.sort_by_key(|(index, _)| **index);
        // Reversed so the lowest index pops first.
        let stack = ordered
            .into_iter()
            .rev()
            .map(|(_, element)| element)
            .collect();
        FindIter {
            stack,
            kinds,
            predicate,
            recursive,
        }
    }

    /// Collects every match; see [`FlightData::find_iter`].
    pub fn find_all<'a>(
        &'a self,
        kinds: Option<&'a [ElementKind]>,
        predicate: Option<Predicate<'a>>,
        recursive: bool,
    ) -> Vec<&'a Element> {
        self.find_iter(kinds, predicate, recursive).collect()
    }

    /// First match in index order, then depth-first order.
    pub fn find_one<'a>(
        &'a self,
        kinds: Option<&'a [ElementKind]>,
        predicate: Option<Predicate<'a>>,
        recursive: bool,
    ) -> Option<&'a Element> {
        self.find_iter(kinds, predicate, recursive).next()
    }
}
