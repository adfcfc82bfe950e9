use rustc_hash::{FxHashMap, FxHashSet};

use crate::Element;

/// Id lookup over a borrowed element list.
///
/// Duplicate ids resolve to the last declaration.
#[derive(Debug, Clone)]
pub struct ElementIndex<'a> {
    by_id: FxHashMap<&'a str, &'a Element>,
}

impl<'a> ElementIndex<'a> {
    #[must_use]
    pub fn new(elements: &'a [Element]) -> Self {
        let mut by_id = FxHashMap::default();
        by_id.reserve(elements.len());
        for element in elements {
            by_id.insert(element.id.as_str(), element);
        }
        Self { by_id }
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&'a Element> {
        self.by_id.get(id).copied()
    }

    /// Walk the parent chain of `element`, nearest first. The element itself
    /// is not yielded. Stops on a missing parent or a repeated id.
    #[must_use]
    pub fn ancestors_of(&self, element: &'a Element) -> Ancestors<'_, 'a> {
        let mut visited = FxHashSet::default();
        visited.insert(element.id.as_str());
        Ancestors {
            index: self,
            next: element.parent.as_deref(),
            visited,
        }
    }
}

pub struct Ancestors<'i, 'a> {
    index: &'i ElementIndex<'a>,
    next: Option<&'a str>,
    visited: FxHashSet<&'a str>,
}

impl<'a> Iterator for Ancestors<'_, 'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next.take()?;
        let element = self.index.get(id)?;
        if !self.visited.insert(element.id.as_str()) {
            return None;
        }
        self.next = element.parent.as_deref();
        Some(element)
    }
}

#[cfg(test)]
mod tests {
    use super::ElementIndex;
    use crate::{Element, ElementType};

    fn chain() -> Vec<Element> {
        vec![
            Element::new("shop", ElementType::SoftwareSystem),
            Element::new("shop.api", ElementType::Container).with_parent("shop"),
            Element::new("shop.api.orders", ElementType::Component).with_parent("shop.api"),
        ]
    }

    fn ancestor_ids<'a>(index: &ElementIndex<'a>, element: &'a Element) -> Vec<&'a str> {
        index
            .ancestors_of(element)
            .map(|ancestor| ancestor.id.as_str())
            .collect()
    }

    #[test]
    fn ancestors_walk_nearest_first() {
        let elements = chain();
        let index = ElementIndex::new(&elements);
        assert_eq!(ancestor_ids(&index, &elements[2]), vec!["shop.api", "shop"]);
        assert!(ancestor_ids(&index, &elements[0]).is_empty());
    }

    #[test]
    fn ancestors_stop_at_missing_parent() {
        let elements = vec![Element::new("orphan", ElementType::Container).with_parent("ghost")];
        let index = ElementIndex::new(&elements);
        assert_eq!(index.ancestors_of(&elements[0]).count(), 0);
    }

    #[test]
    fn ancestors_terminate_on_cycles() {
        let elements = vec![
            Element::new("a", ElementType::Container).with_parent("b"),
            Element::new("b", ElementType::Container).with_parent("a"),
        ];
        let index = ElementIndex::new(&elements);
        assert_eq!(ancestor_ids(&index, &elements[0]), vec!["b"]);
    }

    #[test]
    fn ancestors_follow_the_given_duplicate() {
        let elements = vec![
            Element::new("sys", ElementType::Database),
            Element::new("c", ElementType::Container).with_parent("sys"),
            Element::new("c", ElementType::Database),
        ];
        let index = ElementIndex::new(&elements);
        assert_eq!(ancestor_ids(&index, &elements[1]), vec!["sys"]);
        assert!(ancestor_ids(&index, &elements[2]).is_empty());
    }

    #[test]
    fn duplicate_ids_resolve_to_last() {
        let elements = vec![
            Element::new("dup", ElementType::Person),
            Element::new("dup", ElementType::SoftwareSystem),
        ];
        let index = ElementIndex::new(&elements);
        assert_eq!(
            index.get("dup").map(|e| e.element_type),
            Some(ElementType::SoftwareSystem)
        );
    }
}
