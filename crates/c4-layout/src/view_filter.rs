use c4_core::{Element, ElementType, Relationship, ViewType, Workspace};
use rustc_hash::FxHashSet;

/// Elements visible in a view of the given type.
///
/// Every element whose type the view keeps is a seed; each seed pulls in its
/// whole ancestor chain as context, whatever the ancestors' types. Order is
/// first insertion: a seed, then its ancestors nearest first. A view type
/// with no abstraction level of its own returns every element.
///
/// Ids are reported once; a repeated id keeps its first appearance.
#[must_use]
pub fn select_elements(workspace: &Workspace, view_type: ViewType) -> Vec<&Element> {
    let Some(kept_types) = view_type.kept_types() else {
        return workspace.elements.iter().collect();
    };

    let index = workspace.index();
    let mut seen: FxHashSet<&str> = FxHashSet::default();
    let mut selected = Vec::new();

    for seed in workspace
        .elements
        .iter()
        .filter(|element| kept_types.contains(&element.element_type))
    {
        if seen.insert(seed.id.as_str()) {
            selected.push(seed);
        }
        for ancestor in index.ancestors_of(seed) {
            if seen.insert(ancestor.id.as_str()) {
                selected.push(ancestor);
            }
        }
    }

    selected
}

/// Relationships whose endpoints are both in `elements`, in declaration order.
#[must_use]
pub fn select_relationships<'a>(
    relationships: &'a [Relationship],
    elements: &[&Element],
) -> Vec<&'a Relationship> {
    let members: FxHashSet<&str> = elements.iter().map(|element| element.id.as_str()).collect();
    relationships
        .iter()
        .filter(|relationship| {
            members.contains(relationship.source.as_str())
                && members.contains(relationship.target.as_str())
        })
        .collect()
}

/// View types worth offering for this workspace, most abstract first.
#[must_use]
pub fn available_views(workspace: &Workspace) -> Vec<ViewType> {
    let has_person = workspace.has_element_type(ElementType::Person);
    let has_system = workspace.has_element_type(ElementType::SoftwareSystem);
    let has_container = workspace.has_element_type(ElementType::Container);
    let has_component = workspace.has_element_type(ElementType::Component);

    let mut views = Vec::new();
    if has_person || has_system {
        views.push(ViewType::SystemContext);
    }
    if has_person || has_system || has_container {
        views.push(ViewType::Container);
    }
    if has_person || has_system || has_container || has_component {
        views.push(ViewType::Component);
    }
    views
}

#[cfg(test)]
mod tests {
    use super::{available_views, select_elements, select_relationships};
    use c4_core::{Element, ElementType, Relationship, ViewType, Workspace};
    use proptest::prelude::*;

    fn workspace() -> Workspace {
        let mut workspace = Workspace::empty();
        workspace.elements = vec![
            Element::new("user", ElementType::Person),
            Element::new("shop", ElementType::SoftwareSystem),
            Element::new("shop.web", ElementType::Container).with_parent("shop"),
            Element::new("shop.web.cart", ElementType::Component).with_parent("shop.web"),
            Element::new("store", ElementType::Database),
        ];
        workspace.relationships = vec![
            Relationship::between("user", "shop"),
            Relationship::between("user", "shop.web"),
            Relationship::between("shop.web", "shop.web.cart"),
            Relationship::between("x", "y"),
        ];
        workspace
    }

    fn ids<'a>(elements: &[&'a Element]) -> Vec<&'a str> {
        elements.iter().map(|element| element.id.as_str()).collect()
    }

    #[test]
    fn system_context_keeps_people_and_systems() {
        let workspace = workspace();
        let selected = select_elements(&workspace, ViewType::SystemContext);
        assert_eq!(ids(&selected), vec!["user", "shop"]);
    }

    #[test]
    fn container_view_adds_containers() {
        let workspace = workspace();
        let selected = select_elements(&workspace, ViewType::Container);
        assert_eq!(ids(&selected), vec!["user", "shop", "shop.web"]);
    }

    #[test]
    fn component_view_adds_components() {
        let workspace = workspace();
        let selected = select_elements(&workspace, ViewType::Component);
        assert_eq!(
            ids(&selected),
            vec!["user", "shop", "shop.web", "shop.web.cart"]
        );
    }

    #[test]
    fn unscoped_views_return_every_element() {
        let workspace = workspace();
        assert_eq!(select_elements(&workspace, ViewType::Dynamic).len(), 5);
        assert_eq!(select_elements(&workspace, ViewType::Deployment).len(), 5);
    }

    #[test]
    fn ancestors_are_pulled_in_regardless_of_type() {
        let mut workspace = Workspace::empty();
        workspace.elements = vec![
            Element::new("platform", ElementType::Database),
            Element::new("platform.api", ElementType::Container).with_parent("platform"),
        ];
        let selected = select_elements(&workspace, ViewType::Container);
        assert_eq!(ids(&selected), vec!["platform.api", "platform"]);
    }

    #[test]
    fn duplicate_seed_walks_its_own_parent_chain() {
        let mut workspace = Workspace::empty();
        workspace.elements = vec![
            Element::new("sys", ElementType::Database),
            Element::new("c", ElementType::Container).with_parent("sys"),
            Element::new("c", ElementType::Database),
        ];
        let selected = select_elements(&workspace, ViewType::Container);
        assert_eq!(ids(&selected), vec!["c", "sys"]);
        assert_eq!(selected[0].parent.as_deref(), Some("sys"));
    }

    #[test]
    fn relationship_filter_drops_dangling_endpoints() {
        let workspace = workspace();
        let selected = select_elements(&workspace, ViewType::Container);
        let relationships = select_relationships(&workspace.relationships, &selected);
        let kept: Vec<&str> = relationships.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(kept, vec!["user-shop", "user-shop.web"]);
    }

    #[test]
    fn available_views_follow_element_types() {
        assert!(available_views(&Workspace::empty()).is_empty());

        let mut only_components = Workspace::empty();
        only_components
            .elements
            .push(Element::new("c", ElementType::Component));
        assert_eq!(available_views(&only_components), vec![ViewType::Component]);

        assert_eq!(
            available_views(&workspace()),
            vec![ViewType::SystemContext, ViewType::Container, ViewType::Component]
        );
    }

    fn arb_workspace() -> impl Strategy<Value = Workspace> {
        let types = prop_oneof![
            Just(ElementType::Person),
            Just(ElementType::SoftwareSystem),
            Just(ElementType::Container),
            Just(ElementType::Component),
            Just(ElementType::Database),
        ];
        (
            proptest::collection::vec((types, proptest::option::of(0usize..12)), 0..12),
            proptest::collection::vec((0usize..14, 0usize..14), 0..16),
        )
            .prop_map(|(specs, links)| {
                let mut workspace = Workspace::empty();
                for (position, (element_type, parent)) in specs.iter().enumerate() {
                    let mut element = Element::new(format!("e{position}"), *element_type);
                    element.parent = parent.map(|p| format!("e{p}"));
                    workspace.elements.push(element);
                }
                for (source, target) in links {
                    workspace
                        .relationships
                        .push(Relationship::between(format!("e{source}"), format!("e{target}")));
                }
                workspace
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_selection_contains_every_ancestor(workspace in arb_workspace()) {
            let index = workspace.index();
            for view_type in ViewType::ALL {
                let selected = select_elements(&workspace, view_type);
                let members: Vec<&str> = ids(&selected);
                for element in &selected {
                    for ancestor in index.ancestors_of(element) {
                        prop_assert!(members.contains(&ancestor.id.as_str()));
                    }
                }
            }
        }

        #[test]
        fn prop_relationships_never_leak(workspace in arb_workspace()) {
            for view_type in ViewType::ALL {
                let selected = select_elements(&workspace, view_type);
                let members: Vec<&str> = ids(&selected);
                for relationship in select_relationships(&workspace.relationships, &selected) {
                    prop_assert!(members.contains(&relationship.source.as_str()));
                    prop_assert!(members.contains(&relationship.target.as_str()));
                }
            }
        }
    }
}
