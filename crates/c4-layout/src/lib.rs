#![forbid(unsafe_code)]

mod placement;
mod view_filter;

use c4_core::{Element, Relationship, ViewType, Workspace};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use view_filter::{available_views, select_elements, select_relationships};

/// Every constant the placement rules use. `Default` is the stock layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub node_width: f32,
    pub node_height: f32,
    /// Column for people in every scoped view.
    pub person_x: f32,
    /// Column for systems in the system-context view.
    pub system_x: f32,
    pub row_start_y: f32,
    pub row_spacing: f32,
    /// Where the primary system sits and the container ring is centred.
    pub center_x: f32,
    pub center_y: f32,
    pub container_radius: f32,
    pub component_columns: usize,
    pub component_dx: f32,
    pub component_dy: f32,
    /// Loose grid for components whose container is not in the layout.
    pub fallback_x: f32,
    pub fallback_y: f32,
    pub fallback_columns: usize,
    pub fallback_dx: f32,
    pub fallback_dy: f32,
    /// Square grid for views without type-specific rules.
    pub grid_x: f32,
    pub grid_y: f32,
    pub grid_spacing: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 200.0,
            node_height: 100.0,
            person_x: 100.0,
            system_x: 400.0,
            row_start_y: 200.0,
            row_spacing: 200.0,
            center_x: 400.0,
            center_y: 300.0,
            container_radius: 250.0,
            component_columns: 3,
            component_dx: 150.0,
            component_dy: 120.0,
            fallback_x: 600.0,
            fallback_y: 200.0,
            fallback_columns: 4,
            fallback_dx: 200.0,
            fallback_dy: 150.0,
            grid_x: 100.0,
            grid_y: 100.0,
            grid_spacing: 200.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct LayoutRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// A positioned element. `x`/`y` is the top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutNode {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub element: Element,
}

impl LayoutNode {
    /// A node at the origin with the configured footprint.
    #[must_use]
    pub fn unplaced(element: &Element, config: &LayoutConfig) -> Self {
        Self {
            id: element.id.clone(),
            x: 0.0,
            y: 0.0,
            width: config.node_width,
            height: config.node_height,
            element: element.clone(),
        }
    }

    #[must_use]
    pub fn bounds(&self) -> LayoutRect {
        LayoutRect {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutEdge {
    pub source: String,
    pub target: String,
    pub relationship: Relationship,
}

impl From<&Relationship> for LayoutEdge {
    fn from(relationship: &Relationship) -> Self {
        Self {
            source: relationship.source.clone(),
            target: relationship.target.clone(),
            relationship: relationship.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutStats {
    pub node_count: usize,
    pub edge_count: usize,
    /// Components placed on the loose grid because their container was absent.
    pub fallback_components: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewLayout {
    pub view_type: ViewType,
    pub nodes: Vec<LayoutNode>,
    pub edges: Vec<LayoutEdge>,
    pub bounds: LayoutRect,
    pub stats: LayoutStats,
}

/// Position already-filtered elements for a view, with the stock constants.
#[must_use]
pub fn layout(elements: &[&Element], view_type: ViewType) -> Vec<LayoutNode> {
    layout_with_config(elements, view_type, &LayoutConfig::default())
}

#[must_use]
pub fn layout_with_config(
    elements: &[&Element],
    view_type: ViewType,
    config: &LayoutConfig,
) -> Vec<LayoutNode> {
    positioned_nodes(elements, view_type, config).0
}

fn positioned_nodes(
    elements: &[&Element],
    view_type: ViewType,
    config: &LayoutConfig,
) -> (Vec<LayoutNode>, usize) {
    let mut nodes: Vec<LayoutNode> = elements
        .iter()
        .map(|element| LayoutNode::unplaced(element, config))
        .collect();
    let fallback_components = placement::place_nodes(&mut nodes, view_type, config);
    debug!(
        view = %view_type,
        nodes = nodes.len(),
        fallback_components,
        "layout"
    );
    (nodes, fallback_components)
}

/// Filter a workspace for a view and lay out the result, edges included.
#[must_use]
pub fn layout_view(workspace: &Workspace, view_type: ViewType) -> ViewLayout {
    layout_view_with_config(workspace, view_type, &LayoutConfig::default())
}

#[must_use]
pub fn layout_view_with_config(
    workspace: &Workspace,
    view_type: ViewType,
    config: &LayoutConfig,
) -> ViewLayout {
    let elements = select_elements(workspace, view_type);
    let relationships = select_relationships(&workspace.relationships, &elements);
    let (nodes, fallback_components) = positioned_nodes(&elements, view_type, config);
    let edges: Vec<LayoutEdge> = relationships.into_iter().map(LayoutEdge::from).collect();
    let bounds = compute_bounds(&nodes);

    ViewLayout {
        view_type,
        stats: LayoutStats {
            node_count: nodes.len(),
            edge_count: edges.len(),
            fallback_components,
        },
        nodes,
        edges,
        bounds,
    }
}

/// Smallest rectangle covering every node; a zero rect when there are none.
#[must_use]
pub fn compute_bounds(nodes: &[LayoutNode]) -> LayoutRect {
    let mut min_x = f32::MAX;
    let mut min_y = f32::MAX;
    let mut max_x = f32::MIN;
    let mut max_y = f32::MIN;

    for rect in nodes.iter().map(LayoutNode::bounds) {
        min_x = min_x.min(rect.x);
        min_y = min_y.min(rect.y);
        max_x = max_x.max(rect.x + rect.width);
        max_y = max_y.max(rect.y + rect.height);
    }

    if nodes.is_empty()
        || !min_x.is_finite()
        || !min_y.is_finite()
        || !max_x.is_finite()
        || !max_y.is_finite()
    {
        return LayoutRect::default();
    }

    LayoutRect {
        x: min_x,
        y: min_y,
        width: max_x - min_x,
        height: max_y - min_y,
    }
}
