use std::f32::consts::TAU;

use c4_core::{ElementType, ViewType};
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::{LayoutConfig, LayoutNode};

/// Assign positions in place. Nodes no rule covers keep their current
/// position. Returns how many components fell back to the loose grid.
pub(crate) fn place_nodes(
    nodes: &mut [LayoutNode],
    view_type: ViewType,
    config: &LayoutConfig,
) -> usize {
    match view_type {
        ViewType::SystemContext => {
            place_column(nodes, ElementType::Person, config.person_x, config);
            place_column(nodes, ElementType::SoftwareSystem, config.system_x, config);
            0
        }
        ViewType::Container => {
            place_column(nodes, ElementType::Person, config.person_x, config);
            pin_first_system(nodes, config);
            place_container_ring(nodes, config);
            0
        }
        ViewType::Component => {
            place_column(nodes, ElementType::Person, config.person_x, config);
            pin_first_system(nodes, config);
            place_container_ring(nodes, config);
            place_components(nodes, config)
        }
        ViewType::Dynamic | ViewType::Deployment => {
            place_grid(nodes, config);
            0
        }
    }
}

fn group(nodes: &[LayoutNode], element_type: ElementType) -> Vec<usize> {
    nodes
        .iter()
        .enumerate()
        .filter(|(_, node)| node.element.element_type == element_type)
        .map(|(index, _)| index)
        .collect()
}

fn place_column(
    nodes: &mut [LayoutNode],
    element_type: ElementType,
    x: f32,
    config: &LayoutConfig,
) {
    for (row, index) in group(nodes, element_type).into_iter().enumerate() {
        let node = &mut nodes[index];
        node.x = x;
        node.y = config.row_start_y + row as f32 * config.row_spacing;
    }
}

fn pin_first_system(nodes: &mut [LayoutNode], config: &LayoutConfig) {
    if let Some(node) = nodes
        .iter_mut()
        .find(|node| node.element.element_type == ElementType::SoftwareSystem)
    {
        node.x = config.center_x;
        node.y = config.center_y;
    }
}

fn place_container_ring(nodes: &mut [LayoutNode], config: &LayoutConfig) {
    let containers = group(nodes, ElementType::Container);
    let count = containers.len() as f32;
    for (slot, index) in containers.into_iter().enumerate() {
        let angle = (slot as f32 / count) * TAU;
        let node = &mut nodes[index];
        node.x = config.center_x + angle.cos() * config.container_radius;
        node.y = config.center_y + angle.sin() * config.container_radius;
    }
}

/// Components sit on a small grid below their parent container when it is
/// part of the layout. The slot counts within that container's components.
/// Orphans go to a loose grid indexed over all components.
fn place_components(nodes: &mut [LayoutNode], config: &LayoutConfig) -> usize {
    let mut anchors: FxHashMap<String, (f32, f32)> = FxHashMap::default();
    for index in group(nodes, ElementType::Container) {
        let node = &nodes[index];
        anchors
            .entry(node.element.id.clone())
            .or_insert((node.x, node.y));
    }

    let columns = config.component_columns.max(1);
    let center_column = (columns - 1) as f32 / 2.0;
    let fallback_columns = config.fallback_columns.max(1);
    let mut slots: FxHashMap<String, usize> = FxHashMap::default();
    let mut fallbacks = 0;

    for (position, index) in group(nodes, ElementType::Component).into_iter().enumerate() {
        let node = &mut nodes[index];
        let anchor = node
            .element
            .parent
            .as_deref()
            .and_then(|parent| anchors.get(parent).map(|point| (parent, *point)));

        match anchor {
            Some((parent, (anchor_x, anchor_y))) => {
                let slot = slots.entry(parent.to_string()).or_insert(0);
                let column = (*slot % columns) as f32 - center_column;
                let row = (*slot / columns) as f32;
                node.x = anchor_x + column * config.component_dx;
                node.y = anchor_y + row * config.component_dy;
                *slot += 1;
            }
            None => {
                trace!(component = %node.id, "component placed on fallback grid");
                node.x = config.fallback_x
                    + (position % fallback_columns) as f32 * config.fallback_dx;
                node.y = config.fallback_y
                    + (position / fallback_columns) as f32 * config.fallback_dy;
                fallbacks += 1;
            }
        }
    }

    fallbacks
}

fn place_grid(nodes: &mut [LayoutNode], config: &LayoutConfig) {
    if nodes.is_empty() {
        return;
    }
    let columns = ((nodes.len() as f64).sqrt().ceil() as usize).max(1);
    for (index, node) in nodes.iter_mut().enumerate() {
        node.x = config.grid_x + (index % columns) as f32 * config.grid_spacing;
        node.y = config.grid_y + (index / columns) as f32 * config.grid_spacing;
    }
}
