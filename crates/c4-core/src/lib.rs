#![forbid(unsafe_code)]

mod index;

pub use index::{Ancestors, ElementIndex};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "camelCase")]
pub enum ElementType {
    #[default]
    Person,
    SoftwareSystem,
    Container,
    Component,
    Database,
}

impl ElementType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Person => "person",
            Self::SoftwareSystem => "softwareSystem",
            Self::Container => "container",
            Self::Component => "component",
            Self::Database => "database",
        }
    }
}

/// A modeled architecture unit.
///
/// `parent` is an id reference into the owning [`Workspace`], never a pointer.
/// Resolve it through an [`ElementIndex`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technology: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(rename = "type")]
    pub element_type: ElementType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

impl Element {
    #[must_use]
    pub fn new(id: impl Into<String>, element_type: ElementType) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            element_type,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technology: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl Relationship {
    /// Build a relationship with the conventional `source-target` id.
    #[must_use]
    pub fn between(source: impl Into<String>, target: impl Into<String>) -> Self {
        let source = source.into();
        let target = target.into();
        Self {
            id: format!("{source}-{target}"),
            source,
            target,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "camelCase")]
pub enum ViewType {
    #[default]
    SystemContext,
    Container,
    Component,
    Dynamic,
    Deployment,
}

const SYSTEM_CONTEXT_TYPES: [ElementType; 2] = [ElementType::Person, ElementType::SoftwareSystem];
const CONTAINER_TYPES: [ElementType; 3] = [
    ElementType::Person,
    ElementType::SoftwareSystem,
    ElementType::Container,
];
const COMPONENT_TYPES: [ElementType; 4] = [
    ElementType::Person,
    ElementType::SoftwareSystem,
    ElementType::Container,
    ElementType::Component,
];

impl ViewType {
    pub const ALL: [Self; 5] = [
        Self::SystemContext,
        Self::Container,
        Self::Component,
        Self::Dynamic,
        Self::Deployment,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SystemContext => "systemContext",
            Self::Container => "container",
            Self::Component => "component",
            Self::Dynamic => "dynamic",
            Self::Deployment => "deployment",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::SystemContext => "System Context",
            Self::Container => "Container",
            Self::Component => "Component",
            Self::Dynamic => "Dynamic",
            Self::Deployment => "Deployment",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::SystemContext => "High-level system interactions",
            Self::Container => "System internals and containers",
            Self::Component => "Detailed component interactions",
            Self::Dynamic => "Ordered interactions between elements",
            Self::Deployment => "Mapping of containers onto infrastructure",
        }
    }

    /// Element types that seed this view's filter pass.
    ///
    /// `None` means the view has no abstraction level of its own and shows
    /// every element.
    #[must_use]
    pub const fn kept_types(self) -> Option<&'static [ElementType]> {
        match self {
            Self::SystemContext => Some(&SYSTEM_CONTEXT_TYPES),
            Self::Container => Some(&CONTAINER_TYPES),
            Self::Component => Some(&COMPONENT_TYPES),
            Self::Dynamic | Self::Deployment => None,
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "systemcontext" | "system-context" | "system_context" | "context" => {
                Some(Self::SystemContext)
            }
            "container" => Some(Self::Container),
            "component" => Some(Self::Component),
            "dynamic" => Some(Self::Dynamic),
            "deployment" => Some(Self::Deployment),
            _ => None,
        }
    }
}

impl std::fmt::Display for ViewType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown view type '{0}'")]
pub struct UnknownViewType(pub String);

impl std::str::FromStr for ViewType {
    type Err = UnknownViewType;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value).ok_or_else(|| UnknownViewType(value.to_string()))
    }
}

/// `autoLayout` direction recorded on a view.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LayoutDirection {
    #[default]
    Tb,
    Bt,
    Lr,
    Rl,
}

impl LayoutDirection {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tb => "tb",
            Self::Bt => "bt",
            Self::Lr => "lr",
            Self::Rl => "rl",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "tb" | "td" => Some(Self::Tb),
            "bt" => Some(Self::Bt),
            "lr" => Some(Self::Lr),
            "rl" => Some(Self::Rl),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct View {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub view_type: ViewType,
    pub element_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub includes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excludes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_layout: Option<LayoutDirection>,
}

impl View {
    #[must_use]
    pub fn new(view_type: ViewType, element_id: impl Into<String>) -> Self {
        let element_id = element_id.into();
        Self {
            id: format!("{}-{element_id}", view_type.as_str()),
            name: element_id.clone(),
            view_type,
            element_id,
            ..Self::default()
        }
    }
}

/// A style rule. Only the selector is modeled; visual properties belong to
/// the renderer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Style {
    pub element: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub elements: Vec<Element>,
    pub relationships: Vec<Relationship>,
    pub views: Vec<View>,
}

impl Workspace {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty() && self.relationships.is_empty() && self.views.is_empty()
    }

    /// Find an element by id. Later declarations shadow earlier ones.
    #[must_use]
    pub fn find_element(&self, id: &str) -> Option<&Element> {
        self.elements.iter().rev().find(|element| element.id == id)
    }

    #[must_use]
    pub fn index(&self) -> ElementIndex<'_> {
        ElementIndex::new(&self.elements)
    }

    #[must_use]
    pub fn has_element_type(&self, element_type: ElementType) -> bool {
        self.elements
            .iter()
            .any(|element| element.element_type == element_type)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DslErrorCode {
    MissingWorkspaceHeader,
    InvalidElementDeclaration,
    InvalidRelationship,
    InvalidViewDeclaration,
    Fault,
}

impl DslErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingWorkspaceHeader => "c4/error/workspace-header",
            Self::InvalidElementDeclaration => "c4/error/element",
            Self::InvalidRelationship => "c4/error/relationship",
            Self::InvalidViewDeclaration => "c4/error/view",
            Self::Fault => "c4/error/fault",
        }
    }
}

/// A recoverable, line-scoped parse problem.
///
/// `Display` renders the user-facing `Line <n>: <message>` text.
#[derive(Debug, Clone, Serialize, Deserialize, Error, PartialEq, Eq)]
pub enum DslError {
    #[error("Line {line}: Invalid workspace declaration")]
    MissingWorkspaceHeader { line: usize },
    #[error("Line {line}: Invalid element declaration: {text}")]
    InvalidElementDeclaration { line: usize, text: String },
    #[error("Line {line}: Invalid relationship: {text}")]
    InvalidRelationship { line: usize, text: String },
    #[error("Line {line}: Invalid view declaration: {text}")]
    InvalidViewDeclaration { line: usize, text: String },
    /// An unexpected fault that escaped the parser, reported in place of any
    /// partial result.
    #[error("Parse error: {message}")]
    Fault { message: String },
}

impl DslError {
    #[must_use]
    pub const fn code(&self) -> DslErrorCode {
        match self {
            Self::MissingWorkspaceHeader { .. } => DslErrorCode::MissingWorkspaceHeader,
            Self::InvalidElementDeclaration { .. } => DslErrorCode::InvalidElementDeclaration,
            Self::InvalidRelationship { .. } => DslErrorCode::InvalidRelationship,
            Self::InvalidViewDeclaration { .. } => DslErrorCode::InvalidViewDeclaration,
            Self::Fault { .. } => DslErrorCode::Fault,
        }
    }

    #[must_use]
    pub const fn line(&self) -> Option<usize> {
        match self {
            Self::MissingWorkspaceHeader { line }
            | Self::InvalidElementDeclaration { line, .. }
            | Self::InvalidRelationship { line, .. }
            | Self::InvalidViewDeclaration { line, .. } => Some(*line),
            Self::Fault { .. } => None,
        }
    }
}
