use std::collections::BTreeMap;

use c4_core::{DslError, Element, Relationship, Style, View, Workspace};

use crate::ParseResult;
use crate::grammar::{ElementDecl, RelationshipDecl, ViewDecl, ViewDirective, WorkspaceHeader};

pub(crate) struct WorkspaceBuilder {
    workspace: Workspace,
    styles: Vec<Style>,
    element_index_by_id: BTreeMap<String, usize>,
    errors: Vec<DslError>,
}

impl WorkspaceBuilder {
    pub(crate) fn new() -> Self {
        Self {
            workspace: Workspace::empty(),
            styles: Vec::new(),
            element_index_by_id: BTreeMap::new(),
            errors: Vec::new(),
        }
    }

    pub(crate) fn set_header(&mut self, header: WorkspaceHeader) {
        self.workspace.name = header.name;
        if header.description.is_some() {
            self.workspace.description = header.description;
        }
    }

    pub(crate) fn add_error(&mut self, error: DslError) {
        self.errors.push(error);
    }

    pub(crate) fn element_count(&self) -> usize {
        self.workspace.elements.len()
    }

    pub(crate) fn relationship_count(&self) -> usize {
        self.workspace.relationships.len()
    }

    pub(crate) fn view_count(&self) -> usize {
        self.workspace.views.len()
    }

    pub(crate) fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub(crate) fn contains_element(&self, id: &str) -> bool {
        self.element_index_by_id.contains_key(id)
    }

    /// Register a declared element under `parent` and return its full id.
    ///
    /// A repeated id is appended again; lookups resolve to the newest entry.
    pub(crate) fn push_element(&mut self, decl: ElementDecl, parent: Option<&str>) -> String {
        let id = match parent {
            Some(parent_id) => format!("{parent_id}.{}", decl.local_name),
            None => decl.local_name.clone(),
        };

        let element = Element {
            id: id.clone(),
            name: decl.local_name,
            description: decl.description,
            technology: decl.technology,
            tags: decl.tag.into_iter().collect(),
            element_type: decl.element_type,
            parent: parent.map(str::to_string),
        };

        self.element_index_by_id
            .insert(id.clone(), self.workspace.elements.len());
        self.workspace.elements.push(element);
        id
    }

    pub(crate) fn push_relationship(&mut self, decl: RelationshipDecl) {
        let mut relationship = Relationship::between(decl.source, decl.target);
        relationship.description = decl.description;
        relationship.technology = decl.technology;
        relationship.tags = decl.tag.into_iter().collect();
        self.workspace.relationships.push(relationship);
    }

    pub(crate) fn push_view(&mut self, decl: ViewDecl) -> usize {
        let mut view = View::new(decl.view_type, decl.element_id);
        view.title = decl.title;
        self.workspace.views.push(view);
        self.workspace.views.len() - 1
    }

    pub(crate) fn apply_view_directive(&mut self, view_index: usize, directive: ViewDirective) {
        let Some(view) = self.workspace.views.get_mut(view_index) else {
            return;
        };
        match directive {
            ViewDirective::Include(items) => view.includes.extend(items),
            ViewDirective::Exclude(items) => view.excludes.extend(items),
            ViewDirective::AutoLayout(direction) => view.auto_layout = Some(direction),
        }
    }

    pub(crate) fn push_style(&mut self, element: String) {
        self.styles.push(Style { element });
    }

    pub(crate) fn finish(self) -> ParseResult {
        ParseResult {
            workspace: self.workspace,
            styles: self.styles,
            errors: self.errors,
        }
    }
}
