#![forbid(unsafe_code)]

mod dsl_parser;
mod grammar;
mod workspace_builder;

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use c4_core::{DslError, Style, Workspace};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use crate::workspace_builder::WorkspaceBuilder;

/// Everything recovered from one DSL document.
///
/// Always structurally valid: malformed lines are reported in `errors` and
/// never abort the parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseResult {
    pub workspace: Workspace,
    pub styles: Vec<Style>,
    pub errors: Vec<DslError>,
}

impl ParseResult {
    /// A result carrying only a fault, with an empty workspace.
    #[must_use]
    pub fn fault(message: impl Into<String>) -> Self {
        Self {
            workspace: Workspace::empty(),
            styles: Vec::new(),
            errors: vec![DslError::Fault {
                message: message.into(),
            }],
        }
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Errors rendered as `Line <n>: <message>` strings, in source order.
    #[must_use]
    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }
}

/// Parse DSL text into a fresh workspace.
#[must_use]
pub fn parse(input: &str) -> ParseResult {
    let mut builder = WorkspaceBuilder::new();
    dsl_parser::parse_dsl(input, &mut builder);
    builder.finish()
}

/// Like [`parse`], but a panic inside the parser is turned into a single
/// [`DslError::Fault`] paired with an empty workspace.
#[must_use]
pub fn parse_guarded(input: &str) -> ParseResult {
    match panic::catch_unwind(AssertUnwindSafe(|| parse(input))) {
        Ok(result) => result,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            warn!(%message, "parser fault");
            ParseResult::fault(message)
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown fault".to_string()
    }
}

#[must_use]
pub fn parse_summary_json(parsed: &ParseResult) -> String {
    json!({
        "workspace": parsed.workspace.name,
        "element_count": parsed.workspace.elements.len(),
        "relationship_count": parsed.workspace.relationships.len(),
        "view_count": parsed.workspace.views.len(),
        "style_count": parsed.styles.len(),
        "error_count": parsed.errors.len(),
        "errors": parsed.error_messages(),
    })
    .to_string()
}
