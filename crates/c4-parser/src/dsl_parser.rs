use c4_core::DslError;
use tracing::{debug, trace};

use crate::grammar;
use crate::workspace_builder::WorkspaceBuilder;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Model,
    Views,
    Styles,
}

/// One open `{` on the brace stack.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Frame {
    Workspace,
    Section(Section),
    /// A nesting level keyed by an element id.
    Element(String),
    /// A block whose opening line named no known element. No nesting level
    /// is active inside it.
    Unresolved,
    View(usize),
    Style,
}

#[derive(Debug, Default)]
struct SectionTracker {
    frames: Vec<Frame>,
}

impl SectionTracker {
    fn push(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    /// Pops the innermost block. Closing an unresolved block also closes the
    /// section around it. A stray `}` on an empty stack is ignored.
    fn pop(&mut self) {
        if self.frames.pop() == Some(Frame::Unresolved)
            && let Some(at) = self
                .frames
                .iter()
                .rposition(|frame| matches!(frame, Frame::Section(_)))
        {
            self.frames.truncate(at);
        }
    }

    fn section(&self) -> Option<Section> {
        self.frames.iter().rev().find_map(|frame| match frame {
            Frame::Section(section) => Some(*section),
            _ => None,
        })
    }

    /// The nesting parent for new declarations. Only the innermost block
    /// counts; an unresolved block makes its lines top-level.
    fn parent(&self) -> Option<&str> {
        match self.frames.last() {
            Some(Frame::Element(parent)) => Some(parent.as_str()),
            _ => None,
        }
    }

    fn open_view(&self) -> Option<usize> {
        match self.frames.last() {
            Some(Frame::View(index)) => Some(*index),
            _ => None,
        }
    }

    /// Id for a block opened by a line that declared nothing: the first token
    /// resolved under the current parent, then at top level.
    fn resolve_block(&self, line: &str, builder: &WorkspaceBuilder) -> Option<String> {
        let token = line.split_whitespace().next()?;
        if let Some(parent) = self.parent() {
            let nested = format!("{parent}.{token}");
            if builder.contains_element(&nested) {
                return Some(nested);
            }
        }
        builder
            .contains_element(token)
            .then(|| token.to_string())
    }
}

enum Recognized {
    Nothing,
    Workspace,
    Element(String),
    View(usize),
}

pub(crate) fn parse_dsl(input: &str, builder: &mut WorkspaceBuilder) {
    let mut tracker = SectionTracker::default();

    for (index, raw_line) in input.lines().enumerate() {
        let line_number = index + 1;
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        match line {
            "model {" => {
                tracker.push(Frame::Section(Section::Model));
                continue;
            }
            "views {" => {
                tracker.push(Frame::Section(Section::Views));
                continue;
            }
            "styles {" => {
                tracker.push(Frame::Section(Section::Styles));
                continue;
            }
            "}" => {
                tracker.pop();
                continue;
            }
            _ => {}
        }

        let recognized = recognize_line(line, line_number, &tracker, builder);

        if line.ends_with('{') {
            let frame = match recognized {
                Recognized::Workspace => Frame::Workspace,
                Recognized::Element(id) => Frame::Element(id),
                Recognized::View(view_index) => Frame::View(view_index),
                Recognized::Nothing if tracker.section() == Some(Section::Styles) => Frame::Style,
                Recognized::Nothing => tracker
                    .resolve_block(line, builder)
                    .map_or(Frame::Unresolved, Frame::Element),
            };
            trace!(line = line_number, ?frame, "open block");
            tracker.push(frame);
        }
    }

    debug!(
        elements = builder.element_count(),
        relationships = builder.relationship_count(),
        views = builder.view_count(),
        errors = builder.error_count(),
        "parsed workspace"
    );
}

fn recognize_line(
    line: &str,
    line_number: usize,
    tracker: &SectionTracker,
    builder: &mut WorkspaceBuilder,
) -> Recognized {
    if grammar::is_workspace_line(line) {
        match grammar::workspace_header(line) {
            Some(header) => builder.set_header(header),
            None => builder.add_error(DslError::MissingWorkspaceHeader { line: line_number }),
        }
        return Recognized::Workspace;
    }

    match tracker.section() {
        Some(Section::Model) => recognize_model_line(line, line_number, tracker, builder),
        Some(Section::Views) => recognize_views_line(line, line_number, tracker, builder),
        Some(Section::Styles) => {
            if line.contains("element")
                && let Some(selector) = grammar::style_selector(line)
            {
                trace!(line = line_number, %selector, "style");
                builder.push_style(selector);
            }
            Recognized::Nothing
        }
        None => Recognized::Nothing,
    }
}

fn recognize_model_line(
    line: &str,
    line_number: usize,
    tracker: &SectionTracker,
    builder: &mut WorkspaceBuilder,
) -> Recognized {
    if grammar::mentions_element_keyword(line) {
        let Some(decl) = grammar::element_declaration(line) else {
            builder.add_error(DslError::InvalidElementDeclaration {
                line: line_number,
                text: line.to_string(),
            });
            return Recognized::Nothing;
        };
        let id = builder.push_element(decl, tracker.parent());
        trace!(line = line_number, %id, "element");
        return Recognized::Element(id);
    }

    if line.contains("->") {
        match grammar::relationship(line) {
            Some(decl) => {
                trace!(line = line_number, source = %decl.source, target = %decl.target, "relationship");
                builder.push_relationship(decl);
            }
            None => builder.add_error(DslError::InvalidRelationship {
                line: line_number,
                text: line.to_string(),
            }),
        }
    }

    Recognized::Nothing
}

fn recognize_views_line(
    line: &str,
    line_number: usize,
    tracker: &SectionTracker,
    builder: &mut WorkspaceBuilder,
) -> Recognized {
    if let Some(view_index) = tracker.open_view()
        && let Some(directive) = grammar::view_directive(line)
    {
        builder.apply_view_directive(view_index, directive);
        return Recognized::Nothing;
    }

    if !grammar::mentions_view_keyword(line) {
        return Recognized::Nothing;
    }

    match grammar::view_declaration(line) {
        Some(decl) => {
            trace!(line = line_number, view = %decl.view_type, element = %decl.element_id, "view");
            Recognized::View(builder.push_view(decl))
        }
        None => {
            builder.add_error(DslError::InvalidViewDeclaration {
                line: line_number,
                text: line.to_string(),
            });
            Recognized::Nothing
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Frame, Section, SectionTracker};

    #[test]
    fn section_is_nearest_section_frame() {
        let mut tracker = SectionTracker::default();
        assert_eq!(tracker.section(), None);
        tracker.push(Frame::Workspace);
        tracker.push(Frame::Section(Section::Views));
        tracker.push(Frame::View(0));
        assert_eq!(tracker.section(), Some(Section::Views));
        assert_eq!(tracker.open_view(), Some(0));
        tracker.push(Frame::Section(Section::Styles));
        assert_eq!(tracker.section(), Some(Section::Styles));
        tracker.pop();
        tracker.pop();
        assert_eq!(tracker.open_view(), None);
        assert_eq!(tracker.section(), Some(Section::Views));
    }

    #[test]
    fn parent_comes_from_innermost_block_only() {
        let mut tracker = SectionTracker::default();
        tracker.push(Frame::Section(Section::Model));
        tracker.push(Frame::Element("shop".to_string()));
        assert_eq!(tracker.parent(), Some("shop"));
        tracker.push(Frame::Element("shop.api".to_string()));
        assert_eq!(tracker.parent(), Some("shop.api"));
        tracker.pop();
        assert_eq!(tracker.parent(), Some("shop"));
        tracker.push(Frame::Unresolved);
        assert_eq!(tracker.parent(), None);
    }

    #[test]
    fn closing_unresolved_block_ends_its_section() {
        let mut tracker = SectionTracker::default();
        tracker.push(Frame::Workspace);
        tracker.push(Frame::Section(Section::Model));
        tracker.push(Frame::Element("shop".to_string()));
        tracker.push(Frame::Unresolved);
        tracker.pop();
        assert_eq!(tracker.section(), None);
        assert_eq!(tracker.frames, vec![Frame::Workspace]);
    }

    #[test]
    fn closing_style_block_keeps_styles_open() {
        let mut tracker = SectionTracker::default();
        tracker.push(Frame::Section(Section::Views));
        tracker.push(Frame::Section(Section::Styles));
        tracker.push(Frame::Style);
        tracker.pop();
        assert_eq!(tracker.section(), Some(Section::Styles));
    }

    #[test]
    fn stray_close_is_ignored() {
        let mut tracker = SectionTracker::default();
        tracker.pop();
        assert!(tracker.frames.is_empty());
    }
}
