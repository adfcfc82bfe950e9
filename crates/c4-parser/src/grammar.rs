use c4_core::{ElementType, LayoutDirection, ViewType};
use chumsky::prelude::*;

type Extra<'a> = extra::Err<Rich<'a, char>>;

/// Element keywords in recognition order, with whether a third quoted
/// string is kept as a tag.
pub(crate) const ELEMENT_KEYWORDS: [(&str, ElementType, bool); 4] = [
    ("person", ElementType::Person, false),
    ("softwareSystem", ElementType::SoftwareSystem, true),
    ("container", ElementType::Container, true),
    ("component", ElementType::Component, true),
];

pub(crate) const VIEW_KEYWORDS: [(&str, ViewType); 3] = [
    ("systemContext", ViewType::SystemContext),
    ("container", ViewType::Container),
    ("component", ViewType::Component),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct WorkspaceHeader {
    pub(crate) name: String,
    pub(crate) description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ElementDecl {
    pub(crate) local_name: String,
    pub(crate) element_type: ElementType,
    pub(crate) description: String,
    pub(crate) technology: Option<String>,
    pub(crate) tag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RelationshipDecl {
    pub(crate) source: String,
    pub(crate) target: String,
    pub(crate) description: Option<String>,
    pub(crate) technology: Option<String>,
    pub(crate) tag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ViewDecl {
    pub(crate) view_type: ViewType,
    pub(crate) element_id: String,
    pub(crate) title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ViewDirective {
    Include(Vec<String>),
    Exclude(Vec<String>),
    AutoLayout(LayoutDirection),
}

// ---------------------------------------------------------------------------
// Shared lexical pieces
// ---------------------------------------------------------------------------

fn inline_ws<'a>() -> impl Parser<'a, &'a str, (), Extra<'a>> + Clone {
    any().filter(|c: &char| c.is_whitespace()).repeated().to(())
}

fn required_ws<'a>() -> impl Parser<'a, &'a str, (), Extra<'a>> + Clone {
    any()
        .filter(|c: &char| c.is_whitespace())
        .repeated()
        .at_least(1)
        .to(())
}

fn ident<'a>() -> impl Parser<'a, &'a str, &'a str, Extra<'a>> + Clone {
    any()
        .filter(|c: &char| c.is_ascii_alphanumeric() || *c == '_')
        .repeated()
        .at_least(1)
        .to_slice()
}

fn dotted_ident<'a>() -> impl Parser<'a, &'a str, &'a str, Extra<'a>> + Clone {
    any()
        .filter(|c: &char| c.is_ascii_alphanumeric() || matches!(*c, '_' | '.'))
        .repeated()
        .at_least(1)
        .to_slice()
}

/// A double-quoted string on a single line with at least `min_len` characters.
fn quoted<'a>(min_len: usize) -> impl Parser<'a, &'a str, &'a str, Extra<'a>> + Clone {
    just('"')
        .ignore_then(
            any()
                .filter(|c: &char| *c != '"')
                .repeated()
                .at_least(min_len)
                .to_slice(),
        )
        .then_ignore(just('"'))
}

/// Whitespace followed by a possibly-empty quoted string.
fn trailing_string<'a>() -> impl Parser<'a, &'a str, Option<&'a str>, Extra<'a>> + Clone {
    required_ws().ignore_then(quoted(0)).or_not()
}

fn rest<'a>() -> impl Parser<'a, &'a str, (), Extra<'a>> + Clone {
    any().repeated().to(())
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|text| !text.is_empty()).map(str::to_string)
}

fn run<'a, T>(parser: impl Parser<'a, &'a str, T, Extra<'a>>, input: &'a str) -> Option<T> {
    let (output, errors) = parser.parse(input).into_output_errors();
    if errors.is_empty() { output } else { None }
}

// ---------------------------------------------------------------------------
// Statement matchers
// ---------------------------------------------------------------------------

fn workspace_parser<'a>() -> impl Parser<'a, &'a str, WorkspaceHeader, Extra<'a>> {
    just("workspace")
        .ignore_then(required_ws())
        .ignore_then(quoted(1))
        .then(trailing_string())
        .then_ignore(rest())
        .map(|(name, description)| WorkspaceHeader {
            name: name.to_string(),
            description: non_empty(description),
        })
}

fn element_parser<'a>() -> impl Parser<'a, &'a str, ElementDecl, Extra<'a>> {
    let keyword = choice((
        just(ELEMENT_KEYWORDS[0].0).to(ELEMENT_KEYWORDS[0].1),
        just(ELEMENT_KEYWORDS[1].0).to(ELEMENT_KEYWORDS[1].1),
        just(ELEMENT_KEYWORDS[2].0).to(ELEMENT_KEYWORDS[2].1),
        just(ELEMENT_KEYWORDS[3].0).to(ELEMENT_KEYWORDS[3].1),
    ));

    ident()
        .then_ignore(inline_ws())
        .then_ignore(just('='))
        .then_ignore(inline_ws())
        .then(keyword)
        .then_ignore(required_ws())
        .then(quoted(1))
        .then(trailing_string())
        .then(trailing_string())
        .then_ignore(rest())
        .map(
            |((((local_name, element_type), description), technology), tag)| ElementDecl {
                local_name: local_name.to_string(),
                element_type,
                description: description.to_string(),
                technology: non_empty(technology),
                tag: if accepts_tag(element_type) {
                    non_empty(tag)
                } else {
                    None
                },
            },
        )
}

fn relationship_parser<'a>() -> impl Parser<'a, &'a str, RelationshipDecl, Extra<'a>> {
    dotted_ident()
        .then_ignore(inline_ws())
        .then_ignore(just("->"))
        .then_ignore(inline_ws())
        .then(dotted_ident())
        .then(trailing_string())
        .then(trailing_string())
        .then(trailing_string())
        .then_ignore(rest())
        .map(
            |((((source, target), description), technology), tag)| RelationshipDecl {
                source: source.to_string(),
                target: target.to_string(),
                description: non_empty(description),
                technology: non_empty(technology),
                tag: non_empty(tag),
            },
        )
}

fn view_parser<'a>() -> impl Parser<'a, &'a str, ViewDecl, Extra<'a>> {
    let keyword = choice((
        just(VIEW_KEYWORDS[0].0).to(VIEW_KEYWORDS[0].1),
        just(VIEW_KEYWORDS[1].0).to(VIEW_KEYWORDS[1].1),
        just(VIEW_KEYWORDS[2].0).to(VIEW_KEYWORDS[2].1),
    ));

    keyword
        .then_ignore(required_ws())
        .then(ident())
        .then(trailing_string())
        .then_ignore(rest())
        .map(|((view_type, element_id), title)| ViewDecl {
            view_type,
            element_id: element_id.to_string(),
            title: non_empty(title),
        })
}

fn style_parser<'a>() -> impl Parser<'a, &'a str, &'a str, Extra<'a>> {
    just("element")
        .ignore_then(required_ws())
        .ignore_then(quoted(1))
        .then_ignore(rest())
}

// ---------------------------------------------------------------------------
// Entry points used by the line loop
// ---------------------------------------------------------------------------

fn accepts_tag(element_type: ElementType) -> bool {
    ELEMENT_KEYWORDS
        .iter()
        .any(|(_, candidate, tagged)| *candidate == element_type && *tagged)
}

/// `workspace` as a whole leading word.
pub(crate) fn is_workspace_line(line: &str) -> bool {
    line.strip_prefix("workspace").is_some_and(|rest| {
        rest.chars()
            .next()
            .is_none_or(|c| !(c.is_ascii_alphanumeric() || c == '_'))
    })
}

pub(crate) fn mentions_element_keyword(line: &str) -> bool {
    line.contains('=')
        && ELEMENT_KEYWORDS
            .iter()
            .any(|(keyword, _, _)| line.contains(keyword))
}

pub(crate) fn mentions_view_keyword(line: &str) -> bool {
    VIEW_KEYWORDS
        .iter()
        .any(|(keyword, _)| line.contains(keyword))
}

pub(crate) fn workspace_header(line: &str) -> Option<WorkspaceHeader> {
    run(workspace_parser(), line)
}

pub(crate) fn element_declaration(line: &str) -> Option<ElementDecl> {
    run(element_parser(), line)
}

/// Matches a relationship after dropping any trailing `#` comment.
pub(crate) fn relationship(line: &str) -> Option<RelationshipDecl> {
    let uncommented = line.split('#').next().unwrap_or(line).trim();
    run(relationship_parser(), uncommented)
}

pub(crate) fn view_declaration(line: &str) -> Option<ViewDecl> {
    run(view_parser(), line)
}

pub(crate) fn style_selector(line: &str) -> Option<String> {
    run(style_parser(), line).map(str::to_string)
}

pub(crate) fn view_directive(line: &str) -> Option<ViewDirective> {
    let mut words = line.split_whitespace();
    let items = |words: std::str::SplitWhitespace<'_>| -> Vec<String> {
        words
            .filter(|word| *word != "{" && *word != "}")
            .map(str::to_string)
            .collect()
    };
    match words.next()? {
        "include" => Some(ViewDirective::Include(items(words))),
        "exclude" => Some(ViewDirective::Exclude(items(words))),
        "autoLayout" | "autolayout" => Some(ViewDirective::AutoLayout(
            words
                .next()
                .and_then(LayoutDirection::parse)
                .unwrap_or_default(),
        )),
        _ => None,
    }
}
