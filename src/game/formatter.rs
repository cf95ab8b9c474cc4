//! Message template compilation and rendering.
//!
//! Operators write templates with named placeholders (`{displayname}`).
//! Each message kind has a fixed, ordered placeholder schema; compiling
//! resolves every known name to its schema index once, so rendering is a
//! plain positional substitution.

use std::collections::HashMap;
use std::fmt::Write as _;

use crate::game::markup::MarkupPolicy;

/// A piece of a compiled template.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Arg(usize),
}

/// A compiled, positional message template.
///
/// Immutable. A reload compiles new templates rather than editing these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
    placeholders: HashMap<String, usize>,
    default_text: String,
    markup: MarkupPolicy,
}

impl Template {
    /// Render with schema-ordered arguments.
    ///
    /// A positional marker with no matching argument is left as `{i}`.
    pub fn render<S: AsRef<str>>(&self, args: &[S]) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Arg(i) => match args.get(*i) {
                    Some(arg) => out.push_str(arg.as_ref()),
                    None => {
                        let _ = write!(out, "{{{}}}", i);
                    }
                },
            }
        }
        out
    }

    /// The positional pattern, with known placeholders shown as `{i}`.
    ///
    /// Braces in literal text are doubled, so a typed `{0}` reads `{{0}}`
    /// and never looks like an argument.
    pub fn pattern(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(&text.replace('{', "{{").replace('}', "}}")),
                Segment::Arg(i) => {
                    let _ = write!(out, "{{{}}}", i);
                }
            }
        }
        out
    }

    /// Schema index of a placeholder name, if the schema has it.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.placeholders.get(name).copied()
    }

    /// Text used when the operator configured none.
    pub fn default_text(&self) -> &str {
        &self.default_text
    }

    pub fn markup(&self) -> MarkupPolicy {
        self.markup
    }
}

/// Compiles raw template text against a placeholder schema.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateCompiler;

impl TemplateCompiler {
    /// Compile a template.
    ///
    /// - Absent `raw_text` falls back to `default_text`.
    /// - The markup policy is applied before placeholders are resolved.
    /// - Each `{name}` whose name is in `schema` becomes argument `i`, the
    ///   name's schema index, on every occurrence.
    /// - `{x}` with `x` outside the schema stays literal text.
    ///
    /// Tokens are matched whole, brace to brace, so a name that is a
    /// substring of another (`name` vs `fullname`) never partially matches.
    pub fn compile(
        raw_text: Option<&str>,
        default_text: &str,
        markup: MarkupPolicy,
        schema: &[&str],
    ) -> Template {
        let placeholders: HashMap<String, usize> = schema
            .iter()
            .enumerate()
            .rev()
            .map(|(i, name)| (name.to_string(), i))
            .collect();

        let text = markup.apply(raw_text.unwrap_or(default_text));
        let segments = tokenize(&text, &placeholders);

        Template {
            segments,
            placeholders,
            default_text: default_text.to_string(),
            markup,
        }
    }
}

/// Split text into literals and schema arguments.
fn tokenize(text: &str, placeholders: &HashMap<String, usize>) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut rest = text;

    while let Some(open) = rest.find('{') {
        literal.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let index = after
            .find('}')
            .and_then(|close| placeholders.get(&after[..close]).map(|&i| (i, close)));

        match index {
            Some((i, close)) => {
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Arg(i));
                rest = &after[close + 1..];
            }
            None => {
                // Not a schema token; keep the brace and rescan from the next
                // character so `{{name}` still finds `{name}`.
                literal.push('{');
                rest = after;
            }
        }
    }

    literal.push_str(rest);
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    segments
}
