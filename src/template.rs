//! A minimal lexer for embedded-script templates and the filter that keeps
//! only the script text between `<%` and `%>` delimiters.
//!
//! The lexer never evaluates or validates the embedded script; it only
//! classifies fragments so the variable scanner can look at code and ignore
//! literal markup.

/// One fragment of a template, in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fragment<'a> {
    /// Literal text outside any code block.
    Literal(&'a str),
    /// An opening delimiter: `<%`, `<%=`, `<%-` or `<%#`.
    Open(&'a str),
    /// The closing delimiter `%>`.
    Close(&'a str),
    /// Script text between an opening and a closing delimiter.
    Code(&'a str),
}

const OPEN: &str = "<%";
const CLOSE: &str = "%>";

/// Splits a template into literal text, delimiter and code fragments.
///
/// The `=`, `-` and `#` delimiter modifiers are kept as part of the opening
/// fragment; for dependency analysis they all mean the same thing. An
/// unterminated code block is not an error: everything after the last opening
/// delimiter is classified as code.
pub fn parse_template_text(template: &str) -> Vec<Fragment<'_>> {
    let mut fragments = Vec::new();
    let mut rest = template;
    while let Some(start) = rest.find(OPEN) {
        if start > 0 {
            fragments.push(Fragment::Literal(&rest[..start]));
        }
        let after_open = &rest[start + OPEN.len()..];
        let modifier = after_open
            .chars()
            .next()
            .filter(|c| matches!(c, '=' | '-' | '#'))
            .map_or(0, char::len_utf8);
        let open_end = start + OPEN.len() + modifier;
        fragments.push(Fragment::Open(&rest[start..open_end]));

        let body = &rest[open_end..];
        match body.find(CLOSE) {
            Some(close) => {
                if close > 0 {
                    fragments.push(Fragment::Code(&body[..close]));
                }
                fragments.push(Fragment::Close(&body[close..close + CLOSE.len()]));
                rest = &body[close + CLOSE.len()..];
            }
            None => {
                if !body.is_empty() {
                    fragments.push(Fragment::Code(body));
                }
                rest = "";
            }
        }
    }
    if !rest.is_empty() {
        fragments.push(Fragment::Literal(rest));
    }
    fragments
}

/// Concatenation (space-joined) of all code fragments in `template`, with
/// delimiters and literal text dropped. Pure function of its input.
pub fn filter_code_fragments(template: &str) -> String {
    let mut inside = false;
    let mut code = Vec::new();
    for fragment in parse_template_text(template) {
        match fragment {
            Fragment::Open(_) => inside = true,
            Fragment::Close(_) => inside = false,
            Fragment::Code(text) if inside => code.push(text),
            Fragment::Code(_) | Fragment::Literal(_) => {}
        }
    }
    code.join(" ")
}
