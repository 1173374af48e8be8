//! Lexical scan of script text for references to external data variables.
//!
//! The scan is deliberately shallow: script text is split into candidate
//! tokens and each token is classified by prefix. Nothing is parsed or
//! executed, so the result is a best-effort approximation of what the script
//! reads, which is what a rendering pipeline needs to prefetch.

use std::sync::OnceLock;

use regex::Regex;

use crate::template::filter_code_fragments;
use crate::vars::UsedVariables;

/// Data-source prefixes recorded verbatim when a token starts with one.
const VARIABLE_PREFIXES: [&str; 5] = [
    "db.",
    "lastEvent.",
    "session.",
    "currentProduct.",
    "currentCategory.",
];

/// Token boundaries: any run of characters outside `[A-Za-z0-9_.]`.
fn token_boundary() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^A-Za-z0-9_.]+").expect("token boundary pattern is valid"))
}

/// The `products<N>` array-slot placeholder at the start of a token.
fn products_placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^products[0-9]+").expect("placeholder pattern is valid"))
}

/// Records every external variable referenced in `code`.
///
/// Each candidate token is classified as follows:
///
/// 1. `products` followed by a digit records only the `products<digits>`
///    prefix (`products12.length` records `products12`), modelling the
///    array-index placeholders scenarios render into.
/// 2. Otherwise a `profile.` prefix records the remainder of the token
///    (`profile.data` records `data`).
/// 3. Independently of rule 2, a token starting with one of `db.`,
///    `lastEvent.`, `session.`, `currentProduct.` or `currentCategory.` is
///    recorded verbatim. A token can be recorded under both rules 2 and 3.
///
/// Anything else (bare identifiers, numeric literals, operators fused into a
/// token) is discarded. Empty input is a no-op.
pub fn scan_code(code: &str, used: &mut UsedVariables) {
    if code.is_empty() {
        return;
    }
    for token in token_boundary().split(code) {
        if token.is_empty() {
            continue;
        }
        if let Some(placeholder) = products_placeholder().find(token) {
            used.record(placeholder.as_str());
        } else if let Some(profile_field) = token.strip_prefix("profile.") {
            used.record(profile_field);
        }
        if VARIABLE_PREFIXES
            .iter()
            .any(|prefix| token.starts_with(prefix))
        {
            used.record(token);
        }
    }
}

/// Records every external variable referenced by the code fragments of a
/// template: filter out the literal text, then scan what remains.
pub fn scan_template(template: &str, used: &mut UsedVariables) {
    scan_code(&filter_code_fragments(template), used);
}
