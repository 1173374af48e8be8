//! 'offer-deps' - static variable-dependency analysis for personalization
//! content configuration.
//!
//! A personalization platform renders "offer variants": text templates mixed
//! with conditional recommendation algorithms and reusable scenarios. Before
//! any of that can run, the rendering pipeline must resolve the external
//! data the configuration reads: profile attributes, session values and
//! database-backed product or category facts. This crate computes that set
//! statically, by walking the configuration graph and lexically scanning the
//! embedded script fragments - nothing is executed, validated or resolved.
//!
//! The primary entry point is [`Analyzer::offer`] (or the
//! [`variables_in_offer`] convenience function), which walks an offer's
//! content tree and master template, then expands only those scenarios whose
//! placeholder slot the content actually renders. The lower-level traversals
//! (single templates, content trees, algorithms, fallback chains, scenario
//! variants) are exposed for validation tooling.

pub mod analyze;
pub mod coerce;
pub mod config;
pub mod scan;
pub mod template;
pub mod vars;

pub use analyze::Analyzer;
pub use coerce::{CoerceError, basic_data_type, convert_to_data_type};
pub use config::{
    Algorithm, AlgorithmsMap, ContentField, ContentFields, ContentTemplate, FallbackEntry,
    OfferVariant, ProductSearchConfig, Rule, RuleKind, Scenario, ScenarioRef, ScenarioVariant,
    ScenariosMap,
};
pub use vars::UsedVariables;

/// Variables referenced by the code fragments of a single template string.
///
/// For anything beyond one template, build an [`Analyzer`] and reuse it.
pub fn variables_in_template(template: &str) -> UsedVariables {
    let mut used = UsedVariables::new();
    scan::scan_template(template, &mut used);
    used
}

/// Full analysis of one offer variant: content tree, master template and
/// reachable scenarios, with placeholder slots consumed.
pub fn variables_in_offer(
    offer: &OfferVariant,
    master: Option<&ContentTemplate>,
    algorithms: &AlgorithmsMap,
    scenarios: &ScenariosMap,
) -> UsedVariables {
    let mut used = UsedVariables::new();
    Analyzer::new(algorithms, scenarios).offer(offer, master, &mut used);
    used
}
