//! Recursive traversal of the configuration graph.
//!
//! Every traversal threads one caller-owned [`UsedVariables`] accumulator
//! through its recursive calls. The walk is permissive: unresolved
//! references and missing pieces of config are skipped, so the result may
//! under-approximate a malformed record but a batch analysis never aborts.

use tracing::{debug, trace};

use crate::config::{
    Algorithm, AlgorithmsMap, ContentField, ContentFields, ContentTemplate, FallbackEntry,
    OfferVariant, ProductSearchConfig, Rule, RuleKind, ScenarioVariant, ScenariosMap,
};
use crate::scan::{scan_code, scan_template};
use crate::vars::UsedVariables;

/// Walks offer configuration and collects every external variable the
/// rendering pipeline would have to resolve first.
///
/// Borrows the algorithm and scenario lookup maps for the lifetime of the
/// analysis; both are read-only. The accumulator is owned by the caller and
/// must not be shared across concurrently running analyses.
pub struct Analyzer<'a> {
    algorithms: &'a AlgorithmsMap,
    scenarios: &'a ScenariosMap,
}

impl<'a> Analyzer<'a> {
    pub fn new(algorithms: &'a AlgorithmsMap, scenarios: &'a ScenariosMap) -> Self {
        Self {
            algorithms,
            scenarios,
        }
    }

    /// Walks a content-field tree. Text fields are scanned as templates,
    /// nested groups are walked recursively, other scalars are skipped.
    /// Field names never contribute variables, only values do.
    pub fn content_fields(&self, fields: &ContentFields, used: &mut UsedVariables) {
        for (name, field) in fields {
            match field {
                ContentField::Template(template) => scan_template(template, used),
                ContentField::Group(nested) => self.content_fields(nested, used),
                ContentField::Scalar(_) => {
                    trace!(field = %name, "skipping non-text content field");
                }
            }
        }
    }

    /// Records the variables one algorithm depends on, dispatching on its
    /// class.
    pub fn algorithm(&self, algorithm: &Algorithm, used: &mut UsedVariables) {
        match algorithm {
            Algorithm::ProductSearch { config } => self.product_search(config, used),
            Algorithm::LastViewed => {
                used.record("db.products.viewed");
                used.record("db.products.viewedRecently");
            }
            Algorithm::ProductVariantsInBasket => used.record("db.productVariants.inBasket"),
            Algorithm::ViewedProductsPriceDrop => used.record("db.products.viewed"),
            Algorithm::Fallbacks { config } => self.fallback_chain(&config.fallbacks, used),
            Algorithm::Other => {}
        }
    }

    fn product_search(&self, config: &ProductSearchConfig, used: &mut UsedVariables) {
        let rules = config
            .must
            .iter()
            .chain(&config.must_not)
            .chain(&config.should);
        for rule in rules {
            self.rule(rule, used);
        }
    }

    fn rule(&self, rule: &Rule, used: &mut UsedVariables) {
        let Some(first_arg) = rule.args.first() else {
            return;
        };
        match rule.kind {
            // A direct reference already carries the full variable name; it
            // is recorded verbatim, not run through the prefix classifier.
            RuleKind::Variable => {
                if let Some(name) = first_arg.get(1) {
                    used.record(name.clone());
                }
            }
            RuleKind::Expression => {
                if let Some(expression) = first_arg.first() {
                    scan_code(expression, used);
                }
            }
            RuleKind::Opaque => {}
        }
    }

    /// Walks a fallback chain in order: every condition is scanned, and
    /// every entry whose `ref` resolves recurses into the referenced
    /// algorithm. A dangling reference is skipped, not an error; it usually
    /// means the algorithm was removed after the chain was authored.
    pub fn fallback_chain(&self, fallbacks: &[FallbackEntry], used: &mut UsedVariables) {
        for entry in fallbacks {
            if let Some(condition) = &entry.condition {
                scan_code(condition, used);
            }
            let Some(id) = &entry.algorithm else {
                continue;
            };
            match self.algorithms.get(id) {
                Some(algorithm) => self.algorithm(algorithm, used),
                None => debug!(algorithm = %id, "fallback references an unknown algorithm"),
            }
        }
    }

    /// Variables used by one scenario variant.
    ///
    /// The variant's own template is included only when `include_template`
    /// is set (validation tooling wants it; offer analysis does not, since
    /// the offer's content already represents what gets rendered). The
    /// fallback chain always contributes.
    pub fn scenario_variant(
        &self,
        variant: &ScenarioVariant,
        include_template: bool,
        used: &mut UsedVariables,
    ) {
        if include_template {
            if let Some(template) = &variant.template {
                scan_template(template, used);
            }
        }
        self.fallback_chain(&variant.logic.fallbacks, used);
    }

    /// Full analysis of one offer variant against its master template.
    ///
    /// Content fields and the master-template fields are scanned first.
    /// Scenario references are then expanded strictly left to right, and
    /// only when their placeholder variable was actually recorded by the
    /// walk so far: a slot the content never renders means the scenario
    /// never runs, so its algorithms must not add dependencies. A consumed
    /// placeholder is removed from the result, because it names a rendering
    /// slot rather than data the pipeline has to resolve.
    pub fn offer(
        &self,
        offer: &OfferVariant,
        master: Option<&ContentTemplate>,
        used: &mut UsedVariables,
    ) {
        if let Some(content) = &offer.content {
            self.content_fields(content, used);
        }
        if let Some(master) = master {
            for template in master.master_fields().into_iter().flatten() {
                scan_template(template, used);
            }
        }
        for slot in &offer.scenarios {
            if !used.consume(&slot.id) {
                trace!(placeholder = %slot.id, "scenario slot not rendered, skipping");
                continue;
            }
            let Some(scenario) = self.scenarios.get(&slot.scenario_id) else {
                debug!(scenario = %slot.scenario_id, "offer references an unknown scenario");
                continue;
            };
            for variant in scenario.variants.values() {
                self.scenario_variant(variant, false, used);
            }
        }
    }
}
