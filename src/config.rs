//! Serde model of the content configuration graph.
//!
//! These types mirror the platform's configuration JSON. Deserialization is
//! the only place shape is checked; the analysis itself treats missing or
//! unresolved pieces as "nothing to extract" rather than errors, so a batch
//! run never aborts on one malformed record.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// Algorithm configurations by algorithm ID. Read-only to the analysis.
pub type AlgorithmsMap = HashMap<String, Algorithm>;

/// Scenarios by scenario ID. Read-only to the analysis.
pub type ScenariosMap = HashMap<String, Scenario>;

/// A content-field tree: field names mapped to templates, nested groups or
/// opaque scalars.
pub type ContentFields = BTreeMap<String, ContentField>;

/// One field of an offer's content.
///
/// Only text fields (templates) and nested groups are walked; numbers,
/// booleans and other scalars contribute no variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentField {
    Template(String),
    Group(ContentFields),
    Scalar(serde_json::Value),
}

/// How a `ProductSearch` rule refers to data, decided once when the config
/// is loaded rather than re-derived from the operator name on every walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuleKind {
    /// `…Variable` operators: `args[0][1]` is already the full variable name.
    Variable,
    /// `…Expression` operators: `args[0][0]` is script text to scan.
    Expression,
    /// Anything else references no external data.
    #[default]
    Opaque,
}

impl RuleKind {
    fn of(operator: &str) -> Self {
        if operator.ends_with("Variable") {
            RuleKind::Variable
        } else if operator.ends_with("Expression") {
            RuleKind::Expression
        } else {
            RuleKind::Opaque
        }
    }
}

/// A single filter rule inside a `ProductSearch` algorithm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawRule")]
pub struct Rule {
    pub operator: String,
    pub args: Vec<Vec<String>>,
    #[serde(skip)]
    pub kind: RuleKind,
}

#[derive(Deserialize)]
struct RawRule {
    operator: String,
    #[serde(default)]
    args: Vec<Vec<String>>,
}

impl From<RawRule> for Rule {
    fn from(raw: RawRule) -> Self {
        Rule::new(raw.operator, raw.args)
    }
}

impl Rule {
    pub fn new(operator: impl Into<String>, args: Vec<Vec<String>>) -> Self {
        let operator = operator.into();
        let kind = RuleKind::of(&operator);
        Self {
            operator,
            args,
            kind,
        }
    }
}

/// Search rules grouped by clause. Clause order never changes the variable
/// set, only the search semantics at runtime.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductSearchConfig {
    pub must: Vec<Rule>,
    pub must_not: Vec<Rule>,
    pub should: Vec<Rule>,
}

/// One step of a fallback chain: a gating condition plus a reference to the
/// algorithm tried when the condition holds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackEntry {
    /// Raw script text; scanned, never evaluated.
    pub condition: Option<String>,
    /// Algorithm ID resolved against the [`AlgorithmsMap`].
    #[serde(rename = "ref")]
    pub algorithm: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbacksConfig {
    pub fallbacks: Vec<FallbackEntry>,
}

/// A recommendation algorithm, tagged by its `class` discriminant.
///
/// Classes whose variable needs are fixed carry no payload here even though
/// the stored JSON has one; their extra fields are ignored on load. Classes
/// this analysis knows nothing about fall into [`Algorithm::Other`] and
/// contribute no variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "class")]
pub enum Algorithm {
    ProductSearch { config: ProductSearchConfig },
    LastViewed,
    ProductVariantsInBasket,
    ViewedProductsPriceDrop,
    Fallbacks { config: FallbacksConfig },
    #[serde(other)]
    Other,
}

/// One A/B variant of a scenario: its own template plus the fallback chain
/// that produces its recommendations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioVariant {
    pub template: Option<String>,
    pub logic: ScenarioLogic,
}

/// The `logic` block of a scenario variant. Count thresholds and other
/// tuning knobs are not modelled; only the fallback chain matters for
/// dependency analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioLogic {
    pub fallbacks: Vec<FallbackEntry>,
}

/// A reusable recommendation scenario: variants keyed by variant ID.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub variants: BTreeMap<String, ScenarioVariant>,
}

/// A slot in an offer's content that a scenario renders into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioRef {
    /// The placeholder variable name expected to appear in the content,
    /// e.g. `products1`.
    pub id: String,
    #[serde(rename = "scenarioID")]
    pub scenario_id: String,
}

/// One renderable variant of an offer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OfferVariant {
    pub content: Option<ContentFields>,
    pub scenarios: Vec<ScenarioRef>,
}

/// The master record an offer renders into; each known field is an optional
/// template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContentTemplate {
    pub template: Option<String>,
    pub html_body: Option<String>,
    pub text_body: Option<String>,
    pub subject: Option<String>,
}

impl ContentTemplate {
    /// The master fields in the order they are analyzed.
    pub(crate) fn master_fields(&self) -> [&Option<String>; 4] {
        [
            &self.template,
            &self.html_body,
            &self.text_body,
            &self.subject,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rule_kind_is_decided_at_load_time() {
        let rule: Rule = serde_json::from_value(json!({
            "args": [["profile", "db.products.inBasket"]],
            "operator": "inVariable",
            "variable": "itemGroupID"
        }))
        .unwrap();
        assert_eq!(rule.kind, RuleKind::Variable);

        let rule: Rule = serde_json::from_value(json!({
            "args": [["currentProduct.itemGroupID + ''"]],
            "operator": "inExpression",
            "weight": 100
        }))
        .unwrap();
        assert_eq!(rule.kind, RuleKind::Expression);

        let rule: Rule = serde_json::from_value(json!({
            "args": [],
            "operator": "equals"
        }))
        .unwrap();
        assert_eq!(rule.kind, RuleKind::Opaque);
    }

    #[test]
    fn test_rule_without_operator_is_a_shape_error() {
        let result: Result<Rule, _> = serde_json::from_value(json!({"args": []}));
        assert!(result.is_err());
    }

    #[test]
    fn test_algorithm_class_dispatch() {
        let algorithm: Algorithm = serde_json::from_value(json!({
            "class": "LastViewed",
            "config": {"count": 5}
        }))
        .unwrap();
        assert_eq!(algorithm, Algorithm::LastViewed);

        let algorithm: Algorithm = serde_json::from_value(json!({
            "class": "SomeFutureClass",
            "config": {"whatever": true}
        }))
        .unwrap();
        assert_eq!(algorithm, Algorithm::Other);
    }

    #[test]
    fn test_content_field_shapes() {
        let fields: ContentFields = serde_json::from_value(json!({
            "a": "<% profile.x %>",
            "b": 123,
            "c": true,
            "e": {"x": "nested"}
        }))
        .unwrap();
        assert_eq!(
            fields["a"],
            ContentField::Template("<% profile.x %>".into())
        );
        assert_eq!(fields["b"], ContentField::Scalar(json!(123)));
        assert!(matches!(fields["e"], ContentField::Group(_)));
    }

    #[test]
    fn test_scenario_ref_field_names() {
        let slot: ScenarioRef =
            serde_json::from_value(json!({"id": "products1", "scenarioID": "SCE1"})).unwrap();
        assert_eq!(slot.id, "products1");
        assert_eq!(slot.scenario_id, "SCE1");
    }

    #[test]
    fn test_missing_logic_defaults_to_empty_chain() {
        let variant: ScenarioVariant =
            serde_json::from_value(json!({"template": "<% products1 %>"})).unwrap();
        assert!(variant.logic.fallbacks.is_empty());
    }
}
