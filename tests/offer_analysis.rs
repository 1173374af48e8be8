//! End-to-end analysis of offer configuration loaded from JSON, the way the
//! platform stores it.

use offer_deps::{
    Analyzer, AlgorithmsMap, ContentTemplate, OfferVariant, ScenariosMap, UsedVariables,
    variables_in_offer,
};
use serde_json::json;

fn algorithms() -> AlgorithmsMap {
    serde_json::from_value(json!({
        "ALG1": {
            "class": "ProductSearch",
            "config": {
                "must": [
                    {
                        "args": [["profile", "db.products.inBasket"]],
                        "operator": "inVariable",
                        "variable": "itemGroupID"
                    }
                ],
                "mustNot": [],
                "should": [
                    {
                        "args": [["currentProduct.itemGroupID + ''"]],
                        "operator": "inExpression",
                        "variable": "alsoViewed30Inverted",
                        "weight": 100
                    }
                ]
            }
        },
        "ALG2": {"class": "LastViewed", "config": {"count": 10}},
        "CHAIN": {
            "class": "Fallbacks",
            "config": {
                "fallbacks": [
                    {"condition": "session.pageType == 'detail'", "ref": "ALG1"},
                    {"condition": "db.segment", "ref": "REMOVED_LONG_AGO"}
                ]
            }
        }
    }))
    .unwrap()
}

fn scenarios() -> ScenariosMap {
    serde_json::from_value(json!({
        "SCE1": {
            "variants": {
                "0": {
                    "name": "default",
                    "template": "<% products1 %>",
                    "logic": {
                        "count": 10,
                        "minCount": 4,
                        "fallbacks": [{"ref": "CHAIN"}, {"ref": "ALG2"}]
                    }
                },
                "1": {
                    "name": "b-variant",
                    "template": "<% products1 %>",
                    "logic": {
                        "fallbacks": [{"condition": "lastEvent.url", "ref": "ALG2"}]
                    }
                }
            }
        }
    }))
    .unwrap()
}

#[test]
fn test_rendered_scenario_slot_pulls_in_algorithm_dependencies() {
    let offer: OfferVariant = serde_json::from_value(json!({
        "content": {
            "headline": "Hello <%= profile.firstName %>",
            "recommendations": "<% products1.length > 0 %>",
            "footer": {"legal": "static text", "year": 2024}
        },
        "scenarios": [{"id": "products1", "scenarioID": "SCE1"}]
    }))
    .unwrap();
    let master: ContentTemplate = serde_json::from_value(json!({
        "template": "<% if(profile.gender) { %> man <% } %>",
        "subject": "Offer for <%= profile.firstName %>"
    }))
    .unwrap();

    let used = variables_in_offer(&offer, Some(&master), &algorithms(), &scenarios());

    let expected: UsedVariables = [
        "firstName",
        "gender",
        // From CHAIN via SCE1 variant 0.
        "session.pageType",
        "db.segment",
        "db.products.inBasket",
        "currentProduct.itemGroupID",
        // From ALG2 (LastViewed) via both variants.
        "db.products.viewed",
        "db.products.viewedRecently",
        // From the condition in variant 1.
        "lastEvent.url",
    ]
    .into_iter()
    .collect();
    assert_eq!(used, expected);
    assert!(!used.contains("products1"));
}

#[test]
fn test_unrendered_scenario_slot_contributes_nothing() {
    let offer: OfferVariant = serde_json::from_value(json!({
        "content": {"headline": "Hello <%= profile.firstName %>"},
        "scenarios": [{"id": "products1", "scenarioID": "SCE1"}]
    }))
    .unwrap();

    let used = variables_in_offer(&offer, None, &algorithms(), &scenarios());

    assert_eq!(used, ["firstName"].into_iter().collect());
}

#[test]
fn test_scenario_slots_expand_left_to_right() {
    let offer: OfferVariant = serde_json::from_value(json!({
        "content": {
            "a": "<% products1 %>",
            "b": "<% products2 %>"
        },
        "scenarios": [
            {"id": "products1", "scenarioID": "SCE1"},
            {"id": "products2", "scenarioID": "SCE1"}
        ]
    }))
    .unwrap();

    let used = variables_in_offer(&offer, None, &algorithms(), &scenarios());

    // Both placeholders are consumed independently.
    assert!(!used.contains("products1"));
    assert!(!used.contains("products2"));
    assert!(used.contains("db.products.viewed"));
}

#[test]
fn test_result_serializes_as_platform_map() {
    let offer: OfferVariant = serde_json::from_value(json!({
        "content": {"a": "<%= db.varx %>"}
    }))
    .unwrap();
    let algorithms = AlgorithmsMap::new();
    let scenarios = ScenariosMap::new();
    let mut used = UsedVariables::new();
    Analyzer::new(&algorithms, &scenarios).offer(&offer, None, &mut used);
    assert_eq!(
        serde_json::to_value(&used).unwrap(),
        json!({"db.varx": true})
    );
}
