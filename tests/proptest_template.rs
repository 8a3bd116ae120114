//! Property-based tests for URL templates and schemas.

use proptest::prelude::*;
use route_contract::response::HttpResult;
use route_contract::schema::{self, Schema};
use route_contract::UrlTemplate;
use serde::Deserialize;
use serde_json::{json, Map, Value};

// ─────────────────────────────────────────────────────────────────────────────
// Strategies
// ─────────────────────────────────────────────────────────────────────────────

/// A placeholder value. Never contains `/`, so it cannot swallow a literal.
fn arb_value() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_.~-]{0,16}"
}

/// A separator literal between two placeholders.
fn arb_middle_literal() -> impl Strategy<Value = String> {
    prop_oneof![Just("/".to_string()), "[a-z]{1,6}".prop_map(|s| format!("/{}/", s))]
}

/// A template with 1..=4 distinct keys and the values to fill it.
fn arb_template_with_values() -> impl Strategy<Value = (UrlTemplate, Map<String, Value>)> {
    (1usize..=4)
        .prop_flat_map(|n| {
            (
                "(/[a-z]{1,8})?".prop_map(|s| format!("{}/", s)),
                prop::collection::vec(arb_middle_literal(), n - 1),
                prop_oneof![Just(String::new()), "/[a-z]{1,6}"],
                prop::collection::vec(arb_value(), n),
            )
        })
        .prop_map(|(head, middles, tail, values)| {
            let mut literals = vec![head];
            literals.extend(middles);
            literals.push(tail);

            let keys: Vec<String> = (0..values.len()).map(|i| format!("k{}", i)).collect();
            let template = UrlTemplate::new(literals, keys.clone()).unwrap();
            let map = keys
                .into_iter()
                .zip(values)
                .map(|(k, v)| (k, Value::String(v)))
                .collect();
            (template, map)
        })
}

// ─────────────────────────────────────────────────────────────────────────────
// Properties
// ─────────────────────────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn build_then_extract_recovers_values((template, values) in arb_template_with_values()) {
        let params = Value::Object(values.clone());
        prop_assert!(template.validate(&params));

        let url = template.build(&params).unwrap();
        let extracted = template.extract(&url);
        prop_assert_eq!(extracted, Some(values));
    }

    #[test]
    fn missing_key_fails_validation((template, values) in arb_template_with_values(), pick in 0usize..4) {
        let mut values = values;
        let key = format!("k{}", pick % values.len());
        values.remove(&key);

        let params = Value::Object(values);
        prop_assert!(!template.validate(&params));
        prop_assert!(template.build(&params).is_err());
    }

    #[test]
    fn non_string_value_fails_validation((template, values) in arb_template_with_values(), n in any::<i64>()) {
        let mut values = values;
        values.insert("k0".to_string(), json!(n));

        let params = Value::Object(values);
        prop_assert!(!template.validate(&params));
    }

    #[test]
    fn pattern_parses_back((template, _) in arb_template_with_values()) {
        let reparsed = UrlTemplate::parse(&template.pattern()).unwrap();
        prop_assert_eq!(reparsed, template);
    }

    #[test]
    fn status_schema_matches_only_its_code(code in 100u16..600, other in 100u16..600, name in "[a-z]{1,10}") {
        #[derive(Deserialize)]
        struct Named {
            #[allow(dead_code)]
            name: String,
        }

        let schema: Schema<HttpResult<Named>> = schema::status(code);
        let value = json!({"statusCode": code, "body": {"name": name}});
        prop_assert!(schema.accepts(&value));
        prop_assert!(schema.narrow(&value).is_some());

        let wrong_code = json!({"statusCode": other, "body": {"name": name}});
        prop_assert_eq!(schema.accepts(&wrong_code), code == other);

        let wrong_body = json!({"statusCode": code, "body": {"name": 1}});
        prop_assert!(!schema.accepts(&wrong_body));
    }
}
