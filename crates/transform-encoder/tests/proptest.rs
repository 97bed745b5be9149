//! Property-based tests for the resolver and renderer using proptest.

use proptest::prelude::*;
use serde_json::{Map, Value};
use transform_encoder::path::{resolve, resolve_chain};
use transform_encoder::Template;

// ============================================================================
// Test helpers
// ============================================================================

// Keys that need no escaping and contain no template or path syntax.
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-z_]{1,8}"
}

fn scalar_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
        Just(Value::Null),
        "[a-zA-Z0-9 .,/-]{0,16}".prop_map(Value::from),
    ]
}

fn record_strategy() -> impl Strategy<Value = Map<String, Value>> {
    prop::collection::btree_map(key_strategy(), scalar_strategy(), 0..8)
        .prop_map(|entries| entries.into_iter().collect())
}

fn to_bytes(record: &Map<String, Value>) -> Vec<u8> {
    serde_json::to_vec(record).unwrap()
}

// ============================================================================
// Property tests
// ============================================================================

proptest! {
    /// Arbitrary bytes and paths never make the resolver panic.
    #[test]
    fn resolver_is_total(
        record in prop::collection::vec(any::<u8>(), 0..128),
        path in "[a-z>\\[\\]0-9:]{0,16}",
        unescape in any::<bool>(),
    ) {
        let _ = resolve(&record, &path, unescape);
        let _ = resolve_chain(&record, &path, unescape);
    }

    /// Rendering never panics and always yields exactly one terminated line
    /// for templates without newlines.
    #[test]
    fn render_always_terminates_line(
        template in "[a-z{}:> \\\\\"]{0,32}",
        record in record_strategy(),
        unescape in any::<bool>(),
    ) {
        let out = Template::parse(&template).render(&to_bytes(&record), unescape, "-");
        prop_assert!(out.ends_with('\n'));
        prop_assert_eq!(out.matches('\n').count(), 1);
    }

    /// Rendering the same template against the same record is deterministic.
    #[test]
    fn render_is_deterministic(
        keys in prop::collection::vec(key_strategy(), 1..5),
        record in record_strategy(),
    ) {
        let source: String = keys.iter().map(|k| format!("{{{}}} ", k)).collect();
        let template = Template::parse(&source);
        let bytes = to_bytes(&record);
        prop_assert_eq!(template.render(&bytes, false, "-"), template.render(&bytes, false, "-"));
    }

    /// A present, non-empty top-level string renders as itself.
    #[test]
    fn present_string_renders_verbatim(
        key in key_strategy(),
        value in "[a-zA-Z0-9 .,/-]{1,16}",
    ) {
        let mut record = Map::new();
        record.insert(key.clone(), Value::from(value.clone()));
        let out = Template::parse(&format!("<{{{}}}>", key)).render(&to_bytes(&record), false, "-");
        prop_assert_eq!(out, format!("<{}>\n", value));
    }

    /// A key missing from the record renders the default.
    #[test]
    fn absent_key_renders_default(
        record in record_strategy(),
        default in "[a-z?-]{0,4}",
    ) {
        // Uppercase keys never appear in generated records.
        let out = Template::parse("{MISSING}").render(&to_bytes(&record), true, &default);
        prop_assert_eq!(out, format!("{}\n", default));
    }

    /// The first resolvable path of a fallback chain wins.
    #[test]
    fn fallback_picks_first_present(
        record in record_strategy(),
        chain in prop::collection::vec(key_strategy(), 1..4),
    ) {
        let bytes = to_bytes(&record);
        let expected = chain
            .iter()
            .find_map(|key| record.get(key))
            .map(|value| match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| "-".to_string());

        let out = Template::parse(&format!("{{{}}}", chain.join(":"))).render(&bytes, false, "-");
        prop_assert_eq!(out, format!("{}\n", expected));
    }

    /// Output that already ends with a newline gets no second one.
    #[test]
    fn terminator_not_doubled(text in "[a-z {}:>]{0,24}", record in record_strategy()) {
        let bytes = to_bytes(&record);
        let bare = Template::parse(&text).render(&bytes, false, "-");
        let terminated = Template::parse(&format!("{}\n", text)).render(&bytes, false, "-");
        prop_assert_eq!(bare, terminated);
    }

    /// Plain text without braces, backslashes or newlines passes through.
    #[test]
    fn plain_text_passes_through(text in "[a-zA-Z0-9 .,;!?-]{0,40}") {
        let out = Template::parse(&text).render(b"{}", false, "-");
        prop_assert_eq!(out, format!("{}\n", text));
    }
}
