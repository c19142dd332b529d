/// Property-based roundtrip tests for the Wexpr codecs.
///
/// Uses the `proptest` crate to generate random expression trees and verify
/// that every codec reproduces them exactly:
///
/// - parse(to_text(t, Compact)) == t
/// - parse(to_text(t, HumanReadable)) == t, at any starting indent
/// - from_binary_chunk(to_binary_chunk(t)) == t (BinaryData bytewise)
/// - both codecs agree on the same tree
///
/// Strategies generate value payloads that cross the quoting boundary
/// (empty strings, whitespace, structural characters, `nil`/`null`
/// lookalikes, unicode) and arbitrary binary payloads. Map strategies draw
/// from a hash map so keys are distinct — duplicate keys are replaced at
/// insertion and would never survive a roundtrip comparison.
use proptest::prelude::*;
use wexpr_core::{Expression, ParseFlags, WriteFlags};

// ============================================================================
// Strategies
// ============================================================================

/// Value payloads (also used as map keys), biased toward edge cases.
fn arb_payload() -> impl Strategy<Value = String> {
    prop_oneof![
        // Plain unquoted-safe words
        "[a-zA-Z0-9_.*+-]{1,12}",
        // Printable ASCII, including quotes, backslashes and structural bytes
        "[ -~]{0,20}",
        // Keyword lookalikes must stay values
        Just("nil".to_string()),
        Just("null".to_string()),
        // Empty and whitespace-bearing payloads must quote
        Just(String::new()),
        Just("two words".to_string()),
        Just("line1\nline2\ttab".to_string()),
        // Unicode
        Just("caf\u{e9} \u{4f60}\u{597d}".to_string()),
    ]
}

fn arb_expression() -> impl Strategy<Value = Expression> {
    let leaf = prop_oneof![
        Just(Expression::Null),
        arb_payload().prop_map(Expression::Value),
        prop::collection::vec(any::<u8>(), 0..24).prop_map(Expression::BinaryData),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Expression::Array),
            prop::collection::hash_map(arb_payload(), inner, 0..4)
                .prop_map(|pairs| Expression::Map(pairs.into_iter().collect())),
        ]
    })
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn compact_text_roundtrip(expr in arb_expression()) {
        let text = expr.to_text(0, WriteFlags::Compact);
        let back = Expression::from_text(&text, ParseFlags::None).unwrap();
        prop_assert_eq!(back, expr, "compact roundtrip failed via {:?}", text);
    }

    #[test]
    fn human_readable_text_roundtrip(expr in arb_expression(), indent in 0usize..4) {
        let text = expr.to_text(indent, WriteFlags::HumanReadable);
        let back = Expression::from_text(&text, ParseFlags::None).unwrap();
        prop_assert_eq!(back, expr, "pretty roundtrip failed via {:?}", text);
    }

    #[test]
    fn binary_chunk_roundtrip(expr in arb_expression()) {
        let bytes = expr.to_binary_chunk();
        let back = Expression::from_binary_chunk(&bytes).unwrap();
        prop_assert_eq!(back, expr);
    }

    #[test]
    fn binary_document_roundtrip(expr in arb_expression()) {
        let doc = expr.to_binary_document();
        prop_assert_eq!(doc[0], 0x83);
        let back = Expression::from_buffer(&doc, ParseFlags::None).unwrap();
        prop_assert_eq!(back, expr);
    }

    #[test]
    fn codecs_agree(expr in arb_expression()) {
        let via_text =
            Expression::from_text(&expr.to_text(0, WriteFlags::Compact), ParseFlags::None)
                .unwrap();
        let via_binary = Expression::from_binary_chunk(&expr.to_binary_chunk()).unwrap();
        prop_assert_eq!(via_text, via_binary);
    }

    /// Compact output is canonical: reparsing and reserializing is a fixpoint.
    #[test]
    fn compact_serialization_is_stable(expr in arb_expression()) {
        let first = expr.to_text(0, WriteFlags::Compact);
        let reparsed = Expression::from_text(&first, ParseFlags::None).unwrap();
        prop_assert_eq!(first, reparsed.to_text(0, WriteFlags::Compact));
    }
}
