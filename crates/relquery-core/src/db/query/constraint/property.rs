use super::*;
use crate::{db::query::path::CompilationState, test_support::USER};
use proptest::prelude::*;
use std::collections::BTreeSet;

const TEXT_FIELDS: [&str; 4] = ["loginName", "email", "department.name", "manager.email"];

fn arb_field() -> impl Strategy<Value = String> {
    prop::sample::select(TEXT_FIELDS.to_vec()).prop_map(str::to_string)
}

fn arb_text_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        "[a-zA-Z0-9_]{0,6}".prop_map(Value::Text),
    ]
}

fn arb_pattern_text() -> impl Strategy<Value = String> {
    "[a-z%*]{0,6}"
}

fn arb_compare_op() -> impl Strategy<Value = CompareOp> {
    prop_oneof![
        Just(CompareOp::Eq),
        Just(CompareOp::Ne),
        Just(CompareOp::Lt),
        Just(CompareOp::Lte),
        Just(CompareOp::Gt),
        Just(CompareOp::Gte),
    ]
}

fn arb_constraint() -> impl Strategy<Value = Constraint> {
    let leaf = prop_oneof![
        (arb_field(), arb_compare_op(), arb_text_value(), any::<bool>()).prop_map(
            |(field, op, value, ignore_null)| {
                let cmp = Constraint::compare(field, op, value);
                if ignore_null { cmp.ignoring_null() } else { cmp }
            }
        ),
        (arb_field(), arb_pattern_text(), any::<bool>()).prop_map(|(field, text, anywhere)| {
            if anywhere {
                Pattern::anywhere(field, text)
            } else {
                Pattern::on(field, text)
            }
        }),
        (arb_field(), any::<bool>()).prop_map(|(field, is_null)| Constraint::NullCheck {
            field,
            is_null
        }),
    ];

    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Constraint::and),
            prop::collection::vec(inner, 0..4).prop_map(Constraint::or),
        ]
    })
}

fn render_tree(constraint: &Constraint) -> (String, Params) {
    let mut state = CompilationState::new();
    let mut params = Params::new();
    let config = QueryConfig::default();
    let mut ctx = RenderContext {
        model: &USER,
        state: &mut state,
        params: &mut params,
        config: &config,
    };

    let sql = constraint
        .render(&mut ctx, &ParamScope::top_level("PARAM", 1))
        .expect("text fields accept text and null");

    (sql, params)
}

proptest! {
    #[test]
    fn normalized_pattern_always_ends_with_wildcard(text in arb_pattern_text(), anywhere in any::<bool>()) {
        let pattern = normalize_pattern(&text, anywhere);

        prop_assert!(pattern.ends_with('%'));
        if anywhere {
            prop_assert!(pattern.starts_with('%'));
        }
    }

    #[test]
    fn literal_text_survives_normalization(text in "[a-z]{1,8}") {
        prop_assert_eq!(normalize_pattern(&text, false), format!("{text}%"));
        prop_assert_eq!(normalize_pattern(&text, true), format!("%{text}%"));
    }

    #[test]
    fn non_contributing_trees_render_nothing(constraint in arb_constraint()) {
        let (sql, params) = render_tree(&constraint);

        prop_assert_eq!(constraint.contributes(), !sql.is_empty());
        if !constraint.contributes() {
            prop_assert!(params.is_empty());
        }
        prop_assert!(!sql.contains("()"));
        prop_assert!(!sql.contains("( AND") && !sql.contains("( OR"));
    }

    #[test]
    fn every_placeholder_has_one_unique_binding(constraint in arb_constraint()) {
        let (sql, params) = render_tree(&constraint);

        let names: BTreeSet<_> = params.iter_pairs().map(|(name, _)| name).collect();
        prop_assert_eq!(names.len(), params.len());
        prop_assert_eq!(sql.matches("${").count(), params.len());
        for name in names {
            let placeholder = format!("${{{name}}}");
            prop_assert!(sql.contains(&placeholder));
        }
    }
}
