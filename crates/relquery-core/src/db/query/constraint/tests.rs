use super::*;
use crate::{
    db::query::path::CompilationState,
    model::ConstraintValueError,
    test_support::{COMPANY, DEPARTMENT, USER},
};

fn render_on(
    model: &'static EntityModel,
    constraint: &Constraint,
) -> Result<(String, Params), Error> {
    let mut state = CompilationState::new();
    let mut params = Params::new();
    let config = QueryConfig::default();
    let mut ctx = RenderContext {
        model,
        state: &mut state,
        params: &mut params,
        config: &config,
    };

    let sql = constraint.render(&mut ctx, &ParamScope::top_level("PARAM", 1))?;

    Ok((sql, params))
}

fn render(constraint: &Constraint) -> (String, Params) {
    render_on(&USER, constraint).expect("render")
}

fn bound(params: &Params, name: &str) -> Value {
    params.get(name).cloned().expect("binding present")
}

// ----------------------------------------------------------------------
// Patterns
// ----------------------------------------------------------------------

#[test]
fn prefix_pattern_appends_wildcard() {
    let (sql, params) = render_on(&DEPARTMENT, &Pattern::on("name", "john")).expect("render");

    assert_eq!(sql, "t.name LIKE ${PARAM1}");
    assert_eq!(bound(&params, "PARAM1"), Value::from("john%"));
}

#[test]
fn anywhere_pattern_wraps_both_sides() {
    let (_, params) = render_on(&DEPARTMENT, &Pattern::anywhere("name", "john")).expect("render");

    assert_eq!(bound(&params, "PARAM1"), Value::from("%john%"));
}

#[test]
fn star_becomes_wildcard() {
    let (_, params) = render_on(&DEPARTMENT, &Pattern::on("name", "*llo")).expect("render");

    assert_eq!(bound(&params, "PARAM1"), Value::from("%llo%"));
}

#[test]
fn star_is_literal_when_percent_present() {
    assert_eq!(normalize_pattern("a*b%", false), "a*b%");
    assert_eq!(normalize_pattern("a*b%c", false), "a*b%c%");
}

#[test]
fn ignoring_case_lowers_column_and_value() {
    let (sql, params) =
        render_on(&DEPARTMENT, &Pattern::on_ignoring_case("name", "John")).expect("render");

    assert_eq!(sql, "LOWER(t.name) LIKE ${PARAM1}");
    assert_eq!(bound(&params, "PARAM1"), Value::from("john%"));
}

#[test]
fn wildcard_only_patterns_do_not_contribute() {
    for text in ["", "*", "%", "**", "%%"] {
        let pattern = Pattern::on("loginName", text);

        assert!(!pattern.contributes(), "pattern {text:?} contributed");
        assert_eq!(render(&pattern).0, "");
    }
}

// ----------------------------------------------------------------------
// Comparisons
// ----------------------------------------------------------------------

#[test]
fn eq_ignore_null_drops_null_values() {
    assert!(!Constraint::eq_ignore_null("email", Option::<String>::None).contributes());
    assert!(Constraint::eq_ignore_null("email", "a@b").contributes());
}

#[test]
fn eq_null_still_renders_comparison() {
    let constraint = Constraint::eq("email", Value::Null);
    assert!(constraint.contributes());

    let (sql, params) = render(&constraint);
    assert_eq!(sql, "t.email = ${PARAM1}");
    assert_eq!(bound(&params, "PARAM1"), Value::Null);
}

#[test]
fn operators_render_their_symbols() {
    let cases = [
        (Constraint::lt("age", 1), "t.age < ${PARAM1}"),
        (Constraint::lte("age", 1), "t.age <= ${PARAM1}"),
        (Constraint::gt("age", 1), "t.age > ${PARAM1}"),
        (Constraint::gte("age", 1), "t.age >= ${PARAM1}"),
        (Constraint::ne("age", 1), "t.age <> ${PARAM1}"),
        (Constraint::eq("age", 1), "t.age = ${PARAM1}"),
    ];

    for (constraint, expected) in cases {
        assert_eq!(render(&constraint).0, expected);
    }
}

#[test]
fn eq_ignore_case_lowers_both_sides() {
    let (sql, params) = render(&Constraint::eq_ignore_case("loginName", "JoHn"));

    assert_eq!(sql, "LOWER(t.loginName) = ${PARAM1}");
    assert_eq!(bound(&params, "PARAM1"), Value::from("john"));
}

#[test]
fn values_pass_through_field_conversion() {
    let (_, params) = render(&Constraint::gt("score", 3u8));
    assert_eq!(bound(&params, "PARAM1"), Value::Float(3.0));

    let (_, params) = render(&Constraint::gte("created", 1_700_000_000_000u64));
    assert_eq!(
        bound(&params, "PARAM1"),
        Value::Timestamp(1_700_000_000_000)
    );
}

#[test]
fn custom_conversion_hook_is_used() {
    let (_, params) = render_on(&COMPANY, &Constraint::eq("code", "abc")).expect("render");
    assert_eq!(bound(&params, "PARAM1"), Value::from("ABC"));

    let err = render_on(&COMPANY, &Constraint::eq("code", "abcdef")).unwrap_err();
    assert!(matches!(
        err,
        Error::ConstraintValue(ConstraintValueError { field: "code", .. })
    ));
}

#[test]
fn rejected_value_surfaces_as_constraint_value_error() {
    let err = render_on(&USER, &Constraint::eq("active", "yes")).unwrap_err();

    let Error::ConstraintValue(err) = err else {
        panic!("expected constraint value error, got {err:?}");
    };
    assert_eq!(err.field, "active");
    assert_eq!(err.value, Value::from("yes"));
}

#[test]
fn float_field_never_binds_a_rounded_integer() {
    let (_, params) = render(&Constraint::eq("score", 12i64));
    assert_eq!(bound(&params, "PARAM1"), Value::Float(12.0));

    let err = render_on(&USER, &Constraint::eq("score", 9_007_199_254_740_993i64)).unwrap_err();

    let Error::ConstraintValue(err) = err else {
        panic!("expected constraint value error, got {err:?}");
    };
    assert_eq!(err.field, "score");
    assert_eq!(err.value, Value::Int(9_007_199_254_740_993));
}

#[test]
fn relation_comparison_converts_through_target_key() {
    let (sql, params) = render(&Constraint::eq("department", 5u64));
    assert_eq!(sql, "t.department_id = ${PARAM1}");
    assert_eq!(bound(&params, "PARAM1"), Value::Uint(5));

    let err = render_on(&USER, &Constraint::eq("department", -1)).unwrap_err();
    assert!(matches!(
        err,
        Error::ConstraintValue(ConstraintValueError {
            field: "department",
            ..
        })
    ));
}

#[test]
fn unknown_field_fails_compilation() {
    let err = render_on(&USER, &Constraint::eq("nickname", "x")).unwrap_err();

    assert!(matches!(err, Error::Compile(CompileError::UnknownField { .. })));
}

#[test]
fn relation_path_constraint_joins() {
    let mut state = CompilationState::new();
    let mut params = Params::new();
    let config = QueryConfig::default();
    let mut ctx = RenderContext {
        model: &USER,
        state: &mut state,
        params: &mut params,
        config: &config,
    };

    let sql = Constraint::eq("department.company.name", "acme")
        .render(&mut ctx, &ParamScope::top_level("PARAM", 1))
        .expect("render");

    assert_eq!(sql, "t2.name = ${PARAM1}");
    assert_eq!(state.join_count(), 2);
}

// ----------------------------------------------------------------------
// Null checks and groups
// ----------------------------------------------------------------------

#[test]
fn null_checks_render_is_null_forms() {
    assert_eq!(render(&Constraint::filled("email")).0, "t.email IS NOT NULL");
    assert_eq!(render(&Constraint::not_filled("email")).0, "t.email IS NULL");
}

#[test]
fn disjunction_assigns_child_scopes() {
    let constraint = Constraint::eq("loginName", "a") | Constraint::eq("email", "b");
    let (sql, params) = render(&constraint);

    assert_eq!(sql, "(t.loginName = ${PARAM1_0} OR t.email = ${PARAM1_1})");
    assert_eq!(bound(&params, "PARAM1_0"), Value::from("a"));
    assert_eq!(bound(&params, "PARAM1_1"), Value::from("b"));
}

#[test]
fn skipped_children_keep_their_positions() {
    let constraint = Constraint::or(vec![
        Constraint::eq_ignore_null("loginName", Value::Null),
        Constraint::eq("email", "b"),
    ]);
    let (sql, params) = render(&constraint);

    assert_eq!(sql, "(t.email = ${PARAM1_1})");
    assert_eq!(params.len(), 1);
}

#[test]
fn empty_disjunction_renders_nothing() {
    let constraint = Constraint::or(vec![
        Constraint::eq_ignore_null("loginName", Value::Null),
        Pattern::on("email", ""),
    ]);

    assert!(!constraint.contributes());
    assert_eq!(render(&constraint), (String::new(), Params::new()));
    assert!(!Constraint::or(Vec::new()).contributes());
}

#[test]
fn nested_groups_never_collide() {
    let constraint = Constraint::or(vec![
        Constraint::eq("age", 1),
        Constraint::eq("age", 2) & Constraint::eq("email", "x"),
    ]);
    let (sql, params) = render(&constraint);

    assert_eq!(
        sql,
        "(t.age = ${PARAM1_0} OR (t.age = ${PARAM1_1_0} AND t.email = ${PARAM1_1_1}))"
    );
    let names: Vec<_> = params.iter_pairs().map(|(name, _)| name).collect();
    assert_eq!(names, ["PARAM1_0", "PARAM1_1_0", "PARAM1_1_1"]);
}

#[test]
fn modifiers_leave_unrelated_nodes_alone() {
    let filled = Constraint::filled("email");

    assert_eq!(filled.clone().ignoring_null(), filled);
    assert_eq!(filled.clone().ignoring_case(), filled);
}
