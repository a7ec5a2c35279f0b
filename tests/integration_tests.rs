use charsheet::parser::build;
use charsheet::{
    normalize, CharacterSheet, EvaluationError, Expression, GameContext, SyntaxError, ValueId,
};

/// Parsing builds the structure the precedence rules promise: `*` binds
/// tighter than `+` and the loosest operator sits at the root.
#[test]
fn test_parse_structure_roundtrip() {
    let ast = build("8*2+1").unwrap();
    let expected = "|__+\n    |__*\n    |   |__8\n    |   |__2\n    |__1\n";
    assert_eq!(ast.pretty(), expected);
}

/// Function calls nest inside arithmetic without disturbing precedence.
#[test]
fn test_parse_function_nesting() {
    let ast = build("8*rounddown(2)+1").unwrap();
    let expected =
        "|__+\n    |__*\n    |   |__8\n    |   |__rounddown\n    |       |__2\n    |__1\n";
    assert_eq!(ast.pretty(), expected);
}

/// Both flavors of unbalanced parentheses are caught before any tree
/// exists.
#[test]
fn test_unbalanced_parentheses() {
    let mut expression = Expression::new(ValueId::new("temp"));
    assert!(matches!(
        expression.set_formula("( 1 * (8)"),
        Err(SyntaxError::UnbalancedParentheses { .. })
    ));
    assert!(matches!(
        expression.set_formula("rounddown(1))"),
        Err(SyntaxError::UnbalancedParentheses { .. })
    ));
}

/// Free-form text normalizes before parsing, so spacing and case are
/// interchangeable.
#[test]
fn test_normalization_feeds_parsing() {
    let spaced = build(&normalize("RoundDown( (sqrt(8 * [Creo Exp] + 1) - 1) / 2 )")).unwrap();
    let tight = build("rounddown((sqrt(8*[creoexp]+1)-1)/2)").unwrap();
    assert_eq!(spaced, tight);
}

/// A formula that would close a dependency loop is rejected and the store
/// is left exactly as it was: the target name stays unset.
#[test]
fn test_cycle_rejection_without_partial_mutation() {
    let mut sheet = CharacterSheet::new();
    let context = GameContext::new();

    sheet
        .set_expression("creo", "[creoexp]*2.0", &context)
        .unwrap();
    let err = sheet
        .set_expression("creoexp", "[creo]*2.0", &context)
        .unwrap_err();
    assert!(matches!(err, SyntaxError::CyclicDependency { .. }));

    assert!(!sheet.contains("creoexp"));
    assert_eq!(sheet.get_value("creoexp", &context).unwrap(), None);

    // the rejected assignment left the graph able to accept the sane one
    sheet.set_value("creoexp", 4.0, &context).unwrap();
    assert_eq!(sheet.get_value("creo", &context).unwrap(), Some(8.0));
}

/// Division by zero is an evaluation-time failure, never a parse-time one.
#[test]
fn test_divide_by_zero_on_read() {
    let mut sheet = CharacterSheet::new();
    let context = GameContext::new();

    sheet.set_value("a", 3.0, &context).unwrap();
    sheet.set_value("b", 0.0, &context).unwrap();
    sheet.set_expression("ratio", "[a]/[b]", &context).unwrap();

    assert_eq!(
        sheet.get_value("ratio", &context).unwrap_err(),
        EvaluationError::DivideByZero
    );
}

/// Changing a base value re-derives every dependent without re-parsing:
/// the expression object bound to the name is the same one throughout.
#[test]
fn test_cache_propagation_without_reparsing() {
    let mut sheet = CharacterSheet::new();
    let context = GameContext::new();

    sheet.set_value("base", 5.0, &context).unwrap();
    sheet.set_expression("derived", "[base]*2", &context).unwrap();
    assert_eq!(sheet.get_value("derived", &context).unwrap(), Some(10.0));

    let tree_before = sheet.expression("derived").unwrap().pretty_tree();
    sheet.set_value("base", 7.0, &context).unwrap();
    assert_eq!(sheet.get_value("derived", &context).unwrap(), Some(14.0));
    let tree_after = sheet.expression("derived").unwrap().pretty_tree();
    assert_eq!(tree_before, tree_after);
}

/// Reads without intervening mutation are stable.
#[test]
fn test_get_value_idempotence() {
    let mut sheet = CharacterSheet::new();
    let context = GameContext::new();

    sheet.set_value("creoexp", 10.0, &context).unwrap();
    sheet
        .set_expression("creo", "rounddown((sqrt(8*[creoexp]+1)-1)/2)", &context)
        .unwrap();

    let first = sheet.get_value("creo", &context).unwrap();
    let second = sheet.get_value("creo", &context).unwrap();
    let third = sheet.get_value("creo", &context).unwrap();
    assert_eq!(first, Some(4.0));
    assert_eq!(first, second);
    assert_eq!(second, third);
}

/// Re-parsing identical normalized text is deterministic.
#[test]
fn test_parse_determinism() {
    for formula in [
        "8*2+1",
        "min(pow(1,2),3)",
        "rounddown((sqrt(8*[creoexp]+1)-1)/2)",
        "max([a],[b],2^3)",
    ] {
        let a = build(formula).unwrap();
        let b = build(formula).unwrap();
        assert_eq!(a, b, "parse of {formula:?} should be deterministic");
    }
}

/// A whole little sheet: base characteristics, derived arts, a lab total
/// over both, and campaign state from the fallback context.
#[test]
fn test_full_sheet_scenario() {
    let mut sheet = CharacterSheet::new();
    let mut context = GameContext::new();
    context.set("Aura", 3.0);

    sheet.set_value("Intelligence", 2.0, &context).unwrap();
    sheet.set_value("Creo Exp", 15.0, &context).unwrap();
    sheet.set_value("Vim Exp", 7.0, &context).unwrap();
    sheet
        .set_expression("Creo", "RoundDown((sqrt(8*[Creo Exp]+1)-1)/2)", &context)
        .unwrap();
    sheet
        .set_expression("Vim", "RoundDown((sqrt(8*[Vim Exp]+1)-1)/2)", &context)
        .unwrap();
    sheet
        .set_expression(
            "Cr Vi Lab Total",
            "[Creo] + [Vim] + [Intelligence] + [Aura]",
            &context,
        )
        .unwrap();

    assert_eq!(sheet.get_value("creo", &context).unwrap(), Some(5.0));
    assert_eq!(sheet.get_value("vim", &context).unwrap(), Some(3.0));
    assert_eq!(
        sheet.get_value("crvilabtotal", &context).unwrap(),
        Some(13.0)
    );

    // a season of study later
    sheet.set_value("Vim Exp", 10.0, &context).unwrap();
    assert_eq!(sheet.get_value("vim", &context).unwrap(), Some(4.0));
    assert_eq!(
        sheet.get_value("crvilabtotal", &context).unwrap(),
        Some(14.0)
    );
}

/// The callback side-channel reports every cascade write with the fresh
/// value.
#[test]
fn test_change_notifications_through_cascade() {
    use std::cell::RefCell;
    use std::rc::Rc;

    let mut sheet = CharacterSheet::new();
    let context = GameContext::new();

    sheet.set_value("creoexp", 3.0, &context).unwrap();
    sheet
        .set_expression("creo", "rounddown((sqrt(8*[creoexp]+1)-1)/2)", &context)
        .unwrap();

    let scores: Rc<RefCell<Vec<f64>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&scores);
    sheet.on_value_change("creo", move |value| sink.borrow_mut().push(value));

    sheet.set_value("creoexp", 10.0, &context).unwrap();
    sheet.set_value("creoexp", 15.0, &context).unwrap();
    assert_eq!(scores.borrow().as_slice(), &[4.0, 5.0]);
}

/// Every syntax-error kind is reachable from plain formula text.
#[test]
fn test_syntax_error_catalogue() {
    let mut sheet = CharacterSheet::new();
    let context = GameContext::new();
    let cases: [(&str, fn(&SyntaxError) -> bool); 8] = [
        ("(1*(8", |e| {
            matches!(e, SyntaxError::UnbalancedParentheses { .. })
        }),
        ("8*(1+[creo)]", |e| {
            matches!(e, SyntaxError::InvalidOrderedParentheses { .. })
        }),
        ("8+[]", |e| {
            matches!(e, SyntaxError::EmptyStateValueName { .. })
        }),
        ("sqrt 10", |e| {
            matches!(e, SyntaxError::IllformedExpression { .. })
        }),
        ("docoolstuff(29)", |e| {
            matches!(e, SyntaxError::InvalidOperation { .. })
        }),
        ("8+[creo!]", |e| {
            matches!(e, SyntaxError::InvalidVariableName { .. })
        }),
        ("sqrt()", |e| matches!(e, SyntaxError::EmptyOperation { .. })),
        ("8.0.0", |e| {
            matches!(e, SyntaxError::InvalidNumberFormat { .. })
        }),
    ];

    for (formula, is_expected) in cases {
        let err = sheet
            .set_expression("temp", formula, &context)
            .unwrap_err();
        assert!(
            is_expected(&err),
            "formula {formula:?} produced unexpected error {err:?}"
        );
        // nothing was stored
        assert!(!sheet.contains("temp"));
    }
}
