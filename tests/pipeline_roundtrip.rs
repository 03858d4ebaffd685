use pipexplore::pipeline::{atomize, compose, parse, PassNode};
use pipexplore::PipexploreError;

fn atoms_of(text: &str) -> Vec<String> {
    atomize(&parse(text).expect("well-formed pipeline"))
}

#[test]
fn test_empty_input_parses_to_empty_tree() {
    assert!(parse("").unwrap().is_empty());
    assert!(atoms_of("").is_empty());
}

#[test]
fn test_flat_list() {
    let tree = parse("a,b,c").unwrap();
    assert_eq!(
        tree,
        vec![
            PassNode::Leaf("a".to_string()),
            PassNode::Leaf("b".to_string()),
            PassNode::Leaf("c".to_string()),
        ]
    );
    assert_eq!(atoms_of("a,b,c"), vec!["a", "b", "c"]);
}

#[test]
fn test_nested_manager_expansion() {
    let tree = parse("a(b,c),d").unwrap();
    assert_eq!(
        tree,
        vec![
            PassNode::Manager(
                "a".to_string(),
                vec![
                    PassNode::Leaf("b".to_string()),
                    PassNode::Leaf("c".to_string()),
                ]
            ),
            PassNode::Leaf("d".to_string()),
        ]
    );
    assert_eq!(atoms_of("a(b,c),d"), vec!["a(b)", "a(c)", "d"]);
}

#[test]
fn test_whitespace_is_insignificant() {
    assert_eq!(atoms_of(" a ( b ,\n\tc ) ,\r\nd "), atoms_of("a(b,c),d"));
}

#[test]
fn test_emission_and_verifier_drops() {
    assert_eq!(
        atoms_of("verify,a(b),verify,c,BitcodeWriterPass"),
        vec!["a(b)", "c"]
    );
    // A non-trailing emission pass is kept.
    assert_eq!(
        atoms_of("BitcodeWriterPass,c"),
        vec!["BitcodeWriterPass", "c"]
    );
}

#[test]
fn test_roundtrip_is_idempotent() {
    let cases = [
        "a,b,c",
        "a(b,c),d",
        "x(y(z(w))),v",
        "function(sroa,simplifycfg),cgscc(inline,argpromotion),gvn",
        "verify,module(a,b),BitcodeWriterPass",
        " a ( b , c ) ,\n d ",
    ];
    for case in cases {
        let atoms = atoms_of(case);
        let text = compose(&atoms);
        let reatomized = atoms_of(&text);
        assert_eq!(reatomized, atoms, "round-trip changed atoms for {:?}", case);
        // A second round trip must be a fixed point too.
        assert_eq!(atoms_of(&compose(&reatomized)), atoms);
    }
}

#[test]
fn test_unbalanced_parentheses_are_rejected() {
    assert!(matches!(parse("a(b,c"), Err(PipexploreError::Parse(_))));
    assert!(matches!(parse("a,b)"), Err(PipexploreError::Parse(_))));
    assert!(matches!(parse("a(b))"), Err(PipexploreError::Parse(_))));
}
