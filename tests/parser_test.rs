use preconvert::config::{EscapeRules, PreConversionSpec};
use preconvert::error::Error;
use preconvert::parser::{parse_template, parse_template_with};
use preconvert::template::{Interpolation, InterpolationKind, SourceExpr, TemplateNode};

fn interp(expr: &str, kind: InterpolationKind) -> TemplateNode {
    TemplateNode::Interpolation(Interpolation::new(SourceExpr::parse(expr).unwrap(), kind))
}

#[test]
fn test_all_marker_kinds() {
    let nodes = parse_template("go(#{user.id}, @{home}, @?{search});").unwrap();
    assert_eq!(
        nodes,
        vec![
            TemplateNode::literal("go("),
            interp("user.id", InterpolationKind::Plain),
            TemplateNode::literal(", "),
            interp("home", InterpolationKind::Url),
            TemplateNode::literal(", "),
            interp("search", InterpolationKind::UrlParams),
            TemplateNode::literal(");"),
        ]
    );
}

#[test]
fn test_plain_text_is_one_literal() {
    let nodes = parse_template("var a = {b: 1};\n# not a marker @ {x}").unwrap();
    assert_eq!(nodes, vec![TemplateNode::literal("var a = {b: 1};\n# not a marker @ {x}")]);
}

#[test]
fn test_empty_template() {
    assert!(parse_template("").unwrap().is_empty());
}

#[test]
fn test_adjacent_interpolations() {
    let nodes = parse_template("#{a}#{b}").unwrap();
    assert_eq!(
        nodes,
        vec![interp("a", InterpolationKind::Plain), interp("b", InterpolationKind::Plain)]
    );
}

#[test]
fn test_whitespace_inside_marker() {
    let nodes = parse_template("#{ a }").unwrap();
    assert_eq!(nodes, vec![interp("a", InterpolationKind::Plain)]);
}

#[test]
fn test_backslash_escapes_marker() {
    let nodes = parse_template(r"s = '\#{a}' + \@{b}").unwrap();
    assert_eq!(nodes, vec![TemplateNode::literal("s = '#{a}' + @{b}")]);
}

#[test]
fn test_unterminated_marker_position() {
    match parse_template("ok\nf(#{a);\n") {
        Err(Error::ParseError { line, column, message }) => {
            assert_eq!((line, column), (2, 3));
            assert!(message.contains("unterminated"), "{message}");
        }
        other => panic!("expected a parse error, got {other:?}"),
    }
}

#[test]
fn test_invalid_expression() {
    match parse_template("f(#{a + 1})") {
        Err(Error::ParseError { line, column, message }) => {
            assert_eq!((line, column), (1, 5));
            assert!(message.contains("a + 1"), "{message}");
        }
        other => panic!("expected a parse error, got {other:?}"),
    }
}

#[test]
fn test_protected_markers_stay_literal() {
    let rules = PreConversionSpec::typescript().escape;
    let source = "f(\"#{a}\", '@{b}', `#{c}`, #{d}) // #{e}\ng()";
    let nodes = parse_template_with(source, &rules).unwrap();
    assert_eq!(
        nodes,
        vec![
            TemplateNode::literal("f(\"#{a}\", '@{b}', `#{c}`, "),
            interp("d", InterpolationKind::Plain),
            TemplateNode::literal(") // #{e}\ng()"),
        ]
    );
}

#[test]
fn test_line_prefix_marker_is_still_interpolation() {
    let rules = EscapeRules {
        ignore_balanced: vec![],
        ignore_line: vec!["#".to_string()],
    };
    let nodes = parse_template_with("x = #{a} # note #{b}\ny = 1", &rules).unwrap();
    assert_eq!(
        nodes,
        vec![
            TemplateNode::literal("x = "),
            interp("a", InterpolationKind::Plain),
            TemplateNode::literal(" # note #{b}\ny = 1"),
        ]
    );
}
