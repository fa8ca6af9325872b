//! Reference links, full (`[text][ref]`) and shortcut (`[ref]`).

mod common;

use common::{assert_parses, em, link, strong, t};
use marksome_core::{parse, Segment, Span};

// ============================================================================
// Full and shortcut forms
// ============================================================================

#[test]
fn test_full_reference_link() {
    assert_parses("[foo][bar]", vec![link(vec![t("foo")], "bar")]);
}

#[test]
fn test_shortcut_reference_link() {
    assert_parses("[foo]", vec![link(vec![t("foo")], "foo")]);
    assert_parses(
        "see [docs] now",
        vec![t("see "), link(vec![t("docs")], "docs"), t(" now")],
    );
}

#[test]
fn test_space_separates_two_shortcut_links() {
    assert_parses(
        "[foo] [bar]",
        vec![
            link(vec![t("foo")], "foo"),
            t(" "),
            link(vec![t("bar")], "bar"),
        ],
    );
}

#[test]
fn test_empty_brackets_are_literal() {
    assert_parses("[]", vec![t("[]")]);
    assert_parses("[][foo]", vec![t("[]"), link(vec![t("foo")], "foo")]);
}

// ============================================================================
// Link text
// ============================================================================

#[test]
fn test_link_text_may_contain_brackets() {
    assert_parses(
        r"[link [foo \[bar\]]][ref]",
        vec![link(vec![t("link [foo [bar]]")], "ref")],
    );
}

#[test]
fn test_link_text_may_contain_escaped_full_link() {
    assert_parses(
        r"[link [bar]\[ref]][ref]",
        vec![link(vec![t("link [bar][ref]")], "ref")],
    );
}

#[test]
fn test_link_text_may_contain_inline_content() {
    assert_parses(
        "[link *foo **bar***][ref]",
        vec![link(
            vec![
                t("link "),
                em(vec![t("foo "), strong(vec![t("bar")])]),
            ],
            "ref",
        )],
    );
}

#[test]
fn test_full_link_text_stays_on_one_line() {
    assert_parses(
        "[foo\nbar][ref]",
        vec![
            link(vec![t("foo\nbar")], "foo\nbar"),
            link(vec![t("ref")], "ref"),
        ],
    );
}

// ============================================================================
// Labels and escapes
// ============================================================================

#[test]
fn test_labels_cannot_contain_unescaped_brackets() {
    assert_parses(
        "[foo][ref[bar]]",
        vec![
            link(vec![t("foo")], "foo"),
            t("[ref"),
            link(vec![t("bar")], "bar"),
            t("]"),
        ],
    );
}

#[test]
fn test_labels_may_contain_escaped_brackets() {
    assert_parses(r"[foo][ref\[]", vec![link(vec![t("foo")], r"ref\[")]);
}

#[test]
fn test_escaped_opening_bracket_is_literal() {
    assert_parses(r"\[foo]", vec![t("[foo]")]);
}

#[test]
fn test_escaped_inner_close_falls_back_to_shortcut() {
    assert_parses(r"[foo\][bar]", vec![t("[foo]"), link(vec![t("bar")], "bar")]);
}

// ============================================================================
// Spans
// ============================================================================

#[test]
fn test_link_spans() {
    let segments = parse("a [b][c] d");

    assert_eq!(segments.len(), 3);
    let Segment::ReferenceLink(link) = &segments[1] else {
        panic!("expected reference link, got {:?}", segments[1]);
    };
    assert_eq!(link.span, Span::new(2, 8));
    assert_eq!(link.content[0].span(), Span::new(3, 4));
    assert_eq!(segments[2].span(), Span::new(8, 10));
}

#[test]
fn test_reference_key_borrows_input() {
    let text = String::from("[text][key]");
    let segments = parse(&text);

    let Segment::ReferenceLink(link) = &segments[0] else {
        panic!("expected reference link");
    };
    assert!(matches!(link.reference, std::borrow::Cow::Borrowed("key")));
}
