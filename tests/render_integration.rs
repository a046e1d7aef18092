//! End-to-end tests for the render pipeline

use mjml_render::{render, render_with_config, RenderConfig, RenderError};
use pretty_assertions::assert_eq;

const HELLO: &str = "<mjml><mj-body><mj-section><mj-column><mj-text>Hello</mj-text></mj-column></mj-section></mj-body></mjml>";

/// The opening tag that contains `needle`
fn tag_containing<'a>(html: &'a str, needle: &str) -> &'a str {
    let at = html
        .find(needle)
        .unwrap_or_else(|| panic!("{needle} not found in output"));
    let start = html[..at].rfind('<').unwrap_or(0);
    let end = at + html[at..].find('>').unwrap_or(html.len() - at);
    &html[start..=end]
}

fn wrap(head: &str, column: &str) -> String {
    format!(
        "<mjml><mj-head>{head}</mj-head><mj-body><mj-section><mj-column>{column}</mj-column></mj-section></mj-body></mjml>"
    )
}

#[test]
fn test_hello_world() {
    let html = render(HELLO).expect("Should render");
    assert!(html.contains(concat!(
        r#"<div style="font-family:Ubuntu, Helvetica, Arial, sans-serif;"#,
        r#"font-size:13px;line-height:1;text-align:left;color:#000000;">Hello</div>"#
    )));
    assert!(html.contains("mj-column-per-100"));
    assert!(html.contains(r#"<body style="word-spacing:normal;">"#));
    // Ubuntu is referenced by the default font stack
    assert!(html.contains("https://fonts.googleapis.com/css?family=Ubuntu:300,400,500,700"));
}

#[test]
fn test_output_is_deterministic() {
    let input = include_str!("fixtures/newsletter.mjml");
    let first = render(input).expect("Should render");
    for _ in 0..5 {
        assert_eq!(render(input).expect("Should render"), first);
    }
}

#[test]
fn test_newsletter_fixture() {
    let html = render(include_str!("fixtures/newsletter.mjml")).expect("Should render");

    assert!(html.contains(r#"<html lang="en" dir="ltr""#));
    assert!(html.contains("<title>Monthly update</title>"));
    assert!(html.contains(">What shipped this month</div>"));
    assert!(html.contains(r#"<body style="word-spacing:normal;background-color:#f4f4f4;">"#));

    // Declared font is linked because mj-all puts it in every font-family
    assert!(html.contains(r#"<link href="https://fonts.example/raleway.css""#));

    // Raw inner markup of mj-text survives
    assert!(html.contains("Release <b>2.0</b> is out"));

    // Column classes and their media rules at the declared breakpoint
    assert!(html.contains("mj-column-per-40"));
    assert!(html.contains("mj-column-per-60"));
    assert!(html.contains(
        "@media only screen and (min-width:520px) { .mj-column-per-40 { width:40% !important; max-width:40%; } }"
    ));

    // Non-inlinable author CSS lands in the head
    assert!(html.contains(".footer a:hover { color:#ff6600; }"));
}

#[test]
fn test_cascade_precedence() {
    let head = r##"<mj-attributes>
        <mj-all color="#111111"/>
        <mj-text color="#222222"/>
        <mj-class name="first" color="#333333"/>
        <mj-class name="second" color="#444444"/>
    </mj-attributes>"##;
    let column = r##"
        <mj-text css-id="intrinsic-all">a</mj-text>
        <mj-text css-id="one-class" mj-class="first">b</mj-text>
        <mj-text css-id="two-classes" mj-class="first second">c</mj-text>
        <mj-text css-id="literal" mj-class="first second" color="#555555">d</mj-text>
    "##;
    let html = render(&wrap(head, column)).expect("Should render");

    let colors: Vec<&str> = ["a</div>", "b</div>", "c</div>", "d</div>"]
        .iter()
        .map(|needle| {
            let tag = tag_containing(&html, needle);
            let start = tag.find("color:").map(|i| i + "color:".len()).unwrap_or(0);
            &tag[start..start + 7]
        })
        .collect();
    assert_eq!(colors, vec!["#222222", "#333333", "#444444", "#555555"]);
}

#[test]
fn test_specificity_beats_source_order() {
    let head = r#"<mj-style inline="inline">
        #hero { color: blue }
        .promo { color: red }
        mj-text { color: green }
    </mj-style>"#;
    let column = r#"<mj-text css-class="promo" css-id="hero">x</mj-text><mj-text css-class="promo">y</mj-text><mj-text>z</mj-text>"#;
    let html = render(&wrap(head, column)).expect("Should render");

    let hero = tag_containing(&html, r#"id="hero""#);
    assert!(hero.contains("color:blue;"), "{hero}");

    let promo = tag_containing(&html, r#"class="promo" style"#);
    assert!(promo.contains("color:red;"), "{promo}");
}

#[test]
fn test_later_rule_wins_at_equal_specificity() {
    let head = r#"<mj-style inline="inline">.a { color: red } .b { color: orange }</mj-style>"#;
    let column = r#"<mj-text css-class="b a">x</mj-text>"#;
    let html = render(&wrap(head, column)).expect("Should render");
    let cell = tag_containing(&html, r#"class="b a""#);
    assert!(cell.contains("color:orange;"), "{cell}");
}

#[test]
fn test_width_normalisation() {
    let three = "<mjml><mj-body><mj-section><mj-column/><mj-column/><mj-column/></mj-section></mj-body></mjml>";
    let html = render(three).expect("Should render");
    assert_eq!(html.matches(r#"class="mj-column-per-33-33"#).count(), 3);

    let overflowing = r#"<mjml><mj-body><mj-section><mj-column width="80%"/><mj-column width="60%"/></mj-section></mj-body></mjml>"#;
    let html = render(overflowing).expect("Should render");
    assert!(html.contains("mj-column-per-57-14"));
    assert!(html.contains("mj-column-per-42-86"));
}

#[test]
fn test_lenient_and_strict_modes() {
    let input = "<mjml><mj-body><mj-section><mj-column><mj-sparkle/><mj-text>kept</mj-text></mj-column></mj-section></mj-body></mjml>";

    let html = render(input).expect("Lenient mode skips unknown tags");
    assert!(html.contains("kept"));
    assert!(!html.contains("mj-sparkle"));

    let err = render_with_config(input, &RenderConfig::new().with_strict(true)).unwrap_err();
    assert!(matches!(err, RenderError::UnknownComponent { ref tag, .. } if tag == "mj-sparkle"));
    assert_eq!(err.to_string(), "unknown component <mj-sparkle>");
}

#[test]
fn test_unknown_subtree_across_modes() {
    let with_unknown = wrap(
        "",
        "<mj-text>before</mj-text><mj-sparkle glow=\"1\"><mj-text>inside</mj-text></mj-sparkle><mj-text>after</mj-text>",
    );
    let without = wrap("", "<mj-text>before</mj-text><mj-text>after</mj-text>");

    let lenient = RenderConfig::new();
    let html = render_with_config(&with_unknown, &lenient).expect("Lenient mode skips unknown tags");
    assert!(!html.contains("inside"));
    assert_eq!(html, render(&without).expect("Should render"));

    let strict = lenient.with_strict(true);
    let err = render_with_config(&with_unknown, &strict).unwrap_err();
    assert!(matches!(err, RenderError::UnknownComponent { ref tag, .. } if tag == "mj-sparkle"));
    let span = err.span().expect("unknown component carries a span");
    assert!(with_unknown[span.clone()].contains("mj-sparkle"));

    assert!(render_with_config(&without, &strict).is_ok());
}

#[test]
fn test_minified_output() {
    let html = render_with_config(HELLO, &RenderConfig::new().with_css_minify(true))
        .expect("Should render");
    assert!(html.contains("font-family:Ubuntu,Helvetica,Arial,sans-serif;font-size:13px"));
    assert!(html.contains("<style type=\"text/css\">#outlook a { padding:0; }"));
}

#[test]
fn test_failure_produces_no_output() {
    let result = render("<mjml><mj-body><mj-section><mj-column><mj-image/></mj-column></mj-section></mj-body></mjml>");
    match result {
        Err(RenderError::Attribute(e)) => assert_eq!(e.attribute, "src"),
        other => panic!("expected attribute error, got {other:?}"),
    }
}
