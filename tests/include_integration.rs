//! Include resolution through the public API

use std::path::PathBuf;

use mjml_render::{
    render_with_config, FileSystemIncludeResolver, IncludeError, MapIncludeResolver, RenderConfig,
    RenderError,
};
use pretty_assertions::assert_eq;

fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn fixture_config() -> RenderConfig {
    RenderConfig::new().with_include_resolver(FileSystemIncludeResolver::new(fixtures()))
}

#[test]
fn test_nested_includes_from_files() {
    let html = render_with_config(include_str!("fixtures/with_includes.mjml"), &fixture_config())
        .expect("Should render");

    // header.mjml pulls in title.mjml relative to itself
    assert!(html.contains(">Included title</div>"));
    assert!(html.contains(">Body copy</div>"));
    assert!(html.contains(r#"<p class="legal">Unsubscribe anytime</p>"#));
    assert!(html.contains(".legal { color:#999999; }"));

    let title = html.find("Included title").unwrap_or(usize::MAX);
    let body = html.find("Body copy").unwrap_or(0);
    assert!(title < body, "included section keeps its position");
}

#[test]
fn test_mutual_cycle_detected() {
    let err = render_with_config(include_str!("fixtures/cycle.mjml"), &fixture_config())
        .unwrap_err();
    match err {
        RenderError::Include(IncludeError::Cycle { chain }) => assert_eq!(
            chain,
            vec![
                "partials/loop_a.mjml",
                "partials/loop_b.mjml",
                "partials/loop_a.mjml"
            ]
        ),
        other => panic!("expected cycle, got {other:?}"),
    }
}

#[test]
fn test_self_include_detected() {
    let resolver = MapIncludeResolver::new().with("me.mjml", r#"<mj-include path="me.mjml"/>"#);
    let config = RenderConfig::new().with_include_resolver(resolver);
    let err = render_with_config(
        r#"<mjml><mj-body><mj-include path="me.mjml"/></mj-body></mjml>"#,
        &config,
    )
    .unwrap_err();
    assert!(matches!(err, RenderError::Include(IncludeError::Cycle { .. })));
    assert!(err.to_string().contains("me.mjml -> me.mjml"));
}

#[test]
fn test_depth_limit() {
    let mut resolver = MapIncludeResolver::new();
    for i in 0..5 {
        resolver.insert(
            format!("level{i}.mjml"),
            format!(r#"<mj-include path="level{}.mjml"/>"#, i + 1),
        );
    }
    resolver.insert("level5.mjml", "<mj-section/>");

    let markup = r#"<mjml><mj-body><mj-include path="level0.mjml"/></mj-body></mjml>"#;
    let shallow = RenderConfig::new()
        .with_include_resolver(resolver.clone())
        .with_max_include_depth(3);
    let err = render_with_config(markup, &shallow).unwrap_err();
    assert!(matches!(
        err,
        RenderError::Include(IncludeError::DepthExceeded { limit: 3, .. })
    ));

    let deep = RenderConfig::new().with_include_resolver(resolver);
    assert!(render_with_config(markup, &deep).is_ok());
}

#[test]
fn test_missing_file_reports_chain() {
    let config = fixture_config();
    let err = render_with_config(
        r#"<mjml><mj-body><mj-include path="partials/nope.mjml"/></mj-body></mjml>"#,
        &config,
    )
    .unwrap_err();
    match err {
        RenderError::Include(e @ IncludeError::NotFound { .. }) => {
            assert_eq!(e.chain(), ["partials/nope.mjml"]);
        }
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn test_include_escaping_root_rejected() {
    let err = render_with_config(
        r#"<mjml><mj-body><mj-include path="../Cargo.toml" type="html"/></mj-body></mjml>"#,
        &fixture_config(),
    )
    .unwrap_err();
    assert!(matches!(err, RenderError::Include(IncludeError::NotFound { .. })));
}

#[test]
fn test_css_inline_type_inlines_styles() {
    let resolver = MapIncludeResolver::new().with("theme.css", ".promo { color: #123456 }");
    let config = RenderConfig::new().with_include_resolver(resolver);
    let markup = |kind: &str| {
        format!(
            r#"<mjml><mj-head><mj-include path="theme.css" type="{kind}"/></mj-head><mj-body><mj-section><mj-column><mj-text css-class="promo">x</mj-text></mj-column></mj-section></mj-body></mjml>"#
        )
    };

    let inlined = render_with_config(&markup("css-inline"), &config).expect("Should render");
    let cell = &inlined[inlined.find(r#"class="promo""#).unwrap_or(0)..];
    let cell = &cell[..cell.find('>').unwrap_or(cell.len())];
    assert!(cell.contains("color:#123456;"), "{cell}");
    assert!(!inlined.contains(".promo { color"));

    let head = render_with_config(&markup("css"), &config).expect("Should render");
    assert!(head.contains(".promo { color:#123456; }"));
}

#[test]
fn test_unsupported_include_type() {
    let resolver = MapIncludeResolver::new().with("data.json", "{}");
    let config = RenderConfig::new().with_include_resolver(resolver);
    let err = render_with_config(
        r#"<mjml><mj-body><mj-include path="data.json" type="json"/></mj-body></mjml>"#,
        &config,
    )
    .unwrap_err();
    assert!(matches!(err, RenderError::Include(IncludeError::UnsupportedType { .. })));
}
