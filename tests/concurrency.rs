//! Concurrent renders share only the read-only registry

use std::sync::Arc;
use std::thread;

use mjml_render::{render, render_with_config, ComponentRegistry, RenderConfig};
use pretty_assertions::assert_eq;

const INPUTS: &[&str] = &[
    include_str!("fixtures/newsletter.mjml"),
    "<mjml><mj-body><mj-section><mj-column><mj-text>Hello</mj-text></mj-column></mj-section></mj-body></mjml>",
    r#"<mjml><mj-body><mj-section><mj-column width="25%"><mj-button href="https://example.com">Go</mj-button></mj-column><mj-column><mj-navbar hamburger="hamburger"><mj-navbar-link href="/a">A</mj-navbar-link></mj-navbar></mj-column></mj-section></mj-body></mjml>"#,
];

#[test]
fn test_threads_match_sequential_output() {
    let expected: Vec<String> = INPUTS
        .iter()
        .map(|input| render(input).expect("Should render"))
        .collect();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            thread::spawn(move || {
                let input = INPUTS[i % INPUTS.len()];
                (i % INPUTS.len(), render(input).expect("Should render"))
            })
        })
        .collect();

    for handle in handles {
        let (index, html) = handle.join().expect("render thread panicked");
        assert_eq!(html, expected[index]);
    }
}

#[test]
fn test_shared_registry_and_config() {
    let config = Arc::new(
        RenderConfig::new()
            .with_registry(Arc::new(ComponentRegistry::default()))
            .with_css_minify(true),
    );
    let expected = render_with_config(INPUTS[2], &config).expect("Should render");

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let config = Arc::clone(&config);
            thread::spawn(move || render_with_config(INPUTS[2], &config).expect("Should render"))
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().expect("render thread panicked"), expected);
    }
}
