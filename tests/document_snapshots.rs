//! Snapshot tests for the document skeleton

use mjml_render::{render, render_with_config, RenderConfig};

#[test]
fn test_empty_body_document() {
    let html = render("<mjml><mj-body></mj-body></mjml>").expect("Should render");
    insta::assert_snapshot!(html.trim_end(), @r###"
<!doctype html>
<html lang="und" dir="ltr" xmlns="http://www.w3.org/1999/xhtml">
<head>
  <title></title>
  <meta http-equiv="X-UA-Compatible" content="IE=edge">
  <meta http-equiv="Content-Type" content="text/html; charset=UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <style type="text/css">
    #outlook a { padding:0; }
    body { margin:0;padding:0;-webkit-text-size-adjust:100%;-ms-text-size-adjust:100%; }
    table, td { border-collapse:collapse; }
    img { border:0;height:auto;line-height:100%;outline:none;text-decoration:none;-ms-interpolation-mode:bicubic; }
    p { display:block;margin:13px 0; }
  </style>
</head>
<body style="word-spacing:normal;">
<div lang="und" dir="ltr"></div>
</body>
</html>
"###);
}

#[test]
fn test_title_and_preview_escaped() {
    let html = render(
        "<mjml><mj-head><mj-title>Fish &amp; Chips</mj-title><mj-preview>1 &lt; 2</mj-preview></mj-head><mj-body></mj-body></mjml>",
    )
    .expect("Should render");
    assert!(html.contains("<title>Fish &amp; Chips</title>"));
    assert!(html.contains(">1 &lt; 2</div>"));
}

#[test]
fn test_minified_empty_body_document() {
    let html = render_with_config(
        r##"<mjml lang="sv"><mj-body background-color="#abc"></mj-body></mjml>"##,
        &RenderConfig::new().with_css_minify(true),
    )
    .expect("Should render");
    let body = &html[html.find("<body").unwrap_or(0)..];
    insta::assert_snapshot!(body.trim_end(), @r###"
<body style="word-spacing:normal;background-color:#aabbcc;">
<div style="background-color:#aabbcc" lang="sv" dir="ltr"></div>
</body>
</html>
"###);
}
