//! HTML document assembly
//!
//! The body is rendered by the components; this module wraps it in the
//! document skeleton: head metadata, reset styles, font links and the
//! collected head stylesheet.

use tracing::debug;

use super::config::HtmlConfig;
use super::head::{FontLink, HeadMetadata};
use crate::components::RenderContext;
use crate::parser::Node;

const BODY_TAG: &str = "mj-body";

/// Reset rules every document carries
const BASE_STYLES: &[&str] = &[
    "#outlook a { padding:0; }",
    "body { margin:0;padding:0;-webkit-text-size-adjust:100%;-ms-text-size-adjust:100%; }",
    "table, td { border-collapse:collapse; }",
    "img { border:0;height:auto;line-height:100%;outline:none;text-decoration:none;-ms-interpolation-mode:bicubic; }",
    "p { display:block;margin:13px 0; }",
];

const PREVIEW_STYLE: &str = "display:none;font-size:1px;color:#ffffff;line-height:1px;max-height:0px;max-width:0px;opacity:0;overflow:hidden;";

/// Builder for the output document
pub struct DocumentBuilder<'a> {
    config: &'a HtmlConfig,
    head: Vec<String>,
    body: Vec<String>,
}

impl<'a> DocumentBuilder<'a> {
    pub fn new(config: &'a HtmlConfig) -> Self {
        Self {
            config,
            head: vec![],
            body: vec![],
        }
    }

    fn style_block(&self, rules: &[&str]) -> String {
        let css = if self.config.css_minify {
            rules.concat()
        } else {
            rules
                .iter()
                .map(|r| format!("    {r}"))
                .collect::<Vec<_>>()
                .join("\n")
        };
        self.wrap_style(&css)
    }

    fn wrap_style(&self, css: &str) -> String {
        if self.config.css_minify {
            format!(r#"<style type="text/css">{css}</style>"#)
        } else {
            format!("<style type=\"text/css\">\n{css}\n  </style>")
        }
    }

    /// Title, meta tags and the reset stylesheet
    pub fn add_preamble(&mut self, title: &str) {
        self.head.push(format!("<title>{}</title>", escape_html(title)));
        self.head
            .push(r#"<meta http-equiv="X-UA-Compatible" content="IE=edge">"#.to_string());
        self.head.push(
            r#"<meta http-equiv="Content-Type" content="text/html; charset=UTF-8">"#.to_string(),
        );
        self.head.push(
            r#"<meta name="viewport" content="width=device-width, initial-scale=1">"#.to_string(),
        );
        let reset = self.style_block(BASE_STYLES);
        self.head.push(reset);
    }

    /// A `<link>` per font plus one `@import` block
    pub fn add_fonts(&mut self, fonts: &[&FontLink]) {
        if fonts.is_empty() {
            return;
        }
        for font in fonts {
            self.head.push(format!(
                r#"<link href="{}" rel="stylesheet" type="text/css">"#,
                escape_attr(&font.href)
            ));
        }
        let imports: Vec<String> = fonts
            .iter()
            .map(|f| format!("@import url({});", f.href.replace(')', "%29")))
            .collect();
        let imports: Vec<&str> = imports.iter().map(String::as_str).collect();
        let block = self.style_block(&imports);
        self.head.push(block);
    }

    /// The collected head stylesheet, skipped when empty
    pub fn add_stylesheet(&mut self, css: &str) {
        if css.trim().is_empty() {
            return;
        }
        let css = if self.config.css_minify {
            css.to_string()
        } else {
            css.lines()
                .map(|l| format!("    {l}"))
                .collect::<Vec<_>>()
                .join("\n")
        };
        let block = self.wrap_style(&css);
        self.head.push(block);
    }

    /// Hidden inbox preview text
    pub fn add_preview(&mut self, preview: &str) {
        if preview.is_empty() {
            return;
        }
        self.body.push(format!(
            r#"<div style="{PREVIEW_STYLE}">{}</div>"#,
            escape_html(preview)
        ));
    }

    pub fn add_body(&mut self, html: String) {
        self.body.push(html);
    }

    pub fn build(self, language: &str, direction: &str, background: Option<&str>) -> String {
        let background = background
            .filter(|c| !c.is_empty())
            .map(|c| format!("background-color:{};", escape_attr(c)))
            .unwrap_or_default();
        let mut out = String::with_capacity(
            self.head.iter().chain(&self.body).map(String::len).sum::<usize>() + 512,
        );
        out.push_str("<!doctype html>\n");
        out.push_str(&format!(
            "<html lang=\"{}\" dir=\"{}\" xmlns=\"http://www.w3.org/1999/xhtml\">\n",
            escape_attr(language),
            escape_attr(direction)
        ));
        out.push_str("<head>\n");
        for line in &self.head {
            out.push_str("  ");
            out.push_str(line);
            out.push('\n');
        }
        out.push_str("</head>\n");
        out.push_str(&format!("<body style=\"word-spacing:normal;{background}\">\n"));
        for part in &self.body {
            out.push_str(part);
            out.push('\n');
        }
        out.push_str("</body>\n</html>\n");
        out
    }
}

/// Render `root` into a complete HTML document
pub fn render_document(root: &Node, ctx: &RenderContext<'_>) -> String {
    let head: &HeadMetadata = ctx.head;
    let body = root
        .child(BODY_TAG)
        .map(|b| ctx.render_node(b))
        .unwrap_or_default();
    let stylesheet = ctx.styles.head_css(ctx.config.css_minify);
    let fonts = head.used_fonts(&format!("{body}{stylesheet}"));
    debug!(
        fonts = fonts.len(),
        head_rules = ctx.styles.head_rules().len(),
        "assembling document"
    );

    let mut builder = DocumentBuilder::new(ctx.config);
    builder.add_preamble(&head.title);
    builder.add_fonts(&fonts);
    builder.add_stylesheet(&stylesheet);
    builder.add_preview(&head.preview);
    builder.add_body(body);

    builder.build(
        head.language.as_deref().unwrap_or(&ctx.config.language),
        head.direction.as_deref().unwrap_or(&ctx.config.direction),
        head.background_color.as_deref(),
    )
}

/// Escape text content
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escape a double-quoted attribute value
pub fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_escape() {
        assert_eq!(escape_html("a < b & c"), "a &lt; b &amp; c");
        assert_eq!(
            escape_attr(r#"font-family:'Open Sans', "x""#),
            "font-family:'Open Sans', &quot;x&quot;"
        );
    }

    #[test]
    fn test_minimal_document() {
        let config = HtmlConfig::default();
        let mut builder = DocumentBuilder::new(&config);
        builder.add_preview("Hi");
        builder.add_body("<div></div>".to_string());
        let html = builder.build("und", "ltr", Some("#fff"));
        assert_eq!(
            html,
            concat!(
                "<!doctype html>\n",
                "<html lang=\"und\" dir=\"ltr\" xmlns=\"http://www.w3.org/1999/xhtml\">\n",
                "<head>\n",
                "</head>\n",
                "<body style=\"word-spacing:normal;background-color:#fff;\">\n",
                "<div style=\"display:none;font-size:1px;color:#ffffff;line-height:1px;max-height:0px;max-width:0px;opacity:0;overflow:hidden;\">Hi</div>\n",
                "<div></div>\n",
                "</body>\n",
                "</html>\n"
            )
        );
    }

    #[test]
    fn test_fonts_and_minified_styles() {
        let config = HtmlConfig::new().with_css_minify(true);
        let mut builder = DocumentBuilder::new(&config);
        let font = FontLink {
            name: "Lato".to_string(),
            href: "https://fonts.example/lato".to_string(),
        };
        builder.add_fonts(&[&font]);
        builder.add_stylesheet(".a{color:red;}");
        let html = builder.build("en", "ltr", None);
        assert!(html.contains(r#"<link href="https://fonts.example/lato" rel="stylesheet" type="text/css">"#));
        assert!(html.contains(r#"<style type="text/css">@import url(https://fonts.example/lato);</style>"#));
        assert!(html.contains(r#"<style type="text/css">.a{color:red;}</style>"#));
        assert!(html.contains("<body style=\"word-spacing:normal;\">"));
    }

    #[test]
    fn test_empty_stylesheet_skipped() {
        let config = HtmlConfig::default();
        let mut builder = DocumentBuilder::new(&config);
        builder.add_stylesheet("  ");
        assert!(!builder.build("und", "ltr", None).contains("<style"));
    }
}
