//! Width pre-pass for the body tree
//!
//! Email layout is a fixed-width column grid, so the only geometry the
//! renderer needs is how wide each container is. [`Layout::compute`] walks the
//! body once, letting every container split its width among its children,
//! and records a [`Frame`] per node.

pub mod units;

use std::collections::HashMap;

use tracing::debug;

use crate::components::ComponentRegistry;
use crate::parser::{Node, NodeId};

pub use units::{format_number, format_px, parse_length, parse_px, to_pixels, Sides};

/// Body width used when `mj-body` does not set one
pub const DEFAULT_BODY_WIDTH: f64 = 600.0;

const EPSILON: f64 = 1e-6;

/// Width of a column or group relative to its section
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WidthSpec {
    Percent(f64),
    Pixels(f64),
}

impl WidthSpec {
    /// Parse `50%` or `200px`; other units are rejected
    pub fn parse(value: &str) -> Option<Self> {
        match parse_length(value)? {
            (n, "%") if n >= 0.0 => Some(WidthSpec::Percent(n)),
            (n, "px") | (n, "") if n >= 0.0 => Some(WidthSpec::Pixels(n)),
            _ => None,
        }
    }

    /// Responsive class such as `mj-column-per-33-33` or `mj-column-px-200`
    pub fn class_name(&self) -> String {
        match self {
            WidthSpec::Percent(p) => {
                format!("mj-column-per-{}", format_number(*p).replace('.', "-"))
            }
            WidthSpec::Pixels(px) => {
                format!("mj-column-px-{}", format_number(*px).replace('.', "-"))
            }
        }
    }

    pub fn css_value(&self) -> String {
        match self {
            WidthSpec::Percent(p) => format!("{}%", format_number(*p)),
            WidthSpec::Pixels(px) => format_px(*px),
        }
    }

    pub fn pixels(&self, container: f64) -> f64 {
        match self {
            WidthSpec::Percent(p) => container * p / 100.0,
            WidthSpec::Pixels(px) => *px,
        }
    }

    pub fn percent(&self, container: f64) -> f64 {
        match self {
            WidthSpec::Percent(p) => *p,
            WidthSpec::Pixels(px) if container > 0.0 => px / container * 100.0,
            WidthSpec::Pixels(_) => 0.0,
        }
    }
}

/// Share explicit and automatic widths among siblings.
///
/// Children without a width split what is left equally. If the widths add up
/// to more than 100% every one is scaled by `100 / total`; children without a
/// width and with no room left get a nominal equal share first. Pixel widths
/// are kept as pixels unless scaling was needed.
pub fn normalize_widths(specs: &[Option<WidthSpec>], container: f64) -> Vec<WidthSpec> {
    if specs.is_empty() {
        return Vec::new();
    }

    let explicit_total: f64 = specs
        .iter()
        .flatten()
        .map(|s| s.percent(container))
        .sum();
    let autos = specs.iter().filter(|s| s.is_none()).count();
    let remaining = 100.0 - explicit_total;

    let auto_share = if autos == 0 {
        0.0
    } else if remaining > EPSILON {
        remaining / autos as f64
    } else {
        100.0 / specs.len() as f64
    };

    let percents: Vec<f64> = specs
        .iter()
        .map(|s| s.map(|s| s.percent(container)).unwrap_or(auto_share))
        .collect();
    let total: f64 = percents.iter().sum();

    if total > 100.0 + EPSILON {
        debug!(total, "scaling column widths down to 100%");
        return percents
            .iter()
            .map(|p| WidthSpec::Percent(p * 100.0 / total))
            .collect();
    }

    specs
        .iter()
        .zip(percents)
        .map(|(spec, percent)| match spec {
            Some(WidthSpec::Pixels(px)) => WidthSpec::Pixels(*px),
            _ => WidthSpec::Percent(percent),
        })
        .collect()
}

/// Space available to one node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    /// Pixel width of the box the node renders into
    pub width: f64,
    /// Normalised width, for columns and groups
    pub column: Option<WidthSpec>,
    /// Position among siblings of the same kind
    pub index: usize,
}

impl Default for Frame {
    fn default() -> Self {
        Self::with_width(DEFAULT_BODY_WIDTH)
    }
}

impl Frame {
    pub fn with_width(width: f64) -> Self {
        Self {
            width,
            column: None,
            index: 0,
        }
    }

    /// A frame for a child with the same width
    pub fn child(&self, index: usize) -> Self {
        Self {
            width: self.width,
            column: None,
            index,
        }
    }
}

/// Frames for every component node in the tree
#[derive(Debug, Clone, Default)]
pub struct Layout {
    frames: HashMap<NodeId, Frame>,
}

impl Layout {
    /// Walk the tree from the root with `body_width` pixels available
    pub fn compute(root: &Node, registry: &ComponentRegistry, body_width: f64) -> Self {
        let mut layout = Layout::default();
        layout.visit(root, Frame::with_width(body_width), registry);
        debug!(frames = layout.frames.len(), "computed layout frames");
        layout
    }

    fn visit(&mut self, node: &Node, frame: Frame, registry: &ComponentRegistry) {
        self.frames.insert(node.id, frame);
        let Some(component) = registry.get(&node.tag) else {
            return;
        };
        if !component.children_are_components() {
            return;
        }

        let child_frames = component.child_frames(node, &frame);
        for (i, child) in node.children.iter().enumerate() {
            let child_frame = child_frames.get(i).copied().unwrap_or_else(|| frame.child(i));
            self.visit(child, child_frame, registry);
        }
    }

    /// Frame of a node; nodes outside the walk get the default frame
    pub fn frame(&self, id: NodeId) -> Frame {
        self.frames.get(&id).copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn percents(specs: &[Option<WidthSpec>], container: f64) -> Vec<String> {
        normalize_widths(specs, container)
            .iter()
            .map(|s| s.css_value())
            .collect()
    }

    #[test]
    fn test_three_auto_columns() {
        let widths = normalize_widths(&[None, None, None], 600.0);
        assert_eq!(widths.len(), 3);
        for w in &widths {
            assert_eq!(w.class_name(), "mj-column-per-33-33");
            assert!((w.percent(600.0) - 33.333).abs() < 0.01);
        }
    }

    #[test]
    fn test_autos_share_remainder() {
        let specs = [Some(WidthSpec::Percent(50.0)), None, None];
        assert_eq!(percents(&specs, 600.0), vec!["50%", "25%", "25%"]);
    }

    #[test]
    fn test_pixel_widths_kept_when_they_fit() {
        let specs = [Some(WidthSpec::Pixels(200.0)), None];
        let widths = normalize_widths(&specs, 600.0);
        assert_eq!(widths[0], WidthSpec::Pixels(200.0));
        assert_eq!(widths[0].class_name(), "mj-column-px-200");
        assert_eq!(widths[1].css_value(), "66.67%");
    }

    #[test]
    fn test_over_100_scaled_proportionally() {
        let specs = [
            Some(WidthSpec::Pixels(300.0)),
            Some(WidthSpec::Pixels(300.0)),
            Some(WidthSpec::Pixels(200.0)),
        ];
        assert_eq!(percents(&specs, 600.0), vec!["37.5%", "37.5%", "25%"]);

        let specs = [Some(WidthSpec::Percent(60.0)), Some(WidthSpec::Percent(60.0))];
        assert_eq!(percents(&specs, 600.0), vec!["50%", "50%"]);
    }

    #[test]
    fn test_mixed_units_over_100_scaled() {
        let specs = [Some(WidthSpec::Pixels(300.0)), Some(WidthSpec::Percent(80.0))];
        assert_eq!(percents(&specs, 600.0), vec!["38.46%", "61.54%"]);

        let specs = [Some(WidthSpec::Percent(70.0)), Some(WidthSpec::Percent(50.0)), None];
        let widths = normalize_widths(&specs, 600.0);
        assert_eq!(
            widths.iter().map(|w| w.css_value()).collect::<Vec<_>>(),
            vec!["45.65%", "32.61%", "21.74%"]
        );
        let total: f64 = widths.iter().map(|w| w.percent(600.0)).sum();
        assert!((total - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_auto_without_room_gets_nominal_share() {
        let specs = [Some(WidthSpec::Percent(100.0)), None];
        assert_eq!(percents(&specs, 600.0), vec!["66.67%", "33.33%"]);
    }

    #[test]
    fn test_width_spec_parse() {
        assert_eq!(WidthSpec::parse("25%"), Some(WidthSpec::Percent(25.0)));
        assert_eq!(WidthSpec::parse("150px"), Some(WidthSpec::Pixels(150.0)));
        assert_eq!(WidthSpec::parse("10em"), None);
        assert_eq!(WidthSpec::parse("12.5%").unwrap().class_name(), "mj-column-per-12-5");
    }
}
