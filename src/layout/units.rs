//! CSS length helpers

use crate::parser::Node;

/// Split a length like `25px` or `33.5%` into number and unit
pub fn parse_length(value: &str) -> Option<(f64, &str)> {
    let value = value.trim();
    let split = value
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-' || c == '+'))
        .unwrap_or(value.len());
    let (number, unit) = value.split_at(split);
    let number: f64 = number.parse().ok()?;
    if !number.is_finite() {
        return None;
    }
    Some((number, unit.trim()))
}

/// Pixel value of `25px` or a bare `25`
pub fn parse_px(value: &str) -> Option<f64> {
    match parse_length(value)? {
        (n, "px") | (n, "") => Some(n),
        _ => None,
    }
}

/// Resolve a px or % length against `container` pixels
pub fn to_pixels(value: &str, container: f64) -> Option<f64> {
    match parse_length(value)? {
        (n, "px") | (n, "") => Some(n),
        (n, "%") => Some(container * n / 100.0),
        _ => None,
    }
}

/// Format a number with at most two decimals and no trailing zeros
pub fn format_number(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    let text = format!("{:.2}", rounded);
    let text = match text.split_once('.') {
        Some((int, frac)) => match frac.trim_end_matches('0') {
            "" => int.to_string(),
            frac => format!("{int}.{frac}"),
        },
        None => text.clone(),
    };
    if text == "-0" {
        "0".to_string()
    } else {
        text
    }
}

pub fn format_px(value: f64) -> String {
    format!("{}px", format_number(value))
}

/// Four box sides in pixels
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Sides {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Sides {
    /// Parse a 1-4 value shorthand (`10px 25px`); non-px values count as 0
    pub fn parse(shorthand: &str) -> Option<Self> {
        let values: Vec<f64> = shorthand
            .split_whitespace()
            .map(|v| parse_px(v).unwrap_or(0.0))
            .collect();
        let (top, right, bottom, left) = match values.as_slice() {
            [all] => (*all, *all, *all, *all),
            [v, h] => (*v, *h, *v, *h),
            [t, h, b] => (*t, *h, *b, *h),
            [t, r, b, l] => (*t, *r, *b, *l),
            _ => return None,
        };
        Some(Self {
            top,
            right,
            bottom,
            left,
        })
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

/// Padding of `node` from the `{name}` shorthand and `{name}-left` style overrides
pub fn padding_of(node: &Node, name: &str) -> Sides {
    let mut sides = node.get(name).and_then(Sides::parse).unwrap_or_default();
    let side = |suffix: &str| node.get(&format!("{name}-{suffix}")).and_then(parse_px);
    if let Some(v) = side("top") {
        sides.top = v;
    }
    if let Some(v) = side("right") {
        sides.right = v;
    }
    if let Some(v) = side("bottom") {
        sides.bottom = v;
    }
    if let Some(v) = side("left") {
        sides.left = v;
    }
    sides
}

/// Width of a `border` shorthand such as `1px solid #000`
pub fn border_width(value: &str) -> f64 {
    value
        .split_whitespace()
        .find_map(parse_px)
        .unwrap_or(0.0)
}

/// Left plus right border width, honouring `{name}-left` / `{name}-right`
pub fn horizontal_borders(node: &Node, name: &str) -> f64 {
    let all = node.get(name).map(border_width).unwrap_or(0.0);
    let side = |suffix: &str| {
        node.get(&format!("{name}-{suffix}"))
            .map(border_width)
            .unwrap_or(all)
    };
    side("left") + side("right")
}
