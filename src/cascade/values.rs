//! Attribute value types and checks

use crate::layout::parse_length;

/// Declared type of a component attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrType {
    /// `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb()`/`rgba()`/`hsl()`/`hsla()` or a named colour
    Color,
    /// One length whose unit is in the list; `""` allows a bare number and
    /// non-numeric entries are accepted keywords (e.g. `auto`)
    Unit(&'static [&'static str]),
    /// One to four px/% lengths, as in `padding`
    Boxed,
    /// One of a fixed set of keywords
    Enum(&'static [&'static str]),
    Integer,
}

impl AttrType {
    /// Check `value`, returning a human-readable reason on failure
    pub fn check(&self, value: &str) -> Result<(), String> {
        let value = value.trim();
        match self {
            AttrType::Color => {
                if is_color(value) {
                    Ok(())
                } else {
                    Err(format!("'{value}' is not a valid color"))
                }
            }
            AttrType::Unit(allowed) => {
                if allowed.contains(&value) || is_length(value, allowed) {
                    Ok(())
                } else {
                    Err(format!(
                        "'{value}' is not a valid length (expected one of: {})",
                        describe_units(allowed)
                    ))
                }
            }
            AttrType::Boxed => {
                let parts: Vec<&str> = value.split_whitespace().collect();
                let valid = (1..=4).contains(&parts.len())
                    && parts.iter().all(|p| is_length(p, &["px", "%", ""]));
                if valid {
                    Ok(())
                } else {
                    Err(format!("'{value}' is not a valid box shorthand (1 to 4 lengths)"))
                }
            }
            AttrType::Enum(options) => {
                if options.contains(&value) {
                    Ok(())
                } else {
                    Err(format!(
                        "'{value}' is not one of: {}",
                        options.join(", ")
                    ))
                }
            }
            AttrType::Integer => value
                .parse::<i64>()
                .map(|_| ())
                .map_err(|_| format!("'{value}' is not an integer")),
        }
    }
}

fn describe_units(allowed: &[&str]) -> String {
    allowed
        .iter()
        .map(|u| if u.is_empty() { "unitless" } else { u })
        .collect::<Vec<_>>()
        .join(", ")
}

fn is_length(value: &str, units: &[&str]) -> bool {
    match parse_length(value) {
        Some((n, "")) => units.contains(&"") || n == 0.0,
        Some((_, unit)) => units.contains(&unit),
        None => false,
    }
}

fn is_color(value: &str) -> bool {
    if let Some(hex) = value.strip_prefix('#') {
        return matches!(hex.len(), 3 | 4 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit());
    }
    let lower = value.to_ascii_lowercase();
    if ["rgb(", "rgba(", "hsl(", "hsla("]
        .iter()
        .any(|prefix| lower.starts_with(prefix))
    {
        return lower.ends_with(')');
    }
    !value.is_empty() && value.chars().all(|c| c.is_ascii_alphabetic())
}

/// Expand `#abc` to `#aabbcc` and `#abcd` to `#aabbccdd`; `None` when
/// `value` is not a short hex colour
pub fn expand_short_hex(value: &str) -> Option<String> {
    let hex = value.strip_prefix('#')?;
    if !matches!(hex.len(), 3 | 4) || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let mut out = String::with_capacity(1 + hex.len() * 2);
    out.push('#');
    for c in hex.chars() {
        out.push(c);
        out.push(c);
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colors() {
        for ok in ["#fff", "#a1b2c3", "#a1b2c3ff", "red", "transparent", "rgba(0, 0, 0, 0.5)"] {
            assert!(AttrType::Color.check(ok).is_ok(), "{ok} should be a color");
        }
        for bad in ["#ggg", "#12345", "12px", "rgb(0,0,0"] {
            assert!(AttrType::Color.check(bad).is_err(), "{bad} should not be a color");
        }
    }

    #[test]
    fn test_units() {
        let width = AttrType::Unit(&["px", "%"]);
        assert!(width.check("100%").is_ok());
        assert!(width.check("250px").is_ok());
        assert!(width.check("0").is_ok());
        assert!(width.check("12em").is_err());
        assert!(width.check("wide").is_err());

        let height = AttrType::Unit(&["px", "auto"]);
        assert!(height.check("auto").is_ok());
    }

    #[test]
    fn test_boxed() {
        assert!(AttrType::Boxed.check("10px 25px").is_ok());
        assert!(AttrType::Boxed.check("0 1px 2px 3%").is_ok());
        assert!(AttrType::Boxed.check("1px 2px 3px 4px 5px").is_err());
        assert!(AttrType::Boxed.check("auto").is_err());
    }

    #[test]
    fn test_enum_and_integer() {
        let align = AttrType::Enum(&["left", "center", "right"]);
        assert!(align.check("center").is_ok());
        let err = align.check("middle").unwrap_err();
        assert!(err.contains("left, center, right"));
        assert!(AttrType::Integer.check("3").is_ok());
        assert!(AttrType::Integer.check("3px").is_err());
    }

    #[test]
    fn test_expand_short_hex() {
        assert_eq!(expand_short_hex("#abc").as_deref(), Some("#aabbcc"));
        assert_eq!(expand_short_hex("#F0a8").as_deref(), Some("#FF00aa88"));
        assert_eq!(expand_short_hex("#abcde"), None);
        assert_eq!(expand_short_hex("#aabbcc"), None);
        assert_eq!(expand_short_hex("red"), None);
    }
}
