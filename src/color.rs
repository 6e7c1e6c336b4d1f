use image::Rgb;
use once_cell::sync::Lazy;
use regex::Regex;

/// Fallback when a color string cannot be parsed.
pub const DEFAULT_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

// Matches rgb(r, g, b) and rgba(r, g, b, a); alpha is ignored.
// Components may be integers or decimals, e.g. "rgba(10, 20.5, 30, 0.5)".
static RGB_FUNCTIONAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*rgba?\(\s*(\d+\.?\d*)\s*,\s*(\d+\.?\d*)\s*,\s*(\d+\.?\d*)")
        .expect("rgb pattern is valid")
});

/// Parse a color string into an RGB triple.
///
/// Accepts `rgb(r,g,b)` / `rgba(r,g,b,a)` with numeric components, or
/// `#RRGGBB` hex. Anything else falls back to white. This never fails:
/// the UI passes whatever the color field currently holds.
pub fn parse_color(color_str: &str) -> Rgb<u8> {
    if let Some(rgb) = parse_functional(color_str) {
        return rgb;
    }
    if let Some(rgb) = parse_hex(color_str) {
        return rgb;
    }
    DEFAULT_COLOR
}

/// Canonical `#RRGGBB` form, used to sync the color picker button back
/// into the text field.
pub fn to_hex_string(color: Rgb<u8>) -> String {
    let Rgb([r, g, b]) = color;
    format!("#{:02X}{:02X}{:02X}", r, g, b)
}

fn parse_functional(color_str: &str) -> Option<Rgb<u8>> {
    let captures = RGB_FUNCTIONAL.captures(color_str)?;
    let mut channels = [0u8; 3];
    for (slot, capture) in channels.iter_mut().zip(captures.iter().skip(1)) {
        let value: f64 = capture?.as_str().parse().ok()?;
        // Truncate decimals; out-of-range values saturate at 255.
        *slot = value as u8;
    }
    Some(Rgb(channels))
}

fn parse_hex(color_str: &str) -> Option<Rgb<u8>> {
    if !color_str.starts_with('#') {
        return None;
    }
    let r = u8::from_str_radix(color_str.get(1..3)?, 16).ok()?;
    let g = u8::from_str_radix(color_str.get(3..5)?, 16).ok()?;
    let b = u8::from_str_radix(color_str.get(5..7)?, 16).ok()?;
    Some(Rgb([r, g, b]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_colors() {
        assert_eq!(parse_color("#FF0000"), Rgb([255, 0, 0]));
        assert_eq!(parse_color("#00ff00"), Rgb([0, 255, 0]));
        assert_eq!(parse_color("#123456"), Rgb([0x12, 0x34, 0x56]));
    }

    #[test]
    fn test_parse_functional_colors() {
        assert_eq!(parse_color("rgb(10,20,30)"), Rgb([10, 20, 30]));
        assert_eq!(parse_color("rgba(10,20,30,0.5)"), Rgb([10, 20, 30]));
        assert_eq!(parse_color("rgb(10, 20, 30)"), Rgb([10, 20, 30]));
        // Decimal components are truncated
        assert_eq!(parse_color("rgb(10.9, 20.1, 30.5)"), Rgb([10, 20, 30]));
    }

    #[test]
    fn test_out_of_range_components_saturate() {
        assert_eq!(parse_color("rgb(300, 0, 0)"), Rgb([255, 0, 0]));
    }

    #[test]
    fn test_invalid_input_defaults_to_white() {
        assert_eq!(parse_color("garbage"), DEFAULT_COLOR);
        assert_eq!(parse_color(""), DEFAULT_COLOR);
        assert_eq!(parse_color("#FFF"), DEFAULT_COLOR); // too short
        assert_eq!(parse_color("#GGHHII"), DEFAULT_COLOR); // not hex
        assert_eq!(parse_color("rgb()"), DEFAULT_COLOR);
        assert_eq!(parse_color("rgb(10,20)"), DEFAULT_COLOR);
    }

    #[test]
    fn test_hex_ignores_trailing_characters() {
        // Only the first six hex digits after '#' are read
        assert_eq!(parse_color("#FF0000FF"), Rgb([255, 0, 0]));
    }

    #[test]
    fn test_to_hex_string_round_trip() {
        assert_eq!(to_hex_string(Rgb([255, 0, 0])), "#FF0000");
        assert_eq!(parse_color(&to_hex_string(Rgb([1, 2, 3]))), Rgb([1, 2, 3]));
    }

    #[test]
    fn test_hex_with_multibyte_input_does_not_panic() {
        assert_eq!(parse_color("#ネコネコネコ"), DEFAULT_COLOR);
    }
}
