use std::collections::{BTreeMap, BTreeSet};

use palette::{Hsl, IntoColor, Lighten, Srgb};

use super::util::{Bounds, double_key, minmax, normalize};

/// Brand color for vertices without a color binding.
pub const UNCOLORED: &str = "#39bcf3";

/// Parses any CSS color: hex, `rgb()`, `hsl()`, `hwb()` and the named colors.
pub fn parse(text: &str) -> Option<Srgb> {
	let color = csscolorparser::parse(text.trim()).ok()?;
	let [r, g, b, _] = color.to_rgba8();
	Some(Srgb::new(r, g, b).into_format())
}

/// Whether the canvas accepts `text` as a fill. Bare hex digits ("bad", "cafe") only count with
/// a leading `#`.
pub fn is_css_color(text: &str) -> bool {
	let bare_hex = !text.is_empty() && text.chars().all(|c| c.is_ascii_hexdigit());
	!bare_hex && parse(text).is_some()
}

/// Raises HSL lightness by `amount` percentage points.
pub fn lighten(color: Srgb, amount: f32) -> Srgb {
	let hsl: Hsl = color.into_color();
	hsl.lighten_fixed(amount / 100.0).into_color()
}

pub fn to_hex(color: Srgb) -> String {
	let c: Srgb<u8> = color.into_format();
	format!("#{:02x}{:02x}{:02x}", c.red, c.green, c.blue)
}

/// The fill used for a highlighted vertex of the given color.
pub fn highlight_of(color: &str) -> String {
	if color == UNCOLORED {
		return "white".into();
	}
	parse(color)
		.map(|c| to_hex(lighten(c, 20.0)))
		.unwrap_or_else(|| "white".into())
}

pub fn hsl(h: f64, s: f64, l: f64) -> String {
	format!("hsl({h},{s}%,{l}%)")
}

/// Value → color lookup built from one attribute's values.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ColorMap {
	pub colors: BTreeMap<String, String>,
	/// Numeric extent, for maps built from doubles.
	pub bounds: Option<Bounds>,
}

impl ColorMap {
	pub fn get(&self, key: &str) -> Option<&str> {
		self.colors.get(key).map(String::as_str)
	}

	pub fn get_double(&self, d: f64) -> Option<&str> {
		self.get(&double_key(d))
	}
}

/// Purple-to-red gradient over the value range.
pub fn double_color_map(values: &[f64]) -> ColorMap {
	let bounds = minmax(values.iter().copied());
	let colors = values
		.iter()
		.map(|&v| (double_key(v), hsl(300.0 + normalize(v, &bounds) * 120.0, 50.0, 42.0)))
		.collect();
	ColorMap {
		colors,
		bounds: Some(bounds),
	}
}

/// Spreads the distinct values over the hue wheel in sorted order. Values that are CSS colors
/// keep their own color.
pub fn string_color_map(values: &[String]) -> ColorMap {
	let keys: BTreeSet<&String> = values.iter().collect();
	let n = keys.len() as f64;
	let colors = keys
		.into_iter()
		.enumerate()
		.map(|(i, key)| {
			let color = if is_css_color(key) {
				key.clone()
			} else {
				hsl((360.0 * i as f64 / n).floor(), 50.0, 42.0)
			};
			(key.clone(), color)
		})
		.collect();
	ColorMap {
		colors,
		bounds: None,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn hex(text: &str) -> Option<String> {
		parse(text).map(to_hex)
	}

	#[test]
	fn parses_common_formats() {
		assert_eq!(hex("#fff").as_deref(), Some("#ffffff"));
		assert_eq!(hex("#39bcf3").as_deref(), Some("#39bcf3"));
		assert_eq!(hex("rgb(255, 0, 0)").as_deref(), Some("#ff0000"));
		assert_eq!(hex("hsl(120,100%,50%)").as_deref(), Some("#00ff00"));
		assert_eq!(hex("Red").as_deref(), Some("#ff0000"));
		assert_eq!(hex("salmon").as_deref(), Some("#fa8072"));
		assert_eq!(hex("rebeccapurple").as_deref(), Some("#663399"));
		assert!(parse("apple").is_none());
		assert!(parse("#12").is_none());
	}

	#[test]
	fn bare_hex_words_are_not_colors() {
		assert!(is_css_color("#bad"));
		assert!(!is_css_color("bad"));
		assert!(!is_css_color("cafe"));
		assert!(!is_css_color(""));
		assert!(is_css_color("steelblue"));
	}

	#[test]
	fn lighten_raises_lightness() {
		let lighter = lighten(Srgb::new(0.6, 0.3, 0.3), 20.0);
		let before: Hsl = Srgb::new(0.6f32, 0.3, 0.3).into_color();
		let after: Hsl = lighter.into_color();
		assert!((after.lightness - before.lightness - 0.2).abs() < 1e-4);
		assert_eq!(highlight_of("#000000"), "#333333");
		assert_eq!(highlight_of(UNCOLORED), "white");
		assert_eq!(highlight_of("not a color"), "white");
	}

	#[test]
	fn string_colors_are_stable_under_reordering() {
		let a = string_color_map(&["b".into(), "a".into(), "c".into(), "a".into()]);
		let b = string_color_map(&["c".into(), "b".into(), "a".into()]);
		assert_eq!(a, b);
		assert_eq!(a.get("a"), Some("hsl(0,50%,42%)"));
		assert_eq!(a.get("b"), Some("hsl(120,50%,42%)"));
		assert_eq!(a.get("c"), Some("hsl(240,50%,42%)"));
	}

	#[test]
	fn css_names_keep_their_color() {
		let m = string_color_map(&["red".into(), "x".into()]);
		assert_eq!(m.get("red"), Some("red"));
		assert_eq!(m.get("x"), Some("hsl(180,50%,42%)"));

		let m = string_color_map(&["steelblue".into(), "darkred".into(), "x".into()]);
		assert_eq!(m.get("steelblue"), Some("steelblue"));
		assert_eq!(m.get("darkred"), Some("darkred"));
		assert_eq!(m.get("x"), Some("hsl(240,50%,42%)"));
	}

	#[test]
	fn double_colors_span_the_gradient() {
		let m = double_color_map(&[1.0, 3.0]);
		assert_eq!(m.get_double(1.0), Some("hsl(240,50%,42%)"));
		assert_eq!(m.get_double(3.0), Some("hsl(360,50%,42%)"));
	}
}
