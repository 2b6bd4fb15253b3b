use std::collections::HashMap;

use super::types::DynamicValue;

/// Extent of a list of numbers. `span` is `max - min`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
	pub min: f64,
	pub max: f64,
	pub span: f64,
}

impl Bounds {
	pub fn is_empty(&self) -> bool {
		self.min > self.max
	}
}

/// Bounds of the finite values. An empty input gives `min = +inf, max = -inf`.
pub fn minmax(values: impl IntoIterator<Item = f64>) -> Bounds {
	let (mut min, mut max) = (f64::INFINITY, f64::NEG_INFINITY);
	for v in values.into_iter().filter(|v| v.is_finite()) {
		min = min.min(v);
		max = max.max(v);
	}
	Bounds {
		min,
		max,
		span: max - min,
	}
}

/// Maps `x` from `bounds` into `[-0.5, 0.5]`. A zero span maps everything to 0.
pub fn normalize(x: f64, bounds: &Bounds) -> f64 {
	if bounds.span == 0.0 {
		return 0.0;
	}
	(x - bounds.min) / bounds.span - 0.5
}

/// Maps a bucket coordinate from `[0, count]` into `[-0.5, 0.5]`.
pub fn normalize_count(x: f64, count: f64) -> f64 {
	x / count - 0.5
}

/// Capitalizes a camel-case binding name and splits it into words, "labelSize" → "Label Size".
pub fn uncamel(name: &str) -> String {
	let mut out = String::with_capacity(name.len() + 4);
	for (i, c) in name.chars().enumerate() {
		if i == 0 {
			out.extend(c.to_uppercase());
		} else if c.is_uppercase() {
			out.push(' ');
			out.push(c);
		} else {
			out.push(c);
		}
	}
	out
}

/// The doubles of the defined `attr` values.
pub fn doubles_of<'a>(
	attrs: impl IntoIterator<Item = &'a HashMap<String, DynamicValue>>,
	attr: &str,
) -> Vec<f64> {
	attrs
		.into_iter()
		.filter_map(|a| a.get(attr))
		.filter(|v| v.defined)
		.filter_map(|v| v.double)
		.collect()
}

/// The strings of the defined `attr` values.
pub fn strings_of<'a>(
	attrs: impl IntoIterator<Item = &'a HashMap<String, DynamicValue>>,
	attr: &str,
) -> Vec<String> {
	attrs
		.into_iter()
		.filter_map(|a| a.get(attr))
		.filter(|v| v.defined)
		.filter_map(|v| v.string.clone())
		.collect()
}

/// Key used for color maps built from doubles.
pub fn double_key(d: f64) -> String {
	format!("{d}")
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn minmax_ignores_non_finite() {
		let b = minmax([3.0, f64::NAN, -1.0, 2.0]);
		assert_eq!(b.min, -1.0);
		assert_eq!(b.max, 3.0);
		assert_eq!(b.span, 4.0);
		assert!(minmax(Vec::new()).is_empty());
	}

	#[test]
	fn normalize_maps_into_half_unit() {
		let b = minmax([10.0, 20.0]);
		assert_eq!(normalize(10.0, &b), -0.5);
		assert_eq!(normalize(20.0, &b), 0.5);
		assert_eq!(normalize(5.0, &minmax([5.0])), 0.0);
		assert_eq!(normalize_count(0.5, 1.0), 0.0);
	}

	#[test]
	fn uncamel_splits_words() {
		assert_eq!(uncamel("labelSize"), "Label Size");
		assert_eq!(uncamel("size"), "Size");
	}
}
