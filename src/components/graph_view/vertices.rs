use std::collections::HashMap;

use log::error;

use super::color::{ColorMap, double_color_map, string_color_map};
use super::entity::{IconShape, Label, Vertex};
use super::types::{AttrMeta, DynamicValue, Mode};
use super::util::{doubles_of, strings_of};

/// Which edge of the view the panel's legend hugs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LegendSide {
	Left,
	Right,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LegendLine {
	pub text: String,
	pub indent: f64,
	pub color: Option<String>,
}

/// The vertex entities of one panel plus the metadata drawn around them.
#[derive(Clone, Debug, PartialEq)]
pub struct Vertices {
	pub mode: Mode,
	pub side: usize,
	pub vertex_set_id: String,
	pub vs: Vec<Vertex>,
	pub labels: Vec<Label>,
	/// Icon label → shape. `None` stands for undefined labels.
	pub icon_mapping: HashMap<Option<String>, IconShape>,
	pub legend: Vec<LegendLine>,
	pub legend_side: LegendSide,
	pub x_min: f64,
	pub half_column_width: f64,
	/// Indices of the view's edges that stay within this panel.
	pub edges: Vec<usize>,
	pub x_attribute: Option<AttrMeta>,
	pub y_attribute: Option<AttrMeta>,
}

impl Vertices {
	pub fn new(mode: Mode, side: usize) -> Self {
		Self {
			mode,
			side,
			vertex_set_id: String::new(),
			vs: Vec::new(),
			labels: Vec::new(),
			icon_mapping: HashMap::new(),
			legend: Vec::new(),
			legend_side: if side == 0 {
				LegendSide::Left
			} else {
				LegendSide::Right
			},
			x_min: 0.0,
			half_column_width: 0.0,
			edges: Vec::new(),
			x_attribute: None,
			y_attribute: None,
		}
	}

	pub fn add_legend_line(&mut self, text: impl Into<String>, indent: f64) -> &mut LegendLine {
		self.legend.push(LegendLine {
			text: text.into(),
			indent,
			color: None,
		});
		let last = self.legend.len() - 1;
		&mut self.legend[last]
	}

	pub fn add_color_legend<'a>(
		&mut self,
		entries: impl IntoIterator<Item = (&'a str, Option<&'a str>)>,
		title: &str,
	) {
		self.add_legend_line(title, 0.0);
		for (value, color) in entries {
			let text = if value.is_empty() { "undefined" } else { value };
			let line = self.add_legend_line(text, 10.0);
			line.color = color.map(String::from);
		}
	}

	/// Builds the color map of `meta` over `attrs` and adds its legend. Unsupported attribute
	/// types are logged and give no map.
	pub fn setup_color_map<'a>(
		&mut self,
		attrs: impl IntoIterator<Item = &'a HashMap<String, DynamicValue>>,
		meta: Option<&AttrMeta>,
		legend_title: &str,
	) -> Option<ColorMap> {
		let meta = meta?;
		let title = format!("{legend_title}: {}", meta.title);
		match meta.type_name.as_str() {
			"Double" => {
				let map = double_color_map(&doubles_of(attrs, &meta.id));
				let bounds = map.bounds?;
				if bounds.is_empty() {
					self.add_color_legend(std::iter::empty(), &title);
				} else {
					let min = format!("min: {}", bounds.min);
					let max = format!("max: {}", bounds.max);
					self.add_color_legend(
						[
							(min.as_str(), map.get_double(bounds.min)),
							(max.as_str(), map.get_double(bounds.max)),
						],
						&title,
					);
				}
				Some(map)
			}
			"String" => {
				let map = string_color_map(&strings_of(attrs, &meta.id));
				self.add_color_legend(
					map.colors.iter().map(|(k, v)| (k.as_str(), Some(v.as_str()))),
					&title,
				);
				Some(map)
			}
			other => {
				error!(
					"The type of {} ({other}) is not supported for color visualization!",
					meta.title
				);
				None
			}
		}
	}

	/// Assigns shapes to icon labels and writes the icon legend. Labels naming a built-in shape
	/// use it, undefined labels use circles, the rest take the remaining neutral shapes with
	/// the last one standing in for everything that does not fit.
	pub fn init_icons(&mut self, title: &str, labels: &[Option<String>]) {
		let mut neutrals: Vec<IconShape> = IconShape::NEUTRALS.to_vec();
		let mut mapping = HashMap::new();
		let mut unassigned: Vec<String> = Vec::new();
		self.add_legend_line(format!("Icon: {title}"), 0.0);
		for label in labels {
			if mapping.contains_key(label) {
				continue;
			}
			match label {
				None => {
					mapping.insert(None, IconShape::Circle);
					neutrals.retain(|&s| s != IconShape::Circle);
					self.add_legend_line("circle: undefined", 10.0);
				}
				Some(name) => match IconShape::from_name(name) {
					Some(shape) if shape != IconShape::Circle => {
						mapping.insert(label.clone(), shape);
						neutrals.retain(|&s| s != shape);
					}
					_ => {
						if !unassigned.contains(name) {
							unassigned.push(name.clone());
						}
					}
				},
			}
		}
		if neutrals.is_empty() {
			neutrals.push(IconShape::Circle);
		}
		let wildcard = if unassigned.len() > neutrals.len() {
			neutrals.pop()
		} else {
			None
		};
		for (name, shape) in unassigned.iter().zip(&neutrals) {
			mapping.insert(Some(name.clone()), *shape);
			self.add_legend_line(format!("{}: {name}", shape.name()), 10.0);
		}
		if let Some(wildcard) = wildcard {
			for name in unassigned.iter().skip(neutrals.len()) {
				mapping.insert(Some(name.clone()), wildcard);
			}
			self.add_legend_line(format!("{}: other", wildcard.name()), 10.0);
		}
		self.icon_mapping = mapping;
	}

	/// The shape for an icon label, circle when unassigned.
	pub fn icon_for(&self, label: Option<&str>) -> IconShape {
		self.icon_mapping
			.get(&label.map(String::from))
			.copied()
			.unwrap_or(IconShape::Circle)
	}

	pub fn find(&self, id: &str) -> Option<usize> {
		self.vs.iter().position(|v| v.id == id)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn some(names: &[&str]) -> Vec<Option<String>> {
		names.iter().map(|n| Some(n.to_string())).collect()
	}

	#[test]
	fn literal_icon_names_are_kept() {
		let mut vs = Vertices::new(Mode::Sampled, 0);
		vs.init_icons("kind", &some(&["star", "apple", "star"]));
		assert_eq!(vs.icon_for(Some("star")), IconShape::Star);
		assert_eq!(vs.icon_for(Some("apple")), IconShape::Square);
		assert_eq!(vs.legend[0].text, "Icon: kind");
		assert_eq!(vs.legend[1].text, "square: apple");
	}

	#[test]
	fn overflowing_labels_share_a_wildcard() {
		let mut vs = Vertices::new(Mode::Sampled, 0);
		let labels = some(&["a", "b", "c", "d", "e", "f", "g"]);
		vs.init_icons("kind", &labels);
		assert_eq!(vs.icon_for(Some("a")), IconShape::Square);
		assert_eq!(vs.icon_for(Some("e")), IconShape::Triangle);
		assert_eq!(vs.icon_for(Some("f")), IconShape::Circle);
		assert_eq!(vs.icon_for(Some("g")), IconShape::Circle);
		assert_eq!(vs.legend.last().map(|l| l.text.as_str()), Some("circle: other"));
	}

	#[test]
	fn undefined_icons_are_circles() {
		let mut vs = Vertices::new(Mode::Sampled, 1);
		vs.init_icons("kind", &[None, Some("x".into())]);
		assert_eq!(vs.icon_for(None), IconShape::Circle);
		assert_eq!(vs.icon_for(Some("x")), IconShape::Square);
		assert_eq!(vs.icon_for(Some("never seen")), IconShape::Circle);
		assert_eq!(vs.legend_side, LegendSide::Right);
	}

	#[test]
	fn unsupported_color_type_is_skipped() {
		let mut vs = Vertices::new(Mode::Sampled, 0);
		let meta = AttrMeta {
			id: "v".into(),
			title: "V".into(),
			type_name: "Vector".into(),
		};
		assert!(vs.setup_color_map(Vec::new(), Some(&meta), "Vertex Color").is_none());
		assert!(vs.legend.is_empty());
	}
}
