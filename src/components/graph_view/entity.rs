use std::collections::HashMap;

use super::color::{UNCOLORED, highlight_of};
use super::types::{DynamicValue, VertexRef};

/// Radius in pixels below which a vertex gets a larger invisible touch target.
pub const MIN_TOUCH_RADIUS: f64 = 10.0;

/// The built-in vertex shapes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IconShape {
	Circle,
	Square,
	Hexagon,
	Pentagon,
	Star,
	Triangle,
	Diamond,
	Cross,
}

impl IconShape {
	/// Shapes handed out to labels that do not name an icon themselves.
	pub const NEUTRALS: [IconShape; 6] = [
		IconShape::Square,
		IconShape::Hexagon,
		IconShape::Pentagon,
		IconShape::Star,
		IconShape::Triangle,
		IconShape::Circle,
	];

	pub fn from_name(name: &str) -> Option<Self> {
		Some(match name.to_ascii_lowercase().as_str() {
			"circle" => IconShape::Circle,
			"square" => IconShape::Square,
			"hexagon" => IconShape::Hexagon,
			"pentagon" => IconShape::Pentagon,
			"star" => IconShape::Star,
			"triangle" => IconShape::Triangle,
			"diamond" => IconShape::Diamond,
			"cross" => IconShape::Cross,
			_ => return None,
		})
	}

	pub fn name(self) -> &'static str {
		match self {
			IconShape::Circle => "circle",
			IconShape::Square => "square",
			IconShape::Hexagon => "hexagon",
			IconShape::Pentagon => "pentagon",
			IconShape::Star => "star",
			IconShape::Triangle => "triangle",
			IconShape::Diamond => "diamond",
			IconShape::Cross => "cross",
		}
	}
}

/// How a vertex is drawn.
#[derive(Clone, Debug, PartialEq)]
pub enum Glyph {
	Icon(IconShape),
	Image(String),
}

/// Which end of an edge a highlighted vertex is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeEnd {
	/// The vertex is the destination; the edge is marked `highlight-in`.
	In,
	/// The vertex is the source; the edge is marked `highlight-out`.
	Out,
}

/// Receivers of a vertex's hover notifications.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HoverListener {
	Edge(usize),
	Label(usize),
}

/// Observer lists of one vertex. Entries are indices into the view's edge list or the
/// collection's label list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Listeners {
	pub moves: Vec<usize>,
	pub highlights: Vec<(usize, EdgeEnd)>,
	pub hovers: Vec<HoverListener>,
	pub opaques: Vec<usize>,
}

/// Visual attributes a strategy computes for a new vertex.
#[derive(Clone, Debug, PartialEq)]
pub struct Appearance {
	pub radius: f64,
	pub label: Option<String>,
	pub label_size: f64,
	pub color: Option<String>,
	pub opacity: f64,
	pub label_color: Option<String>,
	pub glyph: Glyph,
}

impl Default for Appearance {
	fn default() -> Self {
		Self {
			radius: 0.1 * 0.5f64.sqrt(),
			label: None,
			label_size: 0.5,
			color: None,
			opacity: 1.0,
			label_color: None,
			glyph: Glyph::Icon(IconShape::Circle),
		}
	}
}

/// A drawn vertex: a sampled graph vertex or a bucketed cell.
#[derive(Clone, Debug, PartialEq)]
pub struct Vertex {
	pub id: String,
	pub attrs: HashMap<String, DynamicValue>,
	pub x: f64,
	pub y: f64,
	/// Model-space radius; multiplied by the offsetter thickness on screen.
	pub r: f64,
	pub color: String,
	pub highlight_color: String,
	pub label: Option<String>,
	pub label_size: f64,
	pub label_color: Option<String>,
	pub opacity: f64,
	pub glyph: Glyph,
	/// Number of reasons why the layout must not move this vertex.
	pub frozen: u32,
	/// Placed by a position or geo attribute.
	pub positioned: bool,
	/// Grabbed by the pointer.
	pub held: bool,
	/// Moved since it was grabbed.
	pub dragged: bool,
	pub drag_start: (f64, f64),
	pub before_drag: (f64, f64),
	/// Previous layout position, used by the Verlet integration.
	pub force_ox: f64,
	pub force_oy: f64,
	pub component: Option<usize>,
	pub degree: usize,
	pub highlighted: bool,
	pub opaque: bool,
	pub center: bool,
	/// Excluded from hit testing and drawing. Set on empty buckets.
	pub hidden: bool,
	pub size: f64,
	pub x_filter: Option<String>,
	pub y_filter: Option<String>,
	pub listeners: Listeners,
}

impl Vertex {
	pub fn new(id: impl Into<String>, x: f64, y: f64, look: Appearance) -> Self {
		let color = look.color.unwrap_or_else(|| UNCOLORED.into());
		Self {
			id: id.into(),
			attrs: HashMap::new(),
			x,
			y,
			r: look.radius,
			highlight_color: highlight_of(&color),
			color,
			label: look.label,
			label_size: look.label_size,
			label_color: look.label_color,
			opacity: look.opacity,
			glyph: look.glyph,
			frozen: 0,
			positioned: false,
			held: false,
			dragged: false,
			drag_start: (0.0, 0.0),
			before_drag: (0.0, 0.0),
			force_ox: x,
			force_oy: y,
			component: None,
			degree: 0,
			highlighted: false,
			opaque: false,
			center: false,
			hidden: false,
			size: 0.0,
			x_filter: None,
			y_filter: None,
			listeners: Listeners::default(),
		}
	}

	/// The fill currently shown.
	pub fn fill(&self) -> &str {
		if self.highlighted {
			&self.highlight_color
		} else {
			&self.color
		}
	}

	pub fn set_color(&mut self, color: impl Into<String>) {
		self.color = color.into();
		self.highlight_color = highlight_of(&self.color);
	}

	/// Resets the layout history so the vertex starts at rest.
	pub fn settle(&mut self) {
		self.force_ox = self.x;
		self.force_oy = self.y;
	}

	pub fn freeze(&mut self) {
		self.frozen += 1;
	}

	pub fn unfreeze(&mut self) {
		self.frozen = self.frozen.saturating_sub(1);
	}

	pub fn is_frozen(&self) -> bool {
		self.frozen > 0
	}

	/// Whether the layout may move this vertex.
	pub fn is_movable(&self) -> bool {
		!self.is_frozen() && !self.held && !self.positioned
	}
}

/// A line between two vertices, possibly on different panels.
#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
	pub src: VertexRef,
	pub dst: VertexRef,
	/// Model-space width; multiplied by the average endpoint thickness on screen.
	pub width: f64,
	pub color: Option<String>,
	pub label: Option<String>,
	pub highlight_in: bool,
	pub highlight_out: bool,
	pub opaque: bool,
	pub visible: bool,
	/// Draw order within the edge layer; larger is on top.
	pub z: u64,
}

impl Edge {
	pub fn new(
		src: VertexRef,
		dst: VertexRef,
		width: f64,
		color: Option<String>,
		label: Option<String>,
	) -> Self {
		Self {
			src,
			dst,
			width,
			color,
			label,
			highlight_in: false,
			highlight_out: false,
			opaque: false,
			visible: true,
			z: 0,
		}
	}

	pub fn is_highlighted(&self) -> bool {
		self.highlight_in || self.highlight_out
	}

	pub fn is_loop(&self) -> bool {
		self.src == self.dst
	}
}

/// Style class of an axis label.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LabelClass {
	AxisTitle,
	Left,
	Right,
	Plain,
}

/// A text label on a bucketed grid axis.
#[derive(Clone, Debug, PartialEq)]
pub struct Label {
	pub x: f64,
	pub y: f64,
	pub text: String,
	pub vertical: bool,
	pub class: LabelClass,
	/// Number of hovered cells this label belongs to.
	pub hovered: u32,
}

impl Label {
	pub fn new(x: f64, y: f64, text: impl Into<String>, class: LabelClass) -> Self {
		Self {
			x,
			y,
			text: text.into(),
			vertical: false,
			class,
			hovered: 0,
		}
	}

	pub fn vertical(mut self) -> Self {
		self.vertical = true;
		self
	}

	pub fn is_highlighted(&self) -> bool {
		self.hovered > 0
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn frozen_counter_never_goes_negative() {
		let mut v = Vertex::new("a", 0.0, 0.0, Appearance::default());
		v.unfreeze();
		assert_eq!(v.frozen, 0);
		v.freeze();
		v.freeze();
		v.unfreeze();
		assert!(v.is_frozen());
		assert!(!v.is_movable());
	}

	#[test]
	fn uncolored_vertices_highlight_white() {
		let v = Vertex::new("a", 0.0, 0.0, Appearance::default());
		assert_eq!(v.color, UNCOLORED);
		assert_eq!(v.highlight_color, "white");
		let mut colored = v.clone();
		colored.set_color("#000000");
		assert_eq!(colored.highlight_color, "#333333");
	}

	#[test]
	fn icon_names_are_case_insensitive() {
		assert_eq!(IconShape::from_name("Star"), Some(IconShape::Star));
		assert_eq!(IconShape::from_name("person"), None);
	}
}
