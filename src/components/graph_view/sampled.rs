use std::collections::{HashMap, VecDeque};

use rand::Rng;

use super::color::ColorMap;
use super::entity::{Appearance, Glyph, Vertex};
use super::map::Projection;
use super::types::{AttrMeta, DynamicValue, Mode, SampledSet, Side, VertexRecord};
use super::util::{doubles_of, minmax, normalize, uncamel};
use super::vertices::Vertices;

fn defined<'a>(v: &'a VertexRecord, attr: &str) -> Option<&'a DynamicValue> {
	v.attrs.get(attr).filter(|d| d.defined)
}

fn max_of(records: &[VertexRecord], attr: Option<&str>) -> f64 {
	attr.map(|a| minmax(doubles_of(records.iter().map(|r| &r.attrs), a)).max)
		.unwrap_or(1.0)
}

/// `value / max` for positive values, 0 otherwise.
fn relative(v: &VertexRecord, attr: &str, max: f64) -> f64 {
	match defined(v, attr).and_then(|d| d.double) {
		Some(s) if s > 0.0 => s / max,
		_ => 0.0,
	}
}

/// Builds the entities of a force-layout panel. Vertices start at random positions in
/// `(-0.5, 0.5)²`; [`init_positions`] later applies explicit positions.
pub fn build_sampled(
	data: &SampledSet,
	side: &Side,
	side_index: usize,
	rng: &mut impl Rng,
) -> Vertices {
	let mut vertices = Vertices::new(Mode::Sampled, side_index);
	vertices.vertex_set_id = side.vertex_set_id.clone();
	let attrs = &side.vertex_attrs;

	for (name, meta) in attrs.iter() {
		let title = uncamel(name);
		// Color and icon channels get their own legends.
		if !title.contains("Color") && title != "Icon" {
			vertices.add_legend_line(format!("{title}: {}", meta.title), 0.0);
		}
	}

	let records = &data.vertices;
	let size_attr = attrs.size.as_ref().map(|a| a.id.as_str());
	let size_max = max_of(records, size_attr);
	let label_size_attr = attrs.label_size.as_ref().map(|a| a.id.as_str());
	let label_size_max = max_of(records, label_size_attr);
	let opacity_attr = attrs.opacity.as_ref().map(|a| a.id.as_str());
	let opacity_max = max_of(records, opacity_attr);

	let color_map = vertices.setup_color_map(
		records.iter().map(|r| &r.attrs),
		attrs.color.as_ref(),
		"Vertex Color",
	);
	let label_color_map = vertices.setup_color_map(
		records.iter().map(|r| &r.attrs),
		attrs.label_color.as_ref(),
		"Label Color",
	);

	if let Some(icon) = &attrs.icon {
		let labels: Vec<Option<String>> = records
			.iter()
			.map(|r| defined(r, &icon.id).and_then(|d| d.string.clone()))
			.collect();
		vertices.init_icons(&icon.title, &labels);
	}

	for record in records {
		let mut look = Appearance::default();
		if let Some(label) = &attrs.label {
			look.label = defined(record, &label.id).and_then(|d| d.string.clone());
		}
		let size = size_attr.map_or(0.5, |a| relative(record, a, size_max));
		look.radius = 0.1 * size.sqrt();
		if let Some(a) = label_size_attr {
			look.label_size = relative(record, a, label_size_max);
		}
		let lookup = |map: &Option<ColorMap>, meta: &Option<AttrMeta>| {
			let (map, meta) = (map.as_ref()?, meta.as_ref()?);
			let value = defined(record, &meta.id)?;
			let color = if meta.type_name == "Double" {
				map.get_double(value.double?)
			} else {
				map.get(value.string.as_deref()?)
			};
			color.map(String::from)
		};
		look.color = lookup(&color_map, &attrs.color);
		look.label_color = lookup(&label_color_map, &attrs.label_color);
		if let Some(a) = opacity_attr {
			look.opacity = defined(record, a)
				.and_then(|d| d.double)
				.map_or(1.0, |o| o / opacity_max);
		}
		let image = attrs
			.image
			.as_ref()
			.and_then(|m| defined(record, &m.id))
			.and_then(|d| d.string.clone());
		look.glyph = match image {
			Some(href) => Glyph::Image(href),
			None => {
				let icon = attrs
					.icon
					.as_ref()
					.and_then(|m| defined(record, &m.id))
					.and_then(|d| d.string.as_deref());
				Glyph::Icon(vertices.icon_for(icon))
			}
		};

		let (x, y) = (rng.gen_range(-0.5..0.5), rng.gen_range(-0.5..0.5));
		let mut v = Vertex::new(record.id.clone(), x, y, look);
		v.attrs = record.attrs.clone();
		v.center = side.centers.contains(&record.id);
		vertices.vs.push(v);
	}

	if records.len() >= 5 {
		vertices.add_legend_line(format!("{} vertices", records.len()), 0.0);
	}
	vertices
}

/// Applies position and geo attributes, assigns connected components and degrees.
///
/// `edges` are index pairs within the panel. Explicitly placed vertices become positioned (and
/// highlighted); `y` is flipped so that larger values point up.
pub fn init_positions(
	vertices: &mut Vertices,
	side: &Side,
	edges: &[(usize, usize)],
	projection: Option<&Projection>,
) {
	let position = side.vertex_attrs.position.as_ref().map(|a| a.id.as_str());
	let geo = side.vertex_attrs.geo.as_ref().map(|a| a.id.as_str());
	for v in vertices.vs.iter_mut() {
		let attr = |name: Option<&str>| {
			let value = v.attrs.get(name?).filter(|d| d.defined)?;
			Some((value.x?, value.y?))
		};
		let placed = match (attr(position), attr(geo), projection) {
			(_, Some((lat, lon)), Some(p)) => Some((p.lon2x(lon), p.lat2y(lat))),
			(Some((x, y)), _, _) => Some((x, -y)),
			_ => None,
		};
		if let Some((x, y)) = placed {
			v.x = x;
			v.y = y;
			set_positioned(v);
		}
		v.settle();
		v.degree = 0;
	}
	assign_components(vertices, edges);
	for &(a, b) in edges {
		vertices.vs[a].degree += 1;
		vertices.vs[b].degree += 1;
	}
}

/// Marks an explicitly placed vertex. Positioned vertices stay highlighted.
pub fn set_positioned(v: &mut Vertex) {
	if v.positioned {
		return;
	}
	v.positioned = true;
	v.highlighted = true;
}

/// Breadth-first labelling of connected components. A component's id is the index of its first
/// vertex.
pub fn assign_components(vertices: &mut Vertices, edges: &[(usize, usize)]) {
	let n = vertices.vs.len();
	let mut adjacent: HashMap<usize, Vec<usize>> = HashMap::new();
	for &(a, b) in edges {
		adjacent.entry(a).or_default().push(b);
		adjacent.entry(b).or_default().push(a);
	}
	for v in vertices.vs.iter_mut() {
		v.component = None;
	}
	for root in 0..n {
		if vertices.vs[root].component.is_some() {
			continue;
		}
		vertices.vs[root].component = Some(root);
		let mut queue = VecDeque::from([root]);
		while let Some(w) = queue.pop_front() {
			for &u in adjacent.get(&w).into_iter().flatten() {
				if vertices.vs[u].component.is_none() {
					vertices.vs[u].component = Some(root);
					queue.push_back(u);
				}
			}
		}
	}
}

/// Recolors vertices against the slider: green below, red above, yellow at the slider position
/// and grey when undefined.
pub fn apply_slider(vertices: &mut Vertices, side: &Side) {
	let Some(slider) = &side.vertex_attrs.slider else {
		return;
	};
	let value = |v: &Vertex| v.attrs.get(&slider.id).filter(|d| d.defined).and_then(|d| d.double);
	let bounds = minmax(vertices.vs.iter().filter_map(value));
	let pos = side.slider_pos;
	for v in vertices.vs.iter_mut() {
		let color = match value(&*v) {
			Some(x) => {
				let norm = (100.0 * normalize(x, &bounds) + 50.0).floor();
				if norm < pos {
					"hsl(120,50%,42%)"
				} else if norm > pos {
					"hsl(0,50%,42%)"
				} else {
					"hsl(60,60%,45%)"
				}
			}
			None => "hsl(60,0%,42%)",
		};
		v.set_color(color);
	}
}
