use super::entity::{Appearance, HoverListener, Label, LabelClass, Vertex};
use super::offsetter::Offsetter;
use super::types::{BucketedSet, LabelType, Mode, Side};
use super::util::{Bounds, minmax, normalize_count};
use super::vertices::Vertices;

const LABEL_SPACE: f64 = 0.05;

fn bucket_count(bounds: &Bounds) -> f64 {
	if bounds.is_empty() { 1.0 } else { bounds.span + 1.0 }
}

fn label_position(i: usize, label_type: LabelType, buckets: f64) -> f64 {
	match label_type {
		LabelType::Between => normalize_count(i as f64, buckets),
		LabelType::Center => normalize_count(i as f64 + 0.5, buckets),
	}
}

/// Indices of the labels a cell at bucket `i` belongs to.
fn label_ids(ids: &[usize], i: usize, label_type: LabelType) -> impl Iterator<Item = usize> + '_ {
	let extra = (label_type == LabelType::Between).then_some(i + 1);
	std::iter::once(i).chain(extra).filter_map(|j| ids.get(j).copied())
}

fn add_label(vertices: &mut Vertices, label: Label) -> usize {
	vertices.labels.push(label);
	vertices.labels.len() - 1
}

/// Builds the grid of a bucketed panel. `view_width` decides whether the y axis labels go on
/// the left or the right of the grid.
pub fn build_bucketed(
	data: &BucketedSet,
	side: &Side,
	side_index: usize,
	offsetter: &Offsetter,
	view_width: f64,
) -> Vertices {
	let mut vertices = Vertices::new(Mode::Bucketed, side_index);
	vertices.vertex_set_id = side.vertex_set_id.clone();
	vertices.x_attribute = side.x_attribute.clone();
	vertices.y_attribute = side.y_attribute.clone();
	let y = 0.5 + LABEL_SPACE;

	let x_buckets = bucket_count(&minmax(data.vertices.iter().map(|c| c.x as f64)));
	let y_buckets = bucket_count(&minmax(data.vertices.iter().map(|c| c.y as f64)));

	if let Some(attr) = &side.x_attribute {
		let title = Label::new(0.0, y - LABEL_SPACE, &attr.title, LabelClass::AxisTitle);
		add_label(&mut vertices, title);
	}
	let x_labels: Vec<usize> = data
		.x_labels
		.iter()
		.enumerate()
		.map(|(i, text)| {
			let x = label_position(i, data.x_label_type, x_buckets);
			add_label(&mut vertices, Label::new(x, y, text, LabelClass::Plain))
		})
		.collect();

	let (x, class) = if offsetter.x_off < view_width / 2.0 {
		(-0.5 - LABEL_SPACE, LabelClass::Left)
	} else {
		(0.5 + LABEL_SPACE, LabelClass::Right)
	};
	if let Some(attr) = &side.y_attribute {
		let mul = if class == LabelClass::Left { 1.0 } else { -1.0 };
		let title = Label::new(x + mul * LABEL_SPACE, 0.0, &attr.title, LabelClass::AxisTitle);
		add_label(&mut vertices, title.vertical());
	}
	let y_labels: Vec<usize> = data
		.y_labels
		.iter()
		.enumerate()
		.map(|(i, text)| {
			let y = -label_position(i, data.y_label_type, y_buckets);
			add_label(&mut vertices, Label::new(x, y, text, class))
		})
		.collect();

	let max_size = minmax(data.vertices.iter().map(|c| c.size)).max;
	let scale = 1.0 / max_size;
	for (i, cell) in data.vertices.iter().enumerate() {
		let look = Appearance {
			radius: 0.1 * (scale * cell.size).sqrt(),
			label: Some(format!("{}", cell.size)),
			..Default::default()
		};
		let mut v = Vertex::new(
			i.to_string(),
			normalize_count(cell.x as f64 + 0.5, x_buckets),
			-normalize_count(cell.y as f64 + 0.5, y_buckets),
			look,
		);
		v.size = cell.size;
		if cell.size == 0.0 {
			// Kept so that indices keep matching the filters, but not shown.
			v.hidden = true;
			vertices.vs.push(v);
			continue;
		}
		for id in label_ids(&x_labels, cell.x, data.x_label_type)
			.chain(label_ids(&y_labels, cell.y, data.y_label_type))
		{
			v.listeners.hovers.push(HoverListener::Label(id));
		}
		v.x_filter = data.x_filters.get(cell.x).cloned();
		v.y_filter = data.y_filters.get(cell.y).cloned();
		vertices.vs.push(v);
	}
	vertices
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::graph_view::types::{AttrMeta, BucketRecord};

	fn cell(x: usize, y: usize, size: f64) -> BucketRecord {
		BucketRecord { x, y, size }
	}

	fn grid() -> BucketedSet {
		BucketedSet {
			vertices: vec![cell(0, 0, 4.0), cell(1, 0, 1.0), cell(0, 1, 0.0), cell(1, 1, 16.0)],
			x_labels: vec!["0".into(), "5".into(), "10".into()],
			y_labels: vec!["a".into(), "b".into()],
			x_label_type: LabelType::Between,
			y_label_type: LabelType::Center,
			x_filters: vec!["[0,5)".into(), "[5,10]".into()],
			y_filters: vec!["a".into(), "b".into()],
		}
	}

	fn build(side: &Side, x_off: f64) -> Vertices {
		let off = Offsetter::new(x_off, 0.0, 1.0, 1.0, 0.0, 1000.0, 0);
		build_bucketed(&grid(), side, 0, &off, 1000.0)
	}

	#[test]
	fn cells_are_placed_on_a_grid() {
		let vs = build(&Side::default(), 100.0);
		assert_eq!((vs.vs[0].x, vs.vs[0].y), (-0.25, 0.25));
		assert_eq!((vs.vs[3].x, vs.vs[3].y), (0.25, -0.25));
	}

	#[test]
	fn radius_scales_with_square_root_of_relative_size() {
		let vs = build(&Side::default(), 100.0);
		assert!((vs.vs[3].r - 0.1).abs() < 1e-12);
		assert!((vs.vs[0].r - 0.05).abs() < 1e-12);
		assert_eq!(vs.vs[2].r, 0.0);
	}

	#[test]
	fn empty_cells_are_kept_but_hidden() {
		let vs = build(&Side::default(), 100.0);
		assert_eq!(vs.vs.len(), 4);
		assert!(vs.vs[2].hidden);
		assert!(vs.vs[2].listeners.hovers.is_empty());
		assert_eq!(vs.labels.len(), 5);
	}

	#[test]
	fn cells_listen_to_their_axis_labels() {
		let vs = build(&Side::default(), 100.0);
		// Between-type x labels bound the cell on both sides, center-type y labels once.
		assert_eq!(
			vs.vs[1].listeners.hovers,
			vec![HoverListener::Label(1), HoverListener::Label(2), HoverListener::Label(3)]
		);
		assert_eq!(vs.vs[1].x_filter.as_deref(), Some("[5,10]"));
		assert_eq!(vs.vs[1].y_filter.as_deref(), Some("a"));
	}

	#[test]
	fn y_labels_follow_the_panel_side() {
		let side = Side {
			x_attribute: Some(AttrMeta {
				title: "age".into(),
				..Default::default()
			}),
			y_attribute: Some(AttrMeta {
				title: "city".into(),
				..Default::default()
			}),
			..Default::default()
		};
		let left = build(&side, 100.0);
		let right = build(&side, 900.0);
		let last = |vs: &Vertices| vs.labels.last().cloned().unwrap();
		assert_eq!(last(&left).class, LabelClass::Left);
		assert_eq!(last(&right).class, LabelClass::Right);
		assert!(left.labels.iter().any(|l| l.vertical && l.text == "city"));
		assert_eq!(left.labels[0].text, "age");
	}
}
