use super::entity::Edge;
use super::types::{EdgeRecord, Side, VertexRef};
use super::util::minmax;
use super::vertices::Vertices;

/// Width of an edge when all edges weigh the same.
const NORMAL_WIDTH: f64 = 0.02;

/// Builds the edges of one bundle between `srcs` and the panel `dst_side` with `dst_len`
/// vertices. `side` carries the edge bindings of within-panel bundles; the color legend goes
/// to `srcs`.
///
/// Widths come from the bound width attribute or the edge size, scaled so that up to 3× wider
/// lines appear when widths actually vary. Edges of size 0 and edges pointing outside the
/// vertex lists are skipped.
pub fn build_edges(
	records: &[EdgeRecord],
	srcs: &mut Vertices,
	dst_side: usize,
	dst_len: usize,
	side: Option<&Side>,
) -> Vec<Edge> {
	let bindings = side.map(|s| &s.edge_attrs);
	let width_key = bindings.and_then(|b| b.width.as_ref()).map(|a| a.key());
	let color_meta = bindings.and_then(|b| b.edge_color.as_ref()).map(|a| a.meta());
	let label_key = bindings.and_then(|b| b.edge_label.as_ref()).map(|a| a.key());
	let color_map =
		srcs.setup_color_map(records.iter().map(|e| &e.attrs), color_meta.as_ref(), "Edge Color");

	let widths: Vec<f64> = records
		.iter()
		.map(|e| match &width_key {
			Some(key) => e.attrs.get(key).and_then(|v| v.double).unwrap_or(0.0),
			None => e.size,
		})
		.collect();
	let bounds = minmax(widths.iter().copied());
	let scale = if bounds.max > 0.0 {
		let info = bounds.span / bounds.max;
		NORMAL_WIDTH * (1.0 + info * 2.0) / bounds.max
	} else {
		NORMAL_WIDTH
	};

	let src_side = srcs.side;
	let src_len = srcs.vs.len();
	records
		.iter()
		.zip(widths)
		.filter(|(e, _)| e.size != 0.0 && e.a < src_len && e.b < dst_len)
		.map(|(e, width)| {
			let color = match (&color_map, &color_meta) {
				(Some(map), Some(meta)) => e.attrs.get(&meta.id).filter(|v| v.defined).and_then(|v| {
					if meta.type_name == "Double" {
						map.get_double(v.double?)
					} else {
						map.get(v.string.as_deref()?)
					}
				}),
				_ => None,
			};
			let label = label_key
				.as_ref()
				.and_then(|k| e.attrs.get(k))
				.and_then(|v| v.string.clone());
			Edge::new(
				VertexRef {
					side: src_side,
					index: e.a,
				},
				VertexRef {
					side: dst_side,
					index: e.b,
				},
				scale * width,
				color.map(String::from),
				label,
			)
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::graph_view::entity::{Appearance, Vertex};
	use crate::components::graph_view::types::{AggregatedAttr, DynamicValue, Mode};

	fn panel(n: usize) -> Vertices {
		let mut vs = Vertices::new(Mode::Sampled, 0);
		vs.vs = (0..n)
			.map(|i| Vertex::new(i.to_string(), 0.0, 0.0, Appearance::default()))
			.collect();
		vs
	}

	fn edge(a: usize, b: usize, size: f64) -> EdgeRecord {
		EdgeRecord {
			a,
			b,
			size,
			..Default::default()
		}
	}

	#[test]
	fn uniform_sizes_give_normal_width() {
		let mut vs = panel(3);
		let edges = build_edges(&[edge(0, 1, 2.0), edge(1, 2, 2.0)], &mut vs, 0, 3, None);
		assert_eq!(edges.len(), 2);
		assert!((edges[0].width - 0.02).abs() < 1e-12);
	}

	#[test]
	fn varying_sizes_widen_up_to_three_times() {
		let mut vs = panel(3);
		let edges = build_edges(&[edge(0, 1, 1.0), edge(1, 2, 4.0)], &mut vs, 0, 3, None);
		// info = 3/4, scale = 0.02 * 2.5 / 4
		assert!((edges[1].width - 0.05).abs() < 1e-12);
		assert!((edges[0].width - 0.0125).abs() < 1e-12);
	}

	#[test]
	fn zero_sized_and_dangling_edges_are_skipped() {
		let mut vs = panel(2);
		let edges = build_edges(&[edge(0, 1, 0.0), edge(0, 5, 1.0), edge(1, 0, 1.0)], &mut vs, 0, 2, None);
		assert_eq!(edges.len(), 1);
		assert_eq!(edges[0].src.index, 1);
	}

	#[test]
	fn width_and_label_bindings_use_aggregated_keys() {
		let mut vs = panel(2);
		let mut side = Side::default();
		let attr = |id: &str| AggregatedAttr {
			id: id.into(),
			title: id.into(),
			type_name: "Double".into(),
			aggregator: "sum".into(),
		};
		side.edge_attrs.width = Some(attr("w"));
		side.edge_attrs.edge_label = Some(attr("l"));
		let mut record = edge(0, 1, 1.0);
		record.attrs.insert(
			"w:sum".into(),
			DynamicValue {
				defined: true,
				double: Some(3.0),
				..Default::default()
			},
		);
		record.attrs.insert(
			"l:sum".into(),
			DynamicValue {
				defined: true,
				string: Some("hi".into()),
				..Default::default()
			},
		);
		let edges = build_edges(&[record], &mut vs, 1, 2, Some(&side));
		assert!((edges[0].width - 0.02).abs() < 1e-12);
		assert_eq!(edges[0].label.as_deref(), Some("hi"));
		assert_eq!(edges[0].dst.side, 1);
	}
}
