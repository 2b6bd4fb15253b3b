//! Highlight, hover, opacity and move propagation between the entities of a [`GraphView`].
//!
//! A vertex lists the edges and labels that observe it. Rules:
//! - Hovering either end of an edge makes both ends opaque; hover end resets them.
//! - An edge is opaque when both of its ends are.
//! - Highlighting an end marks the edge `out` at the source and `in` at the destination and
//!   brings it to the front.
//! - Moving an end recomputes the edge's visibility.

use super::entity::{EdgeEnd, HoverListener, Vertex};
use super::types::VertexRef;
use super::view::GraphView;

impl GraphView {
	pub fn vertex(&self, r: VertexRef) -> Option<&Vertex> {
		self.panel(r.side)?.vertices.vs.get(r.index)
	}

	pub(super) fn vertex_mut(&mut self, r: VertexRef) -> Option<&mut Vertex> {
		self.panel_mut(r.side)?.vertices.vs.get_mut(r.index)
	}

	pub fn hovered(&self) -> Option<VertexRef> {
		self.hovered
	}

	pub fn set_highlight(&mut self, r: VertexRef, on: bool) {
		let Some(v) = self.vertex_mut(r) else { return };
		v.highlighted = on;
		let highlights = v.listeners.highlights.clone();
		for (e, end) in highlights {
			let z = self.next_z;
			let Some(edge) = self.edges.get_mut(e) else { continue };
			match end {
				EdgeEnd::In => edge.highlight_in = on,
				EdgeEnd::Out => edge.highlight_out = on,
			}
			if on {
				edge.z = z;
				self.next_z += 1;
			}
		}
		self.dirty = true;
	}

	pub fn set_opaque(&mut self, r: VertexRef, on: bool) {
		let Some(v) = self.vertex_mut(r) else { return };
		v.opaque = on;
		let opaques = v.listeners.opaques.clone();
		for e in opaques {
			let Some(edge) = self.edges.get(e) else { continue };
			let (src, dst) = (edge.src, edge.dst);
			let both = self.vertex(src).is_some_and(|v| v.opaque)
				&& self.vertex(dst).is_some_and(|v| v.opaque);
			self.edges[e].opaque = both;
		}
		self.dirty = true;
	}

	/// The pointer entered the vertex.
	pub fn hover_start(&mut self, r: VertexRef) {
		let Some(v) = self.vertex(r) else { return };
		let positioned = v.positioned;
		let hovers = v.listeners.hovers.clone();
		self.fade_non_opaque = true;
		if !positioned {
			self.set_highlight(r, true);
		}
		for listener in hovers {
			self.notify_hover(r, listener, true);
		}
		self.dirty = true;
	}

	/// The pointer left the vertex. A held vertex keeps its neighborhood lit until released.
	pub fn hover_end(&mut self, r: VertexRef) {
		let Some(v) = self.vertex(r) else { return };
		if v.held {
			return;
		}
		let positioned = v.positioned;
		let hovers = v.listeners.hovers.clone();
		self.fade_non_opaque = false;
		if !positioned {
			self.set_highlight(r, false);
		}
		for listener in hovers {
			self.notify_hover(r, listener, false);
		}
		self.dirty = true;
	}

	fn notify_hover(&mut self, r: VertexRef, listener: HoverListener, on: bool) {
		match listener {
			HoverListener::Edge(e) => {
				let Some(edge) = self.edges.get(e) else { return };
				let (src, dst) = (edge.src, edge.dst);
				self.set_opaque(src, on);
				self.set_opaque(dst, on);
			}
			HoverListener::Label(l) => {
				let Some(label) = self
					.panel_mut(r.side)
					.and_then(|p| p.vertices.labels.get_mut(l))
				else {
					return;
				};
				if on {
					label.hovered += 1;
				} else {
					label.hovered = label.hovered.saturating_sub(1);
				}
			}
		}
	}

	pub fn move_vertex(&mut self, r: VertexRef, x: f64, y: f64) {
		let Some(panel) = self.panel_mut(r.side) else { return };
		let Some(v) = panel.vertices.vs.get_mut(r.index) else { return };
		v.x = x;
		v.y = y;
		let moves = v.listeners.moves.clone();
		panel.offsetter.redraw();
		for e in moves {
			self.refresh_edge(e);
		}
	}

	pub fn hold(&mut self, r: VertexRef) {
		if let Some(v) = self.vertex_mut(r) {
			v.held = true;
		}
	}

	/// Ends a hold. The vertex behaves as if the pointer had left it.
	pub fn release(&mut self, r: VertexRef) {
		let Some(v) = self.vertex_mut(r) else { return };
		v.held = false;
		self.hover_end(r);
		if self.hovered == Some(r) {
			self.hovered = None;
		}
	}

	/// Whether an edge is drawn: always within a panel, and across panels only while both ends
	/// are inside their panels' bands.
	pub fn edge_visible(&self, e: usize) -> bool {
		let Some(edge) = self.edges.get(e) else {
			return false;
		};
		if edge.src.side == edge.dst.side {
			return true;
		}
		let inside = |r: VertexRef| {
			let Some(panel) = self.panel(r.side) else {
				return false;
			};
			panel
				.vertices
				.vs
				.get(r.index)
				.is_some_and(|v| panel.offsetter.contains_x(panel.offsetter.screen_x(v.x)))
		};
		inside(edge.src) && inside(edge.dst)
	}

	pub(super) fn refresh_edge(&mut self, e: usize) {
		let visible = self.edge_visible(e);
		if let Some(edge) = self.edges.get_mut(e) {
			if edge.visible != visible {
				edge.visible = visible;
				self.dirty = true;
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::graph_view::types::{BucketRecord, BucketedSet, LabelType, Side, ViewData, VertexSet};
	use crate::components::graph_view::view::ViewConfig;
	use crate::components::graph_view::view::tests::{bundle, path_view, sampled};

	fn at(index: usize) -> VertexRef {
		VertexRef { side: 0, index }
	}

	#[test]
	fn hover_lights_up_the_neighborhood() {
		let mut view = path_view();
		view.hover_start(at(1));
		assert!(view.fade_non_opaque());
		for i in 0..3 {
			assert!(view.vertex(at(i)).unwrap().opaque, "vertex {i}");
		}
		assert!(!view.vertex(at(3)).unwrap().opaque);
		assert!(view.edges().iter().all(|e| e.opaque));
		assert!(view.vertex(at(1)).unwrap().highlighted);
		// b is the destination of a–b and the source of b–c.
		assert!(view.edges()[0].highlight_in && !view.edges()[0].highlight_out);
		assert!(view.edges()[1].highlight_out);

		view.hover_end(at(1));
		assert!(!view.fade_non_opaque());
		assert!((0..4).all(|i| !view.vertex(at(i)).unwrap().opaque));
		assert!(view.edges().iter().all(|e| !e.opaque && !e.is_highlighted()));
	}

	#[test]
	fn edge_needs_both_ends_opaque() {
		let mut view = path_view();
		view.set_opaque(at(0), true);
		assert!(!view.edges()[0].opaque);
		view.set_opaque(at(1), true);
		assert!(view.edges()[0].opaque);
		assert!(!view.edges()[1].opaque);
	}

	#[test]
	fn held_vertex_keeps_its_neighborhood_until_release() {
		let mut view = path_view();
		view.hover_start(at(0));
		view.hold(at(0));
		view.hover_end(at(0));
		assert!(view.vertex(at(1)).unwrap().opaque);
		assert!(view.vertex(at(0)).unwrap().highlighted);
		view.release(at(0));
		assert!(!view.vertex(at(1)).unwrap().opaque);
		assert!(!view.vertex(at(0)).unwrap().highlighted);
	}

	#[test]
	fn highlight_brings_edges_to_front() {
		let mut view = path_view();
		view.set_highlight(at(0), true);
		let first = view.edges()[0].z;
		view.set_highlight(at(2), true);
		assert!(view.edges()[1].z > first);
	}

	#[test]
	fn self_loops_subscribe_once() {
		let mut view = GraphView::new(ViewConfig::default(), 400.0, 300.0, 1);
		let data = ViewData {
			vertex_sets: vec![sampled(&["a"])],
			edge_bundles: vec![bundle(0, 0, &[(0, 0)])],
		};
		view.update(&data, &[Side::default()]).unwrap();
		assert_eq!(view.vertex(at(0)).unwrap().listeners.hovers.len(), 1);
		view.hover_start(at(0));
		assert!(view.edges()[0].opaque);
	}

	#[test]
	fn cross_panel_edges_hide_outside_the_bands() {
		let mut view = GraphView::new(ViewConfig::default(), 400.0, 300.0, 1);
		let data = ViewData {
			vertex_sets: vec![sampled(&["a"]), sampled(&["b"])],
			edge_bundles: vec![bundle(0, 1, &[(0, 0)])],
		};
		view.update(&data, &[Side::default(), Side::default()]).unwrap();
		assert!(view.edges()[0].visible);
		let b = VertexRef { side: 1, index: 0 };
		view.move_vertex(b, 1e6, 0.0);
		assert!(!view.edges()[0].visible);
		assert_eq!(view.vertex(b).unwrap().x, 1e6);
	}

	#[test]
	fn hovering_a_cell_lights_its_axis_labels() {
		let mut view = GraphView::new(ViewConfig::default(), 400.0, 300.0, 1);
		let data = ViewData {
			vertex_sets: vec![VertexSet::Bucketed(BucketedSet {
				vertices: vec![BucketRecord { x: 0, y: 0, size: 2.0 }],
				x_labels: vec!["lo".into(), "hi".into()],
				y_labels: vec!["only".into()],
				x_label_type: LabelType::Between,
				y_label_type: LabelType::Center,
				..Default::default()
			})],
			edge_bundles: vec![],
		};
		view.update(&data, &[Side::default()]).unwrap();
		view.hover_start(at(0));
		let labels = &view.panel(0).unwrap().vertices.labels;
		assert!(labels.iter().all(|l| l.is_highlighted()));
		view.hover_end(at(0));
		let labels = &view.panel(0).unwrap().vertices.labels;
		assert!(labels.iter().all(|l| !l.is_highlighted()));
	}
}
