//! The multi-panel graph view: owns one vertex collection and transform per panel, the edges
//! between them, and the state shared by the renderer.

use std::collections::HashMap;

use log::{debug, info, warn};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::bucketed::build_bucketed;
use super::edges::build_edges;
use super::entity::{Edge, EdgeEnd, HoverListener, MIN_TOUCH_RADIUS};
use super::layout::{LayoutStepper, init_view};
use super::map::{MapConfig, MapFilters, MapOverlay};
use super::offsetter::Offsetter;
use super::sampled::{apply_slider, build_sampled, init_positions};
use super::types::{
	DisplayMode, Menu, MenuCommand, Mode, Side, VertexRef, VertexSet, ViewData,
};
use super::vertices::Vertices;

/// Shown instead of the graph when the view could not be built.
pub const ERROR_TEXT: &str = "Failed to generate visualization. Click to report problem.";

/// Tolerance of `init_view` after a data refresh.
const REFRESH_TOLERANCE: f64 = 10.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewConfig {
	/// Share of the panel a freshly fitted graph fills.
	pub graph_to_screen_ratio: f64,
	pub initial_thickness: f64,
	/// Smallest hit radius of a vertex, in pixels.
	pub min_touch_radius: f64,
	pub legend_margin: f64,
	pub legend_line_height: f64,
	/// Longest gap between two context-menu events that still counts as a double click.
	pub double_click_ms: f64,
	pub map: MapConfig,
}

impl Default for ViewConfig {
	fn default() -> Self {
		Self {
			graph_to_screen_ratio: 0.8,
			initial_thickness: 300.0,
			min_touch_radius: MIN_TOUCH_RADIUS,
			legend_margin: 10.0,
			legend_line_height: 15.0,
			double_click_ms: 300.0,
			map: MapConfig::default(),
		}
	}
}

#[derive(Debug, Error)]
pub enum PayloadError {
	#[error("malformed view payload: {0}")]
	Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ViewError {
	/// The backend marked the request as failed.
	#[error("{message}")]
	Request { request: String, message: String },
	#[error("{sets} vertex sets but only {sides} panel configurations")]
	MissingSide { sets: usize, sides: usize },
	#[error(transparent)]
	Payload(#[from] PayloadError),
}

/// Receives the problem reports users file from the error state.
pub trait ErrorReporter {
	fn report(&self, error: &ViewError, summary: &str);
}

/// Reporter that only logs.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogReporter;

impl ErrorReporter for LogReporter {
	fn report(&self, error: &ViewError, summary: &str) {
		warn!("{summary} {error:?}");
	}
}

pub fn parse_view(json: &str) -> Result<ViewData, PayloadError> {
	Ok(serde_json::from_str(json)?)
}

/// Screen rectangle a panel's drawing is clipped to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Clip {
	pub x: f64,
	pub y: f64,
	pub width: f64,
	pub height: f64,
}

/// Clip rectangles for `count` columns, leaving room for 2 px separators between them.
pub fn clips(half_column_width: f64, count: usize, height: f64) -> Vec<Clip> {
	const SEPARATOR_HALF_WIDTH: f64 = 1.0;
	(0..count)
		.map(|i| {
			let left = if i == 0 { 0.0 } else { SEPARATOR_HALF_WIDTH };
			let right = if i + 1 == count { 0.0 } else { SEPARATOR_HALF_WIDTH };
			Clip {
				x: 2.0 * i as f64 * half_column_width + left,
				y: 0.0,
				width: 2.0 * half_column_width - left - right,
				height,
			}
		})
		.collect()
}

/// One visible 2D panel.
#[derive(Clone, Debug)]
pub struct Panel {
	pub vertices: Vertices,
	pub offsetter: Offsetter,
	/// The caller's configuration as of the last sync.
	pub side: Side,
	pub stepper: Option<LayoutStepper>,
	pub map: Option<MapOverlay>,
	pub clip: Clip,
}

/// Copies positions of vertices present in both collections and freezes them once more, so
/// that the initial layout leaves them in place.
fn copy_layout_and_freeze(from: &Vertices, to: &mut Vertices) {
	let by_id: HashMap<&str, _> = from.vs.iter().map(|v| (v.id.as_str(), v)).collect();
	for v in to.vs.iter_mut() {
		if let Some(old) = by_id.get(v.id.as_str()) {
			v.x = old.x;
			v.y = old.y;
			v.frozen = old.frozen + 1;
		}
	}
}

fn unfreeze_all(vertices: &mut Vertices) {
	for v in vertices.vs.iter_mut() {
		v.unfreeze();
	}
}

pub struct GraphView {
	pub config: ViewConfig,
	pub(super) width: f64,
	pub(super) height: f64,
	/// Indexed by panel; 3D panels have no 2D entities.
	pub(super) panels: Vec<Option<Panel>>,
	/// The panels before the last `clear`, kept so that the next update can inherit from them.
	pub(super) retired: Vec<Option<Panel>>,
	pub(super) edges: Vec<Edge>,
	pub(super) separators: Vec<f64>,
	pub(super) fade_non_opaque: bool,
	pub(super) loading: bool,
	pub(super) error: Option<ViewError>,
	pub(super) hovered: Option<VertexRef>,
	pub(super) capture: super::interaction::Capture,
	pub(super) last_right_click: f64,
	pub(super) pending_menu: Option<Menu>,
	pub(super) map_filters: MapFilters,
	pub(super) dirty: bool,
	pub(super) next_z: u64,
	pub(super) rng: SmallRng,
}

impl GraphView {
	pub fn new(config: ViewConfig, width: f64, height: f64, seed: u64) -> Self {
		Self {
			config,
			width,
			height,
			panels: Vec::new(),
			retired: Vec::new(),
			edges: Vec::new(),
			separators: Vec::new(),
			fade_non_opaque: false,
			loading: false,
			error: None,
			hovered: None,
			capture: Default::default(),
			last_right_click: f64::NEG_INFINITY,
			pending_menu: None,
			map_filters: MapFilters::default(),
			dirty: true,
			next_z: 0,
			rng: SmallRng::seed_from_u64(seed),
		}
	}

	pub fn width(&self) -> f64 {
		self.width
	}

	pub fn height(&self) -> f64 {
		self.height
	}

	/// Takes effect on the next `update`.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.dirty = true;
	}

	pub fn panels(&self) -> impl Iterator<Item = &Panel> {
		self.panels.iter().flatten()
	}

	pub fn panel(&self, side: usize) -> Option<&Panel> {
		self.panels.get(side).and_then(Option::as_ref)
	}

	pub(super) fn panel_mut(&mut self, side: usize) -> Option<&mut Panel> {
		self.panels.get_mut(side).and_then(Option::as_mut)
	}

	pub fn edges(&self) -> &[Edge] {
		&self.edges
	}

	/// Screen x of the lines between columns.
	pub fn separators(&self) -> &[f64] {
		&self.separators
	}

	pub fn fade_non_opaque(&self) -> bool {
		self.fade_non_opaque
	}

	pub fn is_loading(&self) -> bool {
		self.loading
	}

	pub fn error(&self) -> Option<&ViewError> {
		self.error.as_ref()
	}

	/// The menu opened by the last interaction, if any.
	pub fn take_menu(&mut self) -> Option<Menu> {
		self.pending_menu.take()
	}

	/// Removes everything shown and stops the layout. The panels are kept aside for the next
	/// update to inherit from.
	pub fn clear(&mut self) {
		let mut panels = std::mem::take(&mut self.panels);
		if panels.iter().any(Option::is_some) {
			for panel in panels.iter_mut().flatten() {
				if let Some(stepper) = &mut panel.stepper {
					stepper.stop();
				}
			}
			self.retired = panels;
		}
		self.edges.clear();
		self.separators.clear();
		self.fade_non_opaque = false;
		self.loading = false;
		self.error = None;
		self.hovered = None;
		self.capture = Default::default();
		self.dirty = true;
	}

	/// Marks the view as waiting for new data.
	pub fn loading(&mut self) {
		self.loading = true;
		self.dirty = true;
	}

	/// Replaces the graph with the error state.
	pub fn fail(&mut self, error: ViewError) {
		self.clear();
		warn!("graph visualization failed: {error}");
		self.error = Some(error);
	}

	/// Forwards the current error to `reporter`. Returns `false` when there is no error.
	pub fn report_error(&self, reporter: &dyn ErrorReporter) -> bool {
		match &self.error {
			Some(error) => {
				reporter.report(error, "Graph visualization failed.");
				true
			}
			None => false,
		}
	}

	/// Rebuilds the view from a payload. `sides` holds the configuration of each panel, in the
	/// order of `data.vertex_sets`.
	pub fn update(&mut self, data: &ViewData, sides: &[Side]) -> Result<(), ViewError> {
		self.clear();
		let n = data.vertex_sets.len();
		if sides.len() < n {
			return Err(ViewError::MissingSide {
				sets: n,
				sides: sides.len(),
			});
		}
		let old = std::mem::take(&mut self.retired);
		if n == 0 {
			self.retired = old;
			return Ok(());
		}
		let half = self.width / n as f64 / 2.0;
		let (height, ratio) = (self.height, self.config.graph_to_screen_ratio);
		let clips = clips(half, n, height);
		self.separators = (1..n).map(|i| 2.0 * half * i as f64).collect();

		for (i, (set, side)) in data.vertex_sets.iter().zip(sides).enumerate() {
			if side.display == DisplayMode::ThreeD {
				debug!("panel {i} is shown in 3D, no 2D entities built");
				self.panels.push(None);
				continue;
			}
			let x_min = 2.0 * i as f64 * half;
			let (x_off, x_max) = (x_min + half, x_min + 2.0 * half);
			let previous = old
				.get(i)
				.and_then(Option::as_ref)
				.filter(|p| p.vertices.mode == set.mode());
			let mut offsetter = match previous {
				Some(p) => {
					let mut o = p.offsetter.inherit();
					if p.vertices.half_column_width != half {
						o.x_off = x_off;
						o.x_min = x_min;
						o.x_max = x_max;
					}
					o
				}
				None => Offsetter::new(
					x_off,
					height / 2.0,
					height * ratio,
					self.config.initial_thickness,
					x_min,
					x_max,
					i,
				),
			};
			let mut vertices = match set {
				VertexSet::Sampled(s) => build_sampled(s, side, i, &mut self.rng),
				VertexSet::Bucketed(b) => build_bucketed(b, side, i, &offsetter, self.width),
			};
			offsetter.redraw();
			vertices.x_min = x_min;
			vertices.half_column_width = half;
			let map = (vertices.mode == Mode::Sampled && side.vertex_attrs.geo.is_some()).then(|| {
				let mut map = MapOverlay::new(self.config.map.clone());
				map.refresh_now();
				map
			});
			self.panels.push(Some(Panel {
				vertices,
				offsetter,
				side: side.clone(),
				stepper: None,
				map,
				clip: clips[i],
			}));
		}

		for bundle in &data.edge_bundles {
			let (s, d) = (bundle.src_idx, bundle.dst_idx);
			if s >= n || d >= n {
				debug!("skipping edge bundle {s} -> {d}: only {n} panels");
				continue;
			}
			let Some(dst_len) = self.panel(d).map(|p| p.vertices.vs.len()) else {
				debug!("skipping edge bundle {s} -> {d}: destination is not 2D");
				continue;
			};
			let within = s == d;
			let Some(panel) = self.panels[s].as_mut() else {
				debug!("skipping edge bundle {s} -> {d}: source is not 2D");
				continue;
			};
			if within && panel.vertices.mode == Mode::Sampled && bundle.edges.len() >= 5 {
				panel
					.vertices
					.add_legend_line(format!("{} edges", bundle.edges.len()), 0.0);
			}
			let built = build_edges(
				&bundle.edges,
				&mut panel.vertices,
				d,
				dst_len,
				within.then(|| &sides[s]),
			);
			let first = self.edges.len();
			for edge in built {
				self.add_edge(edge);
			}
			if within {
				if let Some(panel) = self.panels[s].as_mut() {
					panel.vertices.edges = (first..self.edges.len()).collect();
				}
			}
		}

		let mut positioned = Vec::new();
		for (i, slot) in self.panels.iter_mut().enumerate() {
			let Some(panel) = slot.as_mut().filter(|p| p.vertices.mode == Mode::Sampled) else {
				continue;
			};
			let previous = old
				.get(i)
				.and_then(Option::as_ref)
				.filter(|p| p.vertices.vertex_set_id == panel.vertices.vertex_set_id);
			if let Some(previous) = previous {
				copy_layout_and_freeze(&previous.vertices, &mut panel.vertices);
			}
			let pairs: Vec<(usize, usize)> = panel
				.vertices
				.edges
				.iter()
				.map(|&e| (self.edges[e].src.index, self.edges[e].dst.index))
				.collect();
			let projection = panel.map.as_ref().map(|m| &m.projection);
			init_positions(&mut panel.vertices, &panel.side, &pairs, projection);
			let mut stepper = LayoutStepper::new(&mut panel.vertices, pairs, panel.side.animate.as_ref());
			init_view(&panel.vertices, &mut panel.offsetter, height, ratio, REFRESH_TOLERANCE);
			apply_slider(&mut panel.vertices, &panel.side);
			unfreeze_all(&mut panel.vertices);
			stepper.animate();
			panel.stepper = Some(stepper);
			positioned.extend(
				panel
					.vertices
					.vs
					.iter()
					.enumerate()
					.filter(|(_, v)| v.positioned)
					.map(|(index, _)| VertexRef { side: i, index }),
			);
		}
		for r in positioned {
			self.set_highlight(r, true);
		}
		for e in 0..self.edges.len() {
			self.refresh_edge(e);
		}
		info!(
			"graph view updated: {} panels, {} edges",
			self.panels().count(),
			self.edges.len()
		);
		Ok(())
	}

	/// Adds an edge and subscribes it to its endpoints.
	fn add_edge(&mut self, edge: Edge) {
		let id = self.edges.len();
		let (src, dst, is_loop) = (edge.src, edge.dst, edge.is_loop());
		self.edges.push(edge);
		let mut subscribe = |r: VertexRef, end: EdgeEnd| {
			if let Some(v) = self.vertex_mut(r) {
				v.listeners.moves.push(id);
				v.listeners.highlights.push((id, end));
				v.listeners.hovers.push(HoverListener::Edge(id));
				v.listeners.opaques.push(id);
			}
		};
		subscribe(src, EdgeEnd::Out);
		if !is_loop {
			subscribe(dst, EdgeEnd::In);
		}
	}

	/// Takes the caller's current panel configurations. Kicks off the layout when animation
	/// settings changed and recolors when the slider moved.
	pub fn sync_sides(&mut self, sides: &[Side]) {
		for (panel, side) in self.panels.iter_mut().zip(sides) {
			let Some(panel) = panel else { continue };
			let animate_changed = panel.side.animate != side.animate;
			let slider_changed = panel.side.slider_pos != side.slider_pos;
			panel.side = side.clone();
			if animate_changed {
				if let Some(stepper) = &mut panel.stepper {
					stepper.animate();
				}
			}
			if slider_changed && panel.vertices.mode == Mode::Sampled {
				apply_slider(&mut panel.vertices, &panel.side);
				self.dirty = true;
			}
		}
	}

	pub fn set_map_filters(&mut self, filters: MapFilters) {
		if self.map_filters == filters {
			return;
		}
		self.map_filters = filters;
		for panel in self.panels.iter_mut().flatten() {
			if let Some(map) = &mut panel.map {
				map.refresh_now();
			}
		}
	}

	/// Requests interactive layout on a panel.
	pub(super) fn animate(&mut self, side: usize) {
		if let Some(stepper) = self.panel_mut(side).and_then(|p| p.stepper.as_mut()) {
			stepper.animate();
		}
	}

	/// Handles the engine-side menu commands. Returns `false` for commands the caller applies
	/// to its panel configuration.
	pub fn run_command(&mut self, command: &MenuCommand) -> bool {
		match command {
			MenuCommand::Freeze(r) => {
				if let Some(v) = self.vertex_mut(*r) {
					v.freeze();
				}
			}
			MenuCommand::Unfreeze(r) => {
				if let Some(v) = self.vertex_mut(*r) {
					v.unfreeze();
				}
				self.animate(r.side);
			}
			_ => return false,
		}
		true
	}

	/// Advances the layouts by one frame, then flushes pending redraws. `now` is the frame time
	/// in milliseconds. Returns whether the canvas needs repainting.
	pub fn tick(&mut self, now: f64) -> bool {
		let (height, ratio) = (self.height, self.config.graph_to_screen_ratio);
		for panel in self.panels.iter_mut().flatten() {
			let Some(stepper) = panel.stepper.as_mut().filter(|s| s.is_animating()) else {
				continue;
			};
			stepper.step(
				&mut panel.vertices,
				&mut panel.offsetter,
				panel.side.animate.as_ref(),
				&mut self.rng,
				height,
				ratio,
			);
		}
		self.flush(now)
	}

	/// The batched redraw: recomputes what depends on the transforms that changed since the
	/// last flush.
	pub fn flush(&mut self, now: f64) -> bool {
		let mut changed = Vec::new();
		let height = self.height;
		for (i, panel) in self.panels.iter_mut().enumerate() {
			let Some(panel) = panel else { continue };
			if panel.offsetter.take_pending() {
				changed.push(i);
			}
			let Some(map) = &mut panel.map else { continue };
			if map.redraw(&panel.offsetter) {
				map.schedule_refresh(now);
			}
			if map.refresh_due(now) {
				let width = 2.0 * panel.vertices.half_column_width;
				let tile = map.tile_for(
					&panel.offsetter,
					width,
					height,
					panel.vertices.x_min,
					&self.map_filters,
				);
				map.push(tile);
				self.dirty = true;
			}
		}
		if !changed.is_empty() {
			for e in 0..self.edges.len() {
				let edge = &self.edges[e];
				if changed.contains(&edge.src.side) || changed.contains(&edge.dst.side) {
					self.refresh_edge(e);
				}
			}
		}
		!changed.is_empty() | std::mem::take(&mut self.dirty)
	}

	/// Whether any layout is still running.
	pub fn is_animating(&self) -> bool {
		self.panels()
			.any(|p| p.stepper.as_ref().is_some_and(LayoutStepper::is_animating))
	}
}

#[cfg(test)]
pub(super) mod tests {
	use super::*;
	use crate::components::graph_view::types::{
		AnimateSettings, BucketRecord, BucketedSet, EdgeBundle, EdgeRecord, SampledSet,
		VertexRecord,
	};

	pub fn sampled(ids: &[&str]) -> VertexSet {
		VertexSet::Sampled(SampledSet {
			vertices: ids
				.iter()
				.map(|id| VertexRecord {
					id: id.to_string(),
					..Default::default()
				})
				.collect(),
		})
	}

	pub fn bundle(src: usize, dst: usize, pairs: &[(usize, usize)]) -> EdgeBundle {
		EdgeBundle {
			src_idx: src,
			dst_idx: dst,
			edges: pairs
				.iter()
				.map(|&(a, b)| EdgeRecord {
					a,
					b,
					size: 1.0,
					..Default::default()
				})
				.collect(),
			layout_3d: None,
		}
	}

	/// A 400×300 view with one sampled panel: a path a–b–c plus the isolated d.
	pub fn path_view() -> GraphView {
		let mut view = GraphView::new(ViewConfig::default(), 400.0, 300.0, 5);
		let data = ViewData {
			vertex_sets: vec![sampled(&["a", "b", "c", "d"])],
			edge_bundles: vec![bundle(0, 0, &[(0, 1), (1, 2)])],
		};
		view.update(&data, &[Side::default()]).unwrap();
		view
	}

	#[test]
	fn update_builds_panels_and_edges() {
		let view = path_view();
		let panel = view.panel(0).unwrap();
		assert_eq!(panel.vertices.vs.len(), 4);
		assert_eq!(panel.vertices.edges, vec![0, 1]);
		assert_eq!(view.edges().len(), 2);
		assert!(panel.stepper.as_ref().unwrap().is_animating());
		let c = panel.vertices.vs[0].component;
		assert_eq!(panel.vertices.vs[2].component, c);
		assert_ne!(panel.vertices.vs[3].component, c);
		assert_eq!(panel.vertices.vs[1].listeners.hovers.len(), 2);
	}

	#[test]
	fn missing_side_is_an_error() {
		let mut view = GraphView::new(ViewConfig::default(), 400.0, 300.0, 1);
		let data = ViewData {
			vertex_sets: vec![sampled(&["a"]), sampled(&["b"])],
			edge_bundles: vec![],
		};
		let err = view.update(&data, &[Side::default()]).unwrap_err();
		assert!(matches!(err, ViewError::MissingSide { sets: 2, sides: 1 }));
		view.fail(err);
		assert!(view.error().is_some());
		assert!(view.panels().next().is_none());
	}

	#[test]
	fn out_of_range_bundles_are_skipped() {
		let mut view = GraphView::new(ViewConfig::default(), 400.0, 300.0, 1);
		let data = ViewData {
			vertex_sets: vec![sampled(&["a", "b"])],
			edge_bundles: vec![bundle(0, 1, &[(0, 0)]), bundle(0, 0, &[(0, 1)])],
		};
		view.update(&data, &[Side::default()]).unwrap();
		assert_eq!(view.edges().len(), 1);
	}

	#[test]
	fn three_d_panels_get_no_entities() {
		let mut view = GraphView::new(ViewConfig::default(), 400.0, 300.0, 1);
		let data = ViewData {
			vertex_sets: vec![sampled(&["a"]), sampled(&["b", "c"])],
			edge_bundles: vec![bundle(1, 1, &[(0, 1)]), bundle(0, 1, &[(0, 0)])],
		};
		let sides = [
			Side::default(),
			Side {
				display: DisplayMode::ThreeD,
				..Default::default()
			},
		];
		view.update(&data, &sides).unwrap();
		assert!(view.panel(1).is_none());
		assert!(view.edges().is_empty());
		assert_eq!(view.separators(), &[200.0]);
	}

	#[test]
	fn refresh_inherits_transform_and_layout() {
		let mut view = path_view();
		{
			let panel = view.panel_mut(0).unwrap();
			panel.offsetter.pan_to(panel.offsetter.x_off + 3.0, panel.offsetter.y_off);
		}
		let before = view.panel(0).unwrap().clone();
		let data = ViewData {
			vertex_sets: vec![sampled(&["a", "b", "c", "d"])],
			edge_bundles: vec![bundle(0, 0, &[(0, 1), (1, 2)])],
		};
		view.update(&data, &[Side::default()]).unwrap();
		let panel = view.panel(0).unwrap();
		assert!(panel.offsetter.inherited);
		assert_eq!(panel.offsetter.x_off, before.offsetter.x_off);
		for (old, new) in before.vertices.vs.iter().zip(&panel.vertices.vs) {
			assert_eq!((old.x, old.y), (new.x, new.y));
			assert_eq!(new.frozen, 0);
		}
	}

	#[test]
	fn mode_change_starts_a_fresh_transform() {
		let mut view = path_view();
		let data = ViewData {
			vertex_sets: vec![VertexSet::Bucketed(BucketedSet {
				vertices: vec![BucketRecord { x: 0, y: 0, size: 1.0 }],
				..Default::default()
			})],
			edge_bundles: vec![],
		};
		view.update(&data, &[Side::default()]).unwrap();
		let panel = view.panel(0).unwrap();
		assert!(!panel.offsetter.inherited);
		assert_eq!(panel.offsetter.zoom, 240.0);
		assert_eq!(panel.offsetter.thickness, 300.0);
	}

	#[test]
	fn flush_reports_panned_panels_once() {
		let mut view = path_view();
		view.panel_mut(0).unwrap().stepper.as_mut().unwrap().stop();
		assert!(view.flush(0.0));
		assert!(!view.flush(0.0));
		let panel = view.panel_mut(0).unwrap();
		panel.offsetter.pan_to(panel.offsetter.x_off + 5.0, panel.offsetter.y_off);
		assert!(view.flush(0.0));
		assert!(!view.flush(0.0));
	}

	#[test]
	fn clips_leave_room_for_separators() {
		let c = clips(100.0, 2, 300.0);
		assert_eq!((c[0].x, c[0].width), (0.0, 199.0));
		assert_eq!((c[1].x, c[1].width), (201.0, 199.0));
	}

	#[test]
	fn freeze_commands_are_run_by_the_view() {
		let mut view = path_view();
		let r = VertexRef { side: 0, index: 1 };
		assert!(view.run_command(&MenuCommand::Freeze(r)));
		assert!(view.vertex(r).unwrap().is_frozen());
		view.panel_mut(0).unwrap().stepper.as_mut().unwrap().stop();
		assert!(view.run_command(&MenuCommand::Unfreeze(r)));
		assert!(!view.vertex(r).unwrap().is_frozen());
		assert!(view.is_animating());
		assert!(!view.run_command(&MenuCommand::SetCenter { side: 0, id: "a".into() }));
	}

	#[test]
	fn tick_stops_when_animation_is_disabled() {
		let mut view = path_view();
		assert!(view.tick(0.0));
		assert!(!view.is_animating());
		let enabled = Side {
			animate: Some(AnimateSettings {
				enabled: true,
				..Default::default()
			}),
			..Default::default()
		};
		view.sync_sides(&[enabled]);
		assert!(view.is_animating());
	}

	#[test]
	fn loading_and_clear_toggle_flags() {
		let mut view = path_view();
		view.loading();
		assert!(view.is_loading());
		view.clear();
		assert!(!view.is_loading());
		assert!(view.panels().next().is_none());
		assert!(!view.report_error(&LogReporter));
	}

	#[test]
	fn parse_errors_are_payload_errors() {
		let err = parse_view("{\"vertexSets\": 3}").unwrap_err();
		let view_error = ViewError::from(err);
		assert!(view_error.to_string().starts_with("malformed view payload"));
	}
}
