use log::debug;
use rand::Rng;

use super::force::{Engine, LayoutOptions};
use super::offsetter::Offsetter;
use super::types::AnimateSettings;
use super::util::{Bounds, minmax};
use super::vertices::Vertices;

/// Seconds of simulation run before a sampled panel is first shown.
pub const INIT_SECONDS: f64 = 2.0;

/// The ideal zoom to fit the bounds into a `width`×`height` area, or `None` when the bounds
/// are degenerate in both directions.
pub fn zoom_for(xb: &Bounds, yb: &Bounds, width: f64, height: f64, ratio: f64) -> Option<f64> {
	let x_center = (xb.min + xb.max) / 2.0;
	let y_center = (yb.min + yb.max) / 2.0;
	let x_fit = 0.5 * width / (xb.max - x_center);
	let y_fit = 0.5 * height / (yb.max - y_center);
	if x_fit.is_finite() || y_fit.is_finite() {
		Some(ratio * x_fit.abs().min(y_fit.abs()))
	} else {
		None
	}
}

/// The range of offsets at which the bounds are at least partly visible.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PanRange {
	pub x_off_min: f64,
	pub x_off_max: f64,
	pub y_off_min: f64,
	pub y_off_max: f64,
}

impl PanRange {
	pub fn acceptable(&self, x_off: f64, y_off: f64) -> bool {
		self.x_off_min <= x_off
			&& x_off <= self.x_off_max
			&& self.y_off_min <= y_off
			&& y_off <= self.y_off_max
	}

	/// The offsets that center the bounds.
	pub fn center(&self) -> (f64, f64) {
		(
			(self.x_off_min + self.x_off_max) / 2.0,
			(self.y_off_min + self.y_off_max) / 2.0,
		)
	}
}

pub fn pan_for(xb: &Bounds, yb: &Bounds, zoom: f64, width: f64, height: f64, x_min: f64) -> PanRange {
	PanRange {
		x_off_min: -xb.max * zoom + x_min,
		x_off_max: -xb.min * zoom + x_min + width,
		y_off_min: -yb.max * zoom,
		y_off_max: -yb.min * zoom + height,
	}
}

/// Pans and zooms the panel to fit its vertices, unless the inherited transform is close
/// enough. `tolerance` is the largest accepted ratio between the ideal and the current zoom.
pub fn init_view(
	vertices: &Vertices,
	offsetter: &mut Offsetter,
	height: f64,
	ratio: f64,
	tolerance: f64,
) {
	if vertices.vs.is_empty() {
		offsetter.redraw();
		return;
	}
	let xb = minmax(vertices.vs.iter().map(|v| v.x));
	let yb = minmax(vertices.vs.iter().map(|v| v.y));
	let width = vertices.half_column_width * 2.0;
	let zoom = zoom_for(&xb, &yb, width, height, ratio).unwrap_or(offsetter.zoom);
	let pan = pan_for(&xb, &yb, offsetter.zoom, width, height, vertices.x_min);
	let change = zoom / offsetter.zoom;
	if !offsetter.inherited
		|| change < 1.0 / tolerance
		|| change > tolerance
		|| !pan.acceptable(offsetter.x_off, offsetter.y_off)
	{
		offsetter.zoom = zoom;
		offsetter.thickness = 1000.0 / (vertices.vs.len() as f64).sqrt();
		let (x_off, y_off) = pan_for(&xb, &yb, zoom, width, height, vertices.x_min).center();
		offsetter.x_off = x_off;
		offsetter.y_off = y_off;
	}
	offsetter.redraw();
}

/// Drives the interactive layout of one sampled panel, one step per animation frame.
#[derive(Clone, Debug)]
pub struct LayoutStepper {
	engine: Engine,
	/// Within-panel edges as vertex index pairs.
	edges: Vec<(usize, usize)>,
	last_style: String,
	animating: bool,
}

impl LayoutStepper {
	/// Creates the stepper and runs the initial simulation.
	pub fn new(
		vertices: &mut Vertices,
		edges: Vec<(usize, usize)>,
		settings: Option<&AnimateSettings>,
	) -> Self {
		let opts = settings.map(LayoutOptions::for_settings).unwrap_or_default();
		let engine = Engine::new(opts);
		engine.init_for_seconds(&mut vertices.vs, &edges, INIT_SECONDS);
		Self {
			last_style: engine.opts.style_name.clone(),
			engine,
			edges,
			animating: false,
		}
	}

	pub fn engine(&self) -> &Engine {
		&self.engine
	}

	pub fn is_animating(&self) -> bool {
		self.animating
	}

	/// Requests interactive layout. Returns `true` if a frame has to be requested, `false` when
	/// one is already in flight.
	pub fn animate(&mut self) -> bool {
		!std::mem::replace(&mut self.animating, true)
	}

	pub fn stop(&mut self) {
		self.animating = false;
	}

	/// One animation frame. Returns whether another frame is wanted.
	///
	/// The options are re-read from `settings` every frame. A new style name re-seeds the
	/// vertices that are not explicitly positioned and refits the view, because the layout
	/// profiles do not converge sensibly from each other's resting states.
	pub fn step(
		&mut self,
		vertices: &mut Vertices,
		offsetter: &mut Offsetter,
		settings: Option<&AnimateSettings>,
		rng: &mut impl Rng,
		height: f64,
		ratio: f64,
	) -> bool {
		let Some(settings) = settings else {
			self.animating = false;
			return false;
		};
		self.engine.opts = LayoutOptions::for_settings(settings);
		if self.engine.opts.style_name != self.last_style {
			debug!(
				"layout style changed from {} to {}, re-seeding",
				self.last_style, self.engine.opts.style_name
			);
			self.last_style = self.engine.opts.style_name.clone();
			for v in vertices.vs.iter_mut().filter(|v| !v.positioned) {
				v.x = rng.gen_range(-0.5..0.5);
				v.y = rng.gen_range(-0.5..0.5);
				v.settle();
			}
			self.engine
				.init_for_seconds(&mut vertices.vs, &self.edges, INIT_SECONDS);
			init_view(vertices, offsetter, height, ratio, 1.0);
		}
		if self.animating && settings.enabled && self.engine.step(&mut vertices.vs, &self.edges) {
			offsetter.redraw();
			true
		} else {
			if self.animating {
				offsetter.redraw();
			}
			self.animating = false;
			false
		}
	}
}

#[cfg(test)]
mod tests {
	use rand::SeedableRng;
	use rand::rngs::SmallRng;

	use super::*;
	use crate::components::graph_view::entity::{Appearance, Vertex};
	use crate::components::graph_view::sampled::assign_components;
	use crate::components::graph_view::types::Mode;

	fn panel(points: &[(f64, f64)]) -> Vertices {
		let mut vs = Vertices::new(Mode::Sampled, 0);
		vs.vs = points
			.iter()
			.enumerate()
			.map(|(i, &(x, y))| Vertex::new(i.to_string(), x, y, Appearance::default()))
			.collect();
		vs.half_column_width = 200.0;
		vs
	}

	fn enabled(style: &str) -> AnimateSettings {
		AnimateSettings {
			enabled: true,
			style: style.into(),
			label_attraction: 0.0,
		}
	}

	#[test]
	fn single_vertex_keeps_inherited_zoom_and_centers() {
		let vs = panel(&[(0.3, -0.2)]);
		let mut off = Offsetter::new(0.0, 0.0, 250.0, 300.0, 0.0, 400.0, 0);
		init_view(&vs, &mut off, 300.0, 0.8, 10.0);
		assert_eq!(off.zoom, 250.0);
		assert_eq!(off.thickness, 1000.0);
		assert!((off.screen_x(0.3) - 200.0).abs() < 1e-9);
		assert!((off.screen_y(-0.2) - 150.0).abs() < 1e-9);
	}

	#[test]
	fn fit_uses_the_tighter_axis() {
		let xb = minmax([-1.0, 1.0]);
		let yb = minmax([-0.5, 0.5]);
		// x fits at 200, y at 300.
		assert_eq!(zoom_for(&xb, &yb, 400.0, 300.0, 0.8), Some(160.0));
	}

	#[test]
	fn inherited_transform_survives_small_changes() {
		let vs = panel(&[(-1.0, -1.0), (1.0, 1.0)]);
		let mut off = Offsetter::new(190.0, 140.0, 120.0, 42.0, 0.0, 400.0, 0).inherit();
		init_view(&vs, &mut off, 300.0, 0.8, 10.0);
		assert_eq!((off.x_off, off.y_off, off.zoom, off.thickness), (190.0, 140.0, 120.0, 42.0));
	}

	#[test]
	fn inherited_transform_is_replaced_when_far_off() {
		let vs = panel(&[(-1.0, -1.0), (1.0, 1.0)]);
		let mut off = Offsetter::new(190.0, 140.0, 5.0, 42.0, 0.0, 400.0, 0).inherit();
		init_view(&vs, &mut off, 300.0, 0.8, 10.0);
		assert_eq!(off.zoom, 120.0);
		assert_eq!((off.x_off, off.y_off), (200.0, 150.0));

		let mut lost = Offsetter::new(5000.0, 140.0, 120.0, 42.0, 0.0, 400.0, 0).inherit();
		init_view(&vs, &mut lost, 300.0, 0.8, 10.0);
		assert_eq!(lost.x_off, 200.0);
	}

	#[test]
	fn three_vertex_chain_lays_out() {
		let mut vs = panel(&[(-0.4, 0.2), (0.0, -0.3), (0.35, 0.1)]);
		let seeds: Vec<(f64, f64)> = vs.vs.iter().map(|v| (v.x, v.y)).collect();
		let edges = vec![(0, 1), (1, 2)];
		assign_components(&mut vs, &edges);
		LayoutStepper::new(&mut vs, edges, None);
		for (v, seed) in vs.vs.iter().zip(&seeds) {
			assert!(v.x.is_finite() && v.y.is_finite());
			assert_ne!((v.x, v.y), *seed);
		}
		let c = vs.vs[0].component;
		assert!(c.is_some());
		assert!(vs.vs.iter().all(|v| v.component == c));
	}

	#[test]
	fn animate_allows_one_frame_in_flight() {
		let mut vs = panel(&[(0.0, 0.0), (0.5, 0.0)]);
		let mut stepper = LayoutStepper::new(&mut vs, vec![(0, 1)], None);
		assert!(stepper.animate());
		assert!(!stepper.animate());
		stepper.stop();
		assert!(stepper.animate());
	}

	#[test]
	fn stepping_stops_without_settings_or_when_disabled() {
		let mut vs = panel(&[(0.0, 0.0), (0.5, 0.0)]);
		let mut off = Offsetter::new(0.0, 0.0, 1.0, 1.0, 0.0, 400.0, 0);
		let mut rng = SmallRng::seed_from_u64(3);
		let mut stepper = LayoutStepper::new(&mut vs, vec![(0, 1)], None);
		stepper.animate();
		assert!(!stepper.step(&mut vs, &mut off, None, &mut rng, 300.0, 0.8));
		assert!(!stepper.is_animating());
		stepper.animate();
		let disabled = AnimateSettings::default();
		assert!(!stepper.step(&mut vs, &mut off, Some(&disabled), &mut rng, 300.0, 0.8));
	}

	#[test]
	fn style_change_reseeds_unpositioned_vertices() {
		let mut vs = panel(&[(10.0, 10.0), (20.0, 20.0), (30.0, 30.0)]);
		vs.vs[2].positioned = true;
		let mut off = Offsetter::new(0.0, 0.0, 1.0, 1.0, 0.0, 400.0, 0);
		let mut rng = SmallRng::seed_from_u64(7);
		let mut stepper = LayoutStepper::new(&mut vs, vec![], Some(&enabled("expand")));
		let moved = (vs.vs[0].x, vs.vs[0].y);
		stepper.step(&mut vs, &mut off, Some(&enabled("neutral")), &mut rng, 300.0, 0.8);
		assert_ne!((vs.vs[0].x, vs.vs[0].y), moved);
		assert_eq!((vs.vs[2].x, vs.vs[2].y), (30.0, 30.0));
		assert_eq!(stepper.engine().opts.repulsion, 300.0);
		// The view is refit with tolerance 1.
		assert_eq!(off.thickness, 1000.0 / 3f64.sqrt());
	}
}

#[cfg(test)]
mod proptests {
	use proptest::prelude::*;

	use super::*;
	use crate::components::graph_view::entity::{Appearance, Vertex};
	use crate::components::graph_view::types::Mode;

	const WIDTH: f64 = 400.0;
	const HEIGHT: f64 = 300.0;

	fn panel(points: &[(i32, i32)]) -> Vertices {
		let mut vs = Vertices::new(Mode::Sampled, 0);
		vs.vs = points
			.iter()
			.enumerate()
			.map(|(i, &(x, y))| {
				Vertex::new(i.to_string(), f64::from(x) / 5.0, f64::from(y) / 5.0, Appearance::default())
			})
			.collect();
		vs.half_column_width = WIDTH / 2.0;
		vs
	}

	proptest! {
		#[test]
		fn fitted_view_contains_every_vertex(
			points in prop::collection::vec((-50i32..50, -50i32..50), 1..20),
		) {
			let vs = panel(&points);
			let mut off = Offsetter::new(0.0, 0.0, 1.0, 1.0, 0.0, WIDTH, 0);
			init_view(&vs, &mut off, HEIGHT, 0.8, 10.0);
			for v in &vs.vs {
				let (sx, sy) = (off.screen_x(v.x), off.screen_y(v.y));
				prop_assert!((-1e-6..=WIDTH + 1e-6).contains(&sx), "x {} outside", sx);
				prop_assert!((-1e-6..=HEIGHT + 1e-6).contains(&sy), "y {} outside", sy);
			}
		}

		#[test]
		fn fitted_view_fills_the_ratio_on_the_tighter_axis(
			points in prop::collection::vec((-50i32..50, -50i32..50), 2..20),
		) {
			let vs = panel(&points);
			let xb = minmax(vs.vs.iter().map(|v| v.x));
			let yb = minmax(vs.vs.iter().map(|v| v.y));
			prop_assume!(xb.span > 0.0 || yb.span > 0.0);
			let mut off = Offsetter::new(0.0, 0.0, 1.0, 1.0, 0.0, WIDTH, 0);
			init_view(&vs, &mut off, HEIGHT, 0.8, 10.0);
			let fill = (xb.span * off.zoom / WIDTH).max(yb.span * off.zoom / HEIGHT);
			prop_assert!((fill - 0.8).abs() < 1e-9);
		}
	}
}
