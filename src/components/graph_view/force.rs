//! Force-directed layout engine for sampled panels.
//!
//! Verlet integration over model coordinates: the velocity of a vertex is its position minus
//! its previous position (`force_ox`, `force_oy`), damped by `drag`. Forces are applied as
//! displacements per step.

use std::collections::HashMap;
use std::f64::consts::TAU;

use super::entity::Vertex;
use super::types::AnimateSettings;

/// Steps per simulated second.
const STEPS_PER_SECOND: f64 = 60.0;
/// Largest displacement per step, relative to the spread of the layout.
const MAX_STEP: f64 = 0.1;
/// Mean displacement per step, relative to the spread, below which the layout is at rest.
const REST: f64 = 0.001;

/// How vertex degree affects gravity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Style {
	Neutral,
	/// High-degree vertices sink to the middle.
	Centralize,
	/// High-degree vertices drift to the periphery.
	Decentralize,
}

impl Style {
	pub fn from_name(name: &str) -> Self {
		if name.contains("decentral") {
			Style::Decentralize
		} else if name.contains("central") {
			Style::Centralize
		} else {
			Style::Neutral
		}
	}

	fn gravity_weight(self, degree: usize) -> f64 {
		let d = degree as f64 + 1.0;
		match self {
			Style::Neutral => 1.0,
			Style::Centralize => d,
			Style::Decentralize => 1.0 / d,
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct LayoutOptions {
	pub attraction: f64,
	pub repulsion: f64,
	pub gravity: f64,
	pub drag: f64,
	pub label_attraction: f64,
	/// Multiplier of the repulsion between vertices of different components.
	pub component_repulsion_fraction: f64,
	pub repulsion_power: f64,
	/// The style name as configured; a change triggers re-seeding.
	pub style_name: String,
	pub style: Style,
}

impl LayoutOptions {
	/// Styles using the older, gravity-based profile.
	pub const LEGACY_STYLES: [&'static str; 3] = ["neutral", "centralize", "decentralize"];

	pub fn for_settings(settings: &AnimateSettings) -> Self {
		let mut opts = Self {
			attraction: 0.1,
			repulsion: 1.0,
			gravity: 0.0,
			drag: 0.2,
			label_attraction: settings.label_attraction,
			component_repulsion_fraction: 0.02,
			repulsion_power: 3.0,
			style_name: settings.style.clone(),
			style: Style::from_name(&settings.style),
		};
		if Self::LEGACY_STYLES.contains(&settings.style.as_str()) {
			opts.attraction = 0.01;
			opts.repulsion = 300.0;
			opts.gravity = 0.05;
			opts.repulsion_power = 2.0;
			opts.component_repulsion_fraction = 1.0;
		}
		opts
	}
}

impl Default for LayoutOptions {
	fn default() -> Self {
		Self::for_settings(&AnimateSettings::default())
	}
}

/// Direction used to separate two vertices sitting on the same point.
fn separation(i: usize, j: usize) -> (f64, f64) {
	let angle = ((i as f64) * 0.618_034 + (j as f64) * 0.414_214) * TAU;
	(angle.cos(), angle.sin())
}

/// Root mean square distance from the centroid, never zero.
fn spread(vs: &[Vertex]) -> f64 {
	let n = vs.len().max(1) as f64;
	let cx = vs.iter().map(|v| v.x).sum::<f64>() / n;
	let cy = vs.iter().map(|v| v.y).sum::<f64>() / n;
	let sq = vs
		.iter()
		.map(|v| (v.x - cx).powi(2) + (v.y - cy).powi(2))
		.sum::<f64>()
		/ n;
	sq.sqrt().max(1e-3)
}

#[derive(Clone, Debug, PartialEq)]
pub struct Engine {
	pub opts: LayoutOptions,
}

impl Engine {
	pub fn new(opts: LayoutOptions) -> Self {
		Self { opts }
	}

	/// Runs the simulation for up to `seconds` worth of steps, or until it comes to rest, then
	/// clears the velocities.
	pub fn init_for_seconds(&self, vs: &mut [Vertex], edges: &[(usize, usize)], seconds: f64) {
		let steps = (seconds * STEPS_PER_SECOND).round() as usize;
		for _ in 0..steps {
			if !self.step(vs, edges) {
				break;
			}
		}
		for v in vs.iter_mut() {
			v.settle();
		}
	}

	/// Advances the layout by one tick. Returns whether the motion was still significant.
	///
	/// Vertices that are frozen, held or positioned stay in place but still push and pull the
	/// others.
	pub fn step(&self, vs: &mut [Vertex], edges: &[(usize, usize)]) -> bool {
		let n = vs.len();
		if n == 0 {
			return false;
		}
		let o = &self.opts;
		let mut fx = vec![0.0; n];
		let mut fy = vec![0.0; n];

		let per_vertex = o.repulsion / n as f64;
		for i in 0..n {
			for j in (i + 1)..n {
				let (mut dx, mut dy) = (vs[i].x - vs[j].x, vs[i].y - vs[j].y);
				let mut d = (dx * dx + dy * dy).sqrt();
				if d < 1e-9 {
					(dx, dy) = separation(i, j);
					d = 1e-3;
				} else {
					dx /= d;
					dy /= d;
				}
				let mut f = per_vertex / d.powf(o.repulsion_power);
				if vs[i].component != vs[j].component {
					f *= o.component_repulsion_fraction;
				}
				fx[i] += f * dx;
				fy[i] += f * dy;
				fx[j] -= f * dx;
				fy[j] -= f * dy;
			}
		}

		for &(a, b) in edges {
			if a == b || a >= n || b >= n {
				continue;
			}
			let (dx, dy) = (vs[b].x - vs[a].x, vs[b].y - vs[a].y);
			fx[a] += o.attraction * dx;
			fy[a] += o.attraction * dy;
			fx[b] -= o.attraction * dx;
			fy[b] -= o.attraction * dy;
		}

		if o.gravity != 0.0 {
			for (i, v) in vs.iter().enumerate() {
				let g = o.gravity * o.style.gravity_weight(v.degree);
				fx[i] -= g * v.x;
				fy[i] -= g * v.y;
			}
		}

		if o.label_attraction != 0.0 {
			let mut centroids: HashMap<&str, (f64, f64, f64)> = HashMap::new();
			for v in vs.iter() {
				if let Some(label) = v.label.as_deref() {
					let c = centroids.entry(label).or_default();
					c.0 += v.x;
					c.1 += v.y;
					c.2 += 1.0;
				}
			}
			for (i, v) in vs.iter().enumerate() {
				let Some(&(sx, sy, count)) = v.label.as_deref().and_then(|l| centroids.get(l))
				else {
					continue;
				};
				fx[i] += o.label_attraction * (sx / count - v.x);
				fy[i] += o.label_attraction * (sy / count - v.y);
			}
		}

		let cap = MAX_STEP * spread(vs);
		let mut motion = 0.0;
		for (i, v) in vs.iter_mut().enumerate() {
			if !v.is_movable() {
				v.settle();
				continue;
			}
			let mut mx = (v.x - v.force_ox) * (1.0 - o.drag) + fx[i];
			let mut my = (v.y - v.force_oy) * (1.0 - o.drag) + fy[i];
			let len = (mx * mx + my * my).sqrt();
			if !len.is_finite() {
				continue;
			}
			if len > cap {
				mx *= cap / len;
				my *= cap / len;
			}
			v.force_ox = v.x;
			v.force_oy = v.y;
			v.x += mx;
			v.y += my;
			motion += len.min(cap);
		}
		motion / n as f64 > REST * cap / MAX_STEP
	}
}
