//! Geographic underlay: Mercator projection and static map tiles that follow the panel's
//! transform.

use std::f64::consts::PI;

use log::debug;
use serde::{Deserialize, Serialize};

use super::offsetter::Offsetter;

/// Static map service settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MapConfig {
	/// Size of the Earth in model units. Only needs to keep numbers in a sane range.
	pub globe_size: f64,
	/// Scale factor matching the tile service's projection.
	pub gm_mult: f64,
	/// Quiet time after the last pan or zoom before a new tile is requested.
	pub navigation_delay_ms: i32,
	pub endpoint: String,
	pub key: Option<String>,
	pub language: String,
	pub tile_pixels: u32,
	pub tile_scale: u32,
}

impl Default for MapConfig {
	fn default() -> Self {
		Self {
			globe_size: 500.0,
			gm_mult: 0.403,
			navigation_delay_ms: 100,
			endpoint: "https://maps.googleapis.com/maps/api/staticmap?".into(),
			key: None,
			language: "en".into(),
			tile_pixels: 640,
			tile_scale: 2,
		}
	}
}

/// Image adjustments requested by the user.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapFilters {
	/// Exponent of the gamma: `10^(gamma / 100)`.
	pub gamma: f64,
	pub saturation: f64,
	pub brightness: f64,
}

impl MapFilters {
	pub fn style(&self) -> String {
		format!(
			"feature:all|gamma:{}|saturation:{}|lightness:{}",
			10f64.powf(self.gamma / 100.0),
			self.saturation,
			self.brightness
		)
	}
}

/// Web Mercator between degrees and model coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
	pub globe_size: f64,
}

impl Projection {
	pub fn lon2x(&self, lon: f64) -> f64 {
		self.globe_size * lon / 360.0
	}

	pub fn lat2y(&self, lat: f64) -> f64 {
		let rad = lat * PI / 180.0;
		-self.globe_size * (rad.tan() + 1.0 / rad.cos()).ln() / PI / 2.0
	}

	pub fn x2lon(&self, x: f64) -> f64 {
		x * 360.0 / self.globe_size
	}

	pub fn y2lat(&self, y: f64) -> f64 {
		-(y * PI * 2.0 / self.globe_size).sinh().atan() * 180.0 / PI
	}
}

/// A requested map image, square, in model coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct Tile {
	pub href: String,
	pub x: f64,
	pub y: f64,
	pub size: f64,
}

impl Tile {
	/// Screen rectangle `(x, y, width, height)` under the given transform.
	pub fn screen_rect(&self, offsetter: &Offsetter) -> (f64, f64, f64, f64) {
		let size = offsetter.zoom * self.size;
		(offsetter.screen_x(self.x), offsetter.screen_y(self.y), size, size)
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct MapOverlay {
	pub config: MapConfig,
	pub projection: Projection,
	settled: Option<(f64, f64, f64)>,
	/// Frame time at which the pending refresh fires.
	refresh_at: Option<f64>,
	tiles: Vec<Tile>,
}

impl MapOverlay {
	pub fn new(config: MapConfig) -> Self {
		Self {
			projection: Projection {
				globe_size: config.globe_size,
			},
			config,
			settled: None,
			refresh_at: None,
			tiles: Vec::new(),
		}
	}

	/// The most recent tiles, oldest first.
	pub fn tiles(&self) -> &[Tile] {
		&self.tiles
	}

	/// Called on every redraw of the panel. Returns `true` when zoom or pan moved since the last
	/// call, meaning the refresh timer should be restarted.
	pub fn redraw(&mut self, offsetter: &Offsetter) -> bool {
		let now = (offsetter.zoom, offsetter.x_off, offsetter.y_off);
		if self.settled == Some(now) {
			return false;
		}
		self.settled = Some(now);
		true
	}

	/// Restarts the quiet period: the refresh fires `navigation_delay_ms` after `now`.
	pub fn schedule_refresh(&mut self, now: f64) {
		self.refresh_at = Some(now + f64::from(self.config.navigation_delay_ms));
	}

	/// Requests a refresh on the next frame, e.g. after the filters changed.
	pub fn refresh_now(&mut self) {
		self.refresh_at = Some(f64::NEG_INFINITY);
	}

	/// Consumes the pending refresh if its time has come.
	pub fn refresh_due(&mut self, now: f64) -> bool {
		match self.refresh_at {
			Some(at) if at <= now => {
				self.refresh_at = None;
				true
			}
			_ => false,
		}
	}

	/// The tile covering the visible part of a panel of the given size.
	pub fn tile_for(
		&self,
		offsetter: &Offsetter,
		width: f64,
		height: f64,
		x_min: f64,
		filters: &MapFilters,
	) -> Tile {
		let c = &self.config;
		let x = (width / 2.0 - offsetter.x_off + x_min) / offsetter.zoom;
		let y = (height / 2.0 - offsetter.y_off) / offsetter.zoom;
		let level = (c.globe_size * offsetter.zoom / width.max(height) / c.gm_mult).log2();
		let level = if level.is_finite() { level.floor().max(0.0) } else { 0.0 };
		let (lat, lon) = (self.projection.y2lat(y), self.projection.x2lon(x));
		let mut href = format!("{}center={lat},{lon}&zoom={level}", c.endpoint);
		if let Some(key) = &c.key {
			href.push_str(&format!("&key={key}"));
		}
		href.push_str(&format!(
			"&language={}&size={px}x{px}&scale={}&style={}",
			c.language,
			c.tile_scale,
			filters.style(),
			px = c.tile_pixels
		));
		let size = c.globe_size * 2f64.powf(-level) / c.gm_mult;
		Tile {
			href,
			x: x - size / 2.0,
			y: y - size / 2.0,
			size,
		}
	}

	/// Adds a tile, dropping all but the two most recent.
	pub fn push(&mut self, tile: Tile) {
		debug!("map tile requested: {}", tile.href);
		self.tiles.push(tile);
		let excess = self.tiles.len().saturating_sub(2);
		self.tiles.drain(..excess);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn projection() -> Projection {
		Projection { globe_size: 500.0 }
	}

	#[test]
	fn projection_round_trips() {
		let p = projection();
		for i in -100..=100 {
			let v = i as f64 * 2.4;
			assert!((p.lon2x(p.x2lon(v)) - v).abs() < 1e-9);
			assert!((p.lat2y(p.y2lat(v)) - v).abs() < 1e-9, "v = {v}");
		}
	}

	#[test]
	fn equator_and_meridian_map_to_origin() {
		let p = projection();
		assert_eq!(p.lon2x(0.0), 0.0);
		assert!(p.lat2y(0.0).abs() < 1e-12);
		assert_eq!(p.lon2x(180.0), 250.0);
		assert!(p.lat2y(45.0) < 0.0);
	}

	#[test]
	fn redraw_reports_only_changes() {
		let mut map = MapOverlay::new(MapConfig::default());
		let mut o = Offsetter::new(0.0, 0.0, 1.0, 1.0, 0.0, 100.0, 0);
		assert!(map.redraw(&o));
		assert!(!map.redraw(&o));
		o.pan_to(5.0, 0.0);
		assert!(map.redraw(&o));
	}

	#[test]
	fn refresh_waits_for_the_navigation_delay() {
		let mut map = MapOverlay::new(MapConfig::default());
		assert!(!map.refresh_due(0.0));
		map.schedule_refresh(1000.0);
		map.schedule_refresh(1050.0);
		assert!(!map.refresh_due(1100.0));
		assert!(map.refresh_due(1150.0));
		assert!(!map.refresh_due(2000.0));
		map.refresh_now();
		assert!(map.refresh_due(0.0));
	}

	#[test]
	fn keeps_two_most_recent_tiles() {
		let mut map = MapOverlay::new(MapConfig::default());
		let o = Offsetter::new(50.0, 50.0, 100.0, 1.0, 0.0, 100.0, 0);
		for _ in 0..3 {
			let tile = map.tile_for(&o, 100.0, 100.0, 0.0, &MapFilters::default());
			map.push(tile);
		}
		assert_eq!(map.tiles().len(), 2);
	}

	#[test]
	fn tile_is_centered_on_the_view() {
		let map = MapOverlay::new(MapConfig::default());
		let o = Offsetter::new(50.0, 50.0, 100.0, 1.0, 0.0, 100.0, 0);
		let tile = map.tile_for(&o, 100.0, 100.0, 0.0, &MapFilters::default());
		assert!(tile.href.contains("&zoom=10&"));
		assert!(tile.href.contains("size=640x640&scale=2"));
		assert!(tile.href.contains("style=feature:all|gamma:1|saturation:0|lightness:0"));
		assert!((tile.x + tile.size / 2.0).abs() < 1e-12);
	}
}
