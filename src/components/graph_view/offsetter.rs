//! Per-panel model → screen transform.

/// Pan, zoom and thickness of one panel.
///
/// `screen = model * zoom + offset`. Thickness scales radii and stroke widths independently of
/// the position zoom.
#[derive(Clone, Debug, PartialEq)]
pub struct Offsetter {
	/// Screen position of the model origin.
	pub x_off: f64,
	pub y_off: f64,
	/// Screen pixels per model unit.
	pub zoom: f64,
	/// Screen pixels per model unit of radius or width.
	pub thickness: f64,
	/// Screen band `[x_min, x_max)` owned by the panel.
	pub x_min: f64,
	pub x_max: f64,
	pub side: usize,
	/// Copied from the previous panel rather than fitted.
	pub inherited: bool,
	pending: bool,
}

impl Offsetter {
	pub fn new(
		x_off: f64,
		y_off: f64,
		zoom: f64,
		thickness: f64,
		x_min: f64,
		x_max: f64,
		side: usize,
	) -> Self {
		Self {
			x_off,
			y_off,
			zoom,
			thickness,
			x_min,
			x_max,
			side,
			inherited: false,
			pending: false,
		}
	}

	pub fn pan_to(&mut self, x: f64, y: f64) {
		self.x_off = x;
		self.y_off = y;
		self.redraw();
	}

	/// Requests a batched redraw. Returns `true` if this call scheduled it, `false` if one was
	/// already pending.
	pub fn redraw(&mut self) -> bool {
		!std::mem::replace(&mut self.pending, true)
	}

	/// Clears the pending flag. Returns whether a redraw was pending.
	pub fn take_pending(&mut self) -> bool {
		std::mem::take(&mut self.pending)
	}

	/// A fresh transform with the same numbers and nothing pending.
	pub fn inherit(&self) -> Self {
		Self {
			inherited: true,
			..Self::new(
				self.x_off,
				self.y_off,
				self.zoom,
				self.thickness,
				self.x_min,
				self.x_max,
				self.side,
			)
		}
	}

	pub fn screen_x(&self, x: f64) -> f64 {
		x * self.zoom + self.x_off
	}

	pub fn screen_y(&self, y: f64) -> f64 {
		y * self.zoom + self.y_off
	}

	pub fn model_x(&self, sx: f64) -> f64 {
		(sx - self.x_off) / self.zoom
	}

	pub fn model_y(&self, sy: f64) -> f64 {
		(sy - self.y_off) / self.zoom
	}

	/// Screen radius or width of a model-space size.
	pub fn thick(&self, size: f64) -> f64 {
		size * self.thickness
	}

	pub fn contains_x(&self, sx: f64) -> bool {
		self.x_min <= sx && sx < self.x_max
	}

	/// Zooms around the screen point `(px, py)`, which stays over the same model point.
	///
	/// Deltas follow wheel conventions: positive zooms out. Thickness follows the square root of
	/// the zoom change, plus its own delta.
	pub fn zoom_at(&mut self, px: f64, py: f64, delta_zoom: f64, delta_thickness: f64) {
		let mut delta = -0.001 * delta_zoom;
		let (mx, my) = (self.model_x(px), self.model_y(py));
		self.zoom *= delta.exp();
		self.x_off = px - mx * self.zoom;
		self.y_off = py - my * self.zoom;
		delta += -0.005 * delta_thickness;
		self.thickness *= (0.5 * delta).exp();
		self.redraw();
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn offsetter() -> Offsetter {
		Offsetter::new(100.0, 50.0, 2.0, 300.0, 0.0, 400.0, 0)
	}

	#[test]
	fn screen_is_affine_in_model() {
		let o = offsetter();
		assert_eq!(o.screen_x(3.0), 106.0);
		assert_eq!(o.screen_y(-1.0), 48.0);
		assert_eq!(o.model_x(o.screen_x(0.25)), 0.25);
	}

	#[test]
	fn pan_and_zoom_recoverable_from_two_points() {
		let o = Offsetter::new(-12.5, 7.0, 3.5, 1.0, 0.0, 1.0, 0);
		let (m1, m2) = (1.0, 5.0);
		let (s1, s2) = (o.screen_x(m1), o.screen_x(m2));
		let zoom = (s2 - s1) / (m2 - m1);
		assert!((zoom - 3.5).abs() < 1e-12);
		assert!((s1 - m1 * zoom - -12.5).abs() < 1e-12);
	}

	#[test]
	fn redraw_is_coalesced() {
		let mut o = offsetter();
		assert!(o.redraw());
		assert!(!o.redraw());
		o.pan_to(1.0, 2.0);
		assert!(o.take_pending());
		assert!(!o.take_pending());
		assert!(o.redraw());
	}

	#[test]
	fn inherit_copies_numbers_only() {
		let mut o = offsetter();
		o.redraw();
		let mut child = o.inherit();
		assert!(child.inherited);
		assert!(!child.take_pending());
		assert_eq!((child.x_off, child.zoom, child.thickness), (100.0, 2.0, 300.0));
	}

	#[test]
	fn zoom_keeps_cursor_point_fixed() {
		let mut o = offsetter();
		let (mx, my) = (o.model_x(180.0), o.model_y(90.0));
		o.zoom_at(180.0, 90.0, -500.0, 0.0);
		assert!((o.zoom - 2.0 * 0.5f64.exp()).abs() < 1e-12);
		assert!((o.screen_x(mx) - 180.0).abs() < 1e-9);
		assert!((o.screen_y(my) - 90.0).abs() < 1e-9);
		assert!((o.thickness - 300.0 * 0.25f64.exp()).abs() < 1e-9);
	}

	#[test]
	fn band_is_half_open() {
		let o = offsetter();
		assert!(o.contains_x(0.0));
		assert!(!o.contains_x(400.0));
	}
}
