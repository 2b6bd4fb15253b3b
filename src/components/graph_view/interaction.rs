//! Pointer, wheel and double-click handling.
//!
//! A press either grabs a vertex of a sampled panel or starts panning the panel under the
//! pointer. While a gesture runs the host listens on the whole window; [`CaptureChange`] tells
//! it when to install and remove those listeners.

use std::collections::BTreeMap;

use log::debug;

use super::offsetter::Offsetter;
use super::types::{
	AttrMeta, Menu, MenuAction, MenuCommand, MenuData, Mode, SideActions, VertexRef,
};
use super::view::GraphView;

/// Zoom step of a double click, in wheel units.
const DOUBLE_CLICK_SCROLL: f64 = 500.0;
/// Wheel deltas are tiny on Firefox.
const FIREFOX_WHEEL_BOOST: f64 = 20.0;

/// The gesture in progress.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Capture {
	#[default]
	Idle,
	/// Panning. `ev_to_off` is the offset from the pointer to the panel's pan. `pressed` is the
	/// bucketed cell under the initial press, opened as a menu if the pointer does not move.
	Pan {
		side: usize,
		ev_to_off: (f64, f64),
		pressed: Option<VertexRef>,
		moved: bool,
	},
	/// Dragging a vertex.
	Drag { vertex: VertexRef },
}

/// What the host has to do with its window-wide listeners.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureChange {
	None,
	Begin,
	End,
}

/// A pointer event in canvas coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Pointer {
	pub x: f64,
	pub y: f64,
	pub shift: bool,
}

impl Pointer {
	pub fn at(x: f64, y: f64) -> Self {
		Self { x, y, shift: false }
	}
}

/// A wheel event in canvas coordinates, with the browser's raw deltas.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Wheel {
	pub x: f64,
	pub y: f64,
	pub delta_x: f64,
	pub delta_y: f64,
	pub shift: bool,
	pub firefox: bool,
}

fn model(off: &Offsetter, p: Pointer) -> (f64, f64) {
	(off.model_x(p.x), off.model_y(p.y))
}

impl GraphView {
	pub fn capture(&self) -> Capture {
		self.capture
	}

	/// The panel whose band contains the screen x.
	pub fn side_at(&self, x: f64) -> Option<usize> {
		self.panels().find(|p| p.offsetter.contains_x(x)).map(|p| p.offsetter.side)
	}

	/// The top-most visible vertex under the point. Small vertices get a minimum hit radius.
	pub fn vertex_at(&self, x: f64, y: f64) -> Option<VertexRef> {
		let side = self.side_at(x)?;
		let panel = self.panel(side)?;
		let off = &panel.offsetter;
		let min = self.config.min_touch_radius;
		panel
			.vertices
			.vs
			.iter()
			.enumerate()
			.rev()
			.filter(|(_, v)| !v.hidden)
			.find(|(_, v)| {
				let r = off.thick(v.r).max(min);
				let (dx, dy) = (off.screen_x(v.x) - x, off.screen_y(v.y) - y);
				dx * dx + dy * dy <= r * r
			})
			.map(|(index, _)| VertexRef { side, index })
	}

	pub fn pointer_down(&mut self, p: Pointer) -> CaptureChange {
		if self.capture != Capture::Idle {
			// A second press without release, e.g. another finger.
			return CaptureChange::None;
		}
		let Some(side) = self.side_at(p.x) else {
			return CaptureChange::None;
		};
		let target = self.vertex_at(p.x, p.y);
		let sampled = self.panel(side).is_some_and(|p| p.vertices.mode == Mode::Sampled);
		match target {
			Some(vertex) if sampled => self.begin_drag(vertex, p),
			_ => {
				let Some(panel) = self.panel(side) else {
					return CaptureChange::None;
				};
				self.capture = Capture::Pan {
					side,
					ev_to_off: (panel.offsetter.x_off - p.x, panel.offsetter.y_off - p.y),
					pressed: target,
					moved: false,
				};
			}
		}
		CaptureChange::Begin
	}

	fn begin_drag(&mut self, vertex: VertexRef, p: Pointer) {
		let Some(panel) = self.panel_mut(vertex.side) else {
			return;
		};
		let start = model(&panel.offsetter, p);
		let Some(v) = panel.vertices.vs.get_mut(vertex.index) else {
			return;
		};
		v.drag_start = start;
		v.before_drag = (v.x, v.y);
		v.dragged = false;
		self.hold(vertex);
		self.capture = Capture::Drag { vertex };
	}

	/// Pointer motion anywhere. Drives the running gesture, or hover when idle.
	pub fn pointer_move(&mut self, p: Pointer) {
		match self.capture {
			Capture::Idle => self.hover_to(self.vertex_at(p.x, p.y)),
			Capture::Pan {
				side,
				ev_to_off,
				pressed,
				..
			} => {
				if let Some(panel) = self.panel_mut(side) {
					let (x, y) = (p.x + ev_to_off.0, p.y + ev_to_off.1);
					let moved = x != panel.offsetter.x_off || y != panel.offsetter.y_off;
					panel.offsetter.pan_to(x, y);
					if moved {
						self.capture = Capture::Pan {
							side,
							ev_to_off,
							pressed,
							moved: true,
						};
					}
				}
			}
			Capture::Drag { vertex } => self.drag_to(vertex, p),
		}
	}

	fn drag_to(&mut self, vertex: VertexRef, p: Pointer) {
		let Some(panel) = self.panel_mut(vertex.side) else {
			return;
		};
		let (ex, ey) = model(&panel.offsetter, p);
		let Some(v) = panel.vertices.vs.get_mut(vertex.index) else {
			return;
		};
		if v.positioned {
			return;
		}
		v.dragged = (ex, ey) != v.drag_start;
		let x = v.before_drag.0 + ex - v.drag_start.0;
		let y = v.before_drag.1 + ey - v.drag_start.1;
		v.force_ox = x;
		v.force_oy = y;
		self.move_vertex(vertex, x, y);
		self.animate(vertex.side);
	}

	fn hover_to(&mut self, target: Option<VertexRef>) {
		if self.hovered == target {
			return;
		}
		if let Some(old) = self.hovered.take() {
			self.hover_end(old);
		}
		if let Some(new) = target {
			self.hover_start(new);
			self.hovered = Some(new);
		}
	}

	/// Release of the pointer anywhere. Always ends the capture.
	pub fn pointer_up(&mut self) -> CaptureChange {
		match std::mem::take(&mut self.capture) {
			Capture::Idle => return CaptureChange::None,
			Capture::Pan {
				pressed, moved, ..
			} => {
				if let Some(cell) = pressed.filter(|_| !moved) {
					self.open_cell_menu(cell);
				}
			}
			Capture::Drag { vertex } => {
				let Some(v) = self.vertex(vertex) else {
					return CaptureChange::End;
				};
				if !v.held {
					debug!("duplicate release of {vertex:?}");
					return CaptureChange::End;
				}
				let dragged = v.dragged;
				self.release(vertex);
				if dragged {
					self.animate(vertex.side);
				} else {
					self.open_vertex_menu(vertex);
				}
			}
		}
		CaptureChange::End
	}

	/// The pointer left the canvas without a gesture.
	pub fn pointer_leave(&mut self) {
		if self.capture == Capture::Idle {
			self.hover_to(None);
		}
	}

	pub fn wheel(&mut self, w: Wheel) -> bool {
		let Some(side) = self.side_at(w.x) else {
			return false;
		};
		let boost = if w.firefox { FIREFOX_WHEEL_BOOST } else { 1.0 };
		let (dx, dy) = (w.delta_x * boost, w.delta_y * boost);
		let plain = if w.shift { 0.0 } else { dy };
		let shifted = dx + if w.shift { dy } else { 0.0 };
		if let Some(panel) = self.panel_mut(side) {
			panel.offsetter.zoom_at(w.x, w.y, plain, shifted);
		}
		true
	}

	/// Left double click zooms in, right zooms out. With shift only the thickness changes.
	pub fn double_click(&mut self, p: Pointer, right: bool) -> bool {
		let Some(side) = self.side_at(p.x) else {
			return false;
		};
		let scroll = if right { DOUBLE_CLICK_SCROLL } else { -DOUBLE_CLICK_SCROLL };
		let (zoom, thickness) = if p.shift { (0.0, 0.5 * scroll) } else { (scroll, 0.0) };
		if let Some(panel) = self.panel_mut(side) {
			panel.offsetter.zoom_at(p.x, p.y, zoom, thickness);
		}
		true
	}

	/// A context-menu event at time `now` (ms). Two within the double-click window count as a
	/// right double click. Returns whether one was detected.
	pub fn context_menu(&mut self, p: Pointer, now: f64) -> bool {
		if now - self.last_right_click < self.config.double_click_ms {
			self.last_right_click = f64::NEG_INFINITY;
			self.double_click(p, true);
			true
		} else {
			self.last_right_click = now;
			false
		}
	}

	fn activate_menu(&mut self, r: VertexRef, data: MenuData) {
		let Some(panel) = self.panel(r.side) else {
			return;
		};
		let Some(v) = panel.vertices.vs.get(r.index) else {
			return;
		};
		self.pending_menu = Some(Menu {
			x: panel.offsetter.screen_x(v.x),
			y: panel.offsetter.screen_y(v.y),
			enabled: true,
			data: Some(data),
		});
		self.dirty = true;
	}

	/// The menu of a sampled vertex, built against its panel's current configuration.
	pub fn vertex_menu(&self, r: VertexRef) -> Option<MenuData> {
		let panel = self.panel(r.side)?;
		let v = panel.vertices.vs.get(r.index)?;
		let side = &panel.side;
		let id = v.id.clone();
		let s = r.side;
		let action = |title: &str, command: MenuCommand| MenuAction {
			title: title.into(),
			command,
		};
		let mut actions = Vec::new();
		if side.has_center(&id) {
			actions.push(action(
				"Remove from centers",
				MenuCommand::RemoveCenter { side: s, id: id.clone() },
			));
		} else {
			actions.push(action(
				"Add to centers",
				MenuCommand::AddCenter { side: s, id: id.clone() },
			));
		}
		if !side.has_center(&id) || side.center_count() != 1 {
			actions.push(action(
				"Set as only center",
				MenuCommand::SetCenter { side: s, id: id.clone() },
			));
		}
		if side.has_parent() {
			actions.push(if side.is_parent_filtered_to_segment(&id) {
				action(
					"Stop filtering base project to this segment",
					MenuCommand::DeleteParentsSegmentFilter { side: s },
				)
			} else {
				action(
					"Filter base project to this segment",
					MenuCommand::FilterParentToSegment { side: s, id: id.clone() },
				)
			});
		}
		if side.has_segmentation() {
			actions.push(if side.is_segmentation_filtered_to_parent(&id) {
				action(
					"Stop filtering segmentation to this vertex",
					MenuCommand::DeleteSegmentationsParentFilter { side: s },
				)
			} else {
				action(
					"Filter segmentation to this vertex",
					MenuCommand::FilterSegmentationToParent { side: s, id: id.clone() },
				)
			});
		}
		actions.push(if v.is_frozen() {
			action("Unfreeze", MenuCommand::Unfreeze(r))
		} else {
			action("Freeze", MenuCommand::Freeze(r))
		});
		let attributes: BTreeMap<String, String> = side
			.vertex_attrs
			.iter()
			.map(|(_, attr)| {
				let value = v.attrs.get(&attr.id).and_then(|d| d.string.clone());
				(attr.title.clone(), value.unwrap_or_default())
			})
			.collect();
		Some(MenuData {
			header: Some(format!("Vertex {id}")),
			kind: Some("vertex".into()),
			id: Some(id),
			actions,
			attributes: Some(attributes),
		})
	}

	/// The filter actions of a bucketed cell, `None` when there are none.
	pub fn cell_menu(&self, r: VertexRef) -> Option<MenuData> {
		let panel = self.panel(r.side)?;
		let v = panel.vertices.vs.get(r.index)?;
		let axis = |attr: &Option<AttrMeta>, filter: &Option<String>| {
			Some((attr.as_ref()?.title.clone(), filter.clone()?))
		};
		let x = axis(&panel.vertices.x_attribute, &v.x_filter);
		let y = axis(&panel.vertices.y_attribute, &v.y_filter);
		let action = |title: String, filters: Vec<(String, String)>| MenuAction {
			title,
			command: MenuCommand::SetVertexFilters {
				side: r.side,
				filters,
			},
		};
		let mut actions: Vec<MenuAction> = [&x, &y]
			.into_iter()
			.flatten()
			.map(|f| action(format!("Add filter for {}", f.0), vec![f.clone()]))
			.collect();
		if let (Some(xf), Some(yf)) = (x, y) {
			actions.push(action(
				format!("Add filter for {} & {}", xf.0, yf.0),
				vec![xf, yf],
			));
		}
		if actions.is_empty() {
			return None;
		}
		Some(MenuData {
			actions,
			..Default::default()
		})
	}

	fn open_vertex_menu(&mut self, r: VertexRef) {
		if let Some(data) = self.vertex_menu(r) {
			self.activate_menu(r, data);
		}
	}

	fn open_cell_menu(&mut self, r: VertexRef) {
		if let Some(data) = self.cell_menu(r) {
			self.activate_menu(r, data);
		}
	}
}
