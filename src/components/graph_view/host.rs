//! Browser plumbing between a canvas and a [`GraphView`]: the animation frame loop, window-wide
//! capture listeners for gestures, and the image cache for map tiles and vertex images.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, Event, HtmlCanvasElement, HtmlImageElement, MouseEvent, TouchEvent,
	Window,
};

use super::interaction::{CaptureChange, Pointer};
use super::render;
use super::types::{Menu, Side, ViewData};
use super::view::{ErrorReporter, GraphView, ViewError};

/// Keeps one `requestAnimationFrame` callback in flight until dropped.
pub struct FrameLoop {
	window: Window,
	handle: Rc<Cell<Option<i32>>>,
	callback: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>,
}

impl FrameLoop {
	/// Calls `on_frame` with the frame timestamp in milliseconds, every frame.
	pub fn start(window: Window, mut on_frame: impl FnMut(f64) + 'static) -> Result<Self, JsValue> {
		let handle = Rc::new(Cell::new(None));
		let callback: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
		let (next_handle, next_callback, next_window) =
			(handle.clone(), callback.clone(), window.clone());
		*callback.borrow_mut() = Some(Closure::new(move |now: f64| {
			on_frame(now);
			if let Some(cb) = next_callback.borrow().as_ref() {
				match next_window.request_animation_frame(cb.as_ref().unchecked_ref()) {
					Ok(id) => next_handle.set(Some(id)),
					Err(e) => warn!("animation frame request failed: {e:?}"),
				}
			}
		}));
		if let Some(cb) = callback.borrow().as_ref() {
			handle.set(Some(window.request_animation_frame(cb.as_ref().unchecked_ref())?));
		}
		Ok(Self {
			window,
			handle,
			callback,
		})
	}
}

impl Drop for FrameLoop {
	fn drop(&mut self) {
		if let Some(id) = self.handle.take() {
			let _ = self.window.cancel_animation_frame(id);
		}
		// The closure holds a handle to itself.
		self.callback.borrow_mut().take();
	}
}

/// A listener on the window, removed when detached or dropped.
struct WindowListener {
	window: Window,
	kind: &'static str,
	callback: Closure<dyn FnMut(Event)>,
}

impl WindowListener {
	fn add(window: &Window, kind: &'static str, callback: Closure<dyn FnMut(Event)>) -> Self {
		if let Err(e) =
			window.add_event_listener_with_callback(kind, callback.as_ref().unchecked_ref())
		{
			warn!("could not listen to {kind}: {e:?}");
		}
		Self {
			window: window.clone(),
			kind,
			callback,
		}
	}

	fn detach(&self) {
		let _ = self
			.window
			.remove_event_listener_with_callback(self.kind, self.callback.as_ref().unchecked_ref());
	}
}

impl Drop for WindowListener {
	fn drop(&mut self) {
		self.detach();
	}
}

/// Images by URL. Entries not drawn during a frame are released at its end.
#[derive(Default)]
pub struct ImageCache {
	images: HashMap<String, HtmlImageElement>,
	used: HashSet<String>,
}

impl ImageCache {
	/// The image if it has loaded. Starts loading it otherwise. Failed loads stay empty and are
	/// not retried while the image is in use.
	pub fn get(&mut self, href: &str) -> Option<&HtmlImageElement> {
		self.used.insert(href.to_string());
		if !self.images.contains_key(href) {
			let image = HtmlImageElement::new()
				.map_err(|e| warn!("could not create image element: {e:?}"))
				.ok()?;
			image.set_src(href);
			self.images.insert(href.to_string(), image);
		}
		self.images
			.get(href)
			.filter(|image| image.complete() && image.natural_width() > 0)
	}

	/// Whether a requested image is still on its way.
	pub fn loading(&self) -> bool {
		self.images.values().any(|image| !image.complete())
	}

	pub fn begin_frame(&mut self) {
		self.used.clear();
	}

	pub fn end_frame(&mut self) {
		let used = &self.used;
		self.images.retain(|href, _| used.contains(href));
	}
}

/// Everything the canvas event handlers and the frame loop share.
pub struct HostState {
	pub view: GraphView,
	canvas: HtmlCanvasElement,
	ctx: CanvasRenderingContext2d,
	images: ImageCache,
	/// The data of the last update, replayed on resize.
	last: Option<ViewData>,
	capture: Vec<WindowListener>,
	/// Detached capture listeners. Dropped on the next frame, as one of them may be running.
	retired: Vec<WindowListener>,
	reporter: Rc<dyn ErrorReporter>,
	menu: RwSignal<Option<Menu>>,
	repaint: bool,
}

pub type Shared = Rc<RefCell<HostState>>;

impl HostState {
	pub fn new(
		view: GraphView,
		canvas: HtmlCanvasElement,
		ctx: CanvasRenderingContext2d,
		reporter: Rc<dyn ErrorReporter>,
		menu: RwSignal<Option<Menu>>,
	) -> Self {
		Self {
			view,
			canvas,
			ctx,
			images: ImageCache::default(),
			last: None,
			capture: Vec::new(),
			retired: Vec::new(),
			reporter,
			menu,
			repaint: true,
		}
	}

	/// One animation frame: steps the layouts, flushes redraws and repaints when needed.
	pub fn frame(&mut self, now: f64) {
		self.retired.clear();
		let changed = self.view.tick(now);
		if changed || self.repaint || self.images.loading() {
			self.repaint = false;
			self.images.begin_frame();
			render::paint(&self.ctx, &self.view, &mut self.images);
			self.images.end_frame();
		}
	}

	pub fn update(&mut self, data: &ViewData, sides: &[Side]) {
		self.last = Some(data.clone());
		self.end_capture();
		if let Err(e) = self.view.update(data, sides) {
			self.view.fail(e);
		}
		self.repaint = true;
	}

	pub fn loading(&mut self) {
		self.view.loading();
		self.repaint = true;
	}

	pub fn fail(&mut self, error: ViewError) {
		self.last = None;
		self.end_capture();
		self.view.fail(error);
		self.repaint = true;
	}

	pub fn resize(&mut self, width: f64, height: f64, sides: &[Side]) {
		self.canvas.set_width(width as u32);
		self.canvas.set_height(height as u32);
		self.view.resize(width, height);
		if let Some(data) = self.last.take() {
			self.update(&data, sides);
		}
		self.repaint = true;
	}

	/// Canvas coordinates of a client position.
	fn local(&self, client_x: f64, client_y: f64) -> (f64, f64) {
		let rect = self.canvas.get_bounding_client_rect();
		(client_x - rect.left(), client_y - rect.top())
	}

	fn mouse(&self, ev: &MouseEvent) -> Pointer {
		let (x, y) = self.local(ev.client_x() as f64, ev.client_y() as f64);
		Pointer {
			x,
			y,
			shift: ev.shift_key(),
		}
	}

	/// The first changed touch as a pointer.
	fn touch(&self, ev: &TouchEvent) -> Option<Pointer> {
		let t = ev.changed_touches().get(0)?;
		let (x, y) = self.local(t.client_x() as f64, t.client_y() as f64);
		Some(Pointer {
			x,
			y,
			shift: ev.shift_key(),
		})
	}

	fn end_capture(&mut self) {
		for listener in self.capture.drain(..) {
			listener.detach();
			self.retired.push(listener);
		}
	}

	/// Hands a menu opened by the last gesture to the caller.
	fn publish_menu(&mut self) -> Option<Menu> {
		self.repaint = true;
		self.view.take_menu()
	}
}

/// A mounted view: shared state, the frame loop and the resize listener. Dropping it stops
/// everything.
pub struct Host {
	pub shared: Shared,
	_frames: FrameLoop,
	_resize: Option<WindowListener>,
}

/// Inner size of the window, falling back to 800×600.
pub fn window_size(window: &Window) -> (f64, f64) {
	let dim = |v: Result<JsValue, JsValue>, default| v.ok().and_then(|v| v.as_f64()).unwrap_or(default);
	(dim(window.inner_width(), 800.0), dim(window.inner_height(), 600.0))
}

impl Host {
	/// Starts drawing `view` on `canvas`. With `fullscreen` the canvas follows the window size.
	pub fn mount(
		canvas: HtmlCanvasElement,
		view: GraphView,
		reporter: Rc<dyn ErrorReporter>,
		menu: RwSignal<Option<Menu>>,
		sides: RwSignal<Vec<Side>>,
		fullscreen: bool,
	) -> Result<Self, JsValue> {
		let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
		let ctx: CanvasRenderingContext2d = canvas
			.get_context("2d")?
			.ok_or_else(|| JsValue::from_str("no 2d context"))?
			.dyn_into()?;
		let shared: Shared = Rc::new(RefCell::new(HostState::new(view, canvas, ctx, reporter, menu)));
		let frame_state = shared.clone();
		let frames = FrameLoop::start(window.clone(), move |now| frame_state.borrow_mut().frame(now))?;
		let resize = fullscreen.then(|| {
			let (resize_state, resize_window) = (shared.clone(), window.clone());
			WindowListener::add(
				&window,
				"resize",
				Closure::new(move |_: Event| {
					let (w, h) = window_size(&resize_window);
					resize_state.borrow_mut().resize(w, h, &sides.get_untracked());
				}),
			)
		});
		debug!("graph view mounted");
		Ok(Self {
			shared,
			_frames: frames,
			_resize: resize,
		})
	}
}

impl Drop for Host {
	fn drop(&mut self) {
		// Capture listeners hold the shared state; release them outside of the borrow.
		let listeners = {
			let mut state = self.shared.borrow_mut();
			state.end_capture();
			std::mem::take(&mut state.retired)
		};
		drop(listeners);
		debug!("graph view unmounted");
	}
}

/// Applies a capture change reported by the view.
fn apply_capture(shared: &Shared, change: CaptureChange) {
	match change {
		CaptureChange::None => {}
		CaptureChange::Begin => install_capture(shared),
		CaptureChange::End => shared.borrow_mut().end_capture(),
	}
}

/// Follows the running gesture outside of the canvas until release.
fn install_capture(shared: &Shared) {
	let Some(window) = web_sys::window() else {
		return;
	};
	let listener = |kind: &'static str, handler: fn(&Shared, Event)| {
		let shared = shared.clone();
		WindowListener::add(
			&window,
			kind,
			Closure::new(move |ev: Event| handler(&shared, ev)),
		)
	};
	let listeners = vec![
		listener("mousemove", |s, ev| {
			if let Some(ev) = ev.dyn_ref::<MouseEvent>() {
				pointer_move(s, ev);
			}
		}),
		listener("mouseup", |s, _| pointer_up(s)),
		listener("touchmove", |s, ev| {
			if let Some(ev) = ev.dyn_ref::<TouchEvent>() {
				touch_move(s, ev);
			}
		}),
		listener("touchend", |s, _| pointer_up(s)),
		listener("touchcancel", |s, _| pointer_up(s)),
	];
	let mut state = shared.borrow_mut();
	state.end_capture();
	state.capture = listeners;
}

fn open_menu(shared: &Shared) {
	let (menu, signal) = {
		let mut state = shared.borrow_mut();
		(state.publish_menu(), state.menu)
	};
	if let Some(menu) = menu {
		signal.set(Some(menu));
	}
}

fn press(shared: &Shared, p: Pointer) {
	let (change, menu) = {
		let mut state = shared.borrow_mut();
		let reporter = state.reporter.clone();
		if state.view.report_error(&*reporter) {
			return;
		}
		state.repaint = true;
		(state.view.pointer_down(p), state.menu)
	};
	menu.set(None);
	apply_capture(shared, change);
}

pub fn pointer_down(shared: &Shared, ev: &MouseEvent) {
	if ev.button() != 0 {
		return;
	}
	let p = shared.borrow().mouse(ev);
	press(shared, p);
}

pub fn touch_start(shared: &Shared, ev: &TouchEvent) {
	let Some(p) = shared.borrow().touch(ev) else {
		return;
	};
	press(shared, p);
}

pub fn pointer_move(shared: &Shared, ev: &MouseEvent) {
	let mut state = shared.borrow_mut();
	let p = state.mouse(ev);
	state.view.pointer_move(p);
	state.repaint = true;
}

fn touch_move(shared: &Shared, ev: &TouchEvent) {
	let mut state = shared.borrow_mut();
	if let Some(p) = state.touch(ev) {
		state.view.pointer_move(p);
		state.repaint = true;
	}
}

/// Hover tracking over the canvas. Gestures are followed by the capture listeners.
pub fn hover(shared: &Shared, ev: &MouseEvent) {
	if shared.borrow().capture.is_empty() {
		pointer_move(shared, ev);
	}
}

pub fn pointer_up(shared: &Shared) {
	let change = shared.borrow_mut().view.pointer_up();
	apply_capture(shared, change);
	open_menu(shared);
}

pub fn pointer_leave(shared: &Shared) {
	let mut state = shared.borrow_mut();
	state.view.pointer_leave();
	state.repaint = true;
}

pub fn wheel(shared: &Shared, ev: &web_sys::WheelEvent, firefox: bool) {
	let mut state = shared.borrow_mut();
	let p = state.mouse(ev);
	let zoomed = state.view.wheel(super::interaction::Wheel {
		x: p.x,
		y: p.y,
		delta_x: ev.delta_x(),
		delta_y: ev.delta_y(),
		shift: p.shift,
		firefox,
	});
	if zoomed {
		ev.prevent_default();
	}
}

pub fn double_click(shared: &Shared, ev: &MouseEvent) {
	let mut state = shared.borrow_mut();
	let p = state.mouse(ev);
	state.view.double_click(p, false);
}

pub fn context_menu(shared: &Shared, ev: &MouseEvent) {
	ev.prevent_default();
	let mut state = shared.borrow_mut();
	let p = state.mouse(ev);
	if state.view.context_menu(p, js_sys::Date::now()) {
		debug!("right double click at {}, {}", p.x, p.y);
	}
}
