use std::rc::Rc;

use leptos::prelude::*;
use log::error;
use web_sys::{HtmlCanvasElement, MouseEvent, TouchEvent, WheelEvent};

use super::host::{self, Host, Shared, window_size};
use super::map::MapFilters;
use super::types::{Menu, MenuCommand, Side, ViewData};
use super::view::{ErrorReporter, GraphView, LogReporter, ViewConfig, ViewError};

/// What the caller currently has to show.
#[derive(Clone, Debug, PartialEq)]
pub enum ViewRequest {
	/// New data was requested and has not arrived yet.
	Loading,
	/// Data to draw with the current `sides`.
	Ready(ViewData),
	/// The backend could not produce the data.
	Failed { request: String, message: String },
}

fn apply(shared: &Shared, request: &ViewRequest, sides: &[Side]) {
	let mut state = shared.borrow_mut();
	match request {
		ViewRequest::Loading => state.loading(),
		ViewRequest::Ready(data) => state.update(data, sides),
		ViewRequest::Failed { request, message } => state.fail(ViewError::Request {
			request: request.clone(),
			message: message.clone(),
		}),
	}
}

/// Canvas showing the graph view of `request`.
///
/// `sides` holds one configuration per vertex set. Menus opened by clicks are written to `menu`;
/// the caller shows them and writes the picked action to `command`. Side mutations are applied
/// to `sides`, freezing is handled by the view itself.
#[component]
pub fn GraphViewCanvas(
	#[prop(into)] request: Signal<ViewRequest>,
	sides: RwSignal<Vec<Side>>,
	menu: RwSignal<Option<Menu>>,
	command: RwSignal<Option<MenuCommand>>,
	#[prop(into, default = Signal::stored(MapFilters::default()))] map_filters: Signal<MapFilters>,
	#[prop(default = ViewConfig::default())] config: ViewConfig,
	#[prop(optional)] reporter: Option<Rc<dyn ErrorReporter>>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let mounted: StoredValue<Option<Host>, LocalStorage> = StoredValue::new_local(None);
	let reporter: Rc<dyn ErrorReporter> = reporter.unwrap_or_else(|| Rc::new(LogReporter));
	let with_host = move |f: &dyn Fn(&Shared)| {
		mounted.with_value(|h| {
			if let Some(h) = h {
				f(&h.shared);
			}
		})
	};

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if mounted.with_value(Option::is_some) {
			return;
		}
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};
		let (w, h) = if fullscreen {
			window_size(&window)
		} else {
			let parent = canvas.parent_element();
			(
				width.unwrap_or_else(|| parent.as_ref().map_or(800.0, |p| p.client_width() as f64)),
				height.unwrap_or_else(|| parent.as_ref().map_or(600.0, |p| p.client_height() as f64)),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);
		let view = GraphView::new(config.clone(), w, h, js_sys::Date::now() as u64);
		match Host::mount(canvas, view, reporter.clone(), menu, sides, fullscreen) {
			Ok(h) => {
				apply(&h.shared, &request.get_untracked(), &sides.get_untracked());
				mounted.set_value(Some(h));
			}
			Err(e) => error!("could not start the graph view: {e:?}"),
		}
	});

	Effect::new(move |_| {
		let request = request.get();
		with_host(&|s| apply(s, &request, &sides.get_untracked()));
	});

	Effect::new(move |_| {
		let sides = sides.get();
		with_host(&|s| s.borrow_mut().view.sync_sides(&sides));
	});

	Effect::new(move |_| {
		let filters = map_filters.get();
		with_host(&|s| s.borrow_mut().view.set_map_filters(filters));
	});

	Effect::new(move |_| {
		let Some(picked) = command.get() else {
			return;
		};
		command.update_untracked(|c| *c = None);
		menu.set(None);
		let handled = mounted.with_value(|h| {
			h.as_ref()
				.is_some_and(|h| h.shared.borrow_mut().view.run_command(&picked))
		});
		if !handled {
			if let Some(i) = picked.side() {
				sides.update(|all| {
					if let Some(side) = all.get_mut(i) {
						picked.apply_to(side);
					}
				});
			}
		}
	});

	let firefox = web_sys::window()
		.and_then(|w| w.navigator().user_agent().ok())
		.is_some_and(|agent| agent.contains("Firefox"));

	view! {
		<canvas
			node_ref=canvas_ref
			class="graph-view-canvas"
			on:mousedown=move |ev: MouseEvent| with_host(&|s| host::pointer_down(s, &ev))
			on:mousemove=move |ev: MouseEvent| with_host(&|s| host::hover(s, &ev))
			on:mouseleave=move |_: MouseEvent| with_host(&host::pointer_leave)
			on:wheel=move |ev: WheelEvent| with_host(&|s| host::wheel(s, &ev, firefox))
			on:dblclick=move |ev: MouseEvent| with_host(&|s| host::double_click(s, &ev))
			on:contextmenu=move |ev: MouseEvent| with_host(&|s| host::context_menu(s, &ev))
			on:touchstart=move |ev: TouchEvent| {
				ev.prevent_default();
				with_host(&|s| host::touch_start(s, &ev));
			}
			style="display: block; cursor: grab; touch-action: none;"
		/>
	}
}
