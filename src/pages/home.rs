use std::collections::HashMap;

use leptos::prelude::*;

use crate::components::graph_view::{
	AnimateSettings, AttrMeta, BucketRecord, BucketedSet, DynamicValue, EdgeBundle, EdgeRecord,
	GraphViewCanvas, LabelType, Menu, MenuCommand, SampledSet, Side, VertexBindings, VertexRecord,
	VertexSet, ViewData, ViewRequest,
};

const GROUPS: [&str; 4] = ["alpha", "beta", "gamma", "delta"];

/// Simple pseudo-random number generator (deterministic for consistency).
fn rand_simple(seed: usize) -> f64 {
	let x = ((seed + 1) * 9301 + 49297) % 233280;
	(x as f64) / 233280.0
}

fn string_value(s: impl Into<String>) -> DynamicValue {
	DynamicValue {
		defined: true,
		string: Some(s.into()),
		..Default::default()
	}
}

fn double_value(d: f64) -> DynamicValue {
	DynamicValue {
		defined: true,
		double: Some(d),
		string: Some(d.to_string()),
		..Default::default()
	}
}

fn meta(id: &str, type_name: &str) -> AttrMeta {
	AttrMeta {
		id: id.into(),
		title: id.into(),
		type_name: type_name.into(),
	}
}

/// A random tree of `n` vertices next to a 4×3 grid of bucket counts.
fn generate_sample_data(n: usize) -> ViewData {
	let vertices: Vec<VertexRecord> = (0..n)
		.map(|i| VertexRecord {
			id: i.to_string(),
			attrs: HashMap::from([
				("name".to_string(), string_value(format!("Vertex {i}"))),
				("group".to_string(), string_value(GROUPS[i % GROUPS.len()])),
				("degree".to_string(), double_value(1.0 + rand_simple(i) * 9.0)),
			]),
		})
		.collect();
	let edges: Vec<EdgeRecord> = (1..n)
		.map(|i| EdgeRecord {
			a: i,
			b: (rand_simple(i) * i as f64) as usize,
			size: 1.0,
			..Default::default()
		})
		.collect();
	let cells: Vec<BucketRecord> = (0..4)
		.flat_map(|x| (0..3).map(move |y| (x, y)))
		.map(|(x, y)| BucketRecord {
			x,
			y,
			size: (rand_simple(x * 3 + y) * 50.0).round(),
		})
		.collect();
	ViewData {
		vertex_sets: vec![
			VertexSet::Sampled(SampledSet { vertices }),
			VertexSet::Bucketed(BucketedSet {
				vertices: cells,
				x_labels: ["0", "25", "50", "75", "100"].map(String::from).to_vec(),
				y_labels: GROUPS[..3].iter().map(|g| g.to_string()).collect(),
				x_label_type: LabelType::Between,
				y_label_type: LabelType::Center,
				x_filters: ["[0,25)", "[25,50)", "[50,75)", "[75,100]"].map(String::from).to_vec(),
				y_filters: GROUPS[..3].iter().map(|g| g.to_string()).collect(),
			}),
		],
		edge_bundles: vec![EdgeBundle {
			src_idx: 0,
			dst_idx: 0,
			edges,
			layout_3d: None,
		}],
	}
}

fn sample_sides() -> Vec<Side> {
	let sampled = Side {
		vertex_set_id: "sample".into(),
		vertex_attrs: VertexBindings {
			label: Some(meta("name", "String")),
			color: Some(meta("group", "String")),
			size: Some(meta("degree", "Double")),
			..Default::default()
		},
		animate: Some(AnimateSettings {
			enabled: true,
			..Default::default()
		}),
		..Default::default()
	};
	let bucketed = Side {
		vertex_set_id: "buckets".into(),
		x_attribute: Some(meta("age", "Double")),
		y_attribute: Some(meta("group", "String")),
		..Default::default()
	};
	vec![sampled, bucketed]
}

/// The context menu opened by a click on a vertex or a cell.
#[component]
fn GraphMenu(menu: RwSignal<Option<Menu>>, command: RwSignal<Option<MenuCommand>>) -> impl IntoView {
	move || {
		let menu_now = menu.get().filter(|m| m.enabled)?;
		let data = menu_now.data?;
		let attributes = data.attributes.unwrap_or_default();
		Some(view! {
			<div
				class="graph-menu"
				style=format!("position: absolute; left: {}px; top: {}px;", menu_now.x, menu_now.y)
			>
				{data.header.map(|h| view! { <h3>{h}</h3> })}
				<ul class="graph-menu-attributes">
					{attributes
						.into_iter()
						.map(|(title, value)| view! { <li>{title}": "{value}</li> })
						.collect_view()}
				</ul>
				{data
					.actions
					.into_iter()
					.map(|action| {
						let picked = action.command.clone();
						view! {
							<button on:click=move |_| command.set(Some(picked.clone()))>
								{action.title}
							</button>
						}
					})
					.collect_view()}
				<button on:click=move |_| menu.set(None)>"Close"</button>
			</div>
		})
	}
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let request = Signal::derive(move || ViewRequest::Ready(generate_sample_data(100)));
	let sides = RwSignal::new(sample_sides());
	let menu = RwSignal::new(None::<Menu>);
	let command = RwSignal::new(None::<MenuCommand>);

	let animating = move || {
		sides.with(|s| s.first().and_then(|s| s.animate.as_ref()).is_some_and(|a| a.enabled))
	};
	let toggle_animation = move |_| {
		sides.update(|s| {
			if let Some(animate) = s.first_mut().and_then(|s| s.animate.as_mut()) {
				animate.enabled = !animate.enabled;
			}
		});
	};

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="fullscreen-graph">
				<GraphViewCanvas request=request sides=sides menu=menu command=command fullscreen=true />
				<GraphMenu menu=menu command=command />
				<div class="graph-overlay">
					<h1>"Graph View"</h1>
					<p class="subtitle">
						"Drag vertices to reposition. Scroll to zoom, shift-scroll to resize. Click a vertex or cell for its menu."
					</p>
					<button on:click=toggle_animation>
						{move || if animating() { "Stop layout" } else { "Animate layout" }}
					</button>
				</div>
			</div>
		</ErrorBoundary>
	}
}
