use std::f64::consts::{FRAC_PI_2, PI, TAU};

use web_sys::CanvasRenderingContext2d;

use super::entity::{Edge, Glyph, IconShape, LabelClass, Vertex};
use super::host::ImageCache;
use super::offsetter::Offsetter;
use super::vertices::LegendSide;
use super::view::{ERROR_TEXT, GraphView, Panel};

const BACKGROUND: &str = "#1a1a2e";
const EDGE_COLOR: &str = "rgba(100, 180, 255, 0.6)";
const HIGHLIGHT_OUT: &str = "#ffb347";
const HIGHLIGHT_IN: &str = "#7cfc9a";
const TEXT: &str = "rgba(255, 255, 255, 0.8)";
const SEPARATOR: &str = "rgba(255, 255, 255, 0.3)";
/// Opacity of whatever is not opaque while a vertex is hovered.
const FADED: f64 = 0.15;
/// Sideways bend of an edge relative to its length.
const BEND: f64 = 0.1;
/// Radius of a self-loop relative to the thickness.
const LOOP_RADIUS: f64 = 0.05;
const EDGE_LABEL_FONT: &str = "15px sans-serif";

/// A screen point.
type Point = (f64, f64);

/// The two halves of an edge curve, each a quadratic Bézier: `(start, control, end)`.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Halves {
	first: (Point, Point, Point),
	second: (Point, Point, Point),
}

/// Splits the edge curve from `s` to `d` at its middle. The curve bends to the left of the
/// direction of travel, so edges in opposite directions do not overlap.
fn halves(s: Point, d: Point) -> Halves {
	let (dx, dy) = (d.0 - s.0, d.1 - s.1);
	let c = (
		(s.0 + d.0) / 2.0 + BEND * dy,
		(s.1 + d.1) / 2.0 - BEND * dx,
	);
	let mid = (
		0.25 * s.0 + 0.5 * c.0 + 0.25 * d.0,
		0.25 * s.1 + 0.5 * c.1 + 0.25 * d.1,
	);
	Halves {
		first: (s, ((s.0 + c.0) / 2.0, (s.1 + c.1) / 2.0), mid),
		second: (mid, ((c.0 + d.0) / 2.0, (c.1 + d.1) / 2.0), d),
	}
}

/// Outline of an icon with unit radius, or `None` for the circle.
fn outline(shape: IconShape) -> Option<Vec<Point>> {
	let polygon = |corners: usize, turn: f64| {
		(0..corners)
			.map(|i| {
				let a = turn + TAU * i as f64 / corners as f64;
				(a.cos(), a.sin())
			})
			.collect::<Vec<_>>()
	};
	Some(match shape {
		IconShape::Circle => return None,
		IconShape::Square => vec![(-0.7, -0.7), (0.7, -0.7), (0.7, 0.7), (-0.7, 0.7)],
		IconShape::Hexagon => polygon(6, 0.0),
		IconShape::Pentagon => polygon(5, -FRAC_PI_2),
		IconShape::Triangle => polygon(3, -FRAC_PI_2),
		IconShape::Diamond => polygon(4, -FRAC_PI_2),
		IconShape::Star => polygon(10, -FRAC_PI_2)
			.into_iter()
			.enumerate()
			.map(|(i, (x, y))| if i % 2 == 0 { (x, y) } else { (0.45 * x, 0.45 * y) })
			.collect(),
		IconShape::Cross => {
			let (a, b) = (0.3, 0.9);
			vec![
				(-a, -b),
				(a, -b),
				(a, -a),
				(b, -a),
				(b, a),
				(a, a),
				(a, b),
				(-a, b),
				(-a, a),
				(-b, a),
				(-b, -a),
				(-a, -a),
			]
		}
	})
}

/// Paints the whole view.
pub fn paint(ctx: &CanvasRenderingContext2d, view: &GraphView, images: &mut ImageCache) {
	ctx.set_global_alpha(1.0);
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, view.width(), view.height());

	if let Some(error) = view.error() {
		draw_error(ctx, view, &error.to_string());
		return;
	}

	for panel in view.panels() {
		clipped(ctx, panel, |ctx| draw_tiles(ctx, panel, images));
	}
	draw_edges(ctx, view);
	for panel in view.panels() {
		clipped(ctx, panel, |ctx| {
			draw_labels(ctx, panel);
			draw_vertices(ctx, view, panel, images);
		});
		draw_legend(ctx, view, panel);
	}
	draw_separators(ctx, view);

	if view.is_loading() {
		ctx.set_global_alpha(0.5);
		ctx.set_fill_style_str(BACKGROUND);
		ctx.fill_rect(0.0, 0.0, view.width(), view.height());
		ctx.set_global_alpha(1.0);
	}
}

fn clipped(ctx: &CanvasRenderingContext2d, panel: &Panel, draw: impl FnOnce(&CanvasRenderingContext2d)) {
	let clip = panel.clip;
	ctx.save();
	ctx.begin_path();
	ctx.rect(clip.x, clip.y, clip.width, clip.height);
	ctx.clip();
	draw(ctx);
	ctx.restore();
}

fn draw_tiles(ctx: &CanvasRenderingContext2d, panel: &Panel, images: &mut ImageCache) {
	let Some(map) = &panel.map else { return };
	for tile in map.tiles() {
		let (x, y, w, h) = tile.screen_rect(&panel.offsetter);
		if let Some(image) = images.get(&tile.href) {
			let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(image, x, y, w, h);
		}
	}
}

fn screen(off: &Offsetter, v: &Vertex) -> Point {
	(off.screen_x(v.x), off.screen_y(v.y))
}

fn draw_edges(ctx: &CanvasRenderingContext2d, view: &GraphView) {
	let edges = view.edges();
	let mut order: Vec<usize> = (0..edges.len()).filter(|&i| edges[i].visible).collect();
	order.sort_by_key(|&i| edges[i].z);
	for i in order {
		draw_edge(ctx, view, &edges[i]);
	}
	ctx.set_global_alpha(1.0);
}

fn draw_edge(ctx: &CanvasRenderingContext2d, view: &GraphView, edge: &Edge) {
	let (Some(sp), Some(dp)) = (view.panel(edge.src.side), view.panel(edge.dst.side)) else {
		return;
	};
	let (Some(sv), Some(dv)) = (
		sp.vertices.vs.get(edge.src.index),
		dp.vertices.vs.get(edge.dst.index),
	) else {
		return;
	};
	let thickness = 0.5 * (sp.offsetter.thickness + dp.offsetter.thickness);
	let (s, d) = (screen(&sp.offsetter, sv), screen(&dp.offsetter, dv));
	let base = edge.color.as_deref().unwrap_or(EDGE_COLOR);
	let faded = view.fade_non_opaque() && !edge.opaque;
	ctx.set_global_alpha(if faded { FADED } else { 1.0 });
	ctx.set_line_width((edge.width * thickness).max(0.5));

	// Within a single panel edges stay inside it.
	let same = edge.src.side == edge.dst.side;
	if same {
		ctx.save();
		ctx.begin_path();
		let clip = sp.clip;
		ctx.rect(clip.x, clip.y, clip.width, clip.height);
		ctx.clip();
	}
	let label_at = if edge.is_loop() {
		let r = LOOP_RADIUS * thickness;
		ctx.set_stroke_style_str(if edge.is_highlighted() { HIGHLIGHT_OUT } else { base });
		ctx.begin_path();
		let _ = ctx.arc(s.0, s.1 - r, r, 0.0, TAU);
		ctx.stroke();
		(s.0, s.1 - 2.0 * r)
	} else {
		let h = halves(s, d);
		let first = if edge.highlight_out { HIGHLIGHT_OUT } else { base };
		let second = if edge.highlight_in { HIGHLIGHT_IN } else { base };
		for ((a, c, b), color) in [(h.first, first), (h.second, second)] {
			ctx.set_stroke_style_str(color);
			ctx.begin_path();
			ctx.move_to(a.0, a.1);
			ctx.quadratic_curve_to(c.0, c.1, b.0, b.1);
			ctx.stroke();
		}
		draw_arrow(ctx, h.second, second, thickness * edge.width);
		h.first.2
	};
	if let Some(label) = &edge.label {
		ctx.set_fill_style_str(TEXT);
		ctx.set_font(EDGE_LABEL_FONT);
		ctx.set_text_align("center");
		let _ = ctx.fill_text(label, label_at.0, label_at.1);
	}
	if same {
		ctx.restore();
	}
}

/// Arrow head at the middle of the edge, pointing along the second half.
fn draw_arrow(ctx: &CanvasRenderingContext2d, (a, c, _): (Point, Point, Point), color: &str, width: f64) {
	let (dx, dy) = (c.0 - a.0, c.1 - a.1);
	let len = (dx * dx + dy * dy).sqrt();
	if len < 1e-6 {
		return;
	}
	let size = 4.0 + 3.0 * width;
	let (ux, uy) = (dx / len, dy / len);
	let (px, py) = (-uy * size * 0.5, ux * size * 0.5);
	let tip = (a.0 + ux * size * 0.5, a.1 + uy * size * 0.5);
	let back = (tip.0 - ux * size, tip.1 - uy * size);
	ctx.set_fill_style_str(color);
	ctx.begin_path();
	ctx.move_to(tip.0, tip.1);
	ctx.line_to(back.0 + px, back.1 + py);
	ctx.line_to(back.0 - px, back.1 - py);
	ctx.close_path();
	ctx.fill();
}

fn draw_vertices(ctx: &CanvasRenderingContext2d, view: &GraphView, panel: &Panel, images: &mut ImageCache) {
	let off = &panel.offsetter;
	for v in panel.vertices.vs.iter().filter(|v| !v.hidden) {
		let (x, y) = screen(off, v);
		let r = off.thick(v.r);
		let fade = if view.fade_non_opaque() && !v.opaque { FADED } else { 1.0 };
		ctx.set_global_alpha(v.opacity * fade);
		match &v.glyph {
			Glyph::Image(href) => {
				if let Some(image) = images.get(href) {
					let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(
						image,
						x - r,
						y - r,
						2.0 * r,
						2.0 * r,
					);
				}
			}
			Glyph::Icon(shape) => {
				ctx.begin_path();
				match outline(*shape) {
					None => {
						let _ = ctx.arc(x, y, r, 0.0, TAU);
					}
					Some(points) => {
						for (i, (px, py)) in points.into_iter().enumerate() {
							let (px, py) = (x + r * px, y + r * py);
							if i == 0 {
								ctx.move_to(px, py);
							} else {
								ctx.line_to(px, py);
							}
						}
						ctx.close_path();
					}
				}
				ctx.set_fill_style_str(v.fill());
				ctx.fill();
			}
		}
		if v.center {
			ctx.begin_path();
			let _ = ctx.arc(x, y, r + 3.0, 0.0, TAU);
			ctx.set_stroke_style_str(TEXT);
			ctx.set_line_width(1.5);
			ctx.stroke();
		}
		if let Some(label) = &v.label {
			draw_vertex_label(ctx, v, label, (x, y));
		}
	}
	ctx.set_global_alpha(1.0);
}

fn draw_vertex_label(ctx: &CanvasRenderingContext2d, v: &Vertex, label: &str, (x, y): Point) {
	let size = 30.0 * v.label_size;
	ctx.set_font(&format!("{size}px sans-serif"));
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	if v.highlighted {
		if let Ok(metrics) = ctx.measure_text(label) {
			let (w, h) = (metrics.width() + 4.0, size + 2.0);
			ctx.set_fill_style_str("rgba(0, 0, 0, 0.6)");
			ctx.fill_rect(x - w / 2.0, y - h / 2.0, w, h);
		}
	}
	ctx.set_fill_style_str(v.label_color.as_deref().unwrap_or(TEXT));
	let _ = ctx.fill_text(label, x, y);
	ctx.set_text_baseline("alphabetic");
}

fn draw_labels(ctx: &CanvasRenderingContext2d, panel: &Panel) {
	let off = &panel.offsetter;
	for label in &panel.vertices.labels {
		let (x, y) = (off.screen_x(label.x), off.screen_y(label.y));
		let (align, font) = match label.class {
			LabelClass::AxisTitle => ("center", "bold 13px sans-serif"),
			LabelClass::Left => ("right", "12px sans-serif"),
			LabelClass::Right => ("left", "12px sans-serif"),
			LabelClass::Plain => ("center", "12px sans-serif"),
		};
		ctx.set_font(font);
		ctx.set_text_align(align);
		ctx.set_fill_style_str(if label.is_highlighted() { HIGHLIGHT_OUT } else { TEXT });
		ctx.save();
		let _ = ctx.translate(x, y);
		if label.vertical {
			let _ = ctx.rotate(-PI / 2.0);
		}
		let _ = ctx.fill_text(&label.text, 0.0, 0.0);
		ctx.restore();
	}
}

fn draw_legend(ctx: &CanvasRenderingContext2d, view: &GraphView, panel: &Panel) {
	let (margin, line_height) = (view.config.legend_margin, view.config.legend_line_height);
	let clip = panel.clip;
	let (x, align, sign) = match panel.vertices.legend_side {
		LegendSide::Left => (clip.x + margin, "left", 1.0),
		LegendSide::Right => (clip.x + clip.width - margin, "right", -1.0),
	};
	ctx.set_font("12px sans-serif");
	ctx.set_text_align(align);
	for (i, line) in panel.vertices.legend.iter().enumerate() {
		ctx.set_fill_style_str(line.color.as_deref().unwrap_or(TEXT));
		let y = margin + line_height * (i + 1) as f64;
		let _ = ctx.fill_text(&line.text, x + sign * line.indent, y);
	}
}

fn draw_separators(ctx: &CanvasRenderingContext2d, view: &GraphView) {
	ctx.set_stroke_style_str(SEPARATOR);
	ctx.set_line_width(2.0);
	for &x in view.separators() {
		ctx.begin_path();
		ctx.move_to(x, 0.0);
		ctx.line_to(x, view.height());
		ctx.stroke();
	}
}

fn draw_error(ctx: &CanvasRenderingContext2d, view: &GraphView, message: &str) {
	let (cx, cy) = (view.width() / 2.0, view.height() / 2.0);
	ctx.set_text_align("center");
	ctx.set_fill_style_str(HIGHLIGHT_OUT);
	ctx.set_font("bold 16px sans-serif");
	let _ = ctx.fill_text(ERROR_TEXT, cx, cy - 12.0);
	ctx.set_fill_style_str(TEXT);
	ctx.set_font("13px sans-serif");
	let _ = ctx.fill_text(message, cx, cy + 12.0);
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn halves_meet_on_the_curve_and_bend_left() {
		let h = halves((0.0, 0.0), (100.0, 0.0));
		assert_eq!(h.first.2, h.second.0);
		assert_eq!(h.first.0, (0.0, 0.0));
		assert_eq!(h.second.2, (100.0, 0.0));
		// Travelling along +x on screen, left is -y.
		let (mx, my) = h.first.2;
		assert!((mx - 50.0).abs() < 1e-9);
		assert!((my - -5.0).abs() < 1e-9);
		let back = halves((100.0, 0.0), (0.0, 0.0));
		assert!((back.first.2.1 - 5.0).abs() < 1e-9);
	}

	#[test]
	fn icon_outlines_fit_the_unit_circle() {
		assert_eq!(outline(IconShape::Circle), None);
		for shape in IconShape::NEUTRALS.into_iter().chain([IconShape::Diamond, IconShape::Cross]) {
			let Some(points) = outline(shape) else { continue };
			assert!(points.len() >= 3, "{shape:?}");
			for (x, y) in points {
				assert!(x * x + y * y <= 1.0 + 1e-9, "{shape:?}");
			}
		}
		assert_eq!(outline(IconShape::Star).map(|p| p.len()), Some(10));
		assert_eq!(outline(IconShape::Cross).map(|p| p.len()), Some(12));
	}
}
