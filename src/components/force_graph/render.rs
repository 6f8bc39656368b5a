use std::f64::consts::PI;

use force_graph::DefaultNodeIdx;
use web_sys::CanvasRenderingContext2d;

use super::state::{ForceGraphState, NODE_RADIUS, NodeInfo};

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

pub fn render(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str("#f8fafc");
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_edges(state, ctx);
	draw_nodes(state, ctx);
	ctx.restore();
}

fn draw_edges(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;
	let line_width = 1.0 / k;
	let t = ease_out_cubic(state.hover.highlight_t);

	state.graph.visit_edges(|n1, n2, _| {
		let is_highlighted = state.is_highlighted(n1.index()) && state.is_highlighted(n2.index());

		// t=0: all edges at base (0.6), t=1: highlighted at 0.9, others at 0.15
		let (alpha, width) = if is_highlighted {
			(0.6 + 0.3 * t, line_width * (1.0 + 0.5 * t))
		} else {
			(0.6 - 0.45 * t, line_width)
		};

		ctx.set_stroke_style_str(&format!("rgba(148, 163, 184, {})", alpha));
		ctx.set_line_width(width);
		ctx.begin_path();
		ctx.move_to(n1.x() as f64, n1.y() as f64);
		ctx.line_to(n2.x() as f64, n2.y() as f64);
		ctx.stroke();
	});
}

fn draw_nodes(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	let (has_highlight, t) = (
		state.has_active_highlight(),
		ease_out_cubic(state.hover.highlight_t),
	);

	// Dimmed pass first so highlighted labels sit on top.
	state.graph.visit_nodes(|node| {
		let idx = node.index();
		if has_highlight && state.is_highlighted(idx) {
			return;
		}
		let alpha = if has_highlight { 1.0 - 0.7 * t } else { 1.0 };
		draw_node(
			state,
			ctx,
			idx,
			(node.x() as f64, node.y() as f64),
			&node.data.user_data,
			alpha,
		);
	});

	if !has_highlight {
		return;
	}

	state.graph.visit_nodes(|node| {
		let idx = node.index();
		if state.is_highlighted(idx) {
			draw_node(
				state,
				ctx,
				idx,
				(node.x() as f64, node.y() as f64),
				&node.data.user_data,
				1.0,
			);
		}
	});
}

/// A coloured dot with the contact's name in a box beside it. Search matches
/// get a solid box, neighbours a faded one.
fn draw_node(
	state: &ForceGraphState,
	ctx: &CanvasRenderingContext2d,
	idx: DefaultNodeIdx,
	(x, y): (f64, f64),
	info: &NodeInfo,
	alpha: f64,
) {
	let k = state.transform.k;
	let t = ease_out_cubic(state.hover.highlight_t);
	let radius = if state.is_hovered(idx) {
		NODE_RADIUS * (1.0 + 0.35 * t)
	} else {
		NODE_RADIUS
	};

	ctx.set_global_alpha(alpha);
	ctx.begin_path();
	let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
	ctx.set_fill_style_str(&info.color);
	ctx.fill();

	let font_size = 12.0 / k.max(0.5);
	ctx.set_font(&format!("{}px sans-serif", font_size));
	let text_width = ctx
		.measure_text(&info.label)
		.map(|m| m.width())
		.unwrap_or(font_size * info.label.len() as f64 * 0.6);
	let padding = 2.0 / k.max(0.5);
	let (box_x, box_y) = (x + radius + 3.0, y - font_size / 2.0 - padding);
	let (box_w, box_h) = (text_width + padding * 2.0, font_size + padding * 2.0);

	let (fill, stroke, text, border) = if info.matched {
		(
			"rgba(255, 255, 255, 0.95)",
			"rgba(30, 41, 59, 0.4)",
			"rgb(30, 41, 59)",
			1.5,
		)
	} else {
		(
			"rgba(241, 245, 249, 0.9)",
			"rgba(148, 163, 184, 0.4)",
			"rgb(100, 116, 139)",
			1.0,
		)
	};
	ctx.set_fill_style_str(fill);
	ctx.set_stroke_style_str(stroke);
	ctx.set_line_width(border / k);
	ctx.begin_path();
	ctx.rect(box_x, box_y, box_w, box_h);
	ctx.fill();
	ctx.stroke();

	ctx.set_fill_style_str(text);
	ctx.set_text_baseline("middle");
	let _ = ctx.fill_text(&info.label, box_x + padding, y);
	ctx.set_global_alpha(1.0);
}
