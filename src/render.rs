use geo::{Coord, Geometry, LineString, Polygon};
use web_sys::{CanvasRenderingContext2d, CanvasWindingRule, HtmlImageElement};

use crate::state::MapState;
use crate::style::{POINT_RADIUS_PX, style_for};

const BACKDROP: &str = "#0e1116";

fn set_transform(ctx: &CanvasRenderingContext2d, t: [f64; 6]) {
    ctx.set_transform(t[0], t[1], t[2], t[3], t[4], t[5]).ok();
}

fn trace_ring(ctx: &CanvasRenderingContext2d, ring: &LineString<f64>, close: bool) {
    let mut coords = ring.0.iter();
    let Some(Coord { x, y }) = coords.next() else {
        return;
    };
    ctx.move_to(*x, *y);
    for c in coords {
        ctx.line_to(c.x, c.y);
    }
    if close {
        ctx.close_path();
    }
}

fn trace_polygon(ctx: &CanvasRenderingContext2d, polygon: &Polygon<f64>) {
    trace_ring(ctx, polygon.exterior(), true);
    for hole in polygon.interiors() {
        trace_ring(ctx, hole, true);
    }
}

// Paths are built in projection units; `radius` is the point radius in those units.
fn trace_geometry(ctx: &CanvasRenderingContext2d, geometry: &Geometry<f64>, radius: f64) {
    match geometry {
        Geometry::Point(p) => {
            ctx.move_to(p.x() + radius, p.y());
            ctx.arc(p.x(), p.y(), radius, 0.0, std::f64::consts::TAU).ok();
        }
        Geometry::MultiPoint(mp) => {
            for p in &mp.0 {
                trace_geometry(ctx, &Geometry::Point(*p), radius);
            }
        }
        Geometry::Line(l) => {
            ctx.move_to(l.start.x, l.start.y);
            ctx.line_to(l.end.x, l.end.y);
        }
        Geometry::LineString(ls) => trace_ring(ctx, ls, false),
        Geometry::MultiLineString(mls) => {
            for ls in &mls.0 {
                trace_ring(ctx, ls, false);
            }
        }
        Geometry::Polygon(p) => trace_polygon(ctx, p),
        Geometry::MultiPolygon(mp) => {
            for p in &mp.0 {
                trace_polygon(ctx, p);
            }
        }
        Geometry::Rect(r) => trace_polygon(ctx, &r.to_polygon()),
        Geometry::Triangle(t) => trace_polygon(ctx, &t.to_polygon()),
        Geometry::GeometryCollection(gc) => {
            for g in &gc.0 {
                trace_geometry(ctx, g, radius);
            }
        }
    }
}

/// Paints backdrop, background image and the vector layer in draw order.
pub fn draw_map(
    ctx: &CanvasRenderingContext2d,
    state: &MapState,
    image: Option<&HtmlImageElement>,
) {
    let [w, h] = state.viewport.size;
    set_transform(ctx, [1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
    ctx.set_fill_style_str(BACKDROP);
    ctx.fill_rect(0.0, 0.0, w, h);

    if let Some(img) = image.filter(|i| i.complete() && i.natural_width() > 0) {
        let extent = &state.image.extent;
        set_transform(ctx, state.viewport.image_transform(extent));
        ctx.draw_image_with_html_image_element_and_dw_and_dh(
            img,
            0.0,
            0.0,
            extent.width(),
            extent.height(),
        )
        .ok();
    }

    let to_pixels = state.viewport.transform();
    let radius = POINT_RADIUS_PX * state.viewport.resolution();
    for feature in state.features.features() {
        let Some(geometry) = feature.geometry() else {
            continue;
        };
        let style = style_for(state.selected == Some(feature.id));
        set_transform(ctx, to_pixels);
        ctx.begin_path();
        trace_geometry(ctx, geometry, radius);
        if let Some(fill) = style.fill {
            ctx.set_fill_style_str(fill);
            ctx.fill_with_canvas_winding_rule(CanvasWindingRule::Evenodd);
        }
        if let Some(stroke) = style.stroke {
            // the path keeps its pixel positions; identity makes the width CSS pixels
            set_transform(ctx, [1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
            ctx.set_stroke_style_str(stroke.color);
            ctx.set_line_width(stroke.width);
            ctx.stroke();
        }
    }
    set_transform(ctx, [1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
}
