use crate::model::HitTolerance;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stroke {
    pub color: &'static str,
    /// CSS pixels, independent of zoom.
    pub width: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Style {
    pub fill: Option<&'static str>,
    pub stroke: Option<Stroke>,
}

pub const REGION_STYLE: Style = Style {
    fill: Some("rgba(255,255,255,0.3)"),
    stroke: Some(Stroke {
        color: "rgba(0,0,0,1)",
        width: 1.25,
    }),
};

pub const HIGHLIGHT_STYLE: Style = Style {
    fill: Some("rgba(255,12,25,0.3)"),
    stroke: None,
};

/// Radius for point geometries, in CSS pixels.
pub const POINT_RADIUS_PX: f64 = 5.0;

/// Hit slop matching the painted size of markers and region outlines at
/// `resolution` projection units per pixel.
pub fn hit_tolerance(resolution: f64) -> HitTolerance {
    let half_stroke = REGION_STYLE.stroke.map_or(0.0, |s| s.width / 2.0);
    HitTolerance {
        point: (POINT_RADIUS_PX + half_stroke) * resolution,
        stroke: half_stroke * resolution,
    }
}

pub fn style_for(highlighted: bool) -> &'static Style {
    if highlighted {
        &HIGHLIGHT_STYLE
    } else {
        &REGION_STYLE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn highlight_replaces_region_style() {
        assert_eq!(style_for(false), &REGION_STYLE);
        assert_eq!(style_for(true).stroke, None);
        assert_ne!(style_for(true).fill, REGION_STYLE.fill);
    }

    #[test]
    fn tolerance_scales_with_resolution() {
        let tol = hit_tolerance(8.0);
        assert_eq!(tol.stroke, 5.0);
        assert_eq!(tol.point, 45.0);
        assert_eq!(hit_tolerance(0.5).stroke, 0.3125);
    }
}
