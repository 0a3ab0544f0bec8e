// View state as carried in the URL fragment: `#map=<zoom>/<x>/<y>/<rotation>`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct View {
    pub center: [f64; 2],
    pub zoom: f64,
    /// Radians, counter-clockwise.
    pub rotation: f64,
}

fn round2(v: f64) -> f64 {
    // `+ 0.0` turns -0.0 into 0.0 so it never prints as "-0"
    (v * 100.0).round() / 100.0 + 0.0
}

impl View {
    pub fn to_fragment(&self) -> String {
        format!(
            "#map={}/{}/{}/{}",
            round2(self.zoom),
            round2(self.center[0]),
            round2(self.center[1]),
            round2(self.rotation)
        )
    }

    /// Accepts the fragment with or without its leading `#`; rotation may be
    /// omitted. Anything else yields `None`.
    pub fn from_fragment(fragment: &str) -> Option<View> {
        let body = fragment.strip_prefix('#').unwrap_or(fragment);
        let value = body.strip_prefix("map=")?;
        let parts: Vec<f64> = value
            .split('/')
            .map(|p| p.parse::<f64>().ok().filter(|v| v.is_finite()))
            .collect::<Option<_>>()?;
        match parts.as_slice() {
            [zoom, x, y] => Some(View {
                center: [*x, *y],
                zoom: *zoom,
                rotation: 0.0,
            }),
            [zoom, x, y, rotation] => Some(View {
                center: [*x, *y],
                zoom: *zoom,
                rotation: *rotation,
            }),
            _ => None,
        }
    }
}
