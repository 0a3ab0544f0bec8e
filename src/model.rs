//! Core data model for the Ichion map: the pixel projection, the static
//! background image and the mutable collection of GeoJSON features.

use std::rc::Rc;

use geo::{EuclideanDistance, Geometry, Intersects, LineString, Point, Polygon};
use serde::{Deserialize, Serialize};

use crate::error::MapResult;

/// Axis-aligned box `[min_x, min_y, max_x, max_y]` in projection units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Extent(pub [f64; 4]);

impl Extent {
    pub fn min_x(&self) -> f64 {
        self.0[0]
    }
    pub fn min_y(&self) -> f64 {
        self.0[1]
    }
    pub fn max_x(&self) -> f64 {
        self.0[2]
    }
    pub fn max_y(&self) -> f64 {
        self.0[3]
    }
    pub fn width(&self) -> f64 {
        self.max_x() - self.min_x()
    }
    pub fn height(&self) -> f64 {
        self.max_y() - self.min_y()
    }
    pub fn center(&self) -> [f64; 2] {
        [
            (self.min_x() + self.max_x()) / 2.0,
            (self.min_y() + self.max_y()) / 2.0,
        ]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Units {
    Pixels,
}

impl Units {
    pub fn label(&self) -> &'static str {
        match self {
            Units::Pixels => "pixels",
        }
    }
}

/// A flat coordinate system laid over the background image. y grows upward,
/// so the top edge of the image sits at `extent.max_y()`.
#[derive(Clone, Debug, PartialEq)]
pub struct Projection {
    pub code: String,
    pub units: Units,
    pub extent: Extent,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ImageLayer {
    pub url: String,
    pub extent: Extent,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeatureId(pub u64);

/// How far from the bare geometry a hit still counts, in projection units.
/// Matches what is painted: point markers have a radius and lines a width.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HitTolerance {
    pub point: f64,
    pub stroke: f64,
}

fn near_line(p: &Point<f64>, line: &LineString<f64>, tolerance: f64) -> bool {
    p.euclidean_distance(line) <= tolerance
}

fn polygon_hit(p: &Point<f64>, polygon: &Polygon<f64>, tolerance: f64) -> bool {
    polygon.intersects(p)
        || near_line(p, polygon.exterior(), tolerance)
        || polygon.interiors().iter().any(|ring| near_line(p, ring, tolerance))
}

fn geometry_hit(p: &Point<f64>, geometry: &Geometry<f64>, tol: HitTolerance) -> bool {
    match geometry {
        Geometry::Point(q) => p.euclidean_distance(q) <= tol.point,
        Geometry::MultiPoint(mp) => mp.0.iter().any(|q| p.euclidean_distance(q) <= tol.point),
        Geometry::Line(l) => p.euclidean_distance(l) <= tol.stroke,
        Geometry::LineString(ls) => near_line(p, ls, tol.stroke),
        Geometry::MultiLineString(mls) => mls.0.iter().any(|ls| near_line(p, ls, tol.stroke)),
        Geometry::Polygon(poly) => polygon_hit(p, poly, tol.stroke),
        Geometry::MultiPolygon(mp) => mp.0.iter().any(|poly| polygon_hit(p, poly, tol.stroke)),
        Geometry::Rect(r) => polygon_hit(p, &r.to_polygon(), tol.stroke),
        Geometry::Triangle(t) => polygon_hit(p, &t.to_polygon(), tol.stroke),
        Geometry::GeometryCollection(gc) => gc.0.iter().any(|g| geometry_hit(p, g, tol)),
    }
}

/// A parsed GeoJSON feature that has not been given an id yet.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureData {
    /// Kept verbatim so exporting writes back exactly what was read.
    pub source: geojson::Feature,
    /// `None` for features with a null geometry: exported but never drawn or hit.
    pub geometry: Option<Geometry<f64>>,
}

impl TryFrom<geojson::Feature> for FeatureData {
    type Error = crate::error::MapError;

    fn try_from(source: geojson::Feature) -> MapResult<Self> {
        let geometry = match &source.geometry {
            Some(g) => Some(Geometry::<f64>::try_from(g.value.clone())?),
            None => None,
        };
        Ok(Self { source, geometry })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MapFeature {
    pub id: FeatureId,
    data: FeatureData,
}

impl MapFeature {
    pub fn name(&self) -> &str {
        self.string_property("name")
    }

    pub fn description(&self) -> &str {
        self.string_property("description")
    }

    pub fn source(&self) -> &geojson::Feature {
        &self.data.source
    }

    pub fn geometry(&self) -> Option<&Geometry<f64>> {
        self.data.geometry.as_ref()
    }

    /// Polygon interiors and boundaries count, as does anything within
    /// `tolerance` of a drawn point or line.
    pub fn hit(&self, coord: [f64; 2], tolerance: HitTolerance) -> bool {
        let p = Point::new(coord[0], coord[1]);
        self.geometry()
            .is_some_and(|g| geometry_hit(&p, g, tolerance))
    }

    fn string_property(&self, key: &str) -> &str {
        self.data
            .source
            .property(key)
            .and_then(|v| v.as_str())
            .unwrap_or("")
    }
}

/// Ordered feature collection behind the vector layer. Later features are
/// drawn over earlier ones.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FeatureSource {
    features: Rc<Vec<MapFeature>>,
    revision: u64,
    next_id: u64,
}

impl FeatureSource {
    pub fn features(&self) -> &[MapFeature] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Bumped on every mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn get(&self, id: FeatureId) -> Option<&MapFeature> {
        self.features.iter().find(|f| f.id == id)
    }

    /// Appends after the existing features and returns how many were added.
    pub fn add_features(&mut self, incoming: Vec<FeatureData>) -> usize {
        if incoming.is_empty() {
            return 0;
        }
        let added = incoming.len();
        let features = Rc::make_mut(&mut self.features);
        for data in incoming {
            features.push(MapFeature {
                id: FeatureId(self.next_id),
                data,
            });
            self.next_id += 1;
        }
        self.revision += 1;
        added
    }

    pub fn clear(&mut self) {
        Rc::make_mut(&mut self.features).clear();
        self.revision += 1;
    }

    /// Topmost feature under `coord`. Draw order decides ties: the feature
    /// added last is on top and wins.
    pub fn hit_test(&self, coord: [f64; 2], tolerance: HitTolerance) -> Option<&MapFeature> {
        self.features.iter().rev().find(|f| f.hit(coord, tolerance))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    pub(crate) fn square(name: &str, description: &str, min: [f64; 2], size: f64) -> FeatureData {
        let [x, y] = min;
        let feature: geojson::Feature = serde_json::from_value(json!({
            "type": "Feature",
            "properties": { "name": name, "description": description },
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[x, y], [x + size, y], [x + size, y + size], [x, y + size], [x, y]]]
            }
        }))
        .unwrap();
        FeatureData::try_from(feature).unwrap()
    }

    const EXACT: HitTolerance = HitTolerance { point: 0.0, stroke: 0.0 };

    fn feature(geometry: serde_json::Value) -> FeatureData {
        let feature: geojson::Feature = serde_json::from_value(json!({
            "type": "Feature",
            "properties": { "name": "Marker" },
            "geometry": geometry
        }))
        .unwrap();
        FeatureData::try_from(feature).unwrap()
    }

    #[test]
    fn extent_geometry() {
        let e = Extent([0.0, 0.0, 8192.0, 6144.0]);
        assert_eq!(e.center(), [4096.0, 3072.0]);
        assert_eq!(e.width(), 8192.0);
        assert_eq!(e.height(), 6144.0);
    }

    #[test]
    fn hit_includes_interior_and_boundary() {
        let mut src = FeatureSource::default();
        src.add_features(vec![square("Forest", "Dark woods", [100.0, 100.0], 50.0)]);
        assert_eq!(src.hit_test([120.0, 130.0], EXACT).map(|f| f.name()), Some("Forest"));
        assert!(src.hit_test([100.0, 120.0], EXACT).is_some());
        assert!(src.hit_test([99.0, 120.0], EXACT).is_none());
    }

    #[test]
    fn topmost_feature_wins_overlap() {
        let mut src = FeatureSource::default();
        src.add_features(vec![
            square("Lower", "", [0.0, 0.0], 100.0),
            square("Upper", "", [50.0, 50.0], 100.0),
        ]);
        assert_eq!(src.hit_test([75.0, 75.0], EXACT).unwrap().name(), "Upper");
        assert_eq!(src.hit_test([25.0, 25.0], EXACT).unwrap().name(), "Lower");
    }

    #[test]
    fn missing_properties_read_empty() {
        let feature: geojson::Feature = serde_json::from_value(json!({
            "type": "Feature",
            "properties": { "name": 7 },
            "geometry": { "type": "Point", "coordinates": [1.0, 2.0] }
        }))
        .unwrap();
        let mut src = FeatureSource::default();
        src.add_features(vec![FeatureData::try_from(feature).unwrap()]);
        let f = &src.features()[0];
        assert_eq!(f.name(), "");
        assert_eq!(f.description(), "");
    }

    #[test]
    fn null_geometry_is_kept_but_never_hit() {
        let feature: geojson::Feature = serde_json::from_value(json!({
            "type": "Feature",
            "properties": { "name": "Nowhere" },
            "geometry": null
        }))
        .unwrap();
        let mut src = FeatureSource::default();
        src.add_features(vec![FeatureData::try_from(feature).unwrap()]);
        assert_eq!(src.len(), 1);
        assert!(src.hit_test([0.0, 0.0], EXACT).is_none());
    }

    #[test]
    fn ids_keep_growing_across_clear() {
        let mut src = FeatureSource::default();
        src.add_features(vec![square("A", "", [0.0, 0.0], 1.0)]);
        let first = src.features()[0].id;
        src.clear();
        assert!(src.is_empty());
        src.add_features(vec![square("B", "", [0.0, 0.0], 1.0)]);
        assert!(src.features()[0].id > first);
        assert!(src.get(first).is_none());
    }

    #[test]
    fn revision_tracks_mutations() {
        let mut src = FeatureSource::default();
        assert_eq!(src.add_features(Vec::new()), 0);
        assert_eq!(src.revision(), 0);
        src.add_features(vec![square("A", "", [0.0, 0.0], 1.0)]);
        assert_eq!(src.revision(), 1);
        src.clear();
        assert_eq!(src.revision(), 2);
    }

    #[test]
    fn clones_share_until_written() {
        let mut src = FeatureSource::default();
        src.add_features(vec![square("A", "", [0.0, 0.0], 1.0)]);
        let snapshot = src.clone();
        src.clear();
        assert_eq!(snapshot.len(), 1);
        assert!(src.is_empty());
    }

    #[test]
    fn points_hit_within_marker_radius() {
        let mut src = FeatureSource::default();
        src.add_features(vec![feature(json!({ "type": "Point", "coordinates": [10.0, 10.0] }))]);
        let tol = HitTolerance { point: 5.0, stroke: 1.0 };
        assert!(src.hit_test([13.0, 14.0], tol).is_some());
        assert!(src.hit_test([16.0, 10.0], tol).is_none());
        assert!(src.hit_test([12.0, 10.0], EXACT).is_none());
    }

    #[test]
    fn lines_hit_within_half_stroke() {
        let mut src = FeatureSource::default();
        src.add_features(vec![feature(json!({
            "type": "LineString",
            "coordinates": [[0.0, 0.0], [100.0, 0.0]]
        }))]);
        let tol = HitTolerance { point: 5.0, stroke: 1.0 };
        assert!(src.hit_test([50.0, 0.5], tol).is_some());
        assert!(src.hit_test([50.0, -1.0], tol).is_some());
        assert!(src.hit_test([50.0, 2.0], tol).is_none());
    }

    #[test]
    fn polygon_edge_tolerance_reaches_outside() {
        let mut src = FeatureSource::default();
        src.add_features(vec![square("Forest", "", [100.0, 100.0], 50.0)]);
        let tol = HitTolerance { point: 0.0, stroke: 2.0 };
        assert!(src.hit_test([99.0, 120.0], tol).is_some());
        assert!(src.hit_test([97.0, 120.0], tol).is_none());
    }
}
