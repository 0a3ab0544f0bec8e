use std::rc::Rc;
use yew::Reducible;

use crate::config::MapConfig;
use crate::format::{popup_html, status_text};
use crate::model::{
    FeatureData, FeatureId, FeatureSource, HitTolerance, ImageLayer, MapFeature, Projection,
};
use crate::state::{View, Viewport};
use crate::style::hit_tolerance;

/// Popup box relative to its anchor pixel `[left, top, right, bottom]`;
/// matches the popup component's layout.
pub const POPUP_OFFSETS: [f64; 4] = [-50.0, -132.0, 230.0, 0.0];
pub const AUTO_PAN_MARGIN_PX: f64 = 20.0;
pub const KEY_PAN_PX: f64 = 128.0;

#[derive(Clone, Debug, PartialEq)]
pub struct Popup {
    pub coordinate: [f64; 2],
    pub html: String,
}

/// Everything the map page mutates. Each event has one update method;
/// they return whether anything changed.
#[derive(Clone, Debug, PartialEq)]
pub struct MapState {
    pub projection: Projection,
    pub image: ImageLayer,
    pub viewport: Viewport,
    /// View restored by the reset control.
    pub home: View,
    pub features: FeatureSource,
    /// Hovered feature, drawn with the highlight style.
    pub selected: Option<FeatureId>,
    pub popup: Option<Popup>,
    /// Bumped whenever the popup closer should lose focus.
    pub closer_blur: u64,
    /// Bumped on every change, drives canvas redraws.
    pub version: u64,
}

impl MapState {
    pub fn new(config: &MapConfig, initial_view: Option<View>) -> Self {
        let projection = config.projection();
        let home = View {
            center: projection.extent.center(),
            zoom: config.initial_zoom,
            rotation: 0.0,
        };
        let viewport = Viewport::new(
            &projection.extent,
            initial_view.unwrap_or(home),
            config.min_zoom,
            config.max_zoom,
        );
        Self {
            image: config.image_layer(),
            projection,
            viewport,
            home,
            features: FeatureSource::default(),
            selected: None,
            popup: None,
            closer_blur: 0,
            version: 0,
        }
    }

    pub fn highlighted(&self) -> Option<&MapFeature> {
        self.selected.and_then(|id| self.features.get(id))
    }

    pub fn status_text(&self) -> String {
        status_text(self.highlighted())
    }

    /// Empty when the popup is closed.
    pub fn popup_content(&self) -> &str {
        self.popup.as_ref().map(|p| p.html.as_str()).unwrap_or("")
    }

    pub fn popup_pixel(&self) -> Option<[f64; 2]> {
        self.popup
            .as_ref()
            .map(|p| self.viewport.to_pixel(p.coordinate))
    }

    fn hit_tolerance(&self) -> HitTolerance {
        hit_tolerance(self.viewport.resolution())
    }

    pub fn handle_pointer_move(&mut self, pixel: [f64; 2]) -> bool {
        let before = self.selected.take();
        let coordinate = self.viewport.to_coordinate(pixel);
        self.selected = self
            .features
            .hit_test(coordinate, self.hit_tolerance())
            .map(|f| f.id);
        before != self.selected
    }

    pub fn handle_pointer_leave(&mut self) -> bool {
        self.selected.take().is_some()
    }

    pub fn handle_click(&mut self, pixel: [f64; 2]) -> bool {
        let coordinate = self.viewport.to_coordinate(pixel);
        let html = self
            .features
            .hit_test(coordinate, self.hit_tolerance())
            .map(popup_html);
        match html {
            Some(html) => {
                self.popup = Some(Popup { coordinate, html });
                self.viewport
                    .ensure_visible(coordinate, POPUP_OFFSETS, AUTO_PAN_MARGIN_PX);
            }
            None => {
                self.popup = None;
                self.closer_blur += 1;
            }
        }
        true
    }

    pub fn close_popup(&mut self) -> bool {
        self.closer_blur += 1;
        self.popup.take();
        true
    }

    pub fn clear_features(&mut self) -> bool {
        self.features.clear();
        self.selected = None;
        true
    }

    pub fn add_features(&mut self, incoming: Vec<FeatureData>) -> bool {
        self.features.add_features(incoming) > 0
    }
}

#[derive(Clone, Debug)]
pub enum MapAction {
    Resize { width: f64, height: f64 },
    PointerMove { pixel: [f64; 2] },
    PointerLeave,
    Click { pixel: [f64; 2] },
    ClosePopup,
    ClearFeatures,
    /// Initial load and drag-and-drop imports alike.
    AddFeatures(Vec<FeatureData>),
    PanBy { dx: f64, dy: f64 },
    ZoomBy { delta: f64, anchor: Option<[f64; 2]> },
    SetView(View),
    ResetView,
}

impl Reducible for MapState {
    type Action = MapAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        use MapAction::*;
        let mut new = (*self).clone();
        let changed = match action {
            Resize { width, height } => new.viewport.set_size(width, height),
            PointerMove { pixel } => new.handle_pointer_move(pixel),
            PointerLeave => new.handle_pointer_leave(),
            Click { pixel } => new.handle_click(pixel),
            ClosePopup => new.close_popup(),
            ClearFeatures => new.clear_features(),
            AddFeatures(incoming) => new.add_features(incoming),
            PanBy { dx, dy } => new.viewport.pan_by_pixels(dx, dy),
            ZoomBy { delta, anchor } => new.viewport.zoom_by(delta, anchor),
            SetView(view) => new.viewport.set_view(view),
            ResetView => new.viewport.set_view(new.home),
        };
        if !changed {
            return self;
        }
        new.version = new.version.wrapping_add(1);
        Rc::new(new)
    }
}
