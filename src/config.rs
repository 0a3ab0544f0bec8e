use serde::{Deserialize, Serialize};

use crate::error::{MapError, MapResult};
use crate::model::{Extent, ImageLayer, Projection, Units};

/// Page-level settings. Every field has a default, so a host page only
/// needs to list what it changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub projection_code: String,
    pub extent: Extent,
    pub image_url: String,
    pub features_url: String,
    pub initial_zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub download_name: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            projection_code: "ichion".to_string(),
            extent: Extent([0.0, 0.0, 8192.0, 6144.0]),
            image_url: "https://cdn.inkarnate.com/QUks1Sfy8LAGs7ivhwCxFi".to_string(),
            features_url: "features.json".to_string(),
            initial_zoom: 2.0,
            min_zoom: 0.0,
            max_zoom: 8.0,
            download_name: "features.json".to_string(),
        }
    }
}

impl MapConfig {
    pub fn from_json(raw: &str) -> MapResult<Self> {
        let cfg: Self = serde_json::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Rejects settings the viewport cannot work with.
    pub fn validate(&self) -> MapResult<()> {
        let invalid = |reason: String| Err(MapError::InvalidConfig(reason));
        let e = &self.extent;
        if !e.0.iter().all(|v| v.is_finite()) || e.width() <= 0.0 || e.height() <= 0.0 {
            return invalid(format!("extent {:?} is empty", e.0));
        }
        let zooms = [self.min_zoom, self.max_zoom, self.initial_zoom];
        if !zooms.iter().all(|z| z.is_finite()) {
            return invalid("zoom levels must be finite".to_string());
        }
        if self.min_zoom > self.max_zoom {
            return invalid(format!(
                "min_zoom {} is above max_zoom {}",
                self.min_zoom, self.max_zoom
            ));
        }
        if !(self.min_zoom..=self.max_zoom).contains(&self.initial_zoom) {
            return invalid(format!(
                "initial_zoom {} is outside {}..={}",
                self.initial_zoom, self.min_zoom, self.max_zoom
            ));
        }
        Ok(())
    }

    pub fn projection(&self) -> Projection {
        Projection {
            code: self.projection_code.clone(),
            units: Units::Pixels,
            extent: self.extent,
        }
    }

    pub fn image_layer(&self) -> ImageLayer {
        ImageLayer {
            url: self.image_url.clone(),
            extent: self.extent,
        }
    }
}
