//! Thin async/DOM helpers around `web-sys`: fetching, file reads, the URL
//! fragment and element lookups.

use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, Element, File, HtmlElement, Response};

use crate::config::MapConfig;
use crate::error::{MapError, MapResult};
use crate::format::read_features;
use crate::model::FeatureData;
use crate::util::cwarn;

/// Mount point the host page must provide.
pub const MAP_ROOT_ID: &str = "map";
/// Optional `<script type="application/json">` with `MapConfig` overrides.
pub const CONFIG_ID: &str = "map-config";
pub const CLOSER_ID: &str = "popup-closer";

pub fn js_error_text(value: &JsValue) -> String {
    if let Some(s) = value.as_string() {
        return s;
    }
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    format!("{value:?}")
}

fn document() -> MapResult<Document> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or(MapError::NoWindow)
}

pub fn element_by_id(id: &'static str) -> MapResult<Element> {
    document()?
        .get_element_by_id(id)
        .ok_or(MapError::MissingElement(id))
}

pub fn load_config() -> MapConfig {
    let Some(raw) = element_by_id(CONFIG_ID).ok().and_then(|el| el.text_content()) else {
        return MapConfig::default();
    };
    match MapConfig::from_json(&raw) {
        Ok(cfg) => cfg,
        Err(err) => {
            cwarn(&format!("ignoring #{CONFIG_ID}: {err}"));
            MapConfig::default()
        }
    }
}

pub async fn fetch_text(url: &str) -> MapResult<String> {
    let fail = |reason: String| MapError::Fetch {
        url: url.to_string(),
        reason,
    };
    let window = web_sys::window().ok_or(MapError::NoWindow)?;
    let resp_value = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(|e| fail(js_error_text(&e)))?;
    let resp: Response = resp_value
        .dyn_into()
        .map_err(|e| fail(js_error_text(&e)))?;
    if !resp.ok() {
        return Err(MapError::HttpStatus {
            url: url.to_string(),
            status: resp.status(),
        });
    }
    let text_promise = resp.text().map_err(|e| fail(js_error_text(&e)))?;
    let text = JsFuture::from(text_promise)
        .await
        .map_err(|e| fail(js_error_text(&e)))?;
    text.as_string()
        .ok_or_else(|| fail("response body is not text".to_string()))
}

pub async fn read_file_text(file: &File) -> MapResult<String> {
    let fail = |reason: String| MapError::FileRead {
        name: file.name(),
        reason,
    };
    let text = JsFuture::from(file.text())
        .await
        .map_err(|e| fail(js_error_text(&e)))?;
    text.as_string()
        .ok_or_else(|| fail("file contents are not text".to_string()))
}

pub async fn load_features(url: &str) -> MapResult<Vec<FeatureData>> {
    read_features(&fetch_text(url).await?)
}

pub async fn import_file(file: &File) -> MapResult<Vec<FeatureData>> {
    read_features(&read_file_text(file).await?)
}

pub fn read_fragment() -> Option<String> {
    web_sys::window()?.location().hash().ok()
}

/// Rewrites the fragment without adding a history entry or firing `hashchange`.
pub fn replace_fragment(fragment: &str) -> MapResult<()> {
    let window = web_sys::window().ok_or(MapError::NoWindow)?;
    let history = window
        .history()
        .map_err(|e| MapError::Js(js_error_text(&e)))?;
    history
        .replace_state_with_url(&JsValue::NULL, "", Some(fragment))
        .map_err(|e| MapError::Js(js_error_text(&e)))
}

pub fn blur_element(id: &'static str) -> MapResult<()> {
    let el: HtmlElement = element_by_id(id)?
        .dyn_into()
        .map_err(|_| MapError::MissingElement(id))?;
    el.blur().map_err(|e| MapError::Js(js_error_text(&e)))
}
