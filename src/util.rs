// Console logging helpers. These call into the browser and must stay out of
// code paths exercised by native unit tests.
use wasm_bindgen::JsValue;

pub fn clog(msg: &str) {
    web_sys::console::log_1(&JsValue::from_str(msg));
}

pub fn cwarn(msg: &str) {
    web_sys::console::warn_1(&JsValue::from_str(msg));
}

pub fn cerror(msg: &str) {
    web_sys::console::error_1(&JsValue::from_str(msg));
}
