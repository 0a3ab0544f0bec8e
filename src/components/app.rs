use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use super::{
    camera_controls::CameraControls, map_view::MapView, popup_overlay::PopupOverlay,
    status_bar::StatusBar, toolbar::Toolbar,
};
use crate::browser::{
    CLOSER_ID, blur_element, import_file, load_config, load_features, read_fragment,
    replace_fragment,
};
use crate::format::export_href;
use crate::state::{MapAction, MapState, View};
use crate::util::{cerror, clog, cwarn};

fn fragment_view() -> Option<View> {
    read_fragment().as_deref().and_then(View::from_fragment)
}

#[function_component(App)]
pub fn app() -> Html {
    let config = use_memo((), |_| load_config());
    let state = {
        let config = config.clone();
        use_reducer(move || MapState::new(&config, fragment_view()))
    };

    // Initial feature layer
    {
        let state = state.clone();
        let url = config.features_url.clone();
        use_effect_with((), move |_| {
            spawn_local(async move {
                match load_features(&url).await {
                    Ok(features) => {
                        clog(&format!("loaded {} features from {url}", features.len()));
                        state.dispatch(MapAction::AddFeatures(features));
                    }
                    Err(err) => cerror(&format!("feature layer not loaded: {err}")),
                }
            });
            || ()
        });
    }
    // Mirror the view into the URL fragment
    {
        let view = state.viewport.view;
        use_effect_with(view, move |view| {
            if let Err(err) = replace_fragment(&view.to_fragment()) {
                cwarn(&format!("could not update URL fragment: {err}"));
            }
            || ()
        });
    }
    // Restore the view when the fragment is edited or history moves
    {
        let state = state.clone();
        use_effect_with((), move |_| {
            let window = web_sys::window();
            let restore_cb = Closure::wrap(Box::new(move |_e: web_sys::Event| {
                if let Some(view) = fragment_view() {
                    state.dispatch(MapAction::SetView(view));
                }
            }) as Box<dyn FnMut(_)>);
            if let Some(w) = &window {
                w.add_event_listener_with_callback("hashchange", restore_cb.as_ref().unchecked_ref())
                    .ok();
                w.add_event_listener_with_callback("popstate", restore_cb.as_ref().unchecked_ref())
                    .ok();
            }
            move || {
                if let Some(w) = window {
                    let _ = w.remove_event_listener_with_callback(
                        "hashchange",
                        restore_cb.as_ref().unchecked_ref(),
                    );
                    let _ = w.remove_event_listener_with_callback(
                        "popstate",
                        restore_cb.as_ref().unchecked_ref(),
                    );
                }
            }
        });
    }
    // Popup closer gives up focus whenever the popup closes
    use_effect_with(state.closer_blur, |_| {
        if let Err(err) = blur_element(CLOSER_ID) {
            cwarn(&format!("could not blur the popup closer: {err}"));
        }
        || ()
    });

    // Download link follows every change to the collection
    let download_href = {
        let features = state.features.clone();
        use_memo(state.features.revision(), move |_| {
            export_href(&features).unwrap_or_else(|err| {
                cerror(&format!("could not serialize features: {err}"));
                "#".to_string()
            })
        })
    };

    let on_clear: Callback<()> = {
        let state = state.clone();
        Callback::from(move |()| {
            clog(&format!("clearing {} features", state.features.len()));
            state.dispatch(MapAction::ClearFeatures);
        })
    };
    let on_close_popup: Callback<()> = {
        let state = state.clone();
        Callback::from(move |()| state.dispatch(MapAction::ClosePopup))
    };
    let zoom_cb = |delta: f64| {
        let state = state.clone();
        Callback::from(move |()| state.dispatch(MapAction::ZoomBy { delta, anchor: None }))
    };
    let reset_cb: Callback<()> = {
        let state = state.clone();
        Callback::from(move |()| state.dispatch(MapAction::ResetView))
    };

    // Drag-and-drop import; the browser only allows a drop after dragover is cancelled
    let ondragover = Callback::from(|e: DragEvent| e.prevent_default());
    let ondrop = {
        let state = state.clone();
        Callback::from(move |e: DragEvent| {
            e.prevent_default();
            let Some(files) = e.data_transfer().and_then(|dt| dt.files()) else {
                return;
            };
            for file in (0..files.length()).filter_map(|i| files.get(i)) {
                let state = state.clone();
                spawn_local(async move {
                    match import_file(&file).await {
                        Ok(features) => {
                            clog(&format!("imported {} features from {}", features.len(), file.name()));
                            state.dispatch(MapAction::AddFeatures(features));
                        }
                        Err(err) => cerror(&format!("import of {} failed: {err}", file.name())),
                    }
                });
            }
        })
    };

    html! {
        <div style="display:flex; flex-direction:column; width:100%; height:100%;">
            <Toolbar
                projection_code={state.projection.code.clone()}
                units={state.projection.units.label()}
                feature_count={state.features.len()}
                download_href={(*download_href).clone()}
                download_name={config.download_name.clone()}
                on_clear={on_clear}
            />
            <div id="map-surface" style="position:relative; flex:1; overflow:hidden;" {ondragover} {ondrop}>
                <MapView state={state.clone()} />
                <PopupOverlay pixel={state.popup_pixel()} html={state.popup_content().to_string()} on_close={on_close_popup} />
                <CameraControls on_zoom_in={zoom_cb(1.0)} on_zoom_out={zoom_cb(-1.0)} on_reset={reset_cb} />
                <StatusBar text={state.status_text()} />
            </div>
        </div>
    }
}
