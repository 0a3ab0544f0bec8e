use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct CameraControlsProps {
    pub on_zoom_in: Callback<()>,
    pub on_zoom_out: Callback<()>,
    pub on_reset: Callback<()>,
}

#[function_component(CameraControls)]
pub fn camera_controls(props: &CameraControlsProps) -> Html {
    let zi = {
        let cb = props.on_zoom_in.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let zo = {
        let cb = props.on_zoom_out.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let rs = {
        let cb = props.on_reset.clone();
        Callback::from(move |_| cb.emit(()))
    };
    html! {<div style="position:absolute; left:12px; top:12px; background:rgba(22,27,34,0.9); border:1px solid #30363d; border-radius:8px; padding:6px; display:flex; flex-direction:column; gap:4px;">
        <button onclick={zi} title="Zoom in"> {"+"} </button>
        <button onclick={zo} title="Zoom out"> {"−"} </button>
        <button onclick={rs} title="Reset view"> {"⌂"} </button>
    </div>}
}
