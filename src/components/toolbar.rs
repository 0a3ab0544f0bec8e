use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct ToolbarProps {
    pub projection_code: AttrValue,
    pub units: &'static str,
    pub feature_count: usize,
    pub download_href: AttrValue,
    pub download_name: AttrValue,
    pub on_clear: Callback<()>,
}

#[function_component(Toolbar)]
pub fn toolbar(props: &ToolbarProps) -> Html {
    let clear_cb = {
        let cb = props.on_clear.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let count_label = match props.feature_count {
        1 => "1 region".to_string(),
        n => format!("{n} regions"),
    };
    html! {<div id="top-bar" style="display:flex; align-items:center; gap:12px; padding:8px 12px; background:rgba(22,27,34,0.95); border-bottom:1px solid #30363d;">
        <span style="font-weight:600; text-transform:capitalize;">{ props.projection_code.clone() }</span>
        <span style="font-size:12px; opacity:0.7;">{ props.units }</span>
        <span style="font-size:12px; opacity:0.7;">{ count_label }</span>
        <span style="flex:1;"></span>
        <span style="font-size:11px; opacity:0.6;">{"Drop GeoJSON files on the map to add regions"}</span>
        <button id="clear" onclick={clear_cb}>{"Clear"}</button>
        <a id="download" href={props.download_href.clone()} download={props.download_name.clone()} style="color:#58a6ff;">{"Download"}</a>
    </div>}
}
