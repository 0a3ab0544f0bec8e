use web_sys::HtmlElement;
use yew::prelude::*;

use crate::util::cwarn;

#[derive(Properties, PartialEq, Clone)]
pub struct PopupOverlayProps {
    /// Anchor in canvas pixels; `None` hides the popup.
    pub pixel: Option<[f64; 2]>,
    pub html: AttrValue,
    pub on_close: Callback<()>,
}

// Box layout must agree with POPUP_OFFSETS: 280px wide starting 50px left of
// the anchor, bottom edge 12px above it.
#[function_component(PopupOverlay)]
pub fn popup_overlay(props: &PopupOverlayProps) -> Html {
    let close_cb = {
        let cb = props.on_close.clone();
        Callback::from(move |e: MouseEvent| {
            e.prevent_default();
            if let Some(el) = e.target_dyn_into::<HtmlElement>() {
                if el.blur().is_err() {
                    cwarn("could not blur the popup closer");
                }
            }
            cb.emit(());
        })
    };
    let (display, [left, top]) = match props.pixel {
        Some(p) => ("block", p),
        None => ("none", [0.0, 0.0]),
    };
    html! {
        <div id="popup" style={format!("position:absolute; left:{left}px; top:{top}px; display:{display};")}>
            <div style="position:absolute; bottom:12px; left:-50px; width:280px; box-sizing:border-box; background:rgba(0,0,0,0.87); border:1px solid #30363d; border-radius:10px; padding:12px 16px; box-shadow:0 6px 18px rgba(0,0,0,0.6); font-size:14px; line-height:1.4;">
                <a href="#" id="popup-closer" onclick={close_cb} style="position:absolute; top:4px; right:8px; text-decoration:none; color:#8b949e;">{"✖"}</a>
                <div id="popup-content">{ Html::from_html_unchecked(props.html.clone()) }</div>
            </div>
        </div>
    }
}
