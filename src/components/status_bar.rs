use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct StatusBarProps {
    pub text: String,
}

#[function_component(StatusBar)]
pub fn status_bar(props: &StatusBarProps) -> Html {
    html! {
        <div id="status" style="position:absolute; left:12px; bottom:12px; background:rgba(22,27,34,0.9); border:1px solid #30363d; border-radius:8px; padding:6px 12px; min-width:200px; font-size:14px; pointer-events:none;">
            { props.text.clone() }
        </div>
    }
}
