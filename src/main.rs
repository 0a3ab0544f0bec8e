mod browser;
mod components;
mod config;
mod error;
mod format;
mod model;
mod render;
mod state;
mod style;
mod util;

use components::app::App;

fn main() {
    console_error_panic_hook::set_once();
    // The page must provide the mount point; without it nothing starts.
    match browser::element_by_id(browser::MAP_ROOT_ID) {
        Ok(root) => {
            yew::Renderer::<App>::with_root(root).render();
        }
        Err(err) => util::cerror(&format!("map not started: {err}")),
    }
}
