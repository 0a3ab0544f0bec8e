use std::cell::Cell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement, MouseEvent};
use yew::prelude::*;

use crate::render::draw_map;
use crate::state::gesture::SINGLE_CLICK_DELAY_MS;
use crate::state::map_state::KEY_PAN_PX;
use crate::state::{MapAction, MapState, PendingClick, PointerGesture};
use crate::util::cerror;

/// Zoom levels per wheel delta unit.
const WHEEL_ZOOM_RATE: f64 = 1.0 / 300.0;

#[derive(Properties, PartialEq, Clone)]
pub struct MapViewProps {
    pub state: UseReducerHandle<MapState>,
}

fn event_pixel(canvas: &HtmlCanvasElement, e: &MouseEvent) -> [f64; 2] {
    let rect = canvas.get_bounding_client_rect();
    [
        e.client_x() as f64 - rect.left(),
        e.client_y() as f64 - rect.top(),
    ]
}

#[function_component(MapView)]
pub fn map_view(props: &MapViewProps) -> Html {
    let canvas_ref = use_node_ref();
    let draw_ref = use_mut_ref(|| None::<Rc<dyn Fn()>>);
    let state_ref = use_mut_ref(|| props.state.clone());
    let gesture = use_mut_ref(PointerGesture::default);
    let pending_click = use_mut_ref(PendingClick::default);
    let image = use_mut_ref(|| None::<HtmlImageElement>);

    // Effect: refresh handle on each version then redraw
    {
        let state_ref = state_ref.clone();
        let current_handle = props.state.clone();
        let draw_ref_local = draw_ref.clone();
        use_effect_with(props.state.version, move |_| {
            *state_ref.borrow_mut() = current_handle;
            if let Some(f) = &*draw_ref_local.borrow() {
                f();
            }
            || ()
        });
    }
    // Main mount effect (image, events)
    {
        let canvas_ref = canvas_ref.clone();
        let draw_ref_setup = draw_ref.clone();
        let state_ref = state_ref.clone();
        let gesture = gesture.clone();
        let pending_click = pending_click.clone();
        let image = image.clone();
        let image_url = props.state.image.url.clone();
        use_effect_with((), move |_| -> Box<dyn FnOnce()> {
            let (Some(window), Some(canvas)) =
                (web_sys::window(), canvas_ref.cast::<HtmlCanvasElement>())
            else {
                cerror("map canvas is not mounted");
                return Box::new(|| ());
            };
            let dispatch = {
                let state_ref = state_ref.clone();
                // clone the handle first: dispatch may re-enter the effects above
                move |action: MapAction| {
                    let handle = state_ref.borrow().clone();
                    handle.dispatch(action);
                }
            };
            let apply_canvas_size = {
                let canvas = canvas.clone();
                let window = window.clone();
                let dispatch = dispatch.clone();
                move || {
                    let (width, height) = match canvas.parent_element() {
                        Some(parent) => (parent.client_width() as f64, parent.client_height() as f64),
                        None => (
                            window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(800.0),
                            window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(600.0),
                        ),
                    };
                    canvas.set_width(width.max(0.0) as u32);
                    canvas.set_height(height.max(0.0) as u32);
                    dispatch(MapAction::Resize {
                        width: canvas.width() as f64,
                        height: canvas.height() as f64,
                    });
                }
            };
            apply_canvas_size();

            let draw_closure: Rc<dyn Fn()> = {
                let canvas = canvas.clone();
                let state_ref = state_ref.clone();
                let image = image.clone();
                Rc::new(move || {
                    if !canvas.is_connected() {
                        return;
                    }
                    let Some(ctx) = canvas
                        .get_context("2d")
                        .ok()
                        .flatten()
                        .and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
                    else {
                        return;
                    };
                    let handle = state_ref.borrow();
                    draw_map(&ctx, &handle, image.borrow().as_ref());
                })
            };
            *draw_ref_setup.borrow_mut() = Some(draw_closure.clone());
            draw_closure();

            // Background image
            let onload_cb = {
                let draw = draw_closure.clone();
                Closure::wrap(Box::new(move || draw()) as Box<dyn FnMut()>)
            };
            let onerror_cb = {
                let url = image_url.clone();
                Closure::wrap(Box::new(move || {
                    cerror(&format!("background image {url} failed to load"));
                }) as Box<dyn FnMut()>)
            };
            match HtmlImageElement::new() {
                Ok(img) => {
                    img.set_onload(Some(onload_cb.as_ref().unchecked_ref()));
                    img.set_onerror(Some(onerror_cb.as_ref().unchecked_ref()));
                    img.set_src(&image_url);
                    *image.borrow_mut() = Some(img);
                }
                Err(_) => cerror("could not create the background image element"),
            }

            // Wheel zoom anchored at the cursor
            let wheel_cb = {
                let canvas_w = canvas.clone();
                let dispatch = dispatch.clone();
                Closure::wrap(Box::new(move |e: web_sys::WheelEvent| {
                    e.prevent_default();
                    let delta = (-e.delta_y() * WHEEL_ZOOM_RATE).clamp(-1.0, 1.0);
                    let anchor = event_pixel(&canvas_w, &e);
                    dispatch(MapAction::ZoomBy {
                        delta,
                        anchor: Some(anchor),
                    });
                }) as Box<dyn FnMut(_)>)
            };
            canvas
                .add_event_listener_with_callback("wheel", wheel_cb.as_ref().unchecked_ref())
                .ok();
            let mousedown_cb = {
                let canvas_d = canvas.clone();
                let gesture = gesture.clone();
                Closure::wrap(Box::new(move |e: MouseEvent| {
                    if e.button() != 0 {
                        return;
                    }
                    gesture.borrow_mut().press(event_pixel(&canvas_d, &e));
                }) as Box<dyn FnMut(_)>)
            };
            canvas
                .add_event_listener_with_callback("mousedown", mousedown_cb.as_ref().unchecked_ref())
                .ok();
            // Drag pans; otherwise hover hit-test while over the canvas
            let mousemove_cb = {
                let canvas_m = canvas.clone();
                let gesture = gesture.clone();
                let dispatch = dispatch.clone();
                Closure::wrap(Box::new(move |e: MouseEvent| {
                    let pixel = event_pixel(&canvas_m, &e);
                    let (pressed, pan) = {
                        let mut g = gesture.borrow_mut();
                        let pan = g.drag_to(pixel);
                        (g.pressed, pan)
                    };
                    let inside = pixel[0] >= 0.0
                        && pixel[1] >= 0.0
                        && pixel[0] < canvas_m.width() as f64
                        && pixel[1] < canvas_m.height() as f64;
                    match pan {
                        Some([dx, dy]) => dispatch(MapAction::PanBy { dx, dy }),
                        None if !pressed && inside => dispatch(MapAction::PointerMove { pixel }),
                        None if !pressed => dispatch(MapAction::PointerLeave),
                        None => {}
                    }
                }) as Box<dyn FnMut(_)>)
            };
            window
                .add_event_listener_with_callback("mousemove", mousemove_cb.as_ref().unchecked_ref())
                .ok();
            // Clicks wait out the double-click window; dblclick cancels them
            let click_timer: Rc<Cell<Option<i32>>> = Rc::new(Cell::new(None));
            let cancel_click = {
                let window = window.clone();
                let click_timer = click_timer.clone();
                let pending_click = pending_click.clone();
                move || {
                    if let Some(id) = click_timer.take() {
                        window.clear_timeout_with_handle(id);
                    }
                    pending_click.borrow_mut().cancel();
                }
            };
            let click_timeout_cb = {
                let click_timer = click_timer.clone();
                let pending_click = pending_click.clone();
                let dispatch = dispatch.clone();
                Closure::wrap(Box::new(move || {
                    click_timer.set(None);
                    let fired = pending_click.borrow_mut().fire();
                    if let Some(pixel) = fired {
                        dispatch(MapAction::Click { pixel });
                    }
                }) as Box<dyn FnMut()>)
            };
            let mouseup_cb = {
                let canvas_u = canvas.clone();
                let window_u = window.clone();
                let gesture = gesture.clone();
                let pending_click = pending_click.clone();
                let click_timer = click_timer.clone();
                let cancel_click = cancel_click.clone();
                let timeout_fn = click_timeout_cb
                    .as_ref()
                    .unchecked_ref::<js_sys::Function>()
                    .clone();
                Closure::wrap(Box::new(move |e: MouseEvent| {
                    let clicked = gesture.borrow_mut().release();
                    if !clicked {
                        return;
                    }
                    cancel_click();
                    pending_click.borrow_mut().arm(event_pixel(&canvas_u, &e));
                    match window_u.set_timeout_with_callback_and_timeout_and_arguments_0(
                        &timeout_fn,
                        SINGLE_CLICK_DELAY_MS,
                    ) {
                        Ok(id) => click_timer.set(Some(id)),
                        Err(_) => cerror("could not schedule the map click"),
                    }
                }) as Box<dyn FnMut(_)>)
            };
            window
                .add_event_listener_with_callback("mouseup", mouseup_cb.as_ref().unchecked_ref())
                .ok();
            let dblclick_cb = {
                let canvas_z = canvas.clone();
                let dispatch = dispatch.clone();
                let cancel_click = cancel_click.clone();
                Closure::wrap(Box::new(move |e: MouseEvent| {
                    e.prevent_default();
                    cancel_click();
                    dispatch(MapAction::ZoomBy {
                        delta: 1.0,
                        anchor: Some(event_pixel(&canvas_z, &e)),
                    });
                }) as Box<dyn FnMut(_)>)
            };
            canvas
                .add_event_listener_with_callback("dblclick", dblclick_cb.as_ref().unchecked_ref())
                .ok();
            // Keyboard pan/zoom
            let keydown_cb = {
                let dispatch = dispatch.clone();
                Closure::wrap(Box::new(move |e: web_sys::KeyboardEvent| {
                    if e.ctrl_key() || e.meta_key() || e.alt_key() {
                        return;
                    }
                    let action = match e.key().as_str() {
                        "ArrowLeft" => MapAction::PanBy { dx: KEY_PAN_PX, dy: 0.0 },
                        "ArrowRight" => MapAction::PanBy { dx: -KEY_PAN_PX, dy: 0.0 },
                        "ArrowUp" => MapAction::PanBy { dx: 0.0, dy: KEY_PAN_PX },
                        "ArrowDown" => MapAction::PanBy { dx: 0.0, dy: -KEY_PAN_PX },
                        "+" | "=" => MapAction::ZoomBy { delta: 1.0, anchor: None },
                        "-" | "_" => MapAction::ZoomBy { delta: -1.0, anchor: None },
                        _ => return,
                    };
                    e.prevent_default();
                    dispatch(action);
                }) as Box<dyn FnMut(_)>)
            };
            window
                .add_event_listener_with_callback("keydown", keydown_cb.as_ref().unchecked_ref())
                .ok();
            let resize_cb = {
                let apply_canvas_size = apply_canvas_size.clone();
                Closure::wrap(Box::new(move |_e: web_sys::Event| {
                    apply_canvas_size();
                }) as Box<dyn FnMut(_)>)
            };
            window
                .add_event_listener_with_callback("resize", resize_cb.as_ref().unchecked_ref())
                .ok();
            // Cleanup
            Box::new(move || {
                let _ = canvas.remove_event_listener_with_callback(
                    "wheel",
                    wheel_cb.as_ref().unchecked_ref(),
                );
                let _ = canvas.remove_event_listener_with_callback(
                    "mousedown",
                    mousedown_cb.as_ref().unchecked_ref(),
                );
                let _ = canvas.remove_event_listener_with_callback(
                    "dblclick",
                    dblclick_cb.as_ref().unchecked_ref(),
                );
                let _ = window.remove_event_listener_with_callback(
                    "mousemove",
                    mousemove_cb.as_ref().unchecked_ref(),
                );
                let _ = window.remove_event_listener_with_callback(
                    "mouseup",
                    mouseup_cb.as_ref().unchecked_ref(),
                );
                let _ = window.remove_event_listener_with_callback(
                    "keydown",
                    keydown_cb.as_ref().unchecked_ref(),
                );
                let _ = window.remove_event_listener_with_callback(
                    "resize",
                    resize_cb.as_ref().unchecked_ref(),
                );
                if let Some(img) = &*image.borrow() {
                    img.set_onload(None);
                    img.set_onerror(None);
                }
                cancel_click();
                *draw_ref_setup.borrow_mut() = None;
                let _keep_alive = (&onload_cb, &onerror_cb, &click_timeout_cb);
            })
        });
    }

    let cursor = if props.state.selected.is_some() {
        "pointer"
    } else {
        "grab"
    };
    html! {
        <canvas ref={canvas_ref} id="map-canvas" style={format!("display:block; width:100%; height:100%; cursor:{cursor};")}></canvas>
    }
}
