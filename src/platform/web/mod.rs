//! Browser drivers
//!
//! Each demo is picked by its canvas id, so one wasm module serves every
//! page: whichever canvases are present get a driver, the rest are skipped.

mod preview;
mod projectile;
mod spring;

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlInputElement};

use super::{FrameLoop, FrameToken};
use crate::settings::ControlSpec;

const ARROW_HEAD_ANGLE: f64 = std::f64::consts::PI / 6.0;

/// A demo driven by `requestAnimationFrame`
pub(crate) trait Animated {
    fn frames(&mut self) -> &mut FrameLoop;

    /// Work for one frame. Returns whether another frame is wanted.
    fn on_frame(&mut self, time: f64) -> bool;

    /// Pause before looping once `on_frame` reports the end of a run.
    /// `None` means the demo stays stopped.
    fn loop_delay_ms(&self) -> Option<i32> {
        None
    }

    /// Back to the start of a run, called after the loop delay
    fn restart(&mut self) {}
}

pub fn run() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialised".into());
    }

    log::info!("Physics Playground starting...");

    let mut started = 0;
    if let Some((canvas, ctx)) = find_canvas("gravityCanvas") {
        projectile::start(canvas, ctx);
        started += 1;
    }
    if let Some((canvas, ctx)) = find_canvas("shmCanvas") {
        spring::start(canvas, ctx);
        started += 1;
    }
    if let Some((canvas, ctx)) = find_canvas("projectileMiniCanvas") {
        preview::start_projectile(canvas, ctx);
        started += 1;
    }
    if let Some((canvas, ctx)) = find_canvas("shmMiniCanvas") {
        preview::start_oscillation(canvas, ctx);
        started += 1;
    }

    if started == 0 {
        log::warn!("No demo canvas on this page");
    } else {
        log::info!("Physics Playground running {} demo(s)", started);
    }
}

fn find_canvas(id: &str) -> Option<(HtmlCanvasElement, CanvasRenderingContext2d)> {
    let document = web_sys::window()?.document()?;
    let canvas: HtmlCanvasElement = document.get_element_by_id(id)?.dyn_into().ok()?;
    let ctx: CanvasRenderingContext2d = canvas.get_context("2d").ok()??.dyn_into().ok()?;
    Some((canvas, ctx))
}

/// Schedule the next frame for `target`
pub(crate) fn request_frame<T: Animated + 'static>(target: Rc<RefCell<T>>) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let token = target.borrow_mut().frames().begin();
    let target_clone = target.clone();
    let closure = Closure::once(move |time: f64| {
        run_frame(target_clone, token, time);
    });
    match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
        Ok(handle) => target.borrow_mut().frames().attach(handle),
        Err(e) => log::error!("requestAnimationFrame failed: {:?}", e),
    }
    closure.forget();
}

fn run_frame<T: Animated + 'static>(target: Rc<RefCell<T>>, token: FrameToken, time: f64) {
    let (keep_going, delay) = {
        let mut t = target.borrow_mut();
        if !t.frames().accept(token) {
            return;
        }
        let keep_going = t.on_frame(time);
        (keep_going, t.loop_delay_ms())
    };

    if keep_going {
        request_frame(target);
    } else if let Some(delay_ms) = delay {
        after_delay(target, delay_ms, T::restart);
    }
}

/// Stop a loop and tell the browser to drop its pending callback
pub(crate) fn cancel_frame(frames: &mut FrameLoop) {
    if let Some(handle) = frames.cancel() {
        if let Some(window) = web_sys::window() {
            let _ = window.cancel_animation_frame(handle);
        }
    }
}

/// Run `f` once after `delay_ms`, unless the loop is cancelled or
/// rescheduled first
pub(crate) fn after_delay<T, F>(target: Rc<RefCell<T>>, delay_ms: i32, f: F)
where
    T: Animated + 'static,
    F: FnOnce(&mut T) + 'static,
{
    let Some(window) = web_sys::window() else {
        return;
    };
    let token = target.borrow_mut().frames().begin();
    let target_clone = target.clone();
    let closure = Closure::once(move || {
        let accepted = {
            let mut t = target_clone.borrow_mut();
            if t.frames().accept(token) {
                f(&mut *t);
                true
            } else {
                false
            }
        };
        if accepted {
            request_frame(target_clone);
        }
    });
    if let Err(e) = window
        .set_timeout_with_callback_and_timeout_and_arguments_0(closure.as_ref().unchecked_ref(), delay_ms)
    {
        log::error!("setTimeout failed: {:?}", e);
    }
    closure.forget();
}

pub(crate) fn window_size() -> (f32, f32) {
    let Some(window) = web_sys::window() else {
        return (0.0, 0.0);
    };
    let w = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    let h = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    (w as f32, h as f32)
}

/// Canvas-relative position of a mouse event
pub(crate) fn pointer_pos(canvas: &HtmlCanvasElement, event: &web_sys::MouseEvent) -> Vec2 {
    let rect = canvas.get_bounding_client_rect();
    Vec2::new(
        (event.client_x() as f64 - rect.left()) as f32,
        (event.client_y() as f64 - rect.top()) as f32,
    )
}

pub(crate) fn set_text(id: &str, text: &str) {
    if let Some(el) = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(id))
    {
        el.set_text_content(Some(text));
    }
}

pub(crate) fn set_info(text: &str) {
    set_text("info", text);
}

/// Fill `data-{key}` cells from readout rows
pub(crate) fn show_rows(rows: &[(&'static str, &'static str, String)]) {
    for (key, _label, value) in rows {
        set_text(&format!("data-{}", key), value);
    }
}

/// Hook every `ctrl-input-{key}` slider to `on_input(key, value)`
pub(crate) fn bind_sliders<F>(specs: &'static [ControlSpec], on_input: F)
where
    F: Fn(&'static str, f32) + Clone + 'static,
{
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };

    for spec in specs {
        let Some(input) = document
            .get_element_by_id(&format!("ctrl-input-{}", spec.key))
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        else {
            log::warn!("No slider for control {}", spec.key);
            continue;
        };
        input.set_value(&spec.initial.to_string());
        set_text(&format!("ctrl-value-{}", spec.key), &spec.format(spec.initial));

        let key = spec.key;
        let on_input = on_input.clone();
        let input_clone = input.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            on_input(key, input_clone.value_as_number() as f32);
        });
        let _ = input.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

pub(crate) fn stroke_line(ctx: &CanvasRenderingContext2d, from: Vec2, to: Vec2, color: &str, width: f64) {
    ctx.begin_path();
    ctx.move_to(from.x as f64, from.y as f64);
    ctx.line_to(to.x as f64, to.y as f64);
    ctx.set_stroke_style_str(color);
    ctx.set_line_width(width);
    ctx.stroke();
}

pub(crate) fn set_dash(ctx: &CanvasRenderingContext2d, on: f64, off: f64) {
    let dash = js_sys::Array::of2(&JsValue::from_f64(on), &JsValue::from_f64(off));
    let _ = ctx.set_line_dash(&dash);
}

pub(crate) fn clear_dash(ctx: &CanvasRenderingContext2d) {
    let _ = ctx.set_line_dash(&js_sys::Array::new());
}

/// Arrow with a two-stroke head and a label past the tip
pub(crate) fn draw_arrow(
    ctx: &CanvasRenderingContext2d,
    from: Vec2,
    to: Vec2,
    color: &str,
    head_size: f64,
    label: &str,
    label_offset: Vec2,
) {
    let (x1, y1, x2, y2) = (from.x as f64, from.y as f64, to.x as f64, to.y as f64);
    let angle = (y2 - y1).atan2(x2 - x1);

    ctx.begin_path();
    ctx.move_to(x1, y1);
    ctx.line_to(x2, y2);
    ctx.move_to(x2, y2);
    ctx.line_to(
        x2 - head_size * (angle - ARROW_HEAD_ANGLE).cos(),
        y2 - head_size * (angle - ARROW_HEAD_ANGLE).sin(),
    );
    ctx.move_to(x2, y2);
    ctx.line_to(
        x2 - head_size * (angle + ARROW_HEAD_ANGLE).cos(),
        y2 - head_size * (angle + ARROW_HEAD_ANGLE).sin(),
    );
    ctx.set_stroke_style_str(color);
    ctx.set_line_width(1.5);
    ctx.stroke();

    ctx.set_fill_style_str(color);
    let _ = ctx.fill_text(
        label,
        x2 + label_offset.x as f64,
        y2 + label_offset.y as f64,
    );
}
