//! Full-window spring-mass demo on `#shmCanvas`
//!
//! Drag the block to set the starting displacement, click to run or pause.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent};

use super::{
    Animated, bind_sliders, cancel_frame, clear_dash, draw_arrow, pointer_pos, request_frame,
    set_dash, set_info, set_text, show_rows, stroke_line, window_size,
};
use crate::platform::FrameLoop;
use crate::settings::{Controls, SettingsError};
use crate::sim::oscillator::{GRAPH_WIDTH, MASS_HEIGHT, MASS_WIDTH, TIME_SCALE, WALL_WIDTH};
use crate::sim::{Arena, DragStop, OscPhase, OscillatorReadout, Sample, SpringOscillator};

const WALL_HEIGHT: f32 = 200.0;
const COIL_COUNT: usize = 10;
const COIL_HEIGHT: f32 = 15.0;

const ARROW_HEAD_SIZE: f64 = 8.0;
const ARROW_THRESHOLD: f32 = 0.001;
const MAX_ARROW_LENGTH: f32 = 600.0;
const FORCE_ARROW_SCALE: f32 = 0.5;
const VELOCITY_ARROW_SCALE: f32 = 0.5;
const ACCELERATION_ARROW_SCALE: f32 = 2.0;

/// Height of the instantaneous-value axis and of the time-series band
const GRAPH_HEIGHT: f32 = 200.0;
/// Pixels per unit on the graphs, in x, v, a, F order
const GRAPH_SCALES: [f32; 4] = [1.0, 1.5, 2.5, 0.5];
const GRAPH_COLORS: [&str; 4] = ["#007bff", "#28a745", "#ffc107", "#dc3545"];
const GRAPH_LABELS: [&str; 4] = ["x", "v", "a", "F"];

const INFO_IDLE: &str = "Drag the block to set its starting position, click the canvas to start";

struct Demo {
    osc: SpringOscillator,
    controls: Controls,
    frames: FrameLoop,
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl Demo {
    fn draw(&self) {
        let ctx = &self.ctx;
        let arena = self.osc.arena();
        ctx.clear_rect(0.0, 0.0, arena.width as f64, arena.height as f64);

        let floor = self.osc.floor_y();
        let x = self.osc.position();
        let eq = self.osc.equilibrium_x();

        stroke_line(ctx, Vec2::new(0.0, floor), Vec2::new(arena.width, floor), "#999999", 2.0);

        ctx.set_fill_style_str("#444444");
        ctx.fill_rect(
            0.0,
            (floor - WALL_HEIGHT) as f64,
            WALL_WIDTH as f64,
            WALL_HEIGHT as f64,
        );

        // Equilibrium marker
        set_dash(ctx, 5.0, 5.0);
        stroke_line(ctx, Vec2::new(eq, floor - WALL_HEIGHT), Vec2::new(eq, floor), "#aaaaaa", 1.0);
        clear_dash(ctx);
        ctx.set_font("12px Arial");
        ctx.set_fill_style_str("#888888");
        ctx.set_text_align("center");
        let _ = ctx.fill_text("Equilibrium", eq as f64, (floor - WALL_HEIGHT - 10.0) as f64);

        let attach_y = floor - MASS_HEIGHT / 2.0;
        draw_spring(ctx, WALL_WIDTH, x - MASS_WIDTH / 2.0, attach_y);

        // Block
        let left = (x - MASS_WIDTH / 2.0) as f64;
        let top = (floor - MASS_HEIGHT) as f64;
        ctx.set_fill_style_str("#cccccc");
        ctx.fill_rect(left, top, MASS_WIDTH as f64, MASS_HEIGHT as f64);
        ctx.set_stroke_style_str("#000000");
        ctx.set_line_width(2.0);
        ctx.stroke_rect(left, top, MASS_WIDTH as f64, MASS_HEIGHT as f64);

        ctx.set_text_align("left");
        horizontal_arrow(ctx, x, attach_y + 20.0, self.osc.force(), FORCE_ARROW_SCALE, "#dc3545", "F");
        horizontal_arrow(ctx, x, attach_y - 20.0, self.osc.velocity(), VELOCITY_ARROW_SCALE, "#28a745", "v");
        horizontal_arrow(
            ctx,
            x,
            attach_y,
            self.osc.acceleration(),
            ACCELERATION_ARROW_SCALE,
            "#ffc107",
            "a",
        );

        self.draw_graphs(arena, floor);
        show_rows(&OscillatorReadout::from_oscillator(&self.osc).rows());
    }

    /// Instantaneous-value axis plus the rolling time series
    fn draw_graphs(&self, arena: &Arena, floor: f32) {
        let ctx = &self.ctx;
        let origin_x = arena.width / 2.0;
        let origin_y = floor + 100.0;
        let half = GRAPH_HEIGHT / 2.0;

        stroke_line(
            ctx,
            Vec2::new(origin_x, origin_y - half),
            Vec2::new(origin_x, origin_y + half),
            "#888888",
            1.0,
        );

        let current = [
            self.osc.position() - self.osc.equilibrium_x(),
            self.osc.velocity(),
            self.osc.acceleration(),
            self.osc.force(),
        ];
        for i in 0..4 {
            let y = (origin_y - current[i] * GRAPH_SCALES[i]) as f64;
            ctx.begin_path();
            let _ = ctx.arc(origin_x as f64, y, 4.0, 0.0, std::f64::consts::TAU);
            ctx.set_fill_style_str(GRAPH_COLORS[i]);
            ctx.fill();
            let label_dx = if i % 2 == 0 { -20.0 } else { 20.0 };
            let _ = ctx.fill_text(GRAPH_LABELS[i], origin_x as f64 + label_dx, y + 5.0);
        }

        // Time series: "now" at the right edge, history running left
        let axis_y = origin_y + half + 50.0;
        let start_x = origin_x - GRAPH_WIDTH / 2.0;
        let end_x = origin_x + GRAPH_WIDTH / 2.0;
        stroke_line(ctx, Vec2::new(start_x, axis_y), Vec2::new(end_x, axis_y), "#888888", 1.0);
        set_dash(ctx, 5.0, 5.0);
        stroke_line(
            ctx,
            Vec2::new(end_x, axis_y - half),
            Vec2::new(end_x, axis_y + half),
            "#aaaaaa",
            1.0,
        );
        clear_dash(ctx);

        let now = self.osc.time();
        let oldest = now - self.osc.visible_span();
        let visible: Vec<&Sample> = self.osc.samples().iter().filter(|s| s.time >= oldest).collect();
        if visible.len() < 2 {
            return;
        }

        let series: [fn(&Sample) -> f32; 4] = [
            |s| s.displacement,
            |s| s.velocity,
            |s| s.acceleration,
            |s| s.force,
        ];
        ctx.set_line_width(1.5);
        for i in 0..4 {
            ctx.begin_path();
            ctx.set_stroke_style_str(GRAPH_COLORS[i]);
            for (n, sample) in visible.iter().enumerate() {
                let px = (end_x - (now - sample.time) * TIME_SCALE) as f64;
                let py = (axis_y - series[i](*sample) * GRAPH_SCALES[i]) as f64;
                if n == 0 {
                    ctx.move_to(px, py);
                } else {
                    ctx.line_to(px, py);
                }
            }
            ctx.stroke();
        }
    }

    fn reset(&mut self) {
        cancel_frame(&mut self.frames);
        let result = self
            .controls
            .oscillator_config()
            .map_err(|e| e.to_string())
            .and_then(|config| self.osc.reset(config).map_err(|e| e.to_string()));
        match result {
            Ok(()) => set_info(INFO_IDLE),
            Err(message) => set_info(&message),
        }
        self.draw();
    }
}

impl Animated for Demo {
    fn frames(&mut self) -> &mut FrameLoop {
        &mut self.frames
    }

    fn on_frame(&mut self, _time: f64) -> bool {
        let keep_going = self.osc.step();
        self.draw();
        if self.osc.phase() == OscPhase::OffScreen {
            set_info("The block left the screen, press reset");
        }
        keep_going
    }
}

fn draw_spring(ctx: &CanvasRenderingContext2d, start_x: f32, end_x: f32, y: f32) {
    let length = end_x - start_x;
    if length <= 0.0 {
        return;
    }

    let segment = length / COIL_COUNT as f32;
    ctx.begin_path();
    ctx.set_stroke_style_str("#666666");
    ctx.set_line_width(2.0);
    ctx.move_to(start_x as f64, y as f64);
    for i in 0..=COIL_COUNT {
        let px = start_x + i as f32 * segment;
        let offset = if i == 0 || i == COIL_COUNT {
            0.0
        } else if i % 2 == 0 {
            COIL_HEIGHT
        } else {
            -COIL_HEIGHT
        };
        ctx.line_to(px as f64, (y + offset) as f64);
    }
    ctx.stroke();
}

/// Signed arrow along x, hidden when the value is negligible
fn horizontal_arrow(
    ctx: &CanvasRenderingContext2d,
    x: f32,
    y: f32,
    value: f32,
    scale: f32,
    color: &str,
    label: &str,
) {
    if value.abs() <= ARROW_THRESHOLD {
        return;
    }
    let dir = value.signum();
    let length = (value.abs() * scale).clamp(2.0, MAX_ARROW_LENGTH);
    draw_arrow(
        ctx,
        Vec2::new(x, y),
        Vec2::new(x + dir * length, y),
        color,
        ARROW_HEAD_SIZE,
        label,
        Vec2::new(dir * 10.0, -5.0),
    );
}

pub(super) fn start(canvas: HtmlCanvasElement, ctx: CanvasRenderingContext2d) {
    let (w, h) = window_size();
    canvas.set_width(w as u32);
    canvas.set_height(h as u32);

    let controls = Controls::oscillator();
    let osc = match build_oscillator(&controls, w, h) {
        Ok(osc) => osc,
        Err(e) => {
            log::error!("Spring demo not started: {}", e);
            return;
        }
    };

    let demo = Rc::new(RefCell::new(Demo {
        osc,
        controls,
        frames: FrameLoop::new(),
        canvas,
        ctx,
    }));

    setup_input_handlers(demo.clone());
    setup_controls(demo.clone());

    demo.borrow().draw();
    set_info(INFO_IDLE);
}

fn build_oscillator(controls: &Controls, w: f32, h: f32) -> Result<SpringOscillator, SettingsError> {
    let config = controls.oscillator_config()?;
    Ok(SpringOscillator::new(config, Arena::new(w, h)?)?)
}

fn setup_input_handlers(demo: Rc<RefCell<Demo>>) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let canvas = demo.borrow().canvas.clone();

    // Mouse down - grab the block
    {
        let demo = demo.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
            let mut d = demo.borrow_mut();
            let pos = pointer_pos(&d.canvas, &event);
            if d.osc.begin_drag(pos) {
                cancel_frame(&mut d.frames);
                set_info("Drag to set the starting position");
                d.draw();
            }
        });
        let _ = canvas.add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    // Mouse move - follow the pointer within the spring's limits
    {
        let demo = demo.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
            let mut d = demo.borrow_mut();
            if d.osc.phase() != OscPhase::Dragging {
                return;
            }
            let x = pointer_pos(&d.canvas, &event).x;
            match d.osc.drag_to(x) {
                Some(DragStop::OverStretched) => set_info("Stretched past the limit, drag stopped"),
                Some(DragStop::HitWall) => set_info("The block cannot pass through the wall, drag stopped"),
                Some(DragStop::OverCompressed) => set_info("Compressed past the limit, drag stopped"),
                None => {}
            }
            d.draw();
        });
        let _ = canvas.add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    // Mouse up / leave - release
    for event_name in ["mouseup", "mouseleave"] {
        let demo = demo.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
            let mut d = demo.borrow_mut();
            if d.osc.phase() == OscPhase::Dragging {
                d.osc.end_drag();
                set_info("Click the canvas to start");
                d.draw();
            }
        });
        let _ = canvas.add_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref());
        closure.forget();
    }

    // Click - run / pause
    {
        let demo = demo.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
            let phase = {
                let mut d = demo.borrow_mut();
                if d.osc.phase() == OscPhase::Dragging {
                    return;
                }
                let phase = d.osc.toggle_running();
                if phase != OscPhase::Running {
                    cancel_frame(&mut d.frames);
                }
                phase
            };
            match phase {
                OscPhase::Running => {
                    set_info("Running...");
                    request_frame(demo.clone());
                }
                OscPhase::Paused => set_info("Paused, click the canvas to continue"),
                _ => {}
            }
        });
        let _ = canvas.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    // Resize - equilibrium follows the width, run starts over
    {
        let demo = demo.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let (w, h) = window_size();
            let mut d = demo.borrow_mut();
            d.canvas.set_width(w as u32);
            d.canvas.set_height(h as u32);
            cancel_frame(&mut d.frames);
            match d.osc.resize(w, h) {
                Ok(()) => {
                    set_info(INFO_IDLE);
                    d.draw();
                }
                Err(e) => log::warn!("Ignoring resize: {}", e),
            }
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    // Reset button
    if let Some(button) = window
        .document()
        .and_then(|d| d.get_element_by_id("resetButton"))
    {
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
            demo.borrow_mut().reset();
        });
        let _ = button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

fn setup_controls(demo: Rc<RefCell<Demo>>) {
    let specs = demo.borrow().controls.specs();
    bind_sliders(specs, move |key, value| {
        let mut d = demo.borrow_mut();
        let d = &mut *d;
        if let Err(e) = d.controls.set(key, value) {
            log::warn!("{}", e);
            return;
        }
        let label = d.controls.display(key).unwrap_or_default();
        set_text(&format!("ctrl-value-{}", key), &label);

        // Mass and stiffness apply immediately, even mid-run
        match d.controls.oscillator_config() {
            Ok(config) => {
                if let Err(e) = d.osc.set_config(config) {
                    log::warn!("{}", e);
                }
            }
            Err(e) => log::warn!("{}", e),
        }
        if d.osc.phase() != OscPhase::Running {
            d.draw();
        }
    });
}
