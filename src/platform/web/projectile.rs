//! Full-window projectile demo on `#gravityCanvas`

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent};

use super::{
    Animated, bind_sliders, clear_dash, draw_arrow, request_frame, set_dash,
    set_info, set_text, show_rows, stroke_line, window_size,
};
use crate::consts::*;
use crate::platform::{self, FrameLoop};
use crate::settings::Controls;
use crate::sim::{Arena, Readout, SimPhase, SimulationCore, VelocityArrows};

const ARROW_HEAD_SIZE: f64 = 6.0;
const GRAVITY_ARROW_LENGTH: f32 = 30.0;

struct Demo {
    core: SimulationCore,
    controls: Controls,
    frames: FrameLoop,
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl Demo {
    fn draw(&self) {
        let ctx = &self.ctx;
        let arena = self.core.arena();
        let (w, h) = (arena.width as f64, arena.height as f64);
        let ground = arena.ground_y();
        let state = self.core.current_state();
        let phase = self.core.phase();

        ctx.clear_rect(0.0, 0.0, w, h);

        stroke_line(
            ctx,
            Vec2::new(0.0, ground),
            Vec2::new(arena.width, ground),
            "#666666",
            1.0,
        );

        // Recorded flight, dashed
        let history = self.core.history();
        if phase == SimPhase::Reversed && history.len() > 1 {
            ctx.begin_path();
            ctx.set_stroke_style_str("#aaaaaa");
            ctx.set_line_width(1.5);
            set_dash(ctx, 4.0, 4.0);
            if let Some(first) = history.first() {
                ctx.move_to(first.pos.x as f64, first.pos.y as f64);
            }
            for entry in history.iter().skip(1) {
                ctx.line_to(entry.pos.x as f64, entry.pos.y as f64);
            }
            ctx.stroke();
            clear_dash(ctx);
        }

        // Ball
        ctx.begin_path();
        let _ = ctx.arc(
            state.pos.x as f64,
            state.pos.y as f64,
            BALL_RADIUS as f64,
            0.0,
            std::f64::consts::TAU,
        );
        ctx.set_fill_style_str("#222222");
        ctx.fill();
        ctx.set_stroke_style_str("#eeeeee");
        ctx.set_line_width(1.5);
        ctx.stroke();

        let ball = state.pos;
        draw_arrow(
            ctx,
            ball,
            ball + Vec2::new(0.0, GRAVITY_ARROW_LENGTH),
            "#ffc107",
            ARROW_HEAD_SIZE,
            "G",
            Vec2::new(15.0, 0.0),
        );

        if phase == SimPhase::Reversed {
            let arrows = VelocityArrows::from_state(state);
            let label_y = if state.vel.y < 0.0 { 15.0 } else { -15.0 };
            let vx_tip = ball + arrows.vx.unwrap_or(Vec2::ZERO);
            if let Some(vx) = arrows.vx {
                draw_arrow(ctx, ball, ball + vx, "#007bff", ARROW_HEAD_SIZE, "Vx", Vec2::new(0.0, label_y));
            }
            if let Some(vy) = arrows.vy {
                draw_arrow(ctx, vx_tip, vx_tip + vy, "#28a745", ARROW_HEAD_SIZE, "Vy", Vec2::new(15.0, 0.0));
            }
            if let Some(v) = arrows.v {
                draw_arrow(ctx, ball, ball + v, "#dc3545", ARROW_HEAD_SIZE, "V", Vec2::new(0.0, -label_y));
            }
        } else if let Some(v) = VelocityArrows::resultant(state) {
            draw_arrow(ctx, ball, ball + v, "#dc3545", ARROW_HEAD_SIZE, "V", Vec2::new(0.0, -15.0));
        }

        self.update_readout();
    }

    fn update_readout(&self) {
        // Outside a run the table previews the slider value
        let gravity = match self.core.phase() {
            SimPhase::Running => self.core.config().gravity,
            _ => self
                .controls
                .get("gravity")
                .unwrap_or(self.core.config().gravity),
        };
        let readout = Readout::from_state(
            self.core.current_state(),
            self.core.arena(),
            self.core.scenario().radius,
            gravity,
        );
        show_rows(&readout.rows());
    }
}

impl Animated for Demo {
    fn frames(&mut self) -> &mut FrameLoop {
        &mut self.frames
    }

    fn on_frame(&mut self, _time: f64) -> bool {
        let keep_going = self.core.step();
        self.draw();
        if !keep_going {
            match self.core.phase() {
                SimPhase::Reversed => {
                    set_info("Time reversal: move the mouse to inspect the velocity components")
                }
                SimPhase::OffScreen => set_info("The ball left the screen, click to restart"),
                _ => {}
            }
        }
        keep_going
    }
}

pub(super) fn start(canvas: HtmlCanvasElement, ctx: CanvasRenderingContext2d) {
    let (w, h) = window_size();
    canvas.set_width(w as u32);
    canvas.set_height(h as u32);
    let arena = match Arena::new(w, h) {
        Ok(arena) => arena,
        Err(e) => {
            log::error!("Projectile demo not started: {}", e);
            return;
        }
    };

    let demo = Rc::new(RefCell::new(Demo {
        core: SimulationCore::projectile(arena),
        controls: Controls::projectile(),
        frames: FrameLoop::new(),
        canvas,
        ctx,
    }));

    setup_input_handlers(demo.clone());
    setup_controls(demo.clone());

    demo.borrow().draw();
    set_info("Click anywhere to launch");
}

fn setup_input_handlers(demo: Rc<RefCell<Demo>>) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let Some(document) = window.document() else {
        return;
    };

    // Click anywhere - relaunch
    {
        let demo = demo.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
            relaunch(&demo);
        });
        let _ = document.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    // Mouse move - scrub while reversed
    {
        let demo = demo.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
            let mut d = demo.borrow_mut();
            let x = super::pointer_pos(&d.canvas, &event).x;
            if d.core.scrub(x).is_some() {
                d.draw();
            }
        });
        let _ = document.add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    // Resize - re-derive geometry, never touches history
    {
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let (w, h) = window_size();
            let mut d = demo.borrow_mut();
            d.canvas.set_width(w as u32);
            d.canvas.set_height(h as u32);
            match d.core.resize(w, h) {
                Ok(()) => d.draw(),
                Err(e) => log::warn!("Ignoring resize: {}", e),
            }
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

fn setup_controls(demo: Rc<RefCell<Demo>>) {
    let specs = demo.borrow().controls.specs();
    bind_sliders(specs, move |key, value| {
        let mut d = demo.borrow_mut();
        match d.controls.set(key, value) {
            Ok(_) => {
                let label = d.controls.display(key).unwrap_or_default();
                set_text(&format!("ctrl-value-{}", key), &label);
                // New values only apply at the next launch
                if d.core.phase() != SimPhase::Running {
                    d.update_readout();
                }
            }
            Err(e) => log::warn!("{}", e),
        }
    });
}

fn relaunch(demo: &Rc<RefCell<Demo>>) {
    {
        let mut d = demo.borrow_mut();
        let d = &mut *d;

        let result = d
            .controls
            .simulation_config()
            .map_err(|e| e.to_string())
            .and_then(|config| {
                platform::relaunch(&mut d.core, &mut d.frames, config).map_err(|e| e.to_string())
            });

        match result {
            Ok(stale) => {
                if let (Some(handle), Some(window)) = (stale, web_sys::window()) {
                    let _ = window.cancel_animation_frame(handle);
                }
            }
            Err(message) => {
                // The current run, if any, keeps its own frame loop
                set_info(&message);
                return;
            }
        }

        set_info("Click anywhere to restart");
        d.draw();
    }
    request_frame(demo.clone());
}
