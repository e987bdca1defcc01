//! Looping mini demos on the landing page
//!
//! `#projectileMiniCanvas` replays a fitted projectile with a short pause
//! between runs; `#shmMiniCanvas` swings a block on a spring forever.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::{Animated, cancel_frame, clear_dash, request_frame, set_dash, stroke_line};
use crate::platform::FrameLoop;
use crate::sim::ConfigError;
use crate::sim::preview::{
    OscillationPreview, PREVIEW_BALL_RADIUS, PreviewFit, PreviewPlayer, SHM_PREVIEW_MASS_HEIGHT,
    SHM_PREVIEW_MASS_WIDTH, SHM_PREVIEW_WALL_X,
};

/// Pause between projectile runs
const RESTART_DELAY_MS: i32 = 500;
const SPRING_COILS: usize = 22;
const SPRING_COIL_WIDTH: f32 = 8.0;

/// Match the drawing buffer to the element's layout size
fn fit_canvas(canvas: &HtmlCanvasElement) -> (f32, f32) {
    let (w, h) = (canvas.client_width().max(0), canvas.client_height().max(0));
    canvas.set_width(w as u32);
    canvas.set_height(h as u32);
    (w as f32, h as f32)
}

/// Refit on window resize and start the loop over
fn on_resize<T, F>(demo: Rc<RefCell<T>>, refit: F)
where
    T: Animated + 'static,
    F: Fn(&mut T) -> Result<(), ConfigError> + 'static,
{
    let Some(window) = web_sys::window() else {
        return;
    };
    let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
        let ok = {
            let mut d = demo.borrow_mut();
            cancel_frame(d.frames());
            match refit(&mut *d) {
                Ok(()) => true,
                Err(e) => {
                    log::debug!("Preview hidden: {}", e);
                    false
                }
            }
        };
        if ok {
            request_frame(demo.clone());
        }
    });
    let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
    closure.forget();
}

struct ProjectilePreview {
    player: PreviewPlayer,
    path: Vec<Vec2>,
    frames: FrameLoop,
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl ProjectilePreview {
    fn refit(&mut self) -> Result<(), ConfigError> {
        let (w, h) = fit_canvas(&self.canvas);
        let fit = PreviewFit::for_canvas(w, h)?;
        self.path = fit.trajectory();
        self.player = PreviewPlayer::new(fit);
        Ok(())
    }

    fn draw(&self) {
        let ctx = &self.ctx;
        let (w, h) = (self.canvas.width() as f32, self.canvas.height() as f32);
        ctx.clear_rect(0.0, 0.0, w as f64, h as f64);

        let ground = self.player.fit().ground_y;
        stroke_line(ctx, Vec2::new(0.0, ground), Vec2::new(w, ground), "#666666", 1.0);

        if self.path.len() > 1 {
            ctx.begin_path();
            ctx.set_stroke_style_str("#aaaaaa");
            ctx.set_line_width(1.0);
            set_dash(ctx, 3.0, 3.0);
            ctx.move_to(self.path[0].x as f64, self.path[0].y as f64);
            for p in &self.path[1..] {
                ctx.line_to(p.x as f64, p.y as f64);
            }
            ctx.stroke();
            clear_dash(ctx);
        }

        let ball = self.player.ball().pos;
        ctx.begin_path();
        let _ = ctx.arc(
            ball.x as f64,
            ball.y as f64,
            PREVIEW_BALL_RADIUS as f64,
            0.0,
            std::f64::consts::TAU,
        );
        ctx.set_fill_style_str("#dddddd");
        ctx.fill();
    }
}

impl Animated for ProjectilePreview {
    fn frames(&mut self) -> &mut FrameLoop {
        &mut self.frames
    }

    fn on_frame(&mut self, _time: f64) -> bool {
        let running = self.player.advance();
        self.draw();
        running
    }

    fn loop_delay_ms(&self) -> Option<i32> {
        (!self.player.fit().is_static()).then_some(RESTART_DELAY_MS)
    }

    fn restart(&mut self) {
        self.player.restart();
    }
}

pub(super) fn start_projectile(canvas: HtmlCanvasElement, ctx: CanvasRenderingContext2d) {
    let (w, h) = fit_canvas(&canvas);
    // A hidden canvas gets a resting ball until a resize gives it room
    let fit = PreviewFit::for_canvas(w, h).unwrap_or(PreviewFit {
        start: Vec2::ZERO,
        velocity: Vec2::ZERO,
        gravity: 0.0,
        ground_y: 0.0,
    });

    let demo = Rc::new(RefCell::new(ProjectilePreview {
        path: fit.trajectory(),
        player: PreviewPlayer::new(fit),
        frames: FrameLoop::new(),
        canvas,
        ctx,
    }));

    on_resize(demo.clone(), ProjectilePreview::refit);
    if w > 0.0 && h > 0.0 {
        request_frame(demo);
    }
}

struct SpringPreview {
    preview: OscillationPreview,
    /// rAF timestamp of the first frame of this run
    started_at: Option<f64>,
    frames: FrameLoop,
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl SpringPreview {
    fn refit(&mut self) -> Result<(), ConfigError> {
        let (w, h) = fit_canvas(&self.canvas);
        self.preview = OscillationPreview::for_canvas(w, h)?;
        self.started_at = None;
        Ok(())
    }

    fn draw(&self, seconds: f32) {
        let ctx = &self.ctx;
        let (w, h) = (self.canvas.width() as f32, self.canvas.height() as f32);
        ctx.clear_rect(0.0, 0.0, w as f64, h as f64);

        stroke_line(
            ctx,
            Vec2::new(SHM_PREVIEW_WALL_X, 0.0),
            Vec2::new(SHM_PREVIEW_WALL_X, h),
            "#666666",
            1.0,
        );

        let mass = self.preview.mass_center(seconds);
        let spring_end = mass.x - SHM_PREVIEW_MASS_WIDTH / 2.0;
        let length = spring_end - SHM_PREVIEW_WALL_X;
        if length > 0.0 {
            let segment = length / (SPRING_COILS * 2) as f32;
            ctx.begin_path();
            ctx.set_stroke_style_str("#aaaaaa");
            ctx.set_line_width(1.5);
            ctx.move_to(SHM_PREVIEW_WALL_X as f64, mass.y as f64);
            for i in 0..SPRING_COILS {
                let peak = if i % 2 == 0 { SPRING_COIL_WIDTH } else { -SPRING_COIL_WIDTH };
                let x_peak = SHM_PREVIEW_WALL_X + segment * (2 * i + 1) as f32;
                let x_mid = SHM_PREVIEW_WALL_X + segment * (2 * i + 2) as f32;
                ctx.line_to(x_peak as f64, (mass.y + peak) as f64);
                ctx.line_to(x_mid as f64, mass.y as f64);
            }
            ctx.line_to(spring_end as f64, mass.y as f64);
            ctx.stroke();
        }

        ctx.begin_path();
        ctx.rect(
            (mass.x - SHM_PREVIEW_MASS_WIDTH / 2.0) as f64,
            (mass.y - SHM_PREVIEW_MASS_HEIGHT / 2.0) as f64,
            SHM_PREVIEW_MASS_WIDTH as f64,
            SHM_PREVIEW_MASS_HEIGHT as f64,
        );
        ctx.set_stroke_style_str("#dddddd");
        ctx.set_line_width(1.5);
        ctx.stroke();
    }
}

impl Animated for SpringPreview {
    fn frames(&mut self) -> &mut FrameLoop {
        &mut self.frames
    }

    fn on_frame(&mut self, time: f64) -> bool {
        let started = *self.started_at.get_or_insert(time);
        let seconds = ((time - started) / 1000.0) as f32;
        self.draw(seconds);
        !self.preview.is_static()
    }
}

pub(super) fn start_oscillation(canvas: HtmlCanvasElement, ctx: CanvasRenderingContext2d) {
    let (w, h) = fit_canvas(&canvas);
    let preview = OscillationPreview::for_canvas(w, h).unwrap_or(OscillationPreview {
        amplitude: 0.0,
        equilibrium_x: 0.0,
        center_y: 0.0,
    });

    let demo = Rc::new(RefCell::new(SpringPreview {
        preview,
        started_at: None,
        frames: FrameLoop::new(),
        canvas,
        ctx,
    }));

    on_resize(demo.clone(), SpringPreview::refit);
    if w > 0.0 && h > 0.0 {
        request_frame(demo);
    }
}
