//! Physics Playground entry point
//!
//! The browser build hands off to the canvas drivers; the native build runs
//! both simulations headless and prints what the canvases would show.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    physics_playground::platform::web::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Physics Playground (native) starting...");
    log::info!("The interactive demos run in the browser - build for wasm32 with `trunk serve`");

    if let Err(e) = run_headless() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Launch, land and scrub the projectile demo without a canvas
#[cfg(not(target_arch = "wasm32"))]
fn run_headless() -> Result<(), Box<dyn std::error::Error>> {
    use physics_playground::Controls;
    use physics_playground::consts::*;
    use physics_playground::sim::{
        Arena, OscillationPreview, OscillatorConfig, PreviewFit, PreviewPlayer, Readout, SimPhase,
        SimulationCore, SpringOscillator, run_to_completion,
    };

    let controls = Controls::projectile();
    let arena = Arena::new(1280.0, 600.0)?;
    let mut core = SimulationCore::projectile(arena);
    core.launch(controls.simulation_config()?)?;

    let frames = run_to_completion(&mut core, 10_000);
    println!("\nProjectile finished after {} frames: {:?}", frames, core.phase());

    if core.phase() == SimPhase::Reversed {
        for pointer in [200.0, 600.0, 1000.0, arena.width] {
            if let Some(index) = core.scrub(pointer) {
                let readout = Readout::from_state(
                    core.current_state(),
                    core.arena(),
                    BALL_RADIUS,
                    core.config().gravity,
                );
                let rows: Vec<String> = readout
                    .rows()
                    .iter()
                    .map(|(_, label, value)| format!("{} {}", label, value))
                    .collect();
                println!("  pointer {:>6.1} -> #{:<4} {}", pointer, index, rows.join(", "));
            }
        }
        println!("  frame: {}", core.frame().to_json()?);
    }

    let mut spring = SpringOscillator::new(OscillatorConfig::default(), arena)?;
    spring.toggle_running();
    for _ in 0..200 {
        spring.step();
    }
    let energies = spring.energies();
    println!(
        "\nSpring after {:.1} s: x={:.1} KE={:.2} PE={:.2} E={:.2}",
        spring.time(),
        spring.position(),
        energies.kinetic,
        energies.potential,
        energies.total
    );

    let fit = PreviewFit::for_canvas(300.0, 150.0)?;
    let mut player = PreviewPlayer::new(fit);
    let mut preview_frames = 1;
    while player.advance() {
        preview_frames += 1;
    }
    println!(
        "\nPreview 300x150: gravity {:.4}, lands at x={:.1} after {} frames",
        fit.gravity,
        player.ball().pos.x,
        preview_frames
    );

    let swing = OscillationPreview::for_canvas(300.0, 150.0)?;
    println!(
        "Oscillation preview 300x150: amplitude {:.1} around x={:.1}",
        swing.amplitude, swing.equilibrium_x
    );

    Ok(())
}
