//! Matchbox Sort entry point
//!
//! Plays one run headless on an 800x600 canvas at 60 frames per second,
//! pausing and resuming half way through, and logs the progress.
//!
//! Usage: `matchbox-sort [settings.json]`

#[cfg(not(target_arch = "wasm32"))]
fn run() -> matchbox_sort::Result<()> {
    use std::path::Path;

    use matchbox_sort::consts::FRAME_DT_MS;
    use matchbox_sort::renderer::VertexBatch;
    use matchbox_sort::sim::{Playback, Viewport};
    use matchbox_sort::Settings;

    const MAX_FRAMES: u64 = 60 * 60 * 60 * 4;

    let settings = match std::env::args().nth(1) {
        Some(path) => Settings::load(Path::new(&path))?,
        None => Settings::default(),
    };
    log::info!(
        "{} sort, {} matches, speed {}",
        settings.algorithm.as_str(),
        settings.match_size.as_str(),
        settings.effective_speed()
    );

    let viewport = Viewport::new(800.0, 600.0);
    let mut playback = Playback::new(settings, viewport)?;
    let mut batch = VertexBatch::new(viewport.width, viewport.height);
    let halfway = playback.step_count() / 2;
    let mut paused_once = false;

    playback.play()?;
    let mut frames = 0;
    while !playback.is_finished() && frames < MAX_FRAMES {
        playback.tick(FRAME_DT_MS)?;
        frames += 1;

        if !paused_once && playback.current_step() >= halfway && !playback.is_finished() {
            paused_once = true;
            playback.pause();
            // a paused run holds still
            for _ in 0..30 {
                playback.tick(FRAME_DT_MS)?;
            }
            playback.play()?;
        }

        batch.clear();
        playback.draw(&mut batch);
        if frames % 600 == 0 {
            log::info!(
                "frame {frames}: step {}/{} ({} rects, {} bytes)",
                playback.current_step(),
                playback.step_count(),
                batch.rect_count(),
                batch.as_bytes().len()
            );
        }
    }

    if !playback.is_finished() {
        log::warn!("Gave up after {frames} frames");
    }
    let matchbox = playback.matchbox();
    let heights: Vec<u32> = matchbox
        .slot_order()
        .iter()
        .filter_map(|&id| matchbox.matches().get(id).map(|m| m.value()))
        .collect();
    log::info!(
        "Done after {frames} frames ({:.1}s virtual): {heights:?}",
        matchbox.scheduler().now() / 1000.0
    );
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Matchbox Sort (native) starting...");

    if let Err(e) = run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Nothing to drive without a host page
}
