use std::{
    thread,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, Sender};
use image::RgbaImage;

use crate::{
    canvas::SceneSnapshot,
    render::{RasterCanvas, RenderSink},
    types::GestureLabel,
};

const MAX_COMPOSITED_FPS: u64 = 60;
const MIN_COMPOSITED_FPS: u64 = 12;
const SLOWDOWN_FACTOR: f64 = 1.25;
const RECOVERY_FACTOR: f64 = 0.85;

#[derive(Clone, Debug)]
pub struct CompositedFrame {
    pub image: RgbaImage,
    pub tool: GestureLabel,
    pub element_count: usize,
}

/// Renders the newest scene snapshot on a dedicated thread. Stale scenes
/// are skipped; the interval between renders backs off when rendering is
/// slow or the consumer falls behind.
pub fn start_frame_compositor(
    raster: RasterCanvas,
    scene_rx: Receiver<SceneSnapshot>,
) -> Result<(Receiver<CompositedFrame>, thread::JoinHandle<()>)> {
    let (tx, rx) = crossbeam_channel::bounded(1);
    let handle = thread::Builder::new()
        .name("canvas-compositor".into())
        .spawn(move || compositor_loop(raster, scene_rx, tx))
        .context("failed to spawn compositor thread")?;
    Ok((rx, handle))
}

fn compositor_loop(
    mut raster: RasterCanvas,
    scene_rx: Receiver<SceneSnapshot>,
    composited_tx: Sender<CompositedFrame>,
) {
    let min_interval = Duration::from_millis(1_000 / MAX_COMPOSITED_FPS);
    let max_interval = Duration::from_millis(1_000 / MIN_COMPOSITED_FPS);
    let mut target_interval = min_interval;

    while let Ok(mut scene) = scene_rx.recv() {
        while let Ok(newer) = scene_rx.try_recv() {
            scene = newer;
        }

        let compose_start = Instant::now();
        raster.resize(scene.size.width as u32, scene.size.height as u32);
        raster.render(&scene);
        let compose_time = compose_start.elapsed();

        let packet = CompositedFrame {
            image: raster.image().clone(),
            tool: scene.tool,
            element_count: scene.elements.len(),
        };
        let dropped_frame = composited_tx.try_send(packet).is_err();

        target_interval = next_interval(
            target_interval,
            compose_time,
            (min_interval, max_interval),
            dropped_frame,
        );
        if let Some(sleep_for) = target_interval.checked_sub(compose_time)
            && !sleep_for.is_zero()
        {
            thread::sleep(sleep_for);
        }
    }

    log::debug!("compositor stopped");
}

/// Backs off when the consumer lags or a render overruns the interval, and
/// speeds up again once a render costs under half of it.
fn next_interval(
    current: Duration,
    render_time: Duration,
    (fastest, slowest): (Duration, Duration),
    consumer_behind: bool,
) -> Duration {
    let next = if consumer_behind {
        current.mul_f64(SLOWDOWN_FACTOR)
    } else if render_time > current {
        render_time.mul_f64(SLOWDOWN_FACTOR)
    } else if render_time * 2 < current {
        current.mul_f64(RECOVERY_FACTOR)
    } else {
        current
    };
    next.clamp(fastest, slowest)
}
