use std::time::Duration;

use anyhow::Result;
use crossbeam_channel::{bounded, unbounded};
use gesture_canvas::{
    CanvasCommand, CanvasConfig, GestureCanvas, LandmarkFrame,
    pipeline::{
        ScriptedSource, SessionInput, start_frame_compositor, start_landmark_stream,
        start_session,
    },
    render::RasterCanvas,
    synthetic::{self, SyntheticHand},
};

const FRAME_INTERVAL: Duration = Duration::from_millis(33);

fn main() -> Result<()> {
    env_logger::init();

    let config = CanvasConfig::default();
    let size = config.canvas_size;

    let (input_tx, input_rx) = bounded(8);
    let (status_tx, status_rx) = unbounded();
    let (scene_tx, scene_rx) = bounded(1);

    let session = start_session(GestureCanvas::new(config), input_rx, status_tx, scene_tx)?;
    let (composited_rx, compositor) = start_frame_compositor(
        RasterCanvas::new(size.width as u32, size.height as u32),
        scene_rx,
    )?;

    let source = ScriptedSource::new(demo_script(), FRAME_INTERVAL);
    start_landmark_stream(source, input_tx.clone())?.join();

    input_tx.send(SessionInput::Command(CanvasCommand::Smoothen))?;
    drop(input_tx);

    let canvas = session
        .join()
        .map_err(|_| anyhow::anyhow!("canvas session panicked"))?;
    compositor
        .join()
        .map_err(|_| anyhow::anyhow!("compositor panicked"))?;

    for status in status_rx.try_iter() {
        println!("{} {:<9} {}", status.icon, status.name, status.description);
    }

    let rendered = composited_rx.try_iter().count();
    let view = canvas.view();
    println!(
        "{} elements, pan ({:.1}, {:.1}), zoom {:.2}, {} composited frames pending",
        canvas.elements().len(),
        view.pan_offset.x,
        view.pan_offset.y,
        view.zoom,
        rendered
    );

    Ok(())
}

/// A short session: pinch-draw a wave, lift the hand, pan with a fist,
/// then spread two hands to zoom in.
fn demo_script() -> Vec<LandmarkFrame> {
    let mut frames = Vec::new();

    for i in 0..40 {
        let t = i as f32 / 39.0;
        let x = 0.7 - 0.4 * t;
        let y = 0.5 + 0.08 * (t * std::f32::consts::TAU * 2.0).sin();
        frames.push(synthetic::frame(&[SyntheticHand::pinch().at(x, y)]));
    }
    frames.extend(std::iter::repeat_n(LandmarkFrame::empty(), 5));

    for i in 0..20 {
        let x = 0.5 - 0.005 * i as f32;
        frames.push(synthetic::frame(&[SyntheticHand::fist().at(x, 0.55)]));
    }
    frames.extend(std::iter::repeat_n(LandmarkFrame::empty(), 5));

    for i in 0..15 {
        let distance = 0.15 + 0.01 * i as f32;
        frames.push(synthetic::two_hand_frame((0.5, 0.5), distance));
    }
    frames.push(LandmarkFrame::empty());

    frames
}
