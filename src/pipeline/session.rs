use std::thread;

use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, Sender};

use crate::{
    canvas::{CanvasCommand, GestureCanvas, SceneSnapshot},
    types::{LandmarkFrame, ToolStatus},
};

#[derive(Clone, Debug, PartialEq)]
pub enum SessionInput {
    Frame(LandmarkFrame),
    Command(CanvasCommand),
}

/// Runs the canvas session on its own thread until every input sender is
/// dropped, then hands the session back through the join handle.
pub fn start_session(
    canvas: GestureCanvas,
    input_rx: Receiver<SessionInput>,
    status_tx: Sender<ToolStatus>,
    scene_tx: Sender<SceneSnapshot>,
) -> Result<thread::JoinHandle<GestureCanvas>> {
    log::info!("starting canvas session");

    thread::Builder::new()
        .name("canvas-session".into())
        .spawn(move || run_session_loop(canvas, input_rx, status_tx, scene_tx))
        .context("failed to spawn canvas session thread")
}

// Inputs are handled strictly in arrival order. Unlike a camera preview,
// frames are never coalesced: the stability filter needs every observation.
fn run_session_loop(
    mut canvas: GestureCanvas,
    input_rx: Receiver<SessionInput>,
    status_tx: Sender<ToolStatus>,
    scene_tx: Sender<SceneSnapshot>,
) -> GestureCanvas {
    let _ = status_tx.send(canvas.tool_status());
    let mut frames = 0u64;

    while let Ok(input) = input_rx.recv() {
        match input {
            SessionInput::Frame(frame) => {
                frames += 1;
                let outcome = canvas.process_frame(&frame);
                if outcome.tool_changed {
                    let _ = status_tx.send(ToolStatus::from(outcome.tool));
                }
            }
            SessionInput::Command(command) => {
                log::debug!("applying command {command:?}");
                let before = canvas.current_tool();
                canvas.apply(command);
                if canvas.current_tool() != before {
                    let _ = status_tx.send(canvas.tool_status());
                }
            }
        }

        // Drop the scene if the renderer is still busy with the previous one.
        let _ = scene_tx.try_send(canvas.snapshot());
    }

    log::info!(
        "canvas session finished after {frames} frames with {} elements",
        canvas.elements().len()
    );
    canvas
}
