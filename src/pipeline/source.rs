use std::{
    collections::VecDeque,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::Duration,
};

use anyhow::{Context, Result};
use crossbeam_channel::Sender;

use super::session::SessionInput;
use crate::types::LandmarkFrame;

/// Anything that yields hand landmarks frame by frame. `None` ends the
/// stream.
pub trait LandmarkSource: Send + 'static {
    fn next_frame(&mut self) -> Option<LandmarkFrame>;
}

/// Replays a fixed list of frames at a steady rate.
pub struct ScriptedSource {
    frames: VecDeque<LandmarkFrame>,
    interval: Duration,
    started: bool,
}

impl ScriptedSource {
    pub fn new(frames: Vec<LandmarkFrame>, interval: Duration) -> Self {
        Self {
            frames: frames.into(),
            interval,
            started: false,
        }
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl LandmarkSource for ScriptedSource {
    fn next_frame(&mut self) -> Option<LandmarkFrame> {
        if self.started && !self.interval.is_zero() {
            thread::sleep(self.interval);
        }
        self.started = true;
        self.frames.pop_front()
    }
}

#[derive(Debug)]
pub struct SourceStream {
    stop: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl SourceStream {
    /// Waits for the source to run dry without asking it to stop.
    pub fn join(mut self) {
        self.join_inner();
    }

    fn join_inner(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for SourceStream {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        self.join_inner();
    }
}

/// Pumps `source` into the session input channel on a dedicated thread.
/// Frames are sent with a blocking send so none are skipped.
pub fn start_landmark_stream<S: LandmarkSource>(
    mut source: S,
    input_tx: Sender<SessionInput>,
) -> Result<SourceStream> {
    let stop = Arc::new(AtomicBool::new(false));
    let stop_flag = stop.clone();

    let handle = thread::Builder::new()
        .name("landmark-source".into())
        .spawn(move || {
            let mut sent = 0usize;
            while !stop_flag.load(Ordering::Relaxed) {
                let Some(frame) = source.next_frame() else {
                    log::info!("landmark source finished after {sent} frames");
                    break;
                };
                if input_tx.send(SessionInput::Frame(frame)).is_err() {
                    log::warn!("session input closed, stopping landmark source");
                    break;
                }
                sent += 1;
            }
        })
        .context("failed to spawn landmark source thread")?;

    Ok(SourceStream {
        stop,
        handle: Some(handle),
    })
}
