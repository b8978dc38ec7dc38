pub mod compositor;
pub mod session;
pub mod source;

pub use compositor::{CompositedFrame, start_frame_compositor};
pub use session::{SessionInput, start_session};
pub use source::{LandmarkSource, ScriptedSource, SourceStream, start_landmark_stream};
