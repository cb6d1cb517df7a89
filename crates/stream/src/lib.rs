//! Streaming: keeps a sliding window of city sections around a moving camera.
//!
//! # Invariants
//! - At least `min_visible_sections` sections stay ahead of the camera
//!   whenever the generation threshold allows it.
//! - A section is only evicted once it is past the trailing window.
//! - Evicted road segments go back to the pool, never to the allocator.
//!
//! The controller is driven once per frame by the host's frame callback and
//! never blocks. Stopping the callback and calling `teardown` releases
//! everything deterministically.

mod controller;
mod timer;

pub use controller::{FrameReport, SectionExtent, StreamController, StreamStats, StreamingState};
pub use timer::FrameTimer;

pub fn crate_info() -> &'static str {
    "cityscape-stream v0.1.0"
}
