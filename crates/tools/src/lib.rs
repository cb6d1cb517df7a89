//! Developer Tooling: stream inspector and placement map dumps.
//!
//! # Invariants
//! - Tools only read streaming state; they never drive a frame.

mod inspector;

pub use inspector::{SectionInfo, StreamInspector, StreamSummary};

pub fn crate_info() -> &'static str {
    "cityscape-tools v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("tools"));
    }
}
