//! Control surface: the actions a control panel or pointer can produce.
//!
//! # Invariants
//! - Actions only write tunable fields; the streaming controller picks them
//!   up on its next frame or section build.
//! - The travel axis is never written from here.

pub mod action;
pub mod pointer;

pub use action::{ControlAction, ControlError};
pub use pointer::PointerLook;
