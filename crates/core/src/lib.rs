//! TouchGuard Core - face-touch monitoring library
//!
//! This crate contains the proximity geometry, the touch-state temporal
//! state machine, the alarm lifecycle, and the stream coordination that
//! turns two independently-arriving detection streams (face boxes, hand
//! landmarks) into a debounced, time-qualified touch alert.

pub mod alarm;
pub mod detection;
pub mod monitor;
pub mod pipeline;
pub mod shared;
pub mod video;
