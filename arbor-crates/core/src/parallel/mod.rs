//! Parallel search.
//!
//! A [`Controller`] runs a search on several worker threads. Workers never touch each other's
//! stacks: an idle worker is reported to the controller, which asks a busy worker to give away
//! an open alternative of its stack and forwards the resulting space. All communication goes
//! through channels; the only other shared state are the per-worker statistics.
mod channel;
mod controller;
mod engine;
mod share;
mod worker;

pub use controller::Controller;
pub use share::SharePolicy;
pub use share::ShareStrategy;
