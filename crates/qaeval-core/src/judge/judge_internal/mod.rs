//! Judge orchestration internals.
//!
//! - run.rs: batch and single-candidate flow (render, cache, complete, classify)

pub(crate) mod run;
