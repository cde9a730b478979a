pub(crate) mod client_builder;
pub mod classify;
pub mod judge;
pub mod render;

mod dispatch;
pub use dispatch::dispatch;
