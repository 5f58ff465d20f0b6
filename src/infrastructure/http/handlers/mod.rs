//! HTTP Handlers

mod root;
mod speech;
mod stats;
mod voices;

pub use root::*;
pub use speech::*;
pub use stats::*;
pub use voices::*;
