//! Ambient observability stack: tracing init and a panic hook, scaled
//! down from a TUI-aware original — this crate has no TUI to suppress
//! output for.

pub mod panic_hook;
pub mod tracing;

pub use panic_hook::install_panic_hook;
pub use tracing::{init_tracing, init_tracing_with_filter};
