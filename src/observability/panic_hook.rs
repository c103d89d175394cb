//! Converts panics inside rule/scheduler closures into structured log
//! events rather than silent aborts, matching the Rule Engine's own
//! panic-to-`RuleFailure` translation (`src/rules/engine.rs`) at the
//! process level for anything that panics outside that boundary.

use std::panic::PanicHookInfo;

use tracing::error;

/// Install a panic hook that logs via `tracing::error!` instead of the
/// default stderr backtrace dump, so a crash is captured by whatever
/// `RUST_LOG` sink is configured. Call once, before `init_tracing` or
/// after — order with `init_tracing` doesn't matter since the hook only
/// runs when a panic actually occurs.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let message = extract_message(info);
        let location = info
            .location()
            .map(|loc| format!("{}:{}:{}", loc.file(), loc.line(), loc.column()));
        error!(location = location.as_deref().unwrap_or("unknown"), "{message}");
    }));
}

fn extract_message(info: &PanicHookInfo<'_>) -> String {
    if let Some(s) = info.payload().downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = info.payload().downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
