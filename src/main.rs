//! SwiftSweep CLI entry point.
//!
//! Installs the panic hook and tracing subscriber, parses arguments, and
//! dispatches to the handler in `cli::commands`. The actual pipeline logic
//! lives in `swiftsweep_core`; this binary is a thin shell over it.

use anyhow::Result;
use swiftsweep_core::cli::{parse_args, Commands};
use swiftsweep_core::observability::{init_tracing, install_panic_hook};

fn main() -> Result<()> {
    install_panic_hook();
    init_tracing();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let exit_code = runtime.block_on(run())?;
    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = parse_args();
    match cli.command {
        Commands::Scan { fail_on_critical, json } => {
            swiftsweep_core::cli::handle_scan_command(cli.home, fail_on_critical, json).await
        }
        Commands::Clean {
            dry_run,
            yes,
            min_severity,
            fail_on_critical,
        } => {
            swiftsweep_core::cli::handle_clean_command(cli.home, dry_run, yes, min_severity, fail_on_critical)
                .await
        }
        Commands::Trace { json } => swiftsweep_core::cli::handle_trace_command(cli.home, json).await,
        Commands::Audit { limit } => swiftsweep_core::cli::handle_audit_command(cli.home, limit).await,
    }
}
