use std::process::ExitCode;

use dotenvy::dotenv;
use tracing::{error, info, info_span, Instrument, Span};
use uuid::Uuid;

const SERVICE: &str = "shopfront";

/// Identity of this process; lifecycle events are recorded inside it.
fn process_span() -> Span {
    info_span!(
        "process",
        service = SERVICE,
        service_id = %Uuid::new_v4(),
        pid = std::process::id(),
        version = env!("CARGO_PKG_VERSION"),
    )
}

fn install_panic_hook(span: Span) {
    std::panic::set_hook(Box::new(move |info| {
        let _entered = span.enter();
        error!(event = "panic", message = %info, "unhandled panic occurred");
    }));
}

/// `server.worker_threads` from the config file, else `TOKIO_WORKER_THREADS`.
fn worker_threads() -> Option<usize> {
    match configs::AppConfig::load_and_validate() {
        Ok(cfg) => cfg.server.worker_threads,
        Err(_) => std::env::var("TOKIO_WORKER_THREADS").ok().and_then(|v| v.parse().ok()),
    }
}

fn main() -> ExitCode {
    // .env before the subscriber so RUST_LOG and LOG_FORMAT apply
    dotenv().ok();
    common::utils::logging::init_logging_default();

    let span = process_span();
    let _entered = span.clone().entered();
    install_panic_hook(span.clone());

    let threads = worker_threads();
    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(n) = threads {
        builder.worker_threads(n);
    }
    let rt = match builder.build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    info!(event = "start", threads = threads.unwrap_or_default(), "server starting");
    let task = rt.spawn(server::run().instrument(span));
    match rt.block_on(task) {
        Ok(Ok(())) => {
            info!(event = "stop", "server stopped normally");
            ExitCode::SUCCESS
        }
        Ok(Err(e)) => {
            error!(event = "run_failed", error = %e, "server exited with an error");
            ExitCode::FAILURE
        }
        Err(e) => {
            error!(event = "task_join_error", error = %e, "server task join error");
            ExitCode::FAILURE
        }
    }
}
