// Observability infrastructure: structured logging and per-operation tracing

use anyhow::Result;
use std::time::{Duration, Instant};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

/// Initialize the logging system with default level
pub fn init_logging() -> Result<()> {
    init_logging_with_level(false, false)
}

/// Initialize logging with configurable verbosity
pub fn init_logging_with_level(verbose: bool, quiet: bool) -> Result<()> {
    // Determine the filter level based on flags
    let filter_level = if quiet {
        // In quiet mode, suppress everything except errors
        EnvFilter::new("error")
    } else if verbose {
        // In verbose mode, show debug info for the service and info for others
        EnvFilter::new("changelog_service=debug,info")
    } else {
        // Default: info for the service, warnings and errors for dependencies
        EnvFilter::new("changelog_service=info,warn")
    };

    // Quiet flag takes precedence over the environment variable so that
    // --quiet always suppresses logs regardless of RUST_LOG
    let env_filter = if quiet {
        EnvFilter::new("error")
    } else if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::try_from_default_env().unwrap_or(filter_level)
    } else {
        filter_level
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(!quiet)
        .with_ansi(true);

    match tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
    {
        Ok(()) => {
            if !quiet {
                info!("Changelog service observability initialized");
            }
            Ok(())
        }
        Err(_) => {
            // Already initialized, which is fine in test environments
            Ok(())
        }
    }
}

/// Operation context for tracing a request through the system
#[derive(Debug, Clone)]
pub struct OperationContext {
    pub trace_id: Uuid,
    pub operation: String,
    pub start_time: Instant,
}

impl OperationContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            trace_id: Uuid::new_v4(),
            operation: operation.into(),
            start_time: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Execute a future with a trace context, logging start, completion and failure
pub async fn with_trace_id<F, T, E>(operation: &str, f: F) -> Result<T, E>
where
    F: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let ctx = OperationContext::new(operation);
    let trace_id = ctx.trace_id;

    info!(
        trace_id = %trace_id,
        "Starting operation: {}", operation
    );

    let result = f.await;
    let elapsed = ctx.elapsed();

    match &result {
        Ok(_) => {
            info!(
                trace_id = %trace_id,
                elapsed_ms = elapsed.as_millis(),
                "Operation completed successfully: {}", operation
            );
        }
        Err(e) => {
            error!(
                trace_id = %trace_id,
                elapsed_ms = elapsed.as_millis(),
                error = %e,
                "Operation failed: {}", operation
            );
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_with_trace_id() {
        let result = with_trace_id("test_async_op", async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            Ok::<_, anyhow::Error>(42)
        })
        .await;

        assert_eq!(result.expect("Test operation should succeed"), 42);
    }

    #[tokio::test]
    async fn test_with_trace_id_propagates_errors() {
        let result: Result<(), anyhow::Error> = with_trace_id("failing_op", async {
            anyhow::bail!("boom")
        })
        .await;

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("boom"));
    }

    #[test]
    fn test_operation_context_elapsed() {
        let ctx = OperationContext::new("ctx_test");
        std::thread::sleep(Duration::from_millis(5));
        assert!(ctx.elapsed() >= Duration::from_millis(5));
        assert_eq!(ctx.operation, "ctx_test");
    }

    #[test]
    fn test_default_logging_level() {
        // Default filter keeps service info visible while silencing dependency spam
        let filter_str = "changelog_service=info,warn";
        assert!(EnvFilter::try_new(filter_str).is_ok());
    }

    #[test]
    fn test_verbose_logging_level() {
        let filter_str = "changelog_service=debug,info";
        assert!(EnvFilter::try_new(filter_str).is_ok());
    }
}
