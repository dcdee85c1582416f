//! Fixed-interval polling of long-running operations.

use std::time::Duration;

use {
    framecast_config::PollingConfig,
    tokio::time::Instant,
    tracing::{debug, info},
};

use crate::{
    error::{Error, Result},
    provider::{MediaProvider, Operation},
};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Delay between status checks.
    pub interval: Duration,
    /// `None` waits until the operation finishes.
    pub timeout: Option<Duration>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            timeout: None,
        }
    }
}

impl From<&PollingConfig> for PollConfig {
    fn from(config: &PollingConfig) -> Self {
        Self {
            interval: config.interval(),
            timeout: config.timeout(),
        }
    }
}

/// Re-fetch `operation` every `config.interval` until it finishes.
///
/// A server-reported error ends the wait immediately, even if `done` is not
/// set yet. `on_poll` is called with the 1-based attempt number before each
/// re-fetch. The last sleep is cut short so a timeout fires on time.
pub async fn wait_for_operation<P>(
    provider: &P,
    mut operation: Operation,
    config: &PollConfig,
    mut on_poll: impl FnMut(u32) + Send,
) -> Result<Operation>
where
    P: MediaProvider + ?Sized,
{
    if config.interval.is_zero() {
        return Err(Error::invalid_request("poll interval must be greater than zero"));
    }

    let started = Instant::now();
    let mut attempt = 0u32;

    loop {
        if let Some(err) = operation.error.take() {
            info!(operation = %operation.name, code = err.code, message = %err.message, "operation failed");
            return Err(Error::OperationFailed {
                code: err.code,
                message: err.message,
            });
        }
        if operation.done {
            debug!(operation = %operation.name, attempts = attempt, "operation finished");
            return Ok(operation);
        }
        let mut delay = config.interval;
        if let Some(timeout) = config.timeout {
            let waited = started.elapsed();
            if waited >= timeout {
                return Err(Error::Timeout {
                    operation: operation.name,
                    waited,
                });
            }
            delay = delay.min(timeout - waited);
        }
        if operation.name.is_empty() {
            return Err(Error::message("operation has no name to poll"));
        }

        tokio::time::sleep(delay).await;
        attempt += 1;
        on_poll(attempt);
        debug!(operation = %operation.name, attempt, "polling operation");
        operation = provider.get_operation(&operation.name).await?;
    }
}
