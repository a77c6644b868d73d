use std::time::Duration;

use config::{Config, Environment, Map};
use tracing::debug;

/// Environment prefix of the broker overrides (`LP_SUB_PURGE_INTERVAL`, ...).
pub const ENV_PREFIX: &str = "LP";

const KEY_PURGE_INTERVAL: &str = "sub_purge_interval";
const KEY_EVENT_BUF: &str = "sub_event_buf";
const KEY_LEASE_TOLERANCE: &str = "sub_lease_tolerance";

/// Broker tuning, read once and handed to [`LongPoll::new`].
///
/// [`LongPoll::new`]: crate::pubsub::LongPoll::new
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LongPollConfig {
    /// Period of the background sweep evicting idle subscribers.
    pub purge_interval: Duration,
    /// Capacity of every subscriber's event buffer.
    pub event_buffer: usize,
    /// Added to a subscriber's timeout to get its lease. `None` means the
    /// lease is one and a half timeouts.
    pub lease_tolerance: Option<Duration>,
}

#[derive(Debug, Default)]
pub struct LongPollConfigBuilder {
    purge_interval: Option<Duration>,
    event_buffer: Option<usize>,
    lease_tolerance: Option<Option<Duration>>,
}

////////////////////////////////////////////////////////////////////////////////
// Own methods
////////////////////////////////////////////////////////////////////////////////

impl LongPollConfig {
    pub fn builder() -> LongPollConfigBuilder {
        LongPollConfigBuilder::default()
    }

    /// Defaults overridden by the `LP_*` process environment variables.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides(None)
    }

    /// Applies `LP_SUB_PURGE_INTERVAL` (seconds), `LP_SUB_EVENT_BUF` and
    /// `LP_SUB_LEASE_TOLERANCE` (seconds, `0` disables) on top of `self`.
    ///
    /// `source` replaces the process environment when given. Values that do
    /// not parse, or zero for the interval and the buffer, are skipped and
    /// the current value stays.
    pub fn with_env_overrides(
        mut self,
        source: Option<Map<String, String>>,
    ) -> Self {
        let env = match Config::builder()
            .add_source(Environment::with_prefix(ENV_PREFIX).source(source))
            .build()
        {
            Ok(env) => env,
            Err(err) => {
                debug!(error = %err, "failed to read environment, keeping config");
                return self;
            }
        };

        if let Some(secs) = read_positive(&env, KEY_PURGE_INTERVAL) {
            self.purge_interval = Duration::from_secs(secs);
        }
        if let Some(cap) = read_positive(&env, KEY_EVENT_BUF) {
            match usize::try_from(cap) {
                Ok(cap) => self.event_buffer = cap,
                Err(_) => debug!(key = KEY_EVENT_BUF, "value out of range, ignored"),
            }
        }
        if let Some(secs) = read_u64(&env, KEY_LEASE_TOLERANCE) {
            self.lease_tolerance = (secs > 0).then(|| Duration::from_secs(secs));
        }

        self
    }

    /// Lease of a subscriber polling with `timeout`.
    ///
    /// Always longer than `timeout` for a non-zero timeout, so a subscriber
    /// outlives one full polling round.
    pub fn lease_for(
        &self,
        timeout: Duration,
    ) -> Duration {
        match self.lease_tolerance {
            Some(tolerance) if !tolerance.is_zero() => timeout + tolerance,
            _ => timeout + timeout / 2,
        }
    }
}

impl LongPollConfigBuilder {
    pub fn purge_interval(
        mut self,
        interval: Duration,
    ) -> Self {
        self.purge_interval = Some(interval);
        self
    }

    pub fn event_buffer(
        mut self,
        capacity: usize,
    ) -> Self {
        self.event_buffer = Some(capacity);
        self
    }

    pub fn lease_tolerance(
        mut self,
        tolerance: Duration,
    ) -> Self {
        self.lease_tolerance = Some(Some(tolerance));
        self
    }

    pub fn no_lease_tolerance(mut self) -> Self {
        self.lease_tolerance = Some(None);
        self
    }

    pub fn build(self) -> LongPollConfig {
        let default = LongPollConfig::default();
        LongPollConfig {
            purge_interval: self.purge_interval.unwrap_or(default.purge_interval),
            event_buffer: self.event_buffer.unwrap_or(default.event_buffer),
            lease_tolerance: self.lease_tolerance.unwrap_or(default.lease_tolerance),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Internal helpers
////////////////////////////////////////////////////////////////////////////////

fn read_u64(
    env: &Config,
    key: &str,
) -> Option<u64> {
    let raw = env.get_string(key).ok()?;
    match raw.trim().parse::<u64>() {
        Ok(v) => Some(v),
        Err(err) => {
            debug!(key, value = %raw, error = %err, "malformed override ignored");
            None
        }
    }
}

fn read_positive(
    env: &Config,
    key: &str,
) -> Option<u64> {
    read_u64(env, key).filter(|v| {
        if *v == 0 {
            debug!(key, "zero override ignored");
        }
        *v > 0
    })
}

////////////////////////////////////////////////////////////////////////////////
// Trait implementations for LongPollConfig
////////////////////////////////////////////////////////////////////////////////

impl Default for LongPollConfig {
    fn default() -> Self {
        Self {
            purge_interval: Duration::from_secs(1), // sweep every second
            event_buffer: 8 * 1024,                 // 8192 pending events
            lease_tolerance: None,                  // lease = timeout * 1.5
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
