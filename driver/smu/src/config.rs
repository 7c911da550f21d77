use core::time::Duration;
use smu_smn::SmnPorts;

/// Runtime tunables of the driver.
///
/// Out-of-range values are clamped, never rejected.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct SmuConfig {
    retry_budget: u32,
    refresh_interval: Duration,
    smn_ports: SmnPorts,
}

impl SmuConfig {
    pub const RETRIES_MIN: u32 = 500;
    pub const RETRIES_MAX: u32 = 32768;
    pub const RETRIES_DEFAULT: u32 = 8192;

    pub const REFRESH_INTERVAL_MIN: Duration = Duration::from_millis(1);
    pub const REFRESH_INTERVAL_MAX: Duration = Duration::from_secs(60);
    pub const REFRESH_INTERVAL_DEFAULT: Duration = Duration::from_millis(1);

    #[must_use]
    pub const fn new() -> Self {
        Self {
            retry_budget: Self::RETRIES_DEFAULT,
            refresh_interval: Self::REFRESH_INTERVAL_DEFAULT,
            smn_ports: SmnPorts::C4,
        }
    }

    /// Response register reads one mailbox transaction may spend.
    #[must_use]
    pub const fn with_retry_budget(mut self, retries: u32) -> Self {
        self.retry_budget = if retries < Self::RETRIES_MIN {
            Self::RETRIES_MIN
        } else if retries > Self::RETRIES_MAX {
            Self::RETRIES_MAX
        } else {
            retries
        };
        self
    }

    /// Minimum time between two PM table refresh commands.
    #[must_use]
    pub const fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = if interval.as_nanos() < Self::REFRESH_INTERVAL_MIN.as_nanos() {
            Self::REFRESH_INTERVAL_MIN
        } else if interval.as_nanos() > Self::REFRESH_INTERVAL_MAX.as_nanos() {
            Self::REFRESH_INTERVAL_MAX
        } else {
            interval
        };
        self
    }

    /// Configuration offsets of the SMN index/data pair.
    #[must_use]
    pub const fn with_smn_ports(mut self, ports: SmnPorts) -> Self {
        self.smn_ports = ports;
        self
    }

    #[inline]
    #[must_use]
    pub const fn retry_budget(&self) -> u32 {
        self.retry_budget
    }

    #[inline]
    #[must_use]
    pub const fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    #[inline]
    #[must_use]
    pub const fn smn_ports(&self) -> SmnPorts {
        self.smn_ports
    }
}

impl Default for SmuConfig {
    fn default() -> Self {
        Self::new()
    }
}
