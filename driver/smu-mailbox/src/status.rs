use core::fmt;

/// A non-zero value read from a mailbox response register.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum FirmwareStatus {
    Ok,
    Failed,
    UnknownCommand,
    RejectedPrerequisite,
    RejectedBusy,
    /// Any code the driver has no name for, kept verbatim.
    Other(u32),
}

impl FirmwareStatus {
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        match raw {
            response::OK => Self::Ok,
            response::FAILED => Self::Failed,
            response::UNKNOWN_COMMAND => Self::UnknownCommand,
            response::REJECTED_PREREQUISITE => Self::RejectedPrerequisite,
            response::REJECTED_BUSY => Self::RejectedBusy,
            other => Self::Other(other),
        }
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        match self {
            Self::Ok => response::OK,
            Self::Failed => response::FAILED,
            Self::UnknownCommand => response::UNKNOWN_COMMAND,
            Self::RejectedPrerequisite => response::REJECTED_PREREQUISITE,
            Self::RejectedBusy => response::REJECTED_BUSY,
            Self::Other(raw) => raw,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }
}

impl fmt::Display for FirmwareStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => f.write_str("ok"),
            Self::Failed => f.write_str("failed"),
            Self::UnknownCommand => f.write_str("unknown command"),
            Self::RejectedPrerequisite => f.write_str("prerequisite not met"),
            Self::RejectedBusy => f.write_str("busy"),
            Self::Other(raw) => write!(f, "status {raw:#04x}"),
        }
    }
}

/// Stable response codes reported to user space.
///
/// `0xFC..=0xFF` and `0x01` are produced by firmware, the rest by the driver.
pub mod response {
    pub const OK: u32 = 0x01;
    pub const FAILED: u32 = 0xFF;
    pub const UNKNOWN_COMMAND: u32 = 0xFE;
    pub const REJECTED_PREREQUISITE: u32 = 0xFD;
    pub const REJECTED_BUSY: u32 = 0xFC;
    pub const COMMAND_TIMEOUT: u32 = 0xFB;
    pub const INVALID_ARGUMENT: u32 = 0xFA;
    pub const UNSUPPORTED: u32 = 0xF9;
    pub const INSUFFICIENT_SIZE: u32 = 0xF8;
    pub const MAPPING_FAILED: u32 = 0xF7;
    pub const BUS_FAILED: u32 = 0xF6;
}
