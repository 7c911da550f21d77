use core::fmt;
use smu_mailbox::{FirmwareStatus, Mailbox, MailboxKind, RequestArgs, SmuError};
use smu_smn::PciConfig;

/// Queries the firmware version; the same opcode on every processor.
const GET_VERSION: u32 = 0x02;

/// SMU firmware version as reported by the version query.
///
/// Renders as `major.minor.patch`, or `a.b.c.d` when the top byte is in use.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct SmuVersion(u32);

impl SmuVersion {
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn parts(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }
}

impl fmt::Display for SmuVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [top, major, minor, patch] = self.parts();
        if top == 0 {
            write!(f, "{major}.{minor}.{patch}")
        } else {
            write!(f, "{top}.{major}.{minor}.{patch}")
        }
    }
}

/// Asks mailbox `kind` for the firmware version.
///
/// Doubles as a liveness check of the mailbox.
///
/// # Errors
/// The command failed, or the firmware answered with a value that is a
/// status code rather than a version.
pub fn query_version<C: PciConfig>(
    mailbox: &Mailbox<C>,
    kind: MailboxKind,
) -> Result<SmuVersion, SmuError> {
    let result = mailbox.execute(kind, GET_VERSION, RequestArgs::with_arg0(1))?;
    match result.arg0() {
        0..=0xFF => Err(SmuError::FirmwareRejected(FirmwareStatus::Failed)),
        raw => Ok(SmuVersion(raw)),
    }
}
