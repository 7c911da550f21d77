use crate::status::{FirmwareStatus, response};
use smu_cpuid::IdentifyError;
use smu_platform::MapError;
use smu_smn::SmnError;

#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SmuError {
    #[error("SMN bus programming failed: {0}")]
    BusProgrammingFailed(#[from] SmnError),
    #[error("timed out waiting for the SMU")]
    CommandTimeout,
    #[error("SMU rejected the command: {0}")]
    FirmwareRejected(FirmwareStatus),
    #[error("not supported on this processor")]
    Unsupported,
    #[error("buffer too small, {required:#x} bytes required")]
    InsufficientSize { required: usize },
    #[error(transparent)]
    MappingFailed(#[from] MapError),
    #[error("processor identification failed: {0}")]
    IdentificationFailed(#[from] IdentifyError),
}

impl SmuError {
    /// The stable code reported for this error across the driver boundary.
    ///
    /// Identification failures happen before a driver instance exists and
    /// have no code.
    #[must_use]
    pub const fn response_code(&self) -> Option<u32> {
        let code = match self {
            Self::BusProgrammingFailed(_) => response::BUS_FAILED,
            Self::CommandTimeout => response::COMMAND_TIMEOUT,
            Self::FirmwareRejected(status) => status.raw(),
            Self::Unsupported => response::UNSUPPORTED,
            Self::InsufficientSize { .. } => response::INSUFFICIENT_SIZE,
            Self::MappingFailed(_) => response::MAPPING_FAILED,
            Self::IdentificationFailed(_) => return None,
        };
        Some(code)
    }
}
