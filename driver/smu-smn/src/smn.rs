use crate::config::PciConfig;
use log::warn;
use spin::Mutex;

/// Configuration-space offsets of the SMN index/data register pair.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct SmnPorts {
    pub index: u16,
    pub data: u16,
}

impl SmnPorts {
    /// The pair used by default.
    pub const C4: Self = Self {
        index: 0xC4,
        data: 0xC8,
    };

    /// Equivalent pair at `0x60`/`0x64`.
    pub const LEGACY: Self = Self {
        index: 0x60,
        data: 0x64,
    };

    /// Equivalent pair at `0xB4`/`0xB8`.
    pub const B4: Self = Self {
        index: 0xB4,
        data: 0xB8,
    };
}

impl Default for SmnPorts {
    fn default() -> Self {
        Self::C4
    }
}

/// Failure to program or transfer through the index/data pair.
///
/// A failed write must be assumed not to have happened.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SmnError {
    #[error("failed to program SMN address {address:#x}")]
    ProgramAddress { address: u32 },
    #[error("failed to read SMN address {address:#x}")]
    Read { address: u32 },
    #[error("failed to write SMN address {address:#x}")]
    Write { address: u32 },
}

impl SmnError {
    #[must_use]
    pub const fn address(&self) -> u32 {
        match *self {
            Self::ProgramAddress { address } | Self::Read { address } | Self::Write { address } => {
                address
            }
        }
    }
}

/// The SMN address space behind one host bridge.
pub struct Smn<C> {
    config: Mutex<C>,
    ports: SmnPorts,
}

impl<C> Smn<C> {
    pub const fn new(config: C) -> Self {
        Self::with_ports(config, SmnPorts::C4)
    }

    pub const fn with_ports(config: C, ports: SmnPorts) -> Self {
        Self {
            config: Mutex::new(config),
            ports,
        }
    }

    #[inline]
    pub const fn ports(&self) -> SmnPorts {
        self.ports
    }

    pub fn into_inner(self) -> C {
        self.config.into_inner()
    }
}

impl<C: PciConfig> Smn<C> {
    /// Read one SMN word.
    ///
    /// # Errors
    /// Either configuration access failed.
    pub fn read(&self, address: u32) -> Result<u32, SmnError> {
        let mut config = self.config.lock();
        config
            .write_dword(self.ports.index, address)
            .map_err(|_| program_failed(address))?;
        config.read_dword(self.ports.data).map_err(|_| {
            warn!("Error reading SMN address: {address:#x}");
            SmnError::Read { address }
        })
    }

    /// Write one SMN word.
    ///
    /// # Errors
    /// Either configuration access failed.
    pub fn write(&self, address: u32, value: u32) -> Result<(), SmnError> {
        let mut config = self.config.lock();
        config
            .write_dword(self.ports.index, address)
            .map_err(|_| program_failed(address))?;
        config.write_dword(self.ports.data, value).map_err(|_| {
            warn!("Error writing SMN address: {address:#x}");
            SmnError::Write { address }
        })
    }
}

fn program_failed(address: u32) -> SmnError {
    warn!("Error programming SMN address: {address:#x}");
    SmnError::ProgramAddress { address }
}
