use core::fmt;

/// Bus/device/function triple of a PCI function.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct PciAddress {
    pub bus: u8,
    pub device: u8,
    pub function: u8,
}

impl PciAddress {
    /// The host bridge (root complex), which hosts the SMN index/data pair.
    pub const ROOT_COMPLEX: Self = Self::new(0, 0, 0);

    #[must_use]
    pub const fn new(bus: u8, device: u8, function: u8) -> Self {
        Self {
            bus,
            device,
            function,
        }
    }
}

impl fmt::Display for PciAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02x}:{:02x}.{}", self.bus, self.device, self.function)
    }
}

pub const AMD_VENDOR_ID: u16 = 0x1022;

/// Device IDs of the Zen host bridges that carry the SMN index/data pair.
pub const ROOT_COMPLEX_DEVICE_IDS: [u16; 4] = [0x1450, 0x15D0, 0x1480, 0x1630];

/// Vendor and device ID from the first configuration dword.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct PciId {
    pub vendor: u16,
    pub device: u16,
}

impl PciId {
    /// # Errors
    /// The configuration header cannot be read.
    #[allow(clippy::cast_possible_truncation)]
    pub fn read<C: PciConfig + ?Sized>(config: &mut C) -> Result<Self, ConfigAccessError> {
        let dword = config.read_dword(0x00)?;
        Ok(Self {
            vendor: dword as u16,
            device: (dword >> 16) as u16,
        })
    }

    /// Whether this is a host bridge the SMU driver knows.
    #[must_use]
    pub fn is_smu_root_complex(self) -> bool {
        self.vendor == AMD_VENDOR_ID && ROOT_COMPLEX_DEVICE_IDS.contains(&self.device)
    }
}

impl fmt::Display for PciId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x}:{:04x}", self.vendor, self.device)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
#[error("configuration space access at offset {offset:#x} failed")]
pub struct ConfigAccessError {
    pub offset: u16,
}

/// 32-bit access to the configuration space of one PCI function.
pub trait PciConfig {
    /// # Errors
    /// The underlying bus reports a fault.
    fn read_dword(&mut self, offset: u16) -> Result<u32, ConfigAccessError>;

    /// # Errors
    /// The underlying bus reports a fault.
    fn write_dword(&mut self, offset: u16, value: u32) -> Result<(), ConfigAccessError>;
}
