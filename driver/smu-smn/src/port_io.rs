//! PCI configuration mechanism #1.
//!
//! `CONFIG_ADDRESS` (`0xCF8`) selects enable bit, bus, device, function and a
//! dword-aligned register; `CONFIG_DATA` (`0xCFC`) then transfers the dword.

use crate::config::{ConfigAccessError, PciAddress, PciConfig};

const CONFIG_ADDRESS: u16 = 0xCF8;
const CONFIG_DATA: u16 = 0xCFC;
const CONFIG_ENABLE: u32 = 1 << 31;

/// Configuration space of one function, accessed through I/O ports.
#[derive(Debug)]
pub struct PortIoConfig {
    target: PciAddress,
}

impl PortIoConfig {
    /// # Safety
    /// The caller must be allowed to use `in`/`out` on `0xCF8`/`0xCFC` (CPL0
    /// or a matching IOPL/permission bitmap), and nothing else in the system
    /// may drive the mechanism #1 ports concurrently.
    #[must_use]
    pub const unsafe fn new(target: PciAddress) -> Self {
        Self { target }
    }

    #[must_use]
    pub const fn target(&self) -> PciAddress {
        self.target
    }

    fn select(&self, offset: u16) -> Result<(), ConfigAccessError> {
        if offset > 0xFC || offset & 0b11 != 0 {
            return Err(ConfigAccessError { offset });
        }

        let address = CONFIG_ENABLE
            | (u32::from(self.target.bus) << 16)
            | (u32::from(self.target.device & 0x1F) << 11)
            | (u32::from(self.target.function & 0x07) << 8)
            | u32::from(offset);

        // SAFETY: port access was granted when this value was constructed.
        unsafe { outl(CONFIG_ADDRESS, address) };
        Ok(())
    }
}

impl PciConfig for PortIoConfig {
    fn read_dword(&mut self, offset: u16) -> Result<u32, ConfigAccessError> {
        self.select(offset)?;
        // SAFETY: see `select`.
        Ok(unsafe { inl(CONFIG_DATA) })
    }

    fn write_dword(&mut self, offset: u16, value: u32) -> Result<(), ConfigAccessError> {
        self.select(offset)?;
        // SAFETY: see `select`.
        unsafe { outl(CONFIG_DATA, value) };
        Ok(())
    }
}

/// Write one dword to an I/O port.
///
/// # Safety
/// Must have I/O permission for `port`; the port must belong to the intended
/// device.
#[inline]
unsafe fn outl(port: u16, val: u32) {
    unsafe {
        core::arch::asm!(
            "out dx, eax",
            in("dx") port,
            in("eax") val,
            options(nomem, nostack, preserves_flags)
        );
    }
}

/// Read one dword from an I/O port.
///
/// # Safety
/// Must have I/O permission for `port`; the port must belong to the intended
/// device.
#[inline]
unsafe fn inl(port: u16) -> u32 {
    let v: u32;
    unsafe {
        core::arch::asm!(
            "in eax, dx",
            in("dx") port,
            out("eax") v,
            options(nomem, nostack, preserves_flags)
        );
    }
    v
}
