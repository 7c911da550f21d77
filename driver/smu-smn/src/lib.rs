//! # SMN Register Access
//!
//! The System Management Network is a 32-bit register space that is not
//! memory mapped. It is reached indirectly through an index/data register pair
//! in the configuration space of the host bridge (`00:00.0`): the SMN address
//! is written to the index register, then the data register is read or
//! written.
//!
//! ```text
//! Smn::read(addr)
//!     ↓  (bus lock held)
//! PciConfig::write_dword(index_reg, addr)
//!     ↓
//! PciConfig::read_dword(data_reg) → value
//! ```
//!
//! The two steps are not atomic, so [`Smn`] serializes them under its own
//! lock. That lock is independent from the SMU command lock because raw SMN
//! peeks and pokes do not go through a mailbox.
//!
//! ## Backends
//!
//! * [`PortIoConfig`] (feature `port-io`, `x86_64` only): PCI configuration
//!   mechanism #1 over I/O ports `0xCF8`/`0xCFC`.
//! * Anything else implementing [`PciConfig`], e.g. a simulated SMN space in
//!   tests.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod config;
#[cfg(all(feature = "port-io", target_arch = "x86_64"))]
mod port_io;
mod smn;

pub use config::{
    AMD_VENDOR_ID, ConfigAccessError, PciAddress, PciConfig, PciId, ROOT_COMPLEX_DEVICE_IDS,
};
#[cfg(all(feature = "port-io", target_arch = "x86_64"))]
pub use port_io::PortIoConfig;
pub use smn::{Smn, SmnError, SmnPorts};
