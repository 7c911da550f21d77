//! # AMD Ryzen SMU Driver
//!
//! Ties the driver crates together into one context per machine:
//!
//! | Concern                          | Crate           |
//! |----------------------------------|-----------------|
//! | Processor identification         | `smu-cpuid`     |
//! | SMN register access              | `smu-smn`       |
//! | Mailbox protocol                 | `smu-mailbox`   |
//! | PM table discovery and reads     | `smu-pm-table`  |
//! | Physical memory, time            | `smu-platform`  |
//!
//! [`Smu::new`] identifies the processor, checks the host bridge and finds
//! out which optional features work. A [`Session`] exposes the result as named
//! endpoints the way the kernel module does through sysfs.
//!
//! ```ignore
//! use smu::{Endpoint, Session, Smu, SmuConfig};
//! use smu_cpuid::NativeCpuid;
//! use smu_smn::{PciAddress, PortIoConfig};
//!
//! let pci = unsafe { PortIoConfig::new(PciAddress::ROOT_COMPLEX) };
//! let smu = Smu::new(&NativeCpuid, pci, mapper, clock, SmuConfig::default())?;
//! let session = Session::new(&smu);
//!
//! let mut buf = [0u8; 16];
//! let n = session.show(Endpoint::Version, &mut buf).unwrap_or(0);
//! log::info!("{}", core::str::from_utf8(&buf[..n]).unwrap_or("?"));
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]

mod config;
mod context;
mod endpoint;
mod version;

pub use config::SmuConfig;
pub use context::{Capabilities, Smu};
pub use endpoint::{
    DRIVER_VERSION, Endpoint, EndpointError, Session, SmnRequest, VersionMismatch,
    check_driver_version, decode_opcode,
};
pub use version::{SmuVersion, query_version};

pub use smu_cpuid::{Codename, Processor};
pub use smu_mailbox::{FirmwareStatus, InterfaceVersion, MailboxKind, RequestArgs, SmuError};
