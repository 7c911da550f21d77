//! # Simulated SMU Hardware
//!
//! Host-side stand-ins for everything the SMU driver touches, used by the
//! test suites of every driver crate:
//!
//! - [`SimulatedSmu`]: an SMN register file with scriptable SMU mailboxes,
//!   reachable through [`SimulatedConfig`] like the real host bridge.
//! - [`ScriptedCpuid`]: fixed identification leaves for a chosen processor.
//! - [`SimulatedMemory`]: physical memory regions the firmware "writes" the
//!   PM table into, with mapping bookkeeping.
//! - [`ManualClock`]: a monotonic clock that only moves when told to.
//!
//! Every handle is cheaply cloneable and clones share state, so a test keeps
//! one handle for inspection while the driver owns another.

#![allow(unsafe_code)]

mod clock;
mod cpuid;
mod memory;
mod smn;

pub use clock::ManualClock;
pub use cpuid::ScriptedCpuid;
pub use memory::SimulatedMemory;
pub use smn::{Command, DEFAULT_PCI_ID, SimulatedConfig, SimulatedSmu, status};
