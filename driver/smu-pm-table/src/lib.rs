//! # The SMU Power-Management Table
//!
//! SMU firmware periodically transfers a block of telemetry (clocks,
//! voltages, currents, temperatures) into DRAM. Reading it takes three steps,
//! all of them processor-specific:
//!
//! 1. Ask the firmware where in physical memory the table lives
//!    ([`dram_base`]).
//! 2. Work out how long it is. On some processors the length depends on the
//!    table format the firmware build uses ([`table_version`]); a few APUs
//!    split it into two disjoint regions ([`resolve`]).
//! 3. Ask the firmware to refresh it, then copy it out of the mapped region
//!    ([`PmTable::read`]).
//!
//! Everything a processor needs for these steps is captured once in a
//! [`Profile`].

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod descriptor;
mod dram;
mod profile;
mod reader;

pub use descriptor::{PmTableDescriptor, resolve, table_size, table_version};
pub use dram::{DramBase, dram_base};
pub use profile::{DramBaseClass, Profile, RefreshCommand, TableLayout};
pub use reader::PmTable;
