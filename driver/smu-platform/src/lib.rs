//! # Host Platform Seams
//!
//! The few host services the SMU driver needs beyond register access:
//!
//! | Seam | Used for |
//! |------|----------|
//! | [`PhysicalAddress`] | DRAM bases reported by firmware |
//! | [`PhysicalMapper`] / [`MappedRegion`] | making the PM table CPU-addressable |
//! | [`MonotonicClock`] | throttling PM table refresh commands |
//!
//! A kernel embedding provides `ioremap`-style mapping and its tick counter;
//! tests provide a simulated physical memory and a manual clock.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod address;
mod clock;
mod mapper;

pub use address::PhysicalAddress;
pub use clock::MonotonicClock;
pub use mapper::{MapError, MappedRegion, PhysicalMapper};
