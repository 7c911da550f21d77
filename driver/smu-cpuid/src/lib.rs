//! # AMD Ryzen Processor Identification
//!
//! Decodes the CPUID identification leaves into the closed set of processor
//! codenames the SMU driver knows how to talk to. Every other lookup in the
//! driver (mailbox addresses, opcode numbering, PM table geometry) is keyed by
//! the [`Codename`] produced here, so an unknown processor is a hard failure
//! rather than a guess.
//!
//! ## Leaves
//!
//! | Leaf | Register | Used fields |
//! |------|----------|-------------|
//! | `01h` | EAX | stepping, base/extended model, base/extended family |
//! | `8000_0001h` | EBX | `PkgType` (bits 31:28) |
//!
//! ## Usage
//!
//! ```rust
//! use smu_cpuid::{Codename, CpuidResult, CpuidSource, identify};
//!
//! struct Matisse;
//!
//! impl CpuidSource for Matisse {
//!     fn cpuid(&self, leaf: u32, _subleaf: u32) -> CpuidResult {
//!         match leaf {
//!             0x01 => CpuidResult { eax: 0x0087_0F10, ebx: 0, ecx: 0, edx: 0 },
//!             _ => CpuidResult { eax: 0, ebx: 0x2000_0000, ecx: 0, edx: 0 },
//!         }
//!     }
//! }
//!
//! let cpu = identify(&Matisse).unwrap();
//! assert_eq!(cpu.codename, Codename::Matisse);
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod codename;
mod identify;
mod leaf01h;
mod leaf80000001h;
mod raw;

pub use codename::{Codename, PackageType};
pub use identify::{IdentifyError, Processor, decode, identify};
pub use leaf01h::{LEAF_01H, Leaf1Eax};
pub use leaf80000001h::{ExtLeaf1Ebx, LEAF_8000_0001H};
pub use raw::{CpuidResult, CpuidSource};

#[cfg(all(feature = "asm", target_arch = "x86_64"))]
pub use raw::NativeCpuid;
