//! # SMU Mailboxes
//!
//! An SMU mailbox is three SMN registers: a command register, a response
//! register and a block of six argument registers. A request is a fixed
//! handshake against them:
//!
//! ```text
//!   rsp != 0 ?  ── idle gate, polled
//!   rsp  = 0      clear
//!   args[0..6]    one word per register, 4 bytes apart
//!   cmd  = op     firmware starts executing
//!   rsp != 0 ?  ── completion, polled on the same retry budget
//!   args[0..6]    read back when rsp == OK
//! ```
//!
//! Which registers form a mailbox depends on the processor generation; see
//! [`addresses`]. Every transaction on every mailbox is serialized by one lock
//! held by the [`Mailbox`] engine, separate from the SMN port lock below it.

#![cfg_attr(not(any(test, doctest)), no_std)]

mod args;
mod engine;
mod error;
mod status;
mod topology;

pub use args::RequestArgs;
pub use engine::Mailbox;
pub use error::SmuError;
pub use status::{FirmwareStatus, response};
pub use topology::{InterfaceVersion, MailboxAddresses, MailboxKind, addresses, interface_version};
