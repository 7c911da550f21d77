use crate::args::RequestArgs;
use crate::error::SmuError;
use crate::status::FirmwareStatus;
use crate::topology::{MailboxAddresses, MailboxKind, addresses};
use log::{debug, warn};
use smu_cpuid::Codename;
use smu_smn::{PciConfig, Smn};
use spin::Mutex;

/// Issues mailbox requests to the SMU of one processor.
///
/// Owns the SMN space so that raw SMN access and mailbox traffic share the
/// same port lock, while whole transactions are serialized by a lock of
/// their own.
pub struct Mailbox<C> {
    smn: Smn<C>,
    codename: Codename,
    general_purpose: Option<MailboxAddresses>,
    power_management: Option<MailboxAddresses>,
    retry_budget: u32,
    transaction: Mutex<()>,
}

impl<C> Mailbox<C> {
    /// Binds the mailboxes of `codename`.
    ///
    /// `retry_budget` is the number of response register reads a single
    /// transaction may spend waiting, across both of its polling phases.
    pub fn new(smn: Smn<C>, codename: Codename, retry_budget: u32) -> Self {
        let general_purpose = addresses(codename, MailboxKind::GeneralPurpose);
        let power_management = addresses(codename, MailboxKind::PowerManagement);
        debug!(
            "SMU mailboxes for {codename}: RSMU {general_purpose:x?}, MP1 {power_management:x?}"
        );
        Self {
            smn,
            codename,
            general_purpose,
            power_management,
            retry_budget,
            transaction: Mutex::new(()),
        }
    }

    #[inline]
    pub const fn codename(&self) -> Codename {
        self.codename
    }

    #[inline]
    pub const fn retry_budget(&self) -> u32 {
        self.retry_budget
    }

    #[inline]
    pub const fn smn(&self) -> &Smn<C> {
        &self.smn
    }

    #[inline]
    pub const fn mailbox(&self, kind: MailboxKind) -> Option<MailboxAddresses> {
        match kind {
            MailboxKind::GeneralPurpose => self.general_purpose,
            MailboxKind::PowerManagement => self.power_management,
        }
    }

    pub fn into_smn(self) -> Smn<C> {
        self.smn
    }
}

impl<C: PciConfig> Mailbox<C> {
    /// Runs one request on mailbox `kind` and returns the response words.
    ///
    /// # Errors
    /// - [`SmuError::Unsupported`] if the mailbox does not exist on this
    ///   processor; no register is touched.
    /// - [`SmuError::CommandTimeout`] if the response register stayed zero for
    ///   the whole retry budget.
    /// - [`SmuError::FirmwareRejected`] with the firmware's own code for any
    ///   non-OK response.
    /// - [`SmuError::BusProgrammingFailed`] if an SMN access faulted before
    ///   completion.
    pub fn execute(
        &self,
        kind: MailboxKind,
        opcode: u32,
        args: RequestArgs,
    ) -> Result<RequestArgs, SmuError> {
        let mailbox = self.mailbox(kind).ok_or(SmuError::Unsupported)?;

        let _transaction = self.transaction.lock();
        debug!(
            "SMU {kind} request: op {opcode:#04x}, args {:08x?}",
            args.words()
        );

        let mut retries = self.retry_budget;
        self.wait_for_response(mailbox, &mut retries)?;

        self.smn.write(mailbox.response, 0)?;
        for (i, word) in args.words().iter().enumerate() {
            self.smn.write(mailbox.arg(i), *word)?;
        }
        self.smn.write(mailbox.command, opcode)?;

        let status = FirmwareStatus::from_raw(self.wait_for_response(mailbox, &mut retries)?);
        if !status.is_ok() {
            debug!("SMU {kind} response: op {opcode:#04x}, {status}");
            return Err(SmuError::FirmwareRejected(status));
        }

        let mut result = args;
        for i in 0..RequestArgs::WORDS {
            match self.smn.read(mailbox.arg(i)) {
                Ok(word) => result[i] = word,
                Err(err) => warn!("SMU {kind} response: cannot read back argument {i}: {err}"),
            }
        }
        debug!(
            "SMU {kind} response: op {opcode:#04x}, args {:08x?}",
            result.words()
        );
        Ok(result)
    }

    /// Polls the response register until it is non-zero, spending one unit of
    /// `retries` per read.
    fn wait_for_response(
        &self,
        mailbox: MailboxAddresses,
        retries: &mut u32,
    ) -> Result<u32, SmuError> {
        while *retries > 0 {
            *retries -= 1;
            let value = self.smn.read(mailbox.response)?;
            if value != 0 {
                return Ok(value);
            }
            core::hint::spin_loop();
        }
        Err(SmuError::CommandTimeout)
    }
}
