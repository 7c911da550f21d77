use crate::config::SmuConfig;
use crate::version::{SmuVersion, query_version};
use log::{debug, error, info};
use smu_cpuid::{Codename, CpuidSource, Processor, identify};
use smu_mailbox::{
    InterfaceVersion, Mailbox, MailboxKind, RequestArgs, SmuError, interface_version,
};
use smu_platform::{MonotonicClock, PhysicalMapper};
use smu_pm_table::{DramBase, PmTable, PmTableDescriptor, dram_base, table_version};
use smu_smn::{PciConfig, PciId, Smn};

/// Which optional parts of the driver interface work on this machine.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Capabilities {
    /// The RSMU mailbox answers commands.
    pub general_purpose: bool,
    /// Byte length of the PM table, if it can be read.
    pub pm_table_len: Option<usize>,
    /// Format identifier of the PM table, if the firmware reports a non-zero one.
    pub pm_table_version: Option<u32>,
}

impl Capabilities {
    #[inline]
    #[must_use]
    pub const fn pm_table(&self) -> bool {
        self.pm_table_len.is_some()
    }
}

/// The SMU of the processor this driver runs on.
///
/// Created once at startup; all protocol state lives here.
///
/// - `C`: configuration space of the host bridge.
/// - `M`: makes the PM table addressable.
/// - `K`: monotonic time for refresh throttling.
pub struct Smu<C, M: PhysicalMapper, K> {
    processor: Processor,
    config: SmuConfig,
    mailbox: Mailbox<C>,
    pm_table: PmTable<M, K>,
    firmware_version: SmuVersion,
    capabilities: Capabilities,
}

impl<C: PciConfig, M: PhysicalMapper, K: MonotonicClock> Smu<C, M, K> {
    /// Identifies the processor, binds its mailboxes and detects what works.
    ///
    /// No register is touched before the processor is identified.
    ///
    /// # Errors
    /// - [`SmuError::IdentificationFailed`] for unknown processors.
    /// - [`SmuError::Unsupported`] if `pci` is not a known SMU host bridge.
    /// - Any error of the MP1 version query, which must succeed.
    pub fn new<S: CpuidSource>(
        cpuid: &S,
        mut pci: C,
        mapper: M,
        clock: K,
        config: SmuConfig,
    ) -> Result<Self, SmuError> {
        let processor = identify(cpuid)?;

        let id = PciId::read(&mut pci).map_err(|err| {
            error!("Failed to read the host bridge ID: {err}");
            SmuError::Unsupported
        })?;
        if !id.is_smu_root_complex() {
            error!("Host bridge {id} is not a supported root complex");
            return Err(SmuError::Unsupported);
        }

        let codename = processor.codename;
        let mailbox = Mailbox::new(
            Smn::with_ports(pci, config.smn_ports()),
            codename,
            config.retry_budget(),
        );
        let pm_table = PmTable::new(codename, mapper, clock, config.refresh_interval());

        let firmware_version = query_version(&mailbox, MailboxKind::PowerManagement)
            .inspect_err(|err| error!("Failed to query the MP1 SMU version: {err}"))?;
        info!("SMU v{firmware_version}");

        let capabilities = detect_capabilities(&mailbox, &pm_table);
        info!(
            "SMU capabilities: RSMU {}, PM table {:?}, PM table version {:?}",
            capabilities.general_purpose, capabilities.pm_table_len, capabilities.pm_table_version
        );

        Ok(Self {
            processor,
            config,
            mailbox,
            pm_table,
            firmware_version,
            capabilities,
        })
    }

    /// Runs one mailbox request.
    ///
    /// # Errors
    /// See [`Mailbox::execute`].
    pub fn execute(
        &self,
        kind: MailboxKind,
        opcode: u32,
        args: RequestArgs,
    ) -> Result<RequestArgs, SmuError> {
        self.mailbox.execute(kind, opcode, args)
    }

    /// Reads one SMN register.
    ///
    /// # Errors
    /// [`SmuError::BusProgrammingFailed`].
    pub fn smn_read(&self, address: u32) -> Result<u32, SmuError> {
        Ok(self.mailbox.smn().read(address)?)
    }

    /// Writes one SMN register.
    ///
    /// # Errors
    /// [`SmuError::BusProgrammingFailed`].
    pub fn smn_write(&self, address: u32, value: u32) -> Result<(), SmuError> {
        Ok(self.mailbox.smn().write(address, value)?)
    }

    /// # Errors
    /// See [`dram_base`].
    pub fn dram_base(&self) -> Result<DramBase, SmuError> {
        dram_base(&self.mailbox)
    }

    /// Queries the PM table format identifier from firmware.
    ///
    /// # Errors
    /// See [`table_version`].
    pub fn pm_table_version(&self) -> Result<u32, SmuError> {
        table_version(&self.mailbox)
    }

    /// # Errors
    /// See [`PmTable::resolve`].
    pub fn pm_table_descriptor(&self) -> Result<&PmTableDescriptor, SmuError> {
        self.pm_table.resolve(&self.mailbox)
    }

    /// Bytes produced by [`read_pm_table`](Self::read_pm_table).
    ///
    /// # Errors
    /// See [`PmTable::resolve`].
    pub fn pm_table_len(&self) -> Result<usize, SmuError> {
        self.pm_table_descriptor().map(PmTableDescriptor::total_len)
    }

    /// # Errors
    /// See [`PmTable::read`].
    pub fn read_pm_table(&self, dst: &mut [u8]) -> Result<usize, SmuError> {
        self.pm_table.read(&self.mailbox, dst)
    }

    /// Forces a PM table refresh regardless of the throttle.
    ///
    /// # Errors
    /// See [`PmTable::refresh`].
    pub fn refresh_pm_table(&self) -> Result<(), SmuError> {
        self.pm_table.refresh(&self.mailbox)
    }
}

impl<C, M: PhysicalMapper, K> Smu<C, M, K> {
    #[inline]
    pub const fn processor(&self) -> &Processor {
        &self.processor
    }

    #[inline]
    pub const fn codename(&self) -> Codename {
        self.processor.codename
    }

    /// MP1 interface revision.
    #[inline]
    pub const fn interface_version(&self) -> Option<InterfaceVersion> {
        interface_version(self.processor.codename)
    }

    #[inline]
    pub const fn firmware_version(&self) -> SmuVersion {
        self.firmware_version
    }

    #[inline]
    pub const fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    #[inline]
    pub const fn config(&self) -> &SmuConfig {
        &self.config
    }

    #[inline]
    pub const fn mailbox(&self) -> &Mailbox<C> {
        &self.mailbox
    }

    /// Releases the PM table mappings; later PM table reads fail with
    /// [`SmuError::Unsupported`]. Dropping the context does the same.
    pub fn teardown(&mut self) {
        self.pm_table.teardown();
    }
}

/// Finds out whether RSMU commands and the PM table work, the way a first
/// user would: version query, refresh, format query, first read.
fn detect_capabilities<C, M, K>(mailbox: &Mailbox<C>, pm_table: &PmTable<M, K>) -> Capabilities
where
    C: PciConfig,
    M: PhysicalMapper,
    K: MonotonicClock,
{
    let mut capabilities = Capabilities::default();

    if let Err(err) = query_version(mailbox, MailboxKind::GeneralPurpose) {
        info!("RSMU mailbox disabled or not responding to commands: {err}");
        return capabilities;
    }
    capabilities.general_purpose = true;

    if let Err(err) = pm_table.refresh(mailbox) {
        debug!("PM tables are not supported on this platform: {err}");
        return capabilities;
    }

    let version = match table_version(mailbox) {
        Ok(version) => version,
        Err(SmuError::Unsupported) => 0,
        Err(err) => {
            error!("Unable to resolve the PM table version, disabling PM table access: {err}");
            return capabilities;
        }
    };

    match pm_table.prepare(mailbox) {
        Ok(descriptor) => {
            debug!("PM table readable: {:#x} bytes", descriptor.total_len());
            capabilities.pm_table_len = Some(descriptor.total_len());
            capabilities.pm_table_version = (version != 0).then_some(version);
        }
        Err(err) => error!("Failed to read the PM table, disabling PM table access: {err}"),
    }
    capabilities
}
