use crate::dram;
use crate::profile::{Profile, TableLayout};
use log::{debug, error};
use smu_cpuid::Codename;
use smu_mailbox::{Mailbox, MailboxKind, RequestArgs, SmuError};
use smu_platform::PhysicalAddress;
use smu_smn::PciConfig;

/// Where the PM table lives and how long it is.
///
/// Architecturally static after boot.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PmTableDescriptor {
    pub primary_base: PhysicalAddress,
    pub primary_len: usize,
    pub secondary_base: Option<PhysicalAddress>,
    pub secondary_len: Option<usize>,
    /// Format identifier the length was derived from; zero for fixed layouts.
    pub version: u32,
}

impl PmTableDescriptor {
    /// Bytes a read produces: primary region, then the secondary one.
    #[must_use]
    pub const fn total_len(&self) -> usize {
        match self.secondary_len {
            Some(secondary) => self.primary_len + secondary,
            None => self.primary_len,
        }
    }
}

/// Queries the table format identifier.
///
/// # Errors
/// [`SmuError::Unsupported`] if the processor has no such query, or the
/// command's error.
pub fn table_version<C: PciConfig>(mailbox: &Mailbox<C>) -> Result<u32, SmuError> {
    let opcode = Profile::of(mailbox.codename())
        .format_query
        .ok_or(SmuError::Unsupported)?;
    let result = mailbox.execute(MailboxKind::GeneralPurpose, opcode, RequestArgs::zeroed())?;
    Ok(result.arg0())
}

/// Total table length for a codename and format identifier.
///
/// Fixed layouts ignore `version`.
#[must_use]
pub fn table_size(codename: Codename, version: u32) -> Option<usize> {
    match Profile::of(codename).layout? {
        TableLayout::Versioned(sizes) => sizes
            .iter()
            .find(|(id, _)| *id == version)
            .map(|(_, len)| *len),
        TableLayout::Split { primary, secondary } => Some(primary + secondary),
    }
}

/// Locates and sizes the PM table.
///
/// Unsupported processors fail before any command is sent.
///
/// # Errors
/// [`SmuError::Unsupported`] for processors without PM table support and for
/// unknown format identifiers; otherwise the first failing command's error.
pub fn resolve<C: PciConfig>(mailbox: &Mailbox<C>) -> Result<PmTableDescriptor, SmuError> {
    let profile = Profile::of(mailbox.codename());
    let (Some(class), Some(layout)) = (profile.dram_base, profile.layout) else {
        return Err(SmuError::Unsupported);
    };

    let base = dram::query(mailbox, class)
        .inspect_err(|err| error!("Unable to receive the DRAM base address: {err}"))?;

    let descriptor = match layout {
        TableLayout::Versioned(sizes) => {
            let version = table_version(mailbox)
                .inspect_err(|err| error!("Failed to get PM table version: {err}"))?;
            let Some(&(_, len)) = sizes.iter().find(|(id, _)| *id == version) else {
                error!("Unknown PM table version: {version:#010x}");
                return Err(SmuError::Unsupported);
            };
            PmTableDescriptor {
                primary_base: base.primary,
                primary_len: len,
                secondary_base: None,
                secondary_len: None,
                version,
            }
        }
        TableLayout::Split { primary, secondary } => {
            let (low, high) = match base.secondary {
                Some(high) => (base.primary, high),
                None => (
                    PhysicalAddress::from(base.primary.low()),
                    PhysicalAddress::from(base.primary.high()),
                ),
            };
            PmTableDescriptor {
                primary_base: low,
                primary_len: primary,
                secondary_base: Some(high),
                secondary_len: Some(secondary),
                version: 0,
            }
        }
    };

    debug!(
        "PM table at {} ({:#x} bytes), secondary {:?} ({:#x} bytes), version {:#x}",
        descriptor.primary_base,
        descriptor.primary_len,
        descriptor.secondary_base,
        descriptor.secondary_len.unwrap_or(0),
        descriptor.version
    );
    Ok(descriptor)
}
