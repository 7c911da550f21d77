use core::fmt;
use smu_cpuid::Codename;

/// The two independent mailboxes of the SMU.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum MailboxKind {
    /// The RSMU mailbox. Owns the PM table commands.
    GeneralPurpose,
    /// The MP1 mailbox.
    PowerManagement,
}

impl MailboxKind {
    pub const ALL: [Self; 2] = [Self::GeneralPurpose, Self::PowerManagement];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GeneralPurpose => "RSMU",
            Self::PowerManagement => "MP1",
        }
    }
}

impl fmt::Display for MailboxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// SMN addresses of one mailbox. All three are non-zero.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct MailboxAddresses {
    pub command: u32,
    pub response: u32,
    pub args: u32,
}

impl MailboxAddresses {
    const fn new(command: u32, response: u32, args: u32) -> Self {
        Self {
            command,
            response,
            args,
        }
    }

    /// SMN address of argument word `index`.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn arg(&self, index: usize) -> u32 {
        self.args + (index as u32) * 4
    }
}

const RSMU_ZEN2: MailboxAddresses = MailboxAddresses::new(0x03B1_0524, 0x03B1_0570, 0x03B1_0A40);
const RSMU_ZEN1: MailboxAddresses = MailboxAddresses::new(0x03B1_051C, 0x03B1_0568, 0x03B1_0590);
const RSMU_APU: MailboxAddresses = MailboxAddresses::new(0x03B1_0A20, 0x03B1_0A80, 0x03B1_0A88);

const MP1_V9: MailboxAddresses = MailboxAddresses::new(0x03B1_0528, 0x03B1_0564, 0x03B1_0598);
const MP1_V10: MailboxAddresses = MailboxAddresses::new(0x03B1_0528, 0x03B1_0564, 0x03B1_0998);
const MP1_V11: MailboxAddresses = MailboxAddresses::new(0x03B1_0530, 0x03B1_057C, 0x03B1_09C4);
const MP1_V12: MailboxAddresses = MailboxAddresses::new(0x03B1_0528, 0x03B1_0564, 0x03B1_0998);
const MP1_V13: MailboxAddresses = MailboxAddresses::new(0x03B1_0528, 0x03B1_0578, 0x03B1_0998);

/// Looks up the registers of mailbox `kind` on `codename`.
///
/// `None` means the mailbox is not available on that processor.
#[must_use]
pub const fn addresses(codename: Codename, kind: MailboxKind) -> Option<MailboxAddresses> {
    match kind {
        MailboxKind::GeneralPurpose => match codename {
            Codename::CastlePeak | Codename::Matisse | Codename::Vermeer | Codename::Milan => {
                Some(RSMU_ZEN2)
            }
            Codename::Colfax
            | Codename::SummitRidge
            | Codename::Threadripper
            | Codename::PinnacleRidge => Some(RSMU_ZEN1),
            Codename::Renoir
            | Codename::Picasso
            | Codename::Cezanne
            | Codename::RavenRidge
            | Codename::RavenRidge2
            | Codename::Dali => Some(RSMU_APU),
            Codename::Vangogh | Codename::Rembrandt | Codename::Undefined => None,
        },
        MailboxKind::PowerManagement => match interface_version(codename) {
            Some(InterfaceVersion::V9) => Some(MP1_V9),
            Some(InterfaceVersion::V10) => Some(MP1_V10),
            Some(InterfaceVersion::V11) => Some(MP1_V11),
            Some(InterfaceVersion::V12) => Some(MP1_V12),
            Some(InterfaceVersion::V13) => Some(MP1_V13),
            None => None,
        },
    }
}

/// Revision of the MP1 command interface.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(u8)]
pub enum InterfaceVersion {
    V9 = 0,
    V10 = 1,
    V11 = 2,
    V12 = 3,
    V13 = 4,
}

impl InterfaceVersion {
    /// The ordinal reported across the driver boundary.
    #[inline]
    #[must_use]
    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub const fn revision(self) -> u8 {
        self.ordinal() + 9
    }
}

impl fmt::Display for InterfaceVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.revision())
    }
}

#[must_use]
pub const fn interface_version(codename: Codename) -> Option<InterfaceVersion> {
    let version = match codename {
        Codename::Colfax
        | Codename::SummitRidge
        | Codename::Threadripper
        | Codename::PinnacleRidge => InterfaceVersion::V9,
        Codename::Picasso | Codename::RavenRidge | Codename::RavenRidge2 | Codename::Dali => {
            InterfaceVersion::V10
        }
        Codename::Matisse | Codename::Vermeer | Codename::CastlePeak | Codename::Milan => {
            InterfaceVersion::V11
        }
        Codename::Renoir | Codename::Cezanne => InterfaceVersion::V12,
        Codename::Vangogh | Codename::Rembrandt => InterfaceVersion::V13,
        Codename::Undefined => return None,
    };
    Some(version)
}
