use crate::profile::{DramBaseClass, Profile};
use log::error;
use smu_mailbox::{Mailbox, MailboxKind, RequestArgs, SmuError};
use smu_platform::PhysicalAddress;
use smu_smn::PciConfig;

/// Physical location(s) of the PM table.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct DramBase {
    pub primary: PhysicalAddress,
    /// Base of the second region of a split table.
    pub secondary: Option<PhysicalAddress>,
}

/// Asks the firmware where the PM table lives.
///
/// # Errors
/// [`SmuError::Unsupported`] if the processor has no known sequence, or the
/// first failing command's error.
pub fn dram_base<C: PciConfig>(mailbox: &Mailbox<C>) -> Result<DramBase, SmuError> {
    let class = Profile::of(mailbox.codename())
        .dram_base
        .ok_or(SmuError::Unsupported)?;
    query(mailbox, class)
        .inspect_err(|err| error!("Unable to receive the DRAM base address: {err}"))
}

pub fn query<C: PciConfig>(
    mailbox: &Mailbox<C>,
    class: DramBaseClass,
) -> Result<DramBase, SmuError> {
    let send = |opcode, args| mailbox.execute(MailboxKind::GeneralPurpose, opcode, args);

    match class {
        DramBaseClass::Combined { opcode } => {
            let mut args = RequestArgs::zeroed();
            args[0] = 1;
            args[1] = 1;
            let result = send(opcode, args)?;
            Ok(DramBase {
                primary: PhysicalAddress::from_halves(result.arg0(), result.arg1()),
                secondary: None,
            })
        }
        DramBaseClass::Indirect => {
            send(0x0B, RequestArgs::zeroed())?;
            let result = send(0x0C, RequestArgs::zeroed())?;
            Ok(DramBase {
                primary: PhysicalAddress::from(result.arg0()),
                secondary: None,
            })
        }
        DramBaseClass::Split => {
            send(0x0A, RequestArgs::with_arg0(3))?;
            let primary = send(0x0B, RequestArgs::with_arg0(3))?.arg0();

            send(0x3D, RequestArgs::with_arg0(3))?;
            send(0x0A, RequestArgs::with_arg0(5))?;
            let secondary = send(0x0B, RequestArgs::with_arg0(5))?.arg0();

            Ok(DramBase {
                primary: PhysicalAddress::from(primary),
                secondary: Some(PhysicalAddress::from(secondary)),
            })
        }
    }
}
