use crate::codename::{Codename, PackageType};
use crate::leaf01h::{LEAF_01H, Leaf1Eax};
use crate::leaf80000001h::{ExtLeaf1Ebx, LEAF_8000_0001H};
use crate::raw::CpuidSource;
use log::{error, info};

/// Zen, Zen+ and Zen 2.
const FAMILY_17H: u16 = 0x17;
/// Zen 3.
const FAMILY_19H: u16 = 0x19;

#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentifyError {
    #[error("unsupported processor family {family:#x}")]
    UnsupportedFamily { family: u16 },
    #[error("unknown model {model:#x} in processor family {family:#x}")]
    UnknownModel { family: u16, model: u8 },
}

/// A decoded processor signature together with its codename.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Processor {
    pub family: u16,
    pub model: u8,
    pub stepping: u8,
    pub package: PackageType,
    pub codename: Codename,
}

/// Reads the identification leaves from `source` and resolves the codename.
///
/// # Errors
/// Fails when the family/model/package triple is not in the decision table.
pub fn identify<S: CpuidSource>(source: &S) -> Result<Processor, IdentifyError> {
    let eax = Leaf1Eax::from_bits(source.cpuid(LEAF_01H, 0).eax);
    let ebx = ExtLeaf1Ebx::from_bits(source.cpuid(LEAF_8000_0001H, 0).ebx);

    let family = eax.effective_family();
    let model = eax.effective_model();
    let stepping = eax.stepping();
    let package = PackageType::from_raw(ebx.pkg_type());

    info!(
        "CPUID: family {family:#x}, model {model:#x}, stepping {stepping:#x}, package {:#x}",
        package.raw()
    );

    let codename = decode(family, model, package).inspect_err(|err| error!("CPUID: {err}"))?;
    info!("CPUID: processor codename {codename}");

    Ok(Processor {
        family,
        model,
        stepping,
        package,
        codename,
    })
}

/// The fixed (family, model, package) → codename decision table.
///
/// # Errors
/// Unknown combinations are rejected; there is no fallback codename.
pub const fn decode(
    family: u16,
    model: u8,
    package: PackageType,
) -> Result<Codename, IdentifyError> {
    let codename = match family {
        FAMILY_17H => match model {
            0x01 => match package {
                PackageType::Sp3r2 => Codename::Threadripper,
                _ => Codename::SummitRidge,
            },
            0x08 => match package {
                PackageType::Sp3r2 => Codename::Colfax,
                _ => Codename::PinnacleRidge,
            },
            0x11 => Codename::RavenRidge,
            0x18 => match package {
                PackageType::Am4 => Codename::RavenRidge2,
                _ => Codename::Picasso,
            },
            0x20 => Codename::Dali,
            0x31 => Codename::CastlePeak,
            0x60 => Codename::Renoir,
            0x71 => Codename::Matisse,
            0x90 => Codename::Vangogh,
            _ => return Err(IdentifyError::UnknownModel { family, model }),
        },
        FAMILY_19H => match model {
            0x01 => Codename::Milan,
            0x20 | 0x21 => Codename::Vermeer,
            0x40 => Codename::Rembrandt,
            0x50 => Codename::Cezanne,
            _ => return Err(IdentifyError::UnknownModel { family, model }),
        },
        _ => return Err(IdentifyError::UnsupportedFamily { family }),
    };
    Ok(codename)
}
