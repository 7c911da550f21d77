use smu_cpuid::{Codename, CpuidResult, CpuidSource, LEAF_01H, LEAF_8000_0001H};

/// Answers the two identification leaves with fixed values; every other leaf
/// reads zero.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ScriptedCpuid {
    pub leaf1_eax: u32,
    pub ext_leaf1_ebx: u32,
}

impl ScriptedCpuid {
    #[must_use]
    pub const fn new(leaf1_eax: u32, ext_leaf1_ebx: u32) -> Self {
        Self {
            leaf1_eax,
            ext_leaf1_ebx,
        }
    }

    /// Encodes a family `0Fh`-or-later signature the way AMD processors
    /// report it.
    #[must_use]
    #[allow(clippy::cast_lossless)]
    pub const fn zen(family: u16, model: u8, stepping: u8, package: u8) -> Self {
        let ext_family = (family.saturating_sub(0xF) & 0xFF) as u32;
        let eax = (stepping as u32 & 0xF)
            | ((model as u32 & 0xF) << 4)
            | (0xF << 8)
            | (((model as u32 >> 4) & 0xF) << 16)
            | (ext_family << 20);
        Self::new(eax, (package as u32 & 0xF) << 28)
    }

    /// A representative signature of `codename`.
    #[must_use]
    pub const fn for_codename(codename: Codename) -> Option<Self> {
        let (family, model, package) = match codename {
            Codename::Colfax => (0x17, 0x08, 7),
            Codename::Renoir => (0x17, 0x60, 0),
            Codename::Picasso => (0x17, 0x18, 0),
            Codename::Matisse => (0x17, 0x71, 2),
            Codename::Threadripper => (0x17, 0x01, 7),
            Codename::CastlePeak => (0x17, 0x31, 7),
            Codename::RavenRidge => (0x17, 0x11, 0),
            Codename::RavenRidge2 => (0x17, 0x18, 2),
            Codename::SummitRidge => (0x17, 0x01, 2),
            Codename::PinnacleRidge => (0x17, 0x08, 2),
            Codename::Rembrandt => (0x19, 0x40, 0),
            Codename::Vermeer => (0x19, 0x21, 2),
            Codename::Vangogh => (0x17, 0x90, 0),
            Codename::Cezanne => (0x19, 0x50, 0),
            Codename::Milan => (0x19, 0x01, 4),
            Codename::Dali => (0x17, 0x20, 0),
            Codename::Undefined => return None,
        };
        Some(Self::zen(family, model, 0, package))
    }
}

impl CpuidSource for ScriptedCpuid {
    fn cpuid(&self, leaf: u32, _subleaf: u32) -> CpuidResult {
        match leaf {
            LEAF_01H => CpuidResult {
                eax: self.leaf1_eax,
                ..CpuidResult::default()
            },
            LEAF_8000_0001H => CpuidResult {
                ebx: self.ext_leaf1_ebx,
                ..CpuidResult::default()
            },
            _ => CpuidResult::default(),
        }
    }
}
