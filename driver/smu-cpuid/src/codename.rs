use core::fmt;

/// Processor generations with a known SMU interface.
///
/// The discriminants are the ordinals reported across the driver boundary and
/// must stay stable.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(u8)]
pub enum Codename {
    Undefined = 0,
    Colfax = 1,
    Renoir = 2,
    Picasso = 3,
    Matisse = 4,
    Threadripper = 5,
    CastlePeak = 6,
    RavenRidge = 7,
    RavenRidge2 = 8,
    SummitRidge = 9,
    PinnacleRidge = 10,
    Rembrandt = 11,
    Vermeer = 12,
    Vangogh = 13,
    Cezanne = 14,
    Milan = 15,
    Dali = 16,
}

impl Codename {
    /// Every codename the identifier can produce, in ordinal order.
    pub const SUPPORTED: [Self; 16] = [
        Self::Colfax,
        Self::Renoir,
        Self::Picasso,
        Self::Matisse,
        Self::Threadripper,
        Self::CastlePeak,
        Self::RavenRidge,
        Self::RavenRidge2,
        Self::SummitRidge,
        Self::PinnacleRidge,
        Self::Rembrandt,
        Self::Vermeer,
        Self::Vangogh,
        Self::Cezanne,
        Self::Milan,
        Self::Dali,
    ];

    #[inline]
    #[must_use]
    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub const fn from_ordinal(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Undefined),
            1..=16 => Some(Self::SUPPORTED[value as usize - 1]),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Undefined => "Undefined",
            Self::Colfax => "Colfax",
            Self::Renoir => "Renoir",
            Self::Picasso => "Picasso",
            Self::Matisse => "Matisse",
            Self::Threadripper => "Threadripper",
            Self::CastlePeak => "CastlePeak",
            Self::RavenRidge => "RavenRidge",
            Self::RavenRidge2 => "RavenRidge2",
            Self::SummitRidge => "SummitRidge",
            Self::PinnacleRidge => "PinnacleRidge",
            Self::Rembrandt => "Rembrandt",
            Self::Vermeer => "Vermeer",
            Self::Vangogh => "Vangogh",
            Self::Cezanne => "Cezanne",
            Self::Milan => "Milan",
            Self::Dali => "Dali",
        }
    }
}

impl fmt::Display for Codename {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Socket/package family from `CPUID_Fn80000001_EBX[PkgType]`.
///
/// Only the values that change a codename decision get names.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum PackageType {
    /// Mobile BGA package (`FP5`).
    Fp5,
    /// Desktop socket (`AM4`).
    Am4,
    /// Server socket (`SP3`).
    Sp3,
    /// Workstation socket (`SP3r2`/`TR4`).
    Sp3r2,
    Other(u8),
}

impl PackageType {
    #[must_use]
    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            0 => Self::Fp5,
            2 => Self::Am4,
            4 => Self::Sp3,
            7 => Self::Sp3r2,
            other => Self::Other(other),
        }
    }

    #[must_use]
    pub const fn raw(self) -> u8 {
        match self {
            Self::Fp5 => 0,
            Self::Am4 => 2,
            Self::Sp3 => 4,
            Self::Sp3r2 => 7,
            Self::Other(other) => other,
        }
    }
}
