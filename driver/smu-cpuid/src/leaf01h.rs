use bitfield_struct::bitfield;

pub const LEAF_01H: u32 = 0x01;

/// `CPUID.01H:EAX`: version information (`CPUID_Fn00000001_EAX`).
///
/// Raw fields as laid out by the AMD APM; helpers compute the *effective*
/// family and model.
#[bitfield(u32)]
pub struct Leaf1Eax {
    /// Stepping (bits 3:0).
    #[bits(4)]
    pub stepping: u8,
    /// Base model (bits 7:4).
    #[bits(4)]
    pub base_model: u8,
    /// Base family (bits 11:8).
    #[bits(4)]
    pub base_family: u8,
    /// Reserved (bits 15:12).
    #[bits(4)]
    _rsv12_15: u8,
    /// Extended model (bits 19:16).
    #[bits(4)]
    pub ext_model: u8,
    /// Extended family (bits 27:20).
    #[bits(8)]
    pub ext_family: u16,
    /// Reserved (bits 31:28).
    #[bits(4)]
    _rsv28_31: u8,
}

impl Leaf1Eax {
    /// Effective family per AMD APM:
    /// if base family == 0x0F → base + `ext_family`, else base.
    #[inline]
    #[must_use]
    pub fn effective_family(self) -> u16 {
        let fam = u16::from(self.base_family());
        if fam == 0x0F {
            fam + self.ext_family()
        } else {
            fam
        }
    }

    /// Effective model per AMD APM:
    /// if base family == 0x0F → (`ext_model` << 4) | `base_model`, else `base_model`.
    #[inline]
    #[must_use]
    pub const fn effective_model(self) -> u8 {
        if self.base_family() == 0x0F {
            (self.ext_model() << 4) | self.base_model()
        } else {
            self.base_model()
        }
    }
}
