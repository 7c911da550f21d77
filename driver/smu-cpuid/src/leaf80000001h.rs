use bitfield_struct::bitfield;

pub const LEAF_8000_0001H: u32 = 0x8000_0001;

/// `CPUID.8000_0001H:EBX`: brand ID and package type (`CPUID_Fn80000001_EBX`).
#[bitfield(u32)]
pub struct ExtLeaf1Ebx {
    /// Brand ID (bits 15:0).
    #[bits(16)]
    pub brand_id: u16,
    /// Reserved (bits 27:16).
    #[bits(12)]
    _rsv16_27: u16,
    /// Package type (bits 31:28).
    #[bits(4)]
    pub pkg_type: u8,
}
