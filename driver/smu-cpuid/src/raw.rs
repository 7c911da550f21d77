/// Raw register image of one `cpuid` invocation.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
#[repr(C)]
pub struct CpuidResult {
    pub eax: u32,
    pub ebx: u32,
    pub ecx: u32,
    pub edx: u32,
}

/// Anything that can answer a CPUID query.
///
/// The native implementation executes the instruction; tests substitute a
/// scripted table.
pub trait CpuidSource {
    fn cpuid(&self, leaf: u32, subleaf: u32) -> CpuidResult;
}

impl<T: CpuidSource + ?Sized> CpuidSource for &T {
    #[inline]
    fn cpuid(&self, leaf: u32, subleaf: u32) -> CpuidResult {
        (**self).cpuid(leaf, subleaf)
    }
}

/// Executes `cpuid` on the current logical processor.
///
/// CPUID is unprivileged on `x86_64`, so unlike most register access this is
/// safe to call from any ring.
#[cfg(all(feature = "asm", target_arch = "x86_64"))]
#[derive(Debug, Copy, Clone, Default)]
pub struct NativeCpuid;

#[cfg(all(feature = "asm", target_arch = "x86_64"))]
impl CpuidSource for NativeCpuid {
    #[inline]
    #[allow(unused_assignments)]
    fn cpuid(&self, leaf: u32, subleaf: u32) -> CpuidResult {
        let (mut eax, mut ebx, mut ecx, mut edx) = (leaf, 0u32, subleaf, 0u32);
        // SAFETY: `cpuid` is available on every x86_64 processor, touches no
        // memory, and RBX is preserved around it.
        unsafe {
            core::arch::asm!(
                "push rbx",
                "cpuid",
                "mov {ebx_out:e}, ebx",
                "pop rbx",
                ebx_out = lateout(reg) ebx,
                inlateout("eax") eax,
                inlateout("ecx") ecx,
                lateout("edx") edx,
                options(nomem, preserves_flags),
            );
        }
        CpuidResult { eax, ebx, ecx, edx }
    }
}
