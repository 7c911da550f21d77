use crate::address::PhysicalAddress;
use core::ptr::NonNull;

#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot map {len:#x} bytes at physical address {base}")]
pub struct MapError {
    pub base: PhysicalAddress,
    pub len: usize,
}

/// Makes physical ranges CPU-addressable.
///
/// # Safety
/// A pointer returned by [`map`](Self::map) must stay valid for volatile reads
/// of `len` bytes until it is handed back to [`unmap`](Self::unmap).
pub unsafe trait PhysicalMapper {
    /// # Errors
    /// The range cannot be mapped.
    fn map(&self, base: PhysicalAddress, len: usize) -> Result<NonNull<u8>, MapError>;

    /// # Safety
    /// `ptr` and `len` must come from a prior [`map`](Self::map) on this mapper
    /// and must not be used afterwards.
    unsafe fn unmap(&self, ptr: NonNull<u8>, len: usize);
}

unsafe impl<T: PhysicalMapper + ?Sized> PhysicalMapper for &T {
    #[inline]
    fn map(&self, base: PhysicalAddress, len: usize) -> Result<NonNull<u8>, MapError> {
        (**self).map(base, len)
    }

    #[inline]
    unsafe fn unmap(&self, ptr: NonNull<u8>, len: usize) {
        unsafe { (**self).unmap(ptr, len) }
    }
}

/// One established mapping of a physical range.
///
/// Base and length never change once mapped. The region does not unmap itself:
/// it must be handed back through [`release`](Self::release) to the mapper
/// that created it.
#[derive(Debug)]
pub struct MappedRegion {
    base: PhysicalAddress,
    ptr: NonNull<u8>,
    len: usize,
}

// SAFETY: the region is only ever read, and the memory behind it is written by
// firmware DMA, not by any thread.
unsafe impl Send for MappedRegion {}
unsafe impl Sync for MappedRegion {}

impl MappedRegion {
    /// # Errors
    /// The mapper rejected the range.
    pub fn map<M: PhysicalMapper>(
        mapper: &M,
        base: PhysicalAddress,
        len: usize,
    ) -> Result<Self, MapError> {
        let ptr = mapper.map(base, len)?;
        Ok(Self { base, ptr, len })
    }

    #[inline]
    #[must_use]
    pub const fn base(&self) -> PhysicalAddress {
        self.base
    }

    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Copies the current contents into the front of `dst`.
    ///
    /// Returns the number of bytes copied, `min(self.len(), dst.len())`.
    pub fn copy_into(&self, dst: &mut [u8]) -> usize {
        let n = self.len.min(dst.len());
        for (i, byte) in dst[..n].iter_mut().enumerate() {
            // SAFETY: `i < len`, and the mapper guarantees `len` readable bytes.
            *byte = unsafe { self.ptr.add(i).read_volatile() };
        }
        n
    }

    /// Hands the mapping back to `mapper`.
    ///
    /// # Safety
    /// `mapper` must be the mapper this region was created with.
    pub unsafe fn release<M: PhysicalMapper>(self, mapper: &M) {
        unsafe { mapper.unmap(self.ptr, self.len) }
    }
}
