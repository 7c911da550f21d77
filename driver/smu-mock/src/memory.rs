use smu_platform::{MapError, PhysicalAddress, PhysicalMapper};
use std::ptr::NonNull;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A heap block standing in for a range of physical memory.
struct Region {
    base: u64,
    ptr: NonNull<u8>,
    len: usize,
}

// SAFETY: the block is exclusively owned by the region.
unsafe impl Send for Region {}

impl Region {
    fn new(base: u64, len: usize) -> Self {
        let block: Box<[u8]> = vec![0u8; len].into_boxed_slice();
        let ptr = NonNull::new(Box::into_raw(block).cast::<u8>()).unwrap_or(NonNull::dangling());
        Self { base, ptr, len }
    }

    fn offset_of(&self, address: u64, len: usize) -> Option<usize> {
        let offset = usize::try_from(address.checked_sub(self.base)?).ok()?;
        (offset.checked_add(len)? <= self.len).then_some(offset)
    }
}

impl Drop for Region {
    fn drop(&mut self) {
        let slice = std::ptr::slice_from_raw_parts_mut(self.ptr.as_ptr(), self.len);
        // SAFETY: `ptr`/`len` came from `Box::into_raw` in `Region::new`.
        drop(unsafe { Box::from_raw(slice) });
    }
}

#[derive(Default)]
struct State {
    regions: Vec<Region>,
    live: Vec<(usize, usize)>,
    map_calls: usize,
    unmap_calls: usize,
    fail: bool,
}

impl State {
    fn locate(&self, address: u64, len: usize) -> Option<(&Region, usize)> {
        self.regions
            .iter()
            .find_map(|r| r.offset_of(address, len).map(|offset| (r, offset)))
    }
}

/// Physical memory made of explicitly added regions.
///
/// Test code plays the firmware by writing into regions; the driver reads
/// them through [`PhysicalMapper`].
#[derive(Clone, Default)]
pub struct SimulatedMemory {
    state: Arc<Mutex<State>>,
}

impl SimulatedMemory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds `len` zeroed bytes at physical address `base`.
    pub fn add_region(&self, base: u64, len: usize) {
        self.state().regions.push(Region::new(base, len));
    }

    /// Stores `bytes` at `address`.
    ///
    /// # Panics
    /// The range is not inside one region.
    pub fn write(&self, address: u64, bytes: &[u8]) {
        let dst = {
            let state = self.state();
            let (region, offset) = state
                .locate(address, bytes.len())
                .unwrap_or_else(|| panic!("no simulated memory at {address:#x}"));
            // SAFETY: the range was checked to be inside the region's block.
            unsafe { region.ptr.add(offset) }
        };
        // SAFETY: regions are never removed, so the block is still allocated.
        unsafe { std::ptr::copy_nonoverlapping(bytes.as_ptr(), dst.as_ptr(), bytes.len()) };
    }

    /// Makes every following `map` call fail.
    pub fn fail_mappings(&self, fail: bool) {
        self.state().fail = fail;
    }

    #[must_use]
    pub fn map_calls(&self) -> usize {
        self.state().map_calls
    }

    #[must_use]
    pub fn unmap_calls(&self) -> usize {
        self.state().unmap_calls
    }

    /// Mappings handed out and not yet returned.
    #[must_use]
    pub fn live_mappings(&self) -> usize {
        self.state().live.len()
    }
}

unsafe impl PhysicalMapper for SimulatedMemory {
    fn map(&self, base: PhysicalAddress, len: usize) -> Result<NonNull<u8>, MapError> {
        let mut state = self.state();
        state.map_calls += 1;
        if state.fail {
            return Err(MapError { base, len });
        }
        let (region, offset) = state
            .locate(base.as_u64(), len)
            .ok_or(MapError { base, len })?;
        // SAFETY: `offset + len` lies within the region's block.
        let ptr = unsafe { region.ptr.add(offset) };
        state.live.push((ptr.as_ptr().addr(), len));
        drop(state);
        Ok(ptr)
    }

    unsafe fn unmap(&self, ptr: NonNull<u8>, len: usize) {
        let mut state = self.state();
        state.unmap_calls += 1;
        let key = (ptr.as_ptr().addr(), len);
        let index = state
            .live
            .iter()
            .position(|m| *m == key)
            .unwrap_or_else(|| panic!("unmapping {len:#x} bytes at {ptr:p}, which is not mapped"));
        state.live.swap_remove(index);
    }
}
