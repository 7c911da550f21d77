use crate::descriptor::{self, PmTableDescriptor};
use crate::profile::Profile;
use core::time::Duration;
use log::{debug, error, warn};
use smu_cpuid::Codename;
use smu_mailbox::{Mailbox, MailboxKind, RequestArgs, SmuError};
use smu_platform::{MappedRegion, MonotonicClock, PhysicalMapper};
use smu_smn::PciConfig;
use spin::{Mutex, Once};

struct Mapping {
    primary: MappedRegion,
    secondary: Option<MappedRegion>,
}

/// Cached access to the PM table of one processor.
///
/// The descriptor is resolved on first use and the regions are mapped on
/// first read; neither is ever redone. Mappings are returned to `M` on
/// [`teardown`](Self::teardown) or drop, after which the table cannot be read.
pub struct PmTable<M: PhysicalMapper, K> {
    profile: Profile,
    mapper: M,
    clock: K,
    refresh_interval: Duration,
    descriptor: Once<PmTableDescriptor>,
    last_refresh: Mutex<Option<Duration>>,
    mapping: Once<Mapping>,
    torn_down: bool,
}

impl<M: PhysicalMapper, K> PmTable<M, K> {
    /// `refresh_interval` is the minimum time between two refresh commands.
    pub const fn new(codename: Codename, mapper: M, clock: K, refresh_interval: Duration) -> Self {
        Self {
            profile: Profile::of(codename),
            mapper,
            clock,
            refresh_interval,
            descriptor: Once::new(),
            last_refresh: Mutex::new(None),
            mapping: Once::new(),
            torn_down: false,
        }
    }

    #[inline]
    pub const fn profile(&self) -> &Profile {
        &self.profile
    }

    #[inline]
    pub const fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    /// The descriptor, if it was resolved already.
    #[inline]
    pub fn descriptor(&self) -> Option<&PmTableDescriptor> {
        self.descriptor.get()
    }

    #[inline]
    pub fn is_mapped(&self) -> bool {
        self.mapping.is_completed()
    }

    #[inline]
    pub const fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Returns every established mapping to the mapper.
    ///
    /// Final: later reads and preparations fail with
    /// [`SmuError::Unsupported`] and nothing is mapped again. Calling it twice
    /// releases nothing the second time.
    pub fn teardown(&mut self) {
        self.torn_down = true;
        let mapping = core::mem::replace(&mut self.mapping, Once::new());
        let Some(mapping) = mapping.try_into_inner() else {
            return;
        };
        // SAFETY: both regions were mapped by `self.mapper` and are dropped here.
        unsafe {
            mapping.primary.release(&self.mapper);
            if let Some(secondary) = mapping.secondary {
                secondary.release(&self.mapper);
            }
        }
        debug!("PM table unmapped");
    }

    fn ensure_live(&self) -> Result<(), SmuError> {
        if self.torn_down {
            warn!("PM table access after teardown");
            return Err(SmuError::Unsupported);
        }
        Ok(())
    }
}

impl<M: PhysicalMapper, K: MonotonicClock> PmTable<M, K> {
    /// Resolves the descriptor once; later calls return the cached one
    /// without touching hardware.
    ///
    /// # Errors
    /// See [`descriptor::resolve`]. A failed resolution is retried by the next
    /// call.
    pub fn resolve<C: PciConfig>(
        &self,
        mailbox: &Mailbox<C>,
    ) -> Result<&PmTableDescriptor, SmuError> {
        self.descriptor
            .try_call_once(|| descriptor::resolve(mailbox))
    }

    /// Tells the firmware to transfer a fresh table to DRAM.
    ///
    /// # Errors
    /// [`SmuError::Unsupported`] if the processor has no refresh command, or
    /// the command's error.
    pub fn refresh<C: PciConfig>(&self, mailbox: &Mailbox<C>) -> Result<(), SmuError> {
        let mut last = self.last_refresh.lock();
        self.transfer_table(mailbox)?;
        *last = Some(self.clock.now());
        Ok(())
    }

    /// Refreshes unless the last refresh was at most `refresh_interval` ago.
    ///
    /// Returns whether a refresh command was sent.
    ///
    /// # Errors
    /// The refresh command failed.
    pub fn refresh_if_due<C: PciConfig>(&self, mailbox: &Mailbox<C>) -> Result<bool, SmuError> {
        let mut last = self.last_refresh.lock();
        let now = self.clock.now();
        if let Some(at) = *last
            && now.saturating_sub(at) <= self.refresh_interval
        {
            return Ok(false);
        }
        self.transfer_table(mailbox)?;
        *last = Some(now);
        Ok(true)
    }

    fn transfer_table<C: PciConfig>(&self, mailbox: &Mailbox<C>) -> Result<(), SmuError> {
        let refresh = self.profile.refresh.ok_or(SmuError::Unsupported)?;
        mailbox.execute(
            MailboxKind::GeneralPurpose,
            refresh.opcode,
            RequestArgs::with_arg0(refresh.arg0),
        )?;
        debug!("PM table refreshed");
        Ok(())
    }

    /// Copies the current table into the front of `dst` and returns its
    /// length.
    ///
    /// # Errors
    /// - [`SmuError::InsufficientSize`] with the exact table length if `dst`
    ///   is shorter; retry with a buffer of that size.
    /// - [`SmuError::MappingFailed`] if a region could not be mapped.
    /// - [`SmuError::Unsupported`] after [`teardown`](Self::teardown); no
    ///   command is sent.
    /// - Any resolution or refresh error.
    pub fn read<C: PciConfig>(
        &self,
        mailbox: &Mailbox<C>,
        dst: &mut [u8],
    ) -> Result<usize, SmuError> {
        self.ensure_live()?;
        let descriptor = self.resolve(mailbox)?;
        let required = descriptor.total_len();
        if dst.len() < required {
            warn!(
                "Insufficient buffer size for PM table read: {} < {required}",
                dst.len()
            );
            return Err(SmuError::InsufficientSize { required });
        }

        self.refresh_if_due(mailbox)?;

        let mapping = self.map(descriptor)?;
        let copied = mapping.primary.copy_into(dst);
        if let Some(secondary) = &mapping.secondary {
            secondary.copy_into(&mut dst[copied..]);
        }
        Ok(required)
    }

    /// Does everything [`read`](Self::read) does except the copy: resolves,
    /// refreshes if due and establishes the mappings.
    ///
    /// # Errors
    /// As for [`read`](Self::read), minus the size check.
    pub fn prepare<C: PciConfig>(
        &self,
        mailbox: &Mailbox<C>,
    ) -> Result<&PmTableDescriptor, SmuError> {
        self.ensure_live()?;
        let descriptor = self.resolve(mailbox)?;
        self.refresh_if_due(mailbox)?;
        self.map(descriptor)?;
        Ok(descriptor)
    }

    fn map(&self, descriptor: &PmTableDescriptor) -> Result<&Mapping, SmuError> {
        self.mapping.try_call_once(|| -> Result<Mapping, SmuError> {
            let primary = MappedRegion::map(
                &self.mapper,
                descriptor.primary_base,
                descriptor.primary_len,
            )
            .inspect_err(|err| error!("Failed to map DRAM base: {err}"))?;

            let secondary = match (descriptor.secondary_base, descriptor.secondary_len) {
                (Some(base), Some(len)) => match MappedRegion::map(&self.mapper, base, len) {
                    Ok(region) => Some(region),
                    Err(err) => {
                        error!("Failed to map secondary DRAM base: {err}");
                        // SAFETY: mapped by `self.mapper` just above.
                        unsafe { primary.release(&self.mapper) };
                        return Err(err.into());
                    }
                },
                _ => None,
            };
            Ok(Mapping { primary, secondary })
        })
    }
}

impl<M: PhysicalMapper, K> Drop for PmTable<M, K> {
    fn drop(&mut self) {
        self.teardown();
    }
}
