#![allow(dead_code)]

use smu::{Codename, Smu, SmuConfig, SmuError};
use smu_mailbox::{MailboxKind, addresses};
use smu_mock::{
    ManualClock, ScriptedCpuid, SimulatedConfig, SimulatedMemory, SimulatedSmu, status,
};
use smu_platform::PhysicalAddress;

pub type TestSmu = Smu<SimulatedConfig, SimulatedMemory, ManualClock>;

pub const MP1_VERSION: u32 = 0x002E_3E00;
pub const RSMU_VERSION: u32 = 0x002E_3F00;

pub const MATISSE_BASE: u64 = 0x0000_0001_DE00_0000;
pub const MATISSE_FORMAT: u32 = 0x0024_0903;
pub const MATISSE_LEN: usize = 0x518;

pub const PICASSO_PRIMARY: u32 = 0xDF00_0000;
pub const PICASSO_SECONDARY: u32 = 0xDF10_0000;
pub const PICASSO_FORMAT: u32 = 0x001E_0004;

/// A machine of one processor generation whose firmware answers the
/// version query on every mailbox it has.
pub struct Rig {
    pub smu: SimulatedSmu,
    pub memory: SimulatedMemory,
    pub clock: ManualClock,
    pub cpuid: ScriptedCpuid,
    pub config: SmuConfig,
    pub rsmu: Option<u32>,
    pub mp1: u32,
}

impl Rig {
    pub fn new(codename: Codename) -> Self {
        let smu = SimulatedSmu::new();
        for kind in MailboxKind::ALL {
            if let Some(m) = addresses(codename, kind) {
                smu.attach_mailbox(m.command, m.response, m.args);
            }
        }
        let rsmu = addresses(codename, MailboxKind::GeneralPurpose).map(|m| m.command);
        let mp1 = addresses(codename, MailboxKind::PowerManagement)
            .map(|m| m.command)
            .unwrap();

        smu.reply(mp1, 0x02, [MP1_VERSION, 0, 0, 0, 0, 0]);
        if let Some(rsmu) = rsmu {
            smu.reply(rsmu, 0x02, [RSMU_VERSION, 0, 0, 0, 0, 0]);
        }

        Self {
            smu,
            memory: SimulatedMemory::new(),
            clock: ManualClock::new(),
            cpuid: ScriptedCpuid::for_codename(codename).unwrap(),
            config: SmuConfig::default().with_retry_budget(500),
            rsmu,
            mp1,
        }
    }

    /// Matisse with a fully working PM table of format [`MATISSE_FORMAT`].
    pub fn matisse() -> Self {
        let rig = Self::new(Codename::Matisse);
        let rsmu = rig.rsmu();
        let base = PhysicalAddress::new(MATISSE_BASE);
        rig.smu
            .reply(rsmu, 0x06, [base.low(), base.high(), 0, 0, 0, 0]);
        rig.smu.reply(rsmu, 0x08, [MATISSE_FORMAT, 0, 0, 0, 0, 0]);
        rig.smu.echo(rsmu, 0x05);
        rig.memory.add_region(MATISSE_BASE, 0x1000);
        rig.memory.write(MATISSE_BASE, &[0xAB; MATISSE_LEN]);
        rig
    }

    /// Picasso with its table split over two regions.
    pub fn picasso() -> Self {
        let rig = Self::new(Codename::Picasso);
        let rsmu = rig.rsmu();
        rig.smu.echo(rsmu, 0x0A);
        rig.smu.echo(rsmu, 0x3D);
        rig.smu.reply(rsmu, 0x0C, [PICASSO_FORMAT, 0, 0, 0, 0, 0]);
        rig.smu.on_command(rsmu, 0x0B, |args| {
            args[0] = if args[0] == 5 {
                PICASSO_SECONDARY
            } else {
                PICASSO_PRIMARY
            };
            status::OK
        });
        rig.memory.add_region(u64::from(PICASSO_PRIMARY), 0x608);
        rig.memory.add_region(u64::from(PICASSO_SECONDARY), 0xA4);
        rig.memory.write(u64::from(PICASSO_PRIMARY), &[0x11; 0x608]);
        rig.memory
            .write(u64::from(PICASSO_SECONDARY), &[0x22; 0xA4]);
        rig
    }

    pub fn rsmu(&self) -> u32 {
        self.rsmu.unwrap()
    }

    pub fn build(&self) -> Result<TestSmu, SmuError> {
        Smu::new(
            &self.cpuid,
            self.smu.config(),
            self.memory.clone(),
            self.clock.clone(),
            self.config,
        )
    }
}
