use smu_cpuid::Codename;
use smu_mailbox::{FirmwareStatus, Mailbox, MailboxKind, SmuError, addresses};
use smu_mock::{ManualClock, SimulatedConfig, SimulatedMemory, SimulatedSmu, status};
use smu_platform::PhysicalAddress;
use smu_pm_table::{PmTable, dram_base, resolve, table_size, table_version};
use std::time::Duration;

const INTERVAL: Duration = Duration::from_millis(1);

const MATISSE_BASE: u64 = 0x0000_0001_DE00_0000;
const PICASSO_PRIMARY: u32 = 0xDF00_0000;
const PICASSO_SECONDARY: u32 = 0xDF10_0000;

struct Rig {
    smu: SimulatedSmu,
    memory: SimulatedMemory,
    clock: ManualClock,
    mailbox: Mailbox<SimulatedConfig>,
    rsmu: u32,
}

impl Rig {
    fn new(codename: Codename) -> Self {
        let smu = SimulatedSmu::new();
        for kind in MailboxKind::ALL {
            if let Some(m) = addresses(codename, kind) {
                smu.attach_mailbox(m.command, m.response, m.args);
            }
        }
        let rsmu = addresses(codename, MailboxKind::GeneralPurpose).map_or(0, |m| m.command);
        Self {
            mailbox: Mailbox::new(smu.smn(), codename, 8192),
            smu,
            memory: SimulatedMemory::new(),
            clock: ManualClock::new(),
            rsmu,
        }
    }

    /// Matisse firmware reporting format `version`, whose refresh command
    /// stamps a counter into the first table byte.
    fn matisse(version: u32) -> Self {
        let rig = Self::new(Codename::Matisse);
        let base = PhysicalAddress::new(MATISSE_BASE);
        rig.smu
            .reply(rig.rsmu, 0x06, [base.low(), base.high(), 0, 0, 0, 0]);
        rig.smu.reply(rig.rsmu, 0x08, [version, 0, 0, 0, 0, 0]);

        rig.memory.add_region(MATISSE_BASE, 0x1000);
        rig.memory.write(MATISSE_BASE, &[0xAB; 0x514]);
        let memory = rig.memory.clone();
        let mut generation = 0u8;
        rig.smu.on_command(rig.rsmu, 0x05, move |_| {
            generation += 1;
            memory.write(MATISSE_BASE, &[generation]);
            status::OK
        });
        rig
    }

    fn picasso() -> Self {
        let rig = Self::new(Codename::Picasso);
        rig.smu.echo(rig.rsmu, 0x0A);
        rig.smu.echo(rig.rsmu, 0x3D);
        rig.smu.on_command(rig.rsmu, 0x0B, |args| {
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

    fn table(&self) -> PmTable<SimulatedMemory, ManualClock> {
        PmTable::new(
            self.mailbox.codename(),
            self.memory.clone(),
            self.clock.clone(),
            INTERVAL,
        )
    }

    fn refreshes(&self, opcode: u32) -> usize {
        self.smu.command_count(self.rsmu, opcode)
    }
}

#[test]
fn matisse_format_selects_table_length() {
    let rig = Rig::matisse(0x0024_0902);
    let d = resolve(&rig.mailbox).unwrap();
    assert_eq!(d.primary_base, PhysicalAddress::new(MATISSE_BASE));
    assert_eq!(d.primary_len, 0x514);
    assert_eq!(d.secondary_base, None);
    assert_eq!(d.secondary_len, None);
    assert_eq!(d.total_len(), 0x514);
    assert_eq!(d.version, 0x0024_0902);
}

#[test]
fn picasso_splits_into_two_regions() {
    let rig = Rig::picasso();
    let d = resolve(&rig.mailbox).unwrap();
    assert_eq!(d.primary_base, PhysicalAddress::from(PICASSO_PRIMARY));
    assert_eq!(
        d.secondary_base,
        Some(PhysicalAddress::from(PICASSO_SECONDARY))
    );
    assert_eq!(d.primary_len, 0x608);
    assert_eq!(d.secondary_len, Some(0xA4));
    assert_eq!(d.total_len(), 0x6AC);

    let sequence: Vec<_> = rig
        .smu
        .commands()
        .iter()
        .map(|c| (c.opcode, c.args[0]))
        .collect();
    assert_eq!(
        sequence,
        [(0x0A, 3), (0x0B, 3), (0x3D, 3), (0x0A, 5), (0x0B, 5)]
    );
}

#[test]
fn combined_base_joins_both_words() {
    let rig = Rig::new(Codename::Milan);
    rig.smu
        .reply(rig.rsmu, 0x06, [0x1234_5000, 0x0000_0002, 0, 0, 0, 0]);
    let base = dram_base(&rig.mailbox).unwrap();
    assert_eq!(base.primary, PhysicalAddress::new(0x0000_0002_1234_5000));
    assert_eq!(base.secondary, None);
    assert_eq!(rig.smu.commands()[0].args[..2], [1, 1]);
}

#[test]
fn indirect_base_takes_the_second_answer() {
    let rig = Rig::new(Codename::Colfax);
    rig.smu.reply(rig.rsmu, 0x0B, [0x0BAD, 0, 0, 0, 0, 0]);
    rig.smu.reply(rig.rsmu, 0x0C, [0xDC00_0000, 0, 0, 0, 0, 0]);
    let base = dram_base(&rig.mailbox).unwrap();
    assert_eq!(base.primary, PhysicalAddress::new(0xDC00_0000));
    let commands = rig.smu.commands();
    assert_eq!(commands.len(), 2);
    assert!(commands.iter().all(|c| c.args == [0; 6]));
}

#[test]
fn dram_base_failure_aborts_resolution() {
    let rig = Rig::picasso();
    rig.smu
        .on_command(rig.rsmu, 0x3D, |_| status::REJECTED_PREREQUISITE);
    let rejected = SmuError::FirmwareRejected(FirmwareStatus::RejectedPrerequisite);
    assert_eq!(resolve(&rig.mailbox), Err(rejected));
    assert_eq!(rig.smu.commands().len(), 3);
}

#[test]
fn unknown_format_identifier_is_unsupported() {
    let rig = Rig::matisse(0x0024_0999);
    let table = rig.table();
    let mut buf = vec![0u8; 0x2000];
    assert_eq!(
        table.read(&rig.mailbox, &mut buf),
        Err(SmuError::Unsupported)
    );
    assert_eq!(rig.memory.map_calls(), 0);
    assert_eq!(rig.refreshes(0x05), 0);
}

#[test]
fn unsupported_processor_sends_nothing() {
    for codename in [Codename::CastlePeak, Codename::Colfax, Codename::Rembrandt] {
        let rig = Rig::new(codename);
        assert_eq!(resolve(&rig.mailbox), Err(SmuError::Unsupported));
        assert_eq!(rig.smu.total_accesses(), 0, "{codename}");
    }
}

#[test]
fn format_query_per_generation() {
    let rig = Rig::new(Codename::Renoir);
    rig.smu.reply(rig.rsmu, 0x06, [0x0037_0002, 0, 0, 0, 0, 0]);
    assert_eq!(table_version(&rig.mailbox), Ok(0x0037_0002));
    assert_eq!(table_size(Codename::Renoir, 0x0037_0002), Some(0x88C));
    assert_eq!(table_size(Codename::Renoir, 0x0037_0003), Some(0x88C));
    assert_eq!(table_size(Codename::Vermeer, 0x0038_0805), Some(0x8F0));
    assert_eq!(table_size(Codename::RavenRidge2, 0xDEAD_C0DE), Some(0x6AC));
    assert_eq!(table_size(Codename::Dali, 0), None);

    let rig = Rig::new(Codename::Dali);
    assert_eq!(table_version(&rig.mailbox), Err(SmuError::Unsupported));
}

#[test]
fn resolution_happens_once() {
    let rig = Rig::matisse(0x0024_0902);
    let table = rig.table();

    let first = *table.resolve(&rig.mailbox).unwrap();
    let accesses = rig.smu.total_accesses();
    let second = *table.resolve(&rig.mailbox).unwrap();

    assert_eq!(first, second);
    assert_eq!(rig.smu.total_accesses(), accesses);
    assert_eq!(table.descriptor(), Some(&first));
}

#[test]
fn buffer_one_byte_short_reports_required_length() {
    let rig = Rig::matisse(0x0024_0902);
    let table = rig.table();

    let mut short = vec![0u8; 0x513];
    assert_eq!(
        table.read(&rig.mailbox, &mut short),
        Err(SmuError::InsufficientSize { required: 0x514 })
    );
    assert_eq!(rig.refreshes(0x05), 0);

    let mut exact = vec![0u8; 0x514];
    assert_eq!(table.read(&rig.mailbox, &mut exact), Ok(0x514));
    assert_eq!(exact[0], 1);
    assert!(exact[1..].iter().all(|b| *b == 0xAB));
}

#[test]
fn larger_buffer_keeps_its_tail() {
    let rig = Rig::matisse(0x0024_0902);
    let table = rig.table();
    let mut buf = vec![0x5Au8; 0x600];
    assert_eq!(table.read(&rig.mailbox, &mut buf), Ok(0x514));
    assert!(buf[0x514..].iter().all(|b| *b == 0x5A));
}

#[test]
fn refreshes_are_throttled() {
    let rig = Rig::matisse(0x0024_0902);
    let table = rig.table();
    let mut buf = vec![0u8; 0x514];

    table.read(&rig.mailbox, &mut buf).unwrap();
    table.read(&rig.mailbox, &mut buf).unwrap();
    assert_eq!(rig.refreshes(0x05), 1);

    rig.clock.advance(INTERVAL);
    table.read(&rig.mailbox, &mut buf).unwrap();
    assert_eq!(rig.refreshes(0x05), 1);

    rig.clock.advance(Duration::from_micros(1));
    table.read(&rig.mailbox, &mut buf).unwrap();
    assert_eq!(rig.refreshes(0x05), 2);
    assert_eq!(buf[0], 2);

    rig.clock.advance(Duration::from_millis(5));
    table.read(&rig.mailbox, &mut buf).unwrap();
    assert_eq!(rig.refreshes(0x05), 3);
}

#[test]
fn refresh_rejection_propagates() {
    let rig = Rig::matisse(0x0024_0902);
    rig.smu
        .on_command(rig.rsmu, 0x05, |_| status::REJECTED_BUSY);
    let table = rig.table();
    let mut buf = vec![0u8; 0x514];
    assert_eq!(
        table.read(&rig.mailbox, &mut buf),
        Err(SmuError::FirmwareRejected(FirmwareStatus::RejectedBusy))
    );
    assert!(!table.is_mapped());
}

#[test]
fn split_table_is_read_primary_first() {
    let rig = Rig::picasso();
    let table = rig.table();
    let mut buf = vec![0u8; 0x6AC];
    assert_eq!(table.read(&rig.mailbox, &mut buf), Ok(0x6AC));
    assert!(buf[..0x608].iter().all(|b| *b == 0x11));
    assert!(buf[0x608..].iter().all(|b| *b == 0x22));

    let refresh = rig.smu.commands().last().copied().unwrap();
    assert_eq!((refresh.opcode, refresh.args[0]), (0x3D, 3));
}

#[test]
fn regions_are_mapped_once_and_released_on_teardown() {
    let rig = Rig::picasso();
    let mut table = rig.table();
    let mut buf = vec![0u8; 0x6AC];
    for _ in 0..3 {
        table.read(&rig.mailbox, &mut buf).unwrap();
    }
    assert_eq!(rig.memory.map_calls(), 2);
    assert_eq!(rig.memory.live_mappings(), 2);

    table.teardown();
    assert!(table.is_torn_down());
    assert!(!table.is_mapped());
    assert_eq!(rig.memory.live_mappings(), 0);
    assert_eq!(rig.memory.unmap_calls(), 2);

    table.teardown();
    drop(table);
    assert_eq!(rig.memory.unmap_calls(), 2);
}

#[test]
fn reads_after_teardown_are_refused() {
    let rig = Rig::matisse(0x0024_0902);
    let mut table = rig.table();
    let mut buf = vec![0u8; 0x514];
    table.read(&rig.mailbox, &mut buf).unwrap();
    table.teardown();

    rig.clock.advance(Duration::from_millis(5));
    let commands = rig.smu.commands().len();
    assert_eq!(
        table.read(&rig.mailbox, &mut buf),
        Err(SmuError::Unsupported)
    );
    assert_eq!(
        table.prepare(&rig.mailbox).err(),
        Some(SmuError::Unsupported)
    );
    assert_eq!(rig.smu.commands().len(), commands);
    assert_eq!(rig.memory.map_calls(), 1);
    assert_eq!(rig.memory.live_mappings(), 0);

    drop(table);
    assert_eq!(rig.memory.unmap_calls(), 1);
}

#[test]
fn teardown_before_any_read_maps_nothing() {
    let rig = Rig::matisse(0x0024_0902);
    let mut table = rig.table();
    table.teardown();

    let mut buf = vec![0u8; 0x514];
    assert_eq!(
        table.read(&rig.mailbox, &mut buf),
        Err(SmuError::Unsupported)
    );
    assert_eq!(rig.smu.total_accesses(), 0);
    assert_eq!(rig.memory.map_calls(), 0);
    assert_eq!(rig.memory.unmap_calls(), 0);
}

#[test]
fn drop_releases_mappings() {
    let rig = Rig::matisse(0x0024_0902);
    {
        let table = rig.table();
        let mut buf = vec![0u8; 0x514];
        table.read(&rig.mailbox, &mut buf).unwrap();
        assert_eq!(rig.memory.live_mappings(), 1);
    }
    assert_eq!(rig.memory.live_mappings(), 0);
}

#[test]
fn mapping_failure_is_reported_and_retried() {
    let rig = Rig::matisse(0x0024_0902);
    let table = rig.table();
    let mut buf = vec![0u8; 0x514];

    rig.memory.fail_mappings(true);
    let err = table.read(&rig.mailbox, &mut buf).unwrap_err();
    assert!(matches!(err, SmuError::MappingFailed(e) if e.len == 0x514));
    assert_eq!(err.response_code(), Some(0xF7));

    rig.memory.fail_mappings(false);
    assert_eq!(table.read(&rig.mailbox, &mut buf), Ok(0x514));
    assert_eq!(rig.memory.map_calls(), 2);
}

#[test]
fn failed_resolution_is_retried_by_the_next_read() {
    let rig = Rig::matisse(0x0024_0902);
    let mut queries = 0;
    rig.smu.on_command(rig.rsmu, 0x08, move |args| {
        queries += 1;
        if queries == 1 {
            return status::REJECTED_BUSY;
        }
        args[0] = 0x0024_0902;
        status::OK
    });
    let table = rig.table();
    let mut buf = vec![0u8; 0x514];

    assert_eq!(
        table.read(&rig.mailbox, &mut buf),
        Err(SmuError::FirmwareRejected(FirmwareStatus::RejectedBusy))
    );
    assert_eq!(table.descriptor(), None);
    assert_eq!(rig.refreshes(0x05), 0);

    assert_eq!(table.read(&rig.mailbox, &mut buf), Ok(0x514));
    assert_eq!(rig.refreshes(0x08), 2);
    assert_eq!(rig.refreshes(0x05), 1);
    assert_eq!(table.descriptor().unwrap().total_len(), 0x514);
    assert_eq!(buf[0], 1);
}

#[test]
fn failed_secondary_mapping_releases_the_primary() {
    let rig = Rig::new(Codename::RavenRidge);
    rig.smu.echo(rig.rsmu, 0x0A);
    rig.smu.echo(rig.rsmu, 0x3D);
    rig.smu.on_command(rig.rsmu, 0x0B, |args| {
        args[0] = if args[0] == 5 {
            0xE000_0000
        } else {
            0xD000_0000
        };
        status::OK
    });
    rig.memory.add_region(0xD000_0000, 0x608);

    let table = rig.table();
    let mut buf = vec![0u8; 0x6AC];
    let err = table.read(&rig.mailbox, &mut buf).unwrap_err();
    assert!(matches!(err, SmuError::MappingFailed(e) if e.len == 0xA4));
    assert_eq!(rig.memory.live_mappings(), 0);
}
