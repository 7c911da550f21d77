use smu_smn::{AMD_VENDOR_ID, ConfigAccessError, PciConfig, PciId, Smn, SmnError, SmnPorts};
use std::collections::HashMap;
use std::sync::{Arc, Barrier};
use std::thread;

/// Index/data pair backed by a map, with optional injected faults.
#[derive(Default)]
struct FakeBridge {
    ports: Option<SmnPorts>,
    index: u32,
    space: HashMap<u32, u32>,
    log: Vec<(char, u16, u32)>,
    fail_offset: Option<u16>,
}

impl FakeBridge {
    fn ports(&self) -> SmnPorts {
        self.ports.unwrap_or_default()
    }
}

impl PciConfig for FakeBridge {
    fn read_dword(&mut self, offset: u16) -> Result<u32, ConfigAccessError> {
        if self.fail_offset == Some(offset) {
            return Err(ConfigAccessError { offset });
        }
        assert_eq!(offset, self.ports().data);
        let value = self.space.get(&self.index).copied().unwrap_or(0);
        self.log.push(('r', offset, value));
        Ok(value)
    }

    fn write_dword(&mut self, offset: u16, value: u32) -> Result<(), ConfigAccessError> {
        if self.fail_offset == Some(offset) {
            return Err(ConfigAccessError { offset });
        }
        self.log.push(('w', offset, value));
        if offset == self.ports().index {
            self.index = value;
        } else {
            assert_eq!(offset, self.ports().data);
            self.space.insert(self.index, value);
        }
        Ok(())
    }
}

#[test]
fn index_then_data_sequence() {
    let smn = Smn::new(FakeBridge::default());
    smn.write(0x3B1_0528, 0xDEAD_BEEF).unwrap();
    assert_eq!(smn.read(0x3B1_0528).unwrap(), 0xDEAD_BEEF);

    let bridge = smn.into_inner();
    assert_eq!(
        bridge.log,
        vec![
            ('w', 0xC4, 0x3B1_0528),
            ('w', 0xC8, 0xDEAD_BEEF),
            ('w', 0xC4, 0x3B1_0528),
            ('r', 0xC8, 0xDEAD_BEEF),
        ]
    );
}

#[test]
fn alternate_port_pair() {
    let bridge = FakeBridge {
        ports: Some(SmnPorts::LEGACY),
        ..FakeBridge::default()
    };
    let smn = Smn::with_ports(bridge, SmnPorts::LEGACY);
    smn.write(0x10, 7).unwrap();
    assert_eq!(smn.read(0x10).unwrap(), 7);
    assert_eq!(smn.into_inner().log[0], ('w', 0x60, 0x10));
}

#[test]
fn address_programming_fault() {
    let bridge = FakeBridge {
        fail_offset: Some(0xC4),
        ..FakeBridge::default()
    };
    let smn = Smn::new(bridge);
    assert_eq!(
        smn.read(0x1234),
        Err(SmnError::ProgramAddress { address: 0x1234 })
    );
    assert_eq!(
        smn.write(0x1234, 1),
        Err(SmnError::ProgramAddress { address: 0x1234 })
    );
}

#[test]
fn data_transfer_fault() {
    let bridge = FakeBridge {
        fail_offset: Some(0xC8),
        ..FakeBridge::default()
    };
    let smn = Smn::new(bridge);
    assert_eq!(smn.read(0x40), Err(SmnError::Read { address: 0x40 }));
    assert_eq!(smn.write(0x40, 1), Err(SmnError::Write { address: 0x40 }));
    assert!(smn.into_inner().space.is_empty());
}

#[test]
fn concurrent_accesses_never_interleave() {
    let threads = 4;
    let iters = 2_000;

    let smn = Arc::new(Smn::new(FakeBridge::default()));
    let start = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let smn = Arc::clone(&smn);
            let start = Arc::clone(&start);
            let t = u32::try_from(t).unwrap();
            thread::spawn(move || {
                let address = 0x1000 + t * 4;
                start.wait();
                for i in 0..iters {
                    let value = (t << 24) | i;
                    smn.write(address, value).unwrap();
                    assert_eq!(smn.read(address).unwrap(), value);
                }
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }
}

#[test]
fn root_complex_identification() {
    struct Header(u32);
    impl PciConfig for Header {
        fn read_dword(&mut self, offset: u16) -> Result<u32, ConfigAccessError> {
            match offset {
                0 => Ok(self.0),
                _ => Err(ConfigAccessError { offset }),
            }
        }
        fn write_dword(&mut self, offset: u16, _: u32) -> Result<(), ConfigAccessError> {
            Err(ConfigAccessError { offset })
        }
    }

    let id = PciId::read(&mut Header(0x1480_1022)).unwrap();
    assert_eq!(
        id,
        PciId {
            vendor: AMD_VENDOR_ID,
            device: 0x1480
        }
    );
    assert!(id.is_smu_root_complex());
    assert_eq!(id.to_string(), "1022:1480");

    assert!(
        !PciId::read(&mut Header(0x1480_8086))
            .unwrap()
            .is_smu_root_complex()
    );
    assert!(
        !PciId::read(&mut Header(0x14B5_1022))
            .unwrap()
            .is_smu_root_complex()
    );
}
