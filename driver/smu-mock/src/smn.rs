use smu_smn::{ConfigAccessError, PciConfig, Smn, SmnPorts};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Raw response codes the simulated firmware answers with.
pub mod status {
    pub const OK: u32 = 0x01;
    pub const FAILED: u32 = 0xFF;
    pub const UNKNOWN_COMMAND: u32 = 0xFE;
    pub const REJECTED_PREREQUISITE: u32 = 0xFD;
    pub const REJECTED_BUSY: u32 = 0xFC;
}

type Handler = Box<dyn FnMut(&mut [u32; 6]) -> u32 + Send>;

/// One command as the firmware saw it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
    /// SMN address of the command register it was written to.
    pub mailbox: u32,
    pub opcode: u32,
    pub args: [u32; 6],
}

struct SimulatedMailbox {
    command: u32,
    response: u32,
    args: u32,
    handlers: HashMap<u32, Handler>,
    forced: Option<u32>,
    never_ready: bool,
    stall: usize,
    latency: usize,
}

impl SimulatedMailbox {
    fn arg(&self, index: usize) -> u32 {
        self.args + u32::try_from(index * 4).unwrap_or(u32::MAX)
    }
}

#[derive(Default)]
struct State {
    registers: HashMap<u32, u32>,
    mailboxes: Vec<SimulatedMailbox>,
    commands: Vec<Command>,
    reads: HashMap<u32, usize>,
    writes: HashMap<u32, usize>,
    faulty_reads: HashSet<u32>,
    faulty_writes: HashSet<u32>,
    pci_id: Option<u32>,
}

impl State {
    fn mailbox_mut(&mut self, command: u32) -> &mut SimulatedMailbox {
        self.mailboxes
            .iter_mut()
            .find(|m| m.command == command)
            .unwrap_or_else(|| panic!("no simulated mailbox at {command:#x}"))
    }

    fn read(&mut self, address: u32) -> Option<u32> {
        *self.reads.entry(address).or_default() += 1;
        if self.faulty_reads.contains(&address) {
            return None;
        }
        if let Some(mailbox) = self.mailboxes.iter_mut().find(|m| m.response == address) {
            if mailbox.never_ready {
                return Some(0);
            }
            if mailbox.stall > 0 {
                mailbox.stall -= 1;
                return Some(0);
            }
        }
        Some(self.registers.get(&address).copied().unwrap_or(0))
    }

    fn write(&mut self, address: u32, value: u32) -> Option<()> {
        *self.writes.entry(address).or_default() += 1;
        if self.faulty_writes.contains(&address) {
            return None;
        }
        self.registers.insert(address, value);
        if let Some(index) = self.mailboxes.iter().position(|m| m.command == address) {
            self.run(index, value);
        }
        Some(())
    }

    fn run(&mut self, index: usize, opcode: u32) {
        let mailbox = &self.mailboxes[index];
        let mut args = [0u32; 6];
        for (i, word) in args.iter_mut().enumerate() {
            *word = self.registers.get(&mailbox.arg(i)).copied().unwrap_or(0);
        }
        self.commands.push(Command {
            mailbox: mailbox.command,
            opcode,
            args,
        });

        let mailbox = &mut self.mailboxes[index];
        if mailbox.never_ready {
            return;
        }
        let handled = mailbox.handlers.get_mut(&opcode).map(|h| h(&mut args));
        let status = mailbox
            .forced
            .or(handled)
            .unwrap_or(status::UNKNOWN_COMMAND);
        mailbox.stall = mailbox.latency;

        let (response, base) = (mailbox.response, mailbox.args);
        for (i, word) in args.iter().enumerate() {
            self.registers
                .insert(base + u32::try_from(i * 4).unwrap_or(u32::MAX), *word);
        }
        self.registers.insert(response, status);
    }
}

/// Vendor/device dword of a Zen (family 17h model 00h) root complex.
pub const DEFAULT_PCI_ID: u32 = 0x1450_1022;

/// An SMN address space with simulated SMU mailboxes.
///
/// Unknown addresses behave as plain read/write registers that start at zero.
/// The host bridge identifies as [`DEFAULT_PCI_ID`] unless told otherwise.
#[derive(Clone, Default)]
pub struct SimulatedSmu {
    state: Arc<Mutex<State>>,
}

impl SimulatedSmu {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Configuration space view of the host bridge, on the default port pair.
    #[must_use]
    pub fn config(&self) -> SimulatedConfig {
        self.config_with_ports(SmnPorts::default())
    }

    #[must_use]
    pub fn config_with_ports(&self, ports: SmnPorts) -> SimulatedConfig {
        SimulatedConfig {
            smu: self.clone(),
            ports,
            index: 0,
        }
    }

    #[must_use]
    pub fn smn(&self) -> Smn<SimulatedConfig> {
        Smn::new(self.config())
    }

    /// Adds a mailbox. It starts out idle, with the response register at OK,
    /// and answers every opcode with "unknown command" until given handlers.
    pub fn attach_mailbox(&self, command: u32, response: u32, args: u32) {
        let mut state = self.state();
        state.registers.insert(response, status::OK);
        state.mailboxes.push(SimulatedMailbox {
            command,
            response,
            args,
            handlers: HashMap::new(),
            forced: None,
            never_ready: false,
            stall: 0,
            latency: 0,
        });
    }

    /// Answers `opcode` on the mailbox at `command` by running `handler` on
    /// the argument words. The handler returns the response code.
    pub fn on_command<F>(&self, command: u32, opcode: u32, handler: F)
    where
        F: FnMut(&mut [u32; 6]) -> u32 + Send + 'static,
    {
        self.state()
            .mailbox_mut(command)
            .handlers
            .insert(opcode, Box::new(handler));
    }

    /// Answers `opcode` with OK and leaves the arguments as written.
    pub fn echo(&self, command: u32, opcode: u32) {
        self.on_command(command, opcode, |_| status::OK);
    }

    /// Answers `opcode` with OK and the given response words.
    pub fn reply(&self, command: u32, opcode: u32, words: [u32; 6]) {
        self.on_command(command, opcode, move |args| {
            *args = words;
            status::OK
        });
    }

    /// Overrides the response code of every command on the mailbox.
    pub fn force_status(&self, command: u32, status: Option<u32>) {
        self.state().mailbox_mut(command).forced = status;
    }

    /// A never-ready mailbox reads zero from its response register forever.
    pub fn set_never_ready(&self, command: u32, never_ready: bool) {
        self.state().mailbox_mut(command).never_ready = never_ready;
    }

    /// The next `reads` response register reads return zero.
    pub fn stall(&self, command: u32, reads: usize) {
        self.state().mailbox_mut(command).stall = reads;
    }

    /// After each command, the response register reads zero `reads` times
    /// before the response appears.
    pub fn set_latency(&self, command: u32, reads: usize) {
        self.state().mailbox_mut(command).latency = reads;
    }

    /// Makes every access to `address` fault at the bus.
    pub fn fail_address(&self, address: u32) {
        let mut state = self.state();
        state.faulty_reads.insert(address);
        state.faulty_writes.insert(address);
    }

    /// Makes reads of `address` fault while writes still land.
    pub fn fail_reads(&self, address: u32) {
        self.state().faulty_reads.insert(address);
    }

    pub fn heal_address(&self, address: u32) {
        let mut state = self.state();
        state.faulty_reads.remove(&address);
        state.faulty_writes.remove(&address);
    }

    /// Sets the vendor/device dword at configuration offset `0x00`.
    pub fn set_pci_id(&self, vendor: u16, device: u16) {
        self.state().pci_id = Some((u32::from(device) << 16) | u32::from(vendor));
    }

    /// Register contents, without counting an access.
    #[must_use]
    pub fn peek(&self, address: u32) -> u32 {
        self.state().registers.get(&address).copied().unwrap_or(0)
    }

    /// Sets register contents, without counting an access.
    pub fn poke(&self, address: u32, value: u32) {
        self.state().registers.insert(address, value);
    }

    #[must_use]
    pub fn reads(&self, address: u32) -> usize {
        self.state().reads.get(&address).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn writes(&self, address: u32) -> usize {
        self.state().writes.get(&address).copied().unwrap_or(0)
    }

    /// Every access to any address so far.
    #[must_use]
    pub fn total_accesses(&self) -> usize {
        let state = self.state();
        state.reads.values().sum::<usize>() + state.writes.values().sum::<usize>()
    }

    /// Every command issued so far, oldest first.
    #[must_use]
    pub fn commands(&self) -> Vec<Command> {
        self.state().commands.clone()
    }

    /// How many times `opcode` was issued on the mailbox at `command`.
    #[must_use]
    pub fn command_count(&self, command: u32, opcode: u32) -> usize {
        self.state()
            .commands
            .iter()
            .filter(|c| c.mailbox == command && c.opcode == opcode)
            .count()
    }

    pub fn clear_log(&self) {
        let mut state = self.state();
        state.commands.clear();
        state.reads.clear();
        state.writes.clear();
    }
}

/// The host bridge configuration space in front of a [`SimulatedSmu`].
pub struct SimulatedConfig {
    smu: SimulatedSmu,
    ports: SmnPorts,
    index: u32,
}

impl PciConfig for SimulatedConfig {
    fn read_dword(&mut self, offset: u16) -> Result<u32, ConfigAccessError> {
        if offset == 0x00 {
            return Ok(self.smu.state().pci_id.unwrap_or(DEFAULT_PCI_ID));
        }
        if offset == self.ports.index {
            return Ok(self.index);
        }
        if offset != self.ports.data {
            return Err(ConfigAccessError { offset });
        }
        self.smu
            .state()
            .read(self.index)
            .ok_or(ConfigAccessError { offset })
    }

    fn write_dword(&mut self, offset: u16, value: u32) -> Result<(), ConfigAccessError> {
        if offset == self.ports.index {
            self.index = value;
            return Ok(());
        }
        if offset != self.ports.data {
            return Err(ConfigAccessError { offset });
        }
        self.smu
            .state()
            .write(self.index, value)
            .ok_or(ConfigAccessError { offset })
    }
}
