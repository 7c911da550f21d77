//! The attribute-style user interface of the driver.
//!
//! Every endpoint is a named value that can be shown into a buffer and, for
//! some, stored from one. Binary endpoints use little-endian encoding; text
//! endpoints end in a newline.

use crate::context::Smu;
use core::fmt::{self, Write};
use log::debug;
use smu_mailbox::{InterfaceVersion, MailboxKind, RequestArgs, SmuError, response};
use smu_platform::{MonotonicClock, PhysicalMapper};
use smu_smn::PciConfig;
use spin::Mutex;

/// Version string userspace libraries check before talking to the driver.
pub const DRIVER_VERSION: &str = "0.1.2";

/// The driver version a client found does not match [`DRIVER_VERSION`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
#[error("driver version mismatch: expected {DRIVER_VERSION}, found {found:?}")]
pub struct VersionMismatch<'a> {
    pub found: &'a str,
}

/// Checks the contents of the `drv_version` endpoint.
///
/// One trailing newline is accepted.
///
/// # Errors
/// The versions differ.
pub fn check_driver_version(found: &str) -> Result<(), VersionMismatch<'_>> {
    let version = found.strip_suffix('\n').unwrap_or(found);
    if version == DRIVER_VERSION {
        Ok(())
    } else {
        Err(VersionMismatch { found })
    }
}

/// Decodes a command endpoint write: one byte or one little-endian dword.
#[must_use]
pub fn decode_opcode(bytes: &[u8]) -> Option<u32> {
    match *bytes {
        [opcode] => Some(u32::from(opcode)),
        _ => le_word(bytes),
    }
}

fn le_word(bytes: &[u8]) -> Option<u32> {
    bytes.try_into().ok().map(u32::from_le_bytes)
}

/// A write to the `smn` endpoint.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SmnRequest {
    /// Four bytes: the address to read.
    Read { address: u32 },
    /// Eight bytes: the address, then the value.
    Write { address: u32, value: u32 },
}

impl SmnRequest {
    #[must_use]
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        match bytes.len() {
            4 => Some(Self::Read {
                address: le_word(bytes)?,
            }),
            8 => Some(Self::Write {
                address: le_word(&bytes[..4])?,
                value: le_word(&bytes[4..])?,
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Endpoint {
    DriverVersion,
    Version,
    Mp1InterfaceVersion,
    Codename,
    SmuArgs,
    Mp1Command,
    Smn,
    RsmuCommand,
    PmTableSize,
    PmTable,
    PmTableVersion,
}

impl Endpoint {
    pub const ALL: [Self; 11] = [
        Self::DriverVersion,
        Self::Version,
        Self::Mp1InterfaceVersion,
        Self::Codename,
        Self::SmuArgs,
        Self::Mp1Command,
        Self::Smn,
        Self::RsmuCommand,
        Self::PmTableSize,
        Self::PmTable,
        Self::PmTableVersion,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::DriverVersion => "drv_version",
            Self::Version => "version",
            Self::Mp1InterfaceVersion => "mp1_if_version",
            Self::Codename => "codename",
            Self::SmuArgs => "smu_args",
            Self::Mp1Command => "mp1_smu_cmd",
            Self::Smn => "smn",
            Self::RsmuCommand => "rsmu_cmd",
            Self::PmTableSize => "pm_table_size",
            Self::PmTable => "pm_table",
            Self::PmTableVersion => "pm_table_version",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.name() == name)
    }

    /// Whether the endpoint accepts writes.
    #[must_use]
    pub const fn is_writable(self) -> bool {
        matches!(
            self,
            Self::SmuArgs | Self::Mp1Command | Self::Smn | Self::RsmuCommand
        )
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum EndpointError {
    #[error("endpoint {0} is not available on this processor")]
    Unavailable(Endpoint),
    #[error("endpoint {0} is read-only")]
    ReadOnly(Endpoint),
    #[error("endpoint {endpoint} does not accept {len} bytes")]
    InvalidSize { endpoint: Endpoint, len: usize },
    #[error("output buffer too small for endpoint {0}")]
    BufferTooSmall(Endpoint),
    #[error(transparent)]
    Smu(#[from] SmuError),
}

struct SessionState {
    args: RequestArgs,
    response: u32,
    smn_result: u32,
}

/// The stateful side of the endpoints.
///
/// Command writes run with the argument block stored by the last `smu_args`
/// write and leave their response code and results behind for the next
/// show. The two command endpoints share one response slot.
pub struct Session<'a, C, M: PhysicalMapper, K> {
    smu: &'a Smu<C, M, K>,
    state: Mutex<SessionState>,
}

impl<'a, C: PciConfig, M: PhysicalMapper, K: MonotonicClock> Session<'a, C, M, K> {
    pub const fn new(smu: &'a Smu<C, M, K>) -> Self {
        Self {
            smu,
            state: Mutex::new(SessionState {
                args: RequestArgs::zeroed(),
                response: response::OK,
                smn_result: 0,
            }),
        }
    }

    #[inline]
    pub const fn smu(&self) -> &'a Smu<C, M, K> {
        self.smu
    }

    /// Whether `endpoint` exists for this processor.
    pub const fn is_present(&self, endpoint: Endpoint) -> bool {
        let capabilities = self.smu.capabilities();
        match endpoint {
            Endpoint::RsmuCommand => capabilities.general_purpose,
            Endpoint::PmTableSize | Endpoint::PmTable => capabilities.pm_table(),
            Endpoint::PmTableVersion => capabilities.pm_table_version.is_some(),
            _ => true,
        }
    }

    /// The endpoints present on this processor.
    pub fn endpoints(&self) -> impl Iterator<Item = Endpoint> + '_ {
        Endpoint::ALL.into_iter().filter(|e| self.is_present(*e))
    }

    /// Renders `endpoint` into `out` and returns the bytes written.
    ///
    /// # Errors
    /// - [`EndpointError::Unavailable`] for endpoints this processor lacks.
    /// - [`EndpointError::BufferTooSmall`] if `out` cannot hold the value.
    /// - [`EndpointError::Smu`] if a PM table read failed.
    pub fn show(&self, endpoint: Endpoint, out: &mut [u8]) -> Result<usize, EndpointError> {
        if !self.is_present(endpoint) {
            return Err(EndpointError::Unavailable(endpoint));
        }
        let smu = self.smu;
        match endpoint {
            Endpoint::DriverVersion => {
                write_text(endpoint, out, format_args!("{DRIVER_VERSION}\n"))
            }
            Endpoint::Version => {
                write_text(endpoint, out, format_args!("{}\n", smu.firmware_version()))
            }
            Endpoint::Mp1InterfaceVersion => {
                let revision = smu.interface_version().map_or(0, InterfaceVersion::ordinal);
                write_text(endpoint, out, format_args!("{revision}\n"))
            }
            Endpoint::Codename => write_text(
                endpoint,
                out,
                format_args!("{:02}\n", smu.codename().ordinal()),
            ),
            Endpoint::SmuArgs => write_bytes(endpoint, out, &self.args().to_bytes()),
            Endpoint::Mp1Command | Endpoint::RsmuCommand => {
                write_bytes(endpoint, out, &self.last_response().to_le_bytes())
            }
            Endpoint::Smn => write_bytes(endpoint, out, &self.smn_result().to_le_bytes()),
            Endpoint::PmTableSize => {
                let len = smu.capabilities().pm_table_len.unwrap_or(0);
                let len = u64::try_from(len).unwrap_or(u64::MAX);
                write_bytes(endpoint, out, &len.to_le_bytes())
            }
            Endpoint::PmTableVersion => {
                let version = smu.capabilities().pm_table_version.unwrap_or(0);
                write_bytes(endpoint, out, &version.to_le_bytes())
            }
            Endpoint::PmTable => Ok(smu.read_pm_table(out)?),
        }
    }

    /// Applies a write to `endpoint` and returns the bytes consumed.
    ///
    /// A command that the firmware rejects still consumes its input; the
    /// outcome is visible through the response code.
    ///
    /// # Errors
    /// - [`EndpointError::Unavailable`] for endpoints this processor lacks.
    /// - [`EndpointError::ReadOnly`] for endpoints that cannot be written.
    /// - [`EndpointError::InvalidSize`] if `input` has the wrong length; no
    ///   state changes and no hardware is touched.
    pub fn store(&self, endpoint: Endpoint, input: &[u8]) -> Result<usize, EndpointError> {
        if !self.is_present(endpoint) {
            return Err(EndpointError::Unavailable(endpoint));
        }
        let invalid = || EndpointError::InvalidSize {
            endpoint,
            len: input.len(),
        };
        match endpoint {
            Endpoint::SmuArgs => {
                let args = RequestArgs::from_slice(input).ok_or_else(invalid)?;
                self.set_args(args);
            }
            Endpoint::Mp1Command | Endpoint::RsmuCommand => {
                let opcode = decode_opcode(input).ok_or_else(invalid)?;
                let kind = if endpoint == Endpoint::RsmuCommand {
                    MailboxKind::GeneralPurpose
                } else {
                    MailboxKind::PowerManagement
                };
                self.command(kind, opcode);
            }
            Endpoint::Smn => {
                let request = SmnRequest::parse(input).ok_or_else(invalid)?;
                self.smn(request);
            }
            _ => return Err(EndpointError::ReadOnly(endpoint)),
        }
        Ok(input.len())
    }

    /// The argument block the next command runs with.
    pub fn args(&self) -> RequestArgs {
        self.state.lock().args
    }

    pub fn set_args(&self, args: RequestArgs) {
        self.state.lock().args = args;
    }

    /// Response code of the last command.
    pub fn last_response(&self) -> u32 {
        self.state.lock().response
    }

    /// Result of the last SMN access.
    pub fn smn_result(&self) -> u32 {
        self.state.lock().smn_result
    }

    /// Runs `opcode` on mailbox `kind` with the stored arguments.
    ///
    /// On success the results replace the stored arguments. Returns the
    /// response code, which is also kept for [`last_response`](Self::last_response).
    pub fn command(&self, kind: MailboxKind, opcode: u32) -> u32 {
        let mut state = self.state.lock();
        let code = match self.smu.execute(kind, opcode, state.args) {
            Ok(results) => {
                state.args = results;
                response::OK
            }
            Err(err) => {
                debug!("{} command {opcode:#04x} failed: {err}", kind.as_str());
                err.response_code().unwrap_or(response::FAILED)
            }
        };
        state.response = code;
        code
    }

    /// Performs an SMN access.
    ///
    /// A read stores the value; a failed read leaves the previous result in
    /// place. A write stores its outcome as a response code.
    pub fn smn(&self, request: SmnRequest) {
        let mut state = self.state.lock();
        match request {
            SmnRequest::Read { address } => match self.smu.smn_read(address) {
                Ok(value) => state.smn_result = value,
                Err(err) => debug!("SMN read of {address:#010x} failed: {err}"),
            },
            SmnRequest::Write { address, value } => {
                state.smn_result = match self.smu.smn_write(address, value) {
                    Ok(()) => response::OK,
                    Err(err) => err.response_code().unwrap_or(response::BUS_FAILED),
                };
            }
        }
    }
}

struct SliceWriter<'a> {
    buf: &'a mut [u8],
    len: usize,
}

impl Write for SliceWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let end = self.len + s.len();
        let dst = self.buf.get_mut(self.len..end).ok_or(fmt::Error)?;
        dst.copy_from_slice(s.as_bytes());
        self.len = end;
        Ok(())
    }
}

fn write_text(
    endpoint: Endpoint,
    out: &mut [u8],
    args: fmt::Arguments<'_>,
) -> Result<usize, EndpointError> {
    let mut writer = SliceWriter { buf: out, len: 0 };
    writer
        .write_fmt(args)
        .map_err(|_| EndpointError::BufferTooSmall(endpoint))?;
    Ok(writer.len)
}

fn write_bytes(endpoint: Endpoint, out: &mut [u8], bytes: &[u8]) -> Result<usize, EndpointError> {
    let dst = out
        .get_mut(..bytes.len())
        .ok_or(EndpointError::BufferTooSmall(endpoint))?;
    dst.copy_from_slice(bytes);
    Ok(bytes.len())
}
