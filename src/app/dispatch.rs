//! Command dispatch: opcode registration, record decoding, and the
//! valid/invalid command counters reported in status telemetry.
//!
//! The set of accepted opcodes depends on the controller mode:
//!
//! | Mode   | Registered opcodes                          |
//! |--------|---------------------------------------------|
//! | direct | `Noop`, `Reset`, `TurnOn`, `TurnOff`        |
//! | blink  | `Noop`, `Reset`, `SetOnTime`, `SetOffTime`  |
//!
//! Anything else is rejected here, so the controller never sees it.

use core::fmt;

use crate::config::CtrlMode;

use super::commands::{AppCommand, Opcode};

const DIRECT_OPCODES: [Opcode; 4] = [Opcode::Noop, Opcode::Reset, Opcode::TurnOn, Opcode::TurnOff];
const BLINK_OPCODES: [Opcode; 4] = [
    Opcode::Noop,
    Opcode::Reset,
    Opcode::SetOnTime,
    Opcode::SetOffTime,
];

/// Why a command record was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchError {
    /// Zero-length record.
    Empty,
    /// Opcode byte outside the command table.
    UnknownOpcode(u8),
    /// Valid opcode, but no handler is registered in the current mode.
    NotRegistered(Opcode),
    /// The payload could not be decoded.
    BadPayload(Opcode),
    /// Bytes left over after the payload.
    TrailingBytes(Opcode),
    /// The handler ran and reported failure.
    Rejected(Opcode),
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty command record"),
            Self::UnknownOpcode(raw) => write!(f, "unknown opcode {}", raw),
            Self::NotRegistered(op) => write!(f, "no handler registered for {:?}", op),
            Self::BadPayload(op) => write!(f, "malformed payload for {:?}", op),
            Self::TrailingBytes(op) => write!(f, "unexpected trailing bytes for {:?}", op),
            Self::Rejected(op) => write!(f, "{:?} handler failed", op),
        }
    }
}

impl std::error::Error for DispatchError {}

/// Opcode table plus command counters.
pub struct CommandManager {
    registered: heapless::Vec<Opcode, 6>,
    valid_cmd_count: u16,
    invalid_cmd_count: u16,
}

impl CommandManager {
    /// Build the opcode table for `mode`.
    pub fn new(mode: CtrlMode) -> Self {
        let table: &[Opcode] = match mode {
            CtrlMode::Direct => &DIRECT_OPCODES,
            CtrlMode::Blink => &BLINK_OPCODES,
        };
        let mut registered = heapless::Vec::new();
        for op in table {
            let _ = registered.push(*op);
        }

        Self {
            registered,
            valid_cmd_count: 0,
            invalid_cmd_count: 0,
        }
    }

    pub fn is_registered(&self, op: Opcode) -> bool {
        self.registered.contains(&op)
    }

    /// Decode a command record into an [`AppCommand`].
    pub fn decode(&self, record: &[u8]) -> Result<AppCommand, DispatchError> {
        let (&raw, payload) = record.split_first().ok_or(DispatchError::Empty)?;
        let op = Opcode::from_u8(raw).ok_or(DispatchError::UnknownOpcode(raw))?;
        if !self.is_registered(op) {
            return Err(DispatchError::NotRegistered(op));
        }

        let cmd = match op {
            Opcode::Noop => AppCommand::Noop,
            Opcode::Reset => AppCommand::Reset,
            Opcode::TurnOn => AppCommand::TurnOn,
            Opcode::TurnOff => AppCommand::TurnOff,
            Opcode::SetOnTime => return decode_duration(op, payload).map(AppCommand::SetOnTime),
            Opcode::SetOffTime => return decode_duration(op, payload).map(AppCommand::SetOffTime),
        };

        if !payload.is_empty() {
            return Err(DispatchError::TrailingBytes(op));
        }
        Ok(cmd)
    }

    /// Count the outcome of one dispatched command.
    pub fn record(&mut self, success: bool) {
        if success {
            self.valid_cmd_count = self.valid_cmd_count.wrapping_add(1);
        } else {
            self.invalid_cmd_count = self.invalid_cmd_count.wrapping_add(1);
        }
    }

    pub fn reset_status(&mut self) {
        self.valid_cmd_count = 0;
        self.invalid_cmd_count = 0;
    }

    pub fn valid_cmd_count(&self) -> u16 {
        self.valid_cmd_count
    }

    pub fn invalid_cmd_count(&self) -> u16 {
        self.invalid_cmd_count
    }
}

fn decode_duration(op: Opcode, payload: &[u8]) -> Result<u32, DispatchError> {
    let (ms, rest) =
        postcard::take_from_bytes::<u32>(payload).map_err(|_| DispatchError::BadPayload(op))?;
    if !rest.is_empty() {
        return Err(DispatchError::TrailingBytes(op));
    }
    Ok(ms)
}
