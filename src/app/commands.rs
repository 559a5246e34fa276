//! Inbound commands to the application service.
//!
//! A command record on the bus is one opcode byte followed by a postcard
//! encoded payload:
//!
//! ```text
//! ┌────────────┬──────────────────────────────┐
//! │ Opcode (1B)│ Payload (postcard, 0..=5 B)  │
//! └────────────┴──────────────────────────────┘
//! ```
//!
//! Only the duration setters carry a payload (a varint `u32`).

/// Largest encoded command: opcode + worst-case varint `u32`.
pub const MAX_COMMAND_LEN: usize = 1 + 5;

/// Command discriminator on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    Noop = 0,
    Reset = 1,
    TurnOn = 2,
    TurnOff = 3,
    SetOnTime = 4,
    SetOffTime = 5,
}

impl Opcode {
    /// Decode a raw opcode byte.  Unknown values return `None`.
    pub fn from_u8(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::Noop),
            1 => Some(Self::Reset),
            2 => Some(Self::TurnOn),
            3 => Some(Self::TurnOff),
            4 => Some(Self::SetOnTime),
            5 => Some(Self::SetOffTime),
            _ => None,
        }
    }
}

/// Commands that the bus can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Report the application version; no other effect.
    Noop,

    /// Zero the command counters and event filters.
    Reset,

    /// Drive the output pin high (direct mode).
    TurnOn,

    /// Drive the output pin low (direct mode).
    TurnOff,

    /// Set the blink on time in milliseconds (blink mode).
    SetOnTime(u32),

    /// Set the blink off time in milliseconds (blink mode).
    SetOffTime(u32),
}

impl AppCommand {
    pub fn opcode(&self) -> Opcode {
        match self {
            Self::Noop => Opcode::Noop,
            Self::Reset => Opcode::Reset,
            Self::TurnOn => Opcode::TurnOn,
            Self::TurnOff => Opcode::TurnOff,
            Self::SetOnTime(_) => Opcode::SetOnTime,
            Self::SetOffTime(_) => Opcode::SetOffTime,
        }
    }

    /// Encode into a command record (`[opcode][payload]`).
    pub fn encode(&self) -> heapless::Vec<u8, MAX_COMMAND_LEN> {
        let mut buf = [0u8; MAX_COMMAND_LEN];
        buf[0] = self.opcode() as u8;
        let payload_len = match self {
            Self::SetOnTime(ms) | Self::SetOffTime(ms) => {
                postcard::to_slice(ms, &mut buf[1..]).map_or(0, |used| used.len())
            }
            _ => 0,
        };

        let mut out = heapless::Vec::new();
        // Capacity equals the scratch buffer, so this cannot overflow.
        let _ = out.extend_from_slice(&buf[..1 + payload_len]);
        out
    }
}
