//! Maple command byte enumeration.

/// The `cmd` byte of a Maple frame header.
///
/// Values below `0x0F` are host-issued requests or well-formed device
/// responses; values at `0xFB`..=`0xFF` are reserved response codes that
/// signal a negative or degenerate outcome (no response, unsupported
/// function, unknown command, please resend, file error).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Command {
    /// Request device information.
    Info = 0x01,
    /// Request extended device information.
    InfoExt = 0x02,
    /// Reset the device.
    Reset = 0x03,
    /// Shut the device down.
    Shutdown = 0x04,
    /// Response to `Info`.
    InfoResp = 0x05,
    /// Response to `InfoExt`.
    InfoExtResp = 0x06,
    /// Generic acknowledgement.
    AckResp = 0x07,
    /// Response carrying transferred data (e.g. a flash block read).
    XferResp = 0x08,
    /// Request the device's current condition (buttons, sensors, ...).
    GetCond = 0x09,
    /// Request memory-card layout information.
    GetMemInfo = 0x0A,
    /// Read a block from a storage-capable device.
    Read = 0x0B,
    /// Write data to a device.
    Write = 0x0C,
    /// Signal that a multi-phase write is complete.
    WriteComplete = 0x0D,
    /// Set device condition (e.g. force-feedback).
    SetCond = 0x0E,
    /// No response was received.
    NoResp = 0xFF,
    /// Device does not support the requested function.
    UnsupFnResp = 0xFE,
    /// Device did not recognise the command.
    UnknownResp = 0xFD,
    /// Device asks the host to resend.
    ResendResp = 0xFC,
    /// A file-system level error occurred.
    FileErrResp = 0xFB,
}

impl Command {
    /// Recover a `Command` from its wire byte, if recognised.
    #[must_use]
    pub fn from_u8(byte: u8) -> Option<Self> {
        Some(match byte {
            0x01 => Self::Info,
            0x02 => Self::InfoExt,
            0x03 => Self::Reset,
            0x04 => Self::Shutdown,
            0x05 => Self::InfoResp,
            0x06 => Self::InfoExtResp,
            0x07 => Self::AckResp,
            0x08 => Self::XferResp,
            0x09 => Self::GetCond,
            0x0A => Self::GetMemInfo,
            0x0B => Self::Read,
            0x0C => Self::Write,
            0x0D => Self::WriteComplete,
            0x0E => Self::SetCond,
            0xFF => Self::NoResp,
            0xFE => Self::UnsupFnResp,
            0xFD => Self::UnknownResp,
            0xFC => Self::ResendResp,
            0xFB => Self::FileErrResp,
            _ => return None,
        })
    }

    /// The wire byte for this command.
    #[must_use]
    pub fn to_u8(self) -> u8 {
        self as u8
    }
}
