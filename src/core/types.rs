//! # Header Enumerations
//!
//! Closed enums for every enumerated header field. Values that come from the
//! device go through `from_raw`, which returns [`DecodeError::Unrecognized`]
//! for reserved values instead of casting blindly.

use crate::error::{DecodeError, HeaderField};
use serde::{Deserialize, Serialize};

/// Logical endpoint multiplexed over the USB pipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Port {
    Wlan = 0,
    CpuRx = 1,
    CpuTx = 2,
    Host = 3,
    VirtualCpuRx = 4,
    VirtualCpuTx = 5,
    Discard = 6,
}

impl Port {
    pub fn from_raw(raw: u32) -> Result<Self, DecodeError> {
        Ok(match raw {
            0 => Port::Wlan,
            1 => Port::CpuRx,
            2 => Port::CpuTx,
            3 => Port::Host,
            4 => Port::VirtualCpuRx,
            5 => Port::VirtualCpuTx,
            6 => Port::Discard,
            _ => return Err(unrecognized(HeaderField::Port, raw)),
        })
    }
}

/// Kind of payload behind the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum TransferType {
    /// 802.11 or 802.3 frame
    Packet = 0,
    /// MCU command (tx) or MCU event (rx)
    Command = 1,
}

impl TransferType {
    pub fn from_raw(raw: u32) -> Result<Self, DecodeError> {
        match raw {
            0 => Ok(TransferType::Packet),
            1 => Ok(TransferType::Command),
            _ => Err(unrecognized(HeaderField::TransferType, raw)),
        }
    }
}

/// Hardware queue a frame is placed on. All four encodings are defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum QueueSelect {
    #[default]
    Mgmt = 0,
    Hcca = 1,
    Edca = 2,
    Edca2 = 3,
}

impl QueueSelect {
    /// Total over the 2-bit field.
    pub fn from_bits(raw: u32) -> Self {
        match raw & 0x3 {
            0 => QueueSelect::Mgmt,
            1 => QueueSelect::Hcca,
            2 => QueueSelect::Edca,
            _ => QueueSelect::Edca2,
        }
    }
}

/// MCU event carried in an rx command header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum EventType {
    CmdDone = 0,
    CmdError = 1,
    CmdRetry = 2,
    PwrRsp = 3,
    WowRsp = 4,
    CarrierDetectRsp = 5,
    DfsDetectRsp = 6,
}

impl EventType {
    pub fn from_raw(raw: u32) -> Result<Self, DecodeError> {
        Ok(match raw {
            0 => EventType::CmdDone,
            1 => EventType::CmdError,
            2 => EventType::CmdRetry,
            3 => EventType::PwrRsp,
            4 => EventType::WowRsp,
            5 => EventType::CarrierDetectRsp,
            6 => EventType::DfsDetectRsp,
            _ => return Err(unrecognized(HeaderField::EventType, raw)),
        })
    }

    /// Completion of an outstanding command (as opposed to a notification).
    pub fn is_completion(self) -> bool {
        matches!(
            self,
            EventType::CmdDone | EventType::CmdError | EventType::CmdRetry
        )
    }
}

/// Firmware command selected by the 7-bit command type field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum McuCommand {
    FunSetOp = 1,
    LoadCr = 2,
    InitGainOp = 3,
    DyncVgaOp = 6,
    TdlsChSw = 7,
    BurstWrite = 8,
    ReadModifyWrite = 9,
    RandomRead = 10,
    BurstRead = 11,
    RandomWrite = 12,
    LedModeOp = 16,
    PowerSavingOp = 20,
    WowConfig = 21,
    WowQuery = 22,
    WowFeature = 24,
    CarrierDetectOp = 28,
    RadarDetectOp = 29,
    SwitchChannelOp = 30,
    CalibrationOp = 31,
    BeaconOp = 32,
    AntennaOp = 33,
}

impl McuCommand {
    pub fn from_raw(raw: u32) -> Result<Self, DecodeError> {
        use McuCommand::*;

        Ok(match raw {
            1 => FunSetOp,
            2 => LoadCr,
            3 => InitGainOp,
            6 => DyncVgaOp,
            7 => TdlsChSw,
            8 => BurstWrite,
            9 => ReadModifyWrite,
            10 => RandomRead,
            11 => BurstRead,
            12 => RandomWrite,
            16 => LedModeOp,
            20 => PowerSavingOp,
            21 => WowConfig,
            22 => WowQuery,
            24 => WowFeature,
            28 => CarrierDetectOp,
            29 => RadarDetectOp,
            30 => SwitchChannelOp,
            31 => CalibrationOp,
            32 => BeaconOp,
            33 => AntennaOp,
            _ => return Err(unrecognized(HeaderField::CommandType, raw)),
        })
    }
}

/// 4-bit sequence number used to pair commands with their completion event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct SequenceNumber(u8);

impl SequenceNumber {
    pub const MAX: u8 = 0x0f;

    /// Returns `None` if `value` does not fit in 4 bits.
    pub const fn new(value: u8) -> Option<Self> {
        if value <= Self::MAX {
            Some(Self(value))
        } else {
            None
        }
    }

    pub(crate) const fn from_bits(raw: u32) -> Self {
        Self((raw & Self::MAX as u32) as u8)
    }

    pub const fn get(self) -> u8 {
        self.0
    }
}

// Every field handed to from_raw is at most 7 bits wide
fn unrecognized(field: HeaderField, raw: u32) -> DecodeError {
    DecodeError::Unrecognized {
        field,
        raw: raw as u8,
    }
}
