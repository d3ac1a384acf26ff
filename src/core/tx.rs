//! # TX Header Encoder
//!
//! Builds the host to device DMA frame:
//!
//! ```text
//! |   4B   | xfer len |  4B  |      pad       |
//! | TXINFO | pkt/cmd  | zero | zero pad to 4B |
//! ```
//!
//! The length field carries `round_up(len, 4)`, and at least four zero bytes
//! always follow the payload. The device needs that trailer even when the
//! payload is already aligned.
//!
//! Flags for packets and commands occupy the same bits, so they live in
//! separate types under [`TxKind`]. It is impossible to build a command header
//! with packet flags.
//!
//! [`parse_tx`] reads a frame back the way the device would. The driver never
//! needs it on the data path; it backs loopback tests and device emulation.

use crate::core::bits::{self, round_up4, DMA_HDR_LEN, DMA_TRAILER_LEN};
use crate::core::types::{McuCommand, Port, QueueSelect, SequenceNumber, TransferType};
use crate::error::DecodeError;
use bytes::{BufMut, BytesMut};
use tracing::trace;

/// Largest payload whose rounded length still fits the 16-bit length field.
pub const MAX_TX_PAYLOAD: usize = bits::tx::LEN.max() as usize & !3;

/// Per-packet transmit flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TxPacketFlags {
    /// Another frame follows in the same transfer
    pub next_valid: bool,
    pub tx_burst: bool,
    /// Payload is an 802.11 frame rather than 802.3
    pub is_80211: bool,
    /// TCP segmentation offload
    pub tso: bool,
    /// Checksum offload
    pub cso: bool,
    /// TXWI is valid
    pub wiv: bool,
    pub qsel: QueueSelect,
}

impl TxPacketFlags {
    fn to_bits(self) -> u32 {
        use bits::tx::pkt::*;

        NEXT_VLD.flag(self.next_valid)
            | TX_BURST.flag(self.tx_burst)
            | IS_80211.flag(self.is_80211)
            | TSO.flag(self.tso)
            | CSO.flag(self.cso)
            | WIV.flag(self.wiv)
            | QSEL.set(self.qsel as u32)
    }

    fn from_bits(word: u32) -> Self {
        use bits::tx::pkt::*;

        Self {
            next_valid: NEXT_VLD.is_set(word),
            tx_burst: TX_BURST.is_set(word),
            is_80211: IS_80211.is_set(word),
            tso: TSO.is_set(word),
            cso: CSO.is_set(word),
            wiv: WIV.is_set(word),
            qsel: QueueSelect::from_bits(QSEL.get(word)),
        }
    }
}

/// MCU command header fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxCommandFlags {
    pub seq: SequenceNumber,
    pub command: McuCommand,
}

impl TxCommandFlags {
    fn to_bits(self) -> u32 {
        bits::tx::cmd::SEQ.set(self.seq.get() as u32)
            | bits::tx::cmd::TYPE.set(self.command as u32)
    }

    fn from_bits(word: u32) -> Result<Self, DecodeError> {
        Ok(Self {
            seq: SequenceNumber::from_bits(bits::tx::cmd::SEQ.get(word)),
            command: McuCommand::from_raw(bits::tx::cmd::TYPE.get(word))?,
        })
    }
}

/// Type-specific part of a TX header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxKind {
    Packet(TxPacketFlags),
    Command(TxCommandFlags),
}

/// Everything in a TX header except the length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxInfo {
    pub port: Port,
    pub kind: TxKind,
}

impl TxInfo {
    pub fn packet(port: Port, flags: TxPacketFlags) -> Self {
        Self {
            port,
            kind: TxKind::Packet(flags),
        }
    }

    pub fn command(port: Port, flags: TxCommandFlags) -> Self {
        Self {
            port,
            kind: TxKind::Command(flags),
        }
    }

    pub fn transfer_type(&self) -> TransferType {
        match self.kind {
            TxKind::Packet(_) => TransferType::Packet,
            TxKind::Command(_) => TransferType::Command,
        }
    }

    /// Pack the header word for a payload of `len` bytes.
    pub fn to_word(&self, len: usize) -> u32 {
        let flags = match self.kind {
            TxKind::Packet(flags) => flags.to_bits(),
            TxKind::Command(flags) => flags.to_bits(),
        };

        flags
            | bits::tx::LEN.set(round_up4(len) as u32)
            | bits::tx::D_PORT.set(self.port as u32)
            | bits::tx::TYPE.set(self.transfer_type() as u32)
    }

    /// Unpack a header word. Returns the info and the recorded length.
    pub fn from_word(word: u32) -> Result<(Self, usize), DecodeError> {
        let transfer_type = TransferType::from_raw(bits::tx::TYPE.get(word))?;
        let port = Port::from_raw(bits::tx::D_PORT.get(word))?;
        let kind = match transfer_type {
            TransferType::Packet => TxKind::Packet(TxPacketFlags::from_bits(word)),
            TransferType::Command => TxKind::Command(TxCommandFlags::from_bits(word)?),
        };

        Ok((Self { port, kind }, bits::tx::LEN.get(word) as usize))
    }
}

/// Bytes of zero padding written after a payload of `len` bytes.
#[inline]
pub const fn pad_len(len: usize) -> usize {
    let total = DMA_HDR_LEN + len;
    round_up4(total) - total + DMA_TRAILER_LEN
}

/// Full on-wire size of a frame carrying `len` payload bytes.
#[inline]
pub const fn frame_len(len: usize) -> usize {
    DMA_HDR_LEN + len + pad_len(len)
}

/// Append `[header][payload][padding]` to `dst`.
///
/// Payloads longer than [`MAX_TX_PAYLOAD`] violate the caller's size policy;
/// [`crate::core::codec::TxCodec`] enforces it.
pub fn wrap(payload: &[u8], info: &TxInfo, dst: &mut BytesMut) {
    debug_assert!(payload.len() <= MAX_TX_PAYLOAD);

    let word = info.to_word(payload.len());
    let pad = pad_len(payload.len());

    dst.reserve(DMA_HDR_LEN + payload.len() + pad);
    dst.put_u32_le(word);
    dst.extend_from_slice(payload);
    dst.put_bytes(0, pad);

    trace!(word, len = payload.len(), pad, "Wrapped tx frame");
}

/// Wrap a data frame for the WLAN port.
pub fn wrap_packet(payload: &[u8], qsel: QueueSelect, flags: TxPacketFlags, dst: &mut BytesMut) {
    let flags = TxPacketFlags { qsel, ..flags };
    wrap(payload, &TxInfo::packet(Port::Wlan, flags), dst);
}

/// Wrap an MCU command for the CPU tx port.
pub fn wrap_command(
    payload: &[u8],
    seq: SequenceNumber,
    command: McuCommand,
    dst: &mut BytesMut,
) {
    let info = TxInfo::command(Port::CpuTx, TxCommandFlags { seq, command });
    wrap(payload, &info, dst);
}

/// A TX frame as seen from the device side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxView<'a> {
    pub info: TxInfo,
    /// Length field as written, i.e. rounded up to 4
    pub declared_len: usize,
    pub payload: &'a [u8],
}

/// Parse a frame produced by [`wrap`].
pub fn parse_tx(buf: &[u8]) -> Result<TxView<'_>, DecodeError> {
    let Some((head, rest)) = buf.split_first_chunk::<DMA_HDR_LEN>() else {
        return Err(DecodeError::TooShort { len: buf.len() });
    };

    let (info, declared_len) = TxInfo::from_word(u32::from_le_bytes(*head))?;
    let payload = rest.get(..declared_len).ok_or(DecodeError::LengthOverflow {
        declared: declared_len,
        available: rest.len(),
    })?;

    Ok(TxView {
        info,
        declared_len,
        payload,
    })
}
