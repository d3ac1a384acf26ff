//! # RX Header Decoder
//!
//! Parses the 32-bit info word the device puts in front of every received
//! frame. The top two bits select the sub-layout: packet frames carry
//! checksum offload results, command frames carry MCU events.
//!
//! Decoding never reads past the buffer and never panics on device input.
//! Reserved enum values come back as [`DecodeError::Unrecognized`] so newer
//! firmware can be tolerated by dropping the frame.
//!
//! Frames addressed to [`Port::Discard`] stop decoding at the port: their
//! type-specific bits are never interpreted and come back as
//! [`RxKind::Discarded`].
//!
//! ## Length field
//! The length is whatever the sender wrote. Our own encoder writes the payload
//! length rounded up to 4, so a decoded payload may end in up to three
//! alignment bytes. Exact boundaries come from the payload's own framing.

use crate::core::bits::{self, round_up4, DMA_HDR_LEN, DMA_TRAILER_LEN};
use crate::core::tx::pad_len;
use crate::core::types::{EventType, Port, QueueSelect, SequenceNumber, TransferType};
use crate::error::DecodeError;
use bytes::{BufMut, BytesMut};

/// Largest payload whose rounded length fits the 14-bit length field.
pub const MAX_RX_PAYLOAD: usize = bits::rx::LEN.max() as usize & !3;

/// Checksum offload and MAC info of a received data frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RxPacketFlags {
    pub udp_checksum_error: bool,
    pub tcp_checksum_error: bool,
    pub ip_checksum_error: bool,
    pub is_80211: bool,
    /// Hardware finished L3/L4 checksum checks
    pub l3l4_done: bool,
    /// 3-bit MAC header length, units defined by the MAC layer
    pub mac_header_len: u8,
}

impl RxPacketFlags {
    fn to_bits(self) -> u32 {
        use bits::rx::pkt::*;

        debug_assert!(u32::from(self.mac_header_len) <= MAC_LEN.max());

        UDP_ERR.flag(self.udp_checksum_error)
            | TCP_ERR.flag(self.tcp_checksum_error)
            | IP_ERR.flag(self.ip_checksum_error)
            | PKT_80211.flag(self.is_80211)
            | L3L4_DONE.flag(self.l3l4_done)
            | MAC_LEN.set(u32::from(self.mac_header_len))
    }

    fn from_bits(word: u32) -> Self {
        use bits::rx::pkt::*;

        Self {
            udp_checksum_error: UDP_ERR.is_set(word),
            tcp_checksum_error: TCP_ERR.is_set(word),
            ip_checksum_error: IP_ERR.is_set(word),
            is_80211: PKT_80211.is_set(word),
            l3l4_done: L3L4_DONE.is_set(word),
            mac_header_len: MAC_LEN.get(word) as u8,
        }
    }

    /// Any checksum failure reported by the offload engine.
    pub fn has_checksum_error(&self) -> bool {
        self.udp_checksum_error || self.tcp_checksum_error || self.ip_checksum_error
    }
}

/// MCU event header fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RxEventFlags {
    /// Not a response to a host command
    pub self_generated: bool,
    pub seq: SequenceNumber,
    pub event: EventType,
}

impl RxEventFlags {
    fn to_bits(self) -> u32 {
        use bits::rx::cmd::*;

        SELF_GEN.flag(self.self_generated)
            | CMD_SEQ.set(u32::from(self.seq.get()))
            | EVT_TYPE.set(self.event as u32)
    }

    fn from_bits(word: u32) -> Result<Self, DecodeError> {
        use bits::rx::cmd::*;

        Ok(Self {
            self_generated: SELF_GEN.is_set(word),
            seq: SequenceNumber::from_bits(CMD_SEQ.get(word)),
            event: EventType::from_raw(EVT_TYPE.get(word))?,
        })
    }
}

/// Type-specific part of an RX header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RxKind {
    Packet(RxPacketFlags),
    Event(RxEventFlags),
    /// Discard port frame; flag bits left unparsed
    Discarded(TransferType),
}

/// Everything in an RX header except the length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RxInfo {
    pub port: Port,
    pub qsel: QueueSelect,
    pub pcie_intr: bool,
    pub kind: RxKind,
}

impl RxInfo {
    pub fn packet(port: Port, flags: RxPacketFlags) -> Self {
        Self {
            port,
            qsel: QueueSelect::default(),
            pcie_intr: false,
            kind: RxKind::Packet(flags),
        }
    }

    pub fn event(port: Port, flags: RxEventFlags) -> Self {
        Self {
            port,
            qsel: QueueSelect::default(),
            pcie_intr: false,
            kind: RxKind::Event(flags),
        }
    }

    pub fn transfer_type(&self) -> TransferType {
        match self.kind {
            RxKind::Packet(_) => TransferType::Packet,
            RxKind::Event(_) => TransferType::Command,
            RxKind::Discarded(transfer_type) => transfer_type,
        }
    }

    pub fn to_word(&self, len: usize) -> u32 {
        let flags = match self.kind {
            RxKind::Packet(flags) => flags.to_bits(),
            RxKind::Event(flags) => flags.to_bits(),
            RxKind::Discarded(_) => 0,
        };

        flags
            | bits::rx::LEN.set(round_up4(len) as u32)
            | bits::rx::PCIE_INTR.flag(self.pcie_intr)
            | bits::rx::QSEL.set(self.qsel as u32)
            | bits::rx::PORT.set(self.port as u32)
            | bits::rx::TYPE.set(self.transfer_type() as u32)
    }

    /// Unpack a header word. The type is resolved first since it decides how
    /// the flag bits read.
    pub fn from_word(word: u32) -> Result<(Self, usize), DecodeError> {
        let transfer_type = TransferType::from_raw(bits::rx::TYPE.get(word))?;
        let port = Port::from_raw(bits::rx::PORT.get(word))?;
        let kind = match transfer_type {
            _ if port == Port::Discard => RxKind::Discarded(transfer_type),
            TransferType::Packet => RxKind::Packet(RxPacketFlags::from_bits(word)),
            TransferType::Command => RxKind::Event(RxEventFlags::from_bits(word)?),
        };

        let info = Self {
            port,
            qsel: QueueSelect::from_bits(bits::rx::QSEL.get(word)),
            pcie_intr: bits::rx::PCIE_INTR.is_set(word),
            kind,
        };
        Ok((info, bits::rx::LEN.get(word) as usize))
    }
}

/// A decoded frame borrowing its payload from the receive buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RxFrame<'a> {
    pub info: RxInfo,
    pub declared_len: usize,
    /// The `declared_len` bytes after the header; padding excluded
    pub payload: &'a [u8],
}

impl RxFrame<'_> {
    pub fn port(&self) -> Port {
        self.info.port
    }

    pub fn transfer_type(&self) -> TransferType {
        self.info.transfer_type()
    }
}

/// Decode the frame at the start of `buf`.
pub fn decode(buf: &[u8]) -> Result<RxFrame<'_>, DecodeError> {
    let Some((head, rest)) = buf.split_first_chunk::<DMA_HDR_LEN>() else {
        return Err(DecodeError::TooShort { len: buf.len() });
    };

    let (info, declared_len) = RxInfo::from_word(u32::from_le_bytes(*head))?;
    let payload = rest.get(..declared_len).ok_or(DecodeError::LengthOverflow {
        declared: declared_len,
        available: rest.len(),
    })?;

    Ok(RxFrame {
        info,
        declared_len,
        payload,
    })
}

/// Append a device to host frame to `dst`, laid out exactly like a TX frame.
pub fn wrap_rx(payload: &[u8], info: &RxInfo, dst: &mut BytesMut) {
    debug_assert!(payload.len() <= MAX_RX_PAYLOAD);

    let pad = pad_len(payload.len());
    dst.reserve(DMA_HDR_LEN + payload.len() + pad);
    dst.put_u32_le(info.to_word(payload.len()));
    dst.extend_from_slice(payload);
    dst.put_bytes(0, pad);
}

/// Bytes the frame starting with `word` occupies in an aggregate transfer.
#[inline]
pub(crate) fn stride(word: u32, trailer_len: usize) -> usize {
    DMA_HDR_LEN + bits::rx::LEN.get(word) as usize + trailer_len
}

/// Iterator over the frames of one aggregated bulk-in transfer.
///
/// A frame with an unrecognized field yields its error and iteration moves on,
/// since its length is still trustworthy. A truncated frame ends iteration,
/// reported as [`DecodeError::LengthOverflow`] even after an unrecognized
/// field.
#[derive(Debug, Clone)]
pub struct RxSegments<'a> {
    buf: &'a [u8],
    trailer_len: usize,
    pending: Option<DecodeError>,
    done: bool,
}

impl<'a> RxSegments<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self::with_trailer(buf, DMA_TRAILER_LEN)
    }

    pub fn with_trailer(buf: &'a [u8], trailer_len: usize) -> Self {
        Self {
            buf,
            trailer_len,
            pending: None,
            done: false,
        }
    }

    /// Bytes not consumed yet.
    pub fn remainder(&self) -> &'a [u8] {
        self.buf
    }
}

impl<'a> Iterator for RxSegments<'a> {
    type Item = Result<RxFrame<'a>, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(err) = self.pending.take() {
            return Some(Err(err));
        }
        if self.done || self.buf.is_empty() {
            return None;
        }

        let buf = self.buf;
        let result = decode(buf);
        match result {
            Ok(_) | Err(DecodeError::Unrecognized { .. }) => {
                // decode got past the header so at least 4 bytes are there
                let word = u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
                let declared = bits::rx::LEN.get(word) as usize;
                let available = buf.len() - DMA_HDR_LEN;
                if declared > available {
                    self.pending = Some(DecodeError::LengthOverflow {
                        declared,
                        available,
                    });
                    self.done = true;
                    self.buf = &[];
                } else {
                    let advance = stride(word, self.trailer_len).min(buf.len());
                    self.buf = &buf[advance..];
                }
            }
            Err(_) => {
                self.done = true;
                self.buf = &[];
            }
        }

        Some(result)
    }
}

impl std::iter::FusedIterator for RxSegments<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HeaderField;

    fn event(seq: u8, event: EventType) -> RxInfo {
        RxInfo::event(
            Port::CpuRx,
            RxEventFlags {
                self_generated: false,
                seq: SequenceNumber::new(seq).unwrap(),
                event,
            },
        )
    }

    #[test]
    fn test_decode_packet_header() {
        // len 8, UDP err, 802.11, MAC_LEN 5, PCIE_INTR, QSEL 1, port 0, type 0
        let word: u32 = 8 | (1 << 16) | (1 << 19) | (5 << 21) | (1 << 24) | (1 << 25);
        let mut buf = word.to_le_bytes().to_vec();
        buf.extend_from_slice(&[9; 8]);
        buf.extend_from_slice(&[0; 4]);

        let frame = decode(&buf).unwrap();
        assert_eq!(frame.declared_len, 8);
        assert_eq!(frame.payload, &[9; 8]);
        assert_eq!(frame.info.port, Port::Wlan);
        assert_eq!(frame.info.qsel, QueueSelect::Hcca);
        assert!(frame.info.pcie_intr);
        let RxKind::Packet(flags) = frame.info.kind else {
            panic!("expected packet");
        };
        assert!(flags.udp_checksum_error);
        assert!(flags.is_80211);
        assert!(!flags.l3l4_done);
        assert_eq!(flags.mac_header_len, 5);
        assert!(flags.has_checksum_error());
    }

    #[test]
    fn test_decode_event_header() {
        let word: u32 = 4 | (1 << 15) | (3 << 16) | (4 << 20) | (1 << 27) | (1 << 30);
        let mut buf = word.to_le_bytes().to_vec();
        buf.extend_from_slice(&[1, 2, 3, 4]);

        let frame = decode(&buf).unwrap();
        assert_eq!(frame.transfer_type(), TransferType::Command);
        assert_eq!(frame.port(), Port::CpuRx);
        assert_eq!(
            frame.info.kind,
            RxKind::Event(RxEventFlags {
                self_generated: true,
                seq: SequenceNumber::new(3).unwrap(),
                event: EventType::WowRsp,
            })
        );
    }

    #[test]
    fn test_too_short() {
        assert_eq!(decode(&[]), Err(DecodeError::TooShort { len: 0 }));
        assert_eq!(decode(&[1, 2, 3]), Err(DecodeError::TooShort { len: 3 }));
    }

    #[test]
    fn test_length_overflow() {
        let word: u32 = 0x3fff;
        let mut buf = word.to_le_bytes().to_vec();
        buf.extend_from_slice(&[0; 16]);

        assert_eq!(
            decode(&buf),
            Err(DecodeError::LengthOverflow {
                declared: 0x3fff,
                available: 16
            })
        );
    }

    #[test]
    fn test_unrecognized_values() {
        let port_word: u32 = 7 << 27;
        assert_eq!(
            decode(&port_word.to_le_bytes()),
            Err(DecodeError::Unrecognized {
                field: HeaderField::Port,
                raw: 7
            })
        );

        let type_word: u32 = 3 << 30;
        assert_eq!(
            decode(&type_word.to_le_bytes()),
            Err(DecodeError::Unrecognized {
                field: HeaderField::TransferType,
                raw: 3
            })
        );

        let event_word: u32 = (1 << 30) | (0xf << 20);
        assert_eq!(
            decode(&event_word.to_le_bytes()),
            Err(DecodeError::Unrecognized {
                field: HeaderField::EventType,
                raw: 0xf
            })
        );
    }

    #[test]
    fn test_wrap_rx_then_decode() {
        let info = event(9, EventType::CmdDone);
        let mut dst = BytesMut::new();
        wrap_rx(&[0xab; 6], &info, &mut dst);

        assert_eq!(dst.len(), 4 + 6 + 6);
        let frame = decode(&dst).unwrap();
        assert_eq!(frame.info, info);
        assert_eq!(frame.declared_len, 8);
        assert_eq!(frame.payload, &[0xab, 0xab, 0xab, 0xab, 0xab, 0xab, 0, 0]);
    }

    #[test]
    fn test_segments_skip_unrecognized() {
        let mut dst = BytesMut::new();
        wrap_rx(&[1; 4], &event(1, EventType::CmdDone), &mut dst);
        // Reserved event type 9 with a 4-byte body and trailer
        let bad: u32 = 4 | (1 << 30) | (9 << 20);
        dst.put_u32_le(bad);
        dst.put_bytes(0, 8);
        wrap_rx(&[2; 4], &event(2, EventType::CmdError), &mut dst);

        let results: Vec<_> = RxSegments::new(&dst).collect();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().payload, &[1; 4]);
        assert!(matches!(
            results[1],
            Err(DecodeError::Unrecognized {
                field: HeaderField::EventType,
                raw: 9
            })
        ));
        assert_eq!(results[2].as_ref().unwrap().payload, &[2; 4]);
    }

    #[test]
    fn test_discard_port_skips_flag_parsing() {
        // Reserved event type 9 behind the discard port
        let word: u32 = 4 | (9 << 20) | (6 << 27) | (1 << 30);
        let mut buf = word.to_le_bytes().to_vec();
        buf.extend_from_slice(&[0; 8]);

        let frame = decode(&buf).unwrap();
        assert_eq!(frame.port(), Port::Discard);
        assert_eq!(frame.info.kind, RxKind::Discarded(TransferType::Command));
        assert_eq!(frame.payload, &[0; 4]);
    }

    #[test]
    fn test_segments_report_truncation_after_unrecognized() {
        let mut dst = BytesMut::new();
        wrap_rx(&[1; 4], &event(1, EventType::CmdDone), &mut dst);
        // Reserved event type whose length runs past the transfer
        dst.put_u32_le(64 | (1 << 30) | (9 << 20));
        dst.put_bytes(0, 10);

        let mut segments = RxSegments::new(&dst);
        assert!(segments.next().unwrap().is_ok());
        assert!(matches!(
            segments.next(),
            Some(Err(DecodeError::Unrecognized {
                field: HeaderField::EventType,
                raw: 9
            }))
        ));
        assert_eq!(
            segments.next(),
            Some(Err(DecodeError::LengthOverflow {
                declared: 64,
                available: 10
            }))
        );
        assert!(segments.next().is_none());
        assert!(segments.remainder().is_empty());
    }

    #[test]
    fn test_segments_stop_on_truncation() {
        let mut dst = BytesMut::new();
        wrap_rx(&[1; 4], &event(1, EventType::CmdDone), &mut dst);
        dst.put_u32_le(64);
        dst.put_bytes(0, 10);
        wrap_rx(&[2; 4], &event(2, EventType::CmdDone), &mut dst);

        let mut segments = RxSegments::new(&dst);
        assert!(segments.next().unwrap().is_ok());
        assert!(matches!(
            segments.next(),
            Some(Err(DecodeError::LengthOverflow { declared: 64, .. }))
        ));
        assert!(segments.next().is_none());
        assert!(segments.remainder().is_empty());
    }
}
