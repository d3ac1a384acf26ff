//! # DMA Frame Codecs
//!
//! `tokio_util` codecs for the two directions of the USB pipe.
//!
//! [`TxCodec`] checks a payload against the configured size policy and wraps it.
//! [`RxCodec`] splits aggregated bulk-in data into frames without copying.
//! Malformed frames and frames for the discard port are counted and skipped;
//! they never end the stream.

use crate::config::CodecConfig;
use crate::core::bits::{self, DMA_HDR_LEN};
use crate::core::rx::{self, RxInfo};
use crate::core::tx::{self, TxInfo, TxKind};
use crate::core::types::Port;
use crate::error::{DecodeError, DmaError, Result};
use crate::utils::metrics::global_metrics;
use bytes::{Buf, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::{debug, warn};

/// Payload queued for transmission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxMessage {
    pub info: TxInfo,
    pub payload: Bytes,
}

/// Frame received from the device, payload split off the receive buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RxMessage {
    pub info: RxInfo,
    pub declared_len: usize,
    pub payload: Bytes,
}

#[derive(Debug, Clone)]
pub struct TxCodec {
    max_packet_len: usize,
    max_command_len: usize,
}

impl TxCodec {
    pub fn new(config: &CodecConfig) -> Self {
        Self {
            max_packet_len: config.max_packet_len.min(tx::MAX_TX_PAYLOAD),
            max_command_len: config.max_command_len.min(tx::MAX_TX_PAYLOAD),
        }
    }

    fn limit(&self, info: &TxInfo) -> usize {
        match info.kind {
            TxKind::Packet(_) => self.max_packet_len,
            TxKind::Command(_) => self.max_command_len,
        }
    }
}

impl Default for TxCodec {
    fn default() -> Self {
        Self::new(&CodecConfig::default())
    }
}

impl Encoder<TxMessage> for TxCodec {
    type Error = DmaError;

    fn encode(&mut self, item: TxMessage, dst: &mut BytesMut) -> Result<()> {
        let max = self.limit(&item.info);
        if item.payload.len() > max {
            global_metrics().oversized();
            return Err(DmaError::OversizedPayload {
                len: item.payload.len(),
                max,
            });
        }

        let start = dst.len();
        tx::wrap(&item.payload, &item.info, dst);
        global_metrics().frame_encoded((dst.len() - start) as u64);
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct RxCodec {
    trailer_len: usize,
}

impl RxCodec {
    pub fn new(config: &CodecConfig) -> Self {
        Self {
            trailer_len: config.rx_trailer_len,
        }
    }

    fn take_frame(&self, word: u32, mut frame: BytesMut) -> Option<RxMessage> {
        match RxInfo::from_word(word) {
            Ok((info, _)) if info.port == Port::Discard => {
                global_metrics().discarded();
                debug!("Discarding rx frame");
                None
            }
            Ok((info, declared_len)) => {
                frame.advance(DMA_HDR_LEN);
                frame.truncate(declared_len);
                global_metrics().frame_decoded(declared_len as u64);
                debug!(port = ?info.port, len = declared_len, "Decoded rx frame");
                Some(RxMessage {
                    info,
                    declared_len,
                    payload: frame.freeze(),
                })
            }
            Err(err) => {
                drop_frame(&err);
                None
            }
        }
    }
}

impl Default for RxCodec {
    fn default() -> Self {
        Self::new(&CodecConfig::default())
    }
}

impl Decoder for RxCodec {
    type Item = RxMessage;
    type Error = DmaError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<RxMessage>> {
        loop {
            let Some(head) = src.first_chunk::<DMA_HDR_LEN>() else {
                return Ok(None);
            };
            let word = u32::from_le_bytes(*head);
            let stride = rx::stride(word, self.trailer_len);

            if src.len() < stride {
                src.reserve(stride - src.len());
                return Ok(None);
            }

            let frame = src.split_to(stride);
            if let Some(msg) = self.take_frame(word, frame) {
                return Ok(Some(msg));
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<RxMessage>> {
        if let Some(msg) = self.decode(src)? {
            return Ok(Some(msg));
        }
        if src.is_empty() {
            return Ok(None);
        }

        // A final frame may arrive without its trailer
        let Some(head) = src.first_chunk::<DMA_HDR_LEN>() else {
            drop_frame(&DecodeError::TooShort { len: src.len() });
            src.clear();
            return Ok(None);
        };
        let word = u32::from_le_bytes(*head);
        let declared = bits::rx::LEN.get(word) as usize;
        if DMA_HDR_LEN + declared > src.len() {
            drop_frame(&DecodeError::LengthOverflow {
                declared,
                available: src.len() - DMA_HDR_LEN,
            });
            src.clear();
            return Ok(None);
        }

        let frame = src.split();
        Ok(self.take_frame(word, frame))
    }
}

fn drop_frame(err: &DecodeError) {
    warn!(error = %err, "Dropping malformed rx frame");
    global_metrics().decode_failed(err);
}
