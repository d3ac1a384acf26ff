use crate::core::rx::{RxFrame, RxKind, RxSegments};
use crate::core::types::{EventType, Port};
use crate::error::constants::{
    ERR_DISCARD_HANDLER, ERR_DISPATCHER_READ_LOCK, ERR_DISPATCHER_WRITE_LOCK,
};
use crate::error::{DecodeError, DmaError, Result};
use crate::utils::metrics::global_metrics;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, instrument, warn};

type HandlerFn = dyn Fn(&RxFrame<'_>) -> Result<()> + Send + Sync + 'static;

/// Why a received frame was not delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Addressed to the discard port
    Discard,
    NoHandler,
    Malformed(DecodeError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Delivered,
    Dropped(DropReason),
}

/// Per-transfer tally returned by [`Dispatcher::dispatch_transfer`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferSummary {
    pub delivered: usize,
    pub dropped: Vec<DropReason>,
}

/// Routes decoded rx frames: data frames by port, MCU events by event type.
/// Cloning shares the handler tables.
#[derive(Clone)]
pub struct Dispatcher {
    ports: Arc<RwLock<HashMap<Port, Box<HandlerFn>>>>,
    events: Arc<RwLock<HashMap<EventType, Box<HandlerFn>>>>,
    trailer_len: usize,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::with_trailer(crate::core::bits::DMA_TRAILER_LEN)
    }

    /// Dispatcher for transfers whose frames are followed by `trailer_len` bytes.
    pub fn with_trailer(trailer_len: usize) -> Self {
        Self {
            ports: Arc::new(RwLock::new(HashMap::new())),
            events: Arc::new(RwLock::new(HashMap::new())),
            trailer_len,
        }
    }

    /// Handle packet frames arriving on `port`. Replaces any earlier handler.
    pub fn register_port<F>(&self, port: Port, handler: F) -> Result<()>
    where
        F: Fn(&RxFrame<'_>) -> Result<()> + Send + Sync + 'static,
    {
        if port == Port::Discard {
            return Err(DmaError::ConfigError(ERR_DISCARD_HANDLER.to_string()));
        }

        let mut ports = self
            .ports
            .write()
            .map_err(|_| DmaError::Custom(ERR_DISPATCHER_WRITE_LOCK.to_string()))?;
        ports.insert(port, Box::new(handler));
        Ok(())
    }

    /// Handle MCU events of type `event`, whatever port they arrive on.
    pub fn register_event<F>(&self, event: EventType, handler: F) -> Result<()>
    where
        F: Fn(&RxFrame<'_>) -> Result<()> + Send + Sync + 'static,
    {
        let mut events = self
            .events
            .write()
            .map_err(|_| DmaError::Custom(ERR_DISPATCHER_WRITE_LOCK.to_string()))?;
        events.insert(event, Box::new(handler));
        Ok(())
    }

    /// Deliver one decoded frame. Handler errors are returned as-is.
    pub fn dispatch(&self, frame: &RxFrame<'_>) -> Result<Outcome> {
        if frame.port() == Port::Discard || matches!(frame.info.kind, RxKind::Discarded(_)) {
            global_metrics().discarded();
            debug!(len = frame.declared_len, "Discarding rx frame");
            return Ok(Outcome::Dropped(DropReason::Discard));
        }

        let delivered = match frame.info.kind {
            RxKind::Packet(_) => {
                let ports = self
                    .ports
                    .read()
                    .map_err(|_| DmaError::Custom(ERR_DISPATCHER_READ_LOCK.to_string()))?;
                ports.get(&frame.port()).map(|handler| handler(frame))
            }
            RxKind::Event(flags) => {
                let events = self
                    .events
                    .read()
                    .map_err(|_| DmaError::Custom(ERR_DISPATCHER_READ_LOCK.to_string()))?;
                events.get(&flags.event).map(|handler| handler(frame))
            }
            RxKind::Discarded(_) => None,
        };

        match delivered {
            Some(result) => {
                result?;
                global_metrics().frame_delivered();
                Ok(Outcome::Delivered)
            }
            None => {
                global_metrics().no_handler();
                debug!(port = ?frame.port(), "No handler for rx frame");
                Ok(Outcome::Dropped(DropReason::NoHandler))
            }
        }
    }

    /// Decode and deliver every frame of one bulk-in transfer. Malformed
    /// frames are logged and dropped; only handler errors abort.
    #[instrument(skip(self, transfer), fields(len = transfer.len()))]
    pub fn dispatch_transfer(&self, transfer: &[u8]) -> Result<TransferSummary> {
        let mut summary = TransferSummary::default();

        for segment in RxSegments::with_trailer(transfer, self.trailer_len) {
            let outcome = match segment {
                Ok(frame) => {
                    global_metrics().frame_decoded(frame.declared_len as u64);
                    self.dispatch(&frame)?
                }
                Err(err) => {
                    warn!(error = %err, "Dropping malformed rx frame");
                    global_metrics().decode_failed(&err);
                    Outcome::Dropped(DropReason::Malformed(err))
                }
            };

            match outcome {
                Outcome::Delivered => summary.delivered += 1,
                Outcome::Dropped(reason) => summary.dropped.push(reason),
            }
        }

        Ok(summary)
    }
}
