//! Network transport layer: message dispatch, addressed filtering and datagram transport.

use embedded_can::nb::Can;
use rand_core::RngCore;

use crate::datagram::{DatagramError, DatagramStore, Fragments, Payload, STORE_CAPACITY};
use crate::id::{ControlFrame, FrameKind, FrameType};
use crate::mti::{self, error_code};
use crate::queue::QueueError;
use crate::transfer::{FrameTransfer, Timers};
use crate::{Alias, CanFrame, Id, NodeConfig, NodeId};

/// Reply-pending flag sent in Datagram Received OK.
const REPLY_PENDING: u8 = 0x80;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum SendError {
    /// Not enough room in the transmit queue; nothing was queued.
    QueueFull,
    /// Message payload does not fit a single frame.
    PayloadTooLong,
    DatagramTooLong { actual: usize },
    /// Too many datagrams awaiting acknowledgment.
    TooManyPending,
}

impl From<QueueError> for SendError {
    fn from(_: QueueError) -> Self {
        SendError::QueueFull
    }
}

pub type Result<T> = core::result::Result<T, SendError>;

/// Outbound services offered to the application.
pub trait Transport {
    fn alias(&self) -> Alias;
    fn node_id(&self) -> NodeId;
    fn is_permitted(&self) -> bool;

    /// Queues a single frame global or addressed message. Addressed messages carry
    /// the destination alias prefix in `payload`.
    fn send_message(&mut self, mti: u16, payload: &[u8]) -> Result<()>;

    /// Queues a datagram of up to 72 bytes, optionally preceded by a Datagram
    /// Received OK for the one the peer just sent.
    fn send_datagram(&mut self, destination: Alias, payload: &[u8], ack_prior: bool) -> Result<()>;

    fn send_datagram_ok(&mut self, destination: Alias) -> Result<()>;

    fn send_datagram_rejected(&mut self, destination: Alias, error_code: u16) -> Result<()>;
}

/// Upcalls from the network layer. Each one gets the transport so replies can be
/// sent from inside the handler.
pub trait Application {
    /// The node finished alias allocation and announced itself.
    fn initialization_complete(&mut self, transport: &mut dyn Transport);

    /// An addressed message for this node with an MTI the network layer does not handle.
    fn message(&mut self, transport: &mut dyn Transport, mti: u16, source: Alias, payload: &[u8]);

    /// A complete datagram addressed to this node.
    fn datagram(&mut self, transport: &mut dyn Transport, source: Alias, payload: &[u8]);
}

pub struct Network<C, T, R> {
    link: FrameTransfer<C, T, R>,
    protocols: u32,
    inbound: DatagramStore<STORE_CAPACITY>,
    outbound: DatagramStore<STORE_CAPACITY>,
}

impl<C, T, R> Network<C, T, R>
where
    C: Can,
    T: Timers,
    R: RngCore,
{
    pub fn new(config: &NodeConfig, can: C, timers: T, rng: R) -> Self {
        Network {
            link: FrameTransfer::new(config, can, timers, rng),
            protocols: config.protocols,
            inbound: DatagramStore::new(),
            outbound: DatagramStore::new(),
        }
    }

    pub fn link(&mut self) -> &mut FrameTransfer<C, T, R> {
        &mut self.link
    }

    /// Datagrams sent to `peer` and not yet acknowledged.
    pub fn pending_datagram(&self, peer: Alias) -> Option<&[u8]> {
        self.outbound.get(peer)
    }

    /// Partial datagram being reassembled from `peer`.
    pub fn partial_datagram(&self, peer: Alias) -> Option<&[u8]> {
        self.inbound.get(peer)
    }

    /// Announces the node once its alias is permitted. The announcement goes ahead of
    /// traffic queued while the alias was inhibited.
    pub fn initialized<A: Application>(&mut self, app: &mut A) {
        let id = Id::message(mti::INITIALIZATION_COMPLETE, self.link.alias());
        let queued = CanFrame::new(id, &self.link.node_id().to_bytes())
            .map_or(false, |frame| self.link.queue_frame_first(frame).is_ok());
        if !queued {
            log::error!("initialization complete not queued");
        }
        app.initialization_complete(self);
    }

    /// Processes one inbound frame.
    pub fn handle_frame<A: Application>(&mut self, frame: &CanFrame, app: &mut A) {
        let id = frame.header();
        if id.kind() == FrameKind::Control(ControlFrame::AliasMapReset) {
            if let Ok(peer) = Alias::new(id.source()) {
                if peer != self.link.alias() {
                    self.forget(peer);
                }
            }
        }

        if !self.link.handle_frame(frame) {
            return;
        }

        let source = match Alias::new(id.source()) {
            Ok(source) => source,
            Err(_) => {
                log::debug!("frame without source alias: {:?}", id);
                return;
            }
        };

        match id.kind() {
            FrameKind::Message(FrameType::GlobalAddressed) => {
                self.handle_message(id.variable_field(), source, frame.data(), app)
            }
            FrameKind::Message(FrameType::Stream) => {
                log::debug!("stream frame from {} ignored", source);
            }
            FrameKind::Message(frame_type) => {
                if id.variable_field() == self.link.alias().value() {
                    self.handle_datagram(frame_type, source, frame.data(), app);
                }
            }
            FrameKind::Control(_) | FrameKind::Reserved => {}
        }
    }

    /// Drops datagram state for a peer whose alias was released.
    fn forget(&mut self, peer: Alias) {
        let partial = self.inbound.take(peer).is_some();
        let pending = self.outbound.take(peer).is_some();
        if partial || pending {
            log::debug!("alias {} released, datagram state dropped", peer);
        }
    }

    fn addressed_to_us(&self, data: &[u8]) -> bool {
        Alias::from_prefix(data).map_or(false, |destination| destination == self.link.alias())
    }

    fn handle_message<A: Application>(&mut self, mti: u16, source: Alias, data: &[u8], app: &mut A) {
        let node_id = self.link.node_id();
        match mti {
            mti::VERIFY_NODE_ID_GLOBAL => {
                if data.is_empty() || node_id.matches(data) {
                    self.reply(mti::VERIFIED_NODE_ID, &node_id.to_bytes());
                }
            }
            mti::VERIFY_NODE_ID_ADDRESSED => {
                if self.addressed_to_us(data) {
                    self.reply(mti::VERIFIED_NODE_ID, &node_id.to_bytes());
                }
            }
            mti::PROTOCOL_SUPPORT_INQUIRY => {
                if self.addressed_to_us(data) {
                    let prefix = source.to_prefix();
                    let flags = self.protocols;
                    let reply = [
                        prefix[0],
                        prefix[1],
                        (flags >> 16) as u8,
                        (flags >> 8) as u8,
                        flags as u8,
                        0,
                        0,
                        0,
                    ];
                    self.reply(mti::PROTOCOL_SUPPORT_REPLY, &reply);
                }
            }
            mti::DATAGRAM_RECEIVED_OK => {
                if self.addressed_to_us(data) && self.outbound.take(source).is_some() {
                    log::debug!("datagram to {} acknowledged", source);
                }
            }
            mti::DATAGRAM_REJECTED => {
                if self.addressed_to_us(data) && data.len() >= 4 {
                    let code = u16::from_be_bytes([data[2], data[3]]);
                    self.datagram_rejected(source, code);
                }
            }
            mti::INITIALIZATION_COMPLETE
            | mti::INITIALIZATION_COMPLETE_SIMPLE
            | mti::VERIFIED_NODE_ID
            | mti::VERIFIED_NODE_ID_SIMPLE
            | mti::OPTIONAL_INTERACTION_REJECTED
            | mti::TERMINATE_DUE_TO_ERROR
            | mti::PROTOCOL_SUPPORT_REPLY
            | mti::PRODUCER_CONSUMER_EVENT_REPORT
            | mti::IDENTIFY_CONSUMER
            | mti::CONSUMER_IDENTIFIED_VALID
            | mti::CONSUMER_IDENTIFIED_INVALID
            | mti::CONSUMER_IDENTIFIED_UNKNOWN
            | mti::CONSUMER_RANGE_IDENTIFIED
            | mti::IDENTIFY_PRODUCER
            | mti::PRODUCER_IDENTIFIED_VALID
            | mti::PRODUCER_IDENTIFIED_INVALID
            | mti::PRODUCER_IDENTIFIED_UNKNOWN
            | mti::PRODUCER_RANGE_IDENTIFIED
            | mti::IDENTIFY_EVENTS_GLOBAL
            | mti::IDENTIFY_EVENTS_ADDRESSED
            | mti::LEARN_EVENT => {}
            _ => {
                if mti::is_addressed(mti) && self.addressed_to_us(data) {
                    app.message(self, mti, source, data);
                }
            }
        }
    }

    fn datagram_rejected(&mut self, source: Alias, code: u16) {
        if !error_code::is_temporary(code) {
            log::warn!("datagram to {} rejected with {:04X}, dropping", source, code);
            self.outbound.take(source);
            return;
        }

        let payload = self.outbound.get(source).and_then(|p| Payload::from_slice(p).ok());
        match payload {
            Some(payload) => {
                log::info!("datagram to {} rejected with {:04X}, resending", source, code);
                if let Err(e) = self.queue_datagram(source, &payload) {
                    log::error!("datagram resend to {} not queued: {:?}", source, e);
                }
            }
            None => log::debug!("rejection from {} without datagram in flight", source),
        }
    }

    fn handle_datagram<A: Application>(
        &mut self,
        frame_type: FrameType,
        source: Alias,
        data: &[u8],
        app: &mut A,
    ) {
        let result = match frame_type {
            FrameType::DatagramComplete => {
                app.datagram(self, source, data);
                return;
            }
            FrameType::DatagramFirst => self.inbound.start(source, data),
            FrameType::DatagramMiddle => self.inbound.append(source, data).map(|_| ()),
            FrameType::DatagramLast => match self.inbound.append(source, data) {
                Ok(_) => match self.inbound.take(source) {
                    Some(payload) => {
                        app.datagram(self, source, &payload);
                        return;
                    }
                    None => Err(DatagramError::NoRecord),
                },
                Err(e) => Err(e),
            },
            FrameType::GlobalAddressed | FrameType::Stream => return,
        };

        if let Err(e) = result {
            log::warn!("datagram fragment from {} refused: {:?}", source, e);
            let code = match e {
                DatagramError::TooLong { .. } => error_code::PERMANENT_INVALID_ARGUMENTS,
                DatagramError::NoRecord | DatagramError::StoreFull => {
                    error_code::TEMPORARY_OUT_OF_ORDER
                }
            };
            if let Err(e) = self.send_datagram_rejected(source, code) {
                log::error!("datagram rejection to {} not queued: {:?}", source, e);
            }
        }
    }

    fn reply(&mut self, mti: u16, payload: &[u8]) {
        if let Err(e) = self.send_message(mti, payload) {
            log::error!("reply {:03X} not queued: {:?}", mti, e);
        }
    }

    fn queue_datagram(&mut self, destination: Alias, payload: &[u8]) -> Result<()> {
        let fragments = Fragments::new(payload)
            .map_err(|_| SendError::DatagramTooLong { actual: payload.len() })?;
        if fragments.frames() > self.link.queue_space() {
            return Err(SendError::QueueFull);
        }
        let source = self.link.alias();
        for (frame_type, piece) in fragments {
            let id = Id::datagram(frame_type, destination, source);
            if let Some(frame) = CanFrame::new(id, piece) {
                self.link.queue_frame(frame)?;
            }
        }
        Ok(())
    }
}

impl<C, T, R> Transport for Network<C, T, R>
where
    C: Can,
    T: Timers,
    R: RngCore,
{
    fn alias(&self) -> Alias {
        self.link.alias()
    }

    fn node_id(&self) -> NodeId {
        self.link.node_id()
    }

    fn is_permitted(&self) -> bool {
        self.link.is_permitted()
    }

    fn send_message(&mut self, mti: u16, payload: &[u8]) -> Result<()> {
        let frame = CanFrame::new(Id::message(mti, self.link.alias()), payload)
            .ok_or(SendError::PayloadTooLong)?;
        self.link.queue_frame(frame)?;
        Ok(())
    }

    fn send_datagram(&mut self, destination: Alias, payload: &[u8], ack_prior: bool) -> Result<()> {
        let frames = Fragments::new(payload)
            .map_err(|_| SendError::DatagramTooLong {
                actual: payload.len(),
            })?
            .frames();
        let needed = frames + if ack_prior { 1 } else { 0 };
        if needed > self.link.queue_space() {
            return Err(SendError::QueueFull);
        }

        self.outbound.start(destination, payload).map_err(|e| match e {
            DatagramError::TooLong { actual } => SendError::DatagramTooLong { actual },
            DatagramError::NoRecord | DatagramError::StoreFull => SendError::TooManyPending,
        })?;
        if ack_prior {
            self.send_datagram_ok(destination)?;
        }
        self.queue_datagram(destination, payload)
    }

    fn send_datagram_ok(&mut self, destination: Alias) -> Result<()> {
        let prefix = destination.to_prefix();
        self.send_message(mti::DATAGRAM_RECEIVED_OK, &[prefix[0], prefix[1], REPLY_PENDING])
    }

    fn send_datagram_rejected(&mut self, destination: Alias, error_code: u16) -> Result<()> {
        let prefix = destination.to_prefix();
        let code = error_code.to_be_bytes();
        self.send_message(mti::DATAGRAM_REJECTED, &[prefix[0], prefix[1], code[0], code[1]])
    }
}
