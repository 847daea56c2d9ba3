use core::time::Duration;

use crate::{mti::protocol, NodeId};

/// Observation window after the CheckID frames; the protocol minimum is 200 ms.
pub const ALIAS_WINDOW: Duration = Duration::from_millis(250);

/// Cadence of the transmit queue drain while there is a backlog.
pub const DRAIN_INTERVAL: Duration = Duration::from_millis(2);

/// Static configuration of a node.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct NodeConfig {
    pub node_id: NodeId,
    /// 24-bit bitmap answered to protocol support inquiries.
    pub protocols: u32,
    pub alias_window: Duration,
    pub drain_interval: Duration,
}

impl NodeConfig {
    pub fn new(node_id: NodeId) -> Self {
        NodeConfig {
            node_id,
            protocols: protocol::DEFAULT,
            alias_window: ALIAS_WINDOW,
            drain_interval: DRAIN_INTERVAL,
        }
    }

    pub fn with_protocols(mut self, protocols: u32) -> Self {
        self.protocols = protocols & 0xff_ffff;
        self
    }

    pub fn with_alias_window(mut self, window: Duration) -> Self {
        self.alias_window = window;
        self
    }

    pub fn with_drain_interval(mut self, interval: Duration) -> Self {
        self.drain_interval = interval;
        self
    }
}
