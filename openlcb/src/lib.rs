#![no_std]

mod alias;
pub use alias::{Alias, AliasError};

mod node_id;
pub use node_id::{NodeId, NodeIdError};

pub mod id;
pub use id::{Id, IdError};

mod frame;
pub use frame::CanFrame;

pub mod mti;

mod config;
pub use config::{NodeConfig, ALIAS_WINDOW, DRAIN_INTERVAL};

pub mod queue;

pub mod datagram;

pub mod transfer;
pub use transfer::{AliasState, Timer, Timers};

pub mod network;
pub use network::{Application, SendError, Transport};

mod node;
pub use node::Node;
