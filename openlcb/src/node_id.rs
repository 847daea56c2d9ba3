use core::convert::TryFrom;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum NodeIdError {
    OutOfRange,
    InvalidLength,
}

pub type Result<T> = core::result::Result<T, NodeIdError>;

/// The 48-bit unique identifier assigned to a node.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct NodeId(u64);

impl NodeId {
    pub const MAX: u64 = 0xffff_ffff_ffff;

    pub fn new(id: u64) -> Result<Self> {
        if id > Self::MAX {
            return Err(NodeIdError::OutOfRange);
        }
        Ok(NodeId(id))
    }

    /// Big-endian wire form, as carried by AMD/AMR frames and identification messages.
    pub fn to_bytes(&self) -> [u8; 6] {
        let b = self.0.to_be_bytes();
        [b[2], b[3], b[4], b[5], b[6], b[7]]
    }

    /// One of the four 12-bit slices sent in the CheckID frames, most significant first.
    pub fn slice(&self, index: usize) -> u16 {
        let shift = 36 - 12 * (index as u64 & 0x3);
        ((self.0 >> shift) & 0xfff) as u16
    }

    /// True if `data` is exactly the wire form of this id.
    pub fn matches(&self, data: &[u8]) -> bool {
        data == &self.to_bytes()[..]
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl TryFrom<&[u8]> for NodeId {
    type Error = NodeIdError;

    fn try_from(data: &[u8]) -> Result<NodeId> {
        if data.len() != 6 {
            return Err(NodeIdError::InvalidLength);
        }
        let id = data.iter().fold(0u64, |acc, b| (acc << 8) | *b as u64);
        Ok(NodeId(id))
    }
}

impl core::fmt::Display for NodeId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let b = self.to_bytes();
        write!(
            f,
            "{:02X}.{:02X}.{:02X}.{:02X}.{:02X}.{:02X}",
            b[0], b[1], b[2], b[3], b[4], b[5]
        )
    }
}
