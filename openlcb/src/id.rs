use crate::{Alias, NodeId};
use core::convert::TryFrom;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum IdError {
    InvalidId,
    InvalidFrameType,
    InvalidCheckIdIndex,
}

pub type Result<T> = core::result::Result<T, IdError>;

const RESERVED_BIT: u32 = 0x1000_0000;
const MESSAGE_BIT: u32 = 0x0800_0000;
const SOURCE_MASK: u32 = 0x0000_0fff;

/// Frame type field (bits 24-26) of an OpenLCB message frame.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum FrameType {
    GlobalAddressed = 1,
    DatagramComplete = 2,
    DatagramFirst = 3,
    DatagramMiddle = 4,
    DatagramLast = 5,
    Stream = 7,
}

impl TryFrom<u8> for FrameType {
    type Error = IdError;

    fn try_from(val: u8) -> Result<FrameType> {
        match val {
            1 => Ok(FrameType::GlobalAddressed),
            2 => Ok(FrameType::DatagramComplete),
            3 => Ok(FrameType::DatagramFirst),
            4 => Ok(FrameType::DatagramMiddle),
            5 => Ok(FrameType::DatagramLast),
            7 => Ok(FrameType::Stream),
            _ => Err(IdError::InvalidFrameType),
        }
    }
}

/// CAN control frames used to claim, defend, advertise, query and release an alias.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ControlFrame {
    /// CheckID carrying UID slice `0..=3`, most significant slice first.
    CheckId(u8),
    ReserveId,
    AliasMapDefinition,
    AliasMapEnquiry,
    AliasMapReset,
    /// Any other control frame (error information reports and reserved values).
    Other(u16),
}

impl ControlFrame {
    fn header(&self) -> u32 {
        match self {
            ControlFrame::CheckId(index) => RESERVED_BIT | ((7 - (*index as u32 & 0x3)) << 24),
            ControlFrame::ReserveId => 0x1070_0000,
            ControlFrame::AliasMapDefinition => 0x1070_1000,
            ControlFrame::AliasMapEnquiry => 0x1070_2000,
            ControlFrame::AliasMapReset => 0x1070_3000,
            ControlFrame::Other(field) => RESERVED_BIT | ((*field as u32) << 12),
        }
    }

    /// True for the frames that may go on the bus before an alias is permitted.
    pub fn allowed_while_inhibited(&self) -> bool {
        matches!(
            self,
            ControlFrame::CheckId(_) | ControlFrame::ReserveId | ControlFrame::AliasMapDefinition
        )
    }
}

/// What a header encodes once classified.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum FrameKind {
    Control(ControlFrame),
    Message(FrameType),
    /// OpenLCB message frame with a reserved frame type (0 or 6).
    Reserved,
}

/// 29-bit extended CAN header of an OpenLCB frame.
#[derive(Clone, Copy, PartialEq)]
pub struct Id(u32);

impl Id {
    pub fn check_id(index: u8, node_id: &NodeId, alias: Alias) -> Result<Self> {
        if index > 3 {
            return Err(IdError::InvalidCheckIdIndex);
        }
        let slice = node_id.slice(index as usize) as u32;
        Ok(Id(ControlFrame::CheckId(index).header() | (slice << 12) | alias.value() as u32))
    }

    pub fn control(frame: ControlFrame, alias: Alias) -> Self {
        Id(frame.header() | alias.value() as u32)
    }

    /// Global or addressed message; the destination of addressed messages travels in the payload.
    pub fn message(mti: u16, source: Alias) -> Self {
        Id::openlcb(FrameType::GlobalAddressed, mti, source)
    }

    pub fn datagram(frame_type: FrameType, destination: Alias, source: Alias) -> Self {
        Id::openlcb(frame_type, destination.value(), source)
    }

    fn openlcb(frame_type: FrameType, field: u16, source: Alias) -> Self {
        let mut id = RESERVED_BIT | MESSAGE_BIT;
        id |= (frame_type as u32) << 24;
        id |= (field as u32 & 0xfff) << 12;
        id |= source.value() as u32;
        Id(id)
    }

    /// Same header with the source alias replaced.
    pub fn with_source(&self, source: Alias) -> Self {
        Id((self.0 & !SOURCE_MASK) | source.value() as u32)
    }

    pub fn kind(&self) -> FrameKind {
        if self.0 & MESSAGE_BIT != 0 {
            match FrameType::try_from(((self.0 >> 24) & 0x7) as u8) {
                Ok(frame_type) => FrameKind::Message(frame_type),
                Err(_) => FrameKind::Reserved,
            }
        } else {
            let frame_type = ((self.0 >> 24) & 0x7) as u8;
            let control = match (frame_type, self.variable_field()) {
                (4..=7, _) => ControlFrame::CheckId(7 - frame_type),
                (0, 0x700) => ControlFrame::ReserveId,
                (0, 0x701) => ControlFrame::AliasMapDefinition,
                (0, 0x702) => ControlFrame::AliasMapEnquiry,
                (0, 0x703) => ControlFrame::AliasMapReset,
                (_, field) => ControlFrame::Other(((frame_type as u16) << 12) | field),
            };
            FrameKind::Control(control)
        }
    }

    pub fn is_check_id(&self) -> bool {
        matches!(self.kind(), FrameKind::Control(ControlFrame::CheckId(_)))
    }

    /// MTI for message frames, destination alias for datagram frames, UID slice for CheckID.
    pub fn variable_field(&self) -> u16 {
        ((self.0 >> 12) & 0xfff) as u16
    }

    pub fn source(&self) -> u16 {
        (self.0 & SOURCE_MASK) as u16
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl core::fmt::Debug for Id {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Id")
            .field("raw", &format_args!("{:08X}", self.0))
            .field("kind", &self.kind())
            .field("field", &format_args!("{:03X}", self.variable_field()))
            .field("source", &format_args!("{:03X}", self.source()))
            .finish()
    }
}

impl TryFrom<u32> for Id {
    type Error = IdError;

    fn try_from(val: u32) -> Result<Id> {
        validate_id(&val)?;

        Ok(Id(val))
    }
}

fn validate_id(id: &u32) -> Result<()> {
    // 29-bit header with the reserved bit set
    if id & 0xe000_0000 > 0 || id & RESERVED_BIT == 0 {
        return Err(IdError::InvalidId);
    }
    Ok(())
}
