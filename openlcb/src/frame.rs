use crate::Id;
use core::convert::TryFrom;
use embedded_can::ExtendedId;

/// An OpenLCB CAN data frame: header plus up to 8 payload bytes.
#[derive(Clone, Debug, PartialEq)]
pub struct CanFrame {
    id: Id,
    dlc: usize,
    data: [u8; 8],
}

impl CanFrame {
    /// Creates a new data frame, `None` if `data` is longer than 8 bytes.
    pub fn new(id: Id, data: &[u8]) -> Option<Self> {
        if data.len() > 8 {
            return None;
        }
        let mut frame = Self {
            id,
            dlc: data.len(),
            data: [0; 8],
        };
        frame.data[0..data.len()].copy_from_slice(data);
        Some(frame)
    }

    /// Converts any extended data frame carrying an OpenLCB header.
    pub fn from_frame<F: embedded_can::Frame>(frame: &F) -> Option<Self> {
        if frame.is_remote_frame() {
            return None;
        }
        let raw = match frame.id() {
            embedded_can::Id::Extended(id) => id.as_raw(),
            embedded_can::Id::Standard(_) => return None,
        };
        let id = Id::try_from(raw).ok()?;
        CanFrame::new(id, frame.data())
    }

    /// Builds the driver's frame type for this frame.
    pub fn to_frame<F: embedded_can::Frame>(&self) -> Option<F> {
        let id = ExtendedId::new(self.id.value())?;
        F::new(id, self.data())
    }

    pub fn header(&self) -> Id {
        self.id
    }

    pub fn set_header(&mut self, id: Id) {
        self.id = id;
    }

    pub fn data(&self) -> &[u8] {
        &self.data[0..self.dlc]
    }
}

impl embedded_can::Frame for CanFrame {
    fn new(id: impl Into<embedded_can::Id>, data: &[u8]) -> Option<Self> {
        match id.into() {
            embedded_can::Id::Extended(id) => CanFrame::new(Id::try_from(id.as_raw()).ok()?, data),
            embedded_can::Id::Standard(_) => None,
        }
    }

    fn new_remote(_id: impl Into<embedded_can::Id>, _dlc: usize) -> Option<Self> {
        None
    }

    fn is_extended(&self) -> bool {
        true
    }

    fn is_remote_frame(&self) -> bool {
        false
    }

    fn id(&self) -> embedded_can::Id {
        // Id is always a validated 29-bit value
        embedded_can::Id::Extended(
            ExtendedId::new(self.id.value()).unwrap_or(ExtendedId::ZERO),
        )
    }

    fn dlc(&self) -> usize {
        self.dlc
    }

    fn data(&self) -> &[u8] {
        &self.data[0..self.dlc]
    }
}
