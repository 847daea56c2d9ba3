use heapless::FnvIndexMap;

use crate::{id::FrameType, Alias};

/// Largest datagram payload the protocol allows (nine frames of eight bytes).
pub const DATAGRAM_MAX_LEN: usize = 72;

/// Peers with a datagram in flight per direction; must be a power of two.
pub const STORE_CAPACITY: usize = 8;

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum DatagramError {
    TooLong { actual: usize },
    NoRecord,
    StoreFull,
}

pub type Result<T> = core::result::Result<T, DatagramError>;

pub type Payload = heapless::Vec<u8, DATAGRAM_MAX_LEN>;

/// Datagram bytes keyed by peer alias, at most one record per peer.
pub struct DatagramStore<const N: usize> {
    records: FnvIndexMap<u16, Payload, N>,
}

impl<const N: usize> DatagramStore<N> {
    pub fn new() -> Self {
        DatagramStore {
            records: FnvIndexMap::new(),
        }
    }

    /// Creates the record for `peer`, replacing any stale one.
    pub fn start(&mut self, peer: Alias, data: &[u8]) -> Result<()> {
        let payload = Payload::from_slice(data)
            .map_err(|_| DatagramError::TooLong { actual: data.len() })?;
        if let Some(stale) = self.records.get_mut(&peer.value()) {
            *stale = payload;
            return Ok(());
        }
        self.records
            .insert(peer.value(), payload)
            .map_err(|_| DatagramError::StoreFull)?;
        Ok(())
    }

    /// Appends to the record for `peer` and returns its new length. A record that
    /// would grow past the datagram ceiling is discarded.
    pub fn append(&mut self, peer: Alias, data: &[u8]) -> Result<usize> {
        let record = self
            .records
            .get_mut(&peer.value())
            .ok_or(DatagramError::NoRecord)?;
        let actual = record.len() + data.len();
        if record.extend_from_slice(data).is_err() {
            self.records.remove(&peer.value());
            return Err(DatagramError::TooLong { actual });
        }
        Ok(record.len())
    }

    pub fn get(&self, peer: Alias) -> Option<&[u8]> {
        self.records.get(&peer.value()).map(|p| &p[..])
    }

    /// Removes and returns the record for `peer`.
    pub fn take(&mut self, peer: Alias) -> Option<Payload> {
        self.records.remove(&peer.value())
    }

    pub fn contains(&self, peer: Alias) -> bool {
        self.records.contains_key(&peer.value())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<const N: usize> Default for DatagramStore<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Splits a datagram payload into frame-sized pieces tagged with their frame type.
pub struct Fragments<'a> {
    data: &'a [u8],
    index: usize,
    count: usize,
}

impl<'a> Fragments<'a> {
    pub fn new(data: &'a [u8]) -> Result<Self> {
        if data.len() > DATAGRAM_MAX_LEN {
            return Err(DatagramError::TooLong { actual: data.len() });
        }
        let count = if data.len() <= 8 {
            1
        } else {
            (data.len() + 7) / 8
        };
        Ok(Fragments {
            data,
            index: 0,
            count,
        })
    }

    /// Number of frames the payload splits into.
    pub fn frames(&self) -> usize {
        self.count
    }
}

impl<'a> Iterator for Fragments<'a> {
    type Item = (FrameType, &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.count {
            return None;
        }
        let frame_type = match self.index {
            _ if self.count == 1 => FrameType::DatagramComplete,
            0 => FrameType::DatagramFirst,
            i if i + 1 == self.count => FrameType::DatagramLast,
            _ => FrameType::DatagramMiddle,
        };
        let start = self.index * 8;
        let end = core::cmp::min(start + 8, self.data.len());
        self.index += 1;
        Some((frame_type, &self.data[start..end]))
    }
}
