use heapless::Deque;

use crate::CanFrame;

/// Frames the transmit queue can hold; enough for several 9-frame datagrams.
pub const QUEUE_CAPACITY: usize = 64;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum QueueError {
    Full,
}

pub type Result<T> = core::result::Result<T, QueueError>;

/// Result of handing one frame to the hardware.
#[derive(Clone, Debug, PartialEq)]
pub enum Transmit {
    Accepted,
    /// Accepted, but a lower priority frame was pushed out of the mailbox.
    Displaced(CanFrame),
    Refused,
}

/// FIFO of frames waiting for room in the hardware transmit buffer.
pub struct FrameQueue<const N: usize> {
    frames: Deque<CanFrame, N>,
}

impl<const N: usize> FrameQueue<N> {
    pub fn new() -> Self {
        FrameQueue {
            frames: Deque::new(),
        }
    }

    pub fn push(&mut self, frame: CanFrame) -> Result<()> {
        self.frames.push_back(frame).map_err(|_| QueueError::Full)
    }

    /// Puts a frame ahead of everything waiting.
    pub fn push_front(&mut self, frame: CanFrame) -> Result<()> {
        self.frames.push_front(frame).map_err(|_| QueueError::Full)
    }

    pub fn front(&self) -> Option<&CanFrame> {
        self.frames.front()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Hands frames to `transmit` head first. A frame leaves the queue only once it
    /// was accepted; the pass stops at the first refusal. Returns the number sent.
    pub fn drain<F>(&mut self, mut transmit: F) -> usize
    where
        F: FnMut(&CanFrame) -> Transmit,
    {
        let mut sent = 0;
        while let Some(frame) = self.frames.front() {
            match transmit(frame) {
                Transmit::Accepted => {
                    self.frames.pop_front();
                    sent += 1;
                }
                Transmit::Displaced(displaced) => {
                    self.frames.pop_front();
                    sent += 1;
                    // The slot just freed guarantees room for the displaced frame
                    let _ = self.frames.push_front(displaced);
                    break;
                }
                Transmit::Refused => break,
            }
        }
        sent
    }
}

impl<const N: usize> Default for FrameQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    extern crate alloc;
    use alloc::vec::Vec;

    use super::{FrameQueue, QueueError, Transmit};
    use crate::{Alias, CanFrame, Id};

    fn frame(mti: u16) -> CanFrame {
        CanFrame::new(Id::message(mti, Alias::new(1).unwrap()), &[mti as u8]).unwrap()
    }

    #[test]
    fn queue_drains_in_order() {
        let mut queue: FrameQueue<8> = FrameQueue::new();
        queue.push(frame(0xa)).unwrap();
        queue.push(frame(0xb)).unwrap();
        queue.push(frame(0xc)).unwrap();

        let mut sent = Vec::new();
        let count = queue.drain(|f| {
            sent.push(f.header().variable_field());
            Transmit::Accepted
        });

        assert_eq!(count, 3);
        assert_eq!(sent, [0xa, 0xb, 0xc]);
        assert!(queue.is_empty());
    }

    #[test]
    fn queue_keeps_refused_frames() {
        let mut queue: FrameQueue<8> = FrameQueue::new();
        queue.push(frame(0xa)).unwrap();
        queue.push(frame(0xb)).unwrap();
        queue.push(frame(0xc)).unwrap();

        let mut room = 1;
        let count = queue.drain(|_| {
            if room > 0 {
                room -= 1;
                Transmit::Accepted
            } else {
                Transmit::Refused
            }
        });

        assert_eq!(count, 1);
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.front(), Some(&frame(0xb)));

        assert_eq!(queue.drain(|_| Transmit::Refused), 0);
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn queue_requeues_displaced_frame_at_head() {
        let mut queue: FrameQueue<8> = FrameQueue::new();
        queue.push(frame(0xa)).unwrap();
        queue.push(frame(0xb)).unwrap();

        let count = queue.drain(|_| Transmit::Displaced(frame(0x9)));

        assert_eq!(count, 1);
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.front(), Some(&frame(0x9)));
    }

    #[test]
    fn queue_push_front() {
        let mut queue: FrameQueue<2> = FrameQueue::new();
        queue.push(frame(0xa)).unwrap();
        queue.push_front(frame(0x9)).unwrap();
        assert_eq!(queue.front(), Some(&frame(0x9)));
        assert_eq!(queue.push_front(frame(0x8)), Err(QueueError::Full));
    }

    #[test]
    fn queue_full() {
        let mut queue: FrameQueue<2> = FrameQueue::new();
        queue.push(frame(0xa)).unwrap();
        queue.push(frame(0xb)).unwrap();
        assert_eq!(queue.push(frame(0xc)), Err(QueueError::Full));
    }
}
