//! Frame transfer layer: alias allocation, transmit gating and the transmit queue.

use core::time::Duration;

use embedded_can::{nb::Can, Error as _};
use rand_core::RngCore;

use crate::id::{ControlFrame, FrameKind};
use crate::queue::{FrameQueue, QueueError, Transmit, QUEUE_CAPACITY};
use crate::{Alias, CanFrame, Id, NodeConfig, NodeId};

/// Timers the node needs from the platform.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Timer {
    /// Single shot, allocation observation window and retries.
    Alias,
    /// Periodic, transmit queue drain while frames are waiting.
    Drain,
}

/// Platform timer service. When a timer fires the platform calls `Node::on_timer`.
pub trait Timers {
    fn schedule(&mut self, timer: Timer, after: Duration);
    fn schedule_periodic(&mut self, timer: Timer, every: Duration);
    fn cancel(&mut self, timer: Timer);
}

/// Alias allocation state. Every state but `Permitted` is inhibited.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum AliasState {
    /// Allocation not started yet.
    Idle,
    /// CheckID frames are out for the pending alias; observation window running.
    Verifying,
    /// The reservation frames could not be transmitted; retried when the timer fires.
    Reserving,
    /// A collision was seen or the CheckID frames did not go out; a new alias is
    /// drawn when the timer fires.
    Restarting,
    Permitted,
}

pub struct FrameTransfer<C, T, R> {
    can: C,
    timers: T,
    rng: R,
    node_id: NodeId,
    alias_window: Duration,
    drain_interval: Duration,
    alias: Alias,
    state: AliasState,
    collision: bool,
    queue: FrameQueue<QUEUE_CAPACITY>,
    draining: bool,
}

impl<C, T, R> FrameTransfer<C, T, R>
where
    C: Can,
    T: Timers,
    R: RngCore,
{
    pub fn new(config: &NodeConfig, can: C, timers: T, mut rng: R) -> Self {
        let alias = Alias::random(&mut rng);
        FrameTransfer {
            can,
            timers,
            rng,
            node_id: config.node_id,
            alias_window: config.alias_window,
            drain_interval: config.drain_interval,
            alias,
            state: AliasState::Idle,
            collision: false,
            queue: FrameQueue::new(),
            draining: false,
        }
    }

    /// Starts the first allocation cycle.
    pub fn start(&mut self) {
        self.begin_cycle();
    }

    fn begin_cycle(&mut self) {
        self.timers.cancel(Timer::Alias);

        // never retry the alias that was just given up
        let previous = self.alias;
        self.alias = loop {
            let candidate = Alias::random(&mut self.rng);
            if candidate != previous {
                break candidate;
            }
        };
        self.state = AliasState::Verifying;
        self.collision = false;
        log::info!("checking alias {} for node {}", self.alias, self.node_id);

        for index in 0..4 {
            let sent = Id::check_id(index, &self.node_id, self.alias)
                .ok()
                .and_then(|id| CanFrame::new(id, &[]))
                .map_or(false, |frame| self.send_frame(&frame));
            if !sent {
                log::warn!("CheckID {} for alias {} not sent, restarting", index, self.alias);
                self.state = AliasState::Restarting;
                break;
            }
        }

        self.timers.schedule(Timer::Alias, self.alias_window);
    }

    /// Allocation timer expiry. Returns true when the alias just became permitted.
    pub fn on_alias_timer(&mut self) -> bool {
        match self.state {
            AliasState::Verifying | AliasState::Reserving if self.collision => {
                log::info!("collision on alias {}, backing off", self.alias);
                self.state = AliasState::Restarting;
                self.timers.schedule(Timer::Alias, self.alias_window);
                false
            }
            AliasState::Verifying | AliasState::Reserving => self.reserve(),
            AliasState::Restarting => {
                self.begin_cycle();
                false
            }
            AliasState::Idle | AliasState::Permitted => false,
        }
    }

    fn reserve(&mut self) -> bool {
        let rid = CanFrame::new(Id::control(ControlFrame::ReserveId, self.alias), &[]);
        let amd = CanFrame::new(
            Id::control(ControlFrame::AliasMapDefinition, self.alias),
            &self.node_id.to_bytes(),
        );
        let reserved = match (rid, amd) {
            (Some(rid), Some(amd)) => self.send_frame(&rid) && self.send_frame(&amd),
            _ => false,
        };

        if reserved {
            self.state = AliasState::Permitted;
            log::info!("alias {} permitted for node {}", self.alias, self.node_id);
        } else {
            log::debug!("reservation of alias {} not sent, retrying", self.alias);
            self.state = AliasState::Reserving;
            self.timers.schedule(Timer::Alias, self.alias_window);
        }
        reserved
    }

    /// Runs one inbound frame through alias checks. Returns true when the frame is an
    /// OpenLCB message the network layer should see.
    pub fn handle_frame(&mut self, frame: &CanFrame) -> bool {
        let id = frame.header();
        log::debug!("rx {:?} {:02X?}", id, frame.data());

        if id.source() == self.alias.value() {
            self.alias_conflict(id);
            return false;
        }

        if self.state != AliasState::Permitted {
            return false;
        }

        match id.kind() {
            FrameKind::Control(ControlFrame::AliasMapEnquiry) => {
                let data = frame.data();
                if data.is_empty() || self.node_id.matches(data) {
                    let amd = CanFrame::new(
                        Id::control(ControlFrame::AliasMapDefinition, self.alias),
                        &self.node_id.to_bytes(),
                    );
                    if let Some(amd) = amd {
                        if self.queue_frame(amd).is_err() {
                            log::error!("transmit queue full, alias map enquiry unanswered");
                        }
                    }
                }
                false
            }
            FrameKind::Control(_) | FrameKind::Reserved => false,
            FrameKind::Message(_) => true,
        }
    }

    fn alias_conflict(&mut self, id: Id) {
        match self.state {
            AliasState::Permitted if id.is_check_id() => {
                log::debug!("defending alias {}", self.alias);
                if let Some(rid) = CanFrame::new(Id::control(ControlFrame::ReserveId, self.alias), &[])
                {
                    self.send_frame(&rid);
                }
            }
            AliasState::Permitted => {
                log::warn!("alias {} in use by another node, reallocating", self.alias);
                let amr = CanFrame::new(
                    Id::control(ControlFrame::AliasMapReset, self.alias),
                    &self.node_id.to_bytes(),
                );
                if let Some(amr) = amr {
                    self.send_frame(&amr);
                }
                self.begin_cycle();
            }
            AliasState::Verifying | AliasState::Reserving => {
                log::debug!("collision on pending alias {}", self.alias);
                self.collision = true;
            }
            AliasState::Idle | AliasState::Restarting => {}
        }
    }

    /// Transmits immediately, bypassing the queue. Fails without side effects when the
    /// hardware buffer is full or the frame is not allowed in the current state. A
    /// frame the hardware pushes out of its mailbox goes back at the head of the queue.
    pub fn send_frame(&mut self, frame: &CanFrame) -> bool {
        match transmit(&mut self.can, self.state, self.alias, frame) {
            Transmit::Accepted => true,
            Transmit::Displaced(displaced) => {
                if self.queue_frame_first(displaced).is_err() {
                    log::error!("transmit queue full, displaced frame lost");
                }
                true
            }
            Transmit::Refused => false,
        }
    }

    /// Appends a frame to the transmit queue and starts the drain timer if idle.
    pub fn queue_frame(&mut self, frame: CanFrame) -> Result<(), QueueError> {
        self.queue.push(frame)?;
        self.start_draining();
        Ok(())
    }

    /// Puts a frame at the head of the transmit queue and starts the drain timer if idle.
    pub fn queue_frame_first(&mut self, frame: CanFrame) -> Result<(), QueueError> {
        self.queue.push_front(frame)?;
        self.start_draining();
        Ok(())
    }

    fn start_draining(&mut self) {
        if !self.draining {
            self.timers.schedule_periodic(Timer::Drain, self.drain_interval);
            self.draining = true;
        }
    }

    /// Free slots left in the transmit queue.
    pub fn queue_space(&self) -> usize {
        QUEUE_CAPACITY - self.queue.len()
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Drain timer tick: moves queued frames to the hardware until it refuses one.
    pub fn on_drain_timer(&mut self) {
        let can = &mut self.can;
        let state = self.state;
        let alias = self.alias;
        let sent = self.queue.drain(|frame| transmit(can, state, alias, frame));
        if sent > 0 {
            log::debug!("drained {} frames, {} left", sent, self.queue.len());
        }

        if self.queue.is_empty() {
            self.timers.cancel(Timer::Drain);
            self.draining = false;
        }
    }

    pub fn alias(&self) -> Alias {
        self.alias
    }

    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    pub fn state(&self) -> AliasState {
        self.state
    }

    pub fn is_permitted(&self) -> bool {
        self.state == AliasState::Permitted
    }

    pub fn collision_detected(&self) -> bool {
        self.collision
    }

    pub fn is_draining(&self) -> bool {
        self.draining
    }

    pub fn can(&mut self) -> &mut C {
        &mut self.can
    }

    pub fn timers(&mut self) -> &mut T {
        &mut self.timers
    }

    pub fn platform(&mut self) -> (&mut C, &mut T) {
        (&mut self.can, &mut self.timers)
    }
}

fn transmit<C: Can>(can: &mut C, state: AliasState, alias: Alias, frame: &CanFrame) -> Transmit {
    let id = frame.header();
    if state != AliasState::Permitted {
        let allowed = match id.kind() {
            FrameKind::Control(control) => control.allowed_while_inhibited(),
            _ => false,
        };
        if !allowed {
            return Transmit::Refused;
        }
    }

    let mut outgoing = frame.clone();
    outgoing.set_header(id.with_source(alias));
    let hw_frame: C::Frame = match outgoing.to_frame() {
        Some(f) => f,
        None => {
            log::error!("driver rejected frame {:?}", outgoing.header());
            return Transmit::Refused;
        }
    };

    match can.transmit(&hw_frame) {
        Ok(None) => {
            log::debug!("tx {:?} {:02X?}", outgoing.header(), outgoing.data());
            Transmit::Accepted
        }
        Ok(Some(pending)) => {
            log::debug!("tx {:?} {:02X?}", outgoing.header(), outgoing.data());
            match CanFrame::from_frame(&pending) {
                Some(displaced) => Transmit::Displaced(displaced),
                None => {
                    log::warn!("dropping displaced non-OpenLCB frame");
                    Transmit::Accepted
                }
            }
        }
        Err(nb::Error::WouldBlock) => Transmit::Refused,
        Err(nb::Error::Other(e)) => {
            log::error!("CAN transmit error {:?}", e.kind());
            Transmit::Refused
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    extern crate alloc;
    use alloc::collections::VecDeque;
    use alloc::vec::Vec;
    use core::time::Duration;

    use embedded_can::{ErrorKind, Frame};
    use rand_core::{impls, RngCore};

    use super::{AliasState, FrameTransfer, Timer, Timers};
    use crate::id::{ControlFrame, FrameKind, FrameType};
    use crate::{Alias, CanFrame, Id, NodeConfig, NodeId};

    pub const NODE_ID: u64 = 0x0501_0101_2d00;

    /// Records every accepted frame; `room` limits how many frames are accepted.
    /// A frame parked in `pending` is handed back as displaced by the next transmit.
    pub struct MockCan {
        pub frames: Vec<CanFrame>,
        pub room: Option<usize>,
        pub inbox: VecDeque<CanFrame>,
        pub pending: Option<CanFrame>,
    }

    impl MockCan {
        pub fn new() -> Self {
            MockCan {
                frames: Vec::new(),
                room: None,
                inbox: VecDeque::new(),
                pending: None,
            }
        }

        pub fn take(&mut self) -> Vec<CanFrame> {
            core::mem::take(&mut self.frames)
        }
    }

    impl embedded_can::nb::Can for MockCan {
        type Frame = CanFrame;
        type Error = ErrorKind;

        fn transmit(&mut self, frame: &CanFrame) -> nb::Result<Option<CanFrame>, ErrorKind> {
            match self.room {
                Some(0) => return Err(nb::Error::WouldBlock),
                Some(ref mut room) => *room -= 1,
                None => {}
            }
            self.frames.push(frame.clone());
            Ok(self.pending.take())
        }

        fn receive(&mut self) -> nb::Result<CanFrame, ErrorKind> {
            self.inbox.pop_front().ok_or(nb::Error::WouldBlock)
        }
    }

    #[derive(Debug, PartialEq)]
    pub enum TimerEvent {
        Once(Timer, Duration),
        Periodic(Timer, Duration),
        Cancel(Timer),
    }

    pub struct MockTimers {
        pub events: Vec<TimerEvent>,
    }

    impl MockTimers {
        pub fn new() -> Self {
            MockTimers { events: Vec::new() }
        }
    }

    impl Timers for MockTimers {
        fn schedule(&mut self, timer: Timer, after: Duration) {
            self.events.push(TimerEvent::Once(timer, after));
        }

        fn schedule_periodic(&mut self, timer: Timer, every: Duration) {
            self.events.push(TimerEvent::Periodic(timer, every));
        }

        fn cancel(&mut self, timer: Timer) {
            self.events.push(TimerEvent::Cancel(timer));
        }
    }

    /// Hands out a fixed sequence of aliases, then repeats the last one.
    pub struct ScriptedRng {
        values: Vec<u32>,
        next: usize,
    }

    impl ScriptedRng {
        pub fn new(values: &[u32]) -> Self {
            ScriptedRng {
                values: values.to_vec(),
                next: 0,
            }
        }
    }

    impl RngCore for ScriptedRng {
        fn next_u32(&mut self) -> u32 {
            let value = self.values[core::cmp::min(self.next, self.values.len() - 1)];
            self.next += 1;
            value
        }

        fn next_u64(&mut self) -> u64 {
            impls::next_u64_via_u32(self)
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            impls::fill_bytes_via_next(self, dest)
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    pub fn alias(a: u16) -> Alias {
        Alias::new(a).unwrap()
    }

    type TestLink = FrameTransfer<MockCan, MockTimers, ScriptedRng>;

    /// The constructor draws once, so the first cycle uses the second scripted value.
    fn link(aliases: &[u32]) -> TestLink {
        let config = NodeConfig::new(NodeId::new(NODE_ID).unwrap());
        let mut values = alloc::vec![0xfff];
        values.extend_from_slice(aliases);
        FrameTransfer::new(&config, MockCan::new(), MockTimers::new(), ScriptedRng::new(&values))
    }

    fn permitted_link(a: u32) -> TestLink {
        let mut link = link(&[a]);
        link.start();
        assert!(link.on_alias_timer());
        link.can().take();
        link.timers().events.clear();
        link
    }

    fn frame(id: u32, data: &[u8]) -> CanFrame {
        <CanFrame as Frame>::new(embedded_can::ExtendedId::new(id).unwrap(), data).unwrap()
    }

    fn kinds(frames: &[CanFrame]) -> Vec<FrameKind> {
        frames.iter().map(|f| f.header().kind()).collect()
    }

    #[test]
    fn allocation_sends_check_ids() {
        let mut link = link(&[0x123]);
        link.start();

        assert_eq!(link.alias(), alias(0x123));
        assert_eq!(link.state(), AliasState::Verifying);
        let sent: Vec<u32> = link.can().frames.iter().map(|f| f.header().value()).collect();
        assert_eq!(sent, [0x1705_0123, 0x1610_1123, 0x1501_2123, 0x14d0_0123]);
        assert_eq!(
            link.timers().events.last(),
            Some(&TimerEvent::Once(Timer::Alias, Duration::from_millis(250)))
        );
    }

    #[test]
    fn allocation_reaches_permitted() {
        let mut link = link(&[0x123]);
        link.start();
        link.can().take();

        assert!(link.on_alias_timer());
        assert!(link.is_permitted());
        let sent = link.can().take();
        assert_eq!(
            kinds(&sent),
            [
                FrameKind::Control(ControlFrame::ReserveId),
                FrameKind::Control(ControlFrame::AliasMapDefinition)
            ]
        );
        assert_eq!(sent[0].header().value(), 0x1070_0123);
        assert_eq!(sent[1].data(), &[0x05, 0x01, 0x01, 0x01, 0x2d, 0x00]);
    }

    #[test]
    fn allocation_retries_reserve_on_transmit_failure() {
        let mut link = link(&[0x123, 0x456]);
        link.start();
        link.can().take();
        link.can().room = Some(1);

        assert!(!link.on_alias_timer());
        assert_eq!(link.state(), AliasState::Reserving);
        // alias is kept, only the reservation is repeated
        link.can().room = None;
        link.can().take();
        assert!(link.on_alias_timer());
        assert_eq!(link.alias(), alias(0x123));
        assert_eq!(
            kinds(&link.can().take()),
            [
                FrameKind::Control(ControlFrame::ReserveId),
                FrameKind::Control(ControlFrame::AliasMapDefinition)
            ]
        );
    }

    #[test]
    fn check_id_collision_draws_new_alias() {
        let mut link = link(&[0x123, 0x456]);
        link.start();
        link.can().take();

        // another node checks the same alias
        assert!(!link.handle_frame(&frame(0x1712_3123, &[])));
        assert!(link.collision_detected());

        assert!(!link.on_alias_timer());
        assert_eq!(link.state(), AliasState::Restarting);
        assert!(link.can().take().is_empty());

        assert!(!link.on_alias_timer());
        assert_eq!(link.alias(), alias(0x456));
        assert_eq!(link.state(), AliasState::Verifying);
        assert!(!link.collision_detected());
        let sent = link.can().take();
        assert_eq!(sent.len(), 4);
        assert!(sent.iter().all(|f| f.header().source() == 0x456));

        assert!(link.on_alias_timer());
        assert_eq!(link.alias(), alias(0x456));
    }

    #[test]
    fn message_collision_while_verifying() {
        // a redraw of the colliding alias is discarded
        let mut link = link(&[0x123, 0x123, 0x456]);
        link.start();
        assert!(!link.handle_frame(&frame(0x1949_0123, &[])));
        assert!(link.collision_detected());
        assert!(!link.on_alias_timer());
        assert!(!link.on_alias_timer());
        assert_eq!(link.alias(), alias(0x456));
    }

    #[test]
    fn permitted_defends_against_check_id() {
        let mut link = permitted_link(0x123);

        assert!(!link.handle_frame(&frame(0x1700_0123, &[])));
        assert!(link.is_permitted());
        let sent = link.can().take();
        assert_eq!(kinds(&sent), [FrameKind::Control(ControlFrame::ReserveId)]);
        assert_eq!(sent[0].header().source(), 0x123);
    }

    #[test]
    fn permitted_collision_restarts_allocation() {
        let mut link = link(&[0x123, 0x789]);
        link.start();
        assert!(link.on_alias_timer());
        link.can().take();

        assert!(!link.handle_frame(&frame(0x1949_0123, &[])));

        assert_eq!(link.state(), AliasState::Verifying);
        assert_eq!(link.alias(), alias(0x789));
        let sent = link.can().take();
        assert_eq!(sent.len(), 5);
        assert_eq!(
            sent[0].header().kind(),
            FrameKind::Control(ControlFrame::AliasMapReset)
        );
        assert_eq!(sent[0].header().source(), 0x123);
        assert_eq!(sent[0].data(), &NodeId::new(NODE_ID).unwrap().to_bytes());
        for (index, f) in sent[1..].iter().enumerate() {
            assert_eq!(
                f.header().kind(),
                FrameKind::Control(ControlFrame::CheckId(index as u8))
            );
            assert_eq!(f.header().source(), 0x789);
        }
    }

    #[test]
    fn defending_rid_requeues_displaced_frame() {
        let mut link = permitted_link(0x123);
        let parked = CanFrame::new(Id::message(0x490, alias(0x123)), &[]).unwrap();
        link.can().pending = Some(parked.clone());

        assert!(!link.handle_frame(&frame(0x1700_0123, &[])));
        assert_eq!(link.queued(), 1);
        assert!(link.is_draining());
        assert_eq!(
            link.timers().events,
            [TimerEvent::Periodic(Timer::Drain, Duration::from_millis(2))]
        );

        link.on_drain_timer();
        let sent = link.can().take();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].header().value(), 0x1070_0123);
        assert_eq!(sent[1], parked);
        assert!(!link.is_draining());
    }

    #[test]
    fn inhibited_gates_transmission() {
        let mut link = link(&[0x123]);
        link.start();
        link.can().take();

        let message = CanFrame::new(Id::message(0x490, alias(0x123)), &[]).unwrap();
        assert!(!link.send_frame(&message));
        let amr = CanFrame::new(Id::control(ControlFrame::AliasMapReset, alias(0x123)), &[]).unwrap();
        assert!(!link.send_frame(&amr));
        assert!(link.can().frames.is_empty());

        let rid = CanFrame::new(Id::control(ControlFrame::ReserveId, alias(0x123)), &[]).unwrap();
        assert!(link.send_frame(&rid));
    }

    #[test]
    fn queue_waits_for_permitted() {
        let mut link = link(&[0x123]);
        link.start();
        link.can().take();

        let message = CanFrame::new(Id::message(0x490, alias(0x001)), &[]).unwrap();
        link.queue_frame(message).unwrap();
        link.on_drain_timer();
        assert!(link.can().frames.is_empty());
        assert_eq!(link.queued(), 1);

        assert!(link.on_alias_timer());
        link.can().take();
        link.on_drain_timer();
        let sent = link.can().take();
        assert_eq!(sent.len(), 1);
        // source alias is applied at transmit time
        assert_eq!(sent[0].header().value(), 0x1949_0123);
    }

    #[test]
    fn queue_drain_timer_lifecycle() {
        let mut link = permitted_link(0x123);

        for mti in [0x100u16, 0x200, 0x300].iter() {
            link.queue_frame(CanFrame::new(Id::message(*mti, alias(0x123)), &[]).unwrap())
                .unwrap();
        }
        assert!(link.is_draining());
        assert_eq!(
            link.timers().events,
            [TimerEvent::Periodic(Timer::Drain, Duration::from_millis(2))]
        );

        link.can().room = Some(2);
        link.on_drain_timer();
        assert_eq!(link.queued(), 1);
        assert!(link.is_draining());

        link.can().room = None;
        link.on_drain_timer();
        assert!(!link.is_draining());
        assert_eq!(link.timers().events.last(), Some(&TimerEvent::Cancel(Timer::Drain)));

        let mtis: Vec<u16> = link
            .can()
            .take()
            .iter()
            .map(|f| f.header().variable_field())
            .collect();
        assert_eq!(mtis, [0x100, 0x200, 0x300]);
    }

    #[test]
    fn alias_map_enquiry() {
        struct TestCase {
            data: &'static [u8],
            answered: bool,
        }
        let test_cases = [
            TestCase {
                data: &[],
                answered: true,
            },
            TestCase {
                data: &[0x05, 0x01, 0x01, 0x01, 0x2d, 0x00],
                answered: true,
            },
            TestCase {
                data: &[0x05, 0x01, 0x01, 0x01, 0x2d, 0x01],
                answered: false,
            },
        ];
        for i in &test_cases {
            let mut link = permitted_link(0x123);
            assert!(!link.handle_frame(&frame(0x1070_2456, i.data)));
            assert_eq!(link.queued(), if i.answered { 1 } else { 0 });
            link.on_drain_timer();
            let sent = link.can().take();
            if i.answered {
                assert_eq!(sent[0].header().value(), 0x1070_1123);
            } else {
                assert!(sent.is_empty());
            }
        }
    }

    #[test]
    fn enquiry_ignored_while_inhibited() {
        let mut link = link(&[0x123]);
        link.start();
        assert!(!link.handle_frame(&frame(0x1070_2456, &[])));
        assert_eq!(link.queued(), 0);
    }

    #[test]
    fn messages_pass_up_only_when_permitted() {
        let mut link = link(&[0x123]);
        link.start();
        let verify = frame(0x1949_0456, &[]);
        assert!(!link.handle_frame(&verify));
        assert!(link.on_alias_timer());
        assert!(link.handle_frame(&verify));
        let datagram = CanFrame::new(
            Id::datagram(FrameType::DatagramComplete, alias(0x123), alias(0x456)),
            &[0x20],
        )
        .unwrap();
        assert!(link.handle_frame(&datagram));
        assert!(!link.handle_frame(&frame(0x1070_0456, &[])));
    }
}
