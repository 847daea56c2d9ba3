use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
    rc::Rc,
    time::Duration,
};

use embedded_can::ErrorKind;
use openlcb::{Alias, Application, CanFrame, Node, NodeConfig, NodeId, Timer, Timers, Transport};
use rand::{rngs::StdRng, RngCore, SeedableRng};
use structopt::StructOpt;

const UID_BASE: u64 = 0x0501_0101_2d00;

#[derive(StructOpt)]
#[structopt(about = "Runs OpenLCB nodes on a virtual CAN segment")]
struct Opts {
    /// Nodes on the segment
    #[structopt(long, default_value = "2")]
    pub nodes: usize,
    #[structopt(long, default_value = "1")]
    pub seed: u64,
    /// Make the first two nodes draw the same first alias
    #[structopt(long)]
    pub collide: bool,
    /// Length of the datagram node 0 sends to node 1
    #[structopt(long, default_value = "20")]
    pub datagram_len: usize,
    /// Simulated 1 ms steps
    #[structopt(long, default_value = "2000")]
    pub ticks: u64,
    /// Frames each hardware mailbox accepts per step (at least 4)
    #[structopt(long)]
    pub busy: Option<usize>,
}

/// Every frame sent on the segment reaches all other nodes.
struct Segment {
    inboxes: Vec<VecDeque<CanFrame>>,
    frames: usize,
}

impl Segment {
    fn new(nodes: usize) -> Self {
        Segment {
            inboxes: vec![VecDeque::new(); nodes],
            frames: 0,
        }
    }

    fn deliver(&mut self, from: usize, frame: &CanFrame) {
        self.frames += 1;
        for (index, inbox) in self.inboxes.iter_mut().enumerate() {
            if index != from {
                inbox.push_back(frame.clone());
            }
        }
    }
}

struct VirtualCan {
    index: usize,
    segment: Rc<RefCell<Segment>>,
    limit: Option<usize>,
    room: Option<usize>,
}

impl VirtualCan {
    fn refill(&mut self) {
        self.room = self.limit;
    }
}

impl embedded_can::nb::Can for VirtualCan {
    type Frame = CanFrame;
    type Error = ErrorKind;

    fn transmit(&mut self, frame: &CanFrame) -> nb::Result<Option<CanFrame>, ErrorKind> {
        match self.room {
            Some(0) => return Err(nb::Error::WouldBlock),
            Some(ref mut room) => *room -= 1,
            None => {}
        }
        log::debug!("node {} tx {:?} {:02X?}", self.index, frame.header(), frame.data());
        self.segment.borrow_mut().deliver(self.index, frame);
        Ok(None)
    }

    fn receive(&mut self) -> nb::Result<CanFrame, ErrorKind> {
        self.segment.borrow_mut().inboxes[self.index]
            .pop_front()
            .ok_or(nb::Error::WouldBlock)
    }
}

struct Pending {
    timer: Timer,
    due: u64,
    period: Option<u64>,
}

/// Timers running on the simulated millisecond clock.
struct SimTimers {
    now: Rc<Cell<u64>>,
    pending: Vec<Pending>,
}

impl SimTimers {
    fn arm(&mut self, timer: Timer, after: Duration, period: Option<u64>) {
        self.cancel(timer);
        self.pending.push(Pending {
            timer,
            due: self.now.get() + after.as_millis() as u64,
            period,
        });
    }

    fn expired(&mut self) -> Vec<Timer> {
        let now = self.now.get();
        let mut fired = Vec::new();
        self.pending.retain_mut(|p| {
            if p.due > now {
                return true;
            }
            fired.push(p.timer);
            match p.period {
                Some(period) => {
                    p.due = now + period.max(1);
                    true
                }
                None => false,
            }
        });
        fired
    }
}

impl Timers for SimTimers {
    fn schedule(&mut self, timer: Timer, after: Duration) {
        self.arm(timer, after, None);
    }

    fn schedule_periodic(&mut self, timer: Timer, every: Duration) {
        self.arm(timer, every, Some(every.as_millis() as u64));
    }

    fn cancel(&mut self, timer: Timer) {
        self.pending.retain(|p| p.timer != timer);
    }
}

/// Seeded generator that can replay draws of another node first.
struct SimRng {
    replay: VecDeque<u32>,
    inner: StdRng,
}

impl RngCore for SimRng {
    fn next_u32(&mut self) -> u32 {
        match self.replay.pop_front() {
            Some(value) => value,
            None => self.inner.next_u32(),
        }
    }

    fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.inner.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.inner.try_fill_bytes(dest)
    }
}

struct SimApp {
    index: usize,
    echo: bool,
    received: Vec<Vec<u8>>,
}

impl Application for SimApp {
    fn initialization_complete(&mut self, transport: &mut dyn Transport) {
        log::info!(
            "node {} initialized as {} ({})",
            self.index,
            transport.alias(),
            transport.node_id()
        );
    }

    fn message(&mut self, _transport: &mut dyn Transport, mti: u16, source: Alias, payload: &[u8]) {
        log::info!(
            "node {} message {:03X} from {} {:02X?}",
            self.index,
            mti,
            source,
            payload
        );
    }

    fn datagram(&mut self, transport: &mut dyn Transport, source: Alias, payload: &[u8]) {
        log::info!(
            "node {} datagram of {} bytes from {}",
            self.index,
            payload.len(),
            source
        );
        self.received.push(payload.to_vec());
        let result = if self.echo {
            transport.send_datagram(source, payload, true)
        } else {
            transport.send_datagram_ok(source)
        };
        if let Err(e) = result {
            log::error!("node {} reply to {} failed: {:?}", self.index, source, e);
        }
    }
}

type SimNode = Node<VirtualCan, SimTimers, SimRng, SimApp>;

pub fn main() {
    env_logger::init();
    let opts = Opts::from_args();

    let now = Rc::new(Cell::new(0));
    let segment = Rc::new(RefCell::new(Segment::new(opts.nodes)));
    let mut seeds = StdRng::seed_from_u64(opts.seed);
    let mut first_draws = VecDeque::new();

    let nodes: Vec<SimNode> = (0..opts.nodes)
        .map(|index| {
            let seed = seeds.next_u64();
            let mut replay = VecDeque::new();
            if index == 0 {
                // construction and the first allocation each take one draw
                let mut preview = StdRng::seed_from_u64(seed);
                first_draws.push_back(preview.next_u32());
                first_draws.push_back(preview.next_u32());
            } else if index == 1 && opts.collide {
                replay = first_draws.clone();
            }

            let node_id = NodeId::new(UID_BASE + index as u64).expect("node id out of range");
            let can = VirtualCan {
                index,
                segment: segment.clone(),
                limit: opts.busy.map(|n| n.max(4)),
                room: None,
            };
            let timers = SimTimers {
                now: now.clone(),
                pending: Vec::new(),
            };
            let rng = SimRng {
                replay,
                inner: StdRng::seed_from_u64(seed),
            };
            let app = SimApp {
                index,
                echo: index == 1,
                received: Vec::new(),
            };
            Node::new(NodeConfig::new(node_id), can, timers, rng, app)
        })
        .collect();

    for node in &nodes {
        node.start();
    }

    let payload: Vec<u8> = (0..opts.datagram_len).map(|b| b as u8).collect();
    let mut sent = false;

    for tick in 0..opts.ticks {
        now.set(tick);

        for node in &nodes {
            node.with_platform(|can, _| can.refill());
        }

        for (index, node) in nodes.iter().enumerate() {
            if let Err(e) = node.poll() {
                log::error!("node {} receive failed: {:?}", index, e);
            }
        }

        for node in &nodes {
            for timer in node.with_platform(|_, timers| timers.expired()) {
                node.on_timer(timer);
            }
        }

        if !sent && nodes.len() >= 2 && nodes[0].is_permitted() && nodes[1].is_permitted() {
            let destination = nodes[1].alias();
            match nodes[0].with(|_, net| net.send_datagram(destination, &payload, false)) {
                Ok(()) => {
                    log::info!("node 0 sent {} bytes to {}", payload.len(), destination);
                    sent = true;
                }
                Err(e) => {
                    log::error!("node 0 datagram refused: {:?}", e);
                    break;
                }
            }
        }
    }

    println!("{:<6}{:<20}{:<8}{:<12}datagrams", "node", "uid", "alias", "state");
    for (index, node) in nodes.iter().enumerate() {
        let received = node.with(|app, _| app.received.len());
        println!(
            "{:<6}{:<20}{:<8}{:<12}{}",
            index,
            node.node_id().to_string(),
            node.alias().to_string(),
            format!("{:?}", node.state()),
            received
        );
    }
    println!("frames on bus: {}", segment.borrow().frames);

    if nodes.len() >= 2 {
        let echoed = nodes[0].with(|app, _| app.received.iter().any(|d| *d == payload));
        if echoed {
            println!("datagram echo: ok");
        } else {
            println!("datagram echo: missing");
            std::process::exit(1);
        }
    }
}
