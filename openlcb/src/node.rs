use core::cell::RefCell;

use critical_section::Mutex;
use embedded_can::nb::Can;
use rand_core::RngCore;

use crate::network::{Application, Network, Transport};
use crate::transfer::{AliasState, Timer, Timers};
use crate::{Alias, CanFrame, NodeConfig, NodeId};

struct Stack<C, T, R, A> {
    network: Network<C, T, R>,
    app: A,
}

/// One OpenLCB node on a CAN bus.
///
/// Every entry point runs inside a critical section, so receive interrupts, timer
/// callbacks and foreground code may call into the node concurrently. Application
/// upcalls run inside the same critical section and reply through the transport
/// handed to them.
pub struct Node<C, T, R, A> {
    stack: Mutex<RefCell<Stack<C, T, R, A>>>,
}

impl<C, T, R, A> Node<C, T, R, A>
where
    C: Can,
    T: Timers,
    R: RngCore,
    A: Application,
{
    pub fn new(config: NodeConfig, can: C, timers: T, rng: R, app: A) -> Self {
        Node {
            stack: Mutex::new(RefCell::new(Stack {
                network: Network::new(&config, can, timers, rng),
                app,
            })),
        }
    }

    fn lock<F, U>(&self, f: F) -> U
    where
        F: FnOnce(&mut Stack<C, T, R, A>) -> U,
    {
        critical_section::with(|cs| f(&mut self.stack.borrow_ref_mut(cs)))
    }

    /// Begins alias allocation.
    pub fn start(&self) {
        self.lock(|stack| stack.network.link().start())
    }

    /// Feeds one frame received from the bus; frames that are not OpenLCB are dropped.
    pub fn on_frame<F: embedded_can::Frame>(&self, frame: &F) {
        let frame = match CanFrame::from_frame(frame) {
            Some(frame) => frame,
            None => return,
        };
        self.lock(|stack| stack.network.handle_frame(&frame, &mut stack.app))
    }

    /// Reads frames from the driver until it has none left. Returns the count handled.
    pub fn poll(&self) -> Result<usize, C::Error> {
        let mut handled = 0;
        loop {
            let received = self.lock(|stack| {
                let frame = match stack.network.link().can().receive() {
                    Ok(frame) => frame,
                    Err(nb::Error::WouldBlock) => return Ok(false),
                    Err(nb::Error::Other(e)) => return Err(e),
                };
                if let Some(frame) = CanFrame::from_frame(&frame) {
                    stack.network.handle_frame(&frame, &mut stack.app);
                }
                Ok(true)
            })?;
            if !received {
                return Ok(handled);
            }
            handled += 1;
        }
    }

    /// Called by the platform when a scheduled timer fires.
    pub fn on_timer(&self, timer: Timer) {
        self.lock(|stack| match timer {
            Timer::Alias => {
                if stack.network.link().on_alias_timer() {
                    stack.network.initialized(&mut stack.app);
                }
            }
            Timer::Drain => stack.network.link().on_drain_timer(),
        })
    }

    /// Runs `f` with the application and the transport from foreground code.
    pub fn with<F, U>(&self, f: F) -> U
    where
        F: FnOnce(&mut A, &mut dyn Transport) -> U,
    {
        self.lock(|stack| f(&mut stack.app, &mut stack.network))
    }

    /// Runs `f` with the CAN driver and the timer service.
    pub fn with_platform<F, U>(&self, f: F) -> U
    where
        F: FnOnce(&mut C, &mut T) -> U,
    {
        self.lock(|stack| {
            let (can, timers) = stack.network.link().platform();
            f(can, timers)
        })
    }

    pub fn alias(&self) -> Alias {
        self.lock(|stack| stack.network.alias())
    }

    pub fn node_id(&self) -> NodeId {
        self.lock(|stack| stack.network.node_id())
    }

    pub fn state(&self) -> AliasState {
        self.lock(|stack| stack.network.link().state())
    }

    pub fn is_permitted(&self) -> bool {
        self.lock(|stack| stack.network.is_permitted())
    }
}
