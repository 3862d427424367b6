use rtrb::{Consumer, Producer, PushError, RingBuffer};
use triple_buffer::{Input, Output, TripleBuffer};

use crate::{
    error::{Result, SynthError},
    synth::{activity::ActivitySnapshot, message::{MessageReceiver, SynthMessage}},
};

/// Builds the wait-free channels shared by the control and audio sides: an
/// event ring one way, a latest-value activity handoff the other.
pub struct ParameterBridge;

impl ParameterBridge {
    /// `capacity` bounds the number of pending control events.
    pub fn new(capacity: usize, pool_size: usize) -> (BridgeSender, BridgeReceiver) {
        let (events_tx, events_rx) = RingBuffer::<SynthMessage>::new(capacity);
        let (activity_tx, activity_rx) =
            TripleBuffer::new(&ActivitySnapshot::with_pool_size(pool_size)).split();

        (
            BridgeSender {
                events: events_tx,
                activity: activity_rx,
            },
            BridgeReceiver {
                events: events_rx,
                activity: activity_tx,
            },
        )
    }
}

/// Control-side end: pushes events, reads activity.
pub struct BridgeSender {
    events: Producer<SynthMessage>,
    activity: Output<ActivitySnapshot>,
}

impl BridgeSender {
    /// Enqueue a message without blocking.
    pub fn send(&mut self, msg: SynthMessage) -> Result<()> {
        match self.events.push(msg) {
            Ok(()) => Ok(()),
            Err(PushError::Full(_)) => Err(SynthError::QueueFull),
        }
    }

    /// Free event slots right now.
    pub fn slots(&self) -> usize {
        self.events.slots()
    }

    /// Newest published snapshot, or `None` if nothing was published since
    /// the last call.
    pub fn latest_activity(&mut self) -> Option<ActivitySnapshot> {
        let fresh = self.activity.updated();
        let snapshot = *self.activity.read();
        fresh.then_some(snapshot)
    }

    /// True once the audio side has been dropped.
    pub fn is_abandoned(&self) -> bool {
        self.events.is_abandoned()
    }
}

/// Audio-side end: drains events, publishes activity.
pub struct BridgeReceiver {
    events: Consumer<SynthMessage>,
    activity: Input<ActivitySnapshot>,
}

impl BridgeReceiver {
    /// Replace the snapshot the control side will see next. Never blocks and
    /// never drops the newest value.
    pub fn publish(&mut self, snapshot: ActivitySnapshot) {
        self.activity.write(snapshot);
    }
}

impl MessageReceiver for BridgeReceiver {
    fn pending(&self) -> usize {
        self.events.slots()
    }

    fn pop(&mut self) -> Option<SynthMessage> {
        self.events.pop().ok()
    }
}
