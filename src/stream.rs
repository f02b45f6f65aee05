use crate::engine::{ListenerId, SpeedEngine, SpeedListener};
use crate::types::SpeedEvent;
use crate::{MotionPlusError, Result};
use crossbeam_channel::{Receiver, Sender, TrySendError};
use std::time::Duration;

/// Engine-side half of a [`SpeedStream`]. Closes once the receiver is gone.
struct ChannelListener {
    sender: Sender<SpeedEvent>,
    closed: bool,
}

impl SpeedListener for ChannelListener {
    fn speed_changed(&mut self, event: SpeedEvent) {
        if let Err(e) = self.sender.try_send(event) {
            match e {
                TrySendError::Full(_) => {
                    log::trace!("Speed channel full, dropping event");
                }
                TrySendError::Disconnected(_) => {
                    log::debug!("Speed channel disconnected, closing listener");
                    self.closed = true;
                }
            }
        }
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

/// Receiving end of a channel subscribed to a [`SpeedEngine`].
///
/// The engine-side listener never blocks: when the channel is full the event
/// is dropped, so a slow consumer cannot stall frame processing. Dropping the
/// stream unsubscribes it at the next event.
pub struct SpeedStream {
    receiver: Receiver<SpeedEvent>,
    id: ListenerId,
}

impl SpeedStream {
    pub(crate) fn attach(engine: &mut SpeedEngine, capacity: usize) -> SpeedStream {
        let (sender, receiver) = crossbeam_channel::bounded(capacity.max(1));

        let id = engine.subscribe(ChannelListener {
            sender,
            closed: false,
        });

        SpeedStream { receiver, id }
    }

    /// Listener id, for [`SpeedEngine::unsubscribe`].
    pub fn listener_id(&self) -> ListenerId {
        self.id
    }

    /// Receive the next event (blocks until available).
    pub fn recv(&self) -> Result<SpeedEvent> {
        self.receiver
            .recv()
            .map_err(|_| MotionPlusError::StreamStopped)
    }

    /// Try to receive an event without blocking.
    pub fn try_recv(&self) -> Option<SpeedEvent> {
        self.receiver.try_recv().ok()
    }

    /// Receive an event with a timeout.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<SpeedEvent> {
        self.receiver.recv_timeout(timeout).map_err(|e| match e {
            crossbeam_channel::RecvTimeoutError::Timeout => MotionPlusError::Timeout,
            crossbeam_channel::RecvTimeoutError::Disconnected => MotionPlusError::StreamStopped,
        })
    }

    /// Number of events waiting in the channel.
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}
