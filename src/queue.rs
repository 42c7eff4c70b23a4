//! Cross-thread emission hand-off.
//!
//! Gesture detection often runs on its own thread (camera callbacks, ML
//! inference), while the pool lives on the render thread. An
//! [`EmissionSender`] lets those threads submit bursts without touching the
//! pool; the pool drains everything queued at the very start of its next
//! [`tick`](crate::ParticlePool::tick), before any integration runs.
//!
//! ```ignore
//! let sender = pool.sender();
//! std::thread::spawn(move || {
//!     for pinch in tracker.pinches() {
//!         sender.send(EmissionRequest::pop(pinch.position, Color::WHITE))?;
//!     }
//! });
//! ```

use crate::emitter::EmissionRequest;
use crate::error::QueueError;
use crossbeam_channel::{Receiver, Sender, TryRecvError};

/// Clonable, thread-safe handle for queueing emissions into a pool.
#[derive(Debug, Clone)]
pub struct EmissionSender {
    tx: Sender<EmissionRequest>,
}

impl EmissionSender {
    /// Validate `request` on the calling thread and queue it.
    pub fn send(&self, request: EmissionRequest) -> Result<(), QueueError> {
        request.validate()?;
        self.tx.send(request).map_err(|_| QueueError::Closed)
    }

    /// Number of requests waiting for the next tick.
    pub fn pending(&self) -> usize {
        self.tx.len()
    }
}

/// Receiving side owned by the pool.
#[derive(Debug)]
pub(crate) struct EmissionQueue {
    tx: Sender<EmissionRequest>,
    rx: Receiver<EmissionRequest>,
}

impl EmissionQueue {
    pub fn new() -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self { tx, rx }
    }

    pub fn sender(&self) -> EmissionSender {
        EmissionSender {
            tx: self.tx.clone(),
        }
    }

    /// Take everything currently queued, in submission order.
    ///
    /// Requests sent while draining are left for the next tick.
    pub fn drain(&self) -> Vec<EmissionRequest> {
        let mut pending = Vec::with_capacity(self.rx.len());
        for _ in 0..self.rx.len() {
            match self.rx.try_recv() {
                Ok(request) => pending.push(request),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        pending
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::error::EmitError;

    #[test]
    fn test_send_and_drain_in_order() {
        let queue = EmissionQueue::new();
        let sender = queue.sender();
        sender.send(EmissionRequest::new(1, Color::WHITE)).unwrap();
        sender.send(EmissionRequest::new(2, Color::WHITE)).unwrap();
        assert_eq!(sender.pending(), 2);

        let drained = queue.drain();
        assert_eq!(drained.iter().map(|r| r.count).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn test_invalid_request_rejected_at_send() {
        let queue = EmissionQueue::new();
        let err = queue
            .sender()
            .send(EmissionRequest::new(0, Color::WHITE))
            .unwrap_err();
        assert_eq!(err, QueueError::Rejected(EmitError::ZeroCount));
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn test_send_after_queue_dropped() {
        let queue = EmissionQueue::new();
        let sender = queue.sender();
        drop(queue);
        assert_eq!(
            sender.send(EmissionRequest::new(1, Color::WHITE)),
            Err(QueueError::Closed)
        );
    }

    #[test]
    fn test_send_from_other_thread() {
        let queue = EmissionQueue::new();
        let sender = queue.sender();
        let worker = std::thread::spawn(move || {
            for i in 1..=5 {
                sender.send(EmissionRequest::new(i, Color::WHITE)).unwrap();
            }
        });
        worker.join().unwrap();
        assert_eq!(queue.drain().len(), 5);
    }
}
