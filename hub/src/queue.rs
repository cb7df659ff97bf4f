use crate::error::{Error, TransportErrorKind};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::Notify;

/// Creates an unbounded, ordered outbound queue for one session.
///
/// Many producers may hold a clone of the sender; the session's writer loop is the
/// only consumer. Both halves share a count of messages not yet taken by the writer,
/// and a signal a producer can use to tell the session to disconnect.
pub fn outbound_queue() -> (QueueSender, QueueReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    let pending = Arc::new(AtomicUsize::new(0));
    let disconnect = Arc::new(Notify::new());
    (
        QueueSender {
            tx,
            pending: pending.clone(),
            disconnect: disconnect.clone(),
        },
        QueueReceiver {
            rx,
            pending,
            disconnect,
        },
    )
}

/// Wakes a session that has been told to disconnect, even one whose writer is
/// stuck on a send and no longer polling its queue.
#[derive(Debug, Clone)]
pub struct DisconnectSignal(Arc<Notify>);

impl DisconnectSignal {
    /// Resolves once `QueueSender::disconnect` has been called, whether before or
    /// after this starts waiting.
    pub async fn wait(&self) {
        self.0.notified().await;
    }
}

#[derive(Debug, Clone)]
pub struct QueueSender {
    tx: UnboundedSender<String>,
    pending: Arc<AtomicUsize>,
    disconnect: Arc<Notify>,
}

impl QueueSender {
    /// Enqueues without blocking. Fails only when the receiving session is gone.
    pub fn push(&self, message: String) -> Result<(), Error> {
        // Count before sending so the receiver never decrements below zero.
        self.pending.fetch_add(1, Ordering::AcqRel);
        if self.tx.send(message).is_err() {
            self.pending.fetch_sub(1, Ordering::AcqRel);
            return Err(Error::transport(TransportErrorKind::QueueClosed));
        }
        Ok(())
    }

    /// Messages enqueued but not yet taken by the writer.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Asks the owning session to shut down.
    pub fn disconnect(&self) {
        // notify_one keeps a permit if the session is not waiting yet
        self.disconnect.notify_one();
    }
}

#[derive(Debug)]
pub struct QueueReceiver {
    rx: UnboundedReceiver<String>,
    pending: Arc<AtomicUsize>,
    disconnect: Arc<Notify>,
}

impl QueueReceiver {
    /// Waits for the next message. Returns `None` once every sender is dropped
    /// and the queue has been drained.
    pub async fn recv(&mut self) -> Option<String> {
        let message = self.rx.recv().await?;
        self.pending.fetch_sub(1, Ordering::AcqRel);
        Some(message)
    }

    pub fn try_recv(&mut self) -> Option<String> {
        let message = self.rx.try_recv().ok()?;
        self.pending.fetch_sub(1, Ordering::AcqRel);
        Some(message)
    }

    /// Refuses any further pushes; messages already queued can still be received.
    pub fn close(&mut self) {
        self.rx.close();
    }

    pub fn disconnect_signal(&self) -> DisconnectSignal {
        DisconnectSignal(self.disconnect.clone())
    }
}
