//! Single-slot, latest-value-wins hand-off between two threads.
//!
//! ```
//! use pet_camera::mailbox;
//!
//! let (tx, rx) = mailbox::<u32>();
//! tx.post(1);
//! tx.post(2);              // replaces 1
//! assert_eq!(rx.take(), Some(2));
//! assert_eq!(rx.take(), None);
//! ```

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

pub struct MailboxSender<T> {
    tx:    Sender<T>,
    /// Used to evict the stale value when the slot is full.
    evict: Receiver<T>,
}

pub struct MailboxReceiver<T> {
    rx: Receiver<T>,
}

pub fn mailbox<T>() -> (MailboxSender<T>, MailboxReceiver<T>) {
    let (tx, rx) = bounded(1);
    (MailboxSender { tx, evict: rx.clone() }, MailboxReceiver { rx })
}

impl<T> MailboxSender<T> {
    /// Put `value` in the slot, discarding whatever was there.  Never blocks.
    pub fn post(&self, mut value: T) {
        loop {
            match self.tx.try_send(value) {
                Ok(()) => return,
                Err(TrySendError::Full(v)) => {
                    let _ = self.evict.try_recv();
                    value = v;
                }
                // The sender holds a receiver itself, so the channel cannot
                // disconnect while `self` is alive.
                Err(TrySendError::Disconnected(_)) => return,
            }
        }
    }
}

impl<T> MailboxReceiver<T> {
    /// The newest value, if one arrived since the last take.
    pub fn take(&self) -> Option<T> {
        self.rx.try_recv().ok()
    }

    /// Discard any pending value.
    pub fn clear(&self) {
        let _ = self.rx.try_recv();
    }
}
