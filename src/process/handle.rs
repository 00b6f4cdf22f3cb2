//! Process handles: the caller's side of a process mailbox.

use super::message::{AtomicProcessState, Message, ProcessState};
use crossbeam_channel::Sender;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_PROCESS_ID: AtomicU64 = AtomicU64::new(1);

/// Unique id of a scheduled process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProcessId(u64);

impl ProcessId {
    fn next() -> Self {
        Self(NEXT_PROCESS_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct Slot<M> {
    id: ProcessId,
    kind: &'static str,
    mailbox: Sender<Message<M>>,
    state: AtomicProcessState,
}

/// Cloneable handle to a scheduled process.
///
/// Sending never blocks and never fails loudly: once the process has
/// terminated its mailbox is closed and every send is silently discarded.
pub struct ProcessHandle<M = ()> {
    slot: Arc<Slot<M>>,
}

impl<M> ProcessHandle<M> {
    pub(crate) fn new(kind: &'static str, mailbox: Sender<Message<M>>) -> Self {
        Self {
            slot: Arc::new(Slot {
                id: ProcessId::next(),
                kind,
                mailbox,
                state: AtomicProcessState::new(ProcessState::Initializing),
            }),
        }
    }

    /// The process id.
    #[inline]
    pub fn id(&self) -> ProcessId {
        self.slot.id
    }

    /// Type name of the process behind this handle.
    #[inline]
    pub fn kind(&self) -> &'static str {
        self.slot.kind
    }

    /// Check whether the process is of type `P`.
    pub fn is<P: ?Sized>(&self) -> bool {
        self.slot.kind == std::any::type_name::<P>()
    }

    /// Current lifecycle state.
    #[inline]
    pub fn state(&self) -> ProcessState {
        self.slot.state.load()
    }

    /// Whether the process has left the live set.
    #[inline]
    pub fn is_terminated(&self) -> bool {
        self.state() == ProcessState::Terminated
    }

    pub(crate) fn set_state(&self, state: ProcessState) {
        self.slot.state.store(state);
    }

    /// Enqueue a message.
    ///
    /// Returns `false` if the mailbox is already closed; the message is
    /// dropped in that case.
    pub fn send(&self, message: Message<M>) -> bool {
        if self.is_terminated() {
            return false;
        }
        self.slot.mailbox.send(message).is_ok()
    }

    /// Enqueue an application message.
    #[inline]
    pub fn notify(&self, message: M) -> bool {
        self.send(Message::App(message))
    }

    /// Ask the process to quit. Asynchronous: the process may still be
    /// running when this returns.
    #[inline]
    pub fn close(&self) -> bool {
        self.send(Message::Quit)
    }
}

impl<M> Clone for ProcessHandle<M> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<M> PartialEq for ProcessHandle<M> {
    fn eq(&self, other: &Self) -> bool {
        self.slot.id == other.slot.id
    }
}

impl<M> Eq for ProcessHandle<M> {}

impl<M> Hash for ProcessHandle<M> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.slot.id.hash(state);
    }
}

impl<M> fmt::Debug for ProcessHandle<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessHandle")
            .field("id", &self.slot.id)
            .field("kind", &self.slot.kind)
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    #[test]
    fn test_ids_are_unique() {
        let (tx, _rx) = unbounded::<Message>();
        let a = ProcessHandle::new("a", tx.clone());
        let b = ProcessHandle::new("b", tx);
        assert_ne!(a.id(), b.id());
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn test_send_after_receiver_dropped() {
        let (tx, rx) = unbounded::<Message<u32>>();
        let handle = ProcessHandle::new("p", tx);
        assert!(handle.notify(1));
        drop(rx);
        assert!(!handle.notify(2));
        assert!(!handle.close());
    }

    #[test]
    fn test_send_after_terminated() {
        let (tx, rx) = unbounded::<Message>();
        let handle = ProcessHandle::new("p", tx);
        handle.set_state(ProcessState::Terminated);
        assert!(!handle.send(Message::Tick));
        assert!(rx.try_recv().is_err());
    }
}
