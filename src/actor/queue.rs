//! Request Queue: The outbox of commands bound for the native pump thread.
//!
//! Submissions append to a pending buffer; the pump thread swaps the whole
//! buffer out when woken and executes it without holding the lock. The queue
//! also remembers whether a wake is already in flight so that a burst of
//! submissions costs a single wake call.
//!
//! Like the registry, the queue is guarded by the hub's lock.

use super::messages::Request;

/// Sequence number identifying one submission.
pub type Ticket = u64;

/// Outcome of pushing a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Submitted {
    /// Ticket for taking the request back if the wake fails.
    pub ticket: Ticket,
    /// Whether the caller must wake the pump after releasing the lock.
    pub needs_wake: bool,
}

/// Pending native-bound requests.
#[derive(Debug, Default)]
pub struct RequestQueue {
    /// Requests awaiting the next drain, in submission order.
    pending: Vec<(Ticket, Request)>,
    /// A wake has been issued and not yet answered by a drain.
    wake_pending: bool,
    /// Set once the pump has stopped draining.
    closed: bool,
    /// Requests that rode on a wake that failed; only teardown sees them.
    stranded: Vec<Request>,
    /// Next ticket to hand out.
    next_ticket: Ticket,
}

impl RequestQueue {
    /// Create an empty queue.
    pub const fn new() -> Self {
        Self {
            pending: Vec::new(),
            wake_pending: false,
            closed: false,
            stranded: Vec::new(),
            next_ticket: 0,
        }
    }

    /// Append a request. Returns `None` once the queue is closed.
    pub fn push(&mut self, request: Request) -> Option<Submitted> {
        if self.closed {
            return None;
        }
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.pending.push((ticket, request));

        let needs_wake = !self.wake_pending;
        self.wake_pending = true;
        Some(Submitted { ticket, needs_wake })
    }

    /// Give up on a wake that failed.
    ///
    /// Returns the request whose submitter owned the wake. Any other request
    /// that joined while the wake was in flight was already accepted, so it
    /// is kept for [`take_remaining`](Self::take_remaining) instead of being
    /// lost. The queue closes: nothing can reach the pump any more.
    pub fn abandon_wake(&mut self, ticket: Ticket) -> Option<Request> {
        self.wake_pending = false;
        self.closed = true;
        let mut owned = None;
        for (t, request) in std::mem::take(&mut self.pending) {
            if t == ticket {
                owned = Some(request);
            } else {
                self.stranded.push(request);
            }
        }
        owned
    }

    /// Swap out everything pending, in submission order.
    pub fn take_all(&mut self) -> Vec<Request> {
        self.wake_pending = false;
        std::mem::take(&mut self.pending)
            .into_iter()
            .map(|(_, request)| request)
            .collect()
    }

    /// Everything left for teardown: stranded requests first, then pending.
    pub fn take_remaining(&mut self) -> Vec<Request> {
        let mut remaining = std::mem::take(&mut self.stranded);
        remaining.extend(self.take_all());
        remaining
    }

    /// Refuse further submissions.
    pub const fn close(&mut self) {
        self.closed = true;
    }

    /// Check if submissions are refused.
    pub const fn is_closed(&self) -> bool {
        self.closed
    }

    /// Number of requests awaiting a drain.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Check if nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::messages::RequestKind;
    use crate::actor::WindowHandle;

    fn show(raw: u32) -> Request {
        Request::new(WindowHandle::new(raw), RequestKind::Show)
    }

    #[test]
    fn test_only_first_push_needs_wake() {
        let mut queue = RequestQueue::new();
        assert!(queue.push(show(0)).unwrap().needs_wake);
        assert!(!queue.push(show(1)).unwrap().needs_wake);
        assert!(!queue.push(show(0)).unwrap().needs_wake);

        assert_eq!(queue.take_all().len(), 3);
        // A drain answers the wake; the next push must wake again.
        assert!(queue.push(show(0)).unwrap().needs_wake);
    }

    #[test]
    fn test_take_all_preserves_order() {
        let mut queue = RequestQueue::new();
        for raw in [3, 1, 2] {
            queue.push(show(raw));
        }
        let handles: Vec<u32> = queue.take_all().iter().map(|r| r.handle.raw()).collect();
        assert_eq!(handles, vec![3, 1, 2]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_abandon_wake_returns_only_the_owner() {
        let mut queue = RequestQueue::new();
        let first = queue.push(show(0)).unwrap();
        assert!(first.needs_wake);
        // Joins the in-flight wake.
        assert!(!queue.push(show(1)).unwrap().needs_wake);

        let owned = queue.abandon_wake(first.ticket).unwrap();
        assert_eq!(owned.handle.raw(), 0);
        assert!(queue.is_closed());
        assert!(queue.take_all().is_empty());
        assert!(queue.push(show(2)).is_none());

        let left: Vec<u32> = queue.take_remaining().iter().map(|r| r.handle.raw()).collect();
        assert_eq!(left, vec![1]);
        assert!(queue.take_remaining().is_empty());
    }

    #[test]
    fn test_take_remaining_without_failure_is_pending() {
        let mut queue = RequestQueue::new();
        queue.push(show(4));
        queue.push(show(5));
        queue.close();
        assert_eq!(queue.take_remaining().len(), 2);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_closed_queue_refuses() {
        let mut queue = RequestQueue::new();
        queue.close();
        assert!(queue.is_closed());
        assert!(queue.push(show(0)).is_none());
        assert!(queue.is_empty());
    }
}
