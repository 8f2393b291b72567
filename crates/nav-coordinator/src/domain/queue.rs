//! Pending command list and completion handles.
//!
//! `PendingQueue` is the ordering core of the command queue: a plain
//! vector kept sorted by priority descending, FIFO among equal priorities.
//! It holds no locks and spawns nothing; `service::queue` wraps it.

use super::command::{Command, Priority};
use super::record::Timestamp;
use crate::error::{NavResult, NavigationError};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::oneshot;
use uuid::Uuid;

/// One enqueued command awaiting dispatch.
#[derive(Debug)]
pub struct QueueItem {
    pub id: Uuid,
    pub command: Command,
    pub priority: Priority,
    pub enqueued_at: Timestamp,
    responder: oneshot::Sender<NavResult<()>>,
}

impl QueueItem {
    /// Creates an item together with the handle its submitter waits on.
    pub fn new(command: Command, priority: Priority, enqueued_at: Timestamp) -> (Self, Completion) {
        let (responder, receiver) = oneshot::channel();
        let item = Self {
            id: Uuid::new_v4(),
            command,
            priority,
            enqueued_at,
            responder,
        };
        (item, Completion { receiver })
    }

    /// Delivers the outcome. A dropped completion is not an error.
    pub fn complete(self, outcome: NavResult<()>) {
        let _ = self.responder.send(outcome);
    }
}

/// Awaitable outcome of one enqueued command.
///
/// Dropping it is fine; the command still runs. If the queue goes away
/// before answering, it resolves to [`NavigationError::QueueCleared`].
#[derive(Debug)]
pub struct Completion {
    receiver: oneshot::Receiver<NavResult<()>>,
}

impl Future for Completion {
    type Output = NavResult<()>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.receiver).poll(cx) {
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            Poll::Ready(Err(_)) => Poll::Ready(Err(NavigationError::QueueCleared)),
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Snapshot returned by `status()`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueStatus {
    pub queue_length: usize,
    pub is_processing: bool,
    pub has_controller: bool,
}

/// Priority-ordered pending items.
#[derive(Debug, Default)]
pub struct PendingQueue {
    items: Vec<QueueItem>,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts before the first item with strictly lower priority.
    pub fn insert(&mut self, item: QueueItem) {
        let position = self
            .items
            .iter()
            .position(|queued| queued.priority < item.priority)
            .unwrap_or(self.items.len());
        self.items.insert(position, item);
    }

    pub fn pop_front(&mut self) -> Option<QueueItem> {
        if self.items.is_empty() {
            None
        } else {
            Some(self.items.remove(0))
        }
    }

    /// Removes every item, in queue order.
    pub fn drain_all(&mut self) -> Vec<QueueItem> {
        std::mem::take(&mut self.items)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = &QueueItem> {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn item(route: &str, priority: Priority) -> QueueItem {
        QueueItem::new(Command::navigate(route, None), priority, 0).0
    }

    fn routes(queue: &PendingQueue) -> Vec<String> {
        queue
            .iter()
            .filter_map(|i| i.command.target_route().map(str::to_string))
            .collect()
    }

    #[test]
    fn test_priority_then_fifo() {
        let mut queue = PendingQueue::new();
        queue.insert(item("A", 0));
        queue.insert(item("B", 5));
        queue.insert(item("C", 0));
        queue.insert(item("D", 5));
        queue.insert(item("E", 1));
        assert_eq!(routes(&queue), vec!["B", "D", "E", "A", "C"]);
    }

    #[test]
    fn test_pop_and_drain() {
        let mut queue = PendingQueue::new();
        assert!(queue.pop_front().is_none());
        queue.insert(item("A", 0));
        queue.insert(item("B", 1));
        assert_eq!(queue.pop_front().unwrap().command.target_route(), Some("B"));
        assert_eq!(queue.drain_all().len(), 1);
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn test_completion_receives_outcome() {
        let (item, completion) = QueueItem::new(Command::go_back(), 0, 0);
        item.complete(Err(NavigationError::QueueNotReady));
        assert_eq!(completion.await, Err(NavigationError::QueueNotReady));
    }

    #[tokio::test]
    async fn test_dropped_item_resolves_cleared() {
        let (item, completion) = QueueItem::new(Command::go_back(), 0, 0);
        drop(item);
        assert_eq!(completion.await, Err(NavigationError::QueueCleared));
    }

    proptest! {
        #[test]
        fn prop_order_is_priority_desc_then_insertion(priorities in proptest::collection::vec(-3i32..4, 0..40)) {
            let mut queue = PendingQueue::new();
            for (seq, priority) in priorities.iter().enumerate() {
                queue.insert(item(&seq.to_string(), *priority));
            }

            let mut expected: Vec<(i32, usize)> = priorities
                .iter()
                .enumerate()
                .map(|(seq, p)| (*p, seq))
                .collect();
            // Stable sort keeps insertion order among ties.
            expected.sort_by(|a, b| b.0.cmp(&a.0));

            let actual: Vec<(i32, usize)> = queue
                .iter()
                .map(|i| (i.priority, i.command.target_route().unwrap_or_default().parse().unwrap_or(usize::MAX)))
                .collect();
            prop_assert_eq!(actual, expected);
        }
    }
}
