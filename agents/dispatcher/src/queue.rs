use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Mutex;

use tokio::sync::Notify;

use overlay_core::Submission;

/// A submission with its insertion rank.
///
/// The rank is assigned on first offer and preserved across re-enqueues, so
/// a sequence-fault retry re-enters at the head of its priority band rather
/// than behind later arrivals.
#[derive(Debug)]
pub struct QueuedSubmission {
    /// The queued work item.
    pub submission: Submission,
    rank: u64,
}

impl PartialEq for QueuedSubmission {
    fn eq(&self, other: &Self) -> bool {
        self.submission.priority == other.submission.priority && self.rank == other.rank
    }
}

impl Eq for QueuedSubmission {}

impl PartialOrd for QueuedSubmission {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedSubmission {
    // max-heap: higher priority first, earlier insertion first within a band
    fn cmp(&self, other: &Self) -> Ordering {
        self.submission
            .priority
            .cmp(&other.submission.priority)
            .then_with(|| other.rank.cmp(&self.rank))
    }
}

/// Unbounded per-account queue ordered by (priority desc, insertion asc).
///
/// Higher priority may starve lower priority indefinitely; that is the
/// admission contract, not an accident.
#[derive(Debug, Default)]
pub struct SubmissionQueue {
    heap: Mutex<BinaryHeap<QueuedSubmission>>,
    notify: Notify,
    next_rank: AtomicU64,
}

impl SubmissionQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a new submission, assigning its insertion rank.
    pub fn offer(&self, submission: Submission) {
        let rank = self.next_rank.fetch_add(1, AtomicOrdering::Relaxed);
        self.push(QueuedSubmission { submission, rank });
    }

    /// Return a previously popped submission to the queue, keeping its
    /// original insertion rank and priority.
    pub fn requeue(&self, item: QueuedSubmission) {
        self.push(item);
    }

    fn push(&self, item: QueuedSubmission) {
        self.heap.lock().expect("queue lock poisoned").push(item);
        self.notify.notify_one();
    }

    /// Remove and return the highest-ranked submission, waiting if the
    /// queue is empty.
    pub async fn take(&self) -> QueuedSubmission {
        loop {
            let notified = self.notify.notified();
            if let Some(item) = self.heap.lock().expect("queue lock poisoned").pop() {
                return item;
            }
            notified.await;
        }
    }

    /// Number of queued submissions.
    pub fn len(&self) -> usize {
        self.heap.lock().expect("queue lock poisoned").len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
