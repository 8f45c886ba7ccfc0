//! Pending-request queue

use std::collections::VecDeque;

use crate::error::{Error, Result};

/// Strict FIFO buffer of request identifiers awaiting an allocation
/// attempt.
///
/// The queue holds identifiers, never requests; the request directory
/// stays the single owner. A dequeued identifier whose allocation attempt
/// fails is not re-enqueued automatically, re-processing is the caller's
/// decision.
#[derive(Debug, Clone)]
pub struct RequestQueue {
    items: VecDeque<String>,
    max_size: usize,
}

impl RequestQueue {
    /// Create an empty queue with a fixed capacity
    pub fn new(max_size: usize) -> Self {
        Self {
            items: VecDeque::new(),
            max_size,
        }
    }

    /// Append a request identifier at the back.
    ///
    /// # Errors
    ///
    /// Returns `Error::CapacityExceeded` when the queue is full.
    pub fn enqueue(&mut self, request_id: &str) -> Result<()> {
        if self.items.len() >= self.max_size {
            return Err(Error::CapacityExceeded(format!(
                "Request queue is full ({} requests)",
                self.max_size
            )));
        }
        self.items.push_back(request_id.to_string());
        Ok(())
    }

    /// Remove and return the oldest identifier, `None` when empty
    pub fn dequeue(&mut self) -> Option<String> {
        self.items.pop_front()
    }

    /// The oldest identifier without removing it
    pub fn peek(&self) -> Option<&str> {
        self.items.front().map(|s| s.as_str())
    }

    /// Number of queued identifiers
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when nothing is queued
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Maximum number of queued identifiers
    pub fn capacity(&self) -> usize {
        self.max_size
    }

    /// Queued identifiers in FIFO order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|s| s.as_str())
    }
}
