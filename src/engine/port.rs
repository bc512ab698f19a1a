//! Buffered ports for pull-based streaming
//!
//! An [`InputPort`] is a FIFO of tokens with two counters: the acquire size (how
//! many tokens must be buffered before the owning node may run) and the release
//! size (how many tokens are dropped from the front after a successful run).
//! Upstream producers push tokens and finally close the port to signal the end
//! of the stream. Tokens pushed after closing are dropped.
//!
//! A port only reports [`Acquire::Ready`] once it holds at least the larger of
//! the two sizes, so a release never has to skip tokens that have not arrived
//! yet.

use std::collections::VecDeque;

/// Outcome of trying to acquire tokens from an [`InputPort`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acquire {
    /// At least `max(acquire_size, release_size)` tokens are buffered
    Ready,

    /// Not enough tokens yet, but more may arrive
    Insufficient,

    /// Not enough tokens and the stream is closed; carries the number still buffered
    EndOfStream(usize),
}

/// Input side of a streaming node
#[derive(Debug, Clone)]
pub struct InputPort<T> {
    buffer: VecDeque<T>,
    acquire_size: usize,
    release_size: usize,
    closed: bool,
}

impl<T> InputPort<T> {
    /// Create an open, empty port
    pub fn new(acquire_size: usize, release_size: usize) -> Self {
        Self {
            buffer: VecDeque::new(),
            acquire_size,
            release_size,
            closed: false,
        }
    }

    /// Append one token; ignored once the port is closed
    pub fn push(&mut self, token: T) {
        if self.closed {
            log::warn!("Dropping token pushed after end of stream");
            return;
        }
        self.buffer.push_back(token);
    }

    /// Signal that no more tokens will be pushed
    pub fn close(&mut self) {
        self.closed = true;
    }

    /// Whether the upstream producer has closed the stream
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Number of buffered tokens
    pub fn available(&self) -> usize {
        self.buffer.len()
    }

    /// Tokens required before the node may run
    pub fn acquire_size(&self) -> usize {
        self.acquire_size
    }

    /// Tokens dropped after each run
    pub fn release_size(&self) -> usize {
        self.release_size
    }

    /// Change the acquire size
    pub fn set_acquire_size(&mut self, size: usize) {
        self.acquire_size = size;
    }

    /// Change the release size
    pub fn set_release_size(&mut self, size: usize) {
        self.release_size = size;
    }

    /// Check whether the node may run
    ///
    /// Requires `max(acquire_size, release_size)` buffered tokens, so the tokens
    /// released after the run are always present.
    pub fn try_acquire(&self) -> Acquire {
        if self.buffer.len() >= self.acquire_size.max(self.release_size) {
            Acquire::Ready
        } else if self.closed {
            Acquire::EndOfStream(self.buffer.len())
        } else {
            Acquire::Insufficient
        }
    }

    /// The first `acquire_size` buffered tokens, oldest first
    pub fn tokens(&mut self) -> &[T] {
        let n = self.acquire_size.min(self.buffer.len());
        &self.buffer.make_contiguous()[..n]
    }

    /// Drop `release_size` tokens from the front of the buffer
    pub fn release(&mut self) {
        let n = self.release_size.min(self.buffer.len());
        self.buffer.drain(..n);
    }

    /// Drop every buffered token and reopen the port
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.closed = false;
    }
}

impl<T> Extend<T> for InputPort<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        if self.closed {
            log::warn!("Dropping tokens pushed after end of stream");
            return;
        }
        self.buffer.extend(iter);
    }
}

/// Output side of a streaming node: one token is produced per run
#[derive(Debug, Clone)]
pub struct OutputPort<T> {
    queue: VecDeque<T>,
}

impl<T> OutputPort<T> {
    /// Create an empty output port
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
        }
    }

    /// Emit one token
    pub fn produce(&mut self, token: T) {
        self.queue.push_back(token);
    }

    /// Take the oldest emitted token
    pub fn pop(&mut self) -> Option<T> {
        self.queue.pop_front()
    }

    /// Number of emitted tokens not yet taken
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether every emitted token has been taken
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Take every emitted token, oldest first
    pub fn drain(&mut self) -> Vec<T> {
        self.queue.drain(..).collect()
    }
}

impl<T> Default for OutputPort<T> {
    fn default() -> Self {
        Self::new()
    }
}
