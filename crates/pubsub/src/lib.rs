// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! A small in-process publish/subscribe registry keyed by topic string.
//!
//! Each subscriber owns a bounded deque and a loop-local `Notify`; `publish`
//! never blocks or applies backpressure to the publisher — on a full queue
//! it drops the oldest buffered item before pushing the new one. `clear`
//! detaches every subscriber on a topic at once, used when a spawn finishes
//! and its trace stream has no more readers.

use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::Notify;

/// Queue depth before `publish` starts dropping the oldest buffered item.
pub const DEFAULT_CAPACITY: usize = 1000;

struct Queue<T> {
    items: Mutex<VecDeque<T>>,
    notify: Notify,
    closed: std::sync::atomic::AtomicBool,
}

/// A live subscription on a topic. Polling stops yielding once the topic is
/// [`Registry::clear`]ed or the `Registry` itself is dropped.
pub struct Subscription<T> {
    queue: Arc<Queue<T>>,
}

impl<T> Subscription<T> {
    /// Wait for the next published item, or `None` once the subscription is
    /// detached (via `clear`) with no items left buffered.
    pub async fn recv(&mut self) -> Option<T> {
        loop {
            if let Some(item) = self.queue.items.lock().pop_front() {
                return Some(item);
            }
            if self.queue.closed.load(std::sync::atomic::Ordering::Acquire) {
                return None;
            }
            self.queue.notify.notified().await;
        }
    }

    /// Drain everything currently buffered without waiting.
    pub fn try_recv_all(&mut self) -> Vec<T> {
        self.queue.items.lock().drain(..).collect()
    }
}

/// Thread-safe topic registry. `T` is typically a canonical trace event or a
/// daemon notification payload.
pub struct Registry<T> {
    topics: RwLock<HashMap<String, Vec<Arc<Queue<T>>>>>,
    capacity: usize,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl<T> Registry<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            topics: RwLock::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Subscribe to `topic`, returning a receiver that will observe every
    /// subsequent `publish` call on that topic until [`Registry::clear`]s it.
    pub fn subscribe(&self, topic: impl Into<String>) -> Subscription<T> {
        let queue = Arc::new(Queue {
            items: Mutex::new(VecDeque::with_capacity(self.capacity.min(64))),
            notify: Notify::new(),
            closed: std::sync::atomic::AtomicBool::new(false),
        });
        self.topics
            .write()
            .entry(topic.into())
            .or_default()
            .push(Arc::clone(&queue));
        Subscription { queue }
    }

    /// Publish `item` to every live subscriber of `topic`, dropping the
    /// oldest buffered item on any subscriber whose queue is full.
    pub fn publish(&self, topic: &str, item: T)
    where
        T: Clone,
    {
        let subscribers = {
            let topics = self.topics.read();
            match topics.get(topic) {
                Some(subs) => subs.clone(),
                None => return,
            }
        };
        for queue in &subscribers {
            let mut items = queue.items.lock();
            if items.len() >= self.capacity {
                items.pop_front();
            }
            items.push_back(item.clone());
            drop(items);
            queue.notify.notify_one();
        }
    }

    /// Detach every subscriber on `topic`. Their `recv()` calls drain
    /// whatever is buffered, then return `None`.
    pub fn clear(&self, topic: &str) {
        if let Some(subs) = self.topics.write().remove(topic) {
            for queue in subs {
                queue.closed.store(true, std::sync::atomic::Ordering::Release);
                queue.notify.notify_waiters();
            }
        }
    }

    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.topics.read().get(topic).map(Vec::len).unwrap_or(0)
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
