//! Zip-code partitioned fan-out registry for live event delivery.
//!
//! [`TopicRegistry`] maps each topic ([`ZipCode`]) to the subscribers
//! currently interested in it, each owning a single-slot delivery channel.
//! Publishing pushes an event onto every channel registered under the topic
//! with a non-blocking `try_send`: a subscriber that has not drained its
//! previous event simply misses the new one, so a slow consumer can never
//! stall the publisher or its peers.
//!
//! # Concurrency
//!
//! One [`parking_lot::Mutex`] guards the whole two-level map. It is held
//! only while the map is read or mutated; channel sends happen after the
//! guard is released.
//!
//! # Generations
//!
//! Every registration is tagged with a process-unique generation. A
//! re-subscription of the same `(topic, subscriber)` pair replaces the
//! previous entry, and [`TopicRegistry::unsubscribe_ticket`] only removes
//! an entry whose generation still matches, so tearing down a retired
//! subscription never evicts its replacement.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::task::{Context, Poll};

use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::mpsc::{self, error::TryRecvError, error::TrySendError};
use utoipa::ToSchema;

use super::{Event, SubscriberId, ZipCode};

/// Capacity of every subscriber's delivery channel.
pub const DELIVERY_BUFFER: usize = 1;

/// Identifies one registration: the pair it was made for plus its generation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionTicket {
    topic: ZipCode,
    subscriber: SubscriberId,
    generation: u64,
}

impl SubscriptionTicket {
    /// Topic the subscription was registered under.
    #[must_use]
    pub const fn topic(&self) -> ZipCode {
        self.topic
    }

    /// Subscriber identity of the registration.
    #[must_use]
    pub const fn subscriber(&self) -> &SubscriberId {
        &self.subscriber
    }

    /// Generation assigned at registration time.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }
}

/// Receive side of a subscriber's delivery channel.
///
/// Yields `None` once the registry has dropped the sending side, which
/// happens when the entry is unsubscribed or replaced.
#[derive(Debug)]
pub struct DeliveryHandle {
    ticket: SubscriptionTicket,
    receiver: mpsc::Receiver<Arc<Event>>,
}

impl DeliveryHandle {
    /// Waits for the next delivered event.
    pub async fn recv(&mut self) -> Option<Arc<Event>> {
        self.receiver.recv().await
    }

    /// Takes a delivered event if one is waiting in the slot.
    ///
    /// # Errors
    ///
    /// Returns [`TryRecvError::Empty`] when the slot is empty and
    /// [`TryRecvError::Disconnected`] once the entry has been removed.
    pub fn try_recv(&mut self) -> Result<Arc<Event>, TryRecvError> {
        self.receiver.try_recv()
    }

    /// Registration this handle belongs to.
    #[must_use]
    pub const fn ticket(&self) -> &SubscriptionTicket {
        &self.ticket
    }
}

impl futures_util::Stream for DeliveryHandle {
    type Item = Arc<Event>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

/// Outcome of a single [`TopicRegistry::publish`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct PublishReport {
    /// Subscribers whose slot accepted the event.
    pub delivered: usize,
    /// Subscribers whose slot was still full.
    pub dropped: usize,
}

/// Point-in-time registry counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct RegistryStats {
    /// Topics with at least one live subscriber.
    pub topics: usize,
    /// Live subscriber entries across all topics.
    pub subscribers: usize,
    /// Total `publish` calls.
    pub published: u64,
    /// Total successful slot writes.
    pub delivered: u64,
    /// Total events dropped on a full slot.
    pub dropped: u64,
}

#[derive(Debug)]
struct Slot {
    generation: u64,
    sender: mpsc::Sender<Arc<Event>>,
}

/// The two-level map. All mutation goes through `insert` and `remove_if`
/// so that empty partitions never survive.
#[derive(Debug, Default)]
struct TopicTable {
    partitions: HashMap<ZipCode, HashMap<SubscriberId, Slot>>,
}

impl TopicTable {
    /// Inserts `slot`, creating the partition if needed. Returns the
    /// replaced slot, if any.
    fn insert(&mut self, topic: ZipCode, subscriber: SubscriberId, slot: Slot) -> Option<Slot> {
        self.partitions
            .entry(topic)
            .or_default()
            .insert(subscriber, slot)
    }

    /// Removes the slot for `(topic, subscriber)` if `matches` accepts it,
    /// pruning the partition if it becomes empty.
    fn remove_if(
        &mut self,
        topic: ZipCode,
        subscriber: &SubscriberId,
        matches: impl FnOnce(&Slot) -> bool,
    ) -> Option<Slot> {
        let Entry::Occupied(mut partition) = self.partitions.entry(topic) else {
            return None;
        };
        if !partition.get().get(subscriber).is_some_and(matches) {
            return None;
        }
        let removed = partition.get_mut().remove(subscriber);
        if partition.get().is_empty() {
            partition.remove();
        }
        removed
    }

    fn senders(&self, topic: ZipCode) -> Vec<(SubscriberId, mpsc::Sender<Arc<Event>>)> {
        self.partitions
            .get(&topic)
            .map(|subs| {
                subs.iter()
                    .map(|(id, slot)| (id.clone(), slot.sender.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn subscriber_count(&self) -> usize {
        self.partitions.values().map(HashMap::len).sum()
    }
}

/// Process-wide registry of live event subscriptions.
///
/// Constructed once at startup and shared through an [`Arc`]; tests build
/// isolated instances with [`TopicRegistry::new`].
#[derive(Debug, Default)]
pub struct TopicRegistry {
    table: Mutex<TopicTable>,
    next_generation: AtomicU64,
    published: AtomicU64,
    delivered: AtomicU64,
    dropped: AtomicU64,
}

impl TopicRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new delivery channel for `(topic, subscriber)`.
    ///
    /// An existing entry for the same pair is replaced; its channel is
    /// dropped, which ends the previous handle's stream.
    pub fn subscribe(&self, topic: ZipCode, subscriber: SubscriberId) -> DeliveryHandle {
        let (sender, receiver) = mpsc::channel(DELIVERY_BUFFER);
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let ticket = SubscriptionTicket {
            topic,
            subscriber: subscriber.clone(),
            generation,
        };

        let replaced = self
            .table
            .lock()
            .insert(topic, subscriber, Slot { generation, sender });

        if let Some(old) = replaced {
            tracing::debug!(
                %topic,
                subscriber = %ticket.subscriber,
                old_generation = old.generation,
                generation,
                "subscription replaced"
            );
        } else {
            tracing::debug!(%topic, subscriber = %ticket.subscriber, generation, "subscribed");
        }

        DeliveryHandle { ticket, receiver }
    }

    /// Removes whatever entry is registered for `(topic, subscriber)`.
    ///
    /// Returns `false` if there was none.
    pub fn unsubscribe(&self, topic: ZipCode, subscriber: &SubscriberId) -> bool {
        let removed = self.table.lock().remove_if(topic, subscriber, |_| true);
        removed.is_some()
    }

    /// Removes the entry described by `ticket` only if it is still the
    /// current registration for its pair.
    ///
    /// Returns `false` if the entry is already gone or has been replaced by
    /// a newer generation.
    pub fn unsubscribe_ticket(&self, ticket: &SubscriptionTicket) -> bool {
        let removed = self
            .table
            .lock()
            .remove_if(ticket.topic, &ticket.subscriber, |slot| {
                slot.generation == ticket.generation
            });
        removed.is_some()
    }

    /// Offers `event` to every subscriber registered under `topic`.
    ///
    /// Never blocks. Subscribers whose slot is still occupied miss the
    /// event; the miss is counted and logged.
    pub fn publish(&self, topic: ZipCode, event: Arc<Event>) -> PublishReport {
        self.published.fetch_add(1, Ordering::Relaxed);
        let targets = self.table.lock().senders(topic);

        let mut report = PublishReport::default();
        for (subscriber, sender) in targets {
            match sender.try_send(Arc::clone(&event)) {
                Ok(()) => report.delivered += 1,
                Err(TrySendError::Full(_)) => {
                    report.dropped += 1;
                    tracing::debug!(%topic, %subscriber, event_id = %event.id, "delivery dropped: slot full");
                }
                Err(TrySendError::Closed(_)) => {
                    tracing::trace!(%topic, %subscriber, "delivery skipped: receiver gone");
                }
            }
        }

        self.delivered
            .fetch_add(report.delivered as u64, Ordering::Relaxed);
        self.dropped.fetch_add(report.dropped as u64, Ordering::Relaxed);
        tracing::trace!(%topic, event_id = %event.id, ?report, "published");
        report
    }

    /// Returns `true` if an entry exists for `(topic, subscriber)`.
    #[must_use]
    pub fn contains(&self, topic: ZipCode, subscriber: &SubscriberId) -> bool {
        self.table
            .lock()
            .partitions
            .get(&topic)
            .is_some_and(|subs| subs.contains_key(subscriber))
    }

    /// Number of topics with at least one subscriber.
    #[must_use]
    pub fn topic_count(&self) -> usize {
        self.table.lock().partitions.len()
    }

    /// Number of subscribers currently registered under `topic`.
    #[must_use]
    pub fn subscriber_count(&self, topic: ZipCode) -> usize {
        self.table
            .lock()
            .partitions
            .get(&topic)
            .map_or(0, HashMap::len)
    }

    /// Snapshot of registry size and delivery counters.
    #[must_use]
    pub fn stats(&self) -> RegistryStats {
        let (topics, subscribers) = {
            let table = self.table.lock();
            (table.partitions.len(), table.subscriber_count())
        };
        RegistryStats {
            topics,
            subscribers,
            published: self.published.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::collections::HashSet;

    use chrono::Utc;

    use super::*;
    use crate::domain::EventId;
    use crate::domain::event::tests::draft;

    fn zip(value: u32) -> ZipCode {
        let Ok(zip) = ZipCode::new(value) else {
            panic!("valid zip");
        };
        zip
    }

    fn event(zip_code: u32) -> Arc<Event> {
        Arc::new(Event::from_draft(EventId::new(), draft(zip_code), Utc::now()))
    }

    fn id(s: &str) -> SubscriberId {
        SubscriberId::new(s)
    }

    #[test]
    fn publish_without_subscribers_is_a_no_op() {
        let registry = TopicRegistry::new();
        let report = registry.publish(zip(90210), event(90210));
        assert_eq!(report, PublishReport::default());
        assert_eq!(registry.stats().published, 1);
    }

    #[test]
    fn publish_into_empty_slot_delivers_once() {
        let registry = TopicRegistry::new();
        let mut handle = registry.subscribe(zip(90210), id("u1"));

        let e = event(90210);
        let report = registry.publish(zip(90210), Arc::clone(&e));
        assert_eq!(report.delivered, 1);

        let Ok(received) = handle.try_recv() else {
            panic!("expected a delivered event");
        };
        assert_eq!(received.id, e.id);
        assert!(matches!(handle.try_recv(), Err(TryRecvError::Empty)));
    }

    #[test]
    fn full_slot_drops_newer_event() {
        let registry = TopicRegistry::new();
        let mut handle = registry.subscribe(zip(90210), id("u1"));

        let first = event(90210);
        let _ = registry.publish(zip(90210), Arc::clone(&first));
        let report = registry.publish(zip(90210), event(90210));
        assert_eq!(report.dropped, 1);
        assert_eq!(report.delivered, 0);

        let Ok(received) = handle.try_recv() else {
            panic!("first event must survive");
        };
        assert_eq!(received.id, first.id);
        assert!(matches!(handle.try_recv(), Err(TryRecvError::Empty)));
        assert_eq!(registry.stats().dropped, 1);
    }

    #[test]
    fn slow_subscriber_does_not_affect_peers() {
        let registry = TopicRegistry::new();
        let mut slow = registry.subscribe(zip(90210), id("slow"));
        let mut fast = registry.subscribe(zip(90210), id("fast"));

        let _ = registry.publish(zip(90210), event(90210));
        assert!(fast.try_recv().is_ok());

        let second = event(90210);
        let report = registry.publish(zip(90210), Arc::clone(&second));
        assert_eq!(report, PublishReport { delivered: 1, dropped: 1 });

        let Ok(got) = fast.try_recv() else {
            panic!("fast subscriber must get the second event");
        };
        assert_eq!(got.id, second.id);
        assert!(slow.try_recv().is_ok());
    }

    #[test]
    fn unsubscribe_stops_delivery_and_prunes_topic() {
        let registry = TopicRegistry::new();
        let mut handle = registry.subscribe(zip(90210), id("u1"));
        assert_eq!(registry.topic_count(), 1);

        assert!(registry.unsubscribe(zip(90210), &id("u1")));
        assert_eq!(registry.topic_count(), 0);

        let report = registry.publish(zip(90210), event(90210));
        assert_eq!(report.delivered, 0);
        assert!(matches!(handle.try_recv(), Err(TryRecvError::Disconnected)));
    }

    #[test]
    fn unsubscribe_absent_is_silent() {
        let registry = TopicRegistry::new();
        assert!(!registry.unsubscribe(zip(90210), &id("ghost")));

        let _handle = registry.subscribe(zip(90210), id("u1"));
        assert!(!registry.unsubscribe(zip(90210), &id("ghost")));
        assert_eq!(registry.subscriber_count(zip(90210)), 1);
    }

    #[test]
    fn resubscribe_replaces_previous_target() {
        let registry = TopicRegistry::new();
        let mut first = registry.subscribe(zip(90210), id("u1"));
        let mut second = registry.subscribe(zip(90210), id("u1"));
        assert_eq!(registry.subscriber_count(zip(90210)), 1);

        let e = event(90210);
        let _ = registry.publish(zip(90210), Arc::clone(&e));

        assert!(matches!(first.try_recv(), Err(TryRecvError::Disconnected)));
        let Ok(got) = second.try_recv() else {
            panic!("replacement must receive");
        };
        assert_eq!(got.id, e.id);
    }

    #[test]
    fn stale_ticket_does_not_evict_replacement() {
        let registry = TopicRegistry::new();
        let first = registry.subscribe(zip(90210), id("u1"));
        let second = registry.subscribe(zip(90210), id("u1"));

        assert!(!registry.unsubscribe_ticket(first.ticket()));
        assert!(registry.contains(zip(90210), &id("u1")));

        assert!(registry.unsubscribe_ticket(second.ticket()));
        assert!(!registry.contains(zip(90210), &id("u1")));
        assert_eq!(registry.topic_count(), 0);
    }

    #[test]
    fn same_identity_may_hold_several_topics() {
        let registry = TopicRegistry::new();
        let _a = registry.subscribe(zip(90210), id("u1"));
        let _b = registry.subscribe(zip(10001), id("u1"));
        assert_eq!(registry.topic_count(), 2);

        assert!(registry.unsubscribe(zip(90210), &id("u1")));
        assert!(registry.contains(zip(10001), &id("u1")));
        assert_eq!(registry.topic_count(), 1);
    }

    #[test]
    fn end_to_end_zip_scenario() {
        let registry = TopicRegistry::new();
        let mut u1 = registry.subscribe(zip(90210), id("u1"));

        let e1 = event(90210);
        let _ = registry.publish(e1.zip, Arc::clone(&e1));
        let Ok(got) = u1.try_recv() else {
            panic!("u1 must receive e1");
        };
        assert_eq!(got.id, e1.id);

        let e2 = event(10001);
        let report = registry.publish(e2.zip, e2);
        assert_eq!(report, PublishReport::default());
        assert!(matches!(u1.try_recv(), Err(TryRecvError::Empty)));

        assert!(registry.unsubscribe(zip(90210), &id("u1")));
        let e3 = event(90210);
        let report = registry.publish(e3.zip, e3);
        assert_eq!(report, PublishReport::default());
        assert_eq!(registry.stats().delivered, 1);
    }

    #[tokio::test]
    async fn handle_is_a_stream() {
        use futures_util::StreamExt;

        let registry = TopicRegistry::new();
        let mut handle = registry.subscribe(zip(90210), id("u1"));
        let e = event(90210);
        let _ = registry.publish(zip(90210), Arc::clone(&e));
        let _ = registry.unsubscribe(zip(90210), &id("u1"));

        let Some(got) = handle.next().await else {
            panic!("buffered event must be yielded before end of stream");
        };
        assert_eq!(got.id, e.id);
        assert!(handle.next().await.is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_churn_leaves_only_live_entries() {
        let registry = Arc::new(TopicRegistry::new());
        let topics = [zip(10001), zip(10002), zip(10003)];

        let mut tasks = Vec::new();
        for worker in 0..8u32 {
            let registry = Arc::clone(&registry);
            tasks.push(tokio::spawn(async move {
                let mut live = HashSet::new();
                let mut handles = Vec::new();
                for round in 0..200u32 {
                    let Some(topic) = topics.get(((worker + round) % 3) as usize).copied() else {
                        panic!("topic index in range");
                    };
                    let subscriber = SubscriberId::new(format!("w{worker}-s{}", round % 10));
                    match round % 4 {
                        0 | 1 => {
                            handles.push(registry.subscribe(topic, subscriber.clone()));
                            live.insert((topic, subscriber));
                        }
                        2 => {
                            let _ = registry.unsubscribe(topic, &subscriber);
                            live.remove(&(topic, subscriber));
                        }
                        _ => {
                            let _ = registry.publish(topic, event(topic.get()));
                        }
                    }
                    if round % 16 == 0 {
                        tokio::task::yield_now().await;
                    }
                }
                (live, handles)
            }));
        }

        let mut expected = HashSet::new();
        for task in tasks {
            let Ok((live, _handles)) = task.await else {
                panic!("worker panicked");
            };
            expected.extend(live);
        }

        let table = registry.table.lock();
        let mut actual = HashSet::new();
        for (topic, subs) in &table.partitions {
            assert!(!subs.is_empty(), "empty partition left for {topic}");
            for subscriber in subs.keys() {
                actual.insert((*topic, subscriber.clone()));
            }
        }
        assert_eq!(actual, expected);
    }
}
