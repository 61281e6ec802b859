use uuid::Uuid;

use wyrmhold_core::RealmId;

use crate::envelope::EventEnvelope;
use crate::event::Event;

/// In-memory append-only event journal for a single realm.
///
/// Not optimized for performance; entries are never removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventJournal<E> {
    realm_id: RealmId,
    entries: Vec<EventEnvelope<E>>,
}

impl<E: Event> EventJournal<E> {
    pub fn new(realm_id: RealmId) -> Self {
        Self {
            realm_id,
            entries: Vec::new(),
        }
    }

    pub fn realm_id(&self) -> RealmId {
        self.realm_id
    }

    fn current_sequence(&self) -> u64 {
        self.entries
            .last()
            .map(EventEnvelope::sequence_number)
            .unwrap_or(0)
    }

    /// Append a batch, assigning consecutive sequence numbers.
    ///
    /// Returns the envelopes that were appended.
    pub fn append(&mut self, events: Vec<E>) -> &[EventEnvelope<E>] {
        let start = self.entries.len();
        let mut next = self.current_sequence() + 1;
        for event in events {
            let envelope = EventEnvelope::new(
                Uuid::now_v7(),
                self.realm_id,
                next,
                event.event_type(),
                event,
            );
            next += 1;
            self.entries.push(envelope);
        }
        &self.entries[start..]
    }

    pub fn envelopes(&self) -> &[EventEnvelope<E>] {
        &self.entries
    }

    /// Envelopes with a sequence number strictly greater than `sequence`.
    pub fn since(&self, sequence: u64) -> &[EventEnvelope<E>] {
        let idx = self
            .entries
            .partition_point(|e| e.sequence_number() <= sequence);
        &self.entries[idx..]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
