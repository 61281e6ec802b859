use serde::{Deserialize, Serialize};
use uuid::Uuid;

use wyrmhold_core::RealmId;

/// Envelope for an event, containing stream metadata.
///
/// Notes:
/// - **Append-only**: `sequence_number` is monotonically increasing per realm.
/// - `payload` is the typed domain event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope<E> {
    event_id: Uuid,
    realm_id: RealmId,

    /// Monotonically increasing position in the realm stream, starting at 1.
    sequence_number: u64,

    event_type: String,

    payload: E,
}

impl<E> EventEnvelope<E> {
    pub fn new(
        event_id: Uuid,
        realm_id: RealmId,
        sequence_number: u64,
        event_type: impl Into<String>,
        payload: E,
    ) -> Self {
        Self {
            event_id,
            realm_id,
            sequence_number,
            event_type: event_type.into(),
            payload,
        }
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn realm_id(&self) -> RealmId {
        self.realm_id
    }

    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn payload(&self) -> &E {
        &self.payload
    }

    pub fn into_payload(self) -> E {
        self.payload
    }
}
