//! Domain events: the event contract, stream envelopes, and the in-memory journal.

pub mod envelope;
pub mod event;
pub mod journal;

pub use envelope::EventEnvelope;
pub use event::Event;
pub use journal::EventJournal;
