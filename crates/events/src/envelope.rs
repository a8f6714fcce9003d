use chrono::{DateTime, Utc};

/// Envelope handed to every handler of one emission.
///
/// The payload is passed through untouched; the bus never inspects it. The
/// envelope adds the routing name (handlers subscribed by pattern need it to
/// know what actually fired) and a per-bus sequence number.
#[derive(Debug, Clone, PartialEq)]
pub struct EventEnvelope<P> {
    name: String,
    /// Monotonically increasing position in this bus's emission order.
    sequence_number: u64,
    emitted_at: DateTime<Utc>,
    payload: P,
}

impl<P> EventEnvelope<P> {
    pub fn new(name: impl Into<String>, sequence_number: u64, payload: P) -> Self {
        Self {
            name: name.into(),
            sequence_number,
            emitted_at: Utc::now(),
            payload,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    /// Wall-clock time the emission started; shared by every handler of it.
    pub fn emitted_at(&self) -> DateTime<Utc> {
        self.emitted_at
    }

    pub fn payload(&self) -> &P {
        &self.payload
    }
}
