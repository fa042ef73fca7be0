//! The integration surface a consensus/gossip host is expected to provide.
//! `certid-state` and `certid-node` depend only on these types, never on a
//! concrete networking or block-production crate.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{Addr, Height, Timestamp};

/// Per-block context every handler receives. Handlers never read the wall
/// clock or any global height counter directly — everything time- or
/// height-dependent flows in through this struct.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockContext {
    pub height: Height,
    pub time: Timestamp,
    pub authority: Addr,
}

/// A structured event emitted by a handler. `attributes` uses `BTreeMap` so
/// serialized/logged attribute order is deterministic across runs — required
/// for the replay-equivalence property (identical ordered event logs).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub event_type: String,
    pub attributes: BTreeMap<String, String>,
}

impl Event {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// Where handlers send events. A production host forwards them to its own
/// firehose; `certid-node`'s sink appends to an in-memory block event log
/// and prints it.
pub trait EventSink {
    fn emit(&mut self, event: Event);
}

/// In-process sink used by `certid-node` and by tests: collects every event
/// emitted during a block (or a test run) in order.
#[derive(Default, Debug)]
pub struct VecEventSink {
    pub events: Vec<Event>,
}

impl EventSink for VecEventSink {
    fn emit(&mut self, event: Event) {
        self.events.push(event);
    }
}
