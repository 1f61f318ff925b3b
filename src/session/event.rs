//! Ranging session event kinds and the per-session subscription mask.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A ranging session callback kind.
///
/// Each kind maps to a distinct bit in [`EventMask`]. The set is closed:
/// these are exactly the callbacks the platform ranging layer delivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Opened,
    Started,
    Reconfigured,
    Stopped,
    Closed,
    OpenFailed,
    StartFailed,
    ReconfigureFailed,
    StopFailed,
    CloseFailed,
    ReportReceived,
}

/// All event kinds, in bit order.
pub const ALL_EVENT_KINDS: [EventKind; 11] = [
    EventKind::Opened,
    EventKind::Started,
    EventKind::Reconfigured,
    EventKind::Stopped,
    EventKind::Closed,
    EventKind::OpenFailed,
    EventKind::StartFailed,
    EventKind::ReconfigureFailed,
    EventKind::StopFailed,
    EventKind::CloseFailed,
    EventKind::ReportReceived,
];

impl EventKind {
    /// The bit this kind occupies in an [`EventMask`].
    pub fn bit(self) -> u16 {
        match self {
            EventKind::Opened => 1 << 0,
            EventKind::Started => 1 << 1,
            EventKind::Reconfigured => 1 << 2,
            EventKind::Stopped => 1 << 3,
            EventKind::Closed => 1 << 4,
            EventKind::OpenFailed => 1 << 5,
            EventKind::StartFailed => 1 << 6,
            EventKind::ReconfigureFailed => 1 << 7,
            EventKind::StopFailed => 1 << 8,
            EventKind::CloseFailed => 1 << 9,
            EventKind::ReportReceived => 1 << 10,
        }
    }

    /// The canonical name of this kind.
    pub fn name(self) -> &'static str {
        match self {
            EventKind::Opened => "Opened",
            EventKind::Started => "Started",
            EventKind::Reconfigured => "Reconfigured",
            EventKind::Stopped => "Stopped",
            EventKind::Closed => "Closed",
            EventKind::OpenFailed => "OpenFailed",
            EventKind::StartFailed => "StartFailed",
            EventKind::ReconfigureFailed => "ReconfigureFailed",
            EventKind::StopFailed => "StopFailed",
            EventKind::CloseFailed => "CloseFailed",
            EventKind::ReportReceived => "ReportReceived",
        }
    }

    /// Resolve an event name to its kind.
    ///
    /// Lookup is a case-sensitive exact match against the canonical names.
    /// An unrecognized name resolves to `None` (the invalid sentinel).
    pub fn from_name(name: &str) -> Option<EventKind> {
        ALL_EVENT_KINDS.iter().copied().find(|k| k.name() == name)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-session subscription mask: a fixed-width bitset of [`EventKind`].
///
/// New sessions start with every bit set; subscribe/unsubscribe flip
/// individual bits. The mask only gates republishing to the event sink,
/// never session state storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventMask(u16);

impl EventMask {
    /// Mask with no bits set.
    pub const NONE: EventMask = EventMask(0);

    /// Mask with every event kind set.
    pub const ALL: EventMask = EventMask(
        1 << 0
            | 1 << 1
            | 1 << 2
            | 1 << 3
            | 1 << 4
            | 1 << 5
            | 1 << 6
            | 1 << 7
            | 1 << 8
            | 1 << 9
            | 1 << 10,
    );

    /// Check whether a kind's bit is set.
    pub fn contains(self, kind: EventKind) -> bool {
        self.0 & kind.bit() == kind.bit()
    }

    /// Set a kind's bit.
    pub fn insert(&mut self, kind: EventKind) {
        self.0 |= kind.bit();
    }

    /// Clear a kind's bit.
    pub fn remove(&mut self, kind: EventKind) {
        self.0 &= !kind.bit();
    }

    /// Check whether no bits are set.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// The raw bit pattern.
    pub fn bits(self) -> u16 {
        self.0
    }

    /// The names of all subscribed kinds, in bit order.
    pub fn names(self) -> Vec<&'static str> {
        ALL_EVENT_KINDS
            .iter()
            .filter(|k| self.contains(**k))
            .map(|k| k.name())
            .collect()
    }
}

impl Default for EventMask {
    fn default() -> Self {
        Self::ALL
    }
}
