//=========================================================================
// Event Queue
//
// Fixed-capacity FIFO of platform events shared by every producer inside
// `window_update` (message pump, gamepad poller) and drained by the
// application through `poll_window_event`.
//
// Counters:
// ```text
//   0 ≤ cursor ≤ events.len() ≤ capacity
//
//   push  → appends while len < capacity, silently drops otherwise
//   poll  → yields events[cursor], cursor += 1
//         → once cursor == len (> 0): next poll resets both to 0
// ```
//
// Notes:
// The reset is lazy: after the last event has been handed out the queue
// still reports it as consumed-but-present until the next poll observes
// the drained state. Events pushed between full consumption and that poll
// are therefore still delivered, in order.
//
// Storage is allocated once at construction and never grows or shrinks;
// the reset uses `Vec::clear`, which keeps the allocation.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::trace;

//=== Internal Dependencies ===============================================

use super::event::Event;

//=== EventQueue ==========================================================

/// Capacity used when the session is not configured otherwise.
pub const DEFAULT_EVENT_CAPACITY: usize = 32_768;

/// Bounded FIFO of [`Event`]s with a push counter and a poll cursor.
#[derive(Debug)]
pub struct EventQueue {
    events: Vec<Event>,
    cursor: usize,
    capacity: usize,
    dropped: u64,
}

impl EventQueue {
    //--- Construction -----------------------------------------------------

    /// Creates an empty queue holding at most `capacity` undrained events.
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Event queue capacity must be positive");
        Self {
            events: Vec::with_capacity(capacity),
            cursor: 0,
            capacity,
            dropped: 0,
        }
    }

    //--- Producer ---------------------------------------------------------

    /// Appends an event. Returns `false` (and drops the event) when full.
    pub fn push(&mut self, event: Event) -> bool {
        if self.events.len() < self.capacity {
            self.events.push(event);
            true
        } else {
            self.dropped += 1;
            trace!(target: "platform::input", "Event queue full, dropping {:?}", event);
            false
        }
    }

    //--- Consumer ---------------------------------------------------------

    /// Returns the next unconsumed event in FIFO order.
    ///
    /// A poll that finds every pushed event already consumed resets both
    /// counters to zero and returns `None`.
    pub fn poll(&mut self) -> Option<Event> {
        if self.cursor < self.events.len() {
            let event = self.events[self.cursor];
            self.cursor += 1;
            return Some(event);
        }

        if !self.events.is_empty() {
            self.events.clear();
            self.cursor = 0;
        }
        None
    }

    //--- Queries ----------------------------------------------------------

    /// Number of events pushed since the last drain reset.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of events pushed but not yet polled.
    pub fn pending(&self) -> usize {
        self.events.len() - self.cursor
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total events dropped because the queue was full.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
