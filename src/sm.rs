//! Declarative transition-table state machine engine.
//!
//! A state machine is a per-state array of ordered entry slices. Each entry
//! pairs an event match with a next state and an optional action. Tables are
//! data: they can be inspected, printed and exercised in tests without any
//! of the action machinery attached. The wildcard entry terminating every
//! table supplies default self-loop behavior, so a lookup never fails on a
//! well-formed table.
//!
//! The engine is deliberately generic over state, event and action types so
//! further fast-path features can define their own tables against the same
//! primitive.

/// Event pattern of a transition entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventMatch<E> {
    /// Matches exactly this event.
    Is(E),
    /// Matches any event; used as the terminating default entry.
    Any,
}

/// One row of a per-state transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmEntry<S, E, A> {
    pub on: EventMatch<E>,
    pub next: S,
    pub action: Option<A>,
}

impl<S, E, A> SmEntry<S, E, A> {
    /// Entry matching one specific event.
    pub const fn on(event: E, next: S, action: Option<A>) -> Self {
        Self {
            on: EventMatch::Is(event),
            next,
            action,
        }
    }

    /// Terminating default entry: any event self-loops with no action.
    pub const fn default_self(state: S) -> Self {
        Self {
            on: EventMatch::Any,
            next: state,
            action: None,
        }
    }
}

/// Finds the entry governing `event` in a per-state table.
///
/// The first exact match wins; the wildcard entry matches anything not
/// otherwise listed. Returns `None` only for a malformed table missing its
/// terminating wildcard entry.
pub fn lookup<S, E, A>(table: &[SmEntry<S, E, A>], event: E) -> Option<&SmEntry<S, E, A>>
where
    E: Copy + PartialEq,
{
    table.iter().find(|entry| match entry.on {
        EventMatch::Is(e) => e == event,
        EventMatch::Any => true,
    })
}

/// Applies one event against a per-state table.
///
/// Sets `state` to the governing entry's next state and returns the entry's
/// action for the caller to dispatch. Exactly one state mutation and at most
/// one returned action per call; the caller is responsible for holding the
/// context lock across lookup, mutation and action dispatch.
pub fn transition<S, E, A>(state: &mut S, table: &[SmEntry<S, E, A>], event: E) -> Option<A>
where
    S: Copy,
    E: Copy + PartialEq,
    A: Copy,
{
    let Some(entry) = lookup(table, event) else {
        debug_assert!(false, "transition table missing terminating wildcard entry");
        return None;
    };
    *state = entry.next;
    entry.action
}
