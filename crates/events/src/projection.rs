use crate::Event;

/// A projection folds an append-only event sequence into a read model.
///
/// Read models are disposable: the log is the source of truth and any
/// projection can be dropped and rebuilt by replaying it in canonical order.
///
/// ## Incremental vs. full
///
/// A projection may be kept up to date one event at a time (`apply` after each
/// successful append) or rebuilt from the complete log (`rebuild`). Both paths
/// must yield the same read model; callers rely on that to use the incremental
/// path as a cache.
///
/// ## Error Handling
///
/// `apply` does not return errors. Events reaching a projection were already
/// validated at the log boundary, so the fold is total.
pub trait Projection {
    type Ev: Event;

    /// Apply a single event to the read model.
    fn apply(&mut self, event: &Self::Ev);

    /// Drop all derived state.
    fn reset(&mut self);

    /// Reset, then replay `events` in the order given.
    fn rebuild<'a, I>(&mut self, events: I)
    where
        I: IntoIterator<Item = &'a Self::Ev>,
        Self::Ev: 'a,
    {
        self.reset();
        for event in events {
            self.apply(event);
        }
    }
}
