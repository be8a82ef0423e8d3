//! Simulation statistics collection

/// Receives per-cell events from the update engine
pub trait SimStats {
    /// A particle moved one cell
    fn record_particle_moved(&mut self);

    /// An interaction rule fired
    fn record_reaction(&mut self);

    /// A particle was evaluated and stayed put
    fn record_settled(&mut self);

    /// A cell held an ID the catalog does not know
    fn record_unknown_particle(&mut self) {}
}

/// A no-op implementation for when stats collection is not needed
#[derive(Default)]
pub struct NoopStats;

impl SimStats for NoopStats {
    fn record_particle_moved(&mut self) {}
    fn record_reaction(&mut self) {}
    fn record_settled(&mut self) {}
}

/// Counting implementation, reset between reporting intervals
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickStats {
    pub moves: u64,
    pub reactions: u64,
    pub settled: u64,
    pub unknown_particles: u64,
}

impl TickStats {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Total cells evaluated
    pub fn evaluated(&self) -> u64 {
        self.moves + self.reactions + self.settled
    }
}

impl SimStats for TickStats {
    fn record_particle_moved(&mut self) {
        self.moves += 1;
    }

    fn record_reaction(&mut self) {
        self.reactions += 1;
    }

    fn record_settled(&mut self) {
        self.settled += 1;
    }

    fn record_unknown_particle(&mut self) {
        self.unknown_particles += 1;
    }
}
