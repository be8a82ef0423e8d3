//! RNG abstraction for the simulation
//!
//! Lets the engine run on a seeded generator (reproducible runs, tests) or
//! on `thread_rng()` without caring which.

/// Random number generator used by the update engine and renderer
pub trait SimRng {
    /// Generate random boolean with 50% probability
    fn gen_bool(&mut self) -> bool;

    /// Generate random f32 in [0.0, 1.0)
    fn gen_f32(&mut self) -> f32;

    /// Check if random value is less than probability threshold
    fn check_probability(&mut self, probability: f32) -> bool {
        self.gen_f32() < probability
    }

    /// Uniform f32 in [-amplitude, amplitude)
    fn gen_signed(&mut self, amplitude: f32) -> f32 {
        (self.gen_f32() * 2.0 - 1.0) * amplitude
    }
}

impl<T: ?Sized + rand::Rng> SimRng for T {
    fn gen_bool(&mut self) -> bool {
        rand::Rng::r#gen(self)
    }

    fn gen_f32(&mut self) -> f32 {
        rand::Rng::r#gen(self)
    }
}
