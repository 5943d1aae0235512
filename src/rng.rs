/// Uniform random source threaded through the engine and the coordinator.
///
/// Implemented for `fastrand::Rng` so callers can pass a seeded generator
/// and replay a session exactly.
pub trait RandomSource {
    /// Uniform in `[0, 1)`.
    fn draw(&mut self) -> f64;

    /// Uniform integer in `[lo, hi]`, both ends inclusive.
    fn randint(&mut self, lo: i32, hi: i32) -> i32;

    /// Uniform float between `a` and `b` (either order).
    fn uniform(&mut self, a: f64, b: f64) -> f64 {
        a + (b - a) * self.draw()
    }

    /// True with probability `p`.
    fn chance(&mut self, p: f64) -> bool {
        self.draw() < p
    }

    /// -1 or +1 with equal odds.
    fn sign(&mut self) -> i32 {
        if self.draw() < 0.5 {
            -1
        } else {
            1
        }
    }
}

impl RandomSource for fastrand::Rng {
    fn draw(&mut self) -> f64 {
        self.f64()
    }

    fn randint(&mut self, lo: i32, hi: i32) -> i32 {
        debug_assert!(lo <= hi, "empty range {lo}..={hi}");
        self.i32(lo..=hi.max(lo))
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn draw(&mut self) -> f64 {
        (**self).draw()
    }

    fn randint(&mut self, lo: i32, hi: i32) -> i32 {
        (**self).randint(lo, hi)
    }
}

/// Replays a fixed list of draws, then repeats the last one.
/// `randint` maps the next draw onto the range.
#[cfg(test)]
pub(crate) struct Scripted {
    draws: Vec<f64>,
    next: usize,
}

#[cfg(test)]
impl Scripted {
    pub(crate) fn new(draws: &[f64]) -> Self {
        Self {
            draws: draws.to_vec(),
            next: 0,
        }
    }

    /// Every draw returns `v`.
    pub(crate) fn constant(v: f64) -> Self {
        Self::new(&[v])
    }
}

#[cfg(test)]
impl RandomSource for Scripted {
    fn draw(&mut self) -> f64 {
        let idx = self.next.min(self.draws.len().saturating_sub(1));
        self.next += 1;
        self.draws.get(idx).copied().unwrap_or(0.5)
    }

    fn randint(&mut self, lo: i32, hi: i32) -> i32 {
        let span = (hi - lo + 1) as f64;
        (lo + (self.draw() * span) as i32).min(hi)
    }
}
