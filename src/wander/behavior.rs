use crate::rng::RandomSource;

/// What the pet does next when a sit or a walk runs out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Behavior {
    Sit,
    Walk,
    /// Climb the nearest side. Degrades to `Walk` away from an edge.
    Climb,
    Kick,
    Jump,
    /// Play the duplicate-and-replace animation.
    Duplicate,
    /// Play the error cue.
    Error,
}

/// Weighted random pick: one uniform draw scanned against cumulative weights.
///
/// `block_sit` drops `Sit` from the table before the draw, so the remaining
/// weights keep their exact ratios. Falls back to `Sit` if every weight is zero.
pub fn pick(weights: &[(Behavior, u32)], block_sit: bool, rng: &mut impl RandomSource) -> Behavior {
    let eligible = |b: Behavior| !(block_sit && b == Behavior::Sit);

    let total: u32 = weights
        .iter()
        .filter(|(b, _)| eligible(*b))
        .map(|(_, w)| w)
        .sum();
    if total == 0 {
        return Behavior::Sit;
    }

    let roll = rng.draw() * total as f64;
    let mut acc = 0.0;
    for &(behavior, weight) in weights.iter().filter(|(b, _)| eligible(*b)) {
        acc += weight as f64;
        if roll < acc {
            return behavior;
        }
    }
    Behavior::Sit
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Profile, WanderConfig};
    use crate::rng::Scripted;
    use std::collections::HashMap;

    fn frequencies(weights: &[(Behavior, u32)], block_sit: bool, n: usize) -> HashMap<Behavior, f64> {
        let mut rng = fastrand::Rng::with_seed(0x5eed);
        let mut counts: HashMap<Behavior, usize> = HashMap::new();
        for _ in 0..n {
            *counts.entry(pick(weights, block_sit, &mut rng)).or_default() += 1;
        }
        counts.into_iter().map(|(b, c)| (b, c as f64 / n as f64)).collect()
    }

    #[test]
    fn empirical_frequencies_match_weights() {
        for profile in [Profile::Calm, Profile::Active] {
            let weights = WanderConfig::for_profile(profile).weights;
            let total: u32 = weights.iter().map(|(_, w)| w).sum();
            let freq = frequencies(&weights, false, 200_000);
            for (b, w) in &weights {
                let expected = *w as f64 / total as f64;
                let got = freq.get(b).copied().unwrap_or(0.0);
                assert!(
                    (got - expected).abs() < 0.005,
                    "{profile:?} {b:?}: expected {expected:.4}, got {got:.4}"
                );
            }
        }
    }

    #[test]
    fn blocked_sit_never_chosen_and_rest_renormalize() {
        let weights = WanderConfig::for_profile(Profile::Calm).weights;
        let freq = frequencies(&weights, true, 100_000);
        assert_eq!(freq.get(&Behavior::Sit), None);
        // walk is 50 of the remaining 72
        let walk = freq[&Behavior::Walk];
        assert!((walk - 50.0 / 72.0).abs() < 0.01, "walk {walk}");
    }

    #[test]
    fn scan_boundaries_are_half_open() {
        let weights = [(Behavior::Sit, 1), (Behavior::Walk, 1)];
        assert_eq!(pick(&weights, false, &mut Scripted::constant(0.0)), Behavior::Sit);
        assert_eq!(pick(&weights, false, &mut Scripted::constant(0.4999)), Behavior::Sit);
        assert_eq!(pick(&weights, false, &mut Scripted::constant(0.5)), Behavior::Walk);
        assert_eq!(pick(&weights, false, &mut Scripted::constant(0.9999)), Behavior::Walk);
    }

    #[test]
    fn all_blocked_falls_back_to_sit() {
        let weights = [(Behavior::Sit, 10)];
        assert_eq!(pick(&weights, true, &mut Scripted::constant(0.3)), Behavior::Sit);
        assert_eq!(pick(&[], false, &mut Scripted::constant(0.3)), Behavior::Sit);
    }
}
