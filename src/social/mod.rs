//! Peer coordination between pet instances.
//!
//! Every instance publishes its position to a shared store and polls
//! everyone else's. From that it decides whether to avoid sitting, which
//! way to face, and whether to stage a fight. Fights need both sides to
//! name each other before either one starts.

pub mod directory;
pub mod fight;
pub mod publisher;
pub mod record;

pub use directory::PeerDirectory;
pub use fight::{FightRole, FightState};
pub use publisher::PositionPublisher;
pub use record::PeerRecord;

use crate::config::SocialConfig;
use crate::rng::RandomSource;
use crate::storage::SharedStore;
use crate::wander::{AnimationCategory, Locomotion};

/// What the local pet is doing right now, as fed to the coordinator and
/// the publisher.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalView {
    pub x: f64,
    pub y: f64,
    pub facing: i32,
    pub state: AnimationCategory,
    pub locomotion: Locomotion,
    pub region: usize,
}

impl LocalView {
    fn is_idle_walking(&self) -> bool {
        self.state == AnimationCategory::Idle && self.locomotion.posture() == "walk"
    }

    fn is_sitting(&self) -> bool {
        self.locomotion.posture() == "sit"
    }
}

/// Per-tick advice for the host. Recomputed every tick, never stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Directive {
    /// A peer is close enough that sitting down here would look crowded.
    pub block_sit: bool,
    /// Turn toward a nearby peer (-1 left, +1 right) while sitting.
    pub face_toward: Option<i32>,
    /// Set on every tick of an active fight.
    pub fight_role: Option<FightRole>,
    /// True only on the tick the fight starts.
    pub fight_begins: bool,
    /// Opponent's last known x.
    pub fight_peer_x: f64,
    /// Horizontal distance to the nearest peer on the same region.
    pub nearest_peer_distance: f64,
}

impl Default for Directive {
    fn default() -> Self {
        Self {
            block_sit: false,
            face_toward: None,
            fight_role: None,
            fight_begins: false,
            fight_peer_x: 0.0,
            nearest_peer_distance: f64::INFINITY,
        }
    }
}

/// Runs proximity rules and the fight handshake for one local instance.
pub struct Coordinator<S, R = fastrand::Rng> {
    directory: PeerDirectory<S>,
    config: SocialConfig,
    self_id: String,
    rng: R,
    fight: FightState,
}

impl<S: SharedStore, R: RandomSource> Coordinator<S, R> {
    pub fn new(store: S, config: SocialConfig, self_id: impl Into<String>, rng: R) -> Self {
        let self_id = self_id.into();
        debug_assert!(!self_id.contains(','), "instance id {self_id:?} would break the record format");
        Self {
            directory: PeerDirectory::new(store, config.clone(), self_id.clone()),
            config,
            self_id,
            rng,
            fight: FightState::default(),
        }
    }

    pub fn self_id(&self) -> &str {
        &self.self_id
    }

    pub fn directory(&self) -> &PeerDirectory<S> {
        &self.directory
    }

    pub fn fight(&self) -> &FightState {
        &self.fight
    }

    /// Peer we currently propose to fight, for the published record.
    pub fn proposed_target(&self) -> Option<&str> {
        self.fight.target.as_deref()
    }

    /// Call every frame; peer reads are throttled internally.
    pub fn tick(&mut self, local: &LocalView, now: f64) -> Directive {
        let covered = self.directory.poll(now);
        let mut directive = Directive::default();

        let peers = self.directory.peers();
        let Some(nearest) = peers
            .iter()
            .filter(|p| p.region == local.region)
            .min_by(|a, b| (a.x - local.x).abs().total_cmp(&(b.x - local.x).abs()))
        else {
            return directive;
        };
        let nearest_dist = (nearest.x - local.x).abs();
        directive.nearest_peer_distance = nearest_dist;

        if self.fight.expire(now, self.config.proposal_ttl) {
            log::debug!("Fight: proposal expired");
        }

        if self.fight.active {
            if let Some(opponent) = self.fight.target.as_deref().and_then(|t| self.directory.find(t)) {
                self.fight.peer_x = opponent.x;
            }
            return self.deliver(directive);
        }

        // Handshake: our proposal is answered by theirs.
        if let Some(target) = self.fight.target.clone() {
            let answer = peers
                .iter()
                .find(|p| p.id == target && p.targets(&self.self_id) && p.region == local.region);
            if let Some(peer) = answer {
                if (peer.x - local.x).abs() > self.config.fight_range() {
                    log::debug!("Fight: {target} moved out of range, cancelling");
                    self.fight.withdraw();
                } else {
                    let role = FightRole::between(&self.self_id, &peer.id);
                    self.fight.activate(role, peer.x, now);
                    log::debug!("Fight confirmed: {} against {target}", role.label());
                    return self.deliver(directive);
                }
            }
        }

        let cooled = self.fight.cooled_down(now, self.config.fight_cooldown);

        // Someone proposed to us: answer with our own proposal.
        if self.fight.target.is_none() && cooled && local.is_idle_walking() {
            let proposer = peers.iter().find(|p| {
                p.targets(&self.self_id)
                    && p.region == local.region
                    && p.is_idle_walking()
                    && (p.x - local.x).abs() <= self.config.fight_range()
            });
            if let Some(peer) = proposer {
                log::debug!("Fight: accepted proposal from {}", peer.id);
                self.fight.propose(&peer.id, now);
            }
        }

        if nearest_dist < self.config.sit_range() {
            directive.block_sit = true;
        }
        if local.is_sitting() && nearest_dist < self.config.face_range() {
            directive.face_toward = Some(if nearest.x > local.x { 1 } else { -1 });
        }

        // Only roll on ticks that actually rescanned, scaled to the time
        // the scan covers, so the rate is per second and not per frame.
        if let Some(covered) = covered {
            let eligible = self.fight.target.is_none()
                && cooled
                && nearest_dist < self.config.fight_range()
                && local.is_idle_walking()
                && nearest.is_idle_walking();
            if eligible && self.rng.chance(self.config.fight_chance * covered) {
                log::debug!("Fight: proposed to {}", nearest.id);
                self.fight.propose(&nearest.id, now);
            }
        }

        directive
    }

    /// Reset all fight state once the host's fight sequence has finished.
    pub fn clear_fight(&mut self) {
        self.fight.clear();
        log::debug!("Fight cleared");
    }

    fn deliver(&mut self, mut directive: Directive) -> Directive {
        directive.fight_role = self.fight.role;
        directive.fight_peer_x = self.fight.peer_x;
        if !self.fight.delivered {
            self.fight.delivered = true;
            directive.fight_begins = true;
        }
        directive
    }
}
