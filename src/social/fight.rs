/// Side of a staged fight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FightRole {
    Attacker,
    Defender,
}

impl FightRole {
    /// Both sides compute this independently from the two ids alone: the
    /// lexicographically smaller id attacks.
    pub fn between(local_id: &str, peer_id: &str) -> Self {
        if local_id < peer_id {
            FightRole::Attacker
        } else {
            FightRole::Defender
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FightRole::Attacker => "attacker",
            FightRole::Defender => "defender",
        }
    }
}

/// Local half of the propose/confirm handshake.
///
/// `active` implies `role` and `target` are set. `delivered` flips once per
/// activation so the host starts the fight animation exactly once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FightState {
    /// Peer we proposed to (published as our `fight_target`).
    pub target: Option<String>,
    pub proposed_at: Option<f64>,
    pub role: Option<FightRole>,
    pub active: bool,
    pub delivered: bool,
    /// Last seen x of the opponent.
    pub peer_x: f64,
    /// When the last fight started. Drives the cooldown.
    pub last_fight_at: Option<f64>,
}

impl FightState {
    pub fn propose(&mut self, peer_id: &str, now: f64) {
        self.target = Some(peer_id.to_string());
        self.proposed_at = Some(now);
    }

    pub fn withdraw(&mut self) {
        self.target = None;
        self.proposed_at = None;
    }

    /// Drop an unconfirmed proposal older than `ttl`. Returns true if dropped.
    pub fn expire(&mut self, now: f64, ttl: f64) -> bool {
        match self.proposed_at {
            Some(at) if !self.active && now - at > ttl => {
                self.withdraw();
                true
            }
            _ => false,
        }
    }

    pub fn activate(&mut self, role: FightRole, peer_x: f64, now: f64) {
        debug_assert!(self.target.is_some(), "activating a fight with no target");
        self.role = Some(role);
        self.active = true;
        self.delivered = false;
        self.peer_x = peer_x;
        self.last_fight_at = Some(now);
    }

    pub fn cooled_down(&self, now: f64, cooldown: f64) -> bool {
        self.last_fight_at.map_or(true, |at| now - at > cooldown)
    }

    /// Back to no proposal, no fight. The cooldown clock is kept.
    pub fn clear(&mut self) {
        *self = Self {
            last_fight_at: self.last_fight_at,
            ..Self::default()
        };
    }
}

/// Shove that sends the defender clear of the fight range, plus the facing
/// it should hold toward the attacker just before.
///
/// The throw goes away from the attacker; its horizontal speed covers
/// `clear_distance` over the time a `vy` hop takes to come back down.
pub fn defender_throw(local_x: f64, attacker_x: f64, clear_distance: f64, vy: f64, gravity: f64) -> (i32, f64, f64) {
    let facing = if attacker_x > local_x { 1 } else { -1 };
    let air_ticks = (2.0 * vy.abs() / gravity).max(1.0);
    let vx = clear_distance / air_ticks * -facing as f64;
    (facing, vx, vy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_sides_agree_on_roles() {
        assert_eq!(FightRole::between("1", "2"), FightRole::Attacker);
        assert_eq!(FightRole::between("2", "1"), FightRole::Defender);
        assert_eq!(FightRole::between("abc", "abd"), FightRole::Attacker);
        assert_eq!(FightRole::between("b", "abc"), FightRole::Defender);
    }

    #[test]
    fn proposals_expire_only_after_ttl() {
        let mut f = FightState::default();
        f.propose("p", 10.0);
        assert!(!f.expire(13.0, 3.0));
        assert!(f.expire(13.01, 3.0));
        assert_eq!(f.target, None);
    }

    #[test]
    fn active_fights_do_not_expire() {
        let mut f = FightState::default();
        f.propose("p", 10.0);
        f.activate(FightRole::Defender, 50.0, 11.0);
        assert!(!f.expire(100.0, 3.0));
        assert!(f.active);
    }

    #[test]
    fn clear_keeps_cooldown() {
        let mut f = FightState::default();
        f.propose("p", 10.0);
        f.activate(FightRole::Attacker, 50.0, 11.0);
        f.clear();
        assert!(!f.active);
        assert_eq!(f.role, None);
        assert_eq!(f.target, None);
        assert!(!f.cooled_down(20.0, 10.0));
        assert!(f.cooled_down(21.5, 10.0));
    }

    #[test]
    fn defender_is_thrown_away_from_attacker() {
        // 0.3 gravity, -2.5 hop: ~16.7 ticks in the air.
        let (facing, vx, vy) = defender_throw(500.0, 600.0, 166.4, -2.5, 0.3);
        assert_eq!(facing, 1);
        assert!(vx < 0.0);
        assert!((vx.abs() * (5.0 / 0.3) - 166.4).abs() < 1e-6);
        assert_eq!(vy, -2.5);

        let (facing, vx, _) = defender_throw(700.0, 600.0, 100.0, -2.5, 0.3);
        assert_eq!(facing, -1);
        assert!(vx > 0.0);
    }
}
