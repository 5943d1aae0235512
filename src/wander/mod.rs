pub mod behavior;
pub mod state;

pub use behavior::Behavior;
pub use state::{AnimationCategory, Locomotion, SpecialAnimation};

use glam::DVec2;

use crate::bounds::{Bounds, BoundsResolver, Region};
use crate::config::{Launch, WanderConfig};
use crate::rng::RandomSource;
use crate::social::Directive;

/// Distance from the right bound where a fresh engine sits down.
const START_INSET: f64 = 40.0;

/// Result of one simulation step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    /// Clamped top-left position of the pet.
    pub position: DVec2,
    pub locomotion: Locomotion,
    /// Animation the host should play now. Emitted exactly once.
    pub signal: Option<SpecialAnimation>,
}

impl StepOutcome {
    /// Whole-pixel window position.
    pub fn pixel(&self) -> (i32, i32) {
        (self.position.x as i32, self.position.y as i32)
    }
}

/// Countdowns in ticks.
#[derive(Debug, Clone, Copy, Default)]
struct Timers {
    sit: i32,
    walk: i32,
    land: i32,
}

/// Which side bound or floor/ceiling an airborne pet ran into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Contact {
    Ground,
    Left,
    Right,
    Ceiling,
}

/// Shimeji-style movement: sits, walks, climbs the sides, walks the ceiling,
/// falls, jumps and gets thrown, one fixed step per call.
///
/// Positions are the pet's top-left corner in desktop pixels and always lie
/// inside the active region's bounds after [`step`](Self::step).
pub struct WanderEngine<R = fastrand::Rng> {
    config: WanderConfig,
    resolver: BoundsResolver,
    rng: R,

    pos: DVec2,
    /// -1 = left, +1 = right.
    direction: i32,
    locomotion: Locomotion,
    timers: Timers,

    walk_speed: f64,
    fall_speed: f64,
    jump_v: DVec2,
    throw_v: DVec2,
    launch: Launch,
    /// Highest point (smallest y) of the current unsupported descent.
    fall_origin_y: f64,

    block_sit: bool,
    peer_overlapping: bool,
    pending: Option<SpecialAnimation>,
}

impl<R: RandomSource> WanderEngine<R> {
    /// Start sitting on the floor of region 0, near its right edge.
    pub fn new(config: WanderConfig, resolver: BoundsResolver, mut rng: R) -> Self {
        let b = resolver.bounds();
        let (lo, hi) = config.initial_sit_ticks;
        let timers = Timers {
            sit: rng.randint(lo, hi),
            ..Timers::default()
        };
        let walk_speed = rng.uniform(config.walk_speed.0, config.walk_speed.1);
        let launch = config.kick;
        let pos = b.clamp(DVec2::new(b.x_max - START_INSET, b.y_max));

        Self {
            config,
            resolver,
            rng,
            pos,
            direction: -1,
            locomotion: Locomotion::Sit,
            timers,
            walk_speed,
            fall_speed: 0.0,
            jump_v: DVec2::ZERO,
            throw_v: DVec2::ZERO,
            launch,
            fall_origin_y: pos.y,
            block_sit: false,
            peer_overlapping: false,
            pending: None,
        }
    }

    pub fn position(&self) -> DVec2 {
        self.pos
    }

    pub fn direction(&self) -> i32 {
        self.direction
    }

    pub fn locomotion(&self) -> Locomotion {
        self.locomotion
    }

    pub fn bounds(&self) -> Bounds {
        self.resolver.bounds()
    }

    pub fn active_region(&self) -> usize {
        self.resolver.active_index()
    }

    pub fn config(&self) -> &WanderConfig {
        &self.config
    }

    /// Advance one tick unless `current` is an overriding animation, in
    /// which case the pet holds still and the last position is returned.
    pub fn step(&mut self, current: AnimationCategory) -> StepOutcome {
        if current.overrides_movement() {
            return StepOutcome {
                position: self.pos,
                locomotion: self.locomotion,
                signal: None,
            };
        }

        match self.locomotion {
            Locomotion::Sit => self.do_sit(),
            Locomotion::WalkGround => self.do_walk_ground(),
            Locomotion::WalkCeiling => self.do_walk_ceiling(),
            Locomotion::ClimbLeft => self.do_climb(-1),
            Locomotion::ClimbRight => self.do_climb(1),
            Locomotion::Jump | Locomotion::Kick => self.do_launch(),
            Locomotion::Fall => self.do_fall(),
            Locomotion::Throw => self.do_throw(),
            Locomotion::SoftLand | Locomotion::HardLand => self.do_land(),
        }

        self.pos = self.resolver.bounds().clamp(self.pos);
        StepOutcome {
            position: self.pos,
            locomotion: self.locomotion,
            signal: self.pending.take(),
        }
    }

    // --- host hooks ---

    /// Feed the coordinator's advice back into behavior selection.
    /// `overlap_range` is the distance under which a peer counts as overlapping.
    pub fn apply_directive(&mut self, directive: &Directive, overlap_range: f64) {
        self.block_sit = directive.block_sit;
        self.peer_overlapping = directive.nearest_peer_distance < overlap_range;
    }

    pub fn set_block_sit(&mut self, block: bool) {
        self.block_sit = block;
    }

    pub fn set_direction(&mut self, direction: i32) {
        self.direction = if direction < 0 { -1 } else { 1 };
    }

    /// Turn toward a horizontal coordinate.
    pub fn face_toward(&mut self, x: f64) {
        self.set_direction(if x > self.pos.x { 1 } else { -1 });
    }

    /// Facing for sprite selection: climbers face their wall, and a sitting
    /// pet may be turned toward a peer.
    pub fn visual_facing(&self, face_toward: Option<i32>) -> i32 {
        match (self.locomotion, face_toward) {
            (Locomotion::ClimbLeft, _) => -1,
            (Locomotion::ClimbRight, _) => 1,
            (Locomotion::Sit, Some(f)) => f,
            _ => self.direction,
        }
    }

    /// Put the pet at `x` on the floor and sit.
    pub fn place_on_floor(&mut self, x: f64) {
        let b = self.resolver.bounds();
        self.pos = b.clamp(DVec2::new(x, b.y_max));
        self.start_sit();
    }

    /// Drag-and-drop hand-off: adopt the dropped position and region, then
    /// sit (near the floor), throw (fast release) or fall.
    pub fn release(&mut self, top_left: DVec2, velocity: DVec2) {
        self.resolver.switch_to_region_at(top_left);
        let b = self.resolver.bounds();
        self.pos = b.clamp(top_left);

        if self.pos.y >= b.y_max - self.config.floor_snap {
            self.pos.y = b.y_max;
            self.start_sit();
        } else if velocity.length() > self.config.throw_release_speed {
            self.start_throw(velocity.x, velocity.y);
        } else {
            self.start_fall();
        }
    }

    /// Replace the display set. The pet is pulled back inside the new bounds.
    pub fn set_regions(&mut self, regions: Vec<Region>) {
        self.resolver.set_regions(regions);
        self.pos = self.resolver.bounds().clamp(self.pos);
    }

    pub fn start_kick(&mut self) {
        self.start_launch(Locomotion::Kick, self.config.kick);
    }

    pub fn start_jump(&mut self) {
        self.start_launch(Locomotion::Jump, self.config.jump);
    }

    pub fn start_fall(&mut self) {
        self.locomotion = Locomotion::Fall;
        self.fall_speed = self.config.fall_speed_init;
        self.fall_origin_y = self.pos.y;
    }

    pub fn start_throw(&mut self, vx: f64, vy: f64) {
        self.locomotion = Locomotion::Throw;
        self.throw_v = DVec2::new(vx, vy);
        self.direction = if vx > 0.0 { 1 } else { -1 };
        self.fall_origin_y = self.pos.y;
    }

    // --- behavior selection ---

    fn transition(&mut self) {
        let b = self.resolver.bounds();
        match behavior::pick(&self.config.weights, self.block_sit, &mut self.rng) {
            Behavior::Sit => self.start_sit(),
            Behavior::Walk => self.start_walk(),
            Behavior::Climb => {
                if self.pos.x <= b.x_min + self.config.climb_edge_distance {
                    self.locomotion = Locomotion::ClimbLeft;
                } else if self.pos.x >= b.x_max - self.config.climb_edge_distance {
                    self.locomotion = Locomotion::ClimbRight;
                } else {
                    self.start_walk();
                }
            }
            Behavior::Kick => self.start_kick(),
            Behavior::Jump => self.start_jump(),
            Behavior::Duplicate => {
                self.pending = Some(SpecialAnimation::Duplicate);
                self.start_sit();
            }
            Behavior::Error => {
                self.pending = Some(SpecialAnimation::Error);
                self.start_sit();
            }
        }
    }

    fn start_sit(&mut self) {
        self.locomotion = Locomotion::Sit;
        let (lo, hi) = self.config.sit_ticks;
        self.timers.sit = self.rng.randint(lo, hi);
    }

    fn start_walk(&mut self) {
        self.locomotion = Locomotion::WalkGround;
        self.direction = self.rng.sign();
        self.walk_speed = self
            .rng
            .uniform(self.config.walk_speed.0, self.config.walk_speed.1);
        self.reset_walk_timer();
    }

    fn reset_walk_timer(&mut self) {
        let (lo, hi) = self.config.walk_ticks;
        self.timers.walk = self.rng.randint(lo, hi);
    }

    fn start_launch(&mut self, kind: Locomotion, launch: Launch) {
        self.locomotion = kind;
        self.launch = launch;
        self.jump_v = DVec2::new(
            launch.vx * self.direction as f64,
            self.rng.uniform(launch.vy.0, launch.vy.1),
        );
        self.fall_origin_y = self.pos.y;
    }

    fn start_ceiling_walk(&mut self, direction: i32) {
        self.locomotion = Locomotion::WalkCeiling;
        self.direction = direction;
        self.reset_walk_timer();
    }

    // --- per-phase updates ---

    fn do_sit(&mut self) {
        self.timers.sit -= 1;
        if self.timers.sit <= 0 {
            self.transition();
        }
    }

    fn do_walk_ground(&mut self) {
        let b = self.resolver.bounds();
        self.pos.y = b.y_max;
        self.pos.x += self.walk_speed * self.direction as f64;

        let chance = if self.peer_overlapping {
            self.config.stumble_chance_close
        } else {
            self.config.stumble_chance
        };
        if self.rng.chance(chance) {
            self.pending = Some(SpecialAnimation::Stumble);
            self.start_sit();
            return;
        }

        if self.pos.x <= b.x_min {
            self.pos.x = b.x_min;
            self.direction = 1;
            self.transition();
        } else if self.pos.x >= b.x_max {
            self.pos.x = b.x_max;
            self.direction = -1;
            self.transition();
        } else {
            self.timers.walk -= 1;
            if self.timers.walk <= 0 {
                self.transition();
            }
        }
    }

    fn do_walk_ceiling(&mut self) {
        let b = self.resolver.bounds();
        self.pos.y = b.y_min;
        self.pos.x += self.walk_speed * self.direction as f64;

        if self.pos.x <= b.x_min {
            self.pos.x = b.x_min;
            self.direction = 1;
        } else if self.pos.x >= b.x_max {
            self.pos.x = b.x_max;
            self.direction = -1;
        }

        if self.rng.chance(self.config.ceiling_fall_chance) {
            self.start_fall();
            return;
        }

        self.timers.walk -= 1;
        if self.timers.walk <= 0 {
            self.start_fall();
        }
    }

    /// `side` is -1 for the left wall, +1 for the right.
    fn do_climb(&mut self, side: i32) {
        let b = self.resolver.bounds();
        self.pos.x = if side < 0 { b.x_min } else { b.x_max };
        self.pos.y -= self.config.climb_speed;

        if self.pos.y <= b.y_min {
            self.pos.y = b.y_min;
            // Over the top, walking away from the wall.
            self.start_ceiling_walk(-side);
        } else if self.rng.chance(self.config.climb_release_chance) {
            self.start_fall();
        }
    }

    fn do_fall(&mut self) {
        let b = self.resolver.bounds();
        self.fall_speed = (self.fall_speed + self.config.fall_accel).min(self.config.fall_speed_max);
        self.pos.y += self.fall_speed;
        if self.pos.y >= b.y_max {
            self.pos.y = b.y_max;
            self.fall_speed = 0.0;
            self.land();
        }
    }

    fn do_land(&mut self) {
        self.timers.land -= 1;
        if self.timers.land <= 0 {
            self.locomotion = Locomotion::Sit;
            let (lo, hi) = self.config.recover_sit_ticks;
            self.timers.sit = self.rng.randint(lo, hi);
        }
    }

    fn do_launch(&mut self) {
        self.jump_v.y += self.config.jump_gravity;
        self.pos += self.jump_v;
        self.fall_origin_y = self.fall_origin_y.min(self.pos.y);

        let Some(contact) = self.contact() else {
            return;
        };
        if contact == Contact::Ground
            && self.launch.clean_landing_chance > 0.0
            && self.rng.chance(self.launch.clean_landing_chance)
        {
            self.locomotion = Locomotion::SoftLand;
            self.timers.land = self.launch.clean_landing_ticks;
            return;
        }
        self.stick(contact, self.jump_v.x);
    }

    fn do_throw(&mut self) {
        self.throw_v.y += self.config.throw_gravity;
        self.throw_v.x *= self.config.throw_friction;
        self.pos += self.throw_v;
        self.fall_origin_y = self.fall_origin_y.min(self.pos.y);

        if let Some(contact) = self.contact() {
            self.stick(contact, self.throw_v.x);
            return;
        }

        if self.throw_v.x.abs() < self.config.throw_min_vx {
            self.locomotion = Locomotion::Fall;
            self.fall_speed = self.throw_v.y.max(self.config.fall_speed_init);
        }
    }

    /// Which bound an airborne pet touched, checked ground, left, right, ceiling.
    fn contact(&self) -> Option<Contact> {
        let b = self.resolver.bounds();
        if self.pos.y >= b.y_max {
            Some(Contact::Ground)
        } else if self.pos.x <= b.x_min {
            Some(Contact::Left)
        } else if self.pos.x >= b.x_max {
            Some(Contact::Right)
        } else if self.pos.y <= b.y_min {
            Some(Contact::Ceiling)
        } else {
            None
        }
    }

    /// Land, grab the wall, or stick to the ceiling.
    fn stick(&mut self, contact: Contact, vx: f64) {
        let b = self.resolver.bounds();
        match contact {
            Contact::Ground => {
                self.pos.y = b.y_max;
                self.land();
            }
            Contact::Left => {
                self.pos.x = b.x_min;
                self.locomotion = Locomotion::ClimbLeft;
            }
            Contact::Right => {
                self.pos.x = b.x_max;
                self.locomotion = Locomotion::ClimbRight;
            }
            Contact::Ceiling => {
                self.pos.y = b.y_min;
                self.start_ceiling_walk(if vx > 0.0 { 1 } else { -1 });
            }
        }
    }

    /// Hard landing when the drop from the highest point exceeds the
    /// configured fraction of the vertical extent. Exactly at the threshold
    /// is still soft.
    fn land(&mut self) {
        let b = self.resolver.bounds();
        let drop = b.y_max - self.fall_origin_y;
        if drop > b.vertical_extent() * self.config.hard_landing_fraction {
            self.locomotion = Locomotion::HardLand;
            self.timers.land = self.config.hard_land_ticks;
        } else {
            self.locomotion = Locomotion::SoftLand;
            self.timers.land = self.config.soft_land_ticks;
        }
        log::trace!("Landed {:?} after a {drop:.0}px drop", self.locomotion);
    }
}
