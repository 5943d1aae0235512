use crate::wander::Behavior;

/// Behavior profile: how restless the pet is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Mostly sitting, occasional short walks.
    Calm,
    /// Moves constantly. Handy when testing.
    Active,
}

impl Profile {
    pub fn label(self) -> &'static str {
        match self {
            Profile::Calm => "calm",
            Profile::Active => "active",
        }
    }
}

/// Initial vertical speed range and horizontal push for a projectile launch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Launch {
    pub vy: (f64, f64),
    pub vx: f64,
    /// Chance the landing is stuck cleanly regardless of drop height.
    pub clean_landing_chance: f64,
    /// Hold time for a clean landing (ticks). Ignored when the chance is 0.
    pub clean_landing_ticks: i32,
}

/// Movement tuning. All speeds are px per tick at the nominal 60 Hz rate;
/// all durations are in ticks.
#[derive(Debug, Clone, PartialEq)]
pub struct WanderConfig {
    pub profile: Profile,

    pub walk_speed: (f64, f64),
    pub climb_speed: f64,
    pub fall_speed_init: f64,
    pub fall_accel: f64,
    pub fall_speed_max: f64,
    pub throw_gravity: f64,
    pub throw_friction: f64,
    /// Below this horizontal speed a throw degrades into a plain fall.
    pub throw_min_vx: f64,
    pub jump_gravity: f64,
    pub kick: Launch,
    pub jump: Launch,

    /// Relative odds for the next behavior. Order is the scan order.
    pub weights: Vec<(Behavior, u32)>,
    pub sit_ticks: (i32, i32),
    pub walk_ticks: (i32, i32),
    pub initial_sit_ticks: (i32, i32),
    /// Sit after a landing recovers.
    pub recover_sit_ticks: (i32, i32),
    pub soft_land_ticks: i32,
    pub hard_land_ticks: i32,
    /// Falls longer than this fraction of the vertical extent land hard.
    pub hard_landing_fraction: f64,

    /// Climbing is only picked within this distance of a side bound.
    pub climb_edge_distance: f64,
    pub climb_release_chance: f64,
    pub ceiling_fall_chance: f64,
    pub stumble_chance: f64,
    pub stumble_chance_close: f64,

    /// Drops within this distance of the floor snap onto it.
    pub floor_snap: f64,
    /// Release speed above which a drop becomes a throw.
    pub throw_release_speed: f64,
}

impl WanderConfig {
    pub fn for_profile(profile: Profile) -> Self {
        let (weights, sit_ticks, walk_ticks) = match profile {
            Profile::Calm => (
                vec![
                    (Behavior::Sit, 200),
                    (Behavior::Walk, 50),
                    (Behavior::Climb, 10),
                    (Behavior::Kick, 6),
                    (Behavior::Jump, 2),
                    (Behavior::Duplicate, 2),
                    (Behavior::Error, 2),
                ],
                (600, 2400),
                (120, 360),
            ),
            Profile::Active => (
                vec![
                    (Behavior::Sit, 50),
                    (Behavior::Walk, 150),
                    (Behavior::Climb, 40),
                    (Behavior::Kick, 18),
                    (Behavior::Jump, 7),
                    (Behavior::Duplicate, 5),
                    (Behavior::Error, 5),
                ],
                (180, 480),
                (240, 900),
            ),
        };

        Self {
            profile,
            walk_speed: (0.6, 1.4),
            climb_speed: 0.8,
            fall_speed_init: 1.5,
            fall_accel: 0.35,
            fall_speed_max: 8.0,
            throw_gravity: 0.30,
            throw_friction: 0.994,
            throw_min_vx: 0.06,
            jump_gravity: 0.12,
            kick: Launch {
                vy: (-3.5, -5.0),
                vx: 1.5,
                clean_landing_chance: 0.0,
                clean_landing_ticks: 0,
            },
            jump: Launch {
                vy: (-8.0, -11.0),
                vx: 7.0,
                clean_landing_chance: 0.5,
                clean_landing_ticks: 40,
            },
            weights,
            sit_ticks,
            walk_ticks,
            initial_sit_ticks: (300, 900),
            recover_sit_ticks: (60, 120),
            soft_land_ticks: 30,
            hard_land_ticks: 66,
            hard_landing_fraction: 0.4,
            climb_edge_distance: 20.0,
            climb_release_chance: 0.0006,
            ceiling_fall_chance: 0.0008,
            stumble_chance: 0.0003,
            stumble_chance_close: 0.003,
            floor_snap: 5.0,
            throw_release_speed: 0.3,
        }
    }
}

impl Default for WanderConfig {
    fn default() -> Self {
        Self::for_profile(Profile::Calm)
    }
}

/// Peer protocol tuning. Proximity values are multiples of the pet width.
#[derive(Debug, Clone, PartialEq)]
pub struct SocialConfig {
    /// Record keys are `{prefix}{id}{suffix}`.
    pub key_prefix: String,
    pub key_suffix: String,
    pub pet_width: u32,
    pub pet_height: u32,
    /// Publish once every this many calls.
    pub publish_stride: u32,
    /// Minimum seconds between directory scans.
    pub read_interval: f64,
    /// Records older than this (seconds) are ignored.
    pub stale_threshold: f64,
    /// Fight proposals per second while eligible.
    pub fight_chance: f64,
    pub fight_cooldown: f64,
    pub proposal_ttl: f64,
    pub proximity_sit: f64,
    pub proximity_face: f64,
    pub proximity_fight: f64,
    /// Closer than this counts as overlapping (boosts stumbling).
    pub proximity_overlap: f64,
}

impl SocialConfig {
    pub fn new(pet_width: u32, pet_height: u32) -> Self {
        Self {
            pet_width,
            pet_height,
            ..Self::default()
        }
    }

    pub fn sit_range(&self) -> f64 {
        self.proximity_sit * self.pet_width as f64
    }

    pub fn face_range(&self) -> f64 {
        self.proximity_face * self.pet_width as f64
    }

    pub fn fight_range(&self) -> f64 {
        self.proximity_fight * self.pet_width as f64
    }

    pub fn overlap_range(&self) -> f64 {
        self.proximity_overlap * self.pet_width as f64
    }

    pub fn record_key(&self, id: &str) -> String {
        format!("{}{}{}", self.key_prefix, id, self.key_suffix)
    }

    /// Inverse of [`record_key`](Self::record_key). `None` for foreign keys.
    pub fn id_from_key<'a>(&self, key: &'a str) -> Option<&'a str> {
        let id = key
            .strip_prefix(self.key_prefix.as_str())?
            .strip_suffix(self.key_suffix.as_str())?;
        (!id.is_empty()).then_some(id)
    }
}

impl Default for SocialConfig {
    fn default() -> Self {
        Self {
            key_prefix: "petwander-".to_string(),
            key_suffix: "-pos".to_string(),
            pet_width: 128,
            pet_height: 128,
            publish_stride: 10,
            read_interval: 0.3,
            stale_threshold: 3.0,
            fight_chance: 0.03,
            fight_cooldown: 10.0,
            proposal_ttl: 3.0,
            proximity_sit: 1.5,
            proximity_face: 3.0,
            proximity_fight: 1.0,
            proximity_overlap: 0.5,
        }
    }
}
