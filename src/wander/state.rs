/// Locomotion phase of the movement engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Locomotion {
    Sit,
    WalkGround,
    WalkCeiling,
    ClimbLeft,
    ClimbRight,
    Jump,
    Kick,
    Fall,
    Throw,
    SoftLand,
    HardLand,
}

impl Locomotion {
    pub const ALL: [Locomotion; 11] = [
        Self::Sit,
        Self::WalkGround,
        Self::WalkCeiling,
        Self::ClimbLeft,
        Self::ClimbRight,
        Self::Jump,
        Self::Kick,
        Self::Fall,
        Self::Throw,
        Self::SoftLand,
        Self::HardLand,
    ];

    /// Coarse posture name published to peers.
    pub fn posture(self) -> &'static str {
        match self {
            Self::Sit => "sit",
            Self::WalkGround | Self::WalkCeiling => "walk",
            Self::ClimbLeft | Self::ClimbRight => "climb",
            Self::Fall | Self::Throw => "fall",
            Self::Jump | Self::Kick => "jump",
            Self::SoftLand | Self::HardLand => "land",
        }
    }
}

/// Character animation currently playing, as reported by the host's animator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AnimationCategory {
    #[default]
    Idle,
    Working,
    Thinking,
    Error,
    Attention,
    Celebrating,
    /// Transforming into a duplicate.
    Doubling,
    CloneFrozen,
    Stumble,
    Attack,
}

impl AnimationCategory {
    pub fn name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Working => "working",
            Self::Thinking => "thinking",
            Self::Error => "error",
            Self::Attention => "attention",
            Self::Celebrating => "celebrating",
            Self::Doubling => "doubling",
            Self::CloneFrozen => "clone_frozen",
            Self::Stumble => "stumble",
            Self::Attack => "attack",
        }
    }

    /// Unknown names read as `Idle` (no override).
    pub fn from_name(name: &str) -> Self {
        match name {
            "working" => Self::Working,
            "thinking" => Self::Thinking,
            "error" => Self::Error,
            "attention" => Self::Attention,
            "celebrating" => Self::Celebrating,
            "doubling" => Self::Doubling,
            "clone_frozen" => Self::CloneFrozen,
            "stumble" => Self::Stumble,
            "attack" => Self::Attack,
            _ => Self::Idle,
        }
    }

    /// Whether this animation freezes movement while it plays.
    pub fn overrides_movement(self) -> bool {
        self != Self::Idle
    }
}

/// One-shot request for the host to play a non-physics animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialAnimation {
    Stumble,
    Duplicate,
    Error,
}

impl SpecialAnimation {
    /// The animation the host should switch to.
    pub fn category(self) -> AnimationCategory {
        match self {
            Self::Stumble => AnimationCategory::Stumble,
            Self::Duplicate => AnimationCategory::Doubling,
            Self::Error => AnimationCategory::Error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_names_round_trip() {
        for c in [
            AnimationCategory::Idle,
            AnimationCategory::Working,
            AnimationCategory::Thinking,
            AnimationCategory::Error,
            AnimationCategory::Attention,
            AnimationCategory::Celebrating,
            AnimationCategory::Doubling,
            AnimationCategory::CloneFrozen,
            AnimationCategory::Stumble,
            AnimationCategory::Attack,
        ] {
            assert_eq!(AnimationCategory::from_name(c.name()), c);
        }
        assert_eq!(AnimationCategory::from_name("dancing"), AnimationCategory::Idle);
        assert!(!AnimationCategory::from_name("").overrides_movement());
    }

    #[test]
    fn ceiling_walk_reports_walk() {
        assert_eq!(Locomotion::WalkCeiling.posture(), "walk");
        assert_eq!(Locomotion::Throw.posture(), "fall");
    }
}
