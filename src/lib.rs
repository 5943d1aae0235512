//! Core of a Shimeji-style desktop pet: the movement simulation that walks,
//! climbs, falls and gets thrown around a display, and the peer protocol that
//! lets separate pet processes notice each other through shared position
//! records.
//!
//! Rendering, input and process lifecycle live in the host; this crate only
//! consumes regions, a clock, a random source and a shared store.

pub mod bounds;
pub mod clock;
pub mod config;
pub mod error;
pub mod rng;
pub mod social;
pub mod storage;
pub mod wander;

pub use bounds::{Bounds, BoundsResolver, Region};
pub use config::{Profile, SocialConfig, WanderConfig};
pub use social::{Coordinator, Directive, FightRole, PeerDirectory, PeerRecord, PositionPublisher};
pub use storage::{FsStore, MemoryStore, SharedStore};
pub use wander::{AnimationCategory, Locomotion, SpecialAnimation, StepOutcome, WanderEngine};
