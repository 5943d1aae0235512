//! Headless host: drives one pet at a fixed 60 Hz and stands in for the
//! windowing layer's animator so the engine and the peer protocol can run
//! without a display.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use glam::DVec2;
use instant::Instant;

use petwander::clock::{Clock, SystemClock};
use petwander::social::fight::defender_throw;
use petwander::social::{Directive, FightRole, LocalView};
use petwander::{
    AnimationCategory, BoundsResolver, Coordinator, FsStore, PositionPublisher, Profile, Region,
    SocialConfig, WanderConfig, WanderEngine,
};

/// Target simulation tick rate (seconds per tick).
const TICK_RATE: f64 = 1.0 / 60.0;
/// Max accumulated time before we clamp (prevents spiral of death).
const MAX_ACCUMULATOR: f64 = 0.25;
/// How often to log loop stats (seconds).
const STATS_LOG_INTERVAL: f64 = 5.0;
/// Distance kept from every region edge.
const MARGIN: f64 = 2.0;
/// Ticks a one-shot animation plays for.
const SIGNAL_TICKS: u32 = 90;
const ATTACK_TICKS: u32 = 60;
const CELEBRATE_TICKS: u32 = 60;
/// Defender looks at the attacker this long before being shoved.
const DEFEND_WINDUP_TICKS: u32 = 15;
/// Defender clears the fight after this long in the air.
const DEFEND_RECOVER_TICKS: u32 = 120;
const DEFEND_HOP_VY: f64 = -2.5;
/// Throw clears this multiple of the fight range.
const DEFEND_CLEARANCE: f64 = 1.3;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

struct Options {
    id: String,
    profile: Profile,
    size: u32,
    dir: Option<PathBuf>,
    regions: Vec<Region>,
    seconds: Option<f64>,
    seed: Option<u64>,
}

fn print_usage() {
    println!("petwander <id> [options]");
    println!("options:");
    println!("  --active              restless profile (default: calm)");
    println!("  --size <px>           pet size (default: 128)");
    println!("  --dir <path>          shared record directory (default: system temp)");
    println!("  --regions <list>      WxH+X+Y[,WxH+X+Y...] (default: 1920x1080+0+0)");
    println!("  --seconds <n>         stop after n seconds");
    println!("  --seed <n>            fixed random seed");
}

fn parse_args(args: &[String]) -> Result<Options, String> {
    let mut it = args.iter();
    let id = it.next().ok_or("missing id")?.clone();
    if id.is_empty() || id.starts_with('-') || id.contains([',', '/']) {
        return Err(format!("invalid id: {id}"));
    }

    let mut opts = Options {
        id,
        profile: Profile::Calm,
        size: 128,
        dir: None,
        regions: vec![Region::new(0.0, 0.0, 1920.0, 1080.0)],
        seconds: None,
        seed: None,
    };

    while let Some(flag) = it.next() {
        let mut value = |name: &str| it.next().cloned().ok_or(format!("missing value for {name}"));
        match flag.as_str() {
            "--active" => opts.profile = Profile::Active,
            "--size" => opts.size = parse_num(&value("--size")?, "size")?,
            "--dir" => opts.dir = Some(PathBuf::from(value("--dir")?)),
            "--regions" => opts.regions = parse_regions(&value("--regions")?)?,
            "--seconds" => opts.seconds = Some(parse_num(&value("--seconds")?, "seconds")?),
            "--seed" => opts.seed = Some(parse_num(&value("--seed")?, "seed")?),
            other => return Err(format!("unknown option: {other}")),
        }
    }

    let too_small = opts
        .regions
        .iter()
        .any(|r| r.width <= opts.size as f64 + 2.0 * MARGIN || r.height <= opts.size as f64 + 2.0 * MARGIN);
    if too_small {
        return Err(format!("every region must be larger than a {}px pet", opts.size));
    }
    Ok(opts)
}

fn parse_num<T: std::str::FromStr>(raw: &str, label: &str) -> Result<T, String> {
    raw.parse::<T>().map_err(|_| format!("invalid {label}: {raw}"))
}

/// `1920x1080+0+0,1280x1024+1920+0`
fn parse_regions(raw: &str) -> Result<Vec<Region>, String> {
    raw.split(',')
        .map(|spec| {
            let bad = || format!("invalid region: {spec}");
            let (size, origin) = spec.split_once('+').ok_or_else(bad)?;
            let (w, h) = size.split_once('x').ok_or_else(bad)?;
            let (x, y) = origin.split_once('+').ok_or_else(bad)?;
            Ok(Region::new(
                parse_num(x, "region x")?,
                parse_num(y, "region y")?,
                parse_num(w, "region width")?,
                parse_num(h, "region height")?,
            ))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Animator stand-in
// ---------------------------------------------------------------------------

/// Plays one animation at a time for a fixed number of ticks, then idles.
struct HostAnimation {
    current: AnimationCategory,
    ticks_left: u32,
}

impl HostAnimation {
    fn new() -> Self {
        Self {
            current: AnimationCategory::Idle,
            ticks_left: 0,
        }
    }

    fn play(&mut self, anim: AnimationCategory, ticks: u32) {
        log::debug!("Animation: {} -> {}", self.current.name(), anim.name());
        self.current = anim;
        self.ticks_left = ticks;
    }

    /// Advance one tick. Returns the animation that just finished.
    fn tick(&mut self) -> Option<AnimationCategory> {
        if self.current == AnimationCategory::Idle {
            return None;
        }
        self.ticks_left = self.ticks_left.saturating_sub(1);
        if self.ticks_left > 0 {
            return None;
        }
        let finished = self.current;
        self.current = AnimationCategory::Idle;
        Some(finished)
    }
}

/// Defender side of a fight, counted in ticks.
enum DefendScript {
    Idle,
    Windup { ticks: u32, vx: f64, vy: f64 },
    Airborne { ticks: u32 },
}

// ---------------------------------------------------------------------------
// Loop stats
// ---------------------------------------------------------------------------

struct LoopStats {
    tick_count: u64,
    ticks_since_log: u32,
    last_log_time: Instant,
}

impl LoopStats {
    fn new() -> Self {
        Self {
            tick_count: 0,
            ticks_since_log: 0,
            last_log_time: Instant::now(),
        }
    }

    fn record_tick(&mut self, pet: &Pet) {
        self.tick_count += 1;
        self.ticks_since_log += 1;

        let elapsed = self.last_log_time.elapsed().as_secs_f64();
        if elapsed >= STATS_LOG_INTERVAL {
            let pos = pet.engine.position();
            log::info!(
                "TPS: {:.0} | {:?} at ({:.0}, {:.0}) region {} | peers: {} | total ticks: {}",
                self.ticks_since_log as f64 / elapsed,
                pet.engine.locomotion(),
                pos.x,
                pos.y,
                pet.engine.active_region(),
                pet.coordinator.directory().peers().len(),
                self.tick_count,
            );
            self.last_log_time = Instant::now();
            self.ticks_since_log = 0;
        }
    }
}

// ---------------------------------------------------------------------------
// Pet
// ---------------------------------------------------------------------------

struct Pet {
    engine: WanderEngine,
    coordinator: Coordinator<FsStore>,
    publisher: PositionPublisher<FsStore>,
    social: SocialConfig,
    anim: HostAnimation,
    defend: DefendScript,
    directive: Directive,
}

impl Pet {
    fn new(opts: &Options) -> Self {
        let rng = || opts.seed.map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);
        let social = SocialConfig::new(opts.size, opts.size);
        let store = opts.dir.clone().map_or_else(FsStore::default, FsStore::new);
        let resolver = BoundsResolver::new(
            opts.regions.clone(),
            DVec2::new(opts.size as f64, opts.size as f64),
            MARGIN,
        );

        let engine = WanderEngine::new(WanderConfig::for_profile(opts.profile), resolver, rng());
        let b = engine.bounds();
        log::info!(
            "Pet {} ({} profile) on {} region(s), bounds x=[{:.0}, {:.0}] y=[{:.0}, {:.0}], records in {}",
            opts.id,
            opts.profile.label(),
            opts.regions.len(),
            b.x_min,
            b.x_max,
            b.y_min,
            b.y_max,
            store.dir().display(),
        );

        Self {
            engine,
            coordinator: Coordinator::new(store.clone(), social.clone(), opts.id.clone(), rng()),
            publisher: PositionPublisher::new(store, social.clone(), opts.id.clone()),
            social,
            anim: HostAnimation::new(),
            defend: DefendScript::Idle,
            directive: Directive::default(),
        }
    }

    fn view(&self) -> LocalView {
        let pos = self.engine.position();
        LocalView {
            x: pos.x,
            y: pos.y,
            facing: self.engine.direction(),
            state: self.anim.current,
            locomotion: self.engine.locomotion(),
            region: self.engine.active_region(),
        }
    }

    /// One fixed simulation tick.
    fn tick(&mut self, now: f64) {
        if let Some(finished) = self.anim.tick() {
            if finished == AnimationCategory::Attack {
                self.anim.play(AnimationCategory::Celebrating, CELEBRATE_TICKS);
                self.coordinator.clear_fight();
            }
        }
        self.run_defend_script();

        let view = self.view();
        self.publisher
            .publish(now, &view, self.coordinator.proposed_target());

        let outcome = self.engine.step(self.anim.current);

        self.directive = Directive::default();
        if self.anim.current == AnimationCategory::Idle {
            self.directive = self.coordinator.tick(&self.view(), now);
            if self.directive.fight_begins {
                self.begin_fight();
            }
        }

        if let Some(signal) = outcome.signal {
            if self.anim.current == AnimationCategory::Idle {
                self.anim.play(signal.category(), SIGNAL_TICKS);
            }
        }

        self.engine
            .apply_directive(&self.directive, self.social.overlap_range());
        log::trace!(
            "{:?} at {:?} facing {}",
            outcome.locomotion,
            outcome.pixel(),
            self.engine.visual_facing(self.directive.face_toward),
        );
    }

    fn begin_fight(&mut self) {
        let peer_x = self.directive.fight_peer_x;
        match self.directive.fight_role {
            Some(FightRole::Attacker) => {
                self.engine.face_toward(peer_x);
                self.anim.play(AnimationCategory::Attack, ATTACK_TICKS);
            }
            Some(FightRole::Defender) => {
                let (facing, vx, vy) = defender_throw(
                    self.engine.position().x,
                    peer_x,
                    self.social.fight_range() * DEFEND_CLEARANCE,
                    DEFEND_HOP_VY,
                    self.engine.config().throw_gravity,
                );
                self.engine.set_direction(facing);
                self.defend = DefendScript::Windup {
                    ticks: DEFEND_WINDUP_TICKS,
                    vx,
                    vy,
                };
            }
            None => {}
        }
    }

    fn run_defend_script(&mut self) {
        self.defend = match std::mem::replace(&mut self.defend, DefendScript::Idle) {
            DefendScript::Windup { ticks: 0, vx, vy } => {
                self.engine.start_throw(vx, vy);
                DefendScript::Airborne {
                    ticks: DEFEND_RECOVER_TICKS,
                }
            }
            DefendScript::Windup { ticks, vx, vy } => DefendScript::Windup {
                ticks: ticks - 1,
                vx,
                vy,
            },
            DefendScript::Airborne { ticks: 0 } => {
                self.coordinator.clear_fight();
                DefendScript::Idle
            }
            DefendScript::Airborne { ticks } => DefendScript::Airborne { ticks: ticks - 1 },
            DefendScript::Idle => DefendScript::Idle,
        };
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Parse arguments and run the fixed-timestep loop until `--seconds` elapse.
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        print_usage();
        return Ok(());
    }
    let opts = parse_args(&args).map_err(|e| {
        print_usage();
        e
    })?;

    let clock = SystemClock;
    let mut pet = Pet::new(&opts);
    let mut stats = LoopStats::new();

    let started = Instant::now();
    let mut last_frame = Instant::now();
    let mut accumulator = 0.0;

    loop {
        let frame_start = Instant::now();
        accumulator += frame_start.duration_since(last_frame).as_secs_f64();
        last_frame = frame_start;
        if accumulator > MAX_ACCUMULATOR {
            accumulator = MAX_ACCUMULATOR;
        }

        while accumulator >= TICK_RATE {
            pet.tick(clock.now());
            stats.record_tick(&pet);
            accumulator -= TICK_RATE;
        }

        if opts
            .seconds
            .is_some_and(|limit| started.elapsed().as_secs_f64() >= limit)
        {
            break;
        }
        std::thread::sleep(Duration::from_secs_f64(TICK_RATE - accumulator));
    }

    pet.publisher.shutdown();
    log::info!("Stopped after {} ticks", stats.tick_count);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_flags() {
        let opts = parse_args(&args(&[
            "abc",
            "--active",
            "--size",
            "96",
            "--regions",
            "1920x1080+0+0,1280x1024+1920+0",
            "--seconds",
            "2.5",
            "--seed",
            "7",
        ]))
        .unwrap();
        assert_eq!(opts.id, "abc");
        assert_eq!(opts.profile, Profile::Active);
        assert_eq!(opts.size, 96);
        assert_eq!(opts.regions[1], Region::new(1920.0, 0.0, 1280.0, 1024.0));
        assert_eq!(opts.seconds, Some(2.5));
        assert_eq!(opts.seed, Some(7));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse_args(&[]).is_err());
        assert!(parse_args(&args(&["a,b"])).is_err());
        assert!(parse_args(&args(&["a", "--size"])).is_err());
        assert!(parse_args(&args(&["a", "--regions", "100x100+0+0"])).is_err());
        assert!(parse_args(&args(&["a", "--regions", "1920+0+0"])).is_err());
        assert!(parse_args(&args(&["a", "--bogus"])).is_err());
    }

    #[test]
    fn animation_finishes_back_to_idle() {
        let mut anim = HostAnimation::new();
        assert_eq!(anim.tick(), None);
        anim.play(AnimationCategory::Stumble, 2);
        assert_eq!(anim.tick(), None);
        assert_eq!(anim.tick(), Some(AnimationCategory::Stumble));
        assert_eq!(anim.current, AnimationCategory::Idle);
    }
}
