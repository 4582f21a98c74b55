use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use handspell_core::spells::{default_custom_dir, load_spellbook};
use handspell_core::{
    BehaviorRegistry, CasterId, CasterRole, GestureProducer, HandspellConfig, MatchReport,
    MatchSession, MatchState, SpellBook,
};

use crate::animator::{DEFAULT_RELEASE_SPACING, PresentationLog, ReleaseSchedule, SimulatedAnimator};
use crate::script::{ScriptLine, ScriptPlayer, load_script};

/// Fixed consumer tick rate.
const TICK: Duration = Duration::from_nanos(1_000_000_000 / 60);

/// Frame rate of the simulated recognizer in realtime mode.
const RECOGNIZER_FRAME: Duration = Duration::from_millis(33);

const APP_NAME: &str = "handspell";

// ─────────────────────────────────────────────────────────────────────────────
// Loading
// ─────────────────────────────────────────────────────────────────────────────

/// Load the configuration from `path`, or from the user's confy store.
pub fn load_config(path: Option<&Path>) -> Result<HandspellConfig, String> {
    match path {
        Some(path) => confy::load_path(path)
            .map_err(|e| format!("Cannot load config {}: {e}", path.display())),
        None => Ok(confy::load(APP_NAME, None).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "cannot load stored config, using defaults");
            HandspellConfig::default()
        })),
    }
}

/// Embedded spellbook plus custom overrides from `custom_dir`, or from the
/// default custom directory when none is given.
pub fn load_book(custom_dir: Option<&Path>) -> Result<Arc<SpellBook>, String> {
    let default_dir = default_custom_dir();
    let custom_dir = custom_dir.or(default_dir.as_deref());
    load_spellbook(None, custom_dir, &BehaviorRegistry::with_builtins())
        .map(Arc::new)
        .map_err(|e| e.to_string())
}

// ─────────────────────────────────────────────────────────────────────────────
// simulate
// ─────────────────────────────────────────────────────────────────────────────

/// A session with a scripted local player, an opponent and the simulated
/// presentation layer attached.
struct Simulation {
    session: MatchSession,
    player: CasterId,
    producer: GestureProducer,
    releases: ReleaseSchedule,
}

impl Simulation {
    fn new(config: HandspellConfig, book: Arc<SpellBook>) -> Result<Self, String> {
        let mut session = MatchSession::new(config, Arc::clone(&book));
        let releases = ReleaseSchedule::new();
        session.add_signal_handler(Box::new(SimulatedAnimator::new(
            book,
            releases.clone(),
            DEFAULT_RELEASE_SPACING,
        )));

        // Handlers must be in place before the second caster starts the countdown.
        let player_name = "Player";
        let opponent_name = "Opponent";
        session.add_signal_handler(Box::new(PresentationLog::new([
            (CasterId(0), player_name.to_string()),
            (CasterId(1), opponent_name.to_string()),
        ])));

        let player = session
            .register_caster(player_name, CasterRole::Local, Duration::ZERO)
            .ok_or("cannot register the local caster")?;
        session
            .register_caster(opponent_name, CasterRole::Opponent, Duration::ZERO)
            .ok_or("cannot register the opponent")?;
        let producer = session.gesture_producer(player);

        Ok(Self {
            session,
            player,
            producer,
            releases,
        })
    }

    fn step(&mut self, now: Duration) {
        self.session.tick(now);
        for caster in self.releases.due(now) {
            self.session.on_release_keyframe(caster, now);
        }
    }

    fn finished(&self) -> bool {
        self.session.state() == MatchState::Results
    }
}

/// Run a whole match as fast as possible with a fixed tick.
///
/// The script is fed through the same producer handle a recognition thread
/// would use, once per tick before the session drains its queue.
pub fn simulate(
    lines: Vec<ScriptLine>,
    config: HandspellConfig,
    book: Arc<SpellBook>,
    max: Duration,
) -> Result<MatchReport, String> {
    let mut sim = Simulation::new(config, book)?;
    let mut script = ScriptPlayer::new(lines);
    warn_if_truncated(&script, max);
    let mut now = Duration::ZERO;

    while !sim.finished() && now < max {
        now += TICK;
        if let Some((left, right)) = script.advance(now) {
            sim.producer.on_gesture_recognized(left, right);
        }
        sim.step(now);
    }

    if !sim.finished() {
        tracing::warn!(limit = ?max, state = ?sim.session.state(), "time limit reached");
    }
    tracing::debug!(player = %sim.player, "simulation finished");
    Ok(sim.session.report())
}

/// Run a match against the wall clock with the script replayed from its own
/// thread.
pub async fn simulate_realtime(
    lines: Vec<ScriptLine>,
    config: HandspellConfig,
    book: Arc<SpellBook>,
    max: Duration,
) -> Result<MatchReport, String> {
    let mut sim = Simulation::new(config, book)?;
    let mut script = ScriptPlayer::new(lines);
    warn_if_truncated(&script, max);
    let start = Instant::now();
    let stop = Arc::new(AtomicBool::new(false));

    let recognizer = {
        let producer = sim.producer.clone();
        let stop = Arc::clone(&stop);
        std::thread::Builder::new()
            .name("recognizer".to_string())
            .spawn(move || {
                while !stop.load(Ordering::Relaxed) {
                    if let Some((left, right)) = script.advance(start.elapsed()) {
                        producer.on_gesture_recognized(left, right);
                    }
                    std::thread::sleep(RECOGNIZER_FRAME);
                }
            })
            .map_err(|e| format!("Cannot start recognizer thread: {e}"))?
    };

    let mut interval = tokio::time::interval(TICK);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        interval.tick().await;
        let now = start.elapsed();
        sim.step(now);
        if sim.finished() || now >= max {
            break;
        }
    }

    stop.store(true, Ordering::Relaxed);
    // The recognizer may be mid-sleep; wait for it off the runtime threads.
    match tokio::task::spawn_blocking(move || recognizer.join()).await {
        Ok(Ok(())) => {}
        Ok(Err(_)) => tracing::error!("recognizer thread panicked"),
        Err(e) => tracing::error!(error = %e, "cannot join recognizer thread"),
    }
    if !sim.finished() {
        tracing::warn!(limit = ?max, state = ?sim.session.state(), "time limit reached");
    }
    Ok(sim.session.report())
}

fn warn_if_truncated(script: &ScriptPlayer, max: Duration) {
    if script.end() > max {
        tracing::warn!(end = ?script.end(), limit = ?max, "script runs past the time limit");
    }
}

pub async fn run_simulation(
    script_path: &Path,
    config_path: Option<&Path>,
    spellbook_dir: Option<&Path>,
    realtime: bool,
    max_secs: f32,
) -> Result<(), String> {
    let config = load_config(config_path)?;
    let book = load_book(spellbook_dir)?;
    let lines = load_script(script_path)?;
    let max = match Duration::try_from_secs_f32(max_secs) {
        Ok(max) if !max.is_zero() => max,
        _ => return Err(format!("--max-secs must be a positive number of seconds, got {max_secs}")),
    };

    tracing::info!(script = %script_path.display(), lines = lines.len(), realtime, "starting match");
    let report = if realtime {
        simulate_realtime(lines, config, book, max).await?
    } else {
        simulate(lines, config, book, max)?
    };

    let summary = serde_json::json!({
        "generated_at": chrono::Local::now().to_rfc3339(),
        "script": script_path.display().to_string(),
        "report": report,
    });
    let text = serde_json::to_string_pretty(&summary).map_err(|e| e.to_string())?;
    writeln!(std::io::stdout(), "{text}").map_err(|e| e.to_string())
}

// ─────────────────────────────────────────────────────────────────────────────
// spells / config
// ─────────────────────────────────────────────────────────────────────────────

pub fn list_spells(spellbook_dir: Option<&Path>) -> Result<(), String> {
    let book = load_book(spellbook_dir)?;
    let mut out = std::io::stdout().lock();

    for entry in book.entries() {
        let spell = &entry.spell;
        let behavior = spell.behavior.as_ref().map_or("<none>", |b| b.name());
        let sequence: Vec<String> = entry.sequence.iter().map(|pair| pair.to_string()).collect();
        writeln!(
            out,
            "{:<12} mana {:>5.1}  damage {:>5.1}  x{}  {:<10} {:<20} {}",
            spell.name,
            spell.mana_cost,
            spell.damage,
            spell.release_count,
            behavior,
            spell.trigger_name(),
            sequence.join(" -> "),
        )
        .map_err(|e| e.to_string())?;
    }
    Ok(())
}

pub fn show_config(config_path: Option<&Path>) -> Result<(), String> {
    let config = load_config(config_path)?;
    let text = toml::to_string_pretty(&config).map_err(|e| e.to_string())?;
    write!(std::io::stdout(), "{text}").map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::parse_script;
    use handspell_core::spells::builtin_spellbook;

    fn book() -> Arc<SpellBook> {
        let config = builtin_spellbook().unwrap();
        let mut book = SpellBook::new();
        book.add_definitions(&config.spells, &BehaviorRegistry::with_builtins(), false);
        Arc::new(book)
    }

    fn duel_config() -> HandspellConfig {
        let mut config = HandspellConfig::default();
        config.opponent.enabled = false;
        config.caster.max_health = 30.0;
        config
    }

    /// Three Fireballs, one every 1.2s once the match has started.
    fn fireball_script() -> Vec<ScriptLine> {
        let mut text = String::new();
        for i in 0..3 {
            let t = 4.0 + i as f32 * 1.2;
            text.push_str(&format!("{t:.1} Open_Palm Open_Palm\n"));
            text.push_str(&format!("{:.1} Closed_Fist Closed_Fist\n", t + 0.3));
            text.push_str(&format!("{:.1} None None\n", t + 0.6));
        }
        parse_script(&text).unwrap()
    }

    #[test]
    fn scripted_fireballs_win_the_match() {
        let report = simulate(
            fireball_script(),
            duel_config(),
            book(),
            Duration::from_secs(30),
        )
        .unwrap();

        assert_eq!(report.state, MatchState::Results);
        assert_eq!(report.winner_name.as_deref(), Some("Player"));
        let player = &report.casters[0];
        assert_eq!(player.stats.casts, 3);
        assert_eq!(player.stats.releases, 3);
        assert_eq!(player.stats.damage_dealt, 30.0);
        let opponent = &report.casters[1];
        assert!(opponent.dead);
        assert_eq!(opponent.health, 0.0);
    }

    #[test]
    fn time_limit_stops_an_undecided_match() {
        let report = simulate(Vec::new(), duel_config(), book(), Duration::from_secs(5)).unwrap();
        assert_eq!(report.state, MatchState::Fighting);
        assert_eq!(report.winner, None);
        assert!(report.elapsed_secs >= 5.0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn realtime_run_stops_at_the_time_limit() {
        let max = Duration::from_millis(200);
        let report = simulate_realtime(Vec::new(), duel_config(), book(), max)
            .await
            .unwrap();
        assert_eq!(report.state, MatchState::PreRound);
        assert_eq!(report.winner, None);
        assert!(report.elapsed_secs >= 0.2);
    }
}
