//! One match: two casters, their pipelines, and the lifecycle that gates them.
//!
//! Everything here runs on the single consumer thread. Recognition threads
//! only ever touch the [`GestureIngestQueue`] through a [`GestureProducer`];
//! the host calls [`MatchSession::tick`] once per frame with the elapsed
//! session time and routes animation release keyframes to
//! [`MatchSession::on_release_keyframe`].

use std::sync::Arc;
use std::time::Duration;

use handspell_types::{GesturePair, HandspellConfig};

use crate::caster::{
    CastOutcome, CastQueue, Caster, CasterId, CasterRole, DamageOutcome, ManaRegenerator,
};
use crate::gesture::{GestureStabilizer, HandPresence};
use crate::ingest::{GestureIngestQueue, GestureProducer, RecognizedGesture};
use crate::signal_processor::{
    ClearReason, FizzleReason, GameSignal, HandlerId, MatchState, MatchStateMachine, SignalBus,
    SignalHandler,
};
use crate::spells::{MatchOutcome, SequenceBuffer, Spell, SpellBook, SpellImpact, SpellMatcher};

use super::auto_caster::AutoCaster;
use super::report::{CasterReport, CasterStats, MatchReport};

/// Per-caster pipeline state.
#[derive(Debug)]
struct CasterSlot {
    caster: Caster,
    stabilizer: GestureStabilizer,
    buffer: SequenceBuffer,
    cast_queue: CastQueue,
    regen: ManaRegenerator,
    stats: CasterStats,
}

impl CasterSlot {
    fn new(caster: Caster, config: &HandspellConfig) -> Self {
        Self {
            caster,
            stabilizer: GestureStabilizer::new(&config.stabilizer),
            buffer: SequenceBuffer::new(),
            cast_queue: CastQueue::new(),
            regen: ManaRegenerator::new(&config.mana),
            stats: CasterStats::default(),
        }
    }

    fn mana_signal(&self, at: Duration) -> GameSignal {
        GameSignal::ManaChanged {
            caster: self.caster.id,
            mana: self.caster.mana(),
            max_mana: self.caster.max_mana(),
            at,
        }
    }

    fn health_signal(&self, at: Duration) -> GameSignal {
        GameSignal::HealthChanged {
            caster: self.caster.id,
            health: self.caster.health(),
            max_health: self.caster.max_health(),
            at,
        }
    }
}

pub struct MatchSession {
    config: HandspellConfig,
    spellbook: Arc<SpellBook>,
    matcher: SpellMatcher,
    ingest: GestureIngestQueue,
    slots: Vec<CasterSlot>,
    auto_casters: Vec<AutoCaster>,
    match_state: MatchStateMachine,
    signal_bus: SignalBus,
    now: Duration,
}

impl MatchSession {
    pub fn new(config: HandspellConfig, spellbook: Arc<SpellBook>) -> Self {
        Self {
            matcher: SpellMatcher::new(&config.casting),
            match_state: MatchStateMachine::new(&config.match_flow),
            config,
            spellbook,
            ingest: GestureIngestQueue::new(),
            slots: Vec::new(),
            auto_casters: Vec::new(),
            signal_bus: SignalBus::new(),
            now: Duration::ZERO,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Setup
    // ─────────────────────────────────────────────────────────────────────────

    /// Register a caster for a role. Returns `None` if the role is taken.
    ///
    /// The opponent gets an [`AutoCaster`] when enabled in the configuration.
    /// The countdown starts once both roles are filled.
    pub fn register_caster(
        &mut self,
        name: impl Into<String>,
        role: CasterRole,
        now: Duration,
    ) -> Option<CasterId> {
        if let Some(existing) = self.match_state.caster_for(role) {
            tracing::warn!(%existing, ?role, "role already registered");
            return None;
        }

        let id = CasterId(self.slots.len() as u32);
        let caster = Caster::new(id, name, role, &self.config.caster);
        tracing::info!(%id, name = %caster.name, ?role, "caster joined");
        self.slots.push(CasterSlot::new(caster, &self.config));

        if role == CasterRole::Opponent && self.config.opponent.enabled {
            self.auto_casters.push(AutoCaster::new(id, &self.config.opponent));
        }

        let mut out = Vec::new();
        let signals = self.match_state.register(id, role, now);
        self.absorb_match_signals(signals, now, &mut out);
        self.signal_bus.dispatch(&out);
        Some(id)
    }

    /// Producer handle for a caster's recognition thread.
    pub fn gesture_producer(&self, caster: CasterId) -> GestureProducer {
        self.ingest.producer(caster)
    }

    pub fn add_signal_handler(&mut self, handler: Box<dyn SignalHandler + Send + Sync>) -> HandlerId {
        self.signal_bus.subscribe(handler)
    }

    /// Unsubscribe a handler. Returns false if it was already gone.
    pub fn remove_signal_handler(&mut self, id: HandlerId) -> bool {
        self.signal_bus.unsubscribe(id).is_some()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    pub fn state(&self) -> MatchState {
        self.match_state.state()
    }

    pub fn can_fight(&self) -> bool {
        self.match_state.can_fight()
    }

    pub fn winner(&self) -> Option<CasterId> {
        self.match_state.winner()
    }

    pub fn caster(&self, id: CasterId) -> Option<&Caster> {
        self.slot(id).map(|slot| &slot.caster)
    }

    pub fn caster_for(&self, role: CasterRole) -> Option<CasterId> {
        self.match_state.caster_for(role)
    }

    pub fn sequence(&self, id: CasterId) -> &[GesturePair] {
        self.slot(id).map(|slot| slot.buffer.as_slice()).unwrap_or(&[])
    }

    pub fn queued_casts(&self, id: CasterId) -> usize {
        self.slot(id).map_or(0, |slot| slot.cast_queue.len())
    }

    pub fn spellbook(&self) -> &SpellBook {
        &self.spellbook
    }

    pub fn config(&self) -> &HandspellConfig {
        &self.config
    }

    /// Time of the most recent tick or external call.
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn report(&self) -> MatchReport {
        let winner = self.match_state.winner();
        MatchReport {
            state: self.state(),
            winner,
            winner_name: winner.and_then(|id| self.caster(id)).map(|c| c.name.clone()),
            elapsed_secs: self.now.as_secs_f32(),
            casters: self
                .slots
                .iter()
                .map(|slot| CasterReport::new(&slot.caster, slot.stats))
                .collect(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Per-frame processing
    // ─────────────────────────────────────────────────────────────────────────

    /// Advance the whole match to `now`.
    ///
    /// Drains the ingest queue, runs gestures through the pipeline (only while
    /// fighting; otherwise they are discarded), expires shields, regenerates
    /// mana, lets automatic casters act, and advances the match lifecycle.
    pub fn tick(&mut self, now: Duration) {
        self.now = now;
        let mut out = Vec::new();

        let gestures = self.ingest.drain_all();
        if self.match_state.can_fight() {
            for gesture in gestures {
                self.process_gesture(gesture, now, &mut out);
            }
        } else if !gestures.is_empty() {
            tracing::trace!(count = gestures.len(), "gestures discarded, casting disabled");
        }

        for slot in &mut self.slots {
            if slot.caster.expire_shield(now) {
                out.push(GameSignal::ShieldExpired {
                    caster: slot.caster.id,
                    at: now,
                });
            }
            if slot.regen.tick(now, &mut slot.caster) > 0.0 {
                out.push(slot.mana_signal(now));
            }
        }

        if self.match_state.can_fight() {
            let due: Vec<(CasterId, String)> = self
                .auto_casters
                .iter_mut()
                .filter_map(|ai| {
                    let caster = ai.caster();
                    ai.poll(now).map(|spell| (caster, spell))
                })
                .collect();
            for (caster, spell) in due {
                self.cast_named(caster, &spell, now, &mut out);
            }
        }

        let signals = self.match_state.tick(now);
        self.absorb_match_signals(signals, now, &mut out);

        self.signal_bus.dispatch(&out);
    }

    fn process_gesture(&mut self, gesture: RecognizedGesture, now: Duration, out: &mut Vec<GameSignal>) {
        let id = gesture.caster;
        let Some(slot) = self.slots.get_mut(id.0 as usize) else {
            tracing::warn!(caster = %id, "gesture for an unknown caster");
            return;
        };

        let output = slot.stabilizer.process(gesture.pair, now);
        for (hand, presence) in output.presence {
            out.push(match presence {
                HandPresence::Present => GameSignal::HandPresent { caster: id, hand, at: now },
                HandPresence::Absent => GameSignal::HandAbsent { caster: id, hand, at: now },
            });
        }

        let Some(pair) = output.confirmed else {
            return;
        };
        slot.stats.gestures_confirmed += 1;
        tracing::debug!(caster = %id, %pair, "gesture confirmed");
        out.push(GameSignal::GestureConfirmed { caster: id, pair, at: now });

        match self.matcher.on_confirmed(pair, &mut slot.buffer, &self.spellbook) {
            MatchOutcome::Appended { len } => {
                out.push(GameSignal::SequenceAppended { caster: id, pair, len, at: now });
            }
            MatchOutcome::Matched(spell) => {
                self.start_cast(id, &spell, now, out);
                out.push(GameSignal::SequenceCleared {
                    caster: id,
                    reason: ClearReason::Cast,
                    at: now,
                });
            }
            MatchOutcome::Fizzled { len } => {
                slot.stats.fizzles += 1;
                tracing::info!(caster = %id, len, "submitted sequence matches no spell");
                out.push(GameSignal::Fizzled {
                    caster: id,
                    spell: None,
                    reason: FizzleReason::NoMatch,
                    at: now,
                });
                out.push(GameSignal::SequenceCleared {
                    caster: id,
                    reason: ClearReason::Fizzle,
                    at: now,
                });
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Casting
    // ─────────────────────────────────────────────────────────────────────────

    /// Cast a spellbook spell by name, bypassing gestures. Ignored unless
    /// fighting.
    pub fn cast(&mut self, caster: CasterId, spell: &str, now: Duration) {
        self.now = now;
        if !self.match_state.can_fight() {
            tracing::debug!(%caster, spell, "cast ignored, casting disabled");
            return;
        }
        let mut out = Vec::new();
        self.cast_named(caster, spell, now, &mut out);
        self.signal_bus.dispatch(&out);
    }

    fn cast_named(&mut self, caster: CasterId, name: &str, now: Duration, out: &mut Vec<GameSignal>) {
        let Some(spell) = self.spellbook.get(name) else {
            tracing::warn!(%caster, spell = name, "unknown spell");
            return;
        };
        self.start_cast(caster, &spell, now, out);
    }

    fn start_cast(&mut self, id: CasterId, spell: &Arc<Spell>, now: Duration, out: &mut Vec<GameSignal>) {
        let Some(slot) = self.slots.get_mut(id.0 as usize) else {
            return;
        };

        match slot.cast_queue.cast(&slot.caster, spell) {
            CastOutcome::Triggered { trigger, queued } => {
                slot.stats.casts += 1;
                tracing::info!(caster = %id, spell = %spell.name, %trigger, "cast");
                out.push(GameSignal::CastTriggered {
                    caster: id,
                    spell: spell.name.clone(),
                    trigger,
                    queued,
                    at: now,
                });
            }
            CastOutcome::InsufficientMana { required, available } => {
                slot.stats.fizzles += 1;
                out.push(GameSignal::Fizzled {
                    caster: id,
                    spell: Some(spell.name.clone()),
                    reason: FizzleReason::InsufficientMana { required, available },
                    at: now,
                });
            }
            CastOutcome::MissingBehavior => {
                slot.stats.fizzles += 1;
                out.push(GameSignal::Fizzled {
                    caster: id,
                    spell: Some(spell.name.clone()),
                    reason: FizzleReason::MissingBehavior,
                    at: now,
                });
            }
        }
    }

    /// Animation release keyframe for `caster`: advance its head cast by one
    /// release. Ignored unless fighting.
    pub fn on_release_keyframe(&mut self, caster: CasterId, now: Duration) {
        self.now = now;
        if !self.match_state.can_fight() {
            tracing::debug!(%caster, "release keyframe ignored, casting disabled");
            return;
        }

        let target = self.match_state.opponent_of(caster);
        let Some(slot) = self.slots.get_mut(caster.0 as usize) else {
            tracing::warn!(%caster, "release keyframe for an unknown caster");
            return;
        };

        let mut out = Vec::new();
        let Some(step) = slot.cast_queue.on_release(&mut slot.caster) else {
            out.push(GameSignal::EmptyReleaseQueue { caster, at: now });
            self.signal_bus.dispatch(&out);
            return;
        };

        // Every release restarts regeneration, even one that spent nothing.
        slot.stats.releases += 1;
        slot.regen.start(now);
        if step.mana_spent > 0.0 {
            out.push(slot.mana_signal(now));
        }

        let impacts = match &step.spell.behavior {
            Some(behavior) => behavior.release(&step.spell, caster, target),
            None => Vec::new(),
        };
        for impact in impacts {
            self.apply_impact(caster, impact, now, &mut out);
        }

        out.push(GameSignal::SpellReleased {
            caster,
            spell: step.spell.name.clone(),
            releases_remaining: step.releases_remaining,
            at: now,
        });
        self.signal_bus.dispatch(&out);
    }

    fn apply_impact(&mut self, source: CasterId, impact: SpellImpact, now: Duration, out: &mut Vec<GameSignal>) {
        match impact {
            SpellImpact::Damage { target, amount } => {
                self.apply_damage(target, amount, Some(source), now, out);
            }
            SpellImpact::Heal { target, amount } => {
                let healed = self.apply_heal(target, amount, now, out);
                if let Some(slot) = self.slots.get_mut(source.0 as usize) {
                    slot.stats.healing_done += healed;
                }
            }
            SpellImpact::Shield { target, duration } => {
                let Some(slot) = self.slots.get_mut(target.0 as usize) else {
                    return;
                };
                if slot.caster.is_dead() {
                    return;
                }
                slot.caster.activate_shield(now, duration);
                out.push(GameSignal::ShieldRaised {
                    caster: target,
                    until: now.saturating_add(duration),
                    at: now,
                });
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Health
    // ─────────────────────────────────────────────────────────────────────────

    /// Damage a caster. A no-op unless fighting.
    pub fn take_damage(&mut self, target: CasterId, amount: f32, source: Option<CasterId>, now: Duration) {
        self.now = now;
        let mut out = Vec::new();
        self.apply_damage(target, amount, source, now, &mut out);
        self.signal_bus.dispatch(&out);
    }

    /// Heal a caster, capped at max health. Not gated by the match state.
    pub fn heal(&mut self, target: CasterId, amount: f32, now: Duration) {
        self.now = now;
        let mut out = Vec::new();
        self.apply_heal(target, amount, now, &mut out);
        self.signal_bus.dispatch(&out);
    }

    fn apply_damage(
        &mut self,
        target: CasterId,
        amount: f32,
        source: Option<CasterId>,
        now: Duration,
        out: &mut Vec<GameSignal>,
    ) {
        if !self.match_state.can_fight() {
            tracing::debug!(%target, amount, state = ?self.state(), "damage ignored");
            return;
        }
        let Some(slot) = self.slots.get_mut(target.0 as usize) else {
            tracing::warn!(%target, "damage to an unknown caster");
            return;
        };

        let before = slot.caster.health();
        let died = match slot.caster.apply_damage(amount, now) {
            DamageOutcome::Ignored => return,
            DamageOutcome::Blocked => {
                slot.stats.damage_blocked += amount.max(0.0);
                tracing::debug!(%target, amount, "damage blocked by shield");
                out.push(GameSignal::ShieldBlocked { caster: target, amount, at: now });
                return;
            }
            DamageOutcome::Applied { health, died } => {
                let taken = before - health;
                slot.stats.damage_taken += taken;
                out.push(slot.health_signal(now));
                if let Some(source) = source
                    && let Some(src) = self.slots.get_mut(source.0 as usize)
                {
                    src.stats.damage_dealt += taken;
                }
                died
            }
        };

        if died {
            tracing::info!(caster = %target, "caster died");
            out.push(GameSignal::CasterDied { caster: target, at: now });
            let signals = self.match_state.on_death(target, now);
            self.absorb_match_signals(signals, now, out);
        }
    }

    fn apply_heal(&mut self, target: CasterId, amount: f32, now: Duration, out: &mut Vec<GameSignal>) -> f32 {
        let Some(slot) = self.slots.get_mut(target.0 as usize) else {
            tracing::warn!(%target, "heal for an unknown caster");
            return 0.0;
        };
        let healed = slot.caster.heal(amount);
        if healed > 0.0 {
            out.push(slot.health_signal(now));
        }
        healed
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Sequence control
    // ─────────────────────────────────────────────────────────────────────────

    /// Discard a caster's in-progress sequence.
    pub fn reset_sequence(&mut self, caster: CasterId, now: Duration) {
        self.now = now;
        let Some(slot) = self.slots.get_mut(caster.0 as usize) else {
            return;
        };
        slot.buffer.clear();
        tracing::debug!(%caster, "sequence reset");
        self.signal_bus.dispatch(&[GameSignal::SequenceCleared {
            caster,
            reason: ClearReason::Reset,
            at: now,
        }]);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────────────────────

    fn slot(&self, id: CasterId) -> Option<&CasterSlot> {
        self.slots.get(id.0 as usize)
    }

    /// Forward lifecycle signals, starting or stopping automatic casters as
    /// the match enters or leaves the fighting state.
    fn absorb_match_signals(&mut self, signals: Vec<GameSignal>, now: Duration, out: &mut Vec<GameSignal>) {
        for signal in signals {
            if let GameSignal::MatchStateChanged { to, .. } = signal {
                match to {
                    MatchState::Fighting => self.auto_casters.iter_mut().for_each(|ai| ai.start(now)),
                    _ => self.auto_casters.iter_mut().for_each(AutoCaster::stop),
                }
            }
            out.push(signal);
        }
    }
}
