use std::time::Duration;

use handspell_types::{GesturePair, Hand};
use serde::Serialize;

use crate::caster::CasterId;

/// Why a sequence buffer was emptied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClearReason {
    Cast,
    Fizzle,
    Reset,
}

/// Why a cast attempt produced no spell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum FizzleReason {
    /// Manual submit with no matching spellbook entry.
    NoMatch,
    InsufficientMana { required: f32, available: f32 },
    /// The spell has no behavior; a configuration error.
    MissingBehavior,
}

/// Match lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize)]
pub enum MatchState {
    #[default]
    PreRound,
    Fighting,
    EndRound,
    Results,
}

/// Signals emitted by the match session for presentation and other
/// cross-cutting consumers. Every signal carries the session time at which
/// it happened.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "signal")]
pub enum GameSignal {
    // Hand tracking
    HandPresent {
        caster: CasterId,
        hand: Hand,
        at: Duration,
    },
    HandAbsent {
        caster: CasterId,
        hand: Hand,
        at: Duration,
    },

    // Sequence building
    GestureConfirmed {
        caster: CasterId,
        pair: GesturePair,
        at: Duration,
    },
    SequenceAppended {
        caster: CasterId,
        pair: GesturePair,
        len: usize,
        at: Duration,
    },
    SequenceCleared {
        caster: CasterId,
        reason: ClearReason,
        at: Duration,
    },
    Fizzled {
        caster: CasterId,
        spell: Option<String>,
        reason: FizzleReason,
        at: Duration,
    },

    // Casting
    CastTriggered {
        caster: CasterId,
        spell: String,
        trigger: String,
        queued: bool,
        at: Duration,
    },
    SpellReleased {
        caster: CasterId,
        spell: String,
        releases_remaining: u32,
        at: Duration,
    },
    /// A release keyframe arrived with nothing queued.
    EmptyReleaseQueue {
        caster: CasterId,
        at: Duration,
    },

    // Caster vitals
    ManaChanged {
        caster: CasterId,
        mana: f32,
        max_mana: f32,
        at: Duration,
    },
    HealthChanged {
        caster: CasterId,
        health: f32,
        max_health: f32,
        at: Duration,
    },
    ShieldRaised {
        caster: CasterId,
        until: Duration,
        at: Duration,
    },
    ShieldBlocked {
        caster: CasterId,
        amount: f32,
        at: Duration,
    },
    ShieldExpired {
        caster: CasterId,
        at: Duration,
    },
    CasterDied {
        caster: CasterId,
        at: Duration,
    },

    // Match flow
    CountdownTick {
        remaining: u32,
        at: Duration,
    },
    Ready {
        at: Duration,
    },
    MatchStateChanged {
        from: MatchState,
        to: MatchState,
        at: Duration,
    },
    MatchEnded {
        winner: Option<CasterId>,
        at: Duration,
    },
    /// Input devices may be handed back to the user.
    InputReleased {
        at: Duration,
    },
}

impl GameSignal {
    /// Session time of the signal.
    pub fn at(&self) -> Duration {
        match self {
            Self::HandPresent { at, .. }
            | Self::HandAbsent { at, .. }
            | Self::GestureConfirmed { at, .. }
            | Self::SequenceAppended { at, .. }
            | Self::SequenceCleared { at, .. }
            | Self::Fizzled { at, .. }
            | Self::CastTriggered { at, .. }
            | Self::SpellReleased { at, .. }
            | Self::EmptyReleaseQueue { at, .. }
            | Self::ManaChanged { at, .. }
            | Self::HealthChanged { at, .. }
            | Self::ShieldRaised { at, .. }
            | Self::ShieldBlocked { at, .. }
            | Self::ShieldExpired { at, .. }
            | Self::CasterDied { at, .. }
            | Self::CountdownTick { at, .. }
            | Self::Ready { at }
            | Self::MatchStateChanged { at, .. }
            | Self::MatchEnded { at, .. }
            | Self::InputReleased { at } => *at,
        }
    }

    /// Caster the signal is about, if it concerns one.
    pub fn caster(&self) -> Option<CasterId> {
        match self {
            Self::HandPresent { caster, .. }
            | Self::HandAbsent { caster, .. }
            | Self::GestureConfirmed { caster, .. }
            | Self::SequenceAppended { caster, .. }
            | Self::SequenceCleared { caster, .. }
            | Self::Fizzled { caster, .. }
            | Self::CastTriggered { caster, .. }
            | Self::SpellReleased { caster, .. }
            | Self::EmptyReleaseQueue { caster, .. }
            | Self::ManaChanged { caster, .. }
            | Self::HealthChanged { caster, .. }
            | Self::ShieldRaised { caster, .. }
            | Self::ShieldBlocked { caster, .. }
            | Self::ShieldExpired { caster, .. }
            | Self::CasterDied { caster, .. } => Some(*caster),
            Self::CountdownTick { .. }
            | Self::Ready { .. }
            | Self::MatchStateChanged { .. }
            | Self::MatchEnded { .. }
            | Self::InputReleased { .. } => None,
        }
    }
}
