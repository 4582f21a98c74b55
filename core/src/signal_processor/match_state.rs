//! Match lifecycle: PreRound → Fighting → EndRound → Results.
//!
//! The machine only moves forward. Countdown and end-of-match pacing run as
//! [`TimedSequence`]s advanced by [`MatchStateMachine::tick`], and the first
//! death while fighting decides the winner for good.

use std::time::Duration;

use handspell_types::MatchFlowConfig;

use crate::caster::{CasterId, CasterRole};

use super::{GameSignal, MatchState, TimedSequence};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlowStep {
    Countdown(u32),
    Ready,
    Fight,
    Reveal,
    ShowResults,
}

#[derive(Debug, Clone)]
pub struct MatchStateMachine {
    config: MatchFlowConfig,
    state: MatchState,
    local: Option<CasterId>,
    opponent: Option<CasterId>,
    winner: Option<CasterId>,
    flow: TimedSequence<FlowStep>,
    flow_started: bool,
}

impl MatchStateMachine {
    pub fn new(config: &MatchFlowConfig) -> Self {
        Self {
            config: config.clone(),
            state: MatchState::PreRound,
            local: None,
            opponent: None,
            winner: None,
            flow: TimedSequence::new(),
            flow_started: false,
        }
    }

    pub fn state(&self) -> MatchState {
        self.state
    }

    /// True only while fighting. Gates sequence processing, automatic
    /// casters and damage intake.
    pub fn can_fight(&self) -> bool {
        self.state == MatchState::Fighting
    }

    pub fn winner(&self) -> Option<CasterId> {
        self.winner
    }

    /// True once both roles are filled and the countdown has begun.
    pub fn flow_started(&self) -> bool {
        self.flow_started
    }

    pub fn caster_for(&self, role: CasterRole) -> Option<CasterId> {
        match role {
            CasterRole::Local => self.local,
            CasterRole::Opponent => self.opponent,
        }
    }

    /// The other registered caster.
    pub fn opponent_of(&self, id: CasterId) -> Option<CasterId> {
        if self.local == Some(id) {
            self.opponent
        } else if self.opponent == Some(id) {
            self.local
        } else {
            None
        }
    }

    /// Register a caster in a role. The countdown starts as soon as both the
    /// local and the opponent role are filled; it never starts otherwise.
    pub fn register(&mut self, id: CasterId, role: CasterRole, now: Duration) -> Vec<GameSignal> {
        let slot = match role {
            CasterRole::Local => &mut self.local,
            CasterRole::Opponent => &mut self.opponent,
        };
        if let Some(existing) = *slot {
            tracing::warn!(%id, %existing, ?role, "role already registered, ignoring");
            return Vec::new();
        }
        *slot = Some(id);
        tracing::debug!(%id, ?role, "caster registered");

        if self.flow_started || self.local.is_none() || self.opponent.is_none() {
            return Vec::new();
        }

        self.flow_started = true;
        let second = Duration::from_secs(1);
        let count = self.config.countdown_secs;
        let mut steps: Vec<(Duration, FlowStep)> = (1..=count)
            .rev()
            .enumerate()
            .map(|(i, remaining)| {
                let delay = if i == 0 { Duration::ZERO } else { second };
                (delay, FlowStep::Countdown(remaining))
            })
            .collect();
        let ready_delay = if count == 0 { Duration::ZERO } else { second };
        steps.push((ready_delay, FlowStep::Ready));
        steps.push((self.config.ready_hold(), FlowStep::Fight));

        tracing::info!(countdown = count, "both casters registered, starting countdown");
        self.flow.start(now, steps);
        self.tick(now)
    }

    /// Advance timed transitions due by `now`.
    pub fn tick(&mut self, now: Duration) -> Vec<GameSignal> {
        let mut signals = Vec::new();

        for step in self.flow.poll(now) {
            match step {
                FlowStep::Countdown(remaining) => {
                    tracing::debug!(remaining, "countdown");
                    signals.push(GameSignal::CountdownTick { remaining, at: now });
                }
                FlowStep::Ready => signals.push(GameSignal::Ready { at: now }),
                FlowStep::Fight => self.transition(MatchState::Fighting, now, &mut signals),
                FlowStep::Reveal => {
                    tracing::info!(winner = ?self.winner, "match ended");
                    signals.push(GameSignal::MatchEnded {
                        winner: self.winner,
                        at: now,
                    });
                }
                FlowStep::ShowResults => {
                    self.transition(MatchState::Results, now, &mut signals);
                    signals.push(GameSignal::InputReleased { at: now });
                }
            }
        }

        signals
    }

    /// Handle a caster death. Only the first death while fighting counts;
    /// later or early deaths are ignored.
    pub fn on_death(&mut self, dead: CasterId, now: Duration) -> Vec<GameSignal> {
        if self.state != MatchState::Fighting {
            tracing::debug!(%dead, state = ?self.state, "death ignored outside of fighting");
            return Vec::new();
        }
        let Some(winner) = self.opponent_of(dead) else {
            tracing::warn!(%dead, "death of an unregistered caster ignored");
            return Vec::new();
        };

        self.winner = Some(winner);
        tracing::info!(%dead, %winner, "round over");

        let mut signals = Vec::new();
        self.transition(MatchState::EndRound, now, &mut signals);
        self.flow.start(
            now,
            [
                (self.config.result_display_delay(), FlowStep::Reveal),
                (self.config.show_buttons_delay(), FlowStep::ShowResults),
            ],
        );
        signals.extend(self.tick(now));
        signals
    }

    fn transition(&mut self, to: MatchState, now: Duration, signals: &mut Vec<GameSignal>) {
        if to <= self.state {
            tracing::warn!(from = ?self.state, ?to, "backward match transition ignored");
            return;
        }
        let from = self.state;
        self.state = to;
        tracing::info!(?from, ?to, "match state changed");
        signals.push(GameSignal::MatchStateChanged { from, to, at: now });
    }
}
