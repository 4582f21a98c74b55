//! Configuration surface shared by the core pipeline and its hosts.
//!
//! Every section is `#[serde(default)]` so a partial TOML file only has to
//! mention the values it changes.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::gesture::{GestureLabel, GesturePair};

/// When the spellbook is consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CastMode {
    /// Match after every confirmed pair.
    #[default]
    Auto,
    /// Match only when the designated submit pair is confirmed.
    Manual,
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HandspellConfig {
    pub stabilizer: StabilizerConfig,
    pub casting: CastingConfig,
    pub match_flow: MatchFlowConfig,
    pub mana: ManaConfig,
    pub caster: CasterConfig,
    pub opponent: OpponentConfig,
}

/// Debounce timing for raw per-tick recognizer output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilizerConfig {
    /// How long a pair must be held before it is confirmed.
    pub required_stable_secs: f32,
    /// How long a hand must be missing before it is reported absent.
    pub required_no_hand_secs: f32,
}

impl Default for StabilizerConfig {
    fn default() -> Self {
        Self {
            required_stable_secs: 0.1,
            required_no_hand_secs: 0.1,
        }
    }
}

impl StabilizerConfig {
    pub fn required_stable(&self) -> Duration {
        secs(self.required_stable_secs)
    }

    pub fn required_no_hand(&self) -> Duration {
        secs(self.required_no_hand_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CastingConfig {
    pub mode: CastMode,
    /// Pair that submits the buffered sequence in manual mode.
    pub submit: GesturePair,
}

impl Default for CastingConfig {
    fn default() -> Self {
        Self {
            mode: CastMode::Auto,
            submit: GesturePair::new(GestureLabel::ThumbsUp, GestureLabel::ThumbsUp),
        }
    }
}

/// Countdown and end-of-match pacing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchFlowConfig {
    /// Whole seconds shown before the ready call ("3", "2", "1").
    pub countdown_secs: u32,
    /// How long the ready call is held before fighting begins.
    pub ready_hold_secs: f32,
    /// Delay between the round ending and the victory/defeat reveal.
    pub result_display_delay_secs: f32,
    /// Delay between the reveal and the end-of-match controls.
    pub show_buttons_delay_secs: f32,
}

impl Default for MatchFlowConfig {
    fn default() -> Self {
        Self {
            countdown_secs: 3,
            ready_hold_secs: 0.5,
            result_display_delay_secs: 1.0,
            show_buttons_delay_secs: 2.0,
        }
    }
}

impl MatchFlowConfig {
    pub fn ready_hold(&self) -> Duration {
        secs(self.ready_hold_secs)
    }

    pub fn result_display_delay(&self) -> Duration {
        secs(self.result_display_delay_secs)
    }

    pub fn show_buttons_delay(&self) -> Duration {
        secs(self.show_buttons_delay_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManaConfig {
    /// Quiet period after a spend before regeneration starts.
    pub restore_delay_secs: f32,
    /// Mana restored per step.
    pub restore_amount: f32,
    /// Time between restore steps.
    pub restore_interval_secs: f32,
}

impl Default for ManaConfig {
    fn default() -> Self {
        Self {
            restore_delay_secs: 1.0,
            restore_amount: 2.0,
            restore_interval_secs: 1.0,
        }
    }
}

impl ManaConfig {
    pub fn restore_delay(&self) -> Duration {
        secs(self.restore_delay_secs)
    }

    pub fn restore_interval(&self) -> Duration {
        secs(self.restore_interval_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CasterConfig {
    pub max_health: f32,
    pub max_mana: f32,
}

impl Default for CasterConfig {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            max_mana: 100.0,
        }
    }
}

/// Automatic opponent agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpponentConfig {
    pub enabled: bool,
    /// Spell names cast in order, wrapping around.
    pub rotation: Vec<String>,
    /// Time between casts while fighting.
    pub cast_interval_secs: f32,
}

impl Default for OpponentConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            rotation: vec!["Fireball".to_string()],
            cast_interval_secs: 3.0,
        }
    }
}

impl OpponentConfig {
    pub fn cast_interval(&self) -> Duration {
        secs(self.cast_interval_secs)
    }
}

/// Seconds from config to a `Duration`. Negative or NaN input is zero, and
/// anything too large for a `Duration` saturates.
fn secs(value: f32) -> Duration {
    if value.is_nan() || value <= 0.0 {
        Duration::ZERO
    } else {
        Duration::try_from_secs_f32(value).unwrap_or(Duration::MAX)
    }
}
