//! Gesture labels and two-hand gesture pairs.
//!
//! The recognizer reports one category string per hand. Those strings are
//! mapped onto [`GestureLabel`] through a fixed table; anything the table
//! does not know becomes [`GestureLabel::None`], the "no hand" sentinel.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Classification of a single hand's pose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureLabel {
    /// No hand detected, or a category we do not recognize.
    #[default]
    None,
    ClosedFist,
    OpenPalm,
    PointingUp,
    ThumbsDown,
    ThumbsUp,
    Victory,
    ILoveYou,
}

/// Raw recognizer category -> label. Unlisted strings map to `None`.
const RAW_LABELS: &[(&str, GestureLabel)] = &[
    ("Closed_Fist", GestureLabel::ClosedFist),
    ("Open_Palm", GestureLabel::OpenPalm),
    ("Pointing_Up", GestureLabel::PointingUp),
    ("Thumb_Down", GestureLabel::ThumbsDown),
    ("Thumb_Up", GestureLabel::ThumbsUp),
    ("Victory", GestureLabel::Victory),
    ("ILoveYou", GestureLabel::ILoveYou),
];

impl GestureLabel {
    /// Every label that represents a detected hand.
    pub const DETECTED: [GestureLabel; 7] = [
        GestureLabel::ClosedFist,
        GestureLabel::OpenPalm,
        GestureLabel::PointingUp,
        GestureLabel::ThumbsDown,
        GestureLabel::ThumbsUp,
        GestureLabel::Victory,
        GestureLabel::ILoveYou,
    ];

    /// Map a raw recognizer category string to a label.
    ///
    /// Total: unknown, empty or differently-cased input yields `None`.
    ///
    /// ```
    /// use handspell_types::GestureLabel;
    /// assert_eq!(GestureLabel::from_raw("Open_Palm"), GestureLabel::OpenPalm);
    /// assert_eq!(GestureLabel::from_raw("open_palm"), GestureLabel::None);
    /// assert_eq!(GestureLabel::from_raw(""), GestureLabel::None);
    /// ```
    pub fn from_raw(raw: &str) -> Self {
        RAW_LABELS
            .iter()
            .find(|(name, _)| *name == raw)
            .map(|(_, label)| *label)
            .unwrap_or(GestureLabel::None)
    }

    /// The recognizer category string for this label (`"None"` for the sentinel).
    pub fn raw_name(&self) -> &'static str {
        RAW_LABELS
            .iter()
            .find(|(_, label)| label == self)
            .map(|(name, _)| *name)
            .unwrap_or("None")
    }

    pub fn is_none(&self) -> bool {
        *self == GestureLabel::None
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::ClosedFist => "closed_fist",
            Self::OpenPalm => "open_palm",
            Self::PointingUp => "pointing_up",
            Self::ThumbsDown => "thumbs_down",
            Self::ThumbsUp => "thumbs_up",
            Self::Victory => "victory",
            Self::ILoveYou => "i_love_you",
        }
    }
}

impl fmt::Display for GestureLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which hand a per-hand signal refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Hand {
    Left,
    Right,
}

/// Left and right hand labels observed together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GesturePair {
    pub left: GestureLabel,
    pub right: GestureLabel,
}

impl GesturePair {
    pub const fn new(left: GestureLabel, right: GestureLabel) -> Self {
        Self { left, right }
    }

    /// Build a pair from the recognizer's raw per-hand strings.
    pub fn from_raw(left: &str, right: &str) -> Self {
        Self::new(GestureLabel::from_raw(left), GestureLabel::from_raw(right))
    }

    /// True if either hand is missing.
    pub fn has_none(&self) -> bool {
        self.left.is_none() || self.right.is_none()
    }

    pub fn hand(&self, hand: Hand) -> GestureLabel {
        match hand {
            Hand::Left => self.left,
            Hand::Right => self.right,
        }
    }
}

impl fmt::Display for GesturePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.left, self.right)
    }
}
