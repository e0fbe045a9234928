//! Escalation table: what the page shows after the n-th "No".
//!
//! Everything here is a pure function of the escalation count so the clamping
//! rules can be exercised natively without a browser.

/// Pleading lines shown after each evasive trigger (index = count - 1).
pub const PLEADING_MESSAGES: &[&str] = &[
    "Are you sure? 🥺",
    "You don't mean it... right? 😢",
    "I'm gonna cry if you say no... 💧",
    "Please... my heart is breaking... 😭",
    "This is your last chance! 💔💔",
];

/// Panda images; slot 0 is the happy initial state, the rest get sadder.
pub const PANDA_IMAGES: &[&str] = &[
    "love panda.gif",
    "sad 1.gif",
    "sad 2.gif",
    "sad 3.gif",
    "sad 4.gif",
    "sad 5.gif",
];

pub const SCALE_STEP: f64 = 0.15;
pub const MAX_YES_SCALE: f64 = 3.0;
pub const BASE_YES_FONT_REM: f64 = 1.3;
pub const MAX_YES_FONT_REM: f64 = 2.5;

/// Where the interaction currently stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Escalating(u32),
    Completed,
}

/// Session state: the escalation counter plus the last viewport classification.
#[derive(Clone, Debug)]
pub struct InteractionState {
    escalation_count: u32,
    compact: bool,
    completed: bool,
}

impl InteractionState {
    pub fn new(compact: bool) -> Self {
        Self { escalation_count: 0, compact, completed: false }
    }

    pub fn escalation_count(&self) -> u32 {
        self.escalation_count
    }

    pub fn is_compact(&self) -> bool {
        self.compact
    }

    pub(crate) fn set_compact(&mut self, compact: bool) {
        self.compact = compact;
    }

    pub fn phase(&self) -> Phase {
        if self.completed {
            Phase::Completed
        } else if self.escalation_count == 0 {
            Phase::Idle
        } else {
            Phase::Escalating(self.escalation_count)
        }
    }

    /// Bumps the counter and returns the new value. Saturates instead of wrapping.
    pub(crate) fn escalate(&mut self) -> u32 {
        self.escalation_count = self.escalation_count.saturating_add(1);
        self.escalation_count
    }

    pub(crate) fn complete(&mut self) {
        self.completed = true;
    }
}

/// Index of the pleading message for a given count, `None` before the first trigger.
pub fn message_index(count: u32, len: usize) -> Option<usize> {
    if count == 0 || len == 0 {
        return None;
    }
    Some((count as usize - 1).min(len - 1))
}

/// Index of the image for a given count. Count 0 maps to the happy image.
pub fn asset_index(count: u32, len: usize) -> usize {
    (count as usize).min(len.saturating_sub(1))
}

pub fn yes_scale(count: u32) -> f64 {
    (1.0 + count as f64 * SCALE_STEP).min(MAX_YES_SCALE)
}

pub fn yes_font_rem(count: u32) -> f64 {
    (BASE_YES_FONT_REM + count as f64 * SCALE_STEP).min(MAX_YES_FONT_REM)
}

/// Everything one evasive trigger changes on the page, resolved up front.
#[derive(Clone, Debug, PartialEq)]
pub struct EscalationStep {
    pub count: u32,
    pub message: Option<String>,
    pub image: Option<String>,
    pub distressed: bool,
    pub yes_scale: f64,
    pub yes_font_rem: f64,
}

impl EscalationStep {
    pub fn for_count<M: AsRef<str>, A: AsRef<str>>(count: u32, messages: &[M], assets: &[A]) -> Self {
        Self {
            count,
            message: message_index(count, messages.len()).map(|i| messages[i].as_ref().to_string()),
            image: assets.get(asset_index(count, assets.len())).map(|a| a.as_ref().to_string()),
            distressed: count > 0,
            yes_scale: yes_scale(count),
            yes_font_rem: yes_font_rem(count),
        }
    }
}
