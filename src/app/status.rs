use std::time::{Duration, Instant};

use eframe::egui::Color32;

use crate::layout::DimensionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Error,
}

/// Banner shown under the controls until it expires.
#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub kind: StatusKind,
    shown_at: Instant,
}

impl StatusMessage {
    pub fn success(text: impl Into<String>) -> Self {
        Self::at(text, StatusKind::Success, Instant::now())
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::at(text, StatusKind::Error, Instant::now())
    }

    pub fn rejected_dimension(err: &DimensionError) -> Self {
        Self::error(format!("Invalid size: {err}"))
    }

    fn at(text: impl Into<String>, kind: StatusKind, shown_at: Instant) -> Self {
        Self {
            text: text.into(),
            kind,
            shown_at,
        }
    }

    #[must_use]
    pub fn remaining(&self, lifetime: Duration, now: Instant) -> Option<Duration> {
        lifetime
            .checked_sub(now.saturating_duration_since(self.shown_at))
            .filter(|left| !left.is_zero())
    }

    #[must_use]
    pub fn color(&self) -> Color32 {
        match self.kind {
            StatusKind::Success => Color32::GREEN,
            StatusKind::Error => Color32::RED,
        }
    }

    #[must_use]
    pub fn icon(&self) -> &'static str {
        match self.kind {
            StatusKind::Success => "✅",
            StatusKind::Error => "❌",
        }
    }
}
