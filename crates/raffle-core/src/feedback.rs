//! Feedback sink abstraction and sound cue settings.
//!
//! The session emits a cue for every animation tick and for every reveal.
//! Sinks are fire-and-forget: they cannot fail and cannot influence the
//! session's state or timing.

use serde::{Deserialize, Serialize};

/// Default volume for a fresh session.
pub const DEFAULT_VOLUME: f32 = 0.3;

/// Kind of feedback emitted by the draw engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackEvent {
    /// One animation tick while a draw is rolling.
    Tick,
    /// A draw has been committed.
    Reveal,
}

impl FeedbackEvent {
    /// Wire name of the event, matching its serialized form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tick => "tick",
            Self::Reveal => "reveal",
        }
    }
}

/// Oscillator shape for a [`Tone`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Waveform {
    /// Square wave.
    Square,
    /// Triangle wave.
    Triangle,
}

/// A short synthesized sound a presentation layer may play for a cue.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tone {
    /// Oscillator shape.
    pub waveform: Waveform,
    /// Frequency at the start of the tone, in hertz.
    pub start_hz: f32,
    /// Frequency at the end of the tone, in hertz.
    pub end_hz: f32,
    /// Length of the tone in milliseconds.
    pub duration_ms: u32,
    /// Initial gain, already scaled by the configured volume.
    pub gain: f32,
}

/// User sound preferences.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoundSettings {
    /// Whether cues should be audible at all.
    pub enabled: bool,
    /// Volume in `[0.0, 1.0]`.
    pub volume: f32,
}

impl Default for SoundSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            volume: DEFAULT_VOLUME,
        }
    }
}

impl SoundSettings {
    /// Creates settings with the volume clamped to `[0.0, 1.0]`.
    ///
    /// A non-finite volume falls back to the default.
    #[must_use]
    pub fn new(enabled: bool, volume: f32) -> Self {
        let volume = if volume.is_finite() {
            volume.clamp(0.0, 1.0)
        } else {
            DEFAULT_VOLUME
        };
        Self { enabled, volume }
    }

    /// Returns `true` when cues should produce sound.
    #[must_use]
    pub fn is_audible(&self) -> bool {
        self.enabled && self.volume > 0.0
    }

    /// Returns the tone to play for `event`, or `None` when muted.
    #[must_use]
    pub fn tone_for(&self, event: FeedbackEvent) -> Option<Tone> {
        if !self.is_audible() {
            return None;
        }
        let tone = match event {
            FeedbackEvent::Tick => Tone {
                waveform: Waveform::Square,
                start_hz: 950.0,
                end_hz: 950.0,
                duration_ms: 50,
                gain: 0.04 * self.volume,
            },
            FeedbackEvent::Reveal => Tone {
                waveform: Waveform::Triangle,
                start_hz: 500.0,
                end_hz: 880.0,
                duration_ms: 350,
                gain: 0.08 * self.volume,
            },
        };
        Some(tone)
    }
}

/// A feedback event together with the sound it should make, if any.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeedbackCue {
    /// What happened.
    pub event: FeedbackEvent,
    /// Sound to play, `None` when muted.
    pub tone: Option<Tone>,
}

impl FeedbackCue {
    /// Builds the cue for `event` under the given sound settings.
    #[must_use]
    pub fn new(event: FeedbackEvent, sound: &SoundSettings) -> Self {
        Self {
            event,
            tone: sound.tone_for(event),
        }
    }
}

/// Consumer of feedback cues.
pub trait FeedbackSink: Send + Sync {
    /// Delivers a cue. Must not block.
    fn emit(&self, cue: FeedbackCue);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_audible() {
        let settings = SoundSettings::default();
        assert!(settings.enabled);
        assert!((settings.volume - DEFAULT_VOLUME).abs() < f32::EPSILON);
        assert!(settings.is_audible());
    }

    #[test]
    fn test_new_clamps_volume() {
        assert!((SoundSettings::new(true, 1.7).volume - 1.0).abs() < f32::EPSILON);
        assert!(SoundSettings::new(true, -0.5).volume.abs() < f32::EPSILON);
        assert!((SoundSettings::new(true, f32::NAN).volume - DEFAULT_VOLUME).abs() < f32::EPSILON);
    }

    #[test]
    fn test_disabled_or_zero_volume_is_muted() {
        assert_eq!(SoundSettings::new(false, 0.8).tone_for(FeedbackEvent::Tick), None);
        assert_eq!(SoundSettings::new(true, 0.0).tone_for(FeedbackEvent::Reveal), None);
    }

    #[test]
    fn test_tick_tone_scales_gain_with_volume() {
        let tone = SoundSettings::new(true, 0.5)
            .tone_for(FeedbackEvent::Tick)
            .unwrap();
        assert_eq!(tone.waveform, Waveform::Square);
        assert_eq!(tone.duration_ms, 50);
        assert!((tone.gain - 0.02).abs() < 1e-6);
    }

    #[test]
    fn test_reveal_tone_sweeps_upward() {
        let tone = SoundSettings::new(true, 1.0)
            .tone_for(FeedbackEvent::Reveal)
            .unwrap();
        assert_eq!(tone.waveform, Waveform::Triangle);
        assert!(tone.end_hz > tone.start_hz);
        assert_eq!(tone.duration_ms, 350);
    }

    #[test]
    fn test_cue_serializes_event_in_snake_case() {
        let cue = FeedbackCue::new(FeedbackEvent::Reveal, &SoundSettings::new(false, 0.3));
        let json = serde_json::to_value(cue).unwrap();
        assert_eq!(json["event"], "reveal");
        assert!(json["tone"].is_null());
    }

    #[test]
    fn test_as_str_matches_serialized_name() {
        for event in [FeedbackEvent::Tick, FeedbackEvent::Reveal] {
            assert_eq!(serde_json::to_value(event).unwrap(), event.as_str());
        }
    }
}
