use anyhow::Result;
use log::debug;

use crate::settings::{AppSettings, VibrationIntensity};

/// Haptic/audio collaborator. Calls are fire-and-forget: the scheduler logs
/// failures and carries on.
pub trait Feedback: Send {
    /// Called once per game with the settings that game runs under.
    fn prepare(&mut self, _settings: &AppSettings) {}

    fn on_bite_start(&mut self, intensity: VibrationIntensity) -> Result<()>;
    fn on_catch_success(&mut self) -> Result<()>;
    fn on_miss(&mut self) -> Result<()>;
    fn on_countdown_tick(&mut self) -> Result<()>;
}

/// Feedback that only logs which cues would play.
#[derive(Debug, Clone, Default)]
pub struct LogFeedback {
    vibration: bool,
    sound: bool,
}

impl Feedback for LogFeedback {
    fn prepare(&mut self, settings: &AppSettings) {
        self.vibration = settings.vibration_enabled;
        self.sound = settings.sound_enabled;
    }

    fn on_bite_start(&mut self, intensity: VibrationIntensity) -> Result<()> {
        if self.vibration {
            debug!("haptic: bite ({intensity:?})");
        }
        if self.sound {
            debug!("sound: bite");
        }
        Ok(())
    }

    fn on_catch_success(&mut self) -> Result<()> {
        if self.vibration {
            debug!("haptic: success");
        }
        if self.sound {
            debug!("sound: success");
        }
        Ok(())
    }

    fn on_miss(&mut self) -> Result<()> {
        if self.sound {
            debug!("sound: miss");
        }
        Ok(())
    }

    fn on_countdown_tick(&mut self) -> Result<()> {
        if self.vibration {
            debug!("haptic: tick");
        }
        Ok(())
    }
}
