//! Calculator screen: arithmetic engine plus secret code detection
//!
//! Every keypress feeds both the engine and the pattern matcher. When the
//! matcher reports the trigger sequence, the screen clears the keystroke
//! buffer and the display in the same step, then activates secret mode, so
//! no trace of the code entry remains visible.

pub mod engine;
pub mod keys;
pub mod matcher;

use crate::mode::ModeController;
use anyhow::Result;
use engine::CalculatorEngine;
use keys::Key;
use matcher::PatternMatcher;

pub struct CalculatorScreen {
    engine: CalculatorEngine,
    matcher: PatternMatcher,
    mode: ModeController,
}

impl CalculatorScreen {
    /// Build a screen around `secret_code`.
    ///
    /// The code is fixed for the life of the screen; a changed code takes
    /// effect the next time a screen is constructed.
    pub fn new(secret_code: &str, mode: ModeController) -> Self {
        Self {
            engine: CalculatorEngine::new(),
            matcher: PatternMatcher::new(secret_code),
            mode,
        }
    }

    /// Dispatch one keypress to the engine and the matcher.
    ///
    /// # Errors
    ///
    /// Returns an error if a detected trigger fails to persist the mode
    /// transition. The display and buffer are already cleared by then.
    pub fn press(&mut self, key: Key) -> Result<()> {
        if key == Key::Clear {
            self.engine.clear();
            self.matcher.clear();
            return Ok(());
        }

        self.engine.press(key);

        if self.matcher.on_keystroke(key.token()).is_match() {
            log::info!("Trigger sequence detected");
            self.matcher.clear();
            self.engine.clear();
            self.mode.activate()?;
        }

        Ok(())
    }

    pub fn display(&self) -> &str {
        self.engine.display()
    }
}
