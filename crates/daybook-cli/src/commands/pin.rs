//! PIN gate
//!
//! A 4-digit code guards every command that touches the store. The
//! gate only decides whether the store may be invoked; no data passes
//! from it to the store. The code is stored and compared in plaintext
//! in the data directory, and the journal itself is not encrypted -
//! this is a lock on the door, not a safe.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use daybook_core::Config;

use crate::editor::prompt_line;
use crate::output::Output;

const MAX_ATTEMPTS: u32 = 3;

/// Set-or-check guard over the unlock code file
pub struct PinGate {
    path: PathBuf,
}

impl PinGate {
    pub fn new(config: &Config) -> Self {
        Self {
            path: config.pin_path(),
        }
    }

    /// Whether a PIN has been set
    pub fn is_set(&self) -> bool {
        self.path.exists()
    }

    /// Store a new PIN
    pub fn set(&self, pin: &str) -> Result<()> {
        if !is_valid_pin(pin) {
            bail!("PIN must be exactly 4 digits");
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create data directory: {:?}", parent))?;
        }
        fs::write(&self.path, pin)
            .with_context(|| format!("Failed to write PIN file: {:?}", self.path))?;
        Ok(())
    }

    /// Check an entered PIN against the stored one
    pub fn verify(&self, pin: &str) -> Result<bool> {
        let stored = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read PIN file: {:?}", self.path))?;
        Ok(stored.trim() == pin)
    }
}

fn is_valid_pin(pin: &str) -> bool {
    pin.len() == 4 && pin.chars().all(|c| c.is_ascii_digit())
}

/// Block until the user unlocks the journal
///
/// No PIN set means no lock. With a PIN set, the user gets a few
/// attempts; without a terminal there is no way to unlock at all.
pub fn ensure_unlocked(config: &Config) -> Result<()> {
    let gate = PinGate::new(config);
    if !gate.is_set() {
        return Ok(());
    }

    if !atty::is(atty::Stream::Stdin) {
        bail!("Journal is locked with a PIN; run interactively to unlock.");
    }

    for _ in 0..MAX_ATTEMPTS {
        let entered = prompt_line("Enter your 4-digit PIN: ")?;
        if gate.verify(&entered)? {
            return Ok(());
        }
        println!("Incorrect PIN. Please try again.");
    }

    bail!("Too many incorrect PIN attempts.")
}

/// Set or change the PIN
pub fn set(config: &Config, output: &Output) -> Result<()> {
    let gate = PinGate::new(config);

    if !atty::is(atty::Stream::Stdin) {
        bail!("Setting a PIN requires an interactive terminal.");
    }

    if gate.is_set() {
        let current = prompt_line("Enter your current PIN: ")?;
        if !gate.verify(&current)? {
            bail!("Incorrect PIN.");
        }
    }

    let new_pin = prompt_line("Enter a new 4-digit PIN: ")?;
    if !is_valid_pin(&new_pin) {
        bail!("PIN must be exactly 4 digits");
    }

    let repeated = prompt_line("Repeat the new PIN: ")?;
    if new_pin != repeated {
        bail!("PINs do not match.");
    }

    gate.set(&new_pin)?;
    output.success("PIN set");
    Ok(())
}

/// Show whether a PIN is set
pub fn status(config: &Config, output: &Output) -> Result<()> {
    let gate = PinGate::new(config);
    if gate.is_set() {
        output.message("A PIN is set. Store commands will prompt for it.");
    } else {
        output.message("No PIN set. Run `daybook pin set` to lock your journal.");
    }
    Ok(())
}
