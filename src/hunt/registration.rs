//! Three-step registration: code, name, phone.

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::hunt::types::Player;
use crate::validation::{
    sanitize_registration_code, validate_phone, validate_player_name, validate_registration_code,
    RegistrationError,
};

const PLAYER_ID_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationStep {
    Code,
    Name,
    Phone,
}

impl RegistrationStep {
    /// 1-based position for progress indicators
    pub fn number(&self) -> u8 {
        match self {
            RegistrationStep::Code => 1,
            RegistrationStep::Name => 2,
            RegistrationStep::Phone => 3,
        }
    }

    pub fn prompt(&self) -> &'static str {
        match self {
            RegistrationStep::Code => "Enter the 6-character code you received",
            RegistrationStep::Name => "Enter your full name",
            RegistrationStep::Phone => "Enter a reachable mobile number (08xxxxxxxxx)",
        }
    }
}

/// Result of submitting the current step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Advanced(RegistrationStep),
    Registered(Player),
}

#[derive(Debug, Clone)]
pub struct RegistrationFlow {
    step: RegistrationStep,
    code: String,
    name: String,
    phone: String,
    valid_codes: Vec<String>,
}

impl RegistrationFlow {
    pub fn new(valid_codes: Vec<String>) -> Self {
        Self {
            step: RegistrationStep::Code,
            code: String::new(),
            name: String::new(),
            phone: String::new(),
            valid_codes,
        }
    }

    pub fn step(&self) -> RegistrationStep {
        self.step
    }

    /// Code as it is shown while typing (sanitized)
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Fill the field for the current step.
    pub fn input(&mut self, value: &str) {
        match self.step {
            RegistrationStep::Code => self.code = sanitize_registration_code(value),
            RegistrationStep::Name => self.name = value.to_string(),
            RegistrationStep::Phone => self.phone = value.to_string(),
        }
    }

    /// Validate the current step and move on. A failed step keeps its input for correction.
    pub fn next(&mut self, now: DateTime<Utc>) -> Result<StepOutcome, RegistrationError> {
        match self.step {
            RegistrationStep::Code => {
                self.code = validate_registration_code(&self.code, &self.valid_codes)?;
                self.step = RegistrationStep::Name;
                Ok(StepOutcome::Advanced(self.step))
            }
            RegistrationStep::Name => {
                self.name = validate_player_name(&self.name)?;
                self.step = RegistrationStep::Phone;
                Ok(StepOutcome::Advanced(self.step))
            }
            RegistrationStep::Phone => {
                self.phone = validate_phone(&self.phone)?;
                let player =
                    Player::new(&generate_player_id(), &self.name, &self.phone, &self.code, now);
                Ok(StepOutcome::Registered(player))
            }
        }
    }

    /// Return to the previous step; no-op on the first.
    pub fn back(&mut self) {
        self.step = match self.step {
            RegistrationStep::Code | RegistrationStep::Name => RegistrationStep::Code,
            RegistrationStep::Phone => RegistrationStep::Name,
        };
    }
}

/// Random lower-case base-36 id
pub fn generate_player_id() -> String {
    let mut rng = rand::thread_rng();
    (0..PLAYER_ID_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect()
}
