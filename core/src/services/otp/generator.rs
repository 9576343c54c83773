//! Passcode generation

use rand::{rngs::OsRng, Rng};

use crate::domain::entities::otp_record::DEFAULT_CODE_LENGTH;

/// Generates numeric passcodes from the operating system CSPRNG
///
/// Each digit is drawn independently with `gen_range(0..10)`, which rejects
/// out-of-range samples internally, so every digit is uniform. The generator
/// holds no state and can be shared freely between tasks.
#[derive(Debug, Clone, Copy)]
pub struct PasscodeGenerator {
    length: usize,
}

impl PasscodeGenerator {
    pub fn new(length: usize) -> Self {
        Self { length }
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Produce a passcode of exactly `length` decimal digits
    pub fn generate(&self) -> String {
        let mut rng = OsRng;
        (0..self.length)
            .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
            .collect()
    }
}

impl Default for PasscodeGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_CODE_LENGTH)
    }
}
