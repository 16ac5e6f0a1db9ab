// Confirmation-code generation, behind a trait so tests can pin the code.

use rand::Rng;

/// Characters used in confirmation codes (uppercase alphanumeric).
const CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of a confirmation code.
const CODE_LENGTH: usize = 8;

/// Generates the human-shareable confirmation code for a booking.
pub trait CodeGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Default generator: 8 random uppercase alphanumerics. 36^8 possible
/// codes; the unique column constraint catches the astronomically rare
/// collision.
pub struct RandomCodeGenerator;

impl CodeGenerator for RandomCodeGenerator {
    fn generate(&self) -> String {
        let mut rng = rand::thread_rng();
        (0..CODE_LENGTH)
            .map(|_| {
                let idx = rng.gen_range(0..CODE_CHARSET.len());
                CODE_CHARSET[idx] as char
            })
            .collect()
    }
}

/// Deterministic generator for tests.
pub struct FixedCodeGenerator {
    code: String,
}

impl FixedCodeGenerator {
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }
}

impl CodeGenerator for FixedCodeGenerator {
    fn generate(&self) -> String {
        self.code.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_codes_have_expected_shape() {
        let generator = RandomCodeGenerator;
        for _ in 0..100 {
            let code = generator.generate();
            assert_eq!(code.len(), CODE_LENGTH);
            assert!(code
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit()));
        }
    }

    #[test]
    fn fixed_generator_is_deterministic() {
        let generator = FixedCodeGenerator::new("TESTCODE");
        assert_eq!(generator.generate(), "TESTCODE");
        assert_eq!(generator.generate(), "TESTCODE");
    }
}
