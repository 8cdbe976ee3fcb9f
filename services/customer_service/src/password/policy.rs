use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PasswordPolicyViolation {
    #[error("The password needs at least {0} characters. Create a new password and try again.")]
    TooShort(usize),

    #[error(
        "Minimum of different classes of characters in password is {0}. Classes of characters: Lower Case, \
         Upper Case, Digits, Special Characters."
    )]
    TooFewCharacterClasses(usize),

    #[error("The password can't begin or end with a space. Verify the password and try again.")]
    SurroundingWhitespace,
}

/// Strength rules a new password must satisfy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub required_character_classes: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            required_character_classes: 3,
        }
    }
}

impl PasswordPolicy {
    pub fn check(&self, password: &str) -> Result<(), PasswordPolicyViolation> {
        if password.chars().count() < self.min_length {
            return Err(PasswordPolicyViolation::TooShort(self.min_length));
        }

        if password.trim() != password {
            return Err(PasswordPolicyViolation::SurroundingWhitespace);
        }

        if character_classes(password) < self.required_character_classes {
            return Err(PasswordPolicyViolation::TooFewCharacterClasses(
                self.required_character_classes,
            ));
        }

        Ok(())
    }
}

/// Number of distinct classes (lower case, upper case, digits, everything else) used by `password`.
fn character_classes(password: &str) -> usize {
    let mut classes = [false; 4];
    for c in password.chars() {
        let idx = if c.is_lowercase() {
            0
        } else if c.is_uppercase() {
            1
        } else if c.is_ascii_digit() {
            2
        } else {
            3
        };
        classes[idx] = true;
    }

    classes.iter().filter(|used| **used).count()
}
