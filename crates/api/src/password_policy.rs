// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Password rules for operator accounts.

use thiserror::Error;

/// Password policy errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PasswordPolicyError {
    /// Password is too short.
    #[error("Password must be at least {min_length} characters long")]
    TooShort { min_length: usize },

    /// Password mixes too few kinds of character.
    #[error(
        "Password must mix at least {required} of: letters, digits, symbols (found {found})"
    )]
    TooSimple { required: usize, found: usize },

    /// Password is the operator's own login name.
    #[error("Password must not be the login name")]
    MatchesLoginName,

    /// Password and confirmation do not match.
    #[error("Password and confirmation do not match")]
    ConfirmationMismatch,
}

/// Minimum requirements for an operator password.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordPolicy {
    /// Minimum password length in characters.
    pub min_length: usize,
    /// How many of letters, digits and symbols must appear.
    pub min_character_kinds: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 10,
            min_character_kinds: 2,
        }
    }
}

impl PasswordPolicy {
    /// Validates a new password.
    ///
    /// # Errors
    ///
    /// Returns the first rule the password breaks.
    pub fn validate(
        &self,
        password: &str,
        confirmation: &str,
        login_name: &str,
    ) -> Result<(), PasswordPolicyError> {
        if password != confirmation {
            return Err(PasswordPolicyError::ConfirmationMismatch);
        }

        if password.chars().count() < self.min_length {
            return Err(PasswordPolicyError::TooShort {
                min_length: self.min_length,
            });
        }

        let kinds: usize = character_kinds(password);
        if kinds < self.min_character_kinds {
            return Err(PasswordPolicyError::TooSimple {
                required: self.min_character_kinds,
                found: kinds,
            });
        }

        if password.trim().eq_ignore_ascii_case(login_name.trim()) {
            return Err(PasswordPolicyError::MatchesLoginName);
        }

        Ok(())
    }
}

fn character_kinds(password: &str) -> usize {
    let letters: bool = password.chars().any(char::is_alphabetic);
    let digits: bool = password.chars().any(|c| c.is_ascii_digit());
    let symbols: bool = password
        .chars()
        .any(|c| !c.is_alphanumeric() && !c.is_whitespace());
    [letters, digits, symbols].into_iter().filter(|k| *k).count()
}
