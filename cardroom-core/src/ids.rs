//! Opaque identifiers used throughout the core.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! uuid_id {
    ($name:ident) => {
        #[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
        pub struct $name(pub Uuid);

        impl $name {
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_id!(RoomId);
uuid_id!(UserId);
uuid_id!(GameId);
uuid_id!(SocketId);

/// A 6-character uppercase alphanumeric room code (`A-Z0-9`).
///
/// Always normalized to upper-case on construction so equality and lookup
/// never have to consider case.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct RoomCode(String);

impl RoomCode {
    pub const LENGTH: usize = 6;
    const ALPHABET: &'static [u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

    /// Normalize caller input (trim + upper-case) without validating charset;
    /// used for lookups where an unknown code should simply miss, not error.
    #[must_use]
    pub fn normalize(input: &str) -> Self {
        Self(input.trim().to_ascii_uppercase())
    }

    pub fn random(rng: &mut impl rand::Rng) -> Self {
        let code: String = (0..Self::LENGTH)
            .map(|_| {
                let idx = rng.random_range(0..Self::ALPHABET.len());
                Self::ALPHABET[idx] as char
            })
            .collect();
        Self(code)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn random_code_has_fixed_length_and_alphabet() {
        let mut rng = StdRng::seed_from_u64(7);
        let code = RoomCode::random(&mut rng);
        assert_eq!(code.as_str().len(), RoomCode::LENGTH);
        assert!(
            code.as_str()
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
        );
    }

    #[test]
    fn normalize_uppercases_and_trims() {
        assert_eq!(RoomCode::normalize(" ab12cd ").as_str(), "AB12CD");
    }
}
