//! The `User` entity: a logical player identity attached to a room.

use serde::{Deserialize, Serialize};

use crate::ids::UserId;

/// A user occupying a room. Created on room create/join and destroyed once
/// removed from every room it occupies; `connected` is toggled exclusively
/// by the connection tracker, never by lifecycle operations directly.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub connected: bool,
}

impl User {
    #[must_use]
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            connected: true,
        }
    }
}
