//! # Owner Identifiers
//!
//! Every uploaded image is tagged with the product it belongs to. An existing
//! product passes its own identifier; a product still being created gets a
//! temporary one.
//!
//! Temporary identifiers are random, so they are only generated in the
//! interactive pass (`mount`). The static pass (`render`) must produce the same
//! output every time and therefore never assigns one.

use std::fmt;

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::constants::{TEMP_OWNER_PREFIX, TEMP_OWNER_RANDOM_LEN};
use crate::utils::to_base36;

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum OwnerId {
    /// Identifier of an existing product.
    Persistent(String),
    /// Identifier generated for a product that does not exist yet.
    Temporary(String),
}

impl OwnerId {
    pub fn as_str(&self) -> &str {
        match self {
            OwnerId::Persistent(id) | OwnerId::Temporary(id) => id,
        }
    }

    pub fn is_temporary(&self) -> bool {
        matches!(self, OwnerId::Temporary(_))
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Holds the owner of one creation or edit session.
#[derive(Clone, Debug, Default)]
pub struct OwnerSlot {
    provided: Option<String>,
    temporary: Option<String>,
}

impl OwnerSlot {
    /// Blank provided identifiers count as absent.
    pub fn new(provided: Option<String>) -> Self {
        Self {
            provided: provided
                .map(|id| id.trim().to_string())
                .filter(|id| !id.is_empty()),
            temporary: None,
        }
    }

    /// Static pass: only a provided identifier is visible.
    pub fn render(&self) -> Option<OwnerId> {
        self.provided.clone().map(OwnerId::Persistent)
    }

    /// Interactive pass: assigns a temporary identifier if none was provided.
    /// Later calls keep the first one.
    pub fn mount(&mut self) -> OwnerId {
        if let Some(id) = &self.provided {
            return OwnerId::Persistent(id.clone());
        }
        let id = self.temporary.get_or_insert_with(generate_temp_owner_id);
        OwnerId::Temporary(id.clone())
    }

    /// The active owner, if one is known in the current pass.
    pub fn current(&self) -> Option<OwnerId> {
        match (&self.provided, &self.temporary) {
            (Some(id), _) => Some(OwnerId::Persistent(id.clone())),
            (None, Some(id)) => Some(OwnerId::Temporary(id.clone())),
            (None, None) => None,
        }
    }
}

/// `temp-<unix millis>-<13 base36 chars>`
fn generate_temp_owner_id() -> String {
    let random = to_base36(Uuid::new_v4().as_u128());
    let random: String = random.chars().take(TEMP_OWNER_RANDOM_LEN).collect();
    format!(
        "{}{}-{}",
        TEMP_OWNER_PREFIX,
        Utc::now().timestamp_millis(),
        random
    )
}
