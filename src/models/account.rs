// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Player account model.

use serde::{Deserialize, Serialize};

/// Player account stored in Firestore.
///
/// Created the first time any of its characters is seen online.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Game account ID (also used as document ID)
    pub account_id: u64,
}

impl Account {
    pub fn new(account_id: u64) -> Self {
        Self { account_id }
    }

    /// Firestore document ID.
    pub fn doc_id(&self) -> String {
        self.account_id.to_string()
    }
}

impl std::fmt::Display for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.account_id)
    }
}
