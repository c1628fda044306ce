// SPDX-FileCopyrightText: 2026 The Classboard Authors
// SPDX-License-Identifier: LicenseRef-Classboard-Proprietary
//
// All rights reserved.
//
// This file is part of Classboard and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The signed-in user, as seen by the editor.

use crate::model::UserId;

/// Source of the current user id. Only used to stamp ownership on new diagrams.
pub trait Identity {
    fn user_id(&self) -> &UserId;
}

impl Identity for UserId {
    fn user_id(&self) -> &UserId {
        self
    }
}

/// A signed-in user with an optional display email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedInUser {
    user_id: UserId,
    email: Option<String>,
}

impl SignedInUser {
    pub fn new(user_id: UserId) -> Self {
        Self { user_id, email: None }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }
}

impl Identity for SignedInUser {
    fn user_id(&self) -> &UserId {
        &self.user_id
    }
}
