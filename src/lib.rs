// SPDX-FileCopyrightText: 2026 The Classboard Authors
// SPDX-License-Identifier: LicenseRef-Classboard-Proprietary
//
// All rights reserved.
//
// This file is part of Classboard and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Classboard: UML class diagram editing core.
//!
//! The diagram model and its batched operations, relationship line geometry,
//! reconciliation against a relational store and a debounced editing session.

pub mod auth;
pub mod config;
pub mod geometry;
pub mod model;
pub mod ops;
pub mod session;
pub mod store;
pub mod sync;
