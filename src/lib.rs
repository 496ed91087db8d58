// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! # Point Ledger
//!
//! This library provides an action point ledger for user activity tracking:
//! named user behaviors (signing up, filing a report, deleting a report,
//! having a report selected) earn or cost points according to a tunable
//! rule table, and every award is recorded in an append-only event ledger.
//!
//! ## Core Components
//!
//! - [`RuleRegistry`]: maps each [`ActionKind`] to its current point value,
//!   with a fixed default for unconfigured kinds
//! - [`Ledger`]: append-only event log, the source of truth for balances
//! - [`Engine`]: applies actions - resolve rule, append entry, increment
//!   the cached balance - as one unit of work per user
//!
//! ## Example
//!
//! ```
//! use point_ledger::{ActionKind, Engine, RuleRegistry, UserId};
//! use std::sync::Arc;
//!
//! let engine = Engine::new(Arc::new(RuleRegistry::with_defaults()));
//!
//! // A new user signs up and files a report.
//! engine.signup(UserId(1)).unwrap();
//! let applied = engine.apply(UserId(1), ActionKind::AddReport).unwrap();
//! assert_eq!(applied.total_points, 15);
//!
//! // The ledger is the source of truth for the cached balance.
//! assert_eq!(engine.recompute_balance(UserId(1)).unwrap(), 15);
//! ```
//!
//! ## Thread Safety
//!
//! The engine handles concurrent access to accounts, allowing actions to be
//! applied in parallel for different users while per-user increments stay
//! serialized.

pub mod account;
mod action;
mod base;
mod engine;
pub mod error;
pub mod ledger;
mod rules;

pub use account::Account;
pub use action::ActionKind;
pub use base::{EntryId, UserId};
pub use engine::{Applied, Engine};
pub use error::PointError;
pub use ledger::{Ledger, LedgerEntry, LedgerStore, MemoryStore};
pub use rules::{ActionRule, RuleRegistry};
