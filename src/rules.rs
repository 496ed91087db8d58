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

//! Action point rules.
//!
//! The registry maps each [`ActionKind`] to its current point value. Values
//! live in data rather than code so they can be tuned without a redeploy;
//! a kind with no configured rule resolves to a fixed default instead of
//! failing.

use crate::action::ActionKind;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// The point value currently associated with an action kind.
///
/// At most one rule is active per kind; the kind is the lookup key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRule {
    pub kind: ActionKind,
    /// Signed point delta applied per event.
    pub points: i64,
    /// Localized display label. Presentation only.
    pub label: String,
}

impl ActionRule {
    /// Creates a rule with the kind's default display label.
    pub fn new(kind: ActionKind, points: i64) -> Self {
        Self {
            kind,
            points,
            label: kind.label().to_string(),
        }
    }

    /// Creates a rule with a custom display label.
    pub fn with_label(kind: ActionKind, points: i64, label: impl Into<String>) -> Self {
        Self {
            kind,
            points,
            label: label.into(),
        }
    }
}

/// Registry of active point rules.
///
/// Reads are concurrent and side-effect free; the administrative write path
/// replaces whole rules via [`RuleRegistry::set`]. The applier only reads.
#[derive(Debug, Default)]
pub struct RuleRegistry {
    rules: DashMap<ActionKind, ActionRule>,
}

impl RuleRegistry {
    /// Point value resolved for a kind with no configured rule.
    ///
    /// Matches the canonical `add_report` value, so a missing configuration
    /// row during rollout of a new kind awards something sane instead of
    /// failing the triggering event.
    pub const DEFAULT_POINTS: i64 = 5;

    /// Creates an empty registry; every kind resolves to the default.
    pub fn new() -> Self {
        Self {
            rules: DashMap::new(),
        }
    }

    /// Creates a registry seeded with the canonical rule table.
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        registry.set(ActionRule::new(ActionKind::Signup, 10));
        registry.set(ActionRule::new(ActionKind::AddReport, 5));
        registry.set(ActionRule::new(ActionKind::DeleteReport, -5));
        registry.set(ActionRule::new(ActionKind::ReportSelected, 20));
        registry
    }

    /// Resolves the current point value for an action kind.
    ///
    /// Falls back to [`Self::DEFAULT_POINTS`] when no rule is configured.
    pub fn resolve(&self, kind: ActionKind) -> i64 {
        self.rules
            .get(&kind)
            .map(|rule| rule.points)
            .unwrap_or(Self::DEFAULT_POINTS)
    }

    /// Returns the configured rule for a kind, if any.
    pub fn get(&self, kind: ActionKind) -> Option<ActionRule> {
        self.rules.get(&kind).map(|rule| rule.value().clone())
    }

    /// Installs or replaces the rule for `rule.kind`.
    pub fn set(&self, rule: ActionRule) {
        self.rules.insert(rule.kind, rule);
    }

    /// Snapshot of all configured rules, in rule-table order.
    pub fn rules(&self) -> Vec<ActionRule> {
        ActionKind::ALL
            .into_iter()
            .filter_map(|kind| self.get(kind))
            .collect()
    }
}
