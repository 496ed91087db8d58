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

//! Trackable user actions.
//!
//! The closed set of behaviors that earn or cost points. Raw strings are
//! validated at the boundary ([`FromStr`], serde); inside the crate an
//! action is always one of these variants.

use crate::error::PointError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A point-worthy user behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Signup,
    AddReport,
    DeleteReport,
    ReportSelected,
}

impl ActionKind {
    /// Every action kind, in rule-table order.
    pub const ALL: [ActionKind; 4] = [
        ActionKind::Signup,
        ActionKind::AddReport,
        ActionKind::DeleteReport,
        ActionKind::ReportSelected,
    ];

    /// Canonical wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Signup => "signup",
            Self::AddReport => "add_report",
            Self::DeleteReport => "delete_report",
            Self::ReportSelected => "report_selected",
        }
    }

    /// Localized display label. Presentation only, no behavioral effect.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Signup => "회원가입",
            Self::AddReport => "제보 등록",
            Self::DeleteReport => "제보 삭제",
            Self::ReportSelected => "승인된 제보",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = PointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "signup" => Ok(Self::Signup),
            "add_report" => Ok(Self::AddReport),
            "delete_report" => Ok(Self::DeleteReport),
            "report_selected" => Ok(Self::ReportSelected),
            _ => Err(PointError::InvalidActionKind),
        }
    }
}
