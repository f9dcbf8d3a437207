//! Classification records.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Role a column plays in QA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    /// Identifier, categorical value or business date.
    Dimension,
    /// Numeric, aggregatable value.
    Metric,
    /// System or audit field.
    Excluded,
}

impl Role {
    /// Roles in conflict-resolution order, strongest first.
    ///
    /// A column claimed by several roles keeps the first one listed here, so
    /// an audit field can never leak into dimensions or metrics.
    pub const PRECEDENCE: [Role; 3] = [Role::Excluded, Role::Metric, Role::Dimension];
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dimension => write!(f, "dimension"),
            Self::Metric => write!(f, "metric"),
            Self::Excluded => write!(f, "excluded"),
        }
    }
}

/// The per-table classification document written to `output/<table>.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassificationResult {
    pub table_name: String,
    pub dimension: BTreeSet<String>,
    pub metric: BTreeSet<String>,
    pub excluded: BTreeSet<String>,
    pub reasoning: BTreeMap<String, String>,
}

impl ClassificationResult {
    /// Columns assigned to `role`.
    pub fn role(&self, role: Role) -> &BTreeSet<String> {
        match role {
            Role::Dimension => &self.dimension,
            Role::Metric => &self.metric,
            Role::Excluded => &self.excluded,
        }
    }

    pub(crate) fn role_mut(&mut self, role: Role) -> &mut BTreeSet<String> {
        match role {
            Role::Dimension => &mut self.dimension,
            Role::Metric => &mut self.metric,
            Role::Excluded => &mut self.excluded,
        }
    }

    /// Role of a column, if it was classified.
    pub fn role_of(&self, column: &str) -> Option<Role> {
        Role::PRECEDENCE
            .into_iter()
            .find(|role| self.role(*role).contains(column))
    }
}
