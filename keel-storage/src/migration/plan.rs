use sea_orm::sea_query::{Index, IntoIden, IntoTableRef, Table};
use sea_orm::{DbBackend, Statement, StatementBuilder};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Direction a migration is run in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => f.write_str("up"),
            Direction::Down => f.write_str("down"),
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            _ => Err(format!("Invalid direction: {}", s)),
        }
    }
}

/// Ordered statements of one migration, rendered for one backend.
///
/// Migrations only describe what to run; the runner decides when and inside
/// which transaction.
#[derive(Debug, Clone)]
pub struct MigrationPlan {
    backend: DbBackend,
    statements: Vec<Statement>,
}

impl MigrationPlan {
    pub fn new(backend: DbBackend) -> Self {
        Self {
            backend,
            statements: Vec::new(),
        }
    }

    pub fn backend(&self) -> DbBackend {
        self.backend
    }

    /// Render and append any sea-query statement
    pub fn push<S: StatementBuilder>(&mut self, statement: &S) -> &mut Self {
        self.statements.push(self.backend.build(statement));
        self
    }

    pub fn drop_table(&mut self, table: impl IntoTableRef) -> &mut Self {
        self.push(&Table::drop().table(table).to_owned())
    }

    pub fn drop_index(&mut self, name: &str, table: impl IntoIden + 'static) -> &mut Self {
        self.push(&Index::drop().name(name).table(table).to_owned())
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// SQL text of every statement, with bound values inlined
    pub fn sql(&self) -> Vec<String> {
        self.statements.iter().map(|s| s.to_string()).collect()
    }

    /// SHA-256 (hex) over the rendered SQL
    pub fn checksum(&self) -> String {
        let mut hasher = Sha256::new();
        for statement in &self.statements {
            hasher.update(statement.to_string().as_bytes());
            hasher.update(b";\n");
        }
        hex::encode(hasher.finalize())
    }
}
