//! `SQLite` implementation of [`RuleRepository`].
//!
//! The whole rule list is one JSON array stored under [`RULES_KEY`].

use sqlx::SqlitePool;

use octoflow_app::ports::RuleRepository;
use octoflow_domain::error::OctoflowError;
use octoflow_domain::rule::AutomationRule;

use crate::error::StorageError;

/// Key of the rule list document.
pub const RULES_KEY: &str = "automationRules";

/// `SQLite`-backed rule repository.
pub struct SqliteRuleRepository {
    pool: SqlitePool,
}

impl SqliteRuleRepository {
    /// Create a new repository backed by the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn read_document(&self) -> Result<Option<String>, StorageError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM kv_store WHERE key = ?")
            .bind(RULES_KEY)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(value,)| value))
    }

    async fn write_document(&self, value: &str) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO kv_store (key, value) VALUES (?, ?) ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(RULES_KEY)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

impl RuleRepository for SqliteRuleRepository {
    async fn load_all(&self) -> Result<Vec<AutomationRule>, OctoflowError> {
        let Some(document) = self.read_document().await? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&document) {
            Ok(rules) => Ok(rules),
            Err(err) => {
                tracing::warn!(key = RULES_KEY, error = %err, "stored rules are corrupt, resetting to an empty list");
                self.write_document("[]").await?;
                Ok(Vec::new())
            }
        }
    }

    async fn save_all(&self, rules: &[AutomationRule]) -> Result<(), OctoflowError> {
        let document = serde_json::to_string(rules).map_err(StorageError::from)?;
        self.write_document(&document).await?;
        Ok(())
    }
}
