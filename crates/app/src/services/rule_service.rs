//! Rule service: use-cases for managing the stored rule list.
//!
//! The list is stored as a single document, so every mutation is a
//! read-modify-write of the whole list. Writers are serialised through a
//! mutex; readers always go to the repository.

use std::collections::HashSet;

use tokio::sync::Mutex;

use octoflow_domain::error::{NotFoundError, OctoflowError, ValidationError};
use octoflow_domain::id::RuleId;
use octoflow_domain::rule::{AutomationRule, NewRule, RuleUpdate};
use octoflow_domain::template::find_template;
use octoflow_domain::time;

use crate::ports::{RuleChange, RuleEventPublisher, RuleRepository};

/// Application service for rule CRUD, templates and import/export.
pub struct RuleService<R, P> {
    repo: R,
    publisher: P,
    write_lock: Mutex<()>,
}

impl<R, P> RuleService<R, P>
where
    R: RuleRepository + Send + Sync,
    P: RuleEventPublisher + Send + Sync,
{
    /// Create a new service backed by the given repository and publisher.
    pub fn new(repo: R, publisher: P) -> Self {
        Self {
            repo,
            publisher,
            write_lock: Mutex::new(()),
        }
    }

    /// List all rules in stored order.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn get_rules(&self) -> Result<Vec<AutomationRule>, OctoflowError> {
        self.repo.load_all().await
    }

    /// Look up a rule by id.
    ///
    /// # Errors
    ///
    /// Returns [`OctoflowError::NotFound`] when no rule has `id`, or a
    /// storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn get_rule(&self, id: RuleId) -> Result<AutomationRule, OctoflowError> {
        self.repo
            .load_all()
            .await?
            .into_iter()
            .find(|rule| rule.id == id)
            .ok_or_else(|| not_found(id).into())
    }

    /// Validate and append a new rule.
    ///
    /// # Errors
    ///
    /// Returns [`OctoflowError::Validation`] if invariants fail, or a
    /// storage error from the repository.
    #[tracing::instrument(skip(self, new_rule), fields(rule_name = %new_rule.name))]
    pub async fn create_rule(&self, new_rule: NewRule) -> Result<AutomationRule, OctoflowError> {
        let rule = new_rule.into_rule(time::now())?;

        let _guard = self.write_lock.lock().await;
        let mut rules = self.repo.load_all().await?;
        rules.push(rule.clone());
        self.repo.save_all(&rules).await?;

        self.notify(RuleChange::Created { rule_id: rule.id }).await;
        Ok(rule)
    }

    /// Apply a partial update to an existing rule.
    ///
    /// # Errors
    ///
    /// Returns [`OctoflowError::NotFound`] for an unknown id,
    /// [`OctoflowError::Validation`] if the updated rule is invalid, or a
    /// storage error from the repository.
    #[tracing::instrument(skip(self, update))]
    pub async fn update_rule(
        &self,
        id: RuleId,
        update: RuleUpdate,
    ) -> Result<AutomationRule, OctoflowError> {
        let _guard = self.write_lock.lock().await;
        let mut rules = self.repo.load_all().await?;
        let slot = rules
            .iter_mut()
            .find(|rule| rule.id == id)
            .ok_or_else(|| not_found(id))?;
        let updated = update.apply_to(slot, time::now())?;
        *slot = updated.clone();
        self.repo.save_all(&rules).await?;

        self.notify(RuleChange::Updated { rule_id: id }).await;
        Ok(updated)
    }

    /// Delete a rule by id.
    ///
    /// # Errors
    ///
    /// Returns [`OctoflowError::NotFound`] for an unknown id, or a storage
    /// error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn delete_rule(&self, id: RuleId) -> Result<(), OctoflowError> {
        let _guard = self.write_lock.lock().await;
        let mut rules = self.repo.load_all().await?;
        let before = rules.len();
        rules.retain(|rule| rule.id != id);
        if rules.len() == before {
            return Err(not_found(id).into());
        }
        self.repo.save_all(&rules).await?;

        self.notify(RuleChange::Deleted { rule_id: id }).await;
        Ok(())
    }

    /// Create a rule from the built-in template `key`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnknownTemplate`] for an unknown key, or a
    /// storage error from the repository.
    pub async fn create_from_template(
        &self,
        key: &str,
        created_by: &str,
    ) -> Result<AutomationRule, OctoflowError> {
        let template = find_template(key)?;
        self.create_rule(template.instantiate(created_by)).await
    }

    /// Serialise every rule as a pretty-printed JSON array.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the rules cannot be loaded or serialised.
    pub async fn export_rules(&self) -> Result<String, OctoflowError> {
        let rules = self.repo.load_all().await?;
        serde_json::to_string_pretty(&rules).map_err(|err| OctoflowError::Storage(Box::new(err)))
    }

    /// Import rules from a JSON array.
    ///
    /// With `replace` the stored list becomes exactly the imported one.
    /// Otherwise imported rules overwrite stored rules with the same id and
    /// the rest are appended. Returns the number of imported rules.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidDocument`] when `json` is not a rule
    /// array or repeats a rule id, [`OctoflowError::Validation`] when an imported rule is invalid
    /// (nothing is written in either case), or a storage error.
    #[tracing::instrument(skip(self, json))]
    pub async fn import_rules(&self, json: &str, replace: bool) -> Result<usize, OctoflowError> {
        let imported: Vec<AutomationRule> = serde_json::from_str(json)
            .map_err(|err| ValidationError::InvalidDocument(err.to_string()))?;
        let mut seen = HashSet::with_capacity(imported.len());
        for rule in &imported {
            if !seen.insert(rule.id) {
                return Err(ValidationError::InvalidDocument(format!(
                    "rule id {} appears more than once",
                    rule.id
                ))
                .into());
            }
            rule.validate()?;
        }
        let count = imported.len();

        let _guard = self.write_lock.lock().await;
        let rules = if replace {
            imported
        } else {
            let mut rules = self.repo.load_all().await?;
            for rule in imported {
                match rules.iter_mut().find(|existing| existing.id == rule.id) {
                    Some(existing) => *existing = rule,
                    None => rules.push(rule),
                }
            }
            rules
        };
        self.repo.save_all(&rules).await?;

        self.notify(RuleChange::Imported {
            count,
            replaced: replace,
        })
        .await;
        Ok(count)
    }

    async fn notify(&self, change: RuleChange) {
        if let Err(err) = self.publisher.publish(change).await {
            tracing::warn!(error = %err, "failed to publish rule change");
        }
    }
}

fn not_found(id: RuleId) -> NotFoundError {
    NotFoundError {
        entity: "Rule",
        id: id.to_string(),
    }
}
