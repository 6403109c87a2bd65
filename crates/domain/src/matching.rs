//! Rule matching: evaluates condition trees against a [`Resource`].
//!
//! Evaluation never fails: a missing field, an uncompilable pattern or an
//! unknown condition type all count as "no match". Every leaf result is
//! XOR-ed with the condition's `negate` flag.

use std::collections::HashMap;

use globset::{GlobBuilder, GlobMatcher};
use regex::{Regex, RegexBuilder};

use crate::resource::{Resource, ReviewState, eq_ignore_case};
use crate::rule::{Condition, ConditionGroup, ConditionKind, ConditionNode, GroupOperator};
use crate::rule::{ComparisonOperator, MAX_CONDITION_DEPTH};
use crate::time::{Timestamp, days_between};

/// Prefix that switches a path/branch pattern from glob to regex syntax.
pub const REGEX_PATTERN_PREFIX: &str = "re:";

/// Evaluates conditions against resources at a fixed instant.
///
/// Pinning `now` keeps the elapsed-days conditions consistent across every
/// rule evaluated in a single run.
#[derive(Debug, Clone, Copy)]
pub struct RuleMatcher {
    now: Timestamp,
}

impl RuleMatcher {
    #[must_use]
    pub fn new(now: Timestamp) -> Self {
        Self { now }
    }

    #[must_use]
    pub fn now(&self) -> Timestamp {
        self.now
    }

    /// Evaluate a single leaf condition, applying `negate`.
    #[must_use]
    pub fn evaluate_condition(&self, condition: &Condition, resource: &Resource) -> bool {
        self.evaluate_kind(&condition.kind, resource) ^ condition.negate
    }

    /// Evaluate a group: AND needs every child, OR needs one.
    ///
    /// An empty AND is `true`, an empty OR is `false`.
    #[must_use]
    pub fn evaluate_group(&self, group: &ConditionGroup, resource: &Resource) -> bool {
        self.evaluate_group_at(group, resource, 1)
    }

    fn evaluate_group_at(&self, group: &ConditionGroup, resource: &Resource, depth: usize) -> bool {
        if depth > MAX_CONDITION_DEPTH {
            tracing::warn!(
                max_depth = MAX_CONDITION_DEPTH,
                "condition tree too deep, treating group as non-matching"
            );
            return false;
        }
        let mut results = group.conditions.iter().map(|node| match node {
            ConditionNode::Condition(condition) => self.evaluate_condition(condition, resource),
            ConditionNode::Group(child) => self.evaluate_group_at(child, resource, depth + 1),
        });
        match group.operator {
            GroupOperator::And => results.all(|matched| matched),
            GroupOperator::Or => results.any(|matched| matched),
        }
    }

    fn evaluate_kind(&self, kind: &ConditionKind, resource: &Resource) -> bool {
        match kind {
            ConditionKind::TitleContains {
                value,
                case_sensitive,
            } => text_contains(&resource.title, value, *case_sensitive),
            ConditionKind::BodyContains {
                value,
                case_sensitive,
            } => resource
                .body
                .as_deref()
                .is_some_and(|body| text_contains(body, value, *case_sensitive)),
            ConditionKind::TitleMatches { pattern, flags } => {
                regex_matches(pattern, flags, &resource.title)
            }
            ConditionKind::BodyMatches { pattern, flags } => resource
                .body
                .as_deref()
                .is_some_and(|body| regex_matches(pattern, flags, body)),
            ConditionKind::HasLabel { label } => resource.has_label(label),
            ConditionKind::AuthorIs { username } => resource
                .author_login()
                .is_some_and(|login| eq_ignore_case(login, username)),
            ConditionKind::AssigneeIs { username } => resource.is_assigned_to(username),
            ConditionKind::FilePathMatches { pattern } => {
                resource.pull_request.as_ref().is_some_and(|pr| {
                    PathPattern::parse_or_warn(pattern)
                        .is_some_and(|p| pr.changed_files.iter().any(|file| p.is_match(file)))
                })
            }
            ConditionKind::BaseBranchMatches { pattern } => {
                resource.pull_request.as_ref().is_some_and(|pr| {
                    PathPattern::parse_or_warn(pattern).is_some_and(|p| p.is_match(&pr.base_branch))
                })
            }
            ConditionKind::HeadBranchMatches { pattern } => {
                resource.pull_request.as_ref().is_some_and(|pr| {
                    PathPattern::parse_or_warn(pattern).is_some_and(|p| p.is_match(&pr.head_branch))
                })
            }
            ConditionKind::IsDraft { value } => resource
                .pull_request
                .as_ref()
                .is_some_and(|pr| pr.draft == *value),
            ConditionKind::ReviewState { state } => resource
                .pull_request
                .as_ref()
                .and_then(|pr| majority_review_state(&pr.reviews))
                .is_some_and(|majority| majority == *state),
            ConditionKind::CreatedDaysAgo { days, operator } => {
                self.days_since(resource.created_at, *days, *operator)
            }
            ConditionKind::UpdatedDaysAgo { days, operator } => {
                self.days_since(resource.updated_at, *days, *operator)
            }
            ConditionKind::Unknown => {
                tracing::warn!("unknown condition type, evaluating to false");
                false
            }
        }
    }

    fn days_since(&self, since: Timestamp, days: u32, operator: ComparisonOperator) -> bool {
        operator.compare(days_between(since, self.now), i64::from(days))
    }
}

/// Evaluate one condition against `resource` as of `now`.
#[must_use]
pub fn evaluate_condition(condition: &Condition, resource: &Resource, now: Timestamp) -> bool {
    RuleMatcher::new(now).evaluate_condition(condition, resource)
}

/// Evaluate a condition tree against `resource` as of `now`.
#[must_use]
pub fn evaluate_group(group: &ConditionGroup, resource: &Resource, now: Timestamp) -> bool {
    RuleMatcher::new(now).evaluate_group(group, resource)
}

fn text_contains(haystack: &str, needle: &str, case_sensitive: bool) -> bool {
    if case_sensitive {
        haystack.contains(needle)
    } else {
        haystack.to_lowercase().contains(&needle.to_lowercase())
    }
}

fn regex_matches(pattern: &str, flags: &str, haystack: &str) -> bool {
    match compile_regex(pattern, flags) {
        Ok(re) => re.is_match(haystack),
        Err(reason) => {
            tracing::warn!(pattern, %reason, "invalid regex in condition, treating as non-match");
            false
        }
    }
}

/// Compile `pattern` honouring JavaScript-style `flags`.
///
/// `i`, `m`, `s` and `x` map to the equivalent regex options; `g`, `u`
/// and `y` have no meaning for a boolean test and are ignored.
///
/// # Errors
///
/// Returns a description of the problem for unknown flags or an invalid pattern.
pub fn compile_regex(pattern: &str, flags: &str) -> Result<Regex, String> {
    let mut builder = RegexBuilder::new(pattern);
    for flag in flags.chars() {
        match flag {
            'i' => builder.case_insensitive(true),
            'm' => builder.multi_line(true),
            's' => builder.dot_matches_new_line(true),
            'x' => builder.ignore_whitespace(true),
            'g' | 'u' | 'y' => &mut builder,
            other => return Err(format!("unsupported regex flag `{other}`")),
        };
    }
    builder.build().map_err(|err| err.to_string())
}

/// A file-path or branch pattern: glob by default, regex with the `re:` prefix.
#[derive(Debug, Clone)]
pub enum PathPattern {
    Glob(GlobMatcher),
    Regex(Regex),
}

impl PathPattern {
    /// Parse a pattern.
    ///
    /// Globs use `/` as a literal separator, so `src/*` does not match
    /// `src/a/b.rs` while `src/**` does.
    ///
    /// # Errors
    ///
    /// Returns a description of the problem when the pattern does not compile.
    pub fn parse(pattern: &str) -> Result<Self, String> {
        if let Some(raw) = pattern.strip_prefix(REGEX_PATTERN_PREFIX) {
            return compile_regex(raw, "").map(Self::Regex);
        }
        GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map(|glob| Self::Glob(glob.compile_matcher()))
            .map_err(|err| err.to_string())
    }

    fn parse_or_warn(pattern: &str) -> Option<Self> {
        match Self::parse(pattern) {
            Ok(parsed) => Some(parsed),
            Err(reason) => {
                tracing::warn!(pattern, %reason, "invalid path pattern in condition, treating as non-match");
                None
            }
        }
    }

    #[must_use]
    pub fn is_match(&self, candidate: &str) -> bool {
        match self {
            Self::Glob(glob) => glob.is_match(candidate),
            Self::Regex(re) => re.is_match(candidate),
        }
    }
}

/// The verdict held by most reviewers, counting each reviewer's latest
/// verdict once.
///
/// Comments and pending reviews do not vote. Ties go to the most
/// conservative verdict: changes requested, then approved, then dismissed.
#[must_use]
pub fn majority_review_state(reviews: &[crate::resource::Review]) -> Option<ReviewState> {
    let mut latest: HashMap<String, (ReviewState, Option<Timestamp>)> = HashMap::new();
    for review in reviews.iter().filter(|r| r.state.is_verdict()) {
        let key = review.reviewer.to_lowercase();
        let replace = match latest.get(&key) {
            None => true,
            Some((_, previous)) => match (previous, review.submitted_at) {
                (Some(prev), Some(current)) => current >= *prev,
                _ => true,
            },
        };
        if replace {
            latest.insert(key, (review.state, review.submitted_at));
        }
    }

    let count = |wanted: ReviewState| latest.values().filter(|(s, _)| *s == wanted).count();
    [
        ReviewState::ChangesRequested,
        ReviewState::Approved,
        ReviewState::Dismissed,
    ]
    .into_iter()
    .map(|state| (state, count(state)))
    .filter(|(_, n)| *n > 0)
    .fold(None, |best: Option<(ReviewState, usize)>, (state, n)| match best {
        Some((_, best_n)) if best_n >= n => best,
        _ => Some((state, n)),
    })
    .map(|(state, _)| state)
}
