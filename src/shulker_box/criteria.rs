//! Match specification: which instances a shulker box applies to.
//!
//! Each category holds typed criteria. An exclusion that hits the instance fails the
//! category outright; otherwise the category passes when it is empty, has no
//! inclusions, contains the wildcard, or has an inclusion that hits.

use crate::error::ChestError;
use crate::instance::Side;
use globset::{GlobBuilder, GlobMatcher};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One entry of a category.
#[derive(Debug, Clone)]
pub enum Criterion<T> {
    /// `*`: matches anything
    Any,
    Include(T),
    /// `!value`
    Exclude(T),
}

/// A set of criteria for one category. Empty matches everything.
#[derive(Debug, Clone)]
pub struct Category<T> {
    criteria: Vec<Criterion<T>>,
}

impl<T> Default for Category<T> {
    fn default() -> Self {
        Self {
            criteria: Vec::new(),
        }
    }
}

impl<T> Category<T> {
    pub fn new(criteria: Vec<Criterion<T>>) -> Self {
        Self { criteria }
    }

    pub fn criteria(&self) -> &[Criterion<T>] {
        &self.criteria
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    /// Evaluate this category given a predicate that says whether a value hits the
    /// instance.
    pub fn evaluate(&self, hits: impl Fn(&T) -> bool) -> bool {
        if self.criteria.is_empty() {
            return true;
        }

        let mut has_inclusion = false;
        let mut included = false;
        for criterion in &self.criteria {
            match criterion {
                Criterion::Exclude(value) => {
                    if hits(value) {
                        return false;
                    }
                }
                Criterion::Any => {
                    has_inclusion = true;
                    included = true;
                }
                Criterion::Include(value) => {
                    has_inclusion = true;
                    if !included && hits(value) {
                        included = true;
                    }
                }
            }
        }

        !has_inclusion || included
    }
}

/// A string value: literal or glob.
#[derive(Debug, Clone)]
pub enum ValuePattern {
    Literal { value: String, case_sensitive: bool },
    Glob { source: String, matcher: GlobMatcher },
}

impl ValuePattern {
    pub fn parse(raw: &str, case_sensitive: bool) -> Result<Self, ChestError> {
        let raw = raw.trim();
        if raw.contains(['*', '?', '[', '{']) {
            let glob = GlobBuilder::new(raw)
                .case_insensitive(!case_sensitive)
                .literal_separator(false)
                .build()
                .map_err(|e| ChestError::Config(format!("Invalid pattern '{}': {}", raw, e)))?;
            Ok(ValuePattern::Glob {
                source: raw.to_string(),
                matcher: glob.compile_matcher(),
            })
        } else {
            Ok(ValuePattern::Literal {
                value: raw.to_string(),
                case_sensitive,
            })
        }
    }

    pub fn is_match(&self, candidate: &str) -> bool {
        let candidate = candidate.trim();
        match self {
            ValuePattern::Literal {
                value,
                case_sensitive: true,
            } => value == candidate,
            ValuePattern::Literal { value, .. } => value.eq_ignore_ascii_case(candidate),
            ValuePattern::Glob { matcher, .. } => matcher.is_match(candidate),
        }
    }
}

impl fmt::Display for ValuePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValuePattern::Literal { value, .. } => write!(f, "{}", value),
            ValuePattern::Glob { source, .. } => write!(f, "{}", source),
        }
    }
}

impl<T: fmt::Display> fmt::Display for Criterion<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Criterion::Any => f.write_str("*"),
            Criterion::Include(value) => write!(f, "{}", value),
            Criterion::Exclude(value) => write!(f, "!{}", value),
        }
    }
}

/// The `[match]` table of a shulker box file, as written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSection {
    #[serde(default, alias = "instance")]
    pub instances: Vec<String>,
    #[serde(default, alias = "tag")]
    pub tags: Vec<String>,
    #[serde(default, alias = "version", alias = "versions")]
    pub minecraft: Vec<String>,
    #[serde(default, alias = "loaders", alias = "modloader")]
    pub loader: Vec<String>,
    #[serde(default)]
    pub server: Vec<String>,
}

/// Parsed match specification of a shulker box.
#[derive(Debug, Clone, Default)]
pub struct MatchSpecification {
    pub instances: Category<ValuePattern>,
    pub tags: Category<ValuePattern>,
    pub versions: Category<ValuePattern>,
    pub loaders: Category<ValuePattern>,
    pub side: Category<Side>,
}

impl MatchSpecification {
    /// The "global" specification: matches every instance.
    pub fn global() -> Self {
        Self::default()
    }

    pub fn parse(section: &MatchSection) -> Result<Self, ChestError> {
        Ok(Self {
            instances: parse_category(&section.instances, |v| ValuePattern::parse(v, true))?,
            tags: parse_category(&section.tags, |v| ValuePattern::parse(v, false))?,
            versions: parse_category(&section.minecraft, |v| ValuePattern::parse(v, false))?,
            loaders: parse_category(&section.loader, |v| {
                ValuePattern::parse(&crate::instance::normalize_loader(v), false)
            })?,
            side: parse_category(&section.server, parse_side)?,
        })
    }

    /// Render back to the written form (used by inventory output).
    pub fn to_section(&self) -> MatchSection {
        fn render<T: fmt::Display>(category: &Category<T>) -> Vec<String> {
            category.criteria().iter().map(|c| c.to_string()).collect()
        }
        MatchSection {
            instances: render(&self.instances),
            tags: render(&self.tags),
            minecraft: render(&self.versions),
            loader: render(&self.loaders),
            server: render(&self.side),
        }
    }

    pub fn is_global(&self) -> bool {
        self.instances.is_empty()
            && self.tags.is_empty()
            && self.versions.is_empty()
            && self.loaders.is_empty()
            && self.side.is_empty()
    }
}

fn parse_category<T>(
    raw: &[String],
    parse_value: impl Fn(&str) -> Result<T, ChestError>,
) -> Result<Category<T>, ChestError> {
    let mut criteria = Vec::with_capacity(raw.len());
    for entry in raw {
        let entry = entry.trim();
        if entry == "*" {
            criteria.push(Criterion::Any);
            continue;
        }
        let (negated, value) = match entry.strip_prefix('!') {
            Some(rest) => (true, rest.trim()),
            None => (false, entry),
        };
        if value.is_empty() {
            return Err(ChestError::Config(format!(
                "Empty match value '{}'",
                entry
            )));
        }
        let parsed = parse_value(value)?;
        criteria.push(if negated {
            Criterion::Exclude(parsed)
        } else {
            Criterion::Include(parsed)
        });
    }
    Ok(Category::new(criteria))
}

fn parse_side(value: &str) -> Result<Side, ChestError> {
    match value.to_lowercase().as_str() {
        "server" | "servers" => Ok(Side::Server),
        "client" | "clients" => Ok(Side::Client),
        other => Err(ChestError::Config(format!(
            "Unknown server match value '{}' (expected 'server' or 'client')",
            other
        ))),
    }
}
