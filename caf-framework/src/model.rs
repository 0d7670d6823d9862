use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The whole framework as scraped in one run.
///
/// Children are kept in source-page order; nothing here sorts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameworkDocument {
    /// URL the document was scraped from, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub objectives: Vec<Objective>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Objective {
    /// Single letter, e.g. `A`.
    pub id: String,
    pub title: String,
    pub description: String,
    pub principles: Vec<Principle>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principle {
    /// Objective letter plus number, e.g. `A1`.
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guidance: Option<String>,
    /// Text of the principle page's `Description` section (crawl mode only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub outcomes: Vec<Outcome>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    /// Principle id plus letter, e.g. `A1.a`.
    pub id: String,
    pub title: String,
    pub description: String,
    /// Every level column of the indicator table, in column order, kept
    /// even when the column holds no statements.
    pub levels: Vec<LevelColumn>,
    pub indicators: Vec<Indicator>,
}

/// One column of an indicator table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelColumn {
    pub level: AchievementLevel,
    /// Sentence under the level header, e.g. "All the following statements are true".
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub qualifier: String,
}

/// One Indicator of Good Practice statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Indicator {
    pub level: AchievementLevel,
    pub text: String,
}

/// Achievement level column an indicator belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AchievementLevel {
    Achieved,
    PartiallyAchieved,
    NotAchieved,
}

impl AchievementLevel {
    pub const ALL: [AchievementLevel; 3] = [
        AchievementLevel::Achieved,
        AchievementLevel::PartiallyAchieved,
        AchievementLevel::NotAchieved,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AchievementLevel::Achieved => "achieved",
            AchievementLevel::PartiallyAchieved => "partially-achieved",
            AchievementLevel::NotAchieved => "not-achieved",
        }
    }

    /// Map a table header such as `Not Achieved` or `Partially achieved`.
    ///
    /// ```
    /// use caf_framework::AchievementLevel;
    ///
    /// assert_eq!(
    ///     AchievementLevel::from_header(" Not  Achieved "),
    ///     Some(AchievementLevel::NotAchieved)
    /// );
    /// assert_eq!(AchievementLevel::from_header("Exceeded"), None);
    /// ```
    pub fn from_header(header: &str) -> Option<Self> {
        let key = header
            .split(|c: char| c.is_whitespace() || c == '-')
            .filter(|part| !part.is_empty())
            .map(str::to_ascii_lowercase)
            .collect::<Vec<_>>()
            .join("-");
        Self::ALL.into_iter().find(|level| level.as_str() == key)
    }
}

impl fmt::Display for AchievementLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Outcome {
    pub fn indicators_at(&self, level: AchievementLevel) -> impl Iterator<Item = &Indicator> {
        self.indicators.iter().filter(move |i| i.level == level)
    }

    /// Whether the indicator table had a column for `level`, empty or not.
    pub fn has_level(&self, level: AchievementLevel) -> bool {
        self.levels.iter().any(|c| c.level == level)
    }
}

/// Node totals per level, used for logging and fixture checks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts {
    pub objectives: usize,
    pub principles: usize,
    pub outcomes: usize,
    pub indicators: usize,
}

impl FrameworkDocument {
    pub fn new(objectives: Vec<Objective>) -> Self {
        Self {
            source: None,
            objectives,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn counts(&self) -> Counts {
        let mut counts = Counts {
            objectives: self.objectives.len(),
            ..Counts::default()
        };
        for objective in &self.objectives {
            counts.principles += objective.principles.len();
            for principle in &objective.principles {
                counts.outcomes += principle.outcomes.len();
                counts.indicators += principle
                    .outcomes
                    .iter()
                    .map(|o| o.indicators.len())
                    .sum::<usize>();
            }
        }
        counts
    }

    /// First identifier that repeats within its parent's scope, if any.
    pub fn find_duplicate_id(&self) -> Option<&str> {
        first_duplicate(self.objectives.iter().map(|o| o.id.as_str()))
            .or_else(|| {
                self.objectives.iter().find_map(|o| {
                    first_duplicate(o.principles.iter().map(|p| p.id.as_str()))
                })
            })
            .or_else(|| {
                self.objectives
                    .iter()
                    .flat_map(|o| &o.principles)
                    .find_map(|p| first_duplicate(p.outcomes.iter().map(|oc| oc.id.as_str())))
            })
    }
}

fn first_duplicate<'a>(ids: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    let mut seen = HashSet::new();
    ids.into_iter().find(|id| !seen.insert(*id))
}
