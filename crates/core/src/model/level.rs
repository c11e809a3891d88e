use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LevelError {
    #[error("unknown CEFR level: {0}")]
    Unknown(String),
}

//
// ─── LEVEL ────────────────────────────────────────────────────────────────────
//

/// CEFR proficiency band, ordered from beginner to advanced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Level {
    A1,
    A2,
    B1,
    B2,
    C1,
}

impl Level {
    /// All bands in ascending order.
    pub const ALL: [Level; 5] = [Level::A1, Level::A2, Level::B1, Level::B2, Level::C1];

    /// Zero-based position of the band in `Level::ALL`.
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Level::A1 => 0,
            Level::A2 => 1,
            Level::B1 => 2,
            Level::B2 => 3,
            Level::C1 => 4,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Level::A1 => "A1",
            Level::A2 => "A2",
            Level::B1 => "B1",
            Level::B2 => "B2",
            Level::C1 => "C1",
        }
    }

    /// The next band up, or `None` at C1.
    #[must_use]
    pub fn higher(self) -> Option<Level> {
        Self::ALL.get(self.index() + 1).copied()
    }

    /// The next band down, or `None` at A1.
    #[must_use]
    pub fn lower(self) -> Option<Level> {
        self.index().checked_sub(1).map(|i| Self::ALL[i])
    }

    /// Suggest the band for a follow-up round given performance at `self`.
    ///
    /// At least 80% correct moves up one band, under 50% moves down one band,
    /// anything in between stays. The result is clamped to A1..=C1.
    #[must_use]
    pub fn adjusted_for(self, correct: usize, total: usize) -> Level {
        if total == 0 {
            return self;
        }
        #[allow(clippy::cast_precision_loss)]
        let accuracy = correct as f64 / total as f64;
        if accuracy >= 0.8 {
            self.higher().unwrap_or(self)
        } else if accuracy < 0.5 {
            self.lower().unwrap_or(self)
        } else {
            self
        }
    }

    /// Descriptive information shown alongside a result in this band.
    #[must_use]
    pub fn info(self) -> LevelInfo {
        match self {
            Level::A1 => LevelInfo {
                title: "Beginner (A1)",
                description: "You can understand and use familiar everyday expressions and very basic phrases. You can introduce yourself and ask simple questions about personal details.",
                skills: &[
                    "Basic vocabulary",
                    "Simple present tense",
                    "Personal information",
                    "Numbers and time",
                ],
            },
            Level::A2 => LevelInfo {
                title: "Elementary (A2)",
                description: "You can understand sentences and frequently used expressions related to areas of immediate relevance, such as family, shopping and work.",
                skills: &[
                    "Past and future tenses",
                    "Comparatives",
                    "Modal verbs",
                    "Everyday situations",
                ],
            },
            Level::B1 => LevelInfo {
                title: "Intermediate (B1)",
                description: "You can understand the main points of clear standard input on familiar matters regularly encountered in work, school and leisure.",
                skills: &[
                    "Present perfect",
                    "Conditionals",
                    "Passive voice",
                    "Abstract topics",
                ],
            },
            Level::B2 => LevelInfo {
                title: "Upper-Intermediate (B2)",
                description: "You can understand the main ideas of complex text on both concrete and abstract topics, including technical discussions in your field.",
                skills: &[
                    "Complex tenses",
                    "Advanced vocabulary",
                    "Phrasal verbs",
                    "Formal and informal registers",
                ],
            },
            Level::C1 => LevelInfo {
                title: "Advanced (C1)",
                description: "You can understand a wide range of demanding, longer texts and recognise implicit meaning. You can express yourself fluently and spontaneously.",
                skills: &[
                    "Nuanced language",
                    "Complex structures",
                    "Idiomatic expressions",
                    "Professional communication",
                ],
            },
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = LevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A1" => Ok(Level::A1),
            "A2" => Ok(Level::A2),
            "B1" => Ok(Level::B1),
            "B2" => Ok(Level::B2),
            "C1" => Ok(Level::C1),
            _ => Err(LevelError::Unknown(s.to_string())),
        }
    }
}

/// Static description of a CEFR band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LevelInfo {
    pub title: &'static str,
    pub description: &'static str,
    pub skills: &'static [&'static str],
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
