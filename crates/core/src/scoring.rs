//! Local scoring of a completed test.
//!
//! The proficiency band comes from a weighted composite of overall, grammar and
//! reading accuracy, then may drop one band when the learner did poorly on the
//! questions written for that band.

use std::collections::BTreeMap;

use crate::model::{CategoryStats, Choice, Level, Question, QuestionKind, ScoreResult, TopicStats};

const OVERALL_WEIGHT: f64 = 0.40;
const GRAMMAR_WEIGHT: f64 = 0.35;
const READING_WEIGHT: f64 = 0.25;

/// Exclusive upper composite bound for each band below C1.
const BAND_UPPER_BOUNDS: [(Level, f64); 4] = [
    (Level::A1, 0.45),
    (Level::A2, 0.60),
    (Level::B1, 0.75),
    (Level::B2, 0.85),
];

/// Own-band accuracy below this demotes the result one band.
const DEMOTION_THRESHOLD: f64 = 0.5;

/// Topic accuracy below this counts as a weak area.
pub const WEAK_TOPIC_THRESHOLD: f64 = 0.7;

/// Score `answers` against `questions` position by position.
///
/// Deterministic and total: a missing or unset answer is simply wrong, and an
/// empty test scores 0% at A1.
#[must_use]
pub fn calculate_results(answers: &[Option<Choice>], questions: &[Question]) -> ScoreResult {
    let mut total_correct = 0_usize;
    let mut grammar = (0_usize, 0_usize);
    let mut reading = (0_usize, 0_usize);
    let mut topics: BTreeMap<String, (usize, usize)> = BTreeMap::new();
    let mut levels: BTreeMap<Level, (usize, usize)> = BTreeMap::new();

    for (index, question) in questions.iter().enumerate() {
        let answer = answers.get(index).copied().flatten();
        let hit = usize::from(question.is_correct(answer));
        total_correct += hit;

        let bucket = match question.kind() {
            QuestionKind::Grammar => &mut grammar,
            QuestionKind::Reading => &mut reading,
        };
        bucket.0 += hit;
        bucket.1 += 1;

        let topic = topics.entry(question.topic().to_string()).or_default();
        topic.0 += hit;
        topic.1 += 1;

        let level = levels.entry(question.level()).or_default();
        level.0 += hit;
        level.1 += 1;
    }

    let total_questions = questions.len();
    let overall = CategoryStats::from_counts(total_correct, total_questions);
    let grammar = CategoryStats::from_counts(grammar.0, grammar.1);
    let reading = CategoryStats::from_counts(reading.0, reading.1);
    let per_level: BTreeMap<Level, CategoryStats> = levels
        .into_iter()
        .map(|(level, (c, t))| (level, CategoryStats::from_counts(c, t)))
        .collect();
    let per_topic = topics
        .into_iter()
        .map(|(topic, (c, t))| (topic, TopicStats::from_counts(c, t)))
        .collect();

    let composite_score = composite(overall.ratio(), &grammar, &reading);
    let level = demote_if_weak(band_for(composite_score), &per_level);

    ScoreResult {
        total_correct,
        total_questions,
        accuracy_percent: overall.accuracy_percent,
        composite_score,
        level,
        grammar,
        reading,
        per_topic,
        per_level,
    }
}

/// Weighted composite of overall accuracy and the rounded category accuracies.
fn composite(overall: f64, grammar: &CategoryStats, reading: &CategoryStats) -> f64 {
    let grammar = f64::from(grammar.accuracy_percent) / 100.0;
    let reading = f64::from(reading.accuracy_percent) / 100.0;
    overall * OVERALL_WEIGHT + grammar * GRAMMAR_WEIGHT + reading * READING_WEIGHT
}

/// Map a composite score to its band; anything at or above 0.85 is C1.
#[must_use]
pub fn band_for(composite: f64) -> Level {
    BAND_UPPER_BOUNDS
        .iter()
        .find(|(_, upper)| composite < *upper)
        .map_or(Level::C1, |(level, _)| *level)
}

fn demote_if_weak(level: Level, per_level: &BTreeMap<Level, CategoryStats>) -> Level {
    match per_level.get(&level) {
        Some(stats) if stats.total > 0 && stats.ratio() < DEMOTION_THRESHOLD => {
            level.lower().unwrap_or(level)
        }
        _ => level,
    }
}

/// Count of correct positions; the cheap path when only the total matters.
#[must_use]
pub fn count_correct(answers: &[Option<Choice>], questions: &[Question]) -> usize {
    questions
        .iter()
        .enumerate()
        .filter(|(i, q)| q.is_correct(answers.get(*i).copied().flatten()))
        .count()
}

/// Study suggestions for a topic, with a generic fallback for unknown topics.
#[must_use]
pub fn topic_recommendations(topic: &str) -> &'static [&'static str] {
    match topic {
        "Present Simple" => &[
            "Practice verb conjugation with third person singular",
            "Review question and negative forms",
            "Focus on frequency adverb placement",
        ],
        "Past Simple" | "Past Tense" => &[
            "Study irregular verb forms",
            "Practice past simple vs past continuous",
            "Review time expressions for past events",
        ],
        "Present Perfect" => &[
            "Contrast past simple with present perfect",
            "Practice with already, yet, just, ever and never",
            "Focus on life experiences and recent events",
        ],
        "Conditionals" | "First Conditional" => &[
            "Study the structure of zero, first and second conditionals",
            "Practice hypothetical situations",
            "Review if/unless clause patterns",
        ],
        "Passive Voice" | "Future Passive" => &[
            "Practice converting active sentences to passive",
            "Focus on when passive constructions are natural",
            "Study passive forms across tenses",
        ],
        "Vocabulary" => &[
            "Build word families and collocations",
            "Practice synonyms and antonyms",
            "Use context clues while reading",
        ],
        "Main Idea" | "Detail Comprehension" | "Inference" | "Tone and Attitude"
        | "Reading Comprehension" => &[
            "Practice skimming and scanning techniques",
            "Separate main ideas from supporting details",
            "Work on inference and implied meaning",
        ],
        _ => &[
            "Review the fundamentals of this topic",
            "Practice with additional exercises",
            "Ask a teacher or tutor for targeted feedback",
        ],
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
