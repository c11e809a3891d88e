use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;

use tracing::{info, warn};

use proficiency_core::model::{
    Level, Question, QuestionDraft, QuestionId, QuestionKind, QuestionSlot,
};

use crate::ai::{ProficiencyGenerator, ReadingExercise};
use crate::error::AiError;

use super::plan::GenerationPlan;

/// Why remote generation gave up and the static bank should be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FallbackReason {
    QuotaExceeded,
    Disabled,
    NothingGenerated,
}

impl FallbackReason {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            FallbackReason::QuotaExceeded => "quota exceeded",
            FallbackReason::Disabled => "generator disabled",
            FallbackReason::NothingGenerated => "no questions generated",
        }
    }
}

/// Await a remote call, failing with `AiError::Timeout` past `deadline`.
pub(crate) async fn with_deadline<T, F>(deadline: Duration, call: F) -> Result<T, AiError>
where
    F: Future<Output = Result<T, AiError>>,
{
    tokio::time::timeout(deadline, call)
        .await
        .unwrap_or(Err(AiError::Timeout))
}

/// Request every level in `plan` sequentially and validate what comes back.
///
/// Grammar questions come first in level order, then reading questions.
/// A failed level is skipped; a quota or disabled failure stops at once.
pub(crate) async fn generate_questions(
    generator: &dyn ProficiencyGenerator,
    plan: &GenerationPlan,
) -> Result<Vec<Question>, FallbackReason> {
    let mut grammar = Vec::new();
    for &level in &plan.grammar_levels {
        let call = generator.generate_grammar_questions(level, plan.grammar_per_level);
        match with_deadline(plan.call_deadline, call).await {
            Ok(drafts) => {
                let accepted = accept_grammar(level, drafts, plan.grammar_per_level);
                info!(%level, kind = "grammar", count = accepted.len(), "level generated");
                grammar.extend(accepted);
            }
            Err(err) => check_abort(level, QuestionKind::Grammar, &err)?,
        }
    }

    let mut reading = ReadingCollector::default();
    for &level in &plan.reading_levels {
        let call = generator.generate_reading_exercises(level, plan.passages_per_level);
        match with_deadline(plan.call_deadline, call).await {
            Ok(exercises) => reading.accept(level, exercises),
            Err(err) => check_abort(level, QuestionKind::Reading, &err)?,
        }
    }

    let short = reading.questions.len() < plan.reading_target;
    if let Some(level) = plan.reading_top_up.filter(|_| short) {
        info!(
            %level,
            have = reading.questions.len(),
            target = plan.reading_target,
            "topping up reading questions"
        );
        let call = generator.generate_reading_exercises(level, 1);
        match with_deadline(plan.call_deadline, call).await {
            Ok(exercises) => reading.accept(level, exercises),
            Err(err) => check_abort(level, QuestionKind::Reading, &err)?,
        }
    }

    let mut reading = reading.questions;
    reading.truncate(plan.reading_target);

    let mut questions = grammar;
    questions.extend(reading);
    if questions.is_empty() {
        return Err(FallbackReason::NothingGenerated);
    }
    Ok(questions)
}

fn check_abort(level: Level, kind: QuestionKind, err: &AiError) -> Result<(), FallbackReason> {
    if err.is_quota_exceeded() {
        warn!(%level, %kind, "quota exceeded, abandoning remote generation");
        return Err(FallbackReason::QuotaExceeded);
    }
    if matches!(err, AiError::Disabled) {
        return Err(FallbackReason::Disabled);
    }
    warn!(%level, %kind, error = %err, "level generation failed, skipping");
    Ok(())
}

fn accept_grammar(level: Level, drafts: Vec<QuestionDraft>, limit: usize) -> Vec<Question> {
    let mut accepted = Vec::new();
    for draft in drafts {
        if accepted.len() == limit {
            break;
        }
        let slot = QuestionSlot {
            id: QuestionId::new(format!("grammar-{level}-{}", accepted.len() + 1)),
            kind: QuestionKind::Grammar,
            level,
            passage: None,
        };
        match draft.validate(slot) {
            Ok(question) => accepted.push(question),
            Err(err) => warn!(%level, kind = "grammar", error = %err, "dropping invalid question"),
        }
    }
    accepted
}

#[derive(Default)]
struct ReadingCollector {
    questions: Vec<Question>,
    per_level: BTreeMap<Level, usize>,
}

impl ReadingCollector {
    fn accept(&mut self, level: Level, exercises: Vec<ReadingExercise>) {
        let before = self.questions.len();
        for exercise in exercises {
            let passage = exercise.passage.trim();
            if passage.is_empty() {
                warn!(%level, "dropping reading exercise without passage");
                continue;
            }
            for draft in exercise.questions {
                let n = self.per_level.entry(level).or_default();
                let slot = QuestionSlot {
                    id: QuestionId::new(format!("reading-{level}-{}", *n + 1)),
                    kind: QuestionKind::Reading,
                    level,
                    passage: Some(passage.to_string()),
                };
                match draft.validate(slot) {
                    Ok(question) => {
                        *n += 1;
                        self.questions.push(question);
                    }
                    Err(err) => {
                        warn!(%level, kind = "reading", error = %err, "dropping invalid question");
                    }
                }
            }
        }
        info!(
            %level,
            kind = "reading",
            count = self.questions.len() - before,
            "level generated"
        );
    }
}
