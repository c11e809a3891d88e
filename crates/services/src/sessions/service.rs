use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use proficiency_core::model::{Choice, Question, QuestionKind, Report, SessionId};
use proficiency_core::scoring::calculate_results;
use proficiency_core::{Clock, StaticQuestionBank};

use crate::ai::{ProficiencyGenerator, ReportRequest};
use crate::error::SessionError;

use super::generation::{generate_questions, with_deadline};
use super::outcome::{ReportStatus, TestOutcome, placeholder_report};
use super::plan::GenerationPlan;
use super::progress::{TestProgress, TestStatistics};
use super::snapshot::SessionSnapshot;
use super::state::{GeneratingGuard, SessionState};

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One learner's pass through a proficiency test.
///
/// Questions come from the remote generator when it cooperates and from the
/// static bank otherwise. `answers` always has one slot per question.
pub struct TestSession {
    id: SessionId,
    generator: Arc<dyn ProficiencyGenerator>,
    bank: Arc<StaticQuestionBank>,
    clock: Clock,
    plan: GenerationPlan,
    state: SessionState,
    questions: Vec<Question>,
    answers: Vec<Option<Choice>>,
    current: usize,
    offline: bool,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
}

impl TestSession {
    #[must_use]
    pub fn new(
        generator: Arc<dyn ProficiencyGenerator>,
        bank: Arc<StaticQuestionBank>,
        clock: Clock,
    ) -> Self {
        Self {
            id: SessionId::generate(),
            generator,
            bank,
            clock,
            plan: GenerationPlan::default(),
            state: SessionState::Uninitialized,
            questions: Vec::new(),
            answers: Vec::new(),
            current: 0,
            offline: false,
            started_at: None,
            ended_at: None,
        }
    }

    #[must_use]
    pub fn with_plan(mut self, plan: GenerationPlan) -> Self {
        self.plan = plan;
        self
    }

    #[must_use]
    pub fn session_id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn plan(&self) -> &GenerationPlan {
        &self.plan
    }

    /// Mutable access to the clock, e.g. to advance a fixed clock.
    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn answers(&self) -> &[Option<Choice>] {
        &self.answers
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Whether the current test came from the static bank.
    #[must_use]
    pub fn is_offline(&self) -> bool {
        self.offline
    }

    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    #[must_use]
    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    /// Drop all test data and return to `Uninitialized`.
    pub fn reset(&mut self) {
        self.state = SessionState::Uninitialized;
        self.questions.clear();
        self.answers.clear();
        self.current = 0;
        self.offline = false;
        self.started_at = None;
        self.ended_at = None;
    }

    /// Build a new test and make it active.
    ///
    /// Remote levels are requested one at a time. If nothing usable comes back,
    /// or the generator reports an exhausted quota, the static bank is used and
    /// the session is marked offline.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidState` unless the session is uninitialized
    /// or completed, and `SessionError::Empty` if no questions could be loaded.
    pub async fn generate_test(&mut self) -> Result<(), SessionError> {
        if !self.state.can_generate() {
            return Err(self.invalid("generate a test"));
        }

        // Nothing but the state changes until generation has finished.
        let generated = {
            let _generating = GeneratingGuard::enter(&mut self.state);
            generate_questions(self.generator.as_ref(), &self.plan).await
        };
        let (questions, offline) = match generated {
            Ok(questions) => (questions, false),
            Err(reason) => {
                warn!(reason = reason.as_str(), "using static question bank");
                (self.bank.questions().to_vec(), true)
            }
        };

        if questions.is_empty() {
            return Err(SessionError::Empty);
        }

        self.reset();
        self.answers = vec![None; questions.len()];
        self.questions = questions;
        self.offline = offline;
        self.started_at = Some(self.clock.now());
        self.state = SessionState::Active;

        info!(
            session = %self.id,
            count = self.questions.len(),
            offline,
            "test ready"
        );
        Ok(())
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current)
    }

    #[must_use]
    pub fn answer_at(&self, index: usize) -> Option<Choice> {
        self.answers.get(index).copied().flatten()
    }

    #[must_use]
    pub fn is_current_answered(&self) -> bool {
        self.answer_at(self.current).is_some()
    }

    /// Record `choice` for the current question, replacing any earlier answer.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidState` outside the active state and
    /// `SessionError::NoCurrentQuestion` if the index is out of range.
    pub fn answer_question(&mut self, choice: Choice) -> Result<(), SessionError> {
        if self.state != SessionState::Active {
            return Err(self.invalid("answer a question"));
        }
        let slot = self
            .answers
            .get_mut(self.current)
            .ok_or(SessionError::NoCurrentQuestion)?;
        *slot = Some(choice);
        Ok(())
    }

    /// Move to the next question. Returns `false` at the last question.
    pub fn next_question(&mut self) -> bool {
        if self.current + 1 < self.questions.len() {
            self.current += 1;
            true
        } else {
            false
        }
    }

    /// Move to the previous question. Returns `false` at the first question.
    pub fn previous_question(&mut self) -> bool {
        if self.current > 0 {
            self.current -= 1;
            true
        } else {
            false
        }
    }

    /// Whether every question has an answer.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.answers.iter().all(Option::is_some)
    }

    #[must_use]
    pub fn progress(&self) -> TestProgress {
        let answered = self.answers.iter().filter(|a| a.is_some()).count();
        TestProgress::new(self.current, self.questions.len(), answered)
    }

    #[must_use]
    pub fn statistics(&self) -> TestStatistics {
        let mut level_distribution = BTreeMap::new();
        let mut grammar = 0;
        for q in &self.questions {
            *level_distribution.entry(q.level()).or_insert(0) += 1;
            if q.kind() == QuestionKind::Grammar {
                grammar += 1;
            }
        }
        TestStatistics {
            total: self.questions.len(),
            grammar,
            reading: self.questions.len() - grammar,
            level_distribution,
            progress: self.progress(),
        }
    }

    /// Score the test and attach a report.
    ///
    /// Offline tests get the static bank's local report. Otherwise the remote
    /// report is requested; if that fails the outcome carries a placeholder
    /// report and `ai_limited()` is true.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidState` outside the active state and
    /// `SessionError::Incomplete` while questions are unanswered.
    pub async fn finish_test(&mut self) -> Result<TestOutcome, SessionError> {
        if self.state != SessionState::Active {
            return Err(self.invalid("finish the test"));
        }
        if !self.is_complete() {
            let unanswered = self.answers.iter().filter(|a| a.is_none()).count();
            return Err(SessionError::Incomplete { unanswered });
        }

        let completed_at = self.clock.now();
        let started_at = self.started_at.unwrap_or(completed_at);

        let (score, report, status) = if self.offline {
            let offline = self.bank.offline_report(&self.answers, &self.questions);
            (offline.score, offline.report, ReportStatus::Offline)
        } else {
            let score = calculate_results(&self.answers, &self.questions);
            let request = ReportRequest::from_score(&score);
            let call = self.generator.generate_learning_report(&request);
            match with_deadline(self.plan.call_deadline, call).await {
                Ok(report) if !report.is_empty() => (score, report, ReportStatus::Generated),
                Ok(_) => {
                    warn!(session = %self.id, "learning report came back empty");
                    let report = placeholder_report(&score, ReportStatus::Unavailable);
                    (score, report, ReportStatus::Unavailable)
                }
                Err(err) => {
                    let status = if err.is_quota_exceeded() {
                        ReportStatus::AiLimited
                    } else {
                        ReportStatus::Unavailable
                    };
                    warn!(session = %self.id, error = %err, "learning report failed");
                    let report = placeholder_report(&score, status);
                    (score, report, status)
                }
            }
        };

        self.ended_at = Some(completed_at);
        self.state = SessionState::Completed;

        info!(
            session = %self.id,
            correct = score.total_correct,
            total = score.total_questions,
            level = %score.level,
            status = ?status,
            "test finished"
        );

        Ok(TestOutcome {
            score,
            report,
            status,
            started_at,
            completed_at,
            duration: completed_at - started_at,
        })
    }

    /// Translate a report to Turkish through the remote generator.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Ai` when the call fails or the reply cannot be parsed.
    pub async fn translate_report(&self, report: &Report) -> Result<Report, SessionError> {
        let text = report.to_plain_text();
        let call = self.generator.translate_to_turkish(&text);
        let mut translated = with_deadline(self.plan.call_deadline, call).await?;
        if translated.level.is_none() {
            translated.level = report.level;
        }
        Ok(translated)
    }

    /// Copy out the test data.
    #[must_use]
    pub fn export(&self) -> SessionSnapshot {
        SessionSnapshot {
            questions: self.questions.clone(),
            answers: self.answers.clone(),
            started_at: self.started_at,
            ended_at: self.ended_at,
            current_index: self.current,
            offline: self.offline,
        }
    }

    /// Replace this session's test data with `snapshot`.
    ///
    /// The session becomes active, or completed when the snapshot has an end time.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidState` while generating,
    /// `SessionError::SnapshotMismatch` when answer and question counts differ,
    /// and `SessionError::Empty` for a snapshot without questions.
    pub fn import(&mut self, snapshot: SessionSnapshot) -> Result<(), SessionError> {
        if self.state == SessionState::Generating {
            return Err(self.invalid("import a test"));
        }
        if snapshot.questions.len() != snapshot.answers.len() {
            return Err(SessionError::SnapshotMismatch {
                questions: snapshot.questions.len(),
                answers: snapshot.answers.len(),
            });
        }
        if snapshot.questions.is_empty() {
            return Err(SessionError::Empty);
        }

        self.current = snapshot.current_index.min(snapshot.questions.len() - 1);
        self.questions = snapshot.questions;
        self.answers = snapshot.answers;
        self.offline = snapshot.offline;
        self.started_at = Some(snapshot.started_at.unwrap_or_else(|| self.clock.now()));
        self.ended_at = snapshot.ended_at;
        self.state = if self.ended_at.is_some() {
            SessionState::Completed
        } else {
            SessionState::Active
        };
        Ok(())
    }

    fn invalid(&self, operation: &'static str) -> SessionError {
        SessionError::InvalidState {
            operation,
            state: self.state,
        }
    }
}

impl fmt::Debug for TestSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestSession")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("questions_len", &self.questions.len())
            .field("current", &self.current)
            .field("offline", &self.offline)
            .field("started_at", &self.started_at)
            .field("ended_at", &self.ended_at)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
