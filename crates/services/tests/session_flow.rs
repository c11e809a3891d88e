use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use proficiency_core::model::{Choice, Level, QuestionDraft, QuestionKind, Report};
use proficiency_core::scoring::calculate_results;
use proficiency_core::time::fixed_now;
use proficiency_core::StaticQuestionBank;
use services::{
    AiError, Clock, ProficiencyGenerator, ReadingExercise, ReportRequest, ReportStatus,
    SessionState, TestSession,
};

/// One scripted reply for a remote call.
enum Reply {
    Ok,
    Quota,
    Fail,
}

/// Generator that replays a script and records every call it receives.
#[derive(Default)]
struct ScriptedGenerator {
    grammar: Mutex<VecDeque<Reply>>,
    reading: Mutex<VecDeque<Reply>>,
    report: Mutex<VecDeque<Reply>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    fn new(grammar: Vec<Reply>, reading: Vec<Reply>, report: Vec<Reply>) -> Self {
        Self {
            grammar: Mutex::new(grammar.into()),
            reading: Mutex::new(reading.into()),
            report: Mutex::new(report.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn next(queue: &Mutex<VecDeque<Reply>>) -> Result<(), AiError> {
        match queue.lock().unwrap().pop_front().unwrap_or(Reply::Ok) {
            Reply::Ok => Ok(()),
            Reply::Quota => Err(AiError::QuotaExceeded),
            Reply::Fail => Err(AiError::MalformedResponse("not json".into())),
        }
    }
}

fn draft(level: Level, i: usize) -> QuestionDraft {
    QuestionDraft {
        question: format!("{level} question {i}"),
        options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
        correct: 1,
        topic: Some(format!("Topic {level}")),
        explanation: Some("Because.".into()),
    }
}

#[async_trait]
impl ProficiencyGenerator for ScriptedGenerator {
    async fn generate_grammar_questions(
        &self,
        level: Level,
        count: usize,
    ) -> Result<Vec<QuestionDraft>, AiError> {
        self.calls.lock().unwrap().push(format!("grammar {level}"));
        Self::next(&self.grammar)?;
        Ok((0..count).map(|i| draft(level, i)).collect())
    }

    async fn generate_reading_exercises(
        &self,
        level: Level,
        _count: usize,
    ) -> Result<Vec<ReadingExercise>, AiError> {
        self.calls.lock().unwrap().push(format!("reading {level}"));
        Self::next(&self.reading)?;
        Ok(vec![ReadingExercise {
            passage: format!("A {level} passage."),
            questions: (0..3).map(|i| draft(level, i)).collect(),
        }])
    }

    async fn generate_learning_report(&self, request: &ReportRequest) -> Result<Report, AiError> {
        self.calls.lock().unwrap().push("report".into());
        Self::next(&self.report)?;
        Ok(Report {
            level: Some(request.level),
            strengths: vec![format!("{} correct", request.total_correct)],
            ..Report::default()
        })
    }

    async fn translate_to_turkish(&self, _report_text: &str) -> Result<Report, AiError> {
        self.calls.lock().unwrap().push("translate".into());
        Ok(Report::default())
    }
}

fn session(generator: Arc<ScriptedGenerator>) -> TestSession {
    let bank = Arc::new(StaticQuestionBank::embedded().unwrap());
    TestSession::new(generator, bank, Clock::fixed(fixed_now()))
}

fn answer_everything(session: &mut TestSession, mut pick: impl FnMut(Choice) -> Choice) {
    loop {
        let correct = session.current_question().unwrap().correct();
        session.answer_question(pick(correct)).unwrap();
        if !session.next_question() {
            break;
        }
    }
}

#[tokio::test]
async fn remote_path_generates_scores_and_reports() {
    let generator = Arc::new(ScriptedGenerator::default());
    let mut session = session(generator.clone());

    session.generate_test().await.unwrap();
    assert!(!session.is_offline());
    assert_eq!(session.questions().len(), 30);
    assert_eq!(
        generator.calls(),
        vec![
            "grammar A1", "grammar A2", "grammar B1", "grammar B2", "grammar C1", "reading B1",
            "reading B2",
        ]
    );
    let levels: Vec<Level> = session
        .questions()
        .iter()
        .filter(|q| q.kind() == QuestionKind::Grammar)
        .map(|q| q.level())
        .collect();
    let mut sorted = levels.clone();
    sorted.sort();
    assert_eq!(levels, sorted);

    answer_everything(&mut session, |c| c);
    let outcome = session.finish_test().await.unwrap();
    assert_eq!(outcome.status, ReportStatus::Generated);
    assert_eq!(outcome.score.total_correct, 30);
    assert_eq!(outcome.score.level, Level::C1);
    assert_eq!(outcome.report.strengths, vec!["30 correct".to_string()]);
    assert_eq!(generator.calls().last().map(String::as_str), Some("report"));
}

#[tokio::test]
async fn quota_on_every_call_falls_back_to_static_bank() {
    let generator = Arc::new(ScriptedGenerator::new(
        (0..5).map(|_| Reply::Quota).collect(),
        vec![Reply::Quota, Reply::Quota, Reply::Quota],
        vec![],
    ));
    let mut session = session(generator.clone());

    session.generate_test().await.unwrap();
    let bank = StaticQuestionBank::embedded().unwrap();
    assert!(session.is_offline());
    assert_eq!(session.questions(), bank.questions());
    // Quota stops the remote path at the first call.
    assert_eq!(generator.calls(), vec!["grammar A1"]);

    answer_everything(&mut session, Choice::next_wrapping);
    let outcome = session.finish_test().await.unwrap();
    assert_eq!(outcome.status, ReportStatus::Offline);
    assert_eq!(outcome.score.total_correct, 0);
    assert_eq!(outcome.score.level, Level::A1);
    assert!(!generator.calls().contains(&"report".to_string()));
}

#[tokio::test]
async fn failed_levels_are_skipped_and_reading_is_topped_up() {
    let generator = Arc::new(ScriptedGenerator::new(
        vec![Reply::Fail, Reply::Ok, Reply::Fail, Reply::Ok, Reply::Ok],
        vec![Reply::Ok, Reply::Fail, Reply::Ok],
        vec![],
    ));
    let mut session = session(generator.clone());

    session.generate_test().await.unwrap();
    assert!(!session.is_offline());
    let stats = session.statistics();
    assert_eq!(stats.grammar, 15);
    assert_eq!(stats.reading, 5);
    assert_eq!(generator.calls().last().map(String::as_str), Some("reading B1"));
    assert_eq!(generator.calls().len(), 8);
}

#[tokio::test]
async fn every_call_failing_falls_back() {
    let generator = Arc::new(ScriptedGenerator::new(
        (0..5).map(|_| Reply::Fail).collect(),
        (0..3).map(|_| Reply::Fail).collect(),
        vec![],
    ));
    let mut session = session(generator.clone());

    session.generate_test().await.unwrap();
    assert!(session.is_offline());
    assert_eq!(generator.calls().len(), 8);
}

#[tokio::test]
async fn report_quota_gives_ai_limited_placeholder() {
    let generator = Arc::new(ScriptedGenerator::new(vec![], vec![], vec![Reply::Quota]));
    let mut session = session(generator);
    session.generate_test().await.unwrap();
    answer_everything(&mut session, |c| c);

    let outcome = session.finish_test().await.unwrap();
    assert_eq!(outcome.status, ReportStatus::AiLimited);
    assert!(outcome.ai_limited());
    assert_eq!(outcome.score.total_correct, 30);
    assert_eq!(outcome.report.level, Some(outcome.score.level));
}

#[tokio::test]
async fn report_failure_gives_unavailable_placeholder() {
    let generator = Arc::new(ScriptedGenerator::new(vec![], vec![], vec![Reply::Fail]));
    let mut session = session(generator);
    session.generate_test().await.unwrap();
    answer_everything(&mut session, |c| c);

    let outcome = session.finish_test().await.unwrap();
    assert_eq!(outcome.status, ReportStatus::Unavailable);
    assert!(outcome.ai_limited());
    assert_eq!(session.state(), SessionState::Completed);
}

#[tokio::test]
async fn navigation_is_clamped_at_both_ends() {
    let mut session = session(Arc::new(ScriptedGenerator::default()));
    session.generate_test().await.unwrap();

    assert!(!session.previous_question());
    assert_eq!(session.current_index(), 0);

    while session.next_question() {}
    assert_eq!(session.current_index(), session.questions().len() - 1);
    assert!(!session.next_question());
    assert_eq!(session.current_index(), session.questions().len() - 1);
}

#[tokio::test]
async fn answering_twice_keeps_the_latest_choice() {
    let mut session = session(Arc::new(ScriptedGenerator::default()));
    session.generate_test().await.unwrap();

    session.answer_question(Choice::new(0).unwrap()).unwrap();
    session.answer_question(Choice::new(3).unwrap()).unwrap();
    assert_eq!(session.answer_at(0), Some(Choice::new(3).unwrap()));
    assert_eq!(session.progress().answered, 1);
    assert!(!session.is_complete());
}

#[tokio::test]
async fn exported_snapshot_rescores_identically() {
    let mut session = session(Arc::new(ScriptedGenerator::default()));
    session.generate_test().await.unwrap();
    let mut flip = false;
    answer_everything(&mut session, |c| {
        flip = !flip;
        if flip { c } else { c.next_wrapping() }
    });
    let outcome = session.finish_test().await.unwrap();

    let snapshot = session.export();
    assert_eq!(snapshot.answers.len(), snapshot.questions.len());
    let json = serde_json::to_string(&snapshot).unwrap();
    let restored: services::SessionSnapshot = serde_json::from_str(&json).unwrap();
    let rescored = calculate_results(&restored.answers, &restored.questions);
    assert_eq!(rescored.total_correct, outcome.score.total_correct);
    assert_eq!(rescored.total_correct, 15);

    let mut reopened = TestSession::new(
        Arc::new(ScriptedGenerator::default()),
        Arc::new(StaticQuestionBank::embedded().unwrap()),
        Clock::default(),
    );
    reopened.import(restored).unwrap();
    assert_eq!(reopened.state(), SessionState::Completed);
    assert!(reopened.is_complete());
}
