use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use proficiency_core::model::{Level, QuestionDraft, Report, ScoreResult};

use crate::ai::client::{GeminiClient, ResponseFormat};
use crate::ai::json::parse_json_response;
use crate::ai::prompts;
use crate::error::AiError;

//
// ─── TYPES ─────────────────────────────────────────────────────────────────────
//

/// One generated passage with its comprehension questions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReadingExercise {
    pub passage: String,
    pub questions: Vec<QuestionDraft>,
}

/// Wrong answers within one topic, as sent to the report generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicMistakes {
    pub topic: String,
    pub wrong: usize,
    pub total: usize,
}

/// Scored test summary handed to the learning-report call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub total_correct: usize,
    pub total_questions: usize,
    pub accuracy_percent: u8,
    pub grammar_correct: usize,
    pub grammar_total: usize,
    pub reading_correct: usize,
    pub reading_total: usize,
    pub level: Level,
    pub topics: Vec<TopicMistakes>,
}

impl ReportRequest {
    #[must_use]
    pub fn from_score(score: &ScoreResult) -> Self {
        let topics = score
            .per_topic
            .iter()
            .map(|(topic, stats)| TopicMistakes {
                topic: topic.clone(),
                wrong: stats.stats.total - stats.stats.correct,
                total: stats.stats.total,
            })
            .collect();

        Self {
            total_correct: score.total_correct,
            total_questions: score.total_questions,
            accuracy_percent: score.accuracy_percent,
            grammar_correct: score.grammar.correct,
            grammar_total: score.grammar.total,
            reading_correct: score.reading.correct,
            reading_total: score.reading.total,
            level: score.level,
            topics,
        }
    }
}

//
// ─── CAPABILITY ────────────────────────────────────────────────────────────────
//

/// Remote content generation used by a test session.
///
/// Implementations return untrusted drafts; callers validate them.
#[async_trait]
pub trait ProficiencyGenerator: Send + Sync {
    async fn generate_grammar_questions(
        &self,
        level: Level,
        count: usize,
    ) -> Result<Vec<QuestionDraft>, AiError>;

    async fn generate_reading_exercises(
        &self,
        level: Level,
        count: usize,
    ) -> Result<Vec<ReadingExercise>, AiError>;

    async fn generate_learning_report(&self, request: &ReportRequest) -> Result<Report, AiError>;

    async fn translate_to_turkish(&self, report_text: &str) -> Result<Report, AiError>;
}

/// `ProficiencyGenerator` backed by Gemini.
#[derive(Clone)]
pub struct GeminiGenerator {
    client: GeminiClient,
}

impl GeminiGenerator {
    #[must_use]
    pub fn new(client: GeminiClient) -> Self {
        Self { client }
    }

    #[must_use]
    pub fn from_env() -> Self {
        Self::new(GeminiClient::from_env())
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.client.enabled()
    }

    async fn request_json<T>(&self, call: &'static str, prompt: &str) -> Result<T, AiError>
    where
        T: serde::de::DeserializeOwned,
    {
        let text = self.client.generate(prompt, ResponseFormat::Json).await?;
        debug!(call, len = text.len(), "gemini reply received");
        parse_json_response(&text)
    }
}

#[async_trait]
impl ProficiencyGenerator for GeminiGenerator {
    async fn generate_grammar_questions(
        &self,
        level: Level,
        count: usize,
    ) -> Result<Vec<QuestionDraft>, AiError> {
        self.request_json("grammar", &prompts::grammar_questions(level, count))
            .await
    }

    async fn generate_reading_exercises(
        &self,
        level: Level,
        count: usize,
    ) -> Result<Vec<ReadingExercise>, AiError> {
        self.request_json("reading", &prompts::reading_exercises(level, count))
            .await
    }

    async fn generate_learning_report(&self, request: &ReportRequest) -> Result<Report, AiError> {
        self.request_json("report", &prompts::learning_report(request))
            .await
    }

    async fn translate_to_turkish(&self, report_text: &str) -> Result<Report, AiError> {
        self.request_json("translate", &prompts::turkish_translation(report_text))
            .await
    }
}
