pub mod client;
pub mod config;
pub mod generator;
pub mod json;
mod prompts;

pub use client::{GeminiClient, ResponseFormat, is_quota_failure};
pub use config::GeminiConfig;
pub use generator::{GeminiGenerator, ProficiencyGenerator, ReadingExercise, ReportRequest, TopicMistakes};
pub use json::{extract_json, parse_json_response};
