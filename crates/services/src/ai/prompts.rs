//! Prompt text for each generation call. Only the reply schema matters to callers.

use proficiency_core::model::Level;

use crate::ai::generator::ReportRequest;

fn level_focus(level: Level) -> &'static str {
    match level {
        Level::A1 => "basic vocabulary, simple present tense, articles, plurals, basic prepositions",
        Level::A2 => "past simple, future forms, comparatives, modal verbs can/must",
        Level::B1 => "present perfect, conditionals type 1-2, passive voice, relative clauses",
        Level::B2 => "mixed conditionals, reported speech, advanced modals, phrasal verbs",
        Level::C1 => "complex structures, subjunctive, inversion, advanced vocabulary and idioms",
    }
}

pub(crate) fn grammar_questions(level: Level, count: usize) -> String {
    format!(
        r#"Generate {count} English grammar multiple-choice questions for {level} level students.

Level focus: {focus}

Requirements:
1. Progress from easier to harder within the {level} level
2. Each question has exactly 4 options and exactly one correct answer
3. Cover diverse grammar topics appropriate for {level}
4. Give a short explanation for the correct answer

Return ONLY a valid JSON array with this exact structure:
[
  {{
    "question": "She ___ to school every day.",
    "options": ["go", "goes", "going", "gone"],
    "correct": 1,
    "topic": "Present Simple",
    "explanation": "Third person singular takes -s in the present simple."
  }}
]
"correct" is the zero-based index of the right option."#,
        focus = level_focus(level),
    )
}

pub(crate) fn reading_exercises(level: Level, count: usize) -> String {
    format!(
        r#"Generate {count} English reading comprehension exercises for {level} level students.

Level focus: {focus}

Requirements:
1. Each exercise has one original passage suited to {level} readers
2. Each passage has several questions, each with exactly 4 options and one correct answer
3. Questions test main idea, detail, inference and vocabulary in context

Return ONLY a valid JSON array with this exact structure:
[
  {{
    "passage": "Full passage text...",
    "questions": [
      {{
        "question": "What is the main idea of the passage?",
        "options": ["...", "...", "...", "..."],
        "correct": 0,
        "topic": "Reading Comprehension",
        "explanation": "..."
      }}
    ]
  }}
]
"correct" is the zero-based index of the right option."#,
        focus = level_focus(level),
    )
}

pub(crate) fn learning_report(request: &ReportRequest) -> String {
    let topics = request
        .topics
        .iter()
        .map(|t| format!("- {}: {}/{} incorrect", t.topic, t.wrong, t.total))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"Based on this English test analysis, generate a comprehensive learning report:

Test Results:
- Total Score: {correct}/{total}
- Grammar Score: {grammar_correct}/{grammar_total}
- Reading Score: {reading_correct}/{reading_total}
- Estimated Level: {level}

Performance by topic:
{topics}

Identify strengths, weak areas with concrete recommendations, overall study
recommendations and next steps.

Return ONLY valid JSON with this structure:
{{
  "level": "{level}",
  "levelDescription": "...",
  "strengths": ["..."],
  "weakAreas": [
    {{
      "topic": "...",
      "performance": "needs-improvement",
      "explanation": "...",
      "recommendations": ["..."]
    }}
  ],
  "overallRecommendations": ["..."],
  "nextSteps": ["..."]
}}"#,
        correct = request.total_correct,
        total = request.total_questions,
        grammar_correct = request.grammar_correct,
        grammar_total = request.grammar_total,
        reading_correct = request.reading_correct,
        reading_total = request.reading_total,
        level = request.level,
    )
}

pub(crate) fn turkish_translation(report_text: &str) -> String {
    format!(
        r#"Translate the following English proficiency test learning report to Turkish.
Keep CEFR level names (A1-C1) unchanged.

{report_text}

Return ONLY valid JSON with the same structure as the original report, translated to Turkish:
{{
  "strengths": ["..."],
  "weakAreas": [
    {{
      "topic": "...",
      "performance": "...",
      "explanation": "...",
      "recommendations": ["..."]
    }}
  ],
  "overallRecommendations": ["..."],
  "nextSteps": ["..."]
}}"#
    )
}
