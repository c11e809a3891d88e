use proficiency_core::model::{Question, Report};
use services::{TestOutcome, TestSession};

pub fn print_question(session: &TestSession, question: &Question) {
    let progress = session.progress();
    println!();
    println!(
        "─── Question {}/{} · {} {} · {} answered ───",
        progress.current,
        progress.total,
        question.level(),
        question.kind(),
        progress.answered
    );
    if let Some(passage) = question.passage() {
        println!("{passage}");
        println!();
    }
    println!("{}", question.text());
    let selected = session.answer_at(session.current_index());
    for (choice, option) in proficiency_core::model::Choice::all()
        .into_iter()
        .zip(question.options())
    {
        let marker = if selected == Some(choice) { '*' } else { ' ' };
        println!(" {marker}{}) {option}", choice.value() + 1);
    }
}

pub fn print_help() {
    println!("Commands: 1-4 answer · n next · p previous · f finish · q quit");
}

pub fn print_outcome(outcome: &TestOutcome) {
    let score = &outcome.score;
    let info = score.level_info();
    println!();
    println!("══════ Results ══════");
    println!(
        "Score: {}/{} ({}%)",
        score.total_correct, score.total_questions, score.accuracy_percent
    );
    println!(
        "Grammar: {}/{} ({}%)  Reading: {}/{} ({}%)",
        score.grammar.correct,
        score.grammar.total,
        score.grammar.accuracy_percent,
        score.reading.correct,
        score.reading.total,
        score.reading.accuracy_percent
    );
    println!("Level: {} · {}", score.level, info.title);
    println!("Time: {} min", outcome.duration.num_minutes());

    if !score.per_topic.is_empty() {
        println!();
        println!("By topic:");
        for (topic, stats) in &score.per_topic {
            println!(
                "  {topic}: {}/{} ({}%, {})",
                stats.stats.correct,
                stats.stats.total,
                stats.stats.accuracy_percent,
                stats.performance.as_str()
            );
        }
    }

    if outcome.is_offline() {
        println!();
        println!("Offline demo: these questions come from the built-in test set.");
    } else if outcome.ai_limited() {
        println!();
        println!("AI analysis is limited right now; showing a basic report.");
    }
}

pub fn print_report(report: &Report) {
    println!();
    if let Some(description) = &report.level_description {
        println!("{description}");
        println!();
    }
    println!("{}", report.to_plain_text());
}
