use crate::infra::build_coordinator;
use candidate_fit::config::AssessmentConfig;
use candidate_fit::error::AppError;
use candidate_fit::workflows::assessment::{
    Alternative, AnswerResponse, CandidatePatch, FormSession, Question, QuestionType,
    Questionnaire,
};
use clap::{Args, ValueEnum};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum DemoProfile {
    /// Picks the best-valued options and writes detailed answers
    #[default]
    Strong,
    /// Picks middle options and writes short answers
    Moderate,
    /// Picks the lowest-valued options and barely answers
    Weak,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Candidate name used for the demo submission
    #[arg(long, default_value = "Ana Silva")]
    pub(crate) name: String,
    /// Candidate email used for the demo submission
    #[arg(long, default_value = "ana.silva@example.com")]
    pub(crate) email: String,
    /// Candidate phone used for the demo submission
    #[arg(long, default_value = "(11) 9 8888-7777")]
    pub(crate) phone: String,
    /// Answering style applied to every question
    #[arg(long, value_enum, default_value_t = DemoProfile::Strong)]
    pub(crate) profile: DemoProfile,
    /// Print the submission result as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct QuestionnaireArgs {
    /// Include alternative values in the listing
    #[arg(long)]
    pub(crate) show_values: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        name,
        email,
        phone,
        profile,
        json,
    } = args;

    let (coordinator, candidates, answers) = build_coordinator(&AssessmentConfig::default());
    let questionnaire = coordinator.questionnaire()?;
    let mut session = FormSession::new(questionnaire);

    println!("Candidate fit assessment demo ({profile:?} profile)");
    session.update_candidate_info(CandidatePatch {
        name: Some(name),
        email: Some(email),
        phone: Some(phone),
    });
    if !advance(&mut session, "Personal details") {
        return Ok(());
    }

    while !session.is_terminal() {
        let Some(step) = session.category_step(session.current_step()).cloned() else {
            break;
        };
        for question in &step.questions {
            let response = answer_for(question, profile);
            let score = session
                .update_answer(question.id, response)
                .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))?;
            println!("  [{}] {} -> {} pts", step.title, question.title, score);
        }
        if !advance(&mut session, &step.title) {
            return Ok(());
        }
    }

    let result = coordinator.submit(session.to_form_input());
    if json {
        match serde_json::to_string_pretty(&result) {
            Ok(payload) => println!("{payload}"),
            Err(err) => println!("Result unavailable as JSON: {err}"),
        }
        return Ok(());
    }

    println!("\n{}", result.message);
    if let Some(errors) = &result.errors {
        for error in errors {
            println!("  - {error}");
        }
    }
    if let (Some(score), Some(label)) = (result.fit_score, result.fit_label) {
        println!("Fit score: {score} ({label})");
    }
    if let Some(candidate_id) = result.candidate_id {
        if let Some(record) = candidates.get(&candidate_id) {
            println!(
                "Stored candidate {} <{}> phone {}",
                record.name, record.email, record.phone
            );
        }
        println!(
            "Stored {} answer rows across {} candidate(s)",
            answers.rows_for(&candidate_id).len(),
            candidates.len()
        );
    }

    Ok(())
}

pub(crate) fn run_questionnaire_listing(args: QuestionnaireArgs) -> Result<(), AppError> {
    let questionnaire = Questionnaire::standard();
    println!(
        "{} steps, {} questions",
        questionnaire.steps().len() + 1,
        questionnaire.total_questions()
    );
    println!("Step 1: Personal details");

    for (index, step) in questionnaire.steps().iter().enumerate() {
        println!("\nStep {}: {} - {}", index + 2, step.title, step.description);
        for question in &step.questions {
            println!("  * {} [{}]", question.title, question.kind.label());
            for alternative in &question.alternatives {
                if args.show_values {
                    println!("      - {} ({})", alternative.text, alternative.value);
                } else {
                    println!("      - {}", alternative.text);
                }
            }
        }
    }

    Ok(())
}

fn advance(session: &mut FormSession, title: &str) -> bool {
    if session.next_step() {
        return true;
    }
    println!("Step '{title}' is incomplete:");
    for error in session.validate_current_step() {
        println!("  - {error}");
    }
    false
}

fn answer_for(question: &Question, profile: DemoProfile) -> AnswerResponse {
    let mut ranked: Vec<&Alternative> = question.alternatives.iter().collect();
    ranked.sort_by_key(|alternative| std::cmp::Reverse(alternative.value));

    match question.kind {
        QuestionType::SingleChoice => {
            let index = match profile {
                DemoProfile::Strong => 0,
                DemoProfile::Moderate => ranked.len() / 2,
                DemoProfile::Weak => ranked.len().saturating_sub(1),
            };
            match ranked.get(index) {
                Some(alternative) => AnswerResponse::SingleChoice {
                    alternative_id: alternative.id,
                },
                None => AnswerResponse::OpenText {
                    text: String::new(),
                },
            }
        }
        QuestionType::MultipleChoice => {
            let picked: Vec<_> = match profile {
                DemoProfile::Strong => ranked.iter().take(3).collect(),
                DemoProfile::Moderate => ranked.iter().skip(2).take(1).collect(),
                DemoProfile::Weak => ranked.iter().rev().take(1).collect(),
            };
            AnswerResponse::MultipleChoice {
                alternative_ids: picked.into_iter().map(|alternative| alternative.id).collect(),
            }
        }
        QuestionType::OpenText => AnswerResponse::OpenText {
            text: match profile {
                DemoProfile::Strong => "I lead a weekly review with my team where we compare \
                    goals with results, discuss what blocked us, and agree on one concrete \
                    improvement for the following week."
                    .to_string(),
                DemoProfile::Moderate => "I talk it through with the team.".to_string(),
                DemoProfile::Weak => "It depends.".to_string(),
            },
        },
    }
}
