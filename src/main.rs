use std::io::Write;

use api_client::RestClient;
use ficha_core::{
    open_session, ClientConfig, EngineError, FailurePolicy, SessionToken, StepController,
    SubjectId, SubjectRef,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Interactive record-form walkthrough.
///
/// Steps through the subject's form one category at a time: edits go into
/// the answer store, `next` flushes the current category before moving on,
/// `finish` runs the required-question gate and sweeps any category a jump
/// left unflushed.
///
/// # Environment Variables
/// - `FICHA_BACKEND_URL`: backend base URL (default: "http://localhost:3000")
/// - `FICHA_TOKEN`: bearer token obtained via `ficha login`
/// - `FICHA_STRICT_FLUSH`: set to "1" to treat any unsaved answer as a
///   flush failure instead of logging it and moving on
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("ficha=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let subject_id: i64 = match std::env::args().nth(1).map(|arg| arg.parse()) {
        Some(Ok(id)) => id,
        _ => {
            eprintln!("usage: ficha-run <subject-id>");
            std::process::exit(2);
        }
    };

    let base_url =
        std::env::var("FICHA_BACKEND_URL").unwrap_or_else(|_| "http://localhost:3000".into());
    let mut config = ClientConfig::new(base_url)?;
    if let Ok(token) = std::env::var("FICHA_TOKEN") {
        config = config.with_token(SessionToken::new(token)?);
    }
    let policy = if std::env::var("FICHA_STRICT_FLUSH").as_deref() == Ok("1") {
        FailurePolicy::Strict
    } else {
        FailurePolicy::Lenient
    };

    let client = RestClient::new(config);
    let (mut controller, record) =
        open_session(&client, SubjectRef::Persisted(SubjectId(subject_id)), policy).await?;
    tracing::info!(
        subject = subject_id,
        categories = controller.schema().len(),
        completion = controller.completion_percent(),
        "session opened"
    );

    println!("Ficha de Prontuário");
    if let Some(record) = &record {
        println!(
            "{} — CPF {} — born {}",
            record.name, record.cpf, record.birth_date
        );
    }

    loop {
        show_current(&controller);
        edit_answers(&mut controller)?;

        let at_last = controller.current_index() + 1 == controller.schema().len();
        let action = prompt(if at_last {
            "action [back/jump N/finish/quit]: "
        } else {
            "action [next/back/jump N/finish/quit]: "
        })?;
        let action = action.trim();

        if action == "quit" {
            break;
        } else if action == "back" {
            if !controller.retreat() {
                println!("Already at the first category.");
            }
        } else if action == "next" {
            match controller.advance(&client).await {
                Ok(()) => {}
                Err(err @ EngineError::FlushRejected { .. }) => {
                    println!("{err}. Try again.");
                }
                Err(err) => return Err(err.into()),
            }
        } else if let Some(rest) = action.strip_prefix("jump ") {
            match rest.trim().parse::<usize>() {
                Ok(step) if step >= 1 => {
                    if controller.jump(step - 1).is_err() {
                        println!("No category {step}.");
                    }
                }
                _ => println!("jump expects a category number."),
            }
        } else if action == "finish" {
            match controller.finish(&client).await {
                Ok(()) => {
                    println!("Record form saved. Completion: {}%.", controller.completion_percent());
                    break;
                }
                Err(err @ EngineError::UnmetRequired { .. })
                | Err(err @ EngineError::FinishIncomplete { .. })
                | Err(err @ EngineError::NotAtFinalStep) => {
                    println!("{err}");
                }
                Err(err) => return Err(err.into()),
            }
        } else {
            println!("Unknown action {action:?}.");
        }
    }

    Ok(())
}

fn show_current(controller: &StepController) {
    let section = controller.current_section();
    let saved = if controller.is_saved(section.category.id) {
        " (saved)"
    } else {
        ""
    };
    println!();
    println!(
        "[{}/{}] {}{} — completion {}%",
        controller.current_index() + 1,
        controller.schema().len(),
        section.category.name,
        saved,
        controller.completion_percent()
    );
    if let Some(description) = &section.category.description {
        println!("{description}");
    }
}

/// Prompts for each question of the current category; an empty line keeps
/// the current answer.
fn edit_answers(controller: &mut StepController) -> anyhow::Result<()> {
    let questions: Vec<_> = controller.current_section().questions.to_vec();
    for question in questions {
        let marker = if question.required { " *" } else { "" };
        println!("{}{} ({})", question.prompt, marker, question.kind.label());
        if !question.choices.is_empty() {
            println!("  options: {}", question.choices.join(" | "));
        }
        let current = controller.answer(question.id).unwrap_or("");
        let input = prompt(&format!("  [{current}] > "))?;
        let input = input.trim_end_matches('\n');
        if !input.trim().is_empty() {
            controller.set_answer(question.id, input.trim());
        }
    }
    Ok(())
}

fn prompt(label: &str) -> anyhow::Result<String> {
    print!("{label}");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line)
}
