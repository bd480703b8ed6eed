use api_client::{NewQuestion, RestClient};
use clap::{Parser, Subcommand};
use ficha_core::{
    open_session, AnswerKind, CategoryId, ClientConfig, FailurePolicy, QuestionId, SessionToken,
    SubjectId, SubjectRef,
};

#[derive(Parser)]
#[command(name = "ficha")]
#[command(about = "Record form (ficha de prontuário) admin and inspection CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Exchange credentials for a session token
    Login {
        email: String,
        /// Password
        senha: String,
    },
    /// Show the active category/question tree
    Schema,
    /// List subjects, optionally filtered by name or CPF
    Subjects {
        /// Case-insensitive name or CPF fragment
        #[arg(long)]
        search: Option<String>,
    },
    /// Show a subject's form completion
    Progress {
        /// Subject id
        subject_id: i64,
    },
    /// Create a question (admin)
    CreateQuestion {
        /// Owning category id
        category_id: i64,
        /// Prompt text
        prompt: String,
        /// Answer kind: text, number, choice, date, boolean, sex
        kind: String,
        /// Choice label (repeat for each; required for kind "choice")
        #[arg(long = "choice")]
        choices: Vec<String>,
        /// Mark the question required
        #[arg(long)]
        required: bool,
        /// Rank within the category
        #[arg(long, default_value_t = 1)]
        rank: i32,
    },
    /// Delete a question (admin)
    DeleteQuestion {
        /// Question id
        question_id: i64,
    },
}

fn parse_kind(value: &str) -> anyhow::Result<AnswerKind> {
    match value {
        "text" => Ok(AnswerKind::Text),
        "number" => Ok(AnswerKind::Number),
        "choice" => Ok(AnswerKind::Choice),
        "date" => Ok(AnswerKind::Date),
        "boolean" => Ok(AnswerKind::Boolean),
        "sex" => Ok(AnswerKind::Sex),
        other => anyhow::bail!(
            "unknown answer kind {other:?} (expected text, number, choice, date, boolean or sex)"
        ),
    }
}

fn client_from_env() -> anyhow::Result<RestClient> {
    let base_url =
        std::env::var("FICHA_BACKEND_URL").unwrap_or_else(|_| "http://localhost:3000".into());
    let mut config = ClientConfig::new(base_url)?;
    if let Ok(token) = std::env::var("FICHA_TOKEN") {
        config = config.with_token(SessionToken::new(token)?);
    }
    Ok(RestClient::new(config))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let client = client_from_env()?;

    match cli.command {
        Some(Commands::Login { email, senha }) => {
            let token = client.login(&email, &senha).await?;
            println!("{}", token.as_str());
        }
        Some(Commands::Schema) => {
            let schema = ficha_core::load_schema(&client).await?;
            for (index, section) in schema.sections().iter().enumerate() {
                println!(
                    "{}. {} (category {})",
                    index + 1,
                    section.category.name,
                    section.category.id
                );
                if let Some(description) = &section.category.description {
                    println!("   {description}");
                }
                for question in &section.questions {
                    let marker = if question.required { " *" } else { "" };
                    println!(
                        "   [{}] {}{} ({})",
                        question.id,
                        question.prompt,
                        marker,
                        question.kind.label()
                    );
                    if !question.choices.is_empty() {
                        println!("       choices: {}", question.choices.join(" | "));
                    }
                }
            }
        }
        Some(Commands::Subjects { search }) => {
            let subjects = client.list_subjects().await?;
            let needle = search.unwrap_or_default().to_lowercase();
            let mut shown = 0usize;
            for subject in &subjects {
                let matches = needle.is_empty()
                    || subject.name.as_str().to_lowercase().contains(&needle)
                    || subject.cpf.as_str().contains(&needle);
                if !matches {
                    continue;
                }
                shown += 1;
                let id = subject
                    .id
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "-".into());
                let status = if subject.active { "ativo" } else { "inativo" };
                println!(
                    "ID: {}, Name: {}, CPF: {}, Born: {}, {}",
                    id, subject.name, subject.cpf, subject.birth_date, status
                );
            }
            if shown == 0 {
                println!("No subjects found.");
            }
        }
        Some(Commands::Progress { subject_id }) => {
            let (controller, record) = open_session(
                &client,
                SubjectRef::Persisted(SubjectId(subject_id)),
                FailurePolicy::default(),
            )
            .await?;
            if let Some(record) = record {
                println!("Subject: {} (CPF {})", record.name, record.cpf);
            }
            println!(
                "Completion: {}% ({} questions over {} categories)",
                controller.completion_percent(),
                controller.schema().question_count(),
                controller.schema().len()
            );
            for section in controller.schema().sections() {
                let saved = if controller.is_saved(section.category.id) {
                    "saved"
                } else {
                    "pending"
                };
                println!("  {} — {}", section.category.name, saved);
            }
            let unmet = controller.unmet_required();
            if !unmet.is_empty() {
                println!("Required questions unanswered: {}", unmet.len());
            }
        }
        Some(Commands::CreateQuestion {
            category_id,
            prompt,
            kind,
            choices,
            required,
            rank,
        }) => {
            let question = NewQuestion {
                category: CategoryId(category_id),
                prompt,
                kind: parse_kind(&kind)?,
                choices,
                required,
                rank,
            };
            client.create_question(&question).await?;
            println!("Question created.");
        }
        Some(Commands::DeleteQuestion { question_id }) => {
            client.delete_question(QuestionId(question_id)).await?;
            println!("Question {question_id} deleted.");
        }
        None => {
            println!("Use --help to list commands.");
        }
    }

    Ok(())
}
