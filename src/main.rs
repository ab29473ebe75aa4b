use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::{ArgGroup, Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod analytics;
mod cascade;
mod chat;
mod config;
mod db;
mod lexicon;
mod llm;
mod models;
mod mood;
mod remote;
mod report;
mod webhook;

use crate::cascade::Cascade;
use crate::chat::ChatCompanion;
use crate::config::Config;
use crate::llm::LlmClient;
use crate::models::{EmotionLabel, EmotionRecord, JournalEntry, Language};
use crate::remote::{ChatMessage, CompletionRequest, TextCompletion};
use crate::webhook::WebhookClient;

#[derive(Parser)]
#[command(name = "socho")]
#[command(about = "Emotion analysis and weekly insights for Socho journals", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum ReportFormat {
    Markdown,
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load a week of sample journal entries
    Seed {
        #[arg(long, default_value = "demo-user")]
        subject: String,
    },
    /// Import emotion records from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Detect emotions locally with the keyword lexicon
    Detect {
        #[arg(long)]
        text: String,
        /// Also report keyword intensity for this emotion
        #[arg(long)]
        emotion: Option<String>,
    },
    /// Tag emotions with the completion model, falling back to the lexicon
    Tag {
        #[arg(long)]
        text: String,
    },
    /// Run full journal analysis
    #[command(group(
        ArgGroup::new("input")
            .args(["text", "file"])
            .required(true)
            .multiple(false)
    ))]
    Analyze {
        #[arg(long)]
        subject: String,
        #[arg(long)]
        text: Option<String>,
        #[arg(long)]
        file: Option<PathBuf>,
        #[arg(long)]
        title: Option<String>,
        /// Store the journal entry and its emotion record
        #[arg(long)]
        persist: bool,
    },
    /// Build the weekly report for the trailing seven days
    Report {
        #[arg(long)]
        subject: String,
        #[arg(long, value_enum, default_value_t = ReportFormat::Markdown)]
        format: ReportFormat,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// List recent records with emotion mix and daily mood
    Trends {
        #[arg(long)]
        subject: String,
        #[arg(long, default_value_t = 7)]
        since_days: i64,
    },
    /// Talk to the companion bot
    Chat {
        #[arg(long)]
        subject: String,
        #[arg(long)]
        message: String,
        /// JSON file holding earlier turns; updated with this exchange
        #[arg(long)]
        history: Option<PathBuf>,
        /// Tag the message and store it as an emotion record
        #[arg(long)]
        persist: bool,
    },
    /// Check connectivity to the database and remote services
    Check,
}

type AppCascade = Cascade<Option<WebhookClient>, Option<LlmClient>>;

fn build_cascade(config: &Config) -> anyhow::Result<AppCascade> {
    let webhook = WebhookClient::from_config(config)?;
    let classifier = LlmClient::from_config(config, &config.emotion_model)?;
    let mut cascade = Cascade::new(webhook, classifier);

    if let Some(model) = &config.secondary_emotion_model {
        if let Some(client) = LlmClient::from_config(config, model)? {
            cascade = cascade.with_secondary_classifier(Some(client));
        }
    }

    Ok(cascade)
}

fn labels(emotions: &[EmotionLabel]) -> String {
    emotions
        .iter()
        .map(|label| label.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn load_history(path: Option<&PathBuf>) -> anyhow::Result<Vec<ChatMessage>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    if !path.exists() {
        return Ok(Vec::new());
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a chat history file", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("socho_insights=info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command {
        Commands::InitDb => {
            let pool = db::connect(config.database_url()?)?;
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed { subject } => {
            let pool = db::connect(config.database_url()?)?;
            let inserted = db::seed(&pool, &subject, Utc::now()).await?;
            println!("Seeded {inserted} journal entries for {subject}.");
        }
        Commands::Import { csv } => {
            let pool = db::connect(config.database_url()?)?;
            let inserted = db::import_csv(&pool, &csv).await?;
            println!("Inserted {inserted} records from {}.", csv.display());
        }
        Commands::Detect { text, emotion } => {
            let detected = lexicon::detect(&text);
            println!("Emotions: {}", labels(&detected));
            println!("Mood score: {}/10", mood::score(&text));
            println!("Language: {:?}", lexicon::detect_language(&text));
            for label in detected.iter().filter(|label| **label != EmotionLabel::Neutral) {
                println!("- {label}: intensity {:.2}", lexicon::intensity(&text, *label));
            }

            if let Some(name) = emotion {
                anyhow::ensure!(
                    lexicon::is_valid_emotion(&name),
                    "unknown emotion {name:?}; expected one of: {}",
                    labels(&lexicon::categories())
                );
                if let Some(label) = EmotionLabel::parse(&name) {
                    println!("{label} intensity: {:.2}", lexicon::intensity(&text, label));
                }
            }
        }
        Commands::Tag { text } => {
            let cascade = build_cascade(&config)?;
            let resolved = cascade.tag(&text).await;
            info!(tier = resolved.tier.as_str(), "tagging finished");
            println!(
                "{}",
                serde_json::json!({ "emotions": resolved.value, "tier": resolved.tier })
            );
        }
        Commands::Analyze {
            subject,
            text,
            file,
            title,
            persist,
        } => {
            let content = match (text, file) {
                (Some(text), _) => text,
                (None, Some(file)) => std::fs::read_to_string(&file)
                    .with_context(|| format!("failed to read {}", file.display()))?,
                (None, None) => anyhow::bail!("either --text or --file is required"),
            };

            let cascade = build_cascade(&config)?;
            let resolved = cascade.analyze(&subject, &content, title.as_deref()).await;
            info!(
                subject = %subject,
                tier = resolved.tier.as_str(),
                mood_score = resolved.value.mood_score,
                "analysis finished"
            );

            if persist {
                let pool = db::connect(config.database_url()?)?;
                let now = Utc::now();
                let record = EmotionRecord::new(
                    subject.clone(),
                    resolved.value.emotions.clone(),
                    resolved.value.mood_score,
                    now,
                );
                db::insert_journal_entry(
                    &pool,
                    &JournalEntry {
                        subject_id: subject.clone(),
                        title: title.clone().unwrap_or_default(),
                        content: content.clone(),
                        analysis: resolved.value.clone(),
                        created_at: now,
                    },
                )
                .await?;
                // Journal is saved even when analytics storage fails.
                if let Err(error) = db::insert_record(&pool, &record, None).await {
                    warn!(%error, "failed to store emotion record");
                }
            }

            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "analysis": resolved.value,
                    "tier": resolved.tier,
                }))?
            );
        }
        Commands::Report {
            subject,
            format,
            out,
        } => {
            let pool = db::connect(config.database_url()?)?;
            let now = Utc::now();
            let since = analytics::window_start(now, analytics::WINDOW_DAYS);
            let records = db::fetch_records(&pool, &subject, since).await?;

            let Some(weekly) = analytics::weekly_report(&records, now) else {
                println!("No journal entries found for this week.");
                return Ok(());
            };

            let rendered = match format {
                ReportFormat::Markdown => report::build_markdown(&subject, &weekly),
                ReportFormat::Text => report::build_text(&weekly),
                ReportFormat::Json => serde_json::to_string_pretty(&weekly)?,
            };

            match out {
                Some(path) => {
                    std::fs::write(&path, rendered)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    println!("Report written to {}.", path.display());
                }
                None => print!("{rendered}"),
            }
        }
        Commands::Trends {
            subject,
            since_days,
        } => {
            let pool = db::connect(config.database_url()?)?;
            let now = Utc::now();
            let since = analytics::window_start(now, since_days);
            let records = db::fetch_records(&pool, &subject, since).await?;
            let window = analytics::records_in_window(&records, since, now);

            print!(
                "{}",
                report::build_trends(
                    &subject,
                    since,
                    &window,
                    &analytics::distribution(&window),
                    &analytics::daily_trends(&window),
                )
            );
        }
        Commands::Chat {
            subject,
            message,
            history,
            persist,
        } => {
            let mut turns = load_history(history.as_ref())?;
            let chat_model = LlmClient::from_config(&config, &config.chat_model)?;
            let companion = ChatCompanion::new(chat_model);
            let reply = companion.reply(&turns, &message).await;
            println!("{reply}");

            if let Some(path) = &history {
                turns.push(ChatMessage::user(message.clone()));
                turns.push(ChatMessage::assistant(reply));
                std::fs::write(path, serde_json::to_string_pretty(&turns)?)
                    .with_context(|| format!("failed to write {}", path.display()))?;
            }

            if persist {
                let cascade = build_cascade(&config)?;
                let tagged = cascade.tag(&message).await;
                let record = EmotionRecord::new(
                    subject.clone(),
                    tagged.value,
                    mood::score(&message),
                    Utc::now(),
                );
                let pool = db::connect(config.database_url()?)?;
                db::insert_record(&pool, &record, None).await?;
                info!(subject = %subject, tier = tagged.tier.as_str(), "chat message recorded");
            }
        }
        Commands::Check => {
            let lexicon = lexicon::lexicon();
            let (english, urdu) = lexicon::categories().iter().fold((0, 0), |(en, ur), label| {
                (
                    en + lexicon.keywords_for(*label, Language::English).len(),
                    ur + lexicon.keywords_for(*label, Language::Urdu).len(),
                )
            });
            println!(
                "Lexicon {}: {english} English and {urdu} Urdu keywords",
                lexicon.version
            );

            match config.database_url() {
                Ok(url) => match db::ping(&db::connect(url)?).await {
                    Ok(()) => println!("Database: connected"),
                    Err(error) => println!("Database: {error:#}"),
                },
                Err(_) => println!("Database: DATABASE_URL not set"),
            }

            match LlmClient::from_config(&config, &config.emotion_model)? {
                Some(client) => {
                    let probe = CompletionRequest::prompt("Reply with the single word OK.");
                    match client.complete(&probe).await {
                        Ok(_) => println!("Completion API ({}): reachable", client.model()),
                        Err(reason) => println!("Completion API ({}): {reason}", client.model()),
                    }
                }
                None => println!("Completion API: GROQ_API_KEY not set"),
            }

            match WebhookClient::from_config(&config)? {
                Some(client) => {
                    match client.ping().await {
                        Ok(_) => println!("Analysis webhook ({}): reachable", client.url()),
                        Err(reason) => println!("Analysis webhook ({}): {reason}", client.url()),
                    }
                }
                None => println!("Analysis webhook: N8N_WEBHOOK_URL not set"),
            }
        }
    }

    Ok(())
}
