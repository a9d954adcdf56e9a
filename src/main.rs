//! Malaw Guard CLI — scam-SMS awareness quiz and message scanner.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};

use malaw_guard::api;
use malaw_guard::models::AnalysisReport;
use malaw_guard::services::alert_store::AlertStore;
use malaw_guard::services::detection::Analyzer;
use malaw_guard::services::quiz::QuizSession;

/// Malaw Guard: sensibilisation aux arnaques SMS
#[derive(Parser, Debug)]
#[command(name = "malaw-guard", version, about, long_about = None)]
struct Cli {
    /// Data directory for stored alerts (defaults to the platform data dir)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze a message for scam likelihood
    Scan {
        /// Message text to analyze
        text: String,
        /// Scoring engine: keyword or neural
        #[arg(long, default_value = "keyword")]
        engine: String,
        /// Do not store an alert even when the message is flagged
        #[arg(long)]
        no_store: bool,
        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run the interactive awareness quiz
    Quiz,
    /// Manage stored alerts
    Alerts {
        #[command(subcommand)]
        action: AlertsAction,
    },
}

#[derive(Subcommand, Debug)]
enum AlertsAction {
    /// List stored alerts, most recent first
    List {
        /// Print the alerts as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete every stored alert
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    malaw_guard::init_logging();
    let cli = Cli::parse();

    let store_dir = cli
        .data_dir
        .clone()
        .or_else(AlertStore::default_store_dir)
        .unwrap_or_else(|| PathBuf::from("malaw-guard-data"));

    match cli.command {
        Commands::Scan {
            text,
            engine,
            no_store,
            json,
        } => run_scan(store_dir, &engine, &text, no_store, json).await,
        Commands::Quiz => run_quiz(),
        Commands::Alerts { action } => match action {
            AlertsAction::List { json } => run_alerts_list(store_dir, json),
            AlertsAction::Clear => run_alerts_clear(store_dir),
        },
    }
}

async fn run_scan(
    store_dir: PathBuf,
    engine: &str,
    text: &str,
    no_store: bool,
    json: bool,
) -> Result<()> {
    let store = if no_store {
        None
    } else {
        Some(AlertStore::new(store_dir))
    };
    let mut analyzer = Analyzer::new();
    let report = api::analyze_text(&mut analyzer, store.as_ref(), engine, text)
        .await
        .map_err(|e| anyhow!(e))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report, no_store);
    }
    Ok(())
}

fn print_report(report: &AnalysisReport, no_store: bool) {
    if report.flagged {
        println!("⚠️ Scam détecté");
        println!("Score : {:.1}%", report.score * 100.0);
        println!("Catégorie : {}", report.category);
        for m in &report.matches {
            println!("  - \"{}\" ({}, poids {})", m.keyword, m.category, m.weight);
        }
        if report.alert_stored {
            println!("✅ Ajouté aux alertes.");
        } else if !no_store {
            println!("Alerte déjà enregistrée, rien à ajouter.");
        }
    } else {
        println!("✅ Aucun scam détecté");
        println!("Score : {:.1}%.", report.score * 100.0);
    }
}

fn run_quiz() -> Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut session = QuizSession::with_default_bank();
    let total = session.summary().total;

    loop {
        while let Some(question) = session.current_question().cloned() {
            println!("\nQuestion {}/{}", session.current_index() + 1, total);
            println!("{}", question.prompt);
            for (i, option) in question.options.iter().enumerate() {
                println!("  {}. {}", i + 1, option);
            }
            print!("Ta réponse : ");
            io::stdout().flush()?;

            let line = match lines.next() {
                Some(line) => line?,
                None => return Ok(()),
            };
            let choice = match line.trim().parse::<usize>() {
                Ok(n) if n >= 1 => n - 1,
                _ => {
                    println!("Réponse invalide, tape le numéro de l'option.");
                    continue;
                }
            };

            match session.select_answer(choice) {
                Ok(outcome) => {
                    if outcome.correct {
                        println!("✅ Bonne réponse !");
                    } else {
                        println!("❌ Mauvaise réponse. Bonne réponse : {}", outcome.correct_option);
                    }
                    println!("{}", outcome.explanation);
                    session.advance()?;
                }
                Err(e) => println!("{}", e),
            }
        }

        let summary = session.summary();
        println!("\nTu as obtenu {}/{} réponses correctes !", summary.score, summary.total);
        if summary.mistakes.is_empty() {
            println!("🎉 Parfait ! Aucune erreur. Tu es très vigilant face aux arnaques.");
        } else {
            println!("❌ Tes erreurs :");
            for m in &summary.mistakes {
                println!("\nQ: {}", m.question);
                println!("Ta réponse: {}", m.user);
                println!("Bonne réponse: {}", m.correct);
                println!("{}", m.explanation);
            }
        }

        print!("\nRejouer ? (o/N) ");
        io::stdout().flush()?;
        let replay = match lines.next() {
            Some(line) => line?.trim().to_lowercase().starts_with('o'),
            None => false,
        };
        if replay {
            session.restart();
        } else {
            return Ok(());
        }
    }
}

fn run_alerts_list(store_dir: PathBuf, json: bool) -> Result<()> {
    let store = AlertStore::new(store_dir);
    let alerts = api::list_alerts(&store).map_err(|e| anyhow!(e))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&alerts)?);
        return Ok(());
    }

    if alerts.is_empty() {
        println!("Aucune alerte enregistrée.");
        return Ok(());
    }
    for alert in &alerts {
        println!(
            "[{}] {} ({}%) - {}",
            alert.date, alert.category, alert.confidence, alert.description
        );
    }
    Ok(())
}

fn run_alerts_clear(store_dir: PathBuf) -> Result<()> {
    let store = AlertStore::new(store_dir);
    api::clear_alerts(&store).map_err(|e| anyhow!(e))?;
    println!("Alertes supprimées.");
    Ok(())
}
