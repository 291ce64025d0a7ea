use anyhow::{bail, Context};
use chrono::Utc;
use clap::Parser;
use std::fs;
use std::path::Path;

use quipu::analytics::LogSink;
use quipu::cli::{Cli, Commands, SnapshotAction};
use quipu::config::{data_root, load_settings, settings_path, SurveySettings};
use quipu::controller::{Phase, SurveyController};
use quipu::storage::{SnapshotStore, SqliteStore};
use quipu::submit::{row_timestamp, submission_row, SheetsClient, Submitter, ROW_HEADERS};
use quipu::survey::SurveyForms;

fn read_forms(path: &Path) -> anyhow::Result<SurveyForms> {
  let raw = fs::read_to_string(path)
    .with_context(|| format!("Unable to read {}", path.display()))?;
  serde_json::from_str(&raw).with_context(|| format!("Invalid answers JSON in {}", path.display()))
}

fn resolve_settings(cli: &Cli) -> anyhow::Result<SurveySettings> {
  let root = data_root()?;
  let path = cli.settings.clone().unwrap_or_else(|| settings_path(&root));
  let settings = load_settings(&path, &root)
    .with_context(|| format!("Unable to load settings from {}", path.display()))?
    .with_env_overrides()?
    .with_overrides(cli.endpoint.clone(), cli.transport.clone())?;
  Ok(settings)
}

fn open_store(settings: &SurveySettings) -> anyhow::Result<SqliteStore> {
  SqliteStore::open(Path::new(&settings.storage_path))
    .with_context(|| format!("Unable to open survey store at {}", settings.storage_path))
}

fn probe(settings: &SurveySettings) -> anyhow::Result<()> {
  let client = SheetsClient::from_settings(settings)?;
  if !client.test_connection() {
    bail!("Endpoint did not answer the connection test");
  }
  println!("Endpoint reachable");
  Ok(())
}

fn submit(settings: &SurveySettings, answers: &Path, retries: u32) -> anyhow::Result<()> {
  let forms = read_forms(answers)?;
  let client = SheetsClient::from_settings(settings)?;
  let mut controller = SurveyController::new(open_store(settings)?, client, LogSink);

  if controller.phase() == Phase::RestorePrompt {
    log::info!("[survey] discarding autosaved answers for a scripted run");
    controller.start_fresh()?;
  }
  controller.start()?;
  for form in forms.into_steps() {
    let step = form.step();
    controller
      .submit_step(form)
      .with_context(|| format!("Step {step} was rejected"))?;
  }

  let mut phase = controller.deliver()?;
  let mut attempts_left = retries;
  while phase == Phase::SubmissionError && attempts_left > 0 {
    attempts_left -= 1;
    log::warn!(
      "[survey] retrying submission ({} left)",
      attempts_left
    );
    controller.retry()?;
    phase = controller.deliver()?;
  }

  if phase != Phase::Success {
    bail!(
      "Submission failed: {}",
      controller.error_banner().unwrap_or("unknown error")
    );
  }
  let stored_at = controller
    .receipt()
    .and_then(|r| r.timestamp.clone())
    .unwrap_or_else(|| "unknown time".to_string());
  println!("Survey submitted ({stored_at})");
  Ok(())
}

fn print_row(answers: &Path) -> anyhow::Result<()> {
  let forms = read_forms(answers)?;
  let answers = match forms.validate_all() {
    Ok(answers) => answers,
    Err(errors) => {
      let detail = errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<String>>()
        .join("\n");
      bail!("Answers are invalid:\n{detail}");
    }
  };
  println!("{}", ROW_HEADERS.join("\t"));
  println!(
    "{}",
    submission_row(&answers, &row_timestamp(Utc::now())).join("\t")
  );
  Ok(())
}

fn snapshot(settings: &SurveySettings, action: SnapshotAction) -> anyhow::Result<()> {
  let snapshots = SnapshotStore::new(open_store(settings)?);
  match action {
    SnapshotAction::Show => match snapshots.load() {
      Some(snapshot) => println!("{}", serde_json::to_string_pretty(&snapshot.redacted_json()?)?),
      None => println!("No saved survey"),
    },
    SnapshotAction::Clear => {
      snapshots.clear();
      println!("Saved survey cleared");
    }
  }
  Ok(())
}

fn main() -> anyhow::Result<()> {
  env_logger::init();
  let cli = Cli::parse();

  match &cli.command {
    Commands::Row { answers } => print_row(answers),
    Commands::Probe => probe(&resolve_settings(&cli)?),
    Commands::Submit { answers, retries } => submit(&resolve_settings(&cli)?, answers, *retries),
    Commands::Snapshot { action } => snapshot(&resolve_settings(&cli)?, *action),
  }
}
