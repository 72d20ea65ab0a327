//! Scan command - interactively confirm the total of one receipt.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use clap::Args;
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

use rkeep_core::models::expense::{ExpenseCategory, ExpenseDraft};
use rkeep_core::{FormattedAmount, ScanSession, SessionOutcome, UserAction, WorkflowState};

use super::{load_config, InputRecognizer};

/// Arguments for the scan command.
#[derive(Args)]
pub struct ScanArgs {
    /// Receipt image, or a .txt file holding already-recognized text
    #[arg(required = true)]
    input: PathBuf,

    /// Accept the proposed total without asking
    #[arg(short, long)]
    yes: bool,

    /// Expense category (e.g. "Grocery", "Eating Out")
    #[arg(long)]
    category: Option<String>,

    /// Memo stored with the expense
    #[arg(short, long)]
    description: Option<String>,

    /// Expense date (YYYY-MM-DD, default: today)
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Write the expense draft here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub async fn run(args: ScanArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let category = match &args.category {
        Some(label) => ExpenseCategory::from_label(label).ok_or_else(|| {
            let known: Vec<&str> = ExpenseCategory::ALL.iter().map(|c| c.label()).collect();
            anyhow::anyhow!("Unknown category '{}'. Expected one of: {}", label, known.join(", "))
        })?,
        None => ExpenseCategory::default(),
    };

    let extractor = config.build_extractor()?;
    let recognizer = InputRecognizer::for_input(&args.input, &config, args.model_dir.as_deref())?;
    let image = fs::read(&args.input)?;

    info!("Scanning receipt: {}", args.input.display());

    let (mut session, states) = ScanSession::new(extractor);
    let (actions, mut action_rx) = mpsc::channel(4);

    let (outcome, ()) = tokio::join!(
        session.run(&image, &recognizer, &mut action_rx),
        prompt_user(states, actions, args.yes)
    );

    let accepted = match outcome? {
        SessionOutcome::Confirmed(amount) => Some(amount),
        SessionOutcome::ManualEntry(_) if args.yes => None,
        SessionOutcome::ManualEntry(_) => tokio::task::spawn_blocking(ask_manual_amount).await??,
        SessionOutcome::Aborted(error) => {
            debug!("Recognition failed: {}", error);
            anyhow::bail!("Could not process image: {}", error);
        }
        SessionOutcome::Cancelled => {
            println!("{} Scan cancelled", style("ℹ").blue());
            return Ok(());
        }
    };

    let Some(amount) = accepted else {
        println!(
            "{} No amount recorded. Enter the total by hand when creating the expense.",
            style("ℹ").blue()
        );
        return Ok(());
    };

    let date = args.date.unwrap_or_else(|| Local::now().date_naive());
    let mut draft = ExpenseDraft::new(amount, date).with_category(category);
    if let Some(description) = &args.description {
        draft = draft.with_description(description.as_str());
    }

    let output = serde_json::to_string_pretty(&draft)?;
    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Expense draft written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    Ok(())
}

/// Render workflow states and answer prompts until the session returns to idle.
async fn prompt_user(
    mut states: watch::Receiver<WorkflowState>,
    actions: mpsc::Sender<UserAction>,
    auto_confirm: bool,
) {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );

    while states.changed().await.is_ok() {
        let state = states.borrow_and_update().clone();

        let action = match state {
            WorkflowState::AwaitingImage => {
                spinner.set_message("Recognizing text...");
                spinner.enable_steady_tick(Duration::from_millis(100));
                None
            }
            WorkflowState::AwaitingConfirmation { amount, .. } => {
                spinner.finish_and_clear();
                let question = format!("Is the total amount {}?", amount);
                // Terminal reads block; keep them off the thread driving the session.
                let confirmed = auto_confirm
                    || tokio::task::spawn_blocking(move || ask_yes_no(&Term::stderr(), &question))
                        .await
                        .unwrap_or(false);
                if confirmed {
                    Some(UserAction::Confirm)
                } else {
                    Some(UserAction::Reject)
                }
            }
            WorkflowState::AwaitingManualReview { full_text } => {
                spinner.finish_and_clear();
                eprintln!("{}", style("Could not confirm the total amount.").yellow());
                eprintln!("{}", style("Recognized text:").bold());
                eprintln!("{}", full_text);
                Some(UserAction::Dismiss)
            }
            WorkflowState::Aborted => {
                spinner.finish_and_clear();
                eprintln!("{} Could not process image", style("✗").red());
                Some(UserAction::Dismiss)
            }
            WorkflowState::Idle => break,
            WorkflowState::Processing { .. } | WorkflowState::Confirmed { .. } => None,
        };

        if let Some(action) = action {
            if actions.send(action).await.is_err() {
                break;
            }
        }
    }

    spinner.finish_and_clear();
}

fn ask_yes_no(term: &Term, question: &str) -> bool {
    let _ = term.write_str(&format!("{} [y/N] ", question));
    match term.read_line() {
        Ok(answer) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
        Err(_) => false,
    }
}

/// Ask for a hand-typed total. Blank input skips.
fn ask_manual_amount() -> anyhow::Result<Option<FormattedAmount>> {
    let term = Term::stderr();
    loop {
        let _ = term.write_str("Enter the total manually (blank to skip): ");
        let answer = term.read_line()?;
        if answer.trim().is_empty() {
            return Ok(None);
        }
        match answer.parse::<FormattedAmount>() {
            Ok(amount) => return Ok(Some(amount)),
            Err(e) => eprintln!("{} {}", style("✗").red(), e),
        }
    }
}
