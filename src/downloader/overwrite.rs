//! Overwrite policy for files that already exist locally
//!
//! A run starts [`OverwriteDecision::Undecided`]. The first conflict asks the
//! user once and the answer sticks for every later conflict of the run, no
//! matter which product triggered it. An explicit overwrite flag bypasses the
//! state entirely.
//!
//! The decision itself is pure ([`OverwriteDecision::resolve`] and
//! [`OverwriteDecision::after_answer`]); asking goes through the injected
//! [`Confirm`] capability.

use async_trait::async_trait;
use indicatif::ProgressBar;
use std::io::{BufRead, Write};
use tokio::sync::Mutex;
use tracing::debug;

use super::config::{NOT_BILLED_MESSAGE, OVERWRITE_PROMPT};
use super::progress::ProgressObserver;

/// Run-scoped overwrite decision
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OverwriteDecision {
    /// No conflict seen yet in this run
    #[default]
    Undecided,
    /// Existing files may be replaced
    Allow,
    /// Existing files are kept
    Deny,
}

/// What to do with the current conflicting file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyStep {
    /// Replace the file
    Overwrite,
    /// Keep the file
    Skip,
    /// Ask the user, then apply [`OverwriteDecision::after_answer`]
    Ask,
}

impl OverwriteDecision {
    /// Next step for a conflict given the per-call flag and the current state
    pub fn resolve(self, overwrite_flag: bool) -> PolicyStep {
        if overwrite_flag {
            return PolicyStep::Overwrite;
        }

        match self {
            OverwriteDecision::Allow => PolicyStep::Overwrite,
            OverwriteDecision::Deny => PolicyStep::Skip,
            OverwriteDecision::Undecided => PolicyStep::Ask,
        }
    }

    /// State after the user answered; decided states never change
    pub fn after_answer(self, answer: bool) -> OverwriteDecision {
        match self {
            OverwriteDecision::Undecided if answer => OverwriteDecision::Allow,
            OverwriteDecision::Undecided => OverwriteDecision::Deny,
            decided => decided,
        }
    }

    /// Whether this state permits overwriting
    pub fn permits(self) -> bool {
        matches!(self, OverwriteDecision::Allow)
    }
}

/// Yes/no confirmation capability
#[async_trait]
pub trait Confirm: Send + Sync {
    /// Ask a yes/no question; `false` is the default answer
    async fn confirm(&self, prompt: &str) -> bool;
}

/// Confirmation that always gives the same answer (non-interactive runs)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedAnswer(pub bool);

#[async_trait]
impl Confirm for FixedAnswer {
    async fn confirm(&self, prompt: &str) -> bool {
        debug!(prompt = %prompt, answer = self.0, "Answering confirmation non-interactively");
        self.0
    }
}

/// Confirmation read from the terminal (`[y/N]`)
///
/// When a progress bar is attached the bar is hidden while the question is
/// on screen.
#[derive(Debug, Clone, Default)]
pub struct TerminalConfirm {
    bar: Option<ProgressBar>,
}

impl TerminalConfirm {
    /// Prompt with `bar` suspended
    pub fn with_progress_bar(bar: ProgressBar) -> Self {
        Self { bar: Some(bar) }
    }
}

#[async_trait]
impl Confirm for TerminalConfirm {
    async fn confirm(&self, prompt: &str) -> bool {
        let prompt = prompt.to_string();
        let bar = self.bar.clone();
        let answer = tokio::task::spawn_blocking(move || {
            let mut stdin = std::io::stdin().lock();
            let mut stderr = std::io::stderr();
            ask_suspended(bar.as_ref(), &prompt, &mut stdin, &mut stderr)
        })
        .await;

        answer.unwrap_or(false)
    }
}

/// Ask `prompt` with the progress bar, if any, hidden
fn ask_suspended(
    bar: Option<&ProgressBar>,
    prompt: &str,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> bool {
    match bar {
        Some(bar) => bar.suspend(|| ask(prompt, input, output)),
        None => ask(prompt, input, output),
    }
}

fn ask(prompt: &str, input: &mut impl BufRead, output: &mut impl Write) -> bool {
    let _ = write!(output, "{prompt} [y/N]: ");
    let _ = output.flush();

    let mut line = String::new();
    match input.read_line(&mut line) {
        Ok(_) => parse_answer(&line),
        Err(_) => false,
    }
}

/// Interpret a typed answer, defaulting to no
fn parse_answer(input: &str) -> bool {
    matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Caller-owned overwrite state for one run
///
/// Shared by reference across every batch of the run. The lock is held while
/// the user is asked, so concurrent batches never ask twice.
#[derive(Debug, Default)]
pub struct OverwriteState {
    decision: Mutex<OverwriteDecision>,
}

impl OverwriteState {
    /// Create an undecided state
    pub fn new() -> Self {
        Self::default()
    }

    /// Current decision
    pub async fn decision(&self) -> OverwriteDecision {
        *self.decision.lock().await
    }

    /// Decide whether an existing local file may be replaced, asking at most
    /// once per run
    ///
    /// Unless overwriting is already permitted, the observer is warned that
    /// `display_path` exists, and again that nothing was billed when the file
    /// is kept.
    pub async fn should_overwrite(
        &self,
        overwrite_flag: bool,
        display_path: &str,
        confirm: &dyn Confirm,
        observer: &dyn ProgressObserver,
    ) -> bool {
        if overwrite_flag {
            return true;
        }

        let mut decision = self.decision.lock().await;
        let permitted = match decision.resolve(false) {
            PolicyStep::Overwrite => return true,
            PolicyStep::Skip => {
                observer.warning(&already_exists_message(display_path));
                false
            }
            PolicyStep::Ask => {
                observer.warning(&already_exists_message(display_path));
                let answer = confirm.confirm(OVERWRITE_PROMPT).await;
                *decision = decision.after_answer(answer);
                debug!(decision = ?*decision, "Overwrite decision taken for this run");
                decision.permits()
            }
        };

        if !permitted {
            observer.warning(NOT_BILLED_MESSAGE);
        }
        permitted
    }
}

fn already_exists_message(path: &str) -> String {
    format!("{path} already exists, use --overwrite to overwrite it")
}
