//! Colored terminal rendering for reconciliation previews and sync reports.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use duesync_core::Event;
use duesync_core::reconcile::{ChangeKind, ExclusionReason, PendingUpdate, ReconciliationResult};
use duesync_core::sync::{SyncPlan, SyncReport};
use owo_colors::OwoColorize;

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for ChangeKind {
    fn render(&self) -> String {
        let symbol = self.symbol();
        match self {
            ChangeKind::Create => symbol.green().to_string(),
            ChangeKind::Update => symbol.yellow().to_string(),
        }
    }
}

fn colorize(kind: ChangeKind, text: &str) -> String {
    match kind {
        ChangeKind::Create => text.green().to_string(),
        ChangeKind::Update => text.yellow().to_string(),
    }
}

fn render_time(at: DateTime<Utc>, tz: Tz) -> String {
    at.with_timezone(&tz).format("%Y-%m-%d %H:%M %Z").to_string()
}

fn render_subject(event: &Event) -> String {
    if event.subject.is_empty() {
        String::new()
    } else {
        format!("[{}]", event.subject)
    }
}

fn render_change(kind: ChangeKind, event: &Event, tz: Tz) -> String {
    format!(
        "{} {} {} {}",
        kind.render(),
        colorize(kind, &event.to_string()),
        render_subject(event).dimmed(),
        render_time(event.due_at, tz).dimmed()
    )
}

/// A pending update with its old and new due date.
fn render_update(update: &PendingUpdate, tz: Tz) -> String {
    format!(
        "{}\n      {}: {} → {}",
        render_change(ChangeKind::Update, &update.event, tz),
        "due".dimmed(),
        render_time(update.previous_due_at, tz).red(),
        render_time(update.event.due_at, tz).green()
    )
}

/// Above this many pending changes, show counts instead of individual events
const COMPACT_THRESHOLD: usize = 5;

fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}

/// Render pending creates and updates, compact when there are many.
/// Due dates are shown in `tz`.
pub fn render_result(result: &ReconciliationResult, verbose: bool, tz: Tz) -> String {
    if result.is_empty() {
        return "   No changes".dimmed().to_string();
    }

    let mut lines = Vec::new();
    let pending = result.to_create.len() + result.to_update.len();

    if verbose || pending <= COMPACT_THRESHOLD {
        for event in &result.to_create {
            lines.push(format!("   {}", render_change(ChangeKind::Create, event, tz)));
        }
        for update in &result.to_update {
            lines.push(format!("   {}", render_update(update, tz)));
        }
    } else {
        let creates = result.to_create.len();
        let updates = result.to_update.len();

        if creates > 0 {
            let label = format!("({} new {})", creates, pluralize("event", creates));
            lines.push(format!("   {} {}", "+".green(), label.green()));
        }
        if updates > 0 {
            let label = format!("({} changed {})", updates, pluralize("event", updates));
            lines.push(format!("   {} {}", "~".yellow(), label.yellow()));
        }
    }

    lines.join("\n")
}

/// One dimmed line with unchanged and excluded counts.
pub fn render_skipped(result: &ReconciliationResult) -> String {
    let openings = result.excluded_count(ExclusionReason::Opening);
    let untracked = result.excluded_count(ExclusionReason::UntrackedSubject);

    format!(
        "   {} unchanged, {} excluded ({} {}, {} {})",
        result.unchanged.len(),
        result.excluded.len(),
        openings,
        ExclusionReason::Opening,
        untracked,
        ExclusionReason::UntrackedSubject
    )
    .dimmed()
    .to_string()
}

/// Header line describing what was compared.
pub fn render_plan_header(plan: &SyncPlan, tz: Tz) -> String {
    let mut header = format!(
        "📅 {} feed {}, {} remote {} due from {}",
        plan.feed_events,
        pluralize("event", plan.feed_events),
        plan.remote_records,
        pluralize("record", plan.remote_records),
        render_time(plan.window.after, tz)
    );
    if plan.past_events > 0 {
        header.push_str(&format!(" ({} already past)", plan.past_events).dimmed().to_string());
    }
    header
}

impl Render for SyncReport {
    fn render(&self) -> String {
        let mut lines = Vec::new();

        for failure in &self.failed {
            lines.push(format!(
                "   {} {} {}",
                "✗".red(),
                failure.event.to_string().red(),
                failure.error.dimmed()
            ));
        }

        lines.push(format!(
            "Synced: {} created, {} updated",
            self.applied_count(ChangeKind::Create),
            self.applied_count(ChangeKind::Update)
        ));

        if self.has_failures() {
            lines.push(
                format!(
                    "Failed: {} create, {} update",
                    self.failed_count(ChangeKind::Create),
                    self.failed_count(ChangeKind::Update)
                )
                .red()
                .to_string(),
            );
        }

        lines.join("\n")
    }
}
