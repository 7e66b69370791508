// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Operator-facing output.

use colored::Colorize;

use statsctl_core::application::{AggregationDeletion, LifecycleObserver};
use statsctl_core::bookmark::Bookmark;
use statsctl_core::index::{IndexAction, IndexPartition, LifecycleReport, TypeOutcome};
use statsctl_core::job::DispatchOutcome;
use statsctl_core::type_name::TypeName;

/// Prints lifecycle progress as each type completes.
pub struct ConsoleObserver;

impl LifecycleObserver for ConsoleObserver {
    fn planned(&self, action: IndexAction, partition: &IndexPartition) {
        let verb = match action {
            IndexAction::Delete => "Deleting",
            IndexAction::Restore => "Restoring",
        };
        println!("  {} {}", verb.dimmed(), partition.name);
    }

    fn warning(&self, type_name: &TypeName, message: &str) {
        println!("{}", format!("⚠ {}: {}", type_name, message).yellow());
    }

    fn type_completed(&self, action: IndexAction, outcome: &TypeOutcome) {
        let mut line = format!(
            "✓ {}: {} partition(s) {}",
            outcome.type_name,
            outcome.partitions.len(),
            action.past_tense()
        );
        if action == IndexAction::Restore {
            line.push_str(&format!(", {} document(s) written", outcome.documents));
        }
        if outcome.warnings.is_empty() {
            println!("{}", line.green());
        } else {
            println!("{}", format!("{} ({} warning(s))", line, outcome.warnings.len()).yellow());
        }
    }
}

pub fn print_dispatch(job: &str, outcome: &DispatchOutcome) {
    match outcome {
        DispatchOutcome::Completed { job_id, report } => {
            println!(
                "{}",
                format!("✓ {} completed ({} processed)", job, report.processed)
                    .green()
                    .bold()
            );
            if let Some(message) = &report.message {
                println!("  {}", message);
            }
            println!("  Job: {}", job_id.to_string().dimmed());
        }
        DispatchOutcome::Submitted { job_id, task_id } => {
            println!("{}", format!("⧗ {} submitted", job).yellow().bold());
            println!("  Task: {}", task_id);
            println!("  Job: {}", job_id.to_string().dimmed());
        }
    }
}

pub fn print_report(report: &LifecycleReport) {
    let partitions = report.partitions().count();
    let summary = format!(
        "{} {} partition(s) across {} type(s)",
        capitalize(report.action.past_tense()),
        partitions,
        report.outcomes.len()
    );
    match report.warning_count() {
        0 => println!("{}", summary.green().bold()),
        warnings => println!(
            "{}",
            format!("{} with {} warning(s)", summary, warnings).yellow().bold()
        ),
    }
}

pub fn print_aggregation_deletions(deletions: &[AggregationDeletion]) {
    for deletion in deletions {
        println!(
            "{}",
            format!(
                "✓ {}: {} document(s) deleted",
                deletion.aggregation, deletion.documents
            )
            .green()
        );
    }
}

pub fn print_bookmarks(listing: &[(TypeName, Vec<Bookmark>)]) {
    for (aggregation, bookmarks) in listing {
        println!("{}", aggregation.to_string().bold());
        if bookmarks.is_empty() {
            println!("  {}", "(no bookmarks)".dimmed());
        }
        for bookmark in bookmarks {
            println!("  {}", bookmark.date.format("%Y-%m-%dT%H:%M:%S"));
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
