//! `reelsync plan`: preview the reconciliation without side effects.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use reelsync_core::AssetId;
use reelsync_sync::{pipeline, ChangeReason, PlannedRun};

use super::resolve_root;

/// Arguments for `reelsync plan`.
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Repository root (defaults to the current directory).
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl PlanArgs {
    pub fn run(self) -> Result<()> {
        let root = resolve_root(self.root)?;
        let planned = pipeline::plan(&root)
            .with_context(|| format!("plan failed for '{}'", root.display()))?;

        let rows = build_rows(&planned);
        if self.json {
            print_json(&planned, rows)?;
            return Ok(());
        }

        print_table(&planned, rows);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
enum Action {
    New,
    Changed,
    Delete,
    Unchanged,
}

#[derive(Debug, Clone, Serialize)]
struct PlanRow {
    id: String,
    action: Action,
    source: Option<String>,
}

#[derive(Serialize)]
struct PlanJson {
    changed: bool,
    to_convert: usize,
    to_delete: usize,
    unchanged: usize,
    assets: Vec<PlanRow>,
}

#[derive(Tabled)]
struct PlanTableRow {
    #[tabled(rename = "asset")]
    id: String,
    #[tabled(rename = "action")]
    action: String,
    #[tabled(rename = "source")]
    source: String,
}

fn build_rows(planned: &PlannedRun) -> Vec<PlanRow> {
    let source_of = |id: &AssetId| {
        planned
            .sources
            .get(id)
            .map(|asset| asset.path.display().to_string())
    };

    let mut rows = Vec::new();
    for c in &planned.plan.to_convert {
        rows.push(PlanRow {
            id: c.id.to_string(),
            action: match c.reason {
                ChangeReason::New => Action::New,
                ChangeReason::Changed => Action::Changed,
            },
            source: source_of(&c.id),
        });
    }
    for id in &planned.plan.to_delete {
        rows.push(PlanRow {
            id: id.to_string(),
            action: Action::Delete,
            source: None,
        });
    }
    for id in &planned.plan.unchanged {
        rows.push(PlanRow {
            id: id.to_string(),
            action: Action::Unchanged,
            source: source_of(id),
        });
    }
    rows.sort_by(|a, b| a.id.cmp(&b.id));
    rows
}

fn print_json(planned: &PlannedRun, rows: Vec<PlanRow>) -> Result<()> {
    let payload = PlanJson {
        changed: !planned.plan.is_empty(),
        to_convert: planned.plan.to_convert.len(),
        to_delete: planned.plan.to_delete.len(),
        unchanged: planned.plan.unchanged.len(),
        assets: rows,
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize plan JSON")?
    );
    Ok(())
}

fn print_table(planned: &PlannedRun, rows: Vec<PlanRow>) {
    println!(
        "reelsync v{} | {} to convert | {} to delete | {} unchanged",
        env!("CARGO_PKG_VERSION"),
        planned.plan.to_convert.len(),
        planned.plan.to_delete.len(),
        planned.plan.unchanged.len(),
    );

    if rows.is_empty() {
        println!("No source videos and no recorded previews.");
        return;
    }

    let table_rows: Vec<PlanTableRow> = rows
        .into_iter()
        .map(|row| PlanTableRow {
            id: row.id,
            action: action_label(row.action),
            source: row.source.unwrap_or_else(|| "-".to_string()),
        })
        .collect();
    let mut table = Table::new(table_rows);
    table.with(Style::rounded());
    println!("{table}");

    if !planned.plan.is_empty() {
        println!("Run 'reelsync sync' to apply.");
    }
}

fn action_label(action: Action) -> String {
    match action {
        Action::New => "NEW".green().bold().to_string(),
        Action::Changed => "CHANGED".yellow().bold().to_string(),
        Action::Delete => "DELETE".red().bold().to_string(),
        Action::Unchanged => "UNCHANGED".bright_black().to_string(),
    }
}
