//! Run command - dispatch items through the pipeline.

use crate::cli::{preflight, Output};
use crate::config::Settings;
use crate::error::TalerError;
use crate::orchestrator::{discover_items, Mode, Orchestrator, RunOutcome};

/// Run the pipeline over the given ids, or the whole data directory.
pub async fn run_pipeline(
    ids: &[String],
    mode: &str,
    workers: Option<usize>,
    mut settings: Settings,
) -> anyhow::Result<()> {
    let mode: Mode = mode
        .parse()
        .map_err(TalerError::Config)?;

    if let Some(workers) = workers {
        settings.batch.workers = workers;
    }

    preflight::check(&settings, mode)?;

    let ids = if ids.is_empty() {
        discover_items(&settings.data_dir())?
    } else {
        ids.to_vec()
    };

    if ids.is_empty() {
        Output::warning("No items found. Populate the data directory first.");
        return Ok(());
    }

    Output::info(&format!("Processing {} item(s) in {} mode", ids.len(), mode));

    let orchestrator = Orchestrator::new(settings)?;
    let summary = orchestrator.run_all(ids, mode).await;

    println!();
    for report in &summary.reports {
        match &report.outcome {
            Ok(RunOutcome::Completed) => Output::list_item(&format!("{}: completed", report.id)),
            Ok(RunOutcome::AlreadyComplete) => {
                Output::list_item(&format!("{}: already complete", report.id))
            }
            Err(e) => Output::list_item(&format!("{}: failed ({})", report.id, e)),
        }
    }

    println!();
    if summary.failed() > 0 {
        Output::warning(&format!(
            "{} of {} item(s) failed; see the log for details.",
            summary.failed(),
            summary.reports.len()
        ));
    } else {
        Output::success(&format!("All {} item(s) processed.", summary.reports.len()));
    }

    Ok(())
}
