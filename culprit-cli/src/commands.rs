//! CLI subcommand handlers.

use anyhow::Context;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::Commands;
use crate::ConfigAction;
use crate::build_file;
use culprit_core::report::{AggregateReport, BuildReport};
use culprit_core::{
    AggregatedAnalysis, Classifier, CulpritConfig, FailureAnalyzer, JobSnapshot, ViewStats,
    build_summary, failure_text, on_build_completed,
};

/// Handle a CLI subcommand.
pub async fn handle_command(command: Commands, config: &CulpritConfig) -> anyhow::Result<()> {
    match command {
        Commands::Classify { text, stack_trace } => {
            println!("{}", classify_line(&text, stack_trace.as_deref())?);
            Ok(())
        }
        Commands::Analyze { build, output } => handle_analyze(&build, output.as_deref()).await,
        Commands::Aggregate { builds, output } => {
            handle_aggregate(builds, output.as_deref(), config).await
        }
        Commands::Dashboard { view } => handle_dashboard(&view, config).await,
        Commands::Config { action } => handle_config(action, config),
    }
}

fn classify_line(text: &str, stack_trace: Option<&str>) -> anyhow::Result<String> {
    let classifier = Classifier::with_builtin_rules()?;
    let blob = failure_text(Some(text), stack_trace);
    let line = match classifier.classify_with_rule(&blob) {
        Some(hit) => format!(
            "{} ({}) matched rule #{} `{}`",
            hit.category,
            hit.category.label(),
            hit.rule_index,
            hit.pattern
        ),
        None => {
            let unknown = culprit_core::FailureCategory::Unknown;
            format!("{} ({}): no rule matched", unknown, unknown.label())
        }
    };
    Ok(line)
}

async fn handle_analyze(path: &Path, output: Option<&Path>) -> anyhow::Result<()> {
    let analyzer = FailureAnalyzer::with_builtin_rules()?;
    let build = build_file::load_build(path)?;
    let result = analyzer.analyze(&build);
    tracing::info!("{} #{}: {}", build.job, build.number, build_summary(&result));
    emit(&BuildReport::from(&result), output).await
}

async fn handle_aggregate(
    paths: Vec<PathBuf>,
    output: Option<&Path>,
    config: &CulpritConfig,
) -> anyhow::Result<()> {
    let aggregate = aggregate_builds(paths, config).await?;
    tracing::info!(
        "Aggregated {} failures across {} categories",
        aggregate.total_failures(),
        aggregate.categories_with_failures()
    );
    emit(&AggregateReport::new(&aggregate, &config.report), output).await
}

/// Analyze build files on the blocking pool and merge them in argument order.
///
/// Files that cannot be read or decoded are logged and skipped.
async fn aggregate_builds(
    paths: Vec<PathBuf>,
    config: &CulpritConfig,
) -> anyhow::Result<AggregatedAnalysis> {
    let analyzer = Arc::new(FailureAnalyzer::with_builtin_rules()?);

    let tasks = paths.into_iter().map(|path| {
        let analyzer = Arc::clone(&analyzer);
        tokio::task::spawn_blocking(move || {
            let result = build_file::load_build(&path).map(|build| analyzer.analyze(&build));
            (path, result)
        })
    });
    let outcomes = futures::future::join_all(tasks).await;

    let mut aggregate =
        AggregatedAnalysis::with_example_limit(config.aggregate.max_examples_per_category);
    for outcome in outcomes {
        match outcome {
            Ok((_, Ok(result))) => aggregate.merge(&result),
            Ok((path, Err(e))) => {
                tracing::warn!("Skipping {}: {:#}", path.display(), e);
            }
            Err(e) => tracing::warn!("Analysis task failed: {}", e),
        }
    }
    Ok(aggregate)
}

async fn handle_dashboard(path: &Path, config: &CulpritConfig) -> anyhow::Result<()> {
    if !config.dashboard.enabled {
        println!("Dashboard is disabled. Set dashboard.enabled = true to use it.");
        return Ok(());
    }
    let stats = view_stats(path, config)?;
    emit(&stats, None).await
}

fn view_stats(path: &Path, config: &CulpritConfig) -> anyhow::Result<ViewStats> {
    let analyzer = FailureAnalyzer::with_builtin_rules()?;
    let jobs: Vec<JobSnapshot> = build_file::load_view(path)?
        .into_iter()
        .map(|build| {
            let analysis = if config.dashboard.show_failure_analysis {
                on_build_completed(&analyzer, &build)
            } else {
                None
            };
            JobSnapshot {
                name: build.job,
                last_outcome: build.outcome,
                analysis,
            }
        })
        .collect();
    Ok(ViewStats::collect(&jobs))
}

fn handle_config(action: ConfigAction, config: &CulpritConfig) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            let toml_str = toml::to_string_pretty(config)?;
            println!("{}", toml_str);
            Ok(())
        }
    }
}

async fn emit<T: Serialize>(value: &T, output: Option<&Path>) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            tokio::fs::write(path, json)
                .await
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            tracing::info!("Report written to {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}
