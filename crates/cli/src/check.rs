use crate::view::ActionView;
use crate::{read_source, source_name};
use nu_ansi_term::Color;
use srcsync_api::SourceParser;
use srcsync_core::sync::InterfaceSyncEngine;
use srcsync_core::{SourceStatus, SyncSettings, SynchronizationContext};
use srcsync_java::JavaParser;
use std::path::PathBuf;
use std::sync::Arc;
use tabled::Table;
use tabled::settings::Style;
use tracing::{info, warn};

/// Opens all files in one session so implementors in one file see
/// interfaces declared in another.
pub fn run(files: &[PathBuf], apply: bool, settings: SyncSettings) -> Result<(), Box<dyn std::error::Error>> {
    let context = SynchronizationContext::new(settings);
    let parser: Arc<dyn SourceParser> = Arc::new(JavaParser::new()?);

    let mut opened = Vec::new();
    for path in files {
        let original = read_source(path)?;
        let coordinator = context.open_source(source_name(path), original.clone(), parser.clone());
        let report = coordinator.reparse_now()?;
        if report.status == SourceStatus::Partial {
            warn!("{} has syntax errors, results may be incomplete", path.display());
        }
        opened.push((path, original, coordinator));
    }

    let engine = InterfaceSyncEngine::new(context.clone());
    let actions: Vec<_> = opened
        .iter()
        .flat_map(|(_, _, coordinator)| engine.plan_deep_check(coordinator.file()))
        .collect();

    if actions.is_empty() {
        println!("{}", Color::Green.paint("All classes implement their interfaces."));
        return Ok(());
    }

    let views: Vec<ActionView> = actions.iter().map(ActionView::from).collect();
    println!("{}", Table::new(&views).with(Style::psql()).to_string());

    if !apply {
        println!(
            "{} action(s) proposed. Run with --apply to write them.",
            actions.len()
        );
        return Ok(());
    }

    let mut failed = 0;
    for action in &actions {
        if let Err(e) = engine.apply(action) {
            eprintln!("{} {}: {}", Color::Red.paint("failed"), action, e);
            failed += 1;
        }
    }

    for (path, original, coordinator) in &opened {
        let text = coordinator.file().document().text();
        if &text != original {
            std::fs::write(path, text)?;
            info!("Wrote {}", path.display());
        }
    }

    println!("Applied {} of {} action(s).", actions.len() - failed, actions.len());
    Ok(())
}
