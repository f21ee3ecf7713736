use crate::view::OutlineNode;
use crate::{read_source, source_name};
use serde::Serialize;
use srcsync_core::{SourceStatus, SyncSettings, SynchronizationContext};
use srcsync_java::JavaParser;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

#[derive(Serialize)]
struct Outline {
    file: String,
    status: SourceStatus,
    package: Option<String>,
    imports: Vec<String>,
    classes: Vec<OutlineNode>,
}

pub fn run(path: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let context = SynchronizationContext::new(SyncSettings::default());
    let coordinator = context.open_source(
        source_name(path),
        read_source(path)?,
        Arc::new(JavaParser::new()?),
    );
    let report = coordinator.reparse_now()?;
    info!("Outlined {} ({})", path.display(), report.status);

    let model = coordinator.file().read();
    let outline = Outline {
        file: source_name(path),
        status: report.status,
        package: model.package().map(|p| p.to_string()),
        imports: model
            .imports()
            .iter()
            .map(|i| {
                let name = i.name.to_string();
                match (i.is_static, i.on_demand) {
                    (true, true) => format!("static {}.*", name),
                    (true, false) => format!("static {}", name),
                    (false, true) => format!("{}.*", name),
                    (false, false) => name,
                }
            })
            .collect(),
        classes: model
            .classes()
            .into_iter()
            .map(|id| OutlineNode::build(&model, id))
            .collect::<srcsync_core::Result<Vec<_>>>()?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&outline)?);
        return Ok(());
    }

    let mut out = String::new();
    if let Some(package) = &outline.package {
        out.push_str(&format!("package {}\n", package));
    }
    for import in &outline.imports {
        out.push_str(&format!("import {}\n", import));
    }
    for class in &outline.classes {
        class.render(0, &mut out);
    }
    if report.status == SourceStatus::Partial {
        out.push_str(&format!(
            "{}\n",
            nu_ansi_term::Color::Yellow.paint("(file has syntax errors; outline is best effort)")
        ));
    }
    print!("{}", out);
    Ok(())
}
