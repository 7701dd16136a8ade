//! Runsheet CLI library
//!
//! This module contains the core CLI logic for the Runsheet tool: each
//! invocation opens the persisted run sheet, applies one command and
//! persists the result.

pub mod error_adapter;

mod args;
mod config;
mod listing;

pub use args::{Args, Command, ContentArgs, MoveDirection, StageCommand};

use std::{
    io::{self, Write},
    path::PathBuf,
};

use log::{info, warn};

use runsheet::{
    Diagnostic, RunSheet, RunSheetError,
    diagram::StageDiagram,
    identifier::{SegmentId, StageItemId},
    segment::SegmentType,
    stage::StagePoint,
    store::FileStore,
    templates::Template,
};

use error_adapter::{Reportable, warnings_to_reportables};

/// Run the Runsheet CLI application
///
/// This function applies the command to the persisted run sheet and writes
/// any output to standard output.
///
/// # Errors
///
/// Returns `RunSheetError` for:
/// - Configuration loading errors
/// - Store read and write errors
/// - Rejected imports (malformed files, unavailable layout reader, unsupported file types)
pub fn run(args: &Args) -> Result<(), RunSheetError> {
    let stdout = io::stdout();
    run_with_output(args, &mut stdout.lock())
}

/// Run the Runsheet CLI application, writing output to `out`.
///
/// # Errors
///
/// See [`run`].
pub fn run_with_output(args: &Args, out: &mut impl Write) -> Result<(), RunSheetError> {
    let app_config = config::load_config(args.config.as_ref())?;
    let store_dir = args
        .store
        .clone()
        .unwrap_or_else(|| config::store_dir(&app_config));
    info!(store = store_dir.display().to_string(); "Opening run sheet");

    let mut session = runsheet::open_dir(app_config, store_dir)?;

    match &args.command {
        Command::Show { json } => {
            if *json {
                writeln!(out, "{}", session.export()?)?;
            } else {
                listing::write_listing(out, session.document())?;
            }
        }
        Command::Add { segment_type } => {
            let document = session.add(segment_type.clone())?;
            if let Some(segment) = document.segments().last() {
                writeln!(out, "{}", segment.id())?;
            }
        }
        Command::InsertAfter { id, segment_type } => {
            let id = SegmentId::new(id.as_str());
            let before = session.document().len();
            let document = session.insert_after(&id, segment_type.clone())?;
            if document.len() == before {
                warn!(segment_id:% = id; "No segment with this id, nothing inserted");
            } else if let Some(index) = document.position(&id) {
                writeln!(out, "{}", document.segments()[index + 1].id())?;
            }
        }
        Command::Update { id, fields } => {
            let id = SegmentId::new(id.as_str());
            match session.document().get(&id) {
                Some(segment) => {
                    let content = segment.content().merged_with(fields.to_patch());
                    session.update(&id, content)?;
                }
                None => warn!(segment_id:% = id; "No segment with this id, nothing updated"),
            }
        }
        Command::Remove { id } => {
            let id = SegmentId::new(id.as_str());
            if session.document().get(&id).is_none() {
                warn!(segment_id:% = id; "No segment with this id, nothing removed");
            }
            session.remove(&id)?;
        }
        Command::Move { id, direction } => {
            let id = SegmentId::new(id.as_str());
            session.move_segment(&id, (*direction).into())?;
        }
        Command::Reset => {
            session.reset()?;
        }
        Command::Clear => {
            session.clear()?;
        }
        Command::Template { name: None } => {
            for template in Template::ALL {
                writeln!(out, "{:<18} {}", template.name(), template.description())?;
            }
        }
        Command::Template {
            name: Some(template),
        } => {
            session.load_template(*template)?;
        }
        Command::Export { output } => {
            let path = output.clone().unwrap_or_else(|| {
                PathBuf::from(runsheet::export_file_name(chrono::Utc::now().date_naive()))
            });
            session.export_to(&path)?;
            writeln!(out, "{}", path.display())?;
        }
        Command::Import { path } => {
            let warnings = session.import_file(path)?;
            report_warnings(&warnings);
            writeln!(out, "Imported {} segments", session.document().len())?;
        }
        Command::Stage(command) => run_stage(&mut session, command, out)?,
    }

    Ok(())
}

fn run_stage(
    session: &mut RunSheet<FileStore>,
    command: &StageCommand,
    out: &mut impl Write,
) -> Result<(), RunSheetError> {
    let segment_id = match command {
        StageCommand::Add { segment, .. }
        | StageCommand::Place { segment, .. }
        | StageCommand::Remove { segment, .. } => SegmentId::new(segment.as_str()),
    };

    let Some(segment) = session.document().get(&segment_id) else {
        warn!(segment_id:% = segment_id; "No segment with this id");
        return Ok(());
    };
    if segment.segment_type() != &SegmentType::Diagram {
        warn!(segment_id:% = segment_id, segment_type:% = segment.segment_type(); "Segment is not a stage diagram");
        return Ok(());
    }
    let diagram = StageDiagram::of(segment);

    match command {
        StageCommand::Add { kind, .. } => {
            let document = session.edit_diagram(&segment_id, |d| d.add_item(kind.clone()))?;
            let added = document
                .get(&segment_id)
                .and_then(|segment| segment.content().stage_items().last());
            if let Some(item) = added {
                writeln!(out, "{}", item.id())?;
            }
        }
        StageCommand::Place { item, x, y, .. } => {
            let item = StageItemId::new(item.as_str());
            if !diagram.contains(&item) {
                warn!(item_id:% = item; "No prop with this id");
                return Ok(());
            }
            session.edit_diagram(&segment_id, |d| d.place_item(&item, StagePoint::new(*x, *y)))?;
        }
        StageCommand::Remove { item, .. } => {
            let item = StageItemId::new(item.as_str());
            if !diagram.contains(&item) {
                warn!(item_id:% = item; "No prop with this id");
                return Ok(());
            }
            session.edit_diagram(&segment_id, |d| d.remove_item(&item))?;
        }
    }
    Ok(())
}

fn report_warnings(warnings: &[Diagnostic]) {
    for reportable in warnings_to_reportables(warnings) {
        warn!("{}", render(&reportable));
    }
}

/// Renders a reportable with miette's graphical handler.
pub fn render(reportable: &Reportable<'_>) -> String {
    let reporter = miette::GraphicalReportHandler::new();
    let mut writer = String::new();
    if reporter.render_report(&mut writer, reportable).is_err() {
        return reportable.to_string();
    }
    writer
}
