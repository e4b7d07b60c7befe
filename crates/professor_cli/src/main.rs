//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `professor_core` linkage.
//! - Walk one question through create, check and morph.

use log::info;
use professor_core::{
    core_version, init_logging, Attributes, CoreConfig, IndelRatio, QuestionRegistry, Response,
    VariantKind,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("professor: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = CoreConfig::from_env()?;
    if config.log_dir.is_some() {
        init_logging(&config)?;
    }

    println!("professor_core version={}", core_version());

    let mut registry = QuestionRegistry::from_config(&config);
    let handle = registry.create(
        VariantKind::FreeResponse,
        Attributes::new()
            .with("text", "How many sides does a hexagon have?")
            .with("answer", "6"),
    )?;
    info!("event=cli_smoke module=cli status=ok handle={handle}");

    let response = Response::Text("6".to_string());
    if let Some(question) = registry.get(handle) {
        println!(
            "{} check={}",
            question.kind(),
            question.check(&response, &IndelRatio)
        );
    }

    registry.morph(handle, VariantKind::Numeric, Attributes::new())?;
    if let Some(question) = registry.get(handle) {
        println!(
            "{} answer={:?} check={}",
            question.kind(),
            question.common().answer(),
            question.check(&response, &IndelRatio)
        );
    }

    Ok(())
}
