use crate::support::{exit_with, load_config_or_exit, print_json};
use deckhand_convert::load;
use deckhand_encoding::DecoderRegistry;
use deckhand_model::ValidationFault;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValidationReport {
    source: String,
    valid: bool,
    services: usize,
    volumes: usize,
    faults: Vec<ValidationFault>,
    discarded: Vec<String>,
}

pub fn run(config: Option<&Path>, files: Vec<PathBuf>, json: bool) {
    let files = if files.is_empty() {
        load_config_or_exit(config).files
    } else {
        files
    };
    let loaded = load(&files, &DecoderRegistry::with_defaults()).unwrap_or_else(|e| exit_with(e));

    let faults = match loaded.validation {
        Ok(()) => Vec::new(),
        Err(errors) => errors.faults,
    };
    let report = ValidationReport {
        source: loaded.source.display().to_string(),
        valid: faults.is_empty(),
        services: loaded.declaration.services.len(),
        volumes: loaded.declaration.volumes.len(),
        faults,
        discarded: loaded
            .discarded
            .iter()
            .map(|path| path.display().to_string())
            .collect(),
    };

    if json {
        print_json(&report);
    } else if report.valid {
        println!(
            "ok: {} ({} services, {} volumes)",
            report.source, report.services, report.volumes
        );
    } else {
        println!("{}: {} validation fault(s)", report.source, report.faults.len());
        for fault in &report.faults {
            println!("  - {}: {} [{}]", fault.path, fault.message, fault.failure_class);
        }
    }

    if !report.valid {
        std::process::exit(1);
    }
}
