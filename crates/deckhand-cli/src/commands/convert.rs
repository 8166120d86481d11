use crate::config::{ConvertArgs, resolve_options};
use crate::support::{exit_with, load_config_or_exit};
use deckhand_api::Scheme;
use deckhand_convert::run_convert;
use deckhand_encoding::DecoderRegistry;
use std::io;
use std::path::Path;

pub fn run(config: Option<&Path>, args: ConvertArgs) {
    let file_config = load_config_or_exit(config);
    let options = resolve_options(args, file_config);

    let registry = DecoderRegistry::with_defaults();
    let scheme = Scheme::standard();
    let stdout = io::stdout().lock();
    let summary = run_convert(&options, &registry, &scheme, stdout).unwrap_or_else(|e| {
        tracing::debug!(category = %e.category(), "conversion failed");
        exit_with(e)
    });

    for emitted in &summary.emitted {
        tracing::info!(
            kind = emitted.kind,
            api_version = %emitted.api_version,
            name = emitted.name.as_deref().unwrap_or(""),
            to = %emitted.routed,
            "wrote"
        );
    }
    if !summary.faults.is_empty() {
        tracing::warn!(
            faults = summary.faults.len(),
            "converted a declaration with validation faults \
             (use --strict-validation to fail instead)"
        );
    }
}
