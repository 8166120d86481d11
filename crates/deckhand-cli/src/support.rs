use crate::config::FileConfig;
use serde::Serialize;
use std::fmt::Display;
use std::path::Path;

pub fn load_config_or_exit(path: Option<&Path>) -> FileConfig {
    FileConfig::load(path).unwrap_or_else(|e| exit_with(e))
}

pub fn exit_with(error: impl Display) -> ! {
    eprintln!("error: {error}");
    std::process::exit(1);
}

pub fn print_json<T: Serialize>(value: &T) {
    let rendered = serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| exit_with(format!("failed to render json: {e}")));
    println!("{rendered}");
}
