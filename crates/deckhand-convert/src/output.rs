//! Output routing: one multi-document stream, or one file per resource.

use deckhand_api::Resource;
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Sentinel output directory that selects the stream sink.
pub const STREAM_SENTINEL: &str = "-";
pub const DOCUMENT_SEPARATOR: &[u8] = b"---\n";

/// Where the artifacts of a run go. Chosen once per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Stream,
    Directory(PathBuf),
}

impl OutputTarget {
    pub fn parse(value: &str) -> Result<Self, String> {
        match value {
            "" => Err("output directory must not be empty (use `-` for stdout)".to_string()),
            STREAM_SENTINEL => Ok(Self::Stream),
            dir => Ok(Self::Directory(PathBuf::from(dir))),
        }
    }
}

impl fmt::Display for OutputTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stream => f.write_str(STREAM_SENTINEL),
            Self::Directory(dir) => write!(f, "{}", dir.display()),
        }
    }
}

/// What happens when two resources of one run map to the same file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CollisionPolicy {
    /// The later resource replaces the earlier file.
    #[default]
    Overwrite,
    Reject,
}

#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error("{kind} has no name to derive a file name from")]
    MissingName { kind: &'static str },

    /// The name would place the file outside the output directory.
    #[error("{kind} name `{name}` cannot be used as a file name")]
    UnsafeName { kind: &'static str, name: String },

    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write to output stream: {0}")]
    Stream(#[source] io::Error),

    #[error("{} was already written in this run", path.display())]
    Collision { path: PathBuf },
}

/// Destination of one routed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Routed {
    Stream,
    File(PathBuf),
}

impl fmt::Display for Routed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stream => f.write_str(STREAM_SENTINEL),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Debug)]
enum Destination<W> {
    Stream(W),
    Directory(PathBuf),
}

/// Delivers serialized documents to the run's [`OutputTarget`].
#[derive(Debug)]
pub struct OutputRouter<W> {
    destination: Destination<W>,
    collisions: CollisionPolicy,
    written: BTreeSet<PathBuf>,
}

impl<W: Write> OutputRouter<W> {
    /// `sink` receives the documents in stream mode and is unused otherwise.
    pub fn new(target: OutputTarget, sink: W, collisions: CollisionPolicy) -> Self {
        let destination = match target {
            OutputTarget::Stream => Destination::Stream(sink),
            OutputTarget::Directory(dir) => Destination::Directory(dir),
        };
        Self {
            destination,
            collisions,
            written: BTreeSet::new(),
        }
    }

    pub fn route(&mut self, resource: &Resource, data: &[u8]) -> Result<Routed, RouteError> {
        match &mut self.destination {
            Destination::Stream(sink) => {
                sink.write_all(DOCUMENT_SEPARATOR)
                    .and_then(|()| sink.write_all(data))
                    .and_then(|()| sink.flush())
                    .map_err(RouteError::Stream)?;
                Ok(Routed::Stream)
            }
            Destination::Directory(dir) => {
                let name = resource.name().ok_or(RouteError::MissingName {
                    kind: resource.kind(),
                })?;
                if !is_safe_file_component(name) {
                    return Err(RouteError::UnsafeName {
                        kind: resource.kind(),
                        name: name.to_string(),
                    });
                }
                let path = dir.join(file_name(resource.kind(), name));
                if !self.written.insert(path.clone()) {
                    match self.collisions {
                        CollisionPolicy::Overwrite => {
                            tracing::warn!(
                                path = %path.display(),
                                "overwriting file written earlier in this run"
                            );
                        }
                        CollisionPolicy::Reject => return Err(RouteError::Collision { path }),
                    }
                }
                write_file(&path, data)?;
                Ok(Routed::File(path))
            }
        }
    }

    /// Give back the stream sink, if this router owns one.
    pub fn into_sink(self) -> Option<W> {
        match self.destination {
            Destination::Stream(sink) => Some(sink),
            Destination::Directory(_) => None,
        }
    }
}

/// `<lowercase kind>-<name>.yaml`
pub fn file_name(kind: &str, name: &str) -> String {
    format!("{}-{name}.yaml", kind.to_lowercase())
}

/// No path separators or NUL bytes.
fn is_safe_file_component(name: &str) -> bool {
    !name.contains(['/', '\\', '\0'])
}

fn write_file(path: &Path, data: &[u8]) -> Result<(), RouteError> {
    fs::write(path, data).map_err(|source| RouteError::Io {
        path: path.to_path_buf(),
        source,
    })
}
