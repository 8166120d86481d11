//! YAML rendering of stamped resources.

use deckhand_api::Resource;

#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    /// The resource never passed through version resolution.
    #[error("{kind} has no apiVersion; resolve its version before serializing")]
    Unversioned { kind: &'static str },

    #[error("yaml encoding failed: {0}")]
    Yaml(#[source] serde_yaml::Error),
}

/// Render one resource as a YAML document (no leading `---`).
pub fn serialize(resource: &Resource) -> Result<Vec<u8>, SerializeError> {
    if !resource.type_meta().is_stamped() {
        return Err(SerializeError::Unversioned {
            kind: resource.kind(),
        });
    }
    let text = serde_yaml::to_string(resource).map_err(SerializeError::Yaml)?;
    Ok(text.into_bytes())
}
