//! Version resolution: stamp each resource with its serializable
//! `apiVersion`/`kind` from the run's [`Scheme`].

use deckhand_api::{GroupVersionKind, Registration, Resource, Scheme};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionError {
    #[error("kind `{kind}` is not registered in the scheme")]
    NotRegistered { kind: String },

    /// The kind exists only in an internal, unversioned form.
    #[error("kind `{kind}` is unversioned and cannot be output")]
    Unversioned { kind: String },
}

/// Read-only view over the scheme for one run.
#[derive(Debug, Clone, Copy)]
pub struct VersionResolver<'a> {
    scheme: &'a Scheme,
}

impl<'a> VersionResolver<'a> {
    pub fn new(scheme: &'a Scheme) -> Self {
        Self { scheme }
    }

    /// Look up the registered group/version for `resource` and write it into
    /// the resource's type metadata.
    pub fn resolve(&self, resource: &mut Resource) -> Result<GroupVersionKind, VersionError> {
        let kind = resource.kind();
        let gvk = match self.scheme.lookup(kind) {
            Some(Registration::Versioned(group_version)) => group_version.with_kind(kind),
            Some(Registration::Unversioned) => {
                return Err(VersionError::Unversioned { kind: kind.into() });
            }
            None => return Err(VersionError::NotRegistered { kind: kind.into() }),
        };
        resource.type_meta_mut().set_group_version_kind(&gvk);
        Ok(gvk)
    }
}
