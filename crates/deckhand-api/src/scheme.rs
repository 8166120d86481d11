//! Kind → version registry.
//!
//! A scheme is built once and only read afterwards; the conversion pipeline
//! receives it explicitly instead of consulting process-wide state.

use crate::apps::Deployment;
use crate::core::{PersistentVolumeClaim, Service};
use crate::meta::GroupVersion;
use crate::networking::Ingress;
use crate::openshift::{DeploymentConfig, ImageStream, Route};
use crate::resource::Object;
use std::collections::BTreeMap;

/// How a kind is known to the scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    /// Has an external, versioned representation.
    Versioned(GroupVersion),
    /// Internal only; must never be written out.
    Unversioned,
}

#[derive(Debug, Clone, Default)]
pub struct Scheme {
    kinds: BTreeMap<String, Registration>,
}

impl Scheme {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every kind deckhand's transformers emit, at its stable version.
    pub fn standard() -> Self {
        let core = GroupVersion::new("", "v1");
        let apps = GroupVersion::new("apps", "v1");
        let networking = GroupVersion::new("networking.k8s.io", "v1");
        let openshift_apps = GroupVersion::new("apps.openshift.io", "v1");
        let openshift_route = GroupVersion::new("route.openshift.io", "v1");
        let openshift_image = GroupVersion::new("image.openshift.io", "v1");

        let mut scheme = Self::new();
        scheme
            .add_known_kind(Service::KIND, core.clone())
            .add_known_kind(PersistentVolumeClaim::KIND, core)
            .add_known_kind(Deployment::KIND, apps)
            .add_known_kind(Ingress::KIND, networking)
            .add_known_kind(DeploymentConfig::KIND, openshift_apps)
            .add_known_kind(Route::KIND, openshift_route)
            .add_known_kind(ImageStream::KIND, openshift_image);
        scheme
    }

    pub fn add_known_kind(
        &mut self,
        kind: impl Into<String>,
        group_version: GroupVersion,
    ) -> &mut Self {
        self.kinds
            .insert(kind.into(), Registration::Versioned(group_version));
        self
    }

    pub fn add_unversioned_kind(&mut self, kind: impl Into<String>) -> &mut Self {
        self.kinds.insert(kind.into(), Registration::Unversioned);
        self
    }

    pub fn lookup(&self, kind: &str) -> Option<&Registration> {
        self.kinds.get(kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = (&str, &Registration)> {
        self.kinds
            .iter()
            .map(|(kind, registration)| (kind.as_str(), registration))
    }
}
