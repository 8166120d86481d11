//! The transformer capability and its closed set of variants.

use crate::distro::Distro;
use crate::error::TransformError;
use crate::kubernetes::KubernetesTransformer;
use crate::openshift::OpenshiftTransformer;
use deckhand_api::Resource;
use deckhand_model::Declaration;

/// Map a declaration onto an ordered list of platform objects.
pub trait Transform {
    fn transform(&self, declaration: &Declaration) -> Result<Vec<Resource>, TransformError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transformer {
    Kubernetes(KubernetesTransformer),
    Openshift(OpenshiftTransformer),
}

impl Transformer {
    pub fn distro(&self) -> Distro {
        match self {
            Self::Kubernetes(_) => Distro::Kubernetes,
            Self::Openshift(_) => Distro::Openshift,
        }
    }
}

impl Transform for Transformer {
    fn transform(&self, declaration: &Declaration) -> Result<Vec<Resource>, TransformError> {
        let resources = match self {
            Self::Kubernetes(transformer) => transformer.transform(declaration)?,
            Self::Openshift(transformer) => transformer.transform(declaration)?,
        };
        tracing::debug!(
            distro = %self.distro(),
            services = declaration.services.len(),
            objects = resources.len(),
            "transformed declaration"
        );
        Ok(resources)
    }
}
