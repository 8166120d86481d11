//! Target distribution selector.

use crate::kubernetes::KubernetesTransformer;
use crate::openshift::OpenshiftTransformer;
use crate::transformer::Transformer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Distro {
    Kubernetes,
    Openshift,
}

impl Distro {
    pub const ALL: [Distro; 2] = [Distro::Kubernetes, Distro::Openshift];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Kubernetes => "kubernetes",
            Self::Openshift => "openshift",
        }
    }

    /// The one transformer responsible for this distribution.
    pub fn transformer(self) -> Transformer {
        match self {
            Self::Kubernetes => Transformer::Kubernetes(KubernetesTransformer),
            Self::Openshift => Transformer::Openshift(OpenshiftTransformer),
        }
    }
}

impl Default for Distro {
    fn default() -> Self {
        Self::Kubernetes
    }
}

impl std::fmt::Display for Distro {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Distro {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "kubernetes" => Ok(Self::Kubernetes),
            "openshift" => Ok(Self::Openshift),
            _ => Err(format!(
                "unknown distro '{s}' (expected one of: {})",
                Self::ALL.map(Self::as_str).join(", ")
            )),
        }
    }
}
