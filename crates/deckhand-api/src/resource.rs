//! The closed set of objects a transformer can emit.

use crate::apps::Deployment;
use crate::core::{PersistentVolumeClaim, Service};
use crate::meta::{ObjectMeta, TypeMeta};
use crate::networking::Ingress;
use crate::openshift::{DeploymentConfig, ImageStream, Route};
use serde::Serialize;

/// Access to the parts of an object the conversion pipeline relies on.
pub trait Object {
    /// Kind of the Rust type, independent of what `type_meta` holds.
    const KIND: &'static str;

    fn type_meta(&self) -> &TypeMeta;
    fn type_meta_mut(&mut self) -> &mut TypeMeta;
    fn metadata(&self) -> &ObjectMeta;
}

macro_rules! object {
    ($ty:ty, $kind:literal) => {
        impl Object for $ty {
            const KIND: &'static str = $kind;

            fn type_meta(&self) -> &TypeMeta {
                &self.type_meta
            }

            fn type_meta_mut(&mut self) -> &mut TypeMeta {
                &mut self.type_meta
            }

            fn metadata(&self) -> &ObjectMeta {
                &self.metadata
            }
        }
    };
}

object!(Deployment, "Deployment");
object!(Service, "Service");
object!(PersistentVolumeClaim, "PersistentVolumeClaim");
object!(Ingress, "Ingress");
object!(DeploymentConfig, "DeploymentConfig");
object!(Route, "Route");
object!(ImageStream, "ImageStream");

/// One platform-native object. Serializes as the wrapped object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Resource {
    Deployment(Deployment),
    Service(Service),
    PersistentVolumeClaim(PersistentVolumeClaim),
    Ingress(Ingress),
    DeploymentConfig(DeploymentConfig),
    Route(Route),
    ImageStream(ImageStream),
}

macro_rules! dispatch {
    ($self:expr, $object:ident => $body:expr) => {
        match $self {
            Resource::Deployment($object) => $body,
            Resource::Service($object) => $body,
            Resource::PersistentVolumeClaim($object) => $body,
            Resource::Ingress($object) => $body,
            Resource::DeploymentConfig($object) => $body,
            Resource::Route($object) => $body,
            Resource::ImageStream($object) => $body,
        }
    };
}

impl Resource {
    /// Kind of the wrapped object's runtime type.
    pub fn kind(&self) -> &'static str {
        fn kind_of<T: Object>(_: &T) -> &'static str {
            T::KIND
        }
        dispatch!(self, object => kind_of(object))
    }

    /// The object's name, or `None` when it has no identifiable name.
    pub fn name(&self) -> Option<&str> {
        let name = self.metadata().name.as_str();
        (!name.trim().is_empty()).then_some(name)
    }

    pub fn metadata(&self) -> &ObjectMeta {
        dispatch!(self, object => object.metadata())
    }

    pub fn type_meta(&self) -> &TypeMeta {
        dispatch!(self, object => object.type_meta())
    }

    pub fn type_meta_mut(&mut self) -> &mut TypeMeta {
        dispatch!(self, object => object.type_meta_mut())
    }
}

macro_rules! from_object {
    ($variant:ident) => {
        impl From<$variant> for Resource {
            fn from(object: $variant) -> Self {
                Resource::$variant(object)
            }
        }
    };
}

from_object!(Deployment);
from_object!(Service);
from_object!(PersistentVolumeClaim);
from_object!(Ingress);
from_object!(DeploymentConfig);
from_object!(Route);
from_object!(ImageStream);
