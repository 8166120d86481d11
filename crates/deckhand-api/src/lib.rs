//! # deckhand-api
//!
//! Platform-native resource objects and the scheme that knows their
//! versioned, externally visible representation.
//!
//! Only the fields deckhand emits are modelled. Every object carries a
//! [`TypeMeta`] that stays empty until a version resolver stamps the
//! `apiVersion`/`kind` pair registered for its kind in a [`Scheme`].
//!
//! ```text
//! Resource (closed enum)
//!   ├── apps::Deployment               apps/v1
//!   ├── core::Service                  v1
//!   ├── core::PersistentVolumeClaim    v1
//!   ├── networking::Ingress            networking.k8s.io/v1
//!   ├── openshift::DeploymentConfig    apps.openshift.io/v1
//!   ├── openshift::Route               route.openshift.io/v1
//!   └── openshift::ImageStream         image.openshift.io/v1
//! ```

pub mod apps;
pub mod core;
pub mod meta;
pub mod networking;
pub mod openshift;
pub mod resource;
pub mod scheme;

pub use meta::{GroupVersion, GroupVersionKind, LabelSelector, ObjectMeta, TypeMeta};
pub use resource::{Object, Resource};
pub use scheme::{Registration, Scheme};
