//! OpenShift mapping.
//!
//! Starts from the Kubernetes mapping and rewrites what OpenShift expresses
//! natively: each `Deployment` becomes one `ImageStream` per container followed
//! by a `DeploymentConfig`, and each `Ingress` becomes one `Route` per exposed
//! host and path. Services and claims pass through unchanged.

use crate::distro::Distro;
use crate::error::TransformError;
use crate::kubernetes::{KubernetesTransformer, service_port_name};
use crate::transformer::Transform;
use deckhand_api::apps::Deployment;
use deckhand_api::networking::Ingress;
use deckhand_api::openshift::{
    DeploymentConfig, DeploymentConfigSpec, DeploymentTriggerImageChangeParams,
    DeploymentTriggerPolicy, ImageStream, ImageStreamSpec, ObjectReference,
    REFERENCE_KIND_DOCKER_IMAGE, REFERENCE_KIND_IMAGE_STREAM_TAG, REFERENCE_KIND_SERVICE, Route,
    RoutePort, RouteSpec, RouteTargetReference, TRIGGER_CONFIG_CHANGE, TRIGGER_IMAGE_CHANGE,
    TagReference,
};
use deckhand_api::{ObjectMeta, Resource};
use deckhand_model::Declaration;

pub const DEFAULT_IMAGE_TAG: &str = "latest";
const DEFAULT_REPLICAS: u32 = 1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpenshiftTransformer;

impl Transform for OpenshiftTransformer {
    fn transform(&self, declaration: &Declaration) -> Result<Vec<Resource>, TransformError> {
        let mut resources = Vec::new();
        for resource in KubernetesTransformer.transform(declaration)? {
            match resource {
                Resource::Deployment(deployment) => {
                    let (streams, config) = deployment_config(deployment)?;
                    resources.extend(streams.into_iter().map(Resource::from));
                    resources.push(config.into());
                }
                Resource::Ingress(ingress) => {
                    resources.extend(routes(ingress)?.into_iter().map(Resource::from));
                }
                other => resources.push(other),
            }
        }
        Ok(resources)
    }
}

/// Split an image reference into its repository and tag.
///
/// The tag follows the last `:` of the final path segment, so registry ports
/// (`registry:5000/app`) are not mistaken for tags. Digest references are
/// rejected since an image stream tag cannot track them.
pub fn split_image(image: &str) -> Result<(&str, &str), String> {
    if image.contains('@') {
        return Err(format!("digest image reference `{image}`"));
    }
    let segment_start = image.rfind('/').map_or(0, |idx| idx + 1);
    match image[segment_start..].rfind(':') {
        Some(idx) => {
            let split = segment_start + idx;
            let tag = &image[split + 1..];
            if tag.is_empty() {
                Ok((&image[..split], DEFAULT_IMAGE_TAG))
            } else {
                Ok((&image[..split], tag))
            }
        }
        None => Ok((image, DEFAULT_IMAGE_TAG)),
    }
}

fn deployment_config(
    deployment: Deployment,
) -> Result<(Vec<ImageStream>, DeploymentConfig), TransformError> {
    let name = deployment.metadata.name.clone();
    let mut streams = Vec::new();
    let mut triggers = vec![DeploymentTriggerPolicy {
        trigger_type: TRIGGER_CONFIG_CHANGE.to_string(),
        image_change_params: None,
    }];

    for container in &deployment.spec.template.spec.containers {
        let (_, tag) = split_image(&container.image).map_err(|reason| {
            TransformError::Unsupported {
                distro: Distro::Openshift,
                entity: format!("service `{name}` container `{}`", container.name),
                reason,
            }
        })?;
        streams.push(ImageStream {
            metadata: ObjectMeta::named(&container.name, deployment.metadata.labels.clone()),
            spec: ImageStreamSpec {
                tags: vec![TagReference {
                    name: tag.to_string(),
                    from: ObjectReference {
                        kind: REFERENCE_KIND_DOCKER_IMAGE.to_string(),
                        name: container.image.clone(),
                    },
                }],
            },
            ..ImageStream::default()
        });
        triggers.push(DeploymentTriggerPolicy {
            trigger_type: TRIGGER_IMAGE_CHANGE.to_string(),
            image_change_params: Some(DeploymentTriggerImageChangeParams {
                automatic: true,
                container_names: vec![container.name.clone()],
                from: ObjectReference {
                    kind: REFERENCE_KIND_IMAGE_STREAM_TAG.to_string(),
                    name: format!("{}:{tag}", container.name),
                },
            }),
        });
    }

    let config = DeploymentConfig {
        metadata: deployment.metadata,
        spec: DeploymentConfigSpec {
            replicas: deployment.spec.replicas.unwrap_or(DEFAULT_REPLICAS),
            selector: deployment.spec.selector.match_labels,
            template: deployment.spec.template,
            triggers,
        },
        ..DeploymentConfig::default()
    };
    Ok((streams, config))
}

fn routes(ingress: Ingress) -> Result<Vec<Route>, TransformError> {
    let total: usize = ingress
        .spec
        .rules
        .iter()
        .map(|rule| rule.http.paths.len())
        .sum();
    let mut routes = Vec::with_capacity(total);

    for rule in &ingress.spec.rules {
        if rule.host.starts_with("*.") {
            return Err(TransformError::Unsupported {
                distro: Distro::Openshift,
                entity: format!("service `{}`", ingress.metadata.name),
                reason: format!("wildcard host `{}`", rule.host),
            });
        }
        for path in &rule.http.paths {
            let name = if total == 1 {
                ingress.metadata.name.clone()
            } else {
                format!("{}-{}", ingress.metadata.name, routes.len())
            };
            routes.push(Route {
                metadata: ObjectMeta::named(name, ingress.metadata.labels.clone()),
                spec: RouteSpec {
                    host: rule.host.clone(),
                    path: (path.path != "/").then(|| path.path.clone()),
                    to: RouteTargetReference {
                        kind: REFERENCE_KIND_SERVICE.to_string(),
                        name: path.backend.service.name.clone(),
                    },
                    port: Some(RoutePort {
                        target_port: service_port_name(path.backend.service.port.number),
                    }),
                },
                ..Route::default()
            });
        }
    }
    Ok(routes)
}
