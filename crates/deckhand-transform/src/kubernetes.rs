//! Kubernetes mapping.
//!
//! Per service, in declaration order: a `Service` when ports are declared, an
//! `Ingress` when external ports carry a host, then the `Deployment`. One
//! `PersistentVolumeClaim` per root volume follows all services.

use crate::error::TransformError;
use crate::transformer::Transform;
use deckhand_api::apps::{Deployment, DeploymentSpec};
use deckhand_api::core::{
    self, ContainerPort, EmptyDirVolumeSource, EnvVar, PersistentVolumeClaim,
    PersistentVolumeClaimSpec, PersistentVolumeClaimVolumeSource, PodSpec, PodTemplateSpec,
    ResourceRequirements, ServicePort, ServiceSpec, VolumeMount,
};
use deckhand_api::networking::{
    HttpIngressPath, HttpIngressRuleValue, Ingress, IngressBackend, IngressRule,
    IngressServiceBackend, IngressSpec, PATH_TYPE_PREFIX, ServiceBackendPort,
};
use deckhand_api::{LabelSelector, ObjectMeta, Resource};
use deckhand_model::{Declaration, Service, Volume, VolumeSource};
use std::collections::{BTreeMap, BTreeSet};

/// Label every object of a service carries; also the pod selector.
pub const SERVICE_LABEL: &str = "service";
pub const DEFAULT_INGRESS_PATH: &str = "/";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KubernetesTransformer;

impl Transform for KubernetesTransformer {
    fn transform(&self, declaration: &Declaration) -> Result<Vec<Resource>, TransformError> {
        let mut resources = Vec::new();
        for service in &declaration.services {
            if let Some(object) = service_object(service) {
                resources.push(object.into());
            }
            if let Some(ingress) = ingress_object(service)? {
                resources.push(ingress.into());
            }
            resources.push(deployment_object(declaration, service)?.into());
        }
        for volume in &declaration.volumes {
            resources.push(claim_object(volume).into());
        }
        Ok(resources)
    }
}

pub fn selector(service: &Service) -> BTreeMap<String, String> {
    BTreeMap::from([(SERVICE_LABEL.to_string(), service.name.clone())])
}

/// User labels plus the selector label, which always wins.
pub fn labels(service: &Service) -> BTreeMap<String, String> {
    let mut labels = service.labels.clone();
    labels.extend(selector(service));
    labels
}

pub fn service_port_name(service_port: u32) -> String {
    format!("port-{service_port}")
}

/// Container names: the service name for a single container, otherwise
/// `<service>-<index>`.
pub fn container_name(service: &Service, idx: usize) -> String {
    if service.containers.len() == 1 {
        service.name.clone()
    } else {
        format!("{}-{idx}", service.name)
    }
}

fn service_object(service: &Service) -> Option<core::Service> {
    if !service.has_ports() {
        return None;
    }
    let ports = service
        .ports()
        .map(|port| ServicePort {
            name: service_port_name(port.port.service_port),
            protocol: core::PROTOCOL_TCP.to_string(),
            port: port.port.service_port,
            target_port: port.port.container_port,
        })
        .collect();
    let load_balanced = service
        .ports()
        .any(|port| port.is_external() && port.host.is_none());
    let service_type = if load_balanced {
        core::SERVICE_TYPE_LOAD_BALANCER
    } else {
        core::SERVICE_TYPE_CLUSTER_IP
    };
    Some(core::Service {
        metadata: ObjectMeta::named(&service.name, labels(service)),
        spec: ServiceSpec {
            service_type: service_type.to_string(),
            selector: selector(service),
            ports,
        },
        ..core::Service::default()
    })
}

fn ingress_object(service: &Service) -> Result<Option<Ingress>, TransformError> {
    let mut rules: Vec<IngressRule> = Vec::new();
    let mut seen = BTreeSet::new();
    for port in service.ports().filter(|port| port.is_external()) {
        let Some(host) = port.host.as_deref() else {
            continue;
        };
        let path = port.path.as_deref().unwrap_or(DEFAULT_INGRESS_PATH);
        if !seen.insert((host, path)) {
            return Err(TransformError::Conflict {
                entity: format!("service `{}`", service.name),
                reason: format!("more than one port is exposed at {host}{path}"),
            });
        }
        let ingress_path = HttpIngressPath {
            path: path.to_string(),
            path_type: PATH_TYPE_PREFIX.to_string(),
            backend: IngressBackend {
                service: IngressServiceBackend {
                    name: service.name.clone(),
                    port: ServiceBackendPort {
                        number: port.port.service_port,
                    },
                },
            },
        };
        match rules.iter_mut().find(|rule| rule.host == host) {
            Some(rule) => rule.http.paths.push(ingress_path),
            None => rules.push(IngressRule {
                host: host.to_string(),
                http: HttpIngressRuleValue {
                    paths: vec![ingress_path],
                },
            }),
        }
    }
    if rules.is_empty() {
        return Ok(None);
    }
    Ok(Some(Ingress {
        metadata: ObjectMeta::named(&service.name, labels(service)),
        spec: IngressSpec { rules },
        ..Ingress::default()
    }))
}

fn deployment_object(
    declaration: &Declaration,
    service: &Service,
) -> Result<Deployment, TransformError> {
    Ok(Deployment {
        metadata: ObjectMeta::named(&service.name, labels(service)),
        spec: DeploymentSpec {
            replicas: service.replicas,
            selector: LabelSelector {
                match_labels: selector(service),
            },
            template: pod_template(declaration, service)?,
        },
        ..Deployment::default()
    })
}

/// Pod template shared by `Deployment` and OpenShift's `DeploymentConfig`.
pub fn pod_template(
    declaration: &Declaration,
    service: &Service,
) -> Result<PodTemplateSpec, TransformError> {
    let mut containers = Vec::with_capacity(service.containers.len());
    let mut volumes: Vec<core::Volume> = Vec::new();

    for (idx, container) in service.containers.iter().enumerate() {
        let mut volume_mounts = Vec::with_capacity(container.mounts.len());
        for mount in &container.mounts {
            let source = declaration
                .resolve_volume(service, &mount.volume_ref)
                .ok_or_else(|| TransformError::UnknownVolume {
                    service: service.name.clone(),
                    volume: mount.volume_ref.clone(),
                })?;
            if !volumes.iter().any(|volume| volume.name == source.name()) {
                volumes.push(pod_volume(source));
            }
            volume_mounts.push(VolumeMount {
                name: source.name().to_string(),
                mount_path: mount.mount_path.clone(),
                sub_path: mount.volume_sub_path.clone(),
                read_only: mount.read_only,
            });
        }

        containers.push(core::Container {
            name: container_name(service, idx),
            image: container.image.clone(),
            env: container
                .env
                .iter()
                .map(|env| EnvVar {
                    name: env.key.clone(),
                    value: env.value.clone(),
                })
                .collect(),
            ports: container
                .ports
                .iter()
                .map(|port| ContainerPort {
                    container_port: port.port.container_port,
                    protocol: core::PROTOCOL_TCP.to_string(),
                })
                .collect(),
            volume_mounts,
        });
    }

    Ok(PodTemplateSpec {
        metadata: ObjectMeta {
            labels: labels(service),
            ..ObjectMeta::default()
        },
        spec: PodSpec {
            containers,
            volumes,
        },
    })
}

fn pod_volume(source: VolumeSource<'_>) -> core::Volume {
    match source {
        VolumeSource::Persistent(volume) => core::Volume {
            name: volume.name.clone(),
            persistent_volume_claim: Some(PersistentVolumeClaimVolumeSource {
                claim_name: volume.name.clone(),
            }),
            empty_dir: None,
        },
        VolumeSource::EmptyDir(volume) => core::Volume {
            name: volume.name.clone(),
            persistent_volume_claim: None,
            empty_dir: Some(EmptyDirVolumeSource {}),
        },
    }
}

fn claim_object(volume: &Volume) -> PersistentVolumeClaim {
    PersistentVolumeClaim {
        metadata: ObjectMeta::named(&volume.name, BTreeMap::new()),
        spec: PersistentVolumeClaimSpec {
            access_modes: vec![volume.access_mode.as_str().to_string()],
            resources: ResourceRequirements {
                requests: BTreeMap::from([(
                    core::RESOURCE_STORAGE.to_string(),
                    volume.size.clone(),
                )]),
            },
            storage_class_name: volume.storage_class.clone(),
        },
        ..PersistentVolumeClaim::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deckhand_model::{
        AccessMode, Container, EmptyDirVolume, EnvVariable, Mount, Port, PortMapping, PortType,
    };

    fn port(container: u32, service: u32, external: bool, host: Option<&str>) -> Port {
        Port {
            port: PortMapping::new(container, service),
            port_type: if external {
                PortType::External
            } else {
                PortType::Internal
            },
            host: host.map(Into::into),
            path: None,
        }
    }

    fn declaration() -> Declaration {
        Declaration {
            version: "0.1-dev".into(),
            services: vec![
                Service {
                    name: "db".into(),
                    containers: vec![Container {
                        image: "mariadb:10".into(),
                        env: vec![EnvVariable {
                            key: "MYSQL_DATABASE".into(),
                            value: "wp".into(),
                        }],
                        ports: vec![port(3306, 3306, false, None)],
                        mounts: vec![Mount {
                            volume_ref: "data".into(),
                            mount_path: "/var/lib/mysql".into(),
                            volume_sub_path: Some("mysql".into()),
                            read_only: false,
                        }],
                    }],
                    ..Service::default()
                },
                Service {
                    name: "web".into(),
                    replicas: Some(3),
                    labels: BTreeMap::from([
                        ("tier".to_string(), "frontend".to_string()),
                        (SERVICE_LABEL.to_string(), "spoofed".to_string()),
                    ]),
                    containers: vec![
                        Container {
                            image: "wordpress:4".into(),
                            ports: vec![port(80, 8080, true, Some("blog.example.com"))],
                            mounts: vec![Mount {
                                volume_ref: "cache".into(),
                                mount_path: "/cache".into(),
                                volume_sub_path: None,
                                read_only: true,
                            }],
                            ..Container::default()
                        },
                        Container {
                            image: "exporter:1".into(),
                            ports: vec![port(9100, 9100, false, None)],
                            mounts: vec![Mount {
                                volume_ref: "cache".into(),
                                mount_path: "/scrape".into(),
                                volume_sub_path: None,
                                read_only: true,
                            }],
                            ..Container::default()
                        },
                    ],
                    empty_dir_volumes: vec![EmptyDirVolume {
                        name: "cache".into(),
                    }],
                },
                Service {
                    name: "worker".into(),
                    containers: vec![Container {
                        image: "worker:2".into(),
                        ..Container::default()
                    }],
                    ..Service::default()
                },
            ],
            volumes: vec![Volume {
                name: "data".into(),
                size: "2Gi".into(),
                access_mode: AccessMode::ReadWriteOnce,
                storage_class: Some("fast".into()),
            }],
        }
    }

    fn kinds_and_names(resources: &[Resource]) -> Vec<(String, String)> {
        resources
            .iter()
            .map(|r| (r.kind().to_string(), r.name().unwrap_or("").to_string()))
            .collect()
    }

    #[test]
    fn emission_order_follows_declaration_order() {
        let resources = KubernetesTransformer.transform(&declaration()).unwrap();
        let expected = [
            ("Service", "db"),
            ("Deployment", "db"),
            ("Service", "web"),
            ("Ingress", "web"),
            ("Deployment", "web"),
            ("Deployment", "worker"),
            ("PersistentVolumeClaim", "data"),
        ]
        .map(|(kind, name)| (kind.to_string(), name.to_string()))
        .to_vec();
        assert_eq!(kinds_and_names(&resources), expected);
    }

    #[test]
    fn nothing_is_stamped_by_the_transformer() {
        let resources = KubernetesTransformer.transform(&declaration()).unwrap();
        assert!(resources.iter().all(|r| !r.type_meta().is_stamped()));
    }

    #[test]
    fn service_ports_and_type() {
        let resources = KubernetesTransformer.transform(&declaration()).unwrap();
        let Resource::Service(web) = &resources[2] else {
            panic!("expected web service");
        };
        assert_eq!(web.spec.service_type, core::SERVICE_TYPE_CLUSTER_IP);
        assert_eq!(web.spec.ports.len(), 2);
        assert_eq!(web.spec.ports[0].name, "port-8080");
        assert_eq!(web.spec.ports[0].port, 8080);
        assert_eq!(web.spec.ports[0].target_port, 80);
        assert_eq!(web.spec.selector, BTreeMap::from([("service".into(), "web".into())]));
        assert_eq!(web.metadata.labels.get("service").map(String::as_str), Some("web"));
        assert_eq!(web.metadata.labels.get("tier").map(String::as_str), Some("frontend"));
    }

    #[test]
    fn external_port_without_host_is_load_balanced() {
        let mut declaration = declaration();
        declaration.services[0].containers[0].ports[0] = port(3306, 3306, true, None);
        let resources = KubernetesTransformer.transform(&declaration).unwrap();
        let Resource::Service(db) = &resources[0] else {
            panic!("expected db service");
        };
        assert_eq!(db.spec.service_type, core::SERVICE_TYPE_LOAD_BALANCER);
    }

    #[test]
    fn ingress_groups_paths_by_host() {
        let mut declaration = declaration();
        let web = &mut declaration.services[1].containers[1];
        web.ports.push(Port {
            path: Some("/metrics".into()),
            ..port(9200, 9200, true, Some("blog.example.com"))
        });
        let resources = KubernetesTransformer.transform(&declaration).unwrap();
        let Resource::Ingress(ingress) = &resources[3] else {
            panic!("expected ingress");
        };
        assert_eq!(ingress.spec.rules.len(), 1);
        let paths = &ingress.spec.rules[0].http.paths;
        assert_eq!(paths.len(), 2);
        assert_eq!(paths[0].path, "/");
        assert_eq!(paths[0].backend.service.port.number, 8080);
        assert_eq!(paths[1].path, "/metrics");
    }

    #[test]
    fn same_host_and_path_twice_is_a_conflict() {
        let mut declaration = declaration();
        declaration.services[1].containers[1]
            .ports
            .push(port(9200, 9200, true, Some("blog.example.com")));
        let err = KubernetesTransformer.transform(&declaration).unwrap_err();
        assert!(matches!(err, TransformError::Conflict { .. }), "{err}");
    }

    #[test]
    fn pod_template_volumes_and_containers() {
        let resources = KubernetesTransformer.transform(&declaration()).unwrap();
        let Resource::Deployment(web) = &resources[4] else {
            panic!("expected web deployment");
        };
        assert_eq!(web.spec.replicas, Some(3));
        let pod = &web.spec.template.spec;
        assert_eq!(
            pod.containers.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
            vec!["web-0", "web-1"]
        );
        assert_eq!(pod.volumes.len(), 1, "shared volume is declared once");
        assert!(pod.volumes[0].empty_dir.is_some());
        assert!(pod.containers[0].volume_mounts[0].read_only);

        let Resource::Deployment(db) = &resources[1] else {
            panic!("expected db deployment");
        };
        let pod = &db.spec.template.spec;
        assert_eq!(pod.containers[0].name, "db");
        assert_eq!(pod.containers[0].env[0].name, "MYSQL_DATABASE");
        assert_eq!(pod.containers[0].volume_mounts[0].sub_path.as_deref(), Some("mysql"));
        assert_eq!(
            pod.volumes[0]
                .persistent_volume_claim
                .as_ref()
                .map(|claim| claim.claim_name.as_str()),
            Some("data")
        );
    }

    #[test]
    fn claim_carries_size_mode_and_class() {
        let resources = KubernetesTransformer.transform(&declaration()).unwrap();
        let Some(Resource::PersistentVolumeClaim(claim)) = resources.last() else {
            panic!("expected claim last");
        };
        assert_eq!(claim.spec.access_modes, vec!["ReadWriteOnce".to_string()]);
        assert_eq!(
            claim.spec.resources.requests.get("storage").map(String::as_str),
            Some("2Gi")
        );
        assert_eq!(claim.spec.storage_class_name.as_deref(), Some("fast"));
    }

    #[test]
    fn unknown_volume_aborts() {
        let mut declaration = declaration();
        declaration.services[0].containers[0].mounts[0].volume_ref = "ghost".into();
        let err = KubernetesTransformer.transform(&declaration).unwrap_err();
        assert_eq!(
            err,
            TransformError::UnknownVolume {
                service: "db".into(),
                volume: "ghost".into()
            }
        );
    }

    #[test]
    fn empty_declaration_yields_nothing() {
        let resources = KubernetesTransformer
            .transform(&Declaration::default())
            .unwrap();
        assert!(resources.is_empty());
    }
}
