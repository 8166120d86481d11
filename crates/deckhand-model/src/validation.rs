//! Structural validation of a declaration.
//!
//! `validate` collects every fault instead of stopping at the first one, and
//! normalizes a few fields in place while it walks the tree. Whether faults
//! are fatal is the caller's decision.

use crate::declaration::{Container, Declaration, Port, Service};
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::OnceLock;

pub mod failure_class {
    pub const SERVICE_NAME_INVALID: &str = "declaration.service.name_invalid";
    pub const SERVICE_NAME_DUPLICATE: &str = "declaration.service.name_duplicate";
    pub const SERVICE_CONTAINERS_EMPTY: &str = "declaration.service.containers_empty";
    pub const SERVICE_PORT_DUPLICATE: &str = "declaration.service.port_duplicate";
    pub const CONTAINER_IMAGE_EMPTY: &str = "declaration.container.image_empty";
    pub const CONTAINER_ENV_DUPLICATE: &str = "declaration.container.env_duplicate";
    pub const PORT_OUT_OF_RANGE: &str = "declaration.port.out_of_range";
    pub const PORT_HOST_ON_INTERNAL: &str = "declaration.port.host_on_internal";
    pub const PORT_HOST_INVALID: &str = "declaration.port.host_invalid";
    pub const PORT_PATH_WITHOUT_HOST: &str = "declaration.port.path_without_host";
    pub const PORT_PATH_INVALID: &str = "declaration.port.path_invalid";
    pub const MOUNT_PATH_RELATIVE: &str = "declaration.mount.path_relative";
    pub const MOUNT_VOLUME_UNKNOWN: &str = "declaration.mount.volume_unknown";
    pub const VOLUME_NAME_INVALID: &str = "declaration.volume.name_invalid";
    pub const VOLUME_NAME_DUPLICATE: &str = "declaration.volume.name_duplicate";
    pub const VOLUME_SIZE_INVALID: &str = "declaration.volume.size_invalid";
}

const MAX_LABEL_LENGTH: usize = 63;
const MAX_HOST_LENGTH: usize = 253;
const MAX_PORT: u32 = 65535;

/// One structural problem, addressed by its path inside the declaration.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ValidationFault {
    pub failure_class: String,
    pub path: String,
    pub message: String,
}

/// Every fault found by one `validate` pass, sorted by path.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq, thiserror::Error)]
#[error("{}", render_faults(.faults))]
pub struct ValidationErrors {
    pub faults: Vec<ValidationFault>,
}

impl ValidationErrors {
    fn from_faults(mut faults: Vec<ValidationFault>) -> Self {
        faults.sort_by(|a, b| {
            (&a.path, &a.failure_class, &a.message).cmp(&(&b.path, &b.failure_class, &b.message))
        });
        Self { faults }
    }

    pub fn len(&self) -> usize {
        self.faults.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faults.is_empty()
    }

    pub fn failure_classes(&self) -> Vec<String> {
        self.faults
            .iter()
            .map(|fault| fault.failure_class.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

fn render_faults(faults: &[ValidationFault]) -> String {
    let details = faults
        .iter()
        .map(|fault| format!("{}: {}", fault.path, fault.message))
        .collect::<Vec<_>>()
        .join("; ");
    format!("{} validation fault(s): {details}", faults.len())
}

fn dns_label_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?$").expect("dns label regex must compile")
    })
}

fn dns_host_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\*\.)?[a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*$")
            .expect("dns host regex must compile")
    })
}

fn quantity_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[0-9]+(\.[0-9]+)?(Ki|Mi|Gi|Ti|Pi|Ei|k|M|G|T|P|E)?$")
            .expect("quantity regex must compile")
    })
}

pub fn is_dns_label(value: &str) -> bool {
    value.len() <= MAX_LABEL_LENGTH && dns_label_re().is_match(value)
}

pub fn is_dns_host(value: &str) -> bool {
    value.len() <= MAX_HOST_LENGTH && dns_host_re().is_match(value)
}

pub fn is_quantity(value: &str) -> bool {
    quantity_re().is_match(value)
}

#[derive(Default)]
struct Faults(Vec<ValidationFault>);

impl Faults {
    fn push(&mut self, failure_class: &str, path: String, message: String) {
        self.0.push(ValidationFault {
            failure_class: failure_class.to_string(),
            path,
            message,
        });
    }
}

impl Declaration {
    /// Check the declaration for structural faults, normalizing it in place.
    pub fn validate(&mut self) -> Result<(), ValidationErrors> {
        for service in &mut self.services {
            normalize_service(service);
        }

        let mut faults = Faults::default();

        let mut volume_names = BTreeSet::new();
        for (idx, volume) in self.volumes.iter().enumerate() {
            let path = format!("volumes[{idx}]");
            if !is_dns_label(&volume.name) {
                faults.push(
                    failure_class::VOLUME_NAME_INVALID,
                    format!("{path}.name"),
                    format!("`{}` is not a valid DNS-1123 label", volume.name),
                );
            }
            if !volume_names.insert(volume.name.as_str()) {
                faults.push(
                    failure_class::VOLUME_NAME_DUPLICATE,
                    format!("{path}.name"),
                    format!("volume `{}` is declared more than once", volume.name),
                );
            }
            if !is_quantity(&volume.size) {
                faults.push(
                    failure_class::VOLUME_SIZE_INVALID,
                    format!("{path}.size"),
                    format!("`{}` is not a valid quantity", volume.size),
                );
            }
        }

        let mut service_names = BTreeSet::new();
        for (idx, service) in self.services.iter().enumerate() {
            let path = format!("services[{idx}]");
            if !is_dns_label(&service.name) {
                faults.push(
                    failure_class::SERVICE_NAME_INVALID,
                    format!("{path}.name"),
                    format!("`{}` is not a valid DNS-1123 label", service.name),
                );
            }
            if !service_names.insert(service.name.as_str()) {
                faults.push(
                    failure_class::SERVICE_NAME_DUPLICATE,
                    format!("{path}.name"),
                    format!("service `{}` is declared more than once", service.name),
                );
            }
            validate_service(self, service, &path, &mut faults);
        }

        if faults.0.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors::from_faults(faults.0))
        }
    }
}

fn normalize_service(service: &mut Service) {
    for container in &mut service.containers {
        container.image = container.image.trim().to_string();
        for port in &mut container.ports {
            if let Some(host) = port.host.as_mut() {
                *host = host.trim().to_lowercase();
            }
            if port.host.as_deref() == Some("") {
                port.host = None;
            }
            if port.path.as_deref().map(str::trim) == Some("") {
                port.path = None;
            }
        }
    }
}

fn validate_service(declaration: &Declaration, service: &Service, path: &str, faults: &mut Faults) {
    if service.containers.is_empty() {
        faults.push(
            failure_class::SERVICE_CONTAINERS_EMPTY,
            format!("{path}.containers"),
            "a service needs at least one container".to_string(),
        );
    }

    let mut empty_dir_names = BTreeSet::new();
    for (idx, volume) in service.empty_dir_volumes.iter().enumerate() {
        let volume_path = format!("{path}.emptyDirVolumes[{idx}].name");
        if !is_dns_label(&volume.name) {
            faults.push(
                failure_class::VOLUME_NAME_INVALID,
                volume_path.clone(),
                format!("`{}` is not a valid DNS-1123 label", volume.name),
            );
        }
        if !empty_dir_names.insert(volume.name.as_str()) {
            faults.push(
                failure_class::VOLUME_NAME_DUPLICATE,
                volume_path,
                format!("emptyDir volume `{}` is declared more than once", volume.name),
            );
        }
    }

    let mut service_ports = BTreeSet::new();
    for (idx, container) in service.containers.iter().enumerate() {
        let container_path = format!("{path}.containers[{idx}]");
        validate_container(declaration, service, container, &container_path, faults);
        for (port_idx, port) in container.ports.iter().enumerate() {
            if !service_ports.insert(port.port.service_port) {
                faults.push(
                    failure_class::SERVICE_PORT_DUPLICATE,
                    format!("{container_path}.ports[{port_idx}].port"),
                    format!(
                        "service port {} is exposed more than once",
                        port.port.service_port
                    ),
                );
            }
        }
    }
}

fn validate_container(
    declaration: &Declaration,
    service: &Service,
    container: &Container,
    path: &str,
    faults: &mut Faults,
) {
    if container.image.is_empty() {
        faults.push(
            failure_class::CONTAINER_IMAGE_EMPTY,
            format!("{path}.image"),
            "image must not be empty".to_string(),
        );
    }

    let mut env_keys = BTreeSet::new();
    for (idx, env) in container.env.iter().enumerate() {
        if !env_keys.insert(env.key.as_str()) {
            faults.push(
                failure_class::CONTAINER_ENV_DUPLICATE,
                format!("{path}.env[{idx}]"),
                format!("env key `{}` is set more than once", env.key),
            );
        }
    }

    for (idx, port) in container.ports.iter().enumerate() {
        validate_port(port, &format!("{path}.ports[{idx}]"), faults);
    }

    for (idx, mount) in container.mounts.iter().enumerate() {
        let mount_path = format!("{path}.mounts[{idx}]");
        if !mount.mount_path.starts_with('/') {
            faults.push(
                failure_class::MOUNT_PATH_RELATIVE,
                format!("{mount_path}.mountPath"),
                format!("`{}` must be an absolute path", mount.mount_path),
            );
        }
        if declaration
            .resolve_volume(service, &mount.volume_ref)
            .is_none()
        {
            faults.push(
                failure_class::MOUNT_VOLUME_UNKNOWN,
                format!("{mount_path}.volumeRef"),
                format!(
                    "`{}` names neither a root volume nor an emptyDir volume of `{}`",
                    mount.volume_ref, service.name
                ),
            );
        }
    }
}

fn validate_port(port: &Port, path: &str, faults: &mut Faults) {
    for (label, value) in [
        ("container", port.port.container_port),
        ("service", port.port.service_port),
    ] {
        if value == 0 || value > MAX_PORT {
            faults.push(
                failure_class::PORT_OUT_OF_RANGE,
                format!("{path}.port"),
                format!("{label} port {value} is outside 1-{MAX_PORT}"),
            );
        }
    }

    if !port.is_external() && (port.host.is_some() || port.path.is_some()) {
        faults.push(
            failure_class::PORT_HOST_ON_INTERNAL,
            format!("{path}.type"),
            "host and path are only allowed on external ports".to_string(),
        );
    }

    if let Some(host) = port.host.as_deref()
        && !is_dns_host(host)
    {
        faults.push(
            failure_class::PORT_HOST_INVALID,
            format!("{path}.host"),
            format!("`{host}` is not a valid DNS subdomain"),
        );
    }

    if let Some(route_path) = port.path.as_deref() {
        if port.host.is_none() {
            faults.push(
                failure_class::PORT_PATH_WITHOUT_HOST,
                format!("{path}.path"),
                "path requires a host".to_string(),
            );
        }
        if !route_path.starts_with('/') {
            faults.push(
                failure_class::PORT_PATH_INVALID,
                format!("{path}.path"),
                format!("`{route_path}` must start with `/`"),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declaration::{
        AccessMode, EmptyDirVolume, EnvVariable, Mount, PortMapping, PortType, Volume,
    };

    fn container(image: &str) -> Container {
        Container {
            image: image.into(),
            ..Container::default()
        }
    }

    fn port(mapping: &str, port_type: PortType, host: Option<&str>, path: Option<&str>) -> Port {
        Port {
            port: mapping.parse().unwrap(),
            port_type,
            host: host.map(Into::into),
            path: path.map(Into::into),
        }
    }

    fn valid_declaration() -> Declaration {
        let mut web = container("  wordpress:4 ");
        web.ports.push(port(
            "80",
            PortType::External,
            Some(" Blog.Example.com "),
            Some("/"),
        ));
        web.mounts.push(Mount {
            volume_ref: "data".into(),
            mount_path: "/var/www".into(),
            volume_sub_path: None,
            read_only: false,
        });
        Declaration {
            version: "0.1-dev".into(),
            services: vec![Service {
                name: "web".into(),
                containers: vec![web],
                ..Service::default()
            }],
            volumes: vec![Volume {
                name: "data".into(),
                size: "1Gi".into(),
                access_mode: AccessMode::ReadWriteOnce,
                storage_class: None,
            }],
        }
    }

    #[test]
    fn valid_declaration_passes_and_is_normalized() {
        let mut declaration = valid_declaration();
        declaration.validate().expect("declaration should be valid");

        let container = &declaration.services[0].containers[0];
        assert_eq!(container.image, "wordpress:4");
        assert_eq!(container.ports[0].host.as_deref(), Some("blog.example.com"));
    }

    #[test]
    fn empty_path_is_dropped_during_normalization() {
        let mut declaration = valid_declaration();
        declaration.services[0].containers[0].ports[0].path = Some("  ".into());
        declaration.validate().expect("declaration should be valid");
        assert_eq!(declaration.services[0].containers[0].ports[0].path, None);
    }

    #[test]
    fn faults_are_collected_not_short_circuited() {
        let mut declaration = valid_declaration();
        declaration.services.push(Service {
            name: "Web_2".into(),
            containers: vec![],
            ..Service::default()
        });
        declaration.volumes[0].size = "lots".into();

        let errors = declaration.validate().expect_err("should fail");
        assert_eq!(
            errors.failure_classes(),
            vec![
                failure_class::SERVICE_CONTAINERS_EMPTY.to_string(),
                failure_class::SERVICE_NAME_INVALID.to_string(),
                failure_class::VOLUME_SIZE_INVALID.to_string(),
            ]
        );
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn duplicate_names_are_reported() {
        let mut declaration = valid_declaration();
        let duplicate = declaration.services[0].clone();
        declaration.services.push(duplicate);
        declaration.volumes.push(declaration.volumes[0].clone());

        let errors = declaration.validate().expect_err("should fail");
        let classes = errors.failure_classes();
        assert!(classes.contains(&failure_class::SERVICE_NAME_DUPLICATE.to_string()));
        assert!(classes.contains(&failure_class::VOLUME_NAME_DUPLICATE.to_string()));
    }

    #[test]
    fn port_rules() {
        let mut declaration = valid_declaration();
        let ports = &mut declaration.services[0].containers[0].ports;
        ports.push(port("0:70000", PortType::Internal, None, None));
        ports.push(port("81", PortType::Internal, Some("a.example.com"), None));
        ports.push(port("82", PortType::External, None, Some("/api")));
        ports.push(port("83", PortType::External, Some("bad_host"), Some("api")));

        let errors = declaration.validate().expect_err("should fail");
        let classes = errors.failure_classes();
        for expected in [
            failure_class::PORT_OUT_OF_RANGE,
            failure_class::PORT_HOST_ON_INTERNAL,
            failure_class::PORT_PATH_WITHOUT_HOST,
            failure_class::PORT_HOST_INVALID,
            failure_class::PORT_PATH_INVALID,
        ] {
            assert!(classes.contains(&expected.to_string()), "missing {expected}");
        }
        let out_of_range = errors
            .faults
            .iter()
            .filter(|fault| fault.failure_class == failure_class::PORT_OUT_OF_RANGE)
            .count();
        assert_eq!(out_of_range, 2);
    }

    #[test]
    fn wildcard_host_is_valid() {
        let mut declaration = valid_declaration();
        declaration.services[0].containers[0].ports[0].host = Some("*.apps.example.com".into());
        declaration.validate().expect("wildcard host should be accepted");
    }

    #[test]
    fn duplicate_service_port_across_containers() {
        let mut declaration = valid_declaration();
        let mut sidecar = container("proxy:1");
        sidecar.ports.push(Port {
            port: PortMapping::new(9000, 80),
            port_type: PortType::Internal,
            host: None,
            path: None,
        });
        declaration.services[0].containers.push(sidecar);

        let errors = declaration.validate().expect_err("should fail");
        assert_eq!(
            errors.failure_classes(),
            vec![failure_class::SERVICE_PORT_DUPLICATE.to_string()]
        );
        assert_eq!(errors.faults[0].path, "services[0].containers[1].ports[0].port");
    }

    #[test]
    fn env_and_mount_rules() {
        let mut declaration = valid_declaration();
        let container = &mut declaration.services[0].containers[0];
        container.env = vec![
            EnvVariable {
                key: "A".into(),
                value: "1".into(),
            },
            EnvVariable {
                key: "A".into(),
                value: "2".into(),
            },
        ];
        container.mounts.push(Mount {
            volume_ref: "nowhere".into(),
            mount_path: "relative/dir".into(),
            volume_sub_path: None,
            read_only: true,
        });

        let errors = declaration.validate().expect_err("should fail");
        assert_eq!(
            errors.failure_classes(),
            vec![
                failure_class::CONTAINER_ENV_DUPLICATE.to_string(),
                failure_class::MOUNT_PATH_RELATIVE.to_string(),
                failure_class::MOUNT_VOLUME_UNKNOWN.to_string(),
            ]
        );
    }

    #[test]
    fn mount_can_reference_empty_dir() {
        let mut declaration = valid_declaration();
        declaration.services[0].empty_dir_volumes.push(EmptyDirVolume {
            name: "cache".into(),
        });
        declaration.services[0].containers[0].mounts.push(Mount {
            volume_ref: "cache".into(),
            mount_path: "/cache".into(),
            volume_sub_path: None,
            read_only: false,
        });
        declaration.validate().expect("emptyDir mount should resolve");
    }

    #[test]
    fn report_serializes_with_camel_case_keys() {
        let mut declaration = valid_declaration();
        declaration.volumes[0].size = "huge".into();
        let errors = declaration.validate().expect_err("should fail");

        insta::assert_json_snapshot!(errors, @r#"
        {
          "faults": [
            {
              "failureClass": "declaration.volume.size_invalid",
              "path": "volumes[0].size",
              "message": "`huge` is not a valid quantity"
            }
          ]
        }
        "#);
    }

    #[test]
    fn error_display_lists_faults() {
        let mut declaration = valid_declaration();
        declaration.volumes[0].size = "huge".into();
        let errors = declaration.validate().expect_err("should fail");
        assert_eq!(
            errors.to_string(),
            "1 validation fault(s): volumes[0].size: `huge` is not a valid quantity"
        );
    }
}
