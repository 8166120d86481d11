//! Declaration types.
//!
//! These are format-neutral: field spellings of a particular file version
//! live in the decoder for that version.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A complete application declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Declaration {
    /// Format version the declaration was decoded from.
    pub version: String,
    pub services: Vec<Service>,
    pub volumes: Vec<Volume>,
}

impl Declaration {
    pub fn service(&self, name: &str) -> Option<&Service> {
        self.services.iter().find(|service| service.name == name)
    }

    pub fn volume(&self, name: &str) -> Option<&Volume> {
        self.volumes.iter().find(|volume| volume.name == name)
    }

    /// Resolve a mount's `volumeRef` in the scope of `service`.
    ///
    /// Service-local emptyDir volumes shadow root volumes of the same name.
    pub fn resolve_volume<'a>(
        &'a self,
        service: &'a Service,
        volume_ref: &str,
    ) -> Option<VolumeSource<'a>> {
        if let Some(empty_dir) = service
            .empty_dir_volumes
            .iter()
            .find(|volume| volume.name == volume_ref)
        {
            return Some(VolumeSource::EmptyDir(empty_dir));
        }
        self.volume(volume_ref).map(VolumeSource::Persistent)
    }
}

/// Where a mounted volume comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeSource<'a> {
    Persistent(&'a Volume),
    EmptyDir(&'a EmptyDirVolume),
}

impl VolumeSource<'_> {
    pub fn name(&self) -> &str {
        match self {
            Self::Persistent(volume) => &volume.name,
            Self::EmptyDir(volume) => &volume.name,
        }
    }
}

/// One deployable unit: a group of containers scheduled together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Service {
    pub name: String,
    pub containers: Vec<Container>,
    pub replicas: Option<u32>,
    pub labels: BTreeMap<String, String>,
    pub empty_dir_volumes: Vec<EmptyDirVolume>,
}

impl Service {
    pub fn ports(&self) -> impl Iterator<Item = &Port> {
        self.containers
            .iter()
            .flat_map(|container| container.ports.iter())
    }

    pub fn has_ports(&self) -> bool {
        self.ports().next().is_some()
    }
}

/// Scratch volume that lives as long as the service's pod.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmptyDirVolume {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Container {
    pub image: String,
    pub env: Vec<EnvVariable>,
    pub ports: Vec<Port>,
    pub mounts: Vec<Mount>,
}

/// `KEY=value` environment entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvVariable {
    pub key: String,
    pub value: String,
}

impl FromStr for EnvVariable {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((key, value)) = s.split_once('=') else {
            return Err(format!("env entry `{s}` must have the form KEY=value"));
        };
        let key = key.trim();
        if key.is_empty() {
            return Err(format!("env entry `{s}` has an empty key"));
        }
        Ok(Self {
            key: key.to_string(),
            value: value.to_string(),
        })
    }
}

impl fmt::Display for EnvVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Port {
    pub port: PortMapping,
    pub port_type: PortType,
    /// Public host name; only meaningful for external ports.
    pub host: Option<String>,
    /// URL path prefix; requires `host`.
    pub path: Option<String>,
}

impl Port {
    pub fn is_external(&self) -> bool {
        self.port_type == PortType::External
    }
}

/// `containerPort[:servicePort]`. The service port defaults to the
/// container port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PortMapping {
    pub container_port: u32,
    pub service_port: u32,
}

impl PortMapping {
    pub fn new(container_port: u32, service_port: u32) -> Self {
        Self {
            container_port,
            service_port,
        }
    }
}

impl FromStr for PortMapping {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse = |part: &str| {
            part.trim()
                .parse::<u32>()
                .map_err(|e| format!("invalid port `{part}` in `{s}`: {e}"))
        };
        match s.split_once(':') {
            Some((container, service)) => Ok(Self::new(parse(container)?, parse(service)?)),
            None => {
                let port = parse(s)?;
                Ok(Self::new(port, port))
            }
        }
    }
}

impl fmt::Display for PortMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.container_port == self.service_port {
            write!(f, "{}", self.container_port)
        } else {
            write!(f, "{}:{}", self.container_port, self.service_port)
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PortType {
    /// Reachable only from inside the cluster.
    #[default]
    Internal,
    /// Exposed outside the cluster, through a host name or a load balancer.
    External,
}

impl fmt::Display for PortType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Internal => write!(f, "internal"),
            Self::External => write!(f, "external"),
        }
    }
}

impl FromStr for PortType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "internal" => Ok(Self::Internal),
            "external" => Ok(Self::External),
            _ => Err(format!("unknown port type: {s}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mount {
    pub volume_ref: String,
    pub mount_path: String,
    pub volume_sub_path: Option<String>,
    pub read_only: bool,
}

/// Persistent storage shared by the declaration's services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Volume {
    pub name: String,
    /// Requested capacity as a quantity string (`1Gi`, `500Mi`).
    pub size: String,
    pub access_mode: AccessMode,
    pub storage_class: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AccessMode {
    #[default]
    ReadWriteOnce,
    ReadOnlyMany,
    ReadWriteMany,
}

impl AccessMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ReadWriteOnce => "ReadWriteOnce",
            Self::ReadOnlyMany => "ReadOnlyMany",
            Self::ReadWriteMany => "ReadWriteMany",
        }
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "readwriteonce" | "rwo" => Ok(Self::ReadWriteOnce),
            "readonlymany" | "rox" => Ok(Self::ReadOnlyMany),
            "readwritemany" | "rwx" => Ok(Self::ReadWriteMany),
            _ => Err(format!("unknown access mode: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_variable_splits_on_first_equals() {
        let env: EnvVariable = "DSN=postgres://u:p@db/x?a=b".parse().unwrap();
        assert_eq!(env.key, "DSN");
        assert_eq!(env.value, "postgres://u:p@db/x?a=b");
    }

    #[test]
    fn env_variable_allows_empty_value() {
        let env: EnvVariable = "EMPTY=".parse().unwrap();
        assert_eq!(env.value, "");
    }

    #[test]
    fn env_variable_rejects_missing_separator_and_empty_key() {
        assert!("NOVALUE".parse::<EnvVariable>().is_err());
        assert!("=value".parse::<EnvVariable>().is_err());
    }

    #[test]
    fn port_mapping_defaults_service_port() {
        let mapping: PortMapping = "8080".parse().unwrap();
        assert_eq!(mapping, PortMapping::new(8080, 8080));
        assert_eq!(mapping.to_string(), "8080");

        let mapping: PortMapping = "80:8080".parse().unwrap();
        assert_eq!(mapping, PortMapping::new(80, 8080));
        assert_eq!(mapping.to_string(), "80:8080");
    }

    #[test]
    fn port_mapping_rejects_non_numeric() {
        assert!("http".parse::<PortMapping>().is_err());
        assert!("80:".parse::<PortMapping>().is_err());
        assert!("-1".parse::<PortMapping>().is_err());
    }

    #[test]
    fn enums_parse_case_insensitively() {
        assert_eq!("External".parse::<PortType>().unwrap(), PortType::External);
        assert_eq!(
            "readwritemany".parse::<AccessMode>().unwrap(),
            AccessMode::ReadWriteMany
        );
        assert_eq!("RWO".parse::<AccessMode>().unwrap(), AccessMode::ReadWriteOnce);
        assert!("sideways".parse::<PortType>().is_err());
    }

    #[test]
    fn empty_dir_shadows_root_volume() {
        let declaration = Declaration {
            version: "0.1-dev".into(),
            services: vec![Service {
                name: "web".into(),
                empty_dir_volumes: vec![EmptyDirVolume {
                    name: "data".into(),
                }],
                ..Service::default()
            }],
            volumes: vec![Volume {
                name: "data".into(),
                size: "1Gi".into(),
                access_mode: AccessMode::ReadWriteOnce,
                storage_class: None,
            }],
        };
        let service = &declaration.services[0];
        assert!(matches!(
            declaration.resolve_volume(service, "data"),
            Some(VolumeSource::EmptyDir(_))
        ));
        assert!(declaration.resolve_volume(service, "missing").is_none());
    }
}
