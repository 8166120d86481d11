//! Decoder for `version: 0.1-dev` documents.
//!
//! The wire structs mirror the file layout one-to-one and reject unknown
//! fields; conversion into the model parses the string-encoded scalars
//! (`KEY=value` env entries, `container[:service]` ports).

use crate::error::EncodingError;
use crate::registry::Decoder;
use deckhand_model::{
    AccessMode, Container, Declaration, EmptyDirVolume, EnvVariable, Mount, Port, PortMapping,
    PortType, Service, Volume,
};
use serde::Deserialize;
use std::collections::BTreeMap;

pub const VERSION: &str = "0.1-dev";

#[derive(Debug, Clone, Copy, Default)]
pub struct V01DevDecoder;

impl Decoder for V01DevDecoder {
    fn version(&self) -> &str {
        VERSION
    }

    fn decode(&self, data: &[u8]) -> Result<Declaration, EncodingError> {
        let document: DocumentWire = serde_yaml::from_slice(data).map_err(EncodingError::Schema)?;
        document.into_declaration()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct DocumentWire {
    #[allow(dead_code)]
    version: String,
    #[serde(default)]
    services: Vec<ServiceWire>,
    #[serde(default)]
    volumes: Vec<VolumeWire>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ServiceWire {
    name: String,
    #[serde(default)]
    containers: Vec<ContainerWire>,
    #[serde(default)]
    replicas: Option<u32>,
    #[serde(default)]
    labels: BTreeMap<String, String>,
    #[serde(default)]
    empty_dir_volumes: Vec<EmptyDirVolumeWire>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct EmptyDirVolumeWire {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ContainerWire {
    image: String,
    #[serde(default)]
    env: Vec<String>,
    #[serde(default)]
    ports: Vec<PortWire>,
    #[serde(default)]
    mounts: Vec<MountWire>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct PortWire {
    port: PortValue,
    #[serde(default, rename = "type")]
    port_type: Option<String>,
    #[serde(default)]
    host: Option<String>,
    #[serde(default)]
    path: Option<String>,
}

/// `port: 8080` and `port: "80:8080"` are both accepted.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PortValue {
    Number(u32),
    Text(String),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct MountWire {
    volume_ref: String,
    mount_path: String,
    #[serde(default)]
    volume_sub_path: Option<String>,
    #[serde(default)]
    read_only: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct VolumeWire {
    name: String,
    size: String,
    #[serde(default)]
    access_mode: Option<String>,
    #[serde(default)]
    storage_class: Option<String>,
}

fn field_error(path: String, message: String) -> EncodingError {
    EncodingError::Field { path, message }
}

impl DocumentWire {
    fn into_declaration(self) -> Result<Declaration, EncodingError> {
        let services = self
            .services
            .into_iter()
            .enumerate()
            .map(|(idx, service)| service.into_model(&format!("services[{idx}]")))
            .collect::<Result<Vec<_>, _>>()?;
        let volumes = self
            .volumes
            .into_iter()
            .enumerate()
            .map(|(idx, volume)| volume.into_model(&format!("volumes[{idx}]")))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Declaration {
            version: VERSION.to_string(),
            services,
            volumes,
        })
    }
}

impl ServiceWire {
    fn into_model(self, path: &str) -> Result<Service, EncodingError> {
        let containers = self
            .containers
            .into_iter()
            .enumerate()
            .map(|(idx, container)| container.into_model(&format!("{path}.containers[{idx}]")))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Service {
            name: self.name,
            containers,
            replicas: self.replicas,
            labels: self.labels,
            empty_dir_volumes: self
                .empty_dir_volumes
                .into_iter()
                .map(|volume| EmptyDirVolume { name: volume.name })
                .collect(),
        })
    }
}

impl ContainerWire {
    fn into_model(self, path: &str) -> Result<Container, EncodingError> {
        let env = self
            .env
            .iter()
            .enumerate()
            .map(|(idx, entry)| {
                entry
                    .parse::<EnvVariable>()
                    .map_err(|message| field_error(format!("{path}.env[{idx}]"), message))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let ports = self
            .ports
            .into_iter()
            .enumerate()
            .map(|(idx, port)| port.into_model(&format!("{path}.ports[{idx}]")))
            .collect::<Result<Vec<_>, _>>()?;
        let mounts = self
            .mounts
            .into_iter()
            .map(|mount| Mount {
                volume_ref: mount.volume_ref,
                mount_path: mount.mount_path,
                volume_sub_path: mount.volume_sub_path,
                read_only: mount.read_only,
            })
            .collect();
        Ok(Container {
            image: self.image,
            env,
            ports,
            mounts,
        })
    }
}

impl PortWire {
    fn into_model(self, path: &str) -> Result<Port, EncodingError> {
        let port = match self.port {
            PortValue::Number(port) => PortMapping::new(port, port),
            PortValue::Text(text) => text
                .parse::<PortMapping>()
                .map_err(|message| field_error(format!("{path}.port"), message))?,
        };
        let port_type = match self.port_type.as_deref() {
            None => PortType::default(),
            Some(raw) => raw
                .parse::<PortType>()
                .map_err(|message| field_error(format!("{path}.type"), message))?,
        };
        Ok(Port {
            port,
            port_type,
            host: self.host,
            path: self.path,
        })
    }
}

impl VolumeWire {
    fn into_model(self, path: &str) -> Result<Volume, EncodingError> {
        let access_mode = match self.access_mode.as_deref() {
            None => AccessMode::default(),
            Some(raw) => raw
                .parse::<AccessMode>()
                .map_err(|message| field_error(format!("{path}.accessMode"), message))?,
        };
        Ok(Volume {
            name: self.name,
            size: self.size,
            access_mode,
            storage_class: self.storage_class,
        })
    }
}
