//! Spec document codec
//!
//! Specs are JSON or YAML documents discriminated by a top-level `kind`. Parsing
//! tries JSON first and falls back to YAML; file readers use the extension to pick
//! which format to try first.

mod structural;

pub use structural::StructuralValidation;

use crate::error::{Result, TcaError};
use crate::models::*;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecFormat {
    Json,
    Yaml,
}

impl SpecFormat {
    /// Format hinted by a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(SpecFormat::Json),
            "yaml" | "yml" => Some(SpecFormat::Yaml),
            _ => None,
        }
    }

    fn other(self) -> Self {
        match self {
            SpecFormat::Json => SpecFormat::Yaml,
            SpecFormat::Yaml => SpecFormat::Json,
        }
    }
}

impl fmt::Display for SpecFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpecFormat::Json => f.write_str("json"),
            SpecFormat::Yaml => f.write_str("yaml"),
        }
    }
}

fn parse_as<T: DeserializeOwned>(bytes: &[u8], format: SpecFormat) -> std::result::Result<T, String> {
    match format {
        SpecFormat::Json => serde_json::from_slice(bytes).map_err(|e| e.to_string()),
        SpecFormat::Yaml => serde_yaml::from_slice(bytes).map_err(|e| e.to_string()),
    }
}

/// Parse a spec, trying `first` (JSON when absent) and then the other format
pub fn parse_with_hint<T: DeserializeOwned>(bytes: &[u8], first: Option<SpecFormat>) -> Result<T> {
    let first = first.unwrap_or(SpecFormat::Json);
    let first_err = match parse_as(bytes, first) {
        Ok(spec) => return Ok(spec),
        Err(e) => e,
    };
    debug!("Spec is not {}: {}", first, first_err);
    let second = first.other();
    match parse_as(bytes, second) {
        Ok(spec) => Ok(spec),
        Err(second_err) => Err(TcaError::invalid_spec(format!(
            "format unknown ({}: {}; {}: {})",
            first, first_err, second, second_err
        ))),
    }
}

/// Parse a spec from JSON or YAML
pub fn parse<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    parse_with_hint(bytes, None)
}

/// Serialize a spec in the requested format
pub fn to_string<T: Serialize>(spec: &T, format: SpecFormat) -> Result<String> {
    match format {
        SpecFormat::Json => Ok(serde_json::to_string_pretty(spec)?),
        SpecFormat::Yaml => Ok(serde_yaml::to_string(spec)?),
    }
}

fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|source| TcaError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Read and parse a spec file, honoring its extension
pub fn read_spec_file<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let bytes = read_bytes(path)?;
    parse_with_hint(&bytes, SpecFormat::from_path(path))
}

/// Any spec document, dispatched on its `kind`
#[derive(Debug, Clone, PartialEq)]
pub enum AnySpec {
    Provider(CloudProviderSpec),
    Extension(ExtensionSpec),
    NodePool(NodePoolSpec),
    Cluster(ClusterSpec),
    Template(ClusterTemplate),
    Instance(InstanceSpec),
}

impl AnySpec {
    pub fn kind(&self) -> SpecKind {
        match self {
            AnySpec::Provider(_) => SpecKind::Provider,
            AnySpec::Extension(_) => SpecKind::Extensions,
            AnySpec::NodePool(_) => SpecKind::NodePool,
            AnySpec::Cluster(_) => SpecKind::Cluster,
            AnySpec::Template(_) => SpecKind::Template,
            AnySpec::Instance(_) => SpecKind::Instance,
        }
    }

    /// Parse a document whose `kind` selects the spec type
    pub fn parse_with_hint(bytes: &[u8], first: Option<SpecFormat>) -> Result<Self> {
        let value: serde_json::Value = parse_with_hint(bytes, first)?;
        Self::from_value(value)
    }

    pub fn parse(bytes: &[u8]) -> Result<Self> {
        Self::parse_with_hint(bytes, None)
    }

    pub fn read_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = read_bytes(path)?;
        Self::parse_with_hint(&bytes, SpecFormat::from_path(path))
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let raw_kind = value
            .get("kind")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| TcaError::invalid_spec("spec has no kind"))?;
        let kind = SpecKind::parse(raw_kind)
            .ok_or_else(|| TcaError::invalid_spec(format!("unknown spec kind {}", raw_kind)))?;
        Ok(match kind {
            SpecKind::Provider => AnySpec::Provider(serde_json::from_value(value)?),
            SpecKind::Extensions => AnySpec::Extension(serde_json::from_value(value)?),
            SpecKind::NodePool => AnySpec::NodePool(serde_json::from_value(value)?),
            SpecKind::Cluster => AnySpec::Cluster(serde_json::from_value(value)?),
            SpecKind::Template => AnySpec::Template(serde_json::from_value(value)?),
            SpecKind::Instance => AnySpec::Instance(serde_json::from_value(value)?),
        })
    }

    pub fn to_string(&self, format: SpecFormat) -> Result<String> {
        match self {
            AnySpec::Provider(s) => to_string(s, format),
            AnySpec::Extension(s) => to_string(s, format),
            AnySpec::NodePool(s) => to_string(s, format),
            AnySpec::Cluster(s) => to_string(s, format),
            AnySpec::Template(s) => to_string(s, format),
            AnySpec::Instance(s) => to_string(s, format),
        }
    }
}

impl StructuralValidation for AnySpec {
    fn violations(&self) -> Vec<String> {
        match self {
            AnySpec::Provider(s) => s.violations(),
            AnySpec::Extension(s) => s.violations(),
            AnySpec::NodePool(s) => s.violations(),
            AnySpec::Cluster(s) => s.violations(),
            AnySpec::Template(s) => s.violations(),
            AnySpec::Instance(s) => s.violations(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLUSTER_YAML: &str = r#"
kind: cluster
name: mgmt1
clusterType: MANAGEMENT
clusterPassword: p
clusterTemplateId: tmpl-mgmt
hcxCloudUrl: https://hcx.example
endpointIP: 10.1.1.1
vmTemplate: photon-3-kube-v1.20.4
placementParams:
  - name: core
    type: ClusterComputeResource
masterNodes:
  - name: master
    networks:
      - label: MANAGEMENT
        networkName: tkg-dhcp
    placementParams:
      - name: vsanDatastore
        type: Datastore
workerNodes:
  - name: default-pool01
    replica: 3
    networks:
      - label: MANAGEMENT
        networkName: tkg-dhcp
    placementParams:
      - name: vsanDatastore
        type: Datastore
customField: kept
"#;

    #[test]
    fn test_yaml_falls_back_after_json() {
        let spec: ClusterSpec = parse(CLUSTER_YAML.as_bytes()).unwrap();
        assert_eq!(spec.name, "mgmt1");
        assert_eq!(spec.kind, Some(SpecKind::Cluster));
        assert_eq!(spec.worker_nodes[0].replica, 3);
        assert_eq!(spec.extra.get("customField"), Some(&serde_json::json!("kept")));
    }

    #[test]
    fn test_round_trip_across_formats() {
        let spec: ClusterSpec = parse(CLUSTER_YAML.as_bytes()).unwrap();
        let json = to_string(&spec, SpecFormat::Json).unwrap();
        let yaml = to_string(&spec, SpecFormat::Yaml).unwrap();

        let from_json: ClusterSpec = parse(json.as_bytes()).unwrap();
        let from_yaml: ClusterSpec = parse(yaml.as_bytes()).unwrap();
        assert_eq!(from_json, spec);
        assert_eq!(from_yaml, spec);

        let yaml_of_json = to_string(&from_json, SpecFormat::Yaml).unwrap();
        let cross: ClusterSpec = parse_with_hint(yaml_of_json.as_bytes(), Some(SpecFormat::Yaml)).unwrap();
        assert_eq!(cross, spec);
    }

    const PROVIDER_YAML: &str = r#"
kind: provider
hcxCloudUrl: https://hcx.example
vimName: core
username: admin
password: secret
location:
  city: San Jose
  country: United States of America
  cityAscii: San Jose
  latitude: 37.3875
  longitude: -121.9058
customField: kept
"#;

    const EXTENSION_YAML: &str = r#"
kind: extensions
name: harbor-1
version: v2.x
type: Repository
extensionSubtype: Harbor
interfaceInfo:
  url: https://harbor.example
accessInfo:
  username: admin
  password: secret
vimInfo:
  - vimName: edge-test01
autoScaleEnabled: true
customField: kept
"#;

    const NODE_POOL_YAML: &str = r#"
kind: node_pool
name: hwaccel
cpu: 8
memory: 32768
storage: 80
replica: 2
labels:
  - type=hwaccel
networks:
  - label: MANAGEMENT
    networkName: tkg-dhcp
    nameservers:
      - 10.0.0.2
placementParams:
  - name: vsanDatastore
    type: Datastore
customField: kept
"#;

    const TEMPLATE_YAML: &str = r#"
kind: template
name: workload-tmpl
clusterType: WORKLOAD
clusterConfig:
  kubernetesVersion: v1.20.4
masterNodes:
  - name: master
    cpu: 4
    memory: 16384
    storage: 50
    replica: 1
    networks:
      - label: MANAGEMENT
customField: kept
"#;

    const INSTANCE_YAML: &str = r#"
kind: instance
instanceName: app-1
catalogName: app
clusterName: edge-test01
nodePool: default-pool01
namespace: default
repoUrl: https://harbor.example
flavorName: small
autoName: true
customField: kept
"#;

    #[test]
    fn test_every_kind_round_trips_across_formats() {
        let docs = [
            (SpecKind::Provider, PROVIDER_YAML),
            (SpecKind::Extensions, EXTENSION_YAML),
            (SpecKind::NodePool, NODE_POOL_YAML),
            (SpecKind::Cluster, CLUSTER_YAML),
            (SpecKind::Template, TEMPLATE_YAML),
            (SpecKind::Instance, INSTANCE_YAML),
        ];

        for (kind, doc) in docs {
            let spec = AnySpec::parse(doc.as_bytes()).unwrap();
            assert_eq!(spec.kind(), kind);

            for format in [SpecFormat::Json, SpecFormat::Yaml] {
                let text = spec.to_string(format).unwrap();
                let back = AnySpec::parse_with_hint(text.as_bytes(), Some(format)).unwrap();
                assert_eq!(back, spec, "{} via {:?}", kind.as_str(), format);
            }

            let json = spec.to_string(SpecFormat::Json).unwrap();
            let via_json = AnySpec::parse(json.as_bytes()).unwrap();
            let yaml = via_json.to_string(SpecFormat::Yaml).unwrap();
            let cross = AnySpec::parse_with_hint(yaml.as_bytes(), Some(SpecFormat::Yaml)).unwrap();
            assert_eq!(cross, spec, "{} json then yaml", kind.as_str());

            let value: serde_json::Value = serde_json::from_str(&json).unwrap();
            assert_eq!(value["customField"], "kept", "{} keeps unknown fields", kind.as_str());
        }
    }

    #[test]
    fn test_provider_location_survives_round_trip() {
        let spec: CloudProviderSpec = parse(PROVIDER_YAML.as_bytes()).unwrap();
        let yaml = to_string(&spec, SpecFormat::Yaml).unwrap();
        let back: CloudProviderSpec = parse(yaml.as_bytes()).unwrap();

        let location = back.location.unwrap();
        assert_eq!(location.latitude, 37.3875);
        assert_eq!(location.longitude, -121.9058);
    }

    #[test]
    fn test_unparseable_is_format_unknown() {
        let err = parse::<ClusterSpec>(b"{ not: [valid").unwrap_err();
        match err {
            TcaError::InvalidSpec { reason } => assert!(reason.starts_with("format unknown")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_format_hint_from_extension() {
        assert_eq!(SpecFormat::from_path(Path::new("a/b.yml")), Some(SpecFormat::Yaml));
        assert_eq!(SpecFormat::from_path(Path::new("c.JSON")), Some(SpecFormat::Json));
        assert_eq!(SpecFormat::from_path(Path::new("noext")), None);
    }

    #[test]
    fn test_any_spec_dispatches_on_kind() {
        let spec = AnySpec::parse(CLUSTER_YAML.as_bytes()).unwrap();
        assert_eq!(spec.kind(), SpecKind::Cluster);

        let pool = AnySpec::parse(br#"{"kind":"node_pool","name":"p1","replica":2}"#).unwrap();
        match pool {
            AnySpec::NodePool(p) => assert_eq!(p.replica, 2),
            other => panic!("unexpected {:?}", other),
        }

        let err = AnySpec::parse(br#"{"kind":"galaxy"}"#).unwrap_err();
        assert!(matches!(err, TcaError::InvalidSpec { .. }));
        let err = AnySpec::parse(br#"{"name":"x"}"#).unwrap_err();
        assert!(matches!(err, TcaError::InvalidSpec { .. }));
    }

    #[test]
    fn test_read_spec_file_uses_extension() {
        let dir = std::env::temp_dir().join(format!("tca-spec-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("cluster.yaml");
        std::fs::write(&path, CLUSTER_YAML).unwrap();

        let spec: ClusterSpec = read_spec_file(&path).unwrap();
        assert_eq!(spec.endpoint_ip, "10.1.1.1");
        let any = AnySpec::read_file(&path).unwrap();
        assert_eq!(any.kind(), SpecKind::Cluster);

        let missing = read_spec_file::<ClusterSpec>(dir.join("absent.json")).unwrap_err();
        assert!(matches!(missing, TcaError::Io { .. }));
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
