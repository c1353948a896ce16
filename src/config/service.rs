//! Per-service configuration types.
//!
//! An environment maps each service name to a [`ServiceConfig`]. Exactly one
//! variant block is expected per entry; the switcher picks the block matching
//! the [`ServiceKind`] of the adapter registered under that name.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The service types an environment can switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    Aws,
    Gcp,
    Azure,
    Docker,
    Kubernetes,
    Ssh,
}

impl ServiceKind {
    pub const ALL: [ServiceKind; 6] = [
        ServiceKind::Aws,
        ServiceKind::Gcp,
        ServiceKind::Azure,
        ServiceKind::Docker,
        ServiceKind::Kubernetes,
        ServiceKind::Ssh,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceKind::Aws => "aws",
            ServiceKind::Gcp => "gcp",
            ServiceKind::Azure => "azure",
            ServiceKind::Docker => "docker",
            ServiceKind::Kubernetes => "kubernetes",
            ServiceKind::Ssh => "ssh",
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ServiceKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown service type: {}", s))
    }
}

/// AWS profile, region and optional account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwsConfig {
    pub profile: String,
    pub region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GcpConfig {
    pub project: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AzureConfig {
    pub subscription: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DockerConfig {
    pub context: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KubernetesConfig {
    pub context: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

/// Path of the SSH config to activate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SshConfig {
    pub config: String,
}

/// One service entry as written in an environment file.
///
/// ```yaml
/// services:
///   aws:
///     aws:
///       profile: prod
///       region: eu-west-1
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aws: Option<AwsConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gcp: Option<GcpConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azure: Option<AzureConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docker: Option<DockerConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubernetes: Option<KubernetesConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh: Option<SshConfig>,
}

impl ServiceConfig {
    /// Select the configuration block for `kind`, if one was provided.
    pub fn target(&self, kind: ServiceKind) -> Option<ServiceTarget> {
        match kind {
            ServiceKind::Aws => self.aws.clone().map(ServiceTarget::Aws),
            ServiceKind::Gcp => self.gcp.clone().map(ServiceTarget::Gcp),
            ServiceKind::Azure => self.azure.clone().map(ServiceTarget::Azure),
            ServiceKind::Docker => self.docker.clone().map(ServiceTarget::Docker),
            ServiceKind::Kubernetes => self.kubernetes.clone().map(ServiceTarget::Kubernetes),
            ServiceKind::Ssh => self.ssh.clone().map(ServiceTarget::Ssh),
        }
    }

    /// Kinds that have a configuration block in this entry.
    pub fn configured_kinds(&self) -> Vec<ServiceKind> {
        ServiceKind::ALL
            .into_iter()
            .filter(|kind| self.target(*kind).is_some())
            .collect()
    }
}

impl From<ServiceTarget> for ServiceConfig {
    fn from(target: ServiceTarget) -> Self {
        let mut config = ServiceConfig::default();
        match target {
            ServiceTarget::Aws(c) => config.aws = Some(c),
            ServiceTarget::Gcp(c) => config.gcp = Some(c),
            ServiceTarget::Azure(c) => config.azure = Some(c),
            ServiceTarget::Docker(c) => config.docker = Some(c),
            ServiceTarget::Kubernetes(c) => config.kubernetes = Some(c),
            ServiceTarget::Ssh(c) => config.ssh = Some(c),
        }
        config
    }
}

/// The target state handed to a switcher: exactly one service variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceTarget {
    Aws(AwsConfig),
    Gcp(GcpConfig),
    Azure(AzureConfig),
    Docker(DockerConfig),
    Kubernetes(KubernetesConfig),
    Ssh(SshConfig),
}

impl ServiceTarget {
    pub fn kind(&self) -> ServiceKind {
        match self {
            ServiceTarget::Aws(_) => ServiceKind::Aws,
            ServiceTarget::Gcp(_) => ServiceKind::Gcp,
            ServiceTarget::Azure(_) => ServiceKind::Azure,
            ServiceTarget::Docker(_) => ServiceKind::Docker,
            ServiceTarget::Kubernetes(_) => ServiceKind::Kubernetes,
            ServiceTarget::Ssh(_) => ServiceKind::Ssh,
        }
    }
}
