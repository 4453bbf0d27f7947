//! ECS namespace copy target plugin
//!
//! URIs follow `ecs-ns-copy:[http[s]://]access_key:secret_key@[host[:port]][/root-prefix]`.
//! Every component that is absent in the URI stays `None`, so generating a
//! URI from a parsed configuration reproduces the input.

use crate::definition::{ConfigType, OptionSpec, PluginDefinition};
use crate::error::{ConfigError, ConfigResult};
use once_cell::sync::Lazy;
use regex::Regex;

/// URI prefix of the namespace copy plugin
pub const URI_PREFIX: &str = "ecs-ns-copy:";

/// Protocol used when the URI does not name one
pub const DEFAULT_PROTOCOL: &str = "https";

static URI_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^ecs-ns-copy:(?:(https?)://)?",
        r"([^:@/]+):([^@]+)@",
        r"([^/:@]*)(?::([1-9][0-9]{0,4}))?",
        r"(?:/(.*))?$",
    ))
    .expect("valid regex")
});

static BUCKET_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9._-]+$").expect("valid regex"));

/// Configuration of a server-side copy between ECS namespaces
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EcsNamespaceCopyConfig {
    /// `http` or `https`
    pub protocol: Option<String>,
    /// Endpoint host
    pub host: Option<String>,
    /// Endpoint port
    pub port: Option<u16>,
    /// Access key (identity)
    pub access_key: Option<String>,
    /// Secret key
    pub secret_key: Option<String>,
    /// Prefix prepended to every target key
    pub root_key: Option<String>,
    /// Bucket objects are copied into
    pub target_bucket: Option<String>,
    /// Namespace objects are copied from
    pub source_namespace: Option<String>,
    /// Overwrite target objects regardless of timestamps
    pub force: bool,
    /// Check the target bucket exists while configuring
    pub verify_target_bucket: bool,
}

impl Default for EcsNamespaceCopyConfig {
    fn default() -> Self {
        Self {
            protocol: None,
            host: None,
            port: None,
            access_key: None,
            secret_key: None,
            root_key: None,
            target_bucket: None,
            source_namespace: None,
            force: false,
            verify_target_bucket: true,
        }
    }
}

impl EcsNamespaceCopyConfig {
    /// URI for the current endpoint and credentials
    pub fn to_uri(&self) -> String {
        let mut uri = String::from(URI_PREFIX);
        if let Some(protocol) = &self.protocol {
            uri.push_str(protocol);
            uri.push_str("://");
        }
        uri.push_str(self.access_key.as_deref().unwrap_or_default());
        uri.push(':');
        uri.push_str(self.secret_key.as_deref().unwrap_or_default());
        uri.push('@');
        uri.push_str(self.host.as_deref().unwrap_or_default());
        if let Some(port) = self.port {
            uri.push(':');
            uri.push_str(&port.to_string());
        }
        if let Some(root_key) = &self.root_key {
            uri.push('/');
            uri.push_str(root_key);
        }
        uri
    }

    /// Populate endpoint, credentials and root key from a URI
    pub fn apply_uri(&mut self, uri: &str) -> Result<(), String> {
        let captures = URI_PATTERN.captures(uri).ok_or_else(|| {
            "expected ecs-ns-copy:[http[s]://]access_key:secret_key@[host[:port]][/root-prefix]"
                .to_string()
        })?;

        let port = captures
            .get(5)
            .map(|m| {
                m.as_str()
                    .parse::<u16>()
                    .map_err(|_| format!("port {} is out of range", m.as_str()))
            })
            .transpose()?;
        let host = captures
            .get(4)
            .map(|m| m.as_str())
            .filter(|h| !h.is_empty());
        if host.is_none() && port.is_some() {
            return Err("port given without a host".to_string());
        }

        self.protocol = captures.get(1).map(|m| m.as_str().to_string());
        self.access_key = Some(captures[2].to_string());
        self.secret_key = Some(captures[3].to_string());
        self.host = host.map(str::to_string);
        self.port = port;
        self.root_key = captures.get(6).map(|m| m.as_str().to_string());
        Ok(())
    }

    /// Endpoint URL built from protocol, host and port
    pub fn endpoint(&self) -> Option<String> {
        let host = self.host.as_deref()?;
        let protocol = self.protocol.as_deref().unwrap_or(DEFAULT_PROTOCOL);
        Some(match self.port {
            Some(port) => format!("{}://{}:{}", protocol, host, port),
            None => format!("{}://{}", protocol, host),
        })
    }

    /// Check the settings a target needs before any object is copied
    pub fn validate(&self) -> ConfigResult<()> {
        fn has_text(value: &Option<String>) -> bool {
            value.as_deref().is_some_and(|v| !v.trim().is_empty())
        }

        if !has_text(&self.access_key) {
            return Err(ConfigError::validation("accessKey is required"));
        }
        if !has_text(&self.secret_key) {
            return Err(ConfigError::validation("secretKey is required"));
        }
        let bucket = self
            .target_bucket
            .as_deref()
            .filter(|b| !b.trim().is_empty())
            .ok_or_else(|| ConfigError::validation("targetBucket is required"))?;
        if !BUCKET_PATTERN.is_match(bucket) {
            return Err(ConfigError::validation(format!(
                "{} is not a valid bucket name",
                bucket
            )));
        }
        Ok(())
    }
}

impl ConfigType for EcsNamespaceCopyConfig {
    const TYPE_NAME: &'static str = "EcsNamespaceCopyConfig";

    fn definition() -> PluginDefinition {
        PluginDefinition::storage::<Self>(URI_PREFIX)
            .label("ECS Namespace Copy")
            .documentation(
                "Copies objects from a bucket in one ECS namespace into a bucket in another \
                 namespace using server-side copy. URIs look like \
                 ecs-ns-copy:[http[s]://]access_key:secret_key@[host[:port]][/root-prefix]. \
                 Existing target objects are only overwritten when the source is newer, \
                 unless --force is given.",
            )
            .uri(Self::to_uri, Self::apply_uri)
            .option(
                OptionSpec::new("protocol", "Protocol of the endpoint (http or https).")
                    .bind(|c: &Self| &c.protocol, |c: &mut Self| &mut c.protocol),
            )
            .option(
                OptionSpec::new("host", "Host name of the endpoint.")
                    .bind(|c: &Self| &c.host, |c: &mut Self| &mut c.host),
            )
            .option(
                OptionSpec::new("port", "Port of the endpoint.")
                    .bind(|c: &Self| &c.port, |c: &mut Self| &mut c.port),
            )
            .option(
                OptionSpec::new("accessKey", "Access key (identity) used to authenticate.")
                    .bind(|c: &Self| &c.access_key, |c: &mut Self| &mut c.access_key),
            )
            .option(
                OptionSpec::new("secretKey", "Secret key used to authenticate.")
                    .sensitive()
                    .bind(|c: &Self| &c.secret_key, |c: &mut Self| &mut c.secret_key),
            )
            .option(
                OptionSpec::new("rootKey", "Prefix prepended to every target key.")
                    .bind(|c: &Self| &c.root_key, |c: &mut Self| &mut c.root_key),
            )
            .option(
                OptionSpec::new("targetBucket", "Specifies the target bucket to use.")
                    .required()
                    .value_hint("bucket")
                    .order(1)
                    .bind(|c: &Self| &c.target_bucket, |c: &mut Self| &mut c.target_bucket),
            )
            .option(
                OptionSpec::new(
                    "sourceNamespace",
                    "Specifies the source namespace to use. Defaults to the namespace of each \
                     source object.",
                )
                .value_hint("namespace")
                .order(1)
                .bind(
                    |c: &Self| &c.source_namespace,
                    |c: &mut Self| &mut c.source_namespace,
                ),
            )
            .option(
                OptionSpec::new(
                    "force",
                    "Overwrite target objects even when they are in sync or newer than the \
                     source.",
                )
                .order(2)
                .bind(|c: &Self| &c.force, |c: &mut Self| &mut c.force),
            )
            .option(
                OptionSpec::new(
                    "verifyTargetBucket",
                    "Do not check that the target bucket exists before copying.",
                )
                .inverted()
                .order(2)
                .bind(
                    |c: &Self| &c.verify_target_bucket,
                    |c: &mut Self| &mut c.verify_target_bucket,
                ),
            )
            .build()
    }
}
