//! Launch configuration passed by the host on the command line.

use std::ffi::OsString;

use clap::Parser;
use keydeck_types::{EventName, PluginUuid};
use serde_json::Value;

use crate::error::ConfigError;

/// The host starts a plugin as
/// `plugin -port 28196 -pluginUUID <id> -registerEvent registerPlugin -info '{...}'`.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "keydeck-plugin")]
#[command(version, about = "Control-surface plugin", long_about = None)]
pub struct LaunchConfig {
    /// Port of the host's WebSocket server on 127.0.0.1
    #[arg(long)]
    pub port: u16,

    /// Identity assigned to this plugin instance by the host
    #[arg(long = "pluginUUID", value_name = "UUID")]
    pub plugin_uuid: String,

    /// Event name to send in the registration handshake
    #[arg(long = "registerEvent", value_name = "EVENT")]
    pub register_event: String,

    /// Host, device and plugin information as JSON
    #[arg(long, value_name = "JSON")]
    pub info: Option<String>,
}

impl LaunchConfig {
    /// Parse the process arguments.
    ///
    /// # Errors
    ///
    /// See [`LaunchConfig::from_args`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_args(std::env::args_os())
    }

    /// Parse an argument list whose first item is the program name.
    ///
    /// Accepts the host's single-dash long flags (`-port`) as well as the usual
    /// `--port`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Args` if a required flag is missing or a value
    /// does not parse.
    pub fn from_args<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let args = args
            .into_iter()
            .enumerate()
            .map(|(index, arg)| {
                let arg = arg.into();
                if index == 0 { arg } else { normalize_flag(arg) }
            })
            .collect::<Vec<_>>();
        Ok(Self::try_parse_from(args)?)
    }

    #[must_use]
    pub fn plugin_uuid(&self) -> PluginUuid {
        PluginUuid::from(self.plugin_uuid.as_str())
    }

    #[must_use]
    pub fn register_event(&self) -> EventName {
        EventName::from(self.register_event.as_str())
    }

    #[must_use]
    pub fn url(&self) -> String {
        format!("ws://127.0.0.1:{}", self.port)
    }

    /// The `-info` blob, parsed. `None` when the host did not pass one.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Info` if the blob is not valid JSON.
    pub fn info_json(&self) -> Result<Option<Value>, ConfigError> {
        self.info
            .as_deref()
            .map(serde_json::from_str::<Value>)
            .transpose()
            .map_err(ConfigError::Info)
    }
}

/// `-port` becomes `--port`. Values, `--flags` and short flags are left alone.
fn normalize_flag(arg: OsString) -> OsString {
    let Some(text) = arg.to_str() else {
        return arg;
    };
    let mut chars = text.chars();
    let is_single_dash_long = chars.next() == Some('-')
        && chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.next().is_some();
    if is_single_dash_long {
        OsString::from(format!("-{text}"))
    } else {
        arg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host_args() -> Vec<&'static str> {
        vec![
            "plugin",
            "-port",
            "28196",
            "-pluginUUID",
            "ABCD-1234",
            "-registerEvent",
            "registerPlugin",
            "-info",
            r#"{"application":{"version":"6.0"},"devices":[]}"#,
        ]
    }

    #[test]
    fn test_host_style_flags() {
        let config = LaunchConfig::from_args(host_args()).unwrap();
        assert_eq!(config.port, 28196);
        assert_eq!(config.plugin_uuid(), "ABCD-1234");
        assert_eq!(config.register_event(), "registerPlugin");
        assert_eq!(config.url(), "ws://127.0.0.1:28196");
        assert_eq!(
            config.info_json().unwrap().unwrap()["application"]["version"],
            "6.0"
        );
    }

    #[test]
    fn test_double_dash_flags() {
        let config = LaunchConfig::from_args([
            "plugin",
            "--port",
            "1",
            "--pluginUUID",
            "p",
            "--registerEvent",
            "registerPlugin",
        ])
        .unwrap();
        assert_eq!(config.port, 1);
        assert_eq!(config.info, None);
        assert_eq!(config.info_json().unwrap(), None);
    }

    #[test]
    fn test_missing_required_flag() {
        let err = LaunchConfig::from_args(["plugin", "-port", "1", "-pluginUUID", "p"]).unwrap_err();
        assert!(matches!(err, ConfigError::Args(_)));
    }

    #[test]
    fn test_invalid_port() {
        let mut args = host_args();
        args[2] = "99999";
        assert!(matches!(
            LaunchConfig::from_args(args),
            Err(ConfigError::Args(_))
        ));
    }

    #[test]
    fn test_invalid_info_json() {
        let mut args = host_args();
        args[8] = "{not json";
        let config = LaunchConfig::from_args(args).unwrap();
        assert!(matches!(config.info_json(), Err(ConfigError::Info(_))));
    }

    #[test]
    fn test_normalize_flag() {
        assert_eq!(normalize_flag("-port".into()), "--port");
        assert_eq!(normalize_flag("--port".into()), "--port");
        assert_eq!(normalize_flag("-h".into()), "-h");
        assert_eq!(normalize_flag("-1".into()), "-1");
        assert_eq!(normalize_flag("28196".into()), "28196");
        assert_eq!(normalize_flag("{}".into()), "{}");
    }
}
