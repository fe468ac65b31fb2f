//! Startup configuration: command-line flags, environment variables and an
//! optional TOML file, merged in that order of precedence.
//!
//! Example config file:
//!
//! ```toml
//! [watch]
//! url = "https://clinic.example.com/get-started"
//! interval_secs = 300
//! send_404_notification = false
//! label = "ND Psych"
//!
//! [email]
//! api_key = "key-..."
//! domain = "mg.example.com"
//! to = "me@example.com"
//!
//! [sms]
//! username = "me@example.com"
//! password = "..."
//! did = "5550001111"
//! to = "5550002222"
//!
//! [logging]
//! format = "json"
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Deserialize;
use thiserror::Error;

use watch_core::{ConfigError, MailgunConfig, VoipMsConfig, WatchConfig};

/// Page availability watchdog: probe a URL and notify when it flips between 404 and 200.
#[derive(Debug, Default, Parser)]
#[command(name = "page-watch", version = crate::version_string(), about)]
pub struct Cli {
    /// Path to an optional TOML config file.
    #[arg(long, env = "WATCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Page to probe.
    #[arg(long, env = "CHECK_URL")]
    pub url: Option<String>,

    /// Seconds between checks.
    #[arg(long, env = "CHECK_INTERVAL")]
    pub interval: Option<u64>,

    /// Probe request timeout in seconds.
    #[arg(long, env = "REQUEST_TIMEOUT")]
    pub request_timeout: Option<u64>,

    /// Notify on every check while the page is still 404.
    #[arg(
        long = "send-404-notification",
        env = "SEND_404_NOTIFICATION",
        value_parser = parse_flag,
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    pub send_404_notification: Option<bool>,

    /// Page name used in notification wording.
    #[arg(long, env = "WATCH_LABEL")]
    pub label: Option<String>,

    #[arg(long, env = "MAILGUN_API_KEY", hide_env_values = true)]
    pub mailgun_api_key: Option<String>,

    #[arg(long, env = "MAILGUN_DOMAIN")]
    pub mailgun_domain: Option<String>,

    #[arg(long, env = "MAILGUN_API_BASE")]
    pub mailgun_api_base: Option<String>,

    #[arg(long, env = "EMAIL_TO")]
    pub email_to: Option<String>,

    #[arg(long, env = "EMAIL_FROM")]
    pub email_from: Option<String>,

    #[arg(long = "voipms-username", env = "VOIPMS_API_USERNAME")]
    pub voipms_username: Option<String>,

    #[arg(long = "voipms-password", env = "VOIPMS_API_PASSWORD", hide_env_values = true)]
    pub voipms_password: Option<String>,

    /// Originating VoIP.ms DID number.
    #[arg(long = "voipms-did", env = "VOIPMS_DID_NUMBER")]
    pub voipms_did: Option<String>,

    #[arg(long = "voipms-api-url", env = "VOIPMS_API_URL")]
    pub voipms_api_url: Option<String>,

    #[arg(long = "sms-to", env = "SMS_DESTINATION_NUMBER")]
    pub sms_to: Option<String>,

    /// Log output format: pretty or json.
    #[arg(long, env = "LOG_FORMAT")]
    pub log_format: Option<String>,
}

/// `true`, `1` and `yes` (any case) enable the flag; anything else disables it.
fn parse_flag(value: &str) -> Result<bool, String> {
    Ok(matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes"
    ))
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Invalid log_format '{0}': must be 'pretty' or 'json'")]
    LogFormat(String),
    #[error(transparent)]
    Watch(#[from] ConfigError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Result<Self, SettingsError> {
        match value {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(SettingsError::LogFormat(other.to_string())),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pretty => write!(f, "pretty"),
            Self::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub watch: WatchSection,
    #[serde(default)]
    pub email: MailgunConfig,
    #[serde(default)]
    pub sms: VoipMsConfig,
    #[serde(default)]
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WatchSection {
    pub url: Option<String>,
    pub interval_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub send_404_notification: Option<bool>,
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingSection {
    pub format: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Fully resolved startup settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub watch: WatchConfig,
    pub email: MailgunConfig,
    pub sms: VoipMsConfig,
    pub log_format: LogFormat,
}

impl Settings {
    pub fn load(cli: Cli) -> Result<Self, SettingsError> {
        let file = match cli.config.as_deref() {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Self::resolve(cli, file)
    }

    pub fn resolve(cli: Cli, file: FileConfig) -> Result<Self, SettingsError> {
        let FileConfig {
            watch: section,
            email: file_email,
            sms: file_sms,
            logging,
        } = file;

        let mut watch = WatchConfig::new(cli.url.or(section.url).unwrap_or_default());
        if let Some(secs) = cli.interval.or(section.interval_secs) {
            watch = watch.with_poll_interval(secs);
        }
        if let Some(secs) = cli.request_timeout.or(section.request_timeout_secs) {
            watch = watch.with_request_timeout(secs);
        }
        if let Some(enabled) = cli.send_404_notification.or(section.send_404_notification) {
            watch = watch.with_notify_on_404(enabled);
        }
        if let Some(label) = cli.label.or(section.label) {
            watch = watch.with_label(label);
        }
        watch.validate()?;

        let email = MailgunConfig {
            api_key: cli.mailgun_api_key.or(file_email.api_key),
            domain: cli.mailgun_domain.or(file_email.domain),
            to: cli.email_to.or(file_email.to),
            from: cli.email_from.or(file_email.from),
            api_base: cli.mailgun_api_base.unwrap_or(file_email.api_base),
        };

        let sms = VoipMsConfig {
            username: cli.voipms_username.or(file_sms.username),
            password: cli.voipms_password.or(file_sms.password),
            did: cli.voipms_did.or(file_sms.did),
            to: cli.sms_to.or(file_sms.to),
            api_url: cli.voipms_api_url.unwrap_or(file_sms.api_url),
        };

        let log_format = match cli.log_format.or(logging.format) {
            Some(value) => LogFormat::parse(&value)?,
            None => LogFormat::Pretty,
        };

        Ok(Self {
            watch,
            email,
            sms,
            log_format,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::ffi::OsString;
    use std::sync::Mutex;
    use std::time::Duration;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    /// Parses `args` with every variable the CLI reads cleared, then `env` applied.
    /// The previous environment is restored before returning.
    fn parse_with_env(args: &[&str], env: &[(&str, &str)]) -> Cli {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());

        let names: Vec<OsString> = Cli::command()
            .get_arguments()
            .filter_map(|a| a.get_env().map(|v| v.to_os_string()))
            .collect();
        let saved: Vec<(OsString, Option<OsString>)> = names
            .iter()
            .map(|n| (n.clone(), std::env::var_os(n)))
            .collect();
        for name in &names {
            std::env::remove_var(name);
        }
        for (key, value) in env {
            std::env::set_var(key, value);
        }

        let mut argv = vec!["page-watch"];
        argv.extend_from_slice(args);
        let parsed = Cli::try_parse_from(argv);

        for (name, value) in saved {
            match value {
                Some(v) => std::env::set_var(&name, v),
                None => std::env::remove_var(&name),
            }
        }
        parsed.unwrap()
    }

    fn cli_for(url: &str) -> Cli {
        Cli {
            url: Some(url.to_string()),
            ..Cli::default()
        }
    }

    #[test]
    fn parse_flag_accepts_documented_truthy_values() {
        for v in ["true", "TRUE", "1", "yes", "Yes"] {
            assert_eq!(parse_flag(v), Ok(true), "{v}");
        }
        for v in ["false", "0", "no", "on", ""] {
            assert_eq!(parse_flag(v), Ok(false), "{v}");
        }
    }

    #[test]
    fn bare_404_flag_means_true() {
        let c = parse_with_env(&["--url", "https://example.com/", "--send-404-notification"], &[]);
        assert_eq!(c.send_404_notification, Some(true));
    }

    #[test]
    fn environment_fills_unset_flags() {
        let c = parse_with_env(
            &[],
            &[
                ("CHECK_URL", "https://env.example.com/"),
                ("CHECK_INTERVAL", "60"),
                ("SEND_404_NOTIFICATION", "yes"),
                ("VOIPMS_DID_NUMBER", "5550001111"),
            ],
        );
        assert_eq!(c.url.as_deref(), Some("https://env.example.com/"));
        assert_eq!(c.interval, Some(60));
        assert_eq!(c.send_404_notification, Some(true));
        assert_eq!(c.voipms_did.as_deref(), Some("5550001111"));
        assert_eq!(c.log_format, None);
    }

    #[test]
    fn flags_override_environment() {
        let c = parse_with_env(
            &["--url", "https://flag.example.com/", "--interval", "120"],
            &[
                ("CHECK_URL", "https://env.example.com/"),
                ("CHECK_INTERVAL", "60"),
            ],
        );
        let s = Settings::resolve(c, FileConfig::default()).unwrap();
        assert_eq!(s.watch.url, "https://flag.example.com/");
        assert_eq!(s.watch.poll_interval, Duration::from_secs(120));
    }

    #[test]
    fn flags_resolve_with_defaults() {
        let c = cli_for("https://example.com/page");
        let s = Settings::resolve(c, FileConfig::default()).unwrap();
        assert_eq!(s.watch.url, "https://example.com/page");
        assert_eq!(s.watch.poll_interval, Duration::from_secs(300));
        assert_eq!(s.log_format, LogFormat::Pretty);
    }

    #[test]
    fn file_fills_gaps_and_flags_win() {
        let file: FileConfig = toml::from_str(
            r#"
[watch]
url = "https://from-file.example.com/"
interval_secs = 60
label = "Clinic"

[email]
api_key = "file-key"
domain = "mg.example.com"
to = "a@example.com"

[sms]
username = "user"

[logging]
format = "json"
"#,
        )
        .unwrap();

        let c = Cli {
            mailgun_api_key: Some("flag-key".into()),
            ..cli_for("https://from-flag.example.com/")
        };
        let s = Settings::resolve(c, file).unwrap();

        assert_eq!(s.watch.url, "https://from-flag.example.com/");
        assert_eq!(s.watch.poll_interval, Duration::from_secs(60));
        assert_eq!(s.watch.label, "Clinic");
        assert_eq!(s.email.api_key.as_deref(), Some("flag-key"));
        assert_eq!(s.email.domain.as_deref(), Some("mg.example.com"));
        assert!(s.email.is_configured());
        assert_eq!(s.email.api_base, watch_core::config::DEFAULT_MAILGUN_API_BASE);
        assert_eq!(s.sms.missing(), vec!["password", "did", "to"]);
        assert_eq!(s.log_format, LogFormat::Json);
    }

    #[test]
    fn invalid_log_format_is_rejected() {
        let c = Cli {
            log_format: Some("xml".into()),
            ..cli_for("https://example.com/")
        };
        let err = Settings::resolve(c, FileConfig::default()).unwrap_err();
        assert!(err.to_string().contains("Invalid log_format"), "{err}");
    }

    #[test]
    fn zero_interval_is_rejected() {
        let c = Cli {
            interval: Some(0),
            ..cli_for("https://example.com/")
        };
        let err = Settings::resolve(c, FileConfig::default()).unwrap_err();
        assert!(matches!(err, SettingsError::Watch(ConfigError::ZeroInterval)));
    }

    #[test]
    fn missing_config_file_is_reported() {
        let err = FileConfig::load(Path::new("/nonexistent/page-watch.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"), "{err}");
    }
}
