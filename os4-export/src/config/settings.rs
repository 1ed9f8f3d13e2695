// Environment configuration for the exporter
use std::env;
use std::path::PathBuf;

use crate::store::OutputFormat;
use crate::ExportError;

// Environment variable names
pub const JITSI_DOMAIN: &str = "JITSI_DOMAIN";
pub const JITSI_ROOM_NAME: &str = "JITSI_ROOM_NAME";
pub const JITSI_ROOM_PASSWORD: &str = "JITSI_ROOM_PASSWORD";
pub const ENABLE_CHAT: &str = "ENABLE_CHAT";
pub const DEMO_MODE_USERS: &str = "DEMO_MODE_USERS";

pub const INPUT: &str = "OS4_EXPORT_INPUT";
pub const OUTPUT: &str = "OS4_EXPORT_OUTPUT";
pub const FORMAT: &str = "OS4_EXPORT_FORMAT";
pub const MEDIAFILE_DIR: &str = "OS4_EXPORT_MEDIAFILE_DIR";
pub const MEDIAFILE_DATABASE: &str = "OS4_EXPORT_MEDIAFILE_DATABASE";
pub const PRETTY: &str = "OS4_EXPORT_PRETTY";

/// Server settings the exporter copies into the meeting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSettings {
    pub jitsi_domain: Option<String>,
    pub jitsi_room_name: Option<String>,
    pub jitsi_room_password: Option<String>,
    pub enable_chat: bool,
    /// Ids of the demo users. `None` when demo mode is off.
    pub demo_mode_users: Option<Vec<i64>>,
}

impl ExportSettings {
    pub fn from_env() -> Result<Self, ExportError> {
        let demo_mode_users = match non_empty_var(DEMO_MODE_USERS) {
            Some(raw) => Some(parse_id_list(DEMO_MODE_USERS, &raw)?),
            None => None,
        };

        Ok(Self {
            jitsi_domain: non_empty_var(JITSI_DOMAIN),
            jitsi_room_name: non_empty_var(JITSI_ROOM_NAME),
            jitsi_room_password: non_empty_var(JITSI_ROOM_PASSWORD),
            enable_chat: flag_var(ENABLE_CHAT, false)?,
            demo_mode_users,
        })
    }

    pub fn is_demo_user(&self, user_id: i64) -> bool {
        self.demo_mode_users
            .as_ref()
            .is_some_and(|ids| ids.contains(&user_id))
    }
}

/// Input, output and storage locations for the binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub input: PathBuf,
    /// `None` writes to stdout.
    pub output: Option<PathBuf>,
    pub format: OutputFormat,
    /// Root of a filesystem mediafile dump. Without it every mediafile is
    /// exported as a placeholder.
    pub mediafile_dir: Option<PathBuf>,
    pub mediafile_database: bool,
    pub pretty: bool,
}

impl RunConfig {
    pub fn from_env() -> Result<Self, ExportError> {
        let input = non_empty_var(INPUT)
            .map(PathBuf::from)
            .ok_or_else(|| ExportError::config(format!("{} must be set", INPUT)))?;

        let format = match non_empty_var(FORMAT) {
            Some(raw) => raw.parse().map_err(ExportError::config)?,
            None => OutputFormat::default(),
        };

        Ok(Self {
            input,
            output: non_empty_var(OUTPUT).map(PathBuf::from),
            format,
            mediafile_dir: non_empty_var(MEDIAFILE_DIR).map(PathBuf::from),
            mediafile_database: flag_var(MEDIAFILE_DATABASE, false)?,
            pretty: flag_var(PRETTY, false)?,
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn flag_var(name: &str, default: bool) -> Result<bool, ExportError> {
    match non_empty_var(name) {
        Some(raw) => parse_flag(name, &raw),
        None => Ok(default),
    }
}

fn parse_flag(name: &str, raw: &str) -> Result<bool, ExportError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ExportError::config(format!(
            "{} must be a boolean, got '{}'",
            name, raw
        ))),
    }
}

fn parse_id_list(name: &str, raw: &str) -> Result<Vec<i64>, ExportError> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<i64>().map_err(|_| {
                ExportError::config(format!("{} contains a non-numeric id '{}'", name, part))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("X", "true").unwrap());
        assert!(parse_flag("X", " YES ").unwrap());
        assert!(!parse_flag("X", "0").unwrap());
        assert!(parse_flag("X", "maybe").is_err());
    }

    #[test]
    fn test_parse_id_list() {
        assert_eq!(parse_id_list("X", "1, 2,,5").unwrap(), vec![1, 2, 5]);
        assert!(parse_id_list("X", "1,a").is_err());
    }

    #[test]
    fn test_demo_users() {
        let settings = ExportSettings {
            demo_mode_users: Some(vec![3, 4]),
            ..Default::default()
        };
        assert!(settings.is_demo_user(3));
        assert!(!settings.is_demo_user(5));
        assert!(!ExportSettings::default().is_demo_user(3));
    }
}
