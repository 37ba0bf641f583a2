//! Command-line and environment configuration for the server binary.

use std::fmt;
use std::path::{Path, PathBuf};

use api::EnvStatus;
use services::TutorConfig;

pub const DEFAULT_PORT: u16 = 8001;

#[derive(Debug, PartialEq, Eq)]
pub enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    InvalidPort { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::InvalidPort { raw } => write!(f, "invalid port: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid database url: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_port(raw: String) -> Result<u16, ArgsError> {
    raw.trim()
        .parse()
        .map_err(|_| ArgsError::InvalidPort { raw })
}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  dental-quest serve [--port <port>] [--db <sqlite_url>]");
    eprintln!("  dental-quest seed  [--db <sqlite_url>]");
    eprintln!();
    eprintln!("serve is the default subcommand.");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUEST_DB_URL, QUEST_DB_NAME, QUEST_PORT, GROQ_API_KEY,");
    eprintln!("  QUEST_AI_BASE_URL, QUEST_AI_MODEL, QUEST_AI_TIMEOUT_SECS, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Serve,
    Seed,
    Help,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "serve" => Some(Self::Serve),
            "seed" => Some(Self::Seed),
            _ => None,
        }
    }
}

/// Parsed command line. Flags override the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    pub command: Command,
    pub port: Option<u16>,
    pub db_url: Option<String>,
}

impl Args {
    /// Parse arguments, excluding the program name.
    pub fn parse(argv: impl IntoIterator<Item = String>) -> Result<Self, ArgsError> {
        let mut iter = argv.into_iter().peekable();

        let first = iter.peek().cloned();
        let command = match first.as_deref() {
            None => Command::Serve,
            Some(flag) if flag.starts_with('-') => Command::Serve,
            Some(name) => {
                let cmd = Command::from_arg(name)
                    .ok_or_else(|| ArgsError::UnknownCommand(name.to_string()))?;
                iter.next();
                cmd
            }
        };

        let mut args = Self {
            command,
            port: None,
            db_url: None,
        };

        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut iter, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    args.db_url = Some(value);
                }
                "--port" if args.command == Command::Serve => {
                    let value = require_value(&mut iter, "--port")?;
                    args.port = Some(parse_port(value)?);
                }
                "--help" | "-h" => args.command = Command::Help,
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(args)
    }
}

/// Runtime configuration assembled from the environment and the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub port: u16,
    pub db_url: Option<String>,
    pub db_name: Option<String>,
    pub tutor: Option<TutorConfig>,
}

impl Config {
    pub fn from_env(args: &Args) -> Result<Self, ArgsError> {
        Self::from_lookup(args, |key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Blank values count as unset.
    pub fn from_lookup(
        args: &Args,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ArgsError> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match args.port {
            Some(port) => port,
            None => var("QUEST_PORT").map_or(Ok(DEFAULT_PORT), parse_port)?,
        };

        Ok(Self {
            port,
            db_url: args.db_url.clone().or_else(|| var("QUEST_DB_URL")),
            db_name: var("QUEST_DB_NAME"),
            tutor: TutorConfig::from_lookup(&var),
        })
    }

    #[must_use]
    pub fn env_status(&self) -> EnvStatus {
        EnvStatus {
            db_url_set: self.db_url.is_some(),
            db_name_set: self.db_name.is_some(),
            ai_key_set: self.tutor.is_some(),
        }
    }

    /// The sqlx URL of the store, or `None` when no store is configured.
    pub fn store_url(&self) -> Result<Option<String>, ArgsError> {
        match &self.db_url {
            None => Ok(None),
            Some(url) => resolve_store_url(url, self.db_name.as_deref()).map(Some),
        }
    }
}

/// Turn a configured URL into a concrete sqlx `SQLite` URL.
///
/// A URL ending in `:` or `/` names a directory and needs a store name.
pub fn resolve_store_url(raw: &str, name: Option<&str>) -> Result<String, ArgsError> {
    let raw = raw.trim();
    if raw == "sqlite::memory:" {
        return Ok(raw.to_string());
    }

    let joined = if raw.ends_with(':') || raw.ends_with('/') {
        let name = name.ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: raw.to_string(),
        })?;
        format!("{raw}{name}.sqlite3")
    } else {
        raw.to_string()
    };

    let url = normalize_sqlite_url(joined);
    if url.contains('?') {
        Ok(url)
    } else {
        Ok(format!("{url}?mode=rwc"))
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw.starts_with("sqlite://") {
        return raw;
    }

    let path_str = raw.strip_prefix("sqlite:").unwrap_or(raw.as_str());
    let path = Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

/// Create the parent directory of a file-backed store.
pub fn prepare_sqlite_dir(db_url: &str) -> std::io::Result<()> {
    let Some(path) = db_url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    let path = path.split('?').next().unwrap_or(path);
    if let Some(parent) = Path::new(path).parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<Args, ArgsError> {
        Args::parse(list.iter().map(|s| (*s).to_string()))
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn serve_is_the_default_command() {
        assert_eq!(args(&[]).unwrap().command, Command::Serve);
        let parsed = args(&["--port", "9000"]).unwrap();
        assert_eq!(parsed.command, Command::Serve);
        assert_eq!(parsed.port, Some(9000));
    }

    #[test]
    fn seed_accepts_db_but_not_port() {
        let parsed = args(&["seed", "--db", "sqlite:quest.sqlite3"]).unwrap();
        assert_eq!(parsed.command, Command::Seed);
        assert_eq!(parsed.db_url.as_deref(), Some("sqlite:quest.sqlite3"));

        assert_eq!(
            args(&["seed", "--port", "1"]).unwrap_err(),
            ArgsError::UnknownArg("--port".into())
        );
    }

    #[test]
    fn bad_arguments_are_reported() {
        assert_eq!(
            args(&["migrate"]).unwrap_err(),
            ArgsError::UnknownCommand("migrate".into())
        );
        assert_eq!(
            args(&["--port"]).unwrap_err(),
            ArgsError::MissingValue { flag: "--port" }
        );
        assert!(matches!(
            args(&["--port", "eighty"]).unwrap_err(),
            ArgsError::InvalidPort { .. }
        ));
        assert_eq!(args(&["serve", "-h"]).unwrap().command, Command::Help);
    }

    #[test]
    fn env_fills_what_flags_leave_out() {
        let env = |key: &str| match key {
            "QUEST_PORT" => Some("8100".to_string()),
            "QUEST_DB_URL" => Some("sqlite:/srv/data/".to_string()),
            "QUEST_DB_NAME" => Some("quest".to_string()),
            "GROQ_API_KEY" => Some("   ".to_string()),
            _ => None,
        };
        let config = Config::from_lookup(&args(&[]).unwrap(), env).unwrap();
        assert_eq!(config.port, 8100);
        assert_eq!(
            config.env_status(),
            EnvStatus {
                db_url_set: true,
                db_name_set: true,
                ai_key_set: false,
            }
        );
        assert_eq!(
            config.store_url().unwrap().as_deref(),
            Some("sqlite:///srv/data/quest.sqlite3?mode=rwc")
        );

        let flagged =
            Config::from_lookup(&args(&["--port", "7000", "--db", "sqlite::memory:"]).unwrap(), env)
                .unwrap();
        assert_eq!(flagged.port, 7000);
        assert_eq!(flagged.store_url().unwrap().as_deref(), Some("sqlite::memory:"));
    }

    #[test]
    fn blank_tutor_settings_fall_back_to_defaults() {
        let env = |key: &str| match key {
            "GROQ_API_KEY" => Some("secret".to_string()),
            "QUEST_AI_BASE_URL" | "QUEST_AI_MODEL" => Some("  ".to_string()),
            "QUEST_AI_TIMEOUT_SECS" => Some("0".to_string()),
            _ => None,
        };
        let config = Config::from_lookup(&args(&[]).unwrap(), env).unwrap();
        assert!(config.env_status().ai_key_set);

        let tutor = config.tutor.unwrap();
        assert_eq!(tutor.api_key, "secret");
        assert_eq!(tutor.base_url, TutorConfig::DEFAULT_BASE_URL);
        assert_eq!(tutor.model, TutorConfig::DEFAULT_MODEL);
        assert_eq!(
            tutor.timeout,
            std::time::Duration::from_secs(TutorConfig::DEFAULT_TIMEOUT_SECS)
        );
    }

    #[test]
    fn missing_url_means_no_store() {
        let config = Config::from_lookup(&args(&[]).unwrap(), no_env).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.store_url().unwrap(), None);
        assert_eq!(config.env_status(), EnvStatus::default());
    }

    #[test]
    fn directory_url_needs_a_name() {
        assert!(resolve_store_url("sqlite:/tmp/", None).is_err());
        assert_eq!(
            resolve_store_url("sqlite:/tmp/", Some("dq")).unwrap(),
            "sqlite:///tmp/dq.sqlite3?mode=rwc"
        );
    }

    #[test]
    fn existing_query_is_kept() {
        assert_eq!(
            resolve_store_url("sqlite:///tmp/a.db?mode=ro", None).unwrap(),
            "sqlite:///tmp/a.db?mode=ro"
        );
    }

    #[test]
    fn relative_paths_become_absolute() {
        let url = resolve_store_url("sqlite:data/quest.sqlite3", None).unwrap();
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("data/quest.sqlite3?mode=rwc"));
    }
}
