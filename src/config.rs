use crate::error::ConfigError;
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DATA_FILE: &str = "todos.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub data_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Run(Config),
    Help,
}

pub fn print_help() {
    println!(
        r#"To-do list server

Usage:
  todo-server [options]

Options:
  -p, --port <port>   Port to bind (default: 3000 or PORT)
  -d, --data <file>   JSON file holding the task list (default: ./todos.json or TODO_DATA)
  -h, --help          Show this help message

Environment:
  PORT        Port to bind if --port is not provided
  TODO_DATA   Data file if --data is not provided
  RUST_LOG    Log filter (default: info)
"#
    );
}

fn parse_port(raw: &str) -> Result<u16, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::InvalidPort(raw.to_string()))
}

/// Flags win over environment variables, which win over defaults.
pub fn parse_args<I, E>(args: I, env: E) -> Result<Command, ConfigError>
where
    I: IntoIterator<Item = String>,
    E: Fn(&str) -> Option<String>,
{
    let mut args = args.into_iter();
    let mut port: Option<u16> = None;
    let mut data_path: Option<PathBuf> = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-p" | "--port" => {
                let value = args
                    .next()
                    .ok_or_else(|| ConfigError::MissingValue("--port".to_string()))?;
                port = Some(parse_port(&value)?);
            }
            "-d" | "--data" => {
                let value = args
                    .next()
                    .ok_or_else(|| ConfigError::MissingValue("--data".to_string()))?;
                data_path = Some(PathBuf::from(value));
            }
            "-h" | "--help" => return Ok(Command::Help),
            _ => return Err(ConfigError::UnknownArgument(arg)),
        }
    }
    let port = match port {
        Some(port) => port,
        None => match env("PORT").filter(|v| !v.trim().is_empty()) {
            Some(raw) => parse_port(&raw)?,
            None => DEFAULT_PORT,
        },
    };
    let data_path = data_path
        .or_else(|| env("TODO_DATA").filter(|v| !v.trim().is_empty()).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE));
    Ok(Command::Run(Config { port, data_path }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_flags_or_env() {
        let cmd = parse_args(args(&[]), env_from(&[])).unwrap();
        assert_eq!(
            cmd,
            Command::Run(Config {
                port: 3000,
                data_path: PathBuf::from("todos.json"),
            })
        );
    }

    #[test]
    fn env_overrides_defaults() {
        let env = env_from(&[("PORT", "8080"), ("TODO_DATA", "/tmp/t.json")]);
        let cmd = parse_args(args(&[]), env).unwrap();
        assert_eq!(
            cmd,
            Command::Run(Config {
                port: 8080,
                data_path: PathBuf::from("/tmp/t.json"),
            })
        );
    }

    #[test]
    fn flags_override_env() {
        let env = env_from(&[("PORT", "8080")]);
        let cmd = parse_args(args(&["--port", "9000", "-d", "mine.json"]), env).unwrap();
        assert_eq!(
            cmd,
            Command::Run(Config {
                port: 9000,
                data_path: PathBuf::from("mine.json"),
            })
        );
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(
            parse_args(args(&["--port"]), env_from(&[])),
            Err(ConfigError::MissingValue("--port".to_string()))
        );
        assert_eq!(
            parse_args(args(&[]), env_from(&[("PORT", "http")])),
            Err(ConfigError::InvalidPort("http".to_string()))
        );
        assert_eq!(
            parse_args(args(&["--verbose"]), env_from(&[])),
            Err(ConfigError::UnknownArgument("--verbose".to_string()))
        );
        assert_eq!(parse_args(args(&["-h"]), env_from(&[])), Ok(Command::Help));
    }
}
