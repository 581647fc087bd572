//! Extraction of path-bearing proxy flags.
//!
//! Only the flags naming host files are recognized; everything else is
//! forwarded to the proxy untouched. Parsing follows conventional
//! option-parser rules: `--flag value`, `--flag=value`, `-c value`, `-cvalue`,
//! last occurrence wins, and a value may not look like another option.

use crate::error::{LaunchError, Result};
use std::fmt;

/// Proxy flags whose values are filesystem paths.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum PathFlag {
    /// `--admin-address-path`
    AdminAddressPath,
    /// `--base-id-path`
    BaseIdPath,
    /// `-c` / `--config-path`
    ConfigPath,
    /// `--log-path`
    LogPath,
    /// `--socket-path`
    SocketPath,
}

impl PathFlag {
    /// Order in which rewritten flags are appended to the proxy arguments.
    pub const ALL: [PathFlag; 5] = [
        PathFlag::AdminAddressPath,
        PathFlag::BaseIdPath,
        PathFlag::ConfigPath,
        PathFlag::LogPath,
        PathFlag::SocketPath,
    ];

    /// Long option name without leading dashes.
    pub fn long_name(&self) -> &'static str {
        match self {
            PathFlag::AdminAddressPath => "admin-address-path",
            PathFlag::BaseIdPath => "base-id-path",
            PathFlag::ConfigPath => "config-path",
            PathFlag::LogPath => "log-path",
            PathFlag::SocketPath => "socket-path",
        }
    }

    fn from_long(name: &str) -> Option<PathFlag> {
        Self::ALL.into_iter().find(|flag| flag.long_name() == name)
    }

    fn index(&self) -> usize {
        match self {
            PathFlag::AdminAddressPath => 0,
            PathFlag::BaseIdPath => 1,
            PathFlag::ConfigPath => 2,
            PathFlag::LogPath => 3,
            PathFlag::SocketPath => 4,
        }
    }
}

impl fmt::Display for PathFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "--{}", self.long_name())
    }
}

/// Proxy arguments split into recognized paths and pass-through arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxyArgs {
    paths: [Option<String>; 5],
    /// Arguments forwarded unchanged, in their original order
    pub passthrough: Vec<String>,
}

impl ProxyArgs {
    /// Split a proxy argument vector (without the program name).
    ///
    /// Long names must be spelled in full. Abbreviations such as
    /// `--admin-address` are forwarded untouched, since `--base-id` is a
    /// separate proxy flag that a prefix match would swallow.
    pub fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut parsed = ProxyArgs::default();
        let mut args = args.into_iter().map(Into::<String>::into);

        while let Some(arg) = args.next() {
            if arg == "--" {
                parsed.passthrough.push(arg);
                parsed.passthrough.extend(args.by_ref());
                break;
            }

            if let Some(long) = arg.strip_prefix("--") {
                let (name, attached) = match long.split_once('=') {
                    Some((name, value)) => (name, Some(value.to_string())),
                    None => (long, None),
                };
                if let Some(flag) = PathFlag::from_long(name) {
                    let value = match attached {
                        Some(value) => value,
                        None => take_value(&mut args, &arg)?,
                    };
                    parsed.set(flag, value);
                    continue;
                }
            } else if let Some(rest) = arg.strip_prefix("-c") {
                let value = if rest.is_empty() {
                    take_value(&mut args, &arg)?
                } else {
                    rest.strip_prefix('=').unwrap_or(rest).to_string()
                };
                parsed.set(PathFlag::ConfigPath, value);
                continue;
            }

            parsed.passthrough.push(arg);
        }

        Ok(parsed)
    }

    /// Value given for `flag`, if any. Empty values count as absent.
    pub fn path(&self, flag: PathFlag) -> Option<&str> {
        self.paths[flag.index()]
            .as_deref()
            .filter(|value| !value.is_empty())
    }

    /// Recognized flags with non-empty values, in rewrite order.
    pub fn paths(&self) -> impl Iterator<Item = (PathFlag, &str)> + '_ {
        PathFlag::ALL
            .into_iter()
            .filter_map(|flag| self.path(flag).map(|value| (flag, value)))
    }

    fn set(&mut self, flag: PathFlag, value: String) {
        self.paths[flag.index()] = Some(value);
    }
}

fn take_value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String> {
    match args.next() {
        Some(value) if !(value.starts_with('-') && value.len() > 1) => Ok(value),
        _ => Err(LaunchError::MissingValue {
            flag: flag.to_string(),
        }
        .into()),
    }
}
