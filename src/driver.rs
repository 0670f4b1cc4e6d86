//! Command Driver
//!
//! Parses line-oriented commands and applies them to a configured cache.
//! Used by the `recency_lru` binary to replay workloads from stdin.

use std::str::FromStr;

use serde::Serialize;

use crate::cache::{ByteLruCache, CacheStats, LruCache};
use crate::config::{CacheMode, Config};
use crate::error::{CacheError, Result};

// == Command ==
/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Set { key: String, value: String },
    Get { key: String },
    Peek { key: String },
    Del { key: String },
    Has { key: String },
    Head,
    Tail,
    Accommodate { bytes: usize },
    Dump,
    Stats,
    Clear,
}

impl FromStr for Command {
    type Err = CacheError;

    /// Parses `<verb> [key] [value...]`. Everything after the key is the value.
    fn from_str(line: &str) -> Result<Self> {
        let line = line.trim();
        let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim_start();
        let key = || -> Result<String> {
            let key = rest.split_whitespace().next().unwrap_or_default();
            if key.is_empty() {
                return Err(CacheError::InvalidCommand(format!("'{}' needs a key", verb)));
            }
            Ok(key.to_string())
        };

        match verb.to_ascii_lowercase().as_str() {
            "set" => {
                let (key, value) = rest.split_once(char::is_whitespace).ok_or_else(|| {
                    CacheError::InvalidCommand("'set' needs a key and a value".to_string())
                })?;
                Ok(Command::Set {
                    key: key.to_string(),
                    value: value.trim_start().to_string(),
                })
            }
            "get" => Ok(Command::Get { key: key()? }),
            "peek" => Ok(Command::Peek { key: key()? }),
            "del" | "delete" | "remove" => Ok(Command::Del { key: key()? }),
            "has" => Ok(Command::Has { key: key()? }),
            "head" => Ok(Command::Head),
            "tail" => Ok(Command::Tail),
            "accommodate" => {
                let bytes = rest.parse().map_err(|_| {
                    CacheError::InvalidCommand(format!("'{}' is not a byte count", rest))
                })?;
                Ok(Command::Accommodate { bytes })
            }
            "dump" => Ok(Command::Dump),
            "stats" => Ok(Command::Stats),
            "clear" => Ok(Command::Clear),
            other => Err(CacheError::InvalidCommand(format!(
                "unknown command '{}'",
                other
            ))),
        }
    }
}

// == Reply ==
/// Outcome of a command, serialized as one JSON object per line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reply", rename_all = "snake_case")]
pub enum Reply {
    Stored { key: String },
    Value { key: String, value: Option<String> },
    Removed { key: String, removed: bool },
    Present { key: String, present: bool },
    Entry { entry: Option<(String, String)> },
    Accommodated { evicted: usize },
    Dump { text: String },
    Stats { stats: CacheStats },
    Cleared {},
}

// == Session ==
/// A cache of text keys and values in either mode.
#[derive(Debug)]
pub enum Session {
    Count(LruCache<String, String>),
    Bytes(ByteLruCache<String, String>),
}

fn owned(entry: Option<(&String, &String)>) -> Option<(String, String)> {
    entry.map(|(k, v)| (k.clone(), v.clone()))
}

impl Session {
    /// Builds the cache described by `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        match config.mode {
            CacheMode::Count => Ok(Session::Count(LruCache::with_capacity(
                config.entry_capacity()?,
            )?)),
            CacheMode::Bytes => Ok(Session::Bytes(ByteLruCache::new(config.byte_budget)?)),
        }
    }

    /// Applies one command.
    pub fn execute(&mut self, command: Command) -> Result<Reply> {
        let reply = match (self, command) {
            (Session::Count(cache), Command::Set { key, value }) => {
                cache.set(key.clone(), value);
                Reply::Stored { key }
            }
            (Session::Bytes(cache), Command::Set { key, value }) => {
                cache.set(key.clone(), value)?;
                Reply::Stored { key }
            }
            (Session::Count(cache), Command::Get { key }) => Reply::Value {
                value: cache.get(&key).cloned(),
                key,
            },
            (Session::Bytes(cache), Command::Get { key }) => Reply::Value {
                value: cache.get(&key).cloned(),
                key,
            },
            (Session::Count(cache), Command::Peek { key }) => Reply::Value {
                value: cache.peek(&key).cloned(),
                key,
            },
            (Session::Bytes(cache), Command::Peek { key }) => Reply::Value {
                value: cache.peek(&key).cloned(),
                key,
            },
            (Session::Count(cache), Command::Del { key }) => Reply::Removed {
                removed: cache.delete(&key),
                key,
            },
            (Session::Bytes(cache), Command::Del { key }) => Reply::Removed {
                removed: cache.delete(&key),
                key,
            },
            (Session::Count(cache), Command::Has { key }) => Reply::Present {
                present: cache.has(&key),
                key,
            },
            (Session::Bytes(cache), Command::Has { key }) => Reply::Present {
                present: cache.has(&key),
                key,
            },
            (Session::Count(cache), Command::Head) => Reply::Entry {
                entry: owned(cache.head()),
            },
            (Session::Bytes(cache), Command::Head) => Reply::Entry {
                entry: owned(cache.head()),
            },
            (Session::Count(cache), Command::Tail) => Reply::Entry {
                entry: owned(cache.tail()),
            },
            (Session::Bytes(cache), Command::Tail) => Reply::Entry {
                entry: owned(cache.tail()),
            },
            (Session::Count(_), Command::Accommodate { .. }) => {
                return Err(CacheError::InvalidCommand(
                    "'accommodate' is only available in bytes mode".to_string(),
                ))
            }
            (Session::Bytes(cache), Command::Accommodate { bytes }) => Reply::Accommodated {
                evicted: cache.accommodate(bytes),
            },
            (Session::Count(cache), Command::Dump) => Reply::Dump {
                text: cache.to_string(),
            },
            (Session::Bytes(cache), Command::Dump) => Reply::Dump {
                text: cache.to_string(),
            },
            (Session::Count(cache), Command::Stats) => Reply::Stats {
                stats: cache.stats(),
            },
            (Session::Bytes(cache), Command::Stats) => Reply::Stats {
                stats: cache.stats(),
            },
            (Session::Count(cache), Command::Clear) => {
                cache.clear();
                Reply::Cleared {}
            }
            (Session::Bytes(cache), Command::Clear) => {
                cache.clear();
                Reply::Cleared {}
            }
        };
        Ok(reply)
    }
}
