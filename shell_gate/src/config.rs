//! # Policy Settings
//!
//! This module defines the policy snapshot used for a single request and the ways to
//! obtain one.
//!
//! ## Core Data Structures
//!
//! - **`Settings`**: timeout, working directory rules, allow/block patterns and the
//!   metacharacter switch. `Settings::default()` is the built-in policy used when no
//!   settings document is found.
//!
//! - **`SettingsSource`**: where a request gets its snapshot from. `FileSettings` reads a
//!   JSON document fresh from disk on every request, so edits take effect without a
//!   restart. `StaticSettings` hands out a fixed snapshot.
//!
//! ## Lenient Decoding
//!
//! Settings documents are written by hand and by older hosts, so `Settings::from_value`
//! accepts several encodings per field: pattern lists as a JSON array or a
//! newline-separated string, booleans as `true`, `1` or `"true"`, and numbers as numbers
//! or numeric strings. A field that cannot be decoded keeps its default.

use schemars::JsonSchema;
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use crate::service::AgentContext;

/// File name looked up inside the agent directory.
pub const SETTINGS_FILE_NAME: &str = "shell_gate_settings.json";

/// Timeout used when neither request nor settings provide a positive value.
pub const DEFAULT_TIMEOUT_SECONDS: i64 = 60;

/// Upper bound applied to every timeout.
pub const MAX_TIMEOUT_SECONDS: i64 = 300;

const DEFAULT_ALLOWED_PATTERNS: &[&str] = &[
    "./scripts/*",
    "git *",
    "go *",
    "make *",
    "npm *",
    "ls *",
    "cat *",
    "echo *",
    "pwd",
    "which *",
    "env",
];

const DEFAULT_BLOCKED_PATTERNS: &[&str] = &[
    "rm -rf /*",
    "rm -rf ~/*",
    "sudo *",
    "> /dev/*",
    "curl * | sh",
    "curl * | bash",
    "wget * | sh",
    "wget * | bash",
    "chmod 777 *",
    ":(){ :|:& };:",
    "dd if=*",
    "mkfs.*",
    "eval *",
];

/// Policy snapshot for one request.
///
/// The JSON schema describes the settings file as `Settings::from_value` reads it: every
/// field is optional and several encodings are accepted per field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(default)]
pub struct Settings {
    /// Default timeout in seconds when the request does not set one; non-positive
    /// values keep the built-in default
    #[schemars(schema_with = "lenient_int_schema")]
    pub timeout_seconds: i64,
    /// Working directory used when the request does not set one (`~` is expanded)
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(schema_with = "string_or_list_schema")]
    pub default_working_dir: Option<String>,
    /// Roots the resolved working directory must fall under; empty means unrestricted
    #[schemars(schema_with = "string_or_list_schema")]
    pub allowed_working_dirs: Vec<String>,
    /// Ordered allow-list. An empty list admits every command that is not blocked; in a
    /// settings file an absent or empty list keeps the built-in allow-list
    #[schemars(schema_with = "string_or_list_schema")]
    pub allowed_patterns: Vec<String>,
    /// Ordered block-list, checked before the allow-list. In a settings file an absent or
    /// empty list keeps the built-in block-list
    #[schemars(schema_with = "string_or_list_schema")]
    pub blocked_patterns: Vec<String>,
    /// Skip the shell metacharacter filter
    #[schemars(schema_with = "lenient_bool_schema")]
    pub allow_shell_metacharacters: bool,
    /// Compare working directories by path component instead of string prefix
    #[schemars(schema_with = "lenient_bool_schema")]
    pub strict_working_dir_containment: bool,
}

fn string_or_list_schema(_: &mut schemars::SchemaGenerator) -> schemars::Schema {
    schemars::json_schema!({
        "anyOf": [
            { "type": "array", "items": { "type": "string" } },
            { "type": "string", "description": "One entry per line" }
        ]
    })
}

fn lenient_bool_schema(_: &mut schemars::SchemaGenerator) -> schemars::Schema {
    schemars::json_schema!({
        "anyOf": [
            { "type": "boolean" },
            { "type": "number", "description": "Non-zero is true" },
            {
                "type": "string",
                "enum": ["1", "t", "T", "true", "TRUE", "True", "0", "f", "F", "false", "FALSE", "False"]
            }
        ]
    })
}

fn lenient_int_schema(_: &mut schemars::SchemaGenerator) -> schemars::Schema {
    schemars::json_schema!({
        "anyOf": [
            { "type": "number" },
            { "type": "string", "pattern": "^\\s*-?[0-9]+\\s*$" }
        ]
    })
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            default_working_dir: None,
            allowed_working_dirs: Vec::new(),
            allowed_patterns: DEFAULT_ALLOWED_PATTERNS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            blocked_patterns: DEFAULT_BLOCKED_PATTERNS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            allow_shell_metacharacters: false,
            strict_working_dir_containment: false,
        }
    }
}

impl Settings {
    /// Decode a settings document leniently, starting from the built-in defaults.
    ///
    /// Returns `None` if `value` is not a JSON object.
    pub fn from_value(value: &Value) -> Option<Self> {
        let raw = value.as_object()?;
        let mut settings = Settings::default();

        if let Some(timeout) = field(raw, "timeout_seconds").and_then(parse_int)
            && timeout > 0
        {
            settings.timeout_seconds = timeout;
        }
        if let Some(dir) = field(raw, "default_working_dir")
            .map(parse_string_list)
            .and_then(|dirs| dirs.into_iter().next())
        {
            settings.default_working_dir = Some(dir);
        }
        if let Some(dirs) = non_empty_list(raw, "allowed_working_dirs") {
            settings.allowed_working_dirs = dirs;
        }
        if let Some(patterns) = non_empty_list(raw, "allowed_patterns") {
            settings.allowed_patterns = patterns;
        }
        if let Some(patterns) = non_empty_list(raw, "blocked_patterns") {
            settings.blocked_patterns = patterns;
        }
        if let Some(allow) = field(raw, "allow_shell_metacharacters").and_then(parse_bool) {
            settings.allow_shell_metacharacters = allow;
        }
        if let Some(strict) = field(raw, "strict_working_dir_containment").and_then(parse_bool) {
            settings.strict_working_dir_containment = strict;
        }

        Some(settings)
    }

    /// Read and decode a settings file. Returns `None` if the file is missing, unreadable
    /// or not a JSON object.
    pub fn load_from_file(path: &Path) -> Option<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                tracing::trace!("No settings at {}: {}", path.display(), e);
                return None;
            }
        };
        let value: Value = match serde_json::from_str(&contents) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Failed to parse settings {}: {}", path.display(), e);
                return None;
            }
        };
        let settings = Self::from_value(&value);
        if settings.is_none() {
            tracing::warn!("Settings {} is not a JSON object", path.display());
        }
        settings
    }
}

fn field<'a>(raw: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    raw.get(key)
}

fn non_empty_list(raw: &Map<String, Value>, key: &str) -> Option<Vec<String>> {
    field(raw, key)
        .map(parse_string_list)
        .filter(|list| !list.is_empty())
}

/// Split newline-separated text into trimmed, non-empty lines.
pub fn parse_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// Accept either a newline-separated string or an array of strings.
/// Non-string array items are skipped.
pub fn parse_string_list(value: &Value) -> Vec<String> {
    match value {
        Value::String(text) => parse_lines(text),
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(String::from)
            .collect(),
        _ => Vec::new(),
    }
}

/// Accept a boolean, a number (non-zero is true) or a boolean string.
pub fn parse_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => match s.as_str() {
            "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
            "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Accept an integer, a float (truncated) or a numeric string.
pub fn parse_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Supplies the policy snapshot for a request.
pub trait SettingsSource: Send + Sync {
    fn load(&self, ctx: &AgentContext) -> Settings;
}

/// A fixed snapshot, handed out unchanged for every request.
#[derive(Debug, Clone, Default)]
pub struct StaticSettings(pub Settings);

impl SettingsSource for StaticSettings {
    fn load(&self, _ctx: &AgentContext) -> Settings {
        self.0.clone()
    }
}

/// Settings read from disk on every request.
///
/// The agent directory's `shell_gate_settings.json` is tried first, then each fallback
/// path in order. The first file that decodes wins; if none does, the built-in defaults
/// apply.
#[derive(Debug, Clone, Default)]
pub struct FileSettings {
    fallback_paths: Vec<PathBuf>,
}

impl FileSettings {
    pub fn new(fallback_paths: Vec<PathBuf>) -> Self {
        Self { fallback_paths }
    }

    /// Candidate files for `ctx`, in lookup order.
    pub fn search_paths(&self, ctx: &AgentContext) -> Vec<PathBuf> {
        let mut paths = Vec::with_capacity(self.fallback_paths.len() + 1);
        if let Some(agent_dir) = &ctx.agent_dir {
            paths.push(agent_dir.join(SETTINGS_FILE_NAME));
        }
        paths.extend(self.fallback_paths.iter().cloned());
        paths
    }
}

impl SettingsSource for FileSettings {
    fn load(&self, ctx: &AgentContext) -> Settings {
        for path in self.search_paths(ctx) {
            if let Some(settings) = Settings::load_from_file(&path) {
                tracing::debug!("Loaded settings from {}", path.display());
                return settings;
            }
        }
        tracing::debug!("No settings file found; using built-in policy");
        Settings::default()
    }
}
