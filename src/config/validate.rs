//! Configuration validation with unknown field detection.

use serde_json::{Map, Value};
use std::collections::HashSet;

/// Known top-level config field names.
const KNOWN_TOP_LEVEL: &[&str] = &["credentials", "node", "logging"];

/// Known fields for each section.
const KNOWN_CREDENTIALS: &[&str] = &["api_url", "app_key", "auth_key"];
const KNOWN_NODE: &[&str] = &["continue_on_fail"];
const KNOWN_LOGGING: &[&str] = &["format", "level", "file"];

/// A validation diagnostic.
#[derive(Debug)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub path: String,
    pub message: String,
}

#[derive(Debug, PartialEq)]
pub enum DiagnosticLevel {
    Ok,
    Warn,
    Error,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.level {
            DiagnosticLevel::Ok => "[OK]",
            DiagnosticLevel::Warn => "[WARN]",
            DiagnosticLevel::Error => "[ERROR]",
        };
        if self.path.is_empty() {
            write!(f, "{} {}", prefix, self.message)
        } else {
            write!(f, "{} {}: {}", prefix, self.path, self.message)
        }
    }
}

/// Simple Levenshtein distance for "did you mean?" suggestions.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Suggest the closest known field name (if distance <= 3).
pub fn suggest_field(unknown: &str, known: &[&str]) -> Option<String> {
    known
        .iter()
        .map(|k| (k, levenshtein(unknown, k)))
        .filter(|(_, d)| *d <= 3)
        .min_by_key(|(_, d)| *d)
        .map(|(k, _)| format!("did you mean '{}'?", k))
}

fn check_keys(
    obj: &Map<String, Value>,
    known: &[&str],
    prefix: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> bool {
    let known_set: HashSet<&str> = known.iter().copied().collect();
    let mut has_unknown = false;
    for key in obj.keys() {
        if known_set.contains(key.as_str()) {
            continue;
        }
        has_unknown = true;
        let msg = match suggest_field(key, known) {
            Some(suggestion) => format!("Unknown field '{}', {}", key, suggestion),
            None => format!("Unknown field '{}'", key),
        };
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        diagnostics.push(Diagnostic {
            level: DiagnosticLevel::Error,
            path,
            message: msg,
        });
    }
    has_unknown
}

/// Validate a raw JSON config value against known field names.
pub fn validate_config(raw: &Value) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    let obj = match raw.as_object() {
        Some(o) => o,
        None => {
            diagnostics.push(Diagnostic {
                level: DiagnosticLevel::Error,
                path: String::new(),
                message: "Config must be a JSON object".to_string(),
            });
            return diagnostics;
        }
    };

    diagnostics.push(Diagnostic {
        level: DiagnosticLevel::Ok,
        path: String::new(),
        message: "Valid JSON".to_string(),
    });

    let mut has_unknown = check_keys(obj, KNOWN_TOP_LEVEL, "", &mut diagnostics);
    for (section, known) in [
        ("credentials", KNOWN_CREDENTIALS),
        ("node", KNOWN_NODE),
        ("logging", KNOWN_LOGGING),
    ] {
        if let Some(section_obj) = obj.get(section).and_then(Value::as_object) {
            has_unknown |= check_keys(section_obj, known, section, &mut diagnostics);
        }
    }

    if !has_unknown {
        diagnostics.push(Diagnostic {
            level: DiagnosticLevel::Ok,
            path: String::new(),
            message: "All fields recognized".to_string(),
        });
    }

    let credentials = obj.get("credentials").and_then(Value::as_object);
    let field = |name: &str| {
        credentials
            .and_then(|c| c.get(name))
            .and_then(Value::as_str)
            .unwrap_or("")
    };

    for key in ["app_key", "auth_key"] {
        if field(key).trim().is_empty() {
            diagnostics.push(Diagnostic {
                level: DiagnosticLevel::Warn,
                path: format!("credentials.{}", key),
                message: format!(
                    "Empty, must be set here or via WABA_CREDENTIALS_{}",
                    key.to_ascii_uppercase()
                ),
            });
        }
    }

    let api_url = field("api_url");
    if !api_url.is_empty() {
        if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
            diagnostics.push(Diagnostic {
                level: DiagnosticLevel::Error,
                path: "credentials.api_url".to_string(),
                message: "Must start with http:// or https://".to_string(),
            });
        } else if api_url.ends_with("//") {
            diagnostics.push(Diagnostic {
                level: DiagnosticLevel::Warn,
                path: "credentials.api_url".to_string(),
                message: "Only one trailing '/' is stripped before endpoints are appended"
                    .to_string(),
            });
        }
    }

    diagnostics
}
