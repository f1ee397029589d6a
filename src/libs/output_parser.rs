//! # Skills Output Parser
//!
//! Best-effort extraction of [`SkillRecord`]s from the skills CLI's output.
//!
//! 1. **JSON first.** If the whole output parses as a JSON array (or an object wrapping one under
//!    `skills`/`results`/`items`), each element becomes one record. Field names are looked up
//!    through a short list of aliases.
//! 2. **Text fallback.** ANSI escapes are stripped. Decorative box-drawing lines and known
//!    boilerplate are dropped. Remaining lines are matched against two shapes:
//!    - `owner/repo@skill`, optionally followed by an indented URL line;
//!    - table rows whose columns are separated by two or more spaces.
//!
//! The text path is tied to the CLI's unversioned human output and should only be relied on
//! where no `--json` mode exists.

use crate::schemas::skills::SkillRecord;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

const NAME_KEYS: &[&str] = &["name", "packageName", "package", "skill", "id"];
const VERSION_KEYS: &[&str] = &["version", "latestVersion", "latest"];
const DESCRIPTION_KEYS: &[&str] = &["description", "desc", "summary", "url", "source"];
const PATH_KEYS: &[&str] = &["path", "location", "installPath", "dir"];
const WRAPPER_KEYS: &[&str] = &["skills", "results", "items"];

const BOILERPLATE_PREFIXES: &[&str] = &[
    "tip:",
    "usage:",
    "run ",
    "npx ",
    "need to install",
    "ok to proceed",
    "searching",
    "found ",
    "no skills",
    "installed skills",
    "available skills",
    "npm warn",
    "npm notice",
    "install with",
    "done",
];

/// Builds the fallback URL for an `owner/repo@skill` entry with no URL line.
pub fn skill_page_url(owner: &str, repo: &str, skill: &str) -> String {
    format!("https://skills.sh/{owner}/{repo}/{skill}")
}

/// Parses skills CLI output into records. Never fails; unrecognized lines are skipped.
pub fn parse_skill_output(raw: &str) -> Vec<SkillRecord> {
    if let Some(records) = parse_json(raw) {
        return records;
    }
    parse_text(raw)
}

fn parse_json(raw: &str) -> Option<Vec<SkillRecord>> {
    let value: Value = serde_json::from_str(raw.trim()).ok()?;
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => WRAPPER_KEYS
            .iter()
            .find_map(|key| match map.remove(*key) {
                Some(Value::Array(items)) => Some(items),
                _ => None,
            })?,
        _ => return None,
    };
    Some(items.iter().map(record_from_json).collect())
}

fn record_from_json(item: &Value) -> SkillRecord {
    match item {
        Value::String(name) => SkillRecord::named(name.clone()),
        _ => SkillRecord {
            name: first_string(item, NAME_KEYS).unwrap_or_default(),
            version: first_string(item, VERSION_KEYS),
            description: first_string(item, DESCRIPTION_KEYS),
            path: first_string(item, PATH_KEYS),
        },
    }
}

/// Value of the first alias present with a string (or number) value.
fn first_string(item: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match item.get(*key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn skill_ref_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([A-Za-z0-9_.-]+)/([A-Za-z0-9_.-]+)@([A-Za-z0-9_.:-]+)(?:\s.*)?$")
            .expect("skill reference pattern is valid")
    })
}

fn column_separator() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\s{2,}|\t+").expect("column separator pattern is valid"))
}

fn parse_text(raw: &str) -> Vec<SkillRecord> {
    let cleaned = strip_ansi(raw);
    let lines: Vec<&str> = cleaned.lines().collect();
    let mut records = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        i += 1;

        let content = strip_leading_ornament(line);
        if content.is_empty() || is_decorative(line) || is_boilerplate(content) {
            continue;
        }

        if let Some(captures) = skill_ref_pattern().captures(content) {
            let (owner, repo, skill) = (&captures[1], &captures[2], &captures[3]);
            let mut record = SkillRecord::named(format!("{owner}/{repo}@{skill}"));

            match next_url_line(&lines, i) {
                Some((url, consumed_to)) => {
                    record.description = Some(url);
                    i = consumed_to;
                }
                None => record.description = Some(skill_page_url(owner, repo, skill)),
            }
            records.push(record);
            continue;
        }

        if let Some(record) = parse_table_row(content) {
            records.push(record);
        }
    }
    records
}

/// If the next non-blank line is indented and holds a URL, returns it and the index after it.
fn next_url_line(lines: &[&str], start: usize) -> Option<(String, usize)> {
    let mut j = start;
    while j < lines.len() && lines[j].trim().is_empty() {
        j += 1;
    }
    let line = lines.get(j)?;
    let indented = line.starts_with(char::is_whitespace) || line.trim_start() != strip_leading_ornament(line);
    let content = strip_leading_ornament(line);
    if indented && (content.starts_with("https://") || content.starts_with("http://")) {
        let url = content.split_whitespace().next().unwrap_or(content);
        Some((url.to_string(), j + 1))
    } else {
        None
    }
}

fn parse_table_row(content: &str) -> Option<SkillRecord> {
    let columns: Vec<&str> = column_separator()
        .split(content)
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .collect();
    if columns.len() < 2 {
        return None;
    }
    let header = columns[0].to_lowercase();
    if matches!(header.as_str(), "name" | "skill" | "package" | "skills") {
        return None;
    }

    let mut record = SkillRecord::named(columns[0]);
    let mut rest = columns[1..].iter();
    if let Some(second) = rest.next() {
        if looks_like_path(second) {
            record.path = Some(second.to_string());
        } else if looks_like_version(second) {
            record.version = Some(second.to_string());
        } else {
            record.description = Some(second.to_string());
        }
    }
    let remaining: Vec<&str> = rest.copied().collect();
    if !remaining.is_empty() {
        let joined = remaining.join(" ");
        match record.description {
            Some(ref mut description) => {
                description.push(' ');
                description.push_str(&joined);
            }
            None => record.description = Some(joined),
        }
    }
    Some(record)
}

fn looks_like_path(value: &str) -> bool {
    value.starts_with('/')
        || value.starts_with("~/")
        || value.starts_with("./")
        || value.starts_with("../")
        || value.contains('\\')
        || (value.len() > 2 && value.as_bytes()[1] == b':' && value.as_bytes()[0].is_ascii_alphabetic())
}

fn looks_like_version(value: &str) -> bool {
    let value = value.strip_prefix('v').unwrap_or(value);
    value.chars().next().is_some_and(|c| c.is_ascii_digit())
        && value.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '+'))
}

fn is_box_char(c: char) -> bool {
    matches!(c as u32, 0x2500..=0x257F | 0x2580..=0x259F | 0x25A0..=0x25FF)
        || matches!(c, '-' | '=' | '*' | '_' | '~' | '+' | '|' | '·' | '•')
}

/// A line made only of box-drawing glyphs, rule characters and whitespace.
fn is_decorative(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && trimmed.chars().all(|c| c.is_whitespace() || is_box_char(c))
}

fn is_boilerplate(content: &str) -> bool {
    let lower = content.to_lowercase();
    BOILERPLATE_PREFIXES.iter().any(|prefix| lower.starts_with(prefix))
}

/// Drops leading whitespace plus box-drawing/bullet glyphs (`│ `, `◇ `, `└ `, `- `).
fn strip_leading_ornament(line: &str) -> &str {
    line.trim_start_matches(|c: char| c.is_whitespace() || is_box_char(c))
        .trim_end()
}

/// Removes ANSI escape sequences (CSI `ESC [ ... final`, OSC `ESC ] ... BEL|ESC \`, and
/// two-byte escapes) and stray control characters other than newlines and tabs.
pub fn strip_ansi(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\u{1b}' {
            match chars.next() {
                Some('[') => {
                    for c in chars.by_ref() {
                        if ('@'..='~').contains(&c) {
                            break;
                        }
                    }
                }
                Some(']') => {
                    while let Some(c) = chars.next() {
                        if c == '\u{07}' {
                            break;
                        }
                        if c == '\u{1b}' && chars.peek() == Some(&'\\') {
                            chars.next();
                            break;
                        }
                    }
                }
                _ => {}
            }
            continue;
        }
        if ch.is_control() && ch != '\n' && ch != '\t' {
            continue;
        }
        output.push(ch);
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_array_maps_alias_keys() {
        let raw = r#"[
            {"packageName": "vercel-labs/agent-skills@react", "latestVersion": "1.4.0", "summary": "React rules"},
            {"name": "local-skill", "version": "0.1.0", "package": "ignored", "path": "/home/me/.skills/local"},
            {"package": "bare"}
        ]"#;

        let records = parse_skill_output(raw);

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].name, "vercel-labs/agent-skills@react");
        assert_eq!(records[0].version.as_deref(), Some("1.4.0"));
        assert_eq!(records[0].description.as_deref(), Some("React rules"));
        assert_eq!(records[1].name, "local-skill");
        assert_eq!(records[1].path.as_deref(), Some("/home/me/.skills/local"));
        assert_eq!(records[2].name, "bare");
        assert_eq!(records[2].version, None);
    }

    #[test]
    fn json_wrapper_object_is_unwrapped() {
        let records = parse_skill_output(r#"{"skills": [{"name": "a"}, "b"]}"#);
        assert_eq!(
            records.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(),
            vec!["a", "b"]
        );
    }

    #[test]
    fn skill_reference_with_url_continuation() {
        let raw = "\u{1b}[36m◇\u{1b}[0m  Results\n\
                   │\n\
                   │ vercel-labs/agent-skills@web-design\n\
                   │   └ https://skills.sh/vercel-labs/agent-skills/web-design\n\
                   └──────────────\n";

        let records = parse_skill_output(raw);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "vercel-labs/agent-skills@web-design");
        assert_eq!(
            records[0].description.as_deref(),
            Some("https://skills.sh/vercel-labs/agent-skills/web-design")
        );
    }

    #[test]
    fn skill_reference_without_url_gets_fallback() {
        let raw = "anthropics/skills@pdf\nanthropics/skills@docx 120 installs\n";

        let records = parse_skill_output(raw);

        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0].description.as_deref(),
            Some("https://skills.sh/anthropics/skills/pdf")
        );
        assert_eq!(records[1].name, "anthropics/skills@docx");
        assert_eq!(
            records[1].description.as_deref(),
            Some("https://skills.sh/anthropics/skills/docx")
        );
    }

    #[test]
    fn table_rows_split_on_wide_gaps() {
        let raw = "Name          Path\n\
                   ────────────────────────\n\
                   pdf           /home/me/.agents/skills/pdf\n\
                   web-design    1.2.0    Design rules for web UIs\n\
                   Tip: run `skills update` to refresh\n";

        let records = parse_skill_output(raw);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "pdf");
        assert_eq!(records[0].path.as_deref(), Some("/home/me/.agents/skills/pdf"));
        assert_eq!(records[1].version.as_deref(), Some("1.2.0"));
        assert_eq!(records[1].description.as_deref(), Some("Design rules for web UIs"));
    }

    #[test]
    fn decorative_and_boilerplate_lines_yield_nothing() {
        let raw = "╭─────────╮\n│         │\n╰─────────╯\nNo skills installed\nnpx skills add <pkg>\n";
        assert!(parse_skill_output(raw).is_empty());
    }

    #[test]
    fn ansi_sequences_are_removed() {
        assert_eq!(strip_ansi("\u{1b}[1;32mok\u{1b}[0m"), "ok");
        assert_eq!(strip_ansi("\u{1b}]8;;https://x\u{7}link\u{1b}]8;;\u{7}"), "link");
        assert_eq!(strip_ansi("a\tb\nc\r"), "a\tb\nc");
    }
}
