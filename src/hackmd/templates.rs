use crate::error::{HackmdError, Result};
use chrono::{DateTime, Datelike, Local};
use directories::ProjectDirs;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Overrides the templates directory; used by the integration tests.
pub const TEMPLATES_DIR_ENV: &str = "HACKMD_TEMPLATES_DIR";

const TEMPLATE_EXT: &str = "md";

/// Built-in templates seeded on first use. Files already present are
/// never overwritten, so user edits under these names survive re-runs
/// of `template init`.
const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    ("daily-journal", DAILY_JOURNAL),
    ("meeting-notes", MEETING_NOTES),
    ("bug-report", BUG_REPORT),
    ("project-readme", PROJECT_README),
    ("weekly-review", WEEKLY_REVIEW),
];

const DAILY_JOURNAL: &str = r#"# Daily Journal - {{date}}

## Morning Intention
- [ ] Primary focus:
- [ ] Energy level (1-10):
- [ ] Gratitude:

## Time Blocks
### 9:00-12:00 (Deep Work)
-

### 12:00-13:00 (Lunch/Break)
-

### 13:00-17:00 (Meetings/Collaboration)
-

### 17:00-18:00 (Wrap-up)
-

## Accomplished Today
-

## Challenges Faced
-

## Learning & Insights
-

## Tomorrow's Priority
-

## Evening Reflection
- What went well?
- What could improve?
- Energy level (1-10):

---
Tags: #journal #daily #{{month}} #{{year}}"#;

const MEETING_NOTES: &str = r#"# Meeting: {{title}}

**Date:** {{date}}
**Time:** {{time}}
**Attendees:** {{attendees}}
**Meeting Type:** {{type}}

## Agenda
1. {{agenda_item_1}}
2. {{agenda_item_2}}
3. {{agenda_item_3}}

## Discussion Notes

### Topic 1: {{topic}}
**Discussion:**
-

**Decision:**
-

## Action Items
| Action | Owner | Deadline | Status |
|--------|-------|----------|--------|
| | | | [ ] |

## Key Decisions
1.

## Next Steps
-

---
Tags: #meeting #{{project}} #{{team}}"#;

const BUG_REPORT: &str = r#"# Bug Report: {{title}}

**Reported By:** {{reporter}}
**Date:** {{date}}
**Severity:** {{severity}}
**Priority:** {{priority}}

## Summary
Brief description of the issue

## Environment
- **OS:** {{os}}
- **Browser/App:** {{browser}}
- **Version:** {{version}}

## Steps to Reproduce
1.
2.
3.

## Expected Behavior
What should happen:

## Actual Behavior
What actually happens:

## Screenshots/Logs
```
[Paste error logs here]
```

---
Tags: #bug #{{component}} #{{severity}}"#;

const PROJECT_README: &str = r#"# {{project_name}}

[![License](https://img.shields.io/badge/license-{{license}}-blue.svg)](LICENSE)
[![Version](https://img.shields.io/badge/version-{{version}}-green.svg)](CHANGELOG.md)

## Overview
{{brief_description}}

## Features
- 🚀 {{feature_1}}
- 💡 {{feature_2}}
- 🔧 {{feature_3}}

## Quick Start

### Installation
```bash
{{installation_command}}
```

### Basic Usage
```bash
{{usage_example}}
```

## Documentation
- [User Guide](docs/USER_GUIDE.md)
- [API Reference](docs/API.md)

## Contributing
See [CONTRIBUTING.md](CONTRIBUTING.md)

## License
{{license}} - see [LICENSE](LICENSE)

---
Tags: #project #{{language}} #{{category}}"#;

const WEEKLY_REVIEW: &str = r#"# Weekly Review - Week {{week_number}}, {{year}}

## Week Overview
**Dates:** {{start_date}} - {{end_date}}

## Accomplishments
### Professional
-

### Personal
-

## Challenges & Lessons
-

## Next Week's Priorities
1.
2.
3.

## Metrics
- Tasks completed: X/Y
- Focus time: X hours
- Meeting time: X hours

## Reflection
-

---
Tags: #weekly-review #{{month}} #{{year}}"#;

/// Computed render defaults for `now`. Caller-supplied variables are
/// merged on top and win on collision.
pub fn default_context(now: DateTime<Local>) -> BTreeMap<String, String> {
    let mut vars = BTreeMap::new();
    vars.insert("date".to_string(), now.format("%Y-%m-%d").to_string());
    vars.insert("time".to_string(), now.format("%H:%M").to_string());
    vars.insert("month".to_string(), now.format("%B").to_string());
    vars.insert("year".to_string(), now.format("%Y").to_string());
    vars.insert("week_number".to_string(), now.iso_week().week().to_string());
    vars.insert("start_date".to_string(), String::new());
    vars.insert("end_date".to_string(), String::new());
    vars
}

/// Replace every `{{key}}` whose key is present in `vars`.
///
/// One forward pass over the input: substituted values are never
/// re-scanned, so a value containing `{{...}}` comes through verbatim,
/// and the outcome does not depend on key order. Unknown keys stay as
/// literal `{{key}}` text.
pub fn substitute(content: &str, vars: &BTreeMap<String, String>) -> String {
    let mut out = String::with_capacity(content.len());
    let mut rest = content;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let key = &after[..end];
                match vars.get(key) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push_str("{{");
                        out.push_str(key);
                        out.push_str("}}");
                    }
                }
                rest = &after[end + 2..];
            }
            None => {
                // unterminated token, keep the tail as-is
                out.push_str(&rest[start..]);
                return out;
            }
        }
    }

    out.push_str(rest);
    out
}

/// Note template store: one `<name>.md` file per template.
pub struct TemplateStore {
    dir: PathBuf,
}

impl TemplateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Per-user templates directory, honoring the env override.
    pub fn default_dir() -> PathBuf {
        if let Some(dir) = std::env::var_os(TEMPLATES_DIR_ENV) {
            return PathBuf::from(dir);
        }
        ProjectDirs::from("io", "hackmd", "hackmd")
            .expect("Could not determine data dir")
            .data_dir()
            .join("templates")
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn template_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", name, TEMPLATE_EXT))
    }

    /// Seed the built-in templates, returning the names actually
    /// written. Idempotent: a second call returns an empty list.
    pub fn initialize(&self) -> Result<Vec<String>> {
        fs::create_dir_all(&self.dir)?;

        let mut created = Vec::new();
        for (name, content) in BUILTIN_TEMPLATES {
            let path = self.template_path(name);
            if !path.exists() {
                fs::write(&path, content)?;
                created.push((*name).to_string());
            }
        }
        Ok(created)
    }

    /// Template names (extension stripped), sorted so listing is
    /// deterministic regardless of readdir order.
    pub fn list(&self) -> Result<Vec<String>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == TEMPLATE_EXT) {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Raw template content, or `None` if no file matches `name`.
    pub fn get(&self, name: &str) -> Result<Option<String>> {
        let path = self.template_path(name);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    /// Render `name` with defaults plus `variables` (caller wins on
    /// collision). `None` propagates "not found"; callers decide whether
    /// that is an error.
    pub fn render(
        &self,
        name: &str,
        variables: &BTreeMap<String, String>,
    ) -> Result<Option<String>> {
        let Some(content) = self.get(name)? else {
            return Ok(None);
        };

        let mut context = default_context(Local::now());
        for (key, value) in variables {
            context.insert(key.clone(), value.clone());
        }
        Ok(Some(substitute(&content, &context)))
    }

    /// Create or replace a template, returning the stored path.
    pub fn save(&self, name: &str, content: &str) -> Result<PathBuf> {
        if name.is_empty() || name.contains(['/', '\\']) {
            return Err(HackmdError::Validation(format!(
                "Invalid template name: '{}'",
                name
            )));
        }

        fs::create_dir_all(&self.dir)?;
        let path = self.template_path(name);
        fs::write(&path, content)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn store() -> (TempDir, TemplateStore) {
        let temp = TempDir::new().unwrap();
        let store = TemplateStore::new(temp.path().join("templates"));
        (temp, store)
    }

    fn vars(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_initialize_seeds_builtins() {
        let (_temp, store) = store();
        let created = store.initialize().unwrap();
        assert_eq!(created.len(), 5);
        assert!(created.contains(&"daily-journal".to_string()));
        assert!(created.contains(&"weekly-review".to_string()));
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let (_temp, store) = store();
        store.initialize().unwrap();

        // user edit must survive the second run
        store.save("bug-report", "customized").unwrap();
        let created = store.initialize().unwrap();

        assert!(created.is_empty());
        assert_eq!(store.get("bug-report").unwrap().unwrap(), "customized");
    }

    #[test]
    fn test_initialize_fills_gaps_only() {
        let (_temp, store) = store();
        store.initialize().unwrap();
        fs::remove_file(store.dir().join("meeting-notes.md")).unwrap();

        let created = store.initialize().unwrap();
        assert_eq!(created, vec!["meeting-notes".to_string()]);
    }

    #[test]
    fn test_save_get_roundtrip() {
        let (_temp, store) = store();
        let content = "# Standup\n\n{{date}} with {{team}}\n";
        store.save("standup", content).unwrap();
        assert_eq!(store.get("standup").unwrap().unwrap(), content);
    }

    #[test]
    fn test_save_rejects_path_separators() {
        let (_temp, store) = store();
        assert!(store.save("../escape", "x").is_err());
        assert!(store.save("", "x").is_err());
    }

    #[test]
    fn test_get_missing() {
        let (_temp, store) = store();
        store.initialize().unwrap();
        assert!(store.get("no-such-template").unwrap().is_none());
    }

    #[test]
    fn test_list_without_directory() {
        let (_temp, store) = store();
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_list_is_sorted() {
        let (_temp, store) = store();
        store.save("zebra", "z").unwrap();
        store.save("alpha", "a").unwrap();
        store.save("midway", "m").unwrap();
        assert_eq!(store.list().unwrap(), vec!["alpha", "midway", "zebra"]);
    }

    #[test]
    fn test_list_ignores_other_extensions() {
        let (_temp, store) = store();
        store.save("real", "r").unwrap();
        fs::write(store.dir().join("notes.txt"), "not a template").unwrap();
        assert_eq!(store.list().unwrap(), vec!["real"]);
    }

    #[test]
    fn test_substitute_unknown_key_stays_literal() {
        let out = substitute("hello {{undefined_key}}!", &vars(&[("known", "x")]));
        assert_eq!(out, "hello {{undefined_key}}!");
    }

    #[test]
    fn test_substitute_all_occurrences() {
        let out = substitute(
            "{{team}} met {{team}} about {{team}}",
            &vars(&[("team", "X")]),
        );
        assert_eq!(out, "X met X about X");
        assert!(!out.contains("{{team}}"));
    }

    #[test]
    fn test_substitute_is_single_pass() {
        // a value containing a token must not be expanded again
        let out = substitute("{{a}} {{b}}", &vars(&[("a", "{{b}}"), ("b", "2")]));
        assert_eq!(out, "{{b}} 2");
    }

    #[test]
    fn test_substitute_unterminated_token() {
        let out = substitute("start {{broken", &vars(&[("broken", "x")]));
        assert_eq!(out, "start {{broken");
    }

    #[test]
    fn test_substitute_empty_value() {
        let out = substitute("[{{start_date}}]", &vars(&[("start_date", "")]));
        assert_eq!(out, "[]");
    }

    #[test]
    fn test_render_missing_template() {
        let (_temp, store) = store();
        store.initialize().unwrap();
        assert!(store.render("missing", &BTreeMap::new()).unwrap().is_none());
    }

    #[test]
    fn test_render_meeting_notes_with_overrides() {
        let (_temp, store) = store();
        store.initialize().unwrap();

        let out = store
            .render(
                "meeting-notes",
                &vars(&[
                    ("title", "Sprint Planning"),
                    ("team", "Backend"),
                    ("project", "API v2"),
                ]),
            )
            .unwrap()
            .unwrap();

        assert!(out.contains("Sprint Planning"));
        assert!(out.contains("Backend"));
        assert!(out.contains("API v2"));
        for token in ["{{title}}", "{{team}}", "{{project}}", "{{date}}", "{{time}}"] {
            assert!(!out.contains(token), "unexpected {}", token);
        }
        // keys with no default and no override stay literal
        assert!(out.contains("{{attendees}}"));
    }

    #[test]
    fn test_default_context_keys() {
        let now = Local.with_ymd_and_hms(2026, 8, 7, 14, 30, 0).unwrap();
        let context = default_context(now);

        assert_eq!(context["date"], "2026-08-07");
        assert_eq!(context["time"], "14:30");
        assert_eq!(context["month"], "August");
        assert_eq!(context["year"], "2026");
        assert_eq!(context["week_number"], "32");
        assert_eq!(context["start_date"], "");
        assert_eq!(context["end_date"], "");
        assert_eq!(context.len(), 7);
    }

    #[test]
    fn test_caller_overrides_computed_default() {
        let (_temp, store) = store();
        store.save("dated", "on {{date}}").unwrap();
        let out = store
            .render("dated", &vars(&[("date", "1999-12-31")]))
            .unwrap()
            .unwrap();
        assert_eq!(out, "on 1999-12-31");
    }
}
