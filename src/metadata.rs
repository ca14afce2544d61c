//! Frontmatter metadata and corpus index building.
//!
//! Corpus records are usually indexed from `SKILL.md` files whose YAML-ish
//! frontmatter carries a name and a description:
//!
//! ```text
//! ---
//! name: pdf-export
//! description: >
//!   Generate PDF reports
//!   from tabular data
//! metadata:
//!   short-description: PDF reports
//! ---
//! # Body ...
//! ```
//!
//! Only the subset needed for indexing is understood: single-line `key: value`
//! pairs, `|`/`>` block scalars, indented blocks after an empty value (kept as
//! raw text) and `metadata.short-description`.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::corpus::{CorpusDescriptor, DocumentRecord};

/// Line delimiting the frontmatter block.
pub const FRONTMATTER_BOUNDARY: &str = "---";

/// File name marking a corpus entry directory.
pub const SKILL_FILE: &str = "SKILL.md";

/// Key under which the nested short description is exposed.
pub const SHORT_DESCRIPTION_KEY: &str = "metadata.short-description";

/// Body between a leading `---` line and the next `---` line.
///
/// Returns `None` when the text does not start with a frontmatter block or the
/// block is never closed.
pub fn extract_frontmatter(text: &str) -> Option<String> {
    let lines: Vec<&str> = text.lines().collect();
    if lines.first().map(|l| l.trim()) != Some(FRONTMATTER_BOUNDARY) {
        return None;
    }
    let end = lines[1..].iter().position(|l| *l == FRONTMATTER_BOUNDARY)? + 1;
    Some(lines[1..end].join("\n").trim_matches('\n').to_string())
}

/// Split `key: value`; keys are `[A-Za-z0-9_-]+`.
fn split_key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once(':')?;
    let key = key.trim_end();
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    valid.then(|| (key, value.trim()))
}

fn unquote(value: &str) -> String {
    let value = value.trim();
    let quoted = value.len() >= 2
        && ((value.starts_with('"') && value.ends_with('"'))
            || (value.starts_with('\'') && value.ends_with('\'')));
    if quoted {
        value[1..value.len() - 1].trim().to_string()
    } else {
        value.to_string()
    }
}

fn is_indented(line: &str) -> bool {
    line.starts_with(' ') || line.starts_with('\t')
}

/// Parse frontmatter text into a flat key/value mapping.
///
/// # Example
///
/// ```
/// use edgequake_trigger_eval::metadata::parse_metadata;
///
/// let meta = parse_metadata("name: \"pdf-export\"\ndescription: Make PDFs");
/// assert_eq!(meta["name"], "pdf-export");
/// assert_eq!(meta["description"], "Make PDFs");
/// ```
pub fn parse_metadata(text: &str) -> BTreeMap<String, String> {
    let lines: Vec<&str> = text.lines().collect();
    let mut result = BTreeMap::new();
    let mut i = 0;

    while i < lines.len() {
        let stripped = lines[i].trim();
        i += 1;

        if stripped.is_empty() || stripped.starts_with('#') {
            continue;
        }
        let Some((key, raw_value)) = split_key_value(stripped) else {
            continue;
        };

        if key == "metadata" && raw_value.is_empty() {
            while i < lines.len() {
                let line = lines[i];
                if !line.is_empty() && !is_indented(line) {
                    break;
                }
                i += 1;
                let nested = line.trim();
                if nested.is_empty() || nested.starts_with('#') {
                    continue;
                }
                if let Some(("short-description", value)) = split_key_value(nested) {
                    result.insert(SHORT_DESCRIPTION_KEY.to_string(), unquote(value));
                }
            }
            continue;
        }

        let value = if raw_value.starts_with('|') || raw_value.starts_with('>') {
            // Blank lines inside a block scalar are kept
            let mut block = Vec::new();
            while i < lines.len() {
                let line = lines[i];
                if line.is_empty() {
                    block.push("");
                } else if is_indented(line) {
                    block.push(line.trim_start());
                } else {
                    break;
                }
                i += 1;
            }
            block.join("\n").trim().to_string()
        } else if raw_value.is_empty() {
            let mut block = Vec::new();
            while i < lines.len() {
                let line = lines[i];
                if !line.is_empty() && !is_indented(line) {
                    break;
                }
                block.push(line.trim_start());
                i += 1;
            }
            block.join("\n").trim().to_string()
        } else {
            unquote(raw_value)
        };

        result.insert(key.to_string(), value);
    }

    result
}

/// Directories beneath `root` containing a `SKILL.md`, sorted and unique.
///
/// Symlinks are not followed. Unreadable entries are skipped.
pub fn discover_skill_dirs(root: &Path) -> Vec<PathBuf> {
    if !root.is_dir() {
        return Vec::new();
    }

    let mut found = BTreeSet::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Skipping unreadable entry");
                continue;
            }
        };
        if entry.file_type().is_file() && entry.file_name() == SKILL_FILE {
            if let Some(parent) = entry.path().parent() {
                found.insert(parent.to_path_buf());
            }
        }
    }
    found.into_iter().collect()
}

/// Visibility tier implied by the directory layout.
pub fn scope_hint(skill_dir: &Path) -> &'static str {
    let has = |tier: &str| skill_dir.components().any(|c| c.as_os_str() == tier);
    if has(".system") {
        ".system"
    } else if has(".curated") {
        ".curated"
    } else if has(".experimental") {
        ".experimental"
    } else {
        "custom"
    }
}

/// Build the record for one skill directory.
///
/// Returns `None` when its `SKILL.md` cannot be read.
pub fn load_record(skill_dir: &Path) -> Option<DocumentRecord> {
    let skill_md = skill_dir.join(SKILL_FILE);
    let bytes = match std::fs::read(&skill_md) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(path = %skill_md.display(), error = %e, "Skipping unreadable skill file");
            return None;
        }
    };
    let content = String::from_utf8_lossy(&bytes);
    let meta = extract_frontmatter(&content)
        .map(|fm| parse_metadata(&fm))
        .unwrap_or_default();
    let field = |key: &str| meta.get(key).map(|v| v.trim().to_string()).unwrap_or_default();
    let has_dir = |sub: &str| Some(skill_dir.join(sub).is_dir());

    let mut name = field("name");
    if name.is_empty() {
        name = skill_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
    }

    Some(DocumentRecord {
        name,
        description: field("description"),
        short_description: field(SHORT_DESCRIPTION_KEY),
        version: field("version"),
        license: field("license"),
        allowed_tools: field("allowed-tools"),
        skill_dir: skill_dir.display().to_string(),
        skill_md: skill_md.display().to_string(),
        scope_hint: scope_hint(skill_dir).to_string(),
        has_scripts: has_dir("scripts"),
        has_references: has_dir("references"),
        has_examples: has_dir("examples"),
        has_assets: has_dir("assets"),
    })
}

/// Index every skill beneath `skills_dir` into a corpus descriptor.
///
/// A missing directory yields an empty descriptor.
pub fn index_skills(skills_dir: impl AsRef<Path>) -> CorpusDescriptor {
    let root = skills_dir.as_ref();
    let root = std::fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());

    let records: Vec<DocumentRecord> = discover_skill_dirs(&root)
        .iter()
        .filter_map(|dir| load_record(dir))
        .collect();
    debug!(root = %root.display(), count = records.len(), "Indexed skills");

    CorpusDescriptor::new(Some(root.display().to_string()), records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_skill(root: &Path, rel: &str, content: &str) -> PathBuf {
        let dir = root.join(rel);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(SKILL_FILE), content).unwrap();
        dir
    }

    #[test]
    fn test_extract_frontmatter() {
        let text = "---\nname: a\ndescription: b\n---\n# Title\n";
        assert_eq!(
            extract_frontmatter(text).as_deref(),
            Some("name: a\ndescription: b")
        );
    }

    #[test]
    fn test_extract_frontmatter_missing_or_unclosed() {
        assert_eq!(extract_frontmatter("# Title\n---\n"), None);
        assert_eq!(extract_frontmatter("---\nname: a\n"), None);
        assert_eq!(extract_frontmatter(""), None);
    }

    #[test]
    fn test_parse_simple_and_quoted() {
        let meta = parse_metadata("name: 'chart-gen'\n# comment\n\nversion: \"1.0\"\nbad line");
        assert_eq!(meta["name"], "chart-gen");
        assert_eq!(meta["version"], "1.0");
        assert_eq!(meta.len(), 2);
    }

    #[test]
    fn test_parse_block_scalars() {
        let text = "description: >-\n  Generate PDF\n\n  reports\nname: pdf-export\nnotes: |\n  line one\n  line two\n";
        let meta = parse_metadata(text);
        assert_eq!(meta["description"], "Generate PDF\n\nreports");
        assert_eq!(meta["name"], "pdf-export");
        assert_eq!(meta["notes"], "line one\nline two");
    }

    #[test]
    fn test_parse_indented_block_as_raw_text() {
        let meta = parse_metadata("allowed-tools:\n  - Read\n  - Write\nname: x");
        assert_eq!(meta["allowed-tools"], "- Read\n- Write");
        assert_eq!(meta["name"], "x");
    }

    #[test]
    fn test_parse_short_description() {
        let text = "metadata:\n  owner: me\n  short-description: \"PDF reports\"\nname: pdf-export";
        let meta = parse_metadata(text);
        assert_eq!(meta[SHORT_DESCRIPTION_KEY], "PDF reports");
        assert_eq!(meta["name"], "pdf-export");
        assert!(!meta.contains_key("metadata"));
        assert!(!meta.contains_key("owner"));
    }

    #[test]
    fn test_index_skills() {
        let root = tempfile::tempdir().unwrap();
        write_skill(
            root.path(),
            "b/chart-gen",
            "---\nname: chart-gen\ndescription: Create charts and graphs\n---\n",
        );
        write_skill(
            root.path(),
            "a/pdf-export",
            "---\nname: pdf-export\ndescription: |\n  Generate PDF reports\nmetadata:\n  short-description: PDFs\n---\nbody",
        );
        write_skill(root.path(), "c/unnamed", "no frontmatter here");
        std::fs::write(root.path().join("README.md"), "not a skill").unwrap();

        let descriptor = index_skills(root.path());
        let names: Vec<&str> = descriptor.skills.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["pdf-export", "chart-gen", "unnamed"]);
        assert_eq!(descriptor.count, 3);
        assert_eq!(descriptor.skills[0].description, "Generate PDF reports");
        assert_eq!(descriptor.skills[0].short_description, "PDFs");
        assert_eq!(descriptor.skills[2].description, "");
        assert!(descriptor.skills[0].skill_dir.ends_with("pdf-export"));
    }

    #[test]
    fn test_record_carries_index_fields() {
        let root = tempfile::tempdir().unwrap();
        let dir = write_skill(
            root.path(),
            ".curated/pdf-export",
            "---\nname: pdf-export\ndescription: PDFs\nversion: \"1.2\"\nlicense: MIT\nallowed-tools: Read, Write\n---\n",
        );
        std::fs::create_dir_all(dir.join("scripts")).unwrap();

        let record = load_record(&dir).unwrap();
        assert_eq!(record.version, "1.2");
        assert_eq!(record.license, "MIT");
        assert_eq!(record.allowed_tools, "Read, Write");
        assert_eq!(record.scope_hint, ".curated");
        assert!(record.skill_md.ends_with("SKILL.md"));
        assert_eq!(record.has_scripts, Some(true));
        assert_eq!(record.has_references, Some(false));
        assert_eq!(record.has_assets, Some(false));
    }

    #[test]
    fn test_scope_hint() {
        assert_eq!(scope_hint(Path::new("/skills/.system/a")), ".system");
        assert_eq!(scope_hint(Path::new("/skills/.experimental/b")), ".experimental");
        assert_eq!(scope_hint(Path::new("/skills/team/c")), "custom");
    }

    #[test]
    fn test_discover_nested_and_deduplicated() {
        let root = tempfile::tempdir().unwrap();
        write_skill(root.path(), "deep/er/still/skill-a", "x");
        let dir = write_skill(root.path(), "skill-b", "x");
        // A SKILL.md in a subfolder of a skill is its own entry
        write_skill(&dir, "nested", "x");
        std::fs::create_dir_all(root.path().join("empty/dir")).unwrap();

        let dirs = discover_skill_dirs(root.path());
        let rel: Vec<PathBuf> = dirs
            .iter()
            .map(|d| d.strip_prefix(root.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            rel,
            vec![
                PathBuf::from("deep/er/still/skill-a"),
                PathBuf::from("skill-b"),
                PathBuf::from("skill-b/nested"),
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_discover_does_not_follow_symlinks() {
        let root = tempfile::tempdir().unwrap();
        let outside = tempfile::tempdir().unwrap();
        write_skill(outside.path(), "linked", "x");
        std::os::unix::fs::symlink(outside.path(), root.path().join("link")).unwrap();
        write_skill(root.path(), "real", "x");

        let dirs = discover_skill_dirs(root.path());
        assert_eq!(dirs, vec![root.path().join("real")]);
    }

    #[test]
    fn test_index_missing_dir() {
        let descriptor = index_skills("/nonexistent/skills/dir");
        assert_eq!(descriptor.count, 0);
        assert!(descriptor.skills.is_empty());
    }

    #[test]
    fn test_indexed_descriptor_loads_as_corpus() {
        let root = tempfile::tempdir().unwrap();
        write_skill(root.path(), "x", "---\nname: x\ndescription: do x\n---\n");
        let documents = index_skills(root.path()).into_documents().unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].name, "x");
        assert_eq!(documents[0].description, "do x");
    }
}
