//! Fixture Catalog
//!
//! Fixtures and their golden outputs are authored together in YAML:
//!
//! ```yaml
//! - name: t1
//!   stem: test_files/t1
//!   category: functional
//!   expected: ["6"]
//! - name: w1
//!   stem: test_files/w1
//!   category: warnings
//!   expected:
//!     - "WARNING: Type mismatch in if statement (conditional statement is not an integer value)."
//!   skip: false   # optional
//! ```
//!
//! A catalog path may be a single file or a directory; directories are walked
//! in sorted order and every `.yaml`/`.yml` file is appended in that order.
//! Declaration order is execution order.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::errors::CatalogError;

// =============================================================================
// CORE TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Compile `<stem>.<src>`, then interpret `<stem>.<ir>`.
    Functional,
    /// Like `Functional`, but the compiler is run with no arguments and picks
    /// up its default input.
    Basic,
    /// Compile only, capturing the compiler's own diagnostics.
    #[serde(rename = "warnings")]
    WarningsOnly,
}

impl Category {
    pub fn interprets(self) -> bool {
        matches!(self, Category::Functional | Category::Basic)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Category::Functional => "functional",
            Category::Basic => "basic",
            Category::WarningsOnly => "warnings",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fixture {
    pub name: String,
    /// Source path without extension, relative to the harness work dir.
    pub stem: String,
    pub category: Category,
}

/// Golden lines for one fixture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpectedOutcome {
    pub fixture_name: String,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub fixture: Fixture,
    pub expected: ExpectedOutcome,
    pub skip: bool,
}

/// On-disk shape of one catalog entry.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FixtureRecord {
    name: String,
    stem: String,
    category: Category,
    expected: Vec<String>,
    #[serde(default)]
    skip: bool,
}

impl From<FixtureRecord> for CatalogEntry {
    fn from(record: FixtureRecord) -> Self {
        entry(
            &record.name,
            &record.stem,
            record.category,
            record.expected,
            record.skip,
        )
    }
}

fn entry(
    name: &str,
    stem: &str,
    category: Category,
    lines: Vec<String>,
    skip: bool,
) -> CatalogEntry {
    CatalogEntry {
        fixture: Fixture {
            name: name.to_string(),
            stem: stem.to_string(),
            category,
        },
        expected: ExpectedOutcome {
            fixture_name: name.to_string(),
            lines,
        },
        skip,
    }
}

/// Ordered, validated list of fixtures.
#[derive(Debug, Clone, Default)]
pub struct FixtureCatalog {
    entries: Vec<CatalogEntry>,
}

// =============================================================================
// CONSTRUCTION AND LOADING
// =============================================================================

impl FixtureCatalog {
    /// Build a catalog, rejecting empty or duplicate names and gaps in numbering.
    pub fn new(entries: Vec<CatalogEntry>) -> Result<Self, CatalogError> {
        validate(&entries)?;
        Ok(Self { entries })
    }

    /// Load a catalog file, or every YAML file under a directory.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let files = if path.is_dir() {
            discover_catalog_files(path)?
        } else {
            vec![path.to_path_buf()]
        };
        let mut entries = Vec::new();
        for file in &files {
            log::debug!("loading catalog {}", file.display());
            entries.extend(load_records(file)?.into_iter().map(CatalogEntry::from));
        }
        Self::new(entries)
    }

    /// Parse a catalog held in memory.
    pub fn from_yaml_str(content: &str) -> Result<Self, CatalogError> {
        let records = parse_records(content, Path::new("<inline>"))?;
        Self::new(records.into_iter().map(CatalogEntry::from).collect())
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.fixture.name == name)
    }
}

/// Finds all YAML files under `root`, sorted for deterministic order.
pub fn discover_catalog_files(root: &Path) -> Result<Vec<PathBuf>, CatalogError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let is_yaml = entry
            .path()
            .extension()
            .map(|ext| ext == "yaml" || ext == "yml")
            .unwrap_or(false);
        if is_yaml {
            files.push(entry.path().to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

fn load_records(path: &Path) -> Result<Vec<FixtureRecord>, CatalogError> {
    let content = fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_records(&content, path)
}

fn parse_records(content: &str, path: &Path) -> Result<Vec<FixtureRecord>, CatalogError> {
    serde_yaml::from_str(content).map_err(|source| CatalogError::Yaml {
        path: path.to_path_buf(),
        source,
    })
}

// =============================================================================
// VALIDATION
// =============================================================================

fn validate(entries: &[CatalogEntry]) -> Result<(), CatalogError> {
    let mut seen = HashSet::new();
    // (category, name prefix) -> next expected number
    let mut next: BTreeMap<(Category, String), u32> = BTreeMap::new();

    for (index, entry) in entries.iter().enumerate() {
        let name = entry.fixture.name.trim();
        if name.is_empty() {
            return Err(CatalogError::EmptyName { index });
        }
        if !seen.insert(name.to_string()) {
            return Err(CatalogError::Duplicate {
                name: name.to_string(),
            });
        }
        if let Some((prefix, number)) = split_number(name) {
            let expected = next
                .entry((entry.fixture.category, prefix.to_string()))
                .or_insert(1);
            if number != *expected {
                return Err(CatalogError::NonContiguous {
                    category: entry.fixture.category.to_string(),
                    name: name.to_string(),
                    expected: *expected,
                });
            }
            *expected += 1;
        }
    }
    Ok(())
}

/// `"t12"` -> `("t", 12)`. Names without a trailing number are not numbered.
fn split_number(name: &str) -> Option<(&str, u32)> {
    let digits_start = name
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i)?;
    let number = name[digits_start..].parse().ok()?;
    Some((&name[..digits_start], number))
}

// =============================================================================
// BUILT-IN SUITE
// =============================================================================

const IF_WARNING: &str =
    "WARNING: Type mismatch in if statement (conditional statement is not an integer value).";
const FOR_WARNING: &str =
    "WARNING: Type mismatch in for statement (conditional statement is not an integer value).";

fn lines(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl FixtureCatalog {
    /// The Decaf toolchain's own regression suite.
    pub fn builtin() -> Self {
        let mut entries = vec![entry(
            "basic",
            "test",
            Category::Basic,
            lines(&[
                "6", "1", "0", "1212", "1111", "666", "2", "1", "3.0", "2.0",
            ]),
            false,
        )];

        let functional: [&[&str]; 9] = [
            &["6"],
            &["24"],
            &["1"],
            &["0", "1", "2", "3"],
            &[
                "100", "0", "1", "2", "100", "1", "0", "2", "100", "2", "0", "1", "100", "3", "0",
                "1", "2",
            ],
            &["8", "0", "0"],
            &["8.0", "0.0", "0.5"],
            &["1", "0", "0", "300", "1", "400", "1"],
            &["1", "1009", "1", "8", "98", "271", "720", "450", "567", "578"],
        ];
        for (i, expected) in functional.iter().enumerate() {
            let name = format!("t{}", i + 1);
            let stem = format!("test_files/{}", name);
            entries.push(entry(
                &name,
                &stem,
                Category::Functional,
                lines(expected),
                false,
            ));
        }

        // w3 repeats w1 and w2 twice; kept literally.
        let warnings: [&[&str]; 3] = [
            &[IF_WARNING],
            &[FOR_WARNING],
            &[IF_WARNING, FOR_WARNING, IF_WARNING, FOR_WARNING],
        ];
        for (i, expected) in warnings.iter().enumerate() {
            let name = format!("w{}", i + 1);
            let stem = format!("test_files/{}", name);
            entries.push(entry(
                &name,
                &stem,
                Category::WarningsOnly,
                lines(expected),
                false,
            ));
        }

        Self { entries }
    }
}
