//! File-list heuristics that turn a working-tree diff into a [`ChangeAnalysis`].
//!
//! Classification is purely path based: tags come from a fixed substring table and
//! fix/feature candidates from basenames. The diff body only decides whether there is
//! anything to analyze at all.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Input to classification: the diff plus the files git reported as changed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChangeSet {
    pub diff: String,
    pub staged_files: Vec<String>,
    pub unstaged_files: Vec<String>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.diff.trim().is_empty()
    }

    /// Staged files first, then unstaged. Duplicates are kept.
    pub fn all_files(&self) -> impl Iterator<Item = &str> {
        self.staged_files
            .iter()
            .chain(self.unstaged_files.iter())
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PatternTag {
    Testing,
    Component,
    Api,
    Styling,
    Configuration,
    Documentation,
    Dependencies,
}

impl PatternTag {
    pub fn as_str(self) -> &'static str {
        match self {
            PatternTag::Testing => "testing",
            PatternTag::Component => "component",
            PatternTag::Api => "api",
            PatternTag::Styling => "styling",
            PatternTag::Configuration => "configuration",
            PatternTag::Documentation => "documentation",
            PatternTag::Dependencies => "dependencies",
        }
    }
}

/// One row of the tag table: a tag attaches when any needle occurs in the path.
pub struct TagRule {
    pub tag: PatternTag,
    pub needles: &'static [&'static str],
}

impl TagRule {
    /// Case-sensitive substring test over the full path and the basename.
    pub fn matches(&self, path: &str, basename: &str) -> bool {
        self.needles
            .iter()
            .any(|needle| path.contains(needle) || basename.contains(needle))
    }
}

pub const TAG_RULES: &[TagRule] = &[
    TagRule {
        tag: PatternTag::Testing,
        needles: &["test", "spec", "__tests__"],
    },
    TagRule {
        tag: PatternTag::Component,
        needles: &["component", "Component"],
    },
    TagRule {
        tag: PatternTag::Api,
        needles: &["api", "service", "endpoint"],
    },
    TagRule {
        tag: PatternTag::Styling,
        needles: &["style", "css", "scss", "sass"],
    },
    TagRule {
        tag: PatternTag::Configuration,
        needles: &["config", "setup", "env"],
    },
    TagRule {
        tag: PatternTag::Documentation,
        needles: &["readme", "doc", "md"],
    },
    TagRule {
        tag: PatternTag::Dependencies,
        needles: &["package.json", "requirements.txt", "yarn.lock"],
    },
];

/// Basename substrings that mark a file as part of a fix.
pub const FIX_MARKERS: &[&str] = &["fix", "bug", "error", "issue"];

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    #[default]
    Low,
    Medium,
    High,
}

impl Complexity {
    pub fn from_file_count(count: usize) -> Self {
        if count > 10 {
            Complexity::High
        } else if count > 5 {
            Complexity::Medium
        } else {
            Complexity::Low
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    #[default]
    Minor,
    Major,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChangeAnalysis {
    /// Extension (with leading dot, or empty) to occurrence count.
    #[serde(rename = "types")]
    pub extensions: BTreeMap<String, usize>,
    /// Distinct tags, in first-seen order.
    pub patterns: Vec<PatternTag>,
    pub fixes: Vec<String>,
    pub features: Vec<String>,
    pub components: Vec<String>,
    pub is_test: bool,
    pub is_style: bool,
    pub is_config: bool,
    pub is_api: bool,
    pub is_documentation: bool,
    pub is_dependency: bool,
    pub complexity: Complexity,
    pub impact: Impact,
}

impl ChangeAnalysis {
    pub fn has_tag(&self, tag: PatternTag) -> bool {
        self.patterns.contains(&tag)
    }

    fn record_tag(&mut self, tag: PatternTag, basename: &str) {
        match tag {
            PatternTag::Testing => self.is_test = true,
            PatternTag::Component => self.components.push(basename.to_string()),
            PatternTag::Api => self.is_api = true,
            PatternTag::Styling => self.is_style = true,
            PatternTag::Configuration => self.is_config = true,
            PatternTag::Documentation => self.is_documentation = true,
            PatternTag::Dependencies => self.is_dependency = true,
        }
        if !self.patterns.contains(&tag) {
            self.patterns.push(tag);
        }
    }
}

/// Outcome of [`classify`].
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    /// The diff trimmed to nothing; there is no change to describe.
    Empty,
    Analyzed(ChangeAnalysis),
}

pub fn classify(changes: &ChangeSet) -> Classification {
    if changes.is_empty() {
        return Classification::Empty;
    }
    Classification::Analyzed(analyze_files(changes.all_files()))
}

/// Run the per-file heuristics over an ordered file list.
pub fn analyze_files<'a>(files: impl IntoIterator<Item = &'a str>) -> ChangeAnalysis {
    let mut analysis = ChangeAnalysis::default();
    let mut count = 0usize;

    for file in files {
        count += 1;
        let name = basename(file);

        *analysis
            .extensions
            .entry(extension(name).to_string())
            .or_insert(0) += 1;

        for rule in TAG_RULES {
            if rule.matches(file, name) {
                analysis.record_tag(rule.tag, name);
            }
        }

        if FIX_MARKERS.iter().any(|marker| name.contains(marker)) {
            analysis.fixes.push(name.to_string());
        } else {
            analysis.features.push(name.to_string());
        }
    }

    analysis.complexity = Complexity::from_file_count(count);
    // api/config outrank test/style even when both matched.
    analysis.impact = if analysis.is_api || analysis.is_config {
        Impact::Major
    } else {
        Impact::Minor
    };
    analysis
}

/// Last path component. Git always reports `/`-separated paths.
pub fn basename(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

/// Extension including the dot; empty for dotfiles and names without one.
pub fn extension(basename: &str) -> &str {
    match basename.rfind('.') {
        None | Some(0) => "",
        Some(idx) => &basename[idx..],
    }
}
