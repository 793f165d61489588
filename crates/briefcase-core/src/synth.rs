//! Turn a [`ChangeAnalysis`] into a concrete [`WorkflowPlan`].

use crate::analysis::{ChangeAnalysis, Complexity};
use crate::types::{ChangeType, MergeStrategy, RepositorySnapshot, WorkflowPlan};

/// Extensions stripped from a candidate basename before it becomes a change name.
const STRIPPED_EXTENSIONS: &[&str] = &[
    ".js", ".ts", ".jsx", ".tsx", ".py", ".java", ".cpp", ".c", ".h",
];

/// Which plan template applies. First match in declaration order wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Category {
    Bugfix(String),
    Feature(String),
    Test,
    Style,
    Generic,
}

impl Category {
    pub fn of(analysis: &ChangeAnalysis) -> Self {
        if let Some(first) = analysis.fixes.first() {
            Category::Bugfix(change_name(first).to_string())
        } else if let Some(first) = analysis.features.first() {
            Category::Feature(change_name(first).to_string())
        } else if analysis.is_test {
            Category::Test
        } else if analysis.is_style {
            Category::Style
        } else {
            Category::Generic
        }
    }

    pub fn change_type(&self) -> ChangeType {
        match self {
            Category::Bugfix(_) => ChangeType::Bugfix,
            Category::Feature(_) | Category::Generic => ChangeType::Feature,
            Category::Test => ChangeType::Test,
            Category::Style => ChangeType::Style,
        }
    }

    pub fn merge_strategy(&self) -> MergeStrategy {
        match self {
            Category::Bugfix(_) | Category::Test | Category::Style => MergeStrategy::Squash,
            Category::Feature(_) | Category::Generic => MergeStrategy::Merge,
        }
    }

    pub fn branch_name(&self) -> String {
        match self {
            Category::Bugfix(name) => format!("bugfix/{}", slugify(name)),
            Category::Feature(name) => format!("feature/{}", slugify(name)),
            Category::Test => "test/add-tests".to_string(),
            Category::Style => "style/ui-updates".to_string(),
            Category::Generic => "feature/code-updates".to_string(),
        }
    }

    pub fn title(&self) -> String {
        match self {
            Category::Bugfix(name) => format!("🐛 Fix {name}"),
            Category::Feature(name) => format!("✨ Add {name}"),
            Category::Test => "🧪 Add tests".to_string(),
            Category::Style => "🎨 Update styling".to_string(),
            Category::Generic => "✨ Update code".to_string(),
        }
    }

    fn template(&self) -> Template<'static> {
        match self {
            Category::Bugfix(_) => Template {
                done_heading: "COMPLETED FIXES",
                done: &[
                    "Added proper error handling",
                    "Improved validation",
                    "Enhanced user feedback",
                ],
                technical: &[
                    "Code quality improvements",
                    "Performance optimizations",
                    "Better error messages",
                    "Enhanced logging",
                ],
                experience: &[
                    "Resolved user-reported issue",
                    "Improved error handling",
                    "Better user feedback",
                    "Enhanced stability",
                ],
            },
            Category::Feature(_) => Template {
                done_heading: "COMPLETED FEATURES",
                done: &[
                    "Implemented user interface",
                    "Added error handling",
                    "Created comprehensive tests",
                ],
                technical: &[
                    "Code quality enhancements",
                    "Performance optimizations",
                    "Documentation updates",
                    "Bug fixes and improvements",
                ],
                experience: &[
                    "Improved usability",
                    "Enhanced performance",
                    "Better error messages",
                    "Streamlined workflows",
                ],
            },
            Category::Test => Template {
                done_heading: "COMPLETED FEATURES",
                done: &[
                    "Added test coverage",
                    "Implemented unit tests",
                    "Added integration tests",
                    "Created test utilities",
                ],
                technical: &[
                    "Improved test coverage",
                    "Enhanced test reliability",
                    "Better test organization",
                    "Automated test execution",
                ],
                experience: &[
                    "More reliable application",
                    "Better error detection",
                    "Improved code quality",
                    "Enhanced stability",
                ],
            },
            Category::Style => Template {
                done_heading: "COMPLETED FEATURES",
                done: &[
                    "Updated UI components",
                    "Improved styling",
                    "Enhanced user interface",
                    "Better visual design",
                ],
                technical: &[
                    "CSS optimizations",
                    "Responsive design improvements",
                    "Better component styling",
                    "Enhanced accessibility",
                ],
                experience: &[
                    "Improved visual design",
                    "Better user interface",
                    "Enhanced usability",
                    "Modern styling",
                ],
            },
            Category::Generic => Template {
                done_heading: "COMPLETED FEATURES",
                done: &[
                    "Code quality improvements",
                    "Performance optimizations",
                    "Bug fixes",
                    "Documentation updates",
                ],
                technical: &[
                    "Enhanced code structure",
                    "Better error handling",
                    "Improved performance",
                    "Updated documentation",
                ],
                experience: &[
                    "Better application performance",
                    "Improved reliability",
                    "Enhanced user experience",
                    "More stable application",
                ],
            },
        }
    }

    fn objective(&self) -> String {
        match self {
            Category::Bugfix(name) => format!("Fix {name}"),
            Category::Feature(name) => format!("Implement {name}"),
            Category::Test => "Add comprehensive tests".to_string(),
            Category::Style => "Update styling and UI".to_string(),
            Category::Generic => "Code improvements".to_string(),
        }
    }

    /// Bullet naming the change itself, listed before the static ones.
    fn lead_bullet(&self) -> Option<String> {
        match self {
            Category::Bugfix(name) => Some(format!("Resolved {name} issue")),
            Category::Feature(name) => Some(format!("Added {name} functionality")),
            _ => None,
        }
    }

    pub fn description(&self) -> String {
        let template = self.template();
        let mut done: Vec<String> = self.lead_bullet().into_iter().collect();
        done.extend(template.done.iter().map(|s| s.to_string()));

        let mut out = String::new();
        out.push_str(&format!("🎯 OBJECTIVE: {}\n\n", self.objective()));
        push_section(&mut out, &format!("✅ {}", template.done_heading), &done);
        push_section(&mut out, "🔧 TECHNICAL IMPROVEMENTS", template.technical);
        push_section(&mut out, "📱 USER EXPERIENCE", template.experience);
        out.push_str("✅ BUILD STATUS: SUCCESSFUL\n");
        out.push_str("🚀 READY FOR: Production deployment\n");
        out.push_str(&format!(
            "🔄 MERGE STRATEGY: {}",
            self.merge_strategy().as_str().to_uppercase()
        ));
        out
    }
}

struct Template<'a> {
    done_heading: &'a str,
    done: &'a [&'a str],
    technical: &'a [&'a str],
    experience: &'a [&'a str],
}

fn push_section<S: AsRef<str>>(out: &mut String, heading: &str, bullets: &[S]) {
    out.push_str(heading);
    out.push_str(":\n");
    for bullet in bullets {
        out.push_str("• ");
        out.push_str(bullet.as_ref());
        out.push('\n');
    }
    out.push('\n');
}

/// Build the plan for an analyzed change.
pub fn synthesize(analysis: &ChangeAnalysis, repository: &RepositorySnapshot) -> WorkflowPlan {
    let category = Category::of(analysis);
    WorkflowPlan {
        title: category.title(),
        description: category.description(),
        branch_name: category.branch_name(),
        change_type: category.change_type(),
        merge_strategy: category.merge_strategy(),
        recommendations: recommendations(analysis, repository),
    }
}

/// Independent advisory rules; every rule that fires contributes one line.
pub fn recommendations(analysis: &ChangeAnalysis, repository: &RepositorySnapshot) -> Vec<String> {
    let mut out = Vec::new();
    if analysis.complexity == Complexity::High {
        out.push("Consider breaking this into smaller commits".to_string());
    }
    if analysis.is_api && !analysis.is_test {
        out.push("Add tests for API changes".to_string());
    }
    if analysis.is_config {
        out.push("Update documentation for configuration changes".to_string());
    }
    if repository.is_on_default_branch() {
        out.push(
            "Consider creating a feature branch instead of committing directly to main".to_string(),
        );
    }
    out
}

/// Basename with a known source extension removed.
pub fn change_name(basename: &str) -> &str {
    STRIPPED_EXTENSIONS
        .iter()
        .find_map(|ext| basename.strip_suffix(ext))
        .unwrap_or(basename)
}

/// Lowercase, with every character outside `[a-z0-9]` replaced by `-`.
pub fn slugify(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() {
                c
            } else {
                '-'
            }
        })
        .collect()
}
