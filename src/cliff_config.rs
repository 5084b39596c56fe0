//! Dynamic git-cliff configuration templating.
//!
//! `render_cliff_config` is a pure function: it substitutes the GitLab
//! base URL and project path into a fixed `cliff.toml` template so that
//! issue, merge-request and commit references link back to the right
//! project. The rule table (group classification, preprocessors, link
//! parsers, tag pattern, bump policy) is a wire contract consumed by
//! downstream changelog readers and must stay byte-stable; do not
//! reorder or reword entries. The catch-all parser must remain last.

/// Template for the generated cliff.toml. `%GITLAB_URL%` and
/// `%PROJECT_PATH%` are the only substitution points.
const CLIFF_TOML_TEMPLATE: &str = r##"# ============================================
# Git-Cliff Configuration (Auto-Generated)
# ============================================
# GitLab URL: %GITLAB_URL%
# Project: %PROJECT_PATH%

[changelog]
header = """
# Changelog

Semua perubahan penting pada proyek ini akan didokumentasikan di file ini.

"""

body = """
{% if version -%}
## [{{ version | trim_start_matches(pat="v") }}] - {{ timestamp | date(format="%Y-%m-%d") }}
{% else -%}
## [Unreleased]
{% endif -%}

{% for group, commits in commits | group_by(attribute="group") %}
### {{ group | striptags | trim | upper_first }}
{% for commit in commits %}
- {% if commit.scope %}**{{ commit.scope }}:** {% endif %}{{ commit.message | upper_first }}\
{% if commit.id %} ([{{ commit.id | truncate(length=7, end="") }}](%GITLAB_URL%/%PROJECT_PATH%/-/commit/{{ commit.id }})){% endif %}
{% endfor %}
{% endfor %}
"""

footer = ""
trim = true

postprocessors = [
    { pattern = '\n{3,}', replace = "\n\n" },
]

[git]
conventional_commits = true
filter_unconventional = false
split_commits = false
protect_breaking_commits = false

commit_parsers = [
    { message = "^feat", group = "🚀 Features" },
    { message = "^fix", group = "🐛 Bug Fixes" },
    { message = "^doc", group = "📚 Documentation" },
    { message = "^perf", group = "⚡ Performance" },
    { message = "^refactor", group = "♻️ Refactoring" },
    { message = "^style", group = "🎨 Styling" },
    { message = "^test", group = "🧪 Testing" },
    { message = "^build|^ci", group = "🔧 DevOps & Infrastructure" },
    { message = "^chore\\(release\\)", skip = true },
    { message = "^chore\\(deps\\)", group = "📦 Dependencies" },
    { message = "^chore\\(pr\\)", skip = true },
    { message = "^chore\\(pull\\)", skip = true },
    { message = "^chore", group = "⚙️ Miscellaneous" },
    { body = ".*security", group = "🔐 Security" },
    { message = "^revert", group = "⏪ Revert" },
    { message = ".*", group = "📝 Other Changes" },
]

commit_preprocessors = [
    { pattern = '\((\w+\s)?#([0-9]+)\)', replace = "" },
]

link_parsers = [
    { pattern = "#(\\d+)", href = "%GITLAB_URL%/%PROJECT_PATH%/-/issues/$1" },
    { pattern = "!(\\d+)", href = "%GITLAB_URL%/%PROJECT_PATH%/-/merge_requests/$1" },
]

tag_pattern = "v?[0-9].*"
sort_commits = "newest"

[bump]
features_always_bump_minor = true
breaking_always_bump_major = true
initial_tag = "0.1.0"
"##;

/// Render a cliff.toml document for the given GitLab instance and
/// project. Deterministic: identical inputs yield byte-identical output.
pub fn render_cliff_config(gitlab_url: &str, project_path: &str) -> String {
    CLIFF_TOML_TEMPLATE
        .replace("%GITLAB_URL%", gitlab_url)
        .replace("%PROJECT_PATH%", project_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const BASE: &str = "https://gitlab.example.com";
    const PROJECT: &str = "group/project";

    #[test]
    fn test_deterministic_output() {
        let first = render_cliff_config(BASE, PROJECT);
        let second = render_cliff_config(BASE, PROJECT);
        assert_eq!(first, second);
    }

    #[test]
    fn test_no_placeholder_leaks() {
        let config = render_cliff_config(BASE, PROJECT);
        assert!(!config.contains("%GITLAB_URL%"));
        assert!(!config.contains("%PROJECT_PATH%"));
    }

    #[test]
    fn test_link_parsers_are_scoped_to_project() {
        let config = render_cliff_config(BASE, PROJECT);
        assert!(config
            .contains(r#"href = "https://gitlab.example.com/group/project/-/issues/$1""#));
        assert!(config
            .contains(r#"href = "https://gitlab.example.com/group/project/-/merge_requests/$1""#));
        assert!(config.contains("https://gitlab.example.com/group/project/-/commit/"));
    }

    #[test]
    fn test_varying_arguments_changes_only_urls() {
        // Substituting the base URL in one rendering must reproduce the
        // other exactly: the rule structure is identical, only the URL
        // fragments differ.
        let a = render_cliff_config("https://a.example", PROJECT);
        let b = render_cliff_config("https://b.example", PROJECT);
        assert_eq!(a.replace("https://a.example", "https://b.example"), b);

        let p = render_cliff_config(BASE, "grp/one");
        let q = render_cliff_config(BASE, "grp/two");
        assert_eq!(p.replace("grp/one", "grp/two"), q);
    }

    #[test]
    fn test_classification_rule_order_is_preserved() {
        let config = render_cliff_config(BASE, PROJECT);
        let expected_order = [
            r#"{ message = "^feat", group = "🚀 Features" }"#,
            r#"{ message = "^fix", group = "🐛 Bug Fixes" }"#,
            r#"{ message = "^doc", group = "📚 Documentation" }"#,
            r#"{ message = "^perf", group = "⚡ Performance" }"#,
            r#"{ message = "^refactor", group = "♻️ Refactoring" }"#,
            r#"{ message = "^style", group = "🎨 Styling" }"#,
            r#"{ message = "^test", group = "🧪 Testing" }"#,
            r#"{ message = "^build|^ci", group = "🔧 DevOps & Infrastructure" }"#,
            r#"{ message = "^chore\\(release\\)", skip = true }"#,
            r#"{ message = "^chore\\(deps\\)", group = "📦 Dependencies" }"#,
            r#"{ message = "^chore\\(pr\\)", skip = true }"#,
            r#"{ message = "^chore\\(pull\\)", skip = true }"#,
            r#"{ message = "^chore", group = "⚙️ Miscellaneous" }"#,
            r#"{ body = ".*security", group = "🔐 Security" }"#,
            r#"{ message = "^revert", group = "⏪ Revert" }"#,
            r#"{ message = ".*", group = "📝 Other Changes" }"#,
        ];

        let mut last_pos = 0;
        for rule in expected_order {
            let pos = config[last_pos..]
                .find(rule)
                .unwrap_or_else(|| panic!("rule missing or out of order: {rule}"));
            last_pos += pos + rule.len();
        }
    }

    #[test]
    fn test_catch_all_rule_is_last() {
        let config = render_cliff_config(BASE, PROJECT);
        let parsers_start = config.find("commit_parsers = [").unwrap();
        let parsers_end = config[parsers_start..].find(']').unwrap() + parsers_start;
        let parsers = &config[parsers_start..parsers_end];

        let rules: Vec<&str> = parsers
            .lines()
            .filter(|line| line.trim_start().starts_with('{'))
            .collect();
        let last = rules.last().expect("commit_parsers must not be empty");
        assert!(
            last.contains(r#"message = ".*""#),
            "catch-all rule must be last, found: {last}"
        );
    }

    #[test]
    fn test_bump_policy_and_tag_pattern() {
        let config = render_cliff_config(BASE, PROJECT);
        assert!(config.contains("features_always_bump_minor = true"));
        assert!(config.contains("breaking_always_bump_major = true"));
        assert!(config.contains(r#"initial_tag = "0.1.0""#));
        assert!(config.contains(r#"tag_pattern = "v?[0-9].*""#));
        assert!(config.contains(r#"sort_commits = "newest""#));
    }

    #[test]
    fn test_preprocessor_strips_trailing_issue_refs() {
        let config = render_cliff_config(BASE, PROJECT);
        assert!(config.contains(r#"{ pattern = '\((\w+\s)?#([0-9]+)\)', replace = "" }"#));
    }
}
