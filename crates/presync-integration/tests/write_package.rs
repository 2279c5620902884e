//! Writing packages into agent workspaces

#![allow(clippy::unwrap_used, clippy::expect_used)]

use presync_bridge::Agent;
use presync_integration::{Integration, IGNORE_MARKER, IGNORE_MARKER_CONTENT};
use presync_types::{
    AgentPreset, AgentPresetPackage, AttachType, ItemType, PromptItem, PromptMetadata, RuleItem,
    RuleMetadata, Uri,
};
use std::fs;
use tempfile::TempDir;

fn go_package() -> AgentPresetPackage {
    let mut preset = AgentPreset::new("default");
    preset.rules.push(RuleItem::new(
        Uri::new("presync", "p1", "default", ItemType::Rules, "go-style/project"),
        "# Go style\n\nUse gofmt.\n",
        RuleMetadata {
            description: String::new(),
            attach: AttachType::Glob,
            globs: vec!["*.go".into()],
        },
    ));
    preset.prompts.push(PromptItem::new(
        Uri::new("presync", "p1", "default", ItemType::Prompts, "review"),
        "Review the diff.\n",
        PromptMetadata {
            description: "Review".into(),
        },
    ));

    let mut package = AgentPresetPackage::new("p1");
    package.presets.push(preset);
    package
}

#[tokio::test]
async fn test_cursor_end_to_end() {
    let workspace = TempDir::new().unwrap();
    let integration = Integration::new(workspace.path(), Agent::Cursor);

    let written = integration.write_package("ns", &go_package()).await.unwrap();
    assert_eq!(written, 2);

    let rule = workspace
        .path()
        .join(".cursor/rules/ns/p1/default/go-style/project.mdc");
    let text = fs::read_to_string(rule).unwrap();
    assert!(text.contains("alwaysApply: false\n"));
    assert!(text.contains("globs: *.go\n"));
    assert!(text.ends_with("---\n# Go style\n\nUse gofmt.\n"));

    let prompt = workspace.path().join(".cursor/prompts/ns/p1/default/review.md");
    assert_eq!(fs::read_to_string(prompt).unwrap(), "Review the diff.\n");
}

#[tokio::test]
async fn test_marker_files_written_for_both_roots() {
    let workspace = TempDir::new().unwrap();
    for agent in Agent::ALL {
        let integration = Integration::new(workspace.path(), agent);
        integration.write_package("ns", &go_package()).await.unwrap();

        for root in [integration.rules_root("ns"), integration.prompts_root("ns")] {
            let marker = fs::read_to_string(root.join(IGNORE_MARKER)).unwrap();
            assert_eq!(marker, IGNORE_MARKER_CONTENT, "{agent}");
        }
    }

    assert!(workspace
        .path()
        .join(".github/instructions/ns/p1/default/go-style/project.instructions.md")
        .is_file());
    assert!(workspace
        .path()
        .join(".github/prompts/ns/p1/default/review.prompt.md")
        .is_file());
    assert!(workspace
        .path()
        .join(".windsurf/rules/ns/p1/default/go-style/project.md")
        .is_file());
}

#[cfg(unix)]
#[tokio::test]
async fn test_written_files_are_private() {
    use std::os::unix::fs::PermissionsExt;

    let workspace = TempDir::new().unwrap();
    let integration = Integration::new(workspace.path(), Agent::Windsurf);
    integration.write_package("ns", &go_package()).await.unwrap();

    let path = workspace
        .path()
        .join(".windsurf/prompts/ns/p1/default/review.md");
    let mode = fs::metadata(path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[tokio::test]
async fn test_empty_package_creates_nothing() {
    let workspace = TempDir::new().unwrap();
    let integration = Integration::new(workspace.path(), Agent::Cursor);

    let mut package = AgentPresetPackage::new("p1");
    package.presets.push(AgentPreset::new("default"));

    let written = integration.write_package("ns", &package).await.unwrap();
    assert_eq!(written, 0);
    assert!(!workspace.path().join(".cursor").exists());
}

#[tokio::test]
async fn test_unsupported_attach_fails_write() {
    let workspace = TempDir::new().unwrap();
    let integration = Integration::new(workspace.path(), Agent::Windsurf);

    let mut package = go_package();
    package.presets[0].rules.push(RuleItem::new(
        Uri::new("presync", "p1", "default", ItemType::Rules, "odd"),
        "Odd\n",
        RuleMetadata {
            attach: AttachType::Unrecognized("sometimes".into()),
            ..RuleMetadata::default()
        },
    ));

    assert!(integration.write_package("ns", &package).await.is_err());
    // Sibling writes still finished, and stay out of version control
    assert!(workspace
        .path()
        .join(".windsurf/prompts/ns/p1/default/review.md")
        .is_file());
    for root in [integration.rules_root("ns"), integration.prompts_root("ns")] {
        let marker = fs::read_to_string(root.join(IGNORE_MARKER)).unwrap();
        assert_eq!(marker, IGNORE_MARKER_CONTENT);
    }
}

#[tokio::test]
async fn test_clean() {
    let workspace = TempDir::new().unwrap();
    let integration = Integration::new(workspace.path(), Agent::Cursor);

    // Absent namespace
    integration.clean("ns").unwrap();
    assert!(!workspace.path().join(".cursor").exists());

    integration.write_package("ns", &go_package()).await.unwrap();
    integration.write_package("other", &go_package()).await.unwrap();
    integration.clean("ns").unwrap();

    assert!(!integration.rules_root("ns").exists());
    assert!(!integration.prompts_root("ns").exists());
    assert!(integration.rules_root("other").join(IGNORE_MARKER).is_file());
}
