//! Agent workspace writer

use presync_bridge::Agent;
use presync_common::{ensure_dir, remove_dir_all_if_exists, write_atomic, ErrorPolicy, FanOut};
use presync_types::{AgentPresetPackage, PresyncError, PromptItem, Result, RuleItem, Uri};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File name of the marker keeping generated files out of version control
pub const IGNORE_MARKER: &str = ".gitignore";

/// Content of [`IGNORE_MARKER`]
pub const IGNORE_MARKER_CONTENT: &str = "*\n";

/// One owned unit of work for the blocking pool
enum Entry {
    Rule(RuleItem),
    Prompt(PromptItem),
}

/// Writes presets for one agent below a workspace root
#[derive(Debug, Clone)]
pub struct Integration {
    workspace_root: PathBuf,
    agent: Agent,
}

impl Integration {
    /// Integration writing `agent`'s files below `workspace_root`
    pub fn new(workspace_root: impl Into<PathBuf>, agent: Agent) -> Self {
        Self {
            workspace_root: workspace_root.into(),
            agent,
        }
    }

    /// The agent this integration writes for
    #[must_use]
    pub fn agent(&self) -> Agent {
        self.agent
    }

    /// `<workspace>/<rules_dir>/<namespace>`
    #[must_use]
    pub fn rules_root(&self, namespace: &str) -> PathBuf {
        self.workspace_root
            .join(self.agent.layout().rules_dir)
            .join(namespace)
    }

    /// `<workspace>/<prompts_dir>/<namespace>`
    #[must_use]
    pub fn prompts_root(&self, namespace: &str) -> PathBuf {
        self.workspace_root
            .join(self.agent.layout().prompts_dir)
            .join(namespace)
    }

    /// Write every rule and prompt of `package` into `namespace`.
    ///
    /// Returns the number of item files written. Writes run concurrently;
    /// every dispatched write finishes before the first error is returned,
    /// and the ignore markers are written even when one of them failed.
    pub async fn write_package(
        &self,
        namespace: &str,
        package: &AgentPresetPackage,
    ) -> Result<usize> {
        let layout = self.agent.layout();
        let rules_root = self.rules_root(namespace);
        let prompts_root = self.prompts_root(namespace);

        let mut writes: FanOut<(), PresyncError> = FanOut::new(ErrorPolicy::RunToCompletion);
        for preset in &package.presets {
            let entries = preset
                .rules
                .iter()
                .cloned()
                .map(Entry::Rule)
                .chain(preset.prompts.iter().cloned().map(Entry::Prompt));

            for entry in entries {
                let agent = self.agent;
                let target = match &entry {
                    Entry::Rule(rule) => item_path(&rules_root, rule.uri(), layout.rule_extension),
                    Entry::Prompt(prompt) => {
                        item_path(&prompts_root, prompt.uri(), layout.prompt_extension)
                    }
                };
                writes.spawn_blocking(move || {
                    let text = match &entry {
                        Entry::Rule(rule) => agent.render_rule(rule)?,
                        Entry::Prompt(prompt) => agent.render_prompt(prompt)?,
                    };
                    write_file(&target, &text)
                });
            }
        }

        let written = writes.len();
        if written == 0 {
            debug!(
                "Package '{}' has nothing to write for {}",
                package.package_name, self.agent
            );
            return Ok(0);
        }

        // Siblings of a failed write are on disk too; mark them before
        // reporting the failure.
        let joined = writes.join().await;
        let marked = [&rules_root, &prompts_root]
            .into_iter()
            .try_for_each(|root| write_file(&root.join(IGNORE_MARKER), IGNORE_MARKER_CONTENT));
        joined?;
        marked?;

        info!(
            "Wrote {} file(s) of package '{}' for {}",
            written, package.package_name, self.agent
        );
        Ok(written)
    }

    /// Remove `namespace` from both the rules and the prompts root.
    ///
    /// A namespace that was never written is not an error.
    pub fn clean(&self, namespace: &str) -> Result<()> {
        for root in [self.rules_root(namespace), self.prompts_root(namespace)] {
            debug!("Removing {:?}", root);
            remove_dir_all_if_exists(&root)?;
        }
        Ok(())
    }
}

/// `<root>/<package>/<preset>/<path><extension>`
fn item_path(root: &Path, uri: &Uri, extension: &str) -> PathBuf {
    root.join(uri.internal_path(extension))
}

fn write_file(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    debug!("Writing {:?}", path);
    write_atomic(path, text.as_bytes())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use presync_types::ItemType;

    #[test]
    fn test_item_path_layout() {
        let integration = Integration::new("/ws", Agent::Github);
        let uri = Uri::new("presync", "p1", "go", ItemType::Rules, "style/naming");
        let path = item_path(&integration.rules_root("ns"), &uri, ".instructions.md");
        assert_eq!(
            path,
            PathBuf::from("/ws/.github/instructions/ns/p1/go/style/naming.instructions.md")
        );
        assert_eq!(
            integration.prompts_root("ns"),
            PathBuf::from("/ws/.github/prompts/ns")
        );
    }
}
