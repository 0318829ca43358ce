//! Seam between the update/control machinery and the host's presentation layer
//!
//! The host implements [`UiBridge`]; everything that touches the UI goes
//! through it. Control hierarchies are toggled with [`set_tree_enabled`],
//! which walks any [`ControlNode`] tree with an explicit stack.

use async_trait::async_trait;

use crate::types::DownloadProgress;
use crate::version::SemanticVersion;

/// How a notice should be presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeSeverity {
    Info,
    Stop,
}

/// A modal message the user must acknowledge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub message: String,
    pub severity: NoticeSeverity,
}

impl Notice {
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            severity: NoticeSeverity::Info,
        }
    }

    pub fn stop(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            severity: NoticeSeverity::Stop,
        }
    }
}

/// UI operations consumed by the orchestrator and the control monitor
///
/// Implementations must apply every call on the host's single UI thread;
/// [`crate::ui::ui_channel`] provides that marshaling for hosts that do not
/// have their own.
#[async_trait]
pub trait UiBridge: Send + Sync {
    /// Replace the status line
    fn display_status(&self, text: &str);

    /// Enable or disable every interactive control
    fn set_enabled(&self, enabled: bool);

    /// Ask a yes/no question; `true` means the user agreed
    async fn prompt_consent(&self, question: &str) -> bool;

    /// Show a blocking notice and return once it is dismissed
    async fn show_notice(&self, notice: Notice);

    /// Shut the application down
    fn terminate_application(&self);

    /// Report download progress. Defaults to a percentage status line.
    fn display_progress(&self, progress: &DownloadProgress) {
        self.display_status(&format!("Downloading: {}%", progress.percent));
    }

    /// Show the latest version advertised by the manifest
    fn display_latest_version(&self, _latest: &SemanticVersion) {}
}

/// A node in a UI control hierarchy
pub trait ControlNode {
    fn set_enabled(&mut self, enabled: bool);

    fn children_mut(&mut self) -> Vec<&mut dyn ControlNode>;
}

/// Enable or disable every descendant of `root`, returning how many were toggled.
///
/// The root itself is left alone. Traversal uses an explicit stack so deep
/// hierarchies cannot overflow the call stack.
pub fn set_tree_enabled(root: &mut dyn ControlNode, enabled: bool) -> usize {
    let mut toggled = 0;
    let mut stack = root.children_mut();

    while let Some(node) = stack.pop() {
        node.set_enabled(enabled);
        toggled += 1;
        stack.extend(node.children_mut());
    }

    toggled
}

/// Plain in-memory control, for headless hosts and tests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Widget {
    pub name: String,
    pub enabled: bool,
    pub children: Vec<Widget>,
}

impl Widget {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, child: Widget) -> Self {
        self.children.push(child);
        self
    }

    /// Depth-first search by name
    pub fn find(&self, name: &str) -> Option<&Widget> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(name))
    }

    /// Whether every descendant has the given enabled state
    pub fn all_descendants(&self, enabled: bool) -> bool {
        self.children
            .iter()
            .all(|c| c.enabled == enabled && c.all_descendants(enabled))
    }
}

impl ControlNode for Widget {
    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn children_mut(&mut self) -> Vec<&mut dyn ControlNode> {
        self.children
            .iter_mut()
            .map(|c| c as &mut dyn ControlNode)
            .collect()
    }
}
