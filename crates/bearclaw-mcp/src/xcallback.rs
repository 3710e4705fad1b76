//! Bear's x-callback-url write path.
//!
//! Bear's database is opened read-only; the only supported way to change
//! notes is the `bear://x-callback-url` scheme, handled by the running Bear
//! app. Each action composes a URL and hands it to the system opener. The
//! scheme is fire-and-forget: a successful launch means macOS accepted the
//! URL, not that Bear applied the change.

use std::sync::Arc;

use async_trait::async_trait;
use bearclaw_core::normalize_tag;
use tracing::{debug, warn};

/// Base of every Bear action URL.
const SCHEME_BASE: &str = "bear://x-callback-url";

/// Outcome of dispatching one x-callback-url action.
#[derive(Debug, Clone)]
pub struct UrlSchemeResult {
    pub success: bool,
    pub message: String,
    pub error: Option<String>,
}

/// Hands a composed URL to the operating system.
///
/// The seam exists so tests can swap the system opener for a recorder.
#[async_trait]
pub trait UrlLauncher: Send + Sync {
    async fn launch(&self, url: &str) -> anyhow::Result<()>;
}

/// Launches URLs through `open(1)`, which routes `bear://` to the app.
#[derive(Debug, Default)]
pub struct OpenLauncher;

#[async_trait]
impl UrlLauncher for OpenLauncher {
    async fn launch(&self, url: &str) -> anyhow::Result<()> {
        let status = tokio::process::Command::new("open").arg(url).status().await?;
        if !status.success() {
            anyhow::bail!("open exited with {status}");
        }
        Ok(())
    }
}

/// Composes and dispatches Bear actions.
#[derive(Clone)]
pub struct XCallbackClient {
    launcher: Arc<dyn UrlLauncher>,
}

impl XCallbackClient {
    pub fn new(launcher: Arc<dyn UrlLauncher>) -> Self {
        Self { launcher }
    }

    /// Client backed by the system `open` command.
    pub fn system() -> Self {
        Self::new(Arc::new(OpenLauncher))
    }

    /// Builds `bear://x-callback-url/{action}?{query}`, percent-encoding
    /// values and skipping `None` parameters. Pair order is preserved.
    pub fn compose(action: &str, params: &[(&str, Option<&str>)]) -> String {
        let query = params
            .iter()
            .filter_map(|(key, value)| value.map(|v| format!("{key}={}", urlencoding::encode(v))))
            .collect::<Vec<_>>()
            .join("&");
        if query.is_empty() {
            format!("{SCHEME_BASE}/{action}")
        } else {
            format!("{SCHEME_BASE}/{action}?{query}")
        }
    }

    /// Dispatches one action. Launch failures come back inside the result
    /// rather than as an `Err` so tool handlers can report them verbatim.
    pub async fn execute(&self, action: &str, params: &[(&str, Option<&str>)]) -> UrlSchemeResult {
        let url = Self::compose(action, params);
        debug!(%url, "Dispatching Bear action");
        match self.launcher.launch(&url).await {
            Ok(()) => UrlSchemeResult {
                success: true,
                message: "Bear command executed successfully".to_string(),
                error: None,
            },
            Err(e) => {
                warn!(action, error = %e, "Bear action failed");
                UrlSchemeResult {
                    success: false,
                    message: "Failed to execute Bear command".to_string(),
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

impl UrlSchemeResult {
    /// The most specific failure text available.
    pub fn failure_text(&self) -> &str {
        self.error.as_deref().unwrap_or(&self.message)
    }
}

/// Joins user-supplied tags into the comma-separated form Bear's `tags`
/// parameter expects. Entries may themselves be comma-separated; each name
/// is trimmed and stripped of a leading `#`.
pub fn encode_tags(tags: &[String]) -> Option<String> {
    let names: Vec<&str> = tags
        .iter()
        .flat_map(|entry| entry.split(','))
        .map(|name| normalize_tag(name.trim()))
        .filter(|name| !name.is_empty())
        .collect();
    if names.is_empty() {
        None
    } else {
        Some(names.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingLauncher {
        urls: Mutex<Vec<String>>,
        fail: bool,
    }

    impl RecordingLauncher {
        fn failing() -> Self {
            Self {
                urls: Mutex::new(Vec::new()),
                fail: true,
            }
        }
    }

    #[async_trait]
    impl UrlLauncher for RecordingLauncher {
        async fn launch(&self, url: &str) -> anyhow::Result<()> {
            self.urls.lock().unwrap().push(url.to_string());
            if self.fail {
                anyhow::bail!("launcher refused");
            }
            Ok(())
        }
    }

    #[test]
    fn test_compose_without_params() {
        assert_eq!(
            XCallbackClient::compose("trash", &[]),
            "bear://x-callback-url/trash"
        );
    }

    #[test]
    fn test_compose_encodes_and_skips_none() {
        let url = XCallbackClient::compose(
            "create",
            &[
                ("title", Some("Hello World")),
                ("text", Some("line one\nline two")),
                ("tags", None),
                ("pin", Some("yes")),
            ],
        );
        assert_eq!(
            url,
            "bear://x-callback-url/create?title=Hello%20World&text=line%20one%0Aline%20two&pin=yes"
        );
    }

    #[tokio::test]
    async fn test_execute_success() {
        let launcher = Arc::new(RecordingLauncher::default());
        let client = XCallbackClient::new(launcher.clone());

        let result = client.execute("trash", &[("id", Some("ABC"))]).await;

        assert!(result.success);
        assert_eq!(result.message, "Bear command executed successfully");
        assert_eq!(
            *launcher.urls.lock().unwrap(),
            vec!["bear://x-callback-url/trash?id=ABC"]
        );
    }

    #[tokio::test]
    async fn test_execute_failure_is_captured_not_raised() {
        let client = XCallbackClient::new(Arc::new(RecordingLauncher::failing()));

        let result = client.execute("trash", &[("id", Some("ABC"))]).await;

        assert!(!result.success);
        assert_eq!(result.message, "Failed to execute Bear command");
        assert_eq!(result.failure_text(), "launcher refused");
    }

    #[test]
    fn test_encode_tags_normalizes() {
        let tags = vec!["#work ".to_string(), "home,  #errands".to_string()];
        assert_eq!(encode_tags(&tags).as_deref(), Some("work,home,errands"));
    }

    #[test]
    fn test_encode_tags_empty_input() {
        assert_eq!(encode_tags(&[]), None);
        assert_eq!(encode_tags(&["  ".to_string(), "#".to_string()]), None);
    }
}
