use crate::constants::node::DEFAULT_TYPE_VERSION;
use crate::utils::feature_flags::is_attribution_disabled;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeContext {
    #[serde(default = "default_type_version")]
    pub type_version: f64,
    #[serde(default)]
    pub instance_id: Option<String>,
    /// Capability flag: whether this instance may append the attribution
    /// suffix at all. Licensing decisions stay with the host.
    #[serde(default = "default_true")]
    pub attribution_allowed: bool,
    #[serde(default)]
    pub continue_on_fail: bool,
    #[serde(default)]
    pub resume_url: Option<String>,
    #[serde(default)]
    pub node_id: Option<String>,
}

fn default_type_version() -> f64 {
    DEFAULT_TYPE_VERSION
}

fn default_true() -> bool {
    true
}

impl Default for NodeContext {
    fn default() -> Self {
        Self {
            type_version: DEFAULT_TYPE_VERSION,
            instance_id: None,
            attribution_allowed: true,
            continue_on_fail: false,
            resume_url: None,
            node_id: None,
        }
    }
}

impl NodeContext {
    pub fn with_continue_on_fail(mut self, enabled: bool) -> Self {
        self.continue_on_fail = enabled;
        self
    }

    pub fn with_attribution_allowed(mut self, allowed: bool) -> Self {
        self.attribution_allowed = allowed;
        self
    }

    pub fn with_environment(mut self) -> Self {
        if is_attribution_disabled() {
            self.attribution_allowed = false;
        }
        self
    }

    pub fn at_least(&self, version: f64) -> bool {
        self.type_version >= version
    }
}
