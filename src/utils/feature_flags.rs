use crate::constants::env as env_keys;

pub fn is_truthy(value: impl AsRef<str>) -> bool {
    matches!(
        value.as_ref().trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

pub fn is_truthy_any_env(keys: &[&str]) -> bool {
    keys.iter()
        .any(|key| std::env::var(key).ok().map(is_truthy).unwrap_or(false))
}

/// Deployment-level switch that withdraws the attribution capability,
/// regardless of what individual executions ask for.
pub fn is_attribution_disabled() -> bool {
    is_truthy_any_env(&[env_keys::ATTRIBUTION_DISABLED])
}
