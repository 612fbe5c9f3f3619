use crate::errors::NodeError;
use crate::utils::suggest::suggest;

fn choice_hint(value: &str, known: &[&str]) -> (String, Vec<String>) {
    let suggestions = suggest(value, known, 3);
    let did_you_mean = if suggestions.is_empty() {
        String::new()
    } else {
        format!("Did you mean: {}? ", suggestions.join(", "))
    };
    (
        format!("{}Use one of: {}.", did_you_mean, known.join(", ")),
        suggestions,
    )
}

pub fn unknown_resource_error(resource: &str, known: &[&str]) -> NodeError {
    let (hint, suggestions) = choice_hint(resource, known);
    NodeError::unknown_resource(format!("The resource \"{}\" is not known!", resource))
        .with_hint(hint)
        .with_details(serde_json::json!({
            "known_resources": known,
            "did_you_mean": suggestions,
        }))
}

pub fn unknown_operation_error(resource: &str, operation: &str, known: &[&str]) -> NodeError {
    let (hint, suggestions) = choice_hint(operation, known);
    NodeError::unknown_operation(format!(
        "The operation \"{}\" is not known for resource \"{}\"!",
        operation, resource
    ))
    .with_hint(hint)
    .with_details(serde_json::json!({
        "known_operations": known,
        "did_you_mean": suggestions,
    }))
}
