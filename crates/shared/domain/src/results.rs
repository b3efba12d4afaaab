//! Operation outcome types surfaced to callers and UI view-models.

use serde::{Deserialize, Serialize};

/// Renders a flag as `Success` / `Failure`.
pub trait SuccessFailure {
    fn to_success_failure(&self) -> &'static str;
}

impl SuccessFailure for bool {
    fn to_success_failure(&self) -> &'static str {
        if *self {
            "Success"
        } else {
            "Failure"
        }
    }
}

/// Renders a flag as `Yes` / `No`.
pub trait YesNo {
    fn to_yes_no(&self) -> &'static str;
}

impl YesNo for bool {
    fn to_yes_no(&self) -> &'static str {
        if *self {
            "Yes"
        } else {
            "No"
        }
    }
}

/// A single identity-operation error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityError {
    pub code: String,
    pub description: String,
}

impl IdentityError {
    pub fn new(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
        }
    }
}

/// Outcome of an identity-manager operation whose failure is a business
/// result rather than an infrastructure error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityResult {
    pub succeeded: bool,
    pub errors: Vec<IdentityError>,
}

impl IdentityResult {
    pub fn success() -> Self {
        Self {
            succeeded: true,
            errors: Vec::new(),
        }
    }

    pub fn failed(errors: Vec<IdentityError>) -> Self {
        Self {
            succeeded: false,
            errors,
        }
    }

    pub fn failed_with(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self::failed(vec![IdentityError::new(code, description)])
    }

    pub fn descriptions(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.description.clone()).collect()
    }
}

impl std::fmt::Display for IdentityResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.succeeded {
            write!(f, "Succeeded")
        } else {
            let codes: Vec<&str> = self.errors.iter().map(|e| e.code.as_str()).collect();
            write!(f, "Failed : {}", codes.join(","))
        }
    }
}

/// Success flag plus a display message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct OperationResult {
    pub succeeded: bool,
    pub message: String,
}

impl OperationResult {
    /// Build from an identity result: `"{prefix} was successful"` or
    /// `"{prefix} Failed: {descriptions}"`.
    pub fn from_identity(result: &IdentityResult, message_prefix: &str) -> Self {
        Self::new(result.succeeded, message_prefix, &result.descriptions())
    }

    pub fn new<S: AsRef<str>>(succeeded: bool, message_prefix: &str, errors: &[S]) -> Self {
        let message = if succeeded {
            format!("{} was successful", message_prefix)
        } else {
            let errors: Vec<&str> = errors.iter().map(AsRef::as_ref).collect();
            format!("{} Failed: {}", message_prefix, errors.join(", "))
        };
        Self { succeeded, message }
    }

    pub fn success(message_prefix: &str) -> Self {
        Self::new::<&str>(true, message_prefix, &[])
    }

    pub fn failure(message_prefix: &str, error: impl AsRef<str>) -> Self {
        Self::new(false, message_prefix, &[error.as_ref()])
    }

    /// CSS class for rendering the message.
    pub fn text_color(&self) -> &'static str {
        if self.succeeded {
            "text-success"
        } else {
            "text-danger"
        }
    }
}

impl std::fmt::Display for OperationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.succeeded.to_success_failure(), self.message)
    }
}

/// Ordered collection of results for multi-step operations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DisplayableResults {
    results: Vec<OperationResult>,
}

impl DisplayableResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn results(&self) -> &[OperationResult] {
        &self.results
    }

    pub fn add_result(&mut self, result: OperationResult) {
        self.results.push(result);
    }

    pub fn clear(&mut self) {
        self.results.clear();
    }

    pub fn all_succeeded(&self) -> bool {
        self.results.iter().all(|r| r.succeeded)
    }

    pub fn failures(&self) -> impl Iterator<Item = &OperationResult> {
        self.results.iter().filter(|r| !r.succeeded)
    }
}

impl From<Vec<OperationResult>> for DisplayableResults {
    fn from(results: Vec<OperationResult>) -> Self {
        Self { results }
    }
}

impl std::fmt::Display for DisplayableResults {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let messages: Vec<&str> = self.results.iter().map(|r| r.message.as_str()).collect();
        write!(f, "{}", messages.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_message() {
        let result = OperationResult::from_identity(&IdentityResult::success(), "Role creation");
        assert!(result.succeeded);
        assert_eq!(result.message, "Role creation was successful");
        assert_eq!(result.text_color(), "text-success");
        assert_eq!(result.to_string(), "Success: Role creation was successful");
    }

    #[test]
    fn test_failure_message_joins_descriptions() {
        let identity = IdentityResult::failed(vec![
            IdentityError::new("A", "first problem"),
            IdentityError::new("B", "second problem"),
        ]);
        let result = OperationResult::from_identity(&identity, "Registration");
        assert!(!result.succeeded);
        assert_eq!(result.message, "Registration Failed: first problem, second problem");
        assert_eq!(result.text_color(), "text-danger");
        assert!(result.to_string().starts_with("Failure: "));
    }

    #[test]
    fn test_displayable_results() {
        let mut results = DisplayableResults::new();
        results.add_result(OperationResult::success("Step one"));
        results.add_result(OperationResult::failure("Step two", "boom"));

        assert_eq!(
            results.to_string(),
            "Step one was successful, Step two Failed: boom"
        );
        assert!(!results.all_succeeded());
        assert_eq!(results.failures().count(), 1);

        results.clear();
        assert!(results.results().is_empty());
        assert_eq!(results.to_string(), "");
    }

    #[test]
    fn test_identity_result_display() {
        assert_eq!(IdentityResult::success().to_string(), "Succeeded");
        assert_eq!(
            IdentityResult::failed_with("DuplicateUserName", "taken").to_string(),
            "Failed : DuplicateUserName"
        );
    }

    #[test]
    fn test_flag_renderers() {
        assert_eq!(true.to_success_failure(), "Success");
        assert_eq!(false.to_yes_no(), "No");
    }
}
