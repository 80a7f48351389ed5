use serde::{Deserialize, Serialize};

#[derive(Serialize, Debug)]
pub struct Health {
    pub status: &'static str,
}

/// Standard response shape: what was asked, what came back, and why it failed.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Envelope<I, O> {
    pub input: I,
    pub output: O,
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<I, O> Envelope<I, O> {
    pub fn ok(input: I, output: O) -> Self {
        Self { input, output, error: None, message: None }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl<I> Envelope<I, bool> {
    /// Failed envelope; `output` is always `false`.
    pub fn failed(input: I, error: impl Into<String>) -> Self {
        Self { input, output: false, error: Some(error.into()), message: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_serializes_null_error_and_skips_message() {
        let env = Envelope::ok("abc", 3);
        let v = serde_json::to_value(&env).unwrap();
        assert_eq!(v, serde_json::json!({"input": "abc", "output": 3, "error": null}));
    }

    #[test]
    fn failed_envelope_carries_error() {
        let env = Envelope::failed("k", "boom").with_message("details");
        let v = serde_json::to_value(&env).unwrap();
        assert_eq!(v["output"], false);
        assert_eq!(v["error"], "boom");
        assert_eq!(v["message"], "details");
    }
}
