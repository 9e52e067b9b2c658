use serde::Serialize;

/// Detail payload reported to the caller for both successes and failures.
///
/// `rc` is always the status code of the last HTTP call that decided the
/// outcome: the probe for no-ops and dry runs, the write otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Output {
    pub rc: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
}

impl Output {
    pub fn new(rc: u16) -> Self {
        Self {
            rc,
            message: None,
            request: None,
            response: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_request(mut self, url: impl Into<String>) -> Self {
        self.request = Some(url.into());
        self
    }

    pub fn with_response(mut self, body: impl Into<String>) -> Self {
        self.response = Some(body.into());
        self
    }
}

/// Result of one reconciliation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub changed: bool,
    pub output: Output,
}

impl Outcome {
    pub fn changed(output: Output) -> Self {
        Self {
            changed: true,
            output,
        }
    }

    pub fn unchanged(output: Output) -> Self {
        Self {
            changed: false,
            output,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_output_omits_absent_fields() {
        let output = Output::new(200);
        assert_eq!(serde_json::to_value(&output).unwrap(), json!({ "rc": 200 }));
    }

    #[test]
    fn test_outcome_serializes_result_surface() {
        let outcome = Outcome::changed(
            Output::new(201)
                .with_message("Document added to index 'logs'.")
                .with_request("http://es:9200/logs/_doc/"),
        );
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({
                "changed": true,
                "output": {
                    "rc": 201,
                    "message": "Document added to index 'logs'.",
                    "request": "http://es:9200/logs/_doc/"
                }
            })
        );
    }
}
