//! Interpretation rules.
//!
//! An [`Expectation`] is a predicate over one [`ProbeResponse`]. Several of
//! them treat a negative response (400, 404) as proof that the endpoint
//! exists and validates correctly, so a success status is a violation there.

use crate::error::ProbeError;
use crate::probe::{truncate, ProbeResponse};
use serde_json::Value;
use std::fmt;

const ECHO_LIMIT: usize = 500;

/// What a check requires of the response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expectation {
    /// Status matches and a top-level string field equals an exact value.
    FieldEquals {
        status: u16,
        field: String,
        expected: String,
    },
    /// Status matches and the body object carries every listed key.
    KeysPresent { status: u16, keys: Vec<String> },
    /// Status matches and the body's `error` string contains at least one
    /// marker, compared case-insensitively.
    ErrorMentions { status: u16, markers: Vec<String> },
    /// Status matches and `header` is present with a non-empty value.
    /// `echo` headers are reported in the details either way.
    HeaderPresent {
        status: u16,
        header: String,
        echo: Vec<String>,
    },
}

/// Outcome of applying an expectation to a completed exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interpretation {
    Satisfied(String),
    Violated(String),
}

impl Interpretation {
    pub fn is_satisfied(&self) -> bool {
        matches!(self, Self::Satisfied(_))
    }

    pub fn details(&self) -> &str {
        match self {
            Self::Satisfied(d) | Self::Violated(d) => d,
        }
    }
}

impl Expectation {
    pub fn field_equals(status: u16, field: &str, expected: &str) -> Self {
        Self::FieldEquals {
            status,
            field: field.to_string(),
            expected: expected.to_string(),
        }
    }

    pub fn keys_present(status: u16, keys: &[&str]) -> Self {
        Self::KeysPresent {
            status,
            keys: keys.iter().map(|k| k.to_string()).collect(),
        }
    }

    pub fn error_mentions(status: u16, markers: &[&str]) -> Self {
        Self::ErrorMentions {
            status,
            markers: markers.iter().map(|m| m.to_lowercase()).collect(),
        }
    }

    pub fn header_present(status: u16, header: &str, echo: &[&str]) -> Self {
        Self::HeaderPresent {
            status,
            header: header.to_string(),
            echo: echo.iter().map(|h| h.to_string()).collect(),
        }
    }

    /// Status code the contract requires.
    pub fn expected_status(&self) -> u16 {
        match self {
            Self::FieldEquals { status, .. }
            | Self::KeysPresent { status, .. }
            | Self::ErrorMentions { status, .. }
            | Self::HeaderPresent { status, .. } => *status,
        }
    }

    /// Apply the rule. A body that should be JSON but is not yields
    /// `Err`, which callers treat as a transport-class failure.
    pub fn evaluate(&self, response: &ProbeResponse) -> Result<Interpretation, ProbeError> {
        if let Self::HeaderPresent {
            header,
            echo: echoed,
            ..
        } = self
        {
            return Ok(self.evaluate_headers(response, header, echoed));
        }

        let expected_status = self.expected_status();
        if response.status != expected_status {
            return Ok(Interpretation::Violated(format!(
                "unexpected status {} (expected {}), response: {}",
                response.status,
                expected_status,
                truncate(&response.body, ECHO_LIMIT),
            )));
        }

        let body = response.json()?;
        let interpretation = match self {
            Self::FieldEquals {
                field, expected, ..
            } => match body.get(field).and_then(Value::as_str) {
                Some(actual) if actual == expected => {
                    Interpretation::Satisfied(format!("Response: {}", echo(&body)))
                }
                _ => Interpretation::Violated(format!(
                    "unexpected {} {} (expected \"{}\"), response: {}",
                    field,
                    body.get(field)
                        .map(Value::to_string)
                        .unwrap_or_else(|| "<missing>".to_string()),
                    expected,
                    echo(&body),
                )),
            },
            Self::KeysPresent { keys, .. } => {
                let missing: Vec<&str> = keys
                    .iter()
                    .filter(|k| body.get(k.as_str()).is_none())
                    .map(String::as_str)
                    .collect();
                if missing.is_empty() {
                    Interpretation::Satisfied(format!("Stats retrieved: {}", echo(&body)))
                } else {
                    Interpretation::Violated(format!(
                        "missing expected keys [{}] in response: {}",
                        missing.join(", "),
                        echo(&body),
                    ))
                }
            }
            Self::ErrorMentions { markers, .. } => {
                match body.get("error").and_then(Value::as_str) {
                    None => Interpretation::Violated(format!(
                        "response carries no \"error\" message: {}",
                        echo(&body),
                    )),
                    Some(message) => {
                        let lowered = message.to_lowercase();
                        if markers.iter().any(|m| lowered.contains(m.as_str())) {
                            Interpretation::Satisfied(format!(
                                "Endpoint exists and validates input: {}",
                                echo(&body)
                            ))
                        } else {
                            Interpretation::Violated(format!(
                                "error message \"{}\" mentions none of [{}]: {}",
                                message,
                                markers.join(", "),
                                echo(&body),
                            ))
                        }
                    }
                }
            }
            Self::HeaderPresent {
                header,
                echo: echoed,
                ..
            } => self.evaluate_headers(response, header, echoed),
        };
        Ok(interpretation)
    }

    fn evaluate_headers(
        &self,
        response: &ProbeResponse,
        header: &str,
        echoed: &[String],
    ) -> Interpretation {
        let mut names: Vec<&str> = vec![header];
        names.extend(echoed.iter().map(String::as_str).filter(|h| *h != header));
        let rendered = names
            .iter()
            .map(|name| format!("{}: {}", name, response.header(name).unwrap_or("<absent>")))
            .collect::<Vec<_>>()
            .join(", ");

        let present = response
            .header(header)
            .is_some_and(|v| !v.trim().is_empty());
        if response.status == self.expected_status() && present {
            Interpretation::Satisfied(format!("headers present: {{{}}}", rendered))
        } else {
            Interpretation::Violated(format!(
                "status {} (expected {}), headers: {{{}}}",
                response.status,
                self.expected_status(),
                rendered,
            ))
        }
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FieldEquals {
                status,
                field,
                expected,
            } => write!(f, "status {} with {} == \"{}\"", status, field, expected),
            Self::KeysPresent { status, keys } => {
                write!(f, "status {} with keys [{}]", status, keys.join(", "))
            }
            Self::ErrorMentions { status, markers } => write!(
                f,
                "status {} with error mentioning any of [{}]",
                status,
                markers.join(", ")
            ),
            Self::HeaderPresent { status, header, .. } => {
                write!(f, "status {} with non-empty {}", status, header)
            }
        }
    }
}

fn echo(body: &Value) -> String {
    truncate(&body.to_string(), ECHO_LIMIT)
}
