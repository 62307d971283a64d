//! Response envelope.
//!
//! # Invariants
//! - Exactly one of `payload` and `exception` is set.
//! - Exceptions expose only a stable code and a generic description; error
//!   detail goes to the log.
//! - A panic inside an operation becomes code `1001` instead of unwinding
//!   into the caller.

use crate::error::{ServiceError, ServiceResult};
use log::{error, warn};
use serde::{Deserialize, Serialize};
use std::panic::{catch_unwind, AssertUnwindSafe};

pub const UNEXPECTED_CODE: &str = "1001";
pub const UNEXPECTED_DESCRIPTION: &str =
    "A technical exception has occurred, please contact your system administrator";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionBody {
    pub code: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Response<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exception: Option<ExceptionBody>,
}

impl<T> Response<T> {
    pub fn ok(payload: T) -> Self {
        Self {
            payload: Some(payload),
            exception: None,
        }
    }

    pub fn failure(err: &ServiceError) -> Self {
        Self::exception(err.code(), err.description())
    }

    pub fn unexpected() -> Self {
        Self::exception(UNEXPECTED_CODE, UNEXPECTED_DESCRIPTION)
    }

    fn exception(code: &str, description: &str) -> Self {
        Self {
            payload: None,
            exception: Some(ExceptionBody {
                code: code.to_string(),
                description: description.to_string(),
            }),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.exception.is_none()
    }
}

/// Runs `action` and converts its outcome, including panics, to a response.
pub fn safe_execute<T>(operation: &str, action: impl FnOnce() -> ServiceResult<T>) -> Response<T> {
    match catch_unwind(AssertUnwindSafe(action)) {
        Ok(Ok(payload)) => Response::ok(payload),
        Ok(Err(err)) => {
            match &err {
                ServiceError::Technical(_) => error!(
                    "event=api_call module=api status=error op={} code={} error={}",
                    operation,
                    err.code(),
                    err
                ),
                _ => warn!(
                    "event=api_call module=api status=rejected op={} code={} error={}",
                    operation,
                    err.code(),
                    err
                ),
            }
            Response::failure(&err)
        }
        Err(_) => {
            error!(
                "event=api_call module=api status=panic op={} code={}",
                operation, UNEXPECTED_CODE
            );
            Response::unexpected()
        }
    }
}
