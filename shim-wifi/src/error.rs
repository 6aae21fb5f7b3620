// SPDX-License-Identifier: Apache-2.0
// Copyright RINA Core Authors

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StaError {
    /// Precondition kind: `EnrollToDAF` arrived while an enrollment was
    /// already pending ("a single enrollment is pending at a time").
    #[error("an enrollment is already in progress")]
    EnrollmentInProgress,

    /// LifecycleClosed-adjacent: the enrollment timer fired before the
    /// supplicant reached `Connected`.
    #[error("enrollment to {dif_name:?}/{bssid:?} timed out")]
    EnrollmentTimeout { dif_name: String, bssid: String },

    /// Provider kind: the supplicant control channel reported an error,
    /// surfaced verbatim to the caller.
    #[error("supplicant control channel error: {0}")]
    SupplicantError(String),

    /// Precondition kind: `AssignToDIF` or `EnrollToDAF` observed while
    /// not `Disconnected`.
    #[error("operation not valid in state {0:?}")]
    WrongState(crate::sm::StaState),
}

impl From<StaError> for common::RinaError {
    fn from(err: StaError) -> Self {
        match err {
            StaError::EnrollmentInProgress | StaError::WrongState(_) => common::RinaError::Busy,
            StaError::EnrollmentTimeout { .. } => {
                common::RinaError::IoError("enrollment timed out".to_owned())
            }
            StaError::SupplicantError(msg) => common::RinaError::IoError(msg),
        }
    }
}
