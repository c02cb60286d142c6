//! Entities projected from published snapshots.

pub mod fan;
pub mod number;
pub mod sensor;

use ducobox_adapter_http::ClientError;
use ducobox_core::{OverrideError, ParamError};

pub use fan::{FanMode, VentilationFan};
pub use number::ConfigNumber;
pub use sensor::{readings, Reading};

/// Errors returned by entity actions.
#[derive(Debug, thiserror::Error)]
pub enum EntityError {
    /// The device call failed
    #[error(transparent)]
    Client(#[from] ClientError),
    /// The value was rejected before transmission
    #[error(transparent)]
    Param(#[from] ParamError),
    /// Override percentage out of range
    #[error(transparent)]
    Override(#[from] OverrideError),
    /// The entity does not support the action
    #[error("{0} is not supported")]
    Unsupported(&'static str),
}
