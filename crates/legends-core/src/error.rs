//! Error taxonomy for the farming engine.
//!
//! Ambiguity between two similar anchors is not an error anywhere: the
//! classifier resolves it by strict highest score.

use crate::anchor::Anchor;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum FarmError {
    /// A required anchor never appeared within its bound. Recovered via the
    /// recovery dispatch, never fatal.
    #[error("anchor {anchor} not seen within {waited:?}")]
    NotFound { anchor: Anchor, waited: Duration },

    /// The target window could not be located. Fatal at startup.
    #[error("no window with a title containing {title:?}")]
    WindowUnavailable { title: String },

    /// Frame capture failed. Transient when isolated; fatal once the
    /// consecutive-failure ceiling is hit (the window is likely gone).
    #[error("screen capture failed")]
    CaptureFailed,

    /// Generic recovery ran out of attempts. Soft failure; the outer loop
    /// continues with the next detection cycle.
    #[error("recovery exhausted after {attempts} attempts")]
    RecoveryExhausted { attempts: u32 },
}

pub type Result<T> = std::result::Result<T, FarmError>;
