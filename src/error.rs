//! Error types for simulation setup.
//!
//! The running simulation never fails: numeric trouble is clamped away and
//! out-of-phase gestures are dropped. Errors only come from rejecting a
//! configuration before a [`Simulation`](crate::Simulation) is built.

use core::fmt;

/// Errors produced while validating a configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum SimError {
    /// Container width and height must be positive and finite.
    InvalidContainer,
    /// Body width and height must be positive and finite.
    InvalidBodySize,
    /// Flick friction must be in (0, 1).
    InvalidFriction,
    /// Bounce damping must be in [0, 1).
    InvalidBounceDamping,
    /// A spring preset has non-positive stiffness/mass or negative damping.
    InvalidSpring { preset: &'static str },
    /// Split threshold must be positive.
    InvalidSplitThreshold,
    /// Split choreography distances must satisfy merge < contact < approach.
    InvalidSplitDistances,
    /// Frame and sub-step limits must be positive, with sub-step <= frame.
    InvalidTimeStep,
    /// Speed thresholds must be positive and ordered min < flick < max.
    InvalidSpeedLimits,
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::InvalidContainer => write!(f, "container size must be positive and finite"),
            SimError::InvalidBodySize => write!(f, "body size must be positive and finite"),
            SimError::InvalidFriction => write!(f, "friction must be in (0, 1)"),
            SimError::InvalidBounceDamping => write!(f, "bounce damping must be in [0, 1)"),
            SimError::InvalidSpring { preset } => {
                write!(f, "spring preset '{}' has invalid parameters", preset)
            }
            SimError::InvalidSplitThreshold => write!(f, "split threshold must be positive"),
            SimError::InvalidSplitDistances => {
                write!(f, "split distances must satisfy merge < contact < approach")
            }
            SimError::InvalidTimeStep => write!(f, "time step limits must be positive with sub-step <= frame"),
            SimError::InvalidSpeedLimits => {
                write!(f, "speed limits must be positive and ordered min < flick < max")
            }
        }
    }
}
