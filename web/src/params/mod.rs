//! This module holds typed parameters for various endpoint inputs.
//!
//! By using typed parameters, inputs are validated (by type) and correctly formatted before
//! they reach the domain layer.

pub(crate) mod ack;
pub(crate) mod case;
pub(crate) mod interaction;
