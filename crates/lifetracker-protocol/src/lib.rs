//! Wire-level types shared by the LifeTracker tool layer and its host.
//!
//! Everything a remote caller can observe lives here: the error taxonomy for
//! tool and resource calls, and the `{ success, data | error }` envelope every
//! call resolves to.

pub mod response;
pub mod tool;

/// Success/failure envelope returned for every tool and resource call.
pub use response::{ReadPathLabel, ToolResponse};
/// Errors raised by tools and resources before they are folded into a response.
pub use tool::ToolError;
