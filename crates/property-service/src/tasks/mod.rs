//! Background tasks for the Property Search Service.
//!
//! - `session_sweeper` - Evicts expired tracked sessions

pub mod session_sweeper;

pub use session_sweeper::start_session_sweeper;
