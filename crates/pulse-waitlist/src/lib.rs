//! CampusPulse Waitlist
//!
//! The waitlist modal's form flow:
//! - Form capture with three required fields and five optional ones
//! - Validation before anything leaves the page
//! - Submission state machine (editing, submitting, submitted)
//! - Backend trait with an HTTP webhook implementation
//!
//! A submission is a single attempt. A failed attempt returns the flow to
//! editing with the failure reason attached, so the form can show it and
//! the visitor can try again.

pub mod backend;
pub mod error;
pub mod flow;
pub mod form;

pub use backend::*;
pub use error::*;
pub use flow::*;
pub use form::*;
