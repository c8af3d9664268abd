//! Shared utilities for the banter relay.
//!
//! Holds the pieces both the server and its tests need: a clock
//! abstraction so timestamps are injectable, and logger setup.

pub mod logger;
pub mod time;
