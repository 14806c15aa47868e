//! Application layer: the operations behind every screen.
//!
//! `TripService` owns the storage ports chosen at startup and the session of
//! the user running the command.

pub mod service;
