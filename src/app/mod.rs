//! Application core — pure domain logic, zero I/O.
//!
//! This module contains the business rules for the Gongbot device: the
//! long-poll client state machine, the ring-signal latch, and the
//! trigger/ring arbitration that dispatches gong strikes.  All interaction
//! with hardware and the network happens through **port traits** defined
//! in [`ports`], keeping this layer fully testable without real
//! peripherals or sockets.

pub mod commands;
pub mod events;
pub mod poll;
pub mod ports;
pub mod ring;
pub mod service;
