//! Current-draw bench firmware for a 2.4 GHz radio module.
//!
//! One build holds the module in one power state (sleep, receive idle,
//! continuous transmit, analog block on) so a meter on the supply line can
//! read its consumption. The scenario is picked with Cargo features, see
//! [`config`].
//!
//! The application only talks to the radio runtime through
//! [`framework::Framework`]. [`board`] implements it on the ATmega128RFA1,
//! [`sim`] on the host.

#![cfg_attr(target_arch = "avr", no_std)]
#![cfg_attr(target_arch = "avr", feature(abi_avr_interrupt))]

pub mod application;
pub mod config;
pub mod drivers;
pub mod error;
pub mod firmware;
pub mod framework;
pub mod protocol;

#[cfg(target_arch = "avr")]
pub mod board;
pub mod hal;

#[cfg(not(target_arch = "avr"))]
pub mod sim;

pub use application::{Application, State};
pub use config::{Config, Scenario};
pub use error::{Error, Result};
pub use firmware::Firmware;
pub use framework::{Event, Flow, Framework};
