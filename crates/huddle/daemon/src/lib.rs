//! Huddle daemon library
//!
//! Wires the placement core to a chat platform:
//! - `$play` request handling and reply texts
//! - the periodic announcer task
//! - configuration loading
//! - a console front end over the in-memory platform

pub mod config;
pub mod console;
pub mod error;
pub mod handler;
pub mod replies;
pub mod server;

pub use config::DaemonConfig;
pub use console::{Console, ConsoleCommand};
pub use error::{DaemonError, DaemonResult};
pub use handler::{Placement, PlayHandler, PlayRequest};
pub use replies::Replies;
pub use server::Server;
