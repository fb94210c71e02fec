//! Adaptateurs de transport concrets livrés avec la crate.
//!
//! Seul Chromecast est fourni ici; les autres transports sont des
//! capacités externes que l'application hôte branche via `CastTransport`.

mod chromecast;

pub use chromecast::{ChromecastSender, ChromecastTransport, ReceiverAnnouncement};
