//! The bundled plugins.

use std::time::Instant;

use sigil::framework::Plugin;

pub mod info;
pub mod whatsapp;

pub use info::InfoPlugin;
pub use whatsapp::WhatsappPlugin;

/// Every bundled plugin, in installation order.
pub fn all(started: Instant) -> Vec<Box<dyn Plugin>> {
    vec![Box::new(InfoPlugin::new(started)), Box::new(WhatsappPlugin)]
}
