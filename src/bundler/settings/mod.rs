//! Configuration structures for native bundling.
//!
//! This module provides the user-facing configuration read from `jfx.toml`:
//! application metadata, launchers, file associations, signing and workaround
//! toggles.

mod core;
mod external;
mod launcher;
mod signing;
mod workarounds;

pub use core::{ALL_BUNDLERS, JfxSettings};
pub use external::ExternalBundlerSettings;
pub use launcher::{FileAssociation, SecondaryLauncher};
pub use signing::SigningSettings;
pub use workarounds::WorkaroundSettings;
