//! Configuration loaded from `.cyphercell.toml`.

pub mod settings;

pub use settings::Settings;
