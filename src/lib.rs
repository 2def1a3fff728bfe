use std::str::FromStr;

use tracing::level_filters::LevelFilter;

mod error;
pub use error::*;

mod candidates;
pub use candidates::*;

mod element;
pub use element::*;

mod electron;
pub use electron::*;

mod bond;
pub use bond::*;

mod atom;
pub use atom::*;

mod structure;
pub use structure::*;

mod parse;

mod atomtype;
pub use atomtype::*;

mod resonance;
pub use resonance::*;

mod toolkit;
pub use toolkit::*;

/// Install a formatting subscriber at `level` (`error` through `trace`).
///
/// Only the first call has any effect, so tests can call this freely.
/// An unrecognized level falls back to `info`.
pub fn init_logging(level: &str) {
    let level = LevelFilter::from_str(level).unwrap_or(LevelFilter::INFO);
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .try_init();
}
