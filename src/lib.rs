// Library surface for headless/integration tests and reuse.
// The binary only adds CLI parsing and terminal setup on top of this.
pub mod app;
pub mod app_dirs;
pub mod clock;
pub mod config;
pub mod cue;
pub mod error;
pub mod export;
pub mod logging;
pub mod preset;
pub mod report;
pub mod runtime;
pub mod session;
pub mod settings;
pub mod store;
pub mod sync;
pub mod timer;
pub mod ui;
pub mod util;
