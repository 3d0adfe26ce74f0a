pub mod config;
pub mod desktop;
pub mod launch;
pub mod macros;
pub mod matcher;
pub mod raise;
pub mod selector;
pub mod wm;
