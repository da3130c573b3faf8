//! The documentation viewer's page-load sequence, modelled as plain values:
//! settings in, widget options, CSRF interceptor and OAuth call out.

pub mod bootstrap;
pub mod interceptor;
pub mod oauth;
pub mod options;
pub mod script;
pub mod settings;

pub use bootstrap::DocViewerBootstrapper;
pub use script::{PageShell, ScriptWidget};
pub use settings::ViewerSettings;
