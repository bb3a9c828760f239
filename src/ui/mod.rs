//! Ratatui front-end: a sidebar for the three sections, the active section's
//! view, popups for forms and confirmations, and a status footer.

mod app;
mod forms;
mod helpers;
mod screens;
mod sidebar;
mod terminal;

pub use app::App;
pub use sidebar::Section;
pub use terminal::run_app;
