//! Terminal rendering: a projection of application state, kept separate
//! from the state transitions themselves.

pub mod ask;
pub mod render;
pub mod style;

pub use ask::DialoguerPresenter;
pub use render::TerminalView;
