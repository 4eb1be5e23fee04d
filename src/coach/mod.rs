// src/coach/mod.rs - Session lifecycle, prompts and event dispatch

pub mod events;
pub mod prompts;
pub mod service;
pub mod session;

pub use events::{Notice, NoticeLevel, SessionEvent};
pub use prompts::CoachingMode;
pub use service::{CoachService, Turn};
pub use session::Session;
