pub mod database;
pub mod error;
pub mod export;
pub mod models;

pub use error::{AppError, Result};
pub use models::{Card, CardPatch, Profile, QuizSession, ReviewCommand, ReviewModel};
