pub mod card;
pub mod profile;
pub mod quiz_session;
pub mod review;
pub mod schedule;

pub use card::{Card, CardPatch};
pub use profile::Profile;
pub use quiz_session::{QuizSession, QuizSummary, Verdict};
pub use review::{ReviewCommand, ReviewModel};
pub use schedule::{RevisionSetting, RevisionUnit, TimeLeft};
