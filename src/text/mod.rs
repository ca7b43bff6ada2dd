pub mod format;
pub mod synopsis;
pub mod workout;
pub mod workout_tables;

pub use format::{format_date, format_duration, format_time_since};
pub use synopsis::synopsis;
pub use workout::{WorkoutInput, describe_workout};
