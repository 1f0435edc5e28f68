pub mod chart;
pub mod exercise_card;
