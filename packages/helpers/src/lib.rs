pub mod answer;
pub mod math;
pub mod testing;
