pub mod recommendations;
pub mod results;
