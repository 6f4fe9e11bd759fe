pub mod candidate;
pub mod participant;
pub mod position;
pub mod results;
pub mod vote;
