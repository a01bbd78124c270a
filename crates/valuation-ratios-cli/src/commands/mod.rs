pub mod ratios;
pub mod statements;
