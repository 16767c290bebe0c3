//! A library which solves permutation-and-orientation twisty puzzles (the
//! 2x2x2 and 3x3x3 cubes) by encoding states as dense integer coordinates,
//! precomputing transition and distance tables, and searching with IDA*.

#![deny(missing_docs)]

pub mod cache;
pub mod coord;
pub mod cube222;
pub mod cube333;
pub mod error;
pub mod group;
pub mod move_tables;
pub mod pruning;
pub mod ranking;
pub mod search;
