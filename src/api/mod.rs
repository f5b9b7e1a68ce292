pub mod coincap;
