//! Chat service behaviour over the in-memory store

mod roster_tests;
