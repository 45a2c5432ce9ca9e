// src/lib.rs

//! toprank: enumerates the top GitHub repositories and users past the
//! 1000-result search window by walking the score axis in windows.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
