//! CLI command implementations
//!
//! Each submodule implements a specific CLI command.

pub mod ddl;
pub mod load;
pub mod view;
