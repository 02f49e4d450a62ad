// Common constants and formatting helpers shared by the library and the CLI
pub mod constants;
pub mod utils;
