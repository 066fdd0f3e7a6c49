//! Persistence substrate: one SQLite-backed key→JSON record table

pub mod export;
pub mod init;
pub mod leads;
pub mod records;
pub mod seed;
pub mod touches;
pub mod users;

pub use init::*;
pub use records::*;
