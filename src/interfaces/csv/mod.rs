//! CSV surface for the CLI: a streaming profile seed reader and a search
//! result writer.

pub mod profile_reader;
pub mod result_writer;
