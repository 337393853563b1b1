//! Integration tests: the full ingest → engine → report path over
//! in-memory sources.

mod mock_sources;
mod pipeline;
