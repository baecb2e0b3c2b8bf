//! Integration tests: the controller driven through fake sources, and the
//! real HTTP clients against a local stub server.

mod fake_sources;
mod refresh_cycle;
