//! Integration tests

mod support;
mod test_generator;
mod test_retry;
mod test_server;
