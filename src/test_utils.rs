//! Shared HTML fixtures for unit tests.
