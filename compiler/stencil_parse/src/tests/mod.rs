//! Parser test suites.
