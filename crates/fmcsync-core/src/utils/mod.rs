//! Utility functions for string formatting and input normalization.

pub mod format;

pub use format::{format_age, normalize_addresses, parse_address_list, safe_filename, strip_scheme};
