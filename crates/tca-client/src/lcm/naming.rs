//! Instance names that avoid collisions
//!
//! A generated name is the first nine characters of the requested name, a dash
//! and six hex characters, so it never exceeds sixteen characters.

use crate::error::{Result, TcaError};

/// Longest name the generator produces
pub const MAX_GENERATED_LEN: usize = 16;

const PREFIX_LEN: usize = 9;
const SUFFIX_LEN: usize = 6;
const MAX_ATTEMPTS: usize = 32;

/// One random candidate derived from `base`
pub fn candidate(base: &str) -> String {
    let prefix: String = base.chars().take(PREFIX_LEN).collect();
    let prefix = prefix.trim_end_matches('-');
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{}-{}", prefix, &suffix[..SUFFIX_LEN])
}

/// `requested` when it is free, otherwise a generated name not in `taken`
pub fn unique_name<'a, I>(requested: &str, taken: I) -> Result<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let taken: std::collections::HashSet<&str> = taken.into_iter().collect();
    if !taken.contains(requested) {
        return Ok(requested.to_string());
    }
    (0..MAX_ATTEMPTS)
        .map(|_| candidate(requested))
        .find(|name| !taken.contains(name.as_str()))
        .ok_or_else(|| {
            TcaError::invalid_spec(format!(
                "could not generate a free instance name from {}",
                requested
            ))
        })
}
