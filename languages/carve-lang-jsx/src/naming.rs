//! Component name normalization

use carve_foundation::{CarveError, CarveResult};
use once_cell::sync::Lazy;
use regex::Regex;

static SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s\-_]+").expect("valid regex"));

/// Turn user input such as `user card` or `user-card` into `UserCard`
///
/// Each word has its first character uppercased and the rest kept as typed.
/// Input with no words, or whose result is not a valid identifier, is rejected.
pub fn normalize_component_name(input: &str) -> CarveResult<String> {
    let name: String = SEPARATORS
        .split(input.trim())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect();

    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_alphabetic() || first == '$') && chars.all(|c| c.is_alphanumeric() || c == '$')
        }
        None => false,
    };
    if !valid {
        return Err(CarveError::invalid_input(format!(
            "'{}' is not a valid component name",
            input
        )));
    }
    Ok(name)
}
