use std::error::Error;

/// Boxed static error type
pub type Err = Box<dyn Error + 'static>;

/// Splits a raw sentence into tokens on whitespace
///
/// ```
/// assert_eq!(pcfgparse::utils::tokenize("the  dog\truns\n"), vec!["the", "dog", "runs"]);
/// ```
pub fn tokenize(sentence: &str) -> Vec<&str> {
  sentence.split_whitespace().collect()
}
