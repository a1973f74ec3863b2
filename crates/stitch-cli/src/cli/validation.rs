/// Parse a concurrency limit; zero is rejected.
pub fn parse_parallelism(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(_) => Err(format!("'{}' is not a positive integer", s)),
    }
}

/// Parse a language tag such as `de`, `pt-br` or `zh-tw`.
///
/// Tags are lowercased. Each `-`-separated part must be 2 to 8 ASCII
/// alphanumerics.
pub fn parse_language(s: &str) -> Result<String, String> {
    if s.is_empty() {
        return Err("Language tag cannot be empty".to_string());
    }

    let valid = s
        .split('-')
        .all(|part| (2..=8).contains(&part.len()) && part.chars().all(|c| c.is_ascii_alphanumeric()));
    if !valid {
        return Err(format!("'{}' is not a valid language tag", s));
    }

    Ok(s.to_ascii_lowercase())
}
