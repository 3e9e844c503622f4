//! Command scripts.

/// Split a script into command tokens. Tokens are separated by commas or
/// whitespace; empty tokens are dropped.
pub fn parse_script(script: &str) -> Vec<String> {
    script
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_script() {
        assert_eq!(parse_script("go(), right()\nleft()"), vec!["go()", "right()", "left()"]);
        assert!(parse_script(" ,, ").is_empty());
    }
}
