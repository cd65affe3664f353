//! `pip freeze` output

/// Installed requirement lines in the order pip printed them.
///
/// Blank lines, comments and pip's own notices (`WARNING:`, `[notice]`) are
/// dropped.
pub fn parse_freeze(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !line.starts_with('#') && !line.starts_with('['))
        .filter(|line| !line.starts_with("WARNING:"))
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_requirement_lines() {
        let output = "attrs==23.1.0\n-e git+https://example.com/demo.git@abc#egg=demo\n\npytest==8.0.0\n";

        assert_eq!(
            parse_freeze(output),
            vec![
                "attrs==23.1.0",
                "-e git+https://example.com/demo.git@abc#egg=demo",
                "pytest==8.0.0",
            ]
        );
    }

    #[test]
    fn test_drops_notices() {
        let output = "\
# Editable install with no version control (demo==0.1)
coverage==7.4.0
WARNING: You are using pip version 23.0; however, version 24.0 is available.
[notice] A new release of pip is available: 23.0 -> 24.0
";
        assert_eq!(parse_freeze(output), vec!["coverage==7.4.0"]);
        assert!(parse_freeze("").is_empty());
    }
}
