use std::borrow::Cow;

fn is_safe_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '@' | '%' | '+' | '=' | ':' | ',' | '.' | '/' | '_' | '-')
}

/// Quotes `arg` for a POSIX shell-style command line.
///
/// Strings made only of safe characters are returned unchanged; anything else is
/// wrapped in single quotes, with embedded single quotes spliced as `'"'"'`.
pub fn shell_quote(arg: &str) -> Cow<'_, str> {
    if arg.is_empty() {
        return Cow::Borrowed("''");
    }
    if arg.chars().all(is_safe_char) {
        return Cow::Borrowed(arg);
    }
    Cow::Owned(format!("'{}'", arg.replace('\'', "'\"'\"'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_paths_are_left_alone() {
        assert_eq!(shell_quote("/data/emd_1234.map"), "/data/emd_1234.map");
        assert_eq!(shell_quote("run-1@host:5,a=b+c%"), "run-1@host:5,a=b+c%");
    }

    #[test]
    fn paths_with_spaces_are_single_quoted() {
        assert_eq!(shell_quote("/my maps/a.mrc"), "'/my maps/a.mrc'");
    }

    #[test]
    fn embedded_single_quotes_are_spliced() {
        assert_eq!(shell_quote("it's.mrc"), "'it'\"'\"'s.mrc'");
    }

    #[test]
    fn empty_string_becomes_empty_quotes() {
        assert_eq!(shell_quote(""), "''");
    }
}
