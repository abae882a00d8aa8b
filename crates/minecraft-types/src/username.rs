//! Account-name validation.
//!
//! A valid name is 3 to 30 word characters (`[A-Za-z0-9_]`), with at most
//! one arbitrary leading character tolerated ahead of them, since Bedrock
//! gamertags reach Java servers with a leading dot.

/// Check a Minecraft account name before it is interpolated into a
/// console command. Names that fail here never reach the server.
pub fn valid_account_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    let body = if is_word_char(first) {
        name
    } else {
        chars.as_str()
    };
    let len = body.chars().count();
    (3..=30).contains(&len) && body.chars().all(is_word_char)
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::valid_account_name;

    #[test]
    fn test_accepts_plain_names() {
        assert!(valid_account_name("Steve"));
        assert!(valid_account_name("abc"));
        assert!(valid_account_name("player_one"));
        assert!(valid_account_name("X99"));
    }

    #[test]
    fn test_length_boundaries() {
        assert!(!valid_account_name("ab"));
        assert!(valid_account_name("abc"));
        assert!(valid_account_name(&"a".repeat(30)));
        assert!(!valid_account_name(&"a".repeat(31)));
    }

    #[test]
    fn test_leading_punctuation_tolerated_once() {
        assert!(valid_account_name(".Gamertag"));
        assert!(valid_account_name("*abc"));
        assert!(!valid_account_name("..abc"));
        // A tolerated leading char does not shrink the minimum body length.
        assert!(!valid_account_name(".ab"));
    }

    #[test]
    fn test_rejects_embedded_punctuation() {
        assert!(!valid_account_name("Ste ve"));
        assert!(!valid_account_name("Steve!"));
        assert!(!valid_account_name("a-b-c"));
        assert!(!valid_account_name("名前です"));
    }

    #[test]
    fn test_rejects_empty() {
        assert!(!valid_account_name(""));
        assert!(!valid_account_name("."));
    }
}
