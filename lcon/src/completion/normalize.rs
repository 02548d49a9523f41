//! Extraction of the trailing dotted path from an input line.

/// Characters that end a path token.
pub const SEPARATORS: &str = "()[]{}\"'+-=/*^%#~,";

/// A dotted path split into its complete segments and the partial name
/// being typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolPath {
    pub segments: Vec<String>,
    /// Partial segment; empty matches everything
    pub last: String,
}

/// Clean `raw` down to the path-like token at its end.
///
/// `:` counts as `.`; whitespace right before or after a dot is dropped so
/// `obj . field` reads as `obj.field`; separators and remaining whitespace
/// start a new token.
pub fn normalize(raw: &str) -> SymbolPath {
    let mut cleaned = String::with_capacity(raw.len());
    let mut after_dot = false;
    // whitespace chars pushed since the last significant char
    let mut pending_white = 0usize;

    for c in raw.chars() {
        let c = if c == ':' { '.' } else { c };
        if c.is_whitespace() {
            if !after_dot {
                cleaned.push(c);
                pending_white += 1;
            }
            continue;
        }
        if c == '.' {
            for _ in 0..pending_white {
                cleaned.pop();
            }
            after_dot = true;
        } else {
            after_dot = false;
        }
        pending_white = 0;
        cleaned.push(c);
    }

    let cleaned: String = cleaned
        .chars()
        .map(|c| if SEPARATORS.contains(c) { ' ' } else { c })
        .collect();
    let token = cleaned.rsplit(char::is_whitespace).next().unwrap_or("");

    let mut segments: Vec<String> = token.split('.').map(str::to_string).collect();
    let last = segments.pop().unwrap_or_default();
    SymbolPath { segments, last }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(segments: &[&str], last: &str) -> SymbolPath {
        SymbolPath {
            segments: segments.iter().map(|s| s.to_string()).collect(),
            last: last.to_string(),
        }
    }

    #[test]
    fn test_plain_name() {
        assert_eq!(normalize("fo"), path(&[], "fo"));
        assert_eq!(normalize(""), path(&[], ""));
    }

    #[test]
    fn test_dotted_and_colon() {
        assert_eq!(normalize("string.fo"), path(&["string"], "fo"));
        assert_eq!(normalize("obj:me"), path(&["obj"], "me"));
        assert_eq!(normalize("a.b.c"), path(&["a", "b"], "c"));
        assert_eq!(normalize("math."), path(&["math"], ""));
    }

    #[test]
    fn test_spaces_around_dots_are_dropped() {
        assert_eq!(normalize("math . pi"), path(&["math"], "pi"));
        assert_eq!(normalize("a  .b"), path(&["a"], "b"));
        assert_eq!(normalize("a.  b"), path(&["a"], "b"));
        assert_eq!(normalize("a . b . c"), path(&["a", "b"], "c"));
    }

    #[test]
    fn test_takes_trailing_token() {
        assert_eq!(normalize("local x = math.fl"), path(&["math"], "fl"));
        assert_eq!(normalize("print(string.up"), path(&["string"], "up"));
        assert_eq!(normalize("t[\"key\"] + os.cl"), path(&["os"], "cl"));
        assert_eq!(normalize("foo bar"), path(&[], "bar"));
        assert_eq!(normalize("x = "), path(&[], ""));
        assert_eq!(normalize("f(a,b"), path(&[], "b"));
    }

    #[test]
    fn test_empty_segments_are_kept() {
        assert_eq!(normalize(".x"), path(&[""], "x"));
        assert_eq!(normalize("a..b"), path(&["a", ""], "b"));
    }

    #[test]
    fn test_tabs_count_as_whitespace() {
        assert_eq!(normalize("x =\tio.wr"), path(&["io"], "wr"));
    }

    #[test]
    fn test_last_is_stable_under_renormalization() {
        for input in [
            "fo",
            "math . pi",
            "print(string.up",
            "a:b:c",
            "t[1].x",
            "  spaced  ",
            "weird#~^chars.x_y",
            "ünïcode.näme",
        ] {
            let last = normalize(input).last;
            assert_eq!(normalize(&last).last, last, "input {input:?}");
            assert!(normalize(&last).segments.is_empty());
        }
    }
}
