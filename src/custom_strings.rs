// /src/custom_strings.rs
use heapless::String;

/// Returns the substring after `delimiter`, if present.
pub fn extract_after_delimiter<'a>(input: &'a str, delimiter: &str) -> Option<&'a str> {
    input.split_once(delimiter).map(|(_, suffix)| suffix)
}

/// Iterates the contents of the double-quoted fields of a response line,
/// in order.
///
/// Example:
/// ```
/// let line = r#"+CMGR: "REC UNREAD","+15551234567","","24/01/01,12:00:00""#;
/// let mut fields = quoted_fields(line);
/// assert_eq!(fields.next(), Some("REC UNREAD"));
/// assert_eq!(fields.next(), Some("+15551234567"));
/// ```
pub fn quoted_fields(input: &str) -> impl Iterator<Item = &str> {
    input.split('"').skip(1).step_by(2)
}

/// Parses the run of decimal digits a line ends with, if any.
pub fn trailing_integer(input: &str) -> Option<u32> {
    let bytes = input.as_bytes();
    let mut start = bytes.len();
    while start > 0 && bytes[start - 1].is_ascii_digit() {
        start -= 1;
    }
    if start == bytes.len() {
        return None;
    }
    input[start..].parse().ok()
}

/// Copies `input` into a fixed-capacity string, dropping whatever does
/// not fit.
pub fn copy_truncated<const N: usize>(input: &str) -> String<N> {
    let mut out = String::new();
    for c in input.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn after_delimiter_splits_on_first_match() {
        assert_eq!(extract_after_delimiter("+CLCC: 1,1,4", "+CLCC: "), Some("1,1,4"));
        assert_eq!(extract_after_delimiter("no match here", "+CLCC: "), None);
    }

    #[test]
    fn quoted_fields_in_order() {
        let line = r#"+CLCC: 1,1,4,0,0,"+15551234567",145,"Home""#;
        let fields: Vec<&str> = quoted_fields(line).collect();
        assert_eq!(fields, vec!["+15551234567", "Home"]);
    }

    #[test]
    fn quoted_fields_handles_empty_fields() {
        let fields: Vec<&str> = quoted_fields(r#"a "" b "x""#).collect();
        assert_eq!(fields, vec!["", "x"]);
    }

    #[test]
    fn trailing_integer_takes_final_digit_run() {
        assert_eq!(trailing_integer(r#"+CMTI: "SM",3"#), Some(3));
        assert_eq!(trailing_integer(r#"+CMTI: "SM",42"#), Some(42));
        assert_eq!(trailing_integer("no digits"), None);
        assert_eq!(trailing_integer("12 in the middle"), None);
    }

    #[test]
    fn copy_truncated_respects_capacity() {
        let s: heapless::String<4> = copy_truncated("abcdef");
        assert_eq!(s.as_str(), "abcd");
    }
}
