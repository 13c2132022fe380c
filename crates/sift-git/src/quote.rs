//! Git's C-style path quoting (`core.quotePath`).

/// Decode a git-quoted path such as `"caf\303\251 menu.txt"`.
///
/// Input without surrounding quotes is returned unchanged.
pub(crate) fn unquote(raw: &str) -> String {
    let Some(inner) = raw
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    else {
        return raw.to_string();
    };

    let bytes = inner.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b != b'\\' || i + 1 >= bytes.len() {
            out.push(b);
            i += 1;
            continue;
        }

        let next = bytes[i + 1];
        match next {
            b'0'..=b'7' => {
                let digits = bytes[i + 1..]
                    .iter()
                    .take(3)
                    .take_while(|d| (b'0'..=b'7').contains(d))
                    .count();
                let value = bytes[i + 1..i + 1 + digits]
                    .iter()
                    .fold(0u32, |acc, d| acc * 8 + u32::from(d - b'0'));
                out.push(u8::try_from(value).unwrap_or(b'?'));
                i += 1 + digits;
                continue;
            }
            b'a' => out.push(0x07),
            b'b' => out.push(0x08),
            b'f' => out.push(0x0c),
            b'n' => out.push(b'\n'),
            b'r' => out.push(b'\r'),
            b't' => out.push(b'\t'),
            b'v' => out.push(0x0b),
            other => out.push(other),
        }
        i += 2;
    }

    String::from_utf8_lossy(&out).into_owned()
}

/// Split one leading path token off `input`, honoring quoting.
///
/// Returns the decoded token and the remainder after the separating space.
pub(crate) fn split_token(input: &str) -> Option<(String, &str)> {
    if input.starts_with('"') {
        let bytes = input.as_bytes();
        let mut i = 1;
        while i < bytes.len() {
            match bytes[i] {
                b'\\' => i += 2,
                b'"' => {
                    let token = unquote(&input[..=i]);
                    let rest = input[i + 1..].strip_prefix(' ').unwrap_or(&input[i + 1..]);
                    return Some((token, rest));
                }
                _ => i += 1,
            }
        }
        None
    } else {
        match input.split_once(' ') {
            Some((token, rest)) => Some((token.to_string(), rest)),
            None => Some((input.to_string(), "")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_unquote_plain() {
        assert_eq!(unquote("src/main.rs"), "src/main.rs");
    }

    #[test]
    fn test_unquote_octal_utf8() {
        assert_eq!(unquote(r#""caf\303\251.txt""#), "café.txt");
    }

    #[test]
    fn test_unquote_escapes() {
        assert_eq!(unquote(r#""tab\there""#), "tab\there");
        assert_eq!(unquote(r#""quote\"d""#), "quote\"d");
        assert_eq!(unquote(r#""back\\slash""#), "back\\slash");
    }

    #[test]
    fn test_split_token_quoted() {
        let (token, rest) = split_token(r#""a/with space" "b/with space""#).unwrap();
        assert_eq!(token, "a/with space");
        assert_eq!(rest, r#""b/with space""#);
    }
}
