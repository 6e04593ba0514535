//! Plain-text input sanitisation for request parameters

/// Reduce untrusted input to a single line of plain text
///
/// Removes markup tags and percent-encoded octets, turns control characters
/// (including line breaks and tabs) into spaces, collapses runs of
/// whitespace and trims. A `<` that does not open a tag is kept.
pub fn sanitize_text_field(input: &str) -> String {
    let without_tags = strip_tags(input);
    let without_octets = strip_octets(&without_tags);

    without_octets
        .split(|c: char| c.is_whitespace() || c.is_control())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn strip_tags(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        let opens_tag = c == '<'
            && chars
                .peek()
                .is_some_and(|&(_, next)| next.is_ascii_alphabetic() || matches!(next, '/' | '!' | '?'));

        if !opens_tag {
            out.push(c);
            continue;
        }

        // An unterminated tag swallows the rest of the input
        match input[i..].find('>') {
            Some(end) => {
                let close = i + end;
                while chars.peek().is_some_and(|&(j, _)| j <= close) {
                    chars.next();
                }
            },
            None => break,
        }
    }

    out
}

fn strip_octets(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;

    while i < input.len() {
        if bytes[i] == b'%'
            && bytes.get(i + 1).is_some_and(u8::is_ascii_hexdigit)
            && bytes.get(i + 2).is_some_and(u8::is_ascii_hexdigit)
        {
            i += 3;
            continue;
        }

        // `i` always sits on a char boundary here
        let Some(c) = input[i..].chars().next() else {
            break;
        };
        out.push(c);
        i += c.len_utf8();
    }

    out
}
