use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

/// A CSI style escape introduced either by ESC or by a C1 control character,
/// followed by parameter, intermediate and final bytes.
static ESCAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\x1B[@-_]|[\x80-\x9F])[0-?]*[ -/]*[@-~]")
        .expect("constant regex pattern is valid")
});

/// Remove terminal escape sequences from a line of build output.
///
/// Dropping one sequence can splice its neighbours into a new one, so this
/// keeps stripping until nothing matches. Lines without escapes are returned
/// borrowed.
pub fn strip(line: &str) -> Cow<'_, str> {
    let mut out = Cow::Borrowed(line);
    while ESCAPE.is_match(&out) {
        out = Cow::Owned(ESCAPE.replace_all(&out, "").into_owned());
    }
    out
}

/// Split captured output into stripped lines. Carriage returns left over from
/// CRLF output are dropped along with the escapes.
pub fn lines(output: &str) -> Vec<String> {
    output
        .lines()
        .map(|line| strip(line).trim_end_matches('\r').to_owned())
        .collect()
}
