/// Flags that only affect diagnostics output and are dropped outright.
const BLOCKLIST: &[&str] = &["-nowarn", "-deprecation", "-verbose"];

/// Language levels modern javac refuses; they are raised to 1.8.
const UNSUPPORTED_RELEASES: &[&str] = &["1.5", "1.6", "1.7", "5", "6", "7"];

/// Reduce a raw javac argument string to the flags needed to recompile the
/// same sources elsewhere: output directory, source files, lint switches and
/// log decorations are removed.
pub fn filter(raw: &str) -> Vec<String> {
    let mut result = Vec::new();
    let mut tokens = raw.split(' ').filter(|t| !t.is_empty());

    while let Some(arg) = tokens.next() {
        if BLOCKLIST.contains(&arg)
            || arg.starts_with('(')
            || arg.starts_with('[')
            || arg.ends_with(".java")
            || arg.starts_with("-Xlint")
            || arg.starts_with("-Xdoclint")
            || arg.starts_with("-W")
        {
            continue;
        }
        if arg == "-d" {
            tokens.next();
            continue;
        }
        result.push(arg.to_owned());
        if arg == "-source" || arg == "-target" {
            if let Some(release) = tokens.next() {
                if UNSUPPORTED_RELEASES.contains(&release) {
                    result.push("1.8".to_owned());
                } else {
                    result.push(release.to_owned());
                }
            }
        }
    }

    result
}
