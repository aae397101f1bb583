/// Indices of every line containing any of `markers`, in line order.
pub fn find_markers<S: AsRef<str>>(lines: &[S], markers: &[&str]) -> Vec<usize> {
    lines
        .iter()
        .enumerate()
        .filter(|(_, line)| markers.iter().any(|m| line.as_ref().contains(m)))
        .map(|(i, _)| i)
        .collect()
}

/// Walk backwards from `from` (inclusive) to the first line and return the
/// index of the nearest line satisfying `pred`.
pub fn rfind<S, P>(lines: &[S], from: usize, pred: P) -> Option<usize>
where
    S: AsRef<str>,
    P: Fn(&str) -> bool,
{
    let end = from.checked_add(1)?.min(lines.len());
    lines[..end].iter().rposition(|line| pred(line.as_ref()))
}
