//! Glob matching for member selection

use crate::utils::file_name;

/// Case-insensitive glob match supporting `*` and `?`.
///
/// `*` crosses `/`, so `*.skin` matches at any depth.
pub fn matches_glob(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();

    let (mut pi, mut ti) = (0, 0);
    // Position of the last `*` and the text index it is currently absorbing up to.
    let mut backtrack: Option<(usize, usize)> = None;

    while ti < text.len() {
        match pattern.get(pi) {
            Some('*') => {
                backtrack = Some((pi, ti));
                pi += 1;
            }
            Some(&c) if c == '?' || c.eq_ignore_ascii_case(&text[ti]) => {
                pi += 1;
                ti += 1;
            }
            _ => match backtrack {
                Some((star, absorbed)) => {
                    pi = star + 1;
                    ti = absorbed + 1;
                    backtrack = Some((star, absorbed + 1));
                }
                None => return false,
            },
        }
    }

    pattern[pi..].iter().all(|&c| c == '*')
}

/// A member matches if any pattern matches its full path or its file name.
/// No patterns means everything matches.
pub fn member_matches<S: AsRef<str>>(patterns: &[S], member: &str) -> bool {
    if patterns.is_empty() {
        return true;
    }
    let name = file_name(member);
    patterns.iter().any(|p| {
        let p = p.as_ref();
        matches_glob(p, member) || matches_glob(p, name)
    })
}
