//! Node path utilities
//!
//! Nodes are addressed by slash-separated name paths such as
//! `Building/Floor/Lamp`. Selection patterns use `*` and `?` globs.

/// Normalize a node path
/// - Converts backslashes to forward slashes
/// - Removes redundant separators
/// - Ensures the result starts with /
pub fn normalize_path(path: &str) -> String {
    let path = path.replace('\\', "/");

    let components: Vec<&str> = path
        .trim()
        .split('/')
        .filter(|c| !c.is_empty() && *c != ".")
        .collect();

    format!("/{}", components.join("/"))
}

/// Check if a name or path matches a glob pattern
/// Supports * (any chars) and ? (single char)
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();
    glob_match_impl(&pattern, &text)
}

fn glob_match_impl(pattern: &[char], text: &[char]) -> bool {
    let mut p = 0;
    let mut t = 0;
    let mut star_p = None;
    let mut star_t = 0;

    while t < text.len() {
        if p < pattern.len() {
            match pattern[p] {
                '*' => {
                    star_p = Some(p);
                    star_t = t;
                    p += 1;
                    continue;
                }
                '?' => {
                    p += 1;
                    t += 1;
                    continue;
                }
                c if c == text[t] => {
                    p += 1;
                    t += 1;
                    continue;
                }
                _ => {}
            }
        }

        // Mismatch - backtrack to last star if any
        if let Some(sp) = star_p {
            p = sp + 1;
            star_t += 1;
            t = star_t;
            continue;
        }

        return false;
    }

    // Match remaining stars
    while p < pattern.len() && pattern[p] == '*' {
        p += 1;
    }

    p == pattern.len()
}

/// Whether a selection token contains glob characters
pub fn is_pattern(token: &str) -> bool {
    token.contains(['*', '?'])
}
