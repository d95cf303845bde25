use url::Url;

/// Extracts the `rel="next"` target from an RFC 8288 `Link` header value,
/// resolving relative references against `base`.
pub fn next_link(header: &str, base: &Url) -> Option<Url> {
    for entry in split_entries(header) {
        let mut parts = entry.split(';');
        let target = parts.next()?.trim();
        let Some(target) = target
            .strip_prefix('<')
            .and_then(|rest| rest.strip_suffix('>'))
        else {
            continue;
        };
        let is_next = parts.any(|param| {
            let Some((name, value)) = param.split_once('=') else {
                return false;
            };
            name.trim().eq_ignore_ascii_case("rel")
                && value
                    .trim()
                    .trim_matches('"')
                    .split_whitespace()
                    .any(|rel| rel.eq_ignore_ascii_case("next"))
        });
        if is_next {
            return base.join(target).ok();
        }
    }
    None
}

// Commas inside `<...>` belong to the URL.
fn split_entries(header: &str) -> Vec<&str> {
    let mut entries = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (idx, ch) in header.char_indices() {
        match ch {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                entries.push(&header[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    entries.push(&header[start..]);
    entries
        .into_iter()
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use url::Url;

    use super::next_link;

    fn base() -> Url {
        Url::parse("https://canvas.example.edu/api/v1/courses/1/quizzes").unwrap()
    }

    #[test]
    fn finds_next_among_canvas_relations() {
        let header = "<https://canvas.example.edu/api/v1/courses/1/quizzes?page=1&per_page=10>; rel=\"current\",\
            <https://canvas.example.edu/api/v1/courses/1/quizzes?page=2&per_page=10>; rel=\"next\",\
            <https://canvas.example.edu/api/v1/courses/1/quizzes?page=1&per_page=10>; rel=\"first\",\
            <https://canvas.example.edu/api/v1/courses/1/quizzes?page=5&per_page=10>; rel=\"last\"";
        let next = next_link(header, &base()).unwrap();
        assert_eq!(next.query(), Some("page=2&per_page=10"));
    }

    #[test]
    fn no_next_relation_ends_pagination() {
        let header = "<https://canvas.example.edu/x?page=1>; rel=\"first\", <https://canvas.example.edu/x?page=3>; rel=\"last\"";
        assert!(next_link(header, &base()).is_none());
        assert!(next_link("", &base()).is_none());
    }

    #[test]
    fn relative_targets_resolve_against_base() {
        let next = next_link("</api/v1/courses/1/quizzes?page=2>; rel=next", &base()).unwrap();
        assert_eq!(
            next.as_str(),
            "https://canvas.example.edu/api/v1/courses/1/quizzes?page=2"
        );
    }

    #[test]
    fn rel_may_list_several_relations() {
        let next = next_link("<https://a.example/p2>; rel=\"last next\"", &base()).unwrap();
        assert_eq!(next.as_str(), "https://a.example/p2");
    }

    #[test]
    fn commas_inside_target_are_kept() {
        let next = next_link("<https://a.example/p?ids=1,2>; rel=\"next\"", &base()).unwrap();
        assert_eq!(next.query(), Some("ids=1,2"));
    }
}
