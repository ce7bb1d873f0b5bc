/// Turns a stored image reference into a URL clients can load.
///
/// Absolute `http(s)` references pass through; relative ones are joined onto
/// `base_url`. Blank references resolve to nothing.
pub fn resolve_url(base_url: &str, reference: &str) -> Option<String> {
    let reference = reference.trim();
    if reference.is_empty() {
        return None;
    }
    if reference.starts_with("https://") || reference.starts_with("http://") {
        return Some(reference.to_string());
    }
    Some(format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        reference.trim_start_matches('/')
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_relative_references() {
        assert_eq!(
            resolve_url("http://localhost:9000/spark-media/", "/photos/1.jpg").as_deref(),
            Some("http://localhost:9000/spark-media/photos/1.jpg")
        );
        assert_eq!(
            resolve_url("http://localhost:9000", "photos/1.jpg").as_deref(),
            Some("http://localhost:9000/photos/1.jpg")
        );
    }

    #[test]
    fn absolute_references_pass_through() {
        let url = "https://images.example.org/a.png";
        assert_eq!(resolve_url("http://localhost:9000", url).as_deref(), Some(url));
    }

    #[test]
    fn blank_reference_resolves_to_none() {
        assert_eq!(resolve_url("http://localhost:9000", ""), None);
        assert_eq!(resolve_url("http://localhost:9000", "   "), None);
    }
}
