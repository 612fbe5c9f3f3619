pub fn truncate_utf8_prefix(value: &str, max_bytes: usize) -> String {
    if max_bytes == 0 {
        return String::new();
    }
    if value.len() <= max_bytes {
        return value.to_string();
    }
    let mut end = max_bytes;
    while end > 0 && !value.is_char_boundary(end) {
        end -= 1;
    }
    value[..end].to_string()
}

/// Last `/`-separated segment of a remote file path.
pub fn last_path_segment(path: &str) -> Option<&str> {
    path.rsplit('/').next().filter(|segment| !segment.is_empty())
}

#[cfg(test)]
mod tests {
    use super::{last_path_segment, truncate_utf8_prefix};

    #[test]
    fn truncate_utf8_prefix_does_not_split_utf8() {
        assert_eq!(truncate_utf8_prefix("ü-text", 1), "");
        assert_eq!(truncate_utf8_prefix("ü-text", 3), "ü-");
    }

    #[test]
    fn last_path_segment_of_file_path() {
        assert_eq!(last_path_segment("documents/file_3.pdf"), Some("file_3.pdf"));
        assert_eq!(last_path_segment("plain"), Some("plain"));
        assert_eq!(last_path_segment("dir/"), None);
    }
}
