fn normalize_token(value: &str) -> String {
    value
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }
    let b_chars: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a.chars().count();
    }

    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr = vec![0; b_chars.len() + 1];
    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b_chars.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b_chars.len()]
}

fn score_candidate(input: &str, candidate: &str) -> Option<usize> {
    let a = normalize_token(input);
    let b = normalize_token(candidate);
    if a.is_empty() || b.is_empty() {
        return None;
    }
    if a == b {
        return Some(0);
    }
    if a.contains(&b) || b.contains(&a) {
        return Some(1);
    }
    let allowed = match a.len() {
        0..=4 => 1,
        5..=8 => 2,
        len => ((len as f32) * 0.35).floor().max(3.0) as usize,
    };
    let distance = levenshtein(&a, &b);
    (distance <= allowed).then_some(distance)
}

/// Closest known names to `input`, best first.
pub fn suggest(input: &str, candidates: &[&str], limit: usize) -> Vec<String> {
    if input.trim().is_empty() {
        return Vec::new();
    }
    let mut scored: Vec<(&str, usize)> = candidates
        .iter()
        .filter_map(|candidate| score_candidate(input, candidate).map(|s| (*candidate, s)))
        .collect();
    scored.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.len().cmp(&b.0.len())));
    scored.dedup_by(|a, b| a.0 == b.0);
    scored
        .into_iter()
        .take(limit.max(1))
        .map(|(name, _)| name.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::suggest;

    #[test]
    fn suggests_close_operation_names() {
        let known = ["sendMessage", "sendPhoto", "sendPoll", "deleteMessage"];
        assert_eq!(suggest("sendMesage", &known, 3), vec!["sendMessage"]);
        assert_eq!(suggest("send_photo", &known, 3)[0], "sendPhoto");
        assert!(suggest("zzz", &known, 3).is_empty());
    }
}
