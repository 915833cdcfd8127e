/// Collapse internal whitespace, strip control characters, trim — the text
/// normalization that happens "before diffing" (§4.1). Casing and
/// punctuation are never touched.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;

    for c in text.chars() {
        if c.is_control() {
            continue;
        }
        if c.is_whitespace() {
            if !out.is_empty() {
                pending_space = true;
            }
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        out.push(c);
    }

    out
}

/// Continuation overlap repair (§4.1): when `incoming` does not start with
/// `prior` but shares a ≥80% normalized common prefix with it, splice at the
/// first divergence so a late-arriving correction doesn't discard the part of
/// `prior` that already matched. Below that threshold the match is too
/// ambiguous to trust, so `incoming` replaces `prior` wholesale.
///
/// Both arguments are expected to already be normalized (see [`normalize`]);
/// the spliced result inherits whatever casing/punctuation the inputs carry.
pub fn repair_continuation(prior: &str, incoming: &str) -> String {
    if prior.is_empty() || incoming.starts_with(prior) {
        return incoming.to_string();
    }

    let prior_chars: Vec<char> = prior.chars().collect();
    let incoming_chars: Vec<char> = incoming.chars().collect();

    let common = prior_chars
        .iter()
        .zip(incoming_chars.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let ratio = common as f64 / prior_chars.len() as f64;
    if ratio >= 0.8 {
        let prefix: String = prior_chars[..common].iter().collect();
        let suffix: String = incoming_chars[common..].iter().collect();
        format!("{prefix}{suffix}")
    } else {
        incoming.to_string()
    }
}
