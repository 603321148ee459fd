/// One `url descriptor` entry of a `srcset` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SrcsetCandidate {
    pub url: String,
    /// Width in pixels for `w` descriptors, density x 1000 for `x` descriptors.
    pub score: u64,
}

pub fn parse_srcset(srcset: &str) -> Vec<SrcsetCandidate> {
    srcset
        .split(',')
        .filter_map(|entry| {
            let mut parts = entry.split_whitespace();
            let url = parts.next()?;
            let score = parts.next().map(descriptor_score).unwrap_or(0);
            Some(SrcsetCandidate {
                url: url.to_string(),
                score,
            })
        })
        .collect()
}

/// Highest-scoring candidate URL; on equal scores the earliest entry wins.
pub fn pick_best_from_srcset(srcset: &str) -> Option<String> {
    let mut best: Option<SrcsetCandidate> = None;
    for candidate in parse_srcset(srcset) {
        match &best {
            Some(current) if candidate.score <= current.score => {}
            _ => best = Some(candidate),
        }
    }
    best.map(|c| c.url)
}

fn descriptor_score(descriptor: &str) -> u64 {
    if let Some(width) = descriptor.strip_suffix('w') {
        leading_number(width)
            .and_then(|n| n.parse::<f64>().ok())
            .map(|n| n.trunc().max(0.0) as u64)
            .unwrap_or(0)
    } else if let Some(density) = descriptor.strip_suffix('x') {
        leading_number(density)
            .and_then(|n| n.parse::<f64>().ok())
            .map(|n| (n * 1000.0).round().max(0.0) as u64)
            .unwrap_or(0)
    } else {
        0
    }
}

/// Longest prefix that reads as a decimal number (`"1.5"` out of `"1.5foo"`).
fn leading_number(raw: &str) -> Option<&str> {
    let mut seen_dot = false;
    let end = raw
        .char_indices()
        .find(|&(_, c)| {
            if c == '.' && !seen_dot {
                seen_dot = true;
                false
            } else {
                !c.is_ascii_digit()
            }
        })
        .map(|(i, _)| i)
        .unwrap_or(raw.len());
    let number = &raw[..end];
    number.chars().any(|c| c.is_ascii_digit()).then_some(number)
}
