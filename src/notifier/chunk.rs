//! Line-aware message chunker. Chat platforms cap single-message
//! size; this crate imposes an internal cap below the platform's own limit
//! to leave margin for the platform's own metadata.

/// Internal chunk size cap, in bytes. Below the reference chat platform's
/// 4096-byte message limit, leaving margin for its own framing.
pub const CHUNK_CAP: usize = 3900;

/// Split `message` into chunks no longer than `cap` bytes, preferring to
/// break on `\n` boundaries. A single line that itself exceeds `cap` is
/// hard-split at byte boundaries rather than emitted whole — the naive
/// "split on `\n` and glue" approach loses data when one line alone is
/// larger than the cap.
pub fn chunk(message: &str, cap: usize) -> Vec<String> {
    if message.len() <= cap {
        return vec![message.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();

    for line in message.split('\n') {
        let added_len = if current.is_empty() {
            line.len()
        } else {
            current.len() + 1 + line.len()
        };

        if added_len <= cap {
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(line);
            continue;
        }

        if !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
        }

        if line.len() <= cap {
            current.push_str(line);
        } else {
            let mut rest = line;
            while rest.len() > cap {
                let split_at = floor_char_boundary(rest, cap);
                chunks.push(rest[..split_at].to_string());
                rest = &rest[split_at..];
            }
            current.push_str(rest);
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

/// Largest byte index `<= cap` that lands on a UTF-8 char boundary, so a
/// hard split never slices a multi-byte character in half.
fn floor_char_boundary(s: &str, cap: usize) -> usize {
    let mut idx = cap.min(s.len());
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_message_is_a_single_chunk() {
        let chunks = chunk("hello", 3900);
        assert_eq!(chunks, vec!["hello".to_string()]);
    }

    #[test]
    fn every_chunk_respects_the_cap() {
        let line = "a".repeat(50);
        let message = std::iter::repeat(line).take(200).collect::<Vec<_>>().join("\n");
        let chunks = chunk(&message, 100);
        assert!(chunks.iter().all(|c| c.len() <= 100));
        assert!(chunks.len() > 1);
    }

    #[test]
    fn reconstruction_is_prefix_preserving() {
        let message = "line one\nline two\nline three";
        let chunks = chunk(message, 15);
        let joined = chunks.join("\n");
        assert_eq!(joined, message);
    }

    #[test]
    fn oversize_single_line_is_hard_split() {
        let line = "x".repeat(4000);
        let chunks = chunk(&line, 3900);
        assert!(chunks.len() >= 2);
        assert!(chunks.iter().all(|c| c.len() <= 3900));
        assert_eq!(chunks.concat(), line);
    }

    #[test]
    fn hard_split_respects_utf8_boundaries() {
        let line = "한".repeat(2000); // 3 bytes each in UTF-8
        let chunks = chunk(&line, 100);
        assert!(chunks.iter().all(|c| c.len() <= 100));
        for c in &chunks {
            assert!(std::str::from_utf8(c.as_bytes()).is_ok());
        }
        assert_eq!(chunks.concat(), line);
    }

    #[test]
    fn mixed_short_and_oversize_lines() {
        let message = format!("short line\n{}\nanother short line", "y".repeat(8000));
        let chunks = chunk(&message, 3900);
        assert!(chunks.iter().all(|c| c.len() <= 3900));
    }
}
