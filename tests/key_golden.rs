
use casebook::core::input::{matches_key, parse_key};

#[test]
fn key_vectors_match_fixture() {
    let raw = fixture::read_fixture("key_vectors.tsv");
    for (idx, line) in raw.lines().enumerate() {
        let line_num = idx + 1;
        let line = line.trim_end();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let parts: Vec<&str> = line.split('\t').collect();
        let kind = parts.first().copied().unwrap_or("");
        match kind {
            "parse" => {
                assert!(
                    parts.len() == 3,
                    "line {line_num}: expected 3 columns for parse, got {}",
                    parts.len()
                );
                let input = fixture::unescape(parts[1]);
                let expected = match parts[2].trim() {
                    "none" => None,
                    key_id => Some(key_id.to_string()),
                };
                let actual = parse_key(&input);
                assert_eq!(
                    actual, expected,
                    "line {line_num}: parse_key({input:?}) mismatch"
                );
            }
            "match" => {
                assert!(
                    parts.len() == 4,
                    "line {line_num}: expected 4 columns for match, got {}",
                    parts.len()
                );
                let input = fixture::unescape(parts[1]);
                let key_id = parts[2];
                let expected = match parts[3].trim() {
                    "true" => true,
                    "false" => false,
                    other => panic!("line {line_num}: invalid expected value {other}"),
                };
                let actual = matches_key(&input, key_id);
                assert_eq!(
                    actual, expected,
                    "line {line_num}: matches_key({input:?}, {key_id:?}) mismatch"
                );
            }
            other => panic!("line {line_num}: unknown kind {other}"),
        }
    }
}
