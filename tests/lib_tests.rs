use std::collections::HashMap;
use std::path::PathBuf;

use tagpipe::engine::{
    TagMatcher, glob_match, hash_bytes, hash_file, is_excluded, is_valid_json, path_relative_to,
    path_to_display_string, to_hex, trim_line_ending,
};
use tagpipe::pipeline::{Aggregate, CancelToken, FirstError, RunError, TagTally, Total};
use tagpipe::utils::tagpipe_toml::{apply_file_to_opts, parse_tagpipe_toml};
use tagpipe::{ErrorPolicy, Opts, TagCount};

// --- path_relative_to / path_to_display_string ---

#[test]
fn test_path_relative_under_base() {
    let base = PathBuf::from("/foo/bar");
    let path = PathBuf::from("/foo/bar/baz/qux");
    assert_eq!(
        path_relative_to(&path, &base),
        Some(PathBuf::from("baz/qux"))
    );
}

#[test]
fn test_path_relative_not_under_base() {
    let base = PathBuf::from("/foo/bar");
    let path = PathBuf::from("/other/qux");
    assert_eq!(path_relative_to(&path, &base), None);
}

#[test]
fn test_path_to_display_string_normalizes_backslashes() {
    assert_eq!(
        path_to_display_string(&PathBuf::from("src\\main.rs")),
        "src/main.rs"
    );
}

#[test]
fn test_trim_line_ending() {
    assert_eq!(trim_line_ending(b"abc\n"), b"abc");
    assert_eq!(trim_line_ending(b"abc\r\n"), b"abc");
    assert_eq!(trim_line_ending(b"abc"), b"abc");
    assert_eq!(trim_line_ending(b"\n"), b"");
}

// --- glob_match / is_excluded ---

#[test]
fn test_glob_match_literal() {
    assert!(glob_match("target", "target"));
    assert!(!glob_match("target", "targets"));
}

#[test]
fn test_glob_match_star() {
    assert!(glob_match("*.log", "foo.log"));
    assert!(glob_match("*.log", ".log"));
    assert!(!glob_match("*.log", "foo.log.txt"));
    assert!(glob_match("node_*", "node_modules"));
    assert!(glob_match("a*b*c", "aXXbYYc"));
    assert!(!glob_match("a*b*c", "aXXbYY"));
}

#[test]
fn test_glob_match_question_mark() {
    assert!(glob_match("?.txt", "a.txt"));
    assert!(!glob_match("?.txt", "ab.txt"));
}

#[test]
fn test_is_excluded_component() {
    let pats = vec!["node_modules".to_string()];
    assert!(is_excluded(&PathBuf::from("web/node_modules/x.js"), &pats));
    assert!(!is_excluded(&PathBuf::from("web/src/x.js"), &pats));
}

#[test]
fn test_is_excluded_file_glob() {
    let pats = vec!["*.log".to_string()];
    assert!(is_excluded(&PathBuf::from("a/b/run.log"), &pats));
    assert!(!is_excluded(&PathBuf::from("a/b/run.txt"), &pats));
}

#[test]
fn test_is_excluded_empty_patterns() {
    assert!(!is_excluded(&PathBuf::from("anything"), &[]));
}

// --- hashing ---

#[test]
fn test_hash_file_matches_hash_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("a.txt");
    std::fs::write(&p, "hello").unwrap();
    assert_eq!(hash_file(&p).unwrap(), hash_bytes(b"hello"));
    assert_ne!(hash_bytes(b"hello"), hash_bytes(b"world"));
}

#[test]
fn test_hash_file_missing_is_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(hash_file(&dir.path().join("nope")).is_err());
}

#[test]
fn test_to_hex_is_64_lowercase_chars() {
    let hex = to_hex(&hash_bytes(b""));
    assert_eq!(hex.len(), 64);
    assert!(hex.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
}

// --- validate ---

#[test]
fn test_is_valid_json() {
    assert!(is_valid_json(r#"{"a": [1, 2, {"b": null}]}"#));
    assert!(is_valid_json("42"));
    assert!(is_valid_json(r#""str""#));
    assert!(!is_valid_json("{a: 1}"));
    assert!(!is_valid_json(""));
    assert!(!is_valid_json(r#"{"a": 1"#));
}

// --- TagMatcher ---

#[test]
fn test_matcher_default_pattern() {
    let m = TagMatcher::from_pattern(None).unwrap();
    assert!(m.is_match("abc 123"));
    assert!(!m.is_match("123 456"));
    assert_eq!(m.line_hit("x"), 1);
    assert_eq!(m.line_hit("1"), 0);
}

#[test]
fn test_matcher_invalid_pattern() {
    assert!(TagMatcher::new("([").is_err());
}

#[test]
fn test_matcher_tally() {
    let m = TagMatcher::new(r"#\w+").unwrap();
    let t = m.tally("#rust is #fast and #rust is #safe");
    assert_eq!(t.get("#rust"), Some(&2));
    assert_eq!(t.get("#fast"), Some(&1));
    assert_eq!(t.get("#safe"), Some(&1));
    assert_eq!(t.len(), 3);
}

#[test]
fn test_matcher_count_lines_in_binary_file() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("blob.bin");
    std::fs::write(&p, b"\xff\xfeok\r\n\x00\x01\nlast").unwrap();
    let m = TagMatcher::from_pattern(None).unwrap();
    assert_eq!(m.count_lines_in_file(&p).unwrap(), 2);
    assert!(m.count_lines_in_file(&dir.path().join("missing")).is_err());
}

// --- aggregates ---

#[test]
fn test_total_sums() {
    let mut t = Total::default();
    for v in [1u64, 0, 1, 1] {
        t.merge(0usize, v);
    }
    assert_eq!(t, Total(3));
}

#[test]
fn test_tag_tally_merges_and_sorts_ascending() {
    let mut tally = TagTally::default();
    tally.merge(
        PathBuf::from("a"),
        HashMap::from([("x".to_string(), 3), ("y".to_string(), 1)]),
    );
    tally.merge(
        PathBuf::from("b"),
        HashMap::from([("x".to_string(), 1), ("z".to_string(), 2)]),
    );
    assert_eq!(tally.get("x"), 4);
    assert_eq!(tally.get("missing"), 0);
    assert_eq!(
        tally.sorted(),
        vec![
            TagCount {
                tag: "y".into(),
                count: 1
            },
            TagCount {
                tag: "z".into(),
                count: 2
            },
            TagCount {
                tag: "x".into(),
                count: 4
            },
        ]
    );
}

// --- cancellation / first error ---

#[test]
fn test_cancel_token_closes_once() {
    let token = CancelToken::new();
    let other = token.clone();
    assert!(!token.is_cancelled());
    assert!(other.cancel());
    assert!(!token.cancel());
    assert!(token.is_cancelled());
    // done() stays disconnected after close
    assert!(matches!(
        token.done().try_recv(),
        Err(crossbeam_channel::TryRecvError::Disconnected)
    ));
    token.wait();
}

#[test]
fn test_cancel_guard_closes_on_drop() {
    let token = CancelToken::new();
    {
        let _g = token.guard();
        assert!(!token.is_cancelled());
    }
    assert!(token.is_cancelled());
}

#[test]
fn test_cancel_wakes_blocked_waiter() {
    let token = CancelToken::new();
    let waiter = token.clone();
    let (tx, rx) = crossbeam_channel::bounded(1);
    let h = std::thread::spawn(move || {
        waiter.wait();
        tx.send(()).unwrap();
    });
    token.cancel();
    rx.recv_timeout(std::time::Duration::from_secs(5))
        .expect("waiter should wake");
    h.join().unwrap();
}

#[test]
fn test_first_error_keeps_first() {
    let slot = FirstError::new();
    assert!(slot.record(RunError::Walk {
        msg: "first".into(),
        path: None
    }));
    assert!(!slot.record(RunError::Canceled));
    match slot.into_inner() {
        Some(RunError::Walk { msg, .. }) => assert_eq!(msg, "first"),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_first_error_concurrent_records_exactly_one() {
    let slot = FirstError::new();
    let wins = std::sync::atomic::AtomicUsize::new(0);
    std::thread::scope(|s| {
        for i in 0..16 {
            let slot = &slot;
            let wins = &wins;
            s.spawn(move || {
                if slot.record(RunError::Item {
                    label: format!("item{i}"),
                    msg: "boom".into(),
                }) {
                    wins.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                }
            });
        }
    });
    assert_eq!(wins.into_inner(), 1);
    assert!(slot.is_set());
}

// --- .tagpipe.toml ---

#[test]
fn test_toml_applies_present_fields_only() {
    let file = parse_tagpipe_toml(
        r##"
[settings]
workers = 5
exclude = ["target", "*.log"]
tolerant = true
pattern = "#\\w+"
"##,
    )
    .unwrap();
    let mut opts = Opts::default();
    opts.pipe.follow_links = true;
    apply_file_to_opts(&file, &mut opts);
    assert_eq!(opts.pipe.num_workers, Some(5));
    assert_eq!(opts.pipe.exclude, vec!["target", "*.log"]);
    assert_eq!(opts.pipe.error_policy, ErrorPolicy::Tolerant);
    assert_eq!(opts.pattern.as_deref(), Some(r"#\w+"));
    assert!(opts.pipe.follow_links);
    assert!(!opts.pipe.parallel_walk);
}

#[test]
fn test_toml_rejects_unknown_setting() {
    assert!(parse_tagpipe_toml("[settings]\nbogus = 1\n").is_err());
}

#[test]
fn test_toml_empty_is_default() {
    let file = parse_tagpipe_toml("").unwrap();
    let mut opts = Opts::default();
    apply_file_to_opts(&file, &mut opts);
    assert_eq!(opts.pipe.num_workers, None);
    assert_eq!(opts.pipe.error_policy, ErrorPolicy::FailFast);
}
