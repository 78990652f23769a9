use fdup::duplicates::{DuplicateFinder, FinderConfig, FinderError};
use fdup::scanner::{Hasher, Walker, WalkerConfig};
use std::fs::{self, File};
use std::io::Write;
use tempfile::tempdir;

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let finder = DuplicateFinder::with_defaults();

    let (groups, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 0);
    assert_eq!(summary.duplicate_groups, 0);
}

#[test]
fn test_scan_unique_files() {
    let dir = tempdir().unwrap();

    for (name, content) in [("a.txt", "content a"), ("b.txt", "content b"), ("c.txt", "content c")] {
        File::create(dir.path().join(name))
            .unwrap()
            .write_all(content.as_bytes())
            .unwrap();
    }

    let finder = DuplicateFinder::with_defaults();
    let (groups, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 3);
    assert_eq!(summary.unique_fingerprints, 3);
    assert_eq!(summary.duplicate_groups, 0);
}

#[test]
fn test_scan_duplicate_files() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"duplicate").unwrap();
    fs::write(dir.path().join("b.txt"), b"duplicate").unwrap();
    fs::write(dir.path().join("c.txt"), b"unique").unwrap();

    let finder = DuplicateFinder::with_defaults();
    let (groups, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].files.len(), 2);
    assert_eq!(groups[0].first(), Some(dir.path().join("a.txt").as_path()));
    assert_eq!(summary.total_files, 3);
    assert_eq!(summary.duplicate_groups, 1);
    assert_eq!(summary.duplicate_files, 1);
}

#[test]
fn test_scan_nested_directories() {
    let dir = tempdir().unwrap();
    let sub = dir.path().join("subdir");
    fs::create_dir(&sub).unwrap();

    fs::write(dir.path().join("a.txt"), b"same").unwrap();
    fs::write(sub.join("b.txt"), b"same").unwrap();

    let finder = DuplicateFinder::with_defaults();
    let (groups, _) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(
        groups[0].files,
        vec![dir.path().join("a.txt"), sub.join("b.txt")]
    );
}

#[test]
fn test_scan_very_deep_tree() {
    let dir = tempdir().unwrap();
    let mut deep = dir.path().to_path_buf();
    for i in 0..64 {
        deep = deep.join(format!("d{i}"));
    }
    fs::create_dir_all(&deep).unwrap();
    fs::write(dir.path().join("top.bin"), b"payload").unwrap();
    fs::write(deep.join("bottom.bin"), b"payload").unwrap();

    let finder = DuplicateFinder::with_defaults();
    let (groups, _) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(groups.len(), 1);
    assert!(groups[0].files.contains(&deep.join("bottom.bin")));
}

#[test]
fn test_empty_files_are_grouped() {
    let dir = tempdir().unwrap();
    File::create(dir.path().join("empty1")).unwrap();
    File::create(dir.path().join("empty2")).unwrap();

    let finder = DuplicateFinder::with_defaults();
    let (groups, _) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].fingerprint, Hasher::new().fingerprint_bytes(b""));
}

#[test]
fn test_same_size_different_content_not_grouped() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), b"abcd").unwrap();
    fs::write(dir.path().join("b"), b"abce").unwrap();

    let finder = DuplicateFinder::with_defaults();
    let (groups, _) = finder.find_duplicates(dir.path()).unwrap();

    assert!(groups.is_empty());
}

#[test]
fn test_groups_follow_discovery_order() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("1"), b"second-content").unwrap();
    fs::write(dir.path().join("2"), b"first-content").unwrap();
    fs::write(dir.path().join("3"), b"first-content").unwrap();
    fs::write(dir.path().join("4"), b"second-content").unwrap();

    let finder = DuplicateFinder::with_defaults();
    let (groups, _) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].first(), Some(dir.path().join("1").as_path()));
    assert_eq!(groups[1].first(), Some(dir.path().join("2").as_path()));
}

#[test]
fn test_multiple_threads_produce_identical_groups() {
    let dir = tempdir().unwrap();
    for i in 0..50 {
        let sub = dir.path().join(format!("sub{}", i % 5));
        fs::create_dir_all(&sub).unwrap();
        fs::write(sub.join(format!("{i}.dat")), vec![(i % 7) as u8; 2048]).unwrap();
    }

    let base = DuplicateFinder::with_defaults().find_duplicates(dir.path()).unwrap().0;
    for threads in [2, 4, 8] {
        let config = FinderConfig::default()
            .with_io_threads(threads)
            .with_walker_config(WalkerConfig::new(false, threads));
        let (groups, _) = DuplicateFinder::new(config).find_duplicates(dir.path()).unwrap();
        assert_eq!(groups, base);
    }
}

#[test]
fn test_small_buffer_matches_default() {
    let dir = tempdir().unwrap();
    let data: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
    fs::write(dir.path().join("a"), &data).unwrap();
    fs::write(dir.path().join("b"), &data).unwrap();

    let small = DuplicateFinder::new(FinderConfig::default().with_buffer_size(7));
    let (small_groups, _) = small.find_duplicates(dir.path()).unwrap();
    let (default_groups, _) = DuplicateFinder::with_defaults().find_duplicates(dir.path()).unwrap();

    assert_eq!(small_groups, default_groups);
}

#[test]
fn test_streaming_and_full_map_agree() {
    let dir = tempdir().unwrap();
    for i in 0..12 {
        fs::write(dir.path().join(format!("f{i:02}")), format!("{}", i % 3)).unwrap();
    }
    let finder = DuplicateFinder::with_defaults();

    let (groups, _) = finder.find_duplicates(dir.path()).unwrap();
    let pairs: Vec<_> = finder
        .stream_duplicates(dir.path())
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    let from_groups: Vec<_> = groups
        .iter()
        .flat_map(|g| g.pairs().map(|(o, d)| (o.to_path_buf(), d.to_path_buf())))
        .collect();
    let mut from_stream: Vec<_> = pairs.into_iter().map(|p| (p.original, p.duplicate)).collect();
    let mut from_groups_sorted = from_groups.clone();
    from_groups_sorted.sort();
    from_stream.sort();

    assert_eq!(from_groups_sorted, from_stream);
    assert_eq!(from_stream.len(), 9);
}

#[test]
fn test_walker_and_finder_see_same_files() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("x")).unwrap();
    fs::write(dir.path().join("x/1"), b"1").unwrap();
    fs::write(dir.path().join("2"), b"2").unwrap();

    let walked = Walker::new(dir.path(), WalkerConfig::default()).walk().count();
    let (_, summary) = DuplicateFinder::with_defaults().find_duplicates(dir.path()).unwrap();

    assert_eq!(walked, summary.total_files);
}

#[test]
fn test_scan_non_existent_path() {
    let dir = tempdir().unwrap();
    let finder = DuplicateFinder::with_defaults();

    let result = finder.find_duplicates(&dir.path().join("nope"));
    assert!(matches!(result, Err(FinderError::PathNotFound(_))));
}

#[test]
fn test_scan_file_instead_of_directory() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("file.txt");
    fs::write(&file, b"x").unwrap();

    let finder = DuplicateFinder::with_defaults();
    let result = finder.find_duplicates(&file);
    assert!(matches!(result, Err(FinderError::NotADirectory(_))));
}
