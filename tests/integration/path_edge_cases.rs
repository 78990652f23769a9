use fdup::duplicates::DuplicateFinder;
use fdup::output::{report_groups, NulOutput, TextOutput};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_paths_with_spaces_and_unicode() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("my file.txt"), b"content").unwrap();
    fs::write(dir.path().join("ファイル ✓.txt"), b"content").unwrap();

    let finder = DuplicateFinder::with_defaults();
    let (groups, _) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(groups.len(), 1);
    assert!(groups[0]
        .files
        .iter()
        .any(|f| f.to_string_lossy().contains("ファイル")));
}

#[cfg(unix)]
#[test]
fn test_paths_with_newlines_survive_nul_output() {
    let dir = tempdir().unwrap();
    let newline_name = "file_with\nnewline.txt";
    fs::write(dir.path().join("a.txt"), b"content").unwrap();
    fs::write(dir.path().join(newline_name), b"content").unwrap();

    let finder = DuplicateFinder::with_defaults();
    let (groups, _) = finder.find_duplicates(dir.path()).unwrap();

    let mut output = NulOutput::new(Vec::new());
    report_groups(&mut output, &groups).unwrap();
    let bytes = output.into_inner();

    let records: Vec<_> = bytes.split(|b| *b == 0).filter(|r| !r.is_empty()).collect();
    assert_eq!(records.len(), 1);
    assert!(String::from_utf8_lossy(records[0]).ends_with(newline_name));
}

#[cfg(unix)]
#[test]
fn test_paths_with_quotes_and_colons() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("file_with_\"quote\".txt"), b"content").unwrap();
    fs::write(dir.path().join("colon: name.txt"), b"content").unwrap();

    let finder = DuplicateFinder::with_defaults();
    let (groups, _) = finder.find_duplicates(dir.path()).unwrap();

    let mut output = TextOutput::new(Vec::new());
    report_groups(&mut output, &groups).unwrap();
    let text = String::from_utf8(output.into_inner()).unwrap();

    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[1].contains("colon: name.txt"));
    assert!(lines[1].contains("\"quote\""));
}

#[test]
fn test_dot_files_and_dot_directories_are_scanned() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join(".config")).unwrap();
    fs::write(dir.path().join(".config/settings"), b"same").unwrap();
    fs::write(dir.path().join(".profile"), b"same").unwrap();

    let finder = DuplicateFinder::with_defaults();
    let (groups, _) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 2);
}
