use envoy_server::metadata::load_manifest;
use envoy_server::wheel::{build_wheel, record_digest, retag_wheel, BundledArtifact};
use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn read_wheel(path: &Path) -> HashMap<String, (Vec<u8>, Option<u32>)> {
    let file = std::fs::File::open(path).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    let mut entries = HashMap::new();
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).unwrap();
        let mut data = Vec::new();
        entry.read_to_end(&mut data).unwrap();
        entries.insert(entry.name().to_string(), (data, entry.unix_mode()));
    }
    entries
}

#[tokio::test]
async fn test_build_then_retag_for_linux() {
    let dir = tempfile::tempdir().unwrap();
    let binary = dir.path().join("envoy");
    std::fs::write(&binary, b"\x7fELF fake proxy").unwrap();
    let out_dir = dir.path().join("dist");

    let manifest = load_manifest(&fixture("pyproject.toml")).unwrap();
    let universal = build_wheel(&manifest, &binary, &out_dir).await.unwrap();
    assert_eq!(
        universal.file_name().unwrap(),
        "envoy_server-1.36.2.post1-py3-none-any.whl"
    );

    let tagged = retag_wheel(&universal, "manylinux_2_31_x86_64").await.unwrap();
    assert_eq!(
        tagged.file_name().unwrap(),
        "envoy_server-1.36.2.post1-py3-none-manylinux_2_31_x86_64.whl"
    );
    assert!(!universal.exists(), "untagged wheel should be removed");

    let entries = read_wheel(&tagged);
    let dist_info = "envoy_server-1.36.2.post1.dist-info";

    let (script, mode) = &entries["envoy_server-1.36.2.post1.data/scripts/envoy"];
    assert_eq!(script, b"\x7fELF fake proxy");
    assert_eq!(mode.unwrap() & 0o777, 0o755);

    let wheel = String::from_utf8(entries[&format!("{dist_info}/WHEEL")].0.clone()).unwrap();
    assert!(wheel.contains("Tag: py3-none-manylinux_2_31_x86_64\n"));
    assert!(!wheel.contains("py3-none-any"));
    assert!(wheel.contains("Root-Is-Purelib: false\n"));

    let metadata = String::from_utf8(entries[&format!("{dist_info}/METADATA")].0.clone()).unwrap();
    assert!(metadata.contains("Name: envoy-server\n"));
    assert!(metadata.contains("Version: 1.36.2.post1\n"));
    assert!(metadata.contains("Requires-Python: >=3.9\n"));
}

#[tokio::test]
async fn test_record_matches_entries_after_retag() {
    let dir = tempfile::tempdir().unwrap();
    let binary = dir.path().join("envoy");
    std::fs::write(&binary, vec![0u8; 4096]).unwrap();

    let manifest = load_manifest(&fixture("pyproject.toml")).unwrap();
    let universal = build_wheel(&manifest, &binary, dir.path()).await.unwrap();
    let tagged = retag_wheel(&universal, "macosx_15_0_arm64").await.unwrap();

    let entries = read_wheel(&tagged);
    let record_name = "envoy_server-1.36.2.post1.dist-info/RECORD";
    let record = String::from_utf8(entries[record_name].0.clone()).unwrap();

    let mut listed = 0;
    for line in record.lines() {
        let fields: Vec<&str> = line.split(',').collect();
        assert_eq!(fields.len(), 3, "bad RECORD line {line:?}");
        if fields[0] == record_name {
            assert_eq!(&fields[1..], ["", ""]);
            continue;
        }
        let (data, _) = &entries[fields[0]];
        assert_eq!(fields[1], format!("sha256={}", record_digest(data)));
        assert_eq!(fields[2], data.len().to_string());
        listed += 1;
    }
    assert_eq!(listed, entries.len() - 1);
}

#[tokio::test]
async fn test_artifact_reports_size_and_checksum() {
    let dir = tempfile::tempdir().unwrap();
    let binary = dir.path().join("envoy");
    std::fs::write(&binary, b"proxy").unwrap();

    let manifest = load_manifest(&fixture("pyproject.toml")).unwrap();
    let wheel = build_wheel(&manifest, &binary, dir.path()).await.unwrap();
    let artifact = BundledArtifact::from_path(None, wheel.clone()).unwrap();

    assert_eq!(artifact.size, std::fs::metadata(&wheel).unwrap().len());
    assert_eq!(artifact.checksum.len(), 64);
    assert!(artifact.target.is_none());
}

#[tokio::test]
async fn test_retag_rejects_non_wheel_name() {
    let dir = tempfile::tempdir().unwrap();
    let bogus = dir.path().join("not-a-wheel.zip");
    std::fs::write(&bogus, b"").unwrap();
    assert!(retag_wheel(&bogus, "manylinux_2_31_aarch64").await.is_err());
}
