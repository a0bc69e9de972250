use super::*;

fn entry(left: i64, right: i64, name: &str) -> PathEntry<'_> {
    PathEntry {
        range: KeyRange::try_new(left, right).expect("valid range"),
        name,
    }
}

/// Quadratic containment scan: ancestors are every entry whose interval holds this one.
fn scan_paths(entries: &[PathEntry<'_>]) -> Vec<DerivedPath> {
    entries
        .iter()
        .map(|target| {
            let mut chain = entries
                .iter()
                .filter(|candidate| candidate.range.contains(&target.range))
                .collect::<Vec<_>>();
            chain.sort_by_key(|candidate| candidate.range.left());
            let names = chain.iter().map(|c| c.name).collect::<Vec<_>>();
            DerivedPath {
                path: format!("/{}", names.join("/")),
                level: chain.len() as i64,
            }
        })
        .collect()
}

#[test]
fn single_root() {
    let out = derive_paths(&[entry(1, 2, "root")]);
    assert_eq!(
        out,
        vec![DerivedPath {
            path: "/root".to_string(),
            level: 1
        }]
    );
}

#[test]
fn nested_forest_matches_containment_scan() {
    let entries = [
        entry(1, 18, "root"),
        entry(2, 9, "work"),
        entry(3, 4, "reports"),
        entry(5, 8, "clients"),
        entry(6, 7, "acme"),
        entry(10, 11, "home"),
        entry(12, 17, "archive"),
        entry(13, 16, "old"),
        entry(14, 15, "older"),
    ];
    let out = derive_paths(&entries);
    assert_eq!(out, scan_paths(&entries));
    assert_eq!(out[4].path, "/root/work/clients/acme");
    assert_eq!(out[4].level, 4);
    assert_eq!(out[5].path, "/root/home");
    assert_eq!(out[8].level, 4);
}

#[test]
fn closed_ancestors_are_dropped() {
    let entries = [
        entry(1, 8, "root"),
        entry(2, 5, "a"),
        entry(3, 4, "a1"),
        entry(6, 7, "b"),
    ];
    let out = derive_paths(&entries);
    assert_eq!(out[3].path, "/root/b");
    assert_eq!(out[3].level, 2);
    assert_eq!(out, scan_paths(&entries));
}

#[test]
fn empty_input() {
    assert!(derive_paths(&[]).is_empty());
}
