//! Duplicate workflow resolution
//!
//! Exports tend to leave several copies of the same workflow scattered across
//! dated folders. Files are grouped by identity (file stem) and the most recently
//! modified copy of each group survives. When two copies share a modification
//! time the one discovered first wins; the scan walks directories in file-name
//! order, so that choice is stable for a given tree.

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::{Error, Result};

pub mod entry;

pub use entry::{identity_of, FileEntry};

/// One identity with more than one copy on disk
#[derive(Debug, Clone)]
pub struct DuplicateGroup {
    pub identity: String,
    pub survivor: FileEntry,
    pub redundant: Vec<FileEntry>,
}

/// Removal decisions for a set of entries, computed without touching disk
#[derive(Debug, Clone, Default)]
pub struct DedupePlan {
    pub groups: Vec<DuplicateGroup>,
}

impl DedupePlan {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of files the plan would remove
    pub fn redundant_count(&self) -> usize {
        self.groups.iter().map(|g| g.redundant.len()).sum()
    }
}

/// A file or directory that could not be removed
#[derive(Debug, Clone)]
pub struct RemovalFailure {
    pub path: PathBuf,
    pub error: String,
}

#[derive(Debug, Clone, Default)]
pub struct DedupeReport {
    pub duplicate_groups: usize,
    pub files_removed: usize,
    pub directories_pruned: usize,
    pub removed: Vec<PathBuf>,
    pub failures: Vec<RemovalFailure>,
}

impl DedupeReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Finds and removes older copies of workflow files under a root directory
#[derive(Debug, Clone)]
pub struct Deduplicator {
    root: PathBuf,
}

impl Deduplicator {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Collect every `*.json` file under the root, in walk order
    pub fn scan(&self) -> Result<Vec<FileEntry>> {
        if !self.root.is_dir() {
            return Err(Error::filesystem(
                &self.root,
                std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
            ));
        }

        let mut entries = Vec::new();
        for item in WalkDir::new(&self.root).sort_by_file_name() {
            let item = match item {
                Ok(item) => item,
                Err(e) => {
                    warn!("Skipping unreadable entry under {}: {}", self.root.display(), e);
                    continue;
                }
            };

            let path = item.path();
            let is_json = path.extension().and_then(|ext| ext.to_str()) == Some("json");
            if !item.file_type().is_file() || !is_json {
                continue;
            }

            match FileEntry::from_path(path, entries.len()) {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!("Skipping {}: {}", path.display(), e),
            }
        }

        debug!(
            "Scanned {} workflow files under {}",
            entries.len(),
            self.root.display()
        );
        Ok(entries)
    }

    /// Group entries by identity and choose a survivor for each duplicated group
    pub fn plan(entries: &[FileEntry]) -> DedupePlan {
        let groups = group_by_identity(entries)
            .into_iter()
            .filter(|(_, members)| members.len() > 1)
            .map(|(identity, members)| {
                let survivor = newest(&members);
                let redundant = members
                    .iter()
                    .filter(|m| m.path != survivor.path)
                    .map(|m| (*m).clone())
                    .collect();

                DuplicateGroup {
                    identity,
                    survivor: survivor.clone(),
                    redundant,
                }
            })
            .collect();

        DedupePlan { groups }
    }

    /// The newest entry of every identity, in order of first discovery
    pub fn resolve_unique(entries: Vec<FileEntry>) -> Vec<FileEntry> {
        let survivors: BTreeSet<PathBuf> = group_by_identity(&entries)
            .into_iter()
            .map(|(_, members)| newest(&members).path.clone())
            .collect();

        entries
            .into_iter()
            .filter(|e| survivors.contains(&e.path))
            .collect()
    }

    /// Remove every redundant file in `plan`, then prune emptied directories
    ///
    /// Failures are recorded per path and never stop the remaining removals. A
    /// group whose survivor has gone missing is left alone entirely.
    pub fn apply(&self, plan: &DedupePlan) -> DedupeReport {
        let mut report = DedupeReport {
            duplicate_groups: plan.groups.len(),
            ..Default::default()
        };
        let mut touched_dirs = BTreeSet::new();

        for group in &plan.groups {
            if !group.survivor.path.is_file() {
                warn!(
                    "Survivor {} for '{}' is missing, leaving its duplicates in place",
                    group.survivor.path.display(),
                    group.identity
                );
                report.failures.push(RemovalFailure {
                    path: group.survivor.path.clone(),
                    error: "survivor no longer exists".to_string(),
                });
                continue;
            }

            info!("Keeping: {}", group.survivor.path.display());
            for duplicate in &group.redundant {
                match fs::remove_file(&duplicate.path) {
                    Ok(()) => {
                        info!("  Removed: {}", duplicate.path.display());
                        report.files_removed += 1;
                        report.removed.push(duplicate.path.clone());
                        if let Some(parent) = duplicate.path.parent() {
                            touched_dirs.insert(parent.to_path_buf());
                        }
                    }
                    Err(e) => {
                        warn!("  Failed to remove {}: {}", duplicate.path.display(), e);
                        report.failures.push(RemovalFailure {
                            path: duplicate.path.clone(),
                            error: e.to_string(),
                        });
                    }
                }
            }
        }

        self.prune_empty_dirs(touched_dirs, &mut report);
        report
    }

    /// Scan, plan and apply in one go
    pub fn run(&self) -> Result<DedupeReport> {
        let entries = self.scan()?;
        let plan = Self::plan(&entries);
        if plan.is_empty() {
            info!("No duplicate files found under {}", self.root.display());
        } else {
            info!(
                "Found {} duplicated workflows ({} redundant files)",
                plan.groups.len(),
                plan.redundant_count()
            );
        }
        Ok(self.apply(&plan))
    }

    /// Remove directories emptied by this run, walking upward until a
    /// non-empty directory or the root is reached. The root always stays.
    fn prune_empty_dirs(&self, dirs: BTreeSet<PathBuf>, report: &mut DedupeReport) {
        let mut stack: Vec<PathBuf> = dirs.into_iter().collect();

        while let Some(dir) = stack.pop() {
            if dir == self.root || !dir.starts_with(&self.root) || !dir.is_dir() {
                continue;
            }

            let is_empty = match fs::read_dir(&dir) {
                Ok(mut contents) => contents.next().is_none(),
                Err(e) => {
                    report.failures.push(RemovalFailure {
                        path: dir.clone(),
                        error: e.to_string(),
                    });
                    continue;
                }
            };
            if !is_empty {
                continue;
            }

            match fs::remove_dir(&dir) {
                Ok(()) => {
                    info!("  Removed empty directory: {}", dir.display());
                    report.directories_pruned += 1;
                    if let Some(parent) = dir.parent() {
                        stack.push(parent.to_path_buf());
                    }
                }
                Err(e) => {
                    warn!("  Failed to remove directory {}: {}", dir.display(), e);
                    report.failures.push(RemovalFailure {
                        path: dir,
                        error: e.to_string(),
                    });
                }
            }
        }
    }
}

/// Group entries by identity, keeping groups in order of first appearance
fn group_by_identity(entries: &[FileEntry]) -> Vec<(String, Vec<&FileEntry>)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<&FileEntry>)> = Vec::new();

    for entry in entries {
        match index.get(entry.identity.as_str()) {
            Some(&slot) => groups[slot].1.push(entry),
            None => {
                index.insert(&entry.identity, groups.len());
                groups.push((entry.identity.clone(), vec![entry]));
            }
        }
    }

    groups
}

/// Most recently modified member; ties go to the earliest discovered
fn newest<'a>(members: &[&'a FileEntry]) -> &'a FileEntry {
    let mut best = members[0];
    for member in &members[1..] {
        if member.modified > best.modified
            || (member.modified == best.modified && member.discovery_index < best.discovery_index)
        {
            best = member;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn entry(identity: &str, path: &str, minutes: i64, index: usize) -> FileEntry {
        let base = Utc.with_ymd_and_hms(2025, 7, 1, 12, 0, 0).unwrap();
        FileEntry::new(identity, path, base + Duration::minutes(minutes), index)
    }

    #[test]
    fn test_plan_keeps_newest() {
        let entries = vec![
            entry("a", "/r/1/a.json", 0, 0),
            entry("a", "/r/2/a.json", 10, 1),
            entry("b", "/r/1/b.json", 0, 2),
            entry("a", "/r/3/a.json", 5, 3),
        ];

        let plan = Deduplicator::plan(&entries);
        assert_eq!(plan.groups.len(), 1);

        let group = &plan.groups[0];
        assert_eq!(group.identity, "a");
        assert_eq!(group.survivor.path, PathBuf::from("/r/2/a.json"));
        let redundant: Vec<_> = group.redundant.iter().map(|e| e.path.clone()).collect();
        assert_eq!(
            redundant,
            vec![PathBuf::from("/r/1/a.json"), PathBuf::from("/r/3/a.json")]
        );
        assert_eq!(plan.redundant_count(), 2);
    }

    #[test]
    fn test_tie_goes_to_first_discovered() {
        let entries = vec![
            entry("a", "/r/x/a.json", 0, 0),
            entry("a", "/r/y/a.json", 0, 1),
        ];
        let plan = Deduplicator::plan(&entries);
        assert_eq!(plan.groups[0].survivor.path, PathBuf::from("/r/x/a.json"));
    }

    #[test]
    fn test_singletons_produce_empty_plan() {
        let entries = vec![entry("a", "/r/a.json", 0, 0), entry("b", "/r/b.json", 0, 1)];
        assert!(Deduplicator::plan(&entries).is_empty());
    }

    #[test]
    fn test_resolve_unique_keeps_discovery_order() {
        let entries = vec![
            entry("b", "/r/1/b.json", 0, 0),
            entry("a", "/r/1/a.json", 0, 1),
            entry("b", "/r/2/b.json", 3, 2),
        ];
        let unique = Deduplicator::resolve_unique(entries);
        let paths: Vec<_> = unique.iter().map(|e| e.path.clone()).collect();
        assert_eq!(
            paths,
            vec![PathBuf::from("/r/1/a.json"), PathBuf::from("/r/2/b.json")]
        );
    }

    #[test]
    fn test_scan_missing_root() {
        let dedupe = Deduplicator::new("/definitely/not/a/dir");
        assert_eq!(dedupe.root(), Path::new("/definitely/not/a/dir"));
        assert!(matches!(dedupe.scan(), Err(Error::Filesystem { .. })));
    }

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "{}").unwrap();
    }

    fn on_disk(identity: &str, path: PathBuf, minutes: i64, index: usize) -> FileEntry {
        touch(&path);
        let base = Utc.with_ymd_and_hms(2025, 7, 1, 12, 0, 0).unwrap();
        FileEntry::new(identity, path, base + Duration::minutes(minutes), index)
    }

    #[test]
    fn test_apply_keeps_directory_with_other_files() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let root = temp_dir.path();
        let entries = vec![
            on_disk("a", root.join("old/a.json"), 0, 0),
            on_disk("a", root.join("new/a.json"), 10, 1),
        ];
        fs::write(root.join("old/notes.txt"), "keep me").unwrap();

        let dedupe = Deduplicator::new(root);
        let report = dedupe.apply(&Deduplicator::plan(&entries));

        assert_eq!(report.files_removed, 1);
        assert_eq!(report.directories_pruned, 0);
        assert!(report.is_clean());
        assert!(!root.join("old/a.json").exists());
        assert!(root.join("old/notes.txt").is_file());
        assert!(root.join("new/a.json").is_file());
    }

    #[test]
    fn test_apply_prunes_upward_but_leaves_unrelated_empty_dirs() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("already-empty")).unwrap();
        let entries = vec![
            on_disk("a", root.join("2024/01/a.json"), 0, 0),
            on_disk("a", root.join("2025/a.json"), 10, 1),
        ];

        let report = Deduplicator::new(root).apply(&Deduplicator::plan(&entries));

        assert_eq!(report.files_removed, 1);
        assert_eq!(report.directories_pruned, 2);
        assert!(!root.join("2024").exists());
        assert!(root.join("already-empty").is_dir());
        assert!(root.is_dir());
    }

    #[test]
    fn test_failed_removal_is_recorded_and_survivor_kept() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let root = temp_dir.path();
        let survivor = on_disk("a", root.join("new/a.json"), 10, 1);
        // Never written, so removing it fails
        let vanished = FileEntry::new(
            "a",
            root.join("old/a.json"),
            survivor.modified - Duration::minutes(10),
            0,
        );
        let stale = on_disk("a", root.join("older/a.json"), 0, 2);

        let report =
            Deduplicator::new(root).apply(&Deduplicator::plan(&[vanished, survivor, stale]));

        assert_eq!(report.duplicate_groups, 1);
        assert_eq!(report.files_removed, 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].path, root.join("old/a.json"));
        assert!(!report.is_clean());
        assert!(root.join("new/a.json").is_file());
        assert!(!root.join("older/a.json").exists());
    }
}
