//! Per-issue processing and the run loop.
//!
//! Each issue directory goes through the same sequence regardless of naming
//! convention; only the page-index derivation differs:
//!
//! ```text
//! Scan      list PDFs (and JPGs, unless thumbnails replace them)
//! Resolve   build the complete rename plan; reject bad names and duplicates
//! Rename    move every asset to page-<n>.<ext> in place
//! Thumbnail render page-<n>.jpg from each page-<n>.pdf        (--thumbnails)
//! Package   write <issue>.zip next to the issue directory      (--package)
//! ```
//!
//! The plan is complete before the first rename, so a malformed filename, a
//! duplicate page, or an occupied target leaves the directory untouched.
//! Renames run in two phases: every moving source is first parked under a
//! temporary name, then the parked files move to their targets. Files that
//! swap names within one plan therefore never collide with each other. Once
//! renaming starts there is no rollback.
//!
//! With thumbnails, every `page-<n>.jpg` a thumbnail will be written to must
//! be free before anything moves; an existing JPG is never overwritten.
//!
//! Failures are isolated per issue. [`run`] logs the failure, records it in
//! the [`RunSummary`], and moves on to the next directory.

use crate::config::RunConfig;
use crate::imaging::{BackendError, ThumbnailBackend, create_thumbnail, thumbnail_path};
use crate::naming::{AssetKind, NamingError, resolve_page_index, target_filename};
use crate::package::{ArchiveWriter, PackageError, build_package};
use crate::scan::{ScanError, list_assets, list_issue_directories};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("no assets of type {kind} found in directory {}", .dir.display())]
    EmptyAssetSet { kind: AssetKind, dir: PathBuf },
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Naming(#[from] NamingError),
    #[error(
        "{kind} page index {index} claimed by both {} and {}",
        .first.display(),
        .second.display()
    )]
    DuplicatePageIndex {
        kind: AssetKind,
        index: u32,
        first: PathBuf,
        second: PathBuf,
    },
    #[error("cannot rename {} to {}: target already exists", .source_path.display(), .target.display())]
    RenameCollision { source_path: PathBuf, target: PathBuf },
    #[error("cannot rename {} to {}: {io}", .source_path.display(), .target.display())]
    Rename {
        source_path: PathBuf,
        target: PathBuf,
        #[source]
        io: std::io::Error,
    },
    #[error("thumbnail for {} failed: {source}", .page.display())]
    Thumbnail {
        page: PathBuf,
        #[source]
        source: BackendError,
    },
    #[error("thumbnail for {} would overwrite {}", .page.display(), .output.display())]
    ThumbnailExists { page: PathBuf, output: PathBuf },
    #[error(transparent)]
    Package(#[from] PackageError),
}

/// One planned move within an issue directory.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedRename {
    pub kind: AssetKind,
    pub page_index: u32,
    pub source: PathBuf,
    pub target: PathBuf,
}

impl PlannedRename {
    /// Source already carries its target name.
    pub fn is_noop(&self) -> bool {
        self.source == self.target
    }
}

/// Result of a successfully processed issue.
#[derive(Debug, Clone, PartialEq)]
pub struct IssueReport {
    pub issue: PathBuf,
    pub renames: Vec<PlannedRename>,
    pub pdf_count: usize,
    pub jpg_count: usize,
    pub thumbnails: usize,
    pub package: Option<PathBuf>,
    pub dry_run: bool,
}

impl IssueReport {
    /// Directory name of the issue, e.g. `si_20100802`.
    pub fn name(&self) -> String {
        issue_name(&self.issue)
    }
}

/// Terminal state of one issue.
#[derive(Debug)]
pub enum IssueOutcome {
    Completed(IssueReport),
    Failed { issue: PathBuf, error: ProcessError },
}

/// Aggregate result of a run.
#[derive(Debug)]
pub struct RunSummary {
    pub outcomes: Vec<IssueOutcome>,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn completed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, IssueOutcome::Completed(_)))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.completed()
    }
}

/// Progress events emitted while a run proceeds.
#[derive(Debug)]
pub enum ProcessEvent<'a> {
    IssueStarted { issue: &'a Path },
    IssueCompleted(&'a IssueReport),
    IssueFailed { issue: &'a Path, error: &'a ProcessError },
}

fn issue_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Compute the renames for one asset class.
///
/// `assets` must be in scan order; Ringier numbering follows it. Fails on the
/// first naming error or on two assets resolving to the same page.
pub fn plan_renames(
    issue_dir: &Path,
    assets: &[PathBuf],
    kind: AssetKind,
    config: &RunConfig,
) -> Result<Vec<PlannedRename>, ProcessError> {
    let mut claimed: HashMap<u32, &Path> = HashMap::new();
    let mut plan = Vec::with_capacity(assets.len());

    for (encounter, source) in assets.iter().enumerate() {
        let filename = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let page_index = resolve_page_index(config.convention, &filename, encounter)?;

        if let Some(first) = claimed.insert(page_index, source) {
            return Err(ProcessError::DuplicatePageIndex {
                kind,
                index: page_index,
                first: first.to_path_buf(),
                second: source.clone(),
            });
        }

        plan.push(PlannedRename {
            kind,
            page_index,
            source: source.clone(),
            target: issue_dir.join(target_filename(page_index, kind)),
        });
    }
    Ok(plan)
}

/// Reject plans whose targets are occupied by files the plan does not move.
pub fn check_collisions(plan: &[PlannedRename]) -> Result<(), ProcessError> {
    for rename in plan {
        if rename.is_noop() || !rename.target.exists() {
            continue;
        }
        let vacated = plan.iter().any(|other| other.source == rename.target);
        if !vacated {
            return Err(ProcessError::RenameCollision {
                source_path: rename.source.clone(),
                target: rename.target.clone(),
            });
        }
    }
    Ok(())
}

/// Suffix of the temporary name a source is parked under while renaming.
const PARKED_SUFFIX: &str = ".ff-rename";

fn parked_path(rename: &PlannedRename, slot: usize) -> PathBuf {
    let mut name = rename
        .source
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(format!("{PARKED_SUFFIX}-{slot}"));
    rename.source.with_file_name(name)
}

fn move_file(from: &Path, to: &Path) -> Result<(), ProcessError> {
    if to.exists() {
        return Err(ProcessError::RenameCollision {
            source_path: from.to_path_buf(),
            target: to.to_path_buf(),
        });
    }
    fs::rename(from, to).map_err(|io| ProcessError::Rename {
        source_path: from.to_path_buf(),
        target: to.to_path_buf(),
        io,
    })
}

/// Perform the renames. Returns the final paths, in plan order.
///
/// Every moving source is parked under a temporary name first, so targets
/// vacated by the same plan are free by the time anything lands on them.
pub fn apply_renames(plan: &[PlannedRename]) -> Result<Vec<PathBuf>, ProcessError> {
    let moving: Vec<(&PlannedRename, PathBuf)> = plan
        .iter()
        .filter(|r| !r.is_noop())
        .enumerate()
        .map(|(slot, r)| (r, parked_path(r, slot)))
        .collect();

    for (rename, parked) in &moving {
        move_file(&rename.source, parked)?;
    }
    for (rename, parked) in &moving {
        move_file(parked, &rename.target)?;
        debug!(
            from = %rename.source.display(),
            to = %rename.target.display(),
            "renamed"
        );
    }
    Ok(plan.iter().map(|r| r.target.clone()).collect())
}

/// Reject thumbnail outputs that would overwrite an existing file.
///
/// Source JPGs are not part of the plan when thumbnails replace them.
pub fn check_thumbnail_targets(plan: &[PlannedRename]) -> Result<(), ProcessError> {
    for rename in plan.iter().filter(|r| r.kind == AssetKind::Pdf) {
        let output = thumbnail_path(&rename.target);
        if output.exists() {
            return Err(ProcessError::ThumbnailExists {
                page: rename.target.clone(),
                output,
            });
        }
    }
    Ok(())
}

/// Runs the per-issue sequence with injected collaborators.
pub struct IssueProcessor<'a, B, W> {
    config: &'a RunConfig,
    backend: &'a B,
    archive: &'a W,
}

impl<'a, B: ThumbnailBackend, W: ArchiveWriter> IssueProcessor<'a, B, W> {
    pub fn new(config: &'a RunConfig, backend: &'a B, archive: &'a W) -> Self {
        Self {
            config,
            backend,
            archive,
        }
    }

    /// Process one issue directory to completion or the first failure.
    pub fn process_issue(&self, issue_dir: &Path) -> Result<IssueReport, ProcessError> {
        // Scan
        let pdfs = self.require_assets(issue_dir, AssetKind::Pdf)?;
        let jpgs = if self.config.thumbnails {
            Vec::new()
        } else {
            self.require_assets(issue_dir, AssetKind::Jpg)?
        };

        // Resolve
        let mut plan = plan_renames(issue_dir, &pdfs, AssetKind::Pdf, self.config)?;
        plan.extend(plan_renames(issue_dir, &jpgs, AssetKind::Jpg, self.config)?);
        check_collisions(&plan)?;
        if self.config.thumbnails {
            check_thumbnail_targets(&plan)?;
        }

        let mut report = IssueReport {
            issue: issue_dir.to_path_buf(),
            renames: plan,
            pdf_count: pdfs.len(),
            jpg_count: jpgs.len(),
            thumbnails: 0,
            package: None,
            dry_run: self.config.dry_run,
        };
        if self.config.dry_run {
            return Ok(report);
        }

        // Rename
        apply_renames(&report.renames)?;
        let mut renamed_pdfs = targets_of(&report.renames, AssetKind::Pdf);
        let mut renamed_jpgs = targets_of(&report.renames, AssetKind::Jpg);
        renamed_pdfs.sort_by_key(|(index, _)| *index);
        renamed_jpgs.sort_by_key(|(index, _)| *index);

        // Thumbnail
        if self.config.thumbnails {
            for (index, pdf) in &renamed_pdfs {
                let thumb = create_thumbnail(self.backend, pdf, &self.config.thumbnail).map_err(
                    |source| ProcessError::Thumbnail {
                        page: pdf.clone(),
                        source,
                    },
                )?;
                debug!(page = %pdf.display(), thumbnail = %thumb.display(), "thumbnail written");
                renamed_jpgs.push((*index, thumb));
            }
            report.thumbnails = renamed_pdfs.len();
            report.jpg_count = renamed_jpgs.len();
        }

        // Package
        if self.config.package {
            let pages: Vec<PathBuf> = renamed_pdfs
                .into_iter()
                .chain(renamed_jpgs)
                .map(|(_, path)| path)
                .collect();
            let archive = build_package(
                self.archive,
                issue_dir,
                &pages,
                &self.config.assets_dir,
                report.pdf_count,
            )?;
            report.package = Some(archive);
        }

        Ok(report)
    }

    fn require_assets(&self, issue_dir: &Path, kind: AssetKind) -> Result<Vec<PathBuf>, ProcessError> {
        let assets = list_assets(issue_dir, kind)?;
        if assets.is_empty() {
            return Err(ProcessError::EmptyAssetSet {
                kind,
                dir: issue_dir.to_path_buf(),
            });
        }
        Ok(assets)
    }
}

fn targets_of(plan: &[PlannedRename], kind: AssetKind) -> Vec<(u32, PathBuf)> {
    plan.iter()
        .filter(|r| r.kind == kind)
        .map(|r| (r.page_index, r.target.clone()))
        .collect()
}

/// Process every issue directory under `config.root`.
///
/// Only a failure to list the root aborts the run; each issue's failure is
/// logged, reported through `on_event`, and recorded in the summary.
pub fn run(
    config: &RunConfig,
    backend: &impl ThumbnailBackend,
    archive: &impl ArchiveWriter,
    mut on_event: impl FnMut(&ProcessEvent),
) -> Result<RunSummary, ScanError> {
    let start = Instant::now();
    let processor = IssueProcessor::new(config, backend, archive);
    let issues = list_issue_directories(&config.root)?;
    info!(
        root = %config.root.display(),
        convention = %config.convention,
        issues = issues.len(),
        "starting run"
    );

    let mut outcomes = Vec::with_capacity(issues.len());
    for issue in issues {
        on_event(&ProcessEvent::IssueStarted { issue: &issue });
        match processor.process_issue(&issue) {
            Ok(report) => {
                info!(
                    issue = %report.name(),
                    pdfs = report.pdf_count,
                    jpgs = report.jpg_count,
                    thumbnails = report.thumbnails,
                    "issue completed"
                );
                on_event(&ProcessEvent::IssueCompleted(&report));
                outcomes.push(IssueOutcome::Completed(report));
            }
            Err(error) => {
                warn!(issue = %issue_name(&issue), %error, "issue failed");
                on_event(&ProcessEvent::IssueFailed {
                    issue: &issue,
                    error: &error,
                });
                outcomes.push(IssueOutcome::Failed { issue, error });
            }
        }
    }

    Ok(RunSummary {
        outcomes,
        elapsed: start.elapsed(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use crate::naming::NamingConvention;
    use crate::package::tests::MockArchiveWriter;
    use crate::test_helpers::{dir_listing, make_issue, read, write_backgrounds};
    use tempfile::TempDir;

    fn smd(root: &Path) -> RunConfig {
        RunConfig::new(root, NamingConvention::Smd)
    }

    fn ringier(root: &Path) -> RunConfig {
        RunConfig::new(root, NamingConvention::Ringier)
    }

    fn process(config: &RunConfig, issue: &Path) -> Result<IssueReport, ProcessError> {
        IssueProcessor::new(config, &MockBackend::new(), &MockArchiveWriter::default())
            .process_issue(issue)
    }

    // =========================================================================
    // Planning
    // =========================================================================

    #[test]
    fn ringier_plan_is_contiguous_from_zero() {
        let tmp = TempDir::new().unwrap();
        let issue = make_issue(tmp.path(), "si_20100802", &["c.pdf", "a.pdf", "b.pdf", "d.pdf"]);
        let assets = list_assets(&issue, AssetKind::Pdf).unwrap();

        let plan = plan_renames(&issue, &assets, AssetKind::Pdf, &ringier(tmp.path())).unwrap();

        let indices: Vec<u32> = plan.iter().map(|r| r.page_index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
        assert!(plan[0].source.ends_with("a.pdf"));
        assert!(plan[3].target.ends_with("page-3.pdf"));
    }

    #[test]
    fn smd_plan_uses_embedded_numbers() {
        let tmp = TempDir::new().unwrap();
        let issue = make_issue(
            tmp.path(),
            "si_20100802",
            &["si_20100802_1_1_03.pdf", "si_20100802_1_1_01.pdf"],
        );
        let assets = list_assets(&issue, AssetKind::Pdf).unwrap();

        let plan = plan_renames(&issue, &assets, AssetKind::Pdf, &smd(tmp.path())).unwrap();

        assert_eq!(plan[0].page_index, 0);
        assert_eq!(plan[1].page_index, 2);
        assert!(plan[1].target.ends_with("page-2.pdf"));
    }

    #[test]
    fn duplicate_smd_page_numbers_rejected() {
        let tmp = TempDir::new().unwrap();
        let issue = make_issue(
            tmp.path(),
            "si_20100802",
            &["si_20100802_1_1_01.pdf", "si_20100802_2_1_01.pdf"],
        );
        let assets = list_assets(&issue, AssetKind::Pdf).unwrap();

        let err = plan_renames(&issue, &assets, AssetKind::Pdf, &smd(tmp.path())).unwrap_err();
        assert!(matches!(
            err,
            ProcessError::DuplicatePageIndex {
                kind: AssetKind::Pdf,
                index: 0,
                ..
            }
        ));
    }

    #[test]
    fn targets_vacated_by_the_plan_are_renamed_through() {
        let tmp = TempDir::new().unwrap();
        let issue = make_issue(tmp.path(), "si_20100802", &["a.pdf", "b.jpg", "page-0.jpg"]);
        let config = ringier(tmp.path());
        let jpgs = list_assets(&issue, AssetKind::Jpg).unwrap();
        let plan = plan_renames(&issue, &jpgs, AssetKind::Jpg, &config).unwrap();

        // b.jpg sorts first and claims page-0.jpg, which page-0.jpg itself leaves
        check_collisions(&plan).unwrap();
        let report = process(&config, &issue).unwrap();

        assert_eq!(report.jpg_count, 2);
        assert_eq!(
            dir_listing(&issue),
            vec!["page-0.jpg", "page-0.pdf", "page-1.jpg"]
        );
        assert_eq!(read(&issue.join("page-0.pdf")), "a.pdf");
        assert_eq!(read(&issue.join("page-0.jpg")), "b.jpg");
        assert_eq!(read(&issue.join("page-1.jpg")), "page-0.jpg");
    }

    #[test]
    fn shifted_names_leave_no_parked_files() {
        let tmp = TempDir::new().unwrap();
        let issue = make_issue(tmp.path(), "si_20100802", &["page-1.pdf", "page-0.pdf", "b.pdf"]);
        let pdfs = list_assets(&issue, AssetKind::Pdf).unwrap();
        let plan = plan_renames(&issue, &pdfs, AssetKind::Pdf, &ringier(tmp.path())).unwrap();

        check_collisions(&plan).unwrap();
        apply_renames(&plan).unwrap();

        assert_eq!(
            dir_listing(&issue),
            vec!["page-0.pdf", "page-1.pdf", "page-2.pdf"]
        );
        // b.pdf sorts first, pushing every existing page up by one
        assert_eq!(read(&issue.join("page-0.pdf")), "b.pdf");
        assert_eq!(read(&issue.join("page-1.pdf")), "page-0.pdf");
        assert_eq!(read(&issue.join("page-2.pdf")), "page-1.pdf");
    }

    #[test]
    fn existing_jpg_blocks_thumbnails_before_any_rename() {
        let tmp = TempDir::new().unwrap();
        let issue = make_issue(tmp.path(), "si_20100802", &["a.pdf", "b.pdf", "page-1.jpg"]);
        let mut config = ringier(tmp.path());
        config.thumbnails = true;
        let backend = MockBackend::new();

        let err = IssueProcessor::new(&config, &backend, &MockArchiveWriter::default())
            .process_issue(&issue)
            .unwrap_err();

        assert!(matches!(
            err,
            ProcessError::ThumbnailExists { ref output, .. } if output.ends_with("page-1.jpg")
        ));
        assert_eq!(dir_listing(&issue), vec!["a.pdf", "b.pdf", "page-1.jpg"]);
        assert_eq!(read(&issue.join("page-1.jpg")), "page-1.jpg");
        assert!(backend.get_operations().is_empty());
    }

    #[test]
    fn occupied_target_outside_plan_is_collision() {
        let tmp = TempDir::new().unwrap();
        let issue = make_issue(tmp.path(), "si_20100802", &["a.pdf"]);
        fs::create_dir(issue.join("page-0.pdf")).unwrap();
        let plan = vec![PlannedRename {
            kind: AssetKind::Pdf,
            page_index: 0,
            source: issue.join("a.pdf"),
            target: issue.join("page-0.pdf"),
        }];

        let err = check_collisions(&plan).unwrap_err();
        assert!(matches!(err, ProcessError::RenameCollision { .. }));
        assert!(issue.join("a.pdf").exists());
    }

    #[test]
    fn already_renamed_files_are_noops() {
        let tmp = TempDir::new().unwrap();
        let issue = make_issue(tmp.path(), "si_20100802", &["page-0.pdf", "page-1.pdf"]);
        let assets = list_assets(&issue, AssetKind::Pdf).unwrap();
        let plan = plan_renames(&issue, &assets, AssetKind::Pdf, &ringier(tmp.path())).unwrap();

        assert!(plan.iter().all(PlannedRename::is_noop));
        check_collisions(&plan).unwrap();
        let renamed = apply_renames(&plan).unwrap();
        assert_eq!(renamed.len(), 2);
        assert_eq!(dir_listing(&issue), vec!["page-0.pdf", "page-1.pdf"]);
    }

    // =========================================================================
    // Issue processing
    // =========================================================================

    #[test]
    fn smd_issue_renames_pdfs_and_jpgs() {
        let tmp = TempDir::new().unwrap();
        let issue = make_issue(
            tmp.path(),
            "si_20100802",
            &[
                "si_20100802_1_1_01.pdf",
                "si_20100802_1_1_02.pdf",
                "si_20100802_1_1_01.jpg",
                "si_20100802_1_1_02.JPG",
            ],
        );

        let report = process(&smd(tmp.path()), &issue).unwrap();

        assert_eq!(report.pdf_count, 2);
        assert_eq!(report.jpg_count, 2);
        assert_eq!(
            dir_listing(&issue),
            vec!["page-0.jpg", "page-0.pdf", "page-1.jpg", "page-1.pdf"]
        );
        assert_eq!(read(&issue.join("page-1.pdf")), "si_20100802_1_1_02.pdf");
        assert_eq!(read(&issue.join("page-1.jpg")), "si_20100802_1_1_02.JPG");
    }

    #[test]
    fn ringier_issue_numbers_pdfs_and_jpgs_independently() {
        let tmp = TempDir::new().unwrap();
        let issue = make_issue(
            tmp.path(),
            "si_20100802",
            &["b.pdf", "a.pdf", "x.jpg", "y.jpg", "z.jpg"],
        );

        let report = process(&ringier(tmp.path()), &issue).unwrap();

        assert_eq!(report.pdf_count, 2);
        assert_eq!(report.jpg_count, 3);
        assert_eq!(read(&issue.join("page-0.pdf")), "a.pdf");
        assert_eq!(read(&issue.join("page-1.pdf")), "b.pdf");
        assert_eq!(read(&issue.join("page-2.jpg")), "z.jpg");
    }

    #[test]
    fn zero_pdfs_is_empty_asset_set_without_side_effects() {
        let tmp = TempDir::new().unwrap();
        let issue = make_issue(tmp.path(), "si_20100802", &["a.jpg"]);
        let mut config = ringier(tmp.path());
        config.package = true;
        let writer = MockArchiveWriter::default();

        let err = IssueProcessor::new(&config, &MockBackend::new(), &writer)
            .process_issue(&issue)
            .unwrap_err();

        assert!(matches!(
            err,
            ProcessError::EmptyAssetSet {
                kind: AssetKind::Pdf,
                ..
            }
        ));
        assert!(err.to_string().contains("no assets of type PDF"));
        assert_eq!(dir_listing(&issue), vec!["a.jpg"]);
        assert!(writer.archives.borrow().is_empty());
    }

    #[test]
    fn zero_jpgs_is_empty_asset_set_without_thumbnails() {
        let tmp = TempDir::new().unwrap();
        let issue = make_issue(tmp.path(), "si_20100802", &["a.pdf"]);

        let err = process(&ringier(tmp.path()), &issue).unwrap_err();

        assert!(matches!(
            err,
            ProcessError::EmptyAssetSet {
                kind: AssetKind::Jpg,
                ..
            }
        ));
        assert_eq!(dir_listing(&issue), vec!["a.pdf"]);
    }

    #[test]
    fn non_issue_directory_reports_empty_asset_set() {
        let tmp = TempDir::new().unwrap();
        let dir = make_issue(tmp.path(), "scans", &["a.pdf", "a.jpg"]);

        let err = process(&ringier(tmp.path()), &dir).unwrap_err();
        assert!(matches!(err, ProcessError::EmptyAssetSet { .. }));
        assert_eq!(dir_listing(&dir), vec!["a.jpg", "a.pdf"]);
    }

    #[test]
    fn pattern_mismatch_renames_nothing() {
        let tmp = TempDir::new().unwrap();
        let files = [
            "si_20100802_1_1_01.pdf",
            "cover.pdf",
            "si_20100802_1_1_01.jpg",
            "si_20100802_1_1_02.jpg",
        ];
        let issue = make_issue(tmp.path(), "si_20100802", &files);

        let err = process(&smd(tmp.path()), &issue).unwrap_err();

        match &err {
            ProcessError::Naming(NamingError::PatternMismatch { filename }) => {
                assert_eq!(filename, "cover.pdf")
            }
            other => panic!("expected pattern mismatch, got {other:?}"),
        }
        assert!(err.to_string().contains("cover.pdf"));
        let mut expected: Vec<String> = files.iter().map(|f| f.to_string()).collect();
        expected.sort();
        assert_eq!(dir_listing(&issue), expected);
    }

    #[test]
    fn dry_run_plans_without_touching_files() {
        let tmp = TempDir::new().unwrap();
        let issue = make_issue(tmp.path(), "si_20100802", &["a.pdf", "a.jpg"]);
        let mut config = ringier(tmp.path());
        config.dry_run = true;
        config.package = true;
        let writer = MockArchiveWriter::default();

        let report = IssueProcessor::new(&config, &MockBackend::new(), &writer)
            .process_issue(&issue)
            .unwrap();

        assert!(report.dry_run);
        assert_eq!(report.renames.len(), 2);
        assert_eq!(dir_listing(&issue), vec!["a.jpg", "a.pdf"]);
        assert!(writer.archives.borrow().is_empty());
    }

    #[test]
    fn thumbnails_replace_source_jpgs() {
        let tmp = TempDir::new().unwrap();
        let issue = make_issue(
            tmp.path(),
            "si_20100802",
            &["si_20100802_1_1_01.pdf", "si_20100802_1_1_02.pdf"],
        );
        let mut config = smd(tmp.path());
        config.thumbnails = true;
        let backend = MockBackend::new();

        let report = IssueProcessor::new(&config, &backend, &MockArchiveWriter::default())
            .process_issue(&issue)
            .unwrap();

        assert_eq!(report.thumbnails, 2);
        assert_eq!(report.jpg_count, 2);
        // thumbnail + identify per page
        let ops = backend.get_operations();
        assert_eq!(ops.len(), 4);
        assert!(matches!(
            &ops[0],
            RecordedOp::Thumbnail { source, output, max_width: 256, quality: 100, sharpening: Some((0.0, 0.8)), .. }
                if source.ends_with("page-0.pdf") && output.ends_with("page-0.jpg")
        ));
        assert_eq!(
            dir_listing(&issue),
            vec!["page-0.jpg", "page-0.pdf", "page-1.jpg", "page-1.pdf"]
        );
    }

    #[test]
    fn thumbnail_failure_fails_issue_after_renames() {
        let tmp = TempDir::new().unwrap();
        let issue = make_issue(tmp.path(), "si_20100802", &["a.pdf", "b.pdf"]);
        let mut config = ringier(tmp.path());
        config.thumbnails = true;
        config.package = true;
        let writer = MockArchiveWriter::default();
        let backend = MockBackend::failing_on(&["page-1.pdf"]);

        let err = IssueProcessor::new(&config, &backend, &writer)
            .process_issue(&issue)
            .unwrap_err();

        assert!(matches!(err, ProcessError::Thumbnail { ref page, .. } if page.ends_with("page-1.pdf")));
        // Renames are not rolled back
        assert!(issue.join("page-0.pdf").exists());
        assert!(issue.join("page-1.pdf").exists());
        assert!(writer.archives.borrow().is_empty());
    }

    #[test]
    fn package_lists_pdfs_then_jpgs_then_fixed_entries() {
        let tmp = TempDir::new().unwrap();
        let issue = make_issue(tmp.path(), "si_20100802", &["a.pdf", "b.pdf", "a.jpg", "b.jpg"]);
        let assets = tmp.path().join("assets");
        write_backgrounds(&assets);
        let mut config = ringier(tmp.path());
        config.package = true;
        config.assets_dir = assets;
        let writer = MockArchiveWriter::default();

        let report = IssueProcessor::new(&config, &MockBackend::new(), &writer)
            .process_issue(&issue)
            .unwrap();

        assert_eq!(report.package, Some(tmp.path().join("si_20100802.zip")));
        let names = writer.entry_names();
        assert_eq!(names.len(), 1);
        assert_eq!(
            &names[0][..4],
            &["page-0.pdf", "page-1.pdf", "page-0.jpg", "page-1.jpg"]
        );
        assert_eq!(names[0].last().map(String::as_str), Some("manifest.xml"));
        assert_eq!(names[0].len(), 9);
    }

    #[test]
    fn missing_backgrounds_fail_the_package_step() {
        let tmp = TempDir::new().unwrap();
        let issue = make_issue(tmp.path(), "si_20100802", &["a.pdf", "a.jpg"]);
        let mut config = ringier(tmp.path());
        config.package = true;
        config.assets_dir = tmp.path().join("no-assets");

        let err = process(&config, &issue).unwrap_err();
        assert!(matches!(
            err,
            ProcessError::Package(PackageError::MissingBackground(_))
        ));
    }

    // =========================================================================
    // Run loop
    // =========================================================================

    #[test]
    fn run_isolates_failures_per_issue() {
        let tmp = TempDir::new().unwrap();
        make_issue(tmp.path(), "si_20100802", &["a.jpg"]);
        let good = make_issue(tmp.path(), "si_20100809", &["a.pdf", "a.jpg"]);

        let mut started = Vec::new();
        let summary = run(
            &ringier(tmp.path()),
            &MockBackend::new(),
            &MockArchiveWriter::default(),
            |event| {
                if let ProcessEvent::IssueStarted { issue } = event {
                    started.push(issue.to_path_buf());
                }
            },
        )
        .unwrap();

        assert_eq!(started.len(), 2);
        assert_eq!(summary.completed(), 1);
        assert_eq!(summary.failed(), 1);
        assert!(matches!(
            &summary.outcomes[0],
            IssueOutcome::Failed { error: ProcessError::EmptyAssetSet { .. }, .. }
        ));
        assert_eq!(dir_listing(&good), vec!["page-0.jpg", "page-0.pdf"]);
    }

    #[test]
    fn run_on_missing_root_is_scan_error() {
        let tmp = TempDir::new().unwrap();
        let config = ringier(&tmp.path().join("absent"));
        let result = run(
            &config,
            &MockBackend::new(),
            &MockArchiveWriter::default(),
            |_| {},
        );
        assert!(result.is_err());
    }
}
