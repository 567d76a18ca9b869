//! Asset enrichment
//!
//! Merges grouping and near-duplicate classification into a page of assets.
//! Both classification services are keyed by file path, so the page is first
//! reduced to its set of resolvable paths, both services are queried
//! concurrently, and the answers are joined back onto the assets by path.
//!
//! Enrichment is all-or-nothing: if either service fails the whole call fails.

use pgw_common::api::{Asset, DuplicateCluster, EnrichedAsset, GroupCluster};
use pgw_common::{ErrorClass, UpstreamError};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error};

use crate::clients::{DuplicateSource, GroupingSource};

/// Extension reported for a file name without one
const NO_EXTENSION: &str = "FILE";

/// Classification lookup failed
#[derive(Debug, Clone, Error)]
#[error("Asset enrichment failed: {source}")]
pub struct EnrichmentError {
    source: UpstreamError,
}

impl EnrichmentError {
    pub fn upstream(&self) -> &UpstreamError {
        &self.source
    }

    pub fn class(&self) -> ErrorClass {
        self.source.class()
    }
}

impl From<UpstreamError> for EnrichmentError {
    fn from(source: UpstreamError) -> Self {
        Self { source }
    }
}

/// Grouping facts for one member path
struct GroupFacts<'a> {
    group_id: &'a str,
    group_type: &'a str,
    is_primary: bool,
    alternate_paths: Vec<&'a str>,
}

/// Near-duplicate facts for one member path
struct DuplicateFacts<'a> {
    group_id: &'a str,
    duplicate_type: &'a str,
    similarity_score: f64,
}

pub struct EnrichmentEngine {
    grouping: Arc<GroupingSource>,
    duplicates: Arc<DuplicateSource>,
}

impl EnrichmentEngine {
    pub fn new(grouping: Arc<GroupingSource>, duplicates: Arc<DuplicateSource>) -> Self {
        Self {
            grouping,
            duplicates,
        }
    }

    /// Enrich a page of assets, preserving order and length
    pub async fn enrich(&self, assets: &[Asset]) -> Result<Vec<EnrichedAsset>, EnrichmentError> {
        if assets.is_empty() {
            return Ok(Vec::new());
        }

        let paths = unique_paths(assets);
        if paths.is_empty() {
            debug!(count = assets.len(), "No resolvable paths, skipping enrichment");
            return Ok(assets.iter().cloned().map(EnrichedAsset::from).collect());
        }

        let (groups, duplicates) = tokio::try_join!(
            self.grouping.clusters_by_paths(&paths),
            self.duplicates.clusters_by_paths(&paths),
        )
        .map_err(|e| {
            error!(service = %e.service(), error = %e, "Classification lookup failed");
            EnrichmentError::from(e)
        })?;

        debug!(
            assets = assets.len(),
            paths = paths.len(),
            groups = groups.len(),
            duplicates = duplicates.len(),
            "Merging classification"
        );

        Ok(merge(assets, &groups, &duplicates))
    }
}

/// Resolvable paths in first-seen order, without repeats
fn unique_paths(assets: &[Asset]) -> Vec<String> {
    let mut seen = HashSet::new();
    assets
        .iter()
        .filter_map(Asset::file_path)
        .filter(|path| seen.insert(*path))
        .map(str::to_string)
        .collect()
}

fn index_groups(clusters: &[GroupCluster]) -> HashMap<&str, GroupFacts<'_>> {
    let mut index = HashMap::new();
    for cluster in clusters {
        for member in &cluster.members {
            // A member listed twice is still not its own alternate
            let alternate_paths = cluster
                .members
                .iter()
                .map(|other| other.file_path.as_str())
                .filter(|path| *path != member.file_path)
                .collect();

            index.insert(
                member.file_path.as_str(),
                GroupFacts {
                    group_id: &cluster.group_id,
                    group_type: &cluster.group_type,
                    is_primary: member.is_primary,
                    alternate_paths,
                },
            );
        }
    }
    index
}

fn index_duplicates(clusters: &[DuplicateCluster]) -> HashMap<&str, DuplicateFacts<'_>> {
    let mut index = HashMap::new();
    for cluster in clusters {
        for member in &cluster.members {
            index.insert(
                member.file_path.as_str(),
                DuplicateFacts {
                    group_id: &cluster.group_id,
                    duplicate_type: &cluster.duplicate_type,
                    similarity_score: member.similarity_score,
                },
            );
        }
    }
    index
}

fn merge(
    assets: &[Asset],
    groups: &[GroupCluster],
    duplicates: &[DuplicateCluster],
) -> Vec<EnrichedAsset> {
    let group_index = index_groups(groups);
    let duplicate_index = index_duplicates(duplicates);

    // Alternates resolve only against the current page
    let path_to_id: HashMap<&str, &str> = assets
        .iter()
        .filter_map(|a| a.file_path().map(|p| (p, a.id.as_str())))
        .collect();

    assets
        .iter()
        .map(|asset| {
            let mut enriched = EnrichedAsset::from(asset.clone());
            let Some(path) = asset.file_path() else {
                return enriched;
            };

            if let Some(group) = group_index.get(path) {
                let (ids, extensions): (Vec<String>, Vec<String>) = group
                    .alternate_paths
                    .iter()
                    .filter_map(|alt| {
                        path_to_id
                            .get(alt)
                            .map(|id| (id.to_string(), file_extension(alt)))
                    })
                    .unzip();

                enriched.group_id = Some(group.group_id.to_string());
                enriched.group_type = Some(group.group_type.to_string());
                enriched.is_primary_version = Some(group.is_primary);
                enriched.alternate_asset_ids = Some(ids);
                enriched.alternate_extensions = Some(extensions);
            }

            if let Some(duplicate) = duplicate_index.get(path) {
                enriched.duplicate_group_id = Some(duplicate.group_id.to_string());
                enriched.duplicate_type = Some(duplicate.duplicate_type.to_string());
                enriched.similarity_score = Some(duplicate.similarity_score);
            }

            enriched
        })
        .collect()
}

/// Uppercased extension of the path's file name, or `FILE`
fn file_extension(path: &str) -> String {
    let file_name = path.rsplit('/').next().unwrap_or(path);
    match file_name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => ext.to_uppercase(),
        _ => NO_EXTENSION.to_string(),
    }
}
