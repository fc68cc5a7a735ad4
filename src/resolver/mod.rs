//! # Entity Resolver
//!
//! Classifies simulation objects into named capability buckets so a soul
//! capability can show or hide every physical object it stands for.
//!
//! Classification of a single object, in order:
//!
//! 1. special groups, by structural name (multi-part props and NPC brains)
//! 2. the ignore list, on the normalized name
//! 3. an exact key match
//! 4. four ranked substring tiers, see [`MatchTier`]
//!
//! Anything left over is reported and stays visible.

mod table;

use std::collections::BTreeMap;

use log::{debug, warn};

use crate::logutil::escape_log;
use crate::metrics;
use crate::world::{ObjectHandle, ObjectRole, SimWorld};

use table::{MatchKey, IGNORED, PROP_KEYS, SPECIAL_GROUPS};

/// Minimum normalized name length for the key-contains-name tiers.
const MIN_REVERSE_MATCH: usize = 3;

/// How a bucket was selected. Ordered from most to least specific.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MatchTier {
    Special,
    Exact,
    /// Name starts with a key. Longest key wins.
    NameStartsWithKey,
    /// Name contains a key. Longest key wins.
    NameContainsKey,
    /// A key starts with the name. Shortest key wins.
    KeyStartsWithName,
    /// A key contains the name. Shortest key wins.
    KeyContainsName,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Bucket {
        bucket: &'static str,
        tier: MatchTier,
    },
    Ignored,
    Unmatched,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEntity {
    pub handle: ObjectHandle,
    pub name: String,
    pub bucket: &'static str,
    pub tier: MatchTier,
    pub role: ObjectRole,
}

/// Result of one full scan. Valid for a single scene generation.
#[derive(Debug, Clone, Default)]
pub struct BucketCache {
    pub generation: u64,
    pub buckets: BTreeMap<&'static str, Vec<ObjectHandle>>,
    pub assignments: Vec<ResolvedEntity>,
    pub unmatched: Vec<(ObjectHandle, String)>,
    pub ignored: Vec<(ObjectHandle, String)>,
}

impl BucketCache {
    pub fn handles(&self, bucket: &str) -> &[ObjectHandle] {
        self.buckets.get(bucket).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn bucket_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.buckets.keys().copied()
    }

    pub fn entity_count(&self) -> usize {
        self.assignments.len()
    }
}

/// Lowercase, drop bracketed groups, keep alphanumerics, drop trailing digits.
///
/// `"Carrot (3)"`, `"carrot_7"` and `"Carrot[Clone]"` all become `"carrot"`.
/// An unclosed bracket drops the rest of the name.
pub fn normalize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut depth = 0usize;
    for c in raw.chars() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            _ if depth > 0 => {}
            _ if c.is_alphanumeric() => out.extend(c.to_lowercase().filter(|l| l.is_alphanumeric())),
            _ => {}
        }
    }
    let trimmed = out.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    out.truncate(trimmed);
    out
}

fn tier_matches(tier: MatchTier, name: &str, key: &str) -> bool {
    match tier {
        MatchTier::NameStartsWithKey => name.starts_with(key),
        MatchTier::NameContainsKey => name.contains(key),
        MatchTier::KeyStartsWithName => key.starts_with(name),
        MatchTier::KeyContainsName => key.contains(name),
        MatchTier::Special | MatchTier::Exact => name == key,
    }
}

/// Name as the scene authors wrote it: lowercased, instancing suffix removed.
fn structural_name(raw: &str) -> String {
    raw.to_lowercase().replace("(clone)", "").trim().to_string()
}

#[derive(Debug, Default)]
pub struct EntityResolver {
    keys: Vec<MatchKey>,
}

impl EntityResolver {
    pub fn new() -> Self {
        Self {
            keys: PROP_KEYS.to_vec(),
        }
    }

    /// Classify one object name. Pure and deterministic.
    pub fn classify(&self, raw: &str, role: ObjectRole) -> Resolution {
        let structural = structural_name(raw);
        let name = normalize(raw);

        for group in SPECIAL_GROUPS.iter().filter(|g| g.role == role) {
            if group
                .names
                .iter()
                .any(|n| *n == structural || normalize(n) == name)
            {
                return Resolution::Bucket {
                    bucket: group.bucket,
                    tier: MatchTier::Special,
                };
            }
        }
        if role == ObjectRole::Npc {
            return Resolution::Unmatched;
        }
        if IGNORED.contains(&name.as_str()) {
            return Resolution::Ignored;
        }
        if name.is_empty() {
            return Resolution::Unmatched;
        }
        if let Some(key) = self.keys.iter().find(|k| k.key == name) {
            return Resolution::Bucket {
                bucket: key.bucket,
                tier: MatchTier::Exact,
            };
        }

        for tier in [
            MatchTier::NameStartsWithKey,
            MatchTier::NameContainsKey,
            MatchTier::KeyStartsWithName,
            MatchTier::KeyContainsName,
        ] {
            let prefer_longest = matches!(
                tier,
                MatchTier::NameStartsWithKey | MatchTier::NameContainsKey
            );
            if !prefer_longest && name.len() < MIN_REVERSE_MATCH {
                continue;
            }
            let mut best: Option<&MatchKey> = None;
            for key in self.keys.iter().filter(|k| !k.exact_only) {
                if !tier_matches(tier, &name, key.key) {
                    continue;
                }
                let better = match best {
                    None => true,
                    Some(b) if prefer_longest => key.key.len() > b.key.len(),
                    Some(b) => key.key.len() < b.key.len(),
                };
                if better {
                    best = Some(key);
                }
            }
            if let Some(key) = best {
                return Resolution::Bucket {
                    bucket: key.bucket,
                    tier,
                };
            }
        }
        Resolution::Unmatched
    }

    /// Classify every candidate object in the current scene.
    pub fn scan<W: SimWorld + ?Sized>(&self, world: &W) -> BucketCache {
        let mut cache = BucketCache {
            generation: world.scene_generation(),
            ..BucketCache::default()
        };
        for role in [ObjectRole::Prop, ObjectRole::Npc] {
            let mut handles = world.find_objects(role);
            handles.sort();
            for handle in handles {
                let Some(name) = world.name(handle) else {
                    continue;
                };
                match self.classify(&name, role) {
                    Resolution::Bucket { bucket, tier } => {
                        cache.buckets.entry(bucket).or_default().push(handle);
                        cache.assignments.push(ResolvedEntity {
                            handle,
                            name,
                            bucket,
                            tier,
                            role,
                        });
                    }
                    Resolution::Ignored => cache.ignored.push((handle, name)),
                    Resolution::Unmatched => {
                        warn!("unmatched {:?} object '{}'", role, escape_log(&name));
                        cache.unmatched.push((handle, name));
                    }
                }
            }
        }
        metrics::add_unmatched_objects(cache.unmatched.len());
        debug!(
            "scan gen {}: {} bound into {} buckets, {} ignored, {} unmatched",
            cache.generation,
            cache.assignments.len(),
            cache.buckets.len(),
            cache.ignored.len(),
            cache.unmatched.len()
        );
        cache
    }

    /// Every bucket name the resolver can produce.
    pub fn known_buckets(&self) -> Vec<&'static str> {
        let mut out: Vec<&'static str> = SPECIAL_GROUPS
            .iter()
            .map(|g| g.bucket)
            .chain(self.keys.iter().map(|k| k.bucket))
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }
}
