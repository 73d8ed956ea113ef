use crate::models::Release;

/// One patch release in a chain, moving the game from `from_build` to
/// `to_build`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchStep {
    pub from_build: String,
    pub to_build: String,
    pub release: Release,
}

impl PatchStep {
    pub fn label(&self) -> String {
        format!("{} to {}", self.from_build, self.to_build)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainResolution {
    NoPatchNeeded,
    /// Steps in application order
    Chain(Vec<PatchStep>),
    Unresolvable,
}

/// Resolve the patches that take the game from `installed_build` to
/// `target_build`.
///
/// Greedy walk: every hop takes the first unused release in catalog order
/// whose source build is the current build. There is no backtracking, so a
/// dead end yields `Unresolvable` even when another ordering would reach the
/// target.
pub fn resolve_chain(
    installed_build: &str,
    target_build: &str,
    catalog: &[Release],
) -> ChainResolution {
    if installed_build.is_empty() || target_build.is_empty() {
        return ChainResolution::Unresolvable;
    }
    if installed_build == target_build {
        return ChainResolution::NoPatchNeeded;
    }

    let mut used = vec![false; catalog.len()];
    let mut steps = Vec::new();
    let mut cursor = installed_build;

    while cursor != target_build {
        let next = catalog.iter().enumerate().find_map(|(i, release)| {
            if used[i] {
                return None;
            }
            match release.patch_edge() {
                Some((from, to)) if from == cursor => Some((i, to)),
                _ => None,
            }
        });

        let Some((index, to)) = next else {
            log::warn!(
                "No patch continues from build {} (target {}), chain so far: {}",
                cursor,
                target_build,
                steps.len()
            );
            return ChainResolution::Unresolvable;
        };

        used[index] = true;
        steps.push(PatchStep {
            from_build: cursor.to_string(),
            to_build: to.to_string(),
            release: catalog[index].clone(),
        });
        cursor = to;
    }

    ChainResolution::Chain(steps)
}
