//! Expansion of repository descriptors into probe tasks

use nbs_events::ProbeEvent;
use nbs_types::{ProbeTask, RepositoryDescriptor};
use rand::seq::SliceRandom;

use crate::registry::MirrorRegistry;

/// Probe tasks for one package plus the diagnostics raised while building them.
#[derive(Debug, Clone, Default)]
pub struct TaskPlan {
    pub tasks: Vec<ProbeTask>,
    /// One entry per skipped descriptor
    pub diagnostics: Vec<ProbeEvent>,
}

impl TaskPlan {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Build the probe tasks for `package`.
///
/// PPA descriptors are left to the PPA path. A descriptor missing `distro`,
/// `release` or `arch`, or naming an unknown distro, is skipped with one
/// diagnostic. For every component the distro's mirrors are shuffled and the
/// first `mirrors_per_component` are probed (`0` probes all of them).
#[must_use]
pub fn build_tasks(
    package: &str,
    repos: &[RepositoryDescriptor],
    registry: &MirrorRegistry,
    mirrors_per_component: usize,
) -> TaskPlan {
    let mut plan = TaskPlan::default();
    let mut rng = rand::rng();

    for repo in repos.iter().filter(|repo| !repo.is_ppa()) {
        let missing = repo.missing_fields();
        if !missing.is_empty() {
            plan.diagnostics.push(ProbeEvent::RepositorySkipped {
                package: package.to_string(),
                reason: format!(
                    "Missing required repository fields for {package}: {}",
                    missing.join(", ")
                ),
            });
            continue;
        }

        let distro = repo.distro.trim();
        let Some(mirrors) = registry.mirrors_for(distro) else {
            plan.diagnostics.push(ProbeEvent::RepositorySkipped {
                package: package.to_string(),
                reason: format!("Skipping unknown distro: {distro}"),
            });
            continue;
        };

        let mut shuffled = mirrors.to_vec();
        shuffled.shuffle(&mut rng);
        let take = if mirrors_per_component == 0 {
            shuffled.len()
        } else {
            mirrors_per_component.min(shuffled.len())
        };

        for component in &repo.components {
            for mirror in &shuffled[..take] {
                plan.tasks.push(ProbeTask {
                    mirror_url: mirror.clone(),
                    release: repo.release.trim().to_string(),
                    arch: repo.arch.trim().to_string(),
                    package_name: package.to_string(),
                    component: component.clone(),
                });
            }
        }
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn debian() -> RepositoryDescriptor {
        RepositoryDescriptor::new("debian", "bookworm", "amd64")
    }

    #[test]
    fn test_one_mirror_per_component() {
        let registry = MirrorRegistry::builtin();
        let repo = debian().with_components(["main", "contrib", "non-free"]);
        let plan = build_tasks("foo", &[repo], &registry, 1);

        assert_eq!(plan.tasks.len(), 3);
        assert!(plan.diagnostics.is_empty());
        let components: Vec<_> = plan.tasks.iter().map(|t| t.component.as_str()).collect();
        assert_eq!(components, vec!["main", "contrib", "non-free"]);

        let known: HashSet<_> = registry.mirrors_for("debian").unwrap().iter().collect();
        assert!(plan.tasks.iter().all(|t| known.contains(&t.mirror_url)));
        assert!(plan.tasks.iter().all(|t| t.package_name == "foo"));
    }

    #[test]
    fn test_mirror_choice_varies_between_calls() {
        let registry = MirrorRegistry::builtin();
        let repos = [debian()];

        let chosen: HashSet<_> = (0..200)
            .map(|_| build_tasks("foo", &repos, &registry, 1).tasks[0].mirror_url.clone())
            .collect();

        let known: HashSet<_> = registry.mirrors_for("debian").unwrap().iter().cloned().collect();
        assert_eq!(chosen, known);
    }

    #[test]
    fn test_padded_distro_resolves() {
        let registry = MirrorRegistry::builtin();
        let repo = RepositoryDescriptor::new(" Debian ", " bookworm", "amd64 ");
        let plan = build_tasks("foo", &[repo], &registry, 1);

        assert!(plan.diagnostics.is_empty());
        assert_eq!(plan.tasks.len(), 1);
        assert_eq!(plan.tasks[0].release, "bookworm");
        assert_eq!(plan.tasks[0].arch, "amd64");
    }

    #[test]
    fn test_zero_fanout_probes_every_mirror() {
        let registry = MirrorRegistry::builtin();
        let plan = build_tasks("foo", &[debian()], &registry, 0);

        let mirrors: HashSet<_> = plan.tasks.iter().map(|t| t.mirror_url.clone()).collect();
        assert_eq!(plan.tasks.len(), 4);
        assert_eq!(mirrors.len(), 4);
    }

    #[test]
    fn test_missing_fields_single_diagnostic() {
        let registry = MirrorRegistry::builtin();
        let repo = RepositoryDescriptor::new("debian", "", "");
        let plan = build_tasks("foo", &[repo], &registry, 1);

        assert!(plan.tasks.is_empty());
        assert_eq!(plan.diagnostics.len(), 1);
        let ProbeEvent::RepositorySkipped { reason, .. } = &plan.diagnostics[0] else {
            panic!("unexpected diagnostic");
        };
        assert!(reason.contains("release, arch"));
    }

    #[test]
    fn test_unknown_distro_skipped() {
        let registry = MirrorRegistry::builtin();
        let repos = [
            RepositoryDescriptor::new("gentoo", "stable", "amd64"),
            debian(),
        ];
        let plan = build_tasks("foo", &repos, &registry, 1);

        assert_eq!(plan.tasks.len(), 1);
        assert_eq!(plan.diagnostics.len(), 1);
    }

    #[test]
    fn test_ppa_descriptors_ignored() {
        let registry = MirrorRegistry::builtin();
        let repo = RepositoryDescriptor::ppa("nitrux/tools", "noble", "amd64");
        let plan = build_tasks("foo", &[repo], &registry, 1);

        assert!(plan.is_empty());
        assert!(plan.diagnostics.is_empty());
    }
}
