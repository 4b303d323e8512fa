//! Personal package archive lookups

use nbs_types::{ProbeTask, RepositoryDescriptor};

/// Archive root for `owner/name` under `base`
#[must_use]
pub fn ppa_root(base: &str, owner: &str, name: &str) -> String {
    format!("{}/{owner}/{name}/ubuntu", base.trim_end_matches('/'))
}

/// Probe tasks for a PPA descriptor, one per component.
///
/// # Errors
///
/// Returns a diagnostic message if the identifier is not `owner/name` or
/// the descriptor lacks `release` or `arch`.
pub fn ppa_tasks(
    package: &str,
    repo: &RepositoryDescriptor,
    base: &str,
) -> Result<Vec<ProbeTask>, String> {
    let id = repo.ppa.as_deref().unwrap_or_default();
    let Some((owner, name)) = repo.ppa_parts() else {
        return Err(format!(
            "Malformed PPA identifier for {package}: '{id}' (expected owner/name)"
        ));
    };

    let missing = repo.missing_fields();
    if !missing.is_empty() {
        return Err(format!(
            "Missing required fields for PPA {id}: {}",
            missing.join(", ")
        ));
    }

    let mirror_url = ppa_root(base, owner, name);
    Ok(repo
        .components
        .iter()
        .map(|component| ProbeTask {
            mirror_url: mirror_url.clone(),
            release: repo.release.clone(),
            arch: repo.arch.clone(),
            package_name: package.to_string(),
            component: component.clone(),
        })
        .collect())
}
