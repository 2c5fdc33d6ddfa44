use std::{fs, path::Path};

use anyhow::Context as _;
use tracing::{debug, info, warn};

use crate::{
    BatchSummary,
    api::{IconApi, SubEntityKind},
    error::JobIconsResult,
    layout::{OutputLayout, ensure_dir},
    model::{ClassJobDetail, ClassJobInfo, ClassJobListing, IconRecord, SubEntityDetail},
};

/// Downloads metadata and icons for every class/job the API lists, writing
/// one descriptor plus an icon tree per entity. One bad entity is logged and
/// skipped; the rest of the batch continues.
pub fn run(api: &dyn IconApi, layout: &OutputLayout) -> JobIconsResult<BatchSummary> {
    layout.ensure_base_dirs()?;

    let listings = api.list_class_jobs()?;
    let mut summary = BatchSummary::default();

    for listing in &listings {
        // The detail fetch comes first so failures past this point are
        // reported under the abbreviation, matching the other stages.
        match api.class_job_detail(&listing.url) {
            Ok(detail) => {
                let abbrev = detail.abbreviation.clone();
                match fetch_class_job(api, layout, listing, &detail) {
                    Ok(()) => {
                        info!("{abbrev} processed");
                        summary.processed.push(abbrev);
                    }
                    Err(err) => {
                        warn!("skipping {abbrev}: {err:#}");
                        summary.failed.push(abbrev);
                    }
                }
            }
            Err(err) => {
                warn!("skipping {} (id {}): {err:#}", listing.name, listing.id);
                summary.failed.push(listing.name.clone());
            }
        }
    }

    Ok(summary)
}

/// Fetches one entity end to end: its own icon, every linked sub-entity's
/// detail and icon, then the descriptor file. Craft actions are folded into
/// the action list and share the action icon directory.
fn fetch_class_job(
    api: &dyn IconApi,
    layout: &OutputLayout,
    listing: &ClassJobListing,
    detail: &ClassJobDetail,
) -> JobIconsResult<()> {
    let abbrev = detail.abbreviation.as_str();

    let action_dir = layout.action_icon_dir(abbrev);
    let trait_dir = layout.trait_icon_dir(abbrev);
    ensure_dir(&action_dir)?;
    ensure_dir(&trait_dir)?;

    let icon_path = layout.class_job_icon(abbrev);
    download_icon(api, &listing.icon, &icon_path)?;

    let mut actions = fetch_sub_entities(
        api,
        detail.links.action_ids(),
        SubEntityKind::Action,
        &action_dir,
    )?;
    actions.extend(fetch_sub_entities(
        api,
        detail.links.craft_action_ids(),
        SubEntityKind::CraftAction,
        &action_dir,
    )?);
    let traits = fetch_sub_entities(
        api,
        detail.links.trait_ids(),
        SubEntityKind::Trait,
        &trait_dir,
    )?;

    let info = ClassJobInfo {
        id: listing.id,
        name: listing.name.clone(),
        icon: listing.icon.clone(),
        url: listing.url.clone(),
        abbreviation: detail.abbreviation.clone(),
        icon_path: icon_path.display().to_string(),
        actions,
        traits,
    };
    info.write_to(&layout.descriptor(abbrev))?;
    Ok(())
}

/// Fetches detail JSON for each linked ID, drops entries the filter rejects,
/// and downloads the icon of every survivor to `<dir>/<ID>.png`. Filtered
/// entries never hit the icon endpoint.
fn fetch_sub_entities(
    api: &dyn IconApi,
    ids: &[u32],
    kind: SubEntityKind,
    dir: &Path,
) -> JobIconsResult<Vec<IconRecord>> {
    let mut records = Vec::new();
    for &id in ids {
        let detail = api.sub_entity_detail(kind, id)?;
        if !keep_sub_entity(kind, &detail) {
            debug!("filtered {} {id} ({})", kind.endpoint(), detail.name);
            continue;
        }

        let icon_path = dir.join(format!("{id}.png"));
        download_icon(api, &detail.icon, &icon_path)?;

        records.push(IconRecord {
            id,
            name: detail.name,
            icon_path: icon_path.display().to_string(),
        });
    }
    Ok(records)
}

/// Filter for sub-entities that should not appear in descriptors: deprecated
/// actions are not player-usable, and some craft-actions have no class/job
/// association. Skipped silently, never an error.
pub fn keep_sub_entity(kind: SubEntityKind, detail: &SubEntityDetail) -> bool {
    match kind {
        SubEntityKind::Action => detail.is_player_action,
        SubEntityKind::CraftAction => detail.has_class_job(),
        SubEntityKind::Trait => true,
    }
}

fn download_icon(api: &dyn IconApi, api_path: &str, out: &Path) -> JobIconsResult<()> {
    let bytes = api.icon_bytes(api_path)?;
    fs::write(out, bytes).with_context(|| format!("write icon '{}'", out.display()))?;
    Ok(())
}
