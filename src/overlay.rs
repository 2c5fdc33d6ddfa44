use std::path::Path;

use image::{RgbaImage, imageops};
use tracing::{info, warn};

use crate::{
    BatchSummary,
    error::{JobIconsError, JobIconsResult},
    layout::{OutputLayout, descriptor_label},
    model::ClassJobInfo,
};

/// Footprint of the class/job icon pasted onto the blended image.
const OVERLAY_SIZE: u32 = 40;

/// Stamps each class/job's own icon onto its blended image, in descriptor
/// filename order. A failed entity is logged and skipped.
pub fn run(layout: &OutputLayout) -> JobIconsResult<BatchSummary> {
    layout.ensure_base_dirs()?;

    let mut summary = BatchSummary::default();
    for path in layout.sorted_descriptors()? {
        let label = descriptor_label(&path);
        match overlay_class_job(layout, &path) {
            Ok(()) => summary.processed.push(label),
            Err(err) => {
                warn!("skipping {label}: {err:#}");
                summary.failed.push(label);
            }
        }
    }
    Ok(summary)
}

fn overlay_class_job(layout: &OutputLayout, path: &Path) -> JobIconsResult<()> {
    let info = ClassJobInfo::read_from(path)?;
    let abbrev = info.abbreviation.as_str();
    info!("overlaying image for {abbrev}");

    let composed = overlay(
        &layout.blended(abbrev),
        &layout.class_job_icon(abbrev),
    )?;

    let out = layout.blended_with_overlay(abbrev);
    composed
        .save(&out)
        .map_err(|err| JobIconsError::image(format!("write '{}': {err}", out.display())))?;
    Ok(())
}

/// Resizes the entity icon to a fixed 40x40 footprint and pastes it at the
/// top-left corner, using the icon's own alpha as the mask. The base image
/// is never scaled; output dimensions equal the blended image's. Missing
/// inputs are errors, never replaced by a placeholder.
pub fn overlay(blended_path: &Path, icon_path: &Path) -> JobIconsResult<RgbaImage> {
    let mut base = image::open(blended_path)
        .map_err(|err| {
            JobIconsError::image(format!("open blended '{}': {err}", blended_path.display()))
        })?
        .to_rgba8();
    let icon = image::open(icon_path)
        .map_err(|err| JobIconsError::image(format!("open icon '{}': {err}", icon_path.display())))?
        .to_rgba8();

    let icon = imageops::resize(
        &icon,
        OVERLAY_SIZE,
        OVERLAY_SIZE,
        imageops::FilterType::CatmullRom,
    );
    imageops::overlay(&mut base, &icon, 0, 0);
    Ok(base)
}
