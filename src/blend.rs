use std::path::Path;

use image::RgbaImage;
use tracing::{info, warn};

use crate::{
    BatchSummary,
    error::{JobIconsError, JobIconsResult},
    layout::{OutputLayout, descriptor_label},
    model::ClassJobInfo,
};

/// Advanced combat classes and the base class whose actions they inherit.
/// Not derivable from the API; maintained by hand.
const PARENT_CLASSES: &[(&str, &str)] = &[
    ("PLD", "GLA"),
    ("WAR", "MRD"),
    ("BRD", "ARC"),
    ("MNK", "PGL"),
    ("DRG", "LNC"),
    ("ROG", "NIN"),
    ("WHM", "CNJ"),
    ("SCH", "ARC"),
    ("BLM", "THM"),
    ("SMN", "ARC"),
];

pub fn resolve_parent(abbrev: &str) -> Option<&'static str> {
    PARENT_CLASSES
        .iter()
        .find(|(child, _)| *child == abbrev)
        .map(|&(_, parent)| parent)
}

#[derive(Clone, Copy, Debug, Default)]
pub struct BlendOptions {
    /// Also blend trait icons (own, then parent's). Off by default; the
    /// standard output is built from action icons only.
    pub include_traits: bool,
}

/// Blends one icon per descriptor in `class_job_info/`, in filename order.
/// A failed entity is logged and skipped.
pub fn run(layout: &OutputLayout, opts: BlendOptions) -> JobIconsResult<BatchSummary> {
    layout.ensure_base_dirs()?;

    let mut summary = BatchSummary::default();
    for path in layout.sorted_descriptors()? {
        let label = descriptor_label(&path);
        match blend_class_job(layout, &path, opts) {
            Ok(()) => summary.processed.push(label),
            Err(err) => {
                warn!("skipping {label}: {err:#}");
                summary.failed.push(label);
            }
        }
    }
    Ok(summary)
}

fn blend_class_job(
    layout: &OutputLayout,
    path: &Path,
    opts: BlendOptions,
) -> JobIconsResult<()> {
    let info = ClassJobInfo::read_from(path)?;
    info!("blending images for {}", info.abbreviation);

    let parent = match resolve_parent(&info.abbreviation) {
        Some(parent_abbrev) => Some(ClassJobInfo::read_from(&layout.descriptor(parent_abbrev))?),
        None => None,
    };

    let paths = collect_icon_paths(&info, parent.as_ref(), opts);
    let blended = blend(&paths)?;

    let out = layout.blended(&info.abbreviation);
    blended
        .save(&out)
        .map_err(|err| JobIconsError::image(format!("write '{}': {err}", out.display())))?;
    Ok(())
}

/// Icon paths that feed the blend: the entity's own actions first, then the
/// parent's. With `include_traits`, trait icons follow in the same
/// own-then-parent order.
pub fn collect_icon_paths<'a>(
    info: &'a ClassJobInfo,
    parent: Option<&'a ClassJobInfo>,
    opts: BlendOptions,
) -> Vec<&'a str> {
    let mut paths: Vec<&str> = info.actions.iter().map(|a| a.icon_path.as_str()).collect();
    if let Some(parent) = parent {
        paths.extend(parent.actions.iter().map(|a| a.icon_path.as_str()));
    }
    if opts.include_traits {
        paths.extend(info.traits.iter().map(|t| t.icon_path.as_str()));
        if let Some(parent) = parent {
            paths.extend(parent.traits.iter().map(|t| t.icon_path.as_str()));
        }
    }
    paths
}

/// Running-average blend: the image at step i (0-based) enters with weight
/// `1/(i+1)`, so all N images contribute equally. The accumulator stays in
/// f32 per channel (alpha included) and is rounded to u8 once at the end.
pub fn blend<P: AsRef<Path>>(paths: &[P]) -> JobIconsResult<RgbaImage> {
    if paths.is_empty() {
        return Err(JobIconsError::blend("no input images"));
    }

    let mut acc: Vec<f32> = Vec::new();
    let mut dims = (0u32, 0u32);

    for (i, path) in paths.iter().enumerate() {
        let path = path.as_ref();
        let img = image::open(path)
            .map_err(|err| JobIconsError::image(format!("open '{}': {err}", path.display())))?
            .to_rgba8();

        if i == 0 {
            dims = img.dimensions();
            acc = img.into_raw().into_iter().map(f32::from).collect();
            continue;
        }

        if img.dimensions() != dims {
            return Err(JobIconsError::blend(format!(
                "'{}' is {}x{}, expected {}x{}",
                path.display(),
                img.width(),
                img.height(),
                dims.0,
                dims.1
            )));
        }

        let t = 1.0 / (i as f32 + 1.0);
        for (a, &c) in acc.iter_mut().zip(img.as_raw()) {
            *a += (f32::from(c) - *a) * t;
        }
    }

    let pixels: Vec<u8> = acc.iter().map(|&c| c.round().clamp(0.0, 255.0) as u8).collect();
    RgbaImage::from_raw(dims.0, dims.1, pixels)
        .ok_or_else(|| JobIconsError::blend("accumulator length mismatch"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn save_solid(dir: &Path, name: &str, px: [u8; 4], w: u32, h: u32) -> std::path::PathBuf {
        let img = RgbaImage::from_pixel(w, h, image::Rgba(px));
        let path = dir.join(name);
        img.save(&path).unwrap();
        path
    }

    fn info(abbrev: &str, action_paths: &[&str], trait_paths: &[&str]) -> ClassJobInfo {
        ClassJobInfo {
            id: 0,
            name: abbrev.to_string(),
            icon: String::new(),
            url: String::new(),
            abbreviation: abbrev.to_string(),
            icon_path: String::new(),
            actions: action_paths
                .iter()
                .enumerate()
                .map(|(i, p)| crate::model::IconRecord {
                    id: i as u32,
                    name: format!("a{i}"),
                    icon_path: (*p).to_string(),
                })
                .collect(),
            traits: trait_paths
                .iter()
                .enumerate()
                .map(|(i, p)| crate::model::IconRecord {
                    id: 100 + i as u32,
                    name: format!("t{i}"),
                    icon_path: (*p).to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn resolve_parent_known_and_unknown() {
        assert_eq!(resolve_parent("PLD"), Some("GLA"));
        assert_eq!(resolve_parent("SCH"), Some("ARC"));
        assert_eq!(resolve_parent("GLA"), None);
    }

    #[test]
    fn blend_single_image_is_identity() {
        let tmp = tempfile::tempdir().unwrap();
        let path = save_solid(tmp.path(), "a.png", [10, 20, 30, 200], 4, 4);

        let out = blend(&[&path]).unwrap();
        assert_eq!(out.dimensions(), (4, 4));
        for px in out.pixels() {
            assert_eq!(px.0, [10, 20, 30, 200]);
        }
    }

    #[test]
    fn blend_equals_arithmetic_mean() {
        let tmp = tempfile::tempdir().unwrap();
        let values: [[u8; 4]; 4] = [
            [0, 100, 40, 255],
            [200, 0, 80, 55],
            [100, 50, 0, 155],
            [60, 250, 120, 255],
        ];
        let paths: Vec<_> = values
            .iter()
            .enumerate()
            .map(|(i, &px)| save_solid(tmp.path(), &format!("{i}.png"), px, 2, 2))
            .collect();

        let out = blend(&paths).unwrap();
        for ch in 0..4 {
            let mean = values.iter().map(|px| f64::from(px[ch])).sum::<f64>() / 4.0;
            let got = f64::from(out.get_pixel(0, 0).0[ch]);
            assert!(
                (got - mean).abs() <= 1.0,
                "channel {ch}: got {got}, mean {mean}"
            );
        }
    }

    #[test]
    fn blend_empty_input_is_an_error() {
        let err = blend::<&Path>(&[]).unwrap_err();
        assert!(err.to_string().contains("no input images"));
    }

    #[test]
    fn unreadable_input_is_an_image_error() {
        let err = blend(&[Path::new("/nonexistent/a.png")]).unwrap_err();
        assert!(err.to_string().contains("image error:"));
    }

    #[test]
    fn blend_rejects_mismatched_dimensions() {
        let tmp = tempfile::tempdir().unwrap();
        let a = save_solid(tmp.path(), "a.png", [0, 0, 0, 255], 4, 4);
        let b = save_solid(tmp.path(), "b.png", [255, 255, 255, 255], 2, 2);
        assert!(blend(&[a, b]).is_err());
    }

    #[test]
    fn collect_paths_own_actions_then_parent_actions() {
        let pld = info("PLD", &["p1", "p2"], &[]);
        let gla = info("GLA", &["g1", "g2", "g3"], &[]);

        let paths = collect_icon_paths(&pld, Some(&gla), BlendOptions::default());
        assert_eq!(paths, ["p1", "p2", "g1", "g2", "g3"]);
    }

    #[test]
    fn collect_paths_without_parent_is_own_actions_only() {
        let gla = info("GLA", &["g1", "g2"], &["ignored"]);
        let paths = collect_icon_paths(&gla, None, BlendOptions::default());
        assert_eq!(paths, ["g1", "g2"]);
    }

    #[test]
    fn collect_paths_includes_traits_when_enabled() {
        let pld = info("PLD", &["p1"], &["pt1"]);
        let gla = info("GLA", &["g1"], &["gt1"]);

        let opts = BlendOptions {
            include_traits: true,
        };
        let paths = collect_icon_paths(&pld, Some(&gla), opts);
        assert_eq!(paths, ["p1", "g1", "pt1", "gt1"]);
    }
}
