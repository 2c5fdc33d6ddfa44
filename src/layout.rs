use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context as _;

use crate::error::JobIconsResult;

/// Every path the pipeline reads or writes, derived from one root directory.
/// All stages communicate exclusively through these locations.
#[derive(Clone, Debug)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn descriptor_dir(&self) -> PathBuf {
        self.root.join("class_job_info")
    }

    pub fn descriptor(&self, abbrev: &str) -> PathBuf {
        self.descriptor_dir().join(format!("{abbrev}.json"))
    }

    pub fn class_job_icon(&self, abbrev: &str) -> PathBuf {
        self.root
            .join("icons")
            .join("class_job_icons")
            .join(format!("{abbrev}.png"))
    }

    pub fn action_icon_dir(&self, abbrev: &str) -> PathBuf {
        self.root.join("icons").join("action_icons").join(abbrev)
    }

    pub fn trait_icon_dir(&self, abbrev: &str) -> PathBuf {
        self.root.join("icons").join("trait_icons").join(abbrev)
    }

    pub fn blended(&self, abbrev: &str) -> PathBuf {
        self.root
            .join("icons_blended")
            .join("actions_only")
            .join(format!("{abbrev}.png"))
    }

    pub fn blended_with_overlay(&self, abbrev: &str) -> PathBuf {
        self.root
            .join("icons_blended")
            .join("actions_only_w_overlay")
            .join(format!("{abbrev}.png"))
    }

    /// Creates the fixed directories shared by all entities. Idempotent.
    pub fn ensure_base_dirs(&self) -> JobIconsResult<()> {
        for dir in [
            self.descriptor_dir(),
            self.root.join("icons").join("class_job_icons"),
            self.root.join("icons").join("action_icons"),
            self.root.join("icons").join("trait_icons"),
            self.root.join("icons_blended").join("actions_only"),
            self.root.join("icons_blended").join("actions_only_w_overlay"),
        ] {
            ensure_dir(&dir)?;
        }
        Ok(())
    }

    /// Descriptor paths under `class_job_info/`, sorted by filename so every
    /// run processes entities in the same order regardless of platform.
    pub fn sorted_descriptors(&self) -> JobIconsResult<Vec<PathBuf>> {
        let dir = self.descriptor_dir();
        let entries = fs::read_dir(&dir)
            .with_context(|| format!("read descriptor dir '{}'", dir.display()))?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry
                .with_context(|| format!("read descriptor dir '{}'", dir.display()))?
                .path();
            if path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }
}

/// Label for log lines and summaries: the descriptor's file stem (the
/// abbreviation), falling back to the full path.
pub fn descriptor_label(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

pub fn ensure_dir(dir: &Path) -> JobIconsResult<()> {
    fs::create_dir_all(dir).with_context(|| format!("create dir '{}'", dir.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_keyed_by_abbreviation() {
        let layout = OutputLayout::new("/tmp/xiv");
        assert_eq!(
            layout.descriptor("PLD"),
            PathBuf::from("/tmp/xiv/class_job_info/PLD.json")
        );
        assert_eq!(
            layout.class_job_icon("PLD"),
            PathBuf::from("/tmp/xiv/icons/class_job_icons/PLD.png")
        );
        assert_eq!(
            layout.action_icon_dir("PLD"),
            PathBuf::from("/tmp/xiv/icons/action_icons/PLD")
        );
        assert_eq!(
            layout.blended("PLD"),
            PathBuf::from("/tmp/xiv/icons_blended/actions_only/PLD.png")
        );
        assert_eq!(
            layout.blended_with_overlay("PLD"),
            PathBuf::from("/tmp/xiv/icons_blended/actions_only_w_overlay/PLD.png")
        );
    }

    #[test]
    fn sorted_descriptors_orders_by_filename_and_skips_non_json() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = OutputLayout::new(tmp.path());
        layout.ensure_base_dirs().unwrap();

        for name in ["WHM.json", "ARC.json", "GLA.json", "notes.txt"] {
            fs::write(layout.descriptor_dir().join(name), b"{}").unwrap();
        }

        let names: Vec<String> = layout
            .sorted_descriptors()
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["ARC.json", "GLA.json", "WHM.json"]);
    }

    #[test]
    fn ensure_base_dirs_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = OutputLayout::new(tmp.path());
        layout.ensure_base_dirs().unwrap();
        layout.ensure_base_dirs().unwrap();
        assert!(layout.descriptor_dir().is_dir());
    }
}
