use anyhow::Context;
use rfidcore::config::{ReaderEntry, SiteConfig};
use std::path::{Path, PathBuf};

/// Site configuration with command-line overrides folded in.
#[derive(Clone, Debug)]
pub struct DesignerConfig {
    pub site: SiteConfig,
}

impl DesignerConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let site = SiteConfig::load(path_ref)
            .with_context(|| format!("loading site config {}", path_ref.display()))?;
        Ok(Self { site })
    }

    pub fn from_site(site: SiteConfig) -> Self {
        Self { site }
    }

    /// Applies CLI values over the file. Reader overrides replace matching
    /// ids and append unknown ones.
    pub fn with_overrides(
        mut self,
        floorplan: Option<PathBuf>,
        pixels_per_meter: Option<f64>,
        readers: &[ReaderEntry],
    ) -> anyhow::Result<Self> {
        if let Some(floorplan) = floorplan {
            self.site.floorplan = floorplan;
        }
        if let Some(ppm) = pixels_per_meter {
            self.site.pixels_per_meter = ppm;
        }
        if !readers.is_empty() {
            let mut set = self
                .site
                .reader_set()
                .context("resolving configured readers")?;
            for entry in readers {
                set.apply_override(entry.to_descriptor(self.site.default_radius_m));
            }
            self.site.readers = Some(set.iter().map(ReaderEntry::from).collect());
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn overrides_replace_file_values() {
        let cfg = DesignerConfig::from_site(SiteConfig::default())
            .with_overrides(
                Some(PathBuf::from("other.png")),
                Some(3.0),
                &["02=1,2".parse().unwrap(), "X1=5,6,40".parse().unwrap()],
            )
            .unwrap();

        assert_eq!(cfg.site.floorplan, PathBuf::from("other.png"));
        assert_eq!(cfg.site.pixels_per_meter, 3.0);
        let readers = cfg.site.reader_set().unwrap();
        assert_eq!(readers.len(), 14);
        let second = readers.get("02").unwrap();
        assert_eq!((second.position.x, second.position.y), (1.0, 2.0));
        assert_eq!(second.radius_meters, 75.0);
        assert_eq!(readers.get("X1").unwrap().radius_meters, 40.0);
    }

    #[test]
    fn no_overrides_keep_default_layout_implicit() {
        let cfg = DesignerConfig::from_site(SiteConfig::default())
            .with_overrides(None, None, &[])
            .unwrap();
        assert!(cfg.site.readers.is_none());
    }

    #[test]
    fn load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"floorplan: site.png\npixels_per_meter: 4\n")
            .unwrap();
        let path = temp.into_temp_path();
        let cfg = DesignerConfig::load(&path).unwrap();
        assert_eq!(cfg.site.pixels_per_meter, 4.0);
    }
}
