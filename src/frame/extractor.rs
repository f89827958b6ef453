//! 影格中繼資料擷取
//!
//! 先讀檔頭，檔頭缺少的欄位再從路徑中的 `KEY_VALUE` 片段補上
//! （例如 `FILTER_Ha`、`EXPOSURESECONDS_300`）。
//! 依影格類型檢查必要欄位，不足者在這一層就拒絕。

use super::types::{Frame, FrameKind, SensorSettings};
use crate::error::MoveLightsError;
use crate::tools::{HeaderMap, read_fits_header, read_xisf_header};
use log::debug;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Attribute {
    Kind,
    Camera,
    SetTemp,
    Gain,
    Offset,
    ReadoutMode,
    Exposure,
    Filter,
}

impl Attribute {
    const ALL: [Self; 8] = [
        Self::Kind,
        Self::Camera,
        Self::SetTemp,
        Self::Gain,
        Self::Offset,
        Self::ReadoutMode,
        Self::Exposure,
        Self::Filter,
    ];

    const fn header_keywords(self) -> &'static [&'static str] {
        match self {
            Self::Kind => &["IMAGETYP", "FRAME"],
            Self::Camera => &["INSTRUME", "CAMERA"],
            Self::SetTemp => &["SET-TEMP", "SETTEMP"],
            Self::Gain => &["GAIN"],
            Self::Offset => &["OFFSET", "BLKLEVEL"],
            Self::ReadoutMode => &["READOUTM", "READMODE", "READOUTMODE"],
            Self::Exposure => &["EXPOSURE", "EXPTIME"],
            Self::Filter => &["FILTER"],
        }
    }

    fn from_path_token(token: &str) -> Option<Self> {
        match token {
            "TYPE" => Some(Self::Kind),
            "CAMERA" | "INSTRUME" => Some(Self::Camera),
            "SETTEMP" => Some(Self::SetTemp),
            "GAIN" => Some(Self::Gain),
            "OFFSET" => Some(Self::Offset),
            "READOUTMODE" | "READOUTM" => Some(Self::ReadoutMode),
            "EXPOSURESECONDS" | "EXPOSURE" | "EXP" => Some(Self::Exposure),
            "FILTER" => Some(Self::Filter),
            _ => None,
        }
    }

    const fn name(self) -> &'static str {
        match self {
            Self::Kind => "frame type",
            Self::Camera => "camera",
            Self::SetTemp => "set temperature",
            Self::Gain => "gain",
            Self::Offset => "offset",
            Self::ReadoutMode => "readout mode",
            Self::Exposure => "exposure",
            Self::Filter => "filter",
        }
    }
}

type Attributes = HashMap<Attribute, String>;

/// 影格中繼資料擷取器
#[derive(Debug, Clone)]
pub struct FrameExtractor {
    /// 小寫、不含前導點
    extensions: Vec<String>,
}

impl FrameExtractor {
    pub fn new<S: AsRef<str>>(extensions: &[S]) -> Self {
        Self {
            extensions: extensions
                .iter()
                .map(|e| e.as_ref().trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        }
    }

    #[must_use]
    pub fn is_frame_file(&self, path: &Path) -> bool {
        let hidden = path
            .file_name()
            .is_some_and(|name| name.to_string_lossy().starts_with('.'));
        !hidden
            && path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| self.extensions.contains(&ext.to_ascii_lowercase()))
    }

    pub fn extract(&self, path: &Path) -> Result<Frame, MoveLightsError> {
        let unreadable = |reason: String| MoveLightsError::UnreadableMetadata {
            path: path.to_path_buf(),
            reason,
        };

        let header = read_header(path).map_err(|e| unreadable(format!("{e:#}")))?;
        let attributes = collect_attributes(&header, path);
        let kind_text = text(&attributes, Attribute::Kind).map_err(unreadable)?;
        let Some(kind) = FrameKind::parse(&kind_text) else {
            return Err(MoveLightsError::UnsupportedFrameType {
                path: path.to_path_buf(),
                frame_type: kind_text,
            });
        };
        let frame = build_frame(path, kind, &attributes).map_err(unreadable)?;

        debug!(
            "Read {} frame {} (exposure {:?}, filter {:?})",
            frame.kind,
            frame.file_name(),
            frame.exposure,
            frame.filter
        );
        Ok(frame)
    }
}

fn read_header(path: &Path) -> anyhow::Result<HeaderMap> {
    let is_xisf = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xisf"));
    if is_xisf {
        read_xisf_header(path)
    } else {
        read_fits_header(path)
    }
}

fn collect_attributes(header: &HeaderMap, path: &Path) -> Attributes {
    let from_path = path_token_values(path);

    Attribute::ALL
        .iter()
        .filter_map(|&attr| {
            let from_header = attr
                .header_keywords()
                .iter()
                .filter_map(|k| header.get(*k))
                .map(|v| v.trim())
                .find(|v| !v.is_empty());
            let value = from_header.or_else(|| from_path.get(&attr).map(String::as_str))?;
            Some((attr, value.to_string()))
        })
        .collect()
}

/// 越靠近檔案的路徑片段優先，檔名本身最優先
fn path_token_values(path: &Path) -> Attributes {
    let mut values = Attributes::new();

    let components = path
        .parent()
        .into_iter()
        .flat_map(Path::components)
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .chain(path.file_stem().map(|s| s.to_string_lossy().into_owned()));

    for component in components {
        let parts: Vec<&str> = component.split('_').collect();
        for pair in parts.windows(2) {
            if pair[1].is_empty() {
                continue;
            }
            if let Some(attr) = Attribute::from_path_token(&pair[0].to_ascii_uppercase()) {
                values.insert(attr, pair[1].to_string());
            }
        }
    }

    values
}

fn build_frame(path: &Path, kind: FrameKind, attributes: &Attributes) -> Result<Frame, String> {
    let sensor = sensor_settings(attributes);
    let exposure = number(attributes, Attribute::Exposure);

    let (sensor, exposure) = match kind {
        FrameKind::Light | FrameKind::Dark => (Some(sensor?), Some(exposure?)),
        FrameKind::Flat => (Some(sensor?), exposure.ok()),
        FrameKind::Bias => (sensor.ok(), exposure.ok()),
    };

    Ok(Frame {
        path: path.to_path_buf(),
        kind,
        sensor,
        filter: text(attributes, Attribute::Filter).ok(),
        exposure,
    })
}

fn sensor_settings(attributes: &Attributes) -> Result<SensorSettings, String> {
    Ok(SensorSettings {
        camera: text(attributes, Attribute::Camera)?,
        set_temp: number(attributes, Attribute::SetTemp)?,
        gain: number(attributes, Attribute::Gain)?,
        offset: number(attributes, Attribute::Offset)?,
        readout_mode: normalize_readout(&text(attributes, Attribute::ReadoutMode)?),
    })
}

fn text(attributes: &Attributes, attr: Attribute) -> Result<String, String> {
    attributes
        .get(&attr)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| format!("missing {}", attr.name()))
}

fn number(attributes: &Attributes, attr: Attribute) -> Result<f64, String> {
    let value = text(attributes, attr)?;
    parse_number(&value).ok_or_else(|| format!("invalid {} '{value}'", attr.name()))
}

/// FITS 允許以 `D` 表示指數
fn parse_number(value: &str) -> Option<f64> {
    value
        .trim()
        .replace(['D', 'd'], "E")
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
}

/// 數字型的讀出模式統一成整數文字，`0` 與 `0.0` 視為相同
fn normalize_readout(value: &str) -> String {
    match parse_number(value) {
        Some(n) if n.fract() == 0.0 => format!("{}", n as i64),
        _ => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attributes(pairs: &[(Attribute, &str)]) -> Attributes {
        pairs.iter().map(|(a, v)| (*a, (*v).to_string())).collect()
    }

    fn sensor_pairs() -> Vec<(Attribute, &'static str)> {
        vec![
            (Attribute::Camera, "ZWO ASI2600MM Pro"),
            (Attribute::SetTemp, "-10.0"),
            (Attribute::Gain, "100"),
            (Attribute::Offset, "50"),
            (Attribute::ReadoutMode, "0"),
        ]
    }

    #[test]
    fn test_light_requires_exposure() {
        let mut pairs = sensor_pairs();
        let err = build_frame(Path::new("/x/light.fits"), FrameKind::Light, &attributes(&pairs))
            .unwrap_err();
        assert!(err.contains("exposure"));

        pairs.push((Attribute::Exposure, "300"));
        let frame =
            build_frame(Path::new("/x/light.fits"), FrameKind::Light, &attributes(&pairs)).unwrap();
        assert_eq!(frame.kind, FrameKind::Light);
        assert_eq!(frame.exposure, Some(300.0));
    }

    #[test]
    fn test_dark_requires_sensor_settings() {
        let pairs = vec![(Attribute::Exposure, "60")];
        let err =
            build_frame(Path::new("/x/dark.fits"), FrameKind::Dark, &attributes(&pairs)).unwrap_err();
        assert!(err.contains("camera"));
    }

    #[test]
    fn test_flat_exposure_is_optional() {
        let mut pairs = sensor_pairs();
        pairs.push((Attribute::Filter, "Ha"));
        let frame =
            build_frame(Path::new("/x/flat.fits"), FrameKind::Flat, &attributes(&pairs)).unwrap();
        assert_eq!(frame.exposure, None);
        assert_eq!(frame.filter.as_deref(), Some("Ha"));
    }

    #[test]
    fn test_bias_needs_only_type() {
        let frame = build_frame(Path::new("/x/bias.fits"), FrameKind::Bias, &Attributes::new()).unwrap();
        assert_eq!(frame.kind, FrameKind::Bias);
        assert!(frame.sensor.is_none());
    }

    #[test]
    fn test_unsupported_type_is_reported_separately() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let extractor = FrameExtractor::new(&["fits"]);

        for (name, kind) in [("darkflat.fits", "DARKFLAT"), ("df.fits", "Dark Flat")] {
            let path =
                crate::frame::fixtures::write_frame(temp_dir.path(), name, kind, Some("2"), None);
            let err = extractor.extract(&path).unwrap_err();
            let MoveLightsError::UnsupportedFrameType { frame_type, .. } = &err else {
                panic!("expected unsupported frame type, got {err}");
            };
            assert_eq!(frame_type, kind);
        }
    }

    #[test]
    fn test_missing_type_is_unreadable() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = crate::frame::fixtures::write_fits(
            &temp_dir.path().join("untyped.fits"),
            &[("EXPOSURE", "300")],
        );

        let err = FrameExtractor::new(&["fits"]).extract(&path).unwrap_err();
        assert!(matches!(err, MoveLightsError::UnreadableMetadata { .. }));
    }

    #[test]
    fn test_non_numeric_gain_is_rejected() {
        let mut pairs = sensor_pairs();
        pairs.retain(|(a, _)| *a != Attribute::Gain);
        pairs.push((Attribute::Gain, "high"));
        let err =
            build_frame(Path::new("/x/flat.fits"), FrameKind::Flat, &attributes(&pairs)).unwrap_err();
        assert!(err.contains("invalid gain"));
    }

    #[test]
    fn test_path_tokens() {
        let values = path_token_values(Path::new(
            "/astro/10_Blink/M31/DATE_2024-01-15/FILTER_Ha_EXP_300/TYPE_LIGHT_GAIN_100_0001.fits",
        ));
        assert_eq!(values.get(&Attribute::Filter).map(String::as_str), Some("Ha"));
        assert_eq!(values.get(&Attribute::Exposure).map(String::as_str), Some("300"));
        assert_eq!(values.get(&Attribute::Kind).map(String::as_str), Some("LIGHT"));
        assert_eq!(values.get(&Attribute::Gain).map(String::as_str), Some("100"));
    }

    #[test]
    fn test_header_wins_over_path() {
        let mut header = HeaderMap::new();
        header.insert("FILTER".to_string(), "OIII".to_string());
        let attrs = collect_attributes(&header, Path::new("/a/FILTER_Ha/light.fits"));
        assert_eq!(attrs.get(&Attribute::Filter).map(String::as_str), Some("OIII"));
    }

    #[test]
    fn test_numeric_helpers() {
        assert_eq!(parse_number("3.0D+02"), Some(300.0));
        assert_eq!(parse_number(" -10 "), Some(-10.0));
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(normalize_readout("0.0"), "0");
        assert_eq!(normalize_readout("High Gain Mode"), "High Gain Mode");
    }

    #[test]
    fn test_extract_from_fits_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = crate::frame::fixtures::write_frame(
            &temp_dir.path().join("FILTER_Ha"),
            "light_0001.fits",
            "Light Frame",
            Some("300"),
            None,
        );

        let frame = FrameExtractor::new(&["fits"]).extract(&path).unwrap();

        assert_eq!(frame.kind, FrameKind::Light);
        assert_eq!(frame.exposure, Some(300.0));
        assert_eq!(frame.filter.as_deref(), Some("Ha"));
        let sensor = frame.sensor.unwrap();
        assert_eq!(sensor.camera, "A");
        assert_eq!(sensor.set_temp, -10.0);
        assert_eq!(sensor.readout_mode, "0");
    }

    #[test]
    fn test_corrupt_file_is_unreadable() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.fits");
        std::fs::write(&path, "definitely not a FITS header").unwrap();

        let err = FrameExtractor::new(&["fits"]).extract(&path).unwrap_err();
        assert!(matches!(err, MoveLightsError::UnreadableMetadata { .. }));
    }

    #[test]
    fn test_is_frame_file() {
        let extractor = FrameExtractor::new(&["fits", ".FIT", "xisf"]);
        assert!(extractor.is_frame_file(Path::new("/a/light.FITS")));
        assert!(extractor.is_frame_file(Path::new("/a/light.fit")));
        assert!(extractor.is_frame_file(Path::new("/a/light.xisf")));
        assert!(!extractor.is_frame_file(Path::new("/a/notes.txt")));
        assert!(!extractor.is_frame_file(Path::new("/a/._light.fits")));
    }
}
