//! 校正影格比對
//!
//! 判斷一張亮場在同一資料夾內是否具備對應的暗場、平場，
//! 以及曝光時間不一致時所需的偏置場。純函式，不碰檔案系統。

use crate::frame::{DirectoryGroup, Frame, FrameKind, SensorSettings};
use std::fmt;

/// 缺少的校正類別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MissingCalibration {
    Dark,
    Flat,
    Bias,
}

impl fmt::Display for MissingCalibration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Dark => "dark",
            Self::Flat => "flat",
            Self::Bias => "bias",
        })
    }
}

/// 單張亮場的比對結果
#[derive(Debug, Clone, PartialEq)]
pub enum MatchResult<'a> {
    Ready {
        dark: &'a Frame,
        flat: &'a Frame,
        /// 暗場與亮場曝光相同時為 `None`
        bias: Option<&'a Frame>,
    },
    NotReady {
        missing: MissingCalibration,
    },
}

impl MatchResult<'_> {
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }

    #[must_use]
    pub const fn missing(&self) -> Option<MissingCalibration> {
        match self {
            Self::Ready { .. } => None,
            Self::NotReady { missing } => Some(*missing),
        }
    }
}

/// 比對用的欄位組合：暗場只看感測器設定，平場再加上濾鏡
#[derive(Debug, Clone, Copy)]
pub struct MatchCriteria<'a> {
    sensor: &'a SensorSettings,
    /// `None` 表示亮場沒有濾鏡資訊，任何濾鏡的平場都接受
    filter: Option<&'a str>,
}

impl<'a> MatchCriteria<'a> {
    /// 亮場缺少感測器設定時無法比對
    #[must_use]
    pub fn from_light(light: &'a Frame) -> Option<Self> {
        Some(Self {
            sensor: light.sensor.as_ref()?,
            filter: light.filter.as_deref(),
        })
    }

    #[must_use]
    pub fn accepts_dark(&self, frame: &Frame) -> bool {
        frame.kind == FrameKind::Dark && frame.sensor.as_ref() == Some(self.sensor)
    }

    #[must_use]
    pub fn accepts_flat(&self, frame: &Frame) -> bool {
        frame.kind == FrameKind::Flat
            && frame.sensor.as_ref() == Some(self.sensor)
            && self
                .filter
                .is_none_or(|filter| frame.filter.as_deref() == Some(filter))
    }
}

/// 評估一張亮場
///
/// 多張暗場或平場都符合時取資料夾中的第一張（群組已依檔名排序）。
/// 選中暗場的曝光與亮場不同時，資料夾內必須至少有一張偏置場。
pub fn evaluate<'a>(light: &Frame, group: &'a DirectoryGroup) -> MatchResult<'a> {
    let Some(criteria) = MatchCriteria::from_light(light) else {
        return MatchResult::NotReady {
            missing: MissingCalibration::Dark,
        };
    };

    let Some(dark) = group.frames.iter().find(|f| criteria.accepts_dark(f)) else {
        return MatchResult::NotReady {
            missing: MissingCalibration::Dark,
        };
    };

    let Some(flat) = group.frames.iter().find(|f| criteria.accepts_flat(f)) else {
        return MatchResult::NotReady {
            missing: MissingCalibration::Flat,
        };
    };

    if exposure_matches(dark, light) {
        return MatchResult::Ready {
            dark,
            flat,
            bias: None,
        };
    }

    match group.frames_of(FrameKind::Bias).next() {
        Some(bias) => MatchResult::Ready {
            dark,
            flat,
            bias: Some(bias),
        },
        None => MatchResult::NotReady {
            missing: MissingCalibration::Bias,
        },
    }
}

/// 精確比較，不設容許誤差；任一方缺曝光時視為不同
fn exposure_matches(dark: &Frame, light: &Frame) -> bool {
    matches!((dark.exposure, light.exposure), (Some(d), Some(l)) if d == l)
}

#[derive(Debug, Clone, PartialEq)]
pub struct LightVerdict<'a> {
    pub light: &'a Frame,
    pub result: MatchResult<'a>,
}

/// 整個資料夾的判定
#[derive(Debug, Clone, PartialEq)]
pub enum DirectoryVerdict<'a> {
    /// 每張亮場都具備校正影格
    Ready(Vec<LightVerdict<'a>>),
    /// 第一張不符合的亮場
    NotReady {
        light: &'a Frame,
        missing: MissingCalibration,
    },
}

impl DirectoryVerdict<'_> {
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

/// 沒有亮場的資料夾不產生判定
pub fn evaluate_directory(group: &DirectoryGroup) -> Option<DirectoryVerdict<'_>> {
    let mut verdicts = Vec::new();

    for light in group.lights() {
        let result = evaluate(light, group);
        if let Some(missing) = result.missing() {
            return Some(DirectoryVerdict::NotReady { light, missing });
        }
        verdicts.push(LightVerdict { light, result });
    }

    if verdicts.is_empty() {
        None
    } else {
        Some(DirectoryVerdict::Ready(verdicts))
    }
}

/// 給除錯輸出用的統計
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CalibrationCounts {
    pub lights: usize,
    pub darks: usize,
    pub flats: usize,
    pub bias: usize,
    /// 至少一張亮場對到的暗場曝光不同
    pub needs_bias: bool,
}

#[must_use]
pub fn count_calibration(group: &DirectoryGroup) -> CalibrationCounts {
    let needs_bias = group.lights().any(|light| {
        MatchCriteria::from_light(light).is_some_and(|criteria| {
            group
                .frames
                .iter()
                .find(|f| criteria.accepts_dark(f))
                .is_some_and(|dark| !exposure_matches(dark, light))
        })
    });

    CalibrationCounts {
        lights: group.count_of(FrameKind::Light),
        darks: group.count_of(FrameKind::Dark),
        flats: group.count_of(FrameKind::Flat),
        bias: group.count_of(FrameKind::Bias),
        needs_bias,
    }
}
