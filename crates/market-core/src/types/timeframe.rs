//! 캔들 간격과 조회 기간 정의.
//!
//! 두 타입 모두 Yahoo Finance가 사용하는 문자열 표기("1m", "1d", "1mo" 등)로
//! 표시되고 파싱됩니다.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 캔들 간격.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Timeframe {
    /// 1분봉
    M1,
    /// 2분봉
    M2,
    /// 5분봉
    M5,
    /// 15분봉
    M15,
    /// 30분봉
    M30,
    /// 60분봉
    M60,
    /// 90분봉
    M90,
    /// 1시간봉
    H1,
    /// 일봉
    D1,
    /// 5일봉
    D5,
    /// 주봉
    W1,
    /// 월봉
    MN1,
    /// 분기봉
    MN3,
}

impl Timeframe {
    /// Yahoo Finance 간격 문자열.
    pub fn as_yahoo_interval(&self) -> &'static str {
        match self {
            Timeframe::M1 => "1m",
            Timeframe::M2 => "2m",
            Timeframe::M5 => "5m",
            Timeframe::M15 => "15m",
            Timeframe::M30 => "30m",
            Timeframe::M60 => "60m",
            Timeframe::M90 => "90m",
            Timeframe::H1 => "1h",
            Timeframe::D1 => "1d",
            Timeframe::D5 => "5d",
            Timeframe::W1 => "1wk",
            Timeframe::MN1 => "1mo",
            Timeframe::MN3 => "3mo",
        }
    }

    /// Yahoo Finance 간격 문자열에서 파싱합니다.
    pub fn from_yahoo_interval(s: &str) -> Option<Self> {
        match s {
            "1m" => Some(Timeframe::M1),
            "2m" => Some(Timeframe::M2),
            "5m" => Some(Timeframe::M5),
            "15m" => Some(Timeframe::M15),
            "30m" => Some(Timeframe::M30),
            "60m" => Some(Timeframe::M60),
            "90m" => Some(Timeframe::M90),
            "1h" => Some(Timeframe::H1),
            "1d" => Some(Timeframe::D1),
            "5d" => Some(Timeframe::D5),
            "1wk" => Some(Timeframe::W1),
            "1mo" => Some(Timeframe::MN1),
            "3mo" => Some(Timeframe::MN3),
            _ => None,
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_yahoo_interval())
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_yahoo_interval(s).ok_or_else(|| format!("Invalid timeframe: {}", s))
    }
}

impl TryFrom<String> for Timeframe {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Timeframe> for String {
    fn from(value: Timeframe) -> Self {
        value.to_string()
    }
}

/// 조회 기간 (현재 시점 기준으로 얼마나 과거까지 가져올지).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LookbackPeriod {
    /// 1일
    D1,
    /// 5일
    D5,
    /// 1개월
    MN1,
    /// 3개월
    MN3,
    /// 6개월
    MN6,
    /// 1년
    Y1,
    /// 2년
    Y2,
    /// 5년
    Y5,
    /// 10년
    Y10,
    /// 연초 이후
    Ytd,
    /// 전체 기간
    Max,
}

impl LookbackPeriod {
    /// Yahoo Finance range 문자열.
    pub fn as_yahoo_range(&self) -> &'static str {
        match self {
            LookbackPeriod::D1 => "1d",
            LookbackPeriod::D5 => "5d",
            LookbackPeriod::MN1 => "1mo",
            LookbackPeriod::MN3 => "3mo",
            LookbackPeriod::MN6 => "6mo",
            LookbackPeriod::Y1 => "1y",
            LookbackPeriod::Y2 => "2y",
            LookbackPeriod::Y5 => "5y",
            LookbackPeriod::Y10 => "10y",
            LookbackPeriod::Ytd => "ytd",
            LookbackPeriod::Max => "max",
        }
    }

    /// Yahoo Finance range 문자열에서 파싱합니다.
    pub fn from_yahoo_range(s: &str) -> Option<Self> {
        match s {
            "1d" => Some(LookbackPeriod::D1),
            "5d" => Some(LookbackPeriod::D5),
            "1mo" => Some(LookbackPeriod::MN1),
            "3mo" => Some(LookbackPeriod::MN3),
            "6mo" => Some(LookbackPeriod::MN6),
            "1y" => Some(LookbackPeriod::Y1),
            "2y" => Some(LookbackPeriod::Y2),
            "5y" => Some(LookbackPeriod::Y5),
            "10y" => Some(LookbackPeriod::Y10),
            "ytd" => Some(LookbackPeriod::Ytd),
            "max" => Some(LookbackPeriod::Max),
            _ => None,
        }
    }
}

impl fmt::Display for LookbackPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_yahoo_range())
    }
}

impl FromStr for LookbackPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_yahoo_range(s).ok_or_else(|| format!("Invalid lookback period: {}", s))
    }
}

impl TryFrom<String> for LookbackPeriod {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<LookbackPeriod> for String {
    fn from(value: LookbackPeriod) -> Self {
        value.to_string()
    }
}
