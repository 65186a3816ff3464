use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// 名前・ブランドの最大文字数
const MAX_TEXT_LENGTH: usize = 200;

/// ビールの一意識別子
/// ストアが登録時に採番する
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BeerId(i64);

impl BeerId {
    /// 数値からBeerIdを作成
    pub fn from_i64(id: i64) -> Self {
        Self(id)
    }

    /// 文字列からBeerIdを作成
    pub fn from_string(s: &str) -> Result<Self, DomainError> {
        s.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|e| DomainError::InvalidValue(format!("invalid beer id '{}': {}", s, e)))
    }

    /// 内部の数値を取得
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for BeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// ビール名
/// 空白のみは不可、最大200文字
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BeerName(String);

impl BeerName {
    pub fn new(name: impl Into<String>) -> Result<Self, DomainError> {
        let name = name.into().trim().to_string();
        validate_text("name", &name)?;
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BeerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// ブランド名
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brand(String);

impl Brand {
    pub fn new(brand: impl Into<String>) -> Result<Self, DomainError> {
        let brand = brand.into().trim().to_string();
        validate_text("brand", &brand)?;
        Ok(Self(brand))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Brand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn validate_text(field: &str, value: &str) -> Result<(), DomainError> {
    if value.is_empty() {
        return Err(DomainError::InvalidValue(format!("{} must not be empty", field)));
    }
    if value.chars().count() > MAX_TEXT_LENGTH {
        return Err(DomainError::InvalidValue(format!(
            "{} must be at most {} characters",
            field, MAX_TEXT_LENGTH
        )));
    }
    Ok(())
}

/// ビールの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BeerType {
    Lager,
    Malzbier,
    Witbier,
    Weiss,
    Ale,
    Ipa,
    Stout,
}

impl BeerType {
    /// 永続化・表示用の文字列表現
    pub fn as_str(&self) -> &'static str {
        match self {
            BeerType::Lager => "LAGER",
            BeerType::Malzbier => "MALZBIER",
            BeerType::Witbier => "WITBIER",
            BeerType::Weiss => "WEISS",
            BeerType::Ale => "ALE",
            BeerType::Ipa => "IPA",
            BeerType::Stout => "STOUT",
        }
    }
}

impl fmt::Display for BeerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BeerType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LAGER" => Ok(BeerType::Lager),
            "MALZBIER" => Ok(BeerType::Malzbier),
            "WITBIER" => Ok(BeerType::Witbier),
            "WEISS" => Ok(BeerType::Weiss),
            "ALE" => Ok(BeerType::Ale),
            "IPA" => Ok(BeerType::Ipa),
            "STOUT" => Ok(BeerType::Stout),
            _ => Err(DomainError::InvalidValue(format!("unknown beer type: {}", s))),
        }
    }
}
