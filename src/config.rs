// src/config.rs

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::grammar::rules::DEFAULT_QUANTITIES;

// ============================================================================
// 基数语法配置
// ============================================================================

/// 基数语法配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardinalConfig {
    /// 基数过滤器接受的最少位数
    #[serde(default = "default_min_digits")]
    pub min_digits: usize,
    /// 数字读法文件（读法<TAB>数字），为空时使用内置英文读法
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digit_names_path: Option<PathBuf>,
}

fn default_min_digits() -> usize {
    4
}

impl Default for CardinalConfig {
    fn default() -> Self {
        Self {
            min_digits: default_min_digits(),
            digit_names_path: None,
        }
    }
}

// ============================================================================
// 小数语法配置
// ============================================================================

/// 小数语法配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecimalConfig {
    /// 小数主导分支要求的最少小数位数
    #[serde(default = "default_min_fraction_digits")]
    pub min_fraction_digits: usize,
    /// 构建时运行自检
    ///
    /// 自定义数字读法时自检期望值不再成立，需关闭
    #[serde(default = "default_true")]
    pub self_check: bool,
}

fn default_min_fraction_digits() -> usize {
    4
}

fn default_true() -> bool {
    true
}

impl Default for DecimalConfig {
    fn default() -> Self {
        Self {
            min_fraction_digits: default_min_fraction_digits(),
            self_check: true,
        }
    }
}

// ============================================================================
// 顶层配置
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrammarConfig {
    /// 确定模式：每个输入只有一种读法
    #[serde(default = "default_true")]
    pub deterministic: bool,
    #[serde(default)]
    pub cardinal: CardinalConfig,
    #[serde(default)]
    pub decimal: DecimalConfig,
    /// 透传的数量词
    #[serde(default = "default_quantities")]
    pub quantities: Vec<String>,
}

fn default_quantities() -> Vec<String> {
    DEFAULT_QUANTITIES.iter().map(|s| s.to_string()).collect()
}

impl Default for GrammarConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl GrammarConfig {
    pub fn new() -> Self {
        Self {
            deterministic: true,
            cardinal: CardinalConfig::default(),
            decimal: DecimalConfig::default(),
            quantities: default_quantities(),
        }
    }

    /// 验证配置
    ///
    /// 检查：
    /// 1. 位数下限大于 0
    /// 2. 数量词非空且不含空白
    pub fn validate(&self) -> Result<()> {
        if self.cardinal.min_digits == 0 {
            anyhow::bail!("cardinal.min_digits 必须大于 0");
        }
        if self.decimal.min_fraction_digits == 0 {
            anyhow::bail!("decimal.min_fraction_digits 必须大于 0");
        }
        for word in &self.quantities {
            if word.is_empty() {
                anyhow::bail!("数量词不能为空");
            }
            if word.chars().any(|c| c.is_whitespace()) {
                anyhow::bail!("数量词不能包含空白: {:?}", word);
            }
        }
        if self.cardinal.digit_names_path.is_some() && self.decimal.self_check {
            tracing::warn!("使用自定义数字读法时自检可能失败，可设置 decimal.self_check = false");
        }
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| anyhow::anyhow!("无法获取配置目录"))?;
        Ok(config_dir.join("TextNormalizer").join("grammar.json"))
    }

    /// 从默认路径加载；文件不存在时返回默认配置
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            tracing::warn!("配置文件不存在，使用默认配置: {:?}", path);
            Ok(Self::new())
        }
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::info!("从以下路径加载配置: {:?}", path);
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("读取配置文件失败 {:?}: {}", path, e))?;
        let config: GrammarConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("解析配置文件失败 {:?}: {}", path, e))?;
        config.validate()?;
        Ok(config)
    }

    /// 原子写入：先写临时文件，再重命名
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.validate()?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string_pretty(self)?;
        let temp_path = path.with_extension("json.tmp");
        std::fs::write(&temp_path, &content).map_err(|e| {
            tracing::error!("写入临时文件失败: {}", e);
            e
        })?;
        if let Err(e) = std::fs::rename(&temp_path, path) {
            tracing::error!("重命名临时文件失败: {}", e);
            let _ = std::fs::remove_file(&temp_path);
            return Err(e.into());
        }
        tracing::info!("配置保存成功: {:?}", path);
        Ok(())
    }
}
