use axum::body::Bytes;
use serde::{Serialize, Serializer};

use crate::service::SearchService;

/// 上傳的圖片
#[derive(Debug, Clone)]
pub struct ImageUpload {
    /// 原始檔名
    pub file_name: String,
    /// 上傳時帶的 Content-Type
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// 驗證過的搜尋請求
#[derive(Debug, Clone)]
pub struct SearchRequest {
    /// 空的代表使用 IqDB 預設的圖庫
    pub services: Vec<SearchService>,
    /// 忽略顏色（灰階比對）
    pub discolor: bool,
    pub image: ImageUpload,
}

impl SearchRequest {
    /// 送往 IqDB 的文字欄位（不含圖片）
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields: Vec<(&'static str, String)> = self
            .services
            .iter()
            .map(|service| ("service[]", service.code().to_string()))
            .collect();

        if self.discolor {
            fields.push(("forcegray", "on".to_string()));
        }

        fields
    }
}

/// IqDB 結果頁中的一筆比對結果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    /// 來源頁面（絕對 URL）
    pub url: String,
    /// 縮圖（絕對 URL）
    pub image: String,
    /// 相似度百分比 0–100
    #[serde(serialize_with = "whole_number")]
    pub similarity: f64,
    /// 例如 "800×600"
    pub resolution: String,
    /// 小寫的分級，例如 "best"
    pub level: String,
}

/// 整數值輸出成 `95` 而不是 `95.0`
fn whole_number<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.fract() == 0.0 && value.abs() < (1u64 << 53) as f64 {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}
