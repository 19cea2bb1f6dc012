use anyhow::{Context, Result};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::types::MatchResult;

/// IqDB 的網址，同時也是相對路徑的解析基準
pub const BASE_URL: &str = "https://iqdb.org/";

/// 結果頁格式與預期不符
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("result has a link but no thumbnail")]
    MissingThumbnail,

    #[error("<{element}> without {attribute} attribute")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    #[error("result without similarity text")]
    MissingSimilarity,

    #[error("invalid similarity \"{0}\"")]
    InvalidSimilarity(String),

    #[error("result without resolution text")]
    MissingResolution,

    #[error("invalid url \"{url}\": {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// IqDB 結果頁的 Parser
///
/// 每個 `<table>` 是一個候選區塊；含 `td.image > a` 的才是比對結果，
/// 其餘（例如上傳圖片本身的預覽）直接略過。
pub struct IqdbParser {
    base_url: Url,
    table_selector: Selector,
    link_selector: Selector,
    image_selector: Selector,
    similarity_pattern: Regex,
    resolution_pattern: Regex,
}

impl IqdbParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            base_url: Url::parse(BASE_URL).context("無法解析 IqDB 網址")?,
            table_selector: selector("table")?,
            link_selector: selector("td.image > a")?,
            image_selector: selector("td.image img")?,
            similarity_pattern: Regex::new(r"(?i)(\d+(?:\.\d+)?)%\s*similarity")
                .context("相似度 regex 錯誤")?,
            resolution_pattern: Regex::new(r"(\d+×\d+)\s*\[(\w+)\]")
                .context("解析度 regex 錯誤")?,
        })
    }

    /// 解析結果頁，依相似度由高到低排序
    pub fn parse_page(&self, html: &str) -> Result<Vec<MatchResult>, ParseError> {
        let document = Html::parse_document(html);
        let mut results = Vec::new();

        for table in document.select(&self.table_selector) {
            let Some(link) = table.select(&self.link_selector).next() else {
                continue;
            };
            results.push(self.parse_result(table, link)?);
        }

        // sort_by 是穩定排序，同分時保留頁面順序
        results.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));

        Ok(results)
    }

    fn parse_result(&self, table: ElementRef<'_>, link: ElementRef<'_>) -> Result<MatchResult, ParseError> {
        let content = table.text().collect::<String>();

        let href = attr(link, "a", "href")?;
        let thumbnail = table
            .select(&self.image_selector)
            .next()
            .ok_or(ParseError::MissingThumbnail)?;
        let src = attr(thumbnail, "img", "src")?;

        let similarity = self
            .similarity_pattern
            .captures(&content)
            .and_then(|caps| caps.get(1))
            .ok_or(ParseError::MissingSimilarity)?
            .as_str();
        let similarity = similarity
            .parse::<f64>()
            .map_err(|_| ParseError::InvalidSimilarity(similarity.to_string()))?;

        let resolution = self
            .resolution_pattern
            .captures(&content)
            .ok_or(ParseError::MissingResolution)?;

        Ok(MatchResult {
            url: self.resolve(href)?,
            image: self.resolve(src)?,
            similarity,
            resolution: resolution[1].to_string(),
            level: resolution[2].to_lowercase(),
        })
    }

    fn resolve(&self, reference: &str) -> Result<String, ParseError> {
        self.base_url
            .join(reference)
            .map(String::from)
            .map_err(|source| ParseError::InvalidUrl {
                url: reference.to_string(),
                source,
            })
    }
}

fn selector(css: &'static str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow::anyhow!("選擇器解析失敗 ({}): {:?}", css, e))
}

fn attr<'a>(
    element: ElementRef<'a>,
    name: &'static str,
    attribute: &'static str,
) -> Result<&'a str, ParseError> {
    element
        .value()
        .attr(attribute)
        .ok_or(ParseError::MissingAttribute {
            element: name,
            attribute,
        })
}
