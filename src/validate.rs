use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;
use tracing::debug;

use crate::service::SearchService;
use crate::types::{ImageUpload, SearchRequest};

/// 欄位驗證失敗
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// 尚未驗證的表單內容
#[derive(Debug, Default)]
pub struct RawSearchForm {
    pub services: Vec<String>,
    pub discolor: Option<String>,
    pub images: Vec<RawUpload>,
}

/// 尚未驗證的 `image` 欄位
#[derive(Debug)]
pub struct RawUpload {
    /// 沒有檔名代表是一般文字欄位
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: axum::body::Bytes,
}

impl RawSearchForm {
    /// 讀出整個 multipart body，不做任何檢查
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, MultipartError> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();

            match name.as_str() {
                "services" | "services[]" => form.services.push(field.text().await?),
                "discolor" => form.discolor = Some(field.text().await?),
                "image" => {
                    let file_name = field.file_name().map(str::to_string);
                    let content_type = field.content_type().map(str::to_string);
                    let bytes = field.bytes().await?;
                    form.images.push(RawUpload {
                        file_name,
                        content_type,
                        bytes,
                    });
                }
                other => debug!(field = other, "忽略未知欄位"),
            }
        }

        Ok(form)
    }

    /// 全部欄位通過才回傳，任何一個失敗就整個拒絕
    pub fn validate(self) -> Result<SearchRequest, ValidationError> {
        let services = self
            .services
            .iter()
            .enumerate()
            .map(|(index, raw)| service(index, raw))
            .collect::<Result<Vec<_>, _>>()?;
        let discolor = boolean("discolor", self.discolor.as_deref(), false)?;
        let image = required_file("image", self.images)?;

        Ok(SearchRequest {
            services,
            discolor,
            image,
        })
    }
}

/// 圖庫名稱轉成 [`SearchService`]
pub fn service(index: usize, raw: &str) -> Result<SearchService, ValidationError> {
    raw.parse().map_err(|_| {
        ValidationError::new(
            format!("services[{}]", index),
            format!("expected one of {} but got \"{}\"", SearchService::names(), raw),
        )
    })
}

pub fn boolean(field: &str, raw: Option<&str>, default: bool) -> Result<bool, ValidationError> {
    let Some(raw) = raw else {
        return Ok(default);
    };

    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "1" => Ok(true),
        "false" | "off" | "0" => Ok(false),
        _ => Err(ValidationError::new(
            field,
            format!("expected a boolean but got \"{}\"", raw),
        )),
    }
}

pub fn required_file(field: &str, mut uploads: Vec<RawUpload>) -> Result<ImageUpload, ValidationError> {
    if uploads.len() > 1 {
        return Err(ValidationError::new(
            field,
            format!("expected exactly one file but got {}", uploads.len()),
        ));
    }

    let upload = uploads
        .pop()
        .ok_or_else(|| ValidationError::new(field, "is required"))?;

    let file_name = upload
        .file_name
        .ok_or_else(|| ValidationError::new(field, "expected a file upload"))?;

    Ok(ImageUpload {
        file_name,
        content_type: upload.content_type,
        bytes: upload.bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Bytes;

    fn upload(file_name: Option<&str>) -> RawUpload {
        RawUpload {
            file_name: file_name.map(str::to_string),
            content_type: Some("image/jpeg".to_string()),
            bytes: Bytes::from_static(b"\xff\xd8\xff"),
        }
    }

    #[test]
    fn test_service_known() {
        assert_eq!(service(0, "gelbooru"), Ok(SearchService::Gelbooru));
        assert_eq!(service(3, "anime_pictures"), Ok(SearchService::AnimePictures));
    }

    #[test]
    fn test_service_unknown() {
        let err = service(1, "pixiv").unwrap_err();
        assert_eq!(err.field, "services[1]");
        assert!(err.message.contains("\"pixiv\""));
        assert!(err.message.contains("danbooru"));
    }

    #[test]
    fn test_boolean() {
        assert_eq!(boolean("discolor", None, false), Ok(false));
        assert_eq!(boolean("discolor", Some("true"), false), Ok(true));
        assert_eq!(boolean("discolor", Some("ON"), false), Ok(true));
        assert_eq!(boolean("discolor", Some("0"), true), Ok(false));
        assert!(boolean("discolor", Some(""), false).is_err());
        assert!(boolean("discolor", Some("yes please"), false).is_err());
    }

    #[test]
    fn test_required_file() {
        let image = required_file("image", vec![upload(Some("a.jpg"))]).unwrap();
        assert_eq!(image.file_name, "a.jpg");
        assert_eq!(image.content_type.as_deref(), Some("image/jpeg"));

        let err = required_file("image", vec![]).unwrap_err();
        assert_eq!(err.to_string(), "image: is required");

        let err = required_file("image", vec![upload(None)]).unwrap_err();
        assert_eq!(err.message, "expected a file upload");

        let err = required_file("image", vec![upload(Some("a.jpg")), upload(Some("b.jpg"))]).unwrap_err();
        assert!(err.message.contains("exactly one"));
    }

    #[test]
    fn test_validate_full_form() {
        let form = RawSearchForm {
            services: vec!["danbooru".to_string(), "zerochan".to_string()],
            discolor: Some("true".to_string()),
            images: vec![upload(Some("query.jpg"))],
        };

        let request = form.validate().unwrap();
        assert_eq!(
            request.services,
            vec![SearchService::Danbooru, SearchService::Zerochan]
        );
        assert!(request.discolor);
        assert_eq!(request.image.file_name, "query.jpg");
    }

    #[test]
    fn test_validate_defaults() {
        let form = RawSearchForm {
            images: vec![upload(Some("query.jpg"))],
            ..Default::default()
        };

        let request = form.validate().unwrap();
        assert!(request.services.is_empty());
        assert!(!request.discolor);
    }

    #[test]
    fn test_validate_rejects_whole_form() {
        let form = RawSearchForm {
            services: vec!["danbooru".to_string(), "tumblr".to_string()],
            discolor: None,
            images: vec![upload(Some("query.jpg"))],
        };

        let err = form.validate().unwrap_err();
        assert_eq!(err.field, "services[1]");
    }
}
