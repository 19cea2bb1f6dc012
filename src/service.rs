use std::fmt;
use std::str::FromStr;

/// IqDB 支援的圖庫來源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchService {
    Danbooru,
    Konachan,
    Yandere,
    Gelbooru,
    SankakuChannel,
    EShuushuu,
    Zerochan,
    AnimePictures,
}

impl SearchService {
    pub const ALL: [SearchService; 8] = [
        SearchService::Danbooru,
        SearchService::Konachan,
        SearchService::Yandere,
        SearchService::Gelbooru,
        SearchService::SankakuChannel,
        SearchService::EShuushuu,
        SearchService::Zerochan,
        SearchService::AnimePictures,
    ];

    /// IqDB 表單 `service[]` 欄位使用的代碼
    pub const fn code(self) -> u8 {
        match self {
            SearchService::Danbooru => 1,
            SearchService::Konachan => 2,
            SearchService::Yandere => 3,
            SearchService::Gelbooru => 4,
            SearchService::SankakuChannel => 5,
            SearchService::EShuushuu => 6,
            SearchService::Zerochan => 11,
            SearchService::AnimePictures => 13,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            SearchService::Danbooru => "danbooru",
            SearchService::Konachan => "konachan",
            SearchService::Yandere => "yandere",
            SearchService::Gelbooru => "gelbooru",
            SearchService::SankakuChannel => "sankaku_channel",
            SearchService::EShuushuu => "e_shuushuu",
            SearchService::Zerochan => "zerochan",
            SearchService::AnimePictures => "anime_pictures",
        }
    }

    /// 所有名稱，以逗號分隔（錯誤訊息用）
    pub fn names() -> String {
        Self::ALL
            .iter()
            .map(|s| s.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for SearchService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown service \"{0}\"")]
pub struct UnknownService(pub String);

impl FromStr for SearchService {
    type Err = UnknownService;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|service| service.name() == s)
            .ok_or_else(|| UnknownService(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_match_iqdb_form() {
        let codes: Vec<u8> = SearchService::ALL.iter().map(|s| s.code()).collect();
        assert_eq!(codes, vec![1, 2, 3, 4, 5, 6, 11, 13]);
    }

    #[test]
    fn test_from_str_roundtrips_names() {
        for service in SearchService::ALL {
            assert_eq!(service.name().parse::<SearchService>(), Ok(service));
        }
    }

    #[test]
    fn test_from_str_is_exact() {
        assert!("Danbooru".parse::<SearchService>().is_err());
        assert!("pixiv".parse::<SearchService>().is_err());
        assert_eq!(
            "3d-booru".parse::<SearchService>(),
            Err(UnknownService("3d-booru".to_string()))
        );
    }
}
