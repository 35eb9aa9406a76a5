use serde::{Deserialize, Serialize};

use super::validation::{check_text, TextRule};
use crate::core::HashtagId;
use crate::entities::EntHashtag;
use crate::error::{AppResult, FieldErrors};

pub const HASHTAG_NAME: TextRule = TextRule::required(255);

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HashtagPayload {
    pub name: Option<String>,
}

impl HashtagPayload {
    /// Validated name; a partial update without `name` keeps `current`.
    pub fn into_name(self, current: Option<&str>, partial: bool) -> AppResult<String> {
        let mut errors = FieldErrors::new();
        let fallback = if partial { current.map(str::to_string) } else { None };
        let name = check_text(&mut errors, "name", self.name, fallback, HASHTAG_NAME);
        errors.into_result()?;
        Ok(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HashtagView {
    pub id: HashtagId,
    pub name: String,
}

impl From<EntHashtag> for HashtagView {
    fn from(hashtag: EntHashtag) -> Self {
        Self { id: hashtag.id, name: hashtag.name }
    }
}
