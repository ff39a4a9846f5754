//! Track descriptors and their backend representation.

use bridge_traits::EngineTrack;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Catalog category of an audio item.
///
/// Unknown labels coming from the backend map to [`Category::Others`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Arts,
    Business,
    Education,
    Entertainment,
    KidsAndFamily,
    Music,
    Science,
    Tech,
    #[default]
    Others,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Arts,
        Category::Business,
        Category::Education,
        Category::Entertainment,
        Category::KidsAndFamily,
        Category::Music,
        Category::Science,
        Category::Tech,
        Category::Others,
    ];

    /// Label used by the backend and shown in the UI.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Arts => "Arts",
            Category::Business => "Business",
            Category::Education => "Education",
            Category::Entertainment => "Entertainment",
            Category::KidsAndFamily => "Kids & Family",
            Category::Music => "Music",
            Category::Science => "Science",
            Category::Tech => "Tech",
            Category::Others => "Others",
        }
    }

    pub fn from_label(label: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|category| category.label() == label)
            .unwrap_or(Category::Others)
    }
}

impl From<String> for Category {
    fn from(label: String) -> Self {
        Category::from_label(&label)
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.label().to_string()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A playable item. Immutable once built; ids are unique within a queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub title: String,
    pub about: String,
    pub owner_id: String,
    pub owner_name: String,
    pub artwork_url: Option<String>,
    pub media_url: String,
    pub category: Category,
}

impl Track {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        media_url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            about: String::new(),
            owner_id: String::new(),
            owner_name: String::new(),
            artwork_url: None,
            media_url: media_url.into(),
            category: Category::Others,
        }
    }

    pub fn with_owner(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.owner_id = id.into();
        self.owner_name = name.into();
        self
    }

    pub fn with_artwork(mut self, url: impl Into<String>) -> Self {
        self.artwork_url = Some(url.into());
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    /// Parses the backend's audio object.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str::<AudioRecord>(json).map(Track::from)
    }

    /// Parses a backend listing of the form `{"audios": [...]}`.
    pub fn list_from_json(json: &str) -> serde_json::Result<Vec<Self>> {
        let listing: AudioListing = serde_json::from_str(json)?;
        Ok(listing.audios.into_iter().map(Track::from).collect())
    }

    /// Queue entry handed to the native engine.
    pub fn to_engine_track(&self) -> EngineTrack {
        EngineTrack {
            id: self.id.clone(),
            url: self.media_url.clone(),
            title: self.title.clone(),
            artist: self.owner_name.clone(),
            artwork: self.artwork_url.clone(),
            genre: self.category.label().to_string(),
            is_live_stream: false,
        }
    }
}

/// Audio object as served by the backend.
#[derive(Debug, Clone, Deserialize)]
pub struct AudioRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub about: String,
    #[serde(default)]
    pub category: Category,
    pub file: String,
    #[serde(default)]
    pub poster: Option<String>,
    pub owner: AudioOwner,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AudioOwner {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct AudioListing {
    audios: Vec<AudioRecord>,
}

impl From<AudioRecord> for Track {
    fn from(record: AudioRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            about: record.about,
            owner_id: record.owner.id,
            owner_name: record.owner.name,
            // The backend sends "" for audio uploaded without a poster
            artwork_url: record.poster.filter(|url| !url.is_empty()),
            media_url: record.file,
            category: record.category,
        }
    }
}
