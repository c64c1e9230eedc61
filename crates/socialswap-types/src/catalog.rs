//! Reference tables: platforms and categories

use serde::{Deserialize, Serialize};

use crate::{CategoryId, PlatformId};

/// Social network a listing lives on (Instagram, YouTube, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform {
    pub id: PlatformId,
    pub name: String,
    pub icon_class: String,
    pub icon_color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPlatform {
    pub name: String,
    pub icon_class: String,
    pub icon_color: String,
}

/// Content niche (Fashion, Tech, Food, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
}

impl NewCategory {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}
