//! Content categories shared by every collector.
//!
//! [`Tag`] is a closed set. Each collector declares which tags it supports
//! by mapping them to a [`Column`]; a tag without a column is unsupported
//! for that site and listing it fails with
//! [`CollectError::UndefinedTag`](crate::error::CollectError::UndefinedTag).

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A content category.
///
/// The numeric ids are stable and match the ids used by the downstream
/// publishing system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Tag {
    Commerce,
    Mobile,
    Car,
    /// Drones, VR, robotics, AI.
    Smart,
    It,
    /// Handsets and carriers.
    Telecom,
    /// Payments, live streaming, bike sharing.
    Life,
    Startup,
    Science,
    Digital,
    Fashion,
    Internet,
    Blockchain,
    #[value(name = "5g")]
    #[serde(rename = "5g")]
    FiveG,
    Parenting,
    Art,
    MobileReview,
    Travel,
}

impl Tag {
    /// Every tag, ordered by id.
    pub const ALL: [Tag; 18] = [
        Tag::Commerce,
        Tag::Mobile,
        Tag::Car,
        Tag::Smart,
        Tag::It,
        Tag::Telecom,
        Tag::Life,
        Tag::Startup,
        Tag::Science,
        Tag::Digital,
        Tag::Fashion,
        Tag::Internet,
        Tag::Blockchain,
        Tag::FiveG,
        Tag::Parenting,
        Tag::Art,
        Tag::MobileReview,
        Tag::Travel,
    ];

    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn from_id(id: u8) -> Option<Tag> {
        Tag::ALL.get(usize::from(id)).copied()
    }

    /// Display label as shown on the publishing side.
    pub fn label(self) -> &'static str {
        match self {
            Tag::Commerce => "电商",
            Tag::Mobile => "手机",
            Tag::Car => "汽车",
            Tag::Smart => "智能",
            Tag::It => "IT",
            Tag::Telecom => "通讯",
            Tag::Life => "生活",
            Tag::Startup => "创业",
            Tag::Science => "科学",
            Tag::Digital => "数码",
            Tag::Fashion => "时尚",
            Tag::Internet => "互联网",
            Tag::Blockchain => "区块链",
            Tag::FiveG => "5G",
            Tag::Parenting => "亲子",
            Tag::Art => "艺术",
            Tag::MobileReview => "手机评测",
            Tag::Travel => "美食",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_possible_value() {
            Some(v) => f.pad(v.get_name()),
            None => write!(f, "tag#{}", self.id()),
        }
    }
}

/// How a listing endpoint renders its article stubs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListShape {
    /// A rendered HTML page with one heading per article.
    Structural,
    /// A `data_callback(...)` wrapped JSON array.
    Feed,
}

/// A listing endpoint for one tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// URL template containing [`Column::PAGE_PLACEHOLDER`].
    pub template: String,
    pub shape: ListShape,
}

impl Column {
    pub const PAGE_PLACEHOLDER: &'static str = "{page}";

    pub fn new(template: impl Into<String>, shape: ListShape) -> Self {
        Self {
            template: template.into(),
            shape,
        }
    }

    /// Resolve the template for a page number.
    ///
    /// The first page has no suffix; later pages get `_NN`.
    pub fn page_url(&self, page: u32) -> String {
        let suffix = if page <= 1 {
            String::new()
        } else {
            format!("_{:02}", page)
        };
        self.template.replace(Self::PAGE_PLACEHOLDER, &suffix)
    }
}
