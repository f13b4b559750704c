//! Sort configuration for the feed table

/// A sortable table column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortColumn {
    Title,
    Url,
    NumArticles,
    RecentArticles,
    LastArticleDate,
    LastScanTime,
    LastScanTrigger,
    Status,
}

impl SortColumn {
    pub const ALL: [SortColumn; 8] = [
        SortColumn::Title,
        SortColumn::Url,
        SortColumn::NumArticles,
        SortColumn::RecentArticles,
        SortColumn::LastArticleDate,
        SortColumn::LastScanTime,
        SortColumn::LastScanTrigger,
        SortColumn::Status,
    ];

    /// Field name used by the backend
    pub fn key(self) -> &'static str {
        match self {
            SortColumn::Title => "title",
            SortColumn::Url => "url",
            SortColumn::NumArticles => "num_articles",
            SortColumn::RecentArticles => "recent_articles",
            SortColumn::LastArticleDate => "last_article_date",
            SortColumn::LastScanTime => "last_scan_time",
            SortColumn::LastScanTrigger => "last_scan_trigger",
            SortColumn::Status => "status",
        }
    }
}

impl std::fmt::Display for SortColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl std::str::FromStr for SortColumn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "title" | "name" => Ok(SortColumn::Title),
            "url" => Ok(SortColumn::Url),
            "num_articles" | "articles" => Ok(SortColumn::NumArticles),
            "recent_articles" | "recent" => Ok(SortColumn::RecentArticles),
            "last_article_date" | "last_article" => Ok(SortColumn::LastArticleDate),
            "last_scan_time" | "last_scan" | "last_updated" => Ok(SortColumn::LastScanTime),
            "last_scan_trigger" | "trigger" => Ok(SortColumn::LastScanTrigger),
            "status" => Ok(SortColumn::Status),
            _ => Err(format!("Unknown column: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    /// Apply the direction to an ascending comparison result
    pub fn apply(self, ordering: std::cmp::Ordering) -> std::cmp::Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

impl std::fmt::Display for SortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortDirection::Ascending => write!(f, "asc"),
            SortDirection::Descending => write!(f, "desc"),
        }
    }
}

/// Active column and direction; client-side only
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortConfig {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl SortConfig {
    pub fn new(column: SortColumn, direction: SortDirection) -> Self {
        Self { column, direction }
    }
}

impl Default for SortConfig {
    fn default() -> Self {
        Self::new(SortColumn::Title, SortDirection::Ascending)
    }
}
