use crate::model::Task;
use serde::Serialize;

pub const PAGE_SIZE: usize = 10;

/// Filters echoed back to the listing page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    pub q: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Category,
    DueDate,
    CompletedAt,
}

impl SortKey {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "category" => Some(Self::Category),
            "dueDate" => Some(Self::DueDate),
            "completedAt" => Some(Self::CompletedAt),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::DueDate => "dueDate",
            Self::CompletedAt => "completedAt",
        }
    }

    fn field<'a>(&self, task: &'a Task) -> &'a str {
        match self {
            Self::Category => &task.category,
            Self::DueDate => &task.due_date,
            Self::CompletedAt => task.completed_at.as_deref().unwrap_or(""),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_pages: usize,
}

/// One page of `items`. Pages past the end are empty rather than clamped.
pub fn paginate<T: Clone>(items: &[T], page: usize) -> Page<T> {
    let total_pages = items.len().div_ceil(PAGE_SIZE).max(1);
    let start = page.saturating_sub(1).saturating_mul(PAGE_SIZE);
    let items = items
        .iter()
        .skip(start)
        .take(PAGE_SIZE)
        .cloned()
        .collect();
    Page { items, total_pages }
}

/// Absent, non-numeric and zero pages all mean page 1.
pub fn parse_page(raw: Option<&str>) -> usize {
    raw.and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|page| *page >= 1)
        .unwrap_or(1)
}

#[derive(Serialize)]
struct QueryParams<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    q: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    key: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    page: Option<usize>,
}

/// Rebuilds `q`, `category`, `status`, `key`, `page` in that order, skipping absent ones.
pub fn build_query(filters: &Filters, sort_key: Option<SortKey>, page: Option<usize>) -> String {
    let params = QueryParams {
        q: filters.q.as_deref(),
        category: filters.category.as_deref(),
        status: filters.status.as_deref(),
        key: sort_key.map(|key| key.as_str()),
        page,
    };
    serde_urlencoded::to_string(&params).unwrap_or_default()
}

pub fn search(tasks: &[Task], q: &str) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| task.task.contains(q))
        .cloned()
        .collect()
}

pub fn filter(tasks: &[Task], category: Option<&str>, status: Option<&str>) -> Vec<Task> {
    let category = category.filter(|c| !c.is_empty());
    tasks
        .iter()
        .filter(|task| category.map_or(true, |c| task.category == c))
        .filter(|task| match status {
            Some("done") => task.done,
            Some("undone") => !task.done,
            _ => true,
        })
        .cloned()
        .collect()
}

/// Stable ascending sort; `None` keeps the stored order.
pub fn sort(tasks: &[Task], key: Option<SortKey>) -> Vec<Task> {
    let mut sorted = tasks.to_vec();
    if let Some(key) = key {
        sorted.sort_by(|a, b| key.field(a).cmp(key.field(b)));
    }
    sorted
}
