use crate::error::StoreError;
use crate::model::{Task, TaskInput};
use crate::query::{self, Filters, SortKey};
use crate::render::{self, ListView};
use crate::store::Store;
use serde::Deserialize;
use std::collections::HashSet;
use tiny_http::Method;
use tracing::{debug, info, warn};

const FLASH_COOKIE: &str = "flash";

/// One-shot message carried to the next home render of the same client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flash {
    EmptyTask,
}

impl Flash {
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyTask => "empty-task",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::EmptyTask => "Task name cannot be empty.",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "empty-task" => Some(Self::EmptyTask),
            _ => None,
        }
    }

    /// Reads the flash cookie out of a `Cookie` header value.
    pub fn from_cookie_header(header: &str) -> Option<Self> {
        header
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == FLASH_COOKIE)
            .and_then(|(_, value)| Self::from_code(value.trim()))
    }
}

/// A decoded request: everything a handler looks at.
#[derive(Debug, Clone)]
pub struct Request<'a> {
    pub method: Method,
    pub path: &'a str,
    pub query: &'a str,
    pub body: &'a str,
    pub cookie: Option<&'a str>,
}

impl<'a> Request<'a> {
    /// Splits `url` into path and query string.
    pub fn new(method: Method, url: &'a str, body: &'a str, cookie: Option<&'a str>) -> Self {
        let (path, query) = url.split_once('?').unwrap_or((url, ""));
        Self {
            method,
            path,
            query,
            body,
            cookie,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub body: String,
    pub location: Option<String>,
    pub set_cookie: Option<String>,
}

impl Reply {
    pub fn page(body: String) -> Self {
        Self {
            status: 200,
            body,
            location: None,
            set_cookie: None,
        }
    }

    pub fn redirect(location: &str) -> Self {
        Self {
            status: 302,
            body: String::new(),
            location: Some(location.to_string()),
            set_cookie: None,
        }
    }

    pub fn not_found() -> Self {
        Self {
            status: 404,
            body: render::not_found_page(),
            location: None,
            set_cookie: None,
        }
    }

    pub fn server_error() -> Self {
        Self {
            status: 500,
            body: render::server_error_page(),
            location: None,
            set_cookie: None,
        }
    }

    fn with_flash(mut self, flash: Flash) -> Self {
        self.set_cookie = Some(format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax",
            FLASH_COOKIE,
            flash.code()
        ));
        self
    }

    fn clearing_flash(mut self) -> Self {
        self.set_cookie = Some(format!("{}=; Path=/; Max-Age=0", FLASH_COOKIE));
        self
    }
}

#[derive(Debug, Default, Deserialize)]
struct TaskForm {
    task: Option<String>,
    category: Option<String>,
    #[serde(rename = "dueDate")]
    due_date: Option<String>,
}

impl TaskForm {
    fn input(&self) -> Option<TaskInput> {
        TaskInput::new(
            self.task.as_deref(),
            self.category.as_deref(),
            self.due_date.as_deref(),
        )
    }
}

#[derive(Debug, Default, Deserialize)]
struct IdForm {
    id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ListParams {
    q: Option<String>,
    category: Option<String>,
    status: Option<String>,
    key: Option<String>,
    page: Option<String>,
}

// Repeated keys keep their first value. Malformed input decodes as if every field were absent.
fn decode<T: Default + for<'de> Deserialize<'de>>(raw: &str) -> T {
    let mut pairs: Vec<(String, String)> = match serde_urlencoded::from_str(raw) {
        Ok(pairs) => pairs,
        Err(err) => {
            debug!("undecodable parameters {:?}: {}", raw, err);
            return T::default();
        }
    };
    let mut seen = HashSet::new();
    pairs.retain(|(key, _)| seen.insert(key.clone()));
    let deduped = serde_urlencoded::to_string(&pairs).unwrap_or_default();
    serde_urlencoded::from_str(&deduped).unwrap_or_else(|err| {
        debug!("undecodable parameters {:?}: {}", raw, err);
        T::default()
    })
}

fn parse_id(raw: Option<&str>) -> Option<u64> {
    raw.and_then(|v| v.trim().parse().ok())
}

pub struct App {
    store: Store,
}

impl App {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn handle(&mut self, req: &Request<'_>) -> Result<Reply, StoreError> {
        let segments: Vec<&str> = req.path.trim_start_matches('/').split('/').collect();
        match (&req.method, segments.as_slice()) {
            (Method::Get, [""]) => Ok(self.home(req)),
            (Method::Post, ["add"]) => self.add(req),
            (Method::Post, ["toggle"]) => self.toggle(req),
            (Method::Post, ["delete"]) => self.delete(req),
            (Method::Get, ["search"]) => Ok(self.search(req)),
            (Method::Get, ["filter"]) => Ok(self.filter(req)),
            (Method::Get, ["sort"]) => Ok(self.sort(req)),
            (Method::Get, ["edit", id]) => Ok(self.edit(id)),
            (Method::Post, ["update", id]) => self.update(id, req),
            _ => Ok(Reply::not_found()),
        }
    }

    fn list(
        &self,
        path: &str,
        tasks: &[Task],
        filters: &Filters,
        sort_key: Option<SortKey>,
        page: usize,
        error: Option<&str>,
    ) -> Reply {
        let paged = query::paginate(tasks, page);
        let categories = self.store.categories();
        Reply::page(render::list_page(&ListView {
            path,
            tasks: &paged.items,
            error,
            categories: &categories,
            filters,
            sort_key,
            page,
            total_pages: paged.total_pages,
        }))
    }

    fn home(&self, req: &Request<'_>) -> Reply {
        let params: ListParams = decode(req.query);
        let page = query::parse_page(params.page.as_deref());
        let flash = req.cookie.and_then(Flash::from_cookie_header);
        let reply = self.list(
            "/",
            self.store.tasks(),
            &Filters::default(),
            None,
            page,
            flash.map(|f| f.message()),
        );
        if flash.is_some() {
            reply.clearing_flash()
        } else {
            reply
        }
    }

    fn add(&mut self, req: &Request<'_>) -> Result<Reply, StoreError> {
        let form: TaskForm = decode(req.body);
        let Some(input) = form.input() else {
            return Ok(Reply::redirect("/").with_flash(Flash::EmptyTask));
        };
        let id = self.store.add(input)?.id;
        info!(id, "task added");
        Ok(Reply::redirect("/"))
    }

    fn toggle(&mut self, req: &Request<'_>) -> Result<Reply, StoreError> {
        let form: IdForm = decode(req.body);
        if let Some(id) = parse_id(form.id.as_deref()) {
            if self.store.toggle(id)? {
                info!(id, "task toggled");
            }
        }
        Ok(Reply::redirect("/"))
    }

    fn delete(&mut self, req: &Request<'_>) -> Result<Reply, StoreError> {
        let form: IdForm = decode(req.body);
        if let Some(id) = parse_id(form.id.as_deref()) {
            if self.store.delete(id)? {
                info!(id, "task deleted");
            }
        }
        Ok(Reply::redirect("/"))
    }

    fn search(&self, req: &Request<'_>) -> Reply {
        let params: ListParams = decode(req.query);
        let page = query::parse_page(params.page.as_deref());
        let tasks = query::search(self.store.tasks(), params.q.as_deref().unwrap_or(""));
        let filters = Filters {
            q: params.q,
            ..Filters::default()
        };
        self.list("/search", &tasks, &filters, None, page, None)
    }

    fn filter(&self, req: &Request<'_>) -> Reply {
        let params: ListParams = decode(req.query);
        let page = query::parse_page(params.page.as_deref());
        let tasks = query::filter(
            self.store.tasks(),
            params.category.as_deref(),
            params.status.as_deref(),
        );
        let filters = Filters {
            q: None,
            category: params.category,
            status: params.status,
        };
        self.list("/filter", &tasks, &filters, None, page, None)
    }

    fn sort(&self, req: &Request<'_>) -> Reply {
        let params: ListParams = decode(req.query);
        let page = query::parse_page(params.page.as_deref());
        let key = params.key.as_deref().and_then(SortKey::parse);
        let tasks = query::sort(self.store.tasks(), key);
        self.list("/sort", &tasks, &Filters::default(), key, page, None)
    }

    fn edit(&self, raw_id: &str) -> Reply {
        match parse_id(Some(raw_id)).and_then(|id| self.store.get(id)) {
            Some(task) => Reply::page(render::edit_page(task)),
            None => Reply::redirect("/"),
        }
    }

    fn update(&mut self, raw_id: &str, req: &Request<'_>) -> Result<Reply, StoreError> {
        let form: TaskForm = decode(req.body);
        let Some(input) = form.input() else {
            return Ok(Reply::redirect("/").with_flash(Flash::EmptyTask));
        };
        let Some(id) = parse_id(Some(raw_id)) else {
            return Ok(Reply::not_found());
        };
        match self.store.update(id, input) {
            Ok(()) => {
                info!(id, "task updated");
                Ok(Reply::redirect("/"))
            }
            Err(StoreError::NotFound(id)) => {
                warn!(id, "update for unknown task");
                Ok(Reply::not_found())
            }
            Err(err) => Err(err),
        }
    }
}
