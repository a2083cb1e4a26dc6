use pretty_assertions::assert_eq;
use tempfile::TempDir;
use tiny_http::Method;
use todo_server::error::StoreError;
use todo_server::routes::{App, Reply, Request};
use todo_server::store::Store;

struct Harness {
    _dir: TempDir,
    app: App,
}

impl Harness {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let store = Store::load(dir.path().join("todos.json")).unwrap();
        Self {
            _dir: dir,
            app: App::new(store),
        }
    }

    fn get(&mut self, url: &str) -> Reply {
        self.get_with_cookie(url, None)
    }

    fn get_with_cookie(&mut self, url: &str, cookie: Option<&str>) -> Reply {
        self.app
            .handle(&Request::new(Method::Get, url, "", cookie))
            .unwrap()
    }

    fn post(&mut self, url: &str, body: &str) -> Reply {
        self.app
            .handle(&Request::new(Method::Post, url, body, None))
            .unwrap()
    }

    fn add(&mut self, name: &str, category: &str, due: &str) -> u64 {
        let body = format!("task={}&category={}&dueDate={}", name, category, due);
        let reply = self.post("/add", &body);
        assert_eq!(reply.status, 302);
        self.app.store().tasks().last().unwrap().id
    }

    fn names(&self) -> Vec<String> {
        self.app
            .store()
            .tasks()
            .iter()
            .map(|t| t.task.clone())
            .collect()
    }
}

fn rows(reply: &Reply) -> usize {
    reply.body.matches("<tr><td").count()
}

fn flash_cookie(reply: &Reply) -> String {
    let header = reply.set_cookie.clone().expect("flash cookie");
    header.split(';').next().unwrap().to_string()
}

#[test]
fn add_redirects_home_and_persists() {
    let mut h = Harness::new();
    let reply = h.post("/add", "task=++Buy+milk%0A+&category=home&dueDate=2025-06-01");
    assert_eq!(reply.status, 302);
    assert_eq!(reply.location.as_deref(), Some("/"));
    assert_eq!(reply.set_cookie, None);

    let task = &h.app.store().tasks()[0];
    assert_eq!(task.task, "Buy milk");
    assert_eq!(task.category, "home");
    assert_eq!(task.due_date, "2025-06-01");
    assert!(!task.done);
    assert_eq!(task.completed_at, None);

    let reloaded = Store::load(h.app.store().path()).unwrap();
    assert_eq!(reloaded.tasks(), h.app.store().tasks());
}

#[test]
fn blank_task_sets_flash_shown_once() {
    let mut h = Harness::new();
    h.add("keep", "", "");

    let reply = h.post("/add", "task=+++&category=home");
    assert_eq!(reply.status, 302);
    assert_eq!(h.names(), vec!["keep".to_string()]);
    let cookie = flash_cookie(&reply);
    assert_eq!(cookie, "flash=empty-task");

    let home = h.get_with_cookie("/", Some(&cookie));
    assert_eq!(home.status, 200);
    assert!(home.body.contains("Task name cannot be empty."));
    assert!(home.set_cookie.as_deref().unwrap().contains("Max-Age=0"));

    // The browser dropped the cookie, so the next render is clean.
    let again = h.get("/");
    assert!(!again.body.contains("Task name cannot be empty."));
    assert_eq!(again.set_cookie, None);
}

#[test]
fn flash_is_not_shown_to_other_clients() {
    let mut h = Harness::new();
    h.post("/add", "task=");
    let other = h.get_with_cookie("/", Some("theme=dark"));
    assert!(!other.body.contains("Task name cannot be empty."));
}

#[test]
fn home_paginates_ten_per_page() {
    let mut h = Harness::new();
    for n in 0..23 {
        h.add(&format!("task{}", n), "", "");
    }
    let first = h.get("/");
    assert_eq!(rows(&first), 10);
    assert!(first.body.contains("Page 1 of 3"));
    assert!(first.body.contains("href=\"/?page=2\""));

    let last = h.get("/?page=3");
    assert_eq!(rows(&last), 3);
    assert!(last.body.contains("task22"));

    let beyond = h.get("/?page=9");
    assert_eq!(rows(&beyond), 0);
    assert!(beyond.body.contains("No tasks."));

    let junk = h.get("/?page=abc");
    assert!(junk.body.contains("Page 1 of 3"));
}

#[test]
fn toggle_twice_restores_task() {
    let mut h = Harness::new();
    let id = h.add("water", "", "");

    h.post("/toggle", &format!("id={}", id));
    let task = h.app.store().get(id).unwrap();
    assert!(task.done);
    assert!(task.completed_at.is_some());

    h.post("/toggle", &format!("id={}", id));
    let task = h.app.store().get(id).unwrap();
    assert!(!task.done);
    assert_eq!(task.completed_at, None);
}

#[test]
fn delete_removes_only_the_target() {
    let mut h = Harness::new();
    let _a = h.add("a", "", "");
    let b = h.add("b", "", "");
    let c = h.add("c", "", "");

    let reply = h.post("/delete", &format!("id={}", b));
    assert_eq!(reply.status, 302);
    assert_eq!(h.names(), vec!["a".to_string(), "c".to_string()]);
    assert!(h.app.store().get(c).is_some());
}

#[test]
fn unknown_ids_are_ignored_by_delete_and_toggle() {
    let mut h = Harness::new();
    h.add("a", "", "");
    let before = h.app.store().tasks().to_vec();

    assert_eq!(h.post("/delete", "id=42").status, 302);
    assert_eq!(h.post("/toggle", "id=42").status, 302);
    assert_eq!(h.post("/toggle", "id=nope").status, 302);
    assert_eq!(h.post("/delete", "").status, 302);
    assert_eq!(h.app.store().tasks(), before.as_slice());
}

#[test]
fn search_matches_literal_substring() {
    let mut h = Harness::new();
    h.add("Buy milk", "", "");
    h.add("buy bread", "", "");
    h.add("call mom", "", "");

    let reply = h.get("/search?q=uy");
    assert_eq!(rows(&reply), 2);

    let reply = h.get("/search?q=Buy");
    assert_eq!(rows(&reply), 1);
    assert!(reply.body.contains("Buy milk"));
    assert!(reply.body.contains("value=\"Buy\""));

    let reply = h.get("/search?q=");
    assert_eq!(rows(&reply), 3);
}

#[test]
fn filter_by_category_and_status() {
    let mut h = Harness::new();
    let a = h.add("a", "home", "");
    h.add("b", "home", "");
    let c = h.add("c", "work", "");
    h.post("/toggle", &format!("id={}", a));
    h.post("/toggle", &format!("id={}", c));

    let reply = h.get("/filter?category=home&status=done");
    assert_eq!(rows(&reply), 1);
    assert!(reply.body.contains("<td class=\"done\">a</td>"));

    let reply = h.get("/filter?category=home");
    assert_eq!(rows(&reply), 2);

    let reply = h.get("/filter?status=undone");
    assert_eq!(rows(&reply), 1);
    assert!(reply.body.contains(">b</td>"));
}

#[test]
fn filter_with_repeated_parameter_uses_first_value() {
    let mut h = Harness::new();
    let a = h.add("a", "home", "");
    h.add("b", "work", "");
    h.post("/toggle", &format!("id={}", a));

    let reply = h.get("/filter?category=home&status=done&status=done");
    assert_eq!(rows(&reply), 1);
    assert!(reply.body.contains("<td class=\"done\">a</td>"));
}

#[test]
fn failed_write_surfaces_io_error_and_keeps_change() {
    let dir = TempDir::new().unwrap();
    let store = Store::load(dir.path().join("sub").join("t.json")).unwrap();
    let mut app = App::new(store);

    let result = app.handle(&Request::new(Method::Post, "/add", "task=a", None));
    assert!(matches!(result, Err(StoreError::Io(_))));
    assert_eq!(app.store().tasks().len(), 1);
    assert_eq!(app.store().tasks()[0].task, "a");
}

#[test]
fn sort_orders_by_due_date_and_keeps_key_in_links() {
    let mut h = Harness::new();
    h.add("late", "", "2025-12-01");
    h.add("none", "", "");
    h.add("early", "", "2025-01-01");
    for n in 0..10 {
        h.add(&format!("filler{}", n), "", "2030-01-01");
    }

    let reply = h.get("/sort?key=dueDate");
    let none = reply.body.find(">none<").unwrap();
    let early = reply.body.find(">early<").unwrap();
    let late = reply.body.find(">late<").unwrap();
    assert!(none < early && early < late);
    assert!(reply.body.contains("href=\"/sort?key=dueDate&amp;page=2\""));

    let unsorted = h.get("/sort?key=bogus");
    let late = unsorted.body.find(">late<").unwrap();
    let none = unsorted.body.find(">none<").unwrap();
    assert!(late < none);
}

#[test]
fn edit_renders_form_or_redirects() {
    let mut h = Harness::new();
    let id = h.add("paint", "home", "2025-02-02");

    let reply = h.get(&format!("/edit/{}", id));
    assert_eq!(reply.status, 200);
    assert!(reply.body.contains("value=\"paint\""));
    assert!(reply.body.contains("value=\"2025-02-02\""));

    for url in ["/edit/999", "/edit/abc"] {
        let reply = h.get(url);
        assert_eq!(reply.status, 302);
        assert_eq!(reply.location.as_deref(), Some("/"));
        assert_eq!(reply.set_cookie, None);
    }
}

#[test]
fn update_changes_fields_but_not_completion() {
    let mut h = Harness::new();
    let id = h.add("paint", "home", "");
    h.post("/toggle", &format!("id={}", id));
    let stamp = h.app.store().get(id).unwrap().completed_at.clone();

    let reply = h.post(&format!("/update/{}", id), "task=paint+fence&category=&dueDate=2025-07-04");
    assert_eq!(reply.status, 302);
    let task = h.app.store().get(id).unwrap();
    assert_eq!(task.task, "paint fence");
    assert_eq!(task.category, "uncategorized");
    assert_eq!(task.due_date, "2025-07-04");
    assert!(task.done);
    assert_eq!(task.completed_at, stamp);
}

#[test]
fn update_with_blank_task_flashes_and_keeps_task() {
    let mut h = Harness::new();
    let id = h.add("paint", "home", "");
    let reply = h.post(&format!("/update/{}", id), "task=%20&category=work");
    assert_eq!(reply.status, 302);
    assert_eq!(flash_cookie(&reply), "flash=empty-task");
    assert_eq!(h.app.store().get(id).unwrap().category, "home");
}

#[test]
fn update_unknown_id_is_not_found() {
    let mut h = Harness::new();
    h.add("paint", "", "");
    assert_eq!(h.post("/update/77", "task=x").status, 404);
    assert_eq!(h.post("/update/abc", "task=x").status, 404);
    assert_eq!(h.names(), vec!["paint".to_string()]);
}

#[test]
fn unknown_routes_are_not_found() {
    let mut h = Harness::new();
    assert_eq!(h.get("/nope").status, 404);
    assert_eq!(h.get("/add").status, 404);
    assert_eq!(h.post("/", "").status, 404);
}

#[test]
fn categories_are_listed_once_in_order() {
    let mut h = Harness::new();
    h.add("a", "work", "");
    h.add("b", "home", "");
    h.add("c", "work", "");
    let body = h.get("/").body;
    let work = body.find("<option value=\"work\">").unwrap();
    let home = body.find("<option value=\"home\">").unwrap();
    assert!(work < home);
    assert_eq!(body.matches("<option value=\"work\">").count(), 1);
}
