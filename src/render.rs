use crate::model::Task;
use crate::query::{build_query, Filters, SortKey};

/// Everything the listing page needs; nothing is recomputed while rendering.
#[derive(Debug)]
pub struct ListView<'a> {
    pub path: &'a str,
    pub tasks: &'a [Task],
    pub error: Option<&'a str>,
    pub categories: &'a [String],
    pub filters: &'a Filters,
    pub sort_key: Option<SortKey>,
    pub page: usize,
    pub total_pages: usize,
}

const STYLE: &str = "\
body{font-family:sans-serif;max-width:56rem;margin:2rem auto;padding:0 1rem;color:#141414}\
table{width:100%;border-collapse:collapse}td,th{padding:.4rem;border-bottom:1px solid #ddd;text-align:left}\
.done{text-decoration:line-through;color:#4e4c48}.error{color:#c24800}\
form.inline{display:inline}nav a{margin-right:.5rem}nav .current{font-weight:bold}";

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n<style>{}</style>\n</head>\n<body>\n{}</body>\n</html>\n",
        html_escape(title),
        STYLE,
        body
    )
}

fn selected(current: Option<&str>, value: &str) -> &'static str {
    if current == Some(value) {
        " selected"
    } else {
        ""
    }
}

pub fn list_page(view: &ListView<'_>) -> String {
    let mut body = String::from("<h1>To-do</h1>\n");
    if let Some(error) = view.error {
        body.push_str(&format!("<p class=\"error\">{}</p>\n", html_escape(error)));
    }

    let mut category_options = String::new();
    for category in view.categories {
        category_options.push_str(&format!(
            "<option value=\"{0}\"{1}>{0}</option>",
            html_escape(category),
            selected(view.filters.category.as_deref(), category)
        ));
    }

    body.push_str(
        "<form method=\"post\" action=\"/add\">\
<input name=\"task\" placeholder=\"New task\" required> \
<input name=\"category\" placeholder=\"Category\"> \
<input type=\"date\" name=\"dueDate\"> \
<button type=\"submit\">Add</button></form>\n",
    );
    body.push_str(&format!(
        "<form method=\"get\" action=\"/search\"><input name=\"q\" value=\"{}\" placeholder=\"Search\"> <button type=\"submit\">Search</button></form>\n",
        html_escape(view.filters.q.as_deref().unwrap_or(""))
    ));
    let status = view.filters.status.as_deref();
    body.push_str(&format!(
        "<form method=\"get\" action=\"/filter\"><select name=\"category\"><option value=\"\">All categories</option>{}</select> \
<select name=\"status\"><option value=\"\">Any status</option><option value=\"done\"{}>Done</option><option value=\"undone\"{}>Not done</option></select> \
<button type=\"submit\">Filter</button></form>\n",
        category_options,
        selected(status, "done"),
        selected(status, "undone")
    ));

    body.push_str("<p>Sort by:");
    for key in [SortKey::Category, SortKey::DueDate, SortKey::CompletedAt] {
        let marker = if view.sort_key == Some(key) { " class=\"current\"" } else { "" };
        body.push_str(&format!(
            " <a href=\"/sort?key={0}\"{1}>{0}</a>",
            key.as_str(),
            marker
        ));
    }
    body.push_str(" <a href=\"/\">reset</a></p>\n");

    if view.tasks.is_empty() {
        body.push_str("<p>No tasks.</p>\n");
    } else {
        body.push_str("<table>\n<tr><th>Task</th><th>Category</th><th>Due</th><th>Completed</th><th></th></tr>\n");
        for task in view.tasks {
            body.push_str(&task_row(task));
        }
        body.push_str("</table>\n");
    }

    body.push_str(&pagination(view));
    layout("To-do", &body)
}

fn task_row(task: &Task) -> String {
    let class = if task.done { " class=\"done\"" } else { "" };
    let toggle_label = if task.done { "Undo" } else { "Done" };
    format!(
        "<tr><td{class}>{name}</td><td>{category}</td><td>{due}</td><td>{completed}</td><td>\
<form class=\"inline\" method=\"post\" action=\"/toggle\"><input type=\"hidden\" name=\"id\" value=\"{id}\"><button type=\"submit\">{toggle_label}</button></form> \
<a href=\"/edit/{id}\">Edit</a> \
<form class=\"inline\" method=\"post\" action=\"/delete\"><input type=\"hidden\" name=\"id\" value=\"{id}\"><button type=\"submit\">Delete</button></form>\
</td></tr>\n",
        name = html_escape(&task.task),
        category = html_escape(&task.category),
        due = html_escape(&task.due_date),
        completed = html_escape(task.completed_at.as_deref().unwrap_or("")),
        id = task.id,
    )
}

fn pagination(view: &ListView<'_>) -> String {
    let mut nav = format!("<nav>Page {} of {}: ", view.page, view.total_pages);
    for page in 1..=view.total_pages {
        if page == view.page {
            nav.push_str(&format!("<span class=\"current\">{}</span> ", page));
        } else {
            let query = build_query(view.filters, view.sort_key, Some(page));
            nav.push_str(&format!(
                "<a href=\"{}?{}\">{}</a> ",
                view.path,
                html_escape(&query),
                page
            ));
        }
    }
    nav.push_str("</nav>\n");
    nav
}

pub fn edit_page(task: &Task) -> String {
    let body = format!(
        "<h1>Edit task</h1>\n<form method=\"post\" action=\"/update/{}\">\
<p><label>Task <input name=\"task\" value=\"{}\" required></label></p>\
<p><label>Category <input name=\"category\" value=\"{}\"></label></p>\
<p><label>Due <input type=\"date\" name=\"dueDate\" value=\"{}\"></label></p>\
<p><button type=\"submit\">Save</button> <a href=\"/\">Cancel</a></p></form>\n",
        task.id,
        html_escape(&task.task),
        html_escape(&task.category),
        html_escape(&task.due_date)
    );
    layout("Edit task", &body)
}

pub fn not_found_page() -> String {
    layout("Not Found", "<h1>Not Found</h1>\n<p><a href=\"/\">Back to the list</a></p>\n")
}

pub fn server_error_page() -> String {
    layout(
        "Server Error",
        "<h1>Something went wrong</h1>\n<p>The change could not be saved.</p>\n",
    )
}
