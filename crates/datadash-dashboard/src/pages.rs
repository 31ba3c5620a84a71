//! Page templates for dashboard views.

use crate::forms::{FieldErrors, FormData, input_value};
use crate::templates::{
    badge, breadcrumbs, button, card, checkbox, column_header, empty_state, escape, input, layout,
    pager, table, textarea,
};
use datadash_core::value::display_text;
use datadash_core::{ColumnControl, Field, FieldKind, PageControl, Record, Schema};
use serde_json::Value;
use url::form_urlencoded;

/// Percent-encode a value for use as one path segment.
pub fn path_segment(text: &str) -> String {
    form_urlencoded::byte_serialize(text.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

// =============================================================================
// Index
// =============================================================================

pub struct TableSummary {
    pub title: String,
    pub url: String,
    pub count: usize,
}

pub fn index_page(tables: &[TableSummary]) -> String {
    if tables.is_empty() {
        return layout(
            "Tables",
            &empty_state("database", "No tables", "No tables are configured.", None),
        );
    }
    let rows: Vec<Vec<String>> = tables
        .iter()
        .map(|t| {
            vec![
                format!(
                    r#"<a href="{}" class="text-indigo-600 hover:underline">{}</a>"#,
                    escape(&t.url),
                    escape(&t.title)
                ),
                badge(&t.count.to_string(), "gray"),
            ]
        })
        .collect();
    let headers = r#"<th class="px-6 py-3 text-left text-xs font-medium text-gray-500 uppercase tracking-wider">Table</th><th class="px-6 py-3 text-left text-xs font-medium text-gray-500 uppercase tracking-wider">Rows</th>"#;
    layout("Tables", &card("Tables", &table(headers, &rows)))
}

// =============================================================================
// Forms
// =============================================================================

/// Inputs for every editable field.
fn form_fields(schema: &Schema, value_of: impl Fn(&Field) -> String, errors: &FieldErrors) -> String {
    schema
        .fields()
        .iter()
        .filter(|f| !f.read_only)
        .map(|field| {
            let value = value_of(field);
            let error = errors.get(&field.name).map(String::as_str);
            match field.kind {
                FieldKind::Boolean => checkbox(
                    &field.name,
                    &field.title,
                    matches!(value.as_str(), "true" | "on" | "1"),
                ),
                FieldKind::Text => textarea(&field.name, &field.title, &value, error),
                FieldKind::Integer | FieldKind::Float => {
                    input(&field.name, &field.title, "number", &value, error)
                }
                FieldKind::Datetime => {
                    input(&field.name, &field.title, "datetime-local", &value, error)
                }
                FieldKind::String => input(&field.name, &field.title, "text", &value, error),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn form(action: &str, fields_html: &str, submit: &str) -> String {
    format!(
        r##"<form method="post" action="{}" class="space-y-4">
            {fields_html}
            <div>{}</div>
        </form>"##,
        escape(action),
        button(submit, "primary", r#"type="submit""#)
    )
}

// =============================================================================
// List
// =============================================================================

/// Everything the list page shows.
pub struct ListView<'a> {
    pub title: &'a str,
    pub index_url: &'a str,
    /// Path of the list page itself, without query.
    pub list_path: &'a str,
    /// Full URL including query, used as the create form action.
    pub list_url: &'a str,
    pub schema: &'a Schema,
    pub lookup_field: &'a str,
    pub search: Option<&'a str>,
    pub count: usize,
    pub columns: &'a [ColumnControl],
    pub rows: &'a [Record],
    pub page_controls: &'a [PageControl],
    pub form_values: &'a FormData,
    pub form_errors: &'a FieldErrors,
}

pub fn list_page(view: &ListView<'_>) -> String {
    let crumbs = breadcrumbs(&[("Tables", Some(view.index_url)), (view.title, None)]);

    let search_form = format!(
        r##"<form method="get" action="{}" class="flex gap-2">
            <input type="search" name="search" value="{}" placeholder="Search"
                   class="flex-1 px-4 py-2 border border-gray-300 rounded-lg bg-white text-gray-900">
            {}
        </form>"##,
        escape(view.list_path),
        escape(view.search.unwrap_or_default()),
        button("Search", "secondary", r#"type="submit""#)
    );

    let listing = if view.rows.is_empty() {
        let description = match view.search {
            Some(term) => format!("Nothing matches \"{term}\"."),
            None => "This table has no rows yet.".to_string(),
        };
        empty_state("inbox", "No rows", &description, None)
    } else {
        let headers: String = view.columns.iter().map(column_header).collect();
        let rows: Vec<Vec<String>> = view
            .rows
            .iter()
            .map(|record| row_cells(view, record))
            .collect();
        table(&headers, &rows)
    };

    let summary = format!(
        r#"<p class="text-sm text-gray-500">{} row{}</p>"#,
        view.count,
        if view.count == 1 { "" } else { "s" }
    );

    let create = form(
        view.list_url,
        &form_fields(
            view.schema,
            |f| view.form_values.get(&f.name).cloned().unwrap_or_default(),
            view.form_errors,
        ),
        "Create",
    );

    let content = format!(
        "{crumbs}\n{}\n{}",
        card(
            view.title,
            &format!("{search_form}\n{summary}\n{listing}\n{}", pager(view.page_controls))
        ),
        card(&format!("New {}", view.title), &create)
    );
    layout(view.title, &content)
}

fn row_cells(view: &ListView<'_>, record: &Record) -> Vec<String> {
    let detail_url = record
        .get(view.lookup_field)
        .map(|key| format!("{}/{}", view.list_path, path_segment(&display_text(key))));

    view.columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            let text = cell_text(record.get(&column.id));
            match (&detail_url, i) {
                (Some(url), 0) => format!(
                    r#"<a href="{}" class="text-indigo-600 hover:underline">{}</a>"#,
                    escape(url),
                    if text.is_empty() { "—".to_string() } else { text }
                ),
                _ => text,
            }
        })
        .collect()
}

fn cell_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::Bool(true)) => badge("yes", "green"),
        Some(Value::Bool(false)) => badge("no", "gray"),
        Some(v) => escape(&display_text(v)),
        None => String::new(),
    }
}

// =============================================================================
// Detail
// =============================================================================

pub struct DetailView<'a> {
    pub table_title: &'a str,
    pub index_url: &'a str,
    pub table_url: &'a str,
    pub detail_url: &'a str,
    pub schema: &'a Schema,
    pub record: &'a Record,
    pub key_text: &'a str,
    /// Submitted values to redisplay after a failed update.
    pub submitted: Option<&'a FormData>,
    pub form_errors: &'a FieldErrors,
}

pub fn detail_page(view: &DetailView<'_>) -> String {
    let crumbs = breadcrumbs(&[
        ("Tables", Some(view.index_url)),
        (view.table_title, Some(view.table_url)),
        (view.key_text, None),
    ]);

    let read_only: String = view
        .schema
        .fields()
        .iter()
        .filter(|f| f.read_only)
        .map(|f| {
            format!(
                r#"<div class="flex justify-between p-3 bg-gray-50 rounded-lg"><span class="text-gray-600">{}</span><span>{}</span></div>"#,
                escape(&f.title),
                cell_text(view.record.get(&f.name))
            )
        })
        .collect();

    let edit = form(
        view.detail_url,
        &form_fields(
            view.schema,
            |f| match view.submitted {
                Some(values) => values.get(&f.name).cloned().unwrap_or_default(),
                None => input_value(f, view.record.get(&f.name)),
            },
            view.form_errors,
        ),
        "Save",
    );

    let delete = format!(
        r##"<form method="post" action="{}/delete">{}</form>"##,
        escape(view.detail_url),
        button("Delete", "danger", r#"type="submit""#)
    );

    let title = format!("{} {}", view.table_title, view.key_text);
    let content = format!(
        "{crumbs}\n{}",
        card(
            &title,
            &format!(r#"<div class="space-y-2 mb-6">{read_only}</div>{edit}<div class="mt-6">{delete}</div>"#)
        )
    );
    layout(&title, &content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use datadash_core::Field;
    use serde_json::json;

    #[test]
    fn test_path_segment_encoding() {
        assert_eq!(path_segment("42"), "42");
        assert_eq!(path_segment("a b/c"), "a%20b%2Fc");
    }

    #[test]
    fn test_index_lists_tables() {
        let html = index_page(&[TableSummary {
            title: "Users <admin>".to_string(),
            url: "/users".to_string(),
            count: 3,
        }]);
        assert!(html.contains(r#"href="/users""#));
        assert!(html.contains("Users &lt;admin&gt;"));
    }

    #[test]
    fn test_list_page_links_rows_and_escapes_values() {
        let schema = Schema::new(vec![
            Field::new("pk", FieldKind::Integer).read_only(),
            Field::new("username", FieldKind::String),
        ]);
        let mut record = Record::new();
        record.insert("pk".into(), json!(7));
        record.insert("username".into(), json!("<script>"));
        let columns = vec![
            ColumnControl {
                id: "pk".into(),
                text: "Pk".into(),
                url: Some("/users?order=pk".into()),
                is_forward_sorted: false,
                is_reverse_sorted: false,
            },
            ColumnControl {
                id: "username".into(),
                text: "Username".into(),
                url: Some("/users?order=username".into()),
                is_forward_sorted: false,
                is_reverse_sorted: false,
            },
        ];
        let html = list_page(&ListView {
            title: "Users",
            index_url: "/",
            list_path: "/users",
            list_url: "/users",
            schema: &schema,
            lookup_field: "pk",
            search: None,
            count: 1,
            columns: &columns,
            rows: &[record],
            page_controls: &[],
            form_values: &FormData::new(),
            form_errors: &FieldErrors::new(),
        });

        assert!(html.contains(r#"href="/users/7""#));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("1 row<"));
    }
}
