//! HTML templates for the dashboard.
//!
//! Plain `format!` components styled with Tailwind CSS. Every caller-supplied
//! string goes through [`escape`] before it is interpolated; component
//! arguments named `*_html` are trusted markup built by other components.

use datadash_core::{ColumnControl, PageControl};

/// Escape text for use in HTML content and attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            other => out.push(other),
        }
    }
    out
}

/// Base HTML layout wrapper.
pub fn layout(title: &str, content_html: &str) -> String {
    let title = escape(title);
    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} - Dashboard</title>
    <script src="https://cdn.tailwindcss.com"></script>
    <link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.5.1/css/all.min.css">
</head>
<body class="bg-gray-50 min-h-screen">
    <nav class="bg-indigo-600 text-white px-4 py-3 shadow-lg">
        <span class="font-semibold">{title}</span>
    </nav>
    <main class="p-6 lg:p-8">
        <div class="max-w-7xl mx-auto space-y-6">
            {content_html}
        </div>
    </main>
</body>
</html>"##
    )
}

/// Card component.
pub fn card(title: &str, content_html: &str) -> String {
    let title = escape(title);
    format!(
        r##"<div class="bg-white rounded-xl shadow-sm border border-gray-200 overflow-hidden">
            <div class="px-6 py-4 border-b border-gray-200">
                <h3 class="text-lg font-semibold text-gray-900">{title}</h3>
            </div>
            <div class="p-6">
                {content_html}
            </div>
        </div>"##
    )
}

/// Breadcrumb trail; the last entry is the current page and is not linked.
pub fn breadcrumbs(trail: &[(&str, Option<&str>)]) -> String {
    let items: Vec<String> = trail
        .iter()
        .map(|(text, href)| match href {
            Some(href) => format!(
                r#"<a href="{}" class="text-indigo-600 hover:underline">{}</a>"#,
                escape(href),
                escape(text)
            ),
            None => format!(r#"<span class="text-gray-700">{}</span>"#, escape(text)),
        })
        .collect();
    format!(
        r#"<nav class="text-sm flex gap-2">{}</nav>"#,
        items.join(r#"<span class="text-gray-400">/</span>"#)
    )
}

/// Button component.
pub fn button(text: &str, variant: &str, attrs: &str) -> String {
    let (bg, hover, text_color) = match variant {
        "primary" => ("bg-indigo-600", "hover:bg-indigo-700", "text-white"),
        "danger" => ("bg-red-600", "hover:bg-red-700", "text-white"),
        _ => ("bg-gray-200", "hover:bg-gray-300", "text-gray-700"),
    };
    format!(
        r##"<button class="{bg} {hover} {text_color} px-4 py-2 rounded-lg font-medium transition-colors" {attrs}>{}</button>"##,
        escape(text)
    )
}

/// Labelled input with an optional error message.
pub fn input(name: &str, label: &str, input_type: &str, value: &str, error: Option<&str>) -> String {
    let border = if error.is_some() {
        "border-red-500"
    } else {
        "border-gray-300"
    };
    let error_html = error.map_or(String::new(), |e| {
        format!(r#"<p class="text-sm text-red-600">{}</p>"#, escape(e))
    });
    let (name, label, value) = (escape(name), escape(label), escape(value));
    format!(
        r##"<div class="space-y-1">
            <label for="{name}" class="block text-sm font-medium text-gray-700">{label}</label>
            <input type="{input_type}" name="{name}" id="{name}" value="{value}"
                   class="w-full px-4 py-2 border {border} rounded-lg bg-white text-gray-900 focus:ring-2 focus:ring-indigo-500">
            {error_html}
        </div>"##
    )
}

/// Multi-line text input.
pub fn textarea(name: &str, label: &str, value: &str, error: Option<&str>) -> String {
    let error_html = error.map_or(String::new(), |e| {
        format!(r#"<p class="text-sm text-red-600">{}</p>"#, escape(e))
    });
    let (name, label, value) = (escape(name), escape(label), escape(value));
    format!(
        r##"<div class="space-y-1">
            <label for="{name}" class="block text-sm font-medium text-gray-700">{label}</label>
            <textarea name="{name}" id="{name}" rows="4"
                      class="w-full px-4 py-2 border border-gray-300 rounded-lg bg-white text-gray-900">{value}</textarea>
            {error_html}
        </div>"##
    )
}

/// Checkbox; submits `on` when ticked.
pub fn checkbox(name: &str, label: &str, checked: bool) -> String {
    let (name, label) = (escape(name), escape(label));
    let checked = if checked { " checked" } else { "" };
    format!(
        r##"<div class="flex items-center gap-2">
            <input type="checkbox" name="{name}" id="{name}"{checked} class="h-4 w-4 rounded border-gray-300">
            <label for="{name}" class="text-sm font-medium text-gray-700">{label}</label>
        </div>"##
    )
}

/// Badge component.
pub fn badge(text: &str, color: &str) -> String {
    format!(
        r##"<span class="inline-flex items-center px-2.5 py-0.5 rounded-full text-xs font-medium bg-{color}-100 text-{color}-800">{}</span>"##,
        escape(text)
    )
}

/// Sortable column header.
pub fn column_header(control: &ColumnControl) -> String {
    let icon = if control.is_forward_sorted {
        r#" <i class="fas fa-sort-up"></i>"#
    } else if control.is_reverse_sorted {
        r#" <i class="fas fa-sort-down"></i>"#
    } else {
        ""
    };
    let text = escape(&control.text);
    let inner = match &control.url {
        Some(url) => format!(r#"<a href="{}" class="hover:text-gray-700">{text}{icon}</a>"#, escape(url)),
        None => format!("{text}{icon}"),
    };
    format!(
        r#"<th class="px-6 py-3 text-left text-xs font-medium text-gray-500 uppercase tracking-wider">{inner}</th>"#
    )
}

/// Table component. Cells are trusted markup.
pub fn table(headers_html: &str, rows: &[Vec<String>]) -> String {
    let rows_html: String = rows
        .iter()
        .map(|row| {
            let cells: String = row
                .iter()
                .map(|cell| format!(r#"<td class="px-6 py-4 whitespace-nowrap text-sm text-gray-900">{cell}</td>"#))
                .collect();
            format!(r#"<tr class="hover:bg-gray-50">{cells}</tr>"#)
        })
        .collect();

    format!(
        r##"<div class="overflow-x-auto">
            <table class="min-w-full divide-y divide-gray-200">
                <thead class="bg-gray-50">
                    <tr>{headers_html}</tr>
                </thead>
                <tbody class="bg-white divide-y divide-gray-200">
                    {rows_html}
                </tbody>
            </table>
        </div>"##
    )
}

/// GitHub-style pager.
pub fn pager(controls: &[PageControl]) -> String {
    if controls.is_empty() {
        return String::new();
    }
    let items: String = controls
        .iter()
        .map(|control| {
            let text = escape(&control.text);
            if control.is_active {
                format!(
                    r#"<span aria-current="page" class="px-3 py-1 rounded bg-indigo-600 text-white">{text}</span>"#
                )
            } else if control.is_disabled {
                format!(r#"<span class="px-3 py-1 text-gray-400">{text}</span>"#)
            } else {
                match &control.url {
                    Some(url) => format!(
                        r#"<a href="{}" class="px-3 py-1 rounded text-indigo-600 hover:bg-indigo-50">{text}</a>"#,
                        escape(url)
                    ),
                    None => format!(r#"<span class="px-3 py-1 text-gray-500">{text}</span>"#),
                }
            }
        })
        .collect();
    format!(r#"<nav class="flex items-center justify-center gap-1 mt-4">{items}</nav>"#)
}

/// Empty state component.
pub fn empty_state(icon: &str, title: &str, description: &str, action: Option<(&str, &str)>) -> String {
    let action_html = action.map_or(String::new(), |(text, href)| {
        format!(
            r##"<a href="{}" class="mt-4 inline-flex items-center gap-2 bg-indigo-600 hover:bg-indigo-700 text-white px-4 py-2 rounded-lg font-medium">{}</a>"##,
            escape(href),
            escape(text)
        )
    });
    let (title, description) = (escape(title), escape(description));
    format!(
        r##"<div class="text-center py-12">
            <i class="fas fa-{icon} text-4xl text-gray-400 mb-4"></i>
            <h3 class="text-lg font-medium text-gray-900">{title}</h3>
            <p class="mt-1 text-gray-500">{description}</p>
            {action_html}
        </div>"##
    )
}
