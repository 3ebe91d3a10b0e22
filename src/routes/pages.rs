//! HTML shell for every page route. The browser app renders the content;
//! the server only decides whether the shell may be served at all.

use axum::response::Html;

const PAGE_SHELL: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Job Board</title>
</head>
<body>
<div id="app"></div>
<script type="module" src="/assets/app.js"></script>
</body>
</html>
"#;

pub async fn page_shell() -> Html<&'static str> {
    Html(PAGE_SHELL)
}
